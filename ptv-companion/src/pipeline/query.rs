//! Derive the upstream queries needed to cover a set of favourites.

use std::collections::HashSet;

use crate::domain::{Favourite, Query};

/// Project favourites onto distinct (route type, stop) queries.
///
/// First-seen order is preserved, so the result is deterministic for a
/// given configuration. An empty favourites list gives no queries.
pub fn build_queries(favourites: &[Favourite]) -> Vec<Query> {
    let mut seen = HashSet::new();
    let mut queries = Vec::new();

    for favourite in favourites {
        let query = favourite.query();
        if seen.insert(query.clone()) {
            queries.push(query);
        }
    }

    queries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RouteType;

    #[test]
    fn empty_input() {
        assert!(build_queries(&[]).is_empty());
    }

    #[test]
    fn shared_stop_gives_one_query() {
        let favourites = vec![
            Favourite::new("Up", RouteType::TRAM, "10", "0"),
            Favourite::new("Down", RouteType::TRAM, "10", "1"),
        ];
        assert_eq!(
            build_queries(&favourites),
            vec![Query::new(RouteType::TRAM, "10")]
        );
    }

    #[test]
    fn same_stop_different_route_type_is_distinct() {
        let favourites = vec![
            Favourite::new("Tram", RouteType::TRAM, "10", "0"),
            Favourite::new("Bus", RouteType::BUS, "10", "0"),
        ];
        assert_eq!(build_queries(&favourites).len(), 2);
    }

    #[test]
    fn first_seen_order() {
        let favourites = vec![
            Favourite::new("A", RouteType::BUS, "3", "0"),
            Favourite::new("B", RouteType::TRAM, "1", "0"),
            Favourite::new("C", RouteType::BUS, "3", "1"),
            Favourite::new("D", RouteType::TRAIN, "2", "0"),
        ];
        assert_eq!(
            build_queries(&favourites),
            vec![
                Query::new(RouteType::BUS, "3"),
                Query::new(RouteType::TRAM, "1"),
                Query::new(RouteType::TRAIN, "2"),
            ]
        );
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::RouteType;
    use proptest::prelude::*;

    fn favourite() -> impl Strategy<Value = Favourite> {
        (0u32..5, "[1-4]{1}", "[0-2]{1}").prop_map(|(route, stop, dir)| {
            Favourite::new(format!("{route}/{stop}/{dir}"), RouteType::new(route), stop, dir)
        })
    }

    proptest! {
        /// Queries are exactly the distinct projections of the favourites
        #[test]
        fn queries_are_deduplicated_projection(favs in prop::collection::vec(favourite(), 0..20)) {
            let queries = build_queries(&favs);

            let expected: HashSet<Query> = favs.iter().map(Favourite::query).collect();
            let actual: HashSet<Query> = queries.iter().cloned().collect();

            prop_assert_eq!(queries.len(), actual.len());
            prop_assert_eq!(actual, expected);
            prop_assert!(queries.len() <= favs.len());
        }

        /// Each query appears at the position of its first favourite
        #[test]
        fn first_seen_order_preserved(favs in prop::collection::vec(favourite(), 0..20)) {
            let queries = build_queries(&favs);
            let mut firsts: Vec<Query> = Vec::new();
            for f in &favs {
                if !firsts.contains(&f.query()) {
                    firsts.push(f.query());
                }
            }
            prop_assert_eq!(queries, firsts);
        }
    }
}
