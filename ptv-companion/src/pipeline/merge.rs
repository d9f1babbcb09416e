//! Merge, filter and sort fetched departures.

use chrono::{DateTime, Utc};

use crate::domain::Departure;

/// Drop departures that have already left and order the rest by their
/// best known departure time.
///
/// A departure is kept if its scheduled time is after `now`, or if it has
/// an estimate after `now`. The sort is stable, so departures with equal
/// times keep their pool order.
pub fn filter_and_sort(pool: Vec<Departure>, now: DateTime<Utc>) -> Vec<Departure> {
    let mut upcoming: Vec<Departure> = pool.into_iter().filter(|d| d.is_upcoming(now)).collect();
    upcoming.sort_by_key(Departure::effective);
    upcoming
}


#[cfg(test)]
mod proptests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0).unwrap()
    }

    /// Departures scheduled within an hour either side of now, sometimes
    /// with an estimate within 20 minutes of the schedule.
    fn departure() -> impl Strategy<Value = Departure> {
        (0u8..4, -60i64..60, prop::option::of(-20i64..20)).prop_map(|(stop, sched, delay)| {
            let scheduled = now() + Duration::minutes(sched);
            let dep = Departure::scheduled(stop.to_string(), "0", scheduled);
            match delay {
                Some(d) => dep.with_estimate(scheduled + Duration::minutes(d)),
                None => dep,
            }
        })
    }

    proptest! {
        /// Nothing whose schedule and estimate are both past survives
        #[test]
        fn no_stale_departures(pool in prop::collection::vec(departure(), 0..40)) {
            let result = filter_and_sort(pool, now());
            for d in &result {
                let estimate_future = d.estimated.is_some_and(|e| e > now());
                prop_assert!(d.scheduled > now() || estimate_future);
            }
        }

        /// Every upcoming departure survives
        #[test]
        fn upcoming_departures_kept(pool in prop::collection::vec(departure(), 0..40)) {
            let expected = pool.iter().filter(|d| d.is_upcoming(now())).count();
            prop_assert_eq!(filter_and_sort(pool, now()).len(), expected);
        }

        /// Output is non-decreasing by effective time
        #[test]
        fn sorted_by_effective_time(pool in prop::collection::vec(departure(), 0..40)) {
            let result = filter_and_sort(pool, now());
            for pair in result.windows(2) {
                prop_assert!(pair[0].effective() <= pair[1].effective());
            }
        }

        /// Equal effective times keep their relative pool order
        #[test]
        fn sort_is_stable(pool in prop::collection::vec(departure(), 0..40)) {
            let tagged: Vec<Departure> = pool
                .into_iter()
                .enumerate()
                .map(|(i, mut d)| { d.direction_id = i.to_string(); d })
                .collect();
            let result = filter_and_sort(tagged, now());
            for pair in result.windows(2) {
                if pair[0].effective() == pair[1].effective() {
                    let a: usize = pair[0].direction_id.parse().unwrap();
                    let b: usize = pair[1].direction_id.parse().unwrap();
                    prop_assert!(a < b);
                }
            }
        }
    }
}
