//! Pick the next departure for each favourite.

use chrono::{DateTime, Utc};

use crate::domain::{Departure, DisplayZone, Favourite, OutboundResult};

/// For each favourite, in order, summarise the first matching departure.
///
/// `departures` must already be filtered and sorted (see
/// [`filter_and_sort`](super::filter_and_sort)), so the first match is the
/// earliest. Favourites with no match produce nothing.
pub fn select_departures(
    favourites: &[Favourite],
    departures: &[Departure],
    now: DateTime<Utc>,
    zone: &DisplayZone,
) -> Vec<OutboundResult> {
    favourites
        .iter()
        .filter_map(|favourite| {
            let departure = departures
                .iter()
                .find(|d| d.serves(&favourite.stop_id, &favourite.direction_id))?;

            Some(OutboundResult {
                name: favourite.name.clone(),
                time: zone.minutes_since_midnight(departure.scheduled),
                minutes: minutes_until(departure, now),
            })
        })
        .collect()
}

/// Fractional minutes from `now` until the departure leaves.
///
/// Uses the real-time estimate; without one, the scheduled time.
pub fn minutes_until(departure: &Departure, now: DateTime<Utc>) -> f64 {
    let leaves = match departure.estimated {
        Some(estimated) => estimated,
        None => departure.scheduled,
    };
    (leaves - now).num_milliseconds() as f64 / 60_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RouteType;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0).unwrap()
    }

    fn at(mins: i64) -> DateTime<Utc> {
        now() + Duration::minutes(mins)
    }

    fn utc() -> DisplayZone {
        DisplayZone::Named(chrono_tz::UTC)
    }

    #[test]
    fn single_favourite_scenario() {
        let favourites = vec![Favourite::new("A", RouteType::TRAM, "10", "0")];
        let departures = vec![Departure::scheduled("10", "0", at(5))];

        let results = select_departures(&favourites, &departures, now(), &utc());

        assert_eq!(
            results,
            vec![OutboundResult {
                name: "A".into(),
                time: 8 * 60 + 5,
                minutes: 5.0,
            }]
        );
    }

    #[test]
    fn first_match_wins() {
        let favourites = vec![Favourite::new("A", RouteType::TRAM, "10", "0")];
        let departures = vec![
            Departure::scheduled("10", "1", at(1)),
            Departure::scheduled("10", "0", at(3)),
            Departure::scheduled("10", "0", at(9)),
        ];

        let results = select_departures(&favourites, &departures, now(), &utc());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].minutes, 3.0);
    }

    #[test]
    fn directions_select_independently() {
        let favourites = vec![
            Favourite::new("Up", RouteType::TRAM, "10", "0"),
            Favourite::new("Down", RouteType::TRAM, "10", "1"),
        ];
        let departures = vec![
            Departure::scheduled("10", "1", at(2)),
            Departure::scheduled("10", "0", at(7)),
        ];

        let results = select_departures(&favourites, &departures, now(), &utc());
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].name, "Up");
        assert_eq!(results[0].minutes, 7.0);
        assert_eq!(results[1].name, "Down");
        assert_eq!(results[1].minutes, 2.0);
    }

    #[test]
    fn no_match_is_skipped() {
        let favourites = vec![
            Favourite::new("A", RouteType::TRAM, "10", "0"),
            Favourite::new("Nothing", RouteType::TRAM, "99", "0"),
            Favourite::new("B", RouteType::TRAM, "11", "0"),
        ];
        let departures = vec![
            Departure::scheduled("11", "0", at(4)),
            Departure::scheduled("10", "0", at(6)),
        ];

        let names: Vec<String> = select_departures(&favourites, &departures, now(), &utc())
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn time_uses_schedule_minutes_use_estimate() {
        let favourites = vec![Favourite::new("A", RouteType::BUS, "10", "0")];
        let departures = vec![
            Departure::scheduled("10", "0", at(5)).with_estimate(at(8) + Duration::seconds(30)),
        ];

        let results = select_departures(&favourites, &departures, now(), &utc());
        assert_eq!(results[0].time, 8 * 60 + 5);
        assert_eq!(results[0].minutes, 8.5);
    }

    #[test]
    fn minutes_fall_back_to_schedule() {
        let dep = Departure::scheduled("10", "0", now() + Duration::seconds(90));
        assert_eq!(minutes_until(&dep, now()), 1.5);
    }

    #[test]
    fn minutes_negative_for_late_schedule_with_past_estimate() {
        let dep = Departure::scheduled("10", "0", at(2)).with_estimate(at(-1));
        assert_eq!(minutes_until(&dep, now()), -1.0);
    }

    #[test]
    fn time_in_named_zone() {
        let zone: DisplayZone = "Australia/Melbourne".parse().unwrap();
        let favourites = vec![Favourite::new("A", RouteType::TRAIN, "1071", "1")];
        // 08:05 UTC is 19:05 AEDT
        let departures = vec![Departure::scheduled("1071", "1", at(5))];

        let results = select_departures(&favourites, &departures, now(), &zone);
        assert_eq!(results[0].time, 19 * 60 + 5);
    }
}
