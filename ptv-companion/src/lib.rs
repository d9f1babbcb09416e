//! Phone-side companion for a departures watch app.
//!
//! Reads the user's favourite stops, fetches upcoming departures from the
//! PTV timetable service, picks the next departure for each favourite, and
//! delivers the results to the watch one acknowledged message at a time.

pub mod cache;
pub mod config;
pub mod delivery;
pub mod device;
pub mod domain;
pub mod pipeline;
pub mod ptv;
pub mod web;
