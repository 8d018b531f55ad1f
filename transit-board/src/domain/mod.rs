//! Domain types for real-time departure boards.
//!
//! These are the values the rest of the crate passes around: stations
//! from the static directory and departures normalized from upstream feeds.
//! They carry no I/O and no upstream-specific quirks.

mod departure;
mod station;

pub use departure::{
    DepartureRecord, Direction, InvalidLineColor, LineColor, MIN_MINUTES_UNTIL, departs_at,
    is_reportable,
};
pub use station::{Bearing, StationRecord};
