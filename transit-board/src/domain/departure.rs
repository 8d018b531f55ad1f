//! Normalized departure records.
//!
//! Every upstream format is converted into [`DepartureRecord`]s so that the
//! rendering layer never needs to know where a departure came from.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Departures closer than this many minutes are never reported.
///
/// A train that leaves in under two minutes cannot realistically be caught,
/// so every parser drops it.
pub const MIN_MINUTES_UNTIL: u32 = 2;

/// Returns true if a departure this many minutes away should be reported.
pub fn is_reportable(minutes_until: u32) -> bool {
    minutes_until >= MIN_MINUTES_UNTIL
}

/// Direction of travel for a departure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    North,
    South,
    Unknown,
}

impl Direction {
    /// Parse an upstream direction label.
    ///
    /// Only the first five characters are significant, compared without
    /// regard to case, so "North", "NORTHBOUND" and "Northbound" all map to
    /// [`Direction::North`].
    pub fn from_label(label: &str) -> Self {
        let head: String = label.trim().chars().take(5).collect();
        if head.eq_ignore_ascii_case("north") {
            Direction::North
        } else if head.eq_ignore_ascii_case("south") {
            Direction::South
        } else {
            Direction::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::North => "North",
            Direction::South => "South",
            Direction::Unknown => "?",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Pad through the formatter so `{:<5}` column widths work.
        f.pad(self.as_str())
    }
}

/// Error returned when a hex color string cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid hex color: {0:?}")]
pub struct InvalidLineColor(pub String);

/// Display color of a line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum LineColor {
    /// A terminal color name such as "yellow" or "bright_red".
    Named(String),
    /// An exact color decoded from `#RRGGBB`.
    Rgb(u8, u8, u8),
}

/// Line tokens whose terminal color name differs from the token itself.
const NAMED_COLORS: &[(&str, &str)] = &[("ORANGE", "bright_red")];

impl LineColor {
    /// Map a line token (e.g. "ORANGE") to a terminal color name.
    pub fn from_line(line: &str) -> Self {
        let named = NAMED_COLORS
            .iter()
            .find(|(token, _)| *token == line)
            .map(|(_, name)| (*name).to_string())
            .unwrap_or_else(|| line.to_lowercase());
        LineColor::Named(named)
    }

    /// Decode a `#RRGGBB` string.
    pub fn from_hex(hex: &str) -> Result<Self, InvalidLineColor> {
        let invalid = || InvalidLineColor(hex.to_string());
        let digits = hex.strip_prefix('#').ok_or_else(invalid)?;
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(invalid());
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| invalid())
        };
        Ok(LineColor::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Prefer the exact hex color when one is supplied and valid.
    pub fn resolve(line: &str, hex: Option<&str>) -> Self {
        hex.and_then(|h| Self::from_hex(h).ok())
            .unwrap_or_else(|| Self::from_line(line))
    }
}

/// One upcoming departure, normalized from any upstream feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartureRecord {
    /// Line or service type label (e.g. "YELLOW", "Baby Bullet").
    pub line: String,
    /// Train number, when the upstream reports one.
    pub train: Option<String>,
    pub direction: Direction,
    /// Whole minutes from the parse instant until departure.
    pub minutes_until: u32,
    /// Absolute departure time (parse instant plus `minutes_until`).
    pub departs_at: DateTime<Utc>,
    pub platform: Option<String>,
    pub origin: String,
    pub destination: String,
    /// Train length in cars.
    pub cars: Option<String>,
    pub color: Option<LineColor>,
    pub bikes: bool,
    pub delayed: bool,
    /// Fixed-width human-readable line.
    pub summary: String,
}

/// Absolute departure time for a departure `minutes` after `now`.
pub fn departs_at(now: DateTime<Utc>, minutes: u32) -> DateTime<Utc> {
    now + Duration::minutes(i64::from(minutes))
}

impl fmt::Display for DepartureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary)
    }
}
