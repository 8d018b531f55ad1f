//! Station identity types.

use std::fmt;

use serde::Serialize;

/// One station known to the [`Directory`](crate::directory::Directory).
///
/// Records are created once, when the directory is built, and never change
/// afterwards. The `index` is the 1-based position in build order, which for
/// the bundled reference data runs from the northernmost station southwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct StationRecord {
    /// 1-based position in directory build order.
    pub index: usize,
    /// Name as it appears in the reference data (e.g. "Hayward Park").
    pub alias: String,
    /// Fare zone number.
    pub zone: u8,
    /// Canonical key (e.g. "CALT: Hayward Park Station").
    pub key: String,
    /// Real-time page for this station.
    pub url: String,
}

impl StationRecord {
    /// Short human name derived from the canonical key.
    pub fn display_name(&self) -> &str {
        crate::directory::display_name(&self.key)
    }
}

impl fmt::Display for StationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} (zone {})", self.index, self.key, self.zone)
    }
}

/// Relative direction of travel between two stations on the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Bearing {
    North,
    South,
    /// Both tokens name the same station.
    Equal,
    /// At least one token did not resolve.
    Error,
}

impl Bearing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bearing::North => "North",
            Bearing::South => "South",
            Bearing::Equal => "Equal",
            Bearing::Error => "Error",
        }
    }
}

impl fmt::Display for Bearing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
