//! Static station directory.
//!
//! Built once from an ordered list of `(zone, name)` pairs and immutable
//! afterwards, so a single [`Directory`] can be shared by reference across
//! every concurrent fetch. It answers three kinds of question:
//!
//! - which station does a user token mean ([`Directory::find_stations`]),
//! - which stations are in a fare zone ([`Directory::zone_stations`]),
//! - which way is one station from another ([`Directory::bearing`]).

mod aliases;
mod names;
mod reference;

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::domain::{Bearing, StationRecord};

pub use aliases::{AliasBook, AliasConfig};
pub use names::{KEY_PREFIX, build_url, display_name, form_name, normalize_key, title_case};
pub use reference::{DEFAULT_HOME, DEFAULT_HUBS, DEFAULT_MINE, DEFAULT_WORK, ZONED_STATIONS};

/// Station lookup by key, alias, zone and position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    /// Records in build order; `stations[i].index == i + 1`.
    stations: Vec<StationRecord>,
    /// Canonical key → position in `stations`.
    by_key: HashMap<String, usize>,
    /// Zone → alias → position in `stations`.
    zones: BTreeMap<u8, BTreeMap<String, usize>>,
}

impl Directory {
    /// Build a directory from `(zone, name)` pairs.
    ///
    /// Indices follow input order starting at 1. A name whose key was already
    /// seen keeps its original position and takes the later zone.
    pub fn new<S: AsRef<str>>(base: &str, data: &[(u8, S)]) -> Self {
        let mut entries: Vec<(u8, String, String)> = Vec::with_capacity(data.len());
        let mut seen: HashMap<String, usize> = HashMap::new();

        for (zone, alias) in data {
            let alias = alias.as_ref();
            let key = normalize_key(alias);
            match seen.get(&key) {
                Some(&pos) => {
                    debug!(%key, zone, "duplicate station in reference data");
                    entries[pos].0 = *zone;
                }
                None => {
                    seen.insert(key.clone(), entries.len());
                    entries.push((*zone, alias.to_string(), key));
                }
            }
        }

        let mut stations = Vec::with_capacity(entries.len());
        let mut zones: BTreeMap<u8, BTreeMap<String, usize>> = BTreeMap::new();
        for (pos, (zone, alias, key)) in entries.into_iter().enumerate() {
            zones.entry(zone).or_default().insert(alias.clone(), pos);
            let url = build_url(base, &key);
            stations.push(StationRecord {
                index: pos + 1,
                alias,
                zone,
                key,
                url,
            });
        }

        Self {
            stations,
            by_key: seen,
            zones,
        }
    }

    /// Directory of the bundled Caltrain stations.
    pub fn caltrain(base: &str) -> Self {
        Self::new(base, ZONED_STATIONS)
    }

    /// Number of stations.
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    /// Whether the directory has no stations.
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Station at a 1-based index.
    pub fn get(&self, index: usize) -> Option<&StationRecord> {
        index.checked_sub(1).and_then(|pos| self.stations.get(pos))
    }

    /// Stations in build order.
    pub fn iter(&self) -> impl Iterator<Item = &StationRecord> {
        self.stations.iter()
    }

    /// Resolve a single token.
    ///
    /// The token is tried as a canonical key first, then re-derived as a key
    /// with [`normalize_key`].
    pub fn find(&self, token: &str) -> Option<&StationRecord> {
        let pos = match self.by_key.get(token) {
            Some(pos) => Some(pos),
            None => self.by_key.get(&normalize_key(token)),
        };
        pos.map(|&pos| &self.stations[pos])
    }

    /// Resolve every token, keeping order and cardinality.
    ///
    /// Unresolved tokens produce `None`.
    pub fn find_stations<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<Option<&StationRecord>> {
        tokens.iter().map(|t| self.find(t.as_ref())).collect()
    }

    /// Resolve every token, substituting `absent` for unresolved ones.
    pub fn find_stations_or<'a, S: AsRef<str>>(
        &'a self,
        tokens: &[S],
        absent: &'a StationRecord,
    ) -> Vec<&'a StationRecord> {
        self.find_stations(tokens)
            .into_iter()
            .map(|found| found.unwrap_or(absent))
            .collect()
    }

    /// Stations in a fare zone, keyed by alias. Empty for unknown zones.
    pub fn zone_stations(&self, zone: u8) -> HashMap<&str, &StationRecord> {
        self.zones
            .get(&zone)
            .map(|bucket| {
                bucket
                    .iter()
                    .map(|(alias, &pos)| (alias.as_str(), &self.stations[pos]))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Zone numbers present, ascending.
    pub fn zones(&self) -> impl Iterator<Item = u8> + '_ {
        self.zones.keys().copied()
    }

    /// Direction of travel from station `from` to station `to`.
    ///
    /// Indices run north to south, so a smaller index is further north.
    pub fn bearing(&self, from: &str, to: &str) -> Bearing {
        match (self.find(from), self.find(to)) {
            (Some(lhs), Some(rhs)) if lhs.index == rhs.index => Bearing::Equal,
            (Some(lhs), Some(rhs)) if lhs.index < rhs.index => Bearing::South,
            (Some(_), Some(_)) => Bearing::North,
            _ => Bearing::Error,
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    const BASE: &str = "https://www.caltrain.com";

    proptest! {
        /// Bearing agrees with index order for every pair of stations.
        #[test]
        fn bearing_follows_index(a in 1..=ZONED_STATIONS.len(), b in 1..=ZONED_STATIONS.len()) {
            let dir = Directory::caltrain(BASE);
            let lhs = dir.get(a).unwrap();
            let rhs = dir.get(b).unwrap();
            let bearing = dir.bearing(&lhs.alias, &rhs.key);
            prop_assert_eq!(bearing == Bearing::North, lhs.index > rhs.index);
            prop_assert_eq!(bearing == Bearing::South, lhs.index < rhs.index);
            prop_assert_eq!(bearing == Bearing::Equal, lhs.index == rhs.index);
        }

        /// Resolution never fails and never changes the number of results.
        #[test]
        fn find_stations_is_total(tokens in proptest::collection::vec("[a-zA-Z -]{0,16}", 0..8)) {
            let dir = Directory::caltrain(BASE);
            let found = dir.find_stations(&tokens);
            prop_assert_eq!(found.len(), tokens.len());
        }

        /// Every record sits in exactly one zone bucket and under its own key.
        #[test]
        fn records_are_indexed_once(names in proptest::collection::vec(("[1-6]", "[a-z]{1,6}( [a-z]{1,6})?"), 0..12)) {
            let data: Vec<(u8, String)> = names
                .into_iter()
                .map(|(zone, name)| (zone.parse().unwrap(), name))
                .collect();
            let dir = Directory::new(BASE, &data);

            for (pos, station) in dir.iter().enumerate() {
                prop_assert_eq!(station.index, pos + 1);
                prop_assert_eq!(dir.find(&station.key), Some(station));
                let buckets = dir
                    .zones()
                    .filter(|z| dir.zone_stations(*z).values().any(|s| s.index == station.index))
                    .count();
                prop_assert_eq!(buckets, 1);
            }
            prop_assert_eq!(Directory::new(BASE, &data), dir);
        }
    }
}
