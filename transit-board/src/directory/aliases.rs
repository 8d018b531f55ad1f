//! Named station groups such as "home", "work" and "hubs".

use std::collections::HashMap;

use super::reference::{DEFAULT_HOME, DEFAULT_HUBS, DEFAULT_MINE, DEFAULT_WORK, SHORTCUTS};

/// User-configurable station roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasConfig {
    /// Station closest to home.
    pub home: String,
    /// Station closest to work.
    pub work: String,
    /// Stations listed under "hubs".
    pub hubs: Vec<String>,
    /// Stations listed under "mine".
    pub mine: Vec<String>,
}

impl Default for AliasConfig {
    fn default() -> Self {
        Self {
            home: DEFAULT_HOME.to_string(),
            work: DEFAULT_WORK.to_string(),
            hubs: DEFAULT_HUBS.iter().map(|s| s.to_string()).collect(),
            mine: DEFAULT_MINE.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl AliasConfig {
    pub fn with_home(mut self, home: impl Into<String>) -> Self {
        self.home = home.into();
        self
    }

    pub fn with_work(mut self, work: impl Into<String>) -> Self {
        self.work = work.into();
        self
    }

    pub fn with_hubs(mut self, hubs: Vec<String>) -> Self {
        self.hubs = hubs;
        self
    }

    pub fn with_mine(mut self, mine: Vec<String>) -> Self {
        self.mine = mine;
        self
    }
}

/// Expands group names into station tokens.
///
/// Tokens that are not group names expand to themselves, so the output of
/// [`AliasBook::expand`] can always be handed to
/// [`Directory::find_stations`](super::Directory::find_stations).
#[derive(Debug, Clone)]
pub struct AliasBook {
    groups: HashMap<String, Vec<String>>,
}

impl AliasBook {
    pub fn new(config: &AliasConfig) -> Self {
        let mut groups: HashMap<String, Vec<String>> = HashMap::new();
        groups.insert("home".into(), vec![config.home.clone()]);
        groups.insert("work".into(), vec![config.work.clone()]);
        groups.insert("both".into(), vec![config.home.clone(), config.work.clone()]);
        groups.insert("hubs".into(), config.hubs.clone());
        groups.insert("mine".into(), config.mine.clone());
        for (name, station) in SHORTCUTS {
            groups.insert((*name).to_string(), vec![(*station).to_string()]);
        }
        Self { groups }
    }

    /// Expand one token.
    pub fn expand(&self, token: &str) -> Vec<String> {
        match self.groups.get(token) {
            Some(stations) => stations.clone(),
            None => vec![token.to_string()],
        }
    }

    /// Expand every token, keeping order.
    pub fn expand_all<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<String> {
        tokens
            .iter()
            .flat_map(|t| self.expand(t.as_ref()))
            .collect()
    }
}

impl Default for AliasBook {
    fn default() -> Self {
        Self::new(&AliasConfig::default())
    }
}
