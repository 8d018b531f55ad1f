//! Dispatch from a payload to the parser for its source.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::DepartureRecord;

use super::client::RawPayload;
use super::error::{FeedError, ParseFailure};
use super::{bart, caltrain, fleet};

/// What a parser needs to know about the station a payload came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationContext {
    /// Canonical key (Caltrain) or abbreviation (BART).
    pub station_key: String,
    /// Name shown to people.
    pub name: String,
    /// Parse instant. Every record from one payload is timed against it.
    pub now: DateTime<Utc>,
}

impl StationContext {
    pub fn new(station_key: impl Into<String>, name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            station_key: station_key.into(),
            name: name.into(),
            now,
        }
    }

    /// Context timed at the current instant.
    pub fn current(station_key: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(station_key, name, Utc::now())
    }
}

/// The upstream format of a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Parser {
    /// BART estimate API.
    BartJson,
    /// Caltrain station page.
    CaltrainHtml,
    /// BART fleet-lookup route page.
    FleetHtml,
}

impl Parser {
    pub const ALL: [Parser; 3] = [Parser::BartJson, Parser::CaltrainHtml, Parser::FleetHtml];

    pub fn as_str(&self) -> &'static str {
        match self {
            Parser::BartJson => "bart",
            Parser::CaltrainHtml => "caltrain",
            Parser::FleetHtml => "fleet",
        }
    }

    /// Turn a payload body into departures.
    pub fn parse(&self, body: &str, ctx: &StationContext) -> Result<Vec<DepartureRecord>, FeedError> {
        match self {
            Parser::BartJson => bart::parse_etd(body, ctx),
            Parser::CaltrainHtml => caltrain::parse_page(body, ctx),
            Parser::FleetHtml => fleet::parse_route(body, ctx),
        }
    }

    /// Like [`Parser::parse`], with the failure tied to the station.
    pub fn parse_payload(
        &self,
        payload: &RawPayload,
        ctx: &StationContext,
    ) -> Result<Vec<DepartureRecord>, ParseFailure> {
        self.parse(&payload.body, ctx)
            .map_err(|e| ParseFailure::new(ctx.station_key.clone(), e))
    }
}

impl fmt::Display for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a parser name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown feed kind {0:?}, expected one of: bart, caltrain, fleet")]
pub struct UnknownParser(pub String);

impl FromStr for Parser {
    type Err = UnknownParser;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parser::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownParser(s.to_string()))
    }
}
