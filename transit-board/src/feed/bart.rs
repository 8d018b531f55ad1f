//! BART real-time departure API (JSON).
//!
//! The estimate endpoint answers with `root.station[].etd[].estimate[]`:
//! one entry per origin station, one `etd` per destination, one estimate per
//! upcoming train. Every field arrives as a string and most may be missing,
//! so the DTOs use `Option` throughout and defaults for lists.

use chrono::{Duration, NaiveDateTime, Timelike};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::config::FeedConfig;
use crate::domain::{DepartureRecord, Direction, LineColor, departs_at, is_reportable};

use super::client::FeedRequest;
use super::error::FeedError;
use super::parser::StationContext;

/// Pseudo-station meaning "every station".
pub const ALL_STATIONS: &str = "ALL";

/// Hour (local time) at which weekday service starts.
const SERVICE_START_HOUR: u32 = 5;

/// Top-level estimate response.
#[derive(Debug, Clone, Deserialize)]
pub struct EtdResponse {
    pub root: Option<EtdRoot>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EtdRoot {
    #[serde(default)]
    pub station: Vec<EtdStation>,
    /// Either an empty string or an object that may hold `error`.
    #[serde(default)]
    pub message: Value,
}

/// Departures from one origin station.
#[derive(Debug, Clone, Deserialize)]
pub struct EtdStation {
    pub name: Option<String>,
    pub abbr: Option<String>,
    pub limited: Option<String>,
    #[serde(default)]
    pub etd: Vec<Etd>,
}

/// Trains heading to one destination.
#[derive(Debug, Clone, Deserialize)]
pub struct Etd {
    pub destination: Option<String>,
    pub abbreviation: Option<String>,
    pub limited: Option<String>,
    #[serde(default)]
    pub estimate: Vec<Estimate>,
}

/// A single upcoming train.
#[derive(Debug, Clone, Deserialize)]
pub struct Estimate {
    /// Whole minutes, or "Leaving".
    pub minutes: Option<String>,
    pub platform: Option<String>,
    /// "North" or "South".
    pub direction: Option<String>,
    /// Number of cars.
    pub length: Option<String>,
    /// Line name, e.g. "YELLOW".
    pub color: Option<String>,
    /// Line color as `#rrggbb`.
    pub hexcolor: Option<String>,
    pub bikeflag: Option<String>,
    /// Delay in seconds; "0" when on time.
    pub delay: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct StationsResponse {
    root: Option<StationsRoot>,
}

#[derive(Debug, Clone, Deserialize)]
struct StationsRoot {
    stations: Option<StationList>,
}

#[derive(Debug, Clone, Deserialize)]
struct StationList {
    #[serde(default)]
    station: Vec<StationEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct StationEntry {
    abbr: Option<String>,
}

/// Estimates for one station (or [`ALL_STATIONS`]).
pub fn etd_request(config: &FeedConfig, abbr: &str) -> FeedRequest {
    FeedRequest::get(format!(
        "{}/api/etd.aspx?cmd=etd&json=y&key={}&orig={}",
        config.bart_api_url,
        config.bart_key,
        abbr.to_uppercase()
    ))
}

/// The list of every station.
pub fn stations_request(config: &FeedConfig) -> FeedRequest {
    FeedRequest::get(format!(
        "{}/api/stn.aspx?cmd=stns&json=y&key={}",
        config.bart_api_url, config.bart_key
    ))
}

/// Minutes until a departure string, with "Leaving" meaning zero.
fn parse_minutes(raw: Option<&str>) -> Option<u32> {
    match raw.map(str::trim) {
        None => Some(0),
        Some(s) if s.eq_ignore_ascii_case("leaving") => Some(0),
        Some(s) => s.parse().ok(),
    }
}

/// Error text from `root.message.error`, if the API reported one.
fn api_error(message: &Value) -> Option<String> {
    let error = message.get("error")?;
    let text = error.get("text").and_then(Value::as_str)?;
    match error.get("details").and_then(Value::as_str) {
        Some(details) if !details.is_empty() => Some(format!("{text} ({details})")),
        _ => Some(text.to_string()),
    }
}

fn flag(value: Option<&String>) -> bool {
    value.map(String::as_str) == Some("1")
}

/// Parse an estimate response into departures.
///
/// Stations and estimates with nothing reportable simply contribute no
/// records. Estimates with unreadable minutes are skipped with a warning.
pub fn parse_etd(body: &str, ctx: &StationContext) -> Result<Vec<DepartureRecord>, FeedError> {
    let response: EtdResponse =
        serde_json::from_str(body).map_err(|e| FeedError::Decode(e.to_string()))?;
    let root = response
        .root
        .ok_or_else(|| FeedError::StructuralMismatch("BART response has no root".to_string()))?;

    if root.station.is_empty() {
        if let Some(text) = api_error(&root.message) {
            return Err(FeedError::StructuralMismatch(format!("BART API: {text}")));
        }
    }

    let mut records = Vec::new();
    for station in &root.station {
        let source = station.abbr.as_deref().unwrap_or(&ctx.station_key);
        let origin = station.name.as_deref().unwrap_or("?");

        for etd in &station.etd {
            let target = etd.abbreviation.as_deref().unwrap_or("?");
            let destination = etd.destination.as_deref().unwrap_or("?");
            let limited = flag(station.limited.as_ref()) || flag(etd.limited.as_ref());

            for estimate in &etd.estimate {
                let Some(minutes) = parse_minutes(estimate.minutes.as_deref()) else {
                    warn!(
                        station = %source,
                        minutes = ?estimate.minutes,
                        "skipping estimate with unreadable minutes"
                    );
                    continue;
                };
                if !is_reportable(minutes) {
                    continue;
                }

                let line = estimate.color.as_deref().unwrap_or("?");
                let platform = estimate.platform.as_deref().unwrap_or("?");
                let direction = Direction::from_label(estimate.direction.as_deref().unwrap_or(""));

                let mut summary = format!(
                    "{line:<7} {source}#{platform} {direction:<5} to {target:<4} in {minutes:>3}min"
                );
                if limited {
                    summary.push_str(" (limited)");
                }

                records.push(DepartureRecord {
                    line: line.to_string(),
                    train: None,
                    direction,
                    minutes_until: minutes,
                    departs_at: departs_at(ctx.now, minutes),
                    platform: estimate.platform.clone(),
                    origin: origin.to_string(),
                    destination: destination.to_string(),
                    cars: estimate.length.clone(),
                    color: Some(LineColor::resolve(line, estimate.hexcolor.as_deref())),
                    bikes: flag(estimate.bikeflag.as_ref()),
                    delayed: estimate.delay.as_deref().is_some_and(|d| d.trim() != "0"),
                    summary,
                });
            }
        }
    }

    Ok(records)
}

/// Parse the station list into abbreviations.
pub fn parse_station_list(body: &str) -> Result<Vec<String>, FeedError> {
    let response: StationsResponse =
        serde_json::from_str(body).map_err(|e| FeedError::Decode(e.to_string()))?;
    let list = response
        .root
        .and_then(|root| root.stations)
        .ok_or_else(|| FeedError::StructuralMismatch("BART station list is missing".to_string()))?;

    Ok(list
        .station
        .into_iter()
        .filter_map(|s| s.abbr)
        .filter(|abbr| !abbr.is_empty())
        .collect())
}

/// Minutes from `now` until the next 05:00, local time.
///
/// Used to tell the user when trains start again after an empty board.
pub fn minutes_until_service_start(now: NaiveDateTime) -> i64 {
    let start = (now + Duration::days(1))
        .with_hour(SERVICE_START_HOUR)
        .and_then(|t| t.with_minute(0));
    match start {
        Some(start) => (start - now).num_minutes().rem_euclid(24 * 60),
        None => 0,
    }
}
