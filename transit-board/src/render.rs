//! Output lines for departures, stations and per-station warnings.
//!
//! Records go to stdout, one per line, either as their fixed-width summary
//! or as compact JSON. Warnings are plain text meant for stderr.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::board::{StationOutcome, StationReport};
use crate::domain::{DepartureRecord, StationRecord};
use crate::feed::Parser;

/// How records are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Fixed-width human lines.
    #[default]
    Text,
    /// One compact JSON object per line.
    Json,
}

impl OutputFormat {
    /// Interpret a loose setting such as an environment value.
    ///
    /// Only "json" selects JSON; anything else is text.
    pub fn from_setting(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => f.write_str("text"),
            OutputFormat::Json => f.write_str("json"),
        }
    }
}

/// Error returned for an output format name that is neither text nor json.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown output format {0:?}, expected text or json")]
pub struct UnknownFormat(pub String);

impl FromStr for OutputFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

fn line<T: Serialize + fmt::Display>(value: &T, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(value.to_string()),
        OutputFormat::Json => serde_json::to_string(value),
    }
}

/// One departure as a single output line.
pub fn render_departure(record: &DepartureRecord, format: OutputFormat) -> Result<String, serde_json::Error> {
    line(record, format)
}

/// One directory station as a single output line.
pub fn render_station(station: &StationRecord, format: OutputFormat) -> Result<String, serde_json::Error> {
    line(station, format)
}

/// Every departure from every report, in report order.
pub fn render_reports(
    reports: &[StationReport],
    format: OutputFormat,
) -> Result<Vec<String>, serde_json::Error> {
    reports
        .iter()
        .flat_map(|report| report.outcome.records())
        .map(|record| render_departure(record, format))
        .collect()
}

/// Warnings for one report, for stderr.
///
/// `service_start_minutes` is only used for an empty BART board, to say
/// when trains start running again.
pub fn warnings(report: &StationReport, parser: Parser, service_start_minutes: i64) -> Vec<String> {
    let url = report.browse_url.as_deref().unwrap_or("?");
    if report.is_empty_board() {
        return match parser {
            Parser::BartJson => vec![
                "Either you are offline, or BART isn't running; check URL:".to_string(),
                report.request_url.as_deref().unwrap_or(url).to_string(),
                format!("NOTE: weekday trains start at 5am, which is in {service_start_minutes} min"),
            ],
            Parser::FleetHtml => vec![format!("At {}? URL: {url}", report.display)],
            Parser::CaltrainHtml => vec![
                format!("No departures at {}", report.display),
                format!("Open in browser: {url}"),
            ],
        };
    }
    match &report.outcome {
        StationOutcome::Departures(_) => Vec::new(),
        StationOutcome::Failed(failure) => vec![failure.to_string(), format!("Open in browser: {url}")],
        StationOutcome::Unresolved(token) => vec![format!("unknown station {token:?}")],
        StationOutcome::Cancelled => vec![format!("{}: cancelled", report.display)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Direction, LineColor};
    use crate::feed::{FeedError, ParseFailure};
    use chrono::{DateTime, Utc};

    fn record() -> DepartureRecord {
        DepartureRecord {
            line: "YELLOW".into(),
            train: None,
            direction: Direction::North,
            minutes_until: 7,
            departs_at: DateTime::parse_from_rfc3339("2026-10-16T15:07:00Z")
                .unwrap()
                .with_timezone(&Utc),
            platform: Some("2".into()),
            origin: "Embarcadero".into(),
            destination: "Antioch".into(),
            cars: Some("10".into()),
            color: Some(LineColor::Named("yellow".into())),
            bikes: true,
            delayed: false,
            summary: "YELLOW  EMBR#2 North to ANTC in   7min".into(),
        }
    }

    fn report(outcome: StationOutcome) -> StationReport {
        StationReport {
            station_key: "EMBR".into(),
            display: "EMBR".into(),
            browse_url: Some("https://www.bart.gov/schedules/eta?stn=EMBR".into()),
            request_url: Some("https://api.bart.gov/api/etd.aspx?cmd=etd&orig=EMBR".into()),
            outcome,
        }
    }

    #[test]
    fn formats() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert!("yaml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::from_setting("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::from_setting("human"), OutputFormat::Text);
        assert_eq!(OutputFormat::from_setting(""), OutputFormat::Text);
    }

    #[test]
    fn text_is_the_summary() {
        let line = render_departure(&record(), OutputFormat::Text).unwrap();
        assert_eq!(line, "YELLOW  EMBR#2 North to ANTC in   7min");
    }

    #[test]
    fn json_is_compact() {
        let line = render_departure(&record(), OutputFormat::Json).unwrap();
        assert!(!line.contains('\n'));
        assert!(!line.contains(": "));

        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["line"], "YELLOW");
        assert_eq!(value["minutes_until"], 7);
        assert_eq!(value["direction"], "North");
        assert_eq!(value["departs_at"], "2026-10-16T15:07:00Z");
        assert_eq!(value["color"], "yellow");
        assert_eq!(value["train"], serde_json::Value::Null);
    }

    #[test]
    fn stations() {
        let station = StationRecord {
            index: 12,
            alias: "Belmont".into(),
            zone: 2,
            key: "CALT: Belmont Station".into(),
            url: "https://www.caltrain.com/schedules/realtime/stations/belmontstation-mobile.html"
                .into(),
        };
        assert_eq!(
            render_station(&station, OutputFormat::Text).unwrap(),
            "#12 CALT: Belmont Station (zone 2)"
        );
        let value: serde_json::Value =
            serde_json::from_str(&render_station(&station, OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(value["zone"], 2);
    }

    #[test]
    fn reports_flatten_in_order() {
        let mut second = record();
        second.summary = "second".into();
        let reports = vec![
            report(StationOutcome::Departures(vec![record()])),
            report(StationOutcome::Unresolved("x".into())),
            report(StationOutcome::Departures(vec![second])),
        ];
        let lines = render_reports(&reports, OutputFormat::Text).unwrap();
        assert_eq!(lines, vec!["YELLOW  EMBR#2 North to ANTC in   7min", "second"]);
    }

    #[test]
    fn warning_lines() {
        let full = report(StationOutcome::Departures(vec![record()]));
        assert!(warnings(&full, Parser::BartJson, 0).is_empty());

        let empty = report(StationOutcome::Departures(vec![]));
        let lines = warnings(&empty, Parser::BartJson, 95);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "https://api.bart.gov/api/etd.aspx?cmd=etd&orig=EMBR");
        assert_eq!(lines[2], "NOTE: weekday trains start at 5am, which is in 95 min");
        assert_eq!(
            warnings(&empty, Parser::FleetHtml, 0),
            vec!["At EMBR? URL: https://www.bart.gov/schedules/eta?stn=EMBR"]
        );

        let failed = report(StationOutcome::Failed(ParseFailure::new(
            "EMBR",
            FeedError::Decode("eof".into()),
        )));
        assert_eq!(
            warnings(&failed, Parser::BartJson, 0)[0],
            "at EMBR: could not decode payload: eof"
        );

        let unresolved = report(StationOutcome::Unresolved("atlantis".into()));
        assert_eq!(
            warnings(&unresolved, Parser::CaltrainHtml, 0),
            vec!["unknown station \"atlantis\""]
        );
    }
}
