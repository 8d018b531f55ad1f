//! Caltrain real-time station pages (scraped HTML).
//!
//! A station page holds one outer trains table. Its header row names the
//! directions, and each direction has a sub-table of
//! `(train number, service type, "N min.")` rows. When the site has nothing
//! to show it omits the table and writes a message into the station
//! selector instead.

use scraper::Html;
use tracing::warn;

use crate::config::FeedConfig;
use crate::directory::{form_name, title_case};
use crate::domain::{DepartureRecord, Direction, StationRecord, departs_at, is_reportable};

use super::client::FeedRequest;
use super::error::FeedError;
use super::html::{own_text, selector, text_of};
use super::parser::StationContext;

const TRAINS_TABLE: &str = "table.ipf-caltrain-table-trains";
const STATION_SELECTOR: &str = "div.ipf-caltrain-stationselector";
const DIRECTION_ROW: &str = "tr.ipf-st-ip-trains-table-dir-tr";
const DIRECTION_LABEL: &str = "div";
const SUBTABLE: &str = "table.ipf-st-ip-trains-subtable";
const SUBTABLE_ROW: &str = "tr.ipf-st-ip-trains-subtable-tr";
const CELL: &str = "td";

const ETA_SUFFIX: &str = " min.";

/// Prefix of every diagnostic taken from the page itself.
pub const ERROR_PREFIX: &str = "Caltrain page: ";

/// Upstream diagnostics are cut to this many characters.
const MAX_ERROR_CHARS: usize = 50;

const NO_MESSAGE: &str = "did not report a specific error message";
const NO_DIRECTIONS: &str = "Caltrain real-time reporting error";

/// The site serves the mobile pages to old desktop browsers only.
const LEGACY_USER_AGENT: &str = "Mozilla/5.0 (compatible; MSIE 9.0; Windows NT 6.1; Trident/5.0)";

/// Page for a directory station.
pub fn page_request(station: &StationRecord) -> FeedRequest {
    FeedRequest::get(station.url.clone())
        .with_header("Accept", "text/html,application/xhtml+xml,application/xml")
        .with_header("User-Agent", LEGACY_USER_AGENT)
}

/// Form POST used by mirrors of the older single-page site.
pub fn post_request(config: &FeedConfig, station_name: &str) -> FeedRequest {
    let name = form_name(station_name);
    FeedRequest::post_form(
        format!("{}/main.html", config.caltrain_url),
        vec![
            ("__CALLBACKID".to_string(), "ctl09".to_string()),
            ("__CALLBACKPARAM".to_string(), format!("refreshStation={name}")),
            ("__VIEWSTATE".to_string(), String::new()),
            ("ipf-st-ip-station".to_string(), name),
        ],
    )
}

/// One row of a direction sub-table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainRow {
    pub number: String,
    pub kind: String,
    pub eta: String,
}

/// Rows for one direction, labelled as the page labels them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectionRows {
    /// Title-cased, at most five characters ("North", "South").
    pub label: String,
    pub rows: Vec<TrainRow>,
}

/// Diagnostic text from the station selector, for pages without a table.
fn page_error(doc: &Html) -> Result<String, FeedError> {
    let div = doc.select(&selector(STATION_SELECTOR)?).next();
    let message = div
        .map(|div| {
            own_text(div)
                .into_iter()
                .filter(|s| !s.is_empty() && !s.starts_with('<'))
                .collect::<Vec<_>>()
                .join("; ")
        })
        .unwrap_or_default();
    let message: String = message.chars().take(MAX_ERROR_CHARS).collect();
    if message.is_empty() {
        Ok(format!("{ERROR_PREFIX}{NO_MESSAGE}"))
    } else {
        Ok(format!("{ERROR_PREFIX}{message}"))
    }
}

/// Pull the raw direction tables out of a station page.
pub fn extract_tables(body: &str) -> Result<Vec<DirectionRows>, FeedError> {
    let doc = Html::parse_document(body);
    let Some(table) = doc.select(&selector(TRAINS_TABLE)?).next() else {
        return Err(FeedError::StructuralMismatch(page_error(&doc)?));
    };

    let label_sel = selector(DIRECTION_LABEL)?;
    let labels: Vec<String> = match table.select(&selector(DIRECTION_ROW)?).next() {
        Some(head) => head
            .select(&label_sel)
            .map(|div| title_case(text_of(div).trim()).chars().take(5).collect())
            .collect(),
        None => Vec::new(),
    };

    let row_sel = selector(SUBTABLE_ROW)?;
    let cell_sel = selector(CELL)?;
    let subtable_sel = selector(SUBTABLE)?;
    let subtables = table.select(&subtable_sel);

    Ok(labels
        .into_iter()
        .zip(subtables)
        .map(|(label, sub)| {
            let rows = sub
                .select(&row_sel)
                .filter_map(|tr| {
                    let mut cells = tr.select(&cell_sel).map(|td| text_of(td).trim().to_string());
                    Some(TrainRow {
                        number: cells.next()?,
                        kind: cells.next()?,
                        eta: cells.next()?,
                    })
                })
                .collect();
            DirectionRows { label, rows }
        })
        .collect())
}

fn parse_eta(eta: &str) -> Option<u32> {
    eta.replace(ETA_SUFFIX, "").trim().parse().ok()
}

/// Parse a station page into departures.
pub fn parse_page(body: &str, ctx: &StationContext) -> Result<Vec<DepartureRecord>, FeedError> {
    let tables = extract_tables(body)?;
    if tables.is_empty() {
        return Err(FeedError::StructuralMismatch(NO_DIRECTIONS.to_string()));
    }

    let mut records = Vec::new();
    for table in &tables {
        let direction = Direction::from_label(&table.label);
        for row in &table.rows {
            let Some(minutes) = parse_eta(&row.eta) else {
                warn!(station = %ctx.station_key, eta = %row.eta, "skipping row with unreadable eta");
                continue;
            };
            if !is_reportable(minutes) {
                continue;
            }

            let summary = format!(
                "Caltrain #{} {} {:<11} in {minutes:>3} min at {}",
                row.number, table.label, row.kind, ctx.station_key
            );
            records.push(DepartureRecord {
                line: row.kind.clone(),
                train: Some(row.number.clone()),
                direction,
                minutes_until: minutes,
                departs_at: departs_at(ctx.now, minutes),
                platform: None,
                origin: ctx.name.clone(),
                destination: format!("{}bound", table.label),
                cars: None,
                color: None,
                bikes: false,
                delayed: false,
                summary,
            });
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    const TABLE: &str = include_str!("../../data/fixtures/caltrain_table.html");
    const ERROR: &str = include_str!("../../data/fixtures/caltrain_error.html");

    fn ctx() -> StationContext {
        let now = DateTime::parse_from_rfc3339("2026-10-16T15:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        StationContext::new("CALT: Belmont Station", "Belmont", now)
    }

    #[test]
    fn extracts_both_directions() {
        let tables = extract_tables(TABLE).unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].label, "North");
        assert_eq!(tables[1].label, "South");
        assert_eq!(
            tables[0].rows[0],
            TrainRow {
                number: "123".into(),
                kind: "Local".into(),
                eta: "1 min.".into(),
            }
        );
        assert_eq!(tables[0].rows.len(), 3);
        assert_eq!(tables[1].rows.len(), 1);
    }

    #[test]
    fn filters_departing_trains() {
        let records = parse_page(TABLE, &ctx()).unwrap();
        // 123 leaves in one minute; the "--" row is unreadable.
        assert_eq!(records.len(), 2);

        let express = &records[0];
        assert_eq!(express.train.as_deref(), Some("124"));
        assert_eq!(express.line, "Express");
        assert_eq!(express.minutes_until, 5);
        assert_eq!(express.direction, Direction::North);
        assert_eq!(express.destination, "Northbound");
        assert_eq!(express.origin, "Belmont");
        assert_eq!(express.departs_at.to_rfc3339(), "2026-10-16T15:05:00+00:00");
        assert_eq!(
            express.summary,
            "Caltrain #124 North Express     in   5 min at CALT: Belmont Station"
        );

        let bullet = &records[1];
        assert_eq!(bullet.direction, Direction::South);
        assert_eq!(bullet.minutes_until, 12);
        assert_eq!(bullet.line, "Baby Bullet");
    }

    #[test]
    fn rows_share_one_instant() {
        let records = parse_page(TABLE, &ctx()).unwrap();
        for record in &records {
            let elapsed = record.departs_at - ctx().now;
            assert_eq!(elapsed.num_minutes(), i64::from(record.minutes_until));
        }
    }

    #[test]
    fn page_error_is_reported() {
        let err = parse_page(ERROR, &ctx()).unwrap_err();
        assert_eq!(
            err,
            FeedError::StructuralMismatch("Caltrain page: Station temporarily unavailable".into())
        );
    }

    #[test]
    fn long_page_error_is_truncated() {
        let long = "x".repeat(80);
        let body = format!(
            r#"<div class="ipf-caltrain-stationselector">{long}<select><option>a</option></select></div>"#
        );
        let FeedError::StructuralMismatch(reason) = parse_page(&body, &ctx()).unwrap_err() else {
            panic!("expected a structural mismatch");
        };
        assert_eq!(reason, format!("{ERROR_PREFIX}{}", "x".repeat(50)));
    }

    #[test]
    fn missing_everything_uses_fallback() {
        let err = parse_page("<html><body><p>hello</p></body></html>", &ctx()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Caltrain page: did not report a specific error message"
        );
    }

    #[test]
    fn table_without_directions() {
        let body = r#"<table class="ipf-caltrain-table-trains"><tr><td>nothing</td></tr></table>"#;
        let err = parse_page(body, &ctx()).unwrap_err();
        assert_eq!(err.to_string(), "Caltrain real-time reporting error");
    }

    #[test]
    fn scenario_rows() {
        let body = r#"<table class="ipf-caltrain-table-trains">
            <tr class="ipf-st-ip-trains-table-dir-tr"><td><div>SOUTHBOUND</div></td></tr>
            <tr><td><table class="ipf-st-ip-trains-subtable">
                <tr class="ipf-st-ip-trains-subtable-tr"><td>123</td><td>Local</td><td>1 min.</td></tr>
            </table></td></tr></table>"#;
        assert!(parse_page(body, &ctx()).unwrap().is_empty());

        let body = body.replace("123", "124").replace("Local", "Express").replace("1 min.", "5 min.");
        let records = parse_page(&body, &ctx()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].minutes_until, 5);
    }

    #[test]
    fn requests() {
        let station = StationRecord {
            index: 12,
            alias: "Belmont".into(),
            zone: 2,
            key: "CALT: Belmont Station".into(),
            url: "https://www.caltrain.com/schedules/realtime/stations/belmontstation-mobile.html"
                .into(),
        };
        let request = page_request(&station);
        assert_eq!(request.url, station.url);
        assert!(request.headers.iter().any(|(k, v)| k == "User-Agent" && v.contains("MSIE 9.0")));

        let request = post_request(&FeedConfig::default(), "san carlos");
        assert_eq!(request.url, "https://www.caltrain.com/main.html");
        assert!(request
            .form
            .contains(&("__CALLBACKPARAM".to_string(), "refreshStation=San Carlos".to_string())));
        assert!(request
            .form
            .contains(&("ipf-st-ip-station".to_string(), "San Carlos".to_string())));

        let request = post_request(&FeedConfig::default(), "South San Francisco");
        assert!(request.form.contains(&(
            "__CALLBACKPARAM".to_string(),
            "refreshStation=So San Francisco".to_string()
        )));
        assert!(request
            .form
            .contains(&("ipf-st-ip-station".to_string(), "So San Francisco".to_string())));
    }
}
