//! BART fleet-lookup pages (scraped HTML).
//!
//! The route page marks trains from the newer fleet with an
//! `img.rtd-fof-icon`. Everything else about a departure is recovered by
//! walking up from that marker:
//!
//! - two levels up is the estimate itself (minutes, cars, line color),
//! - two more is the destination block (`span.train-line`),
//! - two more is the platform block (`h3.title`, "Platform N").

use scraper::{ElementRef, Html};
use tracing::{debug, warn};

use crate::config::FeedConfig;
use crate::domain::{DepartureRecord, Direction, LineColor, departs_at, is_reportable};

use super::client::FeedRequest;
use super::error::FeedError;
use super::html::{ancestor, collapsed_text, selector, text_of};
use super::parser::StationContext;

const MARKER: &str = "img.rtd-fof-icon";
const DESTINATION: &str = "span.train-line";
const PLATFORM: &str = "h3.title";
const ROUTE_COLOR: &str = "span.route-spacer";

/// Levels between a marker and its estimate, and between each block above.
const HOP: usize = 2;

const LEAVING: &str = "Leaving";
const PLATFORM_PREFIX: &str = "Platform ";

/// Route page for one station abbreviation.
pub fn route_request(config: &FeedConfig, abbr: &str) -> FeedRequest {
    FeedRequest::get(format!("{}/bart/api/rte/{abbr}/1/1", config.bart_web_url))
}

/// The page a person would open to see the same board.
pub fn browse_url(config: &FeedConfig, abbr: &str) -> String {
    format!("{}/schedules/eta?stn={abbr}", config.bart_web_url)
}

fn first_text(scope: ElementRef<'_>, css: &str) -> Result<Option<String>, FeedError> {
    Ok(scope
        .select(&selector(css)?)
        .next()
        .map(|el| text_of(el).trim().to_string()))
}

/// Cars from an estimate such as "5 min 8 car".
fn cars_in(raw: &str) -> Option<String> {
    let tokens: Vec<&str> = raw.split(' ').collect();
    tokens
        .windows(2)
        .find(|pair| pair[1].starts_with("car"))
        .map(|pair| pair[0].to_string())
}

/// Parse a route page into departures of marked trains.
///
/// A marker whose surrounding markup is incomplete is skipped with a
/// warning rather than failing the whole page.
pub fn parse_route(body: &str, ctx: &StationContext) -> Result<Vec<DepartureRecord>, FeedError> {
    let doc = Html::parse_document(body);
    let abbr = ctx.station_key.as_str();
    let color_sel = selector(ROUTE_COLOR)?;

    let mut records = Vec::new();
    for marker in doc.select(&selector(MARKER)?) {
        let Some(estimate) = ancestor(marker, HOP) else {
            warn!(station = %abbr, "fleet marker without an estimate");
            continue;
        };
        let raw = collapsed_text(estimate);
        if raw.starts_with(LEAVING) {
            continue;
        }

        let leaves = raw.split(' ').next().unwrap_or_default();
        let Ok(minutes) = leaves.parse::<u32>() else {
            warn!(station = %abbr, estimate = %raw, "skipping estimate with unreadable minutes");
            continue;
        };
        if !is_reportable(minutes) {
            continue;
        }

        let destination_block = ancestor(estimate, HOP);
        let platform_block = destination_block.and_then(|block| ancestor(block, HOP));
        let (Some(destination_block), Some(platform_block)) = (destination_block, platform_block)
        else {
            warn!(station = %abbr, estimate = %raw, "fleet estimate outside a platform block");
            continue;
        };

        let location = first_text(destination_block, DESTINATION)?.unwrap_or_default();
        let platform = first_text(platform_block, PLATFORM)?.map(|title| {
            title
                .strip_prefix(PLATFORM_PREFIX)
                .unwrap_or(&title)
                .to_string()
        });
        let color = estimate
            .select(&color_sel)
            .next()
            .and_then(|span| span.value().attr("alt"))
            .unwrap_or("?")
            .to_string();

        let summary = format!(
            "at {abbr}#{} to {location:<20} in {minutes:>3} min: {color:>11} train (new)",
            platform.as_deref().unwrap_or("?")
        );
        debug!(station = %abbr, %summary, "fleet departure");

        records.push(DepartureRecord {
            line: color.clone(),
            train: None,
            direction: Direction::Unknown,
            minutes_until: minutes,
            departs_at: departs_at(ctx.now, minutes),
            platform,
            origin: ctx.name.clone(),
            destination: location,
            cars: cars_in(&raw),
            color: Some(LineColor::from_line(&color)),
            bikes: false,
            delayed: false,
            summary,
        });
    }

    Ok(records)
}
