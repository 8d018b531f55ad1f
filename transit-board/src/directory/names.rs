//! Station key and URL derivation.
//!
//! A display name such as "hayward-park" becomes the canonical key
//! "CALT: Hayward Park Station", and a key becomes the URL of the station's
//! real-time page. Both are pure functions of their inputs.

/// Decoration at the start of every canonical key.
pub const KEY_PREFIX: &str = "CALT: ";

/// Suffix word for ordinary stations.
const DEFAULT_SUFFIX: &str = "Station";

/// Stations whose upstream page uses a different suffix word.
///
/// Matched against the raw name without regard to ASCII case.
const SUFFIX_EXCEPTIONS: &[(&str, &str)] = &[("Millbrae", "Transit Center")];

/// Stations the form-based site knows by a shorter name.
const FORM_NAME_EXCEPTIONS: &[(&str, &str)] = &[
    ("South San Francisco", "So San Francisco"),
    ("California Avenue", "California Ave"),
];

/// Path under the site base that holds station pages.
const STATIONS_PATH: &str = "/schedules/realtime/stations/";

/// Appended to the flattened key to form the page name.
const PAGE_SUFFIX: &str = "-mobile.html";

/// Upper-case the first letter of every word and lower-case the rest.
///
/// A letter starts a word when it is not preceded by a letter or digit,
/// so "22ND STREET" becomes "22nd Street".
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if in_word {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        in_word = c.is_alphanumeric();
    }
    out
}

fn suffix_for(name: &str) -> &'static str {
    SUFFIX_EXCEPTIONS
        .iter()
        .find(|(exception, _)| exception.eq_ignore_ascii_case(name))
        .map(|(_, suffix)| *suffix)
        .unwrap_or(DEFAULT_SUFFIX)
}

/// Name the form-based site expects in its station field.
pub fn form_name(name: &str) -> String {
    let name = title_case(&name.replace('-', " "));
    FORM_NAME_EXCEPTIONS
        .iter()
        .find(|(full, _)| *full == name)
        .map_or(name.clone(), |(_, short)| (*short).to_string())
}

/// Derive the canonical key for a station name or slug.
///
/// ```
/// use transit_board::directory::normalize_key;
///
/// assert_eq!(normalize_key("belmont"), "CALT: Belmont Station");
/// assert_eq!(normalize_key("hayward-park"), "CALT: Hayward Park Station");
/// assert_eq!(normalize_key("Millbrae"), "CALT: Millbrae Transit Center");
/// ```
pub fn normalize_key(name: &str) -> String {
    let words = title_case(&name.replace('-', " "));
    format!("{KEY_PREFIX}{words} {}", suffix_for(name))
}

/// URL of the real-time page for a canonical key.
///
/// The page name is the key without its prefix, with all whitespace removed,
/// lower-cased.
pub fn build_url(base: &str, key: &str) -> String {
    let bare = key.strip_prefix(KEY_PREFIX).unwrap_or(key);
    let page: String = bare
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    format!(
        "{}{STATIONS_PATH}{page}{PAGE_SUFFIX}",
        base.trim_end_matches('/')
    )
}

/// Short name for a canonical key: no prefix, no suffix word.
pub fn display_name(key: &str) -> &str {
    let bare = key.strip_prefix(KEY_PREFIX).unwrap_or(key);
    let suffixes = std::iter::once(DEFAULT_SUFFIX).chain(SUFFIX_EXCEPTIONS.iter().map(|(_, s)| *s));
    for suffix in suffixes {
        if let Some(name) = bare.strip_suffix(suffix) {
            return name.trim_end();
        }
    }
    bare.trim()
}
