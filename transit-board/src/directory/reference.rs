//! Bundled Caltrain reference data.

/// Every station with a real-time page, as `(zone, name)`.
///
/// Ordered from the northernmost station (San Francisco) to the southernmost
/// (Gilroy). Directory indices, and therefore bearings, depend on this order.
pub const ZONED_STATIONS: &[(u8, &str)] = &[
    (1, "San Francisco"),
    (1, "22nd Street"),
    (1, "Bayshore"),
    (1, "South San Francisco"),
    (1, "San Bruno"),
    (2, "Millbrae"),
    (2, "Broadway"),
    (2, "Burlingame"),
    (2, "San Mateo"),
    (2, "Hayward Park"),
    (2, "Hillsdale"),
    (2, "Belmont"),
    (2, "San Carlos"),
    (2, "Redwood City"),
    (3, "Menlo Park"),
    (3, "Palo Alto"),
    // Stanford has no mobile page. The mobile site also shortens "California Avenue".
    (3, "California Ave"),
    (3, "San Antonio"),
    (3, "Mountain View"),
    (3, "Sunnyvale"),
    (4, "Lawrence"),
    (4, "Santa Clara"),
    (4, "College Park"),
    (4, "San Jose Diridon"),
    (4, "Tamien"),
    (5, "Capitol"),
    (5, "Blossom Hill"),
    (6, "Morgan Hill"),
    (6, "San Martin"),
    (6, "Gilroy"),
];

/// Default "home" station.
pub const DEFAULT_HOME: &str = "Belmont";

/// Default "work" station.
pub const DEFAULT_WORK: &str = "Hayward Park";

/// Baby Bullet stops.
pub const DEFAULT_HUBS: &[&str] = &[
    "san-francisco",
    "millbrae",
    "hillsdale",
    "redwood-city",
    "palo-alto",
    "mountain-view",
    "san-jose-diridon",
];

/// Default personal station list.
pub const DEFAULT_MINE: &[&str] = &["san-francisco", "belmont", "hayward-park", "palo-alto"];

/// Fixed single-station shortcuts.
pub const SHORTCUTS: &[(&str, &str)] = &[
    ("csco", "san-jose-diridon"),
    ("fair", "hillsdale"),
    ("mall", "hillsdale"),
    ("mv", "mountain-view"),
    ("pa", "palo-alto"),
    ("rwc", "redwood-city"),
    ("sf", "san-francisco"),
    ("sf22", "22nd-street"),
    ("sfo", "millbrae"),
    ("sjd", "san-jose-diridon"),
    ("san-jose", "san-jose-diridon"),
    ("south-sf", "south-san-francisco"),
];
