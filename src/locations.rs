//! Fixed lookup tables shared by the pipeline, the renderer and the controls.

/// Zones that get a table, in display order.
pub const DISPLAY_LOCATIONS: [&str; 8] = [
    "Zephyr Town (West)",
    "Zephyr Town (Middle)",
    "Zephyr Town (East)",
    "Mountains (Base)",
    "Mountains (Middle)",
    "Mountains (Peak)",
    "Equestrian Park",
    "Bazaar",
];

pub const SEASONS: [&str; 4] = ["spring", "summer", "autumn", "winter"];

pub const WEATHERS: [&str; 4] = ["sunny", "cloudy", "rainy", "snowy"];

pub fn is_display_location(location: &str) -> bool {
    DISPLAY_LOCATIONS.contains(&location)
}

/// Ascending rank used as the tie-break after weight. Unknown or missing
/// sizes rank 0 and therefore sort first among equal weights.
pub fn size_rank(size: Option<&str>) -> u8 {
    match size {
        Some("small") => 1,
        Some("medium") => 2,
        Some("large") => 3,
        Some("guardian") => 4,
        _ => 0,
    }
}
