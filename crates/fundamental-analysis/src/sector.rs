//! Sector lookup tables.
//!
//! Sector labels arrive as free text, so matching is a case-sensitive
//! substring test against ordered `(substring, value)` tables. The first
//! matching entry wins.

/// Sectors whose balance sheets invalidate the Altman model.
pub const ALTMAN_EXCLUDED_SECTORS: &[&str] = &["Bank", "Financial", "Insurance"];

/// Steady-state operating margin assumed for the terminal-value model.
pub const TARGET_MARGINS: &[(&str, f64)] = &[
    ("Information & Communication", 0.20),
    ("Pharmaceutical", 0.15),
    ("Real Estate", 0.15),
    ("Services", 0.12),
    ("Electric Appliances", 0.10),
    ("Machinery", 0.10),
    ("Chemicals", 0.10),
    ("Transportation Equipment", 0.07),
    ("Foods", 0.07),
    ("Construction", 0.06),
    ("Retail Trade", 0.04),
    ("Wholesale Trade", 0.03),
];

pub const DEFAULT_TARGET_MARGIN: f64 = 0.10;

/// First value in `table` whose key occurs in `sector`
pub fn lookup<T: Copy>(table: &[(&str, T)], sector: &str) -> Option<T> {
    table
        .iter()
        .find(|(needle, _)| sector.contains(needle))
        .map(|(_, value)| *value)
}

pub fn is_altman_excluded(sector: &str) -> bool {
    ALTMAN_EXCLUDED_SECTORS
        .iter()
        .any(|needle| sector.contains(needle))
}

pub fn target_margin(sector: &str) -> f64 {
    lookup(TARGET_MARGINS, sector).unwrap_or(DEFAULT_TARGET_MARGIN)
}
