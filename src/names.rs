const STATUS_MARKERS: [char; 2] = ['🟢', '🔴'];
const NBSP: char = '\u{00A0}';

/// Canonical display form of a participant label.
///
/// Sheets prefix names with a status dot and non-breaking spaces
/// (`"🟢\u{a0}\u{a0}Alice"`); both are dropped and whitespace runs collapse to
/// a single space.
pub fn normalize_name(raw: &str) -> String {
    let mut rest = raw;
    if let Some(stripped) = rest.strip_prefix(&STATUS_MARKERS[..]) {
        rest = stripped.trim_start();
    }
    let rest = rest.trim_start_matches(NBSP);
    rest.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lower-cased normalized name, the key every identity comparison goes through.
pub fn identity_key(raw: &str) -> String {
    normalize_name(raw).to_lowercase()
}
