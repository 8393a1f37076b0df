//! Canonical quality tier model.
//!
//! Six tier names map onto five ranks, lowest rank meaning highest quality.
//! `OD` and `BD` share rank 0: original-source platforms report `OD`,
//! CDN-style platforms report `BD`, but they sort and select identically.

/// Tier names in declaration order. Digit specs index into this list.
pub const TIER_NAMES: [&str; 6] = ["OD", "BD", "UHD", "HD", "SD", "LD"];

/// Rank of a canonical tier name, `None` for anything else.
pub fn tier_rank(name: &str) -> Option<usize> {
    match name {
        "OD" | "BD" => Some(0),
        "UHD" => Some(1),
        "HD" => Some(2),
        "SD" => Some(3),
        "LD" => Some(4),
        _ => None,
    }
}

/// Resolve a user-supplied quality spec into a `(name, rank)` pair.
///
/// - Empty/absent spec selects the highest tier (`OD`, rank 0).
/// - An all-digit spec selects a tier by position in [`TIER_NAMES`], using
///   the first digit only.
/// - Anything else is looked up case-insensitively. Unknown names (including
///   digits past the tier list) keep rank 0 but preserve the given name, so
///   callers can still detect a requested-but-unmapped tier downstream. This
///   permissiveness is intentional, not a missing validation.
pub fn resolve_quality(spec: Option<&str>) -> (String, usize) {
    let spec = spec.unwrap_or("");
    if spec.is_empty() {
        return (TIER_NAMES[0].to_string(), 0);
    }

    let mut name = spec.to_uppercase();
    if name.bytes().all(|b| b.is_ascii_digit()) {
        let index = (name.as_bytes()[0] - b'0') as usize;
        if let Some(tier) = TIER_NAMES.get(index) {
            name = (*tier).to_string();
        }
    }

    let rank = tier_rank(&name).unwrap_or(0);
    (name, rank)
}
