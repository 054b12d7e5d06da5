//! Family-name classification.
//!
//! Maps a family name to a coarse [`FontFamily`] class using a fixed table of
//! well-known name fragments. Pure function, no I/O.

use super::style::FontFamily;

/// Name fragments and their classes.
///
/// Must stay sorted (byte order, lower case) with no entry a prefix of
/// another: `match_family_name` binary searches it by name prefix.
static FAMILY_MATCH: &[(&str, FontFamily)] = &[
    ("arial", FontFamily::Swiss),
    ("arioso", FontFamily::Script),
    ("avant garde", FontFamily::Swiss),
    ("avantgarde", FontFamily::Swiss),
    ("bembo", FontFamily::Roman),
    ("bookman", FontFamily::Roman),
    ("conga", FontFamily::Roman),
    ("courier", FontFamily::Modern),
    ("curl", FontFamily::Script),
    ("fixed", FontFamily::Modern),
    ("gill", FontFamily::Swiss),
    ("helmet", FontFamily::Modern),
    ("helvetica", FontFamily::Swiss),
    ("international", FontFamily::Modern),
    ("lucida", FontFamily::Swiss),
    ("new century schoolbook", FontFamily::Roman),
    ("palatino", FontFamily::Roman),
    ("roman", FontFamily::Roman),
    ("sans serif", FontFamily::Swiss),
    ("sansserif", FontFamily::Swiss),
    ("serf", FontFamily::Roman),
    ("serif", FontFamily::Roman),
    ("times", FontFamily::Roman),
    ("utopia", FontFamily::Roman),
    ("zapf chancery", FontFamily::Script),
    ("zapfchancery", FontFamily::Script),
];

/// Classify a family name.
///
/// A table entry matches when the name starts with it (case-insensitive);
/// failing that, any entry contained in the name matches. Unmatched names
/// are [`FontFamily::Unknown`].
pub fn match_family_name(family: &str) -> FontFamily {
    let lowered = family.to_ascii_lowercase();
    let name = lowered.as_bytes();

    // Comparing each entry with the equally long prefix of the name keeps the
    // comparison monotonic over the sorted table.
    let by_prefix = FAMILY_MATCH.binary_search_by(|(entry, _)| {
        let entry = entry.as_bytes();
        let prefix = &name[..name.len().min(entry.len())];
        entry.cmp(&prefix)
    });
    if let Ok(index) = by_prefix {
        return FAMILY_MATCH[index].1;
    }

    FAMILY_MATCH
        .iter()
        .find(|(entry, _)| lowered.contains(entry))
        .map(|(_, class)| *class)
        .unwrap_or(FontFamily::Unknown)
}
