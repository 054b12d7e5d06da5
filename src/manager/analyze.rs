//! Fill a catalog record from a parsed sfnt face.

use std::collections::BTreeSet;

use log::warn;

use super::print_font::PrintFont;
use crate::config::LanguageId;
use crate::fonts::name_records::{name_id, platform, NameRecord};
use crate::fonts::{
    match_family_name, BoundingBox, FontItalic, FontPitch, FontWeight, FontWidth, GlobalFontInfo,
    SfntFace, TextEncoding,
};

const ENGLISH_US_LCID: u16 = 0x0409;
const ENGLISH_LCID: u16 = 0x0009;
const ENGLISH_UK_LCID: u16 = 0x0809;
const MAC_ENGLISH: u16 = 0;

// An old Berling Antiqua release also carries a "Times New Roman" family
// record, which must not become an alias.
const BERLING_ANTIQUA: &str = "Berling Antiqua";
const TIMES_NEW_ROMAN: &str = "Times New Roman";

/// How well a record's language fits the system language.
///
/// Zero means the record never wins but still counts as an alias.
fn language_score(record: &NameRecord<'_>, language: LanguageId) -> u32 {
    match record.platform_id {
        platform::UNICODE => 4000,
        platform::WINDOWS => {
            if record.language_id == language.windows_lcid {
                8000
            } else if record.language_id == ENGLISH_US_LCID {
                2000
            } else if record.language_id == ENGLISH_LCID || record.language_id == ENGLISH_UK_LCID {
                1500
            } else {
                1000
            }
        },
        platform::MACINTOSH => {
            if record.language_id == language.mac_language {
                8000
            } else if record.language_id == MAC_ENGLISH {
                2000
            } else {
                1000
            }
        },
        _ => 0,
    }
}

/// Decoded strings for one name id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct NameCandidates {
    /// Highest scoring name; the first one seen wins a tie
    pub best: Option<String>,
    /// Every distinct non-empty name, `best` included
    pub all: BTreeSet<String>,
}

pub(crate) fn collect_names(
    records: &[NameRecord<'_>],
    id: u16,
    language: LanguageId,
) -> NameCandidates {
    let mut candidates: Vec<(u32, String)> = records
        .iter()
        .filter(|record| record.name_id == id)
        .filter_map(|record| {
            let name = record.decode()?;
            let name = name.trim_end_matches('\0').to_string();
            (!name.is_empty()).then(|| (language_score(record, language), name))
        })
        .collect();

    if id == name_id::FAMILY && candidates.iter().any(|(_, name)| name == BERLING_ANTIQUA) {
        candidates.retain(|(_, name)| name != TIMES_NEW_ROMAN);
    }

    let mut best: Option<(u32, &str)> = None;
    for (score, name) in &candidates {
        if *score > best.map_or(0, |(s, _)| s) {
            best = Some((*score, name));
        }
    }

    NameCandidates {
        best: best.map(|(_, name)| name.to_string()),
        all: candidates.iter().map(|(_, name)| name.clone()).collect(),
    }
}

/// File name with its last extension removed.
pub(crate) fn file_stem(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(dot) => &file_name[..dot],
        None => file_name,
    }
}

/// `(ascend, descend, leading)` with the hhea, typo, win, bbox fallback.
///
/// A tier is used only when both its ascender and descender are set.
/// Descend is returned as a positive depth.
pub(crate) fn vertical_metrics(info: &GlobalFontInfo) -> (i32, i32, i32) {
    let (mut ascend, mut descend, mut leading) = if info.ascender != 0 && info.descender != 0 {
        (info.ascender, -info.descender, info.line_gap)
    } else if info.typo_ascender != 0 && info.typo_descender != 0 {
        (info.typo_ascender, -info.typo_descender, info.typo_line_gap)
    } else if info.win_ascent != 0 && info.win_descent != 0 {
        (
            info.win_ascent,
            info.win_descent,
            info.win_ascent + info.win_descent - 1000,
        )
    } else {
        (0, 0, 0)
    };

    if ascend == 0 {
        ascend = info.y_max;
    }
    if descend == 0 {
        descend = -info.y_min;
    }
    if leading == 0 {
        leading = (0.15 * f64::from(ascend + descend)).round() as i32;
    }

    (ascend, descend, leading)
}

/// Populate names, style attributes and metrics of `font` from `face`.
///
/// A family or style name already present on the record (from a stub) is
/// kept; the font's own family names then all become aliases.
pub(crate) fn analyze_face(font: &mut PrintFont, face: &SfntFace<'_>, language: LanguageId) {
    let records = face.name_records();

    let families = collect_names(&records, name_id::FAMILY, language);
    if font.family_name.is_empty() {
        font.family_name = families
            .best
            .clone()
            .unwrap_or_else(|| file_stem(&font.file_name).to_string());
    }
    for alias in families.all {
        if alias != font.family_name {
            font.aliases.insert(alias);
        }
    }

    if font.style_name.is_empty() {
        if let Some(style) = collect_names(&records, name_id::SUBFAMILY, language).best {
            font.style_name = style;
        }
    }

    font.ps_name = match collect_names(&records, name_id::POST_SCRIPT_NAME, language).best {
        Some(ps_name) => ps_name,
        None => {
            warn!("No PostScript name in font: {}", font.file_name);
            font.family_name.clone()
        },
    };

    font.family = match_family_name(&font.family_name);
    apply_global_info(font, &face.global_info());
    font.analyzed = true;
}

fn apply_global_info(font: &mut PrintFont, info: &GlobalFontInfo) {
    font.weight = FontWeight::from_weight_class(info.weight_class);
    font.width = FontWidth::from_width_class(info.width_class);
    font.pitch = FontPitch::from_is_fixed_pitch(info.is_fixed_pitch);
    font.italic = FontItalic::from_angle_and_mac_style(info.italic_angle, info.mac_style);
    font.encoding = if info.symbol_encoded {
        TextEncoding::Symbol
    } else {
        TextEncoding::Unicode
    };

    let (ascend, descend, leading) = vertical_metrics(info);
    font.ascend = ascend;
    font.descend = descend;
    font.leading = leading;
    font.bbox = BoundingBox {
        x_min: info.x_min,
        y_min: info.y_min,
        x_max: info.x_max,
        y_max: info.y_max,
    };
}
