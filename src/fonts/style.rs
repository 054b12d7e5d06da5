//! Style attributes derived from sfnt header fields.

use serde::Serialize;

/// Coarse family classification used as a substitution hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum FontFamily {
    /// Not classified
    #[default]
    Unknown,
    /// Serif faces (Times, Palatino, ...)
    Roman,
    /// Sans-serif faces (Arial, Helvetica, ...)
    Swiss,
    /// Monospaced faces (Courier, ...)
    Modern,
    /// Handwriting and calligraphic faces
    Script,
    /// Display and ornamental faces
    Decorative,
}

/// Font weight, ordered from lightest to heaviest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub enum FontWeight {
    /// 100
    Thin,
    /// 200
    ExtraLight,
    /// 300
    Light,
    /// 400
    #[default]
    Normal,
    /// 500
    Medium,
    /// 600
    SemiBold,
    /// 700
    Bold,
    /// 800
    ExtraBold,
    /// 900
    Black,
}

impl FontWeight {
    /// Map an OS/2 `usWeightClass` value to a weight bucket.
    ///
    /// Zero (no OS/2 table) maps to `Normal`.
    pub fn from_weight_class(class: u16) -> Self {
        match class {
            0 => FontWeight::Normal,
            1..=100 => FontWeight::Thin,
            101..=200 => FontWeight::ExtraLight,
            201..=300 => FontWeight::Light,
            301..=400 => FontWeight::Normal,
            401..=500 => FontWeight::Medium,
            501..=600 => FontWeight::SemiBold,
            601..=700 => FontWeight::Bold,
            701..=800 => FontWeight::ExtraBold,
            _ => FontWeight::Black,
        }
    }
}

/// Font width, ordered from narrowest to widest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub enum FontWidth {
    UltraCondensed,
    ExtraCondensed,
    Condensed,
    SemiCondensed,
    #[default]
    Normal,
    SemiExpanded,
    Expanded,
    ExtraExpanded,
    UltraExpanded,
}

impl FontWidth {
    /// Map an OS/2 `usWidthClass` value (1..=9); anything else is `Normal`.
    pub fn from_width_class(class: u16) -> Self {
        match class {
            1 => FontWidth::UltraCondensed,
            2 => FontWidth::ExtraCondensed,
            3 => FontWidth::Condensed,
            4 => FontWidth::SemiCondensed,
            6 => FontWidth::SemiExpanded,
            7 => FontWidth::Expanded,
            8 => FontWidth::ExtraExpanded,
            9 => FontWidth::UltraExpanded,
            _ => FontWidth::Normal,
        }
    }
}

/// Slant of a face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum FontItalic {
    /// Upright
    #[default]
    None,
    /// True italic
    Normal,
    /// Slanted roman
    Oblique,
}

/// macStyle bit 1 in the `head` table.
const MAC_STYLE_ITALIC: u16 = 0x0002;

impl FontItalic {
    /// Derive the slant from the `post` italic angle and `head` macStyle.
    ///
    /// A negative angle (clockwise lean) is italic, a positive one oblique.
    /// Some italic fonts declare a zero angle, so the macStyle bit is
    /// consulted when the angle is zero.
    pub fn from_angle_and_mac_style(italic_angle: f32, mac_style: u16) -> Self {
        if italic_angle == 0.0 {
            if mac_style & MAC_STYLE_ITALIC != 0 {
                FontItalic::Normal
            } else {
                FontItalic::None
            }
        } else if italic_angle < 0.0 {
            FontItalic::Normal
        } else {
            FontItalic::Oblique
        }
    }
}

/// Fixed or proportional advance widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum FontPitch {
    Fixed,
    #[default]
    Variable,
}

impl FontPitch {
    /// From the `post` table `isFixedPitch` field.
    pub fn from_is_fixed_pitch(is_fixed_pitch: u32) -> Self {
        if is_fixed_pitch != 0 {
            FontPitch::Fixed
        } else {
            FontPitch::Variable
        }
    }
}

/// Character encoding of the font's primary cmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum TextEncoding {
    #[default]
    Unicode,
    /// (3,0) symbol cmap, codes live in the U+F0xx private range
    Symbol,
}
