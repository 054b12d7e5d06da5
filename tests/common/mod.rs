//! Synthetic font files for the integration tests.
//!
//! Fonts are assembled table by table with the crate's own `SfntWriter`,
//! so no binary fixtures are needed.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use printfont::fonts::{SfntWriter, SFNT_VERSION_CFF, SFNT_VERSION_TRUETYPE};

pub const WINDOWS: u16 = 3;
pub const ENGLISH_US: u16 = 0x0409;

/// One `name` table record with its stored bytes.
#[derive(Debug, Clone)]
pub struct Name {
    pub platform_id: u16,
    pub encoding_id: u16,
    pub language_id: u16,
    pub name_id: u16,
    pub bytes: Vec<u8>,
}

impl Name {
    /// Windows Unicode record, stored as UTF-16BE.
    pub fn windows(name_id: u16, language_id: u16, value: &str) -> Self {
        Self {
            platform_id: WINDOWS,
            encoding_id: 1,
            language_id,
            name_id,
            bytes: value.encode_utf16().flat_map(|u| u.to_be_bytes()).collect(),
        }
    }

    /// Record stored verbatim in a legacy encoding.
    pub fn encoded(
        platform_id: u16,
        encoding_id: u16,
        language_id: u16,
        name_id: u16,
        bytes: &[u8],
    ) -> Self {
        Self {
            platform_id,
            encoding_id,
            language_id,
            name_id,
            bytes: bytes.to_vec(),
        }
    }

    fn utf16_value(&self) -> Option<String> {
        if self.platform_id != WINDOWS || self.encoding_id != 1 {
            return None;
        }
        let units: Vec<u16> = self
            .bytes
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16(&units).ok()
    }
}

/// Description of a single synthetic face.
#[derive(Debug, Clone)]
pub struct TestFont {
    pub names: Vec<Name>,
    pub units_per_em: u16,
    pub advances: Vec<u16>,
    pub hhea: (i16, i16, i16),
    pub typo: (i16, i16, i16),
    pub win: (u16, u16),
    pub bbox: (i16, i16, i16, i16),
    pub weight_class: u16,
    pub width_class: u16,
    /// 16.16 fixed point
    pub italic_angle: i32,
    pub mac_style: u16,
    pub fixed_pitch: bool,
    pub cmap: Vec<(u16, u16)>,
    pub symbol_cmap: bool,
    /// (composite glyph, component glyph)
    pub composites: Vec<(u16, u16)>,
    pub cff: bool,
}

impl TestFont {
    /// A six-glyph font named `family` with distinct advances.
    pub fn new(family: &str) -> Self {
        let ps_name = family.replace(' ', "");
        Self {
            names: vec![
                Name::windows(1, ENGLISH_US, family),
                Name::windows(2, ENGLISH_US, "Regular"),
                Name::windows(6, ENGLISH_US, &ps_name),
            ],
            units_per_em: 1000,
            advances: vec![500, 250, 600, 610, 720, 830],
            hhea: (800, -200, 90),
            typo: (750, -250, 0),
            win: (900, 300),
            bbox: (-50, -210, 1000, 880),
            weight_class: 400,
            width_class: 5,
            italic_angle: 0,
            mac_style: 0,
            fixed_pitch: false,
            cmap: vec![(0x20, 1), (0x41, 2), (0x42, 3), (0x43, 4), (0x44, 5)],
            symbol_cmap: false,
            composites: Vec::new(),
            cff: false,
        }
    }

    pub fn without_names(mut self) -> Self {
        self.names.clear();
        self
    }

    pub fn with_name(mut self, name: Name) -> Self {
        self.names.push(name);
        self
    }

    pub fn with_vertical_metrics(
        mut self,
        hhea: (i16, i16, i16),
        typo: (i16, i16, i16),
        win: (u16, u16),
    ) -> Self {
        self.hhea = hhea;
        self.typo = typo;
        self.win = win;
        self
    }

    pub fn with_bbox(mut self, bbox: (i16, i16, i16, i16)) -> Self {
        self.bbox = bbox;
        self
    }

    pub fn with_units_per_em(mut self, units_per_em: u16) -> Self {
        self.units_per_em = units_per_em;
        self
    }

    pub fn with_style(mut self, weight_class: u16, width_class: u16, italic_angle: i32) -> Self {
        self.weight_class = weight_class;
        self.width_class = width_class;
        self.italic_angle = italic_angle;
        self
    }

    pub fn with_composite(mut self, glyph: u16, component: u16) -> Self {
        self.composites.push((glyph, component));
        self
    }

    pub fn symbol(mut self) -> Self {
        self.symbol_cmap = true;
        self
    }

    pub fn cff(mut self) -> Self {
        self.cff = true;
        self
    }

    pub fn glyph_count(&self) -> u16 {
        self.advances.len() as u16
    }

    pub fn build(&self) -> Vec<u8> {
        let version = if self.cff {
            SFNT_VERSION_CFF
        } else {
            SFNT_VERSION_TRUETYPE
        };
        let mut writer = SfntWriter::new(version);
        writer
            .add_table(b"head", self.head())
            .add_table(b"hhea", self.hhea())
            .add_table(b"maxp", self.maxp())
            .add_table(b"hmtx", self.hmtx())
            .add_table(b"OS/2", self.os2())
            .add_table(b"post", self.post())
            .add_table(b"cmap", self.cmap());
        if !self.names.is_empty() {
            writer.add_table(b"name", self.name());
        }

        if self.cff {
            writer.add_table(b"CFF ", self.cff_program());
        } else {
            let (glyf, loca) = self.glyf_and_loca();
            writer.add_table(b"glyf", glyf).add_table(b"loca", loca);
        }
        writer.finish()
    }

    fn head(&self) -> Vec<u8> {
        let mut head = Vec::with_capacity(54);
        head.extend_from_slice(&0x0001_0000u32.to_be_bytes());
        head.extend_from_slice(&0x0001_0000u32.to_be_bytes());
        head.extend_from_slice(&0u32.to_be_bytes());
        head.extend_from_slice(&0x5F0F_3CF5u32.to_be_bytes());
        head.extend_from_slice(&0x000Bu16.to_be_bytes());
        head.extend_from_slice(&self.units_per_em.to_be_bytes());
        head.extend_from_slice(&[0; 16]);
        let (x_min, y_min, x_max, y_max) = self.bbox;
        for v in [x_min, y_min, x_max, y_max] {
            head.extend_from_slice(&v.to_be_bytes());
        }
        head.extend_from_slice(&self.mac_style.to_be_bytes());
        head.extend_from_slice(&8u16.to_be_bytes());
        head.extend_from_slice(&2i16.to_be_bytes());
        // long loca offsets
        head.extend_from_slice(&1i16.to_be_bytes());
        head.extend_from_slice(&0i16.to_be_bytes());
        head
    }

    fn hhea(&self) -> Vec<u8> {
        let mut hhea = Vec::with_capacity(36);
        hhea.extend_from_slice(&0x0001_0000u32.to_be_bytes());
        let (ascender, descender, line_gap) = self.hhea;
        for v in [ascender, descender, line_gap] {
            hhea.extend_from_slice(&v.to_be_bytes());
        }
        let max_advance = self.advances.iter().copied().max().unwrap_or(0);
        hhea.extend_from_slice(&max_advance.to_be_bytes());
        hhea.extend_from_slice(&[0; 6]);
        // caret slope rise 1, run 0
        hhea.extend_from_slice(&1i16.to_be_bytes());
        hhea.extend_from_slice(&[0; 12]);
        hhea.extend_from_slice(&0i16.to_be_bytes());
        hhea.extend_from_slice(&self.glyph_count().to_be_bytes());
        assert_eq!(hhea.len(), 36);
        hhea
    }

    fn maxp(&self) -> Vec<u8> {
        let mut maxp = Vec::new();
        if self.cff {
            maxp.extend_from_slice(&0x0000_5000u32.to_be_bytes());
            maxp.extend_from_slice(&self.glyph_count().to_be_bytes());
        } else {
            maxp.extend_from_slice(&0x0001_0000u32.to_be_bytes());
            maxp.extend_from_slice(&self.glyph_count().to_be_bytes());
            maxp.extend_from_slice(&[0; 26]);
        }
        maxp
    }

    fn hmtx(&self) -> Vec<u8> {
        self.advances
            .iter()
            .flat_map(|&advance| {
                let mut metric = advance.to_be_bytes().to_vec();
                metric.extend_from_slice(&0i16.to_be_bytes());
                metric
            })
            .collect()
    }

    fn os2(&self) -> Vec<u8> {
        let mut os2 = vec![0u8; 96];
        os2[0..2].copy_from_slice(&4u16.to_be_bytes());
        os2[4..6].copy_from_slice(&self.weight_class.to_be_bytes());
        os2[6..8].copy_from_slice(&self.width_class.to_be_bytes());
        let (typo_ascender, typo_descender, typo_line_gap) = self.typo;
        os2[68..70].copy_from_slice(&typo_ascender.to_be_bytes());
        os2[70..72].copy_from_slice(&typo_descender.to_be_bytes());
        os2[72..74].copy_from_slice(&typo_line_gap.to_be_bytes());
        os2[74..76].copy_from_slice(&self.win.0.to_be_bytes());
        os2[76..78].copy_from_slice(&self.win.1.to_be_bytes());
        os2
    }

    fn post(&self) -> Vec<u8> {
        let mut post = vec![0u8; 32];
        post[0..4].copy_from_slice(&0x0003_0000u32.to_be_bytes());
        post[4..8].copy_from_slice(&self.italic_angle.to_be_bytes());
        post[12..16].copy_from_slice(&u32::from(self.fixed_pitch).to_be_bytes());
        post
    }

    fn name(&self) -> Vec<u8> {
        let mut storage = Vec::new();
        let mut records = Vec::new();
        for name in &self.names {
            let bytes = &name.bytes;
            for v in [
                name.platform_id,
                name.encoding_id,
                name.language_id,
                name.name_id,
                bytes.len() as u16,
                storage.len() as u16,
            ] {
                records.extend_from_slice(&v.to_be_bytes());
            }
            storage.extend_from_slice(bytes);
        }

        let count = self.names.len() as u16;
        let mut table = Vec::new();
        table.extend_from_slice(&0u16.to_be_bytes());
        table.extend_from_slice(&count.to_be_bytes());
        table.extend_from_slice(&(6 + 12 * count).to_be_bytes());
        table.extend_from_slice(&records);
        table.extend_from_slice(&storage);
        table
    }

    fn cmap(&self) -> Vec<u8> {
        let subtable = format4(&self.cmap);
        let encoding: u16 = if self.symbol_cmap { 0 } else { 1 };
        let mut cmap = Vec::new();
        cmap.extend_from_slice(&0u16.to_be_bytes());
        cmap.extend_from_slice(&1u16.to_be_bytes());
        cmap.extend_from_slice(&WINDOWS.to_be_bytes());
        cmap.extend_from_slice(&encoding.to_be_bytes());
        cmap.extend_from_slice(&12u32.to_be_bytes());
        cmap.extend_from_slice(&subtable);
        cmap
    }

    fn glyf_and_loca(&self) -> (Vec<u8>, Vec<u8>) {
        let mut glyf = Vec::new();
        let mut loca = Vec::new();
        for glyph in 0..self.glyph_count() {
            loca.extend_from_slice(&(glyf.len() as u32).to_be_bytes());
            match self.composites.iter().find(|(g, _)| *g == glyph) {
                Some(&(_, component)) => glyf.extend(composite_glyph(component)),
                None => glyf.extend(triangle_glyph(glyph)),
            }
        }
        loca.extend_from_slice(&(glyf.len() as u32).to_be_bytes());
        (glyf, loca)
    }

    fn cff_program(&self) -> Vec<u8> {
        let names: Vec<String> = (1..self.glyph_count()).map(|g| format!("g{}", g)).collect();
        let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let char_strings: Vec<&[u8]> = (0..self.glyph_count()).map(|_| &[14u8][..]).collect();
        let ps_name = self
            .names
            .iter()
            .find(|n| n.name_id == 6)
            .and_then(Name::utf16_value)
            .unwrap_or_else(|| "Synthetic".to_string());
        build_name_keyed_cff(&ps_name, &name_refs, &char_strings)
    }
}

/// INDEX with 4-byte offsets.
fn cff_index(items: &[&[u8]]) -> Vec<u8> {
    if items.is_empty() {
        return vec![0, 0];
    }
    let mut out = (items.len() as u16).to_be_bytes().to_vec();
    out.push(4);
    let mut offset = 1u32;
    out.extend_from_slice(&offset.to_be_bytes());
    for item in items {
        offset += item.len() as u32;
        out.extend_from_slice(&offset.to_be_bytes());
    }
    for item in items {
        out.extend_from_slice(item);
    }
    out
}

/// DICT integer in the fixed five-byte form, so offsets can be patched.
fn cff_int(out: &mut Vec<u8>, value: i32) {
    out.push(29);
    out.extend_from_slice(&value.to_be_bytes());
}

/// Name-keyed CFF program: glyph `k` gets `char_strings[k]`, glyphs after
/// `.notdef` are named by `glyph_names`, and the Private DICT carries one
/// local subroutine.
pub fn build_name_keyed_cff(
    font_name: &str,
    glyph_names: &[&str],
    char_strings: &[&[u8]],
) -> Vec<u8> {
    let names = cff_index(&[font_name.as_bytes()]);
    let string_items: Vec<&[u8]> = glyph_names.iter().map(|n| n.as_bytes()).collect();
    let strings = cff_index(&string_items);
    let global_subrs = cff_index(&[]);

    let mut charset = vec![0u8];
    for k in 1..char_strings.len() {
        // custom strings follow the 391 standard strings
        charset.extend_from_slice(&(391 + (k - 1) as u16).to_be_bytes());
    }
    let glyphs = cff_index(char_strings);

    // Subrs (19) sit right after the six-byte Private DICT
    let mut private = Vec::new();
    cff_int(&mut private, 6);
    private.push(19);
    private.extend(cff_index(&[&[11u8][..]]));

    let top = |charset_at: i32, glyphs_at: i32, private_at: i32| {
        let mut dict = Vec::new();
        cff_int(&mut dict, charset_at);
        dict.push(15);
        cff_int(&mut dict, glyphs_at);
        dict.push(17);
        cff_int(&mut dict, 6);
        cff_int(&mut dict, private_at);
        dict.push(18);
        dict
    };

    let top_len = cff_index(&[top(0, 0, 0).as_slice()]).len();
    let charset_at = 4 + names.len() + top_len + strings.len() + global_subrs.len();
    let glyphs_at = charset_at + charset.len();
    let private_at = glyphs_at + glyphs.len();
    let top_dict = top(charset_at as i32, glyphs_at as i32, private_at as i32);

    let mut out = vec![1, 0, 4, 4];
    out.extend(names);
    out.extend(cff_index(&[top_dict.as_slice()]));
    out.extend(strings);
    out.extend(global_subrs);
    out.extend(charset);
    out.extend(glyphs);
    out.extend(private);
    out
}

/// Format 4 cmap subtable with one segment per mapping.
pub fn format4(pairs: &[(u16, u16)]) -> Vec<u8> {
    let mut pairs = pairs.to_vec();
    pairs.sort();
    let mut segments: Vec<(u16, u16, i16)> = pairs
        .iter()
        .map(|&(c, g)| (c, c, g.wrapping_sub(c) as i16))
        .collect();
    segments.push((0xFFFF, 0xFFFF, 1));

    let seg_count = segments.len() as u16;
    let entry_selector = 15 - seg_count.leading_zeros() as u16;
    let search_range = 2 * (1u16 << entry_selector);
    let range_shift = 2 * seg_count - search_range;

    let mut table = Vec::new();
    table.extend_from_slice(&4u16.to_be_bytes());
    table.extend_from_slice(&(16 + 8 * seg_count).to_be_bytes());
    table.extend_from_slice(&0u16.to_be_bytes());
    for v in [2 * seg_count, search_range, entry_selector, range_shift] {
        table.extend_from_slice(&v.to_be_bytes());
    }
    for (_, end, _) in &segments {
        table.extend_from_slice(&end.to_be_bytes());
    }
    table.extend_from_slice(&0u16.to_be_bytes());
    for (start, _, _) in &segments {
        table.extend_from_slice(&start.to_be_bytes());
    }
    for (_, _, delta) in &segments {
        table.extend_from_slice(&delta.to_be_bytes());
    }
    for _ in &segments {
        table.extend_from_slice(&0u16.to_be_bytes());
    }
    table
}

/// One-contour triangle whose size depends on the glyph id.
fn triangle_glyph(glyph: u16) -> Vec<u8> {
    let size = 100 + glyph as i16 * 10;
    let mut data = Vec::new();
    for v in [1i16, 0, 0, size, size] {
        data.extend_from_slice(&v.to_be_bytes());
    }
    // last point index, no instructions
    data.extend_from_slice(&2u16.to_be_bytes());
    data.extend_from_slice(&0u16.to_be_bytes());
    // on-curve, 16-bit deltas
    data.extend_from_slice(&[1, 1, 1]);
    for dx in [0i16, size, -size / 2] {
        data.extend_from_slice(&dx.to_be_bytes());
    }
    for dy in [0i16, 0, size] {
        data.extend_from_slice(&dy.to_be_bytes());
    }
    data.push(0);
    data
}

fn composite_glyph(component: u16) -> Vec<u8> {
    let mut data = Vec::new();
    for v in [-1i16, 0, 0, 200, 200] {
        data.extend_from_slice(&v.to_be_bytes());
    }
    // ARG_1_AND_2_ARE_WORDS, single component
    data.extend_from_slice(&0x0001u16.to_be_bytes());
    data.extend_from_slice(&component.to_be_bytes());
    data.extend_from_slice(&[0, 0, 0, 0]);
    data
}

/// Join single-face fonts into a `ttcf` collection.
pub fn build_collection(faces: &[Vec<u8>]) -> Vec<u8> {
    let header_len = 12 + 4 * faces.len();
    let mut out = collection_header(faces.len() as u32);

    let mut offset = header_len;
    let mut bodies = Vec::new();
    for face in faces {
        out.extend_from_slice(&(offset as u32).to_be_bytes());
        let body = relocate(face, offset);
        offset += body.len();
        bodies.push(body);
    }
    for body in bodies {
        out.extend(body);
    }
    out
}

/// Collection claiming `claimed` faces whose offsets all point at one
/// shared `face`, zero padded to `len` bytes.
pub fn shared_face_collection(face: &[u8], claimed: u32, len: usize) -> Vec<u8> {
    let header_len = 12 + 4 * claimed as usize;
    let mut out = collection_header(claimed);
    for _ in 0..claimed {
        out.extend_from_slice(&(header_len as u32).to_be_bytes());
    }
    out.extend(relocate(face, header_len));
    assert!(out.len() <= len, "collection needs {} bytes", out.len());
    out.resize(len, 0);
    out
}

fn collection_header(num_fonts: u32) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"ttcf");
    out.extend_from_slice(&0x0001_0000u32.to_be_bytes());
    out.extend_from_slice(&num_fonts.to_be_bytes());
    out
}

/// Shift every table offset of a standalone face by `offset`.
fn relocate(face: &[u8], offset: usize) -> Vec<u8> {
    let mut body = face.to_vec();
    let num_tables = u16::from_be_bytes([body[4], body[5]]) as usize;
    for i in 0..num_tables {
        let at = 12 + 16 * i + 8;
        let table_offset = u32::from_be_bytes([body[at], body[at + 1], body[at + 2], body[at + 3]]);
        body[at..at + 4].copy_from_slice(&(table_offset + offset as u32).to_be_bytes());
    }
    body
}

/// Write `data` as `dir/file_name`.
pub fn write_font(dir: &Path, file_name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(file_name);
    std::fs::write(&path, data).unwrap();
    path
}
