//! CFF font program subsetting.
//!
//! Parses the `CFF ` table of an OpenType font (header, Name/Top DICT/String/
//! Global Subr INDEXes, CharStrings, charset, Private DICTs and, for
//! CID-keyed fonts, FDSelect/FDArray) and writes a new bare CFF program that
//! only holds the requested glyphs in slot order.
//!
//! Subroutines are kept verbatim, so no charstring is ever rewritten. Every
//! offset operand in the rebuilt DICTs is written in the 5-byte integer form
//! which keeps DICT sizes independent of the offsets they carry; the layout
//! can therefore be computed in a single pass.

use nom::bytes::complete::take;
use nom::error::{make_error, ErrorKind};
use nom::multi::count;
use nom::number::complete::{be_i16, be_i32, be_u16, be_u24, be_u32, be_u8};
use nom::IResult;

use crate::error::{Error, Result};

type Parsed<'a, T> = IResult<&'a [u8], T>;

/// DICT operators; two-byte operators are `0x0C00 | second byte`.
mod op {
    pub const CHARSET: u16 = 15;
    pub const ENCODING: u16 = 16;
    pub const CHAR_STRINGS: u16 = 17;
    pub const PRIVATE: u16 = 18;
    pub const SUBRS: u16 = 19;
    pub const ROS: u16 = 0x0C1E;
    pub const CID_COUNT: u16 = 0x0C22;
    pub const FD_ARRAY: u16 = 0x0C24;
    pub const FD_SELECT: u16 = 0x0C25;
}

/// Operators whose operands are offsets (or sizes) in the rebuilt font.
fn is_offset_operator(operator: u16) -> bool {
    matches!(
        operator,
        op::CHARSET
            | op::ENCODING
            | op::CHAR_STRINGS
            | op::PRIVATE
            | op::SUBRS
            | op::FD_ARRAY
            | op::FD_SELECT
    )
}

#[derive(Debug, Clone, PartialEq)]
enum Operand<'a> {
    Int(i32),
    /// Encoded real number, including the leading 30 byte.
    Real(&'a [u8]),
}

#[derive(Debug, Clone, PartialEq)]
struct DictEntry<'a> {
    operator: u16,
    operands: Vec<Operand<'a>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Dict<'a> {
    entries: Vec<DictEntry<'a>>,
}

impl<'a> Dict<'a> {
    fn get(&self, operator: u16) -> Option<&[Operand<'a>]> {
        self.entries
            .iter()
            .find(|e| e.operator == operator)
            .map(|e| e.operands.as_slice())
    }

    fn int(&self, operator: u16, position: usize) -> Option<i32> {
        match self.get(operator)?.get(position)? {
            Operand::Int(value) => Some(*value),
            Operand::Real(_) => None,
        }
    }

    fn offset(&self, operator: u16, position: usize) -> Option<usize> {
        self.int(operator, position)
            .and_then(|v| usize::try_from(v).ok())
    }

    fn set_ints(&mut self, operator: u16, values: &[i32]) {
        let operands: Vec<Operand<'a>> = values.iter().map(|&v| Operand::Int(v)).collect();
        match self.entries.iter_mut().find(|e| e.operator == operator) {
            Some(entry) => entry.operands = operands,
            None => self.entries.push(DictEntry { operator, operands }),
        }
    }

    fn remove(&mut self, operator: u16) {
        self.entries.retain(|e| e.operator != operator);
    }

    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for entry in &self.entries {
            let fixed = is_offset_operator(entry.operator);
            for operand in &entry.operands {
                match operand {
                    Operand::Int(v) if fixed => encode_fixed_int(&mut out, *v),
                    Operand::Int(v) => encode_int(&mut out, *v),
                    Operand::Real(raw) => out.extend_from_slice(raw),
                }
            }
            if entry.operator > 0xFF {
                out.push(12);
            }
            out.push((entry.operator & 0xFF) as u8);
        }
        out
    }
}

fn encode_int(out: &mut Vec<u8>, value: i32) {
    match value {
        -107..=107 => out.push((value + 139) as u8),
        108..=1131 => {
            let v = value - 108;
            out.push(((v >> 8) + 247) as u8);
            out.push((v & 0xFF) as u8);
        },
        -1131..=-108 => {
            let v = -value - 108;
            out.push(((v >> 8) + 251) as u8);
            out.push((v & 0xFF) as u8);
        },
        -32768..=32767 => {
            out.push(28);
            out.extend_from_slice(&(value as i16).to_be_bytes());
        },
        _ => encode_fixed_int(out, value),
    }
}

fn encode_fixed_int(out: &mut Vec<u8>, value: i32) {
    out.push(29);
    out.extend_from_slice(&value.to_be_bytes());
}

fn fail<T>(input: &[u8]) -> Parsed<'_, T> {
    Err(nom::Err::Error(make_error(input, ErrorKind::Verify)))
}

fn real(input: &[u8]) -> Parsed<'_, &[u8]> {
    // input starts at the 30 prefix; the number ends at the first 0xF nibble
    let end = input[1..]
        .iter()
        .position(|&b| b >> 4 == 0xF || b & 0xF == 0xF);
    match end {
        Some(pos) => take(pos + 2)(input),
        None => fail(input),
    }
}

fn operand(input: &[u8]) -> Parsed<'_, Operand<'_>> {
    let (i, b0) = be_u8(input)?;
    match b0 {
        28 => {
            let (i, v) = be_i16(i)?;
            Ok((i, Operand::Int(v as i32)))
        },
        29 => {
            let (i, v) = be_i32(i)?;
            Ok((i, Operand::Int(v)))
        },
        30 => {
            let (i, raw) = real(input)?;
            Ok((i, Operand::Real(raw)))
        },
        32..=246 => Ok((i, Operand::Int(b0 as i32 - 139))),
        247..=250 => {
            let (i, b1) = be_u8(i)?;
            Ok((i, Operand::Int((b0 as i32 - 247) * 256 + b1 as i32 + 108)))
        },
        251..=254 => {
            let (i, b1) = be_u8(i)?;
            Ok((i, Operand::Int(-(b0 as i32 - 251) * 256 - b1 as i32 - 108)))
        },
        _ => fail(input),
    }
}

fn dict(mut input: &[u8]) -> Parsed<'_, Dict<'_>> {
    let mut dict = Dict::default();
    let mut operands = Vec::new();

    while let Some(&b0) = input.first() {
        if b0 <= 21 {
            let (i, _) = be_u8(input)?;
            let (i, operator) = if b0 == 12 {
                let (i, b1) = be_u8(i)?;
                (i, 0x0C00 | b1 as u16)
            } else {
                (i, b0 as u16)
            };
            dict.entries.push(DictEntry {
                operator,
                operands: std::mem::take(&mut operands),
            });
            input = i;
        } else {
            let (i, value) = operand(input)?;
            operands.push(value);
            input = i;
        }
    }

    Ok((input, dict))
}

/// Items of a CFF INDEX.
#[derive(Debug, Clone, Default)]
struct Index<'a> {
    items: Vec<&'a [u8]>,
}

impl Index<'_> {
    fn len(&self) -> usize {
        self.items.len()
    }
}

fn offset(size: u8) -> impl Fn(&[u8]) -> Parsed<'_, u32> {
    move |i| match size {
        1 => be_u8(i).map(|(i, v)| (i, v as u32)),
        2 => be_u16(i).map(|(i, v)| (i, v as u32)),
        3 => be_u24(i),
        4 => be_u32(i),
        _ => fail(i),
    }
}

fn index(input: &[u8]) -> Parsed<'_, Index<'_>> {
    let (i, n) = be_u16(input)?;
    if n == 0 {
        return Ok((i, Index::default()));
    }
    let (i, off_size) = be_u8(i)?;
    let (i, offsets) = count(offset(off_size), n as usize + 1)(i)?;

    // offsets are 1-based relative to the byte before the data
    let last = offsets[n as usize] as usize;
    if last == 0 {
        return fail(input);
    }
    let (rest, data) = take(last - 1)(i)?;

    let items: Option<Vec<&[u8]>> = offsets
        .windows(2)
        .map(|w| {
            let start = (w[0] as usize).checked_sub(1)?;
            let end = (w[1] as usize).checked_sub(1)?;
            data.get(start..end)
        })
        .collect();

    match items {
        Some(items) => Ok((rest, Index { items })),
        None => fail(input),
    }
}

fn encode_index<'b, I>(items: I) -> Vec<u8>
where
    I: IntoIterator<Item = &'b [u8]>,
{
    let items: Vec<&[u8]> = items.into_iter().collect();
    if items.is_empty() {
        return vec![0, 0];
    }

    let last_offset = items.iter().map(|item| item.len()).sum::<usize>() + 1;
    let off_size: usize = match last_offset {
        0..=0xFF => 1,
        0x100..=0xFFFF => 2,
        0x1_0000..=0xFF_FFFF => 3,
        _ => 4,
    };

    let mut out = Vec::new();
    out.extend_from_slice(&(items.len() as u16).to_be_bytes());
    out.push(off_size as u8);

    let mut position = 1usize;
    let push_offset = |out: &mut Vec<u8>, value: usize| {
        let bytes = (value as u32).to_be_bytes();
        out.extend_from_slice(&bytes[4 - off_size..]);
    };
    push_offset(&mut out, position);
    for item in &items {
        position += item.len();
        push_offset(&mut out, position);
    }
    for item in &items {
        out.extend_from_slice(item);
    }
    out
}

/// Glyph id to SID (name-keyed) or CID (CID-keyed); entry 0 is `.notdef`.
fn charset(input: &[u8], num_glyphs: usize) -> Parsed<'_, Vec<u16>> {
    let (mut i, format) = be_u8(input)?;
    let mut ids = vec![0u16];

    match format {
        0 => {
            while ids.len() < num_glyphs {
                let (rest, id) = be_u16(i)?;
                ids.push(id);
                i = rest;
            }
        },
        1 | 2 => {
            while ids.len() < num_glyphs {
                let (rest, first) = be_u16(i)?;
                let (rest, left) = if format == 1 {
                    be_u8(rest).map(|(r, v)| (r, v as u16))?
                } else {
                    be_u16(rest)?
                };
                for k in 0..=left {
                    if ids.len() >= num_glyphs {
                        break;
                    }
                    ids.push(first.wrapping_add(k));
                }
                i = rest;
            }
        },
        _ => return fail(input),
    }

    Ok((i, ids))
}

fn fd_range(input: &[u8]) -> Parsed<'_, (usize, u8)> {
    let (i, first) = be_u16(input)?;
    let (i, fd) = be_u8(i)?;
    Ok((i, (first as usize, fd)))
}

/// Font DICT index per glyph.
fn fd_select(input: &[u8], num_glyphs: usize) -> Parsed<'_, Vec<u8>> {
    let (i, format) = be_u8(input)?;
    match format {
        0 => count(be_u8, num_glyphs)(i),
        3 => {
            let (i, n_ranges) = be_u16(i)?;
            let (i, ranges) = count(fd_range, n_ranges as usize)(i)?;
            let (i, sentinel) = be_u16(i)?;

            let mut fds = vec![0u8; num_glyphs];
            for (k, &(first, fd)) in ranges.iter().enumerate() {
                let end = ranges
                    .get(k + 1)
                    .map(|&(next, _)| next)
                    .unwrap_or(sentinel as usize)
                    .min(num_glyphs);
                for slot in fds.iter_mut().take(end).skip(first) {
                    *slot = fd;
                }
            }
            Ok((i, fds))
        },
        _ => fail(input),
    }
}

/// `(major version, header size)`
fn header(input: &[u8]) -> Parsed<'_, (u8, u8)> {
    let (i, major) = be_u8(input)?;
    let (i, _minor) = be_u8(i)?;
    let (i, header_size) = be_u8(i)?;
    Ok((i, (major, header_size)))
}

fn cff_error(what: &str, err: nom::Err<nom::error::Error<&[u8]>>) -> Error {
    let detail = match err {
        nom::Err::Incomplete(_) => "truncated data".to_string(),
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            format!("{:?} with {} bytes left", e.code, e.input.len())
        },
    };
    Error::Cff(format!("{}: {}", what, detail))
}

#[derive(Debug, Clone)]
struct PrivateDict<'a> {
    dict: Dict<'a>,
    subrs: Option<Index<'a>>,
}

impl PrivateDict<'_> {
    /// Encoded DICT followed by its local subroutines, and the DICT length.
    fn encode(&self) -> (Vec<u8>, usize) {
        let mut dict = self.dict.clone();
        if self.subrs.is_some() {
            // Subrs is relative to the DICT start and sits right behind it
            dict.set_ints(op::SUBRS, &[0]);
            let len = dict.encode().len();
            dict.set_ints(op::SUBRS, &[len as i32]);
        } else {
            dict.remove(op::SUBRS);
        }

        let mut out = dict.encode();
        let dict_len = out.len();
        if let Some(subrs) = &self.subrs {
            out.extend(encode_index(subrs.items.iter().copied()));
        }
        (out, dict_len)
    }
}

fn private_dict<'a>(data: &'a [u8], owner: &Dict<'a>) -> Result<PrivateDict<'a>> {
    let size = owner
        .offset(op::PRIVATE, 0)
        .ok_or_else(|| Error::Cff("missing Private DICT".to_string()))?;
    let start = owner
        .offset(op::PRIVATE, 1)
        .ok_or_else(|| Error::Cff("missing Private DICT offset".to_string()))?;
    let bytes = data
        .get(start..start.saturating_add(size))
        .ok_or_else(|| Error::Cff("Private DICT out of bounds".to_string()))?;

    let (_, dict) = dict(bytes).map_err(|e| cff_error("Private DICT", e))?;

    let subrs = match dict.offset(op::SUBRS, 0) {
        Some(relative) => {
            let subrs_data = data
                .get(start + relative..)
                .ok_or_else(|| Error::Cff("Subrs out of bounds".to_string()))?;
            Some(index(subrs_data).map_err(|e| cff_error("Subrs INDEX", e))?.1)
        },
        None => None,
    };

    Ok(PrivateDict { dict, subrs })
}

#[derive(Debug, Clone)]
enum FontDicts<'a> {
    NameKeyed {
        private: PrivateDict<'a>,
    },
    CidKeyed {
        fd_select: Vec<u8>,
        fd_array: Vec<(Dict<'a>, PrivateDict<'a>)>,
    },
}

/// A parsed CFF font program (first font of the FontSet).
#[derive(Debug, Clone)]
pub struct CffFont<'a> {
    names: Index<'a>,
    top_dict: Dict<'a>,
    strings: Index<'a>,
    global_subrs: Index<'a>,
    char_strings: Index<'a>,
    charset: Vec<u16>,
    dicts: FontDicts<'a>,
}

impl<'a> CffFont<'a> {
    /// Parse a `CFF ` table.
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let (_, (major, header_size)) = header(data).map_err(|e| cff_error("header", e))?;

        if major != 1 {
            return Err(Error::UnsupportedFormat(format!("CFF major version {}", major)));
        }

        let body = data
            .get(header_size as usize..)
            .ok_or_else(|| Error::Cff("header size beyond data".to_string()))?;
        let (i, names) = index(body).map_err(|e| cff_error("Name INDEX", e))?;
        let (i, top_dicts) = index(i).map_err(|e| cff_error("Top DICT INDEX", e))?;
        let (i, strings) = index(i).map_err(|e| cff_error("String INDEX", e))?;
        let (_, global_subrs) = index(i).map_err(|e| cff_error("Global Subr INDEX", e))?;

        let top_data = top_dicts
            .items
            .first()
            .ok_or_else(|| Error::Cff("empty Top DICT INDEX".to_string()))?;
        let (_, top_dict) = dict(top_data).map_err(|e| cff_error("Top DICT", e))?;

        let char_strings_at = top_dict
            .offset(op::CHAR_STRINGS, 0)
            .ok_or_else(|| Error::Cff("missing CharStrings".to_string()))?;
        let (_, char_strings) = index(data.get(char_strings_at..).unwrap_or_default())
            .map_err(|e| cff_error("CharStrings INDEX", e))?;
        let num_glyphs = char_strings.len();
        if num_glyphs == 0 {
            return Err(Error::Cff("font has no glyphs".to_string()));
        }

        let charset = match top_dict.offset(op::CHARSET, 0).unwrap_or(0) {
            // ISOAdobe: glyph i has SID i
            0 => (0..num_glyphs as u16).collect(),
            1 | 2 => {
                return Err(Error::UnsupportedFormat("predefined expert charset".to_string()));
            },
            at => {
                charset(data.get(at..).unwrap_or_default(), num_glyphs)
                    .map_err(|e| cff_error("charset", e))?
                    .1
            },
        };

        let dicts = if top_dict.get(op::ROS).is_some() {
            let select_at = top_dict
                .offset(op::FD_SELECT, 0)
                .ok_or_else(|| Error::Cff("CID font without FDSelect".to_string()))?;
            let array_at = top_dict
                .offset(op::FD_ARRAY, 0)
                .ok_or_else(|| Error::Cff("CID font without FDArray".to_string()))?;

            let (_, fd_select) = fd_select(data.get(select_at..).unwrap_or_default(), num_glyphs)
                .map_err(|e| cff_error("FDSelect", e))?;
            let (_, fd_index) = index(data.get(array_at..).unwrap_or_default())
                .map_err(|e| cff_error("FDArray", e))?;

            let mut fd_array = Vec::with_capacity(fd_index.len());
            for item in &fd_index.items {
                let (_, font_dict) = dict(item).map_err(|e| cff_error("Font DICT", e))?;
                let private = private_dict(data, &font_dict)?;
                fd_array.push((font_dict, private));
            }
            if fd_select.iter().any(|&fd| fd as usize >= fd_array.len()) {
                return Err(Error::Cff("FDSelect refers past FDArray".to_string()));
            }

            FontDicts::CidKeyed { fd_select, fd_array }
        } else {
            FontDicts::NameKeyed {
                private: private_dict(data, &top_dict)?,
            }
        };

        Ok(Self {
            names,
            top_dict,
            strings,
            global_subrs,
            char_strings,
            charset,
            dicts,
        })
    }

    pub fn glyph_count(&self) -> usize {
        self.char_strings.len()
    }

    pub fn is_cid_keyed(&self) -> bool {
        matches!(self.dicts, FontDicts::CidKeyed { .. })
    }

    /// Build a CFF program whose glyph `k` is source glyph `glyphs[k]`.
    ///
    /// Name-keyed fonts get a custom Encoding mapping code `k` to glyph `k`.
    /// CID-keyed fonts get CID `k` for glyph `k`. At most 256 glyphs.
    pub fn subset(&self, glyphs: &[u16]) -> Result<Vec<u8>> {
        if glyphs.is_empty() || glyphs.len() > 256 {
            return Err(Error::invalid(format!("CFF subset of {} glyphs", glyphs.len())));
        }
        if let Some(&bad) = glyphs.iter().find(|&&g| g as usize >= self.glyph_count()) {
            return Err(Error::invalid(format!("glyph {} not in CFF font", bad)));
        }

        let char_strings =
            encode_index(glyphs.iter().map(|&g| self.char_strings.items[g as usize]));

        let mut charset = vec![0u8];
        for (slot, &glyph) in glyphs.iter().enumerate().skip(1) {
            let id = if self.is_cid_keyed() {
                slot as u16
            } else {
                self.charset.get(glyph as usize).copied().unwrap_or(0)
            };
            charset.extend_from_slice(&id.to_be_bytes());
        }

        let names = encode_index(self.names.items.iter().copied());
        let strings = encode_index(self.strings.items.iter().copied());
        let global_subrs = encode_index(self.global_subrs.items.iter().copied());

        let mut top = self.top_dict.clone();
        top.set_ints(op::CHARSET, &[0]);
        top.set_ints(op::CHAR_STRINGS, &[0]);

        match &self.dicts {
            FontDicts::NameKeyed { private } => {
                let mut encoding = vec![0u8, (glyphs.len() - 1) as u8];
                encoding.extend((1..glyphs.len()).map(|code| code as u8));
                let (private_bytes, private_len) = private.encode();

                top.set_ints(op::ENCODING, &[0]);
                top.set_ints(op::PRIVATE, &[0, 0]);
                let header_len = 4
                    + names.len()
                    + encode_index([top.encode().as_slice()]).len()
                    + strings.len()
                    + global_subrs.len();

                let charset_at = header_len;
                let encoding_at = charset_at + charset.len();
                let char_strings_at = encoding_at + encoding.len();
                let private_at = char_strings_at + char_strings.len();

                top.set_ints(op::CHARSET, &[charset_at as i32]);
                top.set_ints(op::ENCODING, &[encoding_at as i32]);
                top.set_ints(op::CHAR_STRINGS, &[char_strings_at as i32]);
                top.set_ints(op::PRIVATE, &[private_len as i32, private_at as i32]);

                let mut out = vec![1, 0, 4, 4];
                out.extend(names);
                out.extend(encode_index([top.encode().as_slice()]));
                out.extend(strings);
                out.extend(global_subrs);
                out.extend(charset);
                out.extend(encoding);
                out.extend(char_strings);
                out.extend(private_bytes);
                Ok(out)
            },
            FontDicts::CidKeyed { fd_select, fd_array } => {
                let mut select = vec![0u8];
                select.extend(glyphs.iter().map(|&g| fd_select[g as usize]));

                top.remove(op::ENCODING);
                top.remove(op::PRIVATE);
                top.set_ints(op::CID_COUNT, &[glyphs.len() as i32]);
                top.set_ints(op::FD_SELECT, &[0]);
                top.set_ints(op::FD_ARRAY, &[0]);

                let header_len = 4
                    + names.len()
                    + encode_index([top.encode().as_slice()]).len()
                    + strings.len()
                    + global_subrs.len();
                let charset_at = header_len;
                let select_at = charset_at + charset.len();
                let char_strings_at = select_at + select.len();
                let fd_array_at = char_strings_at + char_strings.len();

                let privates: Vec<(Vec<u8>, usize)> =
                    fd_array.iter().map(|(_, p)| p.encode()).collect();
                let mut font_dicts: Vec<Dict> = fd_array.iter().map(|(d, _)| d.clone()).collect();
                for font_dict in &mut font_dicts {
                    font_dict.set_ints(op::PRIVATE, &[0, 0]);
                }
                let placeholder: Vec<Vec<u8>> = font_dicts.iter().map(Dict::encode).collect();
                let fd_array_len = encode_index(placeholder.iter().map(Vec::as_slice)).len();

                let mut private_at = fd_array_at + fd_array_len;
                for (font_dict, (bytes, dict_len)) in font_dicts.iter_mut().zip(&privates) {
                    font_dict.set_ints(op::PRIVATE, &[*dict_len as i32, private_at as i32]);
                    private_at += bytes.len();
                }
                let encoded_dicts: Vec<Vec<u8>> = font_dicts.iter().map(|d| d.encode()).collect();

                top.set_ints(op::CHARSET, &[charset_at as i32]);
                top.set_ints(op::FD_SELECT, &[select_at as i32]);
                top.set_ints(op::CHAR_STRINGS, &[char_strings_at as i32]);
                top.set_ints(op::FD_ARRAY, &[fd_array_at as i32]);

                let mut out = vec![1, 0, 4, 4];
                out.extend(names);
                out.extend(encode_index([top.encode().as_slice()]));
                out.extend(strings);
                out.extend(global_subrs);
                out.extend(charset);
                out.extend(select);
                out.extend(char_strings);
                out.extend(encode_index(encoded_dicts.iter().map(|d| d.as_slice())));
                for (bytes, _) in privates {
                    out.extend(bytes);
                }
                Ok(out)
            },
        }
    }
}
