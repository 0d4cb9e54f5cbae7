//! Low-level xlsx reader.
//!
//! Reads the workbook package directly: the zip archive is opened, the first
//! sheet is located through `xl/workbook.xml` and its relationships, shared
//! strings are loaded, and the sheet XML is walked cell by cell. Needs
//! nothing beyond zip and an XML tokenizer, so it is always available.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::num::IntErrorKind;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use zip::ZipArchive;
use zip::result::ZipError;

use product_index_core::CellValue;

use crate::error::SheetError;
use crate::{Grid, SheetReader, normalize_grid, place_cell};

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";
const DEFAULT_SHEET_PART: &str = "xl/worksheets/sheet1.xml";

/// Column count of the largest Excel sheet (`XFD`).
pub const MAX_COLUMNS: usize = 16_384;
/// Row count of the largest Excel sheet.
pub const MAX_ROWS: usize = 1_048_576;

/// Cell-by-cell reader for `.xlsx` workbooks.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxReader;

impl XlsxReader {
    pub fn new() -> Self {
        Self
    }
}

impl SheetReader for XlsxReader {
    fn name(&self) -> &'static str {
        "xlsx"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["xlsx", "xlsm"]
    }

    fn read_first_sheet(&self, path: &Path) -> Result<Grid, SheetError> {
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(BufReader::new(file))?;
        read_first_sheet_from_archive(&mut archive)
    }
}

/// Read the first worksheet from an opened workbook package.
pub fn read_first_sheet_from_archive<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> Result<Grid, SheetError> {
    let sheet_part = locate_first_sheet(archive)?;
    let shared = match read_part(archive, SHARED_STRINGS_PART)? {
        Some(xml) => parse_shared_strings(&xml)?,
        None => Vec::new(),
    };
    let sheet_xml = read_part(archive, &sheet_part)?
        .ok_or_else(|| SheetError::missing_part(sheet_part.clone()))?;
    parse_sheet(&sheet_xml, &shared)
}

/// Read a whole archive member, or `None` if it does not exist.
fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<Vec<u8>>, SheetError> {
    match archive.by_name(name) {
        Ok(mut file) => {
            let mut buf = Vec::new();
            file.read_to_end(&mut buf)?;
            Ok(Some(buf))
        }
        Err(ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Resolve the archive path of the first `<sheet>` listed in the workbook.
fn locate_first_sheet<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<String, SheetError> {
    let workbook =
        read_part(archive, WORKBOOK_PART)?.ok_or_else(|| SheetError::missing_part(WORKBOOK_PART))?;
    let Some(rel_id) = first_sheet_rel_id(&workbook)? else {
        return Err(SheetError::missing_part("workbook lists no sheets"));
    };

    let target = match read_part(archive, WORKBOOK_RELS_PART)? {
        Some(rels) => relationship_target(&rels, &rel_id)?,
        None => None,
    };

    Ok(match target {
        Some(t) => resolve_target(&t),
        None => {
            log::debug!("No relationship target for sheet {rel_id}; assuming {DEFAULT_SHEET_PART}");
            DEFAULT_SHEET_PART.to_string()
        }
    })
}

/// Relationship targets are relative to `xl/` unless absolute.
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    }
}

fn first_sheet_rel_id(xml: &[u8]) -> Result<Option<String>, SheetError> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) | Event::Empty(ref e) if e.local_name().as_ref() == b"sheet" => {
                for attr in e.attributes() {
                    let attr = attr?;
                    if attr.key.local_name().as_ref() == b"id" {
                        return Ok(Some(String::from_utf8_lossy(&attr.value).to_string()));
                    }
                }
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
        buf.clear();
    }
}

fn relationship_target(xml: &[u8], rel_id: &str) -> Result<Option<String>, SheetError> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) | Event::Empty(ref e)
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let mut id = None;
                let mut target = None;
                for attr in e.attributes() {
                    let attr = attr?;
                    match attr.key.as_ref() {
                        b"Id" => id = Some(String::from_utf8_lossy(&attr.value).to_string()),
                        b"Target" => target = Some(attr.unescape_value()?.to_string()),
                        _ => {}
                    }
                }
                if id.as_deref() == Some(rel_id) {
                    return Ok(target);
                }
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
        buf.clear();
    }
}

/// Parse `xl/sharedStrings.xml` into the shared string table.
///
/// Rich-text runs are concatenated; phonetic (`rPh`) runs are skipped.
pub fn parse_shared_strings(xml: &[u8]) -> Result<Vec<String>, SheetError> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_text = false;
    let mut in_phonetic = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"si" => current.clear(),
                b"t" => in_text = true,
                b"rPh" => in_phonetic = true,
                _ => {}
            },
            Event::Empty(ref e) => {
                if e.local_name().as_ref() == b"si" {
                    strings.push(String::new());
                }
            }
            Event::Text(ref e) => {
                if in_text && !in_phonetic {
                    current.push_str(&e.unescape()?);
                }
            }
            Event::CData(ref e) => {
                if in_text && !in_phonetic {
                    current.push_str(&String::from_utf8_lossy(e));
                }
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"si" => strings.push(std::mem::take(&mut current)),
                b"t" => in_text = false,
                b"rPh" => in_phonetic = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(strings)
}

/// The `t` attribute of a `<c>` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Number,
    SharedString,
    InlineString,
    FormulaString,
    Boolean,
    Error,
    IsoDate,
}

impl CellKind {
    fn from_attr(value: &[u8]) -> Self {
        match value {
            b"s" => Self::SharedString,
            b"inlineStr" => Self::InlineString,
            b"str" => Self::FormulaString,
            b"b" => Self::Boolean,
            b"e" => Self::Error,
            b"d" => Self::IsoDate,
            _ => Self::Number,
        }
    }
}

/// A `<c>` element being assembled while walking the sheet.
struct PendingCell {
    row: usize,
    col: usize,
    kind: CellKind,
    value: String,
    inline: String,
}

impl PendingCell {
    fn resolve(&self, shared: &[String]) -> Option<CellValue> {
        match self.kind {
            CellKind::SharedString => {
                let index: usize = self.value.trim().parse().ok()?;
                shared.get(index).and_then(|s| CellValue::from_text(s))
            }
            CellKind::InlineString => CellValue::from_text(&self.inline),
            CellKind::FormulaString | CellKind::IsoDate => CellValue::from_text(&self.value),
            CellKind::Boolean => match self.value.trim() {
                "1" => Some(CellValue::Bool(true)),
                "0" => Some(CellValue::Bool(false)),
                _ => None,
            },
            CellKind::Error => None,
            CellKind::Number => {
                let raw = self.value.trim();
                if raw.is_empty() {
                    return None;
                }
                match raw.parse::<f64>() {
                    Ok(n) => Some(CellValue::from_number(n)),
                    Err(_) => CellValue::from_text(raw),
                }
            }
        }
    }
}

/// Split an A1-style reference into zero-based `(row, col)`.
///
/// Either part may be missing (`"C"`, `"7"`), in which case it is `None`.
/// References past column `XFD` or row 1048576 are rejected.
pub fn parse_cell_ref(reference: &str) -> Result<(Option<usize>, Option<usize>), SheetError> {
    let letters: String = reference
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    let digits = &reference[letters.len()..];

    let col = if letters.is_empty() {
        None
    } else {
        let n = letters
            .bytes()
            .try_fold(0usize, |acc, b| {
                acc.checked_mul(26)?
                    .checked_add((b.to_ascii_uppercase() - b'A' + 1) as usize)
            })
            .filter(|n| *n <= MAX_COLUMNS)
            .ok_or_else(|| SheetError::cell_out_of_range(reference))?;
        Some(n - 1)
    };
    let row = parse_row_number(digits, reference)?;
    Ok((row, col))
}

/// One-based row text to a zero-based index; `None` for text that is not a
/// positive number.
fn parse_row_number(digits: &str, reference: &str) -> Result<Option<usize>, SheetError> {
    match digits.trim().parse::<usize>() {
        Ok(r) if r > MAX_ROWS => Err(SheetError::cell_out_of_range(reference)),
        Ok(0) => Ok(None),
        Ok(r) => Ok(Some(r - 1)),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => {
            Err(SheetError::cell_out_of_range(reference))
        }
        Err(_) => Ok(None),
    }
}

fn start_cell(e: &BytesStart<'_>, row: usize, next_col: usize) -> Result<PendingCell, SheetError> {
    let mut col = next_col;
    let mut kind = CellKind::Number;
    for attr in e.attributes() {
        let attr = attr?;
        match attr.key.local_name().as_ref() {
            b"r" => {
                let reference = String::from_utf8_lossy(&attr.value);
                if let (_, Some(c)) = parse_cell_ref(&reference)? {
                    col = c;
                }
            }
            b"t" => kind = CellKind::from_attr(&attr.value),
            _ => {}
        }
    }
    if col >= MAX_COLUMNS {
        return Err(SheetError::cell_out_of_range(format!("column {}", col + 1)));
    }
    Ok(PendingCell {
        row,
        col,
        kind,
        value: String::new(),
        inline: String::new(),
    })
}

fn row_index(e: &BytesStart<'_>, next_row: usize) -> Result<usize, SheetError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == b"r" {
            let reference = String::from_utf8_lossy(&attr.value);
            if let Some(r) = parse_row_number(&reference, &reference)? {
                return Ok(r);
            }
        }
    }
    if next_row >= MAX_ROWS {
        return Err(SheetError::cell_out_of_range(format!("row {}", next_row + 1)));
    }
    Ok(next_row)
}

/// Walk a worksheet XML document into a normalized grid.
pub fn parse_sheet(xml: &[u8], shared: &[String]) -> Result<Grid, SheetError> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut grid = Grid::new();

    let mut next_row = 0usize;
    let mut current_row = 0usize;
    let mut next_col = 0usize;
    let mut cell: Option<PendingCell> = None;
    let mut in_value = false;
    let mut in_inline_text = false;
    let mut in_phonetic = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"row" => {
                    current_row = row_index(e, next_row)?;
                    next_col = 0;
                }
                b"c" => cell = Some(start_cell(e, current_row, next_col)?),
                b"v" => in_value = true,
                b"t" => in_inline_text = cell.is_some(),
                b"rPh" => in_phonetic = true,
                _ => {}
            },
            Event::Empty(ref e) => match e.local_name().as_ref() {
                b"row" => {
                    current_row = row_index(e, next_row)?;
                    next_row = current_row + 1;
                }
                b"c" => {
                    let empty = start_cell(e, current_row, next_col)?;
                    next_col = empty.col + 1;
                }
                _ => {}
            },
            Event::Text(ref e) => {
                if let Some(ref mut c) = cell {
                    if in_value {
                        c.value.push_str(&e.unescape()?);
                    } else if in_inline_text && !in_phonetic {
                        c.inline.push_str(&e.unescape()?);
                    }
                }
            }
            Event::CData(ref e) => {
                if let Some(ref mut c) = cell {
                    let text = String::from_utf8_lossy(e);
                    if in_value {
                        c.value.push_str(&text);
                    } else if in_inline_text && !in_phonetic {
                        c.inline.push_str(&text);
                    }
                }
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"row" => next_row = current_row + 1,
                b"c" => {
                    if let Some(c) = cell.take() {
                        next_col = c.col + 1;
                        let value = c.resolve(shared);
                        if value.is_some() {
                            place_cell(&mut grid, c.row, c.col, value);
                        }
                    }
                }
                b"v" => in_value = false,
                b"t" => in_inline_text = false,
                b"rPh" => in_phonetic = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(normalize_grid(grid))
}
