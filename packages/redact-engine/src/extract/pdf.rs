//! Minimal PDF text walker on top of `lopdf`.
//!
//! Interprets the text-showing and positioning operators of each page's
//! content stream and emits positioned text items. Glyph widths are not
//! read from font programs; advances are estimated from the font size.

use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};
use std::collections::HashMap;

use crate::error::Result;

/// Fallback when a page has no usable `MediaBox` (US Letter).
const DEFAULT_PAGE_WIDTH: f64 = 612.0;

/// Average glyph advance as a fraction of the font size.
const AVG_GLYPH_WIDTH: f64 = 0.5;

/// TJ adjustments at or below this (thousandths of an em) read as a word gap.
const TJ_SPACE_THRESHOLD: f64 = -200.0;

/// A run of text placed on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub font_size: f64,
    pub font_name: String,
}

/// Text items for every page, in page order.
#[derive(Debug, Default)]
pub struct PdfText {
    pub pages: Vec<Vec<TextItem>>,
    pub first_page_width: f64,
}

/// Affine matrix in PDF order `[a b c d e f]`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix([f64; 6]);

impl Matrix {
    const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    fn translate(tx: f64, ty: f64) -> Self {
        Matrix([1.0, 0.0, 0.0, 1.0, tx, ty])
    }

    /// `self × other` in PDF row-vector convention.
    fn then(&self, other: &Matrix) -> Matrix {
        let [a1, b1, c1, d1, e1, f1] = self.0;
        let [a2, b2, c2, d2, e2, f2] = other.0;
        Matrix([
            a1 * a2 + b1 * c2,
            a1 * b2 + b1 * d2,
            c1 * a2 + d1 * c2,
            c1 * b2 + d1 * d2,
            e1 * a2 + f1 * c2 + e2,
            e1 * b2 + f1 * d2 + f2,
        ])
    }

    fn horizontal_scale(&self) -> f64 {
        self.0[0].hypot(self.0[1])
    }

    fn vertical_scale(&self) -> f64 {
        self.0[2].hypot(self.0[3])
    }
}

/// Text state carried across operators inside one content stream.
struct TextState {
    ctm: Matrix,
    ctm_stack: Vec<Matrix>,
    tm: Matrix,
    tlm: Matrix,
    font_size: f64,
    font_resource: Vec<u8>,
    horizontal_scaling: f64,
    leading: f64,
    rise: f64,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            ctm_stack: Vec::new(),
            tm: Matrix::IDENTITY,
            tlm: Matrix::IDENTITY,
            font_size: 0.0,
            font_resource: Vec::new(),
            horizontal_scaling: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

impl TextState {
    fn move_line(&mut self, tx: f64, ty: f64) {
        self.tlm = Matrix::translate(tx, ty).then(&self.tlm);
        self.tm = self.tlm;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.leading);
    }

    /// Emit an item for `text` at the current position and advance past it.
    fn show(&mut self, text: String, fonts: &HashMap<Vec<u8>, String>) -> Option<TextItem> {
        let render = Matrix([
            self.font_size * self.horizontal_scaling,
            0.0,
            0.0,
            self.font_size,
            0.0,
            self.rise,
        ])
        .then(&self.tm)
        .then(&self.ctm);

        let advance = AVG_GLYPH_WIDTH
            * text.chars().count() as f64
            * self.font_size
            * self.horizontal_scaling;
        let width = advance * self.tm.then(&self.ctm).horizontal_scale();
        self.tm = Matrix::translate(advance, 0.0).then(&self.tm);

        if text.trim().is_empty() {
            return None;
        }

        Some(TextItem {
            text,
            x: render.0[4],
            y: render.0[5],
            width,
            font_size: render.horizontal_scale().max(render.vertical_scale()),
            font_name: fonts
                .get(&self.font_resource)
                .cloned()
                .unwrap_or_default(),
        })
    }

    /// Shift the text matrix by a TJ adjustment (thousandths of an em).
    fn adjust(&mut self, amount: f64) {
        let tx = -amount / 1000.0 * self.font_size * self.horizontal_scaling;
        self.tm = Matrix::translate(tx, 0.0).then(&self.tm);
    }
}

/// Decode every page of a PDF held in memory.
pub fn read_pdf(bytes: &[u8]) -> Result<PdfText> {
    let doc = Document::load_mem(bytes)?;
    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();

    let mut text = PdfText {
        pages: Vec::with_capacity(page_ids.len()),
        first_page_width: DEFAULT_PAGE_WIDTH,
    };

    for (index, page_id) in page_ids.into_iter().enumerate() {
        if index == 0 {
            text.first_page_width = page_width(&doc, page_id);
        }
        text.pages.push(page_items(&doc, page_id)?);
    }

    Ok(text)
}

fn page_items(doc: &Document, page_id: ObjectId) -> Result<Vec<TextItem>> {
    let fonts = page_fonts(doc, page_id);
    let data = doc.get_page_content(page_id)?;
    let content = Content::decode(&data)?;

    let mut state = TextState::default();
    let mut items = Vec::new();

    for op in &content.operations {
        let operands = &op.operands;
        match op.operator.as_str() {
            "q" => state.ctm_stack.push(state.ctm),
            "Q" => {
                if let Some(ctm) = state.ctm_stack.pop() {
                    state.ctm = ctm;
                }
            }
            "cm" => {
                if let Some(m) = matrix_operand(operands) {
                    state.ctm = m.then(&state.ctm);
                }
            }
            "BT" => {
                state.tm = Matrix::IDENTITY;
                state.tlm = Matrix::IDENTITY;
            }
            "Tf" => {
                if let Some(Object::Name(name)) = operands.first() {
                    state.font_resource = name.clone();
                }
                if let Some(size) = operands.get(1).and_then(number) {
                    state.font_size = size;
                }
            }
            "Tz" => {
                if let Some(scale) = operands.first().and_then(number) {
                    state.horizontal_scaling = scale / 100.0;
                }
            }
            "TL" => {
                if let Some(leading) = operands.first().and_then(number) {
                    state.leading = leading;
                }
            }
            "Ts" => {
                if let Some(rise) = operands.first().and_then(number) {
                    state.rise = rise;
                }
            }
            "Td" | "TD" => {
                if let (Some(tx), Some(ty)) = (
                    operands.first().and_then(number),
                    operands.get(1).and_then(number),
                ) {
                    if op.operator == "TD" {
                        state.leading = -ty;
                    }
                    state.move_line(tx, ty);
                }
            }
            "Tm" => {
                if let Some(m) = matrix_operand(operands) {
                    state.tlm = m;
                    state.tm = m;
                }
            }
            "T*" => state.next_line(),
            "Tj" => {
                if let Some(s) = operands.first().and_then(string_operand) {
                    items.extend(state.show(s, &fonts));
                }
            }
            "'" => {
                state.next_line();
                if let Some(s) = operands.first().and_then(string_operand) {
                    items.extend(state.show(s, &fonts));
                }
            }
            "\"" => {
                state.next_line();
                if let Some(s) = operands.get(2).and_then(string_operand) {
                    items.extend(state.show(s, &fonts));
                }
            }
            "TJ" => {
                if let Some(Object::Array(parts)) = operands.first() {
                    items.extend(show_array(&mut state, parts, &fonts));
                }
            }
            _ => {}
        }
    }

    Ok(items)
}

/// Collapse a TJ array into a single item, turning wide gaps into spaces.
fn show_array(
    state: &mut TextState,
    parts: &[Object],
    fonts: &HashMap<Vec<u8>, String>,
) -> Option<TextItem> {
    let mut text = String::new();
    let mut kern = 0.0;

    for part in parts {
        if let Some(s) = string_operand(part) {
            text.push_str(&s);
        } else if let Some(n) = number(part) {
            kern += n;
            if n <= TJ_SPACE_THRESHOLD && !text.ends_with(' ') {
                text.push(' ');
            }
        }
    }

    let item = state.show(text, fonts);
    state.adjust(kern);
    item
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Look up a page attribute, following `Parent` links for inherited keys.
fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    // Page trees are shallow; the bound guards against Parent cycles.
    for _ in 0..64 {
        if let Ok(obj) = node.get(key) {
            return resolve(doc, obj);
        }
        let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

fn page_width(doc: &Document, page_id: ObjectId) -> f64 {
    let Some(Object::Array(media_box)) = inherited(doc, page_id, b"MediaBox") else {
        return DEFAULT_PAGE_WIDTH;
    };
    let coords: Vec<f64> = media_box
        .iter()
        .filter_map(|o| resolve(doc, o).and_then(number))
        .collect();
    match coords.as_slice() {
        [x0, _, x1, _] if (x1 - x0).abs() > 0.0 => (x1 - x0).abs(),
        _ => DEFAULT_PAGE_WIDTH,
    }
}

/// Resource name → `BaseFont` for the fonts a page can use.
fn page_fonts(doc: &Document, page_id: ObjectId) -> HashMap<Vec<u8>, String> {
    let mut fonts = HashMap::new();
    let Some(Object::Dictionary(resources)) = inherited(doc, page_id, b"Resources") else {
        return fonts;
    };
    let Some(Object::Dictionary(font_dict)) = resources
        .get(b"Font")
        .ok()
        .and_then(|o| resolve(doc, o))
    else {
        return fonts;
    };

    for (name, obj) in font_dict.iter() {
        let base_font = resolve(doc, obj)
            .and_then(|o| o.as_dict().ok())
            .and_then(|d| d.get(b"BaseFont").ok())
            .and_then(|o| o.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).into_owned())
            .unwrap_or_default();
        fonts.insert(name.clone(), base_font);
    }

    fonts
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

fn matrix_operand(operands: &[Object]) -> Option<Matrix> {
    if operands.len() < 6 {
        return None;
    }
    let mut m = [0.0; 6];
    for (slot, obj) in m.iter_mut().zip(operands) {
        *slot = number(obj)?;
    }
    Some(Matrix(m))
}

fn string_operand(obj: &Object) -> Option<String> {
    match obj {
        Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
        _ => None,
    }
}

/// UTF-16BE when a byte-order mark is present, otherwise one char per byte.
fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(body) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = body
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    bytes
        .iter()
        .map(|&b| char::from(b))
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}
