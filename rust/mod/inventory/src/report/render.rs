//! PDF rendering of a `DocumentDefinition`.
//!
//! `LopdfRenderer` flows content top to bottom on A4 pages, breaking before
//! a block that would cross the bottom margin. Tables repeat their header
//! rows on every page they span. Header and footer are stamped once the
//! page count is known, so the footer can say "page X of Y".

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object};
use thiserror::Error;

use super::layout::{
    palette, Alignment, Color, DocumentDefinition, Header, Margin, Node, Style, Table,
    TableLayout, Text,
};
use super::metrics::{encode_win_ansi, text_width, wrap, Font};

pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;

const LINE_HEIGHT: f32 = 1.2;
const BASELINE: f32 = 0.95;
const CELL_PADDING: f32 = 4.0;
const FOOTER_OFFSET: f32 = 20.0;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("{0}")]
    Pdf(String),
    #[error("invalid layout: {0}")]
    Layout(String),
}

/// Turns a document definition into PDF bytes.
pub trait PdfRenderer: Send + Sync {
    fn render(&self, document: &DocumentDefinition) -> Result<Vec<u8>, RenderError>;
}

/// Uncompressed PDF 1.5 using the standard Helvetica faces.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfRenderer;

impl PdfRenderer for LopdfRenderer {
    fn render(&self, document: &DocumentDefinition) -> Result<Vec<u8>, RenderError> {
        let mut flow = Flow::new(document.page_margins);
        for node in &document.content {
            match node {
                Node::Text(text) => flow.place_text(text),
                Node::Columns(columns) => flow.place_columns(columns),
                Node::Table(table) => flow.place_table(table)?,
            }
        }

        let mut pages = flow.pages;
        let total = pages.len();
        for (index, canvas) in pages.iter_mut().enumerate() {
            if let Some(header) = &document.header {
                draw_header(canvas, header);
            }
            if let Some(footer) = &document.footer {
                draw_footer(canvas, &footer(index + 1, total), &document.page_margins);
            }
        }
        assemble(pages)
    }
}

// ── drawing primitives ──────────────────────────────────────────────

#[derive(Default)]
struct Canvas {
    ops: Vec<Operation>,
}

impl Canvas {
    fn text(&mut self, x: f32, baseline: f32, line: &str, style: &Style) {
        if line.is_empty() {
            return;
        }
        let font = Font::for_style(style.bold, style.italic);
        let [r, g, b] = style.color.unit();
        self.ops.extend([
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![name(font.resource_name()), style.font_size.into()],
            ),
            Operation::new("rg", vec![r.into(), g.into(), b.into()]),
            Operation::new("Td", vec![x.into(), baseline.into()]),
            Operation::new("Tj", vec![Object::string_literal(encode_win_ansi(line))]),
            Operation::new("ET", vec![]),
        ]);
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        let [r, g, b] = color.unit();
        self.ops.extend([
            Operation::new("q", vec![]),
            Operation::new("rg", vec![r.into(), g.into(), b.into()]),
            Operation::new("re", vec![x.into(), y.into(), width.into(), height.into()]),
            Operation::new("f", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }

    fn hline(&mut self, x1: f32, x2: f32, y: f32, line_width: f32, color: Color) {
        let [r, g, b] = color.unit();
        self.ops.extend([
            Operation::new("q", vec![]),
            Operation::new("RG", vec![r.into(), g.into(), b.into()]),
            Operation::new("w", vec![line_width.into()]),
            Operation::new("m", vec![x1.into(), y.into()]),
            Operation::new("l", vec![x2.into(), y.into()]),
            Operation::new("S", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }
}

fn name(value: &str) -> Object {
    Object::Name(value.as_bytes().to_vec())
}

/// A text wrapped to a fixed width.
struct Block {
    style: Style,
    font: Font,
    lines: Vec<String>,
    height: f32,
}

impl Block {
    fn layout(text: &Text, width: f32) -> Self {
        let style = text.resolve();
        let font = Font::for_style(style.bold, style.italic);
        let inner = (width - style.margin.left - style.margin.right).max(1.0);
        let lines = wrap(font, style.font_size, &text.text, inner);
        let height = style.margin.top
            + lines.len() as f32 * style.font_size * LINE_HEIGHT
            + style.margin.bottom;
        Self {
            style,
            font,
            lines,
            height,
        }
    }

    fn draw(&self, canvas: &mut Canvas, x: f32, top: f32, width: f32) {
        let margin = self.style.margin;
        let inner = width - margin.left - margin.right;
        let line_height = self.style.font_size * LINE_HEIGHT;
        for (i, line) in self.lines.iter().enumerate() {
            let line_top = top - margin.top - i as f32 * line_height;
            let used = text_width(self.font, self.style.font_size, line);
            let offset = match self.style.alignment {
                Alignment::Left => 0.0,
                Alignment::Center => (inner - used) / 2.0,
                Alignment::Right => inner - used,
            };
            canvas.text(
                x + margin.left + offset.max(0.0),
                line_top - self.style.font_size * BASELINE,
                line,
                &self.style,
            );
        }
    }
}

struct RowLayout {
    cells: Vec<Block>,
    height: f32,
}

// ── page flow ───────────────────────────────────────────────────────

struct Flow {
    pages: Vec<Canvas>,
    y: f32,
    top: f32,
    bottom: f32,
    left: f32,
    width: f32,
    fresh: bool,
}

impl Flow {
    fn new(margins: Margin) -> Self {
        let top = PAGE_HEIGHT - margins.top;
        Self {
            pages: vec![Canvas::default()],
            y: top,
            top,
            bottom: margins.bottom,
            left: margins.left,
            width: PAGE_WIDTH - margins.left - margins.right,
            fresh: true,
        }
    }

    fn canvas(&mut self) -> &mut Canvas {
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    /// Start a new page if `height` does not fit below the cursor. An empty
    /// page never breaks, so oversized blocks overflow instead of looping.
    fn reserve(&mut self, height: f32) -> bool {
        if self.fresh || self.y - height >= self.bottom {
            return false;
        }
        self.pages.push(Canvas::default());
        self.y = self.top;
        self.fresh = true;
        true
    }

    fn advance(&mut self, height: f32) {
        self.y -= height;
        self.fresh = false;
    }

    fn place_text(&mut self, text: &Text) {
        let block = Block::layout(text, self.width);
        self.reserve(block.height);
        let (left, top, width) = (self.left, self.y, self.width);
        block.draw(self.canvas(), left, top, width);
        self.advance(block.height);
    }

    fn place_columns(&mut self, columns: &[Text]) {
        if columns.is_empty() {
            return;
        }
        let column_width = self.width / columns.len() as f32;
        let blocks: Vec<Block> = columns
            .iter()
            .map(|t| Block::layout(t, column_width))
            .collect();
        let height = blocks.iter().map(|b| b.height).fold(0.0, f32::max);
        self.reserve(height);
        let (left, top) = (self.left, self.y);
        for (i, block) in blocks.iter().enumerate() {
            block.draw(self.canvas(), left + i as f32 * column_width, top, column_width);
        }
        self.advance(height);
    }

    fn place_table(&mut self, table: &Table) -> Result<(), RenderError> {
        let columns = table.widths.len();
        if columns == 0 {
            return Err(RenderError::Layout("table has no columns".into()));
        }
        if let Some((index, row)) = table
            .body
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns)
        {
            return Err(RenderError::Layout(format!(
                "table row {} has {} cells, expected {}",
                index,
                row.len(),
                columns
            )));
        }
        let total: f32 = table.widths.iter().sum();
        if total <= 0.0 || table.widths.iter().any(|w| *w < 0.0) {
            return Err(RenderError::Layout("table widths must be positive".into()));
        }
        let widths: Vec<f32> = table.widths.iter().map(|w| w / total * self.width).collect();

        let rows: Vec<RowLayout> = table
            .body
            .iter()
            .map(|row| layout_row(row, &widths))
            .collect();
        let (head, body) = rows.split_at(table.header_rows.min(rows.len()));
        let head_height: f32 = head.iter().map(|r| r.height).sum();

        // Keep the header together with the first body row.
        self.reserve(head_height + body.first().map_or(0.0, |r| r.height));
        for row in head {
            self.draw_row(row, &widths);
        }
        let mut below_header = true;
        for row in body {
            if self.reserve(row.height) {
                for h in head {
                    self.draw_row(h, &widths);
                }
                below_header = true;
            }
            if table.layout == TableLayout::LightHorizontalLines {
                let (x1, x2, y) = (self.left, self.left + self.width, self.y);
                if !below_header {
                    self.canvas().hline(x1, x2, y, 1.0, palette::RULE);
                } else if !head.is_empty() {
                    self.canvas().hline(x1, x2, y, 2.0, Color::BLACK);
                }
            }
            self.draw_row(row, &widths);
            below_header = false;
        }
        Ok(())
    }

    fn draw_row(&mut self, row: &RowLayout, widths: &[f32]) {
        let top = self.y;
        let mut x = self.left;
        for (cell, width) in row.cells.iter().zip(widths) {
            let canvas = self.canvas();
            if let Some(fill) = cell.style.fill {
                canvas.fill_rect(x, top - row.height, *width, row.height, fill);
            }
            cell.draw(canvas, x + CELL_PADDING, top, width - 2.0 * CELL_PADDING);
            x += width;
        }
        self.advance(row.height);
    }
}

fn layout_row(row: &[Text], widths: &[f32]) -> RowLayout {
    let cells: Vec<Block> = row
        .iter()
        .zip(widths)
        .map(|(text, width)| Block::layout(text, width - 2.0 * CELL_PADDING))
        .collect();
    let height = cells.iter().map(|c| c.height).fold(0.0, f32::max);
    RowLayout { cells, height }
}

fn draw_header(canvas: &mut Canvas, header: &Header) {
    if header.columns.is_empty() {
        return;
    }
    let width = PAGE_WIDTH - header.margin.left - header.margin.right;
    let column_width = width / header.columns.len() as f32;
    let top = PAGE_HEIGHT - header.margin.top;
    for (i, text) in header.columns.iter().enumerate() {
        let x = header.margin.left + i as f32 * column_width;
        Block::layout(text, column_width).draw(canvas, x, top, column_width);
    }
}

fn draw_footer(canvas: &mut Canvas, footer: &Text, margins: &Margin) {
    let width = PAGE_WIDTH - margins.left - margins.right;
    let top = margins.bottom - FOOTER_OFFSET;
    Block::layout(footer, width).draw(canvas, margins.left, top, width);
}

// ── PDF object graph ────────────────────────────────────────────────

fn pdf_error(e: impl std::fmt::Display) -> RenderError {
    RenderError::Pdf(e.to_string())
}

fn assemble(pages: Vec<Canvas>) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut fonts = Dictionary::new();
    for font in Font::ALL {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(font.resource_name(), font_id);
    }
    let resources_id = doc.add_object(dictionary! {
        "Font" => fonts,
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for canvas in pages {
        let content = Content {
            operations: canvas.ops,
        };
        let stream = lopdf::Stream::new(dictionary! {}, content.encode().map_err(pdf_error)?);
        let content_id = doc.add_object(stream);
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let media_box: Vec<Object> = vec![
        Object::Integer(0),
        Object::Integer(0),
        PAGE_WIDTH.into(),
        PAGE_HEIGHT.into(),
    ];
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => media_box,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).map_err(pdf_error)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::layout::StyleName;

    fn cell(text: &str) -> Text {
        Text::new(text).styled(StyleName::TableCell)
    }

    fn document(rows: usize) -> DocumentDefinition {
        let mut body = vec![vec![
            Text::new("ID").styled(StyleName::TableHeader),
            Text::new("DESCRIPCIÓN").styled(StyleName::TableHeader),
        ]];
        for i in 0..rows {
            body.push(vec![cell(&format!("A{}", i)), cell("Escritorio metálico")]);
        }
        DocumentDefinition {
            header: Some(Header {
                columns: vec![Text::new("ENCABEZADO").styled(StyleName::HeaderTop)],
                margin: Margin::new(40.0, 20.0, 40.0, 0.0),
            }),
            content: vec![
                Node::Text(Text::new("TÍTULO").styled(StyleName::MainTitle)),
                Node::Table(Table {
                    header_rows: 1,
                    widths: vec![1.0, 3.0],
                    body,
                    layout: TableLayout::LightHorizontalLines,
                }),
            ],
            footer: Some(Box::new(|current: usize, total: usize| {
                Text::new(format!("Página {} de {}", current, total))
            })),
            page_margins: Margin::new(40.0, 60.0, 40.0, 60.0),
        }
    }

    /// Strings shown with `Tj`, per page.
    fn shown_strings(pdf: &[u8]) -> Vec<Vec<Vec<u8>>> {
        let doc = Document::load_mem(pdf).unwrap();
        doc.get_pages()
            .values()
            .map(|&page_id| {
                let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
                content
                    .operations
                    .iter()
                    .filter(|op| op.operator == "Tj")
                    .filter_map(|op| match op.operands.first() {
                        Some(Object::String(bytes, _)) => Some(bytes.clone()),
                        _ => None,
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn short_document_fits_one_page() {
        let pdf = LopdfRenderer.render(&document(3)).unwrap();
        assert!(pdf.starts_with(b"%PDF-1.5"));

        let pages = shown_strings(&pdf);
        assert_eq!(pages.len(), 1);
        let page = &pages[0];
        assert!(page.contains(&b"ENCABEZADO".to_vec()));
        assert!(page.contains(&b"T\xcdTULO".to_vec()));
        assert!(page.contains(&b"A2".to_vec()));
        assert!(page.contains(&b"P\xe1gina 1 de 1".to_vec()));
    }

    #[test]
    fn long_table_repeats_header_and_numbers_pages() {
        let pdf = LopdfRenderer.render(&document(150)).unwrap();
        let pages = shown_strings(&pdf);
        let total = pages.len();
        assert!(total >= 3, "expected several pages, got {}", total);

        for (i, page) in pages.iter().enumerate() {
            assert!(page.contains(&b"ID".to_vec()), "page {} lacks table header", i + 1);
            assert!(page.contains(&b"ENCABEZADO".to_vec()));
            let footer = format!("P\u{e1}gina {} de {}", i + 1, total);
            assert!(page.contains(&encode_win_ansi(&footer)));
        }

        // Every row lands exactly once.
        let rows: usize = pages
            .iter()
            .flatten()
            .filter(|s| s.starts_with(b"A") && s[1..].iter().all(u8::is_ascii_digit))
            .count();
        assert_eq!(rows, 150);
    }

    #[test]
    fn ragged_table_is_a_layout_error() {
        let mut def = document(1);
        if let Node::Table(table) = &mut def.content[1] {
            table.body[1].pop();
        }
        let err = LopdfRenderer.render(&def).unwrap_err();
        assert!(matches!(err, RenderError::Layout(_)));
    }

    #[test]
    fn empty_content_still_yields_a_page() {
        let def = DocumentDefinition {
            header: None,
            content: vec![],
            footer: None,
            page_margins: Margin::default(),
        };
        let pdf = LopdfRenderer.render(&def).unwrap();
        let doc = Document::load_mem(&pdf).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }
}
