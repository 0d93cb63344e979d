//! Declarative document tree handed to a `PdfRenderer`.
//!
//! The builder describes *what* goes on the page (text, column rows, tables,
//! named styles); the renderer decides where it lands and how pages break.

/// RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);

    /// `#rrggbb`
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Components scaled to `0.0..=1.0`, as PDF color operators expect.
    pub fn unit(self) -> [f32; 3] {
        [self.r, self.g, self.b].map(|c| c as f32 / 255.0)
    }
}

pub mod palette {
    use super::Color;

    /// Institutional accent: header band, table header fill.
    pub const ACCENT: Color = Color::rgb(0xA6, 0x21, 0x45);
    pub const LOCATED: Color = Color::rgb(0x27, 0xAE, 0x60);
    pub const NOT_LOCATED: Color = Color::rgb(0xC0, 0x39, 0x2B);
    pub const TITLE: Color = Color::rgb(0x33, 0x33, 0x33);
    pub const FOOTER: Color = Color::rgb(0x66, 0x66, 0x66);
    pub const RULE: Color = Color::rgb(0xAA, 0xAA, 0xAA);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Margins in points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Margin {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Margin {
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self { left, top, right, bottom }
    }

    /// Only vertical spacing.
    pub const fn vertical(top: f32, bottom: f32) -> Self {
        Self::new(0.0, top, 0.0, bottom)
    }
}

/// Resolved visual attributes of a piece of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub font_size: f32,
    pub bold: bool,
    pub italic: bool,
    pub color: Color,
    /// Background fill, only honored inside table cells.
    pub fill: Option<Color>,
    pub alignment: Alignment,
    pub margin: Margin,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            font_size: 12.0,
            bold: false,
            italic: false,
            color: Color::BLACK,
            fill: None,
            alignment: Alignment::Left,
            margin: Margin::default(),
        }
    }
}

/// The report's style sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleName {
    HeaderTop,
    MainTitle,
    SubTitle,
    DateStyle,
    TableHeader,
    TableCell,
    Signature,
    FooterText,
}

impl StyleName {
    pub fn style(self) -> Style {
        let base = Style::default();
        match self {
            StyleName::HeaderTop => Style {
                font_size: 9.0,
                bold: true,
                color: palette::ACCENT,
                ..base
            },
            StyleName::MainTitle => Style {
                font_size: 18.0,
                bold: true,
                color: palette::TITLE,
                alignment: Alignment::Center,
                ..base
            },
            StyleName::SubTitle => Style {
                font_size: 14.0,
                alignment: Alignment::Center,
                margin: Margin::vertical(5.0, 10.0),
                ..base
            },
            StyleName::DateStyle => Style {
                font_size: 10.0,
                italic: true,
                alignment: Alignment::Right,
                ..base
            },
            StyleName::TableHeader => Style {
                font_size: 10.0,
                bold: true,
                color: Color::WHITE,
                fill: Some(palette::ACCENT),
                alignment: Alignment::Center,
                margin: Margin::vertical(5.0, 5.0),
                ..base
            },
            StyleName::TableCell => Style {
                font_size: 9.0,
                margin: Margin::vertical(3.0, 3.0),
                ..base
            },
            StyleName::Signature => Style {
                font_size: 10.0,
                italic: true,
                ..base
            },
            StyleName::FooterText => Style {
                font_size: 8.0,
                color: palette::FOOTER,
                ..base
            },
        }
    }
}

/// A run of text. Per-node attributes override the named style.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Text {
    pub text: String,
    pub style: Option<StyleName>,
    pub alignment: Option<Alignment>,
    pub color: Option<Color>,
    pub bold: Option<bool>,
}

impl Text {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn styled(mut self, style: StyleName) -> Self {
        self.style = Some(style);
        self
    }

    pub fn align(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = Some(true);
        self
    }

    /// Final style after overrides.
    pub fn resolve(&self) -> Style {
        let mut style = self.style.map(StyleName::style).unwrap_or_default();
        if let Some(alignment) = self.alignment {
            style.alignment = alignment;
        }
        if let Some(color) = self.color {
            style.color = color;
        }
        if let Some(bold) = self.bold {
            style.bold = bold;
        }
        style
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableLayout {
    /// Heavy rule under the header, light rules between body rows,
    /// no vertical rules.
    #[default]
    LightHorizontalLines,
    NoBorders,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Leading rows repeated at the top of every page the table spans.
    pub header_rows: usize,
    /// Relative column widths; normalized against their sum.
    pub widths: Vec<f32>,
    pub body: Vec<Vec<Text>>,
    pub layout: TableLayout,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(Text),
    /// Side-by-side texts sharing the row width equally.
    Columns(Vec<Text>),
    Table(Table),
}

/// Page band drawn at the top of every page.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub columns: Vec<Text>,
    pub margin: Margin,
}

/// Produces the footer for page `current` of `total` (1-based).
pub type FooterFn = Box<dyn Fn(usize, usize) -> Text + Send + Sync>;

pub struct DocumentDefinition {
    pub header: Option<Header>,
    pub content: Vec<Node>,
    pub footer: Option<FooterFn>,
    pub page_margins: Margin,
}

impl DocumentDefinition {
    /// Tables in document order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.content.iter().filter_map(|node| match node {
            Node::Table(table) => Some(table),
            _ => None,
        })
    }
}
