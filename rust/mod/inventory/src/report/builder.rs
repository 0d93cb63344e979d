use chrono::{DateTime, Local};

use crate::config::{is_valid_strftime, InventoryConfig, DEFAULT_TIMESTAMP_FORMAT};
use crate::model::ReportRow;

use super::layout::{
    palette, Alignment, DocumentDefinition, Header, Margin, Node, Table, TableLayout, Text,
    StyleName,
};

pub const TITLE: &str = "REPORTE DE VERIFICACIÓN DE INVENTARIO";
pub const COLUMN_HEADERS: [&str; 4] = ["ID BIEN", "DESCRIPCIÓN", "ESTATUS", "SERIE"];
const COLUMN_WIDTHS: [f32; 4] = [20.0, 45.0, 15.0, 20.0];
const SIGNATURE_LINE: &str = "__________________________";
const SIGNATURE_CAPTION: &str = "Firma del Resguardatario";

/// Everything that varies between two reports.
pub struct ReportData<'a> {
    pub area: &'a str,
    pub rows: &'a [ReportRow],
    pub generated_at: DateTime<Local>,
}

/// Lay out the verification report for one area.
pub fn build_document(data: &ReportData<'_>, config: &InventoryConfig) -> DocumentDefinition {
    let labels = &config.report;
    let header = Header {
        columns: vec![
            Text::new(&labels.institution_label).styled(StyleName::HeaderTop),
            Text::new(&labels.system_label)
                .styled(StyleName::HeaderTop)
                .align(Alignment::Right),
        ],
        margin: Margin::new(40.0, 20.0, 40.0, 0.0),
    };

    let timestamp = format_timestamp(&data.generated_at, &labels.timestamp_format);
    let content = vec![
        Node::Text(Text::new(format!("\n\n{}", TITLE)).styled(StyleName::MainTitle)),
        Node::Text(Text::new(format!("ÁREA: {}", data.area)).styled(StyleName::SubTitle)),
        Node::Text(
            Text::new(format!("FECHA DE GENERACIÓN: {}", timestamp)).styled(StyleName::DateStyle),
        ),
        Node::Text(Text::new("\n")),
        Node::Table(asset_table(data.rows, &config.located_status)),
        Node::Text(Text::new(format!("\n\n\n{}", SIGNATURE_LINE)).align(Alignment::Center)),
        Node::Text(
            Text::new(SIGNATURE_CAPTION)
                .styled(StyleName::Signature)
                .align(Alignment::Center),
        ),
    ];

    DocumentDefinition {
        header: Some(header),
        content,
        footer: Some(Box::new(|current: usize, total: usize| {
            Text::new(format!("Página {} de {}", current, total))
                .styled(StyleName::FooterText)
                .align(Alignment::Center)
        })),
        page_margins: Margin::new(40.0, 60.0, 40.0, 60.0),
    }
}

fn asset_table(rows: &[ReportRow], located_status: &str) -> Table {
    let mut body = Vec::with_capacity(rows.len() + 1);
    body.push(
        COLUMN_HEADERS
            .iter()
            .map(|h| Text::new(*h).styled(StyleName::TableHeader))
            .collect(),
    );
    for row in rows {
        let status_color = if row.estatus == located_status {
            palette::LOCATED
        } else {
            palette::NOT_LOCATED
        };
        body.push(vec![
            Text::new(&row.id).styled(StyleName::TableCell),
            Text::new(&row.descripcion).styled(StyleName::TableCell),
            Text::new(&row.estatus)
                .styled(StyleName::TableCell)
                .color(status_color)
                .bold(),
            Text::new(&row.serie).styled(StyleName::TableCell),
        ]);
    }
    Table {
        header_rows: 1,
        widths: COLUMN_WIDTHS.to_vec(),
        body,
        layout: TableLayout::LightHorizontalLines,
    }
}

/// Render `at` with `pattern`; a malformed pattern falls back to the default.
pub fn format_timestamp(at: &DateTime<Local>, pattern: &str) -> String {
    let pattern = if is_valid_strftime(pattern) {
        pattern
    } else {
        DEFAULT_TIMESTAMP_FORMAT
    };
    at.format(pattern).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(id: &str, estatus: &str) -> ReportRow {
        ReportRow {
            id: id.into(),
            descripcion: format!("Bien {}", id),
            estatus: estatus.into(),
            serie: "N/A".into(),
        }
    }

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    fn texts(def: &DocumentDefinition) -> Vec<String> {
        def.content
            .iter()
            .filter_map(|n| match n {
                Node::Text(t) => Some(t.text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn table_has_header_plus_one_row_per_asset() {
        let rows = vec![row("A1", "UBICADO"), row("A2", "PENDIENTE"), row("A3", "NO UBICADO")];
        let data = ReportData {
            area: "Contabilidad",
            rows: &rows,
            generated_at: fixed_time(),
        };
        let def = build_document(&data, &InventoryConfig::default());

        let table = def.tables().next().unwrap();
        assert_eq!(table.header_rows, 1);
        assert_eq!(table.body.len(), 4);
        let headers: Vec<&str> = table.body[0].iter().map(|t| t.text.as_str()).collect();
        assert_eq!(headers, COLUMN_HEADERS);
        assert_eq!(table.body[2][0].text, "A2");
    }

    #[test]
    fn status_color_follows_located_status() {
        let rows = vec![row("A1", "UBICADO"), row("A2", "PENDIENTE"), row("A3", "ubicado")];
        let data = ReportData {
            area: "TI",
            rows: &rows,
            generated_at: fixed_time(),
        };
        let def = build_document(&data, &InventoryConfig::default());
        let table = def.tables().next().unwrap();

        let colors: Vec<_> = table.body[1..].iter().map(|r| r[2].resolve().color).collect();
        assert_eq!(colors, vec![palette::LOCATED, palette::NOT_LOCATED, palette::NOT_LOCATED]);
        assert!(table.body[1][2].resolve().bold);
    }

    #[test]
    fn titles_and_timestamp() {
        let rows = vec![row("A1", "UBICADO")];
        let data = ReportData {
            area: "Recursos Humanos",
            rows: &rows,
            generated_at: fixed_time(),
        };
        let def = build_document(&data, &InventoryConfig::default());

        let texts = texts(&def);
        assert_eq!(texts[0], "\n\nREPORTE DE VERIFICACIÓN DE INVENTARIO");
        assert_eq!(texts[1], "ÁREA: Recursos Humanos");
        assert_eq!(texts[2], "FECHA DE GENERACIÓN: 09/03/2024, 14:05:07");
        assert!(texts.iter().any(|t| t == "Firma del Resguardatario"));

        let header = def.header.as_ref().unwrap();
        assert_eq!(header.columns[0].text, "GOBIERNO DEL ESTADO DE MÉXICO");
        assert_eq!(header.columns[1].text, "SICOPA - SISTEMA DE CONTROL");
    }

    #[test]
    fn footer_numbers_pages() {
        let data = ReportData {
            area: "TI",
            rows: &[],
            generated_at: fixed_time(),
        };
        let def = build_document(&data, &InventoryConfig::default());
        let footer = def.footer.as_ref().unwrap();
        let text = footer(2, 3);
        assert_eq!(text.text, "Página 2 de 3");
        assert_eq!(text.resolve().alignment, Alignment::Center);
    }

    #[test]
    fn bad_timestamp_pattern_falls_back() {
        let at = fixed_time();
        assert_eq!(format_timestamp(&at, "%Y-%m-%d"), "2024-03-09");
        assert_eq!(format_timestamp(&at, "%Q"), "09/03/2024, 14:05:07");
    }
}
