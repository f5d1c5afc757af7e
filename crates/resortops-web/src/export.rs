//! CSV and PDF rendering of tabular reports.
//!
//! PDFs are A4 portrait in Helvetica, with a property/title header and a
//! table that continues onto further pages when it runs out of room.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

pub const PAGE_WIDTH: i64 = 595;
pub const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 40;
const TITLE_SIZE: i64 = 16;
const BODY_SIZE: i64 = 9;
const ROW_HEIGHT: i64 = 14;
const HEADER_BLOCK: i64 = 70;
/// Approximate Helvetica glyph width at size 1, used to truncate cells.
const AVG_GLYPH_WIDTH: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(title: impl Into<String>, headers: &[&str]) -> Self {
        Self { title: title.into(), headers: headers.iter().map(|h| h.to_string()).collect(), rows: Vec::new() }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn to_csv(&self) -> anyhow::Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        Ok(writer.into_inner()?)
    }

    pub fn rows_per_page() -> usize {
        ((PAGE_HEIGHT - 2 * MARGIN - HEADER_BLOCK - ROW_HEIGHT) / ROW_HEIGHT) as usize
    }

    pub fn to_pdf(&self, property: &str, generated: &str) -> anyhow::Result<Vec<u8>> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let bold_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id, "F2" => bold_id },
        });

        let chunks: Vec<&[Vec<String>]> = if self.rows.is_empty() {
            vec![&self.rows[..]]
        } else {
            self.rows.chunks(Self::rows_per_page()).collect()
        };
        let total_pages = chunks.len();

        let mut kids: Vec<Object> = Vec::with_capacity(total_pages);
        for (index, rows) in chunks.into_iter().enumerate() {
            let content = self.page_content(property, generated, rows, index + 1, total_pages);
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => total_pages as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id: ObjectId = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut out = Vec::new();
        doc.save_to(&mut out)?;
        Ok(out)
    }

    fn page_content(
        &self,
        property: &str,
        generated: &str,
        rows: &[Vec<String>],
        page: usize,
        pages: usize,
    ) -> Content {
        let columns = self.headers.len().max(1) as i64;
        let column_width = (PAGE_WIDTH - 2 * MARGIN) / columns;
        let max_chars = ((column_width - 4) as f64 / (BODY_SIZE as f64 * AVG_GLYPH_WIDTH)) as usize;

        let mut ops = Vec::new();
        let mut y = PAGE_HEIGHT - MARGIN - TITLE_SIZE;
        text(&mut ops, "F2", TITLE_SIZE, MARGIN, y, property);
        y -= 20;
        text(&mut ops, "F1", 11, MARGIN, y, &self.title);
        y -= 14;
        text(&mut ops, "F1", 8, MARGIN, y, &format!("Generated {generated}  |  Page {page} of {pages}"));

        y = PAGE_HEIGHT - MARGIN - HEADER_BLOCK;
        for (i, header) in self.headers.iter().enumerate() {
            text(&mut ops, "F2", BODY_SIZE, MARGIN + i as i64 * column_width, y, &truncate(header, max_chars));
        }
        // Rule under the header row
        ops.push(Operation::new("m", vec![MARGIN.into(), (y - 4).into()]));
        ops.push(Operation::new("l", vec![(PAGE_WIDTH - MARGIN).into(), (y - 4).into()]));
        ops.push(Operation::new("S", vec![]));

        for row in rows {
            y -= ROW_HEIGHT;
            for (i, cell) in row.iter().enumerate().take(self.headers.len()) {
                text(&mut ops, "F1", BODY_SIZE, MARGIN + i as i64 * column_width, y, &truncate(cell, max_chars));
            }
        }

        if rows.is_empty() {
            text(&mut ops, "F1", BODY_SIZE, MARGIN, y - ROW_HEIGHT, "No records.");
        }

        Content { operations: ops }
    }
}

fn text(ops: &mut Vec<Operation>, font: &str, size: i64, x: i64, y: i64, value: &str) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec![font.into(), size.into()]));
    ops.push(Operation::new("Td", vec![x.into(), y.into()]));
    ops.push(Operation::new("Tj", vec![Object::string_literal(latin1(value))]));
    ops.push(Operation::new("ET", vec![]));
}

/// Type1 base fonts only cover Latin-1; anything else prints as `?`.
fn latin1(value: &str) -> Vec<u8> {
    value.chars().map(|c| if (c as u32) < 256 { c as u8 } else { b'?' }).collect()
}

fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars || max_chars < 2 {
        return value.to_string();
    }
    let mut out: String = value.chars().take(max_chars - 1).collect();
    out.push('~');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample(rows: usize) -> Table {
        let mut table = Table::new("Inventory", &["Item", "Quantity", "Status"]);
        for i in 0..rows {
            table.push(vec![format!("Item {i}"), format!("{i}.0"), "in_stock".into()]);
        }
        table
    }

    #[test]
    fn test_csv_has_header_and_quotes() {
        let mut table = Table::new("Vendors", &["Name", "City"]);
        table.push(vec!["Spice, Co".into(), "Kochi".into()]);
        let csv = String::from_utf8(table.to_csv().unwrap()).unwrap();
        assert_eq!(csv, "Name,City\n\"Spice, Co\",Kochi\n");
    }

    #[test]
    fn test_pdf_paginates() {
        let per_page = Table::rows_per_page();
        let bytes = sample(per_page + 1).to_pdf("Coral Bay", "2026-03-01").unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn test_empty_table_still_renders_a_page() {
        let bytes = sample(0).to_pdf("Coral Bay", "2026-03-01").unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Basmati", 10), "Basmati");
        assert_eq!(truncate("Basmati Rice Premium", 8), "Basmati~");
        assert_eq!(latin1("Café ₹"), vec![b'C', b'a', b'f', 0xE9, b' ', b'?']);
    }
}
