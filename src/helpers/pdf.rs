use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tracing::{error, info};

use crate::error::ConsoleError;
use crate::timetable::TimetableGrid;

// A4 landscape, in points.
const PAGE_WIDTH: f32 = 842.0;
const PAGE_HEIGHT: f32 = 595.0;
const MARGIN: f32 = 40.0;
const TITLE_SIZE: f32 = 18.0;
const TABLE_TOP: f32 = PAGE_HEIGHT - 80.0;
const ROW_HEIGHT: f32 = 28.0;
const DAY_COLUMN_WIDTH: f32 = 90.0;
const CELL_PADDING: f32 = 4.0;

/// Renders the weekly grid as a one-page landscape PDF: a `Class: {name}`
/// title and a bordered table with a header row of slots.
pub fn create_timetable_pdf(grid: &TimetableGrid, class_name: &str) -> Result<Vec<u8>, ConsoleError> {
    let header = grid.header();
    let body = grid.body();

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
        "Font" => dictionary! {
            "F1" => font_id,
            "F2" => bold_id,
        },
    });

    let content = Content {
        operations: table_operations(class_name, &header, &body),
    };
    let encoded = match content.encode() {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Failed to encode timetable content stream: {}", e);
            return Err(e.into());
        }
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), Object::Real(PAGE_WIDTH), Object::Real(PAGE_HEIGHT)],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut output_buffer: Vec<u8> = Vec::new();
    match doc.save_to(&mut output_buffer) {
        Ok(_) => {
            info!(
                "Created timetable PDF for {} with {} slot(s), size: {} bytes",
                class_name,
                grid.slots.len(),
                output_buffer.len()
            );
            Ok(output_buffer)
        }
        Err(e) => {
            error!("Failed to write timetable PDF: {}", e);
            Err(ConsoleError::Document(e.to_string()))
        }
    }
}

fn table_operations(class_name: &str, header: &[String], body: &[Vec<String>]) -> Vec<Operation> {
    let mut ops = Vec::new();

    text(&mut ops, "F2", TITLE_SIZE, MARGIN, PAGE_HEIGHT - MARGIN - TITLE_SIZE, &format!("Class: {}", class_name));

    let widths = column_widths(header.len());
    let font_size = font_size_for(&widths);

    let rows = std::iter::once((header, true)).chain(body.iter().map(|row| (row.as_slice(), false)));
    for (index, (row, is_header)) in rows.enumerate() {
        let top = TABLE_TOP - index as f32 * ROW_HEIGHT;
        let mut x = MARGIN;
        for (cell, width) in row.iter().zip(&widths) {
            ops.push(Operation::new(
                "re",
                vec![
                    Object::Real(x),
                    Object::Real(top - ROW_HEIGHT),
                    Object::Real(*width),
                    Object::Real(ROW_HEIGHT),
                ],
            ));
            ops.push(Operation::new("S", vec![]));

            let font = if is_header { "F2" } else { "F1" };
            let baseline = top - ROW_HEIGHT / 2.0 - font_size / 3.0;
            text(&mut ops, font, font_size, x + CELL_PADDING, baseline, cell);
            x += width;
        }
    }

    ops
}

fn text(ops: &mut Vec<Operation>, font: &str, size: f32, x: f32, y: f32, value: &str) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec![font.into(), Object::Real(size)]));
    ops.push(Operation::new("Td", vec![Object::Real(x), Object::Real(y)]));
    ops.push(Operation::new("Tj", vec![Object::string_literal(value)]));
    ops.push(Operation::new("ET", vec![]));
}

/// Day column first, the slots share the rest of the page width.
fn column_widths(columns: usize) -> Vec<f32> {
    let slots = columns.saturating_sub(1);
    let mut widths = vec![DAY_COLUMN_WIDTH];
    if slots > 0 {
        let available = PAGE_WIDTH - 2.0 * MARGIN - DAY_COLUMN_WIDTH;
        widths.extend(std::iter::repeat_n(available / slots as f32, slots));
    }
    widths
}

fn font_size_for(widths: &[f32]) -> f32 {
    let narrowest = widths.iter().copied().fold(f32::MAX, f32::min);
    (narrowest / 9.0).clamp(6.0, 12.0)
}
