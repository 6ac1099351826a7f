//! PDF assembly for the intake report
//!
//! Builds the fixed report document from laid-out lines: letter pages,
//! Helvetica body with bold section headings, manual pagination. Output is
//! deterministic for a given record and timestamp; streams are left
//! uncompressed so the document stays inspectable. Optional password
//! protection is applied as the final step before serialization.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use md5::{Digest, Md5};

use crate::crypto::SecureString;
use crate::error::{IntakeError, IntakeResult};
use crate::models::IntakeRecord;
use crate::schema::IntakeSchema;

use super::layout::{build_lines, Line, REPORT_TITLE};
use super::security::{encrypt_document, Permissions};

const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const MARGIN: f32 = 72.0;

const TITLE_SIZE: i64 = 16;
const HEADING_SIZE: i64 = 12;
const BODY_SIZE: i64 = 10;

const TITLE_HEIGHT: f32 = 24.0;
const HEADING_HEIGHT: f32 = 18.0;
const BODY_HEIGHT: f32 = 14.0;
const BLANK_HEIGHT: f32 = 8.0;

/// Password protection for a rendered document
pub struct DocumentProtection {
    /// Document open password (independent of the data-encryption secret)
    pub password: SecureString,
    /// What a conforming reader permits after opening
    pub permissions: Permissions,
}

/// Rendering knobs
///
/// `timestamp` pins the generation time for reproducible output; `None`
/// stamps the current time.
#[derive(Default)]
pub struct RenderOptions {
    pub protection: Option<DocumentProtection>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// A finished report
pub struct RenderedDocument {
    bytes: Vec<u8>,
    page_count: usize,
    generated_at: DateTime<Utc>,
}

impl RenderedDocument {
    /// Raw PDF bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of pages in the document
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Generation timestamp stamped into the document
    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    /// Write the document to disk via a temp file and rename
    pub fn write_to(&self, path: impl AsRef<Path>) -> IntakeResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    IntakeError::Render(format!(
                        "Failed to create directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let temp_path = path.with_extension("pdf.tmp");
        let mut file = File::create(&temp_path)
            .map_err(|e| IntakeError::Render(format!("Failed to create temp file: {}", e)))?;
        file.write_all(&self.bytes)
            .map_err(|e| IntakeError::Render(format!("Failed to write document: {}", e)))?;
        file.sync_all()
            .map_err(|e| IntakeError::Render(format!("Failed to sync document: {}", e)))?;

        fs::rename(&temp_path, path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            IntakeError::Render(format!("Failed to rename temp file: {}", e))
        })
    }
}

/// Render a validated record to the fixed multi-section report.
pub fn render(
    record: &IntakeRecord,
    schema: &IntakeSchema,
    options: &RenderOptions,
) -> IntakeResult<RenderedDocument> {
    let generated_at = options.timestamp.unwrap_or_else(Utc::now);
    let lines = build_lines(record, schema);
    let pages = paginate(&lines);
    let page_count = pages.len();

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
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
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let mut kids = Vec::with_capacity(page_count);
    for page in &pages {
        let content = Content {
            operations: page.clone(),
        };
        let encoded = content
            .encode()
            .map_err(|e| IntakeError::Render(format!("Failed to encode page content: {}", e)))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                PAGE_WIDTH.into(),
                PAGE_HEIGHT.into(),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(REPORT_TITLE),
        "Producer" => Object::string_literal("Magnus Intake"),
        "CreationDate" => Object::string_literal(pdf_date(generated_at)),
    });
    doc.trailer.set("Info", info_id);

    if let Some(protection) = &options.protection {
        let file_id = derive_file_id(&lines, generated_at);
        encrypt_document(
            &mut doc,
            protection.password.as_str(),
            protection.permissions,
            &file_id,
        )?;
    }

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| IntakeError::Render(format!("Failed to serialize document: {}", e)))?;

    Ok(RenderedDocument {
        bytes,
        page_count,
        generated_at,
    })
}

/// Split lines into per-page content operations, title on the first page
fn paginate(lines: &[Line]) -> Vec<Vec<Operation>> {
    let mut pages = Vec::new();
    let mut current = Vec::new();
    let mut y = PAGE_HEIGHT as f32 - MARGIN;

    text_op(&mut current, "F2", TITLE_SIZE, MARGIN, y - TITLE_HEIGHT, REPORT_TITLE);
    y -= TITLE_HEIGHT + BLANK_HEIGHT;

    for line in lines {
        let height = match line {
            Line::SectionTitle(_) => HEADING_HEIGHT,
            Line::Field { .. } => BODY_HEIGHT,
            Line::Text(_) => HEADING_HEIGHT,
            Line::Blank => BLANK_HEIGHT,
        };

        if y - height < MARGIN {
            pages.push(std::mem::take(&mut current));
            y = PAGE_HEIGHT as f32 - MARGIN;
        }

        match line {
            Line::SectionTitle(title) => {
                text_op(&mut current, "F2", HEADING_SIZE, MARGIN, y - height, title);
            }
            Line::Field { label, value } => {
                let text = format!("{}: {}", label, value);
                text_op(&mut current, "F1", BODY_SIZE, MARGIN + 12.0, y - height, &text);
            }
            Line::Text(text) => {
                text_op(&mut current, "F1", BODY_SIZE, MARGIN, y - height, text);
            }
            Line::Blank => {}
        }
        y -= height;
    }

    if !current.is_empty() {
        pages.push(current);
    }
    pages
}

fn text_op(ops: &mut Vec<Operation>, font: &str, size: i64, x: f32, y: f32, text: &str) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec![font.into(), size.into()]));
    ops.push(Operation::new("Td", vec![x.into(), y.into()]));
    ops.push(Operation::new("Tj", vec![Object::string_literal(text)]));
    ops.push(Operation::new("ET", vec![]));
}

/// PDF date string, e.g. D:20260823140000Z
fn pdf_date(ts: DateTime<Utc>) -> String {
    ts.format("D:%Y%m%d%H%M%SZ").to_string()
}

/// Deterministic 16-byte file identifier from content and timestamp
fn derive_file_id(lines: &[Line], generated_at: DateTime<Utc>) -> [u8; 16] {
    let mut hasher = Md5::new();
    for line in lines {
        match line {
            Line::SectionTitle(t) | Line::Text(t) => hasher.update(t.as_bytes()),
            Line::Field { label, value } => {
                hasher.update(label.as_bytes());
                hasher.update(value.as_bytes());
            }
            Line::Blank => {}
        }
    }
    hasher.update(pdf_date(generated_at).as_bytes());
    hasher.finalize().into()
}
