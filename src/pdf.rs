//! PDF selection and preview.
//!
//! Validation mirrors the upload form it replaces: a file counts as a
//! PDF by its declared content type (guessed from the extension), not
//! by sniffing bytes. The preview is display-only metadata parsed with
//! lopdf; a file that fails to parse can still be selected and
//! uploaded, it just renders without a preview.

use bytes::Bytes;
use lopdf::{Document, Object};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Longest first-page excerpt shown in the preview panel.
const SNIPPET_CHARS: usize = 300;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Please select a valid PDF file.")]
    InvalidFileType,

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not read PDF file content: {0}")]
    Parse(#[from] lopdf::Error),
}

/// A validated, fully-read PDF selection.
#[derive(Debug, Clone)]
pub struct SelectedPdf {
    pub path: PathBuf,
    pub filename: String,
    pub bytes: Bytes,
}

impl SelectedPdf {
    /// Validate the declared content type and read the file. Rejects
    /// anything that does not look like `application/pdf` before
    /// touching the filesystem.
    pub fn load(path: &Path) -> Result<Self, PdfError> {
        if !is_pdf(path) {
            return Err(PdfError::InvalidFileType);
        }

        let bytes = std::fs::read(path).map_err(|source| PdfError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());

        debug!("Loaded {} ({} bytes)", filename, bytes.len());

        Ok(Self {
            path: path.to_path_buf(),
            filename,
            bytes: Bytes::from(bytes),
        })
    }
}

/// Whether the path's declared content type is `application/pdf`.
pub fn is_pdf(path: &Path) -> bool {
    mime_guess::from_path(path)
        .first()
        .map_or(false, |mime| mime == mime::APPLICATION_PDF)
}

/// Lightweight document metadata for the preview panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfPreview {
    pub page_count: usize,
    pub size_bytes: usize,
    pub title: Option<String>,
    pub author: Option<String>,
    /// Whitespace-collapsed excerpt of the first page's text.
    pub snippet: String,
}

impl PdfPreview {
    pub fn build(pdf: &SelectedPdf) -> Result<Self, PdfError> {
        let document = Document::load_mem(&pdf.bytes)?;
        let page_count = document.get_pages().len();

        let snippet = document
            .extract_text(&[1])
            .map(|text| excerpt(&text, SNIPPET_CHARS))
            .unwrap_or_default();

        Ok(Self {
            page_count,
            size_bytes: pdf.bytes.len(),
            title: info_string(&document, b"Title"),
            author: info_string(&document, b"Author"),
            snippet,
        })
    }
}

/// Look up a document-information string (Title, Author, ...) from the
/// trailer's Info dictionary.
fn info_string(document: &Document, key: &[u8]) -> Option<String> {
    let info = document.trailer.get(b"Info").ok()?;
    let dict = match info {
        Object::Reference(id) => document.get_dictionary(*id).ok()?,
        Object::Dictionary(dict) => dict,
        _ => return None,
    };

    let raw = dict.get(key).ok()?.as_str().ok()?;
    let text = decode_pdf_string(raw);
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// PDF text strings are either PDFDocEncoding (close enough to Latin-1
/// for display) or UTF-16BE with a byte-order mark.
fn decode_pdf_string(raw: &[u8]) -> String {
    if raw.len() >= 2 && raw[0] == 0xFE && raw[1] == 0xFF {
        let units: Vec<u16> = raw[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        String::from_utf8_lossy(raw).into_owned()
    }
}

fn excerpt(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let mut cut: String = collapsed.chars().take(max_chars).collect();
        cut.push('…');
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Stream};
    use tempfile::TempDir;

    fn sample_pdf_bytes(text: &str) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![50.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().unwrap(),
        ));
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
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal("Quarterly Report"),
            "Author" => Object::string_literal("Finance"),
        });
        doc.trailer.set("Info", info_id);

        doc.compress();
        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn test_is_pdf_by_declared_type() {
        assert!(is_pdf(Path::new("report.pdf")));
        assert!(is_pdf(Path::new("dir/REPORT.PDF")));
        assert!(!is_pdf(Path::new("report.txt")));
        assert!(!is_pdf(Path::new("report")));
    }

    #[test]
    fn test_load_rejects_non_pdf_extension() {
        let err = SelectedPdf::load(Path::new("notes.txt")).unwrap_err();
        assert!(matches!(err, PdfError::InvalidFileType));
        assert_eq!(err.to_string(), "Please select a valid PDF file.");
    }

    #[test]
    fn test_load_missing_file_is_read_error() {
        let dir = TempDir::new().unwrap();
        let err = SelectedPdf::load(&dir.path().join("missing.pdf")).unwrap_err();
        assert!(matches!(err, PdfError::Read { .. }));
    }

    #[test]
    fn test_load_and_preview_real_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sample.pdf");
        std::fs::write(&path, sample_pdf_bytes("Interest rate 4.5 percent")).unwrap();

        let pdf = SelectedPdf::load(&path).unwrap();
        assert_eq!(pdf.filename, "sample.pdf");
        assert!(!pdf.bytes.is_empty());

        let preview = PdfPreview::build(&pdf).unwrap();
        assert_eq!(preview.page_count, 1);
        assert_eq!(preview.size_bytes, pdf.bytes.len());
        assert_eq!(preview.title.as_deref(), Some("Quarterly Report"));
        assert_eq!(preview.author.as_deref(), Some("Finance"));
        assert!(preview.snippet.contains("Interest rate"));
    }

    #[test]
    fn test_preview_of_garbage_bytes_fails() {
        let pdf = SelectedPdf {
            path: PathBuf::from("broken.pdf"),
            filename: "broken.pdf".to_string(),
            bytes: Bytes::from_static(b"not a pdf at all"),
        };
        assert!(PdfPreview::build(&pdf).is_err());
    }

    #[test]
    fn test_decode_utf16_info_string() {
        let mut raw = vec![0xFE, 0xFF];
        for unit in "Résumé".encode_utf16() {
            raw.extend_from_slice(&unit.to_be_bytes());
        }
        assert_eq!(decode_pdf_string(&raw), "Résumé");
        assert_eq!(decode_pdf_string(b"Plain title"), "Plain title");
    }

    #[test]
    fn test_excerpt_collapses_and_truncates() {
        assert_eq!(excerpt("a  b\n\nc", 10), "a b c");
        let long = "x".repeat(400);
        let cut = excerpt(&long, 300);
        assert_eq!(cut.chars().count(), 301);
        assert!(cut.ends_with('…'));
    }
}
