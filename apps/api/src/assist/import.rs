//! Turns an uploaded resume file into something the assistant can read.
//!
//! PDFs go through `pdf-extract`; plain text and markdown are read as UTF-8.
//! PNG and JPEG images are passed through untouched for the model to read.
//! The kind is decided by content type, then file extension, then magic bytes.

use tracing::debug;

use crate::resume::model::ImportError;

const PDF_MAGIC: &[u8] = b"%PDF";
const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_MAGIC: &[u8] = b"\xFF\xD8\xFF";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn media_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Text,
    Image(ImageFormat),
}

/// An upload ready for extraction.
#[derive(Debug, PartialEq, Eq)]
pub enum UploadedDocument {
    Text(String),
    Image { format: ImageFormat, data: Vec<u8> },
}

pub fn detect_kind(
    file_name: Option<&str>,
    content_type: Option<&str>,
    bytes: &[u8],
) -> Result<DocumentKind, ImportError> {
    match content_type.map(|ct| ct.split(';').next().unwrap_or(ct).trim()) {
        Some("application/pdf") => return Ok(DocumentKind::Pdf),
        Some("text/plain") | Some("text/markdown") => return Ok(DocumentKind::Text),
        Some("image/png") => return Ok(DocumentKind::Image(ImageFormat::Png)),
        Some("image/jpeg") | Some("image/jpg") => return Ok(DocumentKind::Image(ImageFormat::Jpeg)),
        _ => {}
    }
    let extension = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("pdf") => return Ok(DocumentKind::Pdf),
        Some("txt") | Some("md") => return Ok(DocumentKind::Text),
        Some("png") => return Ok(DocumentKind::Image(ImageFormat::Png)),
        Some("jpg") | Some("jpeg") => return Ok(DocumentKind::Image(ImageFormat::Jpeg)),
        _ => {}
    }
    if bytes.starts_with(PDF_MAGIC) {
        return Ok(DocumentKind::Pdf);
    }
    if bytes.starts_with(PNG_MAGIC) {
        return Ok(DocumentKind::Image(ImageFormat::Png));
    }
    if bytes.starts_with(JPEG_MAGIC) {
        return Ok(DocumentKind::Image(ImageFormat::Jpeg));
    }
    Err(ImportError::UnsupportedFile(
        content_type
            .or(file_name)
            .unwrap_or("unknown")
            .to_string(),
    ))
}

/// Reads an upload: text for PDFs and text files, raw bytes for images.
pub fn read_upload(
    file_name: Option<&str>,
    content_type: Option<&str>,
    bytes: &[u8],
) -> Result<UploadedDocument, ImportError> {
    let kind = detect_kind(file_name, content_type, bytes)?;
    let text = match kind {
        DocumentKind::Image(format) => {
            if bytes.is_empty() {
                return Err(ImportError::EmptyDocument);
            }
            debug!(media_type = format.media_type(), bytes = bytes.len(), "image upload");
            return Ok(UploadedDocument::Image {
                format,
                data: bytes.to_vec(),
            });
        }
        DocumentKind::Pdf => extract_pdf_text(bytes)?,
        DocumentKind::Text => String::from_utf8(bytes.to_vec())
            .map_err(|_| ImportError::UnsupportedFile("text is not valid UTF-8".to_string()))?,
    };
    let text = text.trim();
    if text.is_empty() {
        return Err(ImportError::EmptyDocument);
    }
    debug!(?kind, chars = text.len(), "document text extracted");
    Ok(UploadedDocument::Text(text.to_string()))
}

/// `pdf-extract` can panic on malformed input; a panic is reported like any other
/// extraction failure.
fn extract_pdf_text(bytes: &[u8]) -> Result<String, ImportError> {
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(ImportError::PdfExtraction(e.to_string())),
        Err(_) => Err(ImportError::PdfExtraction("PDF parser failed".to_string())),
    }
}
