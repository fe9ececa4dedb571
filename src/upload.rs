//! Text extraction from uploaded study material.

use crate::config;
use crate::error::{AppError, Result};

/// Kind of uploaded file, judged by content type and extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Text,
    Pdf,
    Other,
}

pub fn classify(file_name: &str, content_type: Option<&str>) -> UploadKind {
    let name = file_name.to_ascii_lowercase();
    let content_type = content_type.unwrap_or("").to_ascii_lowercase();

    if content_type == "application/pdf" || name.ends_with(".pdf") {
        UploadKind::Pdf
    } else if content_type.starts_with("text/")
        || [".txt", ".md", ".markdown"].iter().any(|ext| name.ends_with(ext))
    {
        UploadKind::Text
    } else {
        UploadKind::Other
    }
}

/// Decode an uploaded file into study text.
///
/// PDFs are refused; anything else is read as UTF-8, replacing invalid
/// sequences.
pub fn extract_text(file_name: &str, content_type: Option<&str>, bytes: &[u8]) -> Result<String> {
    if bytes.len() > config::MAX_UPLOAD_BYTES {
        return Err(AppError::validation(format!(
            "File is too large (limit {} MB)",
            config::MAX_UPLOAD_BYTES / (1024 * 1024)
        )));
    }

    let kind = classify(file_name, content_type);
    if kind == UploadKind::Pdf {
        return Err(AppError::validation(
            "PDF files are not supported. Paste the text or upload a .txt or .md file.",
        ));
    }
    if kind == UploadKind::Other {
        tracing::debug!("Reading upload '{}' of unknown type as text", file_name);
    }

    let text = String::from_utf8_lossy(bytes).into_owned();
    // Drop a UTF-8 byte order mark
    Ok(text.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify("notes.md", None), UploadKind::Text);
        assert_eq!(classify("NOTES.TXT", Some("application/octet-stream")), UploadKind::Text);
        assert_eq!(classify("blob", Some("text/plain; charset=utf-8")), UploadKind::Text);
        assert_eq!(classify("paper.pdf", Some("text/plain")), UploadKind::Pdf);
        assert_eq!(classify("paper", Some("application/pdf")), UploadKind::Pdf);
        assert_eq!(classify("data.bin", None), UploadKind::Other);
    }

    #[test]
    fn test_text_file_decoded() {
        let text = extract_text("notes.txt", Some("text/plain"), "\u{feff}Cells divide.".as_bytes()).unwrap();
        assert_eq!(text, "Cells divide.");
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let text = extract_text("notes.md", None, &[b'h', b'i', 0xff]).unwrap();
        assert_eq!(text, "hi\u{fffd}");
    }

    #[test]
    fn test_pdf_rejected() {
        let err = extract_text("paper.pdf", Some("application/pdf"), b"%PDF-1.7").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_oversized_rejected() {
        let bytes = vec![b'a'; config::MAX_UPLOAD_BYTES + 1];
        assert!(matches!(
            extract_text("big.txt", None, &bytes),
            Err(AppError::Validation(_))
        ));
    }
}
