//! Attachment to text conversion.
//!
//! Extraction never fails the request: every problem is reported inline as
//! a short placeholder sentence that takes the place of the attachment's
//! text.

mod document;
mod ocr;
mod transcribe;

use bytes::Bytes;
use futures::future::join_all;
use log::{debug, error};
use reqwest::Client;
use std::path::Path;

use crate::config::ExtractionConfig;
use crate::error::ChopError;
use crate::fallback::take_chars;

pub use document::{docx_text, pdf_text};
pub use ocr::{ocr_google_vision, ocr_space};
pub use transcribe::transcribe;

/// Broad attachment category derived from the declared media type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Text,
    Pdf,
    Document,
    Image,
    Media,
    Presentation,
    Other,
}

impl AttachmentKind {
    pub fn from_content_type(content_type: &str) -> Self {
        let ct = content_type.trim().to_lowercase();
        if ct.starts_with("text/") || ct == "application/json" {
            AttachmentKind::Text
        } else if ct == "application/pdf" {
            AttachmentKind::Pdf
        } else if ct.contains("word") || ct.contains("officedocument.wordprocessingml") {
            AttachmentKind::Document
        } else if ct.starts_with("image/") {
            AttachmentKind::Image
        } else if ct.starts_with("audio/") || ct.starts_with("video/") {
            AttachmentKind::Media
        } else if ct.contains("presentation") || ct.contains("ppt") {
            AttachmentKind::Presentation
        } else {
            AttachmentKind::Other
        }
    }
}

/// An uploaded file awaiting extraction
#[derive(Debug, Clone)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl Attachment {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Attachment {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    /// Read a local file, guessing its media type from the extension
    pub async fn from_path(path: &Path) -> Result<Self, ChopError> {
        let data = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());
        let content_type = guess_content_type(path);
        Ok(Attachment::new(file_name, content_type, data))
    }

    pub fn kind(&self) -> AttachmentKind {
        AttachmentKind::from_content_type(&self.content_type)
    }

    fn display_name(&self) -> &str {
        if self.file_name.is_empty() {
            "attachment"
        } else {
            &self.file_name
        }
    }
}

fn guess_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "txt" | "md" | "markdown" => "text/plain",
        "html" | "htm" => "text/html",
        "csv" => "text/csv",
        "json" => "application/json",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        _ => "application/octet-stream",
    }
}

/// Cap text at `max` characters, marking the cut with `...`
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        format!("{}...", take_chars(text, max))
    }
}

/// Converts attachments into text fragments
pub struct TextExtractor {
    client: Client,
    config: ExtractionConfig,
}

impl TextExtractor {
    pub fn new(config: ExtractionConfig, client: Client) -> Self {
        TextExtractor { client, config }
    }

    /// Extract every attachment concurrently; output keeps input order
    pub async fn extract_all(&self, attachments: &[Attachment]) -> Vec<String> {
        join_all(attachments.iter().map(|a| self.extract(a))).await
    }

    /// Extract text from one attachment, or a placeholder describing why not
    pub async fn extract(&self, attachment: &Attachment) -> String {
        let name = attachment.display_name();
        let max = self.config.max_chars;
        debug!(
            "Extracting {} ({}, {} bytes)",
            name,
            attachment.content_type,
            attachment.data.len()
        );

        match attachment.kind() {
            AttachmentKind::Text => truncate(&String::from_utf8_lossy(&attachment.data), max),
            AttachmentKind::Pdf => match pdf_text(&attachment.data) {
                Ok(text) => self.non_empty(text, name, "PDF"),
                Err(e) => {
                    error!("PDF parse error for {}: {}", name, e);
                    format!("PDF attached: {} (failed to parse, please review manually)", name)
                }
            },
            AttachmentKind::Document => match docx_text(&attachment.data) {
                Ok(text) => self.non_empty(text, name, "DOCX"),
                Err(e) => {
                    error!("DOCX parse error for {}: {}", name, e);
                    format!("Doc attached: {} (failed to parse, please review manually)", name)
                }
            },
            AttachmentKind::Image => self.extract_image(attachment).await,
            AttachmentKind::Media => self.extract_media(attachment).await,
            AttachmentKind::Presentation => {
                format!("Presentation attached: {} (parser not configured)", name)
            }
            AttachmentKind::Other => {
                let declared = if attachment.content_type.trim().is_empty() {
                    "unknown type"
                } else {
                    attachment.content_type.as_str()
                };
                format!("Attachment: {} ({})", name, declared)
            }
        }
    }

    fn non_empty(&self, text: String, name: &str, label: &str) -> String {
        let text = text.trim();
        if text.is_empty() {
            format!("{} attached: {} (no extractable text found)", label, name)
        } else {
            truncate(text, self.config.max_chars)
        }
    }

    async fn extract_image(&self, attachment: &Attachment) -> String {
        let name = attachment.display_name();

        let result = if let Some(key) = &self.config.ocr_space_api_key {
            ocr_space(&self.client, &self.config.ocr_space_url, key, attachment).await
        } else if let Some(key) = &self.config.google_vision_api_key {
            ocr_google_vision(&self.client, &self.config.google_vision_url, key, &attachment.data)
                .await
        } else {
            return format!("Image attached: {} (OCR unavailable)", name);
        };

        match result {
            Ok(text) if !text.trim().is_empty() => truncate(&text, self.config.max_chars),
            Ok(_) => format!("Image attached: {} (no text detected)", name),
            Err(e) => {
                error!("OCR failed for {}: {}", name, e);
                format!("Image attached: {} (OCR failed)", name)
            }
        }
    }

    async fn extract_media(&self, attachment: &Attachment) -> String {
        let name = attachment.display_name();

        let Some(key) = &self.config.transcription_api_key else {
            return format!(
                "Media attached: {} (add GROQ_API_KEY to enable transcription)",
                name
            );
        };

        match transcribe(
            &self.client,
            &self.config.transcription_url,
            key,
            &self.config.whisper_model,
            attachment,
        )
        .await
        {
            Ok(text) => truncate(&text, self.config.max_chars),
            Err(e) => {
                error!("Transcription failed for {}: {}", name, e);
                format!("Media attached: {} (transcription failed)", name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> TextExtractor {
        TextExtractor::new(ExtractionConfig::default(), Client::new())
    }

    #[test]
    fn test_kind_from_content_type() {
        use AttachmentKind::*;
        let cases = [
            ("text/plain", Text),
            ("text/markdown; charset=utf-8", Text),
            ("application/json", Text),
            ("application/pdf", Pdf),
            ("application/msword", Document),
            (
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                Document,
            ),
            ("image/png", Image),
            ("audio/mpeg", Media),
            ("video/mp4", Media),
            ("application/vnd.ms-powerpoint", Presentation),
            ("application/zip", Other),
            ("", Other),
        ];
        for (ct, kind) in cases {
            assert_eq!(AttachmentKind::from_content_type(ct), kind, "{}", ct);
        }
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abc", 5), "abc");
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("ééé", 2), "éé...");
    }

    #[test]
    fn test_guess_content_type() {
        assert_eq!(guess_content_type(Path::new("notes.MD")), "text/plain");
        assert!(guess_content_type(Path::new("deck.pptx")).contains("presentation"));
        assert_eq!(guess_content_type(Path::new("blob")), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_extract_plain_text_is_capped() {
        let mut config = ExtractionConfig::default();
        config.max_chars = 10;
        let extractor = TextExtractor::new(config, Client::new());

        let attachment = Attachment::new("notes.txt", "text/plain", "0123456789abcdef");
        assert_eq!(extractor.extract(&attachment).await, "0123456789...");
    }

    #[tokio::test]
    async fn test_extract_placeholders_without_keys() {
        let extractor = extractor();

        let image = Attachment::new("shot.png", "image/png", vec![1u8, 2, 3]);
        assert_eq!(
            extractor.extract(&image).await,
            "Image attached: shot.png (OCR unavailable)"
        );

        let audio = Attachment::new("talk.mp3", "audio/mpeg", vec![0u8; 4]);
        assert_eq!(
            extractor.extract(&audio).await,
            "Media attached: talk.mp3 (add GROQ_API_KEY to enable transcription)"
        );

        let deck = Attachment::new("deck.pptx", "application/vnd.ms-powerpoint", vec![0u8]);
        assert_eq!(
            extractor.extract(&deck).await,
            "Presentation attached: deck.pptx (parser not configured)"
        );

        let unknown = Attachment::new("", "", vec![0u8]);
        assert_eq!(
            extractor.extract(&unknown).await,
            "Attachment: attachment (unknown type)"
        );
    }

    #[tokio::test]
    async fn test_extract_pdf_text() {
        let pdf = Attachment::new(
            "report.pdf",
            "application/pdf",
            document::fixtures::pdf_with_text("Revenue grew four percent"),
        );
        let text = extractor().extract(&pdf).await;
        assert!(text.contains("Revenue grew four percent"), "{:?}", text);
        assert_eq!(text, text.trim());
    }

    #[tokio::test]
    async fn test_extract_corrupt_pdf() {
        let pdf = Attachment::new("report.pdf", "application/pdf", b"definitely not a pdf".to_vec());
        assert_eq!(
            extractor().extract(&pdf).await,
            "PDF attached: report.pdf (failed to parse, please review manually)"
        );
    }

    #[tokio::test]
    async fn test_extract_docx_text_is_capped() {
        let mut config = ExtractionConfig::default();
        config.max_chars = 12;
        let extractor = TextExtractor::new(config, Client::new());

        let docx = Attachment::new(
            "essay.docx",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            document::fixtures::docx_with_paragraphs(&["  Opening line of the essay.", "Second."]),
        );
        assert_eq!(extractor.extract(&docx).await, "Opening line...");
    }

    #[tokio::test]
    async fn test_extract_docx_without_text() {
        let docx = Attachment::new(
            "blank.docx",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            document::fixtures::docx_with_paragraphs(&["   ", ""]),
        );
        assert_eq!(
            extractor().extract(&docx).await,
            "DOCX attached: blank.docx (no extractable text found)"
        );
    }

    #[tokio::test]
    async fn test_extract_legacy_doc_fails_to_parse() {
        let doc = Attachment::new("old.doc", "application/msword", vec![0xD0, 0xCF, 0x11, 0xE0]);
        assert_eq!(
            extractor().extract(&doc).await,
            "Doc attached: old.doc (failed to parse, please review manually)"
        );
    }

    #[tokio::test]
    async fn test_extract_all_keeps_order() {
        let attachments = vec![
            Attachment::new("a.txt", "text/plain", "first"),
            Attachment::new("b.png", "image/png", vec![0u8]),
            Attachment::new("c.txt", "text/plain", "third"),
        ];
        let texts = extractor().extract_all(&attachments).await;
        assert_eq!(texts[0], "first");
        assert!(texts[1].starts_with("Image attached: b.png"));
        assert_eq!(texts[2], "third");
    }
}
