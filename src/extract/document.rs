use log::debug;
use lopdf::Document;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use zip::ZipArchive;

use crate::error::ChopError;

/// Extract the text of every page of a PDF, in page order
pub fn pdf_text(data: &[u8]) -> Result<String, ChopError> {
    let document =
        Document::load_mem(data).map_err(|e| ChopError::DocumentParse(e.to_string()))?;
    let pages: Vec<u32> = document.get_pages().keys().copied().collect();
    debug!("Extracting text from {} PDF page(s)", pages.len());

    document
        .extract_text(&pages)
        .map_err(|e| ChopError::DocumentParse(e.to_string()))
}

/// Extract the raw text of a `.docx` file.
///
/// Reads `word/document.xml` from the archive; paragraphs and line breaks
/// become newlines, tabs become tabs. Formatting is discarded.
pub fn docx_text(data: &[u8]) -> Result<String, ChopError> {
    let mut archive =
        ZipArchive::new(Cursor::new(data)).map_err(|e| ChopError::DocumentParse(e.to_string()))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| ChopError::DocumentParse(e.to_string()))?
        .read_to_string(&mut xml)?;

    let mut reader = Reader::from_str(&xml);
    let mut text = String::new();
    let mut in_run_text = false;

    loop {
        match reader
            .read_event()
            .map_err(|e| ChopError::DocumentParse(e.to_string()))?
        {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_run_text = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_run_text = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" | b"w:cr" => text.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_run_text => {
                let unescaped = t
                    .unescape()
                    .map_err(|e| ChopError::DocumentParse(e.to_string()))?;
                text.push_str(&unescaped);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text)
}
