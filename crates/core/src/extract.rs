use std::path::Path;

use html2text::from_read_with_decorator;
use html2text::render::text_renderer::TrivialDecorator;

use crate::error::{AdvisorError, Result};

/// Wide enough that no table row or paragraph gets wrapped.
const HTML_RENDER_WIDTH: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanFormat {
    Pdf,
    Docx,
}

impl PlanFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(PlanFormat::Pdf),
            "docx" => Some(PlanFormat::Docx),
            _ => None,
        }
    }
}

/// Plain text of a downloaded plan document.
pub fn extract_plan_text(path: &Path) -> Result<String> {
    match PlanFormat::from_path(path) {
        Some(PlanFormat::Pdf) => pdf_text(path),
        Some(PlanFormat::Docx) => docx_text(path),
        None => Err(AdvisorError::UnsupportedInput(path.to_path_buf())),
    }
}

/// Renders page HTML to plain text, one block per line. No list bullets,
/// heading hashes or link footnotes.
pub fn html_to_text(html: &str) -> String {
    from_read_with_decorator(html.as_bytes(), HTML_RENDER_WIDTH, TrivialDecorator::new())
}

#[cfg(feature = "pdf")]
fn pdf_text(path: &Path) -> Result<String> {
    pdf_extract::extract_text(path).map_err(|e| AdvisorError::Pdf {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(not(feature = "pdf"))]
fn pdf_text(path: &Path) -> Result<String> {
    Err(AdvisorError::UnsupportedInput(path.to_path_buf()))
}

#[cfg(feature = "docx")]
fn docx_text(path: &Path) -> Result<String> {
    use std::fs::File;
    use std::io::Read;

    let docx_err = |message: String| AdvisorError::Docx {
        path: path.to_path_buf(),
        message,
    };
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| docx_err(e.to_string()))?;
    let mut entry = archive
        .by_name("word/document.xml")
        .map_err(|e| docx_err(e.to_string()))?;
    let mut xml = String::new();
    entry.read_to_string(&mut xml)?;
    docx_paragraphs(&xml).map_err(docx_err)
}

#[cfg(not(feature = "docx"))]
fn docx_text(path: &Path) -> Result<String> {
    Err(AdvisorError::UnsupportedInput(path.to_path_buf()))
}

/// Joins the text runs of every `<w:p>` paragraph, one paragraph per line.
#[cfg(feature = "docx")]
pub(crate) fn docx_paragraphs(xml: &str) -> std::result::Result<String, String> {
    use quick_xml::events::Event;
    use quick_xml::Reader;

    let mut reader = Reader::from_str(xml);
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text = false;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"w:t" => in_text = true,
                b"w:p" => current.clear(),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" => current.push('\t'),
                b"w:br" => current.push(' '),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => {
                let text = t.unescape().map_err(|e| e.to_string())?;
                current.push_str(&text);
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.to_string()),
            _ => {}
        }
    }
    Ok(paragraphs.join("\n"))
}
