//! Local PDF loading for the document pane.
//!
//! Each page is reduced to its text lines, and every non-empty line becomes a
//! selectable element. Structured extraction is left to the remote service.

use crate::domain::{EditorError, EditorResult};
use lopdf::Document;
use std::path::{Path, PathBuf};

/// One selectable text fragment of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfElement {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfPage {
    /// One-based page number as printed in the document
    pub number: u32,
    pub elements: Vec<PdfElement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfDocument {
    pub path: PathBuf,
    pub pages: Vec<PdfPage>,
}

impl PdfDocument {
    /// Loads a PDF and splits every page into text elements.
    ///
    /// A page whose text cannot be decoded is kept with no elements so page
    /// numbering stays intact.
    pub fn open(path: &Path) -> EditorResult<Self> {
        let document = Document::load(path).map_err(|e| EditorError::Pdf {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut pages = Vec::new();
        for number in document.get_pages().keys().copied() {
            let text = match document.extract_text(&[number]) {
                Ok(text) => text,
                Err(err) => {
                    log::warn!("page {} of {}: {}", number, path.display(), err);
                    String::new()
                }
            };
            pages.push(PdfPage::from_text(number, &text));
        }

        if pages.is_empty() {
            return Err(EditorError::Pdf {
                path: path.to_path_buf(),
                reason: "document has no pages".to_string(),
            });
        }

        log::info!("opened {} with {} pages", path.display(), pages.len());
        Ok(Self {
            path: path.to_path_buf(),
            pages,
        })
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn page(&self, index: usize) -> Option<&PdfPage> {
        self.pages.get(index)
    }
}

impl PdfPage {
    pub fn from_text(number: u32, text: &str) -> Self {
        let elements = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .enumerate()
            .map(|(n, line)| PdfElement {
                id: format!("p{number}-e{}", n + 1),
                text: line.to_string(),
            })
            .collect();
        Self { number, elements }
    }
}
