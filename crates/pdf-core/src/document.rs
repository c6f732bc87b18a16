//! PDF document access

use crate::drawing::DrawingReader;
use crate::{PdfError, Result};
use layout::DrawingOp;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::path::Path;

/// Maximum depth followed when resolving inherited page attributes
const MAX_INHERIT_DEPTH: usize = 32;

/// Vector drawings of one page
#[derive(Debug, Clone, PartialEq)]
pub struct PageDrawing {
    /// Page width in points
    pub width: f64,
    /// Page height in points
    pub height: f64,
    /// Drawing ops in the top-left, y-down page frame
    pub ops: Vec<DrawingOp>,
}

/// PDF document wrapper for reading page drawings
pub struct PdfDocument {
    inner: Document,
}

impl PdfDocument {
    /// Open a PDF document from a file
    ///
    /// # Example
    /// ```ignore
    /// let doc = PdfDocument::open("reference.pdf")?;
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let inner = Document::load(path).map_err(|e| PdfError::OpenError(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Open a PDF document from bytes
    pub fn open_from_bytes(data: &[u8]) -> Result<Self> {
        let inner = Document::load_mem(data).map_err(|e| PdfError::OpenError(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.inner.get_pages().len()
    }

    fn page_id(&self, page: usize) -> Result<ObjectId> {
        let pages = self.inner.get_pages();
        u32::try_from(page)
            .ok()
            .and_then(|number| pages.get(&number).copied())
            .ok_or(PdfError::InvalidPage(page, pages.len()))
    }

    /// Page attribute `key`, following the `Parent` chain when inherited
    fn inherited(&self, page: usize, key: &[u8]) -> Result<Option<&Object>> {
        let mut current = self.page_id(page)?;

        for _ in 0..MAX_INHERIT_DEPTH {
            let dict = self
                .inner
                .get_object(current)?
                .as_dict()
                .map_err(|_| PdfError::ParseError("page node is not a dictionary".to_string()))?;

            if let Ok(value) = dict.get(key) {
                return match value {
                    Object::Reference(id) => Ok(Some(self.inner.get_object(*id)?)),
                    other => Ok(Some(other)),
                };
            }

            match dict.get(b"Parent") {
                Ok(Object::Reference(parent)) => current = *parent,
                _ => break,
            }
        }

        Ok(None)
    }

    /// MediaBox `[llx, lly, urx, ury]` of a page (1-indexed)
    ///
    /// Follows the `Parent` chain when the page inherits its MediaBox.
    pub fn media_box(&self, page: usize) -> Result<[f64; 4]> {
        let media_box = self
            .inherited(page, b"MediaBox")?
            .ok_or_else(|| PdfError::ParseError(format!("page {page} has no MediaBox")))?;
        let array = media_box
            .as_array()
            .map_err(|_| PdfError::ParseError("MediaBox is not an array".to_string()))?;

        let values: Vec<f64> = array
            .iter()
            .filter_map(|v| match v {
                Object::Integer(i) => Some(*i as f64),
                Object::Real(r) => Some(f64::from(*r)),
                _ => None,
            })
            .collect();

        match values[..] {
            [llx, lly, urx, ury] => Ok([llx, lly, urx, ury]),
            _ => Err(PdfError::ParseError("invalid MediaBox format".to_string())),
        }
    }

    /// Resource dictionary of a page, possibly inherited
    fn resources(&self, page: usize) -> Result<Option<&Dictionary>> {
        Ok(self
            .inherited(page, b"Resources")?
            .and_then(|r| r.as_dict().ok()))
    }

    /// Read the vector drawings of a page (1-indexed)
    pub fn drawing(&self, page: usize) -> Result<PageDrawing> {
        let page_id = self.page_id(page)?;
        let media_box = self.media_box(page)?;
        let content = self.inner.get_page_content(page_id)?;
        let resources = self.resources(page)?;

        let mut reader = DrawingReader::new(media_box);
        reader.read_page(&self.inner, &content, resources)?;
        let (width, height) = reader.page_size();

        Ok(PageDrawing {
            width,
            height,
            ops: reader.finish(),
        })
    }
}
