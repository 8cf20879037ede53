//! Document probing: page count, metadata, and page geometry via lopdf.
//!
//! ## Why spawn_blocking?
//!
//! lopdf parses the whole cross-reference table and object graph on load,
//! which is CPU-bound and synchronous. `tokio::task::spawn_blocking` keeps
//! that work off the async worker threads.
//!
//! The probe is the only place the pipeline reads the PDF itself — the
//! conversion stages treat the document as an opaque input for external
//! tools. Geometry (MediaBox, in points) is carried through to assembly,
//! where it determines slide dimensions.

use crate::error::Pdf2PptError;
use crate::output::DocumentMetadata;
use lopdf::{Document, Object, ObjectId};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Fallback page size when a page carries no resolvable MediaBox:
/// 10 × 7.5 inches, the classic 4:3 slide.
const DEFAULT_PAGE_SIZE_PT: (f64, f64) = (720.0, 540.0);

/// Everything the pipeline needs to know about the source document.
#[derive(Debug, Clone)]
pub struct DocumentInfo {
    /// Info-dictionary metadata plus page count.
    pub metadata: DocumentMetadata,
    /// Page sizes in PDF points, indexed by page number − 1.
    pub page_sizes: Vec<(f64, f64)>,
}

impl DocumentInfo {
    /// Size in points of a 1-indexed page, falling back to the default
    /// slide size for out-of-range lookups.
    pub fn page_size(&self, page: u32) -> (f64, f64) {
        page.checked_sub(1)
            .and_then(|i| self.page_sizes.get(i as usize))
            .copied()
            .unwrap_or(DEFAULT_PAGE_SIZE_PT)
    }
}

/// Validate that `path` exists, is readable, and starts with `%PDF`.
pub fn validate_pdf_file(path: &Path) -> Result<(), Pdf2PptError> {
    if !path.exists() {
        return Err(Pdf2PptError::InputNotFound {
            path: path.to_path_buf(),
        });
    }

    match std::fs::File::open(path) {
        Ok(mut f) => {
            use std::io::Read;
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(Pdf2PptError::NotAPdf {
                    path: path.to_path_buf(),
                    magic,
                });
            }
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(Pdf2PptError::PermissionDenied {
                path: path.to_path_buf(),
            })
        }
        Err(_) => Err(Pdf2PptError::InputNotFound {
            path: path.to_path_buf(),
        }),
    }
}

/// Read page count, metadata, and per-page geometry from the document.
pub async fn probe_document(path: &Path) -> Result<DocumentInfo, Pdf2PptError> {
    validate_pdf_file(path)?;

    let owned: PathBuf = path.to_path_buf();
    tokio::task::spawn_blocking(move || probe_blocking(&owned))
        .await
        .map_err(|e| Pdf2PptError::Internal(format!("probe task panicked: {e}")))?
}

fn probe_blocking(path: &Path) -> Result<DocumentInfo, Pdf2PptError> {
    let doc = Document::load(path).map_err(|e| Pdf2PptError::CorruptPdf {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    let pages = doc.get_pages();
    let page_count = pages.len();

    let page_sizes: Vec<(f64, f64)> = pages
        .values()
        .map(|&page_id| page_media_box(&doc, page_id).unwrap_or(DEFAULT_PAGE_SIZE_PT))
        .collect();

    let mut metadata = read_info_dictionary(&doc);
    metadata.page_count = page_count;

    debug!(
        "Probed '{}': {} pages, title={:?}",
        path.display(),
        page_count,
        metadata.title
    );

    Ok(DocumentInfo {
        metadata,
        page_sizes,
    })
}

/// Resolve a page's MediaBox, walking `Parent` links for inherited values.
fn page_media_box(doc: &Document, page_id: ObjectId) -> Option<(f64, f64)> {
    let mut dict = doc.get_object(page_id).ok()?.as_dict().ok()?;
    loop {
        if let Ok(obj) = dict.get(b"MediaBox") {
            let array = match obj {
                Object::Array(a) => a,
                Object::Reference(id) => doc.get_object(*id).ok()?.as_array().ok()?,
                _ => return None,
            };
            let nums: Vec<f64> = array.iter().filter_map(as_number).collect();
            if nums.len() == 4 {
                let width = (nums[2] - nums[0]).abs();
                let height = (nums[3] - nums[1]).abs();
                if width > 0.0 && height > 0.0 {
                    return Some((width, height));
                }
            }
            return None;
        }
        match dict.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => {
                dict = doc.get_object(*parent_id).ok()?.as_dict().ok()?;
            }
            _ => return None,
        }
    }
}

fn as_number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

/// Extract the trailer's Info dictionary into [`DocumentMetadata`].
fn read_info_dictionary(doc: &Document) -> DocumentMetadata {
    let info = doc
        .trailer
        .get(b"Info")
        .ok()
        .and_then(|obj| obj.as_reference().ok())
        .and_then(|id| doc.get_object(id).ok());

    let Some(Object::Dictionary(info_dict)) = info else {
        return DocumentMetadata::default();
    };

    let get_string = |key: &[u8]| -> Option<String> {
        info_dict.get(key).ok().and_then(|obj| match obj {
            Object::String(bytes, _) => {
                // UTF-8 first, then Latin-1.
                String::from_utf8(bytes.clone())
                    .ok()
                    .or_else(|| Some(bytes.iter().map(|&b| b as char).collect()))
            }
            _ => None,
        })
    };

    DocumentMetadata {
        title: get_string(b"Title"),
        author: get_string(b"Author"),
        subject: get_string(b"Subject"),
        keywords: get_string(b"Keywords"),
        creator: get_string(b"Creator"),
        producer: get_string(b"Producer"),
        page_count: 0,
    }
}
