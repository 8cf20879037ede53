//! Page-range expression parsing.
//!
//! An expression is a comma-separated list of tokens; each token is a
//! single page number (`7`) or a closed range (`1-5`). The resolved list
//! preserves first-seen order and keeps only the first occurrence of a
//! duplicate — selection order drives slide order during assembly, so the
//! expansion must be deterministic.

use crate::error::Pdf2PptError;
use std::collections::HashSet;

/// Resolve a page-selection expression against the document's page count.
///
/// An empty or absent expression selects every page in ascending order.
/// Pure function: no I/O, safe to call repeatedly and concurrently.
///
/// # Errors
/// * [`Pdf2PptError::MalformedExpression`] — non-numeric token, empty
///   token, or a range with `start > end`
/// * [`Pdf2PptError::PageOutOfRange`] — a token resolving outside
///   `1..=total_pages`
pub fn parse_page_range(
    expression: Option<&str>,
    total_pages: usize,
) -> Result<Vec<u32>, Pdf2PptError> {
    let expression = expression.map(str::trim).unwrap_or_default();
    if expression.is_empty() {
        return Ok((1..=total_pages as u32).collect());
    }

    let mut pages = Vec::new();
    let mut seen = HashSet::new();

    for raw in expression.split(',') {
        let token = raw.trim();
        if token.is_empty() {
            return Err(Pdf2PptError::MalformedExpression {
                token: raw.to_string(),
            });
        }

        let (start, end) = match token.split_once('-') {
            Some((a, b)) => {
                let start = parse_page(a.trim(), token)?;
                let end = parse_page(b.trim(), token)?;
                if start > end {
                    return Err(Pdf2PptError::MalformedExpression {
                        token: token.to_string(),
                    });
                }
                (start, end)
            }
            None => {
                let page = parse_page(token, token)?;
                (page, page)
            }
        };

        for page in start..=end {
            if page == 0 || page as usize > total_pages {
                return Err(Pdf2PptError::PageOutOfRange {
                    token: token.to_string(),
                    total: total_pages,
                });
            }
            if seen.insert(page) {
                pages.push(page);
            }
        }
    }

    Ok(pages)
}

fn parse_page(text: &str, token: &str) -> Result<u32, Pdf2PptError> {
    text.parse::<u32>()
        .map_err(|_| Pdf2PptError::MalformedExpression {
            token: token.to_string(),
        })
}
