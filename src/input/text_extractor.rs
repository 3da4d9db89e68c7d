//! Text extraction from uploaded documents

use crate::error::{Result, RankerError};
use log::{debug, warn};
use lopdf::Document as PdfDocument;
use pulldown_cmark::{Event, Parser, Tag};
use std::path::Path;
use tokio::fs;

pub trait TextExtractor {
    fn extract(&self, path: &Path) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// Extract page-ordered text from an in-memory PDF.
///
/// A page whose content cannot be decoded contributes nothing; only a document
/// that cannot be opened at all is reported as unreadable. When every page comes
/// back empty, a whole-document pass is tried before settling for empty text.
pub fn extract_pdf_text(name: &str, bytes: &[u8]) -> Result<String> {
    let document = PdfDocument::load_mem(bytes).map_err(|e| RankerError::unreadable(name, e))?;

    let pages = document.get_pages();
    let mut text = String::new();

    // BTreeMap keys are page numbers, so iteration is document order
    for page_number in pages.keys() {
        match document.extract_text(&[*page_number]) {
            Ok(page_text) => text.push_str(&page_text),
            Err(e) => warn!("{}: page {} has no extractable text: {}", name, page_number, e),
        }
    }

    if text.trim().is_empty() && !pages.is_empty() {
        debug!("{}: page extraction came back empty, trying whole-document pass", name);
        match pdf_extract::extract_text_from_mem(bytes) {
            Ok(whole) => text = whole,
            Err(e) => warn!("{}: whole-document extraction failed: {}", name, e),
        }
    }

    debug!("{}: extracted {} characters from {} pages", name, text.len(), pages.len());
    Ok(text)
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let content = fs::read_to_string(path).await?;
        Ok(content)
    }
}

pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let markdown_content = fs::read_to_string(path).await?;
        Ok(self.markdown_to_text(&markdown_content))
    }
}

impl MarkdownExtractor {
    /// Flatten Markdown to plain text, one line per block.
    pub fn markdown_to_text(&self, markdown: &str) -> String {
        let mut text = String::new();

        for event in Parser::new(markdown) {
            match event {
                Event::Text(t) | Event::Code(t) => text.push_str(&t),
                Event::SoftBreak | Event::HardBreak => text.push('\n'),
                Event::End(Tag::Paragraph)
                | Event::End(Tag::Heading(..))
                | Event::End(Tag::Item)
                | Event::End(Tag::CodeBlock(_)) => text.push('\n'),
                _ => {}
            }
        }

        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    fn build_pdf(pages: &[&str]) -> Vec<u8> {
        let mut doc = PdfDocument::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids = Vec::new();
        for page_text in pages {
            // an empty string gives a page with no text operations
            let operations = if page_text.is_empty() {
                Vec::new()
            } else {
                vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*page_text)]),
                    Operation::new("ET", vec![]),
                ]
            };
            let content = Content { operations };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn test_garbage_bytes_are_unreadable() {
        let result = extract_pdf_text("junk.pdf", b"this is not a pdf at all");
        match result {
            Err(RankerError::DocumentUnreadable { name, .. }) => assert_eq!(name, "junk.pdf"),
            other => panic!("expected DocumentUnreadable, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_upload_is_unreadable() {
        assert!(matches!(
            extract_pdf_text("empty.pdf", &[]),
            Err(RankerError::DocumentUnreadable { .. })
        ));
    }

    #[test]
    fn test_pages_are_joined_in_document_order() {
        let bytes = build_pdf(&["Rust developer", "Kubernetes operator"]);
        let text = extract_pdf_text("two-pages.pdf", &bytes).unwrap();
        assert_eq!(text, "Rust developer\nKubernetes operator\n");
    }

    #[test]
    fn test_blank_pages_give_empty_text() {
        let bytes = build_pdf(&["", ""]);
        let text = extract_pdf_text("blank.pdf", &bytes).unwrap();
        assert!(text.trim().is_empty());
    }

    #[test]
    fn test_truncated_pdf_is_unreadable() {
        let bytes = build_pdf(&["Rust developer"]);
        let truncated = &bytes[..bytes.len() / 2];
        assert!(matches!(
            extract_pdf_text("truncated.pdf", truncated),
            Err(RankerError::DocumentUnreadable { .. })
        ));
    }

    #[test]
    fn test_markdown_flattening() {
        let markdown = "# Backend Engineer\n\nWe need **Rust** and `tokio`.\n\n- Docker\n- Kubernetes\n";
        let text = MarkdownExtractor.markdown_to_text(markdown);

        assert!(text.contains("Backend Engineer"));
        assert!(text.contains("We need Rust and tokio."));
        assert!(text.contains("Docker"));
        assert!(!text.contains("**"));
        assert!(!text.contains('#'));
    }
}
