//! Input manager for loading uploaded resumes and the job description

use crate::error::{Result, RankerError};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::{MarkdownExtractor, PlainTextExtractor, TextExtractor};
use log::info;
use std::path::Path;
use tokio::fs;

/// One uploaded resume: its display name and raw bytes.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

#[derive(Default)]
pub struct InputManager;

impl InputManager {
    pub fn new() -> Self {
        Self
    }

    /// Read a resume upload. Only PDF files are accepted; the bytes are not
    /// parsed here so an unreadable PDF still becomes part of the batch.
    pub async fn load_resume(&self, path: &Path) -> Result<UploadedDocument> {
        if !path.exists() {
            return Err(RankerError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        if FileType::from_path(path) != FileType::Pdf {
            return Err(RankerError::UnsupportedFormat(format!(
                "Resumes must be PDF files: {}",
                path.display()
            )));
        }

        let bytes = fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        info!("Loaded resume {} ({} bytes)", name, bytes.len());
        Ok(UploadedDocument::new(name, bytes))
    }

    pub async fn load_resumes(&self, paths: &[impl AsRef<Path>]) -> Result<Vec<UploadedDocument>> {
        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            documents.push(self.load_resume(path.as_ref()).await?);
        }
        Ok(documents)
    }

    /// Read a job description from a plain-text or Markdown file.
    pub async fn load_job_description(&self, path: &Path) -> Result<String> {
        if !path.exists() {
            return Err(RankerError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let text = match FileType::from_path(path) {
            FileType::Text => PlainTextExtractor.extract(path).await?,
            FileType::Markdown => MarkdownExtractor.extract(path).await?,
            FileType::Pdf | FileType::Unknown => {
                return Err(RankerError::UnsupportedFormat(format!(
                    "Job description must be a .txt or .md file: {}",
                    path.display()
                )));
            }
        };

        if text.trim().is_empty() {
            return Err(RankerError::InvalidInput(format!(
                "Job description is empty: {}",
                path.display()
            )));
        }

        Ok(text)
    }
}
