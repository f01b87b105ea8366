//! Reading source documents and writing the imposed one
//!
//! Parsing and serializing run on the blocking pool; errors carry the
//! file they came from.

use crate::types::*;
use lopdf::Document;
use std::path::{Path, PathBuf};

fn source_error(path: &Path, reason: impl ToString) -> ImposeError {
    ImposeError::Source {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

/// Read and parse one source document
pub async fn load_pdf(path: impl AsRef<Path>) -> Result<Document> {
    let path: PathBuf = path.as_ref().to_owned();
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| source_error(&path, e))?;

    let document = tokio::task::spawn_blocking(move || Document::load_mem(&bytes))
        .await?
        .map_err(|e| source_error(&path, format!("not a readable PDF ({e})")))?;

    let pages = document.get_pages().len();
    if pages == 0 {
        log::warn!("{} has no pages", path.display());
    } else {
        log::debug!("Read {} source pages from {}", pages, path.display());
    }
    Ok(document)
}

/// Read every source document, keeping their order
pub async fn load_multiple_pdfs(paths: &[impl AsRef<Path>]) -> Result<Vec<Document>> {
    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        documents.push(load_pdf(path).await?);
    }
    Ok(documents)
}

/// Serialize the imposed document to `path`
pub async fn save_pdf(mut imposed: Document, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref().to_owned();
    let bytes = tokio::task::spawn_blocking(move || {
        let mut buffer = Vec::new();
        imposed.save_to(&mut buffer).map(|_| buffer)
    })
    .await?
    .map_err(|e| source_error(&path, e))?;

    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|e| source_error(&path, e))?;
    log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
