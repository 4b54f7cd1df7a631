use crate::document::Document;
use crate::error::Result;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Pretty JSON array of `{url, title, content}` objects; non-ASCII text is
/// written as-is.
pub fn documents_to_json(documents: &[Document]) -> Result<String> {
    Ok(serde_json::to_string_pretty(documents)?)
}

pub fn write_documents(path: &Path, documents: &[Document]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(documents_to_json(documents)?.as_bytes())?;
    file.write_all(b"\n")?;
    Ok(())
}

pub fn read_documents(path: &Path) -> Result<Vec<Document>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
