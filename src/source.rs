use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::error::IntakeError;

/// Extensions the loader accepts. PDF/DOCX/image sources stay behind
/// external tooling; the pipeline only ever needs a UTF-8 string.
const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "text"];

pub fn is_text_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| TEXT_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Load a plain-text file as UTF-8.
pub fn load_text(path: &Path) -> Result<String> {
    if !is_text_file(path) {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_string();
        return Err(IntakeError::UnsupportedSource(ext).into());
    }
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Resolve the CLI's input choice: inline text wins, then a file, then
/// whatever is piped on stdin.
pub fn read_input(text: Option<String>, file: Option<PathBuf>) -> Result<String> {
    if let Some(t) = text {
        return Ok(t);
    }
    if let Some(path) = file {
        return load_text(&path);
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read stdin")?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.txt");
        fs::write(&path, "Name: Ravi").unwrap();
        assert_eq!(load_text(&path).unwrap(), "Name: Ravi");
    }

    #[test]
    fn rejects_unsupported_extensions() {
        let err = load_text(Path::new("scan.pdf")).unwrap_err();
        assert!(err.to_string().contains("unsupported"));
    }

    #[test]
    fn inline_text_wins_over_file() {
        let got = read_input(Some("inline".into()), Some(PathBuf::from("missing.txt"))).unwrap();
        assert_eq!(got, "inline");
    }
}
