//! File-backed schema and prompt libraries
//!
//! Both read from a flat directory: schemas are `<name>.json`, prompts are
//! `<name>.txt`. Listings are sorted by file name. A missing directory lists
//! as empty; a file that cannot be read or parsed is skipped with an error
//! logged.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{GatewayError, Result};

/// A named prompt template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptFile {
    pub name: String,
    pub content: String,
}

/// Reject names that could escape the library directory
fn check_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
        return Err(GatewayError::Validation(format!(
            "Invalid resource name: {}",
            name
        )));
    }
    Ok(())
}

/// Sorted `(stem, path)` pairs of files in `dir` with `extension`
fn entries(dir: &Path, extension: &str) -> Result<Vec<(String, PathBuf)>> {
    let read_dir = match std::fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!("Directory not found: {}", dir.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let mut found = Vec::new();
    for entry in read_dir {
        let path = entry?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            found.push((stem.to_string(), path.clone()));
        }
    }

    found.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(found)
}

/// Read `path`, mapping a missing file to `NotFound`
fn read_resource(path: &Path, kind: &str, name: &str) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            GatewayError::NotFound(format!("{} not found: {}", kind, name))
        } else {
            GatewayError::Io(e)
        }
    })
}

/// JSON schemas stored as `<name>.json`
#[derive(Debug, Clone)]
pub struct SchemaLibrary {
    root: PathBuf,
}

impl SchemaLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every readable schema, in file name order
    pub fn list(&self) -> Result<Vec<Value>> {
        let mut schemas = Vec::new();
        for (name, path) in entries(&self.root, "json")? {
            match std::fs::read_to_string(&path)
                .map_err(GatewayError::from)
                .and_then(|text| Ok(serde_json::from_str::<Value>(&text)?))
            {
                Ok(schema) => schemas.push(schema),
                Err(e) => tracing::error!("Error loading schema {}: {}", name, e),
            }
        }
        Ok(schemas)
    }

    pub fn get(&self, name: &str) -> Result<Value> {
        check_name(name)?;
        let path = self.root.join(format!("{}.json", name));
        let text = read_resource(&path, "Schema", name)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Prompt templates stored as `<name>.txt`
#[derive(Debug, Clone)]
pub struct PromptLibrary {
    root: PathBuf,
}

impl PromptLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn list(&self) -> Result<Vec<PromptFile>> {
        let mut prompts = Vec::new();
        for (name, path) in entries(&self.root, "txt")? {
            match std::fs::read_to_string(&path) {
                Ok(content) => prompts.push(PromptFile { name, content }),
                Err(e) => tracing::error!("Error loading prompt {}: {}", name, e),
            }
        }
        Ok(prompts)
    }

    pub fn get(&self, name: &str) -> Result<PromptFile> {
        check_name(name)?;
        let path = self.root.join(format!("{}.txt", name));
        let content = read_resource(&path, "Prompt", name)?;
        Ok(PromptFile {
            name: name.to_string(),
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_schema_listing_skips_bad_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b_trace.json"), r#"{"title": "B"}"#).unwrap();
        std::fs::write(dir.path().join("a_trace.json"), r#"{"title": "A"}"#).unwrap();
        std::fs::write(dir.path().join("broken.json"), "{not json").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let schemas = SchemaLibrary::new(dir.path()).list().unwrap();
        assert_eq!(schemas.len(), 2);
        assert_eq!(schemas[0]["title"], "A");
        assert_eq!(schemas[1]["title"], "B");
    }

    #[test]
    fn test_missing_directory_lists_empty() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nowhere");

        assert!(SchemaLibrary::new(&missing).list().unwrap().is_empty());
        assert!(PromptLibrary::new(&missing).list().unwrap().is_empty());
    }

    #[test]
    fn test_get_prompt() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("negotiation.txt"), "You are negotiating").unwrap();
        let library = PromptLibrary::new(dir.path());

        let prompt = library.get("negotiation").unwrap();
        assert_eq!(prompt.name, "negotiation");
        assert_eq!(prompt.content, "You are negotiating");

        assert!(matches!(library.get("absent"), Err(GatewayError::NotFound(_))));
    }

    #[test]
    fn test_names_cannot_escape_root() {
        let library = SchemaLibrary::new("schemas");
        for name in ["../secrets", "a/b", "a\\b", ".."] {
            assert!(
                matches!(library.get(name), Err(GatewayError::Validation(_))),
                "name {name}"
            );
        }
    }
}
