//! Decoding policy documents with field-path context in error messages.
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::policy::LegacyClusterPolicy;

#[derive(Debug, Error)]
#[error("document {index}: at {path} → {message}")]
pub struct DocumentError {
    pub index: usize,
    pub path: String,
    pub message: String,
}

/// Decode every document of a (possibly multi-document) YAML text. JSON is
/// YAML, so JSON input works as well.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<Vec<T>, DocumentError> {
    let mut out = Vec::new();
    for (index, document) in serde_yaml::Deserializer::from_str(src).enumerate() {
        match serde_path_to_error::deserialize::<_, T>(document) {
            Ok(v) => out.push(v),
            Err(err) => {
                let path = err.path().to_string();
                return Err(DocumentError { index, path, message: err.into_inner().to_string() });
            }
        }
    }
    Ok(out)
}

pub fn policies_from_str(src: &str) -> Result<Vec<LegacyClusterPolicy>, DocumentError> {
    from_str_with_path(src)
}

/// Encoding for translated documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl OutputFormat {
    /// Render documents, separating several with `---`.
    pub fn render<T: serde::Serialize>(self, docs: &[T]) -> anyhow::Result<String> {
        let mut parts = Vec::with_capacity(docs.len());
        for doc in docs {
            parts.push(match self {
                OutputFormat::Yaml => serde_yaml::to_string(doc)?,
                OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(doc)?),
            });
        }
        Ok(parts.join("---\n"))
    }
}
