//! Character template importers.
//!
//! Each [`TemplateFormat`] maps to exactly one [`TemplateParser`]. Parsers
//! only translate a payload into a [`CharacterInput`]; the result still goes
//! through the normal creation path and its validation.

mod native_json;

pub use native_json::NativeJsonParser;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use sheetkeeper_domain::CharacterInput;
use thiserror::Error;

/// Known import formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateFormat {
    /// This engine's own JSON layout, bare or wrapped in an export envelope.
    NativeJson,
}

impl TemplateFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateFormat::NativeJson => "native-json",
        }
    }
}

impl fmt::Display for TemplateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateFormat {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native-json" | "native_json" | "native" | "json" | "sheetkeeper" => {
                Ok(TemplateFormat::NativeJson)
            }
            _ => Err(ImportError::UnknownFormat(s.to_string())),
        }
    }
}

/// Errors that can occur during import.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Unknown import format: {0}")]
    UnknownFormat(String),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported template: {0}")]
    Unsupported(String),
}

/// Translates one template format into a creation payload.
pub trait TemplateParser: Send + Sync {
    fn format(&self) -> TemplateFormat;

    fn parse(&self, payload: &str) -> Result<CharacterInput, ImportError>;
}

/// Format dispatch table.
#[derive(Clone)]
pub struct ImportRegistry {
    parsers: HashMap<TemplateFormat, Arc<dyn TemplateParser>>,
}

impl ImportRegistry {
    /// A registry with no parsers.
    pub fn empty() -> Self {
        Self {
            parsers: HashMap::new(),
        }
    }

    /// Register a parser under the format it reports, replacing any previous one.
    pub fn register(&mut self, parser: Arc<dyn TemplateParser>) {
        self.parsers.insert(parser.format(), parser);
    }

    pub fn formats(&self) -> Vec<TemplateFormat> {
        self.parsers.keys().copied().collect()
    }

    /// Resolve a format name and run its parser.
    pub fn parse(&self, format: &str, payload: &str) -> Result<CharacterInput, ImportError> {
        let format: TemplateFormat = format.parse()?;
        let parser = self
            .parsers
            .get(&format)
            .ok_or_else(|| ImportError::UnknownFormat(format.to_string()))?;
        parser.parse(payload)
    }
}

impl Default for ImportRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(NativeJsonParser));
        registry
    }
}

impl fmt::Debug for ImportRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportRegistry")
            .field("formats", &self.formats())
            .finish()
    }
}
