//! Native JSON templates.
//!
//! Accepts either a bare creation payload or an export envelope:
//!
//! ```json
//! { "format": "sheetkeeper", "version": 1, "character": { "name": "..." } }
//! ```

use serde::Deserialize;
use sheetkeeper_domain::CharacterInput;

use super::{ImportError, TemplateFormat, TemplateParser};

const ENVELOPE_FORMAT: &str = "sheetkeeper";
const SUPPORTED_VERSION: u32 = 1;

#[derive(Deserialize)]
struct Envelope {
    format: String,
    #[serde(default = "default_version")]
    version: u32,
    character: serde_json::Value,
}

fn default_version() -> u32 {
    SUPPORTED_VERSION
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NativeJsonParser;

impl TemplateParser for NativeJsonParser {
    fn format(&self) -> TemplateFormat {
        TemplateFormat::NativeJson
    }

    fn parse(&self, payload: &str) -> Result<CharacterInput, ImportError> {
        let value: serde_json::Value = serde_json::from_str(payload)?;

        let body = if value.get("character").is_some() && value.get("format").is_some() {
            let envelope: Envelope = serde_json::from_value(value)?;
            if envelope.format != ENVELOPE_FORMAT {
                return Err(ImportError::Unsupported(format!(
                    "envelope format {}",
                    envelope.format
                )));
            }
            if envelope.version > SUPPORTED_VERSION {
                return Err(ImportError::Unsupported(format!(
                    "envelope version {} (newest supported is {})",
                    envelope.version, SUPPORTED_VERSION
                )));
            }
            envelope.character
        } else {
            value
        };

        Ok(serde_json::from_value(body)?)
    }
}
