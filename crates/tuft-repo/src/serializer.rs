//! Text encoding of role and settings files

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

/// Turns structured values into file contents and back
///
/// One serializer is used for every role file of a repository and for the
/// client settings file; its extension is part of every file name.
pub trait Serializer: Send + Sync {
    /// Encode `value` as file contents
    fn encode(&self, value: &Value) -> Result<Vec<u8>>;

    /// Decode file contents
    fn decode(&self, data: &[u8]) -> Result<Value>;

    /// File extension without the leading dot
    fn file_extension(&self) -> &str;

    /// MIME type of encoded files
    fn content_type(&self) -> &str;
}

/// Tab-indented JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl JsonSerializer {
    pub fn new() -> Self {
        Self
    }
}

impl Serializer for JsonSerializer {
    fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
        value.serialize(&mut ser)?;
        out.push(b'\n');
        Ok(out)
    }

    fn decode(&self, data: &[u8]) -> Result<Value> {
        Ok(serde_json::from_slice(data)?)
    }

    fn file_extension(&self) -> &str {
        "json"
    }

    fn content_type(&self) -> &str {
        "text/json"
    }
}
