//! Emission backends render the IR to text.

use crate::error::{CodegenError, CodegenResult};
use crate::ir::ServiceIr;

/// Turns a [`ServiceIr`] into a target representation.
///
/// Backends must be deterministic: identical IR renders to identical text.
pub trait EmissionBackend: Send + Sync {
    /// Short identifier used in logs and errors
    fn name(&self) -> &str;

    fn render(&self, ir: &ServiceIr) -> CodegenResult<String>;
}

/// Renders the IR as JSON.
#[derive(Clone, Debug)]
pub struct JsonBackend {
    pretty: bool,
}

impl JsonBackend {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl EmissionBackend for JsonBackend {
    fn name(&self) -> &str {
        "json"
    }

    fn render(&self, ir: &ServiceIr) -> CodegenResult<String> {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(ir)
        } else {
            serde_json::to_string(ir)
        };
        rendered.map_err(|e| CodegenError::Render {
            backend: self.name().to_string(),
            message: e.to_string(),
        })
    }
}
