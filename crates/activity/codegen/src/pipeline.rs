//! Descriptor → schema → IR → rendered text.

use std::path::Path;

use activity_types::ServiceSchema;

use crate::backend::{EmissionBackend, JsonBackend};
use crate::descriptor::DescriptorReader;
use crate::error::{CodegenError, CodegenResult};
use crate::synthesizer::{Synthesis, WrapperSynthesizer};

/// Output of one pipeline run.
#[derive(Clone, Debug)]
pub struct GenerationOutput {
    pub synthesis: Synthesis,
    pub rendered: String,
}

/// Wires a reader, a synthesizer and a backend together.
pub struct CodegenPipeline {
    reader: DescriptorReader,
    synthesizer: WrapperSynthesizer,
    backend: Box<dyn EmissionBackend>,
}

impl CodegenPipeline {
    pub fn new() -> Self {
        Self {
            reader: DescriptorReader::new(),
            synthesizer: WrapperSynthesizer::new(),
            backend: Box::new(JsonBackend::new()),
        }
    }

    pub fn with_reader(mut self, reader: DescriptorReader) -> Self {
        self.reader = reader;
        self
    }

    pub fn with_synthesizer(mut self, synthesizer: WrapperSynthesizer) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    pub fn with_backend(mut self, backend: Box<dyn EmissionBackend>) -> Self {
        self.backend = backend;
        self
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Read, synthesize and render one descriptor file.
    pub fn run(&self, path: impl AsRef<Path>) -> CodegenResult<GenerationOutput> {
        let schema = self.reader.read_path(path)?;
        self.generate(&schema)
    }

    /// Synthesize and render an already loaded schema.
    pub fn generate(&self, schema: &ServiceSchema) -> CodegenResult<GenerationOutput> {
        let synthesis = self.synthesizer.synthesize(schema);
        let rendered = self.backend.render(&synthesis.ir)?;
        tracing::debug!(
            service = %schema.full_name(),
            backend = %self.backend.name(),
            bytes = rendered.len(),
            "IR rendered"
        );
        Ok(GenerationOutput {
            synthesis,
            rendered,
        })
    }
}

impl Default for CodegenPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Write rendered output, creating parent directories as needed.
pub fn write_output(path: impl AsRef<Path>, rendered: &str) -> CodegenResult<()> {
    let path = path.as_ref();
    let write_err = |source| CodegenError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    std::fs::write(path, rendered).map_err(write_err)?;
    tracing::info!(path = %path.display(), "Output written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use activity_types::MethodSchema;

    #[test]
    fn generate_renders_json() {
        let schema = ServiceSchema::new("Svc").with_method(MethodSchema::new("Ping"));
        let out = CodegenPipeline::new().generate(&schema).unwrap();
        assert!(out.synthesis.is_clean());
        assert!(out.rendered.contains("RegisterPingActivity"));
    }

    #[test]
    fn run_surfaces_descriptor_errors() {
        let err = CodegenPipeline::new().run("missing.yaml").unwrap_err();
        assert!(matches!(err, CodegenError::Descriptor(_)));
    }
}
