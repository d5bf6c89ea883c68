use crate::spec::Artifact;
use indexmap::IndexMap;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("could not write generated artifact {artifact}: {reason}")]
    Write { artifact: String, reason: String },
}

/// The source-emission seam. One call per artifact; a failed write is fatal
/// for the declaration that produced the artifact and is never retried.
pub trait SourceBackend: Send + Sync {
    fn emit(&self, artifact: &Artifact) -> Result<(), CodegenError>;
}

/// In-memory backend keeping rendered artifacts in emission order.
#[derive(Default)]
pub struct MemoryBackend {
    artifacts: Mutex<IndexMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names(&self) -> Vec<String> {
        self.artifacts
            .lock()
            .expect("artifact store poisoned")
            .keys()
            .cloned()
            .collect()
    }

    pub fn rendered(&self, name: &str) -> Option<String> {
        self.artifacts
            .lock()
            .expect("artifact store poisoned")
            .get(name)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.artifacts.lock().expect("artifact store poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SourceBackend for MemoryBackend {
    fn emit(&self, artifact: &Artifact) -> Result<(), CodegenError> {
        let mut store = self.artifacts.lock().map_err(|_| CodegenError::Write {
            artifact: artifact.name.clone(),
            reason: "artifact store poisoned".to_string(),
        })?;
        store.insert(artifact.name.clone(), artifact.class.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::ClassSpec;

    #[test]
    fn memory_backend_stores_rendered_artifacts() {
        let backend = MemoryBackend::new();
        let artifact = Artifact::new("sample::FooImpl", ClassSpec::new("FooImpl"));
        backend.emit(&artifact).unwrap();

        assert_eq!(backend.names(), vec!["sample::FooImpl".to_string()]);
        assert!(backend.rendered("sample::FooImpl").unwrap().contains("FooImpl"));
        assert!(backend.rendered("sample::Missing").is_none());
    }
}
