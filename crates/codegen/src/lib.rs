//! Backend-neutral descriptions of generated artifacts.
//!
//! Emitters hand a [`ClassSpec`] to a [`SourceBackend`]; the backend owns
//! rendering and persistence. The compiler itself never writes files.

pub mod backend;
pub mod spec;

pub use backend::{CodegenError, MemoryBackend, SourceBackend};
pub use spec::{Artifact, ClassSpec, ConstSpec, FieldSpec, MethodSpec, Param, Receiver, path_tokens};
