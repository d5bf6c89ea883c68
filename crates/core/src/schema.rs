//! The locator schema: canonical, immutable IR of one declared operation.
//!
//! Built fresh each round by the binder and consumed by the emitters. The
//! segment types are closed sums per compilation direction; an unbound
//! template slot cannot be represented here, binding either resolves every
//! placeholder or fails the declaration.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use uriscope_api::{AdapterRef, ConstantParam, TypeDesc};

/// A path-bound input parameter of a builder operation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WriteVar {
    pub field: SmolStr,
    pub ty: TypeDesc,
    pub nullable: bool,
    pub default: Option<String>,
    pub adapter: Option<AdapterRef>,
    pub encoded: bool,
}

/// One segment of a builder's path, in path order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum WriteSegment {
    Constant { value: SmolStr, encoded: bool },
    Variable(WriteVar),
}

/// A query parameter written by a builder operation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WriteQuery {
    pub name: SmolStr,
    pub field: SmolStr,
    pub ty: TypeDesc,
    pub nullable: bool,
    pub default: Option<String>,
    pub adapter: Option<AdapterRef>,
}

/// Schema of one builder operation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BuilderSchema {
    pub op: SmolStr,
    pub scheme: String,
    pub authority: String,
    pub segments: Vec<WriteSegment>,
    pub query: Vec<WriteQuery>,
    pub constants: Vec<ConstantParam>,
}

/// An output field read back from a path segment.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReadVar {
    pub field: SmolStr,
    pub ty: TypeDesc,
    pub nullable: bool,
    pub default: Option<String>,
    pub adapter: Option<AdapterRef>,
    /// Bound by declaration order rather than by a named placeholder.
    pub positional: bool,
}

/// A read path binding: which raw segment position feeds which field.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReadSegment {
    pub position: usize,
    pub name: SmolStr,
    pub var: ReadVar,
}

/// A query parameter read by a reader.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReadQuery {
    pub name: SmolStr,
    pub field: SmolStr,
    pub ty: TypeDesc,
    pub nullable: bool,
    pub default: Option<String>,
    pub adapter: Option<AdapterRef>,
}

/// Schema of one reader.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReaderSchema {
    pub source: SmolStr,
    pub segments: Vec<ReadSegment>,
    pub query: Vec<ReadQuery>,
    pub constants: Vec<ConstantParam>,
}

impl ReaderSchema {
    /// Total number of lazily parsed fields; each gets one bit in the
    /// generated parse mask, path bindings first.
    pub fn field_count(&self) -> usize {
        self.segments.len() + self.query.len()
    }
}
