use smol_str::SmolStr;
use thiserror::Error;

/// Compile-time failures. Every variant except `UnresolvedAtEnd` aborts a
/// single declaration; sibling declarations keep compiling.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("Path template {{{name}}} doesn't have an appropriate substitute")]
    UnresolvedTemplate { decl: SmolStr, name: SmolStr },
    #[error("Path fields [{fields}] are not found in '{base_path}'")]
    UnboundPathFields {
        decl: SmolStr,
        fields: String,
        base_path: String,
    },
    #[error("Path segment {{{name}}} is not defined in '{base_path}'")]
    UndefinedPathSegment {
        decl: SmolStr,
        name: SmolStr,
        base_path: String,
    },
    #[error("Path segment '{name}' must be explicitly non-null or have a default value")]
    NullablePathSegment { decl: SmolStr, name: SmolStr },
    #[error("Unknown type {ty} of '{name}'")]
    UnknownType {
        decl: SmolStr,
        name: SmolStr,
        ty: String,
    },
    #[error("Default value for {ty} can not be empty")]
    EmptyDefault { decl: SmolStr, ty: String },
    #[error("Default value '{value}' is not a valid {ty}")]
    InvalidDefault {
        decl: SmolStr,
        value: String,
        ty: String,
    },
    #[error("Matcher code name '{name}' contains invalid symbols")]
    InvalidCodeName { decl: SmolStr, name: String },
    #[error("Matcher code '{name}' is declared both enabled and disabled")]
    CodeFlagConflict { decl: SmolStr, name: SmolStr },
    #[error("Could not write generated artifact {artifact}: {reason}")]
    Write { artifact: String, reason: String },
    #[error("Invalid declaration: {0}")]
    Invalid(String),
    #[error("Unresolved declarations after the final round: [{}]", .0.join(", "))]
    UnresolvedAtEnd(Vec<SmolStr>),
}

pub type Result<T> = std::result::Result<T, CompileError>;

impl From<uriscope_codegen::CodegenError> for CompileError {
    fn from(err: uriscope_codegen::CodegenError) -> Self {
        match err {
            uriscope_codegen::CodegenError::Write { artifact, reason } => {
                CompileError::Write { artifact, reason }
            }
        }
    }
}
