use thiserror::Error;

use super::func::ArgKind;
use crate::interpreter::ParseError;

#[derive(Debug, Error)]
pub enum MacroError {
    #[error("a parameter type must have a non-empty indent")]
    EmptyIndent,
    #[error("parameter type '{indent}' needs an evaluator")]
    MissingEvaluator { indent: String },
    #[error("parameter type indent '{indent}' is already registered")]
    IndentTaken { indent: String },
    #[error("parameter type alias '{alias}' is already registered")]
    AliasTaken { alias: String },
    #[error("a master parameter type already exists ('{existing}')")]
    MasterAlreadyRegistered { existing: String },
    #[error("'{name}' is not a valid parameter function name")]
    InvalidFuncName { name: String },
    #[error("function '{func}' expects {expected} argument(s), found {found}")]
    ArgumentCount {
        func: String,
        expected: usize,
        found: usize,
    },
    #[error("function '{func}' argument {index} ('{value}') is not a valid {kind:?}")]
    ArgumentCoercion {
        func: String,
        index: usize,
        kind: ArgKind,
        value: String,
    },
    #[error("function argument {index} is missing or has the wrong kind")]
    BadArgument { index: usize },
    #[error("invalid regular expression '{pattern}': {error}")]
    InvalidRegexp { pattern: String, error: String },
}

pub type MacroResult<T> = Result<T, MacroError>;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("{src}: unknown parameter type '{indent}'")]
    UnknownType { src: String, indent: String },
    #[error("{src}: binding parameter function '{func}' failed: {source}")]
    Bind {
        src: String,
        func: String,
        #[source]
        source: MacroError,
    },
}

pub type TemplateResult<T> = Result<T, TemplateError>;
