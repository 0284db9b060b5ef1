use serde::{Deserialize, Serialize};

use crate::macros::ParamType;
use crate::types::ErrorCode;

/// Status code applied when a parameter expression carries no `else` clause.
pub const DEFAULT_PARAM_ERROR_CODE: ErrorCode = 404;

/// One `name(arg, ...)` reference inside a parameter expression. Arguments
/// are kept as literal text; coercion happens when the function is bound
/// against its registered declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuncCall {
    pub name: String,
    pub args: Vec<String>,
}

/// The parsed form of a single `{...}` occurrence in a route path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamStatement {
    pub src: String,
    pub name: String,
    pub ty: ParamType,
    pub funcs: Vec<FuncCall>,
    pub error_code: ErrorCode,
}
