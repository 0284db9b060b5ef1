use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{MacroError, MacroResult};
use super::{ParamFuncBuilder, ParamPredicate};

/// The closed set of primitive kinds a parameter-function argument may have.
/// Each kind owns one entry in the coercion table below; there is no other
/// way for route-template text to reach a builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArgKind {
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float64,
    Bool,
    Str,
    StrSlice,
}

/// A coerced argument value. Narrow integer kinds are validated at their
/// declared width, then widened for storage.
#[derive(Debug, Clone, PartialEq)]
pub enum FuncArg {
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Str(String),
    StrSlice(Vec<String>),
}

impl FuncArg {
    pub fn kind(&self) -> ArgKind {
        match self {
            FuncArg::Int(_) => ArgKind::Int64,
            FuncArg::Uint(_) => ArgKind::Uint64,
            FuncArg::Float(_) => ArgKind::Float64,
            FuncArg::Bool(_) => ArgKind::Bool,
            FuncArg::Str(_) => ArgKind::Str,
            FuncArg::StrSlice(_) => ArgKind::StrSlice,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FuncArg::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<u64> {
        match self {
            FuncArg::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            FuncArg::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FuncArg::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FuncArg::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_slice(&self) -> Option<&[String]> {
        match self {
            FuncArg::StrSlice(v) => Some(v),
            _ => None,
        }
    }
}

/// The per-kind text-to-value coercion table. Returns `None` when the literal
/// does not parse at the declared kind and width.
pub fn coerce_arg(kind: ArgKind, raw: &str) -> Option<FuncArg> {
    let text = trim_quotes(raw);
    match kind {
        ArgKind::Int8 => text.parse::<i8>().ok().map(|v| FuncArg::Int(v.into())),
        ArgKind::Int16 => text.parse::<i16>().ok().map(|v| FuncArg::Int(v.into())),
        ArgKind::Int32 => text.parse::<i32>().ok().map(|v| FuncArg::Int(v.into())),
        ArgKind::Int64 => text.parse::<i64>().ok().map(FuncArg::Int),
        ArgKind::Uint8 => text.parse::<u8>().ok().map(|v| FuncArg::Uint(v.into())),
        ArgKind::Uint16 => text.parse::<u16>().ok().map(|v| FuncArg::Uint(v.into())),
        ArgKind::Uint32 => text.parse::<u32>().ok().map(|v| FuncArg::Uint(v.into())),
        ArgKind::Uint64 => text.parse::<u64>().ok().map(FuncArg::Uint),
        ArgKind::Float64 => text.parse::<f64>().ok().map(FuncArg::Float),
        ArgKind::Bool => parse_bool(text).map(FuncArg::Bool),
        ArgKind::Str => Some(FuncArg::Str(text.to_string())),
        ArgKind::StrSlice => {
            let inner = text.strip_prefix('[')?.strip_suffix(']')?;
            let items = if inner.trim().is_empty() {
                Vec::new()
            } else {
                inner
                    .split(',')
                    .map(|item| trim_quotes(item).to_string())
                    .collect()
            };
            Some(FuncArg::StrSlice(items))
        }
    }
}

pub(super) fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

fn trim_quotes(raw: &str) -> &str {
    let s = raw.trim();
    let bytes = s.as_bytes();
    if s.len() >= 2
        && ((bytes[0] == b'\'' && bytes[s.len() - 1] == b'\'')
            || (bytes[0] == b'"' && bytes[s.len() - 1] == b'"'))
    {
        return &s[1..s.len() - 1];
    }
    s
}

/// A registered parameter function: its name, the argument kinds it accepts,
/// and a builder producing the bound predicate. The builder runs once per
/// route that references the function, at template-compile time.
#[derive(Clone)]
pub struct ParamFuncDecl {
    name: String,
    signature: Vec<ArgKind>,
    builder: ParamFuncBuilder,
}

impl ParamFuncDecl {
    pub fn new(name: impl Into<String>, signature: &[ArgKind], builder: ParamFuncBuilder) -> Self {
        Self {
            name: name.into(),
            signature: signature.to_vec(),
            builder,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &[ArgKind] {
        &self.signature
    }

    /// Coerces the literal arguments through the kind table and invokes the
    /// builder. Arity and coercion failures fail the compilation of the
    /// route that used the function.
    pub fn bind(&self, args: &[String]) -> MacroResult<ParamPredicate> {
        if args.len() != self.signature.len() {
            return Err(MacroError::ArgumentCount {
                func: self.name.clone(),
                expected: self.signature.len(),
                found: args.len(),
            });
        }

        let mut coerced = Vec::with_capacity(args.len());
        for (i, (kind, raw)) in self.signature.iter().zip(args).enumerate() {
            match coerce_arg(*kind, raw) {
                Some(value) => coerced.push(value),
                None => {
                    return Err(MacroError::ArgumentCoercion {
                        func: self.name.clone(),
                        index: i,
                        kind: *kind,
                        value: raw.clone(),
                    });
                }
            }
        }

        (self.builder)(&coerced)
    }
}

impl fmt::Debug for ParamFuncDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamFuncDecl")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerces_at_declared_width() {
        assert_eq!(coerce_arg(ArgKind::Uint8, "200"), Some(FuncArg::Uint(200)));
        assert_eq!(coerce_arg(ArgKind::Uint8, "300"), None);
        assert_eq!(coerce_arg(ArgKind::Int8, "-12"), Some(FuncArg::Int(-12)));
        assert_eq!(coerce_arg(ArgKind::Int64, "abc"), None);
    }

    #[test]
    fn coerces_quoted_strings() {
        assert_eq!(
            coerce_arg(ArgKind::Str, "'hello'"),
            Some(FuncArg::Str("hello".to_string()))
        );
    }

    #[test]
    fn coerces_slice_literals() {
        assert_eq!(
            coerce_arg(ArgKind::StrSlice, "[a,b,c]"),
            Some(FuncArg::StrSlice(vec![
                "a".to_string(),
                "b".to_string(),
                "c".to_string()
            ]))
        );
        assert_eq!(coerce_arg(ArgKind::StrSlice, "[]"), Some(FuncArg::StrSlice(Vec::new())));
        assert_eq!(coerce_arg(ArgKind::StrSlice, "a,b"), None);
    }

    #[test]
    fn coerces_bools() {
        assert_eq!(coerce_arg(ArgKind::Bool, "true"), Some(FuncArg::Bool(true)));
        assert_eq!(coerce_arg(ArgKind::Bool, "0"), Some(FuncArg::Bool(false)));
        assert_eq!(coerce_arg(ArgKind::Bool, "yes"), None);
    }
}
