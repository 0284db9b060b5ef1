mod error;
mod func;
mod template;

use std::fmt;
use std::sync::Arc;

use hashbrown::HashMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub use error::{MacroError, MacroResult, TemplateError, TemplateResult};
pub use func::{ArgKind, FuncArg, ParamFuncDecl, coerce_arg};
pub use template::{Template, TemplateParam, parse};

/// Validates and decodes a raw path-segment value for one parameter type.
pub type ParamEvaluator = Arc<dyn Fn(&str) -> Option<ParamValue> + Send + Sync>;

/// A bound predicate over a decoded parameter value.
pub type ParamPredicate = Arc<dyn Fn(&ParamValue) -> bool + Send + Sync>;

/// Builds a predicate from coerced arguments at template-compile time.
pub type ParamFuncBuilder = Arc<dyn Fn(&[FuncArg]) -> MacroResult<ParamPredicate> + Send + Sync>;

/// Renders a rejection message for the serving layer from the raw value.
pub type ParamErrorHandler = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// A decoded parameter value. Narrow integer types validate at their own
/// width, then widen for storage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Uint(u64),
    Bool(bool),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<u64> {
        match self {
            ParamValue::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Str(v) => f.write_str(v),
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Uint(v) => write!(f, "{v}"),
            ParamValue::Bool(v) => write!(f, "{v}"),
        }
    }
}

/// Identity of a parameter type: canonical name, optional secondary name,
/// and the master/trailing capabilities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamType {
    pub indent: String,
    pub alias: Option<String>,
    pub master: bool,
    pub trailing: bool,
}

impl ParamType {
    pub fn new(indent: impl Into<String>) -> Self {
        Self {
            indent: indent.into(),
            alias: None,
            master: false,
            trailing: false,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// The implicit default type applied when a path parameter omits one.
    pub fn with_master(mut self) -> Self {
        self.master = true;
        self
    }

    /// Marks the type as consuming the path remainder; usable only as the
    /// final segment of a route.
    pub fn with_trailing(mut self) -> Self {
        self.trailing = true;
        self
    }
}

/// Runtime description of one parameter type: its identity, its type
/// evaluator, and the table of named parameter functions.
pub struct Macro {
    ty: ParamType,
    evaluator: Option<ParamEvaluator>,
    funcs: HashMap<String, ParamFuncDecl>,
    on_error: Option<ParamErrorHandler>,
}

impl Macro {
    pub fn new(ty: ParamType) -> Self {
        Self {
            ty,
            evaluator: None,
            funcs: HashMap::new(),
            on_error: None,
        }
    }

    pub fn with_evaluator(ty: ParamType, evaluator: ParamEvaluator) -> Self {
        let mut m = Self::new(ty);
        m.evaluator = Some(evaluator);
        m
    }

    pub fn param_type(&self) -> &ParamType {
        &self.ty
    }

    pub fn evaluator(&self) -> Option<&ParamEvaluator> {
        self.evaluator.as_ref()
    }

    /// Registers a parameter function. A name that already exists on this
    /// macro is silently replaced.
    pub fn register_func(
        &mut self,
        name: &str,
        signature: &[ArgKind],
        builder: ParamFuncBuilder,
    ) -> MacroResult<()> {
        if name.is_empty()
            || !name.as_bytes()[0].is_ascii_alphabetic()
            || !name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
        {
            return Err(MacroError::InvalidFuncName {
                name: name.to_string(),
            });
        }
        self.add_func(name, signature, builder);
        Ok(())
    }

    pub fn func(&self, name: &str) -> Option<&ParamFuncDecl> {
        self.funcs.get(name)
    }

    pub fn func_names(&self) -> impl Iterator<Item = &str> {
        self.funcs.keys().map(String::as_str)
    }

    /// Installs a hook that renders a rejection message when a value fails
    /// evaluation for this type. Its presence makes every parameter of this
    /// type evaluable.
    pub fn handle_error(&mut self, handler: ParamErrorHandler) {
        self.on_error = Some(handler);
    }

    pub fn on_error(&self) -> Option<&ParamErrorHandler> {
        self.on_error.as_ref()
    }

    fn add_func(&mut self, name: &str, signature: &[ArgKind], builder: ParamFuncBuilder) {
        self.funcs
            .insert(name.to_string(), ParamFuncDecl::new(name, signature, builder));
    }
}

impl fmt::Debug for Macro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Macro")
            .field("ty", &self.ty)
            .field("has_evaluator", &self.evaluator.is_some())
            .field("funcs", &self.funcs.len())
            .finish()
    }
}

/// The registry of parameter types. Mutated only while the application is
/// configuring routes; parsing and template compilation read it.
#[derive(Debug)]
pub struct MacroSet {
    macros: Vec<Macro>,
}

impl Default for MacroSet {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl MacroSet {
    /// A registry with no types at all. Useful for fully custom setups.
    pub fn empty() -> Self {
        Self { macros: Vec::new() }
    }

    /// The standard registry: `string` (master), the signed and unsigned
    /// integer family, `bool`, `alphabetical`, `file` and the trailing
    /// `path` type.
    pub fn with_defaults() -> Self {
        let mut set = Self::empty();

        let mut string = Macro::new(ParamType::new("string").with_master());
        string.add_func("regexp", &[ArgKind::Str], string_regexp());
        string.add_func("prefix", &[ArgKind::Str], string_prefix());
        string.add_func("suffix", &[ArgKind::Str], string_suffix());
        string.add_func("contains", &[ArgKind::Str], string_contains());
        string.add_func("min", &[ArgKind::Uint64], string_min_len());
        string.add_func("max", &[ArgKind::Uint64], string_max_len());
        string.add_func("in", &[ArgKind::StrSlice], string_in());
        set.macros.push(string);

        set.macros.push(signed_macro::<i64>("int", Some("number")));
        set.macros.push(signed_macro::<i8>("int8", None));
        set.macros.push(signed_macro::<i16>("int16", None));
        set.macros.push(signed_macro::<i32>("int32", None));
        set.macros.push(signed_macro::<i64>("int64", Some("long")));
        set.macros.push(unsigned_macro::<u8>("uint8", None));
        set.macros.push(unsigned_macro::<u16>("uint16", None));
        set.macros.push(unsigned_macro::<u32>("uint32", None));
        set.macros.push(unsigned_macro::<u64>("uint64", None));

        set.macros.push(Macro::with_evaluator(
            ParamType::new("bool").with_alias("boolean"),
            Arc::new(|raw: &str| func::parse_bool(raw).map(ParamValue::Bool)),
        ));

        set.macros.push(Macro::with_evaluator(
            ParamType::new("alphabetical"),
            Arc::new(|raw: &str| {
                (!raw.is_empty() && raw.bytes().all(|b| b.is_ascii_alphabetic()))
                    .then(|| ParamValue::Str(raw.to_string()))
            }),
        ));

        set.macros.push(Macro::with_evaluator(
            ParamType::new("file"),
            Arc::new(|raw: &str| {
                (!raw.is_empty()
                    && raw
                        .bytes()
                        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.')))
                .then(|| ParamValue::Str(raw.to_string()))
            }),
        ));

        set.macros
            .push(Macro::new(ParamType::new("path").with_trailing()));

        set
    }

    /// Registers a custom parameter type. The evaluator is required here;
    /// only built-in passthrough types go without one.
    pub fn register(
        &mut self,
        ty: ParamType,
        evaluator: Option<ParamEvaluator>,
    ) -> MacroResult<&mut Macro> {
        if ty.indent.is_empty() {
            return Err(MacroError::EmptyIndent);
        }
        let evaluator = evaluator.ok_or_else(|| MacroError::MissingEvaluator {
            indent: ty.indent.clone(),
        })?;
        self.validate(&ty)?;
        self.macros.push(Macro::with_evaluator(ty, evaluator));
        let last = self.macros.len() - 1;
        Ok(&mut self.macros[last])
    }

    /// Removes the macro with the given indent. Returns whether one existed.
    pub fn unregister(&mut self, indent: &str) -> bool {
        match self.macros.iter().position(|m| m.ty.indent == indent) {
            Some(pos) => {
                self.macros.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Resolves a type by indent or alias.
    pub fn lookup(&self, name: &str) -> Option<&Macro> {
        self.macros
            .iter()
            .find(|m| m.ty.indent == name || m.ty.alias.as_deref() == Some(name))
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut Macro> {
        self.macros
            .iter_mut()
            .find(|m| m.ty.indent == name || m.ty.alias.as_deref() == Some(name))
    }

    pub fn master(&self) -> Option<&Macro> {
        self.macros.iter().find(|m| m.ty.master)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Macro> {
        self.macros.iter()
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    fn validate(&self, ty: &ParamType) -> MacroResult<()> {
        for m in &self.macros {
            let existing = &m.ty;
            if existing.indent == ty.indent || existing.alias.as_deref() == Some(ty.indent.as_str())
            {
                return Err(MacroError::IndentTaken {
                    indent: ty.indent.clone(),
                });
            }
            if let Some(alias) = &ty.alias
                && (existing.indent == *alias || existing.alias.as_deref() == Some(alias.as_str()))
            {
                return Err(MacroError::AliasTaken {
                    alias: alias.clone(),
                });
            }
            if ty.master && existing.master {
                return Err(MacroError::MasterAlreadyRegistered {
                    existing: existing.indent.clone(),
                });
            }
        }
        Ok(())
    }
}

fn signed_macro<T>(indent: &str, alias: Option<&str>) -> Macro
where
    T: std::str::FromStr + Into<i64> + 'static,
{
    let mut ty = ParamType::new(indent);
    if let Some(alias) = alias {
        ty = ty.with_alias(alias);
    }
    let evaluator: ParamEvaluator =
        Arc::new(|raw: &str| raw.parse::<T>().ok().map(|v| ParamValue::Int(v.into())));
    let mut m = Macro::with_evaluator(ty, evaluator);
    m.add_func("min", &[ArgKind::Int64], int_min());
    m.add_func("max", &[ArgKind::Int64], int_max());
    m.add_func("range", &[ArgKind::Int64, ArgKind::Int64], int_range());
    m
}

fn unsigned_macro<T>(indent: &str, alias: Option<&str>) -> Macro
where
    T: std::str::FromStr + Into<u64> + 'static,
{
    let mut ty = ParamType::new(indent);
    if let Some(alias) = alias {
        ty = ty.with_alias(alias);
    }
    let evaluator: ParamEvaluator =
        Arc::new(|raw: &str| raw.parse::<T>().ok().map(|v| ParamValue::Uint(v.into())));
    let mut m = Macro::with_evaluator(ty, evaluator);
    m.add_func("min", &[ArgKind::Uint64], uint_min());
    m.add_func("max", &[ArgKind::Uint64], uint_max());
    m.add_func("range", &[ArgKind::Uint64, ArgKind::Uint64], uint_range());
    m
}

fn str_pred<F>(f: F) -> ParamPredicate
where
    F: Fn(&str) -> bool + Send + Sync + 'static,
{
    Arc::new(move |value: &ParamValue| match value {
        ParamValue::Str(s) => f(s),
        _ => false,
    })
}

fn int_arg(args: &[FuncArg], index: usize) -> MacroResult<i64> {
    args.get(index)
        .and_then(FuncArg::as_int)
        .ok_or(MacroError::BadArgument { index })
}

fn uint_arg(args: &[FuncArg], index: usize) -> MacroResult<u64> {
    args.get(index)
        .and_then(FuncArg::as_uint)
        .ok_or(MacroError::BadArgument { index })
}

fn str_arg(args: &[FuncArg], index: usize) -> MacroResult<String> {
    args.get(index)
        .and_then(FuncArg::as_str)
        .map(str::to_string)
        .ok_or(MacroError::BadArgument { index })
}

fn int_min() -> ParamFuncBuilder {
    Arc::new(|args: &[FuncArg]| {
        let min = int_arg(args, 0)?;
        let pred: ParamPredicate =
            Arc::new(move |v: &ParamValue| matches!(v, ParamValue::Int(n) if *n >= min));
        Ok(pred)
    })
}

fn int_max() -> ParamFuncBuilder {
    Arc::new(|args: &[FuncArg]| {
        let max = int_arg(args, 0)?;
        let pred: ParamPredicate =
            Arc::new(move |v: &ParamValue| matches!(v, ParamValue::Int(n) if *n <= max));
        Ok(pred)
    })
}

fn int_range() -> ParamFuncBuilder {
    Arc::new(|args: &[FuncArg]| {
        let min = int_arg(args, 0)?;
        let max = int_arg(args, 1)?;
        let pred: ParamPredicate =
            Arc::new(move |v: &ParamValue| matches!(v, ParamValue::Int(n) if *n >= min && *n <= max));
        Ok(pred)
    })
}

fn uint_min() -> ParamFuncBuilder {
    Arc::new(|args: &[FuncArg]| {
        let min = uint_arg(args, 0)?;
        let pred: ParamPredicate =
            Arc::new(move |v: &ParamValue| matches!(v, ParamValue::Uint(n) if *n >= min));
        Ok(pred)
    })
}

fn uint_max() -> ParamFuncBuilder {
    Arc::new(|args: &[FuncArg]| {
        let max = uint_arg(args, 0)?;
        let pred: ParamPredicate =
            Arc::new(move |v: &ParamValue| matches!(v, ParamValue::Uint(n) if *n <= max));
        Ok(pred)
    })
}

fn uint_range() -> ParamFuncBuilder {
    Arc::new(|args: &[FuncArg]| {
        let min = uint_arg(args, 0)?;
        let max = uint_arg(args, 1)?;
        let pred: ParamPredicate =
            Arc::new(move |v: &ParamValue| matches!(v, ParamValue::Uint(n) if *n >= min && *n <= max));
        Ok(pred)
    })
}

fn string_regexp() -> ParamFuncBuilder {
    Arc::new(|args: &[FuncArg]| {
        let pattern = str_arg(args, 0)?;
        let re = Regex::new(&format!("^(?:{pattern})$")).map_err(|err| {
            MacroError::InvalidRegexp {
                pattern: pattern.clone(),
                error: err.to_string(),
            }
        })?;
        Ok(str_pred(move |s| re.is_match(s)))
    })
}

fn string_prefix() -> ParamFuncBuilder {
    Arc::new(|args: &[FuncArg]| {
        let prefix = str_arg(args, 0)?;
        Ok(str_pred(move |s| s.starts_with(prefix.as_str())))
    })
}

fn string_suffix() -> ParamFuncBuilder {
    Arc::new(|args: &[FuncArg]| {
        let suffix = str_arg(args, 0)?;
        Ok(str_pred(move |s| s.ends_with(suffix.as_str())))
    })
}

fn string_contains() -> ParamFuncBuilder {
    Arc::new(|args: &[FuncArg]| {
        let needle = str_arg(args, 0)?;
        Ok(str_pred(move |s| s.contains(needle.as_str())))
    })
}

fn string_min_len() -> ParamFuncBuilder {
    Arc::new(|args: &[FuncArg]| {
        let min = uint_arg(args, 0)?;
        Ok(str_pred(move |s| s.len() as u64 >= min))
    })
}

fn string_max_len() -> ParamFuncBuilder {
    Arc::new(|args: &[FuncArg]| {
        let max = uint_arg(args, 0)?;
        Ok(str_pred(move |s| s.len() as u64 <= max))
    })
}

fn string_in() -> ParamFuncBuilder {
    Arc::new(|args: &[FuncArg]| {
        let allowed: Vec<String> = args
            .first()
            .and_then(FuncArg::as_slice)
            .ok_or(MacroError::BadArgument { index: 0 })?
            .to_vec();
        Ok(str_pred(move |s| allowed.iter().any(|item| item == s)))
    })
}
