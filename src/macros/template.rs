use std::fmt;

use serde::Serialize;

use super::error::{TemplateError, TemplateResult};
use super::{MacroSet, ParamErrorHandler, ParamEvaluator, ParamPredicate, ParamType, ParamValue};
use crate::interpreter::{self, DEFAULT_PARAM_ERROR_CODE, ParamStatement};
use crate::types::ErrorCode;

/// The compiled form of one route path: its source text and the bound
/// parameters in path order. Built once at registration time, immutable
/// afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Template {
    pub src: String,
    pub params: Vec<TemplateParam>,
}

impl Template {
    pub fn is_static(&self) -> bool {
        self.params.is_empty()
    }
}

/// One fully-bound path parameter, ready for per-request evaluation.
#[derive(Clone, Serialize)]
pub struct TemplateParam {
    pub src: String,
    pub ty: ParamType,
    pub name: String,
    pub index: usize,
    pub error_code: ErrorCode,
    #[serde(skip)]
    evaluator: Option<ParamEvaluator>,
    #[serde(skip)]
    funcs: Vec<ParamPredicate>,
    #[serde(skip)]
    on_error: Option<ParamErrorHandler>,
    pub can_eval: bool,
}

impl TemplateParam {
    /// Validates and decodes one captured path-segment value. `None` means
    /// the value failed the type evaluator or a bound function.
    pub fn eval(&self, raw: &str) -> Option<ParamValue> {
        let value = match &self.evaluator {
            Some(evaluator) => evaluator(raw)?,
            None => ParamValue::Str(raw.to_string()),
        };
        self.funcs.iter().all(|func| func(&value)).then_some(value)
    }

    pub fn bound_func_count(&self) -> usize {
        self.funcs.len()
    }

    pub fn on_error(&self) -> Option<&ParamErrorHandler> {
        self.on_error.as_ref()
    }
}

impl fmt::Debug for TemplateParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateParam")
            .field("src", &self.src)
            .field("name", &self.name)
            .field("ty", &self.ty.indent)
            .field("index", &self.index)
            .field("error_code", &self.error_code)
            .field("funcs", &self.funcs.len())
            .field("can_eval", &self.can_eval)
            .finish()
    }
}

/// Compiles one route path against the registry: parse every `{...}`
/// segment, then bind each statement's type evaluator and functions.
#[tracing::instrument(level = "trace", skip(macros))]
pub fn parse(src: &str, macros: &MacroSet) -> TemplateResult<Template> {
    let statements = interpreter::parse_path(src, macros)?;
    let mut params = Vec::with_capacity(statements.len());
    for (index, stmt) in statements.into_iter().enumerate() {
        params.push(bind_param(stmt, index, macros)?);
    }
    Ok(Template {
        src: src.to_string(),
        params,
    })
}

fn bind_param(
    stmt: ParamStatement,
    index: usize,
    macros: &MacroSet,
) -> TemplateResult<TemplateParam> {
    let macro_ = macros
        .lookup(&stmt.ty.indent)
        .ok_or_else(|| TemplateError::UnknownType {
            src: stmt.src.clone(),
            indent: stmt.ty.indent.clone(),
        })?;
    let master = macros.master();

    let mut funcs = Vec::with_capacity(stmt.funcs.len());
    for call in &stmt.funcs {
        // own macro first, master as the shared fallback
        let decl = macro_
            .func(&call.name)
            .or_else(|| master.and_then(|m| m.func(&call.name)));
        let Some(decl) = decl else {
            // an unresolved function name is dropped, not an error
            tracing::event!(
                tracing::Level::DEBUG,
                param = %stmt.name,
                func = %call.name,
                "unresolved parameter function dropped"
            );
            continue;
        };
        let bound = decl.bind(&call.args).map_err(|source| TemplateError::Bind {
            src: stmt.src.clone(),
            func: call.name.clone(),
            source,
        })?;
        funcs.push(bound);
    }

    let evaluator = macro_.evaluator().cloned();
    let on_error = macro_.on_error().cloned();
    let can_eval = evaluator.is_some()
        || !funcs.is_empty()
        || stmt.error_code != DEFAULT_PARAM_ERROR_CODE
        || on_error.is_some();

    Ok(TemplateParam {
        src: stmt.src,
        ty: stmt.ty,
        name: stmt.name,
        index,
        error_code: stmt.error_code,
        evaluator,
        funcs,
        on_error,
        can_eval,
    })
}
