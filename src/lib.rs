pub mod errors;
pub mod interpreter;
pub mod macros;
pub mod params;
pub mod path;
pub mod trie;
mod types;

use std::fmt;

pub use errors::{RouterError, RouterResult};
pub use macros::{
    ArgKind, FuncArg, Macro, MacroError, MacroSet, ParamType, ParamValue, Template, TemplateError,
    TemplateParam,
};
pub use params::RouteParams;
pub use trie::{PathTrie, TrieError};
pub use types::ErrorCode;

/// The crate front door: compiles route templates at registration time and
/// resolves request paths against them.
///
/// Registration (`add`) takes `&mut self`, lookups (`find`) take `&self`;
/// finish configuring before serving and the borrow checker holds you to it.
/// Lookups are read-only and lock-free.
pub struct Router<H> {
    macros: MacroSet,
    trie: PathTrie<RouteEntry<H>>,
}

struct RouteEntry<H> {
    template: Template,
    handler: H,
}

/// A resolved route: the registered handler and the typed parameter values
/// in path order.
pub struct Matched<'r, H> {
    pub handler: &'r H,
    pub params: Vec<(String, ParamValue)>,
}

/// Outcome of a lookup. `Rejected` means the trie matched but a captured
/// value failed its parameter's evaluation; the serving layer decides what
/// to do with the error code and optional handler message.
pub enum FindResult<'r, H> {
    Found(Matched<'r, H>),
    Rejected {
        name: String,
        error_code: ErrorCode,
        message: Option<String>,
    },
    NotFound,
}

impl<H> Router<H> {
    /// A router over the default macro set.
    pub fn new() -> Self {
        Self::with_macros(MacroSet::default())
    }

    pub fn with_macros(macros: MacroSet) -> Self {
        Self {
            macros,
            trie: PathTrie::new(),
        }
    }

    pub fn macros(&self) -> &MacroSet {
        &self.macros
    }

    /// Mutable registry access for registering types, functions and error
    /// handlers. Do this before the routes that use them.
    pub fn macros_mut(&mut self) -> &mut MacroSet {
        &mut self.macros
    }

    pub fn route_count(&self) -> usize {
        self.trie.route_count()
    }

    /// Compiles one route template and registers it with its handler.
    pub fn add(&mut self, path: &str, handler: H) -> RouterResult<()> {
        let template = macros::parse(path, &self.macros)?;
        let node_path = node_path_for(path, &template);
        self.trie.add(&node_path, RouteEntry { template, handler })?;
        Ok(())
    }

    /// Resolves a request path: trie lookup, then per-parameter evaluation
    /// against the route's compiled template.
    pub fn find(&self, path: &str) -> FindResult<'_, H> {
        let normalized = match path::normalize_path(path) {
            Ok(p) => p,
            Err(_) => return FindResult::NotFound,
        };

        let mut raw = RouteParams::new();
        let Some(entry) = self.trie.find(&normalized, &mut raw) else {
            return FindResult::NotFound;
        };

        let mut params = Vec::with_capacity(raw.len());
        for param in &entry.template.params {
            let Some(value) = raw.get(&param.name) else {
                continue;
            };
            if !param.can_eval {
                params.push((param.name.clone(), ParamValue::Str(value.to_string())));
                continue;
            }
            match param.eval(value) {
                Some(typed) => params.push((param.name.clone(), typed)),
                None => {
                    let message = param.on_error().map(|handler| handler(value));
                    return FindResult::Rejected {
                        name: param.name.clone(),
                        error_code: param.error_code,
                        message,
                    };
                }
            }
        }

        FindResult::Found(Matched {
            handler: &entry.handler,
            params,
        })
    }
}

impl<H> Default for Router<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> fmt::Debug for Router<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.trie.route_count())
            .field("macros", &self.macros.len())
            .finish()
    }
}

/// Rewrites a route template into the trie's `:name`/`*name` shape. Each
/// brace segment maps to the next template parameter in order; a trailing
/// type becomes the wildcard form.
fn node_path_for(path: &str, template: &Template) -> String {
    let mut out = String::with_capacity(path.len());
    let mut params = template.params.iter();

    for (i, segment) in path.split('/').enumerate() {
        if i > 0 {
            out.push('/');
        }
        if segment.starts_with('{') {
            if let Some(param) = params.next() {
                out.push(if param.ty.trailing { '*' } else { ':' });
                out.push_str(&param.name);
            }
        } else {
            out.push_str(segment);
        }
    }

    out
}
