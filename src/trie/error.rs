use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrieError {
    #[error("route path '{path}' must start with '/'")]
    InvalidPath { path: String },
    #[error("wildcard parameter must be the final segment of '{path}'")]
    WildcardNotTerminal { path: String },
    #[error("dynamic segment in '{path}' is missing a name")]
    EmptyParamName { path: String },
    #[error("a route is already registered at '{path}'")]
    DuplicateRoute { path: String },
}

pub type TrieResult<T> = Result<T, TrieError>;
