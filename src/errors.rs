use thiserror::Error;

use crate::interpreter::ParseError;
use crate::macros::{MacroError, TemplateError};
use crate::path::PathError;
use crate::trie::TrieError;

#[derive(Debug, Error)]
pub enum RouterError {
    #[error(transparent)]
    Path(#[from] PathError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Macro(#[from] MacroError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Trie(#[from] TrieError),
}

pub type RouterResult<T> = Result<T, RouterError>;
