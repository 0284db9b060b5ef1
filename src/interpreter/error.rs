use std::fmt;

use thiserror::Error;

/// One accumulated problem inside a single parameter expression, positioned
/// by byte offsets into the expression source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub start: usize,
    pub end: usize,
    pub message: String,
}

impl Issue {
    pub fn new(start: usize, end: usize, message: impl Into<String>) -> Self {
        Self {
            start,
            end,
            message: message.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}] {}", self.start, self.end, self.message)
    }
}

fn join_issues(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{}", join_issues(.issues))]
    Segment { src: String, issues: Vec<Issue> },
    #[error("segment '{segment}' mixes a path parameter with literal text")]
    MixedSegment { segment: String },
    #[error(
        "{src}: parameter type '{indent}' consumes the path remainder and must be the last segment"
    )]
    TrailingNotLast { src: String, indent: String },
    #[error("duplicate parameter name '{name}' in path '{path}'")]
    DuplicateParamName { name: String, path: String },
}

pub type ParseResult<T> = Result<T, ParseError>;
