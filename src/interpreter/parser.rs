use hashbrown::HashSet;

use super::ast::{DEFAULT_PARAM_ERROR_CODE, FuncCall, ParamStatement};
use super::error::{Issue, ParseError, ParseResult};
use super::lexer::Lexer;
use super::token::TokenKind;
use crate::macros::{MacroSet, ParamType};

/// Parses one `{...}` parameter expression against the registered types.
pub fn parse_segment(src: &str, macros: &MacroSet) -> ParseResult<ParamStatement> {
    SegmentParser::new(src).parse(macros)
}

/// Runs the segment parser over every `{...}` occurrence of a full route
/// path, stopping at the first segment that fails.
#[tracing::instrument(level = "trace", skip(macros))]
pub fn parse_path(path: &str, macros: &MacroSet) -> ParseResult<Vec<ParamStatement>> {
    let segments: Vec<&str> = path.split('/').collect();
    let last_non_empty = segments.iter().rposition(|s| !s.is_empty());

    let mut statements = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for (i, segment) in segments.iter().enumerate() {
        if !segment.contains('{') && !segment.contains('}') {
            continue;
        }
        if !covers_whole_segment(segment) {
            return Err(ParseError::MixedSegment {
                segment: segment.to_string(),
            });
        }

        let stmt = parse_segment(segment, macros)?;

        // A trailing type swallows the rest of the path, so nothing may
        // follow it. The rule is positional and lives here, not in the
        // segment parser.
        if stmt.ty.trailing && Some(i) != last_non_empty {
            return Err(ParseError::TrailingNotLast {
                src: segment.to_string(),
                indent: stmt.ty.indent.clone(),
            });
        }

        if !seen.insert(stmt.name.clone()) {
            return Err(ParseError::DuplicateParamName {
                name: stmt.name.clone(),
                path: path.to_string(),
            });
        }

        statements.push(stmt);
    }

    Ok(statements)
}

/// A parameter segment must be exactly one brace expression. Braces inside
/// parentheses are raw function-argument text (regex quantifiers) and do not
/// count as structure.
fn covers_whole_segment(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    if bytes.len() < 2 || bytes[0] != b'{' || bytes[bytes.len() - 1] != b'}' {
        return false;
    }
    let mut parens = 0i32;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'(' => parens += 1,
            b')' => parens = (parens - 1).max(0),
            b'{' if parens == 0 && i != 0 => return false,
            b'}' if parens == 0 && i != bytes.len() - 1 => return false,
            _ => {}
        }
    }
    true
}

struct SegmentParser<'a> {
    lexer: Lexer<'a>,
    issues: Vec<Issue>,
}

impl<'a> SegmentParser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            lexer: Lexer::new(src),
            issues: Vec::new(),
        }
    }

    fn report(&mut self, start: usize, end: usize, message: impl Into<String>) {
        self.issues.push(Issue::new(start, end, message));
    }

    fn parse(mut self, macros: &MacroSet) -> ParseResult<ParamStatement> {
        let src = self.lexer.source().to_string();

        let ty = match macros.master() {
            Some(master) => master.param_type().clone(),
            None => {
                self.report(0, 0, "no default parameter type is registered");
                ParamType::new("")
            }
        };

        let mut stmt = ParamStatement {
            src: src.clone(),
            name: String::new(),
            ty,
            funcs: Vec::new(),
            error_code: DEFAULT_PARAM_ERROR_CODE,
        };
        let mut pending = FuncCall::default();

        loop {
            let tok = self.lexer.next_token();
            match tok.kind {
                TokenKind::Eof => {
                    if stmt.name.is_empty() {
                        self.report(tok.start, tok.end, "parameter name is missing");
                    }
                    break;
                }
                TokenKind::LBrace => {
                    let name_tok = self.lexer.next_token();
                    if name_tok.kind == TokenKind::Ident {
                        stmt.name = name_tok.literal;
                    } else {
                        self.report(
                            name_tok.start,
                            name_tok.end,
                            format!("expected a parameter name, found '{}'", name_tok.literal),
                        );
                    }
                }
                TokenKind::Colon => {
                    let ty_tok = self.lexer.next_token();
                    match macros.lookup(&ty_tok.literal) {
                        Some(m) if ty_tok.kind == TokenKind::Ident => {
                            stmt.ty = m.param_type().clone();
                        }
                        _ => self.report(
                            ty_tok.start,
                            ty_tok.end,
                            format!("unexpected parameter type: {}", ty_tok.literal),
                        ),
                    }
                }
                TokenKind::Ident => {
                    pending = FuncCall {
                        name: tok.literal,
                        args: Vec::new(),
                    };
                }
                TokenKind::LParen => {
                    if pending.name.is_empty() {
                        self.report(tok.start, tok.end, "function arguments without a function name");
                    }
                    if self.lexer.peek_kind() == TokenKind::RParen {
                        // zero-argument call; the ')' finalizes it below
                        continue;
                    }
                    let raw = self.lexer.raw_scan_args();
                    pending.args = split_args(&raw.literal);
                }
                TokenKind::RParen => {
                    if pending.name.is_empty() {
                        self.report(tok.start, tok.end, "unexpected ')'");
                    } else {
                        stmt.funcs.push(std::mem::take(&mut pending));
                    }
                }
                TokenKind::Else => {
                    let code_tok = self.lexer.next_token();
                    if code_tok.kind != TokenKind::Int {
                        self.report(
                            code_tok.start,
                            code_tok.end,
                            format!("expected a status code number, found '{}'", code_tok.literal),
                        );
                        continue;
                    }
                    match code_tok.literal.parse() {
                        Ok(code) => stmt.error_code = code,
                        Err(_) => self.report(
                            code_tok.start,
                            code_tok.end,
                            format!("status code '{}' is out of range", code_tok.literal),
                        ),
                    }
                }
                TokenKind::RBrace => {}
                TokenKind::Illegal => {
                    self.report(tok.start, tok.end, format!("illegal token: '{}'", tok.literal));
                }
                _ => {
                    self.report(
                        tok.start,
                        tok.end,
                        format!("unexpected token '{}'", tok.literal),
                    );
                }
            }
        }

        if self.issues.is_empty() {
            Ok(stmt)
        } else {
            Err(ParseError::Segment {
                src,
                issues: self.issues,
            })
        }
    }
}

/// Splits a raw argument blob on top-level commas. Commas nested inside
/// brackets, parentheses or braces belong to their argument, which is how
/// `regexp([a-z]{1,3})` keeps its quantifier and `[a,b,c]` stays one slice
/// literal.
fn split_args(raw: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;

    for (i, &b) in raw.as_bytes().iter().enumerate() {
        match b {
            b'[' | b'(' | b'{' => depth += 1,
            b']' | b')' | b'}' => depth -= 1,
            b',' if depth == 0 => {
                args.push(raw[start..i].trim().to_string());
                start = i + 1;
            }
            _ => {}
        }
    }

    let tail = raw[start..].trim();
    if !args.is_empty() || !tail.is_empty() {
        args.push(tail.to_string());
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_top_level_commas_only() {
        assert_eq!(split_args("1,5"), vec!["1", "5"]);
        assert_eq!(split_args("[a,b,c]"), vec!["[a,b,c]"]);
        assert_eq!(split_args("[a-z]{1,3}"), vec!["[a-z]{1,3}"]);
        assert_eq!(split_args(" 'x' , y "), vec!["'x'", "y"]);
    }
}
