//! Tokenizer and parser for conditional page templates.
//!
//! Markers are `{{#if COND}}`, `{{else}}`, `{{/if}}` and `{{dotted.path}}`.
//! Whitespace inside the braces is ignored. Anything else between `{{` and
//! `}}` is kept as literal text.

use std::fmt;

use serde::Serialize;

/// Blocks nested deeper than this are flattened with a diagnostic.
pub const MAX_NESTING: usize = 128;

/// A parsed template fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Literal text copied to the output.
    Text(String),
    /// A `{{path}}` substitution.
    Var(String),
    /// A conditional block.
    Block {
        /// Condition text, e.g. `active.isAdmin`.
        condition: String,
        /// Content kept when the condition holds.
        then: Vec<Node>,
        /// Content kept otherwise, if an `{{else}}` was present.
        otherwise: Option<Vec<Node>>,
    },
}

/// What went wrong with a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// `{{#if}}` without a matching `{{/if}}`.
    UnclosedBlock,
    /// `{{else}}` outside any block.
    StrayElse,
    /// Second `{{else}}` in the same block.
    DuplicateElse,
    /// `{{/if}}` without an open block.
    StrayEndIf,
    /// Block nested deeper than [`MAX_NESTING`].
    NestingTooDeep,
}

/// A problem found while parsing, pointing at the byte offset of the marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Kind of problem.
    pub kind: DiagnosticKind,
    /// Byte offset of the offending marker in the source.
    pub offset: usize,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            DiagnosticKind::UnclosedBlock => "unclosed {{#if}} block, marker dropped",
            DiagnosticKind::StrayElse => "{{else}} outside a block, marker dropped",
            DiagnosticKind::DuplicateElse => "second {{else}} in a block, marker dropped",
            DiagnosticKind::StrayEndIf => "{{/if}} without a block, marker dropped",
            DiagnosticKind::NestingTooDeep => "block nested too deep, markers dropped",
        };
        write!(f, "{what} at byte {}", self.offset)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Text(&'a str),
    If(&'a str),
    Else,
    EndIf,
    Var(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    Eof,
    Else,
    EndIf,
}

/// Splits `source` into text and marker tokens with their byte offsets.
fn tokenize(source: &str) -> Vec<(usize, Token<'_>)> {
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut cursor = 0;

    while let Some(found) = source[cursor..].find("{{") {
        let open = cursor + found;
        let inner_start = open + 2;

        let Some(close_rel) = source[inner_start..].find("}}") else {
            break;
        };
        let close = inner_start + close_rel;

        // A later `{{` before the closing braces means this opening is literal.
        if let Some(reopen) = source[inner_start..close].find("{{") {
            cursor = inner_start + reopen;
            continue;
        }

        let Some(token) = classify(&source[inner_start..close]) else {
            cursor = open + 1;
            continue;
        };

        if text_start < open {
            tokens.push((text_start, Token::Text(&source[text_start..open])));
        }
        tokens.push((open, token));
        cursor = close + 2;
        text_start = cursor;
    }

    if text_start < source.len() {
        tokens.push((text_start, Token::Text(&source[text_start..])));
    }
    tokens
}

fn classify(inner: &str) -> Option<Token<'_>> {
    let trimmed = inner.trim();
    if let Some(rest) = trimmed.strip_prefix("#if") {
        if rest.is_empty() || rest.starts_with(char::is_whitespace) {
            return Some(Token::If(rest.trim()));
        }
        return None;
    }
    match trimmed {
        "else" => Some(Token::Else),
        "/if" => Some(Token::EndIf),
        path if is_path(path) => Some(Token::Var(path)),
        _ => None,
    }
}

fn is_path(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('.')
        && !s.ends_with('.')
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-')
}

struct Parser<'a> {
    tokens: Vec<(usize, Token<'a>)>,
    pos: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    fn next(&mut self) -> Option<(usize, Token<'a>)> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn report(&mut self, kind: DiagnosticKind, offset: usize) {
        self.diagnostics.push(Diagnostic { kind, offset });
    }

    /// Parses content until the end of input or a marker that closes the
    /// enclosing block.
    fn content(&mut self, depth: usize) -> (Vec<Node>, Stop) {
        let mut nodes = Vec::new();
        let mut suppressed = 0usize;

        while let Some((offset, token)) = self.next() {
            match token {
                Token::Text(text) => push_text(&mut nodes, text),
                Token::Var(path) => nodes.push(Node::Var(path.to_string())),
                Token::If(_) if depth >= MAX_NESTING => {
                    self.report(DiagnosticKind::NestingTooDeep, offset);
                    suppressed += 1;
                }
                Token::If(condition) => self.block(condition, offset, depth + 1, &mut nodes),
                Token::Else if suppressed > 0 => {}
                Token::EndIf if suppressed > 0 => suppressed -= 1,
                Token::Else if depth == 0 => self.report(DiagnosticKind::StrayElse, offset),
                Token::EndIf if depth == 0 => self.report(DiagnosticKind::StrayEndIf, offset),
                Token::Else => return (nodes, Stop::Else),
                Token::EndIf => return (nodes, Stop::EndIf),
            }
        }
        (nodes, Stop::Eof)
    }

    fn block(&mut self, condition: &str, offset: usize, depth: usize, out: &mut Vec<Node>) {
        let (then, stop) = self.content(depth);
        match stop {
            Stop::EndIf => out.push(Node::Block {
                condition: condition.to_string(),
                then,
                otherwise: None,
            }),
            Stop::Else => {
                let mut otherwise = Vec::new();
                loop {
                    let (nodes, stop) = self.content(depth);
                    splice(&mut otherwise, nodes);
                    match stop {
                        Stop::EndIf => {
                            out.push(Node::Block {
                                condition: condition.to_string(),
                                then,
                                otherwise: Some(otherwise),
                            });
                            return;
                        }
                        Stop::Else => {
                            let at = self.tokens.get(self.pos - 1).map_or(0, |(o, _)| *o);
                            self.report(DiagnosticKind::DuplicateElse, at);
                        }
                        Stop::Eof => {
                            self.report(DiagnosticKind::UnclosedBlock, offset);
                            splice(out, then);
                            splice(out, otherwise);
                            return;
                        }
                    }
                }
            }
            Stop::Eof => {
                self.report(DiagnosticKind::UnclosedBlock, offset);
                splice(out, then);
            }
        }
    }
}

fn push_text(nodes: &mut Vec<Node>, text: &str) {
    if let Some(Node::Text(last)) = nodes.last_mut() {
        last.push_str(text);
    } else {
        nodes.push(Node::Text(text.to_string()));
    }
}

fn splice(out: &mut Vec<Node>, nodes: Vec<Node>) {
    for node in nodes {
        match node {
            Node::Text(text) => push_text(out, &text),
            other => out.push(other),
        }
    }
}

/// Parses a template into nodes, collecting diagnostics for malformed markers.
///
/// Never fails: unclosed blocks keep their content without the marker, stray
/// `{{else}}` and `{{/if}}` markers are dropped.
#[must_use]
pub fn parse(source: &str) -> (Vec<Node>, Vec<Diagnostic>) {
    let mut parser = Parser {
        tokens: tokenize(source),
        pos: 0,
        diagnostics: Vec::new(),
    };
    let (nodes, _) = parser.content(0);
    parser.diagnostics.sort_by_key(|d| d.offset);
    (nodes, parser.diagnostics)
}
