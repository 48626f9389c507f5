use memchr::{memchr, memchr2, memchr3};

use crate::span::Span;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TokenKind {
    Text,
    /// `[name]`, `[name param]`, `[name=param]` or `[/name]`.
    Tag,
    /// `[name="quoted param"]`.
    ParamTag,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub span: Span,
}

impl Token<'_> {
    pub fn is_tag(&self) -> bool {
        !matches!(self.kind, TokenKind::Text)
    }
}

/// A tag token split into its parts.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TagToken<'a> {
    /// Lower-cased, without the leading `/` of a closing tag.
    pub name: String,
    pub params: &'a str,
    pub closing: bool,
}

/// Splits markup into tokens. The tokens cover `source` exactly, in order, and every
/// bracket sequence that is not a well-formed tag stays inside a text token.
pub fn tokenize(source: &str) -> Tokenizer<'_> {
    Tokenizer {
        source,
        pos: 0,
        pending: None,
        line_stop: None,
    }
}

pub struct Tokenizer<'a> {
    source: &'a str,
    pos: usize,
    pending: Option<Token<'a>>,
    // First `]` or newline after the last `[` checked by `find_brace`.
    line_stop: Option<(usize, bool)>,
}

enum Scan {
    Tag(usize, TokenKind),
    Skip(usize),
    Rest,
}

impl<'a> Tokenizer<'a> {
    fn token(&self, kind: TokenKind, start: usize, end: usize) -> Token<'a> {
        Token {
            kind,
            text: self.source.get(start..end).unwrap_or(""),
            span: Span { start, end },
        }
    }

    /// Leftmost `[` that has a `]` after it on the same line.
    fn find_brace(&mut self, from: usize) -> Option<usize> {
        let bytes = self.source.as_bytes();
        let mut cursor = from;
        loop {
            let open = cursor + memchr(b'[', bytes.get(cursor..)?)?;
            let stop = match self.line_stop {
                Some((stop, is_close)) if stop > open => Some((stop, is_close)),
                _ => memchr2(b']', b'\n', &bytes[open + 1..])
                    .map(|off| (open + 1 + off, bytes[open + 1 + off] == b']')),
            };
            self.line_stop = stop;
            match stop {
                Some((_, true)) => return Some(open),
                Some((newline, false)) => cursor = newline + 1,
                None => return None,
            }
        }
    }

    fn scan_tag(&self, brace: usize) -> Scan {
        let bytes = self.source.as_bytes();
        let Some(off) = memchr3(b']', b'=', b'[', &bytes[brace + 1..]) else {
            return Scan::Rest;
        };
        let end = brace + 1 + off;
        match bytes[end] {
            b'[' => Scan::Skip(end),
            b']' => Scan::Tag(end + 1, TokenKind::Tag),
            _ => {
                let mut value = end + 1;
                while bytes.get(value) == Some(&b' ') {
                    value += 1;
                }
                match bytes.get(value) {
                    None => Scan::Rest,
                    Some(b'"') => {
                        let Some(quote) = memchr(b'"', &bytes[value + 1..]) else {
                            return Scan::Rest;
                        };
                        let after_quote = value + 1 + quote + 1;
                        match memchr(b']', &bytes[after_quote..]) {
                            Some(close) => Scan::Tag(after_quote + close + 1, TokenKind::ParamTag),
                            None => Scan::Rest,
                        }
                    }
                    Some(_) => match memchr(b']', &bytes[value..]) {
                        Some(close) => Scan::Tag(value + close + 1, TokenKind::Tag),
                        None => Scan::Rest,
                    },
                }
            }
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if let Some(token) = self.pending.take() {
            return Some(token);
        }
        let len = self.source.len();
        if self.pos >= len {
            return None;
        }
        let start = self.pos;
        let mut cursor = start;
        loop {
            let Some(brace) = self.find_brace(cursor) else {
                self.pos = len;
                return Some(self.token(TokenKind::Text, start, len));
            };
            match self.scan_tag(brace) {
                Scan::Tag(end, kind) => {
                    let tag = self.token(kind, brace, end);
                    self.pos = end;
                    if brace > start {
                        self.pending = Some(tag);
                        return Some(self.token(TokenKind::Text, start, brace));
                    }
                    return Some(tag);
                }
                Scan::Skip(next) => cursor = next,
                Scan::Rest => {
                    self.pos = len;
                    return Some(self.token(TokenKind::Text, start, len));
                }
            }
        }
    }
}

/// Splits a tag token (`[name=param]`) into name, parameter and closing flag.
pub fn parse_tag(raw: &str) -> TagToken<'_> {
    let raw = raw.trim_start();
    let inner = raw
        .strip_prefix('[')
        .map(|rest| rest.strip_suffix(']').unwrap_or(rest))
        .unwrap_or(raw);

    let split = inner
        .char_indices()
        .find(|&(_, ch)| ch.is_whitespace() || ch == '=');
    let (name, params) = match split {
        Some((split, ch)) => {
            let params = &inner[split + ch.len_utf8()..];
            let params = params.strip_prefix('"').unwrap_or(params);
            let params = params.strip_suffix('"').unwrap_or(params);
            (&inner[..split], params)
        }
        None => (inner, ""),
    };

    let name = name.trim();
    let (name, closing) = match name.strip_prefix('/') {
        Some(rest) => (rest.trim(), true),
        None => (name, false),
    };
    TagToken {
        name: name.to_lowercase(),
        params: params.trim(),
        closing,
    }
}
