//! Comment stripping and tokenization of schema text.
//!
//! The lexer never fails: anything it does not recognise becomes
//! [`Token::Other`] and is left for the parser to skip. Every token carries its
//! byte span in the comment-stripped text so the parser can slice raw table
//! bodies back out of the source.

use std::iter::Peekable;
use std::ops::Range;
use std::str::CharIndices;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),

    LBrace, // {
    RBrace, // }
    Colon,  // :
    Dot,    // .
    /// A run of `<`, `>` and `-`, e.g. `>`, `<>`, `-`.
    RelOp(String),
    /// Any other non-whitespace character.
    Other(char),

    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub span: Range<usize>,
}

/// Remove `//` line comments and `/* ... */` block comments.
///
/// Line comments stop before the newline so line structure is preserved.
/// A `/*` with no closing `*/` is not a comment and is kept verbatim.
pub fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(idx) = rest.find('/') {
        out.push_str(&rest[..idx]);
        let tail = &rest[idx..];

        if tail.starts_with("//") {
            rest = match tail.find('\n') {
                Some(nl) => &tail[nl..],
                None => "",
            };
        } else if tail.starts_with("/*") {
            match tail[2..].find("*/") {
                Some(end) => rest = &tail[2 + end + 2..],
                None => {
                    out.push_str(tail);
                    rest = "";
                }
            }
        } else {
            out.push('/');
            rest = &tail[1..];
        }
    }

    out.push_str(rest);
    out
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_rel_char(c: char) -> bool {
    matches!(c, '<' | '>' | '-')
}

pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    /// `input` is expected to be comment-free already; see [`strip_comments`].
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_whitespace() {
                self.chars.next();
            } else {
                break;
            }
        }
    }

    /// Consume while `pred` holds and return the end offset.
    fn eat_while(&mut self, start: usize, pred: impl Fn(char) -> bool) -> usize {
        let mut end = start;
        while let Some(&(i, c)) = self.chars.peek() {
            if pred(c) {
                end = i + c.len_utf8();
                self.chars.next();
            } else {
                break;
            }
        }
        end
    }

    pub fn next_token(&mut self) -> Spanned {
        self.skip_whitespace();

        let Some((start, c)) = self.chars.next() else {
            let end = self.input.len();
            return Spanned {
                token: Token::Eof,
                span: end..end,
            };
        };

        let mut end = start + c.len_utf8();
        let token = match c {
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            ':' => Token::Colon,
            '.' => Token::Dot,
            c if is_rel_char(c) => {
                end = self.eat_while(end, is_rel_char);
                Token::RelOp(self.input[start..end].to_string())
            }
            c if is_ident_char(c) => {
                end = self.eat_while(end, is_ident_char);
                Token::Ident(self.input[start..end].to_string())
            }
            c => Token::Other(c),
        };

        Spanned {
            token,
            span: start..end,
        }
    }

    /// Tokenize the whole input. The result always ends with [`Token::Eof`].
    pub fn tokenize(mut self) -> Vec<Spanned> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token();
            let done = tok.token == Token::Eof;
            tokens.push(tok);
            if done {
                break;
            }
        }
        tokens
    }
}
