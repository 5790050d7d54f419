// Copyright (c) 2016-2021 Fabian Schuiki

//! A lexical analyzer for Verilog and SystemVerilog files, based on IEEE
//! 1800-2009, section 5. Operates on the output of the categorizing lexer.

use crate::cat::{Cat, CatToken, CatTokenKind};
pub use crate::token::*;
use hdldeps_common::errors::*;
use hdldeps_common::source::*;

/// Break the text of a single source file into tokens. Newlines are kept
/// since the preprocessor needs them to find the end of directives.
pub fn tokenize(source: Source, text: &str) -> DiagResult2<Vec<TokenAndSpan>> {
    let lexer = Lexer {
        source,
        text,
        cats: Cat::new(text).collect(),
        pos: 0,
    };
    lexer.run()
}

struct Lexer<'a> {
    source: Source,
    text: &'a str,
    cats: Vec<CatToken>,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn peek(&self, offset: usize) -> Option<CatTokenKind> {
        self.cats.get(self.pos + offset).map(|t| t.0)
    }

    fn extract(&self, index: usize) -> &'a str {
        let CatToken(_, begin, end) = self.cats[index];
        &self.text[begin..end]
    }

    /// The byte offset at which the token `index` begins.
    fn offset(&self, index: usize) -> usize {
        self.cats.get(index).map(|t| t.1).unwrap_or(self.text.len())
    }

    fn span(&self, first: usize, last: usize) -> Span {
        Span::new(self.source, self.offset(first), self.cats[last].2)
    }

    fn run(mut self) -> DiagResult2<Vec<TokenAndSpan>> {
        let mut tokens = Vec::new();
        while let Some(kind) = self.peek(0) {
            let first = self.pos;
            let token = match kind {
                CatTokenKind::Whitespace | CatTokenKind::Comment => {
                    self.pos += 1;
                    continue;
                }
                CatTokenKind::OpenComment => {
                    return Err(DiagBuilder2::error("unterminated block comment")
                        .span(self.span(first, first)));
                }
                CatTokenKind::Newline => {
                    self.pos += 1;
                    Token::Newline
                }
                CatTokenKind::Symbol('(')
                    if self.peek(1) == Some(CatTokenKind::Symbol('*'))
                        && self.peek(2) != Some(CatTokenKind::Symbol(')')) =>
                {
                    self.skip_attribute();
                    continue;
                }
                CatTokenKind::Symbol('"') => self.string()?,
                CatTokenKind::Symbol('\\') => self.escaped(),
                CatTokenKind::Symbol('`') if self.peek(1) == Some(CatTokenKind::Text) => {
                    self.pos += 2;
                    Token::Directive(self.extract(first + 1).to_string())
                }
                CatTokenKind::Symbol('\'') if self.peek(1) == Some(CatTokenKind::Text) => {
                    self.pos += 2;
                    Token::Literal
                }
                CatTokenKind::Symbol(c) => {
                    self.pos += 1;
                    Token::Symbol(c)
                }
                CatTokenKind::Text => {
                    self.pos += 1;
                    let text = self.extract(first);
                    if text.starts_with(|c: char| c.is_ascii_digit()) {
                        Token::Literal
                    } else if text.starts_with('$') {
                        Token::SysIdent(text.to_string())
                    } else {
                        match find_keyword(text) {
                            Some(kw) => Token::Keyword(kw),
                            None => Token::Ident(text.to_string()),
                        }
                    }
                }
            };
            tokens.push((token, self.span(first, self.pos - 1)));
        }
        Ok(tokens)
    }

    /// Skip an attribute instance `(* ... *)`.
    fn skip_attribute(&mut self) {
        self.pos += 2;
        while let Some(kind) = self.peek(0) {
            self.pos += 1;
            if kind == CatTokenKind::Symbol('*') && self.peek(0) == Some(CatTokenKind::Symbol(')'))
            {
                self.pos += 1;
                return;
            }
        }
    }

    /// IEEE 1800-2009 5.9 String literals
    fn string(&mut self) -> DiagResult2<Token> {
        let first = self.pos;
        self.pos += 1;
        let mut s = String::new();
        loop {
            match self.peek(0) {
                Some(CatTokenKind::Symbol('"')) => {
                    self.pos += 1;
                    return Ok(Token::Str(s));
                }
                Some(CatTokenKind::Symbol('\\')) => {
                    // An escaped newline continues the string on the next line.
                    self.pos += 1;
                    if self.peek(0).is_some() {
                        if self.peek(0) != Some(CatTokenKind::Newline) {
                            s.push_str(self.extract(self.pos));
                        }
                        self.pos += 1;
                    }
                }
                Some(CatTokenKind::Newline) | None => {
                    return Err(DiagBuilder2::error("unterminated string literal")
                        .span(self.span(first, first)));
                }
                Some(_) => {
                    s.push_str(self.extract(self.pos));
                    self.pos += 1;
                }
            }
        }
    }

    /// IEEE 1800-2009 5.6.1 Escaped identifiers
    fn escaped(&mut self) -> Token {
        self.pos += 1;
        match self.peek(0) {
            Some(CatTokenKind::Newline) => return Token::LineContinuation,
            Some(CatTokenKind::Whitespace) | None => return Token::Symbol('\\'),
            _ => (),
        }
        let mut name = String::new();
        while let Some(kind) = self.peek(0) {
            match kind {
                CatTokenKind::Whitespace
                | CatTokenKind::Newline
                | CatTokenKind::Comment
                | CatTokenKind::OpenComment => break,
                _ => {
                    name.push_str(self.extract(self.pos));
                    self.pos += 1;
                }
            }
        }
        Token::Ident(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    thread_local!(static INDEX: Cell<usize> = Cell::new(0));

    fn lex(input: &str) -> DiagResult2<Vec<Token>> {
        let idx = INDEX.with(|i| {
            let v = i.get();
            i.set(v + 1);
            v
        });
        let source = get_source_manager().add(&format!("lexer_{}.sv", idx), input);
        tokenize(source, input).map(|v| v.into_iter().map(|(t, _)| t).collect())
    }

    fn ident(n: &str) -> Token {
        Token::Ident(n.to_string())
    }

    #[test]
    fn idents() {
        assert_eq!(
            lex("module foo_1 $display").unwrap(),
            vec![
                Token::Keyword(Kw::Module),
                ident("foo_1"),
                Token::SysIdent("$display".into())
            ]
        );
    }

    #[test]
    fn esc_idents() {
        assert_eq!(lex(r"\bus+index ").unwrap(), vec![ident("bus+index")]);
    }

    #[test]
    fn attributes_are_noise() {
        assert_eq!(
            lex("(* keep = \"true\" *) a @(*)").unwrap(),
            vec![
                ident("a"),
                Token::Symbol('@'),
                Token::Symbol('('),
                Token::Symbol('*'),
                Token::Symbol(')')
            ]
        );
    }

    #[test]
    fn directives_and_strings() {
        assert_eq!(
            lex("`include \"defs.vh\"\n").unwrap(),
            vec![
                Token::Directive("include".into()),
                Token::Str("defs.vh".into()),
                Token::Newline
            ]
        );
    }

    #[test]
    fn based_literals() {
        assert_eq!(
            lex("8'hFF;").unwrap(),
            vec![Token::Literal, Token::Literal, Token::Symbol(';')]
        );
    }

    #[test]
    fn line_continuation() {
        assert_eq!(
            lex("a \\\nb").unwrap(),
            vec![ident("a"), Token::LineContinuation, Token::Newline, ident("b")]
        );
    }

    #[test]
    fn unterminated_string() {
        let err = lex("x = \"abc\n").unwrap_err();
        assert_eq!(err.get_message(), "unterminated string literal");
    }

    #[test]
    fn unterminated_comment() {
        let err = lex("module a; /* endmodule").unwrap_err();
        assert_eq!(err.get_message(), "unterminated block comment");
    }
}
