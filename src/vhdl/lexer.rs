// Copyright (c) 2016-2021 Fabian Schuiki

//! A lexer for VHDL source text. Only distinguishes the tokens the relation
//! scanner cares about; literals of all kinds collapse into a single token.

use crate::token::*;
use hdldeps_common::errors::*;
use hdldeps_common::source::*;

/// Break the text of a VHDL source file into tokens.
///
/// Unterminated strings, block comments and extended identifiers are reported
/// as an error, since no sensible token stream can be recovered from them.
pub fn tokenize(source: Source, text: &str) -> DiagResult2<Vec<TokenAndSpan>> {
    let mut lexer = Lexer {
        source,
        bytes: text.as_bytes(),
        text,
        pos: 0,
        tokens: Vec::new(),
    };
    lexer.run()?;
    Ok(lexer.tokens)
}

struct Lexer<'a> {
    source: Source,
    bytes: &'a [u8],
    text: &'a str,
    pos: usize,
    tokens: Vec<TokenAndSpan>,
}

impl<'a> Lexer<'a> {
    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).cloned()
    }

    fn span(&self, begin: usize) -> Span {
        Span::new(self.source, begin, self.pos)
    }

    fn push(&mut self, token: Token, begin: usize) {
        let sp = self.span(begin);
        self.tokens.push((token, sp));
    }

    fn run(&mut self) -> DiagResult2<()> {
        while let Some(c) = self.peek(0) {
            let begin = self.pos;
            match c {
                b'-' if self.peek(1) == Some(b'-') => self.skip_line(),
                b'/' if self.peek(1) == Some(b'*') => self.skip_block_comment()?,
                b'"' => {
                    self.eat_string(b'"', "string literal")?;
                    self.push(Token::Literal, begin);
                }
                b'%' => {
                    self.eat_string(b'%', "string literal")?;
                    self.push(Token::Literal, begin);
                }
                b'\\' => {
                    self.eat_string(b'\\', "extended identifier")?;
                    let name = self.text[begin..self.pos].to_string();
                    self.push(Token::ExtIdent(name), begin);
                }
                b'\'' => {
                    if self.peek(2) == Some(b'\'') && !self.after_name() {
                        self.pos += 3;
                        self.push(Token::Literal, begin);
                    } else {
                        self.pos += 1;
                        self.push(Token::Symbol('\''), begin);
                    }
                }
                b'a'..=b'z' | b'A'..=b'Z' => {
                    self.eat_while(|c| c.is_ascii_alphanumeric() || c == b'_');
                    let word = &self.text[begin..self.pos];
                    let token = match find_keyword(word) {
                        Some(kw) => Token::Keyword(kw),
                        None => Token::Ident(word.to_ascii_lowercase()),
                    };
                    self.push(token, begin);
                }
                b'0'..=b'9' => {
                    self.eat_while(|c| c.is_ascii_alphanumeric() || c == b'_' || c == b'#');
                    // Fractional part of a real literal.
                    if self.peek(0) == Some(b'.')
                        && self.peek(1).map(|c| c.is_ascii_digit()).unwrap_or(false)
                    {
                        self.pos += 1;
                        self.eat_while(|c| c.is_ascii_alphanumeric() || c == b'_' || c == b'#');
                    }
                    self.push(Token::Literal, begin);
                }
                b':' if self.peek(1) == Some(b'=') => {
                    self.pos += 2;
                    self.push(Token::VarAssign, begin);
                }
                c if c.is_ascii_whitespace() => self.pos += 1,
                c if !c.is_ascii() => self.pos += 1,
                c => {
                    self.pos += 1;
                    let token = match c {
                        b'.' => Token::Period,
                        b',' => Token::Comma,
                        b':' => Token::Colon,
                        b';' => Token::Semicolon,
                        b'(' => Token::OpenParen,
                        b')' => Token::CloseParen,
                        c => Token::Symbol(c as char),
                    };
                    self.push(token, begin);
                }
            }
        }
        Ok(())
    }

    fn eat_while<F: Fn(u8) -> bool>(&mut self, pred: F) {
        while let Some(c) = self.peek(0) {
            if !pred(c) {
                break;
            }
            self.pos += 1;
        }
    }

    fn skip_line(&mut self) {
        self.eat_while(|c| c != b'\n');
    }

    fn skip_block_comment(&mut self) -> DiagResult2<()> {
        let begin = self.pos;
        self.pos += 2;
        loop {
            match self.peek(0) {
                Some(b'*') if self.peek(1) == Some(b'/') => {
                    self.pos += 2;
                    return Ok(());
                }
                Some(_) => self.pos += 1,
                None => {
                    return Err(DiagBuilder2::error("unterminated block comment")
                        .span(Span::new(self.source, begin, begin + 2)))
                }
            }
        }
    }

    /// Consume a delimited sequence such as a string. A doubled delimiter
    /// stands for the delimiter itself. The sequence may not span lines.
    fn eat_string(&mut self, delim: u8, what: &str) -> DiagResult2<()> {
        let begin = self.pos;
        self.pos += 1;
        loop {
            match self.peek(0) {
                Some(c) if c == delim => {
                    if self.peek(1) == Some(delim) {
                        self.pos += 2;
                    } else {
                        self.pos += 1;
                        return Ok(());
                    }
                }
                Some(b'\n') | None => {
                    return Err(DiagBuilder2::error(format!("unterminated {}", what))
                        .span(Span::new(self.source, begin, begin + 1)))
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    /// Whether the previous token ends a name, in which case an apostrophe
    /// introduces an attribute or a qualified expression.
    fn after_name(&self) -> bool {
        match self.tokens.last() {
            Some((Token::Ident(_), _))
            | Some((Token::ExtIdent(_), _))
            | Some((Token::CloseParen, _))
            | Some((Token::Keyword(Kw::All), _)) => true,
            _ => false,
        }
    }
}
