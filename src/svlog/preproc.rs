// Copyright (c) 2016-2021 Fabian Schuiki

//! A preprocessor for Verilog and SystemVerilog files that resolves include
//! directives and strips all other compiler directives from the token stream.
//!
//! Conditional directives are removed but all of their branches are kept,
//! which may report more relations than a tool would see, never fewer.

use crate::lexer::{tokenize, Token, TokenAndSpan};
use hdldeps_common::errors::*;
use hdldeps_common::source::*;
use hdldeps_common::util::normalize;
use hdldeps_common::Session;
use std::path::{Path, PathBuf};

/// Directives that take the rest of the line as their argument.
static LINE_DIRECTIVES: &[&str] = &[
    "begin_keywords",
    "default_decay_time",
    "default_nettype",
    "default_trireg_strength",
    "delay_mode_distributed",
    "delay_mode_path",
    "delay_mode_unit",
    "delay_mode_zero",
    "elsif",
    "ifdef",
    "ifndef",
    "line",
    "pragma",
    "timescale",
    "unconnected_drive",
    "undef",
];

/// Directives that take no arguments.
static PLAIN_DIRECTIVES: &[&str] = &[
    "celldefine",
    "else",
    "end_keywords",
    "endcelldefine",
    "endif",
    "nounconnected_drive",
    "resetall",
    "undefineall",
];

/// Preprocess a source file, splicing in the tokens of included files.
///
/// Includes are resolved relative to the directory of the including file
/// first, then against `include_dirs` in order. Includes that cannot be found
/// or that would recurse are reported as warnings and skipped.
pub fn preprocess(
    sess: &Session,
    source: Source,
    text: &str,
    include_dirs: &[PathBuf],
) -> DiagResult2<Vec<TokenAndSpan>> {
    let mut pp = Preprocessor {
        sess,
        include_dirs,
        stack: Vec::new(),
        output: Vec::new(),
    };
    pp.process(source, text)?;
    Ok(pp.output)
}

struct Preprocessor<'a> {
    sess: &'a Session,
    include_dirs: &'a [PathBuf],
    /// The files currently being processed, outermost first.
    stack: Vec<Source>,
    output: Vec<TokenAndSpan>,
}

impl<'a> Preprocessor<'a> {
    fn process(&mut self, source: Source, text: &str) -> DiagResult2<()> {
        let tokens = tokenize(source, text)?;
        self.stack.push(source);
        let mut i = 0;
        while i < tokens.len() {
            let (ref token, span) = tokens[i];
            i += 1;
            let name = match *token {
                Token::Newline => continue,
                Token::Directive(ref name) => name.as_str(),
                _ => {
                    self.output.push(tokens[i - 1].clone());
                    continue;
                }
            };
            match name {
                "include" => {
                    let (filename, consumed) = match include_target(&tokens[i..], text) {
                        Some(x) => x,
                        None => {
                            self.sess.emit(
                                DiagBuilder2::warning("expected filename after `include")
                                    .span(span),
                            );
                            (String::new(), 0)
                        }
                    };
                    i += consumed;
                    if !filename.is_empty() {
                        self.include(source, &filename, span)?;
                    }
                    i = skip_line(&tokens, i);
                }
                "define" => i = skip_line(&tokens, i),
                n if LINE_DIRECTIVES.contains(&n) => i = skip_line(&tokens, i),
                n if PLAIN_DIRECTIVES.contains(&n) => (),
                _ => {
                    // A macro usage. Drop its arguments if it has any.
                    if let Some((Token::Symbol('('), sp)) = tokens.get(i) {
                        if sp.begin == span.end {
                            i = skip_balanced(&tokens, i);
                        }
                    }
                }
            }
        }
        self.stack.pop();
        Ok(())
    }

    fn include(&mut self, from: Source, filename: &str, span: Span) -> DiagResult2<()> {
        let target = match self.resolve(from, filename) {
            Some(t) => t,
            None => {
                let mut d = DiagBuilder2::warning(format!(
                    "cannot find include file `{}`",
                    filename
                ))
                .span(span);
                for dir in self.include_dirs {
                    d = d.add_note(format!("searched in {}", dir.display()));
                }
                self.sess.emit(d);
                return Ok(());
            }
        };
        if self.stack.contains(&target) {
            self.sess.emit(
                DiagBuilder2::warning(format!("recursive include of `{}`", filename))
                    .span(span)
                    .add_note(format!("{} is already being processed", target)),
            );
            return Ok(());
        }
        let content = match target.get_content() {
            Ok(c) => c,
            Err(e) => {
                self.sess.emit(
                    DiagBuilder2::warning(format!("cannot read include file `{}`", filename))
                        .span(span)
                        .add_note(format!("{}: {}", target, e)),
                );
                return Ok(());
            }
        };
        debug!("including {} into {}", target, from);
        let text = content.text();
        self.process(target, &text)
    }

    /// Find the file an include directive refers to.
    fn resolve(&self, from: Source, filename: &str) -> Option<Source> {
        let sm = get_source_manager();
        let path = Path::new(filename);
        if path.is_absolute() {
            return sm.open(filename);
        }
        let from_path = from.get_path();
        let local_dir = Path::new(&*from_path).parent().map(Path::to_path_buf);
        local_dir
            .iter()
            .chain(self.include_dirs.iter())
            .map(|dir| normalize(&dir.join(path)))
            .filter_map(|candidate| candidate.to_str().and_then(|c| sm.open(c)))
            .next()
    }
}

/// Parse the filename following an include directive, either `"file"` or
/// `<file>`. Returns the filename and the number of tokens consumed.
fn include_target(tokens: &[TokenAndSpan], text: &str) -> Option<(String, usize)> {
    match tokens.first() {
        Some((Token::Str(ref s), _)) => Some((s.clone(), 1)),
        Some((Token::Symbol('<'), open)) => {
            for (n, (token, sp)) in tokens.iter().enumerate().skip(1) {
                match *token {
                    Token::Symbol('>') => {
                        return Some((text[open.end..sp.begin].trim().to_string(), n + 1))
                    }
                    Token::Newline => return None,
                    _ => (),
                }
            }
            None
        }
        _ => None,
    }
}

/// Advance to just past the end of the current line, honoring line
/// continuations.
fn skip_line(tokens: &[TokenAndSpan], mut i: usize) -> usize {
    let mut continued = false;
    while i < tokens.len() {
        match tokens[i].0 {
            Token::Newline if !continued => return i + 1,
            Token::LineContinuation => continued = true,
            _ => continued = false,
        }
        i += 1;
    }
    i
}

/// Advance past a parenthesized group starting at `i`.
fn skip_balanced(tokens: &[TokenAndSpan], mut i: usize) -> usize {
    let mut depth = 0;
    while i < tokens.len() {
        match tokens[i].0 {
            Token::Symbol('(') => depth += 1,
            Token::Symbol(')') => {
                depth -= 1;
                if depth == 0 {
                    return i + 1;
                }
            }
            _ => (),
        }
        i += 1;
    }
    i
}
