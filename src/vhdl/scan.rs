// Copyright (c) 2016-2021 Fabian Schuiki

//! A scanner that recognizes the design unit declarations and references in a
//! VHDL token stream.
//!
//! This is not a parser. The scanner looks at short windows of tokens around
//! the keywords that introduce or reference design units and ignores
//! everything else.

use crate::token::*;
use hdldeps_common::rel::{RelKind, Relation};
use std::collections::HashSet;

/// Scan a token stream for relations. `library` is the library the file is
/// compiled into.
pub fn scan(tokens: &[TokenAndSpan], library: &str) -> Vec<Relation> {
    let library = library.to_ascii_lowercase();
    let mut scanner = Scanner {
        tokens,
        pos: 0,
        libraries: HashSet::new(),
        library: &library,
        rels: Vec::new(),
    };
    scanner.run();
    scanner.rels
}

struct Scanner<'a> {
    tokens: &'a [TokenAndSpan],
    pos: usize,
    /// Libraries made visible through a `library` clause.
    libraries: HashSet<String>,
    library: &'a str,
    rels: Vec<Relation>,
}

impl<'a> Scanner<'a> {
    fn token(&self, offset: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + offset).map(|t| &t.0)
    }

    fn prev(&self) -> Option<&'a Token> {
        if self.pos == 0 {
            None
        } else {
            self.tokens.get(self.pos - 1).map(|t| &t.0)
        }
    }

    fn is_kw(&self, offset: usize, kw: Kw) -> bool {
        self.token(offset).map(|t| t.is_kw(kw)).unwrap_or(false)
    }

    /// Map a library name as written in the source to the library the
    /// relation refers to. `work` is the library being compiled into.
    fn resolve_lib(&self, lib: &str) -> String {
        if lib == "work" {
            self.library.to_string()
        } else {
            lib.to_string()
        }
    }

    fn provide(&mut self, lib: &str, name: &str, kind: RelKind) {
        let rel = Relation::provide(lib, name, kind);
        trace!("{}", rel);
        self.rels.push(rel);
    }

    fn require(&mut self, lib: &str, name: &str, kind: RelKind) {
        let rel = Relation::require(lib, name, kind);
        trace!("{}", rel);
        if !self.rels.contains(&rel) {
            self.rels.push(rel);
        }
    }

    /// Parse a name at the given offset.
    fn name_at(&self, offset: usize) -> Option<&'a str> {
        self.token(offset).and_then(|t| t.name())
    }

    /// Parse a selected name `a.b.all` at the given offset. Returns the
    /// elements and the number of tokens consumed.
    fn selected_name_at(&self, offset: usize) -> Option<(Vec<&'a str>, usize)> {
        let mut parts = vec![self.name_at(offset)?];
        let mut n = 1;
        while self.token(offset + n) == Some(&Token::Period) {
            match self.token(offset + n + 1) {
                Some(Token::Keyword(Kw::All)) => parts.push("all"),
                Some(t) => match t.name() {
                    Some(name) => parts.push(name),
                    None => break,
                },
                None => break,
            }
            n += 2;
        }
        Some((parts, n))
    }

    fn run(&mut self) {
        while let Some(token) = self.token(0) {
            let after_end = self.prev().map(|t| t.is_kw(Kw::End)).unwrap_or(false);
            let consumed = match *token {
                Token::Keyword(Kw::Library) => self.library_clause(),
                Token::Keyword(Kw::Use) => self.use_clause(),
                Token::Keyword(Kw::Entity) if !after_end => self.entity(),
                Token::Keyword(Kw::Architecture) if !after_end => self.architecture(),
                Token::Keyword(Kw::Package) if !after_end => self.package(),
                Token::Keyword(Kw::Context) if !after_end => self.context(),
                Token::Keyword(Kw::Configuration) if !after_end => self.configuration(),
                Token::Colon => self.instantiation(),
                _ => 1,
            };
            self.pos += consumed.max(1);
        }
    }

    /// `library a, b;`
    fn library_clause(&mut self) -> usize {
        let mut n = 1;
        while let Some(t) = self.token(n) {
            match *t {
                Token::Semicolon => break,
                Token::Comma => (),
                _ => match t.name() {
                    Some(name) => {
                        debug!("library {}", name);
                        self.libraries.insert(name.to_string());
                    }
                    None => break,
                },
            }
            n += 1;
        }
        n
    }

    /// `use lib.pkg.item;` and `use entity lib.ent`
    fn use_clause(&mut self) -> usize {
        if self.is_kw(1, Kw::Entity) {
            return match self.selected_name_at(2) {
                Some((parts, n)) => {
                    self.entity_reference(&parts);
                    2 + n
                }
                None => 2,
            };
        }
        let mut n = 1;
        loop {
            let (parts, m) = match self.selected_name_at(n) {
                Some(x) => x,
                None => return n,
            };
            n += m;
            if parts.len() >= 2 && parts[1] != "all" {
                let lib = parts[0];
                if lib == "work" || lib == "std" || self.libraries.contains(lib) {
                    let lib = self.resolve_lib(lib);
                    self.require(&lib, parts[1], RelKind::Package);
                }
            }
            if self.token(n) == Some(&Token::Comma) {
                n += 1;
            } else {
                return n;
            }
        }
    }

    /// A reference to an entity through a selected name `lib.ent`.
    fn entity_reference(&mut self, parts: &[&str]) {
        match *parts {
            [name] => {
                let lib = self.library.to_string();
                self.require(&lib, name, RelKind::Entity);
            }
            [lib, name, ..] => {
                let lib = self.resolve_lib(lib);
                self.require(&lib, name, RelKind::Entity);
            }
            [] => (),
        }
    }

    /// `entity E is` or `label : entity lib.E`
    fn entity(&mut self) -> usize {
        if self.prev() == Some(&Token::Colon) {
            return match self.selected_name_at(1) {
                Some((parts, n)) => {
                    self.entity_reference(&parts);
                    1 + n
                }
                None => 1,
            };
        }
        match (self.name_at(1), self.is_kw(2, Kw::Is)) {
            (Some(name), true) => {
                let lib = self.library.to_string();
                self.provide(&lib, name, RelKind::Entity);
                3
            }
            _ => 1,
        }
    }

    /// `architecture A of E is`
    fn architecture(&mut self) -> usize {
        if self.name_at(1).is_none() || !self.is_kw(2, Kw::Of) || !self.is_kw(4, Kw::Is) {
            return 1;
        }
        let entity = match self.name_at(3) {
            Some(e) => e,
            None => return 1,
        };
        let lib = self.library.to_string();
        self.provide(&lib, entity, RelKind::Architecture);
        self.require(&lib, entity, RelKind::Entity);
        5
    }

    /// `package P is`, `package P is new L.G` and `package body P is`
    fn package(&mut self) -> usize {
        let lib = self.library.to_string();
        if self.is_kw(1, Kw::Body) {
            return match (self.name_at(2), self.is_kw(3, Kw::Is)) {
                (Some(name), true) => {
                    self.provide(&lib, name, RelKind::Architecture);
                    self.require(&lib, name, RelKind::Package);
                    4
                }
                _ => 1,
            };
        }
        let name = match (self.name_at(1), self.is_kw(2, Kw::Is)) {
            (Some(name), true) => name,
            _ => return 1,
        };
        self.provide(&lib, name, RelKind::Package);
        if !self.is_kw(3, Kw::New) {
            return 3;
        }
        match self.selected_name_at(4) {
            Some((parts, n)) => {
                match *parts {
                    [generic] => self.require(&lib, generic, RelKind::Package),
                    [glib, generic, ..] => {
                        let glib = self.resolve_lib(glib);
                        self.require(&glib, generic, RelKind::Package);
                    }
                    [] => (),
                }
                4 + n
            }
            None => 4,
        }
    }

    /// `context C is` declares a context, `context L.C, ...;` references one.
    fn context(&mut self) -> usize {
        let lib = self.library.to_string();
        if let (Some(name), true) = (self.name_at(1), self.is_kw(2, Kw::Is)) {
            self.provide(&lib, name, RelKind::Package);
            return 3;
        }
        let mut n = 1;
        loop {
            let (parts, m) = match self.selected_name_at(n) {
                Some(x) => x,
                None => return n,
            };
            n += m;
            match *parts {
                [name] => self.require(&lib, name, RelKind::Package),
                [clib, name, ..] => {
                    let clib = self.resolve_lib(clib);
                    self.require(&clib, name, RelKind::Package);
                }
                [] => (),
            }
            if self.token(n) == Some(&Token::Comma) {
                n += 1;
            } else {
                return n;
            }
        }
    }

    /// `configuration C of E is`
    fn configuration(&mut self) -> usize {
        if self.name_at(1).is_none() || !self.is_kw(2, Kw::Of) {
            return 1;
        }
        match self.selected_name_at(3) {
            Some((parts, n)) if self.is_kw(3 + n, Kw::Is) => {
                self.entity_reference(&parts);
                4 + n
            }
            _ => 1,
        }
    }

    /// `label : [component] C generic map` / `port map`, or
    /// `label : component C;`. The colon is the current token.
    fn instantiation(&mut self) -> usize {
        match self.prev() {
            Some(Token::Ident(_)) | Some(Token::ExtIdent(_)) => (),
            _ => return 1,
        }
        let component = self.is_kw(1, Kw::Component);
        let offset = if component { 2 } else { 1 };
        let (parts, n) = match self.selected_name_at(offset) {
            Some(x) => x,
            None => return 1,
        };
        let after = offset + n;
        let mapped = (self.is_kw(after, Kw::Generic) || self.is_kw(after, Kw::Port))
            && self.is_kw(after + 1, Kw::Map);
        let bare = component && self.token(after) == Some(&Token::Semicolon);
        if !mapped && !bare {
            return 1;
        }
        if let Some(name) = parts.last() {
            let lib = self.library.to_string();
            self.require(&lib, name, RelKind::Entity);
        }
        after
    }
}
