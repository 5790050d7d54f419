// Copyright (c) 2016-2021 Fabian Schuiki

//! A scanner that recognizes module, interface, and package declarations and
//! module instantiations in a preprocessed Verilog or SystemVerilog token
//! stream.

use crate::lexer::{Kw, Token, TokenAndSpan};
use hdldeps_common::rel::{RelKind, Relation};

/// Verilog and SystemVerilog have no libraries in the VHDL sense. All units
/// live in `work`.
const LIBRARY: &str = "work";

/// Scan a token stream for relations. SystemVerilog-only constructs are
/// recognized only if `system_verilog` is set.
pub fn scan(tokens: &[TokenAndSpan], system_verilog: bool) -> Vec<Relation> {
    let mut scanner = Scanner {
        tokens,
        pos: 0,
        system_verilog,
        rels: Vec::new(),
    };
    scanner.run();
    scanner.rels
}

struct Scanner<'a> {
    tokens: &'a [TokenAndSpan],
    pos: usize,
    system_verilog: bool,
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

    fn ident(&self, offset: usize) -> Option<&'a str> {
        match self.token(offset) {
            Some(Token::Ident(ref n)) => Some(n),
            _ => None,
        }
    }

    fn is_symbol(&self, offset: usize, c: char) -> bool {
        self.token(offset).map(|t| t.is_symbol(c)).unwrap_or(false)
    }

    fn add(&mut self, rel: Relation) {
        trace!("{}", rel);
        if !self.rels.contains(&rel) {
            self.rels.push(rel);
        }
    }

    fn run(&mut self) {
        while let Some(token) = self.token(0) {
            let consumed = match *token {
                Token::Keyword(Kw::Module)
                | Token::Keyword(Kw::Macromodule)
                | Token::Keyword(Kw::Primitive) => self.declaration(RelKind::Module),
                Token::Keyword(Kw::Interface) if self.system_verilog => {
                    let is_virtual = self.prev().map(|t| t.is_kw(Kw::Virtual)).unwrap_or(false);
                    let is_class = self.token(1).map(|t| t.is_kw(Kw::Class)).unwrap_or(false);
                    if is_virtual || is_class {
                        1
                    } else {
                        self.declaration(RelKind::Module)
                    }
                }
                Token::Keyword(Kw::Program) if self.system_verilog => {
                    self.declaration(RelKind::Module)
                }
                Token::Keyword(Kw::Package) if self.system_verilog => {
                    self.declaration(RelKind::Package)
                }
                Token::Keyword(Kw::Import) if self.system_verilog => self.import(),
                Token::Ident(_) if self.at_statement_start() => self.instantiation(),
                _ => 1,
            };
            self.pos += consumed.max(1);
        }
    }

    /// `module [lifetime] M`, and the like.
    fn declaration(&mut self, kind: RelKind) -> usize {
        let mut n = 1;
        if let Some(Token::Keyword(Kw::Automatic)) | Some(Token::Keyword(Kw::Static)) =
            self.token(n)
        {
            n += 1;
        }
        match self.ident(n) {
            Some(name) => {
                self.add(Relation::provide(LIBRARY, name, kind));
                n + 1
            }
            None => 1,
        }
    }

    /// `import P::item, Q::*;`
    fn import(&mut self) -> usize {
        let mut n = 1;
        loop {
            let name = match self.ident(n) {
                Some(name) if self.is_symbol(n + 1, ':') && self.is_symbol(n + 2, ':') => name,
                _ => return n,
            };
            if name != "std" {
                self.add(Relation::require(LIBRARY, name, RelKind::Package));
            }
            n += 3;
            // Skip the imported item.
            while let Some(t) = self.token(n) {
                if t.is_symbol(',') || t.is_symbol(';') {
                    break;
                }
                n += 1;
            }
            if self.is_symbol(n, ',') {
                n += 1;
            } else {
                return n;
            }
        }
    }

    /// Whether the current token is at a position where a module
    /// instantiation may begin.
    fn at_statement_start(&self) -> bool {
        match self.prev() {
            Some(Token::Symbol(';')) | Some(Token::Symbol(':')) | Some(Token::Symbol(')')) => {
                // Exclude the `::` of package scopes.
                !(self.pos >= 2 && self.tokens[self.pos - 2].0.is_symbol(':'))
            }
            Some(Token::Keyword(Kw::Begin))
            | Some(Token::Keyword(Kw::Generate))
            | Some(Token::Keyword(Kw::Else)) => true,
            Some(Token::Keyword(kw)) => kw.ends_block(),
            // Labelled blocks, `begin : label` and `endtask : label`.
            Some(Token::Ident(_)) if self.pos >= 3 => {
                let labelled = match self.tokens[self.pos - 3].0 {
                    Token::Keyword(kw) => kw == Kw::Begin || kw == Kw::Fork || kw.ends_block(),
                    _ => false,
                };
                labelled && self.tokens[self.pos - 2].0.is_symbol(':')
            }
            _ => false,
        }
    }

    /// `M [#(params)] inst [dims] (`
    fn instantiation(&mut self) -> usize {
        let module = match self.ident(0) {
            Some(m) => m,
            None => return 1,
        };
        let mut n = 1;
        if self.is_symbol(n, '#') {
            n += 1;
            if self.is_symbol(n, '(') {
                n = match self.skip_group(n, '(', ')') {
                    Some(n) => n,
                    None => return 1,
                };
            } else if self.token(n).is_some() {
                n += 1;
            }
        }
        if self.ident(n).is_none() {
            return 1;
        }
        n += 1;
        while self.is_symbol(n, '[') {
            n = match self.skip_group(n, '[', ']') {
                Some(n) => n,
                None => return 1,
            };
        }
        if !self.is_symbol(n, '(') {
            return 1;
        }
        self.add(Relation::require(LIBRARY, module, RelKind::Module));
        n
    }

    /// Skip a bracketed group starting at `offset`. Returns the offset just
    /// past the closing bracket.
    fn skip_group(&self, offset: usize, open: char, close: char) -> Option<usize> {
        let mut depth = 0usize;
        let mut n = offset;
        while let Some(t) = self.token(n) {
            if t.is_symbol(open) {
                depth += 1;
            } else if t.is_symbol(close) {
                depth -= 1;
                if depth == 0 {
                    return Some(n + 1);
                }
            }
            n += 1;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use hdldeps_common::source::get_source_manager;
    use std::cell::Cell;

    thread_local!(static INDEX: Cell<usize> = Cell::new(0));

    fn scan_str(input: &str, system_verilog: bool) -> Vec<String> {
        let idx = INDEX.with(|i| {
            let v = i.get();
            i.set(v + 1);
            v
        });
        let source = get_source_manager().add(&format!("scan_{}.sv", idx), input);
        let tokens: Vec<_> = tokenize(source, input)
            .unwrap()
            .into_iter()
            .filter(|(t, _)| *t != Token::Newline)
            .collect();
        scan(&tokens, system_verilog)
            .into_iter()
            .map(|r| r.to_string())
            .collect()
    }

    #[test]
    fn modules_and_instances() {
        let rels = scan_str(
            "module Top(input clk);
               wire [3:0] w;
               Child #(.N(4)) u_child (.clk(clk));
               Other #8 u_other [1:0] (clk);
               assign w = 4'b0;
               generate if (1) begin : g
                 Leaf leaf_i (clk);
               end endgenerate
             endmodule
             primitive udp(o, a); endprimitive",
            false,
        );
        assert_eq!(
            rels,
            vec![
                "provide module work.Top",
                "use module work.Child",
                "use module work.Other",
                "use module work.Leaf",
                "provide module work.udp",
            ]
        );
    }

    #[test]
    fn system_verilog_units() {
        let rels = scan_str(
            "package automatic pkg; endpackage
             interface bus_if; endinterface
             interface class ic; endclass
             program prog; endprogram
             module m; import pkg::*, std::*; virtual interface bus_if vif; endmodule",
            true,
        );
        assert_eq!(
            rels,
            vec![
                "provide package work.pkg",
                "provide module work.bus_if",
                "provide module work.prog",
                "provide module work.m",
                "use package work.pkg",
            ]
        );
    }

    #[test]
    fn verilog_ignores_sv_constructs() {
        let rels = scan_str("package p; endpackage module m; endmodule", false);
        assert_eq!(rels, vec!["provide module work.m"]);
    }

    #[test]
    fn escaped_module_names() {
        let rels = scan_str("module \\odd$name (a); endmodule", false);
        assert_eq!(rels, vec!["provide module work.odd$name"]);
    }

    #[test]
    fn instances_after_block_ends() {
        let rels = scan_str(
            "module m;
               function f; input a; f = a; endfunction
               sub0 u0 (a);
               task t; endtask
               sub1 u1 (a);
               task t2; endtask : t2
               sub2 u2 (a);
               specify endspecify
               sub3 u3 (a);
               clocking cb @(posedge clk); endclocking
               sub4 u4 (a);
               always @* case (a) 1: b = 0; endcase
               sub5 u5 (a);
             endmodule",
            true,
        );
        assert_eq!(
            rels,
            vec![
                "provide module work.m",
                "use module work.sub0",
                "use module work.sub1",
                "use module work.sub2",
                "use module work.sub3",
                "use module work.sub4",
                "use module work.sub5",
            ]
        );
    }

    #[test]
    fn declarations_are_not_instances() {
        let rels = scan_str(
            "module m; my_type_t v; foo_t x = bar(1); pkg::func(a); endmodule",
            true,
        );
        assert_eq!(rels, vec!["provide module work.m"]);
    }
}
