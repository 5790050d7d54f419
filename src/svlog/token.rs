// Copyright (c) 2016-2021 Fabian Schuiki

//! Defines the tokens that result from performing lexical analysis on a
//! Verilog or SystemVerilog source file. Only the distinctions the relation
//! scanner needs are kept; all literals collapse into one token.

use hdldeps_common::source::Span;
use std::fmt;

/// A primary token emitted by the lexer.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Token {
    /// A simple or escaped identifier. Escaped identifiers have their leading
    /// backslash removed.
    Ident(String),
    /// A system task or function name such as `$display`.
    SysIdent(String),
    /// A keyword.
    Keyword(Kw),
    /// A compiler directive such as `` `include ``, without the backtick.
    Directive(String),
    /// A string literal, with the quotes and escapes removed.
    Str(String),
    /// A numeric literal.
    Literal,
    /// A backslash immediately followed by a newline.
    LineContinuation,
    Newline,
    /// Any other symbol.
    Symbol(char),
}

pub type TokenAndSpan = (Token, Span);

impl Token {
    pub fn is_kw(&self, kw: Kw) -> bool {
        *self == Token::Keyword(kw)
    }

    pub fn is_symbol(&self, c: char) -> bool {
        *self == Token::Symbol(c)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Token::Ident(ref n) | Token::SysIdent(ref n) => write!(f, "{}", n),
            Token::Keyword(kw) => write!(f, "{}", kw),
            Token::Directive(ref n) => write!(f, "`{}", n),
            Token::Str(ref s) => write!(f, "\"{}\"", s),
            Token::Literal => write!(f, "literal"),
            Token::LineContinuation => write!(f, "\\"),
            Token::Newline => write!(f, "newline"),
            Token::Symbol(c) => write!(f, "{}", c),
        }
    }
}

/// Generates a `Kw` enum from a list of keywords.
macro_rules! declare_keywords {(
    $( ($konst: ident, $string: expr) )*
) => {
    #[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Debug, Hash)]
    pub enum Kw {
        $($konst,)*
    }

    impl Kw {
        pub fn as_str(self) -> &'static str {
            match self {
                $(Kw::$konst => $string,)*
            }
        }
    }

    impl fmt::Display for Kw {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "{}", self.as_str())
        }
    }

    /// Look up a keyword. Keywords are case-sensitive.
    pub fn find_keyword(name: &str) -> Option<Kw> {
        use std::collections::HashMap;
        use once_cell::sync::Lazy;
        static TBL: Lazy<HashMap<&'static str, Kw>> = Lazy::new(|| {
            let mut tbl = HashMap::new();
            $(tbl.insert($string, Kw::$konst);)*
            tbl
        });
        TBL.get(name).cloned()
    }
}}

declare_keywords! {
    // IEEE 1800-2017 Annex B
    (AcceptOn, "accept_on")
    (Alias, "alias")
    (Always, "always")
    (AlwaysComb, "always_comb")
    (AlwaysFf, "always_ff")
    (AlwaysLatch, "always_latch")
    (And, "and")
    (Assert, "assert")
    (Assign, "assign")
    (Assume, "assume")
    (Automatic, "automatic")
    (Before, "before")
    (Begin, "begin")
    (Bind, "bind")
    (Bins, "bins")
    (Binsof, "binsof")
    (Bit, "bit")
    (Break, "break")
    (Buf, "buf")
    (Bufif0, "bufif0")
    (Bufif1, "bufif1")
    (Byte, "byte")
    (Case, "case")
    (Casex, "casex")
    (Casez, "casez")
    (Cell, "cell")
    (Chandle, "chandle")
    (Checker, "checker")
    (Class, "class")
    (Clocking, "clocking")
    (Cmos, "cmos")
    (Config, "config")
    (Const, "const")
    (Constraint, "constraint")
    (Context, "context")
    (Continue, "continue")
    (Cover, "cover")
    (Covergroup, "covergroup")
    (Coverpoint, "coverpoint")
    (Cross, "cross")
    (Deassign, "deassign")
    (Default, "default")
    (Defparam, "defparam")
    (Design, "design")
    (Disable, "disable")
    (Dist, "dist")
    (Do, "do")
    (Edge, "edge")
    (Else, "else")
    (End, "end")
    (Endcase, "endcase")
    (Endchecker, "endchecker")
    (Endclass, "endclass")
    (Endclocking, "endclocking")
    (Endconfig, "endconfig")
    (Endfunction, "endfunction")
    (Endgenerate, "endgenerate")
    (Endgroup, "endgroup")
    (Endinterface, "endinterface")
    (Endmodule, "endmodule")
    (Endpackage, "endpackage")
    (Endprimitive, "endprimitive")
    (Endprogram, "endprogram")
    (Endproperty, "endproperty")
    (Endspecify, "endspecify")
    (Endsequence, "endsequence")
    (Endtable, "endtable")
    (Endtask, "endtask")
    (Enum, "enum")
    (Event, "event")
    (Eventually, "eventually")
    (Expect, "expect")
    (Export, "export")
    (Extends, "extends")
    (Extern, "extern")
    (Final, "final")
    (FirstMatch, "first_match")
    (For, "for")
    (Force, "force")
    (Foreach, "foreach")
    (Forever, "forever")
    (Fork, "fork")
    (Forkjoin, "forkjoin")
    (Function, "function")
    (Generate, "generate")
    (Genvar, "genvar")
    (Global, "global")
    (Highz0, "highz0")
    (Highz1, "highz1")
    (If, "if")
    (Iff, "iff")
    (Ifnone, "ifnone")
    (IgnoreBins, "ignore_bins")
    (IllegalBins, "illegal_bins")
    (Implements, "implements")
    (Implies, "implies")
    (Import, "import")
    (Incdir, "incdir")
    (Include, "include")
    (Initial, "initial")
    (Inout, "inout")
    (Input, "input")
    (Inside, "inside")
    (Instance, "instance")
    (Int, "int")
    (Integer, "integer")
    (Interconnect, "interconnect")
    (Interface, "interface")
    (Intersect, "intersect")
    (Join, "join")
    (JoinAny, "join_any")
    (JoinNone, "join_none")
    (Large, "large")
    (Let, "let")
    (Liblist, "liblist")
    (Library, "library")
    (Local, "local")
    (Localparam, "localparam")
    (Logic, "logic")
    (Longint, "longint")
    (Macromodule, "macromodule")
    (Matches, "matches")
    (Medium, "medium")
    (Modport, "modport")
    (Module, "module")
    (Nand, "nand")
    (Negedge, "negedge")
    (Nettype, "nettype")
    (New, "new")
    (Nexttime, "nexttime")
    (Nmos, "nmos")
    (Nor, "nor")
    (Noshowcancelled, "noshowcancelled")
    (Not, "not")
    (Notif0, "notif0")
    (Notif1, "notif1")
    (Null, "null")
    (Or, "or")
    (Output, "output")
    (Package, "package")
    (Packed, "packed")
    (Parameter, "parameter")
    (Pmos, "pmos")
    (Posedge, "posedge")
    (Primitive, "primitive")
    (Priority, "priority")
    (Program, "program")
    (Property, "property")
    (Protected, "protected")
    (Pull0, "pull0")
    (Pull1, "pull1")
    (Pulldown, "pulldown")
    (Pullup, "pullup")
    (PulsestyleOndetect, "pulsestyle_ondetect")
    (PulsestyleOnevent, "pulsestyle_onevent")
    (Pure, "pure")
    (Rand, "rand")
    (Randc, "randc")
    (Randcase, "randcase")
    (Randsequence, "randsequence")
    (Rcmos, "rcmos")
    (Real, "real")
    (Realtime, "realtime")
    (Ref, "ref")
    (Reg, "reg")
    (RejectOn, "reject_on")
    (Release, "release")
    (Repeat, "repeat")
    (Restrict, "restrict")
    (Return, "return")
    (Rnmos, "rnmos")
    (Rpmos, "rpmos")
    (Rtran, "rtran")
    (Rtranif0, "rtranif0")
    (Rtranif1, "rtranif1")
    (SAlways, "s_always")
    (SEventually, "s_eventually")
    (SNexttime, "s_nexttime")
    (SUntil, "s_until")
    (SUntilWith, "s_until_with")
    (Scalared, "scalared")
    (Sequence, "sequence")
    (Shortint, "shortint")
    (Shortreal, "shortreal")
    (Showcancelled, "showcancelled")
    (Signed, "signed")
    (Small, "small")
    (Soft, "soft")
    (Solve, "solve")
    (Specify, "specify")
    (Specparam, "specparam")
    (Static, "static")
    (String, "string")
    (Strong, "strong")
    (Strong0, "strong0")
    (Strong1, "strong1")
    (Struct, "struct")
    (Super, "super")
    (Supply0, "supply0")
    (Supply1, "supply1")
    (SyncAcceptOn, "sync_accept_on")
    (SyncRejectOn, "sync_reject_on")
    (Table, "table")
    (Tagged, "tagged")
    (Task, "task")
    (This, "this")
    (Throughout, "throughout")
    (Time, "time")
    (Timeprecision, "timeprecision")
    (Timeunit, "timeunit")
    (Tran, "tran")
    (Tranif0, "tranif0")
    (Tranif1, "tranif1")
    (Tri, "tri")
    (Tri0, "tri0")
    (Tri1, "tri1")
    (Triand, "triand")
    (Trior, "trior")
    (Trireg, "trireg")
    (Type, "type")
    (Typedef, "typedef")
    (Union, "union")
    (Unique, "unique")
    (Unique0, "unique0")
    (Unsigned, "unsigned")
    (Until, "until")
    (UntilWith, "until_with")
    (Untyped, "untyped")
    (Use, "use")
    (Uwire, "uwire")
    (Var, "var")
    (Vectored, "vectored")
    (Virtual, "virtual")
    (Void, "void")
    (Wait, "wait")
    (WaitOrder, "wait_order")
    (Wand, "wand")
    (Weak, "weak")
    (Weak0, "weak0")
    (Weak1, "weak1")
    (While, "while")
    (Wildcard, "wildcard")
    (Wire, "wire")
    (With, "with")
    (Within, "within")
    (Wor, "wor")
    (Xnor, "xnor")
    (Xor, "xor")
}

impl Kw {
    /// Whether the keyword closes a block, after which a new module item or
    /// statement begins.
    pub fn ends_block(self) -> bool {
        match self {
            Kw::End
            | Kw::Endcase
            | Kw::Endchecker
            | Kw::Endclass
            | Kw::Endclocking
            | Kw::Endconfig
            | Kw::Endfunction
            | Kw::Endgenerate
            | Kw::Endgroup
            | Kw::Endinterface
            | Kw::Endmodule
            | Kw::Endpackage
            | Kw::Endprimitive
            | Kw::Endprogram
            | Kw::Endproperty
            | Kw::Endspecify
            | Kw::Endsequence
            | Kw::Endtable
            | Kw::Endtask => true,
            _ => false,
        }
    }
}
