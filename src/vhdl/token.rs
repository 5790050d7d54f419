// Copyright (c) 2016-2021 Fabian Schuiki

//! The tokens produced by the VHDL lexer.

use hdldeps_common::source::Span;
use std::fmt;

/// A token as emitted by the lexer.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Token {
    /// A basic identifier, lower-cased.
    Ident(String),
    /// An extended identifier, including its delimiting backslashes.
    ExtIdent(String),
    /// A keyword.
    Keyword(Kw),
    /// A string, character, bit string or numeric literal.
    Literal,

    Period,
    Comma,
    Colon,
    Semicolon,
    VarAssign,
    OpenParen,
    CloseParen,
    /// Any other delimiter.
    Symbol(char),
}

/// A token together with the span of source text it covers.
pub type TokenAndSpan = (Token, Span);

impl Token {
    /// The name this token represents, if it is an identifier.
    pub fn name(&self) -> Option<&str> {
        match *self {
            Token::Ident(ref n) | Token::ExtIdent(ref n) => Some(n),
            _ => None,
        }
    }

    pub fn is_kw(&self, kw: Kw) -> bool {
        *self == Token::Keyword(kw)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Token::Ident(ref n) | Token::ExtIdent(ref n) => write!(f, "{}", n),
            Token::Keyword(kw) => write!(f, "{}", kw),
            Token::Literal => write!(f, "literal"),
            Token::Period => write!(f, "."),
            Token::Comma => write!(f, ","),
            Token::Colon => write!(f, ":"),
            Token::Semicolon => write!(f, ";"),
            Token::VarAssign => write!(f, ":="),
            Token::OpenParen => write!(f, "("),
            Token::CloseParen => write!(f, ")"),
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

    /// Look up a keyword. The lookup is case-insensitive.
    pub fn find_keyword(name: &str) -> Option<Kw> {
        use std::collections::HashMap;
        use once_cell::sync::Lazy;
        static TBL: Lazy<HashMap<&'static str, Kw>> = Lazy::new(|| {
            let mut tbl = HashMap::new();
            $(tbl.insert($string, Kw::$konst);)*
            tbl
        });
        TBL.get(name.to_ascii_lowercase().as_str()).cloned()
    }
}}

declare_keywords! {
    // IEEE 1076-2008 section 15.10
    (Abs, "abs")
    (Access, "access")
    (After, "after")
    (Alias, "alias")
    (All, "all")
    (And, "and")
    (Architecture, "architecture")
    (Array, "array")
    (Assert, "assert")
    (Assume, "assume")
    (AssumeGuarantee, "assume_guarantee")
    (Attribute, "attribute")
    (Begin, "begin")
    (Block, "block")
    (Body, "body")
    (Buffer, "buffer")
    (Bus, "bus")
    (Case, "case")
    (Component, "component")
    (Configuration, "configuration")
    (Constant, "constant")
    (Context, "context")
    (Cover, "cover")
    (Default, "default")
    (Disconnect, "disconnect")
    (Downto, "downto")
    (Else, "else")
    (Elsif, "elsif")
    (End, "end")
    (Entity, "entity")
    (Exit, "exit")
    (Fairness, "fairness")
    (File, "file")
    (For, "for")
    (Force, "force")
    (Function, "function")
    (Generate, "generate")
    (Generic, "generic")
    (Group, "group")
    (Guarded, "guarded")
    (If, "if")
    (Impure, "impure")
    (In, "in")
    (Inertial, "inertial")
    (Inout, "inout")
    (Is, "is")
    (Label, "label")
    (Library, "library")
    (Linkage, "linkage")
    (Literal, "literal")
    (Loop, "loop")
    (Map, "map")
    (Mod, "mod")
    (Nand, "nand")
    (New, "new")
    (Next, "next")
    (Nor, "nor")
    (Not, "not")
    (Null, "null")
    (Of, "of")
    (On, "on")
    (Open, "open")
    (Or, "or")
    (Others, "others")
    (Out, "out")
    (Package, "package")
    (Parameter, "parameter")
    (Port, "port")
    (Postponed, "postponed")
    (Procedure, "procedure")
    (Process, "process")
    (Property, "property")
    (Protected, "protected")
    (Pure, "pure")
    (Range, "range")
    (Record, "record")
    (Register, "register")
    (Reject, "reject")
    (Release, "release")
    (Rem, "rem")
    (Report, "report")
    (Restrict, "restrict")
    (RestrictGuarantee, "restrict_guarantee")
    (Return, "return")
    (Rol, "rol")
    (Ror, "ror")
    (Select, "select")
    (Sequence, "sequence")
    (Severity, "severity")
    (Shared, "shared")
    (Signal, "signal")
    (Sla, "sla")
    (Sll, "sll")
    (Sra, "sra")
    (Srl, "srl")
    (Strong, "strong")
    (Subtype, "subtype")
    (Then, "then")
    (To, "to")
    (Transport, "transport")
    (Type, "type")
    (Unaffected, "unaffected")
    (Units, "units")
    (Until, "until")
    (Use, "use")
    (Variable, "variable")
    (Vmode, "vmode")
    (Vprop, "vprop")
    (Vunit, "vunit")
    (Wait, "wait")
    (When, "when")
    (While, "while")
    (With, "with")
    (Xnor, "xnor")
    (Xor, "xor")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_case_insensitive() {
        assert_eq!(find_keyword("ENTITY"), Some(Kw::Entity));
        assert_eq!(find_keyword("Port"), Some(Kw::Port));
        assert_eq!(find_keyword("foo"), None);
    }
}
