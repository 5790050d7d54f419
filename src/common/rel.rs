// Copyright (c) 2016-2021 Fabian Schuiki

//! The relations a source file has with the design units of a project.
//!
//! Every source file either provides a unit (declares it) or uses a unit
//! (requires it to be declared elsewhere). Relations are identified by a key
//! of the form `<library>.<unit>` and a kind that acts as a namespace.

use std::fmt;

/// The namespace a relation key lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RelKind {
    Entity,
    Architecture,
    Module,
    Package,
}

impl RelKind {
    pub fn to_str(self) -> &'static str {
        match self {
            RelKind::Entity => "entity",
            RelKind::Architecture => "architecture",
            RelKind::Module => "module",
            RelKind::Package => "package",
        }
    }

    /// Whether this kind names a VHDL primary unit that may be completed by a
    /// secondary unit in another file.
    pub fn is_primary(self) -> bool {
        match self {
            RelKind::Entity | RelKind::Package => true,
            _ => false,
        }
    }
}

impl fmt::Display for RelKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    Provide,
    Use,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Direction::Provide => write!(f, "provide"),
            Direction::Use => write!(f, "use"),
        }
    }
}

/// A single relation between a source file and a design unit.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Relation {
    key: String,
    direction: Direction,
    kind: RelKind,
}

impl Relation {
    pub fn new<S: Into<String>>(key: S, direction: Direction, kind: RelKind) -> Relation {
        Relation {
            key: key.into(),
            direction,
            kind,
        }
    }

    /// Create a relation that declares `<library>.<name>`.
    pub fn provide(library: &str, name: &str, kind: RelKind) -> Relation {
        Relation::new(make_key(library, name), Direction::Provide, kind)
    }

    /// Create a relation that requires `<library>.<name>`.
    pub fn require(library: &str, name: &str, kind: RelKind) -> Relation {
        Relation::new(make_key(library, name), Direction::Use, kind)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn kind(&self) -> RelKind {
        self.kind
    }

    /// The library part of the key.
    pub fn library(&self) -> &str {
        match self.key.find('.') {
            Some(i) => &self.key[..i],
            None => "",
        }
    }

    /// The unit name part of the key.
    pub fn unit_name(&self) -> &str {
        match self.key.find('.') {
            Some(i) => &self.key[i + 1..],
            None => &self.key,
        }
    }

    pub fn is_provide(&self) -> bool {
        self.direction == Direction::Provide
    }

    pub fn is_use(&self) -> bool {
        self.direction == Direction::Use
    }

    /// Check whether two relations refer to the same unit. The direction is
    /// ignored.
    pub fn matches(&self, other: &Relation) -> bool {
        self.kind == other.kind && self.key == other.key
    }

    /// Check whether this relation provides the unit `other` refers to.
    pub fn satisfies(&self, other: &Relation) -> bool {
        self.is_provide() && self.matches(other)
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {}", self.direction, self.kind, self.key)
    }
}

/// Assemble a relation key from a library and a unit name.
pub fn make_key(library: &str, name: &str) -> String {
    format!("{}.{}", library, name)
}
