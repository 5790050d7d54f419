// Copyright (c) 2016-2021 Fabian Schuiki

//! Source units, the files that make up a design.

use crate::common::errors::*;
use crate::common::rel::{Direction, RelKind, Relation};
use crate::common::source::get_source_manager;
use crate::common::util::normalize;
use crate::common::Session;
use once_cell::unsync::OnceCell;
use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// The kind of a source file, as derived from its extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FileKind {
    Vhdl,
    Verilog,
    SystemVerilog,
    /// Files that take no part in dependency resolution, such as constraint
    /// files, IP cores, or Tcl scripts.
    Other,
}

impl FileKind {
    /// Determine the kind of a file from its extension.
    pub fn from_path(path: &Path) -> FileKind {
        let ext = match path.extension().and_then(|e| e.to_str()) {
            Some(e) => e.to_ascii_lowercase(),
            None => return FileKind::Other,
        };
        match ext.as_str() {
            "vhd" | "vhdl" => FileKind::Vhdl,
            "v" | "vh" => FileKind::Verilog,
            "sv" | "svh" => FileKind::SystemVerilog,
            _ => FileKind::Other,
        }
    }

    /// Whether files of this kind carry relations.
    pub fn is_hdl(self) -> bool {
        self != FileKind::Other
    }
}

/// A single source file of a design.
///
/// Units are identified by their absolute, lexically normalized path.
/// Relations are extracted on first request and kept for the lifetime of the
/// unit. Dependency edges and levels are owned by the solver and recomputed on
/// every solve.
pub struct SourceUnit<'a> {
    path: PathBuf,
    kind: FileKind,
    library: String,
    include_dirs: Vec<PathBuf>,
    relations: OnceCell<Vec<Relation>>,
    parse_error: RefCell<Option<DiagBuilder2>>,
    depends_on: RefCell<BTreeSet<&'a SourceUnit<'a>>>,
    dep_level: Cell<Option<usize>>,
}

impl<'a> SourceUnit<'a> {
    /// Create a new unit for the file at `path`, compiled into the `work`
    /// library. Relative paths are taken relative to the current directory.
    pub fn new<P: AsRef<Path>>(path: P) -> SourceUnit<'a> {
        let path = path.as_ref();
        let path = if path.is_absolute() {
            normalize(path)
        } else {
            match std::env::current_dir() {
                Ok(cwd) => normalize(&cwd.join(path)),
                Err(_) => normalize(path),
            }
        };
        SourceUnit {
            kind: FileKind::from_path(&path),
            path,
            library: "work".to_string(),
            include_dirs: Vec::new(),
            relations: OnceCell::new(),
            parse_error: RefCell::new(None),
            depends_on: RefCell::new(BTreeSet::new()),
            dep_level: Cell::new(None),
        }
    }

    /// Compile the unit into a different library.
    pub fn with_library<S: Into<String>>(mut self, library: S) -> SourceUnit<'a> {
        self.library = library.into();
        self
    }

    /// Set the directories searched for included files.
    pub fn with_include_dirs(mut self, dirs: Vec<PathBuf>) -> SourceUnit<'a> {
        self.include_dirs = dirs;
        self
    }

    /// Override the kind derived from the file extension.
    pub fn with_kind(mut self, kind: FileKind) -> SourceUnit<'a> {
        self.kind = kind;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    pub fn library(&self) -> &str {
        &self.library
    }

    pub fn include_dirs(&self) -> &[PathBuf] {
        &self.include_dirs
    }

    /// Whether this unit takes part in dependency resolution.
    pub fn is_hdl(&self) -> bool {
        self.kind.is_hdl()
    }

    pub fn is_parsed(&self) -> bool {
        self.relations.get().is_some()
    }

    /// The relations of this unit. Empty until the unit has been parsed.
    pub fn relations(&self) -> &[Relation] {
        self.relations.get().map(|r| r.as_slice()).unwrap_or(&[])
    }

    /// The relations this unit provides.
    pub fn provides(&self) -> impl Iterator<Item = &Relation> {
        self.relations().iter().filter(|r| r.is_provide())
    }

    /// The relations this unit uses.
    pub fn uses(&self) -> impl Iterator<Item = &Relation> {
        self.relations().iter().filter(|r| r.is_use())
    }

    /// Check whether this unit provides the unit `rel` refers to.
    pub fn satisfies(&self, rel: &Relation) -> bool {
        self.provides().any(|p| p.matches(rel))
    }

    /// Check whether this unit provides a given key in a given namespace.
    pub fn provides_key(&self, key: &str, kind: RelKind) -> bool {
        self.satisfies(&Relation::new(key, Direction::Use, kind))
    }

    /// The diagnostic that caused this unit to contribute no relations, if
    /// any.
    pub fn parse_error(&self) -> Option<DiagBuilder2> {
        self.parse_error.borrow().clone()
    }

    /// The units this unit depends on, ordered by path.
    pub fn depends_on(&self) -> Vec<&'a SourceUnit<'a>> {
        self.depends_on.borrow().iter().cloned().collect()
    }

    /// The dependency level of this unit. `None` until solved.
    pub fn dep_level(&self) -> Option<usize> {
        self.dep_level.get()
    }

    pub(crate) fn clear_deps(&self) {
        self.depends_on.borrow_mut().clear();
        self.dep_level.set(None);
    }

    pub(crate) fn add_dep(&self, dep: &'a SourceUnit<'a>) {
        assert!(dep != self, "{} cannot depend on itself", self);
        self.depends_on.borrow_mut().insert(dep);
    }

    pub(crate) fn set_dep_level(&self, level: usize) {
        self.dep_level.set(Some(level));
    }

    /// Extract the relations of this unit unless that has already happened.
    ///
    /// Fails only if the file cannot be read. A file whose text cannot be
    /// scanned is reported through `sess` and yields no relations; the
    /// diagnostic remains available via `parse_error()`.
    pub fn parse_if_needed(&self, sess: &Session) -> DiagResult2<&[Relation]> {
        if let Some(rels) = self.relations.get() {
            return Ok(rels.as_slice());
        }
        let rels = self.parse(sess)?;
        Ok(self.relations.get_or_init(|| rels).as_slice())
    }

    fn parse(&self, sess: &Session) -> DiagResult2<Vec<Relation>> {
        if !self.is_hdl() {
            return Ok(Vec::new());
        }
        let path = self.path.to_str().ok_or_else(|| {
            DiagBuilder2::error(format!("path {} is not valid UTF-8", self.path.display()))
        })?;
        let source = get_source_manager()
            .open(path)
            .ok_or_else(|| DiagBuilder2::error(format!("cannot open source file `{}`", path)))?;
        let content = source.get_content().map_err(|e| {
            DiagBuilder2::error(format!("cannot read source file `{}`", path)).add_note(e.to_string())
        })?;
        let text = content.text();
        debug!("parsing {}", self);
        let result = match self.kind {
            FileKind::Vhdl => hdldeps_vhdl::extract_relations(source, &text, &self.library),
            FileKind::Verilog => {
                hdldeps_svlog::extract_relations(sess, source, &text, &self.include_dirs, false)
            }
            FileKind::SystemVerilog => {
                hdldeps_svlog::extract_relations(sess, source, &text, &self.include_dirs, true)
            }
            FileKind::Other => Ok(Vec::new()),
        };
        match result {
            Ok(rels) => {
                for rel in &rels {
                    trace!("{}: {}", self, rel);
                }
                Ok(rels)
            }
            Err(diag) => {
                sess.emit(diag.clone());
                *self.parse_error.borrow_mut() = Some(diag);
                Ok(Vec::new())
            }
        }
    }
}

impl<'a> PartialEq for SourceUnit<'a> {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl<'a> Eq for SourceUnit<'a> {}

impl<'a> PartialOrd for SourceUnit<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<'a> Ord for SourceUnit<'a> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.path.cmp(&other.path)
    }
}

impl<'a> Hash for SourceUnit<'a> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state)
    }
}

impl<'a> fmt::Display for SourceUnit<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

impl<'a> fmt::Debug for SourceUnit<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "SourceUnit({:?}, {})", self.kind, self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_from_extension() {
        assert_eq!(FileKind::from_path(Path::new("a.vhd")), FileKind::Vhdl);
        assert_eq!(FileKind::from_path(Path::new("a.VHDL")), FileKind::Vhdl);
        assert_eq!(FileKind::from_path(Path::new("a.v")), FileKind::Verilog);
        assert_eq!(FileKind::from_path(Path::new("a.svh")), FileKind::SystemVerilog);
        assert_eq!(FileKind::from_path(Path::new("a.xdc")), FileKind::Other);
        assert_eq!(FileKind::from_path(Path::new("Makefile")), FileKind::Other);
    }

    #[test]
    fn paths_are_normalized() {
        let u = SourceUnit::new("/proj/./rtl/../rtl/a.vhd");
        assert_eq!(u.path(), Path::new("/proj/rtl/a.vhd"));
        assert!(SourceUnit::new("b.v").path().is_absolute());
    }

    #[test]
    fn parse_is_memoized() {
        let sess = Session::new();
        get_source_manager().add("/virtual/srcfile/memo.vhd", "entity memo is end;");
        let u = SourceUnit::new("/virtual/srcfile/memo.vhd");
        assert!(!u.is_parsed());
        assert_eq!(u.parse_if_needed(&sess).unwrap().len(), 1);
        assert!(u.is_parsed());
        assert_eq!(u.parse_if_needed(&sess).unwrap().len(), 1);
        assert!(u.provides_key("work.memo", RelKind::Entity));
    }

    #[test]
    fn malformed_text_is_a_unit_error() {
        let sess = Session::new();
        get_source_manager().add("/virtual/srcfile/bad.vhd", "entity bad is \"oops\n end;");
        let u = SourceUnit::new("/virtual/srcfile/bad.vhd");
        assert!(u.parse_if_needed(&sess).unwrap().is_empty());
        assert!(u.parse_error().is_some());
        assert!(sess.failed());
    }

    #[test]
    fn unreadable_file_is_a_hard_error() {
        let sess = Session::new();
        let u = SourceUnit::new("/virtual/srcfile/does_not_exist.vhd");
        assert!(u.parse_if_needed(&sess).is_err());
        assert!(!u.is_parsed());
    }

    #[test]
    fn aux_files_have_no_relations() {
        let sess = Session::new();
        let u = SourceUnit::new("/nowhere/pins.xdc");
        assert!(!u.is_hdl());
        assert!(u.parse_if_needed(&sess).unwrap().is_empty());
    }
}
