// Copyright (c) 2016-2021 Fabian Schuiki

//! This crate contains the fundamental utilities used by the rest of the
//! hdldeps dependency resolver.

#[macro_use]
extern crate log;

pub mod errors;
pub mod rel;
pub mod source;
pub mod util;

use crate::errors::{DiagBuilder2, DiagEmitter, Severity};
use std::cell::{Cell, RefCell};

/// The libraries every VHDL tool ships with. Relations into these are never
/// expected to be satisfied by a source file.
pub const DEFAULT_STANDARD_LIBS: &[&str] = &["std", "ieee"];

/// A resolution session. Carries the options of the run and collects the
/// diagnostics emitted during processing.
pub struct Session {
    pub opts: SessionOptions,
    /// Whether any error diagnostics were produced.
    failed: Cell<bool>,
    /// All diagnostics emitted so far, in emission order.
    diags: RefCell<Vec<DiagBuilder2>>,
}

impl Session {
    /// Create a new session.
    pub fn new() -> Session {
        Session {
            opts: Default::default(),
            failed: Cell::new(false),
            diags: RefCell::new(Vec::new()),
        }
    }

    /// Check whether we have emitted a diagnostic with `Error` severity or
    /// worse.
    pub fn failed(&self) -> bool {
        self.failed.get()
    }

    /// A snapshot of the diagnostics emitted so far.
    pub fn diagnostics(&self) -> Vec<DiagBuilder2> {
        self.diags.borrow().clone()
    }

    /// Count the emitted diagnostics of a given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.diags
            .borrow()
            .iter()
            .filter(|d| d.get_severity() == severity)
            .count()
    }

    /// Forget all diagnostics collected so far.
    pub fn clear_diagnostics(&self) {
        self.diags.borrow_mut().clear();
        self.failed.set(false);
    }

    /// Check whether a library is considered a standard library that is
    /// provided by the tools rather than by a source file.
    pub fn is_standard_lib(&self, lib: &str) -> bool {
        self.opts
            .standard_libs
            .iter()
            .any(|l| l.eq_ignore_ascii_case(lib))
    }
}

impl Default for Session {
    fn default() -> Session {
        Session::new()
    }
}

impl DiagEmitter for Session {
    fn emit(&self, diag: DiagBuilder2) {
        let sev = diag.get_severity();
        if sev >= Severity::Error {
            self.failed.set(true);
        }
        match sev {
            Severity::Note => info!("{}", diag),
            Severity::Warning => warn!("{}", diag),
            _ => error!("{}", diag),
        }
        self.diags.borrow_mut().push(diag);
    }
}

/// Run-wide options of a session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Libraries whose units are provided by the tools. Use relations into
    /// them are not matched against the fileset.
    pub standard_libs: Vec<String>,
}

impl Default for SessionOptions {
    fn default() -> SessionOptions {
        SessionOptions {
            standard_libs: Vec::new(),
        }
    }
}
