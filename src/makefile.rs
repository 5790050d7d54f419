// Copyright (c) 2016-2021 Fabian Schuiki

//! Makefile generation for simulation and synthesis tools.
//!
//! The writers receive the tool they generate for as a trait object, so any
//! tool in the [`ToolRegistry`](crate::tool::ToolRegistry) can be used.

use crate::common::errors::*;
use crate::fileset::Fileset;
use crate::srcfile::{FileKind, SourceUnit};
use crate::tool::{SimulationTool, SynthesisTool, SYNTHESIS_STAGES};
use std::collections::{BTreeMap, HashSet};
use std::fmt::{self, Write as FmtWrite};
use std::io::Write;
use std::path::{Path, PathBuf};

const HEADER: &str = "## Makefile generated by hdldeps. Do not edit.";

/// Write a simulation Makefile.
///
/// `ordered` holds the units to compile in dependency order, as produced by
/// [`topological_order`](crate::order::topological_order). Every HDL unit
/// gets a stamp file `<library>/.<stem>_<ext>` that is rebuilt whenever the
/// source or the stamp of one of its dependencies changes.
pub fn write_sim_makefile(
    out: &mut dyn Write,
    tool: &dyn SimulationTool,
    top: &str,
    ordered: &[&SourceUnit],
    include_dirs: &[String],
) -> DiagResult2<()> {
    let text = sim_makefile(tool, top, ordered, include_dirs)
        .map_err(|_| DiagBuilder2::bug("formatting simulation makefile failed"))?;
    emit(out, &text)?;
    info!("{} simulation makefile generated", tool.info().name);
    Ok(())
}

/// The stamp file that marks a unit as compiled.
pub fn stamp_path(unit: &SourceUnit) -> String {
    let path = unit.path();
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}/.{}_{}", unit.library(), stem, ext)
}

fn sim_makefile(
    tool: &dyn SimulationTool,
    top: &str,
    ordered: &[&SourceUnit],
    include_dirs: &[String],
) -> Result<String, fmt::Error> {
    let mut s = String::new();
    writeln!(s, "{}", HEADER)?;
    writeln!(s)?;
    writeln!(s, "TOP_MODULE := {}", top)?;
    for (name, value) in tool.variables() {
        writeln!(s, "{} := {}", name, value)?;
    }
    writeln!(s)?;

    let units: Vec<_> = ordered
        .iter()
        .filter(|u| u.is_hdl() && tool.accepts(u))
        .collect();
    let in_set: HashSet<&Path> = units.iter().map(|u| u.path()).collect();

    write!(s, "OBJS :=")?;
    for unit in &units {
        write!(s, " \\\n{}", stamp_path(unit))?;
    }
    writeln!(s)?;
    writeln!(s)?;

    writeln!(s, "simulation: prepare $(OBJS)")?;
    if let Some(cmd) = tool.elaborate_command() {
        writeln!(s, "\t\t{}", cmd)?;
    }
    writeln!(s)?;

    writeln!(s, "prepare:")?;
    for cmd in tool.prepare_commands(include_dirs) {
        writeln!(s, "\t\t{}", cmd)?;
    }
    writeln!(s)?;

    for unit in &units {
        write!(s, "{}: {}", stamp_path(unit), unit.path().display())?;
        let mut deps: Vec<_> = unit
            .depends_on()
            .into_iter()
            .filter(|d| in_set.contains(d.path()))
            .map(|d| stamp_path(d))
            .collect();
        deps.sort();
        deps.dedup();
        for dep in deps {
            write!(s, " \\\n{}", dep)?;
        }
        writeln!(s)?;
        writeln!(s, "\t\t@mkdir -p $(@D)")?;
        writeln!(s, "\t\t{}", tool.compile_command(unit))?;
        writeln!(s, "\t\t@touch $@")?;
        writeln!(s)?;
    }

    write_clean(&mut s, tool.clean_targets(), tool.mrproper_targets(), &[])?;
    writeln!(s, ".PHONY: mrproper clean simulation prepare")?;
    Ok(s)
}

/// The configuration of a synthesis run.
#[derive(Clone, Debug, Default)]
pub struct SynConfig {
    /// The top-level unit.
    pub top: String,
    pub device: String,
    pub grade: String,
    pub package: String,
    pub family: String,
    /// The project name. Defaults to the top-level unit.
    pub project: String,
    /// Directory the tool binary lives in. Empty to use `PATH`.
    pub tool_path: String,
    /// Directory that source paths are written relative to.
    pub base_dir: Option<PathBuf>,
    /// Commands run before and after each stage, keyed by stage name.
    pub pre_cmds: BTreeMap<String, String>,
    pub post_cmds: BTreeMap<String, String>,
}

impl SynConfig {
    /// Check that all mandatory fields are set.
    pub fn validate(&self) -> DiagResult2<()> {
        let missing: Vec<_> = [
            ("top", &self.top),
            ("device", &self.device),
            ("grade", &self.grade),
            ("package", &self.package),
        ]
        .iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(n, _)| *n)
        .collect();
        if missing.is_empty() {
            return Ok(());
        }
        let mut d = DiagBuilder2::error("incomplete synthesis configuration");
        for name in missing {
            d = d.add_note(format!("`{}` must be set", name));
        }
        Err(d)
    }

    fn project_name(&self) -> &str {
        let name = if self.project.is_empty() {
            self.top.as_str()
        } else {
            self.project.as_str()
        };
        match name.rfind('.') {
            Some(i) if i > 0 => &name[..i],
            _ => name,
        }
    }
}

/// Write a synthesis Makefile.
///
/// The Makefile generates `files.tcl`, which adds every source the tool
/// accepts to the project, and one Tcl script and target per synthesis stage
/// the tool supports. Each stage depends on the previous one.
pub fn write_syn_makefile(
    out: &mut dyn Write,
    tool: &dyn SynthesisTool,
    cfg: &SynConfig,
    fileset: &Fileset,
) -> DiagResult2<()> {
    cfg.validate()?;
    let text = syn_makefile(tool, cfg, fileset)
        .map_err(|_| DiagBuilder2::bug("formatting synthesis makefile failed"))?;
    emit(out, &text)?;
    info!("{} synthesis makefile generated", tool.info().name);
    Ok(())
}

/// The name under which files of a kind are grouped in the Makefile.
fn source_group(unit: &SourceUnit) -> String {
    match unit.kind() {
        FileKind::Vhdl => "VHDL".to_string(),
        FileKind::Verilog => "VERILOG".to_string(),
        FileKind::SystemVerilog => "SV".to_string(),
        FileKind::Other => unit
            .path()
            .extension()
            .map(|e| e.to_string_lossy().to_uppercase())
            .unwrap_or_else(|| "OTHER".to_string()),
    }
}

fn syn_makefile(
    tool: &dyn SynthesisTool,
    cfg: &SynConfig,
    fileset: &Fileset,
) -> Result<String, fmt::Error> {
    let mut s = String::new();
    writeln!(s, "{}", HEADER)?;
    writeln!(s)?;
    writeln!(s, "TOP_MODULE := {}", cfg.top)?;
    writeln!(s, "PWD := $(shell pwd)")?;
    writeln!(s, "PROJECT := {}", cfg.project_name())?;
    writeln!(s, "PROJECT_FILE := $(PROJECT).{}", tool.project_ext())?;
    writeln!(s, "TOOL_PATH := {}", cfg.tool_path)?;
    writeln!(s, "TCL_INTERPRETER := {}", tool.binary())?;
    writeln!(s, "ifneq ($(strip $(TOOL_PATH)),)")?;
    writeln!(s, "TCL_INTERPRETER := $(TOOL_PATH)/$(TCL_INTERPRETER)")?;
    writeln!(s, "endif")?;
    writeln!(s)?;
    writeln!(s, "SYN_FAMILY := {}", cfg.family)?;
    writeln!(s, "SYN_DEVICE := {}", cfg.device)?;
    writeln!(s, "SYN_PACKAGE := {}", cfg.package)?;
    writeln!(s, "SYN_GRADE := {}", cfg.grade)?;
    writeln!(s)?;

    for name in &["create", "open", "save", "close"] {
        if let Some(cmd) = tool.tcl_control(name) {
            writeln!(s, "TCL_{} := {}", name.to_uppercase(), cmd)?;
        }
    }
    writeln!(s, "ifneq ($(wildcard $(PROJECT_FILE)),)")?;
    writeln!(s, "TCL_CREATE := $(TCL_OPEN)")?;
    writeln!(s, "endif")?;
    writeln!(s)?;

    writeln!(s, "all: bitstream")?;
    writeln!(s)?;

    // Group the accepted sources by kind, keeping fileset order in each.
    let mut groups: BTreeMap<String, (FileKind, Vec<String>)> = BTreeMap::new();
    for unit in fileset.iter().filter(|u| tool.accepts(u)) {
        let path = match cfg.base_dir {
            Some(ref base) => crate::common::util::relpath(unit.path(), base),
            None => unit.path().to_path_buf(),
        };
        groups
            .entry(source_group(unit))
            .or_insert_with(|| (unit.kind(), vec![]))
            .1
            .push(path.to_string_lossy().replace('\\', "/"));
    }
    for (name, (_, files)) in &groups {
        writeln!(s, "SOURCES_{} := \\\n{}", name, files.join(" \\\n"))?;
        writeln!(s)?;
    }
    writeln!(s, "files.tcl:")?;
    for (name, (kind, _)) in &groups {
        writeln!(
            s,
            "\t\t@$(foreach sourcefile, $(SOURCES_{}), echo \"{}\" >> $@ &)",
            name,
            tool.add_file_command(*kind)
        )?;
    }
    writeln!(s)?;

    let stages: Vec<_> = SYNTHESIS_STAGES
        .iter()
        .filter_map(|st| tool.tcl_control(st).map(|cmd| (*st, cmd)))
        .collect();
    for (stage, _) in &stages {
        let upper = stage.to_uppercase();
        let pre = cfg.pre_cmds.get(*stage).map(String::as_str).unwrap_or("");
        let post = cfg.post_cmds.get(*stage).map(String::as_str).unwrap_or("");
        writeln!(s, "SYN_PRE_{}_CMD := {}", upper, pre)?;
        writeln!(s, "SYN_POST_{}_CMD := {}", upper, post)?;
    }
    writeln!(s)?;

    let mut previous = "files.tcl";
    for (stage, cmd) in &stages {
        writeln!(s, "{}.tcl:", stage)?;
        for line in cmd.lines() {
            writeln!(s, "\t\techo {} >> $@", line.trim())?;
        }
        writeln!(s)?;
        writeln!(s, "{0}: {1} {0}.tcl", stage, previous)?;
        writeln!(s, "\t\t$(SYN_PRE_{}_CMD)", stage.to_uppercase())?;
        writeln!(s, "\t\t$(TCL_INTERPRETER) $@.tcl")?;
        writeln!(s, "\t\t$(SYN_POST_{}_CMD)", stage.to_uppercase())?;
        writeln!(s, "\t\ttouch $@")?;
        writeln!(s)?;
        previous = *stage;
    }

    let mut generated: Vec<String> = stages.iter().map(|(st, _)| st.to_string()).collect();
    generated.extend(stages.iter().map(|(st, _)| format!("{}.tcl", st)));
    generated.push("files.tcl".to_string());
    write_clean(
        &mut s,
        tool.clean_targets(),
        tool.mrproper_targets(),
        &generated,
    )?;
    writeln!(s, ".PHONY: mrproper clean all")?;
    Ok(s)
}

fn write_clean(
    s: &mut String,
    clean: &[&str],
    mrproper: &[&str],
    generated: &[String],
) -> fmt::Result {
    writeln!(s, "clean:")?;
    if !clean.is_empty() {
        writeln!(s, "\t\trm -rf {}", clean.join(" "))?;
    }
    if !generated.is_empty() {
        writeln!(s, "\t\trm -rf {}", generated.join(" "))?;
    }
    writeln!(s)?;
    writeln!(s, "mrproper: clean")?;
    if !mrproper.is_empty() {
        writeln!(s, "\t\trm -rf {}", mrproper.join(" "))?;
    }
    writeln!(s)?;
    Ok(())
}

fn emit(out: &mut dyn Write, text: &str) -> DiagResult2<()> {
    out.write_all(text.as_bytes())
        .and_then(|_| out.flush())
        .map_err(|e| DiagBuilder2::fatal(format!("cannot write makefile: {}", e)))
}
