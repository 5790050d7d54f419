// Copyright (c) 2016-2021 Fabian Schuiki

//! Descriptions of the simulation and synthesis tools Makefiles can be
//! generated for.

use crate::srcfile::{FileKind, SourceUnit};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The tools known to hdldeps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ToolId {
    Iverilog,
    Modelsim,
    Vivado,
}

impl ToolId {
    pub fn as_str(self) -> &'static str {
        match self {
            ToolId::Iverilog => "iverilog",
            ToolId::Modelsim => "modelsim",
            ToolId::Vivado => "vivado",
        }
    }

    pub fn all() -> &'static [ToolId] {
        &[ToolId::Iverilog, ToolId::Modelsim, ToolId::Vivado]
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ToolId {
    type Err = String;

    fn from_str(s: &str) -> Result<ToolId, String> {
        ToolId::all()
            .iter()
            .cloned()
            .find(|id| id.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let names: Vec<_> = ToolId::all().iter().map(|id| id.as_str()).collect();
                format!("unknown tool `{}`, expected one of {}", s, names.join(", "))
            })
    }
}

/// The identity of a tool.
#[derive(Debug)]
pub struct ToolInfo {
    /// Human-readable name.
    pub name: &'static str,
    pub id: ToolId,
    pub windows_bin: &'static str,
    pub linux_bin: &'static str,
}

/// Properties common to all tools.
pub trait Tool {
    fn info(&self) -> &ToolInfo;

    /// Libraries that ship with the tool.
    fn standard_libs(&self) -> &[&'static str];

    /// Files removed by the `clean` target.
    fn clean_targets(&self) -> &[&'static str];

    /// Files removed by the `mrproper` target in addition to `clean`.
    fn mrproper_targets(&self) -> &[&'static str];

    /// The kinds of HDL files the tool consumes.
    fn hdl_kinds(&self) -> &[FileKind] {
        &[FileKind::Vhdl, FileKind::Verilog, FileKind::SystemVerilog]
    }

    /// Extensions of auxiliary files the tool consumes, such as constraints.
    fn aux_extensions(&self) -> &[&'static str] {
        &[]
    }

    /// The binary to invoke the tool with on the host platform.
    fn binary(&self) -> &'static str {
        if cfg!(windows) {
            self.info().windows_bin
        } else {
            self.info().linux_bin
        }
    }

    /// Whether the tool consumes a given unit.
    fn accepts(&self, unit: &SourceUnit) -> bool {
        if unit.is_hdl() {
            return self.hdl_kinds().contains(&unit.kind());
        }
        match unit.path().extension().and_then(|e| e.to_str()) {
            Some(ext) => self
                .aux_extensions()
                .iter()
                .any(|a| a.eq_ignore_ascii_case(ext)),
            None => false,
        }
    }
}

/// A tool that simulates designs.
pub trait SimulationTool: Tool + AsTool {
    /// The command that compiles a single unit. `$<` is the source file.
    fn compile_command(&self, unit: &SourceUnit) -> String;

    /// The commands that prepare the build directory, given the include
    /// search paths.
    fn prepare_commands(&self, include_dirs: &[String]) -> Vec<String>;

    /// The command that elaborates the design after all units have been
    /// compiled, if any.
    fn elaborate_command(&self) -> Option<&'static str>;

    /// Makefile variables the commands refer to.
    fn variables(&self) -> &[(&'static str, &'static str)] {
        &[]
    }
}

/// A tool that synthesizes designs into a bitstream by running Tcl scripts.
pub trait SynthesisTool: Tool + AsTool {
    /// Extension of the tool's project file.
    fn project_ext(&self) -> &'static str;

    /// The Tcl commands for a named control. Controls are `create`, `open`,
    /// `save`, and `close` for project handling, and the build stages
    /// `project`, `synthesize`, `translate`, `map`, `par`, and `bitstream`.
    /// Multiple commands are separated by newlines.
    fn tcl_control(&self, name: &str) -> Option<&'static str>;

    /// The Tcl command that adds a source file `$(sourcefile)` of the given
    /// kind to the project.
    fn add_file_command(&self, kind: FileKind) -> &'static str;
}

/// The stages of a synthesis run, in order.
pub const SYNTHESIS_STAGES: &[&str] =
    &["project", "synthesize", "translate", "map", "par", "bitstream"];

/// Icarus Verilog.
pub struct Iverilog {
    info: ToolInfo,
}

impl Iverilog {
    pub fn new() -> Iverilog {
        Iverilog {
            info: ToolInfo {
                name: "Icarus Verilog",
                id: ToolId::Iverilog,
                windows_bin: "iverilog",
                linux_bin: "iverilog",
            },
        }
    }
}

impl Tool for Iverilog {
    fn info(&self) -> &ToolInfo {
        &self.info
    }

    fn standard_libs(&self) -> &[&'static str] {
        &["std", "ieee", "ieee_proposed", "vl", "synopsys"]
    }

    fn clean_targets(&self) -> &[&'static str] {
        &["run.command", "ivl_vhdl_work", "work"]
    }

    fn mrproper_targets(&self) -> &[&'static str] {
        &["*.vcd", "*.vvp"]
    }
}

impl SimulationTool for Iverilog {
    fn compile_command(&self, _unit: &SourceUnit) -> String {
        "echo $< >> run.command".to_string()
    }

    fn prepare_commands(&self, include_dirs: &[String]) -> Vec<String> {
        let mut cmds =
            vec!["echo \"# IVerilog command file, generated by hdldeps\" > run.command".to_string()];
        for dir in include_dirs {
            cmds.push(format!("echo \"+incdir+{}\" >> run.command", dir));
        }
        cmds
    }

    fn elaborate_command(&self) -> Option<&'static str> {
        Some("iverilog $(IVERILOG_OPT) -s $(TOP_MODULE) -o $(TOP_MODULE).vvp -c run.command")
    }

    fn variables(&self) -> &[(&'static str, &'static str)] {
        &[("IVERILOG_OPT", "")]
    }
}

/// Mentor Modelsim.
pub struct Modelsim {
    info: ToolInfo,
}

impl Modelsim {
    pub fn new() -> Modelsim {
        Modelsim {
            info: ToolInfo {
                name: "Modelsim",
                id: ToolId::Modelsim,
                windows_bin: "vsim.exe",
                linux_bin: "vsim",
            },
        }
    }
}

impl Tool for Modelsim {
    fn info(&self) -> &ToolInfo {
        &self.info
    }

    fn standard_libs(&self) -> &[&'static str] {
        &["ieee", "std", "altera_mf"]
    }

    fn clean_targets(&self) -> &[&'static str] {
        &["modelsim.ini", "transcript"]
    }

    fn mrproper_targets(&self) -> &[&'static str] {
        &["*.vcd", "*.wlf"]
    }
}

impl SimulationTool for Modelsim {
    fn compile_command(&self, unit: &SourceUnit) -> String {
        match unit.kind() {
            FileKind::Vhdl => format!("vcom $(VCOM_OPT) -work {} $<", unit.library()),
            FileKind::SystemVerilog => format!("vlog -sv $(VLOG_OPT) -work {} $<", unit.library()),
            _ => format!("vlog $(VLOG_OPT) -work {} $<", unit.library()),
        }
    }

    fn prepare_commands(&self, include_dirs: &[String]) -> Vec<String> {
        let mut cmds = vec!["vlib work".to_string(), "vmap work work".to_string()];
        if !include_dirs.is_empty() {
            let incs: Vec<_> = include_dirs.iter().map(|d| format!("+incdir+{}", d)).collect();
            cmds.push(format!("echo \"{}\" > vlog.opt", incs.join(" ")));
        }
        cmds
    }

    fn elaborate_command(&self) -> Option<&'static str> {
        None
    }

    fn variables(&self) -> &[(&'static str, &'static str)] {
        &[
            ("VCOM_OPT", "-quiet -modelsimini modelsim.ini"),
            ("VLOG_OPT", "-quiet -modelsimini modelsim.ini"),
        ]
    }
}

/// Xilinx Vivado.
pub struct Vivado {
    info: ToolInfo,
}

impl Vivado {
    pub fn new() -> Vivado {
        Vivado {
            info: ToolInfo {
                name: "Xilinx Vivado",
                id: ToolId::Vivado,
                windows_bin: "vivado -mode tcl -source",
                linux_bin: "vivado -mode tcl -source",
            },
        }
    }
}

impl Tool for Vivado {
    fn info(&self) -> &ToolInfo {
        &self.info
    }

    fn standard_libs(&self) -> &[&'static str] {
        &["ieee", "std", "unisim", "xpm"]
    }

    fn clean_targets(&self) -> &[&'static str] {
        &[
            ".Xil",
            "*.jou",
            "*.log",
            "*.pb",
            "$(PROJECT).cache",
            "$(PROJECT).data",
            "$(PROJECT).runs",
            "$(PROJECT).hw",
            "$(PROJECT_FILE)",
        ]
    }

    fn mrproper_targets(&self) -> &[&'static str] {
        &["*.bit", "*.bin"]
    }

    fn aux_extensions(&self) -> &[&'static str] {
        &["xdc", "xci", "tcl", "bd"]
    }
}

impl SynthesisTool for Vivado {
    fn project_ext(&self) -> &'static str {
        "xpr"
    }

    fn tcl_control(&self, name: &str) -> Option<&'static str> {
        Some(match name {
            "create" => "create_project $(PROJECT) ./",
            "open" => "open_project $(PROJECT_FILE)",
            "save" => "",
            "close" => "exit",
            "project" => {
                "$(TCL_CREATE)\n\
                 set_property part $(SYN_DEVICE)$(SYN_PACKAGE)$(SYN_GRADE) [current_project]\n\
                 source files.tcl\n\
                 set_property top $(TOP_MODULE) [current_fileset]\n\
                 update_compile_order -fileset sources_1\n\
                 $(TCL_CLOSE)"
            }
            "synthesize" => {
                "$(TCL_OPEN)\n\
                 reset_run synth_1\n\
                 launch_runs synth_1\n\
                 wait_on_run synth_1\n\
                 $(TCL_CLOSE)"
            }
            "par" => {
                "$(TCL_OPEN)\n\
                 reset_run impl_1\n\
                 launch_runs impl_1\n\
                 wait_on_run impl_1\n\
                 $(TCL_CLOSE)"
            }
            "bitstream" => {
                "$(TCL_OPEN)\n\
                 launch_runs impl_1 -to_step write_bitstream\n\
                 wait_on_run impl_1\n\
                 $(TCL_CLOSE)"
            }
            _ => return None,
        })
    }

    fn add_file_command(&self, _kind: FileKind) -> &'static str {
        "add_files -norecurse $(sourcefile)"
    }
}

/// The set of available tools.
pub struct ToolRegistry {
    simulators: BTreeMap<ToolId, Box<dyn SimulationTool>>,
    synthesizers: BTreeMap<ToolId, Box<dyn SynthesisTool>>,
}

impl ToolRegistry {
    /// Create a registry with all built-in tools.
    pub fn new() -> ToolRegistry {
        let mut reg = ToolRegistry {
            simulators: BTreeMap::new(),
            synthesizers: BTreeMap::new(),
        };
        reg.add_simulator(Box::new(Iverilog::new()));
        reg.add_simulator(Box::new(Modelsim::new()));
        reg.add_synthesizer(Box::new(Vivado::new()));
        reg
    }

    pub fn add_simulator(&mut self, tool: Box<dyn SimulationTool>) {
        self.simulators.insert(tool.info().id, tool);
    }

    pub fn add_synthesizer(&mut self, tool: Box<dyn SynthesisTool>) {
        self.synthesizers.insert(tool.info().id, tool);
    }

    pub fn simulator(&self, id: ToolId) -> Option<&dyn SimulationTool> {
        self.simulators.get(&id).map(|t| t.as_ref())
    }

    pub fn synthesizer(&self, id: ToolId) -> Option<&dyn SynthesisTool> {
        self.synthesizers.get(&id).map(|t| t.as_ref())
    }

    /// Look up a tool regardless of its purpose.
    pub fn get(&self, id: ToolId) -> Option<&dyn Tool> {
        if let Some(t) = self.simulators.get(&id) {
            return Some(t.as_tool());
        }
        self.synthesizers.get(&id).map(|t| t.as_tool())
    }
}

impl Default for ToolRegistry {
    fn default() -> ToolRegistry {
        ToolRegistry::new()
    }
}

/// Access to the common tool interface of a simulation or synthesis tool.
pub trait AsTool {
    fn as_tool(&self) -> &dyn Tool;
}

impl<T: Tool> AsTool for T {
    fn as_tool(&self) -> &dyn Tool {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_ids() {
        assert_eq!("iverilog".parse::<ToolId>(), Ok(ToolId::Iverilog));
        assert_eq!("Vivado".parse::<ToolId>(), Ok(ToolId::Vivado));
        assert!("ghdl".parse::<ToolId>().is_err());
        assert_eq!(ToolId::Modelsim.to_string(), "modelsim");
    }

    #[test]
    fn registry_lookup() {
        let reg = ToolRegistry::new();
        assert!(reg.simulator(ToolId::Iverilog).is_some());
        assert!(reg.simulator(ToolId::Vivado).is_none());
        assert_eq!(reg.synthesizer(ToolId::Vivado).unwrap().project_ext(), "xpr");
        assert_eq!(reg.get(ToolId::Modelsim).unwrap().info().name, "Modelsim");
        assert_eq!(reg.get(ToolId::Vivado).unwrap().binary(), "vivado -mode tcl -source");
    }

    #[test]
    fn accepted_files() {
        let vivado = Vivado::new();
        assert!(vivado.accepts(&SourceUnit::new("/p/top.vhd")));
        assert!(vivado.accepts(&SourceUnit::new("/p/pins.XDC")));
        assert!(!vivado.accepts(&SourceUnit::new("/p/notes.txt")));
        assert!(!Iverilog::new().accepts(&SourceUnit::new("/p/pins.xdc")));
    }

    #[test]
    fn modelsim_compiles_into_library() {
        let unit = SourceUnit::new("/p/a.vhd").with_library("mylib");
        assert_eq!(
            Modelsim::new().compile_command(&unit),
            "vcom $(VCOM_OPT) -work mylib $<"
        );
    }
}
