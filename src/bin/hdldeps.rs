// Copyright (c) 2016-2021 Fabian Schuiki

//! A dependency resolver for hardware description language projects.

#[macro_use]
extern crate log;

use clap::{App, Arg, ArgMatches};
use hdldeps::errors::*;
use hdldeps::makefile::{write_sim_makefile, write_syn_makefile, SynConfig};
use hdldeps::origin::guess_origin;
use hdldeps::tool::{ToolId, ToolRegistry};
use hdldeps::util::{rel2abs, relpath};
use hdldeps::*;
use log::LevelFilter;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

fn main() {
    let tool_names: Vec<_> = ToolId::all().iter().map(|id| id.as_str()).collect();
    let matches = App::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about("A dependency resolver for hardware description languages.")
        .arg(
            Arg::with_name("verbosity")
                .short("v")
                .multiple(true)
                .help("Increase message verbosity"),
        )
        .arg(
            Arg::with_name("quiet")
                .short("q")
                .help("Silence all output"),
        )
        .arg(
            Arg::with_name("inc")
                .short("I")
                .value_name("DIR")
                .help("Add a search path for Verilog includes")
                .multiple(true)
                .takes_value(true)
                .number_of_values(1),
        )
        .arg(
            Arg::with_name("lib")
                .short("l")
                .long("lib")
                .value_name("LIB")
                .help("Name of the library the input files belong to")
                .takes_value(true)
                .number_of_values(1),
        )
        .arg(
            Arg::with_name("top")
                .long("top")
                .value_name("UNIT")
                .help("Only keep the files the given entity or module needs")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("reverse")
                .long("reverse")
                .help("List dependent files before their dependencies"),
        )
        .arg(
            Arg::with_name("std_lib")
                .long("std-lib")
                .value_name("LIB")
                .help("Treat a library as provided by the tools")
                .multiple(true)
                .takes_value(true)
                .number_of_values(1),
        )
        .arg(
            Arg::with_name("tool")
                .long("tool")
                .value_name("TOOL")
                .help("The simulation or synthesis tool to target")
                .takes_value(true)
                .possible_values(&tool_names),
        )
        .arg(
            Arg::with_name("makefile")
                .long("makefile")
                .value_name("FILE")
                .help("Write a Makefile for the selected tool")
                .takes_value(true)
                .requires("tool"),
        )
        .arg(
            Arg::with_name("dump_rels")
                .long("dump-rels")
                .help("Print the relations of every input file"),
        )
        .arg(
            Arg::with_name("syn_device")
                .long("syn-device")
                .value_name("DEVICE")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("syn_grade")
                .long("syn-grade")
                .value_name("GRADE")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("syn_package")
                .long("syn-package")
                .value_name("PACKAGE")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("syn_family")
                .long("syn-family")
                .value_name("FAMILY")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("syn_project")
                .long("syn-project")
                .value_name("NAME")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("INPUT")
                .help("The source files of the design")
                .multiple(true)
                .required(true),
        )
        .get_matches();

    // Configure the logger.
    let level = if matches.is_present("quiet") {
        LevelFilter::Off
    } else {
        match matches.occurrences_of("verbosity") {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };
    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();

    // Configure the session.
    let registry = ToolRegistry::new();
    let tool = matches.value_of("tool").map(|t| {
        t.parse::<ToolId>().unwrap_or_else(|e| {
            clap::Error::with_description(&e, clap::ErrorKind::InvalidValue).exit()
        })
    });
    let mut sess = Session::new();
    sess.opts.standard_libs = DEFAULT_STANDARD_LIBS.iter().map(|s| s.to_string()).collect();
    if let Some(t) = tool.and_then(|id| registry.get(id)) {
        sess.opts
            .standard_libs
            .extend(t.standard_libs().iter().map(|s| s.to_string()));
    }
    if let Some(libs) = matches.values_of("std_lib") {
        sess.opts.standard_libs.extend(libs.map(String::from));
    }
    sess.opts.standard_libs.sort();
    sess.opts.standard_libs.dedup();

    // Diagnostics emitted along the way, such as a missing top unit or a
    // file that cannot be scanned, leave the exit code alone. Only errors
    // that abort the run fail it.
    if let Err(diag) = run(&sess, &matches, &registry, tool) {
        sess.emit(diag);
        std::process::exit(1);
    }
}

fn run(
    sess: &Session,
    matches: &ArgMatches,
    registry: &ToolRegistry,
    tool: Option<ToolId>,
) -> DiagResult2<()> {
    let cwd = std::env::current_dir()
        .map_err(|e| DiagBuilder2::fatal(format!("cannot determine working directory: {}", e)))?;
    if let Some(url) = guess_origin(&cwd) {
        info!("working in a checkout of {}", url);
    }

    let include_dirs: Vec<PathBuf> = matches
        .values_of("inc")
        .into_iter()
        .flatten()
        .map(|d| rel2abs(Path::new(d), &cwd))
        .collect();
    let lib = matches.value_of("lib").unwrap_or("work");

    // Assemble the fileset.
    let arenas = Arenas::new();
    let mut fileset = Fileset::new();
    for input in matches.values_of("INPUT").into_iter().flatten() {
        let unit = SourceUnit::new(rel2abs(Path::new(input), &cwd))
            .with_library(lib)
            .with_include_dirs(include_dirs.clone());
        let unit = arenas.alloc_unit(unit);
        if !fileset.add(unit) {
            warn!("{} given more than once", unit);
        }
    }

    let unsatisfied = solve(sess, &fileset)?;
    debug!("{} unsatisfied relations", unsatisfied);

    if matches.is_present("dump_rels") {
        for unit in fileset.dep_units().iter() {
            println!("{}:", relpath(unit.path(), &cwd).display());
            for rel in unit.relations() {
                println!("    {}", rel);
            }
        }
    }

    let selected = match matches.value_of("top") {
        Some(top) => build_set(sess, &fileset, top),
        None => fileset.clone(),
    };
    let order = topological_order(&selected, matches.is_present("reverse"));

    let path = match matches.value_of("makefile") {
        Some(p) => p,
        None => {
            if !matches.is_present("dump_rels") {
                for unit in &order {
                    println!("{}", relpath(unit.path(), &cwd).display());
                }
            }
            return Ok(());
        }
    };

    let id = match tool {
        Some(id) => id,
        None => return Err(DiagBuilder2::error("writing a makefile requires `--tool`")),
    };
    let file = File::create(path)
        .map_err(|e| DiagBuilder2::fatal(format!("cannot create `{}`: {}", path, e)))?;
    let mut out = BufWriter::new(file);

    if let Some(sim) = registry.simulator(id) {
        let top = matches.value_of("top").unwrap_or("");
        let incs: Vec<String> = include_dirs
            .iter()
            .map(|d| relpath(d, &cwd).to_string_lossy().into_owned())
            .collect();
        write_sim_makefile(&mut out, sim, top, &order, &incs)
    } else if let Some(syn) = registry.synthesizer(id) {
        let value = |name: &str| matches.value_of(name).unwrap_or("").to_string();
        let cfg = SynConfig {
            top: value("top"),
            device: value("syn_device"),
            grade: value("syn_grade"),
            package: value("syn_package"),
            family: value("syn_family"),
            project: value("syn_project"),
            base_dir: Some(cwd.clone()),
            ..Default::default()
        };
        write_syn_makefile(&mut out, syn, &cfg, &selected)
    } else {
        Err(DiagBuilder2::bug(format!("tool `{}` is not registered", id)))
    }
}
