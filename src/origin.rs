// Copyright (c) 2016-2021 Fabian Schuiki

//! Detection of the version control repository a directory was checked out
//! from.

use std::path::Path;
use std::process::{Command, Stdio};

/// Guess the remote URL of the repository that contains `dir`.
///
/// Git checkouts report their `origin` remote. Subversion working copies
/// report their repository root. Returns `None` if `dir` is not part of a
/// repository or the tools are unavailable.
pub fn guess_origin(dir: &Path) -> Option<String> {
    git_origin(dir).or_else(|| svn_origin(dir))
}

fn git_origin(dir: &Path) -> Option<String> {
    let out = run(dir, "git", &["config", "--get", "remote.origin.url"])?;
    let url = out.trim();
    if url.is_empty() {
        None
    } else {
        debug!("{} is a git checkout of {}", dir.display(), url);
        Some(url.to_string())
    }
}

fn svn_origin(dir: &Path) -> Option<String> {
    let out = run(dir, "svn", &["info"])?;
    let url = parse_svn_root(&out)?;
    debug!("{} is an svn checkout of {}", dir.display(), url);
    Some(url.to_string())
}

/// Extract the repository root from the output of `svn info`.
fn parse_svn_root(info: &str) -> Option<&str> {
    info.lines()
        .filter_map(|l| l.strip_prefix("Repository Root:"))
        .map(str::trim)
        .find(|url| !url.is_empty())
}

/// Run a command in `dir` and return its standard output if it succeeds.
fn run(dir: &Path, program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program)
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output();
    match output {
        Ok(o) if o.status.success() => Some(String::from_utf8_lossy(&o.stdout).into_owned()),
        Ok(o) => {
            trace!(
                "`{} {}` in {} exited with {}",
                program,
                args.join(" "),
                dir.display(),
                o.status
            );
            None
        }
        Err(e) => {
            trace!("cannot run `{}`: {}", program, e);
            None
        }
    }
}
