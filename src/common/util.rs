// Copyright (c) 2016-2021 Fabian Schuiki

//! Path manipulation helpers. All of these work lexically and never touch the
//! file system, so symbolic links are not resolved.

use std::path::{Component, Path, PathBuf};

/// Lexically normalize a path by dropping `.` components and resolving `..`
/// against the preceding component.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => (),
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `/..` is `/`.
                Some(Component::RootDir) | Some(Component::Prefix(_)) => (),
                _ => out.push(".."),
            },
            c => out.push(c.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Convert a possibly relative path to an absolute one by joining it onto
/// `base`. Absolute paths are only normalized.
pub fn rel2abs(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&base.join(path))
    }
}

/// Compute the path of `path` relative to `base`. Both paths should be
/// absolute. Returns `.` if they are equal.
pub fn relpath(path: &Path, base: &Path) -> PathBuf {
    let path = normalize(path);
    let base = normalize(base);
    let mut pc = path.components().peekable();
    let mut bc = base.components().peekable();
    while let (Some(a), Some(b)) = (pc.peek(), bc.peek()) {
        if a != b {
            break;
        }
        pc.next();
        bc.next();
    }
    let mut out = PathBuf::new();
    for _ in bc {
        out.push("..");
    }
    for c in pc {
        out.push(c.as_os_str());
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Extract the repository name from a version control URL, dropping a
/// trailing `.git` or `/`.
pub fn url_basename(url: &str) -> &str {
    let url = url.trim_end_matches('/');
    let url = url.strip_suffix(".git").unwrap_or(url);
    match url.rfind('/') {
        Some(i) => &url[i + 1..],
        None => url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_paths() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(normalize(Path::new("a/../../b")), PathBuf::from("../b"));
        assert_eq!(normalize(Path::new("./")), PathBuf::from("."));
    }

    #[test]
    fn absolute_paths() {
        let base = Path::new("/home/user/proj");
        assert_eq!(
            rel2abs(Path::new("../ip/a.vhd"), base),
            PathBuf::from("/home/user/ip/a.vhd")
        );
        assert_eq!(rel2abs(Path::new("/x/y.v"), base), PathBuf::from("/x/y.v"));
    }

    #[test]
    fn relative_paths() {
        assert_eq!(
            relpath(Path::new("/a/b/c.vhd"), Path::new("/a/d")),
            PathBuf::from("../b/c.vhd")
        );
        assert_eq!(relpath(Path::new("/a/b"), Path::new("/a/b")), PathBuf::from("."));
    }

    #[test]
    fn url_basenames() {
        assert_eq!(url_basename("https://host/group/core.git"), "core");
        assert_eq!(url_basename("https://host/svn/core/"), "core");
        assert_eq!(url_basename("core"), "core");
    }
}
