// Copyright (c) 2016-2021 Fabian Schuiki

//! The per-thread table of source files. Files are identified by a small
//! `Source` id, which keeps spans in tokens and diagnostics cheap to copy.
//! Virtual files registered with `add()` shadow files on disk.

use memmap2::Mmap;
use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;
use std::rc::Rc;

pub const INVALID_SOURCE: Source = Source(0);

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Source(pub u32);

impl Source {
    /// Return the path of this source file.
    pub fn get_path(self) -> Rc<str> {
        get_source_manager().with(self, |x| x.get_path())
    }

    /// Access the contents of this source file.
    ///
    /// Files on disk are mapped into memory upon the first call. Fails if the
    /// file cannot be read.
    pub fn get_content(self) -> io::Result<Rc<dyn SourceContent>> {
        get_source_manager().with(self, |x| x.get_content())
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0 > 0 {
            write!(f, "Source({}; \"{}\")", self.0, self.get_path())
        } else {
            write!(f, "Source(INVALID)")
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.get_path(), f)
    }
}

pub trait SourceFile {
    fn get_path(&self) -> Rc<str>;

    /// Obtain the content of this source file.
    fn get_content(&self) -> io::Result<Rc<dyn SourceContent>>;
}

pub trait SourceContent {
    /// Obtain a slice over all bytes within the source file. This is the
    /// fastest way of getting at the file's contents, since no parsing or
    /// character encoding is performed or assumed.
    fn bytes(&self) -> &[u8];

    /// Obtain the content as text. Invalid UTF-8 sequences are replaced, which
    /// is good enough for the scanners since all keywords and identifiers they
    /// care about are ASCII.
    fn text(&self) -> Cow<str> {
        String::from_utf8_lossy(self.bytes())
    }
}

/// A manager for source files and their assigned IDs.
pub struct SourceManager {
    map: RefCell<HashMap<Rc<str>, Source>>,
    vect: RefCell<Vec<Box<dyn SourceFile>>>,
}

impl SourceManager {
    fn new() -> SourceManager {
        SourceManager {
            map: RefCell::new(HashMap::new()),
            vect: RefCell::new(Vec::new()),
        }
    }

    /// Obtain the source file for a given source ID.
    pub fn with<F, R>(&self, id: Source, f: F) -> R
    where
        F: FnOnce(&dyn SourceFile) -> R,
    {
        let vect = self.vect.borrow();
        assert!(id.0 > 0, "invalid source");
        assert!(
            (id.0 as usize - 1) < vect.len(),
            "unknown source file: Source({}) >= {}",
            id.0,
            vect.len()
        );
        f(&*vect[id.0 as usize - 1])
    }

    /// Look up a previously opened or added file.
    pub fn find(&self, filename: &str) -> Option<Source> {
        self.map.borrow().get(filename).cloned()
    }

    /// Open a file. Virtual files added via `add()` take precedence over the
    /// file system. Returns `None` if no such file exists.
    pub fn open(&self, filename: &str) -> Option<Source> {
        // Check if the file has already been opened and return its pointer.
        let mut map = self.map.borrow_mut();
        if let Some(&id) = map.get(filename) {
            return Some(id);
        }

        // Check whether the file exists and allocate a new index for it.
        if Path::new(filename).is_file() {
            let mut vect = self.vect.borrow_mut();
            let new_id = Source(vect.len() as u32 + 1);
            let v: Rc<str> = Rc::from(filename);
            map.insert(v.clone(), new_id);
            vect.push(Box::new(DiskSourceFile {
                filename: v,
                content: RefCell::new(None),
            }));
            Some(new_id)
        } else {
            None
        }
    }

    /// Create a virtual file from the contents of a string and add it to the
    /// source manager. Future calls to `open()` with the given filename will
    /// yield the provided contents.
    pub fn add(&self, filename: &str, content: &str) -> Source {
        let mut map = self.map.borrow_mut();
        assert!(
            !map.contains_key(filename),
            "add failed: source \"{}\" already exists",
            filename
        );
        let mut vect = self.vect.borrow_mut();
        let new_id = Source(vect.len() as u32 + 1);
        let v: Rc<str> = Rc::from(filename);
        map.insert(v.clone(), new_id);
        vect.push(Box::new(VirtualSourceFile {
            filename: v,
            content: Rc::new(VirtualSourceContent(content.to_string())),
        }));
        new_id
    }
}

/// Get the global source manager.
pub fn get_source_manager() -> Rc<SourceManager> {
    thread_local!(static MNGR: Rc<SourceManager> = {
        Rc::new(SourceManager::new())
    });
    MNGR.with(|x| x.clone())
}

/// A virtual source file that has no correspondence in the file system. Useful
/// for unit tests.
struct VirtualSourceFile {
    filename: Rc<str>,
    content: Rc<VirtualSourceContent>,
}

struct VirtualSourceContent(pub String);

impl SourceFile for VirtualSourceFile {
    fn get_path(&self) -> Rc<str> {
        self.filename.clone()
    }

    fn get_content(&self) -> io::Result<Rc<dyn SourceContent>> {
        Ok(self.content.clone())
    }
}

impl SourceContent for VirtualSourceContent {
    fn bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// A source file on disk.
struct DiskSourceFile {
    filename: Rc<str>,
    content: RefCell<Option<Rc<DiskSourceContent>>>,
}

enum DiskSourceContent {
    Mapped(Mmap),
    Empty,
}

impl SourceFile for DiskSourceFile {
    fn get_path(&self) -> Rc<str> {
        self.filename.clone()
    }

    fn get_content(&self) -> io::Result<Rc<dyn SourceContent>> {
        if let Some(ref c) = *self.content.borrow() {
            return Ok(c.clone());
        }
        let file = File::open(Path::new(&*self.filename))?;
        let c = if file.metadata()?.len() == 0 {
            Rc::new(DiskSourceContent::Empty)
        } else {
            // The file is only ever read. Concurrent modification by another
            // process is not guarded against, as with any mapped input.
            Rc::new(DiskSourceContent::Mapped(unsafe { Mmap::map(&file)? }))
        };
        *self.content.borrow_mut() = Some(c.clone());
        Ok(c)
    }
}

impl SourceContent for DiskSourceContent {
    fn bytes(&self) -> &[u8] {
        match *self {
            DiskSourceContent::Mapped(ref m) => &m[..],
            DiskSourceContent::Empty => &[],
        }
    }
}

/// A single location within a source file, expressed as a byte offset.
#[derive(Copy, Clone, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct Location {
    pub source: Source,
    pub offset: usize,
}

impl Location {
    /// Create a new location.
    pub fn new(source: Source, offset: usize) -> Location {
        Location {
            source: source,
            offset: offset,
        }
    }

    /// Determine the line and column information at this location.
    ///
    /// Returns a tuple `(line, column, line_offset)`. Lines and columns count
    /// from 1. Unreadable sources report `(0, 0, 0)`.
    pub fn human(self) -> (usize, usize, usize) {
        if self.source == INVALID_SOURCE {
            return (0, 0, 0);
        }
        let c = match self.source.get_content() {
            Ok(c) => c,
            Err(_) => return (0, 0, 0),
        };
        let bytes = c.bytes();
        let end = self.offset.min(bytes.len());
        let line_offset = bytes[..end]
            .iter()
            .rposition(|&b| b == b'\n')
            .map(|p| p + 1)
            .unwrap_or(0);
        let line = bytes[..line_offset].iter().filter(|&&b| b == b'\n').count() + 1;
        let col = String::from_utf8_lossy(&bytes[line_offset..end])
            .chars()
            .count()
            + 1;
        (line, col, line_offset)
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}:{}", self.source, self.offset)
    }
}

/// A span of locations within a source file, expressed as a half-open interval
/// of bytes `[begin,end)`.
#[derive(Copy, Clone, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct Span {
    pub source: Source,
    pub begin: usize,
    pub end: usize,
}

impl Span {
    /// Create a new span from two byte offsets.
    pub fn new(source: Source, begin: usize, end: usize) -> Span {
        Span {
            source: source,
            begin: begin,
            end: end,
        }
    }

    /// Return the location just before the first character in this span.
    pub fn begin(&self) -> Location {
        Location::new(self.source, self.begin)
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}:{}-{}", self.source, self.begin, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "invalid source")]
    fn invalid_source_id() {
        get_source_manager().with(Source(0), |_| ());
    }

    #[test]
    fn inject_file() {
        let sm = get_source_manager();
        let id = sm.add("flabberghasted.txt", "Hello\nWorld\n");
        let source = sm.open("flabberghasted.txt").expect("file should exist");
        assert_eq!(source, id);
        assert_eq!(sm.find("flabberghasted.txt"), Some(id));
    }

    #[test]
    fn inexistent_file() {
        let sm = get_source_manager();
        assert_eq!(sm.open("/this/path/points/nowhere"), None);
    }

    #[test]
    fn human_location() {
        let sm = get_source_manager();
        let source = sm.add("human.txt", "abc\nd老ef\n");
        assert_eq!(Location::new(source, 0).human(), (1, 1, 0));
        assert_eq!(Location::new(source, 4).human(), (2, 1, 4));
        assert_eq!(Location::new(source, 8).human(), (2, 3, 4));
    }

    #[test]
    fn file() {
        use std::io::Write;

        let path = std::env::temp_dir().join("hdldeps-source-test.txt");
        let data = "Löwe 老虎 Léopard\n";
        File::create(&path)
            .unwrap()
            .write_all(data.as_bytes())
            .unwrap();

        let sm = get_source_manager();
        let source = sm.open(path.to_str().unwrap()).expect("file should exist");
        let content = source.get_content().unwrap();
        assert_eq!(content.text(), data);
    }

    #[test]
    fn empty_file() {
        let path = std::env::temp_dir().join("hdldeps-source-empty.txt");
        File::create(&path).unwrap();
        let sm = get_source_manager();
        let source = sm.open(path.to_str().unwrap()).expect("file should exist");
        assert!(source.get_content().unwrap().bytes().is_empty());
    }
}
