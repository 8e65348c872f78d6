//! File Picker
//!
//! Directory browser state for choosing the PDF to analyze. Holds no
//! rendering logic; the UI layer draws from the entry list and cursor.

use std::fs;
use std::path::{Path, PathBuf};

use crate::pdf;

/// Rows the cursor can land on per page jump.
const PAGE_JUMP: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// The ".." entry leading to the parent directory.
    Parent,
    Directory,
    /// A file with a PDF extension, highlighted in the list.
    Pdf,
    Other,
}

#[derive(Debug, Clone)]
pub struct PickerEntry {
    pub name: String,
    pub path: PathBuf,
    pub kind: EntryKind,
}

/// Browser state: current directory, its visible entries, and the
/// cursor. Hidden entries (dot-prefixed) are skipped; directories
/// sort before files, each group alphabetically.
#[derive(Debug)]
pub struct FilePicker {
    cwd: PathBuf,
    entries: Vec<PickerEntry>,
    cursor: usize,
    error: Option<String>,
}

impl FilePicker {
    pub fn new(start: impl Into<PathBuf>) -> Self {
        let cwd: PathBuf = start.into();
        let cwd = cwd.canonicalize().unwrap_or(cwd);
        let mut picker = Self {
            cwd,
            entries: Vec::new(),
            cursor: 0,
            error: None,
        };
        picker.refresh();
        picker
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn entries(&self) -> &[PickerEntry] {
        &self.entries
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn selected(&self) -> Option<&PickerEntry> {
        self.entries.get(self.cursor)
    }

    /// Re-read the current directory, keeping the cursor in bounds.
    pub fn refresh(&mut self) {
        self.error = None;
        let mut dirs = Vec::new();
        let mut files = Vec::new();

        match fs::read_dir(&self.cwd) {
            Ok(read) => {
                for entry in read.flatten() {
                    let name = entry.file_name().to_string_lossy().into_owned();
                    if name.starts_with('.') {
                        continue;
                    }
                    let path = entry.path();
                    if path.is_dir() {
                        dirs.push(PickerEntry {
                            name,
                            path,
                            kind: EntryKind::Directory,
                        });
                    } else {
                        let kind = if pdf::is_pdf(&path) {
                            EntryKind::Pdf
                        } else {
                            EntryKind::Other
                        };
                        files.push(PickerEntry { name, path, kind });
                    }
                }
            }
            Err(err) => {
                self.error = Some(format!("Cannot read {}: {}", self.cwd.display(), err));
            }
        }

        dirs.sort_by_key(|entry| entry.name.to_lowercase());
        files.sort_by_key(|entry| entry.name.to_lowercase());

        let mut entries = Vec::new();
        if let Some(parent) = self.cwd.parent() {
            entries.push(PickerEntry {
                name: "..".to_string(),
                path: parent.to_path_buf(),
                kind: EntryKind::Parent,
            });
        }
        entries.extend(dirs);
        entries.extend(files);

        self.entries = entries;
        self.cursor = self.cursor.min(self.entries.len().saturating_sub(1));
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.entries.len() {
            self.cursor += 1;
        }
    }

    pub fn page_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(PAGE_JUMP);
    }

    pub fn page_down(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        self.cursor = (self.cursor + PAGE_JUMP).min(self.entries.len() - 1);
    }

    /// Open the entry under the cursor. Directories are entered and
    /// `None` is returned; files come back as a path for the caller
    /// to validate and select.
    pub fn enter(&mut self) -> Option<PathBuf> {
        let entry = self.entries.get(self.cursor)?.clone();
        match entry.kind {
            EntryKind::Parent | EntryKind::Directory => {
                self.cwd = entry.path;
                self.cursor = 0;
                self.refresh();
                None
            }
            EntryKind::Pdf | EntryKind::Other => Some(entry.path),
        }
    }

    /// Move to the parent directory, if there is one.
    pub fn ascend(&mut self) {
        if let Some(parent) = self.cwd.parent() {
            self.cwd = parent.to_path_buf();
            self.cursor = 0;
            self.refresh();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn picker_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("reports")).unwrap();
        fs::write(dir.path().join("b.txt"), "notes").unwrap();
        fs::write(dir.path().join("a.pdf"), "%PDF-1.4").unwrap();
        fs::write(dir.path().join(".hidden.pdf"), "%PDF-1.4").unwrap();
        dir
    }

    #[test]
    fn test_directories_sort_before_files_and_hidden_are_skipped() {
        let dir = picker_dir();
        let picker = FilePicker::new(dir.path());

        let names: Vec<&str> = picker
            .entries()
            .iter()
            .map(|entry| entry.name.as_str())
            .collect();
        assert_eq!(names, vec!["..", "reports", "a.pdf", "b.txt"]);

        assert_eq!(picker.entries()[0].kind, EntryKind::Parent);
        assert_eq!(picker.entries()[1].kind, EntryKind::Directory);
        assert_eq!(picker.entries()[2].kind, EntryKind::Pdf);
        assert_eq!(picker.entries()[3].kind, EntryKind::Other);
    }

    #[test]
    fn test_enter_descends_into_directory() {
        let dir = picker_dir();
        let mut picker = FilePicker::new(dir.path());

        while picker.selected().unwrap().kind != EntryKind::Directory {
            picker.move_down();
        }
        assert!(picker.enter().is_none());
        assert!(picker.cwd().ends_with("reports"));
        assert_eq!(picker.cursor(), 0);
    }

    #[test]
    fn test_enter_returns_file_path_without_descending() {
        let dir = picker_dir();
        let mut picker = FilePicker::new(dir.path());

        while picker.selected().unwrap().kind != EntryKind::Pdf {
            picker.move_down();
        }
        let path = picker.enter().expect("file entry should yield a path");
        assert!(path.ends_with("a.pdf"));
        assert_eq!(picker.cwd(), dir.path().canonicalize().unwrap());
    }

    #[test]
    fn test_ascend_moves_to_parent() {
        let dir = picker_dir();
        let mut picker = FilePicker::new(dir.path().join("reports"));
        picker.ascend();
        assert_eq!(picker.cwd(), dir.path().canonicalize().unwrap());
    }

    #[test]
    fn test_cursor_stays_in_bounds() {
        let dir = picker_dir();
        let mut picker = FilePicker::new(dir.path());

        picker.move_up();
        assert_eq!(picker.cursor(), 0);

        for _ in 0..20 {
            picker.move_down();
        }
        assert_eq!(picker.cursor(), picker.entries().len() - 1);

        picker.page_up();
        assert_eq!(picker.cursor(), 0);
        picker.page_down();
        assert_eq!(picker.cursor(), picker.entries().len() - 1);
    }

    #[test]
    fn test_unreadable_directory_sets_error() {
        let dir = TempDir::new().unwrap();
        let picker = FilePicker::new(dir.path().join("missing"));
        assert!(picker.error().is_some());
    }
}
