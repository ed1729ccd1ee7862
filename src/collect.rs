//! Directory traversal and expense-type labeling.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::diagnostics::DiagnosticLog;
use crate::parse::parse_or_marker;
use crate::record::{DEFAULT_EXPENSE_TYPE, InvoiceRecord};

/// Resolve the expense label for files found in `dir` under `root`.
///
/// Files directly in a root without any subdirectories get the default
/// label. Everything else, including the root itself once it does have
/// subdirectories, is labeled with its own directory name.
#[must_use]
pub fn expense_label(root: &Path, dir: &Path, root_has_subdirs: bool) -> String {
    if dir == root && !root_has_subdirs {
        return DEFAULT_EXPENSE_TYPE.to_string();
    }
    crate::get_normalized_dir_name(dir).unwrap_or_else(|_| dir.display().to_string())
}

/// Walk the tree under `root` and build one record per `.xml` file.
///
/// Every qualifying file yields exactly one record, complete or failure
/// marker. Entries that fail to read mid-walk (e.g. a directory removed
/// while traversing) are skipped; cyclic symlinks are not guarded against.
pub fn collect_records(root: &Path, log: &mut dyn DiagnosticLog) -> Vec<InvoiceRecord> {
    let root_has_subdirs = has_subdirectories(root);
    let files = get_xml_files(root);

    let mut records = Vec::with_capacity(files.len());
    for file in files {
        let dir = file.parent().unwrap_or(root);
        let expense_type = expense_label(root, dir, root_has_subdirs);
        let outcome = parse_or_marker(&file, log);
        records.push(InvoiceRecord { outcome, expense_type });
    }
    records
}

/// Collect all XML files recursively from the given root path.
///
/// Only the exact lowercase `xml` extension qualifies. The list is sorted
/// case-insensitively so collection order is deterministic across
/// platforms.
#[must_use]
pub fn get_xml_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path().to_owned())
        .filter(|path| path.is_file() && path.extension() == Some(OsStr::new("xml")))
        .collect();

    files.sort_by(|a, b| {
        let a_str = a.to_string_lossy().to_lowercase();
        let b_str = b.to_string_lossy().to_lowercase();
        a_str.cmp(&b_str)
    });
    files
}

fn has_subdirectories(root: &Path) -> bool {
    fs::read_dir(root).is_ok_and(|mut entries| {
        entries.any(|entry| entry.is_ok_and(|e| e.path().is_dir()))
    })
}

#[cfg(test)]
mod test_expense_label {
    use super::*;

    #[test]
    fn root_without_subdirs_gets_default_label() {
        let root = Path::new("/facturas");
        assert_eq!(expense_label(root, root, false), DEFAULT_EXPENSE_TYPE);
    }

    #[test]
    fn root_with_subdirs_gets_its_own_name() {
        let root = Path::new("/facturas/2024");
        assert_eq!(expense_label(root, root, true), "2024");
    }

    #[test]
    fn subdirectory_gets_its_own_name() {
        let root = Path::new("/facturas");
        let dir = Path::new("/facturas/Comida");
        assert_eq!(expense_label(root, dir, true), "Comida");
    }

    #[test]
    fn nested_subdirectory_uses_immediate_parent_name_only() {
        let root = Path::new("/facturas");
        let dir = Path::new("/facturas/2024/Hospedaje");
        assert_eq!(expense_label(root, dir, true), "Hospedaje");
    }

    #[test]
    fn accented_directory_names_are_preserved() {
        let root = Path::new("/facturas");
        let dir = Path::new("/facturas/Alimentación");
        assert_eq!(expense_label(root, dir, true), "Alimentación");
    }
}

#[cfg(test)]
mod test_get_xml_files {
    use super::*;

    use std::fs::File;

    use tempfile::tempdir;

    #[test]
    fn finds_only_xml_files_recursively() {
        let dir = tempdir().expect("should create temp dir");
        let sub = dir.path().join("Comida");
        fs::create_dir(&sub).expect("should create subdir");
        File::create(dir.path().join("a.xml")).expect("should create file");
        File::create(dir.path().join("notes.txt")).expect("should create file");
        File::create(sub.join("b.xml")).expect("should create file");

        let files = get_xml_files(dir.path());

        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|path| path.extension() == Some(OsStr::new("xml"))));
    }

    #[test]
    fn extension_match_is_case_sensitive() {
        let dir = tempdir().expect("should create temp dir");
        File::create(dir.path().join("upper.XML")).expect("should create file");
        File::create(dir.path().join("lower.xml")).expect("should create file");

        let files = get_xml_files(dir.path());

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("lower.xml"));
    }

    #[test]
    fn returns_sorted_files() {
        let dir = tempdir().expect("should create temp dir");
        File::create(dir.path().join("b.xml")).expect("should create file");
        File::create(dir.path().join("A.xml")).expect("should create file");
        File::create(dir.path().join("c.xml")).expect("should create file");

        let files = get_xml_files(dir.path());

        let names: Vec<String> = files
            .iter()
            .map(|path| path.file_name().unwrap_or_default().to_string_lossy().to_lowercase())
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn returns_empty_for_nonexistent_directory() {
        let files = get_xml_files(Path::new("tests/nonexistent"));
        assert!(files.is_empty());
    }
}
