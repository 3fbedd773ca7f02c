//! Table discovery in directories and workbook folders.
//!
//! A workbook is a directory holding one delimited file per sheet; the sheet
//! name is the file stem.

use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};

/// Extensions recognised as delimited tables.
pub const TABLE_EXTENSIONS: [&str; 3] = ["csv", "tsv", "txt"];

fn is_table_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| TABLE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

/// Lists table files in a directory, sorted by file name.
pub fn list_table_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_file() && is_table_file(&path) {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Sheet names of a workbook folder, in file-name order.
pub fn sheet_names(workbook: &Path) -> Result<Vec<String>> {
    Ok(list_table_files(workbook)?
        .iter()
        .filter_map(|path| path.file_stem().and_then(|stem| stem.to_str()))
        .map(str::to_string)
        .collect())
}

/// Finds the file backing `sheet` (case-insensitive on the stem).
pub fn find_sheet(workbook: &Path, sheet: &str) -> Result<Option<PathBuf>> {
    let wanted = sheet.trim();
    Ok(list_table_files(workbook)?.into_iter().find(|path| {
        path.file_stem()
            .and_then(|stem| stem.to_str())
            .is_some_and(|stem| stem.eq_ignore_ascii_case(wanted))
    }))
}
