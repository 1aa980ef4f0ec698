//! Static copy of plain JavaScript sources into the output directory.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::fs_utf8::Dir;
use tracing::debug;

use crate::error::{FilesystemError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Directory,
    File,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SortedEntry {
    file_name: String,
    entry_kind: EntryKind,
}

/// Copy every regular `.js` file under `src_dir` to the same relative path
/// under `dist_dir`, creating intermediate directories.
///
/// Files are copied byte for byte. A missing source directory copies
/// nothing. Returns the copied paths relative to `src_dir`, in walk order.
///
/// # Errors
///
/// Returns `FilesystemError` naming the project-relative path of the first
/// entry that could not be read, created or copied.
pub fn copy_js_sources(
    project: &Dir,
    src_dir: &Utf8Path,
    dist_dir: &Utf8Path,
) -> Result<Vec<Utf8PathBuf>> {
    if !project.exists(src_dir) {
        debug!(src = %src_dir, "source directory absent; nothing to copy");
        return Ok(Vec::new());
    }

    let source = project
        .open_dir(src_dir)
        .map_err(|e| FilesystemError::from_io(src_dir, &e))?;
    project
        .create_dir_all(dist_dir)
        .map_err(|e| FilesystemError::from_io(dist_dir, &e))?;
    let output = project
        .open_dir(dist_dir)
        .map_err(|e| FilesystemError::from_io(dist_dir, &e))?;

    let walk = CopyWalk {
        source_root: src_dir,
        dist_root: dist_dir,
        output: &output,
    };
    let mut copied = Vec::new();
    walk.copy_directory(&source, Utf8Path::new(""), &mut copied)?;
    Ok(copied)
}

struct CopyWalk<'a> {
    source_root: &'a Utf8Path,
    dist_root: &'a Utf8Path,
    output: &'a Dir,
}

impl CopyWalk<'_> {
    fn copy_directory(
        &self,
        current_dir: &Dir,
        current_relative_path: &Utf8Path,
        copied: &mut Vec<Utf8PathBuf>,
    ) -> Result<()> {
        let entries = sorted_entries(current_dir)
            .map_err(|e| FilesystemError::from_io(self.source_root.join(current_relative_path), &e))?;

        for entry in entries {
            let entry_relative_path = current_relative_path.join(&entry.file_name);

            match entry.entry_kind {
                EntryKind::Directory => {
                    let child_dir = current_dir.open_dir(&entry.file_name).map_err(|e| {
                        FilesystemError::from_io(self.source_root.join(&entry_relative_path), &e)
                    })?;
                    self.copy_directory(&child_dir, &entry_relative_path, copied)?;
                }
                EntryKind::File if is_js_file(&entry.file_name) => {
                    self.copy_file(current_dir, &entry.file_name, &entry_relative_path)?;
                    copied.push(entry_relative_path);
                }
                EntryKind::File | EntryKind::Other => {}
            }
        }

        Ok(())
    }

    fn copy_file(&self, parent_dir: &Dir, file_name: &str, relative_path: &Utf8Path) -> Result<()> {
        if let Some(parent) = relative_path
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
        {
            self.output
                .create_dir_all(parent)
                .map_err(|e| FilesystemError::from_io(self.dist_root.join(parent), &e))?;
        }

        let bytes = parent_dir
            .copy(file_name, self.output, relative_path)
            .map_err(|e| FilesystemError::from_io(self.source_root.join(relative_path), &e))?;
        debug!(file = %relative_path, bytes, "copied source file");
        Ok(())
    }
}

fn is_js_file(file_name: &str) -> bool {
    Utf8Path::new(file_name).extension() == Some("js")
}

fn sorted_entries(directory: &Dir) -> std::io::Result<Vec<SortedEntry>> {
    let mut entries = vec![];

    for entry_result in directory.entries()? {
        let entry = entry_result?;
        let file_name = entry.file_name()?;
        let file_type = entry.file_type()?;

        let entry_kind = if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        };

        entries.push(SortedEntry {
            file_name,
            entry_kind,
        });
    }

    entries.sort_unstable_by(|left, right| left.file_name.cmp(&right.file_name));
    Ok(entries)
}
