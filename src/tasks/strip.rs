//! Removal of the ES-module interop marker from the compiled entry point.
//!
//! The compiler emits the marker at the top of every module; the Espruino
//! interpreter runs the entry point as a plain script, where `exports` is not
//! defined.

use std::borrow::Cow;

use camino::Utf8Path;
use cap_std::fs_utf8::Dir;
use tracing::{debug, info};

use crate::error::{ArtifactError, FilesystemError, Result};

/// The statement removed from the entry point.
pub const MODULE_MARKER: &str = r#"Object.defineProperty(exports, "__esModule", { value: true });"#;

/// Remove the first occurrence of [`MODULE_MARKER`] from `source`.
#[must_use]
pub fn strip_module_marker(source: &str) -> Cow<'_, str> {
    if source.contains(MODULE_MARKER) {
        Cow::Owned(source.replacen(MODULE_MARKER, "", 1))
    } else {
        Cow::Borrowed(source)
    }
}

/// Strip the marker from the entry point at `main_path` inside the project.
///
/// Returns whether the file was rewritten. Running it twice leaves the file
/// as the first run did.
///
/// # Errors
///
/// Returns `ArtifactError::MainFileMissing` when the entry point does not
/// exist, and `FilesystemError` when it cannot be read or written.
pub fn strip_main_file(project: &Dir, main_path: &Utf8Path) -> Result<bool> {
    if !project.exists(main_path) {
        return Err(ArtifactError::MainFileMissing {
            path: main_path.to_owned(),
        }
        .into());
    }

    let source = project
        .read_to_string(main_path)
        .map_err(|e| FilesystemError::from_io(main_path, &e))?;

    match strip_module_marker(&source) {
        Cow::Borrowed(_) => {
            debug!(path = %main_path, "module marker already absent");
            Ok(false)
        }
        Cow::Owned(stripped) => {
            project
                .write(main_path, stripped)
                .map_err(|e| FilesystemError::from_io(main_path, &e))?;
            info!(path = %main_path, "removed module marker");
            Ok(true)
        }
    }
}
