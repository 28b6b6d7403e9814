// SPDX-FileCopyrightText: 2025 Contributors to the native-loader project.
// SPDX-License-Identifier: Apache-2.0

use std::{
    ffi::OsString,
    fs::{self, File},
    io::{self, Read},
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::{
    Error, Result,
    bundle::Bundle,
    platform::ResourceLocation,
};

/// Mode given to extracted libraries on Unix.
#[cfg(unix)]
const LIBRARY_MODE: u32 = 0o755;

/// Copies the library at `location` to `target` and returns the path to load.
///
/// An existing `target` is replaced. If it cannot be removed it is returned
/// as is and nothing is copied.
pub(crate) fn extract(
    library: &str,
    location: &ResourceLocation,
    bundle: &dyn Bundle,
    target: &Path,
) -> Result<PathBuf> {
    extract_with(library, location, bundle, target, set_library_mode)
}

fn extract_with<F>(
    library: &str,
    location: &ResourceLocation,
    bundle: &dyn Bundle,
    target: &Path,
    set_mode: F,
) -> Result<PathBuf>
where
    F: FnOnce(&Path) -> io::Result<()>,
{
    if fs::symlink_metadata(target).is_ok()
        && let Err(e) = fs::remove_file(target)
    {
        warn!(
            path = %target.display(),
            error = %e,
            "failed to delete existing library file, reusing it"
        );
        return Ok(target.to_path_buf());
    }

    let mut reader = open_resource(library, location, bundle)?;

    // Staged next to the target so the final rename stays on one filesystem.
    // Dropping `staged` before `persist` removes it.
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    let mut prefix = OsString::from(target.file_name().unwrap_or_default());
    prefix.push(".");
    let mut staged = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| Error::io("create", dir, e))?;

    io::copy(&mut reader, &mut staged).map_err(|e| Error::io("write", staged.path(), e))?;
    staged
        .as_file()
        .sync_all()
        .map_err(|e| Error::io("flush", staged.path(), e))?;

    if let Err(e) = set_mode(staged.path()) {
        warn!(path = %target.display(), error = %e, "failed to set permissions on extracted library");
    }

    staged
        .persist(target)
        .map_err(|e| Error::io("install library file", target, e.error))?;

    debug!(library, from = %location, to = %target.display(), "extracted native library");
    Ok(target.to_path_buf())
}

fn open_resource<'a>(
    library: &str,
    location: &ResourceLocation,
    bundle: &'a dyn Bundle,
) -> Result<Box<dyn Read + 'a>> {
    let opened: io::Result<Box<dyn Read + 'a>> = match location {
        ResourceLocation::Bundled(path) => bundle.open(path),
        ResourceLocation::System(path) => {
            File::open(path).map(|file| Box::new(file) as Box<dyn Read + 'a>)
        }
    };

    opened.map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::ResourceNotFound {
            library: library.to_string(),
            location: location.clone(),
        },
        _ => Error::io("open resource", location.to_string(), e),
    })
}

#[cfg(unix)]
fn set_library_mode(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(LIBRARY_MODE))
}

#[cfg(not(unix))]
fn set_library_mode(_path: &Path) -> io::Result<()> {
    Ok(())
}
