//! Filesystem helpers for crash-safe writes.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Replace `destination` with `contents` without ever exposing a partial file.
///
/// The data goes to a sibling temp file which is synced and then renamed over
/// the destination. Missing parent directories are created. On failure the
/// destination is untouched and the temp file is removed.
pub(crate) fn write_atomic(destination: &Path, contents: &[u8]) -> io::Result<()> {
    write_atomic_via(destination, &temp_path_for(destination), contents)
}

fn write_atomic_via(destination: &Path, temp_path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    write_synced(temp_path, contents)?;

    if let Err(e) = rename_with_fallback(temp_path, destination) {
        let _ = fs::remove_file(temp_path);
        return Err(e);
    }
    Ok(())
}

/// `<name>.<pid>.<random>.tmp` next to the destination, so the rename stays on
/// one filesystem and concurrent writers never share a temp file.
fn temp_path_for(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(
        ".{}.{:08x}.tmp",
        std::process::id(),
        rand::random::<u32>()
    ));
    destination.with_file_name(name)
}

fn write_synced(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    let result = file.write_all(contents).and_then(|()| file.sync_all());
    if result.is_err() {
        drop(file);
        let _ = fs::remove_file(path);
    }
    result
}

/// Rename, removing the destination first on platforms where rename refuses
/// to replace an existing file.
fn rename_with_fallback(temp_path: &Path, destination: &Path) -> io::Result<()> {
    if let Err(initial_err) = fs::rename(temp_path, destination) {
        let _ = fs::remove_file(destination);
        fs::rename(temp_path, destination).map_err(|retry_err| {
            io::Error::new(
                retry_err.kind(),
                format!(
                    "Atomic rename failed (initial: {}, retry: {})",
                    initial_err, retry_err
                ),
            )
        })?;
    }
    Ok(())
}
