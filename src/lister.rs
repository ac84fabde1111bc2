use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::mime::guess_mime_type;
use crate::types::{ListError, Resource};

/// Scheme prefix of every resource URI.
pub const URI_PREFIX: &str = "file:///";

/// Recursively list every regular file under `root`.
///
/// Only a missing or unreadable root fails the listing. Entries that cannot
/// be inspected are logged and skipped. Symlinks are never followed, which
/// also rules out cycles. The result is sorted by URI.
pub fn list_resources(root: &Path) -> Result<Vec<Resource>, ListError> {
    let meta = match fs::metadata(root) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ListError::RootNotFound(root.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };
    if !meta.is_dir() {
        return Err(ListError::NotADirectory(root.to_path_buf()));
    }

    let mut resources = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            // The root itself must be readable.
            Err(e) if dir.as_path() == root => return Err(e.into()),
            Err(e) => {
                tracing::warn!(
                    path = %dir.display(),
                    error = %e,
                    "skipping unreadable directory"
                );
                continue;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(dir = %dir.display(), error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            let path = entry.path();
            let file_type = match entry.file_type() {
                Ok(ft) => ft,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping entry");
                    continue;
                }
            };

            if file_type.is_symlink() {
                tracing::debug!(path = %path.display(), "skipping symlink");
            } else if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() {
                push_file(root, &path, &mut resources);
            }
        }
    }

    resources.sort_by(|a, b| a.uri.cmp(&b.uri));
    Ok(resources)
}

/// Run [`list_resources`] on the blocking pool.
///
/// A panic inside the walk comes back as [`ListError::Join`].
pub async fn list_resources_blocking(root: PathBuf) -> Result<Vec<Resource>, ListError> {
    tokio::task::spawn_blocking(move || list_resources(&root))
        .await
        .map_err(|e| ListError::Join(e.to_string()))?
}

/// Build the `file:///` URI for a path relative to the root.
///
/// Components are joined with `/`, and any `\` inside a component is turned
/// into `/` as well, so the URI looks the same on every host.
pub fn resource_uri(relative: &Path) -> String {
    let joined = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/");
    format!("{URI_PREFIX}{}", joined.replace('\\', "/"))
}

/// Describe one file into `resources`; a file that cannot be described is
/// logged and skipped. Returns whether it was added.
fn push_file(root: &Path, path: &Path, resources: &mut Vec<Resource>) -> bool {
    match describe(root, path) {
        Ok(resource) => {
            resources.push(resource);
            true
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "skipping file");
            false
        }
    }
}

fn describe(root: &Path, path: &Path) -> Result<Resource, ListError> {
    let relative = path
        .strip_prefix(root)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "no file name"))?;

    Ok(Resource {
        uri: resource_uri(relative),
        mime_type: guess_mime_type(&name).to_string(),
        name,
    })
}
