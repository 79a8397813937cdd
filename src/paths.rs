use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Rejection of a result path that cannot be resolved inside the workspace.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("workspace root {} is not absolute", root.display())]
    RootNotAbsolute { root: PathBuf },

    #[error("result path {path:?} is absolute; paths must be relative to the workspace root")]
    NotRelative { path: String },

    #[error("result path {path:?} escapes the workspace root {}", root.display())]
    EscapesRoot { path: String, root: PathBuf },

    #[error("result has an empty file path")]
    Empty,
}

/// Resolve a tool-supplied relative path against the collaborator-supplied
/// workspace root.
///
/// Resolution is purely lexical. `.` components drop out, `..` pops a
/// previously seen component and fails if it would climb past the root. The
/// file system is never consulted, so a path to a not-yet-created file
/// resolves fine.
pub fn resolve(root: &Path, file_path: &str) -> Result<PathBuf, PathError> {
    if !root.is_absolute() {
        return Err(PathError::RootNotAbsolute {
            root: root.to_path_buf(),
        });
    }

    let mut normalized = PathBuf::new();
    let mut depth: usize = 0;
    for component in Path::new(file_path).components() {
        match component {
            Component::Normal(part) => {
                normalized.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return Err(PathError::EscapesRoot {
                        path: file_path.to_string(),
                        root: root.to_path_buf(),
                    });
                }
                normalized.pop();
                depth -= 1;
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(PathError::NotRelative {
                    path: file_path.to_string(),
                });
            }
        }
    }

    if normalized.as_os_str().is_empty() {
        return Err(PathError::Empty);
    }
    Ok(root.join(normalized))
}
