use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

/// What happens to a source file when validation rejects it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RejectAction {
    /// Leave the file in place; the caller just skips it.
    #[default]
    None,
    /// Permanently remove the file.
    Delete,
    /// Relocate the file under `quarantine_root`, mirroring its position
    /// relative to `dataset_root`.
    MoveTo {
        dataset_root: PathBuf,
        quarantine_root: PathBuf,
    },
}

/// Filesystem effect that was actually carried out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Kept,
    Deleted,
    Quarantined(PathBuf),
    /// The file was already gone before the action ran.
    Missing,
}

impl RejectAction {
    pub fn quarantine(dataset_root: impl Into<PathBuf>, quarantine_root: impl Into<PathBuf>) -> Self {
        RejectAction::MoveTo {
            dataset_root: dataset_root.into(),
            quarantine_root: quarantine_root.into(),
        }
    }

    pub fn is_destructive(&self) -> bool {
        !matches!(self, RejectAction::None)
    }

    /// Apply the action to a rejected `path`.
    pub fn apply(&self, path: &Path) -> Result<ActionOutcome> {
        match self {
            RejectAction::None => Ok(ActionOutcome::Kept),
            RejectAction::Delete => {
                if !path.exists() {
                    return Ok(ActionOutcome::Missing);
                }
                fs::remove_file(path)
                    .with_context(|| format!("failed to delete {}", path.display()))?;
                info!(path = %path.display(), "deleted rejected file");
                Ok(ActionOutcome::Deleted)
            }
            RejectAction::MoveTo {
                dataset_root,
                quarantine_root,
            } => {
                if !path.exists() {
                    return Ok(ActionOutcome::Missing);
                }
                let target = quarantine_path(path, dataset_root, quarantine_root);
                let target = move_file(path, &target)?;
                info!(
                    path = %path.display(),
                    target = %target.display(),
                    "quarantined rejected file"
                );
                Ok(ActionOutcome::Quarantined(target))
            }
        }
    }
}

/// Destination of `path` inside `quarantine_root`.
///
/// Paths outside `dataset_root` keep only their file name. The move itself
/// picks a suffixed name if this one is already taken.
pub fn quarantine_path(path: &Path, dataset_root: &Path, quarantine_root: &Path) -> PathBuf {
    match relative_to(path, dataset_root) {
        Some(relative) => quarantine_root.join(relative),
        None => quarantine_root.join(path.file_name().unwrap_or(path.as_os_str())),
    }
}

/// `path` relative to `root`, ignoring `.` components on either side.
pub fn relative_to(path: &Path, root: &Path) -> Option<PathBuf> {
    let path = without_cur_dir(path);
    let root = without_cur_dir(root);
    path.strip_prefix(&root)
        .ok()
        .filter(|rel| !rel.as_os_str().is_empty())
        .map(Path::to_path_buf)
}

/// Whether `path` is `root` or lies below it, ignoring `.` components.
pub fn is_within(path: &Path, root: &Path) -> bool {
    without_cur_dir(path).starts_with(without_cur_dir(root))
}

fn without_cur_dir(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Limit on `name.N.ext` candidates tried before giving up.
const MAX_TARGET_SUFFIX: usize = 10_000;

/// Move `from` to `to`, or to `to` with a numeric suffix when `to` is taken.
///
/// Never replaces an existing file. Returns the path actually written.
fn move_file(from: &Path, to: &Path) -> Result<PathBuf> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let target = claim_target(to)?;
    if let Err(err) = relocate(from, &target) {
        let _ = fs::remove_file(&target);
        return Err(err);
    }
    Ok(target)
}

/// Atomically reserve a vacant path next to `to` by creating it empty.
fn claim_target(to: &Path) -> Result<PathBuf> {
    for suffix in 0..MAX_TARGET_SUFFIX {
        let candidate = if suffix == 0 {
            to.to_path_buf()
        } else {
            suffixed(to, suffix)
        };
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(_) => {
                if suffix > 0 {
                    debug!(
                        wanted = %to.display(),
                        target = %candidate.display(),
                        "quarantine target taken; using suffixed name"
                    );
                }
                return Ok(candidate);
            }
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to reserve {}", candidate.display()))
            }
        }
    }
    bail!("no free quarantine name for {}", to.display())
}

/// `dir/name.ext` -> `dir/name.N.ext`.
fn suffixed(path: &Path, suffix: usize) -> PathBuf {
    let stem = path.file_stem().unwrap_or(path.as_os_str()).to_string_lossy();
    let name = match path.extension() {
        Some(ext) => format!("{stem}.{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}.{suffix}"),
    };
    path.with_file_name(name)
}

/// Replace the reserved placeholder at `to` with `from`.
fn relocate(from: &Path, to: &Path) -> Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() != io::ErrorKind::NotFound => {
            debug!(error = %err, "rename failed; copying across filesystems");
            fs::copy(from, to).with_context(|| {
                format!("failed to copy {} to {}", from.display(), to.display())
            })?;
            fs::remove_file(from)
                .with_context(|| format!("failed to remove {}", from.display()))?;
            Ok(())
        }
        Err(err) => Err(err).with_context(|| format!("failed to move {}", from.display())),
    }
}
