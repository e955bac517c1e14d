use std::path::{Path, PathBuf};
use tracing::debug;
use vmrig_fs as fs;

use crate::{VmError, paths::CONFIG_EXTENSION};

/// Finds the single config file inside `dir` for the VM `name`.
///
/// Any one `.vmx` file is accepted whatever its base name. When several
/// exist, the one whose base name equals `name` wins; otherwise the choice
/// is ambiguous and fails.
pub(crate) async fn resolve_config_file(
    name: &str,
    dir: &Path,
    pattern: &Path,
) -> Result<PathBuf, VmError> {
    let candidates = if fs::is_dir(dir).await? {
        config_files(dir).await?
    } else {
        Vec::new()
    };

    match candidates.as_slice() {
        [] => Err(VmError::ConfigNotFound {
            name: name.to_owned(),
            pattern: pattern.to_owned(),
        }),
        [only] => Ok(only.clone()),
        many => {
            let matching: Vec<&PathBuf> = many
                .iter()
                .filter(|path| path.file_stem().and_then(|s| s.to_str()) == Some(name))
                .collect();
            match matching.as_slice() {
                [chosen] => {
                    debug!("picked {} among {} config files", chosen.display(), many.len());
                    Ok((*chosen).clone())
                }
                _ => Err(VmError::MultipleConfigs {
                    name: name.to_owned(),
                    candidates: quoted_file_names(many),
                    dir: dir.to_owned(),
                }),
            }
        }
    }
}

async fn config_files(dir: &Path) -> Result<Vec<PathBuf>, VmError> {
    let entries = fs::read_dir(dir).await?;
    Ok(entries
        .into_iter()
        .filter(|entry| !entry.is_dir)
        .map(|entry| entry.path)
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some(CONFIG_EXTENSION))
        .collect())
}

fn quoted_file_names(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_default();
            format!("'{name}'")
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// The part of `file_name` after a `<name>.` or `<name>-` prefix, separator included.
pub(crate) fn name_suffix<'a>(file_name: &'a str, name: &str) -> Option<&'a str> {
    let rest = file_name.strip_prefix(name)?;
    if rest.starts_with('.') || rest.starts_with('-') {
        Some(rest)
    } else {
        None
    }
}

/// `file_name` with its `source` prefix swapped for `target`; unchanged otherwise.
pub(crate) fn renamed(file_name: &str, source: &str, target: &str) -> String {
    match name_suffix(file_name, source) {
        Some(rest) => format!("{target}{rest}"),
        None => file_name.to_owned(),
    }
}
