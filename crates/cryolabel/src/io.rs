use crate::spec::{GenerateRequest, LabelSpec};
use crate::types::Result;
use std::path::{Path, PathBuf};

/// `<dir>/<prefix>[_YYYY-MM-DD].pdf`
pub fn output_file_path(dir: impl AsRef<Path>, prefix: &str, add_date: bool) -> PathBuf {
    let prefix = if prefix.trim().is_empty() {
        "labels"
    } else {
        prefix.trim()
    };
    let name = if add_date {
        format!("{}_{}.pdf", prefix, chrono::Local::now().format("%Y-%m-%d"))
    } else {
        format!("{prefix}.pdf")
    };
    dir.as_ref().join(name)
}

/// First of `path`, `stem_1.ext`, `stem_2.ext`, ... that does not exist yet.
pub fn unique_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if !path.exists() {
        return path.to_path_buf();
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path.extension().map(|e| e.to_string_lossy().into_owned());

    (1..)
        .map(|counter| {
            let name = match &extension {
                Some(ext) => format!("{stem}_{counter}.{ext}"),
                None => format!("{stem}_{counter}"),
            };
            path.with_file_name(name)
        })
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| path.to_path_buf())
}

/// Where a run's output goes before collision handling.
///
/// An explicit file path is used as given; a directory (or nothing, meaning the
/// working directory) gets a name built from the preset.
pub fn target_path(spec: &LabelSpec, request: &GenerateRequest) -> PathBuf {
    match &request.output_path {
        Some(path) if path.is_dir() => {
            output_file_path(path, &spec.output_prefix, spec.output_add_date)
        }
        Some(path) if path.extension().is_some() => path.clone(),
        Some(path) => path.with_extension(spec.output_format.extension()),
        None => output_file_path(".", &spec.output_prefix, spec.output_add_date),
    }
}

/// Write `bytes` to a fresh file near `path`, returning where it landed.
pub async fn save_document(path: impl AsRef<Path>, bytes: Vec<u8>) -> Result<PathBuf> {
    let path = unique_path(path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, bytes).await?;
    log::info!("Saved {}", path.display());
    Ok(path)
}
