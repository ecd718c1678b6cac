use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::Result;
use crate::pipeline::report::RunReport;
use crate::types::CanonicalCourse;

/// Pretty JSON with a trailing newline, the format every artifact is written in
pub fn to_json_document<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut content = serde_json::to_string_pretty(value)?;
    content.push('\n');
    Ok(content)
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Write a single JSON document through a staging file and rename
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let content = to_json_document(value)?;
    ensure_parent(path)?;
    let staged = staging_path(path);
    fs::write(&staged, content)?;
    fs::rename(&staged, path)?;
    debug!("Wrote {}", path.display());
    Ok(())
}

/// Persist the dataset and the report together.
///
/// Both documents are serialized and staged before either target is touched;
/// if staging fails nothing is renamed into place and the staged files are removed.
pub fn persist_artifacts(
    dataset: &[CanonicalCourse],
    report: &RunReport,
    dataset_path: &Path,
    report_path: &Path,
) -> Result<()> {
    let dataset_json = to_json_document(dataset)?;
    let report_json = to_json_document(report)?;

    let staged = [
        (staging_path(dataset_path), dataset_path, dataset_json),
        (staging_path(report_path), report_path, report_json),
    ];

    let staging_result = staged.iter().try_for_each(|(tmp, target, content)| -> Result<()> {
        ensure_parent(target)?;
        fs::write(tmp, content)?;
        Ok(())
    });

    if let Err(e) = staging_result {
        warn!("Failed to stage artifacts, nothing persisted: {}", e);
        for (tmp, _, _) in &staged {
            let _ = fs::remove_file(tmp);
        }
        return Err(e);
    }

    for (tmp, target, _) in &staged {
        fs::rename(tmp, target)?;
        debug!("Wrote {}", target.display());
    }
    Ok(())
}
