//! Atomic rewrites of JSONL files.
//!
//! A collection file is never edited in place. The new contents go to a
//! sibling `.tmp` file which is flushed and then renamed over the target.
//! Renames within one filesystem are atomic on POSIX, so readers see either
//! the old file or the new one, never a torn write.

use crate::{JsonlWriter, Result};
use serde::Serialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs::File;

/// Atomically replaces `path` with one JSON line per value.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be created or written, a
/// value fails to serialize, or the final rename fails. On error the
/// original file is left unchanged and the temporary file is removed.
///
/// # Examples
///
/// ```no_run
/// use orgtree_jsonl::write_jsonl_atomic;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Manager {
///     id: String,
///     #[serde(rename = "reportsTo")]
///     reports_to: Option<String>,
/// }
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let managers = vec![
///     Manager { id: "u1".to_string(), reports_to: None },
///     Manager { id: "u2".to_string(), reports_to: Some("u1".to_string()) },
/// ];
/// write_jsonl_atomic("managers.jsonl", &managers).await?;
/// # Ok(())
/// # }
/// ```
pub async fn write_jsonl_atomic<T, P>(path: P, values: &[T]) -> Result<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    write_jsonl_atomic_iter(path, values.iter()).await
}

/// Iterator form of [`write_jsonl_atomic`].
///
/// # Errors
///
/// See [`write_jsonl_atomic`].
pub async fn write_jsonl_atomic_iter<T, I, P>(path: P, values: I) -> Result<()>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let temp_path = temp_path_for(path);

    if let Err(e) = write_to_temp_file(&temp_path, values).await {
        // Best-effort cleanup; the original error is what matters.
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e);
    }

    tokio::fs::rename(&temp_path, path).await?;
    tracing::trace!(path = %path.display(), "Atomically replaced JSONL file");
    Ok(())
}

/// `managers.jsonl` -> `managers.jsonl.tmp`, `managers` -> `managers.tmp`.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut temp_path = path.to_path_buf();
    let extension = match path.extension() {
        Some(ext) => {
            let mut ext = ext.to_os_string();
            ext.push(".tmp");
            ext
        }
        None => OsString::from("tmp"),
    };
    temp_path.set_extension(extension);
    temp_path
}

async fn write_to_temp_file<T, I>(temp_path: &Path, values: I) -> Result<()>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let file = File::create(temp_path).await?;
    let mut writer = JsonlWriter::new(file);
    writer.write_all(values).await?;
    writer.flush().await?;
    writer.into_inner().into_inner().sync_all().await?;
    Ok(())
}
