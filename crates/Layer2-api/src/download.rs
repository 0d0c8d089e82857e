//! Artifact downloads
//!
//! The body is streamed into `<name>.part` next to the target and renamed once
//! complete, so an interrupted download never leaves a truncated artifact
//! under its final name.

use crate::error::{ApiError, ApiResult, Operation};
use castdesk_foundation::strings::last_segment;
use futures::{Stream, StreamExt};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

const PARTIAL_SUFFIX: &str = ".part";

/// File name for an artifact: last path segment of its URL, else `<task_id>.bin`
pub fn file_name_for(task_id: &str, file_url: &str) -> String {
    last_segment(file_url)
        .map(|name| name.replace('\\', "_"))
        .filter(|name| name != "." && name != "..")
        .unwrap_or_else(|| format!("{}.bin", task_id))
}

/// Stream `body` into `dest_dir/file_name`, creating the directory if needed
///
/// Returns the final path and the number of bytes written.
pub async fn write_stream<S, B, E>(
    body: S,
    dest_dir: &Path,
    file_name: &str,
) -> ApiResult<(PathBuf, u64)>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let op = Operation::Download;

    fs::create_dir_all(dest_dir)
        .await
        .map_err(|e| ApiError::io(op, e))?;

    let target = dest_dir.join(file_name);
    let partial = dest_dir.join(format!("{}{}", file_name, PARTIAL_SUFFIX));

    let written = match copy_into(body, &partial).await {
        Ok(n) => n,
        Err(e) => {
            let _ = fs::remove_file(&partial).await;
            return Err(e);
        }
    };

    fs::rename(&partial, &target)
        .await
        .map_err(|e| ApiError::io(op, e))?;

    Ok((target, written))
}

async fn copy_into<S, B, E>(mut body: S, path: &Path) -> ApiResult<u64>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let op = Operation::Download;
    let mut file = fs::File::create(path)
        .await
        .map_err(|e| ApiError::io(op, e))?;

    let mut written = 0u64;
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| ApiError::network(op, e))?;
        let bytes = chunk.as_ref();
        file.write_all(bytes)
            .await
            .map_err(|e| ApiError::io(op, e))?;
        written += bytes.len() as u64;
    }

    file.flush().await.map_err(|e| ApiError::io(op, e))?;
    Ok(written)
}
