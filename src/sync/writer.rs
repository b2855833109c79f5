//! Backup-then-write for a single destination file.

use chrono::Utc;
use std::io;
use std::path::{Path, PathBuf};

/// Outcome of one successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub backup: Option<PathBuf>,
}

/// `<path>.backup.<unix millis>`
pub fn backup_path(path: &Path, unix_millis: i64) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".backup.{}", unix_millis));
    PathBuf::from(name)
}

/// Copy an existing destination aside, create parent directories, then write.
pub async fn write_with_backup(path: &Path, contents: &str) -> io::Result<WrittenFile> {
    let backup = match tokio::fs::metadata(path).await {
        Ok(_) => {
            let target = backup_path(path, Utc::now().timestamp_millis());
            tokio::fs::copy(path, &target).await?;
            Some(target)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => return Err(e),
    };
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents).await?;
    Ok(WrittenFile {
        path: path.to_path_buf(),
        backup,
    })
}
