//! 职位记录 JSON 文件
//!
//! 整体读、整体写。写入先落到同目录的临时文件，`sync` 后再 rename
//! 覆盖目标文件，中途崩溃时旧文件保持完整可读。

use crate::error::StoreError;
use crate::models::PostingStore;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// 读取记录文件，文件不存在时返回空记录
pub async fn load_store(path: &Path) -> Result<PostingStore, StoreError> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("📁 记录文件不存在，从空记录开始: {}", path.display());
            return Ok(PostingStore::new());
        }
        Err(source) => {
            return Err(StoreError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let store: PostingStore =
        serde_json::from_str(&content).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    check_records(path, &store)?;
    info!("📁 已加载 {} 个历史职位: {}", store.len(), path.display());
    Ok(store)
}

/// 覆盖写入记录文件
pub async fn save_store(path: &Path, store: &PostingStore) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(store).map_err(StoreError::Serialize)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| write_error(parent, source))?;
    }

    let tmp = temp_path(path);
    debug!("写入临时文件: {}", tmp.display());
    if let Err(e) = write_synced(&tmp, json.as_bytes()).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(write_error(&tmp, e));
    }

    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(write_error(path, e));
    }

    info!("💾 已保存 {} 个职位: {}", store.len(), path.display());
    Ok(())
}

async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_all().await
}

/// 每条记录至少有一个快照，且 `job_id` 与键一致
fn check_records(path: &Path, store: &PostingStore) -> Result<(), StoreError> {
    for (key, record) in store {
        let reason = if record.snapshots.is_empty() {
            "没有快照"
        } else if record.job_id != *key {
            "的 job_id 与键不一致"
        } else {
            continue;
        };
        return Err(StoreError::Corrupt {
            path: path.to_path_buf(),
            job_id: key.clone(),
            reason: reason.to_string(),
        });
    }
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "store.json".to_string());
    path.with_file_name(format!(".{}.tmp-{}", name, std::process::id()))
}

fn write_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Write {
        path: path.to_path_buf(),
        source,
    }
}
