// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

use crate::domain::models::content_record::ContentRecord;
use crate::domain::repositories::content_record_repository::{
    ContentRecordRepository, RecordCriteria,
};
use crate::utils::errors::RepositoryError;

/// 文件中的一行
#[derive(Debug, Serialize, Deserialize)]
struct StoredRecord {
    id: Uuid,
    stored_at: DateTime<Utc>,
    #[serde(flatten)]
    record: ContentRecord,
}

/// JSON Lines 文件仓库
///
/// 每条记录一行，只追加；写入通过互斥锁串行化
pub struct JsonLinesRecordRepository {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonLinesRecordRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Vec<StoredRecord>, RepositoryError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut stored = Vec::new();
        for (line_no, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<StoredRecord>(line) {
                Ok(entry) => stored.push(entry),
                Err(e) => warn!(
                    path = %self.path.display(),
                    line = line_no + 1,
                    error = %e,
                    "跳过无法解析的记录行"
                ),
            }
        }
        Ok(stored)
    }
}

#[async_trait]
impl ContentRecordRepository for JsonLinesRecordRepository {
    async fn insert(&self, record: &ContentRecord) -> anyhow::Result<Uuid> {
        let _guard = self.write_lock.lock().await;

        if self
            .read_all()
            .await?
            .iter()
            .any(|stored| stored.record.fingerprint == record.fingerprint)
        {
            return Err(RepositoryError::AlreadyExists(record.url.clone()).into());
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(RepositoryError::from)?;
        }

        let entry = StoredRecord {
            id: Uuid::new_v4(),
            stored_at: Utc::now(),
            record: record.clone(),
        };
        let mut line = serde_json::to_string(&entry).map_err(RepositoryError::from)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(RepositoryError::from)?;
        file.write_all(line.as_bytes())
            .await
            .map_err(RepositoryError::from)?;
        file.flush().await.map_err(RepositoryError::from)?;

        Ok(entry.id)
    }

    async fn find(&self, criteria: &RecordCriteria) -> anyhow::Result<Vec<ContentRecord>> {
        Ok(self
            .read_all()
            .await?
            .into_iter()
            .map(|stored| stored.record)
            .filter(|record| criteria.matches(record))
            .collect())
    }
}
