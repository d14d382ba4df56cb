// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::domain::models::content_record::ContentRecord;
use crate::domain::repositories::content_record_repository::{
    ContentRecordRepository, RecordCriteria,
};
use crate::utils::errors::RepositoryError;

/// 内存记录仓库
///
/// 按插入顺序保存，同一指纹只允许一条
#[derive(Default)]
pub struct InMemoryRecordRepository {
    records: RwLock<Vec<(Uuid, ContentRecord)>>,
}

impl InMemoryRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl ContentRecordRepository for InMemoryRecordRepository {
    async fn insert(&self, record: &ContentRecord) -> anyhow::Result<Uuid> {
        let mut records = self.records.write();
        if records
            .iter()
            .any(|(_, existing)| existing.fingerprint == record.fingerprint)
        {
            return Err(RepositoryError::AlreadyExists(record.url.clone()).into());
        }

        let id = Uuid::new_v4();
        records.push((id, record.clone()));
        Ok(id)
    }

    async fn find(&self, criteria: &RecordCriteria) -> anyhow::Result<Vec<ContentRecord>> {
        Ok(self
            .records
            .read()
            .iter()
            .filter(|(_, record)| criteria.matches(record))
            .map(|(_, record)| record.clone())
            .collect())
    }
}
