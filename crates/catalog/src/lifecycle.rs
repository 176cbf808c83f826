#![forbid(unsafe_code)]

use crate::error::{CatalogError, map_store};
use serde_json::Value;
use sq_core::metrics::{self, StatsView};
use sq_core::model::StatsRecord;
use sq_core::normalize::normalize_quest;
use sq_core::{QuestId, ValidationError};
use sq_storage::{QuestRow, SqliteStore, StoreError};
use std::path::Path;

/// The catalog surface: validation, lifecycle, stats views, analytics
/// rebuild, and the global-config singleton, all over one store.
#[derive(Debug)]
pub struct Catalog {
    pub(crate) store: SqliteStore,
}

impl Catalog {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, CatalogError> {
        Ok(Self {
            store: SqliteStore::open(storage_dir)?,
        })
    }

    /// Creates a new quest from a raw payload. Starts at the
    /// caller-specified activation (normalizer default: draft), version 1.
    pub fn create_quest(&mut self, raw: &Value, actor: &str) -> Result<QuestRow, CatalogError> {
        let record = normalize_quest(raw)?;
        let id = record.s_quest_id.clone();
        self.store
            .insert_quest(&record, actor)
            .map_err(|err| map_store(&id, err))
    }

    pub fn get_quest(&self, id: &str) -> Result<QuestRow, CatalogError> {
        self.store
            .get_quest(id)?
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    pub fn list_quests(
        &self,
        active: Option<bool>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<QuestRow>, CatalogError> {
        Ok(self.store.list_quests(active, limit, offset)?)
    }

    pub fn list_quests_by_domain(
        &self,
        domain: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<QuestRow>, CatalogError> {
        Ok(self.store.list_quests_by_domain(domain, limit, offset)?)
    }

    /// Shallow-merges the raw payload over the stored document, re-runs the
    /// full normalizer, and writes with version+1. `expected_version` opts
    /// into compare-and-swap; `None` keeps last-writer-wins. Any failure
    /// leaves the record untouched.
    pub fn update_quest(
        &mut self,
        id: &str,
        raw: &Value,
        actor: &str,
        expected_version: Option<i64>,
    ) -> Result<QuestRow, CatalogError> {
        let current = self.get_quest(id)?;
        let merged = merge_payload(&serde_json::to_value(&current.record)?, raw)?;
        let record = normalize_quest(&merged)?;
        if record.s_quest_id != id {
            return Err(ValidationError::new("sQuestId", "is immutable").into());
        }
        self.store
            .update_quest(id, expected_version, &record, actor)
            .map_err(|err| map_store(id, err))
    }

    /// Publish/unpublish. Content fields are untouched, but this is still a
    /// state-affecting write: version and update audit move.
    pub fn set_active(
        &mut self,
        id: &str,
        active: bool,
        actor: &str,
    ) -> Result<QuestRow, CatalogError> {
        let current = self.get_quest(id)?;
        let mut record = current.record;
        record.is_active = active;
        self.store
            .update_quest(id, None, &record, actor)
            .map_err(|err| map_store(id, err))
    }

    /// Copies an existing quest under a fresh identifier. Duplicates always
    /// land as drafts at version 1, whatever the source state.
    pub fn duplicate_quest(
        &mut self,
        id: &str,
        new_id: &str,
        actor: &str,
    ) -> Result<QuestRow, CatalogError> {
        let new_id = QuestId::try_new(new_id)
            .map_err(|err| ValidationError::new("newId", err.to_string()))?;
        let source = self.get_quest(id)?;
        let mut record = source.record;
        record.s_quest_id = new_id.as_str().to_string();
        record.slug = new_id.as_str().to_string();
        record.is_active = false;
        self.store
            .insert_quest(&record, actor)
            .map_err(|err| map_store(new_id.as_str(), err))
    }

    /// Raw counters plus the derived rates, recomputed on every call.
    pub fn stats_view(&self, id: &str) -> Result<StatsView, CatalogError> {
        let record = self
            .store
            .get_stats(id)?
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
        Ok(metrics::stats_view(record))
    }

    /// Counter ingestion seam; usage events originate outside this core.
    pub fn record_stats(&mut self, record: &StatsRecord) -> Result<(), CatalogError> {
        if self.store.get_quest(&record.s_quest_id)?.is_none() {
            return Err(map_store(&record.s_quest_id, StoreError::UnknownId));
        }
        Ok(self.store.put_stats(record)?)
    }
}

fn merge_payload(current: &Value, patch: &Value) -> Result<Value, CatalogError> {
    let patch = sq_core::fields::require_object(patch, "payload")
        .map_err(CatalogError::Validation)?;
    let mut merged = current.clone();
    let Some(target) = merged.as_object_mut() else {
        return Err(StoreError::InvalidInput("stored record is not an object").into());
    };
    for (key, value) in patch {
        target.insert(key.clone(), value.clone());
    }
    Ok(merged)
}
