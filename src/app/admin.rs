// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/admin.rs
//
// Raw row maintenance across every collection.

use super::WorkflowError;
use crate::records::{Collection, EditorSchema, Record, row_id};
use crate::services::record_store::RecordStore;

pub struct AdminConsole<'a, S> {
    store: &'a S,
}

impl<'a, S: RecordStore> AdminConsole<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub async fn list(&self, collection: Collection) -> Result<Vec<Record>, WorkflowError> {
        Ok(self.store.read_all(collection).await?)
    }

    /// Change one editable field of the row identified by `id` and write
    /// the whole row back.
    pub async fn set_field(
        &self,
        collection: Collection,
        id: &str,
        field: &str,
        value: &str,
    ) -> Result<Record, WorkflowError> {
        let id = id.trim();
        let mut row = self
            .store
            .read_all(collection)
            .await?
            .into_iter()
            .find(|row| row_id(row).as_deref().map(str::trim) == Some(id))
            .ok_or_else(|| WorkflowError::RowNotFound(id.to_string()))?;

        EditorSchema::for_collection(collection).set(&mut row, field, value)?;
        let outcome = self.store.write(collection, row.clone()).await?;
        WorkflowError::check(outcome)?;

        log::info!("Admin updated {field} of {collection} row {id}");
        Ok(row)
    }

    pub async fn delete(&self, collection: Collection, id: &str) -> Result<(), WorkflowError> {
        let id = id.trim();
        let outcome = self.store.delete(collection, id).await?;
        WorkflowError::check(outcome)?;
        log::info!("Admin deleted {collection} row {id}");
        Ok(())
    }
}
