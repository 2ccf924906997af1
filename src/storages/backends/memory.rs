//! In-memory storage backend.
//!
//! Used by the test suite and as a zero-setup dev backend. `DashMap` shards
//! give the same guarantee the SQL backends get from relative updates: the
//! view counter is bumped under the entry lock, so concurrent increments
//! never lose updates.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::errors::{LinkmarkError, Result};
use crate::storages::Storage;
use crate::structs::{Collection, CollectionAccess, EntityKind, Resource, ShortLink};
use crate::utils::normalize_email;

#[derive(Default)]
pub struct MemoryStorage {
    links: DashMap<String, ShortLink>,
    links_by_entity: DashMap<(EntityKind, i64), String>,
    resources: DashMap<i64, Resource>,
    collections: DashMap<i64, Collection>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get_short_link(&self, code: &str) -> Result<Option<ShortLink>> {
        Ok(self.links.get(code).map(|entry| entry.clone()))
    }

    async fn find_short_link_for(
        &self,
        kind: EntityKind,
        entity_id: i64,
    ) -> Result<Option<ShortLink>> {
        let code = match self.links_by_entity.get(&(kind, entity_id)) {
            Some(entry) => entry.clone(),
            None => return Ok(None),
        };

        Ok(self.links.get(&code).map(|entry| entry.clone()))
    }

    async fn create_short_link(&self, link: ShortLink) -> Result<()> {
        use dashmap::mapref::entry::Entry;

        // 先占 (kind, entity) 槽位，保证每个实体只有一个短码
        match self.links_by_entity.entry((link.kind, link.entity_id)) {
            Entry::Occupied(_) => {
                return Err(LinkmarkError::conflict(format!(
                    "Entity {} {} already has a short link",
                    link.kind, link.entity_id
                )));
            }
            Entry::Vacant(slot) => {
                match self.links.entry(link.short_code.clone()) {
                    Entry::Occupied(_) => {
                        return Err(LinkmarkError::conflict(format!(
                            "Short code already taken: {}",
                            link.short_code
                        )));
                    }
                    Entry::Vacant(code_slot) => {
                        code_slot.insert(link.clone());
                    }
                }
                slot.insert(link.short_code.clone());
            }
        }

        Ok(())
    }

    async fn get_resource(&self, id: i64) -> Result<Option<Resource>> {
        Ok(self.resources.get(&id).map(|entry| entry.clone()))
    }

    async fn get_collection(&self, id: i64) -> Result<Option<Collection>> {
        Ok(self.collections.get(&id).map(|entry| entry.clone()))
    }

    async fn upsert_resource(&self, mut resource: Resource) -> Result<()> {
        use dashmap::mapref::entry::Entry;

        // 与 SQL 后端一致，在存储边界做邮箱归一化
        resource.owner_email = normalize_email(&resource.owner_email);
        for email in &mut resource.restricted_to {
            *email = normalize_email(email);
        }

        match self.resources.entry(resource.id) {
            Entry::Occupied(mut slot) => {
                // 保留已累计的浏览数
                let view_count = slot.get().view_count;
                let mut updated = resource;
                updated.view_count = view_count;
                slot.insert(updated);
            }
            Entry::Vacant(slot) => {
                slot.insert(resource);
            }
        }

        Ok(())
    }

    async fn upsert_collection(&self, mut collection: Collection) -> Result<()> {
        if let CollectionAccess::Restricted { entries } = &mut collection.access {
            for entry in entries {
                entry.email = normalize_email(&entry.email);
            }
        }

        self.collections.insert(collection.id, collection);
        Ok(())
    }

    async fn increment_resource_views(&self, id: i64) -> Result<()> {
        match self.resources.get_mut(&id) {
            Some(mut resource) => {
                resource.view_count += 1;
                Ok(())
            }
            None => Err(LinkmarkError::not_found(format!("Resource not found: {}", id))),
        }
    }

    async fn backend_name(&self) -> String {
        "memory".to_string()
    }
}
