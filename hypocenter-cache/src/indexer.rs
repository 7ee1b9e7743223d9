// Copyright 2026 hypocenter Project Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::Arc;

use hashbrown::hash_table::{Entry as HashTableEntry, HashTable};
use hypocenter_model::ident::PublicId;

use crate::item::CacheItem;

/// PublicID index over the cached items.
#[derive(Default)]
pub(crate) struct ItemIndex {
    table: HashTable<Arc<CacheItem>>,
}

impl ItemIndex {
    /// Insert `item`, returning the replaced item with the same id, if any.
    pub fn insert(&mut self, mut item: Arc<CacheItem>) -> Option<Arc<CacheItem>> {
        match self.table.entry(item.hash(), |i| i.id() == item.id(), |i| i.hash()) {
            HashTableEntry::Occupied(mut o) => {
                std::mem::swap(o.get_mut(), &mut item);
                Some(item)
            }
            HashTableEntry::Vacant(v) => {
                v.insert(item);
                None
            }
        }
    }

    pub fn get<Q>(&self, hash: u64, id: &Q) -> Option<&Arc<CacheItem>>
    where
        Q: std::hash::Hash + equivalent::Equivalent<PublicId> + ?Sized,
    {
        self.table.find(hash, |i| id.equivalent(i.id()))
    }

    pub fn remove<Q>(&mut self, hash: u64, id: &Q) -> Option<Arc<CacheItem>>
    where
        Q: std::hash::Hash + equivalent::Equivalent<PublicId> + ?Sized,
    {
        match self.table.entry(hash, |i| id.equivalent(i.id()), |i| i.hash()) {
            HashTableEntry::Occupied(o) => {
                let (item, _) = o.remove();
                Some(item)
            }
            HashTableEntry::Vacant(_) => None,
        }
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Arc<CacheItem>> + '_ {
        self.table.drain()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }
}

#[cfg(test)]
mod tests {
    use std::hash::BuildHasher;

    use hypocenter_common::{hasher::DefaultHashBuilder, time::now};
    use hypocenter_model::{prelude::Pick, public::PublicObject, registry::Registry};

    use super::*;

    fn item(registry: &Registry, hasher: &DefaultHashBuilder, id: &str) -> Arc<CacheItem> {
        let pick = Pick::create_with_id(registry, id, "Pg").unwrap();
        let id = pick.public_id().clone();
        let hash = hasher.hash_one(&id);
        Arc::new(CacheItem::new(pick, id, hash, now()))
    }

    #[test]
    fn test_index_round_trip() {
        let registry = Registry::new();
        registry.set_registration_enabled(false);
        let hasher = DefaultHashBuilder::default();
        let mut index = ItemIndex::default();

        let a = item(&registry, &hasher, "Pick/a");
        let b = item(&registry, &hasher, "Pick/b");

        assert!(index.insert(a.clone()).is_none());
        assert!(index.insert(b.clone()).is_none());
        assert_eq!(index.len(), 2);

        let found = index.get(a.hash(), "Pick/a").unwrap();
        assert!(Arc::ptr_eq(found, &a));
        assert!(index.get(hasher.hash_one("Pick/c"), "Pick/c").is_none());

        let removed = index.remove(b.hash(), "Pick/b").unwrap();
        assert!(Arc::ptr_eq(&removed, &b));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_index_replace() {
        let registry = Registry::new();
        registry.set_registration_enabled(false);
        let hasher = DefaultHashBuilder::default();
        let mut index = ItemIndex::default();

        let old = item(&registry, &hasher, "Pick/a");
        let new = item(&registry, &hasher, "Pick/a");

        assert!(index.insert(old.clone()).is_none());
        let replaced = index.insert(new.clone()).unwrap();
        assert!(Arc::ptr_eq(&replaced, &old));
        assert_eq!(index.len(), 1);

        let found = index.get(new.hash(), "Pick/a").unwrap();
        assert!(Arc::ptr_eq(found, &new));
    }
}
