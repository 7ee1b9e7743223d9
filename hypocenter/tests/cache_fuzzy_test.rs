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

//! Fuzzy test for the object cache against a naive reference model.

use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};

use hypocenter::prelude::{PublicObject, RingCache, RingConfig, Typed};
use hypocenter_model::{registry::Registry, test_utils::Pick};
use itertools::Itertools;
use rand::{rngs::SmallRng, Rng, SeedableRng};

const OPS: usize = 10_000;
const IDS: usize = 256;
const CAPACITY: usize = 64;
const INTERVAL: usize = 500;

#[test]
fn test_cache_fuzzy() {
    let registry = Registry::new();
    // Duplicate ids are part of the workload.
    registry.set_registration_enabled(false);

    let mut rng = SmallRng::seed_from_u64(20260821);

    let mut cache = RingCache::new(RingConfig { capacity: CAPACITY });

    // Reference model: ids in insertion order plus the live handles.
    let mut order: VecDeque<String> = VecDeque::new();
    let mut live: HashMap<String, Arc<dyn PublicObject>> = HashMap::new();

    for op in 0..OPS {
        let id = format!("Pick/{}", rng.random_range(0..IDS));
        match rng.random_range(0..100) {
            // feed
            0..55 => {
                let expected = !live.contains_key(&id);
                let pick = Pick::create_with_id(&registry, id.as_str(), "Pg").unwrap();
                let fed = cache.feed(pick.clone());
                assert_eq!(fed, expected, "feed mismatch, op: {op}, id: {id}");
                if fed {
                    order.push_back(id.clone());
                    live.insert(id.clone(), pick);
                    while order.len() > CAPACITY {
                        let evicted = order.pop_front().unwrap();
                        live.remove(&evicted);
                    }
                }
            }
            // find
            55..85 => {
                let expected = live.contains_key(&id);
                let found = cache.find(Pick::TYPE, &id);
                assert_eq!(found.is_some(), expected, "find mismatch, op: {op}, id: {id}");
                assert_eq!(cache.cached(), expected, "flag mismatch, op: {op}, id: {id}");
                if let Some(found) = found {
                    assert!(
                        std::ptr::addr_eq(Arc::as_ptr(&found), Arc::as_ptr(&live[&id])),
                        "identity mismatch, op: {op}, id: {id}",
                    );
                }
            }
            // remove
            85..97 => {
                if let Some(object) = live.get(&id) {
                    assert!(cache.remove(object), "remove mismatch, op: {op}, id: {id}");
                    live.remove(&id);
                    order.retain(|entry| entry != &id);
                } else {
                    // an uncached twin must not disturb the cache
                    let twin = Pick::create_with_id(&registry, id.as_str(), "Sg").unwrap();
                    assert!(
                        !cache.remove(&(twin as Arc<dyn PublicObject>)),
                        "phantom remove, op: {op}, id: {id}",
                    );
                }
            }
            // clear
            _ => {
                cache.clear();
                order.clear();
                live.clear();
            }
        }

        assert_eq!(cache.len(), order.len(), "len mismatch, op: {op}");
        assert_eq!(
            cache.oldest().map(|object| object.public_id().to_string()),
            order.front().cloned(),
            "oldest mismatch, op: {op}",
        );

        if op % INTERVAL == 0 {
            let ids = cache.iter().map(|item| item.id().to_string()).collect_vec();
            let expected = order.iter().cloned().collect_vec();
            assert_eq!(ids, expected, "order mismatch, op: {op}");
        }
    }
}
