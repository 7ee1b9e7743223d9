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

//! Utilities for testing.

use std::{
    fmt::Debug,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use hashbrown::HashMap;
use hypocenter_model::{
    ident::{PublicId, TypeInfo},
    public::PublicObject,
};
use parking_lot::Mutex;

use crate::archive::Archive;

/// In-memory [`Archive`] backed by a map, with a load counter.
#[derive(Default)]
pub struct MemoryArchive {
    objects: Mutex<HashMap<PublicId, Arc<dyn PublicObject>>>,
    loads: AtomicUsize,
}

impl Debug for MemoryArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryArchive")
            .field("len", &self.objects.lock().len())
            .field("loads", &self.loads)
            .finish()
    }
}

impl MemoryArchive {
    /// An empty archive.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Store `object` under its publicID.
    pub fn put(&self, object: Arc<dyn PublicObject>) {
        self.objects.lock().insert(object.public_id().clone(), object);
    }

    /// How many lookups hit this archive so far.
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }
}

impl Archive for MemoryArchive {
    fn get_object(&self, type_info: TypeInfo, id: &str) -> Option<Arc<dyn PublicObject>> {
        self.loads.fetch_add(1, Ordering::Relaxed);
        let objects = self.objects.lock();
        let object = objects.get(id)?;
        (object.type_info() == type_info).then(|| object.clone())
    }
}
