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

use std::{
    fmt::Debug,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use bitflags::bitflags;
use hypocenter_common::time::Timestamp;
use hypocenter_model::{ident::PublicId, public::PublicObject};
use intrusive_collections::{intrusive_adapter, LinkedListAtomicLink};

bitflags! {
    #[derive(Debug, Clone, Copy)]
    pub(crate) struct Flags: u64 {
        const IN_ORDER = 0b00000001;
        const IN_INDEX = 0b00000010;
    }
}

/// A cached object with its bookkeeping.
///
/// Items sit in the insertion-order list and the id index at the same time.
/// The flags track which of the two currently hold the item.
pub struct CacheItem {
    object: Arc<dyn PublicObject>,
    id: PublicId,
    hash: u64,
    stamp: Timestamp,
    link: LinkedListAtomicLink,
    flags: AtomicU64,
}

impl Debug for CacheItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheItem")
            .field("id", &self.id)
            .field("stamp", &self.stamp)
            .finish()
    }
}

intrusive_adapter!(pub(crate) ItemAdapter = Arc<CacheItem>: CacheItem { link: LinkedListAtomicLink });

impl CacheItem {
    pub(crate) fn new(object: Arc<dyn PublicObject>, id: PublicId, hash: u64, stamp: Timestamp) -> Self {
        Self {
            object,
            id,
            hash,
            stamp,
            link: LinkedListAtomicLink::new(),
            flags: AtomicU64::new(Flags::empty().bits()),
        }
    }

    /// The cached object.
    pub fn object(&self) -> &Arc<dyn PublicObject> {
        &self.object
    }

    /// PublicID the object is cached under.
    pub fn id(&self) -> &PublicId {
        &self.id
    }

    /// Hash of the id under the owning cache's hash builder.
    pub(crate) fn hash(&self) -> u64 {
        self.hash
    }

    /// Feed time of the item.
    pub fn stamp(&self) -> Timestamp {
        self.stamp
    }

    /// Set in order list flag with release memory order.
    pub(crate) fn set_in_order(&self, val: bool) {
        self.set_flags(Flags::IN_ORDER, val, Ordering::Release);
    }

    /// Get in order list flag with acquire memory order.
    pub(crate) fn is_in_order(&self) -> bool {
        self.get_flags(Ordering::Acquire).contains(Flags::IN_ORDER)
    }

    /// Set in index flag with release memory order.
    pub(crate) fn set_in_index(&self, val: bool) {
        self.set_flags(Flags::IN_INDEX, val, Ordering::Release);
    }

    /// Get in index flag with acquire memory order.
    pub(crate) fn is_in_index(&self) -> bool {
        self.get_flags(Ordering::Acquire).contains(Flags::IN_INDEX)
    }

    fn set_flags(&self, flags: Flags, val: bool, order: Ordering) {
        match val {
            true => self.flags.fetch_or(flags.bits(), order),
            false => self.flags.fetch_and(!flags.bits(), order),
        };
    }

    fn get_flags(&self, order: Ordering) -> Flags {
        Flags::from_bits_truncate(self.flags.load(order))
    }
}
