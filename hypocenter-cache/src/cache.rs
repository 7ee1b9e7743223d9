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
    sync::Arc,
    time::{Duration, Instant},
};

use hypocenter_common::{
    error::Result,
    hasher::{DefaultHashBuilder, HashBuilder},
    metrics::model::Metrics,
    strict_assert, strict_assert_eq,
    time::{now, TimeWindow, Timestamp},
};
use hypocenter_model::{
    ident::{PublicId, TypeInfo, Typed},
    public::PublicObject,
};
use intrusive_collections::LinkedList;

use crate::{
    archive::Archive,
    eviction::{
        ring::{Ring, RingConfig},
        span::{Span, SpanConfig},
        Eviction,
    },
    indexer::ItemIndex,
    item::{CacheItem, ItemAdapter},
};

/// Hook invoked with the object entering or leaving a cache.
pub type CacheCallback = Box<dyn Fn(&Arc<dyn PublicObject>) + Send + Sync>;

/// Builder for an [`ObjectCache`].
pub struct ObjectCacheBuilder<E, S = DefaultHashBuilder>
where
    E: Eviction,
    S: HashBuilder,
{
    config: E::Config,
    hash_builder: S,
    archive: Option<Arc<dyn Archive>>,
    on_push: Option<CacheCallback>,
    on_pop: Option<CacheCallback>,
    metrics: Option<Arc<Metrics>>,
}

impl<E> ObjectCacheBuilder<E>
where
    E: Eviction,
{
    /// Builder with the given eviction config and defaults elsewhere.
    pub fn new(config: E::Config) -> Self {
        Self {
            config,
            hash_builder: DefaultHashBuilder::default(),
            archive: None,
            on_push: None,
            on_pop: None,
            metrics: None,
        }
    }
}

impl<E, S> ObjectCacheBuilder<E, S>
where
    E: Eviction,
    S: HashBuilder,
{
    /// Attach the fallback archive consulted on lookup misses.
    pub fn with_archive(mut self, archive: Arc<dyn Archive>) -> Self {
        self.archive = Some(archive);
        self
    }

    /// Hook invoked after an object entered the cache.
    pub fn with_push_callback(
        mut self,
        f: impl Fn(&Arc<dyn PublicObject>) + Send + Sync + 'static,
    ) -> Self {
        self.on_push = Some(Box::new(f));
        self
    }

    /// Hook invoked with the evicted object, before the cache lets go of it.
    pub fn with_pop_callback(
        mut self,
        f: impl Fn(&Arc<dyn PublicObject>) + Send + Sync + 'static,
    ) -> Self {
        self.on_pop = Some(Box::new(f));
        self
    }

    /// Report to the given metrics instead of a noop one.
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Swap the hash builder used by the id index.
    pub fn with_hash_builder<OS>(self, hash_builder: OS) -> ObjectCacheBuilder<E, OS>
    where
        OS: HashBuilder,
    {
        ObjectCacheBuilder {
            config: self.config,
            hash_builder,
            archive: self.archive,
            on_push: self.on_push,
            on_pop: self.on_pop,
            metrics: self.metrics,
        }
    }

    /// Build the cache.
    pub fn build(self) -> ObjectCache<E, S> {
        ObjectCache {
            order: LinkedList::new(ItemAdapter::new()),
            index: ItemIndex::default(),
            eviction: E::new(&self.config),
            hash_builder: self.hash_builder,
            archive: self.archive,
            on_push: self.on_push,
            on_pop: self.on_pop,
            cached: false,
            len: 0,
            metrics: self.metrics.unwrap_or_else(|| Arc::new(Metrics::noop())),
        }
    }
}

/// A bounded object cache with FIFO eviction and archive fallback.
///
/// Objects enter through [`feed`] or through [`find`] misses served by the
/// attached [`Archive`]. The [`Eviction`] policy decides when the oldest
/// entry has to go. Lookup hits do not reorder entries.
///
/// The cache holds strong references. Eviction drops them, which for an
/// otherwise unreferenced object tears the object down and broadcasts its
/// destruction through the registry.
///
/// [`feed`]: ObjectCache::feed
/// [`find`]: ObjectCache::find
pub struct ObjectCache<E, S = DefaultHashBuilder>
where
    E: Eviction,
    S: HashBuilder,
{
    /// Insertion order, oldest at the front.
    order: LinkedList<ItemAdapter>,
    index: ItemIndex,
    eviction: E,
    hash_builder: S,

    archive: Option<Arc<dyn Archive>>,
    on_push: Option<CacheCallback>,
    on_pop: Option<CacheCallback>,

    cached: bool,
    len: usize,

    metrics: Arc<Metrics>,
}

impl<E, S> Debug for ObjectCache<E, S>
where
    E: Eviction,
    S: HashBuilder,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectCache")
            .field("len", &self.len)
            .field("cached", &self.cached)
            .finish()
    }
}

impl<E> ObjectCache<E>
where
    E: Eviction,
{
    /// Cache with the given eviction config and defaults elsewhere.
    pub fn new(config: E::Config) -> Self {
        ObjectCacheBuilder::new(config).build()
    }
}

impl<E, S> ObjectCache<E, S>
where
    E: Eviction,
    S: HashBuilder,
{
    /// Feed `object` stamped with the current time.
    ///
    /// Returns `false` if its publicID is already cached. The eviction bound
    /// is enforced afterwards, which may evict the object just fed.
    pub fn feed(&mut self, object: Arc<dyn PublicObject>) -> bool {
        self.feed_at(object, now())
    }

    /// Feed `object` with an explicit stamp.
    pub fn feed_at(&mut self, object: Arc<dyn PublicObject>, stamp: Timestamp) -> bool {
        let id = object.public_id().clone();
        let hash = self.hash_builder.hash_one(&id);

        if self.index.get(hash, &id).is_some() {
            tracing::trace!("[cache]: ignore feed (id: {}), already cached", id);
            return false;
        }

        self.push(object, id, hash, stamp);
        self.enforce();
        true
    }

    /// Look up a live object by publicID, falling back to the archive.
    ///
    /// A cache hit answers directly and sets [`cached`] to `true`. On a miss
    /// the attached archive is consulted; a loaded object enters the cache
    /// through the regular push path, subject to eviction, with [`cached`]
    /// left `false`. A total miss is no error, just `None`.
    ///
    /// A hit whose cached object is not a `type_info` returns `None` without
    /// consulting the archive.
    ///
    /// [`cached`]: ObjectCache::cached
    pub fn find(&mut self, type_info: TypeInfo, id: &str) -> Option<Arc<dyn PublicObject>> {
        let hash = self.hash_builder.hash_one(id);

        if let Some(item) = self.index.get(hash, id) {
            self.cached = true;
            self.metrics.cache_hit.increase(1);
            if item.object().type_info() != type_info {
                tracing::warn!(
                    "[cache]: reject find (id: {}), cached as {}, requested as {}",
                    item.id(),
                    item.object().type_info(),
                    type_info,
                );
                return None;
            }
            return Some(item.object().clone());
        }

        self.cached = false;
        self.metrics.cache_miss.increase(1);

        let archive = self.archive.as_ref()?;
        let start = Instant::now();
        let loaded = archive.get_object(type_info, id);
        self.metrics.cache_load_duration.record(start.elapsed().as_secs_f64());
        let loaded = loaded?;
        self.metrics.cache_load.increase(1);

        if loaded.public_id().as_str() != id || loaded.type_info() != type_info {
            tracing::warn!(
                "[cache]: discard archive object (requested: {} {}, loaded: {} {})",
                type_info,
                id,
                loaded.type_info(),
                loaded.public_id(),
            );
            return None;
        }

        let loaded_id = loaded.public_id().clone();
        let stamp = now();
        loaded.set_archived_at(Some(stamp));
        self.push(loaded.clone(), loaded_id, hash, stamp);
        self.enforce();
        Some(loaded)
    }

    /// [`find`] with the type derived from `T`, downcast to it.
    ///
    /// [`find`]: ObjectCache::find
    pub fn find_as<T>(&mut self, id: &str) -> Option<Arc<T>>
    where
        T: PublicObject + Typed,
    {
        self.find(T::TYPE, id)?.into_any().downcast::<T>().ok()
    }

    /// Whether the most recent [`find`] was served from the cache.
    ///
    /// [`find`]: ObjectCache::find
    pub fn cached(&self) -> bool {
        self.cached
    }

    /// Drop `object` from the cache, by object identity.
    ///
    /// Returns `false` if this very object is not cached. No callback fires
    /// and the archive is not involved.
    pub fn remove(&mut self, object: &Arc<dyn PublicObject>) -> bool {
        let id = object.public_id();
        let hash = self.hash_builder.hash_one(id);

        let cached = matches!(
            self.index.get(hash, id),
            Some(item) if std::ptr::addr_eq(Arc::as_ptr(item.object()), Arc::as_ptr(object))
        );
        if !cached {
            return false;
        }

        let Some(item) = self.index.remove(hash, id) else {
            return false;
        };
        strict_assert!(item.is_in_index());
        item.set_in_index(false);

        strict_assert!(item.is_in_order());
        // Safety: an indexed item is always linked in `order`.
        let mut cursor = unsafe { self.order.cursor_mut_from_ptr(Arc::as_ptr(&item)) };
        let removed = cursor.remove();
        strict_assert!(removed.is_some());
        item.set_in_order(false);
        self.len -= 1;

        self.metrics.cache_remove.increase(1);
        self.metrics.cache_usage.absolute(self.len as u64);
        true
    }

    /// Drop all entries. No callbacks fire and the archive is not involved.
    pub fn clear(&mut self) {
        self.index.drain().for_each(|item| item.set_in_index(false));
        while let Some(item) = self.order.pop_front() {
            item.set_in_order(false);
        }
        self.len = 0;
        self.metrics.cache_usage.absolute(0);
    }

    /// Whether `id` is currently cached. Does not touch the hit/miss flag.
    pub fn contains(&self, id: &str) -> bool {
        let hash = self.hash_builder.hash_one(id);
        self.index.get(hash, id).is_some()
    }

    /// Stamp range covered by the cache, oldest to newest feed.
    pub fn time_window(&self) -> Option<TimeWindow> {
        let oldest = self.order.front().get()?.stamp();
        let newest = self.order.back().get()?.stamp();
        // Backdated feeds can invert the ends. No window is reported then.
        (oldest <= newest).then(|| TimeWindow::new(oldest, newest))
    }

    /// The oldest cached object, next in line for eviction.
    pub fn oldest(&self) -> Option<Arc<dyn PublicObject>> {
        self.order.front().get().map(|item| item.object().clone())
    }

    /// Iterate the cached items from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &CacheItem> + '_ {
        self.order.iter()
    }

    /// Count of cached objects.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The eviction policy.
    pub fn eviction(&self) -> &E {
        &self.eviction
    }

    /// Apply a new eviction config. Enforced on the next feed.
    pub fn update_eviction(&mut self, config: &E::Config) -> Result<()> {
        self.eviction.update(config)
    }

    /// Attach or replace the fallback archive. `None` disables fallback.
    pub fn set_archive(&mut self, archive: Option<Arc<dyn Archive>>) {
        self.archive = archive;
    }

    fn push(&mut self, object: Arc<dyn PublicObject>, id: PublicId, hash: u64, stamp: Timestamp) {
        let item = Arc::new(CacheItem::new(object, id, hash, stamp));

        self.order.push_back(item.clone());
        item.set_in_order(true);
        self.len += 1;

        let replaced = self.index.insert(item.clone());
        item.set_in_index(true);
        strict_assert!(replaced.is_none());

        self.metrics.cache_feed.increase(1);

        if let Some(on_push) = self.on_push.as_ref() {
            on_push(item.object());
        }
    }

    fn enforce(&mut self) {
        while self.eviction.overflow(self.len, self.time_window()) {
            let Some(item) = self.pop_oldest() else {
                break;
            };
            self.metrics.cache_evict.increase(1);
            if let Some(on_pop) = self.on_pop.as_ref() {
                on_pop(item.object());
            }
        }
        strict_assert_eq!(self.index.len(), self.len);
        self.metrics.cache_usage.absolute(self.len as u64);
    }

    fn pop_oldest(&mut self) -> Option<Arc<CacheItem>> {
        let item = self.order.pop_front()?;
        item.set_in_order(false);
        self.len -= 1;

        let indexed = self.index.remove(item.hash(), item.id());
        strict_assert!(indexed.is_some());
        if let Some(indexed) = indexed {
            indexed.set_in_index(false);
            strict_assert!(Arc::ptr_eq(&indexed, &item));
        }

        Some(item)
    }
}

impl<S> ObjectCache<Ring, S>
where
    S: HashBuilder,
{
    /// Rebound the ring. Takes effect on the next feed.
    pub fn set_capacity(&mut self, capacity: usize) -> Result<()> {
        self.update_eviction(&RingConfig { capacity })
    }
}

impl<S> ObjectCache<Span, S>
where
    S: HashBuilder,
{
    /// Rebound the span. Takes effect on the next feed.
    pub fn set_span(&mut self, span: Duration) -> Result<()> {
        self.update_eviction(&SpanConfig { span })
    }
}

/// Object cache bounded by entry count.
pub type RingCache<S = DefaultHashBuilder> = ObjectCache<Ring, S>;

/// Object cache bounded by time span.
pub type SpanCache<S = DefaultHashBuilder> = ObjectCache<Span, S>;

#[cfg(test)]
mod tests {
    use hypocenter_common::time::TimeSpan;
    use hypocenter_model::{
        object::Object,
        prelude::{Event, Pick},
        registry::Registry,
        test_utils::DropRecorder,
    };
    use itertools::Itertools;
    use parking_lot::Mutex;

    use super::*;
    use crate::test_utils::MemoryArchive;

    fn is_send_sync_static<T: Send + Sync + 'static>() {}

    #[test]
    fn test_send_sync_static() {
        is_send_sync_static::<RingCache>();
        is_send_sync_static::<SpanCache>();
    }

    fn as_public(event: &Arc<Event>) -> Arc<dyn PublicObject> {
        event.clone()
    }

    fn events(registry: &Registry, n: usize) -> Vec<Arc<Event>> {
        (0..n)
            .map(|i| Event::create_with_id(registry, format!("Event/{i}"), "east ridge").unwrap())
            .collect()
    }

    #[test]
    fn test_ring_bound() {
        let registry = Registry::new();
        let events = events(&registry, 5);
        let mut cache = RingCache::new(RingConfig { capacity: 2 });

        for event in &events {
            assert!(cache.feed(as_public(event)));
        }

        assert_eq!(cache.len(), 2);
        for event in &events[..3] {
            assert!(!cache.contains(event.public_id()));
        }
        for event in &events[3..] {
            assert!(cache.contains(event.public_id()));
        }
        assert_eq!(
            cache.oldest().unwrap().public_id().as_str(),
            events[3].public_id().as_str()
        );
    }

    #[test]
    fn test_duplicate_feed() {
        let registry = Registry::new();
        let event = Event::create_with_id(&registry, "Event/a", "east ridge").unwrap();
        let mut cache = RingCache::new(RingConfig { capacity: 8 });

        assert!(cache.feed(as_public(&event)));
        assert!(!cache.feed(as_public(&event)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_round_trip() {
        let registry = Registry::new();
        let event = Event::create_with_id(&registry, "Event/a", "east ridge").unwrap();
        let mut cache = RingCache::new(RingConfig { capacity: 8 });

        cache.feed(as_public(&event));

        let found = cache.find(Event::TYPE, "Event/a").unwrap();
        assert!(cache.cached());
        assert!(std::ptr::addr_eq(
            Arc::as_ptr(&found),
            Arc::as_ptr(&as_public(&event))
        ));

        let found = cache.find_as::<Event>("Event/a").unwrap();
        assert!(cache.cached());
        assert!(Arc::ptr_eq(&found, &event));
    }

    #[test]
    fn test_find_without_archive() {
        let registry = Registry::new();
        let _event = Event::create_with_id(&registry, "Event/a", "east ridge").unwrap();
        let mut cache = RingCache::new(RingConfig { capacity: 8 });

        assert!(cache.find(Event::TYPE, "Event/a").is_none());
        assert!(!cache.cached());
    }

    #[test]
    fn test_miss_then_load() {
        let registry = Registry::new();
        let event = Event::create_with_id(&registry, "Event/a", "east ridge").unwrap();

        let archive = MemoryArchive::new();
        archive.put(as_public(&event));

        let mut cache = RingCache::new(RingConfig { capacity: 8 });
        cache.set_archive(Some(archive.clone()));

        let loaded = cache.find(Event::TYPE, "Event/a").unwrap();
        assert!(!cache.cached());
        assert!(Arc::ptr_eq(&loaded.clone().into_any().downcast::<Event>().unwrap(), &event));
        assert!(loaded.archived_at().is_some());
        assert_eq!(archive.loads(), 1);

        let again = cache.find(Event::TYPE, "Event/a").unwrap();
        assert!(cache.cached());
        assert!(std::ptr::addr_eq(Arc::as_ptr(&again), Arc::as_ptr(&loaded)));
        assert_eq!(archive.loads(), 1);
    }

    #[test_log::test]
    fn test_type_mismatch_hit() {
        let registry = Registry::new();
        let pick = Pick::create_with_id(&registry, "Pick/a", "Pg").unwrap();

        let archive = MemoryArchive::new();
        let mut cache = RingCache::new(RingConfig { capacity: 8 });
        cache.set_archive(Some(archive.clone()));

        cache.feed(pick.clone());

        // wrong type on a hit answers None without consulting the archive
        assert!(cache.find(Event::TYPE, "Pick/a").is_none());
        assert!(cache.cached());
        assert_eq!(archive.loads(), 0);
        assert!(cache.contains("Pick/a"));
    }

    #[test]
    fn test_no_reorder_on_hit() {
        let registry = Registry::new();
        let events = events(&registry, 3);
        let mut cache = RingCache::new(RingConfig { capacity: 2 });

        cache.feed(as_public(&events[0]));
        cache.feed(as_public(&events[1]));

        // a hit must not move the oldest entry to safety
        assert!(cache.find(Event::TYPE, events[0].public_id()).is_some());
        cache.feed(as_public(&events[2]));

        assert!(!cache.contains(events[0].public_id()));
        assert!(cache.contains(events[1].public_id()));
        assert!(cache.contains(events[2].public_id()));
    }

    #[test]
    fn test_span_bound() {
        let registry = Registry::new();
        let events = events(&registry, 4);
        let mut cache = SpanCache::new(SpanConfig {
            span: Duration::from_secs(60),
        });

        let base = now();
        cache.feed_at(as_public(&events[0]), base);
        cache.feed_at(as_public(&events[1]), base + TimeSpan::seconds(30));
        // sitting exactly on the bound is not over it
        cache.feed_at(as_public(&events[2]), base + TimeSpan::seconds(60));
        assert_eq!(cache.len(), 3);

        // 91s and 61s behind the newest pushes the first two out
        cache.feed_at(as_public(&events[3]), base + TimeSpan::seconds(91));
        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(events[0].public_id()));
        assert!(!cache.contains(events[1].public_id()));
        assert!(cache.contains(events[2].public_id()));

        let window = cache.time_window().unwrap();
        assert_eq!(window.length(), TimeSpan::seconds(31));
    }

    #[test]
    fn test_backdated_feed() {
        let registry = Registry::new();
        let events = events(&registry, 2);
        let mut cache = SpanCache::new(SpanConfig {
            span: Duration::from_secs(60),
        });

        let base = now();
        cache.feed_at(as_public(&events[0]), base);
        cache.feed_at(as_public(&events[1]), base - TimeSpan::seconds(3600));

        // inverted stamps do not panic and do not evict
        assert_eq!(cache.len(), 2);
        assert!(cache.time_window().is_none());
    }

    #[test]
    fn test_remove_by_identity() {
        let registry = Registry::new();
        let cached = Event::create_with_id(&registry, "Event/a", "east ridge").unwrap();
        let mut cache = RingCache::new(RingConfig { capacity: 8 });

        cache.feed(as_public(&cached));

        // an impostor under the same id is not the cached object
        let impostor = cached.clone_object();
        let impostor = impostor.into_any().downcast::<Event>().unwrap();
        assert!(!cache.remove(&as_public(&impostor)));
        assert_eq!(cache.len(), 1);

        assert!(cache.remove(&as_public(&cached)));
        assert_eq!(cache.len(), 0);
        assert!(!cache.remove(&as_public(&cached)));
    }

    #[test]
    fn test_clear() {
        let registry = Registry::new();
        let events = events(&registry, 3);

        let pops = Arc::new(Mutex::new(vec![]));
        let mut cache = ObjectCacheBuilder::<Ring>::new(RingConfig { capacity: 8 })
            .with_pop_callback({
                let pops = pops.clone();
                move |object| pops.lock().push(object.public_id().clone())
            })
            .build();

        for event in &events {
            cache.feed(as_public(event));
        }
        cache.clear();

        assert!(cache.is_empty());
        assert!(cache.time_window().is_none());
        assert!(pops.lock().is_empty());
    }

    #[test]
    fn test_callback_order() {
        let registry = Registry::new();
        let events = events(&registry, 3);

        let trail = Arc::new(Mutex::new(vec![]));
        let mut cache = ObjectCacheBuilder::<Ring>::new(RingConfig { capacity: 2 })
            .with_push_callback({
                let trail = trail.clone();
                move |object| trail.lock().push(format!("+{}", object.public_id()))
            })
            .with_pop_callback({
                let trail = trail.clone();
                move |object| trail.lock().push(format!("-{}", object.public_id()))
            })
            .build();

        for event in &events {
            cache.feed(as_public(event));
        }

        assert_eq!(
            trail.lock().iter().collect_vec(),
            ["+Event/0", "+Event/1", "+Event/2", "-Event/0"]
        );
    }

    #[test]
    fn test_destroyed_once_on_eviction() {
        let registry = Registry::new();
        let recorder = DropRecorder::new();
        registry.add_observer(recorder.clone());

        let mut cache = RingCache::new(RingConfig { capacity: 1 });
        cache.feed(as_public(
            &Event::create_with_id(&registry, "Event/a", "east ridge").unwrap(),
        ));
        assert!(recorder.ids().is_empty());

        // evicting the sole owner tears the object down
        cache.feed(as_public(
            &Event::create_with_id(&registry, "Event/b", "west ridge").unwrap(),
        ));

        let ids = recorder.ids().clone();
        assert_eq!(ids, [Some(PublicId::new("Event/a"))]);
        assert!(registry.find("Event/a").is_none());
    }

    #[test]
    fn test_lazy_rebound() {
        let registry = Registry::new();
        let events = events(&registry, 6);
        let mut cache = RingCache::new(RingConfig { capacity: 5 });

        for event in &events[..5] {
            cache.feed(as_public(event));
        }
        assert_eq!(cache.len(), 5);

        // shrinking does not evict retroactively
        cache.set_capacity(2).unwrap();
        assert_eq!(cache.len(), 5);
        assert_eq!(cache.eviction().capacity(), 2);

        cache.feed(as_public(&events[5]));
        assert_eq!(cache.len(), 2);
        assert!(cache.set_capacity(0).is_err());
    }

    #[test]
    fn test_iter_oldest_first() {
        let registry = Registry::new();
        let events = events(&registry, 3);
        let mut cache = RingCache::new(RingConfig { capacity: 8 });

        for event in &events {
            cache.feed(as_public(event));
        }

        let ids = cache.iter().map(|item| item.id().to_string()).collect_vec();
        assert_eq!(ids, ["Event/0", "Event/1", "Event/2"]);
    }
}
