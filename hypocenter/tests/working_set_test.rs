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

//! End-to-end test over registry, object tree, and bounded cache.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use hypocenter::prelude::{
    Archive, FactoryRegistry, Object, ObjectCacheBuilder, ObjectFactory, Operation, PublicId,
    PublicObject, Registry, Result, Ring, RingConfig, TypeInfo, Typed, Visitor,
};
use hypocenter_model::test_utils::{Comment, CountingObserver, DropRecorder, Event, Origin};

const EVENTS: usize = 8;
const CAPACITY: usize = 3;

struct EventFactory;

impl ObjectFactory for EventFactory {
    fn type_info(&self) -> TypeInfo {
        Event::TYPE
    }

    fn create(&self, registry: &Registry, id: PublicId) -> Result<Arc<dyn PublicObject>> {
        Ok(Event::create_with_id(registry, id, "")? as Arc<dyn PublicObject>)
    }
}

/// Archive that materializes events from plain rows through the factory,
/// the way a database backend would.
struct TableArchive {
    registry: Registry,
    factories: FactoryRegistry,
    regions: Vec<(String, String)>,
    loads: AtomicUsize,
}

impl Archive for TableArchive {
    fn get_object(&self, type_info: TypeInfo, id: &str) -> Option<Arc<dyn PublicObject>> {
        let region = self
            .regions
            .iter()
            .find(|(event_id, _)| event_id == id)
            .map(|(_, region)| region.clone())?;
        self.loads.fetch_add(1, Ordering::Relaxed);

        let object = self
            .factories
            .create(&self.registry, type_info, PublicId::new(id))
            .ok()?;
        if let Some(event) = object.as_any().downcast_ref::<Event>() {
            event.set_region(region);
        }
        Some(object)
    }
}

#[derive(Debug, Default)]
struct NodeCounter {
    public: usize,
    plain: usize,
}

impl Visitor for NodeCounter {
    fn visit_public(&mut self, _: &dyn PublicObject) -> bool {
        self.public += 1;
        true
    }

    fn visit_object(&mut self, _: &dyn Object) {
        self.plain += 1;
    }
}

#[test_log::test]
fn test_bounded_working_set() {
    let registry = Registry::new();

    let recorder = DropRecorder::new();
    registry.add_observer(recorder.clone());
    let counter = CountingObserver::new();
    registry.add_observer(counter.clone());

    let mut factories = FactoryRegistry::new();
    factories.register(Arc::new(EventFactory)).unwrap();

    let regions = (0..EVENTS)
        .map(|i| (format!("Event/{i}"), format!("region-{i}")))
        .collect();
    let archive = Arc::new(TableArchive {
        registry: registry.clone(),
        factories,
        regions,
        loads: AtomicUsize::new(0),
    });

    let mut cache = ObjectCacheBuilder::<Ring>::new(RingConfig { capacity: CAPACITY })
        .with_archive(archive.clone())
        .build();

    // Cold reads materialize through the factory and stay bounded.
    for i in 0..EVENTS {
        let id = format!("Event/{i}");
        let object = cache.find(Event::TYPE, &id).unwrap();
        assert!(!cache.cached(), "cold read must miss, i: {i}");
        assert_eq!(object.public_id().as_str(), id);
        assert!(object.registered());
        assert!(object.archived_at().is_some());

        let event = object.as_any().downcast_ref::<Event>().unwrap();
        assert_eq!(event.region(), format!("region-{i}"));
    }

    assert_eq!(cache.len(), CAPACITY);
    assert_eq!(archive.loads.load(Ordering::Relaxed), EVENTS);
    assert_eq!(registry.len(), CAPACITY);

    // The evicted majority is torn down oldest first, identities released.
    let expected = (0..EVENTS - CAPACITY)
        .map(|i| Some(PublicId::new(format!("Event/{i}"))))
        .collect::<Vec<_>>();
    assert_eq!(recorder.ids().clone(), expected);
    assert!(registry.find("Event/0").is_none());

    // A warm read hits without touching the archive.
    let warm = cache.find(Event::TYPE, "Event/7").unwrap();
    assert!(cache.cached());
    assert_eq!(archive.loads.load(Ordering::Relaxed), EVENTS);

    // An evicted id reloads lazily under a fresh identity.
    let reloaded = cache.find(Event::TYPE, "Event/0").unwrap();
    assert!(!cache.cached());
    assert_eq!(archive.loads.load(Ordering::Relaxed), EVENTS + 1);
    assert!(reloaded.registered());
    assert!(registry.find("Event/0").is_some());
    assert_eq!(recorder.ids().last().unwrap().as_ref().unwrap().as_str(), "Event/5");

    // Grow a tree on the hot object and walk it.
    registry.set_notification_enabled(true);
    let event = reloaded.clone().into_any().downcast::<Event>().unwrap();
    let origin = Origin::create(&registry, 46.5, 8.0).unwrap();
    event.add_origin(&origin).unwrap();
    let comment = Comment::new(&registry, "felt in the valley");
    event.add_comment(&comment).unwrap();
    event.update();

    let mut nodes = NodeCounter::default();
    event.accept(&mut nodes);
    assert_eq!((nodes.public, nodes.plain), (2, 1));

    let notifications = registry.drain_notifications();
    assert_eq!(notifications.len(), 3);
    assert_eq!(notifications[0].op(), Operation::Add);
    assert_eq!(notifications[0].parent_id(), Some(event.public_id()));
    assert_eq!(notifications[1].op(), Operation::Add);
    assert_eq!(notifications[2].op(), Operation::Update);
    assert_eq!(notifications[2].subject_id(), Some(event.public_id()));

    assert_eq!(counter.added(), 2);
    assert_eq!(counter.modified(), 1);
    assert_eq!(counter.removed(), 0);
    assert_eq!(counter.destroyed(), EVENTS - CAPACITY + 1);

    // Teardown destroys everything that is left.
    cache.clear();
    drop(warm);
    drop(event);
    drop(reloaded);
    drop(origin);
    drop(comment);

    // Every instance ever created: 8 cold loads, the reload of "Event/0",
    // the origin, and the comment.
    assert_eq!(counter.destroyed(), EVENTS + 3);
    assert!(registry.is_empty());
}
