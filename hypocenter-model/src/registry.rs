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
    collections::VecDeque,
    fmt::Debug,
    hash::Hash,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Weak,
    },
};

use equivalent::Equivalent;
use hashbrown::{hash_map::Entry, HashMap};
use hypocenter_common::{
    error::{Error, Result},
    metrics::model::Metrics,
    time::now,
};
use parking_lot::{Mutex, RwLock};

use crate::{
    ident::{PublicId, TypeInfo},
    notify::{Notification, Operation},
    object::{Object, ObjectState},
    observer::Observer,
    public::PublicObject,
};

pub(crate) struct RegistryCore {
    /// Weak refs keep the pool from pinning object lifetimes.
    pool: Mutex<HashMap<PublicId, Weak<dyn PublicObject>>>,
    observers: RwLock<Vec<Arc<dyn Observer>>>,

    registration_enabled: AtomicBool,
    notification_enabled: AtomicBool,
    notifications: Mutex<VecDeque<Notification>>,

    sequence: AtomicU64,

    metrics: Arc<Metrics>,
}

impl RegistryCore {
    /// Snapshot under the read lock, call outside it.
    ///
    /// Observers may re-enter the registry from their callbacks.
    fn observers(&self) -> Vec<Arc<dyn Observer>> {
        self.observers.read().clone()
    }

    fn push_notification(&self, notification: Notification) {
        self.notifications.lock().push_back(notification);
    }

    fn notification_enabled(&self) -> bool {
        self.notification_enabled.load(Ordering::Acquire)
    }

    pub(crate) fn object_attached(&self, parent: &dyn PublicObject, object: &dyn Object) {
        for observer in self.observers() {
            observer.on_object_added(parent, object);
        }
        if self.notification_enabled() {
            self.push_notification(Notification::new(
                Operation::Add,
                object.type_info(),
                object.state().public_id().cloned(),
                Some(parent.public_id().clone()),
            ));
        }
    }

    /// `parent` is passed explicitly. The object no longer points at its
    /// former parent when this runs.
    pub(crate) fn object_detached(&self, parent: &dyn PublicObject, object: &dyn Object) {
        for observer in self.observers() {
            observer.on_object_removed(parent, object);
        }
        if self.notification_enabled() {
            self.push_notification(Notification::new(
                Operation::Remove,
                object.type_info(),
                object.state().public_id().cloned(),
                Some(parent.public_id().clone()),
            ));
        }
    }

    pub(crate) fn object_updated(&self, object: &dyn Object) {
        for observer in self.observers() {
            observer.on_object_modified(object);
        }
        if self.notification_enabled() {
            let parent_id = object.parent().map(|parent| parent.public_id().clone());
            self.push_notification(Notification::new(
                Operation::Update,
                object.type_info(),
                object.state().public_id().cloned(),
                parent_id,
            ));
        }
    }

    /// Runs from the drop path. Only identity state is accessible, and no
    /// notification is emitted.
    pub(crate) fn object_destroyed(&self, state: &ObjectState) {
        for observer in self.observers() {
            observer.on_object_destroyed(state);
        }
    }

    /// Drop the identity binding when the last strong ref is gone.
    ///
    /// The binding may already point at a successor object. Leave it alone
    /// in that case.
    pub(crate) fn release(&self, id: &PublicId) {
        let mut pool = self.pool.lock();
        let removed = match pool.get(id) {
            Some(weak) if weak.strong_count() == 0 => pool.remove(id).is_some(),
            _ => false,
        };
        let len = pool.len();
        drop(pool);

        if removed {
            self.metrics.identity_release.increase(1);
            self.metrics.identity_usage.absolute(len as u64);
        }
    }
}

/// Identity registry binding publicIDs to live objects.
///
/// An explicit value rather than process-global state. Cloning is cheap and
/// clones share the same pool, so one registry can be threaded through the
/// components that must agree on identities.
///
/// The registry holds weak references only. An object's identity binding is
/// released when its last strong reference is dropped.
#[derive(Clone)]
pub struct Registry {
    core: Arc<RegistryCore>,
}

impl Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry").field("len", &self.len()).finish()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// An empty registry with registration enabled and notifications disabled.
    pub fn new() -> Self {
        Self::with_metrics(Arc::new(Metrics::noop()))
    }

    /// An empty registry reporting to the given metrics.
    pub fn with_metrics(metrics: Arc<Metrics>) -> Self {
        Self {
            core: Arc::new(RegistryCore {
                pool: Mutex::new(HashMap::new()),
                observers: RwLock::new(vec![]),
                registration_enabled: AtomicBool::new(true),
                notification_enabled: AtomicBool::new(false),
                notifications: Mutex::new(VecDeque::new()),
                sequence: AtomicU64::new(0),
                metrics,
            }),
        }
    }

    pub(crate) fn downgrade_core(&self) -> Weak<RegistryCore> {
        Arc::downgrade(&self.core)
    }

    /// Bind the object's publicID to it.
    ///
    /// Re-registering the same object is a no-op. Binding a publicID that
    /// already points at a different live object fails with
    /// [`ErrorKind::IdentityCollision`] and leaves the existing binding
    /// intact. A binding whose object is gone is replaced.
    ///
    /// No-op while registration is disabled. The object then simply stays
    /// unregistered.
    ///
    /// [`ErrorKind::IdentityCollision`]: hypocenter_common::error::ErrorKind::IdentityCollision
    pub fn register(&self, object: &Arc<dyn PublicObject>) -> Result<()> {
        if !self.registration_enabled() {
            return Ok(());
        }

        let id = object.public_id().clone();

        let mut pool = self.core.pool.lock();
        match pool.entry(id.clone()) {
            Entry::Occupied(mut o) => {
                if let Some(live) = o.get().upgrade() {
                    if std::ptr::addr_eq(Arc::as_ptr(&live), Arc::as_ptr(object)) {
                        return Ok(());
                    }
                    drop(pool);
                    tracing::warn!(
                        "[registry]: reject registration (type: {}, id: {}), publicID already bound to a live object",
                        object.type_info(),
                        id
                    );
                    self.core.metrics.identity_collision.increase(1);
                    return Err(Error::identity_collision(&id));
                }
                o.insert(Arc::downgrade(object));
            }
            Entry::Vacant(v) => {
                v.insert(Arc::downgrade(object));
            }
        }
        let len = pool.len();
        drop(pool);

        object.state().mark_registered(true);
        self.core.metrics.identity_register.increase(1);
        self.core.metrics.identity_usage.absolute(len as u64);
        Ok(())
    }

    /// Look up a live object by publicID.
    ///
    /// Answers `None` while registration is disabled. The toggle bypasses
    /// the identity map for [`Registry::register`] and `find` alike, so bulk
    /// loading with transient duplicate keys never resolves a stale binding.
    /// Existing bindings stay and resolve again once registration is back on.
    pub fn find<Q>(&self, id: &Q) -> Option<Arc<dyn PublicObject>>
    where
        Q: Hash + Equivalent<PublicId> + ?Sized,
    {
        if !self.registration_enabled() {
            return None;
        }

        let mut pool = self.core.pool.lock();
        let Some(weak) = pool.get(id) else {
            drop(pool);
            self.core.metrics.identity_miss.increase(1);
            return None;
        };

        match weak.upgrade() {
            Some(object) => {
                drop(pool);
                self.core.metrics.identity_hit.increase(1);
                Some(object)
            }
            None => {
                // Dead bindings are normally removed on drop. One can linger
                // if the object was torn down with registration state lost.
                pool.remove(id);
                let len = pool.len();
                drop(pool);
                self.core.metrics.identity_miss.increase(1);
                self.core.metrics.identity_usage.absolute(len as u64);
                None
            }
        }
    }

    /// Generate a fresh publicID for the given type.
    ///
    /// The format is `<type>/<timestamp>.<sequence>`, unique within this
    /// registry.
    pub fn generate_id(&self, type_info: TypeInfo) -> PublicId {
        let seq = self.core.sequence.fetch_add(1, Ordering::Relaxed);
        PublicId::new(format!(
            "{}/{}.{}",
            type_info.name(),
            now().format("%Y%m%d%H%M%S%.6f"),
            seq
        ))
    }

    /// Whether [`Registry::register`] currently binds identities.
    pub fn registration_enabled(&self) -> bool {
        self.core.registration_enabled.load(Ordering::Acquire)
    }

    /// Enable or disable the identity map.
    ///
    /// Disabling does not drop existing bindings, it hides the map from
    /// [`Registry::register`] and [`Registry::find`] until re-enabled. Meant
    /// for bulk deserialization of multiple sources holding transient
    /// duplicate keys that a later merge step reconciles.
    pub fn set_registration_enabled(&self, enabled: bool) {
        self.core.registration_enabled.store(enabled, Ordering::Release);
    }

    /// Whether mutations are currently recorded as [`Notification`]s.
    pub fn notification_enabled(&self) -> bool {
        self.core.notification_enabled()
    }

    /// Enable or disable notification recording.
    pub fn set_notification_enabled(&self, enabled: bool) {
        self.core.notification_enabled.store(enabled, Ordering::Release);
    }

    /// Take all recorded notifications, oldest first.
    pub fn drain_notifications(&self) -> Vec<Notification> {
        self.core.notifications.lock().drain(..).collect()
    }

    /// Attach an observer to the mutation broadcast.
    pub fn add_observer(&self, observer: Arc<dyn Observer>) {
        self.core.observers.write().push(observer);
    }

    /// Detach an observer by identity. Returns `false` if it was not attached.
    pub fn remove_observer(&self, observer: &Arc<dyn Observer>) -> bool {
        let mut observers = self.core.observers.write();
        let before = observers.len();
        observers.retain(|o| !std::ptr::addr_eq(Arc::as_ptr(o), Arc::as_ptr(observer)));
        observers.len() < before
    }

    /// Count of identity bindings, including any not yet pruned dead ones.
    pub fn len(&self) -> usize {
        self.core.pool.lock().len()
    }

    /// Whether no identities are bound.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use hypocenter_common::error::ErrorKind;

    use super::*;
    use crate::{
        ident::Typed,
        test_utils::{Catalog, CountingObserver, Event},
    };

    fn is_send_sync_static<T: Send + Sync + 'static>() {}

    #[test]
    fn test_send_sync_static() {
        is_send_sync_static::<Registry>();
    }

    #[test]
    fn test_register_find_round_trip() {
        let registry = Registry::new();
        let event = Event::create_with_id(&registry, "Event/a", "east ridge").unwrap();

        assert!(event.registered());
        assert_eq!(registry.len(), 1);

        let found = registry.find("Event/a").unwrap();
        assert!(std::ptr::addr_eq(
            Arc::as_ptr(&found),
            Arc::as_ptr(&(event.clone() as Arc<dyn PublicObject>))
        ));

        let id = PublicId::new("Event/a");
        assert!(registry.find(&id).is_some());
        assert!(registry.find("Event/b").is_none());
    }

    #[test_log::test]
    fn test_identity_collision() {
        let registry = Registry::new();
        let event = Event::create_with_id(&registry, "Event/dup", "east ridge").unwrap();

        let res = Event::create_with_id(&registry, "Event/dup", "west ridge");
        assert_eq!(res.unwrap_err().kind(), ErrorKind::IdentityCollision);

        // the loser must not disturb the existing binding
        let found = registry.find("Event/dup").unwrap();
        let found = found.into_any().downcast::<Event>().unwrap();
        assert!(Arc::ptr_eq(&found, &event));
        assert_eq!(found.region(), "east ridge");
    }

    #[test]
    fn test_register_is_idempotent() {
        let registry = Registry::new();
        let event = Event::create_with_id(&registry, "Event/a", "east ridge").unwrap();

        let object = event.clone() as Arc<dyn PublicObject>;
        registry.register(&object).unwrap();
        registry.register(&object).unwrap();

        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registration_toggle() {
        let registry = Registry::new();
        assert!(registry.registration_enabled());

        registry.set_registration_enabled(false);
        let a = Event::create_with_id(&registry, "Event/x", "east ridge").unwrap();
        let b = Event::create_with_id(&registry, "Event/x", "west ridge").unwrap();

        assert!(!a.registered());
        assert!(!b.registered());
        assert!(!Arc::ptr_eq(&a, &b));

        registry.set_registration_enabled(true);
        let c = Event::create_with_id(&registry, "Event/x", "north ridge").unwrap();
        assert!(c.registered());
        assert!(registry.find("Event/x").is_some());
    }

    #[test]
    fn test_find_bypassed_while_disabled() {
        let registry = Registry::new();
        let event = Event::create_with_id(&registry, "Event/a", "east ridge").unwrap();
        assert!(registry.find("Event/a").is_some());

        // the toggle hides even established bindings from lookups
        registry.set_registration_enabled(false);
        assert!(registry.find("Event/a").is_none());
        assert_eq!(registry.len(), 1);

        registry.set_registration_enabled(true);
        let found = registry.find("Event/a").unwrap();
        assert!(Arc::ptr_eq(&found.into_any().downcast::<Event>().unwrap(), &event));
    }

    #[test]
    fn test_drop_releases_identity() {
        let registry = Registry::new();

        {
            let _event = Event::create_with_id(&registry, "Event/a", "east ridge").unwrap();
            assert_eq!(registry.len(), 1);
        }

        assert_eq!(registry.len(), 0);
        assert!(registry.find("Event/a").is_none());

        // the identity is free for reuse now
        let _event = Event::create_with_id(&registry, "Event/a", "west ridge").unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_generate_id() {
        let registry = Registry::new();

        let a = registry.generate_id(Event::TYPE);
        let b = registry.generate_id(Event::TYPE);

        assert_ne!(a, b);
        assert!(a.as_str().starts_with("Event/"));
        assert!(b.as_str().starts_with("Event/"));
    }

    #[test]
    fn test_notifications() {
        let registry = Registry::new();
        registry.set_notification_enabled(true);

        let catalog = Catalog::create(&registry).unwrap();
        let event = Event::create(&registry, "east ridge").unwrap();

        catalog.add_event(&event).unwrap();
        event.update();
        event.detach().unwrap();

        let notifications = registry.drain_notifications();
        assert_eq!(notifications.len(), 3);

        assert_eq!(notifications[0].op(), Operation::Add);
        assert_eq!(notifications[0].subject_type(), Event::TYPE);
        assert_eq!(notifications[0].subject_id(), Some(event.public_id()));
        assert_eq!(notifications[0].parent_id(), Some(catalog.public_id()));

        assert_eq!(notifications[1].op(), Operation::Update);
        assert_eq!(notifications[1].parent_id(), Some(catalog.public_id()));

        assert_eq!(notifications[2].op(), Operation::Remove);
        assert_eq!(notifications[2].subject_id(), Some(event.public_id()));
        assert_eq!(notifications[2].parent_id(), Some(catalog.public_id()));

        assert!(registry.drain_notifications().is_empty());

        registry.set_notification_enabled(false);
        catalog.add_event(&event).unwrap();
        assert!(registry.drain_notifications().is_empty());
    }

    #[test]
    fn test_observer_parent_identity() {
        #[derive(Default)]
        struct ParentRecorder {
            trail: Mutex<Vec<(&'static str, PublicId)>>,
        }

        impl Observer for ParentRecorder {
            fn on_object_added(&self, parent: &dyn PublicObject, _object: &dyn Object) {
                self.trail.lock().push(("+", parent.public_id().clone()));
            }

            fn on_object_removed(&self, parent: &dyn PublicObject, object: &dyn Object) {
                // the back reference is gone by now, the callback is the
                // only way the former parent reaches an observer
                assert!(object.parent().is_none());
                self.trail.lock().push(("-", parent.public_id().clone()));
            }
        }

        let registry = Registry::new();
        let recorder = Arc::new(ParentRecorder::default());
        registry.add_observer(recorder.clone());

        let catalog = Catalog::create_with_id(&registry, "Catalog/a").unwrap();
        let event = Event::create(&registry, "east ridge").unwrap();
        catalog.add_event(&event).unwrap();
        catalog.remove_event(&event).unwrap();

        let trail = recorder.trail.lock().clone();
        assert_eq!(
            trail,
            [("+", PublicId::new("Catalog/a")), ("-", PublicId::new("Catalog/a"))]
        );
    }

    #[test]
    fn test_observer_bus() {
        let registry = Registry::new();
        let observer = CountingObserver::new();
        registry.add_observer(observer.clone());

        let catalog = Catalog::create(&registry).unwrap();
        let event = Event::create(&registry, "east ridge").unwrap();

        catalog.add_event(&event).unwrap();
        assert_eq!(observer.added(), 1);

        event.update();
        assert_eq!(observer.modified(), 1);

        catalog.remove_event(&event).unwrap();
        assert_eq!(observer.removed(), 1);

        drop(event);
        assert_eq!(observer.destroyed(), 1);

        let dyn_observer = observer.clone() as Arc<dyn Observer>;
        assert!(registry.remove_observer(&dyn_observer));
        assert!(!registry.remove_observer(&dyn_observer));

        drop(catalog);
        assert_eq!(observer.destroyed(), 1);
    }
}
