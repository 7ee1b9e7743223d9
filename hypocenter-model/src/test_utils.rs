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
//!
//! A miniature seismological domain exercising the full object surface: a
//! [`Catalog`] owning [`Event`]s, which own [`Origin`]s and plain
//! [`Comment`]s, plus standalone [`Pick`]s and a pair of canned observers.

use std::{
    any::Any,
    fmt::Debug,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use hypocenter_common::error::{Error, ErrorKind, Result};
use parking_lot::{Mutex, MutexGuard};

use crate::{
    ident::{PublicId, TypeInfo, Typed},
    object::{Object, ObjectState},
    observer::Observer,
    public::{PublicObject, PublicObjectState},
    registry::Registry,
    visitor::{walk_public, Visitor},
};

fn assign_type_mismatch(target: TypeInfo, source: &dyn Object) -> Error {
    Error::new(ErrorKind::Unsupported, "assign type mismatch")
        .with_context("target", target)
        .with_context("source", source.type_info())
}

/// Root container of the test domain.
pub struct Catalog {
    state: PublicObjectState,
    events: Mutex<Vec<Arc<Event>>>,
}

impl Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("public_id", self.state.public_id())
            .finish()
    }
}

impl Catalog {
    /// Create a catalog with a generated publicID.
    pub fn create(registry: &Registry) -> Result<Arc<Self>> {
        let id = registry.generate_id(Self::TYPE);
        Self::create_with_id(registry, id)
    }

    /// Create a catalog bound to `id`.
    pub fn create_with_id(registry: &Registry, id: impl Into<PublicId>) -> Result<Arc<Self>> {
        let catalog = Arc::new(Self {
            state: PublicObjectState::new(registry, Self::TYPE, id),
            events: Mutex::new(vec![]),
        });
        registry.register(&(catalog.clone() as Arc<dyn PublicObject>))?;
        Ok(catalog)
    }

    /// Attach `event` to the catalog.
    pub fn add_event(self: &Arc<Self>, event: &Arc<Event>) -> Result<()> {
        event.attach_to(&(self.clone() as Arc<dyn PublicObject>))?;
        self.events.lock().push(event.clone());
        Ok(())
    }

    /// Detach `event` from the catalog.
    pub fn remove_event(self: &Arc<Self>, event: &Arc<Event>) -> Result<()> {
        event.detach_from(&(self.clone() as Arc<dyn PublicObject>))?;
        self.events.lock().retain(|e| !Arc::ptr_eq(e, event));
        Ok(())
    }

    /// Snapshot of the attached events.
    pub fn events(&self) -> Vec<Arc<Event>> {
        self.events.lock().clone()
    }
}

impl Typed for Catalog {
    const TYPE: TypeInfo = TypeInfo::new("Catalog");
}

impl Object for Catalog {
    fn state(&self) -> &ObjectState {
        &self.state
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_object(&self) -> &dyn Object {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn accept(&self, visitor: &mut dyn Visitor) {
        walk_public(self.as_public(), visitor, |visitor| {
            let events = self.events.lock().clone();
            for event in &events {
                event.accept(visitor);
            }
        });
    }

    fn clone_object(&self) -> Arc<dyn Object> {
        Arc::new(Self {
            state: self.state.clone_detached(),
            events: Mutex::new(vec![]),
        })
    }

    fn assign(&self, source: &dyn Object) -> Result<()> {
        // catalogs carry no payload besides their children
        source
            .as_any()
            .downcast_ref::<Self>()
            .map(|_| ())
            .ok_or_else(|| assign_type_mismatch(Self::TYPE, source))
    }
}

impl PublicObject for Catalog {
    fn public_state(&self) -> &PublicObjectState {
        &self.state
    }

    fn as_public(&self) -> &dyn PublicObject {
        self
    }
}

/// A seismic event owning origins and comments.
pub struct Event {
    state: PublicObjectState,
    region: Mutex<String>,
    origins: Mutex<Vec<Arc<Origin>>>,
    comments: Mutex<Vec<Arc<Comment>>>,
}

impl Debug for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Event")
            .field("public_id", self.state.public_id())
            .finish()
    }
}

impl Event {
    /// Create an event with a generated publicID.
    pub fn create(registry: &Registry, region: impl Into<String>) -> Result<Arc<Self>> {
        let id = registry.generate_id(Self::TYPE);
        Self::create_with_id(registry, id, region)
    }

    /// Create an event bound to `id`.
    pub fn create_with_id(
        registry: &Registry,
        id: impl Into<PublicId>,
        region: impl Into<String>,
    ) -> Result<Arc<Self>> {
        let event = Arc::new(Self {
            state: PublicObjectState::new(registry, Self::TYPE, id),
            region: Mutex::new(region.into()),
            origins: Mutex::new(vec![]),
            comments: Mutex::new(vec![]),
        });
        registry.register(&(event.clone() as Arc<dyn PublicObject>))?;
        Ok(event)
    }

    /// Region description of the event.
    pub fn region(&self) -> String {
        self.region.lock().clone()
    }

    /// Replace the region description.
    pub fn set_region(&self, region: impl Into<String>) {
        *self.region.lock() = region.into();
    }

    /// Attach `origin` to the event.
    pub fn add_origin(self: &Arc<Self>, origin: &Arc<Origin>) -> Result<()> {
        origin.attach_to(&(self.clone() as Arc<dyn PublicObject>))?;
        self.origins.lock().push(origin.clone());
        Ok(())
    }

    /// Detach `origin` from the event.
    pub fn remove_origin(self: &Arc<Self>, origin: &Arc<Origin>) -> Result<()> {
        origin.detach_from(&(self.clone() as Arc<dyn PublicObject>))?;
        self.origins.lock().retain(|o| !Arc::ptr_eq(o, origin));
        Ok(())
    }

    /// Snapshot of the attached origins.
    pub fn origins(&self) -> Vec<Arc<Origin>> {
        self.origins.lock().clone()
    }

    /// Attach `comment` to the event.
    pub fn add_comment(self: &Arc<Self>, comment: &Arc<Comment>) -> Result<()> {
        comment.attach_to(&(self.clone() as Arc<dyn PublicObject>))?;
        self.comments.lock().push(comment.clone());
        Ok(())
    }

    /// Snapshot of the attached comments.
    pub fn comments(&self) -> Vec<Arc<Comment>> {
        self.comments.lock().clone()
    }
}

impl Typed for Event {
    const TYPE: TypeInfo = TypeInfo::new("Event");
}

impl Object for Event {
    fn state(&self) -> &ObjectState {
        &self.state
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_object(&self) -> &dyn Object {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn accept(&self, visitor: &mut dyn Visitor) {
        walk_public(self.as_public(), visitor, |visitor| {
            let origins = self.origins.lock().clone();
            for origin in &origins {
                origin.accept(visitor);
            }
            let comments = self.comments.lock().clone();
            for comment in &comments {
                comment.accept(visitor);
            }
        });
    }

    fn clone_object(&self) -> Arc<dyn Object> {
        Arc::new(Self {
            state: self.state.clone_detached(),
            region: Mutex::new(self.region.lock().clone()),
            origins: Mutex::new(vec![]),
            comments: Mutex::new(vec![]),
        })
    }

    fn assign(&self, source: &dyn Object) -> Result<()> {
        let Some(source) = source.as_any().downcast_ref::<Self>() else {
            return Err(assign_type_mismatch(Self::TYPE, source));
        };
        if std::ptr::eq(self, source) {
            return Ok(());
        }
        *self.region.lock() = source.region.lock().clone();
        Ok(())
    }
}

impl PublicObject for Event {
    fn public_state(&self) -> &PublicObjectState {
        &self.state
    }

    fn as_public(&self) -> &dyn PublicObject {
        self
    }
}

/// A located solution for an event.
pub struct Origin {
    state: PublicObjectState,
    latitude: Mutex<f64>,
    longitude: Mutex<f64>,
}

impl Debug for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Origin")
            .field("public_id", self.state.public_id())
            .finish()
    }
}

impl Origin {
    /// Create an origin with a generated publicID.
    pub fn create(registry: &Registry, latitude: f64, longitude: f64) -> Result<Arc<Self>> {
        let id = registry.generate_id(Self::TYPE);
        Self::create_with_id(registry, id, latitude, longitude)
    }

    /// Create an origin bound to `id`.
    pub fn create_with_id(
        registry: &Registry,
        id: impl Into<PublicId>,
        latitude: f64,
        longitude: f64,
    ) -> Result<Arc<Self>> {
        let origin = Arc::new(Self {
            state: PublicObjectState::new(registry, Self::TYPE, id),
            latitude: Mutex::new(latitude),
            longitude: Mutex::new(longitude),
        });
        registry.register(&(origin.clone() as Arc<dyn PublicObject>))?;
        Ok(origin)
    }

    /// Latitude of the origin, in degrees.
    pub fn latitude(&self) -> f64 {
        *self.latitude.lock()
    }

    /// Longitude of the origin, in degrees.
    pub fn longitude(&self) -> f64 {
        *self.longitude.lock()
    }

    /// Move the origin.
    pub fn set_position(&self, latitude: f64, longitude: f64) {
        *self.latitude.lock() = latitude;
        *self.longitude.lock() = longitude;
    }
}

impl Typed for Origin {
    const TYPE: TypeInfo = TypeInfo::new("Origin");
}

impl Object for Origin {
    fn state(&self) -> &ObjectState {
        &self.state
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_object(&self) -> &dyn Object {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn accept(&self, visitor: &mut dyn Visitor) {
        walk_public(self.as_public(), visitor, |_| {});
    }

    fn clone_object(&self) -> Arc<dyn Object> {
        Arc::new(Self {
            state: self.state.clone_detached(),
            latitude: Mutex::new(*self.latitude.lock()),
            longitude: Mutex::new(*self.longitude.lock()),
        })
    }

    fn assign(&self, source: &dyn Object) -> Result<()> {
        let Some(source) = source.as_any().downcast_ref::<Self>() else {
            return Err(assign_type_mismatch(Self::TYPE, source));
        };
        if std::ptr::eq(self, source) {
            return Ok(());
        }
        *self.latitude.lock() = *source.latitude.lock();
        *self.longitude.lock() = *source.longitude.lock();
        Ok(())
    }
}

impl PublicObject for Origin {
    fn public_state(&self) -> &PublicObjectState {
        &self.state
    }

    fn as_public(&self) -> &dyn PublicObject {
        self
    }
}

/// A phase arrival reading, standalone in this domain.
pub struct Pick {
    state: PublicObjectState,
    phase_hint: Mutex<String>,
}

impl Debug for Pick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pick")
            .field("public_id", self.state.public_id())
            .finish()
    }
}

impl Pick {
    /// Create a pick with a generated publicID.
    pub fn create(registry: &Registry, phase_hint: impl Into<String>) -> Result<Arc<Self>> {
        let id = registry.generate_id(Self::TYPE);
        Self::create_with_id(registry, id, phase_hint)
    }

    /// Create a pick bound to `id`.
    pub fn create_with_id(
        registry: &Registry,
        id: impl Into<PublicId>,
        phase_hint: impl Into<String>,
    ) -> Result<Arc<Self>> {
        let pick = Arc::new(Self {
            state: PublicObjectState::new(registry, Self::TYPE, id),
            phase_hint: Mutex::new(phase_hint.into()),
        });
        registry.register(&(pick.clone() as Arc<dyn PublicObject>))?;
        Ok(pick)
    }

    /// Phase the pick was read as.
    pub fn phase_hint(&self) -> String {
        self.phase_hint.lock().clone()
    }
}

impl Typed for Pick {
    const TYPE: TypeInfo = TypeInfo::new("Pick");
}

impl Object for Pick {
    fn state(&self) -> &ObjectState {
        &self.state
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_object(&self) -> &dyn Object {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn accept(&self, visitor: &mut dyn Visitor) {
        walk_public(self.as_public(), visitor, |_| {});
    }

    fn clone_object(&self) -> Arc<dyn Object> {
        Arc::new(Self {
            state: self.state.clone_detached(),
            phase_hint: Mutex::new(self.phase_hint.lock().clone()),
        })
    }

    fn assign(&self, source: &dyn Object) -> Result<()> {
        let Some(source) = source.as_any().downcast_ref::<Self>() else {
            return Err(assign_type_mismatch(Self::TYPE, source));
        };
        if std::ptr::eq(self, source) {
            return Ok(());
        }
        *self.phase_hint.lock() = source.phase_hint.lock().clone();
        Ok(())
    }
}

impl PublicObject for Pick {
    fn public_state(&self) -> &PublicObjectState {
        &self.state
    }

    fn as_public(&self) -> &dyn PublicObject {
        self
    }
}

/// A free-form annotation. Plain object without public identity.
pub struct Comment {
    state: ObjectState,
    text: Mutex<String>,
}

impl Debug for Comment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Comment").finish_non_exhaustive()
    }
}

impl Comment {
    /// Plain objects are never registered, construction cannot fail.
    pub fn new(registry: &Registry, text: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            state: ObjectState::new(registry, Self::TYPE),
            text: Mutex::new(text.into()),
        })
    }

    /// Annotation text.
    pub fn text(&self) -> String {
        self.text.lock().clone()
    }

    /// Replace the annotation text.
    pub fn set_text(&self, text: impl Into<String>) {
        *self.text.lock() = text.into();
    }
}

impl Typed for Comment {
    const TYPE: TypeInfo = TypeInfo::new("Comment");
}

impl Object for Comment {
    fn state(&self) -> &ObjectState {
        &self.state
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_object(&self) -> &dyn Object {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn accept(&self, visitor: &mut dyn Visitor) {
        visitor.visit_object(self);
    }

    fn clone_object(&self) -> Arc<dyn Object> {
        Arc::new(Self {
            state: self.state.detached_copy(),
            text: Mutex::new(self.text.lock().clone()),
        })
    }

    fn assign(&self, source: &dyn Object) -> Result<()> {
        let Some(source) = source.as_any().downcast_ref::<Self>() else {
            return Err(assign_type_mismatch(Self::TYPE, source));
        };
        if std::ptr::eq(self, source) {
            return Ok(());
        }
        *self.text.lock() = source.text.lock().clone();
        Ok(())
    }
}

/// Observer counting callback invocations.
#[derive(Debug, Default)]
pub struct CountingObserver {
    added: AtomicUsize,
    removed: AtomicUsize,
    modified: AtomicUsize,
    destroyed: AtomicUsize,
}

impl CountingObserver {
    /// A fresh counter behind a shared handle.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Count of added callbacks seen so far.
    pub fn added(&self) -> usize {
        self.added.load(Ordering::Relaxed)
    }

    /// Count of removed callbacks seen so far.
    pub fn removed(&self) -> usize {
        self.removed.load(Ordering::Relaxed)
    }

    /// Count of modified callbacks seen so far.
    pub fn modified(&self) -> usize {
        self.modified.load(Ordering::Relaxed)
    }

    /// Count of destroyed callbacks seen so far.
    pub fn destroyed(&self) -> usize {
        self.destroyed.load(Ordering::Relaxed)
    }
}

impl Observer for CountingObserver {
    fn on_object_added(&self, _parent: &dyn PublicObject, _object: &dyn Object) {
        self.added.fetch_add(1, Ordering::Relaxed);
    }

    fn on_object_removed(&self, _parent: &dyn PublicObject, _object: &dyn Object) {
        self.removed.fetch_add(1, Ordering::Relaxed);
    }

    fn on_object_modified(&self, _object: &dyn Object) {
        self.modified.fetch_add(1, Ordering::Relaxed);
    }

    fn on_object_destroyed(&self, _state: &ObjectState) {
        self.destroyed.fetch_add(1, Ordering::Relaxed);
    }
}

/// Observer recording the identities of destroyed objects.
#[derive(Debug, Default)]
pub struct DropRecorder {
    ids: Mutex<Vec<Option<PublicId>>>,
}

impl DropRecorder {
    /// A fresh recorder behind a shared handle.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Identities seen so far, in destruction order. `None` for plain objects.
    pub fn ids(&self) -> MutexGuard<'_, Vec<Option<PublicId>>> {
        self.ids.lock()
    }
}

impl Observer for DropRecorder {
    fn on_object_destroyed(&self, state: &ObjectState) {
        self.ids.lock().push(state.public_id().cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_origin() {
        let registry = Registry::new();
        let event = Event::create(&registry, "east ridge").unwrap();
        let a = Origin::create(&registry, 46.513, 12.891).unwrap();
        let b = Origin::create(&registry, 41.92, 20.51).unwrap();

        event.add_origin(&a).unwrap();
        event.add_origin(&b).unwrap();
        assert_eq!(event.origins().len(), 2);

        event.remove_origin(&a).unwrap();
        assert_eq!(event.origins().len(), 1);
        assert!(a.parent().is_none());
        assert!(Arc::ptr_eq(&event.origins()[0], &b));

        assert!(event.remove_origin(&a).is_err());
    }

    #[test]
    fn test_payload_setters() {
        let registry = Registry::new();
        let event = Event::create(&registry, "east ridge").unwrap();
        let origin = Origin::create(&registry, 0.0, 0.0).unwrap();
        let comment = Comment::new(&registry, "manual solution");

        event.set_region("west ridge");
        origin.set_position(46.513, 12.891);
        comment.set_text("automatic solution");

        assert_eq!(event.region(), "west ridge");
        assert_eq!(origin.latitude(), 46.513);
        assert_eq!(origin.longitude(), 12.891);
        assert_eq!(comment.text(), "automatic solution");

        let pick = Pick::create(&registry, "Pg").unwrap();
        assert_eq!(pick.phase_hint(), "Pg");
    }

    #[test]
    fn test_drop_recorder() {
        let registry = Registry::new();
        let recorder = DropRecorder::new();
        registry.add_observer(recorder.clone());

        {
            let _event = Event::create_with_id(&registry, "Event/a", "east ridge").unwrap();
            let _comment = Comment::new(&registry, "manual solution");
        }

        let ids = recorder.ids();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&Some(PublicId::new("Event/a"))));
        assert!(ids.contains(&None));
    }
}
