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
    any::Any,
    fmt::Debug,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Weak,
    },
};

use hypocenter_common::{
    error::{Error, Result},
    time::Timestamp,
};
use parking_lot::Mutex;

use crate::{
    ident::{PublicId, TypeInfo},
    public::PublicObject,
    registry::{Registry, RegistryCore},
    visitor::Visitor,
};

/// Identity state shared by every model object.
///
/// Carries the registry binding, the type descriptor, the optional public identity and a weak
/// back reference to the owning parent.
pub struct ObjectState {
    registry: Weak<RegistryCore>,
    type_info: TypeInfo,
    public_id: Option<PublicId>,
    registered: AtomicBool,
    parent: Mutex<Option<Weak<dyn PublicObject>>>,
    archived_at: Mutex<Option<Timestamp>>,
}

impl Debug for ObjectState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectState")
            .field("type_info", &self.type_info)
            .field("public_id", &self.public_id)
            .finish()
    }
}

impl ObjectState {
    /// State for a plain object without public identity.
    pub fn new(registry: &Registry, type_info: TypeInfo) -> Self {
        Self {
            registry: registry.downgrade_core(),
            type_info,
            public_id: None,
            registered: AtomicBool::new(false),
            parent: Mutex::new(None),
            archived_at: Mutex::new(None),
        }
    }

    // `ObjectState` is `Drop`, so no functional update from `Self::new` here.
    pub(crate) fn with_public_id(registry: &Registry, type_info: TypeInfo, id: PublicId) -> Self {
        Self {
            registry: registry.downgrade_core(),
            type_info,
            public_id: Some(id),
            registered: AtomicBool::new(false),
            parent: Mutex::new(None),
            archived_at: Mutex::new(None),
        }
    }

    /// Type descriptor of the object.
    pub fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    /// Public identity of the object, absent for plain objects.
    pub fn public_id(&self) -> Option<&PublicId> {
        self.public_id.as_ref()
    }

    /// Whether the object currently holds its identity registration.
    pub fn registered(&self) -> bool {
        self.registered.load(Ordering::Acquire)
    }

    pub(crate) fn mark_registered(&self, val: bool) {
        self.registered.store(val, Ordering::Release);
    }

    /// The owning parent, if it is still alive.
    pub fn parent(&self) -> Option<Arc<dyn PublicObject>> {
        self.parent.lock().as_ref().and_then(Weak::upgrade)
    }

    /// Bind or clear the owning parent.
    ///
    /// Binding fails while another live parent owns the object. A dead parent reference counts
    /// as cleared.
    pub fn set_parent(&self, parent: Option<&Arc<dyn PublicObject>>) -> Result<()> {
        let mut slot = self.parent.lock();
        let Some(parent) = parent else {
            *slot = None;
            return Ok(());
        };
        if let Some(live) = slot.as_ref().and_then(Weak::upgrade) {
            tracing::warn!(
                "[object]: reject parent change (type: {}, id: {:?}), owned by {}",
                self.type_info,
                self.public_id,
                live.public_id(),
            );
            return Err(Error::invariant_violation("object already has a parent")
                .with_context("parent", live.public_id()));
        }
        *slot = Some(Arc::downgrade(parent));
        Ok(())
    }

    /// When the object was materialized from an archive, if ever.
    pub fn archived_at(&self) -> Option<Timestamp> {
        *self.archived_at.lock()
    }

    /// Record the archive materialization time.
    pub fn set_archived_at(&self, stamp: Option<Timestamp>) {
        *self.archived_at.lock() = stamp;
    }

    /// State for a detached, unregistered copy of the object.
    pub fn detached_copy(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            type_info: self.type_info,
            public_id: self.public_id.clone(),
            registered: AtomicBool::new(false),
            parent: Mutex::new(None),
            archived_at: Mutex::new(*self.archived_at.lock()),
        }
    }

    pub(crate) fn registry_core(&self) -> Option<Arc<RegistryCore>> {
        self.registry.upgrade()
    }
}

impl Drop for ObjectState {
    fn drop(&mut self) {
        let Some(core) = self.registry.upgrade() else {
            return;
        };
        if self.registered() {
            if let Some(id) = self.public_id.as_ref() {
                core.release(id);
            }
        }
        core.object_destroyed(self);
    }
}

/// Behavior shared by every object in a model tree.
///
/// Concrete types implement the upcasts and the tree plumbing. The ownership operations are
/// provided on top of [`ObjectState`].
pub trait Object: Send + Sync + 'static + Debug {
    /// Identity state of the object.
    fn state(&self) -> &ObjectState;

    /// Upcast to [`Any`] for downcasts to the concrete type.
    fn as_any(&self) -> &dyn Any;

    /// Upcast to a plain object reference.
    fn as_object(&self) -> &dyn Object;

    /// Upcast a shared handle to [`Any`] for downcasts to the concrete type.
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;

    /// Walk `visitor` over the object and its subtree.
    fn accept(&self, visitor: &mut dyn Visitor);

    /// Detached copy of the object.
    ///
    /// The copy keeps the identity of the source but is neither registered nor owned by a
    /// parent, and child containers start out empty.
    fn clone_object(&self) -> Arc<dyn Object>;

    /// Copy the payload of `source` into this object.
    ///
    /// Fails when the source type differs. Identity, parent and children are left untouched.
    fn assign(&self, source: &dyn Object) -> Result<()>;

    /// Type descriptor of the object.
    fn type_info(&self) -> TypeInfo {
        self.state().type_info()
    }

    /// The owning parent, if any.
    fn parent(&self) -> Option<Arc<dyn PublicObject>> {
        self.state().parent()
    }

    /// Bind or clear the owning parent without announcing the change.
    ///
    /// Most callers want [`attach_to`] / [`detach_from`] instead.
    ///
    /// [`attach_to`]: Object::attach_to
    /// [`detach_from`]: Object::detach_from
    fn set_parent(&self, parent: Option<&Arc<dyn PublicObject>>) -> Result<()> {
        self.state().set_parent(parent)
    }

    /// Attach the object to `parent` and announce the addition.
    fn attach_to(&self, parent: &Arc<dyn PublicObject>) -> Result<()> {
        self.set_parent(Some(parent))?;
        parent.child_added(self.as_object());
        Ok(())
    }

    /// Detach the object from `parent` and announce the removal.
    ///
    /// Fails when the object is not currently owned by `parent`.
    fn detach_from(&self, parent: &Arc<dyn PublicObject>) -> Result<()> {
        let Some(current) = self.parent() else {
            tracing::warn!("[object]: reject detach (type: {}), object has no parent", self.type_info());
            return Err(Error::invariant_violation("object is not attached to a parent"));
        };
        if !std::ptr::addr_eq(Arc::as_ptr(&current), Arc::as_ptr(parent)) {
            tracing::warn!(
                "[object]: reject detach (type: {}), object is owned by {}",
                self.type_info(),
                current.public_id(),
            );
            return Err(Error::invariant_violation("object is attached to a different parent")
                .with_context("parent", current.public_id()));
        }
        self.set_parent(None)?;
        parent.child_removed(self.as_object());
        Ok(())
    }

    /// Detach the object from its current parent.
    fn detach(&self) -> Result<()> {
        let Some(parent) = self.parent() else {
            tracing::warn!("[object]: reject detach (type: {}), object has no parent", self.type_info());
            return Err(Error::invariant_violation("object is not attached to a parent"));
        };
        self.detach_from(&parent)
    }

    /// Announce an in-place payload update.
    ///
    /// No-op when the registry is gone.
    fn update(&self) {
        if let Some(core) = self.state().registry_core() {
            core.object_updated(self.as_object());
        }
    }

    /// When the object was materialized from an archive, if ever.
    fn archived_at(&self) -> Option<Timestamp> {
        self.state().archived_at()
    }

    /// Record the archive materialization time.
    fn set_archived_at(&self, stamp: Option<Timestamp>) {
        self.state().set_archived_at(stamp)
    }
}
