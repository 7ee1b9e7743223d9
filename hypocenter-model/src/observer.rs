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

use crate::{
    object::{Object, ObjectState},
    public::PublicObject,
};

/// Lifecycle bus over all objects bound to one [`Registry`].
///
/// Observers are invoked synchronously on the thread that mutates the model. Callbacks receive
/// borrowed objects and must not retain them; a retained identity can be resolved again through
/// [`Registry::find`].
///
/// All callbacks default to no-ops, implementors override the events they care about.
///
/// [`Registry`]: crate::registry::Registry
/// [`Registry::find`]: crate::registry::Registry::find
pub trait Observer: Send + Sync + 'static {
    /// An object was attached to `parent`.
    fn on_object_added(&self, _parent: &dyn PublicObject, _object: &dyn Object) {}

    /// An object was detached from `parent`.
    ///
    /// The object's back reference is already cleared when this fires, the
    /// former parent is only reachable through the callback argument.
    fn on_object_removed(&self, _parent: &dyn PublicObject, _object: &dyn Object) {}

    /// An object reported an in-place update.
    fn on_object_modified(&self, _object: &dyn Object) {}

    /// An object reached the end of its lifetime.
    ///
    /// Runs from the drop path of the object. Only the identity state is accessible, the
    /// object payload is already torn down.
    fn on_object_destroyed(&self, _state: &ObjectState) {}
}
