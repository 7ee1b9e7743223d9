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

use crate::{object::Object, public::PublicObject};

/// Order in which an object tree is walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraversalMode {
    /// Parents are visited before their children. Subtrees can be pruned.
    #[default]
    TopDown,
    /// Children are visited before their parents.
    BottomUp,
}

/// Read-only walk over an object tree.
///
/// A visitor is driven by [`Object::accept`]. Public objects arrive through
/// [`visit_public`], plain objects through [`visit_object`]. Visitors must not mutate the
/// tree they are walking.
///
/// [`visit_public`]: Visitor::visit_public
/// [`visit_object`]: Visitor::visit_object
pub trait Visitor {
    /// Traversal order, top-down by default.
    fn mode(&self) -> TraversalMode {
        TraversalMode::TopDown
    }

    /// Visit a public object.
    ///
    /// Returning `false` in top-down mode skips the subtree below `object`. The return value
    /// is ignored in bottom-up mode.
    fn visit_public(&mut self, object: &dyn PublicObject) -> bool;

    /// Visit a plain object.
    fn visit_object(&mut self, object: &dyn Object);

    /// A public object visited in top-down mode has no more children to yield.
    ///
    /// Not called for pruned subtrees, and never called in bottom-up mode.
    fn finished(&mut self) {}
}

/// Drive `visitor` over a public object and the children yielded by `children`.
///
/// Concrete types implement [`Object::accept`] with this, passing a closure that walks their
/// child containers in document order.
pub fn walk_public<F>(object: &dyn PublicObject, visitor: &mut dyn Visitor, children: F)
where
    F: FnOnce(&mut dyn Visitor),
{
    match visitor.mode() {
        TraversalMode::TopDown => {
            if visitor.visit_public(object) {
                children(visitor);
                visitor.finished();
            }
        }
        TraversalMode::BottomUp => {
            children(visitor);
            visitor.visit_public(object);
        }
    }
}
