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

//! Watching a registry broadcast tree mutations.

use std::sync::Arc;

use hypocenter::prelude::{Catalog, Event, Object, ObjectState, Observer, Origin, PublicObject, Registry};

struct EchoObserver;

impl EchoObserver {
    fn label(object: &dyn Object) -> String {
        match object.state().public_id() {
            Some(id) => id.to_string(),
            None => format!("<{}>", object.type_info()),
        }
    }
}

impl Observer for EchoObserver {
    fn on_object_added(&self, parent: &dyn PublicObject, object: &dyn Object) {
        println!("+ {} (parent: {})", Self::label(object), parent.public_id());
    }

    fn on_object_modified(&self, object: &dyn Object) {
        println!("~ {}", Self::label(object));
    }

    fn on_object_removed(&self, parent: &dyn PublicObject, object: &dyn Object) {
        println!("- {} (parent: {})", Self::label(object), parent.public_id());
    }

    fn on_object_destroyed(&self, state: &ObjectState) {
        match state.public_id() {
            Some(id) => println!("x {id}"),
            None => println!("x <{}>", state.type_info()),
        }
    }
}

/// Output:
///
/// ```plain
/// + Event/2026abcd (parent: Catalog/2026)
/// + Origin/2026abcd.1 (parent: Event/2026abcd)
/// ~ Event/2026abcd
/// - Event/2026abcd (parent: Catalog/2026)
/// notification: Add Event/2026abcd (parent: Catalog/2026)
/// notification: Add Origin/2026abcd.1 (parent: Event/2026abcd)
/// notification: Update Event/2026abcd (parent: Catalog/2026)
/// notification: Remove Event/2026abcd (parent: Catalog/2026)
/// x Event/2026abcd
/// x Origin/2026abcd.1
/// x Catalog/2026
/// ```
fn main() {
    let registry = Registry::new();
    registry.add_observer(Arc::new(EchoObserver));
    registry.set_notification_enabled(true);

    let catalog = Catalog::create_with_id(&registry, "Catalog/2026").unwrap();
    let event = Event::create_with_id(&registry, "Event/2026abcd", "alpine foreland").unwrap();
    catalog.add_event(&event).unwrap();

    let origin = Origin::create_with_id(&registry, "Origin/2026abcd.1", 47.37, 8.54).unwrap();
    event.add_origin(&origin).unwrap();

    event.set_region("alpine foreland, revised");
    event.update();

    catalog.remove_event(&event).unwrap();

    for notification in registry.drain_notifications() {
        let subject = notification.subject_id().map(|id| id.as_str()).unwrap_or("?");
        let parent = notification.parent_id().map(|id| id.as_str()).unwrap_or("-");
        println!("notification: {:?} {subject} (parent: {parent})", notification.op());
    }

    // The event still owns the origin, so dropping the origin handle alone
    // frees nothing. The destroyed callbacks fire from the drop path.
    drop(origin);
    drop(event);
    drop(catalog);
}
