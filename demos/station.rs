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

//! Implementing a custom public object type outside the core model.

use std::{any::Any, fmt::Debug, sync::Arc};

use hypocenter::prelude::{
    walk_public, Error, ErrorKind, Object, ObjectState, PublicObject, PublicObjectState, Registry,
    Result, RingCache, RingConfig, TypeInfo, Typed, Visitor,
};
use parking_lot::Mutex;

/// A seismic station, identified by network and station code.
struct Station {
    state: PublicObjectState,
    description: Mutex<String>,
}

impl Debug for Station {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Station")
            .field("public_id", self.state.public_id())
            .finish()
    }
}

impl Station {
    fn create(
        registry: &Registry,
        network: &str,
        code: &str,
        description: impl Into<String>,
    ) -> Result<Arc<Self>> {
        let station = Arc::new(Self {
            state: PublicObjectState::new(registry, Self::TYPE, format!("Station/{network}.{code}")),
            description: Mutex::new(description.into()),
        });
        registry.register(&(station.clone() as Arc<dyn PublicObject>))?;
        Ok(station)
    }

    fn description(&self) -> String {
        self.description.lock().clone()
    }
}

impl Typed for Station {
    const TYPE: TypeInfo = TypeInfo::new("Station");
}

impl Object for Station {
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
            description: Mutex::new(self.description()),
        })
    }

    fn assign(&self, source: &dyn Object) -> Result<()> {
        let Some(source) = source.as_any().downcast_ref::<Self>() else {
            return Err(Error::new(ErrorKind::Unsupported, "assign type mismatch"));
        };
        if !std::ptr::eq(self, source) {
            *self.description.lock() = source.description();
        }
        Ok(())
    }
}

impl PublicObject for Station {
    fn public_state(&self) -> &PublicObjectState {
        &self.state
    }

    fn as_public(&self) -> &dyn PublicObject {
        self
    }
}

fn main() -> Result<()> {
    let registry = Registry::new();

    let station = Station::create(&registry, "CH", "ROTHE", "Rothenbrunnen")?;
    println!("registered: {}", station.public_id());

    // The identity pool answers with the very same object.
    let found = registry.find("Station/CH.ROTHE").expect("station is live");
    assert!(std::ptr::addr_eq(
        Arc::as_ptr(&found),
        Arc::as_ptr(&(station.clone() as Arc<dyn PublicObject>))
    ));

    // A second binding of the id is refused while the station lives.
    let collision = Station::create(&registry, "CH", "ROTHE", "impostor");
    println!("rebinding: {}", collision.unwrap_err());

    // Custom types flow through the caches like the built-in ones.
    let mut cache = RingCache::new(RingConfig { capacity: 16 });
    cache.feed(station.clone());
    let cached = cache.find_as::<Station>("Station/CH.ROTHE").expect("fed above");
    println!("cached: {} ({})", cached.public_id(), cached.description());

    Ok(())
}
