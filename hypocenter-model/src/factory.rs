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

use std::{fmt::Debug, sync::Arc};

use hashbrown::{hash_map::Entry, HashMap};
use hypocenter_common::error::{Error, ErrorKind, Result};

use crate::{
    ident::{PublicId, TypeInfo},
    public::PublicObject,
    registry::Registry,
};

/// Constructs public objects of one type.
pub trait ObjectFactory: Send + Sync + 'static {
    /// Type this factory constructs.
    fn type_info(&self) -> TypeInfo;

    /// Construct an empty object bound to `id`, registered with `registry`.
    fn create(&self, registry: &Registry, id: PublicId) -> Result<Arc<dyn PublicObject>>;
}

/// Factories indexed by type name, for constructing objects from serialized
/// or archived form where only the type name is known.
pub struct FactoryRegistry {
    factories: HashMap<&'static str, Arc<dyn ObjectFactory>>,
}

impl Debug for FactoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactoryRegistry")
            .field("len", &self.factories.len())
            .finish()
    }
}

impl Default for FactoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FactoryRegistry {
    /// An empty factory registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a factory for its type.
    ///
    /// Fails with [`ErrorKind::Config`] if the type already has a factory.
    pub fn register(&mut self, factory: Arc<dyn ObjectFactory>) -> Result<()> {
        let name = factory.type_info().name();
        match self.factories.entry(name) {
            Entry::Occupied(_) => {
                Err(Error::config("factory already registered").with_context("type", name))
            }
            Entry::Vacant(v) => {
                v.insert(factory);
                Ok(())
            }
        }
    }

    /// Factory for the given type name.
    pub fn get(&self, type_name: &str) -> Option<&Arc<dyn ObjectFactory>> {
        self.factories.get(type_name)
    }

    /// Construct an object of `type_info` bound to `id`.
    ///
    /// Fails with [`ErrorKind::Unsupported`] when the type has no factory.
    pub fn create(
        &self,
        registry: &Registry,
        type_info: TypeInfo,
        id: PublicId,
    ) -> Result<Arc<dyn PublicObject>> {
        let Some(factory) = self.factories.get(type_info.name()) else {
            return Err(Error::new(ErrorKind::Unsupported, "no factory for type")
                .with_context("type", type_info.name()));
        };
        factory.create(registry, id)
    }

    /// Count of registered factories.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether no factories are registered.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}
