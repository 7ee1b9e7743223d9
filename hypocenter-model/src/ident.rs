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
    borrow::Borrow,
    fmt::{Debug, Display},
    ops::Deref,
    sync::Arc,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Process-unique identity of a public object.
///
/// A `PublicId` is a cheaply cloneable shared string. Two ids compare equal when their string
/// forms are equal, regardless of which object they were read from.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PublicId(Arc<str>);

impl PublicId {
    /// Create an id from its string form.
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// The string form of the id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Debug for PublicId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PublicId").field(&self.as_str()).finish()
    }
}

impl Display for PublicId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Deref for PublicId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// `Borrow<str>` lets string slices serve as lookup keys wherever `PublicId` is the map key.
impl Borrow<str> for PublicId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PublicId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PublicId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

impl Serialize for PublicId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PublicId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let id = String::deserialize(deserializer)?;
        Ok(Self::from(id))
    }
}

/// Static type descriptor of a model object.
///
/// Descriptors compare by type name. Two descriptors with the same name refer to the same
/// model type.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    name: &'static str,
}

impl TypeInfo {
    /// Create a descriptor with the given type name.
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    /// The type name of the descriptor.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Debug for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TypeInfo").field(&self.name).finish()
    }
}

impl Display for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Serialize for TypeInfo {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name)
    }
}

/// Model types with a static [`TypeInfo`] descriptor.
///
/// Implemented by concrete object types so that typed lookups can name the expected type
/// without an instance at hand.
pub trait Typed {
    /// Type descriptor shared by all instances of the type.
    const TYPE: TypeInfo;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_send_sync_static<T: Send + Sync + 'static>() {}

    #[test]
    fn test_send_sync_static() {
        is_send_sync_static::<PublicId>();
        is_send_sync_static::<TypeInfo>();
    }

    #[test]
    fn test_public_id_equality() {
        let a = PublicId::new("Origin/20260214080910.000001.1");
        let b = a.clone();
        let c = PublicId::from("Origin/20260214080910.000001.1".to_string());

        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_ne!(a, PublicId::new("Origin/20260214080910.000001.2"));
    }

    #[test]
    fn test_public_id_as_map_key() {
        let mut pool = hashbrown::HashMap::new();
        pool.insert(PublicId::new("Event/a"), 1);
        pool.insert(PublicId::new("Event/b"), 2);

        // lookups by plain string slices must agree with lookups by id
        assert_eq!(pool.get("Event/a"), Some(&1));
        assert_eq!(pool.get(&PublicId::new("Event/b")), Some(&2));
        assert_eq!(pool.get("Event/c"), None);
    }

    #[test]
    fn test_public_id_serde() {
        let id = PublicId::new("Pick/20260214080910.000001.7");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"Pick/20260214080910.000001.7\"");

        let back: PublicId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_type_info() {
        const ORIGIN: TypeInfo = TypeInfo::new("Origin");

        assert_eq!(ORIGIN.name(), "Origin");
        assert_eq!(ORIGIN, TypeInfo::new("Origin"));
        assert_ne!(ORIGIN, TypeInfo::new("Event"));
        assert_eq!(ORIGIN.to_string(), "Origin");
    }
}
