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

use serde::Serialize;

use crate::ident::{PublicId, TypeInfo};

/// Kind of tree mutation a notification describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// An object was attached to a parent.
    Add,
    /// An object reported an in-place update.
    Update,
    /// An object was detached from its parent.
    Remove,
}

/// Identity metadata of one observed tree mutation.
///
/// Notifications never carry the object payload. Consumers that need it resolve the subject
/// through the registry or an archive while the metadata is still fresh.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    op: Operation,
    subject_type: TypeInfo,
    subject_id: Option<PublicId>,
    parent_id: Option<PublicId>,
}

impl Notification {
    pub(crate) fn new(
        op: Operation,
        subject_type: TypeInfo,
        subject_id: Option<PublicId>,
        parent_id: Option<PublicId>,
    ) -> Self {
        Self {
            op,
            subject_type,
            subject_id,
            parent_id,
        }
    }

    /// The mutation kind.
    pub fn op(&self) -> Operation {
        self.op
    }

    /// Type of the mutated object.
    pub fn subject_type(&self) -> TypeInfo {
        self.subject_type
    }

    /// Identity of the mutated object, absent for plain objects.
    pub fn subject_id(&self) -> Option<&PublicId> {
        self.subject_id.as_ref()
    }

    /// Identity of the parent the mutation happened under, if any.
    pub fn parent_id(&self) -> Option<&PublicId> {
        self.parent_id.as_ref()
    }
}
