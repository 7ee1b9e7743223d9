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

//! Object identity and ownership model for hypocenter.
//!
//! Objects form trees held together by strong child containers and weak
//! parent back references. Public objects additionally carry a
//! process-unique publicID bound in an explicit [`registry::Registry`],
//! which broadcasts mutations to [`observer::Observer`]s and records them
//! as [`notify::Notification`]s.

pub mod factory;
pub mod ident;
pub mod notify;
pub mod object;
pub mod observer;
pub mod public;
pub mod registry;
pub mod visitor;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub mod prelude;
