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

use std::borrow::Cow;

use super::{BoxedCounter, BoxedGauge, BoxedHistogram, RegistryOps};

// FIXME: https://github.com/rust-lang/rust-analyzer/issues/17685
// #[expect(missing_docs)]
/// ... ...
#[derive(Debug)]
pub struct Metrics {
    /* identity pool metrics */
    /// ... ...
    pub identity_register: BoxedCounter,
    /// ... ...
    pub identity_release: BoxedCounter,
    /// ... ...
    pub identity_hit: BoxedCounter,
    /// ... ...
    pub identity_miss: BoxedCounter,
    /// ... ...
    pub identity_collision: BoxedCounter,

    /// ... ...
    pub identity_usage: BoxedGauge,

    /* object cache metrics */
    /// ... ...
    pub cache_feed: BoxedCounter,
    /// ... ...
    pub cache_hit: BoxedCounter,
    /// ... ...
    pub cache_miss: BoxedCounter,
    /// ... ...
    pub cache_evict: BoxedCounter,
    /// ... ...
    pub cache_remove: BoxedCounter,
    /// ... ...
    pub cache_load: BoxedCounter,

    /// ... ...
    pub cache_usage: BoxedGauge,

    /// ... ...
    pub cache_load_duration: BoxedHistogram,
}

impl Metrics {
    /// Create a new metric with the given name.
    pub fn new<R>(name: impl Into<Cow<'static, str>>, registry: &R) -> Self
    where
        R: RegistryOps,
    {
        let name = name.into();

        /* identity pool metrics */

        let hypocenter_identity_op_total = registry.register_counter_vec(
            "hypocenter_identity_op_total".into(),
            "hypocenter identity pool operations".into(),
            &["name", "op"],
        );
        let hypocenter_identity_usage = registry.register_gauge_vec(
            "hypocenter_identity_usage".into(),
            "hypocenter identity pool usage".into(),
            &["name"],
        );

        let identity_register = hypocenter_identity_op_total.counter(&[name.clone(), "register".into()]);
        let identity_release = hypocenter_identity_op_total.counter(&[name.clone(), "release".into()]);
        let identity_hit = hypocenter_identity_op_total.counter(&[name.clone(), "hit".into()]);
        let identity_miss = hypocenter_identity_op_total.counter(&[name.clone(), "miss".into()]);
        let identity_collision = hypocenter_identity_op_total.counter(&[name.clone(), "collision".into()]);

        let identity_usage = hypocenter_identity_usage.gauge(&[name.clone()]);

        /* object cache metrics */

        let hypocenter_cache_op_total = registry.register_counter_vec(
            "hypocenter_cache_op_total".into(),
            "hypocenter object cache operations".into(),
            &["name", "op"],
        );
        let hypocenter_cache_usage = registry.register_gauge_vec(
            "hypocenter_cache_usage".into(),
            "hypocenter object cache usage".into(),
            &["name"],
        );
        let hypocenter_cache_op_duration = registry.register_histogram_vec(
            "hypocenter_cache_op_duration".into(),
            "hypocenter object cache op durations".into(),
            &["name", "op"],
        );

        let cache_feed = hypocenter_cache_op_total.counter(&[name.clone(), "feed".into()]);
        let cache_hit = hypocenter_cache_op_total.counter(&[name.clone(), "hit".into()]);
        let cache_miss = hypocenter_cache_op_total.counter(&[name.clone(), "miss".into()]);
        let cache_evict = hypocenter_cache_op_total.counter(&[name.clone(), "evict".into()]);
        let cache_remove = hypocenter_cache_op_total.counter(&[name.clone(), "remove".into()]);
        let cache_load = hypocenter_cache_op_total.counter(&[name.clone(), "load".into()]);

        let cache_usage = hypocenter_cache_usage.gauge(&[name.clone()]);

        let cache_load_duration = hypocenter_cache_op_duration.histogram(&[name, "load".into()]);

        Self {
            identity_register,
            identity_release,
            identity_hit,
            identity_miss,
            identity_collision,
            identity_usage,

            cache_feed,
            cache_hit,
            cache_miss,
            cache_evict,
            cache_remove,
            cache_load,
            cache_usage,
            cache_load_duration,
        }
    }

    /// Build noop metrics.
    ///
    /// Note: `noop` is only supposed to be called by other hypocenter components.
    #[doc(hidden)]
    pub fn noop() -> Self {
        use super::registry::noop::NoopMetricsRegistry;

        Self::new("test", &NoopMetricsRegistry)
    }
}
