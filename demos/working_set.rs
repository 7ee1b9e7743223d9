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

//! Keeping a bounded working set of events over an archive.
//!
//! Run with `RUST_LOG=trace` to watch the cache decisions.

use hypocenter::prelude::{
    Event, MemoryArchive, ObjectCacheBuilder, Registry, Ring, RingConfig, Typed,
};

const EVENTS: usize = 8;
const CAPACITY: usize = 3;

fn main() {
    use tracing_subscriber::{prelude::*, EnvFilter};

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_line_number(true))
        .with(EnvFilter::from_default_env())
        .init();

    let registry = Registry::new();

    // Long-term storage for every event we know about.
    let archive = MemoryArchive::new();
    for i in 0..EVENTS {
        let event = Event::create_with_id(&registry, format!("Event/{i}"), format!("region-{i}"))
            .unwrap();
        archive.put(event);
    }

    let mut cache = ObjectCacheBuilder::<Ring>::new(RingConfig { capacity: CAPACITY })
        .with_archive(archive.clone())
        .with_pop_callback(|object| println!("evicted {}", object.public_id()))
        .build();

    // Sweep over everything once. The cache stays bounded; the oldest
    // entries fall out as newer ones are loaded.
    for i in 0..EVENTS {
        let id = format!("Event/{i}");
        let object = cache.find(Event::TYPE, &id).expect("archived above");
        tracing::info!(
            "read {} ({}) cached: {}",
            object.public_id(),
            object.as_any().downcast_ref::<Event>().unwrap().region(),
            cache.cached(),
        );
    }

    // A second pass over the hot tail is served from memory.
    for i in EVENTS - CAPACITY..EVENTS {
        let id = format!("Event/{i}");
        cache.find(Event::TYPE, &id).expect("still cached");
        assert!(cache.cached());
    }

    println!("live: {} of {}", cache.len(), EVENTS);
    println!("loads: {}", archive.loads());
    if let Some(window) = cache.time_window() {
        println!("window: {}ms", window.length().num_milliseconds());
    }
}
