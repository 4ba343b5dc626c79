// Copyright 2024 Saptak Santra
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

//! Generic publish/subscribe event channels keyed by event type, backed by
//! `crossbeam::channel`. Generalizes the teacher's `EventBus`
//! (type-erased storage keyed by `TypeId`, one queue per event type) from a
//! polled queue to fan-out broadcast channels.

use std::any::{Any, TypeId};
use std::sync::Arc;

use ahash::AHashMap;
use crossbeam::channel::{Receiver, Sender};
use parking_lot::{Mutex, RwLock};

/// Type-erased handle used to empty a channel without knowing its event
/// type, so `clear_one_frame_data` can sweep every registered channel.
trait ErasedChannel: Send + Sync {
    fn clear(&self);
}

/// Broadcast channel for one event type: every live subscriber gets its own
/// `crossbeam` receiver fed by a shared fan-out on `publish`.
pub struct EventChannel<T: Clone + Send + Sync + 'static> {
    senders: Mutex<Vec<Sender<T>>>,
}

impl<T: Clone + Send + Sync + 'static> EventChannel<T> {
    fn new() -> Self {
        Self {
            senders: Mutex::new(Vec::new()),
        }
    }

    /// Register a new subscriber; returns its receiving end.
    pub fn subscribe(&self) -> Receiver<T> {
        let (tx, rx) = crossbeam::channel::unbounded();
        self.senders.lock().push(tx);
        rx
    }

    /// Broadcast `event` to every live subscriber, dropping senders whose
    /// receiver has gone away.
    pub fn publish(&self, event: T) {
        let mut senders = self.senders.lock();
        senders.retain(|s| s.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.senders.lock().len()
    }
}

impl<T: Clone + Send + Sync + 'static> ErasedChannel for EventChannel<T> {
    fn clear(&self) {
        // Drops every outstanding sender: open receivers observe the
        // channel disconnect rather than silently going quiet, matching
        // "empties all channels" as a hard end-of-frame boundary.
        self.senders.lock().clear();
    }
}

/// Registry of all event channels in a world, one per distinct event type.
pub struct EventChannelRegistry {
    by_type: RwLock<AHashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
    erased: RwLock<Vec<Arc<dyn ErasedChannel>>>,
}

impl EventChannelRegistry {
    pub fn new() -> Self {
        Self {
            by_type: RwLock::new(AHashMap::default()),
            erased: RwLock::new(Vec::new()),
        }
    }

    /// Get (creating if needed) the channel for event type `T`.
    pub fn channel<T: Clone + Send + Sync + 'static>(&self) -> Arc<EventChannel<T>> {
        let tid = TypeId::of::<T>();
        if let Some(existing) = self.by_type.read().get(&tid) {
            return existing.clone().downcast::<EventChannel<T>>().expect("type-keyed map");
        }
        let mut by_type = self.by_type.write();
        if let Some(existing) = by_type.get(&tid) {
            return existing.clone().downcast::<EventChannel<T>>().expect("type-keyed map");
        }
        let channel = Arc::new(EventChannel::<T>::new());
        by_type.insert(tid, channel.clone());
        self.erased.write().push(channel.clone());
        channel
    }

    pub fn publish<T: Clone + Send + Sync + 'static>(&self, event: T) {
        self.channel::<T>().publish(event);
    }

    pub fn subscribe<T: Clone + Send + Sync + 'static>(&self) -> Receiver<T> {
        self.channel::<T>().subscribe()
    }

    /// Empty every registered channel, regardless of event type. Called by
    /// `World::clear_one_frame_data`.
    pub fn clear_all(&self) {
        for channel in self.erased.read().iter() {
            channel.clear();
        }
    }
}

impl Default for EventChannelRegistry {
    fn default() -> Self {
        Self::new()
    }
}
