//! Observable application state: explicit dirty + flush with
//! selector-based subscriptions, and the frame-count throttle that bounds
//! how often the position buffer is copied into it.

use std::collections::HashMap;

use bevy::prelude::*;
use chrono::{DateTime, Utc};

use crate::data::ObjectId;
use crate::interaction::SelectionState;
use crate::pipeline::buffer::{PositionBuffer, PositionSample};
use crate::pipeline::closest::Closest;

pub const DEFAULT_SYNC_INTERVAL: u32 = 60;

/// The externally visible snapshot read by UI panels.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObservedState {
    pub positions: HashMap<ObjectId, PositionSample>,
    pub selection: SelectionState,
    pub closest: Option<Closest>,
    pub sim_time: Option<DateTime<Utc>>,
    pub time_speed: f64,
    pub paused: bool,
    pub catalog_size: usize,
    pub failed_objects: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&ObservedState) + Send + Sync>;

#[derive(Resource, Default)]
pub struct ObservableStore {
    state: ObservedState,
    dirty: bool,
    revision: u64,
    position_syncs: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl ObservableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ObservedState {
        &self.state
    }

    /// Incremented by every flush that published changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Number of position copies made into the store.
    pub fn position_syncs(&self) -> u64 {
        self.position_syncs
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mutate the pending state. Nothing is published until [`flush`].
    ///
    /// [`flush`]: ObservableStore::flush
    pub fn update(&mut self, mutate: impl FnOnce(&mut ObservedState)) {
        let before = self.revision_key();
        mutate(&mut self.state);
        if self.revision_key() != before {
            self.dirty = true;
        }
    }

    /// Copy every buffered sample into the observable state. An identical
    /// buffer leaves the state clean.
    pub fn sync_positions(&mut self, buffer: &PositionBuffer) {
        self.position_syncs += 1;
        let unchanged = self.state.positions.len() == buffer.len()
            && buffer
                .iter()
                .all(|(id, sample)| self.state.positions.get(id) == Some(sample));
        if unchanged {
            return;
        }
        self.state.positions.clear();
        self.state
            .positions
            .extend(buffer.iter().map(|(id, sample)| (*id, *sample)));
        self.dirty = true;
    }

    /// Publish pending changes to subscribers. Returns whether anything was
    /// published.
    pub fn flush(&mut self) -> bool {
        if !self.dirty {
            return false;
        }
        self.dirty = false;
        self.revision += 1;
        for (_, listener) in &mut self.listeners {
            listener(&self.state);
        }
        true
    }

    /// Call `on_change` after each flush in which `selector`'s projection of
    /// the state differs from the last value it saw. The first flush after
    /// subscribing always fires.
    pub fn subscribe_with_selector<T, S, F>(&mut self, selector: S, mut on_change: F) -> SubscriptionId
    where
        T: PartialEq + Send + Sync + 'static,
        S: Fn(&ObservedState) -> T + Send + Sync + 'static,
        F: FnMut(&T) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        let mut last: Option<T> = None;
        self.listeners.push((
            id,
            Box::new(move |state: &ObservedState| {
                let current = selector(state);
                if last.as_ref() != Some(&current) {
                    on_change(&current);
                    last = Some(current);
                }
            }),
        ));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    /// Everything but positions; positions are marked dirty by
    /// `sync_positions` itself.
    #[allow(clippy::type_complexity)]
    fn revision_key(&self) -> (SelectionState, Option<Closest>, Option<DateTime<Utc>>, u64, bool, usize, usize) {
        (
            self.state.selection.clone(),
            self.state.closest,
            self.state.sim_time,
            self.state.time_speed.to_bits(),
            self.state.paused,
            self.state.catalog_size,
            self.state.failed_objects,
        )
    }
}

/// Frame counter gating the position copy: fires when
/// `frame_counter % interval == 0`.
#[derive(Resource, Clone, Debug)]
pub struct SyncThrottle {
    interval: u32,
    frame_counter: u64,
}

impl SyncThrottle {
    pub fn new(interval: u32) -> Self {
        Self {
            interval: interval.max(1),
            frame_counter: 0,
        }
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// Count one frame; true on frames where the copy is due.
    pub fn tick(&mut self) -> bool {
        self.frame_counter += 1;
        self.frame_counter % self.interval as u64 == 0
    }

    /// Count one frame and, when due, copy the buffer into the store.
    /// Returns whether a copy happened.
    pub fn sync(&mut self, buffer: &PositionBuffer, store: &mut ObservableStore) -> bool {
        if !self.tick() {
            return false;
        }
        store.sync_positions(buffer);
        true
    }
}

impl Default for SyncThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_SYNC_INTERVAL)
    }
}
