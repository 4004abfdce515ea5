//! Listener bookkeeping.
//!
//! Every listener the aligner registers is recorded together with what the
//! aligner should do when it fires. Teardown drains the records and removes
//! each listener exactly once.

use log::{debug, warn};

use crate::host::{EventHost, EventKind, EventTarget, HostEvent, ListenerId, NodeHandle};

/// Work performed when a subscribed event fires.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PassTrigger {
    /// Clear every applied `min-height`, then run a pass.
    ResetThenRun,
    /// Run a pass over the current geometry.
    Run,
}

/// One registered listener.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Subscription<N> {
    pub target: EventTarget<N>,
    pub kind: EventKind,
    pub trigger: PassTrigger,
    pub listener: ListenerId,
}

/// Recorded subscriptions, released together on teardown.
#[derive(Clone, Debug)]
pub struct Subscriptions<N> {
    records: Vec<Subscription<N>>,
}

impl<N> Default for Subscriptions<N> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<N: NodeHandle> Subscriptions<N> {
    /// Register a listener with the host and record it. Registration
    /// failures are logged and leave nothing recorded.
    pub fn subscribe<H>(&mut self, host: &mut H, target: EventTarget<N>, kind: EventKind, trigger: PassTrigger) -> bool
    where
        H: EventHost<Node = N> + ?Sized,
    {
        match host.add_listener(target, kind) {
            Ok(listener) => {
                debug!("equal_align: listening for {} on {target:?} ({listener:?})", kind.as_str());
                self.records.push(Subscription {
                    target,
                    kind,
                    trigger,
                    listener,
                });
                true
            }
            Err(err) => {
                warn!("equal_align: could not listen for {} on {target:?}: {err}", kind.as_str());
                false
            }
        }
    }

    /// What to do for `event`, if it matches a recorded subscription.
    pub fn trigger_for(&self, event: &HostEvent<N>) -> Option<PassTrigger> {
        self.records
            .iter()
            .find(|record| record.target == event.target && record.kind == event.kind)
            .map(|record| record.trigger)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subscription<N>> {
        self.records.iter()
    }

    /// Remove every recorded listener from the host. Later calls find
    /// nothing to release.
    pub fn release_all<H>(&mut self, host: &mut H)
    where
        H: EventHost<Node = N> + ?Sized,
    {
        for record in self.records.drain(..) {
            if let Err(err) = host.remove_listener(record.listener) {
                warn!("equal_align: failed to remove listener {:?}: {err}", record.listener);
            }
        }
    }
}
