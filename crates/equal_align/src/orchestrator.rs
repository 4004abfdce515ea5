//! The aligner instance: owns the tracked set and drives passes.

use log::{debug, info};
use rustc_hash::FxHashSet;
use tracing::info_span;

use crate::capabilities::EngineProfile;
use crate::comparison::{ComparisonEngine, Outcome};
use crate::config::{AlignConfig, RunHooks};
use crate::events::{PassTrigger, Subscriptions};
use crate::geometry::TrackedElement;
use crate::host::{EventKind, EventTarget, Host, HostEvent, NodeHandle};
use crate::selection::select;

/// Lifecycle of an aligner. `Destroyed` is terminal.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Active,
    Destroyed,
}

/// Counters for one pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Unordered pairs evaluated.
    pub pairs: usize,
    /// Pairs whose vertical spans overlapped.
    pub adjacent: usize,
    /// Pairs that produced a `min-height` override.
    pub adjusted: usize,
}

impl PassReport {
    fn record(&mut self, outcome: Outcome) {
        self.pairs += 1;
        if outcome.is_adjacent() {
            self.adjacent += 1;
        }
        if outcome.is_adjusted() {
            self.adjusted += 1;
        }
    }
}

/// Keeps sibling boxes in a row at the same rendered height.
///
/// Construction selects the tracked elements, subscribes to window resize
/// and to the load event of every image inside them, and runs the first
/// pass. Each pass compares every unordered pair `(i, j)` with `i < j` in
/// ascending order. Adjustments made early in a pass are visible to later
/// pairs, which is what lets three or more adjacent boxes converge on the
/// tallest one within a single pass, so the iteration order is part of the
/// behaviour.
#[derive(Debug)]
pub struct EqualAlign<N> {
    config: AlignConfig,
    engine: ComparisonEngine,
    tracked: Vec<TrackedElement<N>>,
    subscriptions: Subscriptions<N>,
    lifecycle: Lifecycle,
}

impl<N: NodeHandle> EqualAlign<N> {
    /// Start aligning the descendants of `container` selected by `config`.
    ///
    /// # Arguments
    ///
    /// * `host` - The document the aligner reads and writes
    /// * `container` - Root of the subtree searched for tracked elements
    /// * `config` - Class filters and threshold
    /// * `hooks` - Callbacks fired once around the first pass
    ///
    /// Never fails: a missing container or an empty selection produces an
    /// active instance with nothing to align.
    pub fn new<H>(host: &mut H, container: Option<N>, config: AlignConfig, mut hooks: RunHooks) -> Self
    where
        H: Host<Node = N> + ?Sized,
    {
        let profile = EngineProfile::detect(host);
        let tracked = select(&*host, container, &config.target_class, profile.lookup);
        let mut aligner = Self {
            engine: ComparisonEngine::new(config.threshold, profile),
            config,
            tracked,
            subscriptions: Subscriptions::default(),
            lifecycle: Lifecycle::Active,
        };

        aligner.subscriptions.subscribe(
            host,
            EventTarget::Window,
            EventKind::Resize,
            PassTrigger::ResetThenRun,
        );
        hooks.fire_before();
        aligner.subscribe_images(host);
        let report = aligner.run(host);
        hooks.fire_after();

        info!(
            "equal_align: tracking {} element(s), first pass adjusted {}",
            aligner.tracked.len(),
            report.adjusted
        );
        aligner
    }

    fn subscribe_images<H>(&mut self, host: &mut H)
    where
        H: Host<Node = N> + ?Sized,
    {
        // nested or repeated tracked elements share images; one listener each
        let mut seen = FxHashSet::default();
        let images: Vec<N> = self
            .tracked
            .iter()
            .flat_map(|element| host.descendant_images(element.node()))
            .filter(|image| seen.insert(*image))
            .collect();
        for image in images {
            self.subscriptions.subscribe(
                host,
                EventTarget::Node(image),
                EventKind::Load,
                PassTrigger::ResetThenRun,
            );
        }
    }

    /// Compare every unordered pair once, in ascending index order.
    pub fn run<H>(&mut self, host: &mut H) -> PassReport
    where
        H: Host<Node = N> + ?Sized,
    {
        let mut report = PassReport::default();
        if self.lifecycle == Lifecycle::Destroyed {
            return report;
        }

        let _span = info_span!("equal_align.run", elements = self.tracked.len()).entered();
        for first in 0..self.tracked.len() {
            let (head, tail) = self.tracked.split_at_mut(first + 1);
            let Some(anchor) = head.last_mut() else {
                continue;
            };
            for other in tail {
                report.record(self.engine.compare(host, anchor, other));
            }
        }
        debug!("equal_align: pass finished {report:?}");
        report
    }

    /// Clear every applied override back to an empty `min-height`.
    pub fn reset<H>(&self, host: &mut H)
    where
        H: Host<Node = N> + ?Sized,
    {
        for element in &self.tracked {
            element.apply_min_height(host, "");
        }
    }

    /// Re-run a pass on demand.
    pub fn update<H>(&mut self, host: &mut H) -> PassReport
    where
        H: Host<Node = N> + ?Sized,
    {
        self.trigger(host, PassTrigger::Run)
    }

    /// React to an event delivered by the host. Events the aligner did not
    /// subscribe to (or any event after teardown) are ignored.
    pub fn handle_event<H>(&mut self, host: &mut H, event: &HostEvent<N>) -> Option<PassReport>
    where
        H: Host<Node = N> + ?Sized,
    {
        let trigger = self.subscriptions.trigger_for(event)?;
        debug!("equal_align: {} on {:?} -> {trigger:?}", event.kind.as_str(), event.target);
        Some(self.trigger(host, trigger))
    }

    fn trigger<H>(&mut self, host: &mut H, trigger: PassTrigger) -> PassReport
    where
        H: Host<Node = N> + ?Sized,
    {
        if self.lifecycle == Lifecycle::Destroyed {
            return PassReport::default();
        }
        if trigger == PassTrigger::ResetThenRun {
            self.reset(host);
        }
        self.run(host)
    }

    /// Restore every original `min-height`, detach all listeners and drop
    /// the tracked set. Calling it again does nothing.
    pub fn destroy<H>(&mut self, host: &mut H)
    where
        H: Host<Node = N> + ?Sized,
    {
        if self.lifecycle == Lifecycle::Destroyed {
            return;
        }
        let mut restored = 0_usize;
        self.subscriptions.release_all(host);
        for element in self.tracked.drain(..) {
            element.restore(host);
            restored += 1;
        }
        self.lifecycle = Lifecycle::Destroyed;
        debug!("equal_align: destroyed, restored {restored} element(s)");
    }

    /// Get the tracked elements, in pass order.
    ///
    /// # Returns
    ///
    /// The managed set; empty once the aligner is destroyed
    #[inline]
    #[must_use]
    pub fn tracked(&self) -> &[TrackedElement<N>] {
        &self.tracked
    }

    /// Get the listeners currently held.
    #[inline]
    #[must_use]
    pub fn subscriptions(&self) -> &Subscriptions<N> {
        &self.subscriptions
    }

    /// Get the engine behaviour detected at construction.
    ///
    /// # Returns
    ///
    /// The `min-height` model and property lookup strategy in use
    #[inline]
    #[must_use]
    pub fn profile(&self) -> EngineProfile {
        self.engine.profile()
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &AlignConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Whether the aligner still reacts to events.
    ///
    /// # Returns
    ///
    /// `false` once [`EqualAlign::destroy`] has run
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.lifecycle == Lifecycle::Active
    }
}
