//! The fixed-rate presentation loop.
//!
//! Each call to [`PresentationPoller::tick`] is one timer callback. While
//! [`PollerState::Loading`] the surface is assumed not to be listening yet:
//! ticks are counted, nothing is sent, and inbound edits wait in the inbox.
//! After `warmup_ticks` ticks the poller goes [`PollerState::Ready`], sends
//! one all-zero meter push, and from then on every tick:
//!
//! 1. applies queued inbound edits to the parameters,
//! 2. pushes all six parameters if any moved more than the tolerance,
//! 3. pushes the four display meter levels,
//! 4. pushes a downsampled oscilloscope curve of the most recent block. The
//!    same block is pushed again on every tick until a newer one replaces it
//!    or [`RuptureProcessor::release`](rupture_core::RuptureProcessor::release)
//!    clears it.
//!
//! A failed push is logged and counted. The shadow state only advances on
//! success, so a failed parameter push is retried on the next tick.

use crate::config::BridgeConfig;
use crate::detector::{ChangeDetector, LastPushedState};
use crate::inbox::ControlInbox;
use crate::protocol::{OutboundUpdate, ParamAssignment};
use crate::surface::PresentationSurface;
use crossbeam_channel::Receiver;
use rupture_core::{AudioBlock, BridgeHandles, MeterLevels, WaveformDownsampler};

/// Readiness of the presentation surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    /// Warming up; nothing is sent.
    Loading {
        /// Ticks counted so far.
        ticks_elapsed: u32,
    },
    /// Surface is listening.
    Ready,
}

/// Drives the presentation surface from the shared handles.
pub struct PresentationPoller<S> {
    handles: BridgeHandles,
    surface: S,
    config: BridgeConfig,
    state: PollerState,
    detector: ChangeDetector,
    downsampler: WaveformDownsampler,
    inbox: ControlInbox,
    inbound: Receiver<ParamAssignment>,
    block: AudioBlock,
    script: String,
    refresh_pending: bool,
    failed_pushes: u64,
}

impl<S: PresentationSurface> PresentationPoller<S> {
    /// Create a poller in the Loading state.
    ///
    /// The change detector's shadow starts at the current parameter values,
    /// so the first Ready tick sends nothing for parameters that were never
    /// edited. Call [`refresh_all_parameters`](Self::refresh_all_parameters)
    /// to force a full sync.
    pub fn new(handles: BridgeHandles, surface: S, config: BridgeConfig) -> Self {
        let (inbox, inbound) = ControlInbox::channel(config.inbound_capacity);
        let detector = ChangeDetector::new(config.change_tolerance, handles.params.snapshot());
        Self {
            detector,
            downsampler: WaveformDownsampler::new(config.waveform_points),
            block: AudioBlock::new(),
            script: String::with_capacity(2048),
            handles,
            surface,
            config,
            state: PollerState::Loading { ticks_elapsed: 0 },
            inbox,
            inbound,
            refresh_pending: false,
            failed_pushes: 0,
        }
    }

    /// Handle for delivering inbound control text.
    pub fn inbox(&self) -> ControlInbox {
        self.inbox.clone()
    }

    /// Current readiness state.
    pub fn state(&self) -> PollerState {
        self.state
    }

    /// Whether the warm-up has finished.
    pub fn is_ready(&self) -> bool {
        self.state == PollerState::Ready
    }

    /// Configuration in use.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// What the surface was last successfully sent.
    pub fn last_pushed(&self) -> &LastPushedState {
        self.detector.last()
    }

    /// Number of pushes the surface has rejected.
    pub fn failed_pushes(&self) -> u64 {
        self.failed_pushes
    }

    /// The surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The surface, mutably.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Advance one timer period.
    pub fn tick(&mut self) {
        match self.state {
            PollerState::Loading { ticks_elapsed } => {
                let ticks_elapsed = ticks_elapsed.saturating_add(1);
                if ticks_elapsed >= self.config.warmup_ticks {
                    self.become_ready();
                } else {
                    self.state = PollerState::Loading { ticks_elapsed };
                }
            }
            PollerState::Ready => self.tick_ready(),
        }
    }

    /// Push parameters and meters now, regardless of the change threshold.
    ///
    /// While Loading the request is remembered and served on the Ready
    /// transition.
    pub fn refresh_all_parameters(&mut self) {
        if !self.is_ready() {
            self.refresh_pending = true;
            return;
        }
        let params = self.handles.params.snapshot();
        if self.push(&OutboundUpdate::ReverbValues(params)) {
            self.detector.record_params(params);
        }
        let meters = self.display_meters();
        if self.push(&OutboundUpdate::AudioState(meters)) {
            self.detector.record_meters(meters);
        }
    }

    fn become_ready(&mut self) {
        self.state = PollerState::Ready;
        tracing::info!(
            warmup_ticks = self.config.warmup_ticks,
            "presentation surface ready"
        );
        if self.push(&OutboundUpdate::AudioState(MeterLevels::ZERO)) {
            self.detector.record_meters(MeterLevels::ZERO);
        }
        if std::mem::take(&mut self.refresh_pending) {
            self.refresh_all_parameters();
        }
    }

    fn tick_ready(&mut self) {
        self.drain_inbound();

        let params = self.handles.params.snapshot();
        if self.detector.has_changed(&params) && self.push(&OutboundUpdate::ReverbValues(params))
        {
            self.detector.record_params(params);
        }

        let meters = self.display_meters();
        if self.push(&OutboundUpdate::AudioState(meters)) {
            self.detector.record_meters(meters);
        }

        if self.handles.telemetry.consume_latest(&mut self.block) {
            let points = self.downsampler.downsample(&self.block);
            if !points.is_empty() {
                self.push(&OutboundUpdate::Oscilloscope(points));
            }
        }
    }

    fn drain_inbound(&mut self) {
        for assignment in self.inbound.try_iter() {
            tracing::debug!(
                param = %assignment.param,
                value = assignment.value,
                "applying control edit"
            );
            self.handles.params.set(assignment.param, assignment.value);
        }
    }

    fn display_meters(&self) -> MeterLevels {
        self.handles
            .meters
            .load()
            .to_display()
            .snapped(self.config.meter_floor)
    }

    fn push(&mut self, update: &OutboundUpdate) -> bool {
        self.script.clear();
        if update.write_script(&mut self.script).is_err() {
            return false;
        }
        match self.surface.evaluate(&self.script) {
            Ok(()) => true,
            Err(e) => {
                self.failed_pushes += 1;
                tracing::warn!(
                    kind = update.kind(),
                    error = %e,
                    failed = self.failed_pushes,
                    "presentation push failed"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::MemorySurface;

    fn poller(warmup_ticks: u32) -> (PresentationPoller<MemorySurface>, BridgeHandles, MemorySurface) {
        let handles = BridgeHandles::new();
        let surface = MemorySurface::new();
        let config = BridgeConfig {
            warmup_ticks,
            ..BridgeConfig::default()
        };
        let poller = PresentationPoller::new(handles.clone(), surface.clone(), config);
        (poller, handles, surface)
    }

    #[test]
    fn silent_while_loading_then_zero_meters() {
        let (mut poller, _handles, surface) = poller(10);
        for i in 1..10 {
            poller.tick();
            assert_eq!(poller.state(), PollerState::Loading { ticks_elapsed: i });
        }
        assert!(surface.is_empty());

        poller.tick();
        assert!(poller.is_ready());
        assert_eq!(
            surface.take(),
            vec!["window.setAudioState(0.0, 0.0, 0.0, 0.0)".to_owned()]
        );
    }

    #[test]
    fn zero_warmup_is_ready_after_first_tick() {
        let (mut poller, _handles, surface) = poller(0);
        poller.tick();
        assert!(poller.is_ready());
        assert_eq!(surface.len(), 1);
    }

    #[test]
    fn refresh_while_loading_is_deferred() {
        let (mut poller, _handles, surface) = poller(2);
        poller.refresh_all_parameters();
        poller.tick();
        assert!(surface.is_empty());

        poller.tick();
        let scripts = surface.take();
        assert_eq!(scripts.len(), 3);
        assert!(scripts[0].starts_with("window.setAudioState("));
        assert_eq!(
            scripts[1],
            "window.setReverbValues(0.5, 0.5, 0.33, 0.4, 1, 0)"
        );
        assert!(scripts[2].starts_with("window.setAudioState("));
    }

    #[test]
    fn refresh_when_ready_ignores_threshold() {
        let (mut poller, _handles, surface) = poller(1);
        poller.tick();
        surface.take();

        poller.refresh_all_parameters();
        let scripts = surface.take();
        assert_eq!(scripts.len(), 2);
        assert!(scripts[0].starts_with("window.setReverbValues("));
    }

    #[test]
    fn ready_tick_pushes_meters_every_time() {
        let (mut poller, _handles, surface) = poller(1);
        poller.tick();
        surface.take();

        poller.tick();
        poller.tick();
        assert_eq!(
            surface.take(),
            vec![
                "window.setAudioState(0.0, 0.0, 0.0, 0.0)".to_owned(),
                "window.setAudioState(0.0, 0.0, 0.0, 0.0)".to_owned(),
            ]
        );
    }

    #[test]
    fn inbound_edits_wait_for_ready() {
        let (mut poller, handles, surface) = poller(3);
        let inbox = poller.inbox();
        poller.tick();
        assert!(inbox.on_message("rupture:reverb:roomSize=0.9"));
        poller.tick();
        assert_eq!(handles.params.room_size(), 0.5);

        poller.tick(); // Ready transition
        assert_eq!(handles.params.room_size(), 0.5);
        surface.take();

        poller.tick();
        assert_eq!(handles.params.room_size(), 0.9);
        let scripts = surface.take();
        assert_eq!(
            scripts[0],
            "window.setReverbValues(0.9, 0.5, 0.33, 0.4, 1, 0)"
        );
    }

    #[test]
    fn inbound_values_are_clamped() {
        let (mut poller, handles, _surface) = poller(1);
        poller.tick();
        poller.inbox().on_message("rupture:reverb:wetLevel=4.0");
        poller.tick();
        assert_eq!(handles.params.wet_level(), 1.0);
    }

    #[test]
    fn failed_push_is_counted_and_retried() {
        let (mut poller, handles, surface) = poller(1);
        poller.tick();
        surface.take();

        handles.params.set_damping(0.9);
        surface.set_failing(true);
        poller.tick();
        assert_eq!(poller.failed_pushes(), 2);
        assert_eq!(poller.last_pushed().params.damping, 0.5);

        surface.set_failing(false);
        poller.tick();
        let scripts = surface.take();
        assert!(scripts[0].starts_with("window.setReverbValues(0.5, 0.9,"));
        assert_eq!(poller.last_pushed().params.damping, 0.9);
    }

    #[test]
    fn telemetry_produces_oscilloscope_push() {
        let (mut poller, handles, surface) = poller(1);
        poller.tick();
        surface.take();

        handles
            .telemetry
            .publish(&[&[1.0f32, 2.0, 3.0, 4.0][..], &[1.0f32, 0.0, 1.0, 0.0][..]]);
        poller.tick();
        let scripts = surface.take();
        assert_eq!(
            scripts.last().map(String::as_str),
            Some("window.updateOscilloscopeData([1,1,2,2])")
        );
    }

    #[test]
    fn held_block_is_pushed_until_cleared() {
        let (mut poller, handles, surface) = poller(1);
        poller.tick();
        surface.take();

        handles.telemetry.publish(&[&[0.5f32, 0.5][..]]);
        poller.tick();
        poller.tick();
        let scope = |scripts: Vec<String>| {
            scripts
                .into_iter()
                .filter(|s| s.starts_with("window.updateOscilloscopeData("))
                .count()
        };
        assert_eq!(scope(surface.take()), 2);

        handles.telemetry.clear();
        poller.tick();
        assert_eq!(scope(surface.take()), 0);
    }

    #[test]
    fn meters_below_floor_are_pushed_as_zero() {
        let (mut poller, handles, surface) = poller(1);
        poller.tick();
        surface.take();

        handles.meters.store(MeterLevels {
            input_left: 0.25,
            input_right: 2.5e-7,
            output_left: 0.0,
            output_right: 1.0,
        });
        poller.tick();
        assert_eq!(
            surface.take(),
            vec!["window.setAudioState(50.0, 0.0, 0.0, 100.0)".to_owned()]
        );
    }
}
