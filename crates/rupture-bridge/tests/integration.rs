//! Integration tests for rupture-bridge.
//!
//! Runs a real processor and a poller side by side, ticking the poller by
//! hand so every script the surface receives can be checked in order.

use rupture_bridge::{
    BridgeConfig, ConfigError, MemorySurface, PollerState, PollerThread, PresentationPoller,
};
use rupture_core::{BridgeHandles, Freeverb, ParamId, RuptureProcessor};
use std::time::Duration;
use tempfile::TempDir;

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK: usize = 512;

fn ready_poller(
    handles: &BridgeHandles,
    config: BridgeConfig,
) -> (PresentationPoller<MemorySurface>, MemorySurface) {
    let surface = MemorySurface::new();
    let warmup = config.warmup_ticks;
    let mut poller = PresentationPoller::new(handles.clone(), surface.clone(), config);
    for _ in 0..warmup.max(1) {
        poller.tick();
    }
    assert_eq!(poller.state(), PollerState::Ready);
    surface.take();
    (poller, surface)
}

fn reverb_pushes(scripts: &[String]) -> Vec<&String> {
    scripts
        .iter()
        .filter(|s| s.starts_with("window.setReverbValues("))
        .collect()
}

#[test]
fn sub_tolerance_drift_is_suppressed_then_pushed_once() {
    let handles = BridgeHandles::new();
    let (mut poller, surface) = ready_poller(&handles, BridgeConfig::default());

    handles.params.set_room_size(0.50);
    poller.tick();
    handles.params.set_room_size(0.50001);
    poller.tick();
    assert!(reverb_pushes(&surface.take()).is_empty());

    handles.params.set_room_size(0.53);
    poller.tick();
    let scripts = surface.take();
    let pushes = reverb_pushes(&scripts);
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0], "window.setReverbValues(0.53, 0.5, 0.33, 0.4, 1, 0)");
}

#[test]
fn same_parameters_twice_push_once() {
    let handles = BridgeHandles::new();
    let (mut poller, surface) = ready_poller(&handles, BridgeConfig::default());

    handles.params.set_width(0.2);
    poller.tick();
    handles.params.set_width(0.2);
    poller.tick();
    assert_eq!(reverb_pushes(&surface.take()).len(), 1);
}

#[test]
fn burst_of_edits_coalesces_into_one_push() {
    let handles = BridgeHandles::new();
    let (mut poller, surface) = ready_poller(&handles, BridgeConfig::default());
    let inbox = poller.inbox();

    for i in 1..=20 {
        assert!(inbox.on_message(&format!("rupture:reverb:damping={}", i as f32 / 20.0)));
    }
    poller.tick();
    let scripts = surface.take();
    let pushes = reverb_pushes(&scripts);
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0], "window.setReverbValues(0.5, 1, 0.33, 0.4, 1, 0)");
}

#[test]
fn negative_zero_edit_is_pushed_as_zero() {
    let handles = BridgeHandles::new();
    let (mut poller, surface) = ready_poller(&handles, BridgeConfig::default());

    assert!(poller.inbox().on_message("rupture:reverb:wetLevel=-0"));
    poller.tick();
    let scripts = surface.take();
    let pushes = reverb_pushes(&scripts);
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0], "window.setReverbValues(0.5, 0.5, 0, 0.4, 1, 0)");
}

#[test]
fn malformed_inbound_text_changes_nothing() {
    let handles = BridgeHandles::new();
    let (mut poller, surface) = ready_poller(&handles, BridgeConfig::default());
    let inbox = poller.inbox();
    let before = handles.params.snapshot();

    for text in [
        "",
        "rupture:",
        "rupture:reverb:",
        "rupture:reverb:roomSize=",
        "rupture:chorus:rate=0.5",
        "juce://roomSize=0.9",
        "rupture:reverb:ROOMSIZE=0.9",
    ] {
        assert!(!inbox.on_message(text), "{text:?} was accepted");
    }
    poller.tick();
    assert_eq!(handles.params.snapshot(), before);
    assert!(reverb_pushes(&surface.take()).is_empty());
}

#[test]
fn processor_and_poller_end_to_end() {
    let mut processor = RuptureProcessor::new(Freeverb::new());
    processor.prepare(SAMPLE_RATE, BLOCK);
    let handles = processor.handles();
    let config = BridgeConfig {
        warmup_ticks: 3,
        ..BridgeConfig::default()
    };
    let surface = MemorySurface::new();
    let mut poller = PresentationPoller::new(handles.clone(), surface.clone(), config);
    let inbox = poller.inbox();

    // Edit arrives before the surface is ready.
    assert!(inbox.on_message("rupture:reverb:dryLevel=0.5"));
    assert!(inbox.on_message("rupture:reverb:wetLevel=0"));

    let mut phase = 0usize;
    let mut run_audio = |processor: &mut RuptureProcessor<Freeverb>| {
        for _ in 0..4 {
            let mut left: Vec<f32> = (0..BLOCK)
                .map(|n| if (phase + n) % 64 < 32 { 0.5 } else { -0.5 })
                .collect();
            let mut right = left.clone();
            processor.process_block(&mut [&mut left, &mut right]);
            phase += BLOCK;
        }
    };

    for _ in 0..3 {
        run_audio(&mut processor);
        poller.tick();
    }
    assert_eq!(
        surface.take(),
        vec!["window.setAudioState(0.0, 0.0, 0.0, 0.0)".to_owned()]
    );
    assert_eq!(handles.params.get(ParamId::DryLevel), 0.4);

    for _ in 0..30 {
        run_audio(&mut processor);
        poller.tick();
    }
    assert_eq!(handles.params.get(ParamId::DryLevel), 0.5);
    assert_eq!(handles.params.get(ParamId::WetLevel), 0.0);

    let scripts = surface.take();
    assert_eq!(
        reverb_pushes(&scripts),
        vec!["window.setReverbValues(0.5, 0.5, 0, 0.5, 1, 0)"]
    );

    // Square wave at +/-0.5, dry gain 1.0: RMS 0.5 in and out, display 70.7.
    let last_meters = scripts
        .iter()
        .rev()
        .find(|s| s.starts_with("window.setAudioState("))
        .unwrap();
    assert_eq!(last_meters, "window.setAudioState(70.7, 70.7, 70.7, 70.7)");

    let last_scope = scripts
        .iter()
        .rev()
        .find(|s| s.starts_with("window.updateOscilloscopeData(["))
        .unwrap();
    let inner = last_scope
        .trim_start_matches("window.updateOscilloscopeData([")
        .trim_end_matches("])");
    assert_eq!(inner.split(',').count(), 128);

    processor.release();
    poller.tick();
    assert_eq!(
        surface.take()[0],
        "window.setAudioState(0.0, 0.0, 0.0, 0.0)"
    );
}

#[test]
fn config_loaded_from_file_drives_poller() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bridge.toml");
    std::fs::write(&path, "warmup_ticks = 2\nwaveform_points = 4\n").unwrap();

    let config = BridgeConfig::load(&path).unwrap();
    assert_eq!(config.warmup_ticks, 2);

    let handles = BridgeHandles::new();
    let (mut poller, surface) = ready_poller(&handles, config);
    handles.telemetry.publish(&[vec![1.0f32; 16]]);
    poller.tick();
    assert_eq!(
        surface.take().last().map(String::as_str),
        Some("window.updateOscilloscopeData([1,1,1,1])")
    );
}

#[test]
fn config_save_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bridge.toml");
    let config = BridgeConfig {
        poll_rate_hz: 60.0,
        change_tolerance: 0.05,
        ..BridgeConfig::default()
    };
    config.save(&path).unwrap();
    assert_eq!(BridgeConfig::load(&path).unwrap(), config);
}

#[test]
fn missing_config_file_is_a_read_error() {
    let dir = TempDir::new().unwrap();
    let err = BridgeConfig::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn threaded_poller_tracks_live_processor() {
    let mut processor = RuptureProcessor::new(Freeverb::new());
    processor.prepare(SAMPLE_RATE, BLOCK);
    let handles = processor.handles();
    let surface = MemorySurface::new();
    let config = BridgeConfig {
        poll_rate_hz: 100.0,
        warmup_ticks: 1,
        ..BridgeConfig::default()
    };
    let poller = PresentationPoller::new(handles.clone(), surface.clone(), config);
    let inbox = poller.inbox();
    let thread = PollerThread::spawn(poller).unwrap();

    inbox.on_message("rupture:reverb:freezeMode=1");
    for _ in 0..20 {
        let mut left = vec![0.1f32; BLOCK];
        let mut right = vec![0.1f32; BLOCK];
        processor.process_block(&mut [&mut left, &mut right]);
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(thread.stop(), 0);

    assert_eq!(handles.params.freeze_mode(), 1.0);
    let scripts = surface.scripts();
    assert!(scripts.iter().any(|s| s.ends_with(", 1, 1)")));
    assert!(scripts.iter().any(|s| s.starts_with("window.updateOscilloscopeData(")));
}
