//! Opaline Lowpass - demo filter effect built on the Opaline runtime.
//!
//! This crate shows how to:
//! 1. Build a parameter registry with stable ids and display formatting
//! 2. Implement the `Engine` trait over a small DSP core
//! 3. Wire the engine into an `EffectProcessor` and drive it like a host
//! 4. Connect an editor through the `UiBridge` / `PatchMirror` pair
//!
//! The DSP here is deliberately tiny - a one-pole filter with a mode
//! switch, dry/wet mix, and output gain. The point of this crate is the
//! integration surface, not the filter.

use std::f64::consts::TAU;

use opaline::prelude::*;

// =============================================================================
// Plugin Configuration
// =============================================================================

/// Static plugin configuration.
pub static CONFIG: PluginConfig = PluginConfig::new("Opaline Lowpass", "org.opaline.lowpass")
    .with_vendor("Opaline Audio")
    .with_url("https://github.com/opaline-audio/opaline")
    .with_version(env!("CARGO_PKG_VERSION"))
    .with_description("A small filter")
    .with_features(&["audio-effect", "filter"]);

/// Current patch format version.
const PATCH_VERSION: u32 = 1;

// =============================================================================
// Parameter Ids
// =============================================================================

/// Filter cutoff frequency in Hz.
pub const P_FREQUENCY: ParamId = 100;
/// Dry/wet mix.
pub const P_MIX: ParamId = 110;
/// Output gain.
pub const P_GAIN: ParamId = 120;
/// Filter mode (lowpass/highpass).
pub const P_MODE: ParamId = 130;

/// Build the parameter registry.
pub fn make_patch() -> Patch {
    let mut patch = Patch::new(CONFIG.id, PATCH_VERSION);
    patch.push(Param::new(
        ParamInfo::new(P_FREQUENCY, "Frequency")
            .with_range(20.0, 20_000.0)
            .with_default(1_000.0)
            .with_unit("Hz"),
    ));
    patch.push(Param::new(
        ParamInfo::new(P_MIX, "Mix").as_percent().with_default(1.0),
    ));
    patch.push(Param::new(
        ParamInfo::new(P_GAIN, "Gain").as_percent().with_default(0.5),
    ));
    patch.push(Param::new(
        ParamInfo::new(P_MODE, "Mode").stepped(&["LowPass", "HighPass"]),
    ));
    patch
}

// =============================================================================
// Engine
// =============================================================================

/// Filter topology selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterMode {
    LowPass,
    HighPass,
}

impl FilterMode {
    fn from_value(value: ParamValue) -> Self {
        if value.round() >= 1.0 {
            FilterMode::HighPass
        } else {
            FilterMode::LowPass
        }
    }
}

/// One-pole filter engine, stereo.
///
/// Parameter setters arrive at the runtime's smoothing cadence, so the
/// coefficient recomputation in `set_param` runs a bounded number of times
/// per block.
pub struct LowpassEngine {
    sample_rate: f64,
    cutoff_hz: f64,
    mix: f64,
    gain: f64,
    mode: FilterMode,
    /// One-pole coefficient derived from cutoff and sample rate.
    coeff: f64,
    /// Filter state per channel.
    z: [f64; 2],
}

impl LowpassEngine {
    pub fn new() -> Self {
        let mut engine = Self {
            sample_rate: 0.0,
            cutoff_hz: 1_000.0,
            mix: 1.0,
            gain: 0.5,
            mode: FilterMode::LowPass,
            coeff: 0.0,
            z: [0.0; 2],
        };
        engine.update_coeff();
        engine
    }

    fn update_coeff(&mut self) {
        if self.sample_rate <= 0.0 {
            self.coeff = 0.0;
            return;
        }
        self.coeff = 1.0 - (-TAU * self.cutoff_hz / self.sample_rate).exp();
    }
}

impl Default for LowpassEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for LowpassEngine {
    fn activate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
        self.update_coeff();
        self.reset();
    }

    fn set_param(&mut self, id: ParamId, value: ParamValue) {
        match id {
            P_FREQUENCY => {
                self.cutoff_hz = value;
                self.update_coeff();
            }
            P_MIX => self.mix = value,
            P_GAIN => self.gain = value,
            P_MODE => self.mode = FilterMode::from_value(value),
            _ => {}
        }
    }

    fn process(&mut self, input: [f32; 2]) -> [f32; 2] {
        let mut out = [0.0f32; 2];
        for (ch, sample) in input.iter().enumerate() {
            let x = f64::from(*sample);
            self.z[ch] += self.coeff * (x - self.z[ch]);
            let filtered = match self.mode {
                FilterMode::LowPass => self.z[ch],
                FilterMode::HighPass => x - self.z[ch],
            };
            let wet = self.mix * filtered + (1.0 - self.mix) * x;
            out[ch] = (wet * self.gain) as f32;
        }
        out
    }

    fn reset(&mut self) {
        self.z = [0.0; 2];
    }
}

/// Build a ready-to-activate processor for this effect.
pub fn make_processor() -> EffectProcessor<LowpassEngine> {
    EffectProcessor::new(make_patch(), LowpassEngine::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f64 = 48_000.0;

    fn activation() -> Activation {
        Activation {
            sample_rate: SAMPLE_RATE,
            min_frames: 1,
            max_frames: 512,
        }
    }

    fn run_block(
        proc: &mut EffectProcessor<LowpassEngine>,
        input_value: f32,
        num_samples: usize,
        events: &[InEvent],
    ) -> (Vec<f32>, Vec<OutEvent>) {
        let input = vec![input_value; num_samples];
        let mut out_l = vec![0.0f32; num_samples];
        let mut out_r = vec![0.0f32; num_samples];
        let mut sink: Vec<OutEvent> = Vec::new();
        {
            let mut block = AudioBlock::new([&input, &input], [&mut out_l, &mut out_r]);
            proc.process(&mut block, events, &mut sink);
        }
        (out_l, sink)
    }

    #[test]
    fn test_describes_parameters_in_order() {
        let proc = make_processor();
        let names: Vec<&str> = proc.patch().iter().map(|p| p.info().name).collect();
        assert_eq!(names, vec!["Frequency", "Mix", "Gain", "Mode"]);
        assert_eq!(proc.patch().param(P_MODE).unwrap().display(), "LowPass");
    }

    #[test]
    fn test_processes_audio_after_activation() {
        let mut proc = make_processor();
        proc.activate(&activation()).unwrap();

        let (out, _) = run_block(&mut proc, 0.5, 256, &[]);
        // DC through a lowpass settles toward input * gain.
        let tail = out[255];
        assert!((tail - 0.25).abs() < 0.01, "settled at {}", tail);
    }

    #[test]
    fn test_automation_ramp_is_smooth() {
        let mut proc = make_processor();
        proc.activate(&activation()).unwrap();

        // Let the filter settle on DC first.
        run_block(&mut proc, 0.5, 2_048, &[]);

        // Slam the gain from 50% to 100% at sample 0 and look for steps.
        let events = [InEvent::param(0, P_GAIN, 1.0)];
        let (out, _) = run_block(&mut proc, 0.5, 2_048, &events);

        let mut max_jump = 0.0f32;
        for pair in out.windows(2) {
            max_jump = max_jump.max((pair[1] - pair[0]).abs());
        }
        // The half-amplitude step spread over the 5 ms lag: no single
        // sample-to-sample jump anywhere near the raw 0.25 step.
        assert!(max_jump < 0.02, "zipper step of {} detected", max_jump);
        // And the ramp does arrive at the new gain.
        assert!((out[2_047] - 0.5).abs() < 0.01, "ended at {}", out[2_047]);
    }

    #[test]
    fn test_mode_switch_applies_without_ramp() {
        let mut proc = make_processor();
        proc.activate(&activation()).unwrap();
        run_block(&mut proc, 0.5, 1_024, &[]);

        // Flip to highpass: DC should die away instead of passing.
        let events = [InEvent::param(0, P_MODE, 1.0)];
        let (out, _) = run_block(&mut proc, 0.5, 4_096, &events);
        assert!(out[4_095].abs() < 0.01, "DC leaked through highpass: {}", out[4_095]);
    }

    #[test]
    fn test_state_round_trip_through_processor() {
        let mut proc = make_processor();
        proc.activate(&activation()).unwrap();

        let events = [
            InEvent::param(0, P_FREQUENCY, 440.0),
            InEvent::param(0, P_MIX, 0.3),
        ];
        run_block(&mut proc, 0.0, 16, &events);
        let blob = proc.save_state().unwrap();

        let mut restored = make_processor();
        restored.activate(&activation()).unwrap();
        restored.load_state(&blob).unwrap();

        assert_eq!(restored.patch().param(P_FREQUENCY).unwrap().value(), 440.0);
        assert_eq!(restored.patch().param(P_MIX).unwrap().value(), 0.3);
        assert_eq!(restored.patch().param(P_GAIN).unwrap().value(), 0.5);
    }

    #[test]
    fn test_editor_round_trip() {
        let mut proc = make_processor();
        proc.activate(&activation()).unwrap();

        // Editor opens: snapshot the patch, attach, ask for a refresh.
        let bridge = proc.ui_bridge();
        let mut mirror = PatchMirror::from_patch(proc.patch());
        bridge.set_attached(true);

        // User drags the frequency knob.
        bridge.begin_edit(P_FREQUENCY);
        bridge.set_param(P_FREQUENCY, 2_500.0);
        bridge.end_edit(P_FREQUENCY);

        let (_, sink) = run_block(&mut proc, 0.0, 64, &[]);

        // The host saw the gesture and the value mirror.
        assert!(sink.contains(&OutEvent::BeginGesture { id: P_FREQUENCY }));
        assert!(sink.contains(&OutEvent::ParamValue { id: P_FREQUENCY, value: 2_500.0 }));
        assert!(sink.contains(&OutEvent::EndGesture { id: P_FREQUENCY }));

        // The editor's poll tick sees the new value land in the mirror.
        let changed = bridge.drain_into(&mut mirror);
        assert!(changed.contains(&P_FREQUENCY));
        assert_eq!(mirror.param(P_FREQUENCY).unwrap().value, 2_500.0);

        // Widgets render from normalized positions.
        let info = mirror.param(P_FREQUENCY).unwrap().info;
        let knob = info.to_normalized(2_500.0);
        assert!(knob > 0.0 && knob < 1.0);
    }

    #[test]
    fn test_host_automation_while_detached_is_silent_to_ui() {
        let mut proc = make_processor();
        proc.activate(&activation()).unwrap();
        let bridge = proc.ui_bridge();

        let events = [InEvent::param(0, P_GAIN, 0.8)];
        run_block(&mut proc, 0.25, 64, &events);

        assert!(bridge.audio_to_ui.is_empty());
        assert_eq!(proc.patch().param(P_GAIN).unwrap().value(), 0.8);
    }
}
