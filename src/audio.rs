//! Burst sound effects using the Web Audio API
//!
//! Each burst is a single oscillator blip with a one second exponential
//! decay. The pitch choice is platform independent so it can be tested
//! natively; playback only exists on the web.

use crate::sim::entity::EntityKind;

/// Oscillator shape for a tone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    Square,
}

/// One synthesized blip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub freq: f32,
    pub waveform: Waveform,
    /// Starting gain before the decay
    pub gain: f32,
    /// Seconds to decay to silence
    pub decay: f32,
}

/// Power-ups always chime at the same pitch
const POWER_UP_FREQ: f32 = 800.0;
/// Shapes pick a stable pitch in [200, 700) Hz from their id
const SHAPE_BASE_FREQ: f32 = 200.0;
const SHAPE_FREQ_RANGE: u32 = 500;

/// Tone for a burst entity
pub fn burst_tone(id: u32, kind: EntityKind) -> Tone {
    match kind {
        EntityKind::PowerUp(_) => Tone {
            freq: POWER_UP_FREQ,
            waveform: Waveform::Sine,
            gain: 0.1,
            decay: 1.0,
        },
        EntityKind::Boss(_) => Tone {
            freq: SHAPE_BASE_FREQ * 0.5,
            waveform: Waveform::Square,
            gain: 0.1,
            decay: 1.0,
        },
        EntityKind::Shape(_) => {
            // Knuth multiplicative hash spreads consecutive ids
            let step = id.wrapping_mul(2_654_435_761) % SHAPE_FREQ_RANGE;
            Tone {
                freq: SHAPE_BASE_FREQ + step as f32,
                waveform: Waveform::Triangle,
                gain: 0.1,
                decay: 1.0,
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{Tone, Waveform, burst_tone};
    use crate::sim::entity::EntityKind;

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        volume: f32,
        muted: bool,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                volume: 1.0,
                muted: false,
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        pub fn set_volume(&mut self, vol: f32) {
            self.volume = vol.clamp(0.0, 1.0);
        }

        pub fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }

        pub fn play_burst(&self, id: u32, kind: EntityKind) {
            self.play(burst_tone(id, kind));
        }

        fn play(&self, tone: Tone) {
            if self.muted || self.volume <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }
            let osc_type = match tone.waveform {
                Waveform::Sine => OscillatorType::Sine,
                Waveform::Triangle => OscillatorType::Triangle,
                Waveform::Square => OscillatorType::Square,
            };
            let Some((osc, gain)) = Self::create_osc(ctx, tone.freq, osc_type) else {
                return;
            };
            let t = ctx.current_time();
            gain.gain().set_value_at_time(tone.gain * self.volume, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.001, t + tone.decay as f64)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + tone.decay as f64).ok();
        }

        /// Create an oscillator wired through a gain node
        fn create_osc(ctx: &AudioContext, freq: f32, osc_type: OscillatorType) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;
            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;
            Some((osc, gain))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{PowerUpKind, ShapeVariant};

    #[test]
    fn test_power_up_chime() {
        let tone = burst_tone(7, EntityKind::PowerUp(PowerUpKind::Time));
        assert_eq!(tone.freq, 800.0);
    }

    #[test]
    fn test_shape_pitch_range_and_stability() {
        for id in 1..500 {
            let tone = burst_tone(id, EntityKind::Shape(ShapeVariant::Cube));
            assert!((200.0..700.0).contains(&tone.freq));
            assert_eq!(tone, burst_tone(id, EntityKind::Shape(ShapeVariant::Torus)));
        }
        assert_ne!(
            burst_tone(1, EntityKind::Shape(ShapeVariant::Cube)).freq,
            burst_tone(2, EntityKind::Shape(ShapeVariant::Cube)).freq
        );
    }
}
