//! Procedural sound cues
//!
//! Every cue expands to a short recipe of voices (a swept tone or a band-passed
//! noise burst, each with its own envelope). A backend turns voices into sound.
//! The backend is built lazily on first use; if it cannot be built the game
//! simply runs silent.

use crate::sim::{ScoreTier, flight_time};

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    Square,
    Sawtooth,
}

/// What a voice sounds like
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Source {
    /// Oscillator swept exponentially from `start_hz` to `end_hz`
    Tone {
        waveform: Waveform,
        start_hz: f32,
        end_hz: f32,
    },
    /// White noise through a band-pass whose center sweeps `start_hz` to `end_hz`
    Noise { start_hz: f32, end_hz: f32, q: f32 },
}

/// One scheduled sound with an attack/decay envelope
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voice {
    pub source: Source,
    /// Seconds after the cue fires
    pub delay: f64,
    /// Peak gain before volume scaling
    pub peak: f32,
    /// Linear rise to peak (seconds)
    pub attack: f64,
    /// Exponential fall after the peak (seconds)
    pub decay: f64,
}

impl Voice {
    fn tone(waveform: Waveform, start_hz: f32, end_hz: f32, peak: f32, decay: f64) -> Self {
        Self {
            source: Source::Tone {
                waveform,
                start_hz,
                end_hz,
            },
            delay: 0.0,
            peak,
            attack: 0.005,
            decay,
        }
    }

    fn noise(start_hz: f32, end_hz: f32, q: f32, peak: f32, decay: f64) -> Self {
        Self {
            source: Source::Noise {
                start_hz,
                end_hz,
                q,
            },
            delay: 0.0,
            peak,
            attack: 0.003,
            decay,
        }
    }

    fn with_attack(mut self, attack: f64) -> Self {
        self.attack = attack;
        self
    }

    fn with_delay(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }

    /// Attack plus decay
    pub fn duration(&self) -> f64 {
        self.attack + self.decay
    }
}

/// Game moments that make a sound
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cue {
    /// Bowstring creak while drawing, intensity 0..1
    Tension { intensity: f32 },
    /// String snap on release, power 0..100
    Release { power: f32 },
    /// Arrow whoosh lasting the flight time
    Flight { power: f32 },
    /// Arrow striking the face
    Hit { tier: ScoreTier },
    Miss,
    /// Fanfare on a 10
    Perfect,
}

impl Cue {
    /// Expand into the voices to schedule
    pub fn voices(&self) -> Vec<Voice> {
        match *self {
            Cue::Tension { intensity } => {
                let i = intensity.clamp(0.0, 1.0);
                let creak = 80.0 + i * 160.0;
                vec![
                    Voice::tone(Waveform::Sawtooth, creak, creak * 1.05, 0.08 + i * 0.1, 0.06),
                    Voice::noise(1200.0 + i * 1800.0, 1000.0 + i * 1500.0, 8.0, 0.05, 0.04),
                ]
            }
            Cue::Release { power } => {
                let p = (power / 100.0).clamp(0.0, 1.0);
                vec![
                    // Twang
                    Voice::tone(
                        Waveform::Triangle,
                        220.0 + p * 220.0,
                        110.0 + p * 60.0,
                        0.3,
                        0.18,
                    )
                    .with_attack(0.002),
                    // Snap
                    Voice::noise(3000.0, 1500.0, 1.5, 0.2, 0.05),
                ]
            }
            Cue::Flight { power } => {
                let p = (power / 100.0).clamp(0.0, 1.0);
                let t = flight_time(power) as f64;
                vec![
                    Voice::noise(
                        600.0 + p * 800.0,
                        2400.0 + p * 1600.0,
                        0.9,
                        0.15 + p * 0.1,
                        t * 0.6,
                    )
                    .with_attack(t * 0.4),
                ]
            }
            Cue::Hit { tier } => {
                let base = match tier {
                    ScoreTier::Miss => return Cue::Miss.voices(),
                    ScoreTier::Outer => 140.0,
                    ScoreTier::Inner => 180.0,
                    ScoreTier::Gold => 240.0,
                    ScoreTier::Perfect => 300.0,
                };
                let mut voices = vec![
                    // Thunk into the boss
                    Voice::tone(Waveform::Sine, base, base * 0.5, 0.45, 0.15),
                    Voice::noise(400.0, 200.0, 1.0, 0.25, 0.08),
                ];
                if tier >= ScoreTier::Gold {
                    voices.push(
                        Voice::tone(Waveform::Sine, 880.0, 880.0, 0.15, 0.3).with_delay(0.05),
                    );
                }
                voices
            }
            Cue::Miss => vec![
                // Sad descend
                Voice::tone(Waveform::Sine, 320.0, 120.0, 0.25, 0.35),
                Voice::noise(800.0, 400.0, 0.7, 0.1, 0.2),
            ],
            Cue::Perfect => [784.0, 988.0, 1175.0, 1568.0]
                .iter()
                .enumerate()
                .map(|(i, &freq)| {
                    Voice::tone(Waveform::Triangle, freq, freq, 0.22, 0.3)
                        .with_delay(i as f64 * 0.07)
                })
                .collect(),
        }
    }
}

/// Something that can make voices audible
pub trait AudioBackend {
    /// Schedule one voice at `volume` (master and sfx already applied)
    fn play_voice(&self, voice: &Voice, volume: f32);

    /// Called before each cue (e.g. to resume a suspended context)
    fn wake(&self) {}
}

enum BackendSlot<B> {
    Uninit,
    Ready(B),
    Unavailable,
}

/// Cue triggers over a lazily built backend
///
/// Fire-and-forget: nothing here blocks or reports failure to the caller.
pub struct AudioCues<B: AudioBackend> {
    slot: BackendSlot<B>,
    factory: fn() -> Option<B>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl<B: AudioBackend> AudioCues<B> {
    pub fn new(factory: fn() -> Option<B>) -> Self {
        Self {
            slot: BackendSlot::Uninit,
            factory,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Build the backend if that has not been tried yet
    ///
    /// Call from a user gesture handler. Returns whether sound is available.
    pub fn init(&mut self) -> bool {
        if let BackendSlot::Uninit = self.slot {
            self.slot = match (self.factory)() {
                Some(backend) => {
                    log::info!("Audio ready");
                    BackendSlot::Ready(backend)
                }
                None => {
                    log::warn!("Audio backend unavailable - running silent");
                    BackendSlot::Unavailable
                }
            };
        }
        self.is_available()
    }

    pub fn is_available(&self) -> bool {
        matches!(self.slot, BackendSlot::Ready(_))
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn apply_settings(&mut self, settings: &crate::Settings) {
        self.set_master_volume(settings.master_volume);
        self.set_sfx_volume(settings.sfx_volume);
        self.set_muted(settings.muted);
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a cue
    pub fn play(&mut self, cue: Cue) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        self.init();
        let BackendSlot::Ready(backend) = &self.slot else {
            return;
        };
        backend.wake();
        for voice in cue.voices() {
            backend.play_voice(&voice, vol);
        }
    }

    pub fn tension(&mut self, intensity: f32) {
        self.play(Cue::Tension { intensity });
    }

    pub fn release(&mut self, power: f32) {
        self.play(Cue::Release { power });
    }

    pub fn flight(&mut self, power: f32) {
        self.play(Cue::Flight { power });
    }

    pub fn hit(&mut self, tier: ScoreTier) {
        self.play(Cue::Hit { tier });
    }

    pub fn miss(&mut self) {
        self.play(Cue::Miss);
    }

    pub fn perfect(&mut self) {
        self.play(Cue::Perfect);
    }
}

/// Backend for hosts without an audio device: logs what would play
#[derive(Debug, Default)]
pub struct LogBackend;

impl AudioBackend for LogBackend {
    fn play_voice(&self, voice: &Voice, volume: f32) {
        log::trace!("voice {:?} at volume {:.2}", voice.source, volume);
    }
}

impl LogBackend {
    pub fn create() -> Option<Self> {
        Some(Self)
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudioBackend;

/// Backend used by the game on this target
#[cfg(target_arch = "wasm32")]
pub type GameAudio = AudioCues<WebAudioBackend>;
#[cfg(not(target_arch = "wasm32"))]
pub type GameAudio = AudioCues<LogBackend>;

/// Cue triggers wired to this target's backend
pub fn game_audio() -> GameAudio {
    #[cfg(target_arch = "wasm32")]
    {
        AudioCues::new(WebAudioBackend::create)
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        AudioCues::new(LogBackend::create)
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{
        AudioBuffer, AudioContext, BiquadFilterType, GainNode, OscillatorNode, OscillatorType,
    };

    use super::{AudioBackend, Source, Voice, Waveform};

    /// Seconds of noise in the shared buffer (longest noise voice must fit)
    const NOISE_SECONDS: f32 = 1.5;

    /// Web Audio API backend
    pub struct WebAudioBackend {
        ctx: AudioContext,
        noise: Option<AudioBuffer>,
    }

    impl WebAudioBackend {
        pub fn create() -> Option<Self> {
            // May fail outside a secure context or without audio support
            let ctx = match AudioContext::new() {
                Ok(ctx) => ctx,
                Err(e) => {
                    log::warn!("Failed to create AudioContext: {:?}", e);
                    return None;
                }
            };
            let noise = noise_buffer(&ctx);
            if noise.is_none() {
                log::warn!("Noise buffer unavailable - noise voices disabled");
            }
            Some(Self { ctx, noise })
        }

        /// Gain node wired to the destination with the voice's envelope
        fn envelope(&self, voice: &Voice, vol: f32, t: f64) -> Option<GainNode> {
            let gain = self.ctx.create_gain().ok()?;
            gain.connect_with_audio_node(&self.ctx.destination()).ok()?;

            // Exponential ramps cannot touch zero
            let peak = (voice.peak * vol).max(0.002);
            gain.gain().set_value_at_time(0.0001, t).ok();
            gain.gain()
                .linear_ramp_to_value_at_time(peak, t + voice.attack)
                .ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.001, t + voice.duration())
                .ok();
            Some(gain)
        }

        fn play_tone(
            &self,
            voice: &Voice,
            waveform: Waveform,
            start_hz: f32,
            end_hz: f32,
            vol: f32,
        ) {
            let t = self.ctx.current_time() + voice.delay;
            let Some(gain) = self.envelope(voice, vol, t) else {
                return;
            };
            let Ok(osc) = self.ctx.create_oscillator() else {
                return;
            };
            set_waveform(&osc, waveform);
            osc.frequency().set_value_at_time(start_hz, t).ok();
            if (end_hz - start_hz).abs() > f32::EPSILON {
                osc.frequency()
                    .exponential_ramp_to_value_at_time(end_hz.max(1.0), t + voice.duration())
                    .ok();
            }
            if osc.connect_with_audio_node(&gain).is_err() {
                return;
            }
            osc.start_with_when(t).ok();
            osc.stop_with_when(t + voice.duration() + 0.05).ok();
        }

        fn play_noise(&self, voice: &Voice, start_hz: f32, end_hz: f32, q: f32, vol: f32) {
            let Some(noise) = &self.noise else { return };
            let t = self.ctx.current_time() + voice.delay;
            let Some(gain) = self.envelope(voice, vol, t) else {
                return;
            };
            let Ok(filter) = self.ctx.create_biquad_filter() else {
                return;
            };
            filter.set_type(BiquadFilterType::Bandpass);
            filter.q().set_value(q);
            filter.frequency().set_value_at_time(start_hz, t).ok();
            filter
                .frequency()
                .exponential_ramp_to_value_at_time(end_hz.max(1.0), t + voice.duration())
                .ok();

            let Ok(src) = self.ctx.create_buffer_source() else {
                return;
            };
            src.set_buffer(Some(noise));
            if src.connect_with_audio_node(&filter).is_err()
                || filter.connect_with_audio_node(&gain).is_err()
            {
                return;
            }
            src.start_with_when(t).ok();
            src.stop_with_when(t + voice.duration() + 0.05).ok();
        }
    }

    impl AudioBackend for WebAudioBackend {
        fn play_voice(&self, voice: &Voice, volume: f32) {
            match voice.source {
                Source::Tone {
                    waveform,
                    start_hz,
                    end_hz,
                } => self.play_tone(voice, waveform, start_hz, end_hz, volume),
                Source::Noise { start_hz, end_hz, q } => {
                    self.play_noise(voice, start_hz, end_hz, q, volume)
                }
            }
        }

        /// Resume context if suspended (browsers require a user gesture)
        fn wake(&self) {
            if self.ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = self.ctx.resume();
            }
        }
    }

    fn set_waveform(osc: &OscillatorNode, waveform: Waveform) {
        osc.set_type(match waveform {
            Waveform::Sine => OscillatorType::Sine,
            Waveform::Triangle => OscillatorType::Triangle,
            Waveform::Square => OscillatorType::Square,
            Waveform::Sawtooth => OscillatorType::Sawtooth,
        });
    }

    /// Mono white noise, xorshift32 so every session sounds the same
    fn noise_buffer(ctx: &AudioContext) -> Option<AudioBuffer> {
        let sr = ctx.sample_rate();
        let len = (sr * NOISE_SECONDS) as u32;
        let buffer = ctx.create_buffer(1, len, sr).ok()?;
        let mut seed: u32 = 0x1234_ABCD;
        let mut samples: Vec<f32> = (0..len)
            .map(|_| {
                seed ^= seed << 13;
                seed ^= seed >> 17;
                seed ^= seed << 5;
                (seed as f32 / u32::MAX as f32) * 2.0 - 1.0
            })
            .collect();
        buffer.copy_to_channel(&mut samples, 0).ok()?;
        Some(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    thread_local! {
        static PLAYED: RefCell<Vec<(Voice, f32)>> = const { RefCell::new(Vec::new()) };
        static BUILT: RefCell<u32> = const { RefCell::new(0) };
    }

    struct Recorder;

    impl AudioBackend for Recorder {
        fn play_voice(&self, voice: &Voice, volume: f32) {
            PLAYED.with(|p| p.borrow_mut().push((*voice, volume)));
        }
    }

    fn working() -> Option<Recorder> {
        BUILT.with(|b| *b.borrow_mut() += 1);
        Some(Recorder)
    }

    fn broken() -> Option<Recorder> {
        BUILT.with(|b| *b.borrow_mut() += 1);
        None
    }

    fn take_played() -> Vec<(Voice, f32)> {
        PLAYED.with(|p| std::mem::take(&mut *p.borrow_mut()))
    }

    fn built() -> u32 {
        BUILT.with(|b| *b.borrow())
    }

    #[test]
    fn test_backend_built_once() {
        let mut audio = AudioCues::new(working);
        assert!(audio.init());
        assert!(audio.init());
        audio.miss();
        audio.perfect();
        assert_eq!(built(), 1);
        assert!(!take_played().is_empty());
    }

    #[test]
    fn test_unavailable_backend_is_silent_and_not_retried() {
        let mut audio = AudioCues::new(broken);
        assert!(!audio.init());
        audio.release(80.0);
        audio.hit(ScoreTier::Gold);
        assert!(!audio.is_available());
        assert_eq!(built(), 1);
        assert!(take_played().is_empty());
    }

    #[test]
    fn test_first_cue_builds_backend() {
        let mut audio = AudioCues::new(working);
        audio.tension(0.5);
        assert!(audio.is_available());
        assert_eq!(take_played().len(), Cue::Tension { intensity: 0.5 }.voices().len());
    }

    #[test]
    fn test_volume_and_mute() {
        let mut audio = AudioCues::new(working);
        audio.set_master_volume(0.5);
        audio.set_sfx_volume(0.5);
        audio.miss();
        assert!(take_played().iter().all(|(_, v)| (*v - 0.25).abs() < 1e-6));

        audio.set_muted(true);
        audio.miss();
        assert!(take_played().is_empty());
    }

    #[test]
    fn test_hit_pitch_rises_with_tier() {
        let start = |tier| {
            let voices = Cue::Hit { tier }.voices();
            match voices[0].source {
                Source::Tone { start_hz, .. } => start_hz,
                Source::Noise { .. } => panic!("hit leads with a tone"),
            }
        };
        assert!(start(ScoreTier::Outer) < start(ScoreTier::Inner));
        assert!(start(ScoreTier::Inner) < start(ScoreTier::Gold));
        assert!(start(ScoreTier::Gold) < start(ScoreTier::Perfect));
        assert_eq!(Cue::Hit { tier: ScoreTier::Miss }.voices(), Cue::Miss.voices());
        // Gold and up get the chime
        assert_eq!(Cue::Hit { tier: ScoreTier::Inner }.voices().len(), 2);
        assert_eq!(Cue::Hit { tier: ScoreTier::Gold }.voices().len(), 3);
    }

    #[test]
    fn test_flight_whoosh_matches_flight_time() {
        for power in [0.0, 50.0, 100.0] {
            let voices = Cue::Flight { power }.voices();
            let expected = flight_time(power) as f64;
            assert!((voices[0].duration() - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_envelopes_are_short_and_positive() {
        let cues = [
            Cue::Tension { intensity: 1.0 },
            Cue::Release { power: 100.0 },
            Cue::Flight { power: 0.0 },
            Cue::Hit {
                tier: ScoreTier::Perfect,
            },
            Cue::Miss,
            Cue::Perfect,
        ];
        for cue in cues {
            for voice in cue.voices() {
                assert!(voice.peak > 0.0 && voice.peak <= 1.0);
                assert!(voice.attack > 0.0 && voice.decay > 0.0);
                // Noise buffer is 1.5 s
                assert!(voice.delay + voice.duration() < 1.5, "{:?}", cue);
            }
        }
    }
}
