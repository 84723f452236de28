/// Equalizer filter nodes
///
/// One biquad per band, with RBJ cookbook coefficients. Frequency and Q are
/// fixed per band; only the gain changes at runtime.
use super::chain::AudioEffect;
use super::param::SharedParam;
use tonal_core::{Band, MAX_CHANNELS};

/// Filter response shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Boosts/cuts below frequency
    LowShelf,
    /// Boosts/cuts around frequency with Q bandwidth
    Peaking,
    /// Boosts/cuts above frequency
    HighShelf,
}

/// Fixed configuration of a filter node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSpec {
    pub kind: FilterKind,
    /// Corner or center frequency in Hz
    pub frequency: f32,
    /// Q for peaking filters, shelf slope for shelves
    pub q: f32,
}

impl FilterSpec {
    /// Configuration used for each equalizer band
    pub const fn for_band(band: Band) -> Self {
        match band {
            Band::Bass => Self {
                kind: FilterKind::LowShelf,
                frequency: 250.0,
                q: 1.0,
            },
            Band::Mid => Self {
                kind: FilterKind::Peaking,
                frequency: 1000.0,
                q: 1.4,
            },
            Band::Treble => Self {
                kind: FilterKind::HighShelf,
                frequency: 4000.0,
                q: 1.0,
            },
        }
    }
}

/// Smoothing coefficient for exponential coefficient interpolation.
/// At 44.1kHz this gives a time constant of roughly 10ms.
const SMOOTH_COEFF: f32 = 0.002;

/// Per-channel filter memory
#[derive(Debug, Clone, Copy, Default)]
struct ChannelState {
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

/// Normalized biquad coefficients (a0 = 1)
#[derive(Debug, Clone, Copy, PartialEq)]
struct Coefficients {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
}

impl Coefficients {
    const NEUTRAL: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    fn compute(spec: FilterSpec, sample_rate: f32, gain_db: f32) -> Option<Self> {
        if sample_rate < 1.0 {
            return None;
        }

        let a = 10.0_f32.powf(gain_db / 40.0);
        // Clamp to 45% of the sample rate to stay clear of Nyquist
        let frequency = spec.frequency.min(sample_rate * 0.45);
        let omega = 2.0 * std::f32::consts::PI * frequency / sample_rate;
        let sin_omega = omega.sin();
        let cos_omega = omega.cos();

        let (b0, b1, b2, a0, a1, a2) = match spec.kind {
            FilterKind::Peaking => {
                let alpha = sin_omega / (2.0 * spec.q);
                (
                    1.0 + alpha * a,
                    -2.0 * cos_omega,
                    1.0 - alpha * a,
                    1.0 + alpha / a,
                    -2.0 * cos_omega,
                    1.0 - alpha / a,
                )
            }
            FilterKind::LowShelf => {
                let alpha = sin_omega / 2.0 * ((a + 1.0 / a) * (1.0 / spec.q - 1.0) + 2.0).sqrt();
                let beta = 2.0 * a.sqrt() * alpha;
                (
                    a * ((a + 1.0) - (a - 1.0) * cos_omega + beta),
                    2.0 * a * ((a - 1.0) - (a + 1.0) * cos_omega),
                    a * ((a + 1.0) - (a - 1.0) * cos_omega - beta),
                    (a + 1.0) + (a - 1.0) * cos_omega + beta,
                    -2.0 * ((a - 1.0) + (a + 1.0) * cos_omega),
                    (a + 1.0) + (a - 1.0) * cos_omega - beta,
                )
            }
            FilterKind::HighShelf => {
                let alpha = sin_omega / 2.0 * ((a + 1.0 / a) * (1.0 / spec.q - 1.0) + 2.0).sqrt();
                let beta = 2.0 * a.sqrt() * alpha;
                (
                    a * ((a + 1.0) + (a - 1.0) * cos_omega + beta),
                    -2.0 * a * ((a - 1.0) + (a + 1.0) * cos_omega),
                    a * ((a + 1.0) + (a - 1.0) * cos_omega - beta),
                    (a + 1.0) - (a - 1.0) * cos_omega + beta,
                    2.0 * ((a - 1.0) - (a + 1.0) * cos_omega),
                    (a + 1.0) - (a - 1.0) * cos_omega - beta,
                )
            }
        };

        Some(Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        })
    }

    #[inline]
    fn approach(&mut self, target: &Self) {
        self.b0 += SMOOTH_COEFF * (target.b0 - self.b0);
        self.b1 += SMOOTH_COEFF * (target.b1 - self.b1);
        self.b2 += SMOOTH_COEFF * (target.b2 - self.b2);
        self.a1 += SMOOTH_COEFF * (target.a1 - self.a1);
        self.a2 += SMOOTH_COEFF * (target.a2 - self.a2);
    }
}

/// Biquad filter with coefficient smoothing and per-channel state
#[derive(Debug, Clone)]
struct BiquadFilter {
    target: Coefficients,
    active: Coefficients,
    state: [ChannelState; MAX_CHANNELS as usize],
}

impl BiquadFilter {
    fn new() -> Self {
        Self {
            target: Coefficients::NEUTRAL,
            active: Coefficients::NEUTRAL,
            state: [ChannelState::default(); MAX_CHANNELS as usize],
        }
    }

    fn set_target(&mut self, coefficients: Coefficients) {
        self.target = coefficients;
    }

    /// Jump straight to the target (no smoothing)
    fn snap(&mut self) {
        self.active = self.target;
    }

    fn process(&mut self, buffer: &mut [f32], channels: usize) {
        let channels = channels.clamp(1, MAX_CHANNELS as usize);

        for frame in buffer.chunks_mut(channels) {
            self.active.approach(&self.target);
            let c = self.active;

            for (sample, st) in frame.iter_mut().zip(self.state.iter_mut()) {
                let input = *sample;
                let mut out = c.b0 * input + c.b1 * st.x1 + c.b2 * st.x2 - c.a1 * st.y1 - c.a2 * st.y2;

                // Flush denormals
                if out.abs() < 1e-15 {
                    out = 0.0;
                }

                st.x2 = st.x1;
                st.x1 = input;
                st.y2 = st.y1;
                st.y1 = out;
                *sample = out;
            }
        }
    }

    fn reset(&mut self) {
        self.state = [ChannelState::default(); MAX_CHANNELS as usize];
        self.snap();
    }
}

/// One equalizer band in the signal path
///
/// Reads its gain (dB) from a `SharedParam` at the start of every block and
/// recomputes coefficients when the gain or the sample rate changed.
pub struct FilterNode {
    band: Band,
    spec: FilterSpec,
    gain_db: SharedParam,
    channels: usize,
    filter: BiquadFilter,
    applied: Option<(u32, f32)>,
}

impl FilterNode {
    /// Create the node for `band`, processing `channels` interleaved channels
    pub fn new(band: Band, gain_db: SharedParam, channels: usize) -> Self {
        Self {
            band,
            spec: FilterSpec::for_band(band),
            gain_db,
            channels: channels.clamp(1, MAX_CHANNELS as usize),
            filter: BiquadFilter::new(),
            applied: None,
        }
    }

    pub fn band(&self) -> Band {
        self.band
    }

    pub fn spec(&self) -> FilterSpec {
        self.spec
    }

    /// Current gain in dB
    pub fn gain_db(&self) -> f32 {
        self.gain_db.get()
    }

    fn update_coefficients(&mut self, sample_rate: u32) {
        let gain = self.gain_db.get();
        if self.applied == Some((sample_rate, gain)) {
            return;
        }

        if let Some(coefficients) = Coefficients::compute(self.spec, sample_rate as f32, gain) {
            self.filter.set_target(coefficients);
            // A fresh node starts at its configured response
            if self.applied.is_none() {
                self.filter.snap();
            }
            self.applied = Some((sample_rate, gain));
        }
    }
}

impl AudioEffect for FilterNode {
    fn process(&mut self, buffer: &mut [f32], sample_rate: u32) {
        self.update_coefficients(sample_rate);
        self.filter.process(buffer, self.channels);
    }

    fn reset(&mut self) {
        self.filter.reset();
    }

    fn name(&self) -> &str {
        self.band.name()
    }
}
