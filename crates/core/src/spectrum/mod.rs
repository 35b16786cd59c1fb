use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

use realfft::{num_complex::Complex32, RealFftPlanner, RealToComplex};

/// Fixed analysis window the analyzer is sized for at instance creation. The
/// readback bins cover `ANALYSIS_WINDOW / 2` frequency bins per direction.
pub const ANALYSIS_WINDOW: usize = 4096;

const MAX_BINS: usize = ANALYSIS_WINDOW / 2;

/// Which side of the effect a spectrum belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

/// Running magnitude spectra for both directions, shared between the audio
/// thread (writer) and any number of control-thread readers.
///
/// Each bin is an `AtomicU32` holding an f32 bit pattern, so a reader never
/// observes a torn float word while the next `analyze` call is overwriting
/// the array. Readers copy bins out; nothing hands back a reference into
/// this storage.
#[derive(Debug)]
pub(crate) struct SpectrumBins {
    input: Vec<AtomicU32>,
    output: Vec<AtomicU32>,
}

impl SpectrumBins {
    fn new() -> Self {
        Self {
            input: (0..MAX_BINS).map(|_| AtomicU32::new(0)).collect(),
            output: (0..MAX_BINS).map(|_| AtomicU32::new(0)).collect(),
        }
    }

    fn bins(&self, direction: Direction) -> &[AtomicU32] {
        match direction {
            Direction::Input => &self.input,
            Direction::Output => &self.output,
        }
    }

    fn zero(&self) {
        for bin in self.input.iter().chain(self.output.iter()) {
            bin.store(0, Ordering::Relaxed);
        }
    }

    /// Copies up to `count` bins into `out`, zero-filling everything past the
    /// stored spectrum.
    pub(crate) fn read(&self, direction: Direction, out: &mut [f32], count: usize) {
        let bins = self.bins(direction);
        let wanted = count.min(out.len());
        for (slot, bin) in out[..wanted].iter_mut().zip(bins.iter()) {
            *slot = f32::from_bits(bin.load(Ordering::Relaxed));
        }
        if wanted > bins.len() {
            out[bins.len()..wanted].fill(0.0);
        }
    }
}

/// Fills `out[..count]` with zeros. Used for unrecognized readback names so
/// the caller gets silence rather than garbage or an error.
pub(crate) fn zero_fill(out: &mut [f32], count: usize) {
    let wanted = count.min(out.len());
    out[..wanted].fill(0.0);
}

struct Accumulator {
    samples: Vec<f32>,
    fill: usize,
}

struct AnalyzerState {
    window_size: usize,
    spectrum_len: usize,
    hann: Vec<f32>,
    plan: Arc<dyn RealToComplex<f32>>,
    fft_input: Vec<f32>,
    fft_output: Vec<Complex32>,
    scratch: Vec<Complex32>,
    accumulators: [Accumulator; 2],
}

/// Windowed FFT pipeline producing decayed magnitude spectra for
/// visualization.
///
/// Samples are accumulated per direction into a window-sized buffer; each
/// time the window fills, a Hann-weighted forward transform runs and the
/// per-bin magnitudes are folded into the running spectrum as
/// `running = running * decay + magnitude * (1 - decay)`. The running
/// spectrum is updated at most once per `analyze` call: if more than one
/// window completes inside a single buffer, only the most recent one is
/// transformed.
///
/// [`SpectrumAnalyzer::configure`] allocates and must stay off the real-time
/// path; `analyze` and readback are allocation-free.
pub struct SpectrumAnalyzer {
    bins: Arc<SpectrumBins>,
    state: Option<AnalyzerState>,
}

impl SpectrumAnalyzer {
    /// Creates an unconfigured analyzer. Until [`configure`] is called,
    /// `analyze` is a no-op and readback yields zeros.
    ///
    /// [`configure`]: SpectrumAnalyzer::configure
    pub fn new() -> Self {
        Self {
            bins: Arc::new(SpectrumBins::new()),
            state: None,
        }
    }

    pub(crate) fn bins_handle(&self) -> Arc<SpectrumBins> {
        self.bins.clone()
    }

    /// (Re)allocates the FFT pipeline for `window_size` samples. Allocates,
    /// so this belongs at instance creation, never inside the audio callback.
    /// The running spectra are zeroed.
    pub fn configure(&mut self, window_size: usize) {
        let window_size = window_size.clamp(2, ANALYSIS_WINDOW);
        let mut planner = RealFftPlanner::<f32>::new();
        let plan = planner.plan_fft_forward(window_size);
        let fft_input = plan.make_input_vec();
        let fft_output = plan.make_output_vec();
        let scratch = plan.make_scratch_vec();
        let hann = (0..window_size)
            .map(|i| hann_value(i, window_size))
            .collect();

        self.state = Some(AnalyzerState {
            window_size,
            spectrum_len: window_size / 2,
            hann,
            plan,
            fft_input,
            fft_output,
            scratch,
            accumulators: [
                Accumulator {
                    samples: vec![0.0; window_size],
                    fill: 0,
                },
                Accumulator {
                    samples: vec![0.0; window_size],
                    fill: 0,
                },
            ],
        });
        self.bins.zero();
    }

    /// Returns the configured window size, if any.
    pub fn window_size(&self) -> Option<usize> {
        self.state.as_ref().map(|state| state.window_size)
    }

    /// Accumulates one buffer of interleaved samples for `direction` and
    /// updates the running spectrum if the analysis window filled up.
    ///
    /// Multi-channel frames are down-mixed by averaging all channels. `decay`
    /// is the per-buffer attenuation from [`crate::buffer_decay`]. Calls with
    /// an unconfigured analyzer, a zero channel count, or a buffer shorter
    /// than `frames * channels` are no-ops.
    pub fn analyze(
        &mut self,
        direction: Direction,
        samples: &[f32],
        channels: usize,
        frames: usize,
        decay: f32,
    ) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if channels == 0 || frames == 0 || samples.len() < frames * channels {
            return;
        }

        let AnalyzerState {
            window_size,
            spectrum_len,
            hann,
            plan,
            fft_input,
            fft_output,
            scratch,
            accumulators,
        } = state;
        let window_size = *window_size;
        let accumulator = match direction {
            Direction::Input => &mut accumulators[0],
            Direction::Output => &mut accumulators[1],
        };

        // Hann-weight each window the moment it completes so later frames in
        // the same buffer cannot overwrite it. If several windows complete in
        // one call only the latest survives; the running spectrum is updated
        // at most once per buffer.
        let mut window_ready = false;
        for frame in 0..frames {
            let start = frame * channels;
            let sum: f32 = samples[start..start + channels].iter().sum();
            accumulator.samples[accumulator.fill] = sum / channels as f32;
            accumulator.fill += 1;
            if accumulator.fill == window_size {
                accumulator.fill = 0;
                for ((slot, sample), weight) in fft_input
                    .iter_mut()
                    .zip(accumulator.samples.iter())
                    .zip(hann.iter())
                {
                    *slot = sample * weight;
                }
                window_ready = true;
            }
        }
        if !window_ready {
            return;
        }

        if plan
            .process_with_scratch(fft_input, fft_output, scratch)
            .is_err()
        {
            return;
        }

        let bins = self.bins.bins(direction);
        for (bin, value) in bins[..*spectrum_len].iter().zip(fft_output.iter()) {
            let mut magnitude = value.norm();
            if !magnitude.is_finite() {
                magnitude = 0.0;
            }
            let running = f32::from_bits(bin.load(Ordering::Relaxed));
            let next = running * decay + magnitude * (1.0 - decay);
            bin.store(next.to_bits(), Ordering::Relaxed);
        }
    }

    /// Copies up to `count` bins of the running spectrum for `direction` into
    /// `out`. An unconfigured analyzer reads back as all zeros.
    pub fn read_spectrum(&self, direction: Direction, out: &mut [f32], count: usize) {
        self.bins.read(direction, out, count);
    }

    /// Releases the FFT pipeline and zeroes the running spectra. Idempotent;
    /// also run on drop.
    pub fn cleanup(&mut self) {
        self.state = None;
        self.bins.zero();
    }
}

impl Default for SpectrumAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SpectrumAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpectrumAnalyzer")
            .field("window_size", &self.window_size())
            .finish()
    }
}

fn hann_value(index: usize, len: usize) -> f32 {
    if len <= 1 {
        return 1.0;
    }

    0.5 - 0.5 * ((2.0 * std::f32::consts::PI * index as f32) / (len as f32 - 1.0)).cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::buffer_decay;

    fn spectrum_peak(analyzer: &SpectrumAnalyzer, direction: Direction) -> f32 {
        let mut bins = vec![0.0; MAX_BINS];
        analyzer.read_spectrum(direction, &mut bins, MAX_BINS);
        bins.iter().cloned().fold(0.0, f32::max)
    }

    #[test]
    fn unconfigured_analyzer_is_inert() {
        let mut analyzer = SpectrumAnalyzer::new();
        analyzer.analyze(Direction::Input, &[1.0; 64], 1, 64, 0.9);

        let mut out = vec![7.0; 16];
        analyzer.read_spectrum(Direction::Input, &mut out, 16);
        assert!(out.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn hann_window_tapers_to_zero_at_the_edges() {
        assert!(hann_value(0, 64).abs() < 1e-6);
        assert!(hann_value(63, 64).abs() < 1e-6);
        assert!((hann_value(16, 33) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn a_tone_raises_the_input_spectrum() {
        let mut analyzer = SpectrumAnalyzer::new();
        analyzer.configure(256);

        let tone: Vec<f32> = (0..256)
            .map(|n| (2.0 * std::f32::consts::PI * 16.0 * n as f32 / 256.0).sin())
            .collect();
        analyzer.analyze(Direction::Input, &tone, 1, 256, 0.5);

        assert!(spectrum_peak(&analyzer, Direction::Input) > 0.0);
        assert_eq!(spectrum_peak(&analyzer, Direction::Output), 0.0);
    }

    #[test]
    fn partial_windows_do_not_update_the_spectrum() {
        let mut analyzer = SpectrumAnalyzer::new();
        analyzer.configure(256);

        analyzer.analyze(Direction::Input, &[1.0; 128], 1, 128, 0.5);
        assert_eq!(spectrum_peak(&analyzer, Direction::Input), 0.0);

        analyzer.analyze(Direction::Input, &[1.0; 128], 1, 128, 0.5);
        assert!(spectrum_peak(&analyzer, Direction::Input) > 0.0);
    }

    #[test]
    fn silence_decays_the_running_spectrum_by_the_buffer_factor() {
        let mut analyzer = SpectrumAnalyzer::new();
        analyzer.configure(512);
        let decay = buffer_decay(512, 48_000.0);

        let tone: Vec<f32> = (0..512)
            .map(|n| (2.0 * std::f32::consts::PI * 8.0 * n as f32 / 512.0).sin())
            .collect();
        analyzer.analyze(Direction::Input, &tone, 1, 512, decay);
        let loud = spectrum_peak(&analyzer, Direction::Input);
        assert!(loud > 0.0);

        // One silent window per call: the running value should shrink by
        // exactly the decay factor each time.
        analyzer.analyze(Direction::Input, &[0.0; 512], 1, 512, decay);
        let quieter = spectrum_peak(&analyzer, Direction::Input);
        assert!((quieter - loud * decay).abs() < loud * 1e-4);

        for _ in 0..200 {
            analyzer.analyze(Direction::Input, &[0.0; 512], 1, 512, decay);
        }
        assert!(spectrum_peak(&analyzer, Direction::Input) < loud * 0.01);
    }

    #[test]
    fn stereo_frames_are_averaged_before_analysis() {
        let mut mono = SpectrumAnalyzer::new();
        mono.configure(128);
        let mut stereo = SpectrumAnalyzer::new();
        stereo.configure(128);

        let mono_samples: Vec<f32> = (0..128)
            .map(|n| (2.0 * std::f32::consts::PI * 4.0 * n as f32 / 128.0).sin())
            .collect();
        let stereo_samples: Vec<f32> = mono_samples
            .iter()
            .flat_map(|&s| [s + 0.1, s - 0.1])
            .collect();

        mono.analyze(Direction::Input, &mono_samples, 1, 128, 0.5);
        stereo.analyze(Direction::Input, &stereo_samples, 2, 128, 0.5);

        let mut mono_bins = vec![0.0; 64];
        let mut stereo_bins = vec![0.0; 64];
        mono.read_spectrum(Direction::Input, &mut mono_bins, 64);
        stereo.read_spectrum(Direction::Input, &mut stereo_bins, 64);

        for (a, b) in mono_bins.iter().zip(stereo_bins.iter()) {
            assert!((a - b).abs() < 1e-3);
        }
    }

    #[test]
    fn short_buffers_are_ignored() {
        let mut analyzer = SpectrumAnalyzer::new();
        analyzer.configure(64);
        // Claims 64 stereo frames but only supplies 64 samples.
        analyzer.analyze(Direction::Input, &[1.0; 64], 2, 64, 0.5);
        assert_eq!(spectrum_peak(&analyzer, Direction::Input), 0.0);
    }

    #[test]
    fn cleanup_zeroes_and_disables_the_analyzer() {
        let mut analyzer = SpectrumAnalyzer::new();
        analyzer.configure(128);
        analyzer.analyze(Direction::Input, &[1.0; 128], 1, 128, 0.5);
        assert!(spectrum_peak(&analyzer, Direction::Input) > 0.0);

        analyzer.cleanup();
        assert!(analyzer.window_size().is_none());
        assert_eq!(spectrum_peak(&analyzer, Direction::Input), 0.0);

        analyzer.cleanup();
        analyzer.analyze(Direction::Input, &[1.0; 128], 1, 128, 0.5);
        assert_eq!(spectrum_peak(&analyzer, Direction::Input), 0.0);
    }
}
