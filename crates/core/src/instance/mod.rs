use std::sync::Arc;

use crate::{
    params::ParameterSet,
    spectrum::{self, Direction, SpectrumAnalyzer, SpectrumBins, ANALYSIS_WINDOW},
    Result,
};

/// State reachable from the control thread while the audio thread owns the
/// instance itself: the lock-free parameter table and the atomic spectrum
/// bins.
#[derive(Debug)]
struct InstanceShared {
    params: ParameterSet,
    spectrum: Arc<SpectrumBins>,
}

/// One independent occurrence of the effect.
///
/// Owns the parameter set and the spectrum analyzer, created on the host's
/// instantiation request and torn down on release. The host hands the
/// instance to exactly one audio channel strip and serializes `process`
/// calls against destruction; the control surface goes through
/// [`InstanceHandle`] clones instead, which stay safe to use after release
/// (they read back zeros once the analyzer is gone).
#[derive(Debug)]
pub struct EffectInstance {
    sample_rate: f32,
    shared: Arc<InstanceShared>,
    analyzer: SpectrumAnalyzer,
}

impl EffectInstance {
    /// Creates an instance for the given sample rate. Allocates the analyzer
    /// pipeline here so the processing path never has to.
    pub fn create(sample_rate: f32) -> Self {
        let mut analyzer = SpectrumAnalyzer::new();
        analyzer.configure(ANALYSIS_WINDOW);
        let shared = Arc::new(InstanceShared {
            params: ParameterSet::new(),
            spectrum: analyzer.bins_handle(),
        });
        Self {
            sample_rate,
            shared,
            analyzer,
        }
    }

    /// Sample rate the host reported at creation.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// The parameter table, readable and writable from any thread.
    pub fn params(&self) -> &ParameterSet {
        &self.shared.params
    }

    pub(crate) fn analyzer_mut(&mut self) -> &mut SpectrumAnalyzer {
        &mut self.analyzer
    }

    /// Read-only view of the analyzer, mainly for inspection in tests and
    /// diagnostics.
    pub fn analyzer(&self) -> &SpectrumAnalyzer {
        &self.analyzer
    }

    /// Returns a cheap, clonable control-path handle to this instance.
    pub fn handle(&self) -> InstanceHandle {
        InstanceHandle {
            shared: self.shared.clone(),
        }
    }

    /// Tears the instance down, releasing the analyzer. Dropping the
    /// instance does the same; this form exists for hosts that want the
    /// release to be an explicit lifecycle call.
    pub fn release(mut self) {
        self.analyzer.cleanup();
    }
}

impl Drop for EffectInstance {
    fn drop(&mut self) {
        self.analyzer.cleanup();
    }
}

/// Control-thread surface of an [`EffectInstance`]: parameter get/set keyed
/// by the declared index order, and named spectrum readback.
#[derive(Debug, Clone)]
pub struct InstanceHandle {
    shared: Arc<InstanceShared>,
}

impl InstanceHandle {
    /// Stores a raw parameter value; see [`ParameterSet::set_value`].
    pub fn set_value(&self, index: usize, value: f32) -> Result<()> {
        self.shared.params.set_value(index, value)
    }

    /// Reads a raw parameter value; see [`ParameterSet::get_value`].
    pub fn get_value(&self, index: usize) -> Result<f32> {
        self.shared.params.get_value(index)
    }

    /// Copies up to `count` bins of a named spectrum into `out`.
    ///
    /// `"InputSpec"` and `"OutputSpec"` select the two running spectra; any
    /// other name zero-fills the buffer. Nothing here can fail or block: the
    /// host's visualization surface polls this from its UI thread.
    pub fn read_named_buffer(&self, name: &str, out: &mut [f32], count: usize) {
        match name {
            "InputSpec" => self.shared.spectrum.read(Direction::Input, out, count),
            "OutputSpec" => self.shared.spectrum.read(Direction::Output, out, count),
            _ => spectrum::zero_fill(out, count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{params::Param, process::buffer_decay, spectrum::Direction};

    #[test]
    fn create_configures_the_analyzer_and_defaults() {
        let instance = EffectInstance::create(44_100.0);
        assert_eq!(instance.sample_rate(), 44_100.0);
        assert_eq!(instance.analyzer().window_size(), Some(ANALYSIS_WINDOW));
        assert_eq!(instance.params().value(Param::ShowSpectrum), 0.0);
    }

    #[test]
    fn handle_reads_and_writes_the_shared_parameters() {
        let instance = EffectInstance::create(48_000.0);
        let handle = instance.handle();

        handle.set_value(Param::MaxDelay as usize, 12.0).unwrap();
        assert_eq!(instance.params().value(Param::MaxDelay), 12.0);
        assert_eq!(handle.get_value(Param::MaxDelay as usize).unwrap(), 12.0);
    }

    #[test]
    fn named_readback_maps_both_directions() {
        let mut instance = EffectInstance::create(48_000.0);
        let handle = instance.handle();
        let decay = buffer_decay(ANALYSIS_WINDOW, 48_000.0);

        let tone: Vec<f32> = (0..ANALYSIS_WINDOW)
            .map(|n| (2.0 * std::f32::consts::PI * 32.0 * n as f32 / 4096.0).sin())
            .collect();
        instance
            .analyzer_mut()
            .analyze(Direction::Input, &tone, 1, ANALYSIS_WINDOW, decay);

        let mut bins = vec![0.0; 32];
        handle.read_named_buffer("InputSpec", &mut bins, 32);
        assert!(bins.iter().cloned().fold(0.0, f32::max) > 0.0);

        handle.read_named_buffer("OutputSpec", &mut bins, 32);
        assert!(bins.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn unknown_buffer_names_zero_fill() {
        let mut instance = EffectInstance::create(48_000.0);
        let handle = instance.handle();
        let decay = buffer_decay(ANALYSIS_WINDOW, 48_000.0);
        instance.analyzer_mut().analyze(
            Direction::Input,
            &[1.0; ANALYSIS_WINDOW],
            1,
            ANALYSIS_WINDOW,
            decay,
        );

        let mut bins = vec![5.0; 16];
        handle.read_named_buffer("SideSpec", &mut bins, 16);
        assert!(bins.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn handles_outlive_release_and_read_zeros() {
        let mut instance = EffectInstance::create(48_000.0);
        let handle = instance.handle();
        let decay = buffer_decay(ANALYSIS_WINDOW, 48_000.0);
        instance.analyzer_mut().analyze(
            Direction::Input,
            &[1.0; ANALYSIS_WINDOW],
            1,
            ANALYSIS_WINDOW,
            decay,
        );

        instance.release();

        let mut bins = vec![1.0; 8];
        handle.read_named_buffer("InputSpec", &mut bins, 8);
        assert!(bins.iter().all(|&v| v == 0.0));
        // Parameters stay readable through the shared state.
        assert!(handle.get_value(Param::Debug as usize).is_ok());
    }
}
