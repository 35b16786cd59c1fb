use std::sync::atomic::{AtomicU32, Ordering};

use serde::Serialize;

use crate::{Result, SpectralDelayError};

/// Number of parameters in the declared table.
pub const PARAM_COUNT: usize = 4;

/// The effect's scalar controls, in host index order. The discriminant doubles
/// as the index the host uses on get/set calls, so the order here is contract:
/// reordering breaks any automation or preset data a host has persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum Param {
    WindowSize = 0,
    MaxDelay = 1,
    Debug = 2,
    ShowSpectrum = 3,
}

/// Metadata describing a single parameter, as registered with the host.
#[derive(Debug, Clone, Serialize)]
pub struct ParamInfo {
    pub name: &'static str,
    pub unit: &'static str,
    pub min_value: f32,
    pub max_value: f32,
    pub default_value: f32,
    pub display_scale: f32,
    pub display_exponent: f32,
    pub index: usize,
    pub description: &'static str,
}

const PARAM_TABLE: [ParamInfo; PARAM_COUNT] = [
    ParamInfo {
        name: "FFT Window Size",
        unit: "Hz",
        min_value: 16.0,
        max_value: 4096.0,
        default_value: 2048.0,
        display_scale: 1.0,
        display_exponent: 1.0,
        index: Param::WindowSize as usize,
        description: "Size of window for FFT",
    },
    ParamInfo {
        name: "Maximum Delay",
        unit: "Windows",
        min_value: 1.0,
        max_value: 100.0,
        default_value: 40.0,
        display_scale: 1.0,
        display_exponent: 1.0,
        index: Param::MaxDelay as usize,
        description: "Maximum delay time (top of the GUI)",
    },
    ParamInfo {
        name: "DEBUG",
        unit: "",
        min_value: 0.0,
        max_value: 10000.0,
        default_value: 1.0,
        display_scale: 1.0,
        display_exponent: 1.0,
        index: Param::Debug as usize,
        description: "Diagnostic value surfaced to the editor",
    },
    ParamInfo {
        name: "Show Spectrum",
        unit: "",
        min_value: 0.0,
        max_value: 1.0,
        default_value: 0.0,
        display_scale: 1.0,
        display_exponent: 1.0,
        index: Param::ShowSpectrum as usize,
        description: "Show Spectrum (< 0.5 off)",
    },
];

/// Returns the static parameter descriptor table, in index order.
pub fn describe_all() -> &'static [ParamInfo; PARAM_COUNT] {
    &PARAM_TABLE
}

/// Fixed table of raw parameter values.
///
/// Values are stored as f32 bit patterns inside atomics so the audio thread
/// can read while the control thread writes without any lock. Values are raw:
/// clamping to the declared `[min, max]` ranges is the host's responsibility,
/// and the table deliberately keeps whatever it was handed.
#[derive(Debug)]
pub struct ParameterSet {
    values: [AtomicU32; PARAM_COUNT],
}

impl ParameterSet {
    /// Creates a table initialized to the descriptor defaults.
    pub fn new() -> Self {
        let table = describe_all();
        Self {
            values: [
                AtomicU32::new(table[0].default_value.to_bits()),
                AtomicU32::new(table[1].default_value.to_bits()),
                AtomicU32::new(table[2].default_value.to_bits()),
                AtomicU32::new(table[3].default_value.to_bits()),
            ],
        }
    }

    /// Stores a raw value at `index`.
    ///
    /// Returns [`SpectralDelayError::UnsupportedParameter`] when the index is
    /// outside the declared table; no stored value changes in that case.
    pub fn set_value(&self, index: usize, value: f32) -> Result<()> {
        let slot = self
            .values
            .get(index)
            .ok_or(SpectralDelayError::UnsupportedParameter { index })?;
        slot.store(value.to_bits(), Ordering::Relaxed);
        Ok(())
    }

    /// Returns the raw stored value at `index`. No in-range guarantee is made
    /// if the host violated its clamping obligation on set.
    pub fn get_value(&self, index: usize) -> Result<f32> {
        let slot = self
            .values
            .get(index)
            .ok_or(SpectralDelayError::UnsupportedParameter { index })?;
        Ok(f32::from_bits(slot.load(Ordering::Relaxed)))
    }

    /// Typed accessor for the audio path.
    pub fn value(&self, param: Param) -> f32 {
        f32::from_bits(self.values[param as usize].load(Ordering::Relaxed))
    }
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self::new()
    }
}
