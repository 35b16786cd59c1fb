//! Core effect engine for the Spectral Delay audio plugin.
//!
//! The crate implements the real-time half of the plugin: a per-buffer stream
//! processor that applies the user-drawn delay/gain curve to the signal and
//! feeds a windowed FFT spectrum analyzer for visualization. The host shell
//! (plugin ABI, UI marshalling, packaging) lives outside this crate; the
//! modules here expose exactly the surface that shell needs: instance
//! lifecycle, an indexed parameter table, named spectrum readback, and the
//! process-wide curve store the editor writes into.
//!
//! Everything reachable from [`process::process`] is allocation-free and
//! lock-free apart from a bounded snapshot clone of the curve store; all
//! allocation happens at instance creation.

pub mod config;
pub mod curve;
pub mod error;
pub mod instance;
pub mod interop;
pub mod params;
pub mod process;
pub mod spectrum;

pub use config::EngineConfig;
pub use curve::CurveStore;
pub use error::{Result, SpectralDelayError};
pub use instance::{EffectInstance, InstanceHandle};
pub use interop::{
    clear_debug_callback, debug_message, gain_curve, register_debug_callback, set_curves,
    DebugCallback,
};
pub use params::{describe_all, Param, ParamInfo, ParameterSet, PARAM_COUNT};
pub use process::{buffer_decay, process};
pub use spectrum::{Direction, SpectrumAnalyzer, ANALYSIS_WINDOW};
