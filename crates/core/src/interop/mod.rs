//! Surface exposed to the non-real-time control layer: curve replacement,
//! curve readback, and the process-wide debug callback.
//!
//! These calls mirror the exported functions the plugin editor talks to. All
//! of them run on the control thread; none are allowed on the audio path.

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::{curve::CurveStore, Result};

/// Diagnostic sink registered by the control layer.
pub type DebugCallback = fn(&str);

static DEBUG_CALLBACK: Lazy<Mutex<Option<DebugCallback>>> = Lazy::new(|| Mutex::new(None));

/// Returns a caller-owned copy of the current gain curve. Ownership of the
/// returned vector transfers to the caller; later curve edits do not touch it.
pub fn gain_curve() -> Vec<f32> {
    CurveStore::global().gain_curve()
}

/// Replaces both process-wide curves; see [`CurveStore::set_curves`].
pub fn set_curves(gain: &[f32], delay: &[f32]) -> Result<()> {
    CurveStore::global().set_curves(gain, delay)
}

/// Registers the process-wide debug callback.
///
/// A single slot exists: a later registration overwrites the earlier one, and
/// there is no unregister short of [`clear_debug_callback`]. Registration
/// racing an in-flight [`debug_message`] is benign; the message lands in
/// whichever callback the slot held at that instant.
pub fn register_debug_callback(callback: DebugCallback) {
    *DEBUG_CALLBACK.lock() = Some(callback);
}

/// Clears the debug slot. Intended for process teardown.
pub fn clear_debug_callback() {
    *DEBUG_CALLBACK.lock() = None;
}

/// Sends a diagnostic line to the registered callback, if any. Quietly drops
/// the message otherwise.
pub fn debug_message(message: &str) {
    if let Some(callback) = *DEBUG_CALLBACK.lock() {
        callback(message);
    }
}
