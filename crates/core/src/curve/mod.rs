use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::{Result, SpectralDelayError};

/// Default gain curve shown by the editor before the user draws anything.
const DEFAULT_GAIN: [f32; 5] = [0.0, 0.5, 1.0, 0.5, 0.0];
/// Default delay-amount curve: a single zero point.
const DEFAULT_DELAY: [f32; 1] = [0.0];

/// Both user-edited curves, replaced as a unit so the audio path never sees a
/// gain curve from one edit paired with a delay curve from another.
#[derive(Debug, Clone)]
struct CurvePair {
    gain: Arc<[f32]>,
    delay: Arc<[f32]>,
}

/// Store for the two user-edited control curves.
///
/// The curves are process-wide: the editor writes one shared pair and every
/// effect instance reads it, so simultaneous instances all see the same
/// curves. A known limitation, kept deliberate rather than silently moving
/// to per-instance storage.
///
/// Replacement swaps an immutable snapshot under a write lock held only for
/// the pointer exchange, so a concurrent `process` call either sees the old
/// pair or the new one, never a half-written array.
#[derive(Debug)]
pub struct CurveStore {
    curves: RwLock<CurvePair>,
}

static GLOBAL: Lazy<CurveStore> = Lazy::new(CurveStore::new);

impl CurveStore {
    /// Creates a store holding the default curves.
    pub fn new() -> Self {
        Self {
            curves: RwLock::new(CurvePair {
                gain: Arc::from(DEFAULT_GAIN),
                delay: Arc::from(DEFAULT_DELAY),
            }),
        }
    }

    /// Returns the process-wide store shared by all instances.
    pub fn global() -> &'static CurveStore {
        &GLOBAL
    }

    /// Returns a caller-owned copy of the current gain curve. Never empty.
    pub fn gain_curve(&self) -> Vec<f32> {
        self.curves.read().gain.to_vec()
    }

    /// Atomically replaces both curves.
    ///
    /// An empty `gain` is rejected: the editor contract requires at least one
    /// point. An empty `delay` is accepted; lookups then fall back to a
    /// gain-1.0 passthrough instead of reading past the end of the array.
    pub fn set_curves(&self, gain: &[f32], delay: &[f32]) -> Result<()> {
        if gain.is_empty() {
            return Err(SpectralDelayError::EmptyCurve);
        }
        let pair = CurvePair {
            gain: Arc::from(gain),
            delay: Arc::from(delay),
        };
        *self.curves.write() = pair;
        Ok(())
    }

    /// Snapshot of the delay curve for the audio path. Cloning the `Arc`
    /// keeps the lock hold time bounded and lets an in-flight buffer keep
    /// reading its snapshot across a concurrent replacement.
    pub fn delay_snapshot(&self) -> Arc<[f32]> {
        self.curves.read().delay.clone()
    }

    /// First point of the delay curve, or 1.0 when the curve is empty.
    ///
    /// The signal path currently collapses the whole curve to this single
    /// scalar; the empty-curve fallback turns what would be an out-of-bounds
    /// read into a passthrough.
    pub fn delay_scalar(&self) -> f32 {
        self.curves.read().delay.first().copied().unwrap_or(1.0)
    }
}

impl Default for CurveStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_present() {
        let store = CurveStore::new();
        assert_eq!(store.gain_curve(), vec![0.0, 0.5, 1.0, 0.5, 0.0]);
        assert_eq!(store.delay_scalar(), 0.0);
    }

    #[test]
    fn replacement_copies_the_caller_arrays() {
        let store = CurveStore::new();
        let mut gain = vec![0.1, 0.2, 0.3];
        store.set_curves(&gain, &[0.5]).unwrap();

        gain[0] = 99.0;
        assert_eq!(store.gain_curve(), vec![0.1, 0.2, 0.3]);
        assert_eq!(store.delay_scalar(), 0.5);
    }

    #[test]
    fn empty_gain_is_rejected_and_leaves_state_alone() {
        let store = CurveStore::new();
        let err = store.set_curves(&[], &[0.25]).unwrap_err();
        assert!(matches!(err, SpectralDelayError::EmptyCurve));
        assert_eq!(store.gain_curve(), vec![0.0, 0.5, 1.0, 0.5, 0.0]);
    }

    #[test]
    fn empty_delay_curve_falls_back_to_passthrough() {
        let store = CurveStore::new();
        store.set_curves(&[1.0], &[]).unwrap();
        assert_eq!(store.delay_scalar(), 1.0);
        assert!(store.delay_snapshot().is_empty());
    }

    #[test]
    fn snapshot_survives_a_concurrent_replacement() {
        let store = CurveStore::new();
        store.set_curves(&[1.0], &[0.75]).unwrap();
        let snapshot = store.delay_snapshot();

        store.set_curves(&[1.0], &[0.25]).unwrap();
        assert_eq!(snapshot[0], 0.75);
        assert_eq!(store.delay_scalar(), 0.25);
    }
}
