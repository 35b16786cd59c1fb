use crate::{curve::CurveStore, instance::EffectInstance, params::Param, spectrum::Direction};

/// Per-buffer spectrum attenuation factor.
///
/// `10^(0.05 * -10 * buffer_len / sample_rate)` yields an effective 10 dB per
/// second decay regardless of buffer size: smaller buffers decay less per
/// call, so the time-domain decay rate is independent of both the sample rate
/// and the host's buffer length. For 512 frames at 48 kHz this is ~0.9758.
pub fn buffer_decay(buffer_len: usize, sample_rate: f32) -> f32 {
    10.0_f32.powf(0.05 * -10.0 * buffer_len as f32 / sample_rate)
}

/// Real-time entry point: processes one buffer of interleaved f32 audio.
///
/// Reads the parameter set and the process-wide curve store, optionally feeds
/// the instance's spectrum analyzer on both sides of the gain pass, and
/// writes every output frame as `input * delay_curve[0]`. The host guarantees
/// serialized calls per instance; parameter and curve writes from the control
/// thread may land concurrently and become visible within a buffer period.
///
/// The call has no failure path. Violated preconditions (buffers shorter
/// than `frames * channels`, a zero or negative sample rate) turn the call
/// into a no-op instead of reading or writing out of bounds. Output channels
/// with no input counterpart are written as silence.
pub fn process(
    instance: &mut EffectInstance,
    input: &[f32],
    output: &mut [f32],
    frames: usize,
    in_channels: usize,
    out_channels: usize,
    sample_rate: f32,
) {
    process_with_curves(
        instance,
        CurveStore::global(),
        input,
        output,
        frames,
        in_channels,
        out_channels,
        sample_rate,
    );
}

/// [`process`] against an explicit curve store. Hosts always use the
/// process-wide store; tests supply their own.
#[allow(clippy::too_many_arguments)]
pub(crate) fn process_with_curves(
    instance: &mut EffectInstance,
    curves: &CurveStore,
    input: &[f32],
    output: &mut [f32],
    frames: usize,
    in_channels: usize,
    out_channels: usize,
    sample_rate: f32,
) {
    if frames == 0 || in_channels == 0 || out_channels == 0 {
        return;
    }
    if input.len() < frames * in_channels || output.len() < frames * out_channels {
        return;
    }
    if sample_rate <= 0.0 || !sample_rate.is_finite() {
        return;
    }

    let decay = buffer_decay(frames, sample_rate);
    let show_spectrum = instance.params().value(Param::ShowSpectrum) >= 0.5;
    if show_spectrum {
        instance
            .analyzer_mut()
            .analyze(Direction::Input, input, in_channels, frames, decay);
    }

    // The signal pass collapses the delay curve to its first point: a single
    // scalar multiply. Extending this to a true variable delay across the
    // full curve is future work.
    let delay_scalar = curves.delay_scalar();
    for frame in 0..frames {
        for channel in 0..out_channels {
            let sample = if channel < in_channels {
                input[frame * in_channels + channel]
            } else {
                0.0
            };
            output[frame * out_channels + channel] = sample * delay_scalar;
        }
    }

    if show_spectrum {
        instance
            .analyzer_mut()
            .analyze(Direction::Output, output, out_channels, frames, decay);
    }
}
