/// Default deadzone applied to stick axes before curve shaping.
pub const STICK_DEADZONE: f64 = 0.10;

/// Default deadzone applied to analog triggers.
pub const TRIGGER_DEADZONE: f64 = 0.05;

/// Values closer than this are treated as unchanged.
pub const CHANGE_EPSILON: f64 = 0.003;

/// Default exponent for the response curve. Values above 1 soften
/// the response near center.
pub const RESPONSE_GAMMA: f64 = 1.35;

/// Convert a raw signed axis sample to [-1, 1].
///
/// The raw range is asymmetric (-32768..=32767), so positive and
/// negative samples use different divisors to keep magnitude <= 1.
#[inline]
pub fn normalize_signed(raw: i16) -> f64 {
    let v = f64::from(raw);
    if raw >= 0 {
        v / 32767.0
    } else {
        v / 32768.0
    }
}

/// Convert a raw trigger sample to [0, 1]. Negative samples clamp to 0.
#[inline]
pub fn normalize_unsigned(raw: i16) -> f64 {
    if raw <= 0 {
        0.0
    } else {
        f64::from(raw) / 32767.0
    }
}

/// Apply deadzone and response curve to a signed axis value.
///
/// Magnitudes below `deadzone` collapse to 0. The remaining range is
/// rescaled to [0, 1], raised to `gamma` and the sign reapplied.
#[inline]
pub fn shape_signed(v: f64, deadzone: f64, gamma: f64) -> f64 {
    let m = v.abs();
    if m < deadzone {
        return 0.0;
    }
    let t = ((m - deadzone) / (1.0 - deadzone)).powf(gamma);
    (t * v.signum()).clamp(-1.0, 1.0)
}

/// Apply deadzone and response curve to an unsigned trigger value.
#[inline]
pub fn shape_unsigned(v: f64, deadzone: f64, gamma: f64) -> f64 {
    if v < deadzone {
        return 0.0;
    }
    ((v - deadzone) / (1.0 - deadzone))
        .powf(gamma)
        .clamp(0.0, 1.0)
}

/// Remap a circular stick response onto a square one.
///
/// Each axis is scaled by `r / max(|x|, |y|)` so full diagonals reach
/// the corners instead of being pinned to the unit circle. Applied at
/// output time only, never during capture shaping.
pub fn circle_to_square(x: f64, y: f64) -> (f64, f64) {
    let max = x.abs().max(y.abs());
    if max <= 0.0 {
        return (0.0, 0.0);
    }
    let r = (x * x + y * y).sqrt();
    if r <= 0.0 {
        return (0.0, 0.0);
    }
    let scale = r / max;
    ((x * scale).clamp(-1.0, 1.0), (y * scale).clamp(-1.0, 1.0))
}

/// Convert a normalized [-1, 1] axis value to the 16-bit wire range.
#[inline]
pub fn axis_to_short(v: f64) -> i16 {
    let v = v.clamp(-1.0, 1.0);
    if v >= 0.0 {
        (v * 32767.0) as i16
    } else {
        (v * 32768.0) as i16
    }
}

/// Convert a normalized [0, 1] trigger value to the 8-bit wire range.
#[inline]
pub fn trigger_to_byte(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0) as u8
}
