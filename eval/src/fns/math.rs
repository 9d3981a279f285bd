//! Numeric helpers not covered by `f64` methods.

use core::f64::consts::{E, PI};

const GAMMA_G: f64 = 4.742_187_5;
const GAMMA_P: [f64; 15] = [
    0.999_999_999_999_997_1,
    57.156_235_665_862_92,
    -59.597_960_355_475_49,
    14.136_097_974_741_746,
    -0.491_913_816_097_620_2,
    0.339_946_499_848_118_9e-4,
    0.465_236_289_270_485_8e-4,
    -0.983_744_753_048_795_6e-4,
    0.158_088_703_224_912_5e-3,
    -0.210_264_441_724_104_9e-3,
    0.217_439_618_115_212_6e-3,
    -0.164_318_106_536_763_9e-3,
    0.844_182_239_838_527_4e-4,
    -0.261_908_384_015_814_1e-4,
    0.368_991_826_595_316_2e-5,
];

fn is_integer(value: f64) -> bool {
    value.is_finite() && value == value.round()
}

/// Gamma function. Integer args are computed exactly as factorials; other args use
/// the Lanczos approximation, or the extended Stirling approximation for large args.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
pub fn gamma(n: f64) -> f64 {
    if is_integer(n) {
        if n <= 0.0 {
            return f64::INFINITY;
        }
        if n > 171.0 {
            return f64::INFINITY;
        }
        return (2..n as u32).fold(1.0, |acc, i| acc * f64::from(i));
    }
    if n.is_nan() || n == f64::NEG_INFINITY {
        return f64::NAN;
    }

    if n < 0.5 {
        return PI / ((PI * n).sin() * gamma(1.0 - n));
    }
    if n >= 171.35 {
        return f64::INFINITY;
    }
    if n > 85.0 {
        let n2 = n * n;
        let n3 = n2 * n;
        let n4 = n3 * n;
        let n5 = n4 * n;
        let series = 1.0 + 1.0 / (12.0 * n) + 1.0 / (288.0 * n2)
            - 139.0 / (51_840.0 * n3)
            - 571.0 / (2_488_320.0 * n4)
            + 163_879.0 / (209_018_880.0 * n5)
            + 5_246_819.0 / (75_246_796_800.0 * n5 * n);
        return (2.0 * PI / n).sqrt() * (n / E).powf(n) * series;
    }

    let n = n - 1.0;
    let x = GAMMA_P
        .iter()
        .enumerate()
        .skip(1)
        .fold(GAMMA_P[0], |acc, (i, &p)| acc + p / (n + i as f64));
    let t = n + GAMMA_G + 0.5;
    (2.0 * PI).sqrt() * t.powf(n + 0.5) * (-t).exp() * x
}

/// Factorial generalized to real numbers: `n! = gamma(n + 1)`.
pub fn factorial(n: f64) -> f64 {
    gamma(n + 1.0)
}

/// Rounds to the nearest integer, with halves rounded towards positive infinity.
#[allow(clippy::float_cmp)] // ties are computed exactly
pub fn round(value: f64) -> f64 {
    let rounded = value.round();
    // `f64::round()` rounds negative halves away from zero.
    if rounded - value == -0.5 {
        rounded + 1.0
    } else {
        rounded
    }
}

/// Rounds `value` to the specified number of decimal `digits`. Negative `digits` round
/// to tens, hundreds, etc. Returns NaN if `digits` is not an integer.
#[allow(clippy::cast_possible_truncation)]
pub fn round_to(value: f64, digits: f64) -> f64 {
    if digits == 0.0 {
        return round(value);
    }
    if value.is_nan() || !is_integer(digits) {
        return f64::NAN;
    }

    // Shifting via the decimal representation avoids binary rounding artifacts,
    // e.g., `1.005 * 100 == 100.49999999999999`.
    let shifted = shift_decimal(value, digits as i32);
    let rounded = round(shifted);
    shift_decimal(rounded, -(digits as i32))
}

fn shift_decimal(value: f64, shift: i32) -> f64 {
    let repr = format!("{value:e}");
    let (mantissa, exponent) = repr.split_once('e').unwrap_or((repr.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    format!("{mantissa}e{}", exponent + shift)
        .parse()
        .unwrap_or(f64::NAN)
}

/// Euclidean norm of the args, computed without undue overflow or underflow.
pub fn hypot(args: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut largest = 0.0_f64;
    for &arg in args {
        let arg = arg.abs();
        if largest < arg {
            let ratio = largest / arg;
            sum = sum * ratio * ratio + 1.0;
            largest = arg;
        } else if arg > 0.0 {
            let ratio = arg / largest;
            sum += ratio * ratio;
        } else {
            // Propagates NaN.
            sum += arg;
        }
    }

    if largest == f64::INFINITY {
        f64::INFINITY
    } else {
        largest * sum.sqrt()
    }
}
