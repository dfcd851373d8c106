use crate::foundation::core::Rgba8;

/// Tolerance for "this denominator is zero" checks in the optical formulas.
pub(crate) const EPS: f64 = 1e-9;

// Anything further than this from the canvas origin can never land on a canvas.
const CELL_LIMIT: f64 = 1.0e12;

pub(crate) fn near_zero(x: f64) -> bool {
    x.abs() < EPS
}

/// Floor a continuous canvas coordinate into a pixel index.
///
/// Non-finite or absurdly distant values yield `None` instead of a saturated cast.
pub(crate) fn floor_cell(v: f64) -> Option<i64> {
    if !v.is_finite() || v.abs() > CELL_LIMIT {
        return None;
    }
    Some(v.floor() as i64)
}

pub(crate) fn lerp_u8(a: u8, b: u8, t: f64) -> u8 {
    let v = f64::from(a) + (f64::from(b) - f64::from(a)) * t;
    v.round().clamp(0.0, 255.0) as u8
}

pub(crate) fn lerp_rgba(a: Rgba8, b: Rgba8, t: f64) -> Rgba8 {
    Rgba8::new(
        lerp_u8(a.r, b.r, t),
        lerp_u8(a.g, b.g, t),
        lerp_u8(a.b, b.b, t),
        lerp_u8(a.a, b.a, t),
    )
}

pub(crate) fn isqrt(n: u64) -> u64 {
    if n < 2 {
        return n;
    }
    let mut x = (n as f64).sqrt() as u64;
    while x * x > n {
        x -= 1;
    }
    while (x + 1) * (x + 1) <= n {
        x += 1;
    }
    x
}
