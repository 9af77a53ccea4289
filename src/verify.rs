//! Plain scalar reference loops and the tolerances used to compare the
//! vectorized kernels against them.

use crate::numerics::Element;

/// `out[i] = a[i] + b[i]`, one element at a time.
pub fn scalar_add<T: Element>(out: &mut [T], a: &[T], b: &[T]) {
    for ((o, &x), &y) in out.iter_mut().zip(a).zip(b) {
        *o = x + y;
    }
}

/// `out[i] = a[i] * b[i]`, one element at a time.
pub fn scalar_mul<T: Element>(out: &mut [T], a: &[T], b: &[T]) {
    for ((o, &x), &y) in out.iter_mut().zip(a).zip(b) {
        *o = x * y;
    }
}

/// Largest `|x[i] - y[i]|`, computed in `f64`. NaN if any pair differs by NaN
/// in exactly one position; pairs that are both NaN count as equal.
pub fn max_abs_diff<T: Element>(x: &[T], y: &[T]) -> f64 {
    let mut worst = 0.0f64;
    for (&p, &q) in x.iter().zip(y) {
        let (p, q) = (p.to_f64(), q.to_f64());
        if (p.is_nan() && q.is_nan()) || p == q {
            continue;
        }
        let diff = (p - q).abs();
        if diff.is_nan() || diff > worst {
            worst = diff;
        }
    }
    worst
}

/// Upper bound on how far any summation order can drift from the exact sum
/// of `a`: `(n + 1) * eps * sum(|a[i]|)`.
pub fn sum_error_bound<T: Element>(a: &[T]) -> f64 {
    let magnitude: f64 = a.iter().map(|x| x.to_f64().abs()).sum();
    (a.len() as f64 + 1.0) * T::EPSILON.to_f64() * magnitude
}

/// Exact-enough sum of `a` computed in `f64`.
pub fn reference_sum<T: Element>(a: &[T]) -> f64 {
    a.iter().map(|x| x.to_f64()).sum()
}
