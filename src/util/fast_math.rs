// src/util/fast_math.rs - Tolerant floating point comparisons
//
// Every time and kinematic comparison in the crate goes through these
// helpers so that values which differ only by rounding compare equal.

/// Absolute comparison tolerance (2^-52).
pub const EPSILON: f64 = f64::EPSILON;

pub fn equal(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

pub fn not_equal(a: f64, b: f64) -> bool {
    !equal(a, b)
}

pub fn leq(a: f64, b: f64) -> bool {
    a < b || equal(a, b)
}

pub fn geq(a: f64, b: f64) -> bool {
    a > b || equal(a, b)
}

pub fn lt(a: f64, b: f64) -> bool {
    a < b && !equal(a, b)
}

pub fn gt(a: f64, b: f64) -> bool {
    a > b && !equal(a, b)
}

pub fn sqr(x: f64) -> f64 {
    x * x
}
