// src/util/polynomial.rs - Cubic polynomial over a bounded interval
use std::f64::consts::PI;

use crate::error::{ProfileError, Result};
use crate::util::fast_math;

/// Leading coefficients smaller than this are treated as zero when solving.
const DEGENERATE: f64 = 1e-8;
/// Roots this close outside the interval are snapped onto its end points.
const ROOT_TOLERANCE: f64 = 1e-9;

/// `A(x-t0)^3 + B(x-t0)^2 + C(x-t0) + D`, defined on `[start_point, end_point]`.
///
/// Polynomials are immutable; `derivative` and `shifted` hand back new values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Polynomial {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    start_point: f64,
    end_point: f64,
}

impl Polynomial {
    /// Build from `[A, B, C, D]`, highest power first.
    pub fn new(coeffs: [f64; 4], start_point: f64, end_point: f64) -> Result<Self> {
        if !start_point.is_finite() || !end_point.is_finite() {
            return Err(ProfileError::InvalidArgument(
                "polynomial interval must be finite".to_string(),
            ));
        }
        if end_point <= start_point {
            return Err(ProfileError::InvalidArgument(format!(
                "polynomial end point {} must be greater than start point {}",
                end_point, start_point
            )));
        }
        let [a, b, c, d] = coeffs;
        Ok(Self { a, b, c, d, start_point, end_point })
    }

    pub fn coefficients(&self) -> [f64; 4] {
        [self.a, self.b, self.c, self.d]
    }

    pub fn start_point(&self) -> f64 {
        self.start_point
    }

    pub fn end_point(&self) -> f64 {
        self.end_point
    }

    pub fn evaluate_at(&self, x: f64) -> Result<f64> {
        if fast_math::lt(x, self.start_point) {
            return Err(ProfileError::Domain(format!(
                "x = {} is before the polynomial start point {}",
                x, self.start_point
            )));
        }
        if fast_math::gt(x, self.end_point) {
            return Err(ProfileError::Domain(format!(
                "x = {} is past the polynomial end point {}",
                x, self.end_point
            )));
        }
        let u = x - self.start_point;
        Ok(((self.a * u + self.b) * u + self.c) * u + self.d)
    }

    /// First derivative on the same interval. A constant differentiates to zero.
    pub fn derivative(&self) -> Polynomial {
        Polynomial {
            a: 0.0,
            b: 3.0 * self.a,
            c: 2.0 * self.b,
            d: self.c,
            start_point: self.start_point,
            end_point: self.end_point,
        }
    }

    /// Same polynomial with `value` subtracted, so its roots are where the
    /// original crosses `value`.
    pub fn shifted(&self, value: f64) -> Polynomial {
        Polynomial { d: self.d - value, ..*self }
    }

    /// Real roots lying inside `[start_point, end_point]`, in ascending order.
    pub fn roots(&self) -> Vec<f64> {
        let mut roots: Vec<f64> = cubic_roots(self.a, self.b, self.c, self.d)
            .into_iter()
            .map(|u| u + self.start_point)
            .filter(|x| *x >= self.start_point - ROOT_TOLERANCE && *x <= self.end_point + ROOT_TOLERANCE)
            .map(|x| x.clamp(self.start_point, self.end_point))
            .collect();
        roots.sort_by(|x, y| x.total_cmp(y));
        roots.dedup_by(|x, y| fast_math::equal(*x, *y));
        roots
    }
}

/// Roots of `a u^3 + b u^2 + c u + d` over the whole real line.
fn cubic_roots(a: f64, b: f64, c: f64, d: f64) -> Vec<f64> {
    if a.abs() < DEGENERATE {
        return quadratic_roots(b, c, d);
    }

    // depressed cubic t^3 + p t + q = 0 with u = t - b / 3a
    let p = (3.0 * a * c - b * b) / (3.0 * a * a);
    let q = (2.0 * b * b * b - 9.0 * a * b * c + 27.0 * a * a * d) / (27.0 * a * a * a);

    let roots = if p.abs() < DEGENERATE {
        vec![(-q).cbrt()]
    } else if q.abs() < DEGENERATE {
        if p < 0.0 {
            vec![0.0, (-p).sqrt(), -(-p).sqrt()]
        } else {
            vec![0.0]
        }
    } else {
        let disc = q * q / 4.0 + p * p * p / 27.0;
        if disc.abs() < DEGENERATE {
            vec![-1.5 * q / p, 3.0 * q / p]
        } else if disc > 0.0 {
            let u = (-q / 2.0 - disc.sqrt()).cbrt();
            vec![u - p / (3.0 * u)]
        } else {
            // three real roots, trigonometric form; disc < 0 implies p < 0
            let u = 2.0 * (-p / 3.0).sqrt();
            let t = (3.0 * q / p / u).clamp(-1.0, 1.0).acos() / 3.0;
            let k = 2.0 * PI / 3.0;
            vec![u * t.cos(), u * (t - k).cos(), u * (t - 2.0 * k).cos()]
        }
    };

    roots.into_iter().map(|t| t - b / (3.0 * a)).collect()
}

fn quadratic_roots(a: f64, b: f64, c: f64) -> Vec<f64> {
    if a.abs() < DEGENERATE {
        if b.abs() < DEGENERATE {
            return Vec::new();
        }
        return vec![-c / b];
    }
    let disc = b * b - 4.0 * a * c;
    if disc.abs() < DEGENERATE {
        vec![-b / (2.0 * a)]
    } else if disc > 0.0 {
        vec![(-b + disc.sqrt()) / (2.0 * a), (-b - disc.sqrt()) / (2.0 * a)]
    } else {
        Vec::new()
    }
}
