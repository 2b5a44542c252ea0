// src/segments/basic.rs - Atomic cubic kinematic piece
use crate::error::{ProfileError, Result};
use crate::segments::data::SegmentLoads;
use crate::segments::{next_segment_id, Segment, SegmentId};
use crate::util::Polynomial;

/// A single cubic position polynomial over `[t0, tf]` together with its
/// velocity, acceleration and jerk curves.
///
/// Basic segments are produced by the composite builders and replaced, never
/// mutated, when their owner recalculates. Only the load attributes can be
/// reassigned after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicSegment {
    id: SegmentId,
    initial_time: f64,
    final_time: f64,
    position_poly: Polynomial,
    velocity_poly: Polynomial,
    acceleration_poly: Polynomial,
    jerk_poly: Polynomial,
    initial_position: f64,
    final_position: f64,
    initial_velocity: f64,
    final_velocity: f64,
    loads: SegmentLoads,
}

impl BasicSegment {
    /// `coeffs` is `[A, B, C, D]` for `A(t-t0)^3 + B(t-t0)^2 + C(t-t0) + D`.
    pub fn new(t0: f64, tf: f64, coeffs: &[f64], loads: Option<SegmentLoads>) -> Result<Self> {
        if tf <= t0 {
            return Err(ProfileError::InvalidArgument(format!(
                "final time {} must be greater than initial time {}",
                tf, t0
            )));
        }
        let coeffs: [f64; 4] = coeffs.try_into().map_err(|_| {
            ProfileError::InvalidArgument(format!(
                "expecting 4 polynomial coefficients, got {}",
                coeffs.len()
            ))
        })?;

        let position_poly = Polynomial::new(coeffs, t0, tf)?;
        let velocity_poly = position_poly.derivative();
        let acceleration_poly = velocity_poly.derivative();
        let jerk_poly = acceleration_poly.derivative();

        Ok(Self {
            id: next_segment_id(),
            initial_time: t0,
            final_time: tf,
            initial_position: position_poly.evaluate_at(t0)?,
            final_position: position_poly.evaluate_at(tf)?,
            initial_velocity: velocity_poly.evaluate_at(t0)?,
            final_velocity: velocity_poly.evaluate_at(tf)?,
            position_poly,
            velocity_poly,
            acceleration_poly,
            jerk_poly,
            loads: loads.unwrap_or_default(),
        })
    }

    pub fn evaluate_position_at(&self, t: f64) -> Result<f64> {
        self.position_poly.evaluate_at(t)
    }

    pub fn evaluate_velocity_at(&self, t: f64) -> Result<f64> {
        self.velocity_poly.evaluate_at(t)
    }

    pub fn evaluate_acceleration_at(&self, t: f64) -> Result<f64> {
        self.acceleration_poly.evaluate_at(t)
    }

    pub fn evaluate_jerk_at(&self, t: f64) -> Result<f64> {
        self.jerk_poly.evaluate_at(t)
    }

    /// Every time inside this segment at which the position equals `position`.
    pub fn times_at_position(&self, position: f64) -> Vec<f64> {
        self.position_poly.shifted(position).roots()
    }

    pub fn position_poly(&self) -> &Polynomial {
        &self.position_poly
    }

    pub fn initial_position(&self) -> f64 {
        self.initial_position
    }

    pub fn final_position(&self) -> f64 {
        self.final_position
    }

    pub fn initial_velocity(&self) -> f64 {
        self.initial_velocity
    }

    pub fn final_velocity(&self) -> f64 {
        self.final_velocity
    }

    pub fn loads(&self) -> &SegmentLoads {
        &self.loads
    }

    pub fn set_loads(&mut self, loads: SegmentLoads) {
        self.loads = loads;
    }
}

impl Segment for BasicSegment {
    fn id(&self) -> SegmentId {
        self.id
    }

    fn initial_time(&self) -> f64 {
        self.initial_time
    }

    fn final_time(&self) -> f64 {
        self.final_time
    }
}
