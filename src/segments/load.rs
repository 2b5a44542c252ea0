// src/segments/load.rs - Linear load-vs-time pieces
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ProfileError, Result};
use crate::profile::ProfileType;
use crate::segments::{next_segment_id, Segment, SegmentId};
use crate::util::{fast_math, Polynomial};

/// Load channels. Rotary and linear profiles each recognize three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoadType {
    // rotary
    Friction,
    Inertia,
    ExternalTorque,
    // linear
    FrictionCoeff,
    Mass,
    Force,
}

const ROTARY_LOADS: [LoadType; 3] = [LoadType::Friction, LoadType::Inertia, LoadType::ExternalTorque];
const LINEAR_LOADS: [LoadType; 3] = [LoadType::FrictionCoeff, LoadType::Mass, LoadType::Force];

impl LoadType {
    pub fn types_for(profile_type: ProfileType) -> &'static [LoadType] {
        match profile_type {
            ProfileType::Rotary => &ROTARY_LOADS,
            ProfileType::Linear => &LINEAR_LOADS,
        }
    }

    pub fn is_valid_for(self, profile_type: ProfileType) -> bool {
        LoadType::types_for(profile_type).contains(&self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LoadType::Friction => "FRICTION",
            LoadType::Inertia => "INERTIA",
            LoadType::ExternalTorque => "EXTERNAL_TORQUE",
            LoadType::FrictionCoeff => "FRICTION_COEFF",
            LoadType::Mass => "MASS",
            LoadType::Force => "FORCE",
        }
    }
}

impl fmt::Display for LoadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoadType {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self> {
        ROTARY_LOADS
            .iter()
            .chain(LINEAR_LOADS.iter())
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| ProfileError::InvalidArgument(format!("unknown load type {}", s)))
    }
}

/// Flat record of a load segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadSegmentData {
    pub load_type: LoadType,
    pub initial_time: f64,
    pub final_time: f64,
    pub initial_load: f64,
    pub final_load: f64,
}

/// Load that changes linearly from `initial_load` to `final_load` over `[t0, tf]`.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadSegment {
    id: SegmentId,
    load_type: LoadType,
    initial_time: f64,
    final_time: f64,
    initial_load: f64,
    final_load: f64,
    load_poly: Polynomial,
}

impl LoadSegment {
    pub fn new(load_type: LoadType, t0: f64, tf: f64, initial_load: f64, final_load: f64) -> Result<Self> {
        if fast_math::lt(t0, 0.0) || fast_math::lt(tf, 0.0) {
            return Err(ProfileError::InvalidArgument(
                "initial time and final time must be greater than 0".to_string(),
            ));
        }
        if fast_math::geq(t0, tf) {
            return Err(ProfileError::InvalidArgument(format!(
                "final time {} must be greater than initial time {}",
                tf, t0
            )));
        }

        let slope = (final_load - initial_load) / (tf - t0);
        let load_poly = Polynomial::new([0.0, 0.0, slope, initial_load], t0, tf)?;

        Ok(Self {
            id: next_segment_id(),
            load_type,
            initial_time: t0,
            final_time: tf,
            initial_load,
            final_load,
            load_poly,
        })
    }

    pub fn from_data(data: &LoadSegmentData) -> Result<Self> {
        Self::new(data.load_type, data.initial_time, data.final_time, data.initial_load, data.final_load)
    }

    pub fn data(&self) -> LoadSegmentData {
        LoadSegmentData {
            load_type: self.load_type,
            initial_time: self.initial_time,
            final_time: self.final_time,
            initial_load: self.initial_load,
            final_load: self.final_load,
        }
    }

    pub fn load_type(&self) -> LoadType {
        self.load_type
    }

    pub fn evaluate_load_at(&self, t: f64) -> Result<f64> {
        self.load_poly.evaluate_at(t)
    }
}

impl Segment for LoadSegment {
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
