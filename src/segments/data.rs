// src/segments/data.rs - User-facing parameterization of composite segments
//
// These records are what an editor shows and what gets persisted. The basic
// segments of a composite are always re-derived from them.
use serde::{Deserialize, Serialize};

/// How a segment reacts when its initial conditions move.
///
/// Deserializes through [`SegmentMode::from_name`], so unknown names load as
/// incremental instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum SegmentMode {
    /// Duration and deltas are preserved, targets are re-anchored.
    #[default]
    Incremental,
    /// Final time and final target stay fixed, duration adjusts.
    Absolute,
}

impl SegmentMode {
    /// Anything other than exactly `"absolute"` is incremental.
    pub fn from_name(name: &str) -> Self {
        if name == "absolute" {
            SegmentMode::Absolute
        } else {
            SegmentMode::Incremental
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentMode::Incremental => "incremental",
            SegmentMode::Absolute => "absolute",
        }
    }
}

impl From<&str> for SegmentMode {
    fn from(name: &str) -> Self {
        SegmentMode::from_name(name)
    }
}

impl From<String> for SegmentMode {
    fn from(name: String) -> Self {
        SegmentMode::from_name(&name)
    }
}

/// Load attributes carried by basic segments.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentLoads {
    /// External force or torque
    pub thrust: f64,
    /// Friction coefficient (linear) or friction (rotary)
    pub friction: f64,
    /// Mass (linear) or inertia (rotary)
    pub load: f64,
}

/// Shape of an index move's velocity profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexShape {
    #[default]
    Trapezoid,
    Triangle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeVelocityData {
    #[serde(default)]
    pub mode: SegmentMode,
    pub initial_time: f64,
    pub final_time: f64,
    pub initial_velocity: f64,
    pub final_velocity: f64,
    pub duration: f64,
    pub jerk_percent: f64,
    #[serde(default)]
    pub loads: SegmentLoads,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeDistanceData {
    #[serde(default)]
    pub mode: SegmentMode,
    pub initial_time: f64,
    pub final_time: f64,
    pub final_position: f64,
    pub distance: f64,
    pub duration: f64,
    pub jerk_percent: f64,
    #[serde(default)]
    pub loads: SegmentLoads,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexData {
    #[serde(default)]
    pub mode: SegmentMode,
    pub initial_time: f64,
    pub final_time: f64,
    pub duration: f64,
    /// Shared initial and final velocity.
    pub velocity: f64,
    pub initial_position: f64,
    pub final_position: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vel_lim_pos: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vel_lim_neg: Option<f64>,
    pub acc_jerk: f64,
    pub dec_jerk: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_skew: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_skew: Option<f64>,
    #[serde(default)]
    pub shape: IndexShape,
    #[serde(default)]
    pub loads: SegmentLoads,
}

/// Parameterization of any composite segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SegmentData {
    TimeVelocity(TimeVelocityData),
    TimeDistance(TimeDistanceData),
    Index(IndexData),
}

impl SegmentData {
    pub fn mode(&self) -> SegmentMode {
        match self {
            SegmentData::TimeVelocity(data) => data.mode,
            SegmentData::TimeDistance(data) => data.mode,
            SegmentData::Index(data) => data.mode,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            SegmentData::TimeVelocity(_) => "time-velocity",
            SegmentData::TimeDistance(_) => "time-distance",
            SegmentData::Index(_) => "index",
        }
    }
}

// Updates: every field is optional and a numeric zero counts as "not
// provided", so an update can never set a value to zero. Editors rely on
// this to send partially filled forms.

/// Keep `value` only when it is present and non-zero.
pub(crate) fn provided(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

/// Start velocity is not editable here, it comes from the initial conditions
/// passed alongside the update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeVelocityUpdate {
    pub mode: Option<SegmentMode>,
    pub final_velocity: Option<f64>,
    pub duration: Option<f64>,
    pub jerk_percent: Option<f64>,
    pub loads: Option<SegmentLoads>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeDistanceUpdate {
    pub mode: Option<SegmentMode>,
    pub distance: Option<f64>,
    pub duration: Option<f64>,
    pub jerk_percent: Option<f64>,
    pub loads: Option<SegmentLoads>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexUpdate {
    pub mode: Option<SegmentMode>,
    pub final_time: Option<f64>,
    pub final_position: Option<f64>,
    pub vel_lim_pos: Option<f64>,
    pub vel_lim_neg: Option<f64>,
    pub acc_jerk: Option<f64>,
    pub dec_jerk: Option<f64>,
    pub x_skew: Option<f64>,
    pub y_skew: Option<f64>,
    pub shape: Option<IndexShape>,
    pub loads: Option<SegmentLoads>,
}

/// Update for any composite segment; the variant must match the segment kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SegmentUpdate {
    TimeVelocity(TimeVelocityUpdate),
    TimeDistance(TimeDistanceUpdate),
    Index(IndexUpdate),
}

impl TimeVelocityData {
    pub(crate) fn merge(&mut self, update: &TimeVelocityUpdate) {
        if let Some(mode) = update.mode {
            self.mode = mode;
        }
        if let Some(v) = provided(update.final_velocity) {
            self.final_velocity = v;
        }
        if let Some(d) = provided(update.duration) {
            self.duration = d;
        }
        if let Some(j) = provided(update.jerk_percent) {
            self.jerk_percent = j;
        }
        if let Some(loads) = update.loads {
            self.loads = loads;
        }
    }
}

impl TimeDistanceData {
    pub(crate) fn merge(&mut self, update: &TimeDistanceUpdate) {
        if let Some(mode) = update.mode {
            self.mode = mode;
        }
        if let Some(d) = provided(update.distance) {
            self.distance = d;
        }
        if let Some(d) = provided(update.duration) {
            self.duration = d;
        }
        if let Some(j) = provided(update.jerk_percent) {
            self.jerk_percent = j;
        }
        if let Some(loads) = update.loads {
            self.loads = loads;
        }
    }
}

impl IndexData {
    pub(crate) fn merge(&mut self, update: &IndexUpdate) {
        if let Some(mode) = update.mode {
            self.mode = mode;
        }
        if let Some(tf) = provided(update.final_time) {
            self.final_time = tf;
        }
        if let Some(pf) = provided(update.final_position) {
            self.final_position = pf;
        }
        if let Some(limit) = provided(update.vel_lim_pos) {
            self.vel_lim_pos = Some(limit);
        }
        if let Some(limit) = provided(update.vel_lim_neg) {
            self.vel_lim_neg = Some(limit);
        }
        if let Some(j) = provided(update.acc_jerk) {
            self.acc_jerk = j;
        }
        if let Some(j) = provided(update.dec_jerk) {
            self.dec_jerk = j;
        }
        if let Some(skew) = provided(update.x_skew) {
            self.x_skew = Some(skew);
        }
        if let Some(skew) = provided(update.y_skew) {
            self.y_skew = Some(skew);
        }
        if let Some(shape) = update.shape {
            self.shape = shape;
        }
        if let Some(loads) = update.loads {
            self.loads = loads;
        }
    }
}
