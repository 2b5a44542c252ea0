// src/segments/index.rs - Indexing moves
//
// An index move travels from p0 to pf over [t0, tf] and returns to its
// starting velocity: an accel ramp, an optional constant velocity coast and
// a decel ramp. The ramps reuse the acceleration builder.
use serde::{Deserialize, Serialize};

use crate::error::{ProfileError, Result};
use crate::segments::basic::BasicSegment;
use crate::segments::builder;
use crate::segments::data::{IndexData, IndexShape, SegmentData, SegmentLoads, SegmentMode, SegmentUpdate};
use crate::segments::motion::{
    install_basic_segments, CompositeSegment, InitialConditions, KinematicValues, MotionSegment,
};
use crate::segments::stash::Stash;
use crate::segments::{next_segment_id, Segment, SegmentId};
use crate::util::fast_math;

/// Flat parameter record an editor submits to create an index segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSegmentParams {
    pub t0: f64,
    pub tf: f64,
    pub p0: f64,
    pub pf: f64,
    /// Initial and final velocity.
    pub v: f64,
    #[serde(default)]
    pub vel_lim_pos: Option<f64>,
    #[serde(default)]
    pub vel_lim_neg: Option<f64>,
    pub acc_jerk: f64,
    pub dec_jerk: f64,
    #[serde(default)]
    pub x_skew: Option<f64>,
    #[serde(default)]
    pub y_skew: Option<f64>,
    #[serde(default)]
    pub shape: IndexShape,
    #[serde(default)]
    pub mode: SegmentMode,
    #[serde(default)]
    pub loads: SegmentLoads,
}

pub fn create_index_segment(params: &IndexSegmentParams) -> Result<MotionSegment> {
    Ok(IndexSegment::new(params)?.into())
}

/// Range checks applied whenever the user supplies index values.
fn validate(data: &IndexData, t0: f64, tf: f64, p0: f64, pf: f64, v: f64) -> Result<()> {
    builder::check_jerk_percent("accel jerk", data.acc_jerk)?;
    builder::check_jerk_percent("decel jerk", data.dec_jerk)?;

    if let Some(x_skew) = data.x_skew {
        if !(-1.0..=1.0).contains(&x_skew) {
            return Err(ProfileError::InvalidArgument(format!(
                "expecting xSkew between <-1,1>, got {}",
                x_skew
            )));
        }
    }
    if let Some(y_skew) = data.y_skew {
        if !(0.0..=1.0).contains(&y_skew) {
            return Err(ProfileError::InvalidArgument(format!(
                "expecting ySkew between <0,1>, got {}",
                y_skew
            )));
        }
    }
    if tf < t0 {
        return Err(ProfileError::InvalidArgument(format!(
            "expecting tf {} to come after t0 {}",
            tf, t0
        )));
    }
    if pf - p0 < 0.0 {
        return Err(ProfileError::InvalidArgument(format!(
            "expecting a non-negative position change, got {}",
            pf - p0
        )));
    }
    if let Some(limit) = data.vel_lim_pos {
        if limit < v {
            return Err(ProfileError::InvalidArgument(format!(
                "positive velocity limit {} must not be below velocity {}",
                limit, v
            )));
        }
    }
    if let Some(limit) = data.vel_lim_neg {
        if limit > v {
            return Err(ProfileError::InvalidArgument(format!(
                "negative velocity limit {} must not be above velocity {}",
                limit, v
            )));
        }
    }
    Ok(())
}

/// Decompose an index move into 1 to 7 basic segments.
///
/// The y skew sets the peak velocity and with it the coast length; velocity
/// limits override it. The x skew only splits the accel+decel time between
/// the two ramps.
fn index_basic_segments(t0: f64, tf: f64, p0: f64, pf: f64, v: f64, data: &IndexData) -> Result<Vec<BasicSegment>> {
    let dt = tf - t0;
    if dt <= 0.0 {
        return Err(ProfileError::InvalidArgument(format!(
            "index segment needs a positive duration, got {}",
            dt
        )));
    }

    let mut y_skew = match data.shape {
        IndexShape::Triangle => 1.0,
        IndexShape::Trapezoid => data.y_skew.unwrap_or(0.5),
    };
    let x_skew = data.x_skew.unwrap_or(0.0);

    let v_ave = (pf - p0) / dt - v;
    let mut v_max = v + (1.0 + y_skew) * v_ave;

    if let Some(limit) = data.vel_lim_pos.filter(|limit| v_max > *limit) {
        y_skew = (limit - v) / v_ave - 1.0;
        v_max = limit;
        tracing::warn!("Maximum velocity exceeds positive velocity limit {}, ySkew changed to {}", limit, y_skew);
    } else if let Some(limit) = data.vel_lim_neg.filter(|limit| v_max < *limit) {
        y_skew = (limit - v) / v_ave - 1.0;
        v_max = limit;
        tracing::warn!("Maximum velocity exceeds negative velocity limit {}, ySkew changed to {}", limit, y_skew);
    }

    if !(0.0..=1.0).contains(&y_skew) {
        return Err(ProfileError::Conflict(format!(
            "ySkew {} required by the velocity limits is outside <0,1>",
            y_skew
        )));
    }

    let modified_y_skew = 1.0 - 1.0 / (1.0 + y_skew);
    let accdec_time = modified_y_skew * dt * 2.0;
    let coast_time = dt - accdec_time;
    let acc_time = accdec_time / 2.0 * (1.0 + x_skew);

    let mut out = Vec::with_capacity(7);
    let mut t = t0;
    let mut p = p0;

    if fast_math::gt(t + acc_time, t) {
        let ramp = builder::velocity_ramp(t, t + acc_time, p, v, v_max, data.acc_jerk, data.loads)?;
        t += acc_time;
        p = ramp.last().map_or(p, BasicSegment::final_position);
        out.extend(ramp);
    }

    if fast_math::gt(t + coast_time, t) {
        let coast = BasicSegment::new(t, t + coast_time, &[0.0, 0.0, v_max, p], Some(data.loads))?;
        t += coast_time;
        p = coast.final_position();
        out.push(coast);
    }

    if fast_math::gt(tf, t) {
        out.extend(builder::velocity_ramp(t, tf, p, v_max, v, data.dec_jerk, data.loads)?);
    }

    Ok(out)
}

/// Positioning move with matching start and end velocity.
#[derive(Debug, Clone)]
pub struct IndexSegment {
    id: SegmentId,
    initial_time: f64,
    final_time: f64,
    data: IndexData,
    segments: Stash<BasicSegment>,
}

impl IndexSegment {
    pub fn new(params: &IndexSegmentParams) -> Result<Self> {
        let data = IndexData {
            mode: params.mode,
            initial_time: params.t0,
            final_time: params.tf,
            duration: params.tf - params.t0,
            velocity: params.v,
            initial_position: params.p0,
            final_position: params.pf,
            vel_lim_pos: params.vel_lim_pos,
            vel_lim_neg: params.vel_lim_neg,
            acc_jerk: params.acc_jerk,
            dec_jerk: params.dec_jerk,
            x_skew: params.x_skew,
            y_skew: params.y_skew,
            shape: params.shape,
            loads: params.loads,
        };
        validate(&data, params.t0, params.tf, params.p0, params.pf, params.v)?;

        let basics = index_basic_segments(params.t0, params.tf, params.p0, params.pf, params.v, &data)?;
        let mut segments = Stash::new();
        let (initial_time, final_time) = install_basic_segments(&mut segments, basics)?;

        Ok(Self {
            id: next_segment_id(),
            initial_time,
            final_time,
            data,
            segments,
        })
    }

    pub(crate) fn from_data(data: IndexData, start: KinematicValues) -> Result<Self> {
        builder::check_jerk_percent("accel jerk", data.acc_jerk)?;
        builder::check_jerk_percent("decel jerk", data.dec_jerk)?;
        let mut seg = Self {
            id: next_segment_id(),
            initial_time: data.initial_time,
            final_time: data.final_time,
            data,
            segments: Stash::new(),
        };
        seg.modify_initial_values(start.time, start.acceleration, start.velocity, start.position)?;
        Ok(seg)
    }

    pub fn data(&self) -> &IndexData {
        &self.data
    }

    fn rebuild(&mut self, data: &IndexData, t0: f64, tf: f64, p0: f64, pf: f64, v: f64) -> Result<()> {
        let basics = index_basic_segments(t0, tf, p0, pf, v, data)?;
        let (start, end) = install_basic_segments(&mut self.segments, basics)?;
        self.initial_time = start;
        self.final_time = end;
        Ok(())
    }
}

impl Segment for IndexSegment {
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

impl CompositeSegment for IndexSegment {
    fn basic_segments(&self) -> &Stash<BasicSegment> {
        &self.segments
    }

    fn segment_data(&self) -> SegmentData {
        SegmentData::Index(self.data.clone())
    }

    fn modify_initial_values(&mut self, t0: f64, _a0: f64, v0: f64, p0: f64) -> Result<()> {
        let (tf, pf) = match self.data.mode {
            // keep duration and position change
            SegmentMode::Incremental => (
                t0 + self.data.duration,
                p0 + self.data.final_position - self.data.initial_position,
            ),
            SegmentMode::Absolute => {
                if fast_math::lt(self.data.final_time - t0, 0.0) {
                    return Err(ProfileError::InvalidArgument(
                        "tried to move initial time past final time for absolute segment".to_string(),
                    ));
                }
                (self.data.final_time, self.data.final_position)
            }
        };

        let data = self.data.clone();
        self.rebuild(&data, t0, tf, p0, pf, v0)?;
        self.data.initial_time = t0;
        self.data.final_time = tf;
        self.data.duration = tf - t0;
        self.data.velocity = v0;
        self.data.initial_position = p0;
        self.data.final_position = pf;
        Ok(())
    }

    fn modify_segment_values(&mut self, update: &SegmentUpdate, initial: InitialConditions) -> Result<()> {
        let SegmentUpdate::Index(update) = update else {
            return Err(ProfileError::InvalidArgument("expecting index segment values".to_string()));
        };
        let mut data = self.data.clone();
        data.merge(update);

        let t0 = self.initial_time;
        let tf = data.final_time;
        validate(&data, t0, tf, initial.position, data.final_position, initial.velocity)?;
        self.rebuild(&data, t0, tf, initial.position, data.final_position, initial.velocity)?;

        data.initial_time = t0;
        data.duration = tf - t0;
        data.velocity = initial.velocity;
        data.initial_position = initial.position;
        self.data = data;
        Ok(())
    }

    fn restore_segment_data(&mut self, data: SegmentData, start: KinematicValues) -> Result<()> {
        let SegmentData::Index(data) = data else {
            return Err(ProfileError::InvalidArgument("expecting index segment data".to_string()));
        };
        let previous = std::mem::replace(&mut self.data, data);
        if let Err(e) = self.modify_initial_values(start.time, start.acceleration, start.velocity, start.position) {
            self.data = previous;
            return Err(e);
        }
        Ok(())
    }
}
