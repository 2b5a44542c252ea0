// src/segments/accel.rs - Jerk-limited acceleration segments
//
// Two parameterizations of the same shape: reach a target velocity by the
// final time, or reach a target position by the final time.
use serde::{Deserialize, Serialize};

use crate::error::{ProfileError, Result};
use crate::segments::basic::BasicSegment;
use crate::segments::builder;
use crate::segments::data::{
    SegmentData, SegmentLoads, SegmentMode, SegmentUpdate, TimeDistanceData, TimeVelocityData,
};
use crate::segments::motion::{
    install_basic_segments, CompositeSegment, InitialConditions, KinematicValues, MotionSegment,
};
use crate::segments::stash::Stash;
use crate::segments::{next_segment_id, Segment, SegmentId};
use crate::util::fast_math;

/// Which target an acceleration segment is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccelPermutation {
    TimeVelocity,
    TimeDistance,
}

/// Flat parameter record an editor submits to create an acceleration segment.
///
/// `target` is the final velocity for [`AccelPermutation::TimeVelocity`] and
/// the final position for [`AccelPermutation::TimeDistance`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccelSegmentParams {
    pub t0: f64,
    pub tf: f64,
    pub p0: f64,
    pub v0: f64,
    pub target: f64,
    pub jerk_percent: f64,
    #[serde(default)]
    pub mode: SegmentMode,
    #[serde(default)]
    pub loads: SegmentLoads,
}

/// Build an acceleration segment of the requested permutation.
pub fn create_accel_segment(permutation: AccelPermutation, params: &AccelSegmentParams) -> Result<MotionSegment> {
    Ok(match permutation {
        AccelPermutation::TimeVelocity => AccelSegmentTimeVelocity::new(
            params.t0,
            params.tf,
            params.p0,
            params.v0,
            params.target,
            params.jerk_percent,
            params.mode,
            Some(params.loads),
        )?
        .into(),
        AccelPermutation::TimeDistance => AccelSegmentTimeDistance::new(
            params.t0,
            params.tf,
            params.p0,
            params.v0,
            params.target,
            params.jerk_percent,
            params.mode,
            Some(params.loads),
        )?
        .into(),
    })
}

fn check_absolute_duration(duration: f64) -> Result<()> {
    if fast_math::lt(duration, 0.0) {
        return Err(ProfileError::InvalidArgument(
            "tried to move initial time past final time for absolute segment".to_string(),
        ));
    }
    Ok(())
}

fn check_span(t0: f64, tf: f64) -> Result<()> {
    if !t0.is_finite() || !tf.is_finite() || tf <= t0 {
        return Err(ProfileError::InvalidArgument(format!(
            "expecting final time {} after initial time {}",
            tf, t0
        )));
    }
    Ok(())
}

/// Acceleration from `v0` to a target velocity over `[t0, tf]`.
#[derive(Debug, Clone)]
pub struct AccelSegmentTimeVelocity {
    id: SegmentId,
    initial_time: f64,
    final_time: f64,
    data: TimeVelocityData,
    segments: Stash<BasicSegment>,
}

impl AccelSegmentTimeVelocity {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        t0: f64,
        tf: f64,
        p0: f64,
        v0: f64,
        vf: f64,
        jerk_percent: f64,
        mode: SegmentMode,
        loads: Option<SegmentLoads>,
    ) -> Result<Self> {
        builder::check_jerk_percent("jerk", jerk_percent)?;
        check_span(t0, tf)?;
        let data = TimeVelocityData {
            mode,
            initial_time: t0,
            final_time: tf,
            initial_velocity: v0,
            final_velocity: vf,
            duration: tf - t0,
            jerk_percent,
            loads: loads.unwrap_or_default(),
        };
        let mut seg = Self {
            id: next_segment_id(),
            initial_time: t0,
            final_time: tf,
            data,
            segments: Stash::new(),
        };
        seg.rebuild(t0, tf, p0, v0, vf)?;
        Ok(seg)
    }

    pub(crate) fn from_data(data: TimeVelocityData, start: KinematicValues) -> Result<Self> {
        builder::check_jerk_percent("jerk", data.jerk_percent)?;
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

    pub fn data(&self) -> &TimeVelocityData {
        &self.data
    }

    fn rebuild(&mut self, t0: f64, tf: f64, p0: f64, v0: f64, vf: f64) -> Result<()> {
        let segments = builder::velocity_ramp(t0, tf, p0, v0, vf, self.data.jerk_percent, self.data.loads)?;
        let (start, end) = install_basic_segments(&mut self.segments, segments)?;
        self.initial_time = start;
        self.final_time = end;
        Ok(())
    }
}

impl Segment for AccelSegmentTimeVelocity {
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

impl CompositeSegment for AccelSegmentTimeVelocity {
    fn basic_segments(&self) -> &Stash<BasicSegment> {
        &self.segments
    }

    fn segment_data(&self) -> SegmentData {
        SegmentData::TimeVelocity(self.data.clone())
    }

    fn modify_initial_values(&mut self, t0: f64, _a0: f64, v0: f64, p0: f64) -> Result<()> {
        let (tf, vf) = match self.data.mode {
            // keep duration and velocity change
            SegmentMode::Incremental => (
                t0 + self.data.duration,
                v0 + self.data.final_velocity - self.data.initial_velocity,
            ),
            SegmentMode::Absolute => {
                check_absolute_duration(self.data.final_time - t0)?;
                (self.data.final_time, self.data.final_velocity)
            }
        };

        self.rebuild(t0, tf, p0, v0, vf)?;
        self.data.initial_time = t0;
        self.data.final_time = tf;
        self.data.duration = tf - t0;
        self.data.initial_velocity = v0;
        self.data.final_velocity = vf;
        Ok(())
    }

    fn modify_segment_values(&mut self, update: &SegmentUpdate, initial: InitialConditions) -> Result<()> {
        let SegmentUpdate::TimeVelocity(update) = update else {
            return Err(ProfileError::InvalidArgument(
                "expecting time-velocity segment values".to_string(),
            ));
        };
        let mut data = self.data.clone();
        data.merge(update);
        builder::check_jerk_percent("jerk", data.jerk_percent)?;

        let t0 = self.initial_time;
        let tf = t0 + data.duration;
        check_span(t0, tf)?;
        let segments =
            builder::velocity_ramp(t0, tf, initial.position, initial.velocity, data.final_velocity, data.jerk_percent, data.loads)?;
        let (start, end) = install_basic_segments(&mut self.segments, segments)?;

        data.initial_time = start;
        data.final_time = end;
        data.initial_velocity = initial.velocity;
        self.initial_time = start;
        self.final_time = end;
        self.data = data;
        Ok(())
    }

    fn restore_segment_data(&mut self, data: SegmentData, start: KinematicValues) -> Result<()> {
        let SegmentData::TimeVelocity(data) = data else {
            return Err(ProfileError::InvalidArgument(
                "expecting time-velocity segment data".to_string(),
            ));
        };
        let previous = std::mem::replace(&mut self.data, data);
        if let Err(e) = self.modify_initial_values(start.time, start.acceleration, start.velocity, start.position) {
            self.data = previous;
            return Err(e);
        }
        Ok(())
    }
}

/// Acceleration from `(p0, v0)` that arrives at a target position at `tf`.
#[derive(Debug, Clone)]
pub struct AccelSegmentTimeDistance {
    id: SegmentId,
    initial_time: f64,
    final_time: f64,
    data: TimeDistanceData,
    segments: Stash<BasicSegment>,
}

impl AccelSegmentTimeDistance {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        t0: f64,
        tf: f64,
        p0: f64,
        v0: f64,
        pf: f64,
        jerk_percent: f64,
        mode: SegmentMode,
        loads: Option<SegmentLoads>,
    ) -> Result<Self> {
        builder::check_jerk_percent("jerk", jerk_percent)?;
        check_span(t0, tf)?;
        let data = TimeDistanceData {
            mode,
            initial_time: t0,
            final_time: tf,
            final_position: pf,
            distance: pf - p0,
            duration: tf - t0,
            jerk_percent,
            loads: loads.unwrap_or_default(),
        };
        let mut seg = Self {
            id: next_segment_id(),
            initial_time: t0,
            final_time: tf,
            data,
            segments: Stash::new(),
        };
        seg.rebuild(t0, tf, p0, v0, pf)?;
        Ok(seg)
    }

    pub(crate) fn from_data(data: TimeDistanceData, start: KinematicValues) -> Result<Self> {
        builder::check_jerk_percent("jerk", data.jerk_percent)?;
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

    pub fn data(&self) -> &TimeDistanceData {
        &self.data
    }

    fn rebuild(&mut self, t0: f64, tf: f64, p0: f64, v0: f64, pf: f64) -> Result<()> {
        let segments = builder::distance_ramp(t0, tf, p0, v0, pf, self.data.jerk_percent, self.data.loads)?;
        let (start, end) = install_basic_segments(&mut self.segments, segments)?;
        self.initial_time = start;
        self.final_time = end;
        Ok(())
    }
}

impl Segment for AccelSegmentTimeDistance {
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

impl CompositeSegment for AccelSegmentTimeDistance {
    fn basic_segments(&self) -> &Stash<BasicSegment> {
        &self.segments
    }

    fn segment_data(&self) -> SegmentData {
        SegmentData::TimeDistance(self.data.clone())
    }

    fn modify_initial_values(&mut self, t0: f64, _a0: f64, v0: f64, p0: f64) -> Result<()> {
        let (tf, pf) = match self.data.mode {
            // keep duration and distance
            SegmentMode::Incremental => (t0 + self.data.duration, p0 + self.data.distance),
            SegmentMode::Absolute => {
                check_absolute_duration(self.data.final_time - t0)?;
                (self.data.final_time, self.data.final_position)
            }
        };

        self.rebuild(t0, tf, p0, v0, pf)?;
        self.data.initial_time = t0;
        self.data.final_time = tf;
        self.data.duration = tf - t0;
        self.data.final_position = pf;
        self.data.distance = pf - p0;
        Ok(())
    }

    fn modify_segment_values(&mut self, update: &SegmentUpdate, initial: InitialConditions) -> Result<()> {
        let SegmentUpdate::TimeDistance(update) = update else {
            return Err(ProfileError::InvalidArgument(
                "expecting time-distance segment values".to_string(),
            ));
        };
        let mut data = self.data.clone();
        data.merge(update);
        builder::check_jerk_percent("jerk", data.jerk_percent)?;

        let t0 = self.initial_time;
        let tf = t0 + data.duration;
        check_span(t0, tf)?;
        let pf = initial.position + data.distance;
        let segments =
            builder::distance_ramp(t0, tf, initial.position, initial.velocity, pf, data.jerk_percent, data.loads)?;
        let (start, end) = install_basic_segments(&mut self.segments, segments)?;

        data.initial_time = start;
        data.final_time = end;
        data.final_position = pf;
        self.initial_time = start;
        self.final_time = end;
        self.data = data;
        Ok(())
    }

    fn restore_segment_data(&mut self, data: SegmentData, start: KinematicValues) -> Result<()> {
        let SegmentData::TimeDistance(data) = data else {
            return Err(ProfileError::InvalidArgument(
                "expecting time-distance segment data".to_string(),
            ));
        };
        let previous = std::mem::replace(&mut self.data, data);
        if let Err(e) = self.modify_initial_values(start.time, start.acceleration, start.velocity, start.position) {
            self.data = previous;
            return Err(e);
        }
        Ok(())
    }
}
