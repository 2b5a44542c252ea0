// src/segments/motion.rs - Composite segment capability and the profile-level segment enum
use serde::{Deserialize, Serialize};

use crate::error::{ProfileError, Result};
use crate::segments::accel::{AccelSegmentTimeDistance, AccelSegmentTimeVelocity};
use crate::segments::basic::BasicSegment;
use crate::segments::data::{SegmentData, SegmentUpdate};
use crate::segments::index::IndexSegment;
use crate::segments::stash::Stash;
use crate::segments::{Segment, SegmentId};
use crate::util::fast_math;

/// Kinematic state at a segment boundary.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct KinematicValues {
    pub time: f64,
    pub acceleration: f64,
    pub velocity: f64,
    pub position: f64,
}

impl KinematicValues {
    pub fn new(time: f64, acceleration: f64, velocity: f64, position: f64) -> Self {
        Self { time, acceleration, velocity, position }
    }

    /// `[t, a, v, p]`
    pub fn as_array(&self) -> [f64; 4] {
        [self.time, self.acceleration, self.velocity, self.position]
    }
}

/// Start conditions supplied when a segment's user values are edited.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InitialConditions {
    pub position: f64,
    pub velocity: f64,
}

/// A user-facing motion primitive built from a stash of basic segments.
pub trait CompositeSegment: Segment {
    fn basic_segments(&self) -> &Stash<BasicSegment>;

    /// Snapshot of the user-facing parameterization.
    fn segment_data(&self) -> SegmentData;

    /// Re-derive the basic segments from new start conditions, honouring the
    /// segment's absolute/incremental mode.
    fn modify_initial_values(&mut self, t0: f64, a0: f64, v0: f64, p0: f64) -> Result<()>;

    /// Merge `update` into the segment data and rebuild from `initial`.
    fn modify_segment_values(&mut self, update: &SegmentUpdate, initial: InitialConditions) -> Result<()>;

    /// Replace the segment data wholesale and rebuild from `start`. The
    /// segment is left untouched if the rebuild fails.
    fn restore_segment_data(&mut self, data: SegmentData, start: KinematicValues) -> Result<()>;

    fn get_all_segments(&self) -> Vec<&BasicSegment> {
        self.basic_segments().get_all_segments()
    }

    /// Basic segment containing `t`. On a shared boundary the earlier one wins.
    fn find_segment_at_time(&self, t: f64) -> Result<&BasicSegment> {
        let mut candidates = self
            .basic_segments()
            .iter()
            .filter(|seg| fast_math::geq(t, seg.initial_time()) && fast_math::leq(t, seg.final_time()));

        let first = candidates
            .next()
            .ok_or_else(|| ProfileError::NotFound(format!("no basic segment contains time {}", t)))?;
        let extra = candidates.count();
        if extra > 1 {
            return Err(ProfileError::NotFound(format!(
                "found {} segments containing time {}, expecting 1 or 2",
                extra + 1,
                t
            )));
        }
        Ok(first)
    }

    fn get_initial_values(&self) -> Result<KinematicValues> {
        let first = self
            .basic_segments()
            .first_segment()
            .ok_or_else(|| ProfileError::NotFound(format!("segment {} has no basic segments", self.id())))?;
        let t0 = first.initial_time();
        Ok(KinematicValues::new(
            t0,
            first.evaluate_acceleration_at(t0)?,
            first.evaluate_velocity_at(t0)?,
            first.evaluate_position_at(t0)?,
        ))
    }

    fn get_final_values(&self) -> Result<KinematicValues> {
        let last = self
            .basic_segments()
            .last_segment()
            .ok_or_else(|| ProfileError::NotFound(format!("segment {} has no basic segments", self.id())))?;
        let tf = last.final_time();
        Ok(KinematicValues::new(
            tf,
            last.evaluate_acceleration_at(tf)?,
            last.evaluate_velocity_at(tf)?,
            last.evaluate_position_at(tf)?,
        ))
    }

    fn evaluate_position_at(&self, t: f64) -> Result<f64> {
        self.find_segment_at_time(t)?.evaluate_position_at(t)
    }

    fn evaluate_velocity_at(&self, t: f64) -> Result<f64> {
        self.find_segment_at_time(t)?.evaluate_velocity_at(t)
    }

    fn evaluate_acceleration_at(&self, t: f64) -> Result<f64> {
        self.find_segment_at_time(t)?.evaluate_acceleration_at(t)
    }

    fn evaluate_jerk_at(&self, t: f64) -> Result<f64> {
        self.find_segment_at_time(t)?.evaluate_jerk_at(t)
    }
}

/// Replace the contents of `stash` with freshly built basic segments and
/// return their combined span.
pub(crate) fn install_basic_segments(
    stash: &mut Stash<BasicSegment>,
    segments: Vec<BasicSegment>,
) -> Result<(f64, f64)> {
    let (Some(first), Some(last)) = (segments.first(), segments.last()) else {
        return Err(ProfileError::OperationFailed(
            "composite segment produced no basic segments".to_string(),
        ));
    };
    let span = (first.initial_time(), last.final_time());
    stash.initialize_with_segments(segments);
    Ok(span)
}

/// Top-level segment of a motion profile.
#[derive(Debug, Clone)]
pub enum MotionSegment {
    TimeVelocity(AccelSegmentTimeVelocity),
    TimeDistance(AccelSegmentTimeDistance),
    Index(IndexSegment),
}

impl MotionSegment {
    fn inner(&self) -> &dyn CompositeSegment {
        match self {
            MotionSegment::TimeVelocity(seg) => seg,
            MotionSegment::TimeDistance(seg) => seg,
            MotionSegment::Index(seg) => seg,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn CompositeSegment {
        match self {
            MotionSegment::TimeVelocity(seg) => seg,
            MotionSegment::TimeDistance(seg) => seg,
            MotionSegment::Index(seg) => seg,
        }
    }

    /// Build a new segment of the kind described by `data`, anchored at `start`.
    pub fn from_data(data: &SegmentData, start: KinematicValues) -> Result<Self> {
        Ok(match data {
            SegmentData::TimeVelocity(d) => {
                MotionSegment::TimeVelocity(AccelSegmentTimeVelocity::from_data(d.clone(), start)?)
            }
            SegmentData::TimeDistance(d) => {
                MotionSegment::TimeDistance(AccelSegmentTimeDistance::from_data(d.clone(), start)?)
            }
            SegmentData::Index(d) => MotionSegment::Index(IndexSegment::from_data(d.clone(), start)?),
        })
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            MotionSegment::TimeVelocity(_) => "time-velocity",
            MotionSegment::TimeDistance(_) => "time-distance",
            MotionSegment::Index(_) => "index",
        }
    }
}

impl Segment for MotionSegment {
    fn id(&self) -> SegmentId {
        self.inner().id()
    }

    fn initial_time(&self) -> f64 {
        self.inner().initial_time()
    }

    fn final_time(&self) -> f64 {
        self.inner().final_time()
    }
}

impl CompositeSegment for MotionSegment {
    fn basic_segments(&self) -> &Stash<BasicSegment> {
        self.inner().basic_segments()
    }

    fn segment_data(&self) -> SegmentData {
        self.inner().segment_data()
    }

    fn modify_initial_values(&mut self, t0: f64, a0: f64, v0: f64, p0: f64) -> Result<()> {
        self.inner_mut().modify_initial_values(t0, a0, v0, p0)
    }

    fn modify_segment_values(&mut self, update: &SegmentUpdate, initial: InitialConditions) -> Result<()> {
        self.inner_mut().modify_segment_values(update, initial)
    }

    fn restore_segment_data(&mut self, data: SegmentData, start: KinematicValues) -> Result<()> {
        self.inner_mut().restore_segment_data(data, start)
    }
}

impl From<AccelSegmentTimeVelocity> for MotionSegment {
    fn from(seg: AccelSegmentTimeVelocity) -> Self {
        MotionSegment::TimeVelocity(seg)
    }
}

impl From<AccelSegmentTimeDistance> for MotionSegment {
    fn from(seg: AccelSegmentTimeDistance) -> Self {
        MotionSegment::TimeDistance(seg)
    }
}

impl From<IndexSegment> for MotionSegment {
    fn from(seg: IndexSegment) -> Self {
        MotionSegment::Index(seg)
    }
}
