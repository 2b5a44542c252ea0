// src/profile/mod.rs - Motion profile: ordered composite segments with recalculation and undo
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ProfileConfig;
use crate::error::{ProfileError, Result};
use crate::segments::data::{SegmentData, SegmentUpdate};
use crate::segments::{
    BasicSegment, CompositeSegment, InitialConditions, KinematicValues, LoadSegment, LoadType, MotionSegment,
    Segment, SegmentId, Stash,
};
use crate::util::fast_math;

pub mod data;
pub mod helper;
pub mod history;

pub use data::ProfileData;
pub use helper::validate_segments;
pub use history::{Command, History};

/// Kind of axis a profile drives. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileType {
    #[default]
    Rotary,
    Linear,
}

impl ProfileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileType::Rotary => "rotary",
            ProfileType::Linear => "linear",
        }
    }
}

impl fmt::Display for ProfileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileType {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "rotary" => Ok(ProfileType::Rotary),
            "linear" => Ok(ProfileType::Linear),
            other => Err(ProfileError::InvalidArgument(format!("unknown profile type {}", other))),
        }
    }
}

/// Copy of the segments from some point to the end of the profile.
struct TailSnapshot {
    /// Segment the tail follows, `None` if the tail is the whole profile.
    anchor: Option<SegmentId>,
    segments: Vec<MotionSegment>,
}

/// Time-ordered sequence of composite segments starting at t = 0.
///
/// The profile keeps every adjacent pair of segments continuous in time,
/// position and velocity: any structural edit re-derives the segments after
/// the edit point from their new predecessors. Loads live beside the motion
/// segments in one stash per load type.
#[derive(Debug, Clone)]
pub struct MotionProfile {
    profile_type: ProfileType,
    initial_position: f64,
    initial_velocity: f64,
    segments: Stash<MotionSegment>,
    loads: BTreeMap<LoadType, Stash<LoadSegment>>,
    history: History,
}

impl MotionProfile {
    pub fn new(profile_type: ProfileType) -> Self {
        Self::with_config(profile_type, &ProfileConfig::default())
    }

    pub fn with_config(profile_type: ProfileType, config: &ProfileConfig) -> Self {
        let loads = LoadType::types_for(profile_type)
            .iter()
            .map(|load_type| (*load_type, Stash::new()))
            .collect();
        Self {
            profile_type,
            initial_position: 0.0,
            initial_velocity: 0.0,
            segments: Stash::new(),
            loads,
            history: History::with_limit(config.history_limit),
        }
    }

    pub fn profile_type(&self) -> ProfileType {
        self.profile_type
    }

    pub fn initial_position(&self) -> f64 {
        self.initial_position
    }

    pub fn initial_velocity(&self) -> f64 {
        self.initial_velocity
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Profile start state, used as the predecessor of the first segment.
    fn global_start(&self) -> KinematicValues {
        KinematicValues::new(0.0, 0.0, self.initial_velocity, self.initial_position)
    }

    /// Final state of the segment before `id`, or the profile start.
    fn start_for(&self, id: SegmentId) -> Result<KinematicValues> {
        match self.segments.get_previous_segment(id) {
            Some(prev) => prev.get_final_values(),
            None => Ok(self.global_start()),
        }
    }

    /// Final state of the last segment, or the profile start.
    fn end_state(&self) -> Result<KinematicValues> {
        match self.segments.last_segment() {
            Some(last) => last.get_final_values(),
            None => Ok(self.global_start()),
        }
    }

    // ---- queries ----

    pub fn count_segments(&self) -> usize {
        self.segments.count_segments()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn find_by_id(&self, id: SegmentId) -> Option<&MotionSegment> {
        self.segments.find_by_id(id)
    }

    pub fn get_all_segments(&self) -> Vec<&MotionSegment> {
        self.segments.get_all_segments()
    }

    pub fn first_segment(&self) -> Option<&MotionSegment> {
        self.segments.first_segment()
    }

    pub fn last_segment(&self) -> Option<&MotionSegment> {
        self.segments.last_segment()
    }

    pub fn get_next_segment(&self, id: SegmentId) -> Option<&MotionSegment> {
        self.segments.get_next_segment(id)
    }

    pub fn get_previous_segment(&self, id: SegmentId) -> Option<&MotionSegment> {
        self.segments.get_previous_segment(id)
    }

    /// Every basic segment of the profile, in time order.
    pub fn get_all_basic_segments(&self) -> Vec<&BasicSegment> {
        self.segments
            .iter()
            .flat_map(|seg| seg.basic_segments().iter())
            .collect()
    }

    /// Top-level segment owning the basic segment `basic_id`.
    pub fn find_parent_segment_by_child_id(&self, basic_id: SegmentId) -> Option<&MotionSegment> {
        let all = self.segments.get_all_segments();
        all.into_iter()
            .rev()
            .find(|seg| seg.basic_segments().contains(basic_id))
    }

    /// Segment that starts at time `t`.
    pub fn get_existing_segment(&self, t: f64) -> Option<&MotionSegment> {
        self.segments.find_segment_with_initial_time(t)
    }

    /// End time of the last segment.
    pub fn duration(&self) -> f64 {
        self.segments.last_segment().map_or(0.0, Segment::final_time)
    }

    fn segment_at_time(&self, t: f64) -> Result<&MotionSegment> {
        self.segments
            .iter()
            .find(|seg| fast_math::geq(t, seg.initial_time()) && fast_math::leq(t, seg.final_time()))
            .ok_or_else(|| ProfileError::NotFound(format!("no segment contains time {}", t)))
    }

    pub fn evaluate_position_at(&self, t: f64) -> Result<f64> {
        self.segment_at_time(t)?.evaluate_position_at(t)
    }

    pub fn evaluate_velocity_at(&self, t: f64) -> Result<f64> {
        self.segment_at_time(t)?.evaluate_velocity_at(t)
    }

    pub fn evaluate_acceleration_at(&self, t: f64) -> Result<f64> {
        self.segment_at_time(t)?.evaluate_acceleration_at(t)
    }

    pub fn evaluate_jerk_at(&self, t: f64) -> Result<f64> {
        self.segment_at_time(t)?.evaluate_jerk_at(t)
    }

    /// Every time at which the profile position equals `position`.
    pub fn times_at_position(&self, position: f64) -> Vec<f64> {
        let mut times: Vec<f64> = self
            .get_all_basic_segments()
            .into_iter()
            .flat_map(|seg| seg.times_at_position(position))
            .collect();
        times.sort_by(f64::total_cmp);
        // a crossing on a shared boundary is reported by both neighbours
        times.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
        times
    }

    /// Rows of `[t, position, velocity, acceleration]` every `step` seconds,
    /// always including the final time.
    pub fn sample(&self, step: f64) -> Result<Vec<[f64; 4]>> {
        if step <= 0.0 || !step.is_finite() {
            return Err(ProfileError::InvalidArgument(format!(
                "sample step must be positive, got {}",
                step
            )));
        }
        let Some(first) = self.segments.first_segment() else {
            return Ok(Vec::new());
        };
        let start = first.initial_time();
        let end = self.duration();

        let mut rows = Vec::new();
        let mut i = 0u64;
        loop {
            let t = (start + step * i as f64).min(end);
            rows.push([
                t,
                self.evaluate_position_at(t)?,
                self.evaluate_velocity_at(t)?,
                self.evaluate_acceleration_at(t)?,
            ]);
            if t >= end {
                break;
            }
            i += 1;
        }
        Ok(rows)
    }

    // ---- structural edits ----

    /// Set the profile start state and re-chain every segment from it.
    pub fn set_initial_conditions(&mut self, position: f64, velocity: f64) -> Result<()> {
        let before = InitialConditions {
            position: self.initial_position,
            velocity: self.initial_velocity,
        };
        let after = InitialConditions { position, velocity };
        self.apply_initial_conditions(after)?;
        self.history.record(Command::SetInitialConditions { before, after });
        Ok(())
    }

    fn apply_initial_conditions(&mut self, conditions: InitialConditions) -> Result<()> {
        let previous = InitialConditions {
            position: self.initial_position,
            velocity: self.initial_velocity,
        };
        let first = self.segments.first_segment().map(Segment::id);
        let result = self.with_rollback(first, |profile| {
            profile.initial_position = conditions.position;
            profile.initial_velocity = conditions.velocity;
            profile.recalculate_profile_segments(first).map(|_| ())
        });
        if result.is_err() {
            self.initial_position = previous.position;
            self.initial_velocity = previous.velocity;
        }
        result
    }

    /// Run `edit`, which may only touch `start_id` and the segments after it.
    /// If it fails, that tail of the profile is put back as it was.
    fn with_rollback<T>(
        &mut self,
        start_id: Option<SegmentId>,
        edit: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let snapshot = start_id.map(|id| self.snapshot_tail(id));
        let result = edit(self);
        if let (Err(e), Some(snapshot)) = (&result, snapshot) {
            tracing::warn!("Edit failed, restoring {} segments: {}", snapshot.segments.len(), e);
            self.restore_tail(snapshot);
        }
        result
    }

    fn snapshot_tail(&self, start_id: SegmentId) -> TailSnapshot {
        let mut segments = Vec::new();
        let mut cursor = Some(start_id);
        while let Some(id) = cursor {
            if let Some(segment) = self.segments.find_by_id(id) {
                segments.push(segment.clone());
            }
            cursor = self.segments.next_id(id);
        }
        TailSnapshot {
            anchor: self.segments.previous_id(start_id),
            segments,
        }
    }

    fn restore_tail(&mut self, snapshot: TailSnapshot) {
        let mut cursor = match snapshot.anchor {
            Some(anchor) => self.segments.next_id(anchor),
            None => self.segments.first_segment().map(Segment::id),
        };
        while let Some(id) = cursor {
            cursor = self.segments.next_id(id);
            self.segments.delete(id);
        }
        for segment in snapshot.segments {
            if let Err(rejected) = self.segments.push(segment) {
                tracing::error!("Unable to restore segment {}", rejected.id());
            }
        }
    }

    /// Insert `segment` in front of `before_id`. The segment is re-anchored to
    /// its new predecessor and every segment after it is recalculated.
    pub fn insert_segment(&mut self, segment: MotionSegment, before_id: SegmentId) -> Result<SegmentId> {
        let id = self.insert_internal(segment, Some(before_id))?;
        self.history.record(Command::Insert {
            segment_id: id,
            before_id: Some(before_id),
            detached: None,
        });
        Ok(id)
    }

    /// Add `segment` at the end of the profile.
    pub fn append_segment(&mut self, segment: MotionSegment) -> Result<SegmentId> {
        let id = self.insert_internal(segment, None)?;
        self.history.record(Command::Append { segment_id: id, detached: None });
        Ok(id)
    }

    fn insert_internal(&mut self, mut segment: MotionSegment, before_id: Option<SegmentId>) -> Result<SegmentId> {
        let id = segment.id();
        if self.segments.contains(id) {
            return Err(ProfileError::InvalidArgument(format!(
                "segment {} is already part of the profile",
                id
            )));
        }
        if segment.basic_segments().is_empty() {
            return Err(ProfileError::InvalidArgument(format!(
                "segment {} has no basic segments",
                id
            )));
        }

        let start = match before_id {
            Some(before) => {
                if !self.segments.contains(before) {
                    return Err(ProfileError::OperationFailed(format!(
                        "unable to insert before segment {}, it is not in the profile",
                        before
                    )));
                }
                self.start_for(before)?
            }
            None => self.end_state()?,
        };
        segment.modify_initial_values(start.time, start.acceleration, start.velocity, start.position)?;

        self.with_rollback(before_id, |profile| {
            profile
                .segments
                .insert_at(segment, before_id)
                .map_err(|rejected| {
                    ProfileError::OperationFailed(format!("unable to insert segment {}", rejected.id()))
                })?;
            tracing::debug!("Inserted {} segment {} before {:?}", profile.kind_of(id), id, before_id);

            if let Some(next) = before_id {
                profile.recalculate_profile_segments(Some(next))?;
            }
            Ok(id)
        })
    }

    fn kind_of(&self, id: SegmentId) -> &'static str {
        self.segments.find_by_id(id).map_or("unknown", MotionSegment::kind_name)
    }

    /// Remove a segment. The segments after it are re-chained from its
    /// predecessor (or the profile start). Returns a copy of the removed
    /// segment; the undo log keeps the original.
    pub fn delete_segment(&mut self, id: SegmentId) -> Result<MotionSegment> {
        let (removed, before_id) = self.delete_internal(id)?;
        let copy = removed.clone();
        self.history.record(Command::Delete {
            segment_id: id,
            before_id,
            detached: Some(Box::new(removed)),
        });
        Ok(copy)
    }

    fn delete_internal(&mut self, id: SegmentId) -> Result<(MotionSegment, Option<SegmentId>)> {
        if !self.segments.contains(id) {
            return Err(ProfileError::NotFound(format!("unable to find segment with id {}", id)));
        }
        let before_id = self.segments.next_id(id);

        self.with_rollback(Some(id), |profile| {
            let removed = profile
                .segments
                .delete(id)
                .ok_or_else(|| ProfileError::NotFound(format!("unable to find segment with id {}", id)))?;
            tracing::debug!("Deleted {} segment {}", removed.kind_name(), id);

            if before_id.is_some() {
                profile.recalculate_profile_segments(before_id)?;
            }
            Ok((removed, before_id))
        })
    }

    /// Re-derive every segment from `start_id` to the end, each from its
    /// predecessor's final state. Returns the number of segments rebuilt.
    pub fn recalculate_profile_segments(&mut self, start_id: Option<SegmentId>) -> Result<usize> {
        let mut cursor = start_id;
        let mut count = 0;

        while let Some(id) = cursor {
            let start = self.start_for(id)?;
            let segment = self
                .segments
                .find_by_id_mut(id)
                .ok_or_else(|| ProfileError::NotFound(format!("unable to find segment with id {}", id)))?;
            segment.modify_initial_values(start.time, start.acceleration, start.velocity, start.position)?;
            count += 1;
            cursor = self.segments.next_id(id);
        }

        if count > 0 {
            tracing::trace!("Recalculated {} segments", count);
        }
        Ok(count)
    }

    /// Edit the user values of a segment, then re-chain the segments after it.
    pub fn modify_segment_values(
        &mut self,
        id: SegmentId,
        update: &SegmentUpdate,
        initial_conditions: InitialConditions,
    ) -> Result<()> {
        if !self.segments.contains(id) {
            return Err(ProfileError::NotFound(format!("unable to find segment with id {}", id)));
        }

        let (before, after) = self.with_rollback(Some(id), |profile| {
            let segment = profile
                .segments
                .find_by_id_mut(id)
                .ok_or_else(|| ProfileError::NotFound(format!("unable to find segment with id {}", id)))?;
            let before = segment.segment_data();
            segment.modify_segment_values(update, initial_conditions)?;
            let after = segment.segment_data();
            tracing::debug!("Modified {} segment {}", segment.kind_name(), id);

            let next = profile.segments.next_id(id);
            profile.recalculate_profile_segments(next)?;
            Ok((before, after))
        })?;

        self.history.record(Command::Modify {
            segment_id: id,
            before,
            after,
            initial_conditions,
        });
        Ok(())
    }

    fn restore_segment(&mut self, id: SegmentId, data: SegmentData, start: KinematicValues) -> Result<()> {
        if !self.segments.contains(id) {
            return Err(ProfileError::NotFound(format!("unable to find segment with id {}", id)));
        }
        self.with_rollback(Some(id), |profile| {
            let segment = profile
                .segments
                .find_by_id_mut(id)
                .ok_or_else(|| ProfileError::NotFound(format!("unable to find segment with id {}", id)))?;
            segment.restore_segment_data(data, start)?;
            let next = profile.segments.next_id(id);
            profile.recalculate_profile_segments(next).map(|_| ())
        })
    }

    // ---- loads ----

    /// Build a load segment, checking its type against the profile type.
    pub fn create_load_segment(
        &self,
        load_type: LoadType,
        t0: f64,
        tf: f64,
        initial_load: f64,
        final_load: f64,
    ) -> Result<LoadSegment> {
        if !load_type.is_valid_for(self.profile_type) {
            return Err(ProfileError::InvalidArgument(format!(
                "load type '{}' is not valid for {} profiles",
                load_type, self.profile_type
            )));
        }
        LoadSegment::new(load_type, t0, tf, initial_load, final_load)
    }

    fn load_stash(&self, load_type: LoadType) -> Result<&Stash<LoadSegment>> {
        self.loads.get(&load_type).ok_or_else(|| {
            ProfileError::InvalidArgument(format!(
                "load type '{}' is not a valid load type for {} profiles",
                load_type, self.profile_type
            ))
        })
    }

    fn load_stash_mut(&mut self, load_type: LoadType) -> Result<&mut Stash<LoadSegment>> {
        let profile_type = self.profile_type;
        self.loads.get_mut(&load_type).ok_or_else(|| {
            ProfileError::InvalidArgument(format!(
                "load type '{}' is not a valid load type for {} profiles",
                load_type, profile_type
            ))
        })
    }

    pub fn add_load_segment(&mut self, load: LoadSegment) -> Result<()> {
        self.add_load_internal(load.clone())?;
        self.history.record(Command::AddLoad { load });
        Ok(())
    }

    fn add_load_internal(&mut self, load: LoadSegment) -> Result<()> {
        let stash = self.load_stash_mut(load.load_type())?;
        if stash
            .find_overlapping_segment(load.initial_time(), load.final_time())
            .is_some()
        {
            return Err(ProfileError::Overlap(format!(
                "new {} segment overlaps an existing segment",
                load.load_type()
            )));
        }
        // only one segment per load type is supported
        if !stash.is_empty() {
            return Err(ProfileError::OperationFailed(
                "currently, only one segment per type can be added".to_string(),
            ));
        }

        let before = stash
            .get_previous_by_initial_time(load.initial_time())
            .map(Segment::id);
        let load_type = load.load_type();
        let id = stash.insert_at(load, before).map_err(|rejected| {
            ProfileError::OperationFailed(format!("unable to add load segment {}", rejected.id()))
        })?;
        tracing::debug!("Added {} load segment {}", load_type, id);
        Ok(())
    }

    /// Delete a load segment. Passing its type narrows the search.
    pub fn delete_load_segment(&mut self, id: SegmentId, load_type: Option<LoadType>) -> Result<LoadSegment> {
        let removed = self.delete_load_internal(id, load_type)?;
        self.history.record(Command::DeleteLoad { load: removed.clone() });
        Ok(removed)
    }

    fn delete_load_internal(&mut self, id: SegmentId, load_type: Option<LoadType>) -> Result<LoadSegment> {
        let removed = match load_type {
            Some(load_type) => self.load_stash_mut(load_type)?.delete(id),
            None => self.loads.values_mut().find_map(|stash| stash.delete(id)),
        };
        removed.ok_or_else(|| ProfileError::NotFound(format!("unable to find load segment with id {}", id)))
    }

    /// Replace load segment `id` with `replacement`, which must have the same type.
    pub fn modify_load_segment(&mut self, id: SegmentId, replacement: LoadSegment) -> Result<()> {
        let load_type = replacement.load_type();
        let old = self
            .load_stash(load_type)?
            .find_by_id(id)
            .cloned()
            .ok_or_else(|| {
                ProfileError::NotFound(format!(
                    "unable to find {} load segment with id {}",
                    load_type, id
                ))
            })?;

        self.replace_load(&old, replacement.clone())?;
        self.history.record(Command::ModifyLoad { old, new: replacement });
        Ok(())
    }

    /// Swap `current` out for `replacement`, putting `current` back if the
    /// replacement is rejected.
    fn replace_load(&mut self, current: &LoadSegment, replacement: LoadSegment) -> Result<()> {
        self.delete_load_internal(current.id(), Some(current.load_type()))?;
        if let Err(e) = self.add_load_internal(replacement) {
            self.add_load_internal(current.clone())?;
            return Err(e);
        }
        Ok(())
    }

    pub fn get_all_load_segments(&self, load_type: LoadType) -> Result<Vec<&LoadSegment>> {
        Ok(self.load_stash(load_type)?.get_all_segments())
    }

    // ---- undo / redo ----

    pub fn undo(&mut self) -> Result<()> {
        let mut command = self.history.pop_undo()?;
        tracing::debug!("Undo {}", command.name());
        match self.revert(&mut command) {
            Ok(()) => {
                self.history.push_redo(command);
                Ok(())
            }
            Err(e) => {
                self.history.push_undo(command);
                Err(e)
            }
        }
    }

    pub fn redo(&mut self) -> Result<()> {
        let mut command = self.history.pop_redo()?;
        tracing::debug!("Redo {}", command.name());
        match self.replay(&mut command) {
            Ok(()) => {
                self.history.push_undo(command);
                Ok(())
            }
            Err(e) => {
                self.history.push_redo(command);
                Err(e)
            }
        }
    }

    fn take_detached(detached: &mut Option<Box<MotionSegment>>) -> Result<MotionSegment> {
        detached
            .take()
            .map(|seg| *seg)
            .ok_or_else(|| ProfileError::OperationFailed("history entry holds no segment".to_string()))
    }

    fn revert(&mut self, command: &mut Command) -> Result<()> {
        match command {
            Command::Insert { segment_id, detached, .. } | Command::Append { segment_id, detached } => {
                let (removed, _) = self.delete_internal(*segment_id)?;
                *detached = Some(Box::new(removed));
            }
            Command::Delete { before_id, detached, .. } => {
                let segment = Self::take_detached(detached)?;
                let restore = segment.clone();
                if let Err(e) = self.insert_internal(segment, *before_id) {
                    *detached = Some(Box::new(restore));
                    return Err(e);
                }
            }
            Command::Modify { segment_id, before, .. } => {
                let start = self.start_for(*segment_id)?;
                self.restore_segment(*segment_id, before.clone(), start)?;
            }
            Command::SetInitialConditions { before, .. } => {
                self.apply_initial_conditions(*before)?;
            }
            Command::AddLoad { load } => {
                self.delete_load_internal(load.id(), Some(load.load_type()))?;
            }
            Command::DeleteLoad { load } => {
                self.add_load_internal(load.clone())?;
            }
            Command::ModifyLoad { old, new } => {
                self.replace_load(new, old.clone())?;
            }
        }
        Ok(())
    }

    fn replay(&mut self, command: &mut Command) -> Result<()> {
        match command {
            Command::Insert { before_id, detached, .. } => {
                let segment = Self::take_detached(detached)?;
                let restore = segment.clone();
                if let Err(e) = self.insert_internal(segment, *before_id) {
                    *detached = Some(Box::new(restore));
                    return Err(e);
                }
            }
            Command::Append { detached, .. } => {
                let segment = Self::take_detached(detached)?;
                let restore = segment.clone();
                if let Err(e) = self.insert_internal(segment, None) {
                    *detached = Some(Box::new(restore));
                    return Err(e);
                }
            }
            Command::Delete { segment_id, detached, .. } => {
                let (removed, _) = self.delete_internal(*segment_id)?;
                *detached = Some(Box::new(removed));
            }
            Command::Modify {
                segment_id,
                after,
                initial_conditions,
                ..
            } => {
                let t0 = self
                    .segments
                    .find_by_id(*segment_id)
                    .map(Segment::initial_time)
                    .ok_or_else(|| ProfileError::NotFound(format!("unable to find segment with id {}", segment_id)))?;
                let start = KinematicValues::new(t0, 0.0, initial_conditions.velocity, initial_conditions.position);
                self.restore_segment(*segment_id, after.clone(), start)?;
            }
            Command::SetInitialConditions { after, .. } => {
                self.apply_initial_conditions(*after)?;
            }
            Command::AddLoad { load } => {
                self.add_load_internal(load.clone())?;
            }
            Command::DeleteLoad { load } => {
                self.delete_load_internal(load.id(), Some(load.load_type()))?;
            }
            Command::ModifyLoad { old, new } => {
                self.replace_load(old, new.clone())?;
            }
        }
        Ok(())
    }
}
