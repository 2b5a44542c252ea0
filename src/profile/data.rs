// src/profile/data.rs - Flat profile data for export and reconstruction
use serde::{Deserialize, Serialize};

use crate::config::ProfileConfig;
use crate::error::Result;
use crate::profile::{MotionProfile, ProfileType};
use crate::segments::load::LoadSegmentData;
use crate::segments::{CompositeSegment, LoadSegment, MotionSegment, SegmentData};

/// Everything needed to rebuild a profile: the start state, the ordered
/// segment parameterizations and the load segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileData {
    pub profile_type: ProfileType,
    #[serde(default)]
    pub initial_position: f64,
    #[serde(default)]
    pub initial_velocity: f64,
    #[serde(default)]
    pub segments: Vec<SegmentData>,
    #[serde(default)]
    pub loads: Vec<LoadSegmentData>,
}

impl ProfileData {
    pub fn new(profile_type: ProfileType) -> Self {
        Self {
            profile_type,
            initial_position: 0.0,
            initial_velocity: 0.0,
            segments: Vec::new(),
            loads: Vec::new(),
        }
    }
}

impl MotionProfile {
    pub fn export_data(&self) -> ProfileData {
        ProfileData {
            profile_type: self.profile_type,
            initial_position: self.initial_position,
            initial_velocity: self.initial_velocity,
            segments: self.segments.iter().map(|seg| seg.segment_data()).collect(),
            loads: self
                .loads
                .values()
                .flat_map(|stash| stash.iter().map(LoadSegment::data))
                .collect(),
        }
    }

    pub fn from_data(data: &ProfileData) -> Result<Self> {
        Self::from_data_with_config(data, &ProfileConfig::default())
    }

    /// Rebuild a profile by appending each segment in order. Continuity is
    /// re-derived, so segment start states stored in `data` are ignored. The
    /// rebuilt profile has an empty history.
    pub fn from_data_with_config(data: &ProfileData, config: &ProfileConfig) -> Result<Self> {
        let mut profile = MotionProfile::with_config(data.profile_type, config);
        profile.initial_position = data.initial_position;
        profile.initial_velocity = data.initial_velocity;

        for segment_data in &data.segments {
            let start = profile.end_state()?;
            let segment = MotionSegment::from_data(segment_data, start)?;
            profile.insert_internal(segment, None)?;
        }
        for load in &data.loads {
            profile.add_load_internal(LoadSegment::from_data(load)?)?;
        }

        tracing::info!(
            "Rebuilt {} profile with {} segments and {} load segments",
            profile.profile_type,
            profile.count_segments(),
            data.loads.len()
        );
        Ok(profile)
    }
}
