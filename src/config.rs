//! # Profile Settings and Documents
//!
//! A profile document is a TOML (or JSON) file describing a motion profile in
//! its flat form, optionally with a `[settings]` table.
//!
//! ## Example: TOML Document
//!
//! ```toml
//! profile_type = "rotary"
//! initial_position = 0.0
//! initial_velocity = 0.0
//!
//! [settings]
//! history_limit = 50
//!
//! [[segments]]
//! kind = "time-velocity"
//! mode = "incremental"
//! initial_time = 0.0
//! final_time = 2.0
//! initial_velocity = 0.0
//! final_velocity = 10.0
//! duration = 2.0
//! jerk_percent = 0.5
//! ```
//!
//! - `profile_type` falls back to `settings.default_profile_type` when omitted.
//! - Files ending in `.json` are parsed as JSON, everything else as TOML.

// src/config.rs - Profile settings and document loading
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ProfileError;
use crate::profile::{MotionProfile, ProfileData, ProfileType};
use crate::segments::load::LoadSegmentData;
use crate::segments::SegmentData;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),
}

/// Settings applied to profiles built from a document.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProfileConfig {
    /// Maximum undo entries kept, 0 for no limit.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    #[serde(default = "default_profile_type")]
    pub default_profile_type: ProfileType,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            default_profile_type: default_profile_type(),
        }
    }
}

fn default_history_limit() -> usize { 0 }
fn default_profile_type() -> ProfileType { ProfileType::Rotary }

/// A loaded document: settings plus the flat profile.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileDocument {
    pub settings: ProfileConfig,
    pub profile: ProfileData,
}

impl ProfileDocument {
    /// Rebuild the motion profile described by this document.
    pub fn build_profile(&self) -> Result<MotionProfile, ConfigError> {
        Ok(MotionProfile::from_data_with_config(&self.profile, &self.settings)?)
    }
}

/// On-disk shape, where the profile type may be left to the settings.
#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    settings: ProfileConfig,
    #[serde(default)]
    profile_type: Option<ProfileType>,
    #[serde(default)]
    initial_position: f64,
    #[serde(default)]
    initial_velocity: f64,
    #[serde(default)]
    segments: Vec<SegmentData>,
    #[serde(default)]
    loads: Vec<LoadSegmentData>,
}

impl From<RawDocument> for ProfileDocument {
    fn from(raw: RawDocument) -> Self {
        let profile_type = raw.profile_type.unwrap_or(raw.settings.default_profile_type);
        Self {
            profile: ProfileData {
                profile_type,
                initial_position: raw.initial_position,
                initial_velocity: raw.initial_velocity,
                segments: raw.segments,
                loads: raw.loads,
            },
            settings: raw.settings,
        }
    }
}

pub fn parse_toml_document(contents: &str) -> Result<ProfileDocument, ConfigError> {
    let raw: RawDocument = toml::from_str(contents)?;
    Ok(raw.into())
}

pub fn parse_json_document(contents: &str) -> Result<ProfileDocument, ConfigError> {
    let raw: RawDocument = serde_json::from_str(contents)?;
    Ok(raw.into())
}

/// Load a profile document, choosing the parser from the file extension.
pub fn load_document(path: impl AsRef<Path>) -> Result<ProfileDocument, ConfigError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| {
        tracing::error!("Failed to read profile document '{}': {}", path.display(), e);
        ConfigError::Io(e)
    })?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let document = if is_json {
        parse_json_document(&contents)
    } else {
        parse_toml_document(&contents)
    };
    if let Err(e) = &document {
        tracing::error!("Failed to parse profile document '{}': {}", path.display(), e);
    }
    document
}
