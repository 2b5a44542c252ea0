// src/lib.rs - Piecewise-polynomial motion profiles
pub mod config;
pub mod error;
pub mod profile;
pub mod segments;
pub mod util;

pub use config::{load_document, ConfigError, ProfileConfig, ProfileDocument};
pub use error::{ProfileError, Result};
pub use profile::{validate_segments, Command, History, MotionProfile, ProfileData, ProfileType};
pub use segments::accel::{create_accel_segment, AccelPermutation, AccelSegmentParams};
pub use segments::data::{
    IndexShape, IndexUpdate, SegmentUpdate, TimeDistanceUpdate, TimeVelocityUpdate,
};
pub use segments::index::{create_index_segment, IndexSegmentParams};
pub use segments::load::LoadSegmentData;
pub use segments::{
    AccelSegmentTimeDistance, AccelSegmentTimeVelocity, BasicSegment, CompositeSegment, IndexSegment,
    InitialConditions, KinematicValues, LoadSegment, LoadType, MotionSegment, Segment, SegmentData, SegmentId,
    SegmentLoads, SegmentMode, Stash,
};
pub use util::Polynomial;
