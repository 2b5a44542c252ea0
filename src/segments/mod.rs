// src/segments/mod.rs - Segment kinds and the shared identity/timing trait
use std::sync::atomic::{AtomicU64, Ordering};

pub mod accel;
pub mod basic;
pub mod builder;
pub mod data;
pub mod index;
pub mod load;
pub mod motion;
pub mod stash;

pub use accel::{AccelSegmentTimeDistance, AccelSegmentTimeVelocity};
pub use basic::BasicSegment;
pub use data::{SegmentData, SegmentLoads, SegmentMode};
pub use index::IndexSegment;
pub use load::{LoadSegment, LoadType};
pub use motion::{CompositeSegment, InitialConditions, KinematicValues, MotionSegment};
pub use stash::Stash;

/// Process-unique segment identity. Only uniqueness matters; ordering in a
/// profile comes from the stash, never from id values.
pub type SegmentId = u64;

static NEXT_SEGMENT_ID: AtomicU64 = AtomicU64::new(1);

pub fn next_segment_id() -> SegmentId {
    NEXT_SEGMENT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Anything that can live in a [`Stash`]: it has an identity and a time span.
pub trait Segment {
    fn id(&self) -> SegmentId;
    fn initial_time(&self) -> f64;
    fn final_time(&self) -> f64;
}
