// src/profile/helper.rs - Continuity checks over flattened basic segments
use crate::error::{ProfileError, Result};
use crate::segments::{BasicSegment, Segment};
use crate::util::fast_math;

/// Check that `segments` form a continuous chain: every segment has a
/// positive span, and each one starts at the time, position and velocity the
/// previous one ends on.
///
/// Returns `Ok(true)` when the chain is continuous.
pub fn validate_segments(segments: &[&BasicSegment]) -> Result<bool> {
    let mut previous: Option<&BasicSegment> = None;

    for (i, seg) in segments.iter().enumerate() {
        let (t0, tf) = (seg.initial_time(), seg.final_time());
        if fast_math::equal(t0, tf) {
            return Err(ProfileError::InvalidArgument(format!(
                "segment {} starts and ends at the same time {}",
                i, t0
            )));
        }
        if t0 > tf {
            return Err(ProfileError::InvalidArgument(format!(
                "segment {} starts at {} after it ends at {}",
                i, t0, tf
            )));
        }

        if let Some(prev) = previous {
            if fast_math::not_equal(prev.final_time(), t0) {
                return Err(ProfileError::InvalidArgument(format!(
                    "segment {} starts at {}, previous segment ends at {}",
                    i,
                    t0,
                    prev.final_time()
                )));
            }
            if fast_math::not_equal(prev.final_velocity(), seg.initial_velocity()) {
                return Err(ProfileError::InvalidArgument(format!(
                    "velocity jumps from {} to {} at segment {}",
                    prev.final_velocity(),
                    seg.initial_velocity(),
                    i
                )));
            }
            if fast_math::not_equal(prev.final_position(), seg.initial_position()) {
                return Err(ProfileError::InvalidArgument(format!(
                    "position jumps from {} to {} at segment {}",
                    prev.final_position(),
                    seg.initial_position(),
                    i
                )));
            }
        }
        previous = Some(seg);
    }

    Ok(true)
}
