// src/segments/builder.rs - Jerk-limited acceleration ramps
//
// A ramp spends `jerk_percent` of its duration changing acceleration and the
// rest holding it. Three closed forms cover the range:
//   jerk_percent == 0      one constant-acceleration piece
//   jerk_percent == 1      jerk up over the first half, jerk down over the second
//   0 < jerk_percent < 1   jerk up, constant acceleration coast, jerk down
// Each piece starts from the position and velocity its predecessor ends on.
use crate::error::{ProfileError, Result};
use crate::segments::basic::BasicSegment;
use crate::segments::data::SegmentLoads;
use crate::util::fast_math;

pub fn check_jerk_percent(name: &str, jerk_percent: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&jerk_percent) {
        return Err(ProfileError::InvalidArgument(format!(
            "expecting {} between <0,1>, got {}",
            name, jerk_percent
        )));
    }
    Ok(())
}

/// Phase durations `(jerk_up, coast, jerk_down)` for a ramp of length `duration`.
fn phase_durations(duration: f64, jerk_percent: f64) -> (f64, f64, f64) {
    let t1 = 0.5 * jerk_percent * duration;
    (t1, duration - 2.0 * t1, t1)
}

/// Ramp from `v0` to `vf` over `[t0, tf]`.
pub fn velocity_ramp(
    t0: f64,
    tf: f64,
    p0: f64,
    v0: f64,
    vf: f64,
    jerk_percent: f64,
    loads: SegmentLoads,
) -> Result<Vec<BasicSegment>> {
    check_jerk_percent("jerk percent", jerk_percent)?;
    let (t1, tm, _) = phase_durations(tf - t0, jerk_percent);
    // change in velocity is the area under the acceleration curve
    let a_max = (vf - v0) / (t1 + tm);
    ramp(t0, tf, p0, v0, a_max, jerk_percent, loads)
}

/// Ramp starting at `(p0, v0)` that arrives at `pf` at `tf`.
pub fn distance_ramp(
    t0: f64,
    tf: f64,
    p0: f64,
    v0: f64,
    pf: f64,
    jerk_percent: f64,
    loads: SegmentLoads,
) -> Result<Vec<BasicSegment>> {
    check_jerk_percent("jerk percent", jerk_percent)?;
    let duration = tf - t0;
    let (t1, tm, t2) = phase_durations(duration, jerk_percent);

    // distance beyond v0 * duration, per unit of peak acceleration
    let per_unit_accel = fast_math::sqr(t1) / 6.0
        + 0.5 * t1 * tm
        + 0.5 * fast_math::sqr(tm)
        + 0.5 * t1 * t2
        + tm * t2
        + fast_math::sqr(t2) / 3.0;
    if per_unit_accel <= 0.0 {
        return Err(ProfileError::InvalidArgument(format!(
            "ramp duration must be positive, got {}",
            duration
        )));
    }
    let a_max = (pf - p0 - v0 * duration) / per_unit_accel;
    ramp(t0, tf, p0, v0, a_max, jerk_percent, loads)
}

fn ramp(
    t0: f64,
    tf: f64,
    p0: f64,
    v0: f64,
    a_max: f64,
    jerk_percent: f64,
    loads: SegmentLoads,
) -> Result<Vec<BasicSegment>> {
    let duration = tf - t0;
    let (t1, tm, _) = phase_durations(duration, jerk_percent);
    let ta = t0 + t1;
    let tb = ta + tm;

    // phases too short to show up on the time axis are dropped
    let jerk_phases = fast_math::gt(ta, t0) && fast_math::gt(tf, tb);
    let coast_phase = fast_math::gt(tb, ta);

    if jerk_percent == 0.0 || !jerk_phases {
        let only = BasicSegment::new(t0, tf, &[0.0, 0.5 * a_max, v0, p0], Some(loads))?;
        return Ok(vec![only]);
    }

    if jerk_percent == 1.0 || !coast_phase {
        let th = duration / 2.0;
        let jerk = a_max / th;
        let t_mid = t0 + th;

        let first = BasicSegment::new(t0, t_mid, &[jerk / 6.0, 0.0, v0, p0], Some(loads))?;
        let second = BasicSegment::new(
            t_mid,
            tf,
            &[
                -jerk / 6.0,
                0.5 * a_max,
                first.evaluate_velocity_at(t_mid)?,
                first.evaluate_position_at(t_mid)?,
            ],
            Some(loads),
        )?;
        return Ok(vec![first, second]);
    }

    let jerk = a_max / t1;

    let first = BasicSegment::new(t0, ta, &[jerk / 6.0, 0.0, v0, p0], Some(loads))?;
    // coast phase has no jerk
    let coast = BasicSegment::new(
        ta,
        tb,
        &[0.0, 0.5 * a_max, first.evaluate_velocity_at(ta)?, first.evaluate_position_at(ta)?],
        Some(loads),
    )?;
    let last = BasicSegment::new(
        tb,
        tf,
        &[-jerk / 6.0, 0.5 * a_max, coast.evaluate_velocity_at(tb)?, coast.evaluate_position_at(tb)?],
        Some(loads),
    )?;

    Ok(vec![first, coast, last])
}
