// Integration tests for motion profile editing and queries

#[cfg(test)]
mod tests {
    use motion_profile::{
        validate_segments, AccelSegmentTimeDistance, AccelSegmentTimeVelocity, CompositeSegment, IndexSegmentParams,
        IndexShape, InitialConditions, MotionProfile, MotionSegment, ProfileError, ProfileType, Segment, SegmentId,
        SegmentLoads, SegmentMode, SegmentUpdate, TimeDistanceUpdate, TimeVelocityUpdate, create_index_segment,
        IndexUpdate,
    };

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-4,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    fn tv(t0: f64, tf: f64, v0: f64, vf: f64) -> MotionSegment {
        AccelSegmentTimeVelocity::new(t0, tf, 0.0, v0, vf, 0.5, SegmentMode::Incremental, None)
            .unwrap()
            .into()
    }

    /// 0..2 up to 10, 2..3 down to 7.5, 3..5 down to 3, 5..8 down to 0
    fn four_segment_profile() -> (MotionProfile, Vec<u64>) {
        let mut profile = MotionProfile::new(ProfileType::Rotary);
        let ids = vec![
            profile.append_segment(tv(0.0, 2.0, 0.0, 10.0)).unwrap(),
            profile.append_segment(tv(2.0, 3.0, 10.0, 7.5)).unwrap(),
            profile.append_segment(tv(3.0, 5.0, 7.5, 3.0)).unwrap(),
            profile.append_segment(tv(5.0, 8.0, 3.0, 0.0)).unwrap(),
        ];
        (profile, ids)
    }

    fn assert_continuous(profile: &MotionProfile) {
        assert!(validate_segments(&profile.get_all_basic_segments()).unwrap());
    }

    #[test]
    fn test_append_builds_continuous_profile() {
        let (profile, ids) = four_segment_profile();
        assert_eq!(profile.count_segments(), 4);
        assert_eq!(profile.duration(), 8.0);
        assert_eq!(profile.get_all_basic_segments().len(), 12);
        assert_continuous(&profile);

        assert_close(profile.evaluate_position_at(3.0).unwrap(), 18.75);
        assert_close(profile.evaluate_position_at(5.0).unwrap(), 29.25);
        assert_close(profile.evaluate_position_at(8.0).unwrap(), 33.75);
        assert_close(profile.evaluate_velocity_at(8.0).unwrap(), 0.0);

        assert_eq!(profile.first_segment().unwrap().id(), ids[0]);
        assert_eq!(profile.last_segment().unwrap().id(), ids[3]);
        assert_eq!(profile.get_next_segment(ids[1]).unwrap().id(), ids[2]);
        assert_eq!(profile.get_previous_segment(ids[1]).unwrap().id(), ids[0]);
    }

    #[test]
    fn test_delete_first_segment_rechains_from_start() {
        let (mut profile, ids) = four_segment_profile();
        let removed = profile.delete_segment(ids[0]).unwrap();
        assert_eq!(removed.id(), ids[0]);
        assert_eq!(profile.count_segments(), 3);

        // each remaining segment keeps its duration and velocity change
        let first = profile.first_segment().unwrap();
        assert_eq!(first.id(), ids[1]);
        assert_eq!(first.initial_time(), 0.0);
        assert_eq!(first.final_time(), 1.0);
        assert_close(profile.evaluate_position_at(0.5).unwrap(), -0.243_055_6);
        assert_close(profile.evaluate_velocity_at(1.0).unwrap(), -2.5);
        assert_close(profile.evaluate_position_at(3.0).unwrap(), -10.75);
        assert_close(profile.evaluate_position_at(6.0).unwrap(), -36.25);
        assert_eq!(profile.duration(), 6.0);
        assert_continuous(&profile);
    }

    #[test]
    fn test_delete_first_of_zero_based_deltas() {
        let mut profile = MotionProfile::new(ProfileType::Rotary);
        let first = profile.append_segment(tv(0.0, 2.0, 0.0, 10.0)).unwrap();
        profile.append_segment(tv(2.0, 3.0, 0.0, 7.5)).unwrap();
        profile.append_segment(tv(3.0, 5.0, 0.0, 3.0)).unwrap();
        profile.append_segment(tv(5.0, 8.0, 0.0, 0.0)).unwrap();

        profile.delete_segment(first).unwrap();
        assert_eq!(profile.count_segments(), 3);
        let seg = profile.first_segment().unwrap();
        assert_eq!(seg.initial_time(), 0.0);
        assert_eq!(seg.final_time(), 1.0);
        assert_close(profile.evaluate_position_at(0.5).unwrap(), 0.729_166_7);
        assert_continuous(&profile);
    }

    #[test]
    fn test_delete_middle_and_last_segments() {
        let (mut profile, ids) = four_segment_profile();
        profile.delete_segment(ids[1]).unwrap();
        assert_close(profile.evaluate_position_at(0.5).unwrap(), 0.277_777);
        assert_close(profile.evaluate_position_at(4.0).unwrap(), 25.5);
        assert_close(profile.evaluate_position_at(7.0).unwrap(), 37.5);
        assert_continuous(&profile);

        profile.delete_segment(ids[3]).unwrap();
        assert_eq!(profile.count_segments(), 2);
        assert_eq!(profile.duration(), 4.0);
        assert_close(profile.evaluate_position_at(0.5).unwrap(), 0.277_777);
        assert_continuous(&profile);
    }

    #[test]
    fn test_delete_unknown_segment() {
        let (mut profile, _) = four_segment_profile();
        assert!(matches!(profile.delete_segment(u64::MAX), Err(ProfileError::NotFound(_))));
        assert_eq!(profile.count_segments(), 4);
    }

    #[test]
    fn test_insert_before_shifts_successors() {
        let (mut profile, ids) = four_segment_profile();
        let inserted = profile.insert_segment(tv(0.0, 1.0, 0.0, 2.0), ids[1]).unwrap();

        let seg = profile.find_by_id(inserted).unwrap();
        assert_eq!(seg.initial_time(), 2.0);
        assert_eq!(seg.final_time(), 3.0);
        assert_close(profile.evaluate_velocity_at(3.0).unwrap(), 12.0);
        assert_eq!(profile.get_next_segment(inserted).unwrap().id(), ids[1]);
        assert_eq!(profile.find_by_id(ids[1]).unwrap().initial_time(), 3.0);
        assert_eq!(profile.duration(), 9.0);
        assert_continuous(&profile);
    }

    #[test]
    fn test_insert_before_unknown_segment_fails() {
        let (mut profile, _) = four_segment_profile();
        let result = profile.insert_segment(tv(0.0, 1.0, 0.0, 2.0), u64::MAX);
        assert!(matches!(result, Err(ProfileError::OperationFailed(_))));
        assert_eq!(profile.count_segments(), 4);
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let (mut profile, ids) = four_segment_profile();
        let copy = profile.find_by_id(ids[2]).unwrap().clone();
        assert!(matches!(profile.append_segment(copy), Err(ProfileError::InvalidArgument(_))));
    }

    #[test]
    fn test_insert_before_first_reanchors_to_initial_conditions() {
        let mut profile = MotionProfile::new(ProfileType::Rotary);
        let first = profile.append_segment(tv(0.0, 2.0, 0.0, 10.0)).unwrap();
        profile.append_segment(tv(2.0, 3.0, 10.0, 7.5)).unwrap();
        profile.set_initial_conditions(5.0, 2.0).unwrap();

        // built with a start state the profile does not have
        let stale = AccelSegmentTimeVelocity::new(7.0, 8.0, -3.0, 9.0, 12.0, 0.5, SegmentMode::Incremental, None)
            .unwrap()
            .into();
        let inserted = profile.insert_segment(stale, first).unwrap();

        let seg = profile.first_segment().unwrap();
        assert_eq!(seg.id(), inserted);
        let start = seg.get_initial_values().unwrap();
        assert_eq!(start.time, 0.0);
        assert_close(start.position, 5.0);
        assert_close(start.velocity, 2.0);
        assert_eq!(seg.final_time(), 1.0);
        assert_close(profile.evaluate_velocity_at(1.0).unwrap(), 5.0);
        assert_eq!(profile.find_by_id(first).unwrap().initial_time(), 1.0);
        assert_continuous(&profile);
    }

    /// Incremental 0..2 up to 10, then an absolute segment ending at t = 3 with v = 5.
    fn profile_with_absolute_end() -> (MotionProfile, SegmentId, SegmentId) {
        let mut profile = MotionProfile::new(ProfileType::Rotary);
        let first = profile.append_segment(tv(0.0, 2.0, 0.0, 10.0)).unwrap();
        let absolute = AccelSegmentTimeVelocity::new(2.0, 3.0, 0.0, 10.0, 5.0, 0.5, SegmentMode::Absolute, None)
            .unwrap()
            .into();
        let last = profile.append_segment(absolute).unwrap();
        (profile, first, last)
    }

    #[test]
    fn test_edits_around_absolute_segment() {
        let (mut profile, first, last) = profile_with_absolute_end();
        assert_eq!(profile.duration(), 3.0);

        let inserted = profile.insert_segment(tv(0.0, 0.5, 0.0, 1.0), last).unwrap();
        assert_eq!(profile.find_by_id(inserted).unwrap().initial_time(), 2.0);
        // the absolute segment keeps its end time and final velocity
        assert_eq!(profile.find_by_id(last).unwrap().initial_time(), 2.5);
        assert_eq!(profile.duration(), 3.0);
        assert_close(profile.evaluate_velocity_at(3.0).unwrap(), 5.0);
        assert_continuous(&profile);

        profile.undo().unwrap();
        assert_eq!(profile.find_by_id(last).unwrap().initial_time(), 2.0);
        assert_continuous(&profile);

        profile.delete_segment(first).unwrap();
        let seg = profile.find_by_id(last).unwrap();
        assert_eq!(seg.initial_time(), 0.0);
        assert_eq!(seg.final_time(), 3.0);
        assert_close(profile.evaluate_velocity_at(3.0).unwrap(), 5.0);
        assert_continuous(&profile);
    }

    #[test]
    fn test_failed_insert_leaves_profile_untouched() {
        let (mut profile, first, last) = profile_with_absolute_end();
        let undo_before = profile.history().undo_len();

        // pushes the absolute segment's start past its end time
        let result = profile.insert_segment(tv(0.0, 2.0, 0.0, 1.0), last);
        assert!(matches!(result, Err(ProfileError::InvalidArgument(_))));

        let ids: Vec<SegmentId> = profile.get_all_segments().iter().map(|seg| seg.id()).collect();
        assert_eq!(ids, vec![first, last]);
        assert_eq!(profile.history().undo_len(), undo_before);
        assert_eq!(profile.duration(), 3.0);
        assert_eq!(profile.find_by_id(last).unwrap().initial_time(), 2.0);
        assert_close(profile.evaluate_velocity_at(3.0).unwrap(), 5.0);
        assert_continuous(&profile);

        // history still lines up with the profile
        profile.undo().unwrap();
        assert_eq!(profile.count_segments(), 1);
    }

    #[test]
    fn test_failed_modify_leaves_profile_untouched() {
        let (mut profile, first, last) = profile_with_absolute_end();
        let undo_before = profile.history().undo_len();
        let before = profile.sample(0.25).unwrap();

        let update = SegmentUpdate::TimeVelocity(TimeVelocityUpdate { duration: Some(4.0), ..Default::default() });
        let result = profile.modify_segment_values(first, &update, InitialConditions::default());
        assert!(matches!(result, Err(ProfileError::InvalidArgument(_))));

        assert_eq!(profile.history().undo_len(), undo_before);
        assert_eq!(profile.find_by_id(first).unwrap().final_time(), 2.0);
        assert_eq!(profile.find_by_id(last).unwrap().initial_time(), 2.0);
        let after = profile.sample(0.25).unwrap();
        assert_eq!(after.len(), before.len());
        for (a, b) in after.iter().zip(&before) {
            for k in 0..4 {
                assert_close(a[k], b[k]);
            }
        }
        assert_continuous(&profile);
    }

    #[test]
    fn test_get_existing_segment() {
        let mut profile = MotionProfile::new(ProfileType::Linear);
        profile.append_segment(tv(0.0, 2.0, 0.0, 5.0)).unwrap();
        profile.append_segment(tv(2.0, 4.0, 5.0, 0.0)).unwrap();

        let half_eps = f64::EPSILON / 2.0;
        assert!(profile.get_existing_segment(0.0).is_some());
        assert!(profile.get_existing_segment(half_eps).is_some());
        assert!(profile.get_existing_segment(-half_eps).is_some());
        assert_eq!(profile.get_existing_segment(2.0 + half_eps).unwrap().initial_time(), 2.0);
        assert!(profile.get_existing_segment(1.0).is_none());
        assert!(profile.get_existing_segment(3.0).is_none());
    }

    #[test]
    fn test_find_parent_by_child_id() {
        let (profile, ids) = four_segment_profile();
        let third = profile.find_by_id(ids[2]).unwrap();
        let child = third.get_all_segments()[1].id();
        assert_eq!(profile.find_parent_segment_by_child_id(child).unwrap().id(), ids[2]);
        assert!(profile.find_parent_segment_by_child_id(u64::MAX).is_none());
    }

    #[test]
    fn test_set_initial_conditions_shifts_everything() {
        let (mut profile, _) = four_segment_profile();
        profile.set_initial_conditions(5.0, 0.0).unwrap();
        assert_close(profile.evaluate_position_at(0.0).unwrap(), 5.0);
        assert_close(profile.evaluate_position_at(8.0).unwrap(), 38.75);
        assert_continuous(&profile);
    }

    #[test]
    fn test_modify_time_distance_values() {
        let mut profile = MotionProfile::new(ProfileType::Rotary);
        let id = profile
            .append_segment(
                AccelSegmentTimeDistance::new(0.0, 2.0, 0.0, 0.0, 5.0, 0.5, SegmentMode::Incremental, None)
                    .unwrap()
                    .into(),
            )
            .unwrap();
        let update = SegmentUpdate::TimeDistance(TimeDistanceUpdate { distance: Some(2.5), ..Default::default() });
        profile.modify_segment_values(id, &update, InitialConditions::default()).unwrap();
        assert_close(profile.evaluate_position_at(2.0).unwrap(), 2.5);
        assert_close(profile.evaluate_velocity_at(2.0).unwrap(), 2.5);
    }

    #[test]
    fn test_modify_rechains_successors() {
        let (mut profile, ids) = four_segment_profile();
        let update = SegmentUpdate::TimeVelocity(TimeVelocityUpdate {
            final_velocity: Some(5.0),
            ..Default::default()
        });
        profile.modify_segment_values(ids[0], &update, InitialConditions::default()).unwrap();

        assert_close(profile.evaluate_velocity_at(2.0).unwrap(), 5.0);
        // the next segment keeps its -2.5 velocity change from the new end state
        assert_close(profile.evaluate_velocity_at(3.0).unwrap(), 2.5);
        assert_continuous(&profile);
    }

    #[test]
    fn test_modify_unknown_segment() {
        let (mut profile, _) = four_segment_profile();
        let update = SegmentUpdate::TimeVelocity(TimeVelocityUpdate::default());
        assert!(matches!(
            profile.modify_segment_values(u64::MAX, &update, InitialConditions::default()),
            Err(ProfileError::NotFound(_))
        ));
    }

    #[test]
    fn test_mixed_segment_kinds() {
        let mut profile = MotionProfile::new(ProfileType::Linear);
        profile.append_segment(tv(0.0, 1.0, 0.0, 1.0)).unwrap();
        let index = create_index_segment(&IndexSegmentParams {
            t0: 0.0,
            tf: 2.0,
            p0: 0.0,
            pf: 4.0,
            v: 1.0,
            vel_lim_pos: None,
            vel_lim_neg: None,
            acc_jerk: 0.5,
            dec_jerk: 0.5,
            x_skew: None,
            y_skew: None,
            shape: IndexShape::Trapezoid,
            mode: SegmentMode::Incremental,
            loads: SegmentLoads::default(),
        })
        .unwrap();
        let index_id = profile.append_segment(index).unwrap();

        let seg = profile.find_by_id(index_id).unwrap();
        assert_eq!(seg.kind_name(), "index");
        assert_eq!(seg.initial_time(), 1.0);
        assert_eq!(profile.duration(), 3.0);
        assert_close(profile.evaluate_position_at(3.0).unwrap(), 4.5);
        assert_close(profile.evaluate_velocity_at(3.0).unwrap(), 1.0);
        assert_continuous(&profile);

        let update = SegmentUpdate::Index(IndexUpdate { final_position: Some(2.5), ..Default::default() });
        let ic = InitialConditions { position: 0.5, velocity: 1.0 };
        profile.modify_segment_values(index_id, &update, ic).unwrap();
        assert_close(profile.evaluate_position_at(3.0).unwrap(), 2.5);
        assert_continuous(&profile);
    }

    #[test]
    fn test_times_at_position() {
        let (profile, _) = four_segment_profile();
        let times = profile.times_at_position(18.75);
        assert_eq!(times.len(), 1);
        assert_close(times[0], 3.0);
        assert!(profile.times_at_position(100.0).is_empty());
    }

    #[test]
    fn test_evaluate_outside_profile() {
        let (profile, _) = four_segment_profile();
        assert!(matches!(profile.evaluate_position_at(9.0), Err(ProfileError::NotFound(_))));
        assert!(profile.evaluate_jerk_at(1.0).is_ok());
        assert!(profile.evaluate_acceleration_at(-1.0).is_err());
    }
}
