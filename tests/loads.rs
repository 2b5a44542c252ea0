// Integration tests for profile load segments

#[cfg(test)]
mod tests {
    use motion_profile::{LoadType, MotionProfile, ProfileError, ProfileType, Segment};

    #[test]
    fn test_add_and_evaluate() {
        let mut profile = MotionProfile::new(ProfileType::Rotary);
        let load = profile.create_load_segment(LoadType::Friction, 2.0, 6.0, 3.0, 4.0).unwrap();
        profile.add_load_segment(load).unwrap();

        let loads = profile.get_all_load_segments(LoadType::Friction).unwrap();
        assert_eq!(loads.len(), 1);
        assert!((loads[0].evaluate_load_at(4.5).unwrap() - 3.625).abs() < 1e-12);
        assert!(profile.get_all_load_segments(LoadType::Inertia).unwrap().is_empty());
    }

    #[test]
    fn test_type_must_match_profile() {
        let profile = MotionProfile::new(ProfileType::Rotary);
        assert!(matches!(
            profile.create_load_segment(LoadType::Mass, 0.0, 1.0, 1.0, 1.0),
            Err(ProfileError::InvalidArgument(_))
        ));
        assert!(profile.get_all_load_segments(LoadType::Force).is_err());
    }

    #[test]
    fn test_overlap_rejected() {
        let mut profile = MotionProfile::new(ProfileType::Rotary);
        let first = profile.create_load_segment(LoadType::Inertia, 0.0, 2.0, 1.0, 1.0).unwrap();
        profile.add_load_segment(first).unwrap();

        let overlapping = profile.create_load_segment(LoadType::Inertia, 1.0, 3.0, 1.0, 1.0).unwrap();
        assert!(matches!(profile.add_load_segment(overlapping), Err(ProfileError::Overlap(_))));
    }

    #[test]
    fn test_one_segment_per_type() {
        let mut profile = MotionProfile::new(ProfileType::Rotary);
        let first = profile.create_load_segment(LoadType::Inertia, 0.0, 2.0, 1.0, 1.0).unwrap();
        profile.add_load_segment(first).unwrap();

        let second = profile.create_load_segment(LoadType::Inertia, 2.0, 3.0, 1.0, 1.0).unwrap();
        assert!(matches!(profile.add_load_segment(second), Err(ProfileError::OperationFailed(_))));

        // other types have their own stash
        let torque = profile.create_load_segment(LoadType::ExternalTorque, 2.0, 3.0, 1.0, 1.0).unwrap();
        profile.add_load_segment(torque).unwrap();
    }

    #[test]
    fn test_delete() {
        let mut profile = MotionProfile::new(ProfileType::Linear);
        let load = profile.create_load_segment(LoadType::Force, 0.0, 1.0, 0.0, 10.0).unwrap();
        let id = load.id();
        profile.add_load_segment(load).unwrap();

        assert!(matches!(
            profile.delete_load_segment(id, Some(LoadType::Mass)),
            Err(ProfileError::NotFound(_))
        ));
        let removed = profile.delete_load_segment(id, Some(LoadType::Force)).unwrap();
        assert_eq!(removed.id(), id);
        assert!(matches!(profile.delete_load_segment(id, None), Err(ProfileError::NotFound(_))));
    }

    #[test]
    fn test_modify_replaces_segment() {
        let mut profile = MotionProfile::new(ProfileType::Linear);
        let load = profile.create_load_segment(LoadType::Mass, 0.0, 2.0, 1.0, 2.0).unwrap();
        let id = load.id();
        profile.add_load_segment(load).unwrap();

        let replacement = profile.create_load_segment(LoadType::Mass, 0.0, 4.0, 1.0, 3.0).unwrap();
        profile.modify_load_segment(id, replacement).unwrap();
        let loads = profile.get_all_load_segments(LoadType::Mass).unwrap();
        assert_eq!(loads[0].final_time(), 4.0);

        let stale = profile.create_load_segment(LoadType::Mass, 0.0, 1.0, 1.0, 1.0).unwrap();
        assert!(matches!(profile.modify_load_segment(id, stale), Err(ProfileError::NotFound(_))));
        assert_eq!(profile.get_all_load_segments(LoadType::Mass).unwrap().len(), 1);
    }
}
