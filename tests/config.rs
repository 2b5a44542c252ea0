// Integration tests for profile document loading

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::io::Write;

    use motion_profile::config::{load_document, ConfigError};
    use motion_profile::{validate_segments, ProfileType, SegmentData, SegmentMode};
    use tempfile::tempdir;

    const TOML_DOCUMENT: &str = r#"
profile_type = "rotary"
initial_position = 1.0

[settings]
history_limit = 8

[[segments]]
kind = "time-velocity"
initial_time = 0.0
final_time = 2.0
initial_velocity = 0.0
final_velocity = 10.0
duration = 2.0
jerk_percent = 0.5

[[segments]]
kind = "index"
mode = "absolute"
initial_time = 2.0
final_time = 4.0
duration = 2.0
velocity = 10.0
initial_position = 11.0
final_position = 35.0
acc_jerk = 0.5
dec_jerk = 0.5
shape = "triangle"

[[loads]]
load_type = "FRICTION"
initial_time = 0.0
final_time = 4.0
initial_load = 1.0
final_load = 2.0
"#;

    #[test]
    fn test_load_toml_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("profile.toml");
        let mut file = File::create(&path).unwrap();
        write!(file, "{}", TOML_DOCUMENT).unwrap();

        let doc = load_document(&path).unwrap();
        assert_eq!(doc.settings.history_limit, 8);
        assert_eq!(doc.profile.profile_type, ProfileType::Rotary);
        assert_eq!(doc.profile.segments.len(), 2);
        assert_eq!(doc.profile.segments[0].mode(), SegmentMode::Incremental);
        assert!(matches!(doc.profile.segments[1], SegmentData::Index(_)));

        let profile = doc.build_profile().unwrap();
        assert_eq!(profile.count_segments(), 2);
        assert_eq!(profile.duration(), 4.0);
        assert!((profile.evaluate_position_at(4.0).unwrap() - 35.0).abs() < 1e-9);
        assert!(validate_segments(&profile.get_all_basic_segments()).unwrap());
    }

    #[test]
    fn test_load_json_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("profile.json");
        let mut file = File::create(&path).unwrap();
        writeln!(
            file,
            r#"{{
                "settings": {{ "default_profile_type": "linear" }},
                "segments": [
                    {{ "kind": "time-distance", "initial_time": 0.0, "final_time": 1.0,
                       "final_position": 2.0, "distance": 2.0, "duration": 1.0, "jerk_percent": 1.0 }}
                ]
            }}"#
        )
        .unwrap();

        let doc = load_document(&path).unwrap();
        assert_eq!(doc.profile.profile_type, ProfileType::Linear);
        assert_eq!(doc.settings.history_limit, 0);
        let profile = doc.build_profile().unwrap();
        assert!((profile.evaluate_position_at(1.0).unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let result = load_document(dir.path().join("missing.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_invalid_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "[[segments]]\nkind = \"spline\"").unwrap();
        assert!(matches!(load_document(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_wrong_load_type_fails_to_build() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("linear.toml");
        let mut file = File::create(&path).unwrap();
        writeln!(
            file,
            "profile_type = \"linear\"\n\n[[loads]]\nload_type = \"INERTIA\"\ninitial_time = 0.0\nfinal_time = 1.0\ninitial_load = 1.0\nfinal_load = 1.0"
        )
        .unwrap();

        let doc = load_document(&path).unwrap();
        assert!(matches!(doc.build_profile(), Err(ConfigError::Profile(_))));
    }
}
