use super::*;

#[test]
fn every_listed_name_builds() {
    for name in JOB_NAMES {
        assert!(is_registered(name));
        let job = build(&JobEntry::new(name, serde_json::Value::Null)).unwrap();
        assert_eq!(job.name(), name);
    }
}

#[test]
fn unknown_job_is_a_config_error() {
    assert!(!is_registered("static"));
    let err = build(&JobEntry::new("PANORAMA", serde_json::Value::Null)).unwrap_err();
    assert!(err.is_fatal());
    assert!(err.to_string().contains("PANORAMA"));
}

#[test]
fn parameters_are_validated_on_build() {
    let entry = JobEntry::new("STATIC", serde_json::json!({"FRAMES": ["middle"]}));
    assert!(build(&entry).unwrap_err().is_fatal());

    let entry = JobEntry::new("MASKS", serde_json::json!({"FULL": true, "FRAMES": ["end", 4]}));
    let job = build(&entry).unwrap();
    assert_eq!(job.frames().map(<[_]>::len), Some(2));
}

#[test]
fn parameterless_jobs_ignore_extra_keys() {
    let entry = JobEntry::new("STACKUP", serde_json::json!({"SCALE": 2}));
    assert_eq!(build(&entry).unwrap().name(), "STACKUP");
}
