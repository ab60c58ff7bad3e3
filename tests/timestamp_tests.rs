use clipbatch::engine::timestamp::{
    end_timestamp, fallback_timestamp, format_iso, parse_iso, recording_time,
    timestamp_from_filename,
};
use std::path::Path;

// --- timestamp_from_filename ---

#[test]
fn test_dollar_form() {
    let t = timestamp_from_filename("cam_2024-03-15$14-30-45-123456.mp4").unwrap();
    assert_eq!(t.iso, "2024-03-15T14:30:45.123456");
    assert_eq!(t.time_of_day, "14:30");
}

#[test]
fn test_t_form_without_fraction() {
    let t = timestamp_from_filename("cam_2024-03-15T14-30-45.mp4").unwrap();
    assert_eq!(t.iso, "2024-03-15T14:30:45.000000");
    assert_eq!(t.time_of_day, "14:30");
}

#[test]
fn test_t_form_short_fraction_is_right_padded() {
    let t = timestamp_from_filename("2024-03-15T09-05-01-12.mov").unwrap();
    assert_eq!(t.iso, "2024-03-15T09:05:01.120000");
    assert_eq!(t.time_of_day, "09:05");
}

#[test]
fn test_no_timestamp() {
    assert_eq!(timestamp_from_filename("plain.mp4"), None);
    assert_eq!(timestamp_from_filename("2024-03-15.mp4"), None);
}

#[test]
fn test_dollar_form_wins_over_t_form() {
    let t = timestamp_from_filename("2024-01-01T01-01-01_2024-03-15$14-30-45-123456.mp4").unwrap();
    assert_eq!(t.iso, "2024-03-15T14:30:45.123456");
}

#[test]
fn test_dollar_form_requires_six_digits() {
    // Five fractional digits is not the $ form; no T form either.
    assert_eq!(timestamp_from_filename("cam_2024-03-15$14-30-45-12345.mp4"), None);
}

#[test]
fn test_impossible_date_is_rejected() {
    assert_eq!(timestamp_from_filename("cam_2024-13-45T14-30-45.mp4"), None);
}

// --- end_timestamp ---

#[test]
fn test_end_unknown_duration_adds_a_minute() {
    assert_eq!(
        end_timestamp("2024-03-15T14:30:45.000000", None).unwrap(),
        "2024-03-15T14:31:45.000000"
    );
}

#[test]
fn test_end_known_duration_drops_zero_fraction() {
    assert_eq!(
        end_timestamp("2024-03-15T23:30:00.000000", Some(3600.0)).unwrap(),
        "2024-03-16T00:30:00"
    );
}

#[test]
fn test_end_known_duration_keeps_nonzero_fraction() {
    assert_eq!(
        end_timestamp("2024-03-15T14:30:45.000000", Some(1.5)).unwrap(),
        "2024-03-15T14:30:46.500000"
    );
}

#[test]
fn test_end_negative_duration_treated_as_unknown() {
    assert_eq!(
        end_timestamp("2024-03-15T14:30:45.000000", Some(-3.0)).unwrap(),
        "2024-03-15T14:31:45.000000"
    );
}

#[test]
fn test_end_zero_duration_treated_as_unknown() {
    assert_eq!(
        end_timestamp("2024-03-15T14:30:45.000000", Some(0.0)).unwrap(),
        "2024-03-15T14:31:45.000000"
    );
}

#[test]
fn test_end_rejects_bad_start() {
    assert!(end_timestamp("not a time", Some(1.0)).is_err());
}

// --- parse / format ---

#[test]
fn test_parse_and_format_round_trip_shapes() {
    let dt = parse_iso("2024-03-15T14:30:45").unwrap();
    assert_eq!(format_iso(&dt), "2024-03-15T14:30:45");
    let dt = parse_iso("2024-03-15T14:30:45.250000").unwrap();
    assert_eq!(format_iso(&dt), "2024-03-15T14:30:45.250000");
}

// --- fallback ---

#[test]
fn test_fallback_uses_mtime() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plain.mp4");
    std::fs::write(&path, b"x").unwrap();

    let t = recording_time(&path).unwrap();
    assert_eq!(t, fallback_timestamp(&path).unwrap());
    assert!(parse_iso(&t.iso).is_ok());
    assert_eq!(t.time_of_day.len(), 5);
    assert_eq!(&t.iso[11..16], t.time_of_day);
}

#[test]
fn test_filename_wins_over_mtime() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cam_2024-03-15T14-30-45.mp4");
    std::fs::write(&path, b"x").unwrap();
    assert_eq!(recording_time(&path).unwrap().iso, "2024-03-15T14:30:45.000000");
}

#[test]
fn test_fallback_missing_file_errors() {
    assert!(recording_time(Path::new("/nonexistent/clipbatch/plain.mp4")).is_err());
}
