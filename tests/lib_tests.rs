use clipbatch::collab::ffmpeg::parse_duration_output;
use clipbatch::collab::{
    DisabledPageService, FfmpegConverter, HttpUploader, JsonSurveyFile, LogNotifier, Notifier,
    PageService, S3Uploader, SmtpNotifier, SurveySource, Uploader, notification_body,
    notification_subject,
};
use clipbatch::engine::tools::{
    converted_path_for, extension_lower, file_name_string, has_canonical_extension,
    is_video_path,
};
use clipbatch::engine::{EventQueue, SkipSet, dedup};
use clipbatch::pipeline::{Collaborators, FileError};
use clipbatch::{PageRequest, Settings, SmtpSettings, StorageSettings};
use serde_json::json;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

// --- tools ---

#[test]
fn test_video_extensions() {
    assert!(is_video_path(Path::new("/w/a.mp4")));
    assert!(is_video_path(Path::new("/w/a.MOV")));
    assert!(is_video_path(Path::new("/w/a.avi")));
    assert!(!is_video_path(Path::new("/w/a.mkv")));
    assert!(!is_video_path(Path::new("/w/mp4")));
    assert_eq!(extension_lower(Path::new("x.AvI")).as_deref(), Some("avi"));
}

#[test]
fn test_canonical_extension_and_converted_path() {
    assert!(has_canonical_extension(Path::new("a.MP4")));
    assert!(!has_canonical_extension(Path::new("a.mov")));
    assert_eq!(
        converted_path_for(Path::new("/w/clip.mov")),
        PathBuf::from("/w/clip.mp4")
    );
    assert_eq!(file_name_string(Path::new("/w/clip.mov")), "clip.mov");
    assert_eq!(file_name_string(Path::new("/")), "");
}

// --- queue / skip set ---

#[test]
fn test_dedup_keeps_first_arrival_order() {
    let items = ["b", "a", "b", "c", "a"].map(PathBuf::from).to_vec();
    assert_eq!(dedup(items), ["b", "a", "c"].map(PathBuf::from).to_vec());
}

#[test]
fn test_queue_drain_empties() {
    let mut q = EventQueue::new();
    q.push(PathBuf::from("a"));
    q.push(PathBuf::from("a"));
    assert_eq!(q.len(), 2);
    assert_eq!(q.drain().len(), 2);
    assert!(q.is_empty());
}

#[test]
fn test_skip_set_single_use() {
    let mut s = SkipSet::new();
    assert!(s.insert(PathBuf::from("/w/a.mp4")));
    assert!(!s.insert(PathBuf::from("/w/a.mp4")));
    assert_eq!(s.len(), 1);
    assert!(s.consume(Path::new("/w/a.mp4")));
    assert!(!s.consume(Path::new("/w/a.mp4")));
    assert!(s.is_empty());
    assert!(!s.remove(Path::new("/w/a.mp4")));
}

// --- page request ---

#[test]
fn test_page_request_uses_service_field_names() {
    let req = PageRequest {
        video_names: vec!["a.mp4".to_string()],
        sheet_id: "s".to_string(),
        bucket: "b".to_string(),
        ..Default::default()
    };
    let v = serde_json::to_value(&req).unwrap();
    for key in [
        "videoPaths",
        "videoNames",
        "videoUrls",
        "videoTimes",
        "videoEndTimes",
        "surveyDataList",
        "sheetId",
        "bucket",
    ] {
        assert!(v.get(key).is_some(), "missing {key}");
    }
    assert_eq!(v["videoNames"], json!(["a.mp4"]));
}

// --- collaborators ---

#[test]
fn test_ffmpeg_args() {
    let args = FfmpegConverter::args(Path::new("/w/a.mov"), Path::new("/w/a.mp4"));
    let expected: Vec<OsString> = [
        "-y", "-i", "/w/a.mov", "-c:v", "libx264", "-c:a", "aac", "-movflags", "+faststart",
        "/w/a.mp4",
    ]
    .into_iter()
    .map(OsString::from)
    .collect();
    assert_eq!(args, expected);
}

#[test]
fn test_parse_duration_output() {
    assert_eq!(parse_duration_output("12.500000\n"), Some(12.5));
    assert_eq!(parse_duration_output("N/A"), None);
    assert_eq!(parse_duration_output(""), None);
    assert_eq!(parse_duration_output("-1"), None);
}

#[test]
fn test_notification_text() {
    let one = vec!["a.mp4".to_string()];
    let many = vec!["a.mp4".to_string(), "b.mp4".to_string()];
    assert_eq!(notification_subject(&one), "[clipbatch] Video Ready: a.mp4");
    assert_eq!(notification_subject(&many), "[clipbatch] 2 Videos Ready");

    let body = notification_body(&many, &["https://x/page".to_string()]);
    assert!(body.contains("  - a.mp4\n"));
    assert!(body.contains("  - b.mp4\n"));
    assert!(body.contains("Link: https://x/page\n"));
}

#[test]
fn test_log_notifier_and_disabled_pages() {
    let n = LogNotifier::default();
    assert!(n.notify(&["a.mp4".to_string()], &[]).is_ok());
    assert!(DisabledPageService.create_page(&PageRequest::default()).is_err());
}

#[test]
fn test_uploader_object_url() {
    let storage = StorageSettings {
        bucket: "bkt".to_string(),
        endpoint: Some("http://localhost:9000/bkt/".to_string()),
        ..StorageSettings::default()
    };
    let up = HttpUploader::new(&storage).unwrap();
    assert_eq!(up.object_url("a.mp4"), "http://localhost:9000/bkt/a.mp4");
}

#[test]
fn test_survey_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = JsonSurveyFile::new(dir.path().join("none.json"));
    assert_eq!(missing.load(), json!({}));

    let path = dir.path().join("questions.json");
    std::fs::write(&path, r#"{"mood": "calm"}"#).unwrap();
    let v = JsonSurveyFile::new(&path).load();
    assert_eq!(v["mood"], "calm");
    assert_eq!(v["_survey_file"], "questions.json");

    std::fs::write(&path, "{not json").unwrap();
    assert_eq!(JsonSurveyFile::new(&path).load(), json!({}));
}

fn s3_storage() -> StorageSettings {
    StorageSettings {
        bucket: "bkt".to_string(),
        region: "eu-west-1".to_string(),
        access_key: Some("AKIDEXAMPLE".to_string()),
        secret_key: Some("wJalrXUtnFEMI".to_string()),
        ..StorageSettings::default()
    }
}

fn smtp_settings() -> SmtpSettings {
    SmtpSettings {
        server: Some("smtp.example.com".to_string()),
        username: Some("bot@example.com".to_string()),
        password: Some("hunter2".to_string()),
        ..SmtpSettings::default()
    }
}

#[test]
fn test_s3_uploader_requires_bucket() {
    assert!(S3Uploader::new(&StorageSettings::default()).is_err());
    let up = S3Uploader::new(&s3_storage()).unwrap();
    assert_eq!(up.bucket_name(), "bkt");
}

#[test]
fn test_s3_uploader_missing_file_fails_before_sending() {
    let up = S3Uploader::new(&s3_storage()).unwrap();
    let err = up.upload(Path::new("/nonexistent/clipbatch/a.mp4")).unwrap_err();
    assert!(format!("{err:#}").contains("read /nonexistent/clipbatch/a.mp4"));
}

#[test]
fn test_smtp_notifier_message() {
    let n = SmtpNotifier::new(&smtp_settings(), "ops@example.com").unwrap();
    let message = n
        .build_message(&["a.mp4".to_string()], &["https://x/page".to_string()])
        .unwrap();
    let raw = String::from_utf8(message.formatted()).unwrap();
    assert!(raw.contains("Subject: [clipbatch] Video Ready: a.mp4"));
    assert!(raw.contains("From: bot@example.com"));
    assert!(raw.contains("To: ops@example.com"));
    assert!(raw.contains("Link: https://x/page"));
    assert!(!raw.contains("hunter2"));
}

#[test]
fn test_smtp_notifier_sender_and_recipient() {
    let mut smtp = smtp_settings();
    smtp.from = Some("Clips <clips@example.com>".to_string());
    let n = SmtpNotifier::new(&smtp, "ops@example.com").unwrap();
    let raw = String::from_utf8(n.build_message(&[], &[]).unwrap().formatted()).unwrap();
    assert!(raw.contains("clips@example.com"));

    assert!(SmtpNotifier::new(&smtp, "not an address").is_err());
    smtp.from = None;
    smtp.username = None;
    assert!(SmtpNotifier::new(&smtp, "ops@example.com").is_err());
    assert!(SmtpNotifier::new(&SmtpSettings::default(), "ops@example.com").is_err());
}

#[test]
fn test_collaborators_from_settings() {
    // No bucket: the S3 uploader cannot be built.
    assert!(Collaborators::from_settings(&Settings::default()).is_err());

    let mut settings = Settings::default();
    settings.storage = s3_storage();
    let collab = Collaborators::from_settings(&settings).unwrap();
    assert!(collab.on_complete.is_none());
    let collab = collab.with_completion(|_| {});
    assert!(collab.on_complete.is_some());

    // Gateway mode needs no S3 credentials.
    let mut settings = Settings::default();
    settings.storage.endpoint = Some("http://localhost:9000/bkt".to_string());
    assert!(Collaborators::from_settings(&settings).is_ok());

    // Mail wins over the webhook; a bad recipient surfaces at startup.
    settings.notify.webhook_url = Some("http://localhost:9/hook".to_string());
    settings.notify.smtp = smtp_settings();
    settings.notify.recipient = "ops@example.com".to_string();
    assert!(Collaborators::from_settings(&settings).is_ok());
    settings.notify.recipient = String::new();
    assert!(Collaborators::from_settings(&settings).is_err());
}

// --- errors ---

#[test]
fn test_file_error_messages_name_the_file() {
    let e = FileError::Unstable {
        path: PathBuf::from("/w/a.mp4"),
        timeout: Duration::from_secs(5),
    };
    assert!(e.to_string().contains("/w/a.mp4"));
    let e = FileError::Upload {
        path: PathBuf::from("/w/b.mp4"),
        reason: "denied".to_string(),
    };
    assert_eq!(e.path(), &PathBuf::from("/w/b.mp4"));
    assert!(e.to_string().contains("denied"));
}

// --- logging ---

#[test]
fn test_verbosity_can_change_after_logger_install() {
    clipbatch::utils::setup_logging(false);
    assert_eq!(log::max_level(), log::LevelFilter::Info);
    // A settings file turning verbose on after the CLI installed the logger.
    clipbatch::utils::set_verbose(true);
    assert_eq!(log::max_level(), log::LevelFilter::Debug);
    // Installing again keeps the existing logger and level.
    clipbatch::utils::setup_logging(false);
    assert_eq!(log::max_level(), log::LevelFilter::Debug);
}
