//! Survey payload read from a JSON file.

use log::{debug, warn};
use serde_json::{Map, Value};
use std::path::PathBuf;

use super::SurveySource;
use crate::engine::tools::file_name_string;

/// Reads the survey JSON on every call so edits apply to the next clip.
/// Missing or unreadable file → `{}`. Object payloads get `_survey_file` set to the file name.
#[derive(Clone, Debug)]
pub struct JsonSurveyFile {
    path: PathBuf,
}

impl JsonSurveyFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SurveySource for JsonSurveyFile {
    fn load(&self) -> Value {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) => {
                debug!("no survey at {} ({})", self.path.display(), e);
                return Value::Object(Map::new());
            }
        };
        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(mut map)) => {
                map.insert(
                    "_survey_file".to_string(),
                    Value::String(file_name_string(&self.path)),
                );
                Value::Object(map)
            }
            Ok(other) => other,
            Err(e) => {
                warn!("{}: {}", self.path.display(), e);
                Value::Object(Map::new())
            }
        }
    }
}
