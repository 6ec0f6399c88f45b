use std::path::PathBuf;

use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Face,
    Back,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Face => "face",
            Side::Back => "back",
        }
    }
}

/// A face+back image pair on disk. Only built once both sides are stored.
#[derive(Debug, Clone)]
pub struct Submission {
    pub id: Uuid,
    pub face_path: PathBuf,
    pub back_path: PathBuf,
    pub created_at: DateTime<Utc>,
}

impl Submission {
    pub fn face_path_str(&self) -> String {
        self.face_path.to_string_lossy().into_owned()
    }

    pub fn back_path_str(&self) -> String {
        self.back_path.to_string_lossy().into_owned()
    }
}
