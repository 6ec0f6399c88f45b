use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fields read off an Egyptian national ID card. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdCardData {
    pub name: Option<String>,
    pub national_id: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub religion: Option<String>,
    pub marital_status: Option<String>,
    pub expiry_date: Option<String>,
    pub job: Option<String>,
}

impl IdCardData {
    pub const FIELD_NAMES: [&'static str; 9] = [
        "name",
        "national_id",
        "address",
        "date_of_birth",
        "gender",
        "religion",
        "marital_status",
        "expiry_date",
        "job",
    ];

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Option<String>> {
        match name {
            "name" => Some(&mut self.name),
            "national_id" => Some(&mut self.national_id),
            "address" => Some(&mut self.address),
            "date_of_birth" => Some(&mut self.date_of_birth),
            "gender" => Some(&mut self.gender),
            "religion" => Some(&mut self.religion),
            "marital_status" => Some(&mut self.marital_status),
            "expiry_date" => Some(&mut self.expiry_date),
            "job" => Some(&mut self.job),
            _ => None,
        }
    }
}

/// A stored scan result.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct IdCard {
    pub id: Uuid,
    pub face_image_path: String,
    pub back_image_path: String,
    pub name: Option<String>,
    pub national_id: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub religion: Option<String>,
    pub marital_status: Option<String>,
    pub expiry_date: Option<String>,
    pub job: Option<String>,
    pub raw_ocr_text: Option<String>,
    pub corrected_text: Option<String>,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
}

/// Write payload handed to a [`CardStore`](crate::persistence::CardStore).
#[derive(Debug, Clone)]
pub struct NewIdCard {
    pub face_image_path: String,
    pub back_image_path: String,
    pub data: IdCardData,
    pub raw_ocr_text: String,
    pub corrected_text: String,
}
