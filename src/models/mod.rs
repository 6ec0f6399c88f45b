mod api;
mod id_card;
mod submission;

pub use api::{ProcessResponse, UploadResponse};
pub use id_card::{IdCard, IdCardData, NewIdCard};
pub use submission::{Side, Submission};
