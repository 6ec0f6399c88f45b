use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;

use crate::error::AppError;
use crate::models::{Side, UploadResponse};
use crate::state::SharedState;
use crate::storage::{SideImage, extension_of};

struct ImagePart {
    filename: Option<String>,
    bytes: Bytes,
}

impl ImagePart {
    fn image(&self) -> SideImage<'_> {
        SideImage {
            bytes: &self.bytes,
            extension: self.filename.as_deref().and_then(extension_of),
        }
    }
}

#[derive(Default)]
struct ImageParts {
    face: Option<ImagePart>,
    back: Option<ImagePart>,
}

pub async fn upload(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UploadResponse>, AppError> {
    let parts = parse_image_parts(&headers, body)
        .await
        .map_err(AppError::BadRequest)?;

    let face = require(parts.face, Side::Face)?;
    let back = require(parts.back, Side::Back)?;

    let upload_id = state.store.create().await?;
    let submission = state
        .store
        .store_pair(upload_id, face.image(), back.image())
        .await?;

    tracing::info!("Stored upload {upload_id}");

    Ok(Json(UploadResponse {
        upload_id,
        face_path: submission.face_path_str(),
        back_path: submission.back_path_str(),
    }))
}

fn require(part: Option<ImagePart>, side: Side) -> Result<ImagePart, AppError> {
    match part {
        Some(part) if !part.bytes.is_empty() => Ok(part),
        Some(_) => Err(AppError::BadRequest(format!("Empty {} image", side.as_str()))),
        None => Err(AppError::BadRequest(format!("Missing {} image", side.as_str()))),
    }
}

/// Read the `face` and `back` file parts of a multipart body. Other parts are skipped.
async fn parse_image_parts(headers: &HeaderMap, body: Bytes) -> Result<ImageParts, String> {
    let boundary = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| multer::parse_boundary(ct).ok())
        .ok_or_else(|| "Missing multipart boundary".to_string())?;

    let stream = futures_util::stream::once(async { Ok::<_, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut parts = ImageParts::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Multipart error: {e}"))?
    {
        let side = match field.name() {
            Some("face") => Side::Face,
            Some("back") => Side::Back,
            _ => continue,
        };
        let filename = field.file_name().map(|s| s.to_string());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| format!("Field read error: {e}"))?;

        let part = Some(ImagePart { filename, bytes });
        match side {
            Side::Face => parts.face = part,
            Side::Back => parts.back = part,
        }
    }

    Ok(parts)
}
