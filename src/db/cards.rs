use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{IdCard, NewIdCard};

pub async fn create(pool: &PgPool, card: &NewIdCard, created_at: i64) -> Result<IdCard, sqlx::Error> {
    sqlx::query_as::<_, IdCard>(
        "INSERT INTO id_cards (
            face_image_path, back_image_path, name, national_id, address, date_of_birth,
            gender, religion, marital_status, expiry_date, job, raw_ocr_text, corrected_text,
            created_at
         )
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) RETURNING *",
    )
    .bind(&card.face_image_path)
    .bind(&card.back_image_path)
    .bind(&card.data.name)
    .bind(&card.data.national_id)
    .bind(&card.data.address)
    .bind(&card.data.date_of_birth)
    .bind(&card.data.gender)
    .bind(&card.data.religion)
    .bind(&card.data.marital_status)
    .bind(&card.data.expiry_date)
    .bind(&card.data.job)
    .bind(&card.raw_ocr_text)
    .bind(&card.corrected_text)
    .bind(created_at)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<IdCard>, sqlx::Error> {
    sqlx::query_as::<_, IdCard>("SELECT * FROM id_cards WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_all(pool: &PgPool) -> Result<Vec<IdCard>, sqlx::Error> {
    sqlx::query_as::<_, IdCard>("SELECT * FROM id_cards ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
}
