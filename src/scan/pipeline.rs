use std::sync::LazyLock;

use regex::Regex;
use uuid::Uuid;

use crate::error::ScanError;
use crate::models::{IdCardData, NewIdCard, ProcessResponse, Submission};
use crate::ocr;
use crate::state::SharedState;

use super::{correction, fields};

static NATIONAL_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{14}$").expect("national id pattern is valid")
});

/// Where a processing attempt currently is. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Pending,
    OcrInFlight,
    CorrectionInFlight,
    ExtractionInFlight,
    Persisting,
    Done,
}

struct StageTracker {
    submission_id: Uuid,
    stage: Stage,
}

impl StageTracker {
    fn new(submission_id: Uuid) -> Self {
        Self {
            submission_id,
            stage: Stage::Pending,
        }
    }

    fn advance(&mut self, next: Stage) {
        debug_assert!(next > self.stage, "stage {next:?} after {:?}", self.stage);
        tracing::debug!(
            submission = %self.submission_id,
            "Pipeline stage {:?} -> {:?}",
            self.stage,
            next
        );
        self.stage = next;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    Success {
        record: IdCardData,
        raw_text: String,
        corrected_text: String,
    },
    Failure {
        error: String,
    },
}

impl From<PipelineOutcome> for ProcessResponse {
    fn from(outcome: PipelineOutcome) -> Self {
        match outcome {
            PipelineOutcome::Success {
                record,
                raw_text,
                corrected_text,
            } => ProcessResponse {
                success: true,
                data: Some(record),
                raw_text: Some(raw_text),
                corrected_text: Some(corrected_text),
                error: None,
            },
            PipelineOutcome::Failure { error } => ProcessResponse {
                success: false,
                data: None,
                raw_text: None,
                corrected_text: None,
                error: Some(error),
            },
        }
    }
}

/// Run OCR, correction and field extraction for one submission, then try to persist.
///
/// Stage errors become a `Failure` outcome and skip persistence. A persistence
/// error or timeout is only logged; the outcome reported is the one computed before it.
pub async fn run(state: &SharedState, submission: &Submission) -> PipelineOutcome {
    let mut tracker = StageTracker::new(submission.id);
    tracing::info!(
        submission = %submission.id,
        "Processing upload created at {}",
        submission.created_at.to_rfc3339()
    );

    let (record, raw_text, corrected_text) = match extract(state, submission, &mut tracker).await {
        Ok(extracted) => extracted,
        Err(e) => {
            tracing::warn!(submission = %submission.id, "Processing failed: {e}");
            tracker.advance(Stage::Done);
            return PipelineOutcome::Failure {
                error: e.to_string(),
            };
        }
    };

    if let Some(id) = &record.national_id {
        if !NATIONAL_ID.is_match(id) {
            tracing::warn!(
                submission = %submission.id,
                "Extracted national id is not 14 digits: {id:?}"
            );
        }
    }

    let outcome = PipelineOutcome::Success {
        record,
        raw_text,
        corrected_text,
    };

    tracker.advance(Stage::Persisting);
    // Inline, so a record is listable once the response is out. Bounded by persist_timeout.
    persist(state, submission, &outcome).await;
    tracker.advance(Stage::Done);

    outcome
}

async fn extract(
    state: &SharedState,
    submission: &Submission,
    tracker: &mut StageTracker,
) -> Result<(IdCardData, String, String), ScanError> {
    let models = &state.config.openai;

    tracker.advance(Stage::OcrInFlight);
    let pair = ocr::extract_pair(
        state.ocr.as_ref(),
        &submission.face_path,
        &submission.back_path,
    )
    .await?;

    tracker.advance(Stage::CorrectionInFlight);
    let corrected =
        correction::correct(state.llm.as_ref(), &models.correction_model, &pair.combined_text)
            .await?;

    tracker.advance(Stage::ExtractionInFlight);
    let record =
        fields::extract_fields(state.llm.as_ref(), &models.extraction_model, &corrected).await?;

    Ok((record, pair.combined_text, corrected))
}

async fn persist(state: &SharedState, submission: &Submission, outcome: &PipelineOutcome) {
    let PipelineOutcome::Success {
        record,
        raw_text,
        corrected_text,
    } = outcome
    else {
        return;
    };

    let card = NewIdCard {
        face_image_path: submission.face_path_str(),
        back_image_path: submission.back_path_str(),
        data: record.clone(),
        raw_ocr_text: raw_text.clone(),
        corrected_text: corrected_text.clone(),
    };

    let limit = state.config.persist_timeout;
    match tokio::time::timeout(limit, state.cards.save(card)).await {
        Ok(Ok(id)) => tracing::info!(submission = %submission.id, "Saved ID card {id}"),
        Ok(Err(e)) => tracing::warn!(submission = %submission.id, "Could not save ID card: {e}"),
        Err(_) => tracing::warn!(
            submission = %submission.id,
            "Saving ID card timed out after {}ms",
            limit.as_millis()
        ),
    }
}
