#![allow(dead_code)]

pub mod db;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use tempfile::TempDir;
use uuid::Uuid;

use idscan::config::{Config, DocumentAiConfig, OpenAiConfig};
use idscan::error::ScanError;
use idscan::llm::LanguageModel;
use idscan::models::{IdCard, NewIdCard};
use idscan::ocr::OcrProvider;
use idscan::persistence::CardStore;
use idscan::state::{AppState, SharedState};
use idscan::storage::SubmissionStore;

pub const PERSIST_TIMEOUT: Duration = Duration::from_millis(200);

pub const CORRECTION_MODEL: &str = "test-correction";
pub const EXTRACTION_MODEL: &str = "test-extraction";

pub const FACE_TEXT: &str = "جمهوريهمصر العربيه\nمحمد احمد علي\n29801011234567";
pub const BACK_TEXT: &str = "القاهره\nمهندس\nذكر مسلم متزوج\nالبطاقه ساريه حتي 2030/01/01";
pub const CORRECTED_TEXT: &str = "جمهوريه مصر العربيه\nمحمد احمد علي\n29801011234567\nالقاهره";

pub fn extraction_json() -> String {
    json!({
        "name": "محمد احمد علي",
        "national_id": "29801011234567",
        "address": "القاهره",
        "date_of_birth": "1998/01/01",
        "gender": "ذكر",
        "religion": "مسلم",
        "marital_status": "متزوج",
        "expiry_date": "2030/01/01",
        "job": "مهندس",
        "confidence": 0.9
    })
    .to_string()
}

/// OCR stand-in keyed on the stored file name (`face.*` / `back.*`).
pub struct FakeOcr {
    pub face: Result<String, String>,
    pub back: Result<String, String>,
    pub calls: AtomicUsize,
}

impl Default for FakeOcr {
    fn default() -> Self {
        Self {
            face: Ok(FACE_TEXT.to_string()),
            back: Ok(BACK_TEXT.to_string()),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl OcrProvider for FakeOcr {
    async fn extract(&self, image: &Path) -> Result<String, ScanError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let stem = image.file_stem().and_then(|s| s.to_str()).unwrap_or("");
        let result = if stem == "face" { &self.face } else { &self.back };
        result.clone().map_err(ScanError::OcrService)
    }
}

/// Language model stand-in answering by model name.
pub struct FakeLlm {
    pub correction: Result<String, String>,
    pub extraction: Result<String, String>,
    pub prompts: Mutex<Vec<(String, String)>>,
}

impl Default for FakeLlm {
    fn default() -> Self {
        Self {
            correction: Ok(CORRECTED_TEXT.to_string()),
            extraction: Ok(extraction_json()),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

impl FakeLlm {
    pub fn prompts_for(&self, model: &str) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == model)
            .map(|(_, p)| p.clone())
            .collect()
    }
}

#[async_trait]
impl LanguageModel for FakeLlm {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, String> {
        self.prompts
            .lock()
            .unwrap()
            .push((model.to_string(), prompt.to_string()));
        if model == CORRECTION_MODEL {
            self.correction.clone()
        } else {
            self.extraction.clone()
        }
    }
}

/// In-memory card store. `fail` makes every call error out; `save_delay` stalls saves.
#[derive(Default)]
pub struct MemoryCardStore {
    pub cards: Mutex<Vec<IdCard>>,
    pub fail: bool,
    pub save_delay: Option<Duration>,
    pub save_calls: AtomicUsize,
}

impl MemoryCardStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn stalled(delay: Duration) -> Self {
        Self {
            save_delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CardStore for MemoryCardStore {
    async fn save(&self, card: NewIdCard) -> Result<Uuid, ScanError> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.save_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(ScanError::Persistence("connection refused".to_string()));
        }
        let id = Uuid::now_v7();
        let created_at = chrono::Utc::now().timestamp_millis();
        self.cards.lock().unwrap().push(stored_card(card, id, created_at));
        Ok(id)
    }

    async fn list_all(&self) -> Result<Vec<IdCard>, ScanError> {
        if self.fail {
            return Err(ScanError::Persistence("connection refused".to_string()));
        }
        let mut cards = self.cards.lock().unwrap().clone();
        cards.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(cards)
    }

    async fn get(&self, id: Uuid) -> Result<IdCard, ScanError> {
        if self.fail {
            return Err(ScanError::Persistence("connection refused".to_string()));
        }
        self.cards
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| ScanError::NotFound("Record not found".to_string()))
    }
}

/// The row a real store would return for `card`.
pub fn stored_card(card: NewIdCard, id: Uuid, created_at: i64) -> IdCard {
    let data = card.data;
    IdCard {
        id,
        face_image_path: card.face_image_path,
        back_image_path: card.back_image_path,
        name: data.name,
        national_id: data.national_id,
        address: data.address,
        date_of_birth: data.date_of_birth,
        gender: data.gender,
        religion: data.religion,
        marital_status: data.marital_status,
        expiry_date: data.expiry_date,
        job: data.job,
        raw_ocr_text: Some(card.raw_ocr_text),
        corrected_text: Some(card.corrected_text),
        created_at,
    }
}

/// External collaborators for one test server.
#[derive(Default)]
pub struct Services {
    pub ocr: FakeOcr,
    pub llm: FakeLlm,
    pub cards: MemoryCardStore,
}

/// A running test server backed by fakes and a temporary upload directory.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub state: SharedState,
    pub ocr: Arc<FakeOcr>,
    pub llm: Arc<FakeLlm>,
    pub cards: Arc<MemoryCardStore>,
    pub uploads: TempDir,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Upload a face/back pair, return (body, status).
    pub async fn upload(&self, face: Option<&[u8]>, back: Option<&[u8]>) -> (Value, StatusCode) {
        let mut form = Form::new();
        if let Some(bytes) = face {
            form = form.part("face", Part::bytes(bytes.to_vec()).file_name("card-front.png"));
        }
        if let Some(bytes) = back {
            form = form.part("back", Part::bytes(bytes.to_vec()).file_name("card-back.jpeg"));
        }

        let resp = self
            .client
            .post(self.url("/upload"))
            .multipart(form)
            .send()
            .await
            .expect("upload request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Upload both sides and return the new upload id.
    pub async fn upload_pair(&self) -> String {
        let (body, status) = self.upload(Some(&b"face-bytes"[..]), Some(&b"back-bytes"[..])).await;
        assert_eq!(status, StatusCode::OK, "upload failed: {body}");
        body["upload_id"].as_str().unwrap().to_string()
    }

    pub async fn process(&self, upload_id: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(&format!("/process/{upload_id}")))
            .send()
            .await
            .expect("process request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn get(&self, path: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }
}

pub fn test_config(upload_dir: &Path) -> Config {
    Config {
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        upload_dir: upload_dir.to_path_buf(),
        max_body_size: 1_048_576,
        log_level: "warn".to_string(),
        database_url: None,
        persist_timeout: PERSIST_TIMEOUT,
        document_ai: DocumentAiConfig {
            project_id: "test-project".to_string(),
            location: "us".to_string(),
            processor_id: "test-processor".to_string(),
            access_token: Some("test-token".to_string()),
        },
        openai: OpenAiConfig {
            api_key: Some("test-key".to_string()),
            base_url: "http://127.0.0.1:9".to_string(),
            correction_model: CORRECTION_MODEL.to_string(),
            extraction_model: EXTRACTION_MODEL.to_string(),
        },
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_with(Services::default()).await
}

pub async fn spawn_with(services: Services) -> TestApp {
    let uploads = tempfile::tempdir().expect("Failed to create upload dir");
    let config = test_config(uploads.path());

    let ocr = Arc::new(services.ocr);
    let llm = Arc::new(services.llm);
    let cards = Arc::new(services.cards);

    let state: SharedState = Arc::new(AppState {
        store: SubmissionStore::new(uploads.path()),
        config,
        ocr: ocr.clone(),
        llm: llm.clone(),
        cards: cards.clone(),
    });

    let app = idscan::build_app(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        addr,
        client: Client::new(),
        state,
        ocr,
        llm,
        cards,
        uploads,
    }
}
