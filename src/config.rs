use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub max_body_size: usize,
    pub log_level: String,
    pub database_url: Option<String>,
    /// Upper bound on one persistence write. The caller waits at most this long.
    pub persist_timeout: Duration,
    pub document_ai: DocumentAiConfig,
    pub openai: OpenAiConfig,
}

#[derive(Debug, Clone)]
pub struct DocumentAiConfig {
    pub project_id: String,
    pub location: String,
    pub processor_id: String,
    /// Static bearer token. When unset, tokens come from the GCE metadata server.
    pub access_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub correction_model: String,
    pub extraction_model: String,
}

impl DocumentAiConfig {
    pub fn endpoint(&self) -> String {
        format!(
            "https://{location}-documentai.googleapis.com/v1/projects/{project}/locations/{location}/processors/{processor}:process",
            location = self.location,
            project = self.project_id,
            processor = self.processor_id,
        )
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let host: IpAddr = env_or("IDSCAN_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid IDSCAN_HOST: {e}"))?;

        let port: u16 = env_or("IDSCAN_PORT", "8000")
            .parse()
            .map_err(|e| format!("Invalid IDSCAN_PORT: {e}"))?;

        let upload_dir = PathBuf::from(env_or("IDSCAN_UPLOAD_DIR", "uploads"));

        let max_body_size: usize = env_or("IDSCAN_MAX_BODY_SIZE", "20971520")
            .parse()
            .map_err(|e| format!("Invalid IDSCAN_MAX_BODY_SIZE: {e}"))?;

        let log_level = env_or("IDSCAN_LOG_LEVEL", "info");

        let database_url = env_optional("DATABASE_URL");

        let persist_timeout_ms: u64 = env_or("IDSCAN_PERSIST_TIMEOUT_MS", "10000")
            .parse()
            .map_err(|e| format!("Invalid IDSCAN_PERSIST_TIMEOUT_MS: {e}"))?;

        let document_ai = DocumentAiConfig {
            project_id: env_or("GCP_PROJECT_ID", "215297851036"),
            location: env_or("GCP_LOCATION", "us"),
            processor_id: env_or("GCP_PROCESSOR_ID", "178745fbdde45a70"),
            access_token: env_optional("GCP_ACCESS_TOKEN"),
        };

        let openai = OpenAiConfig {
            api_key: env_optional("OPENAI_API_KEY"),
            base_url: env_or("OPENAI_BASE_URL", "https://api.openai.com/v1")
                .trim_end_matches('/')
                .to_string(),
            correction_model: env_or("OPENAI_CORRECTION_MODEL", "gpt-4.1-nano-2025-04-14"),
            extraction_model: env_or("OPENAI_EXTRACTION_MODEL", "gpt-5"),
        };

        Ok(Config {
            host,
            port,
            upload_dir,
            max_body_size,
            log_level,
            database_url,
            persist_timeout: Duration::from_millis(persist_timeout_ms),
            document_ai,
            openai,
        })
    }
}

fn env_optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
