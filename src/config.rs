//! Application configuration.
//!
//! Tunable constants for scheduling, marking and generation live here, along
//! with the runtime settings loaded at startup. Runtime settings are resolved
//! with priority: config.toml > environment (.env) > default.

use serde::Deserialize;
use std::path::PathBuf;

use crate::paths;

// ==================== Server Configuration ====================

/// Default address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

/// Default server port
pub const SERVER_PORT: u16 = 3000;

// ==================== Completion Service ====================

/// OpenAI-compatible endpoint used by default (Groq)
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.groq.com/openai/v1";

pub const DEFAULT_LLM_MODEL: &str = "llama-3.3-70b-versatile";

/// Per-request timeout for completion calls
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 60;

pub const GENERATION_TEMPERATURE: f32 = 0.3;
pub const GENERATION_MAX_TOKENS: u32 = 3000;
pub const TUTOR_TEMPERATURE: f32 = 0.4;
pub const GRADING_TEMPERATURE: f32 = 0.2;
pub const GRADING_MAX_TOKENS: u32 = 800;

// ==================== Review Scheduling ====================

/// Confidence at or above which the long ladder is used
pub const HIGH_CONFIDENCE_THRESHOLD: i64 = 80;

/// Confidence at or above which the medium ladder is used
pub const MEDIUM_CONFIDENCE_THRESHOLD: i64 = 50;

/// Review intervals in days: 1d → 3d → 1w → 2w → 1mo → 2mo → 3mo
pub const HIGH_CONFIDENCE_LADDER: [i64; 7] = [1, 3, 7, 14, 30, 60, 90];

pub const MEDIUM_CONFIDENCE_LADDER: [i64; 7] = [1, 2, 4, 7, 14, 21, 30];

pub const LOW_CONFIDENCE_LADDER: [i64; 7] = [1, 1, 2, 3, 5, 7, 14];

// ==================== Marking ====================

/// Relative tolerance for calculation answers (1%)
pub const CALCULATION_TOLERANCE: f64 = 0.01;

pub const ESSAY_MIN_WORDS: usize = 100;
pub const SHORT_ANSWER_MIN_WORDS: usize = 20;

/// Share of max marks deducted when a keyword-marked answer is too short
pub const SHORT_ANSWER_PENALTY: f64 = 0.2;

/// Length-only marks when the mark scheme yields no keywords
pub const LENGTH_FALLBACK_SHORT: f64 = 0.3;
pub const LENGTH_FALLBACK_ADEQUATE: f64 = 0.6;
pub const LENGTH_FALLBACK_EXTENDED: f64 = 0.75;

// ==================== Question Generation ====================

pub const DEFAULT_GENERATION_COUNT: u32 = 10;

/// Upper bound per request to keep completion calls short
pub const MAX_GENERATION_COUNT: u32 = 30;

// ==================== Progress & Tutor ====================

/// Attempts scoring below this percentage mark the topic as weak
pub const WEAK_TOPIC_THRESHOLD: i64 = 50;

pub const WEAK_TOPICS_LIMIT: usize = 3;
pub const DASHBOARD_PROGRESS_LIMIT: usize = 10;
pub const DASHBOARD_DUE_LIMIT: usize = 5;

/// Longest text kept in a tutor memory field
pub const MEMORY_FIELD_MAX_CHARS: usize = 280;

// ==================== Runtime Configuration ====================

/// config.toml structure
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
  server: Option<ServerSection>,
  database: Option<DatabaseSection>,
  llm: Option<LlmSection>,
  grading: Option<GradingSection>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerSection {
  addr: Option<String>,
  port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabaseSection {
  path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmSection {
  api_key: Option<String>,
  base_url: Option<String>,
  model: Option<String>,
  timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct GradingSection {
  use_llm: Option<bool>,
}

/// Completion service settings
#[derive(Debug, Clone)]
pub struct LlmConfig {
  pub api_key: Option<String>,
  pub base_url: String,
  pub model: String,
  pub timeout_secs: u64,
}

impl Default for LlmConfig {
  fn default() -> Self {
    Self {
      api_key: None,
      base_url: DEFAULT_LLM_BASE_URL.to_string(),
      model: DEFAULT_LLM_MODEL.to_string(),
      timeout_secs: DEFAULT_LLM_TIMEOUT_SECS,
    }
  }
}

/// Settings resolved at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_addr: String,
  pub server_port: u16,
  pub database_path: PathBuf,
  pub llm: LlmConfig,
  /// Mark free-text answers with the completion service instead of keywords
  pub grade_with_llm: bool,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      server_addr: SERVER_ADDR.to_string(),
      server_port: SERVER_PORT,
      database_path: PathBuf::from(paths::db_path()),
      llm: LlmConfig::default(),
      grade_with_llm: false,
    }
  }
}

impl AppConfig {
  /// Load from config.toml and the process environment
  pub fn load() -> Self {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let contents = std::fs::read_to_string("config.toml").ok();
    Self::from_sources(contents.as_deref(), |key| std::env::var(key).ok())
  }

  /// Resolve settings from config file contents and an environment lookup
  pub fn from_sources(file: Option<&str>, env: impl Fn(&str) -> Option<String>) -> Self {
    let file = match file.map(toml::from_str::<FileConfig>) {
      Some(Ok(parsed)) => parsed,
      Some(Err(e)) => {
        tracing::warn!("Ignoring invalid config.toml: {}", e);
        FileConfig::default()
      }
      None => FileConfig::default(),
    };

    let server = file.server.unwrap_or_default();
    let database = file.database.unwrap_or_default();
    let llm = file.llm.unwrap_or_default();
    let grading = file.grading.unwrap_or_default();
    let defaults = AppConfig::default();

    let database_path = database
      .path
      .or_else(|| env("DATABASE_PATH"))
      .map(PathBuf::from)
      .unwrap_or(defaults.database_path);
    tracing::info!("Using database: {}", database_path.display());

    Self {
      server_addr: server.addr.or_else(|| env("SERVER_ADDR")).unwrap_or(defaults.server_addr),
      server_port: server
        .port
        .or_else(|| env("PORT").and_then(|p| p.parse().ok()))
        .unwrap_or(defaults.server_port),
      database_path,
      llm: LlmConfig {
        api_key: llm
          .api_key
          .or_else(|| env("GROQ_API_KEY"))
          .filter(|key| !key.trim().is_empty()),
        base_url: llm
          .base_url
          .or_else(|| env("LLM_BASE_URL"))
          .unwrap_or(defaults.llm.base_url),
        model: llm.model.or_else(|| env("LLM_MODEL")).unwrap_or(defaults.llm.model),
        timeout_secs: llm.timeout_secs.unwrap_or(defaults.llm.timeout_secs),
      },
      grade_with_llm: grading
        .use_llm
        .or_else(|| env("GRADE_WITH_LLM").map(|v| v == "true" || v == "1"))
        .unwrap_or(false),
    }
  }

  /// Full server bind address
  pub fn bind_addr(&self) -> String {
    format!("{}:{}", self.server_addr, self.server_port)
  }
}
