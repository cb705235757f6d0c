use std::env;
use std::str::FromStr;

use serde::Serialize;
use tracing::warn;

/// Retrieves an environment variable and splits it into a vector of strings based on a delimiter.
///
/// Empty segments are dropped.
///
/// # Arguments
/// - `var`: The name of the environment variable.
/// - `delimiter`: The character to split the environment variable's value by.
///
/// # Returns
/// - `Vec<String>`
pub fn get_env_var_as_vec(var: &str, delimiter: char) -> Vec<String> {
    env::var(var)
        .unwrap_or_default()
        .split(delimiter)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Reads and parses an environment variable, falling back to `default` when it is
/// missing or unparsable.
pub fn get_env_var_or<T: FromStr>(var: &str, default: T) -> T {
    match env::var(var) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("Ignoring unparsable value {:?} for {}", raw, var);
                default
            }
        },
        Err(_) => default,
    }
}

/// How entity mentions are attached to sentences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SentenceMatching {
    /// Entity span must lie inside the sentence's byte range.
    Offsets,
    /// Any literal occurrence of the entity text inside the sentence counts.
    Substring,
}

impl FromStr for SentenceMatching {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "offsets" | "offset" => Ok(SentenceMatching::Offsets),
            "substring" | "literal" => Ok(SentenceMatching::Substring),
            other => Err(format!("unknown sentence matching mode: {}", other)),
        }
    }
}

/// Which model backends to build at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Backend {
    Lexicon,
    Ollama,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lexicon" | "offline" => Ok(Backend::Lexicon),
            "ollama" => Ok(Backend::Ollama),
            other => Err(format!("unknown backend: {}", other)),
        }
    }
}

/// Tuning knobs for one analysis engine.
#[derive(Debug, Clone, Serialize)]
pub struct EngineConfig {
    // Articles analyzed concurrently during the per-article stage
    pub concurrency: usize,
    // Upper bound for a single model call, in seconds
    pub analyzer_timeout_secs: u64,
    pub sentence_matching: SentenceMatching,
    // Relation edges need a co-occurrence count strictly above this
    pub relation_threshold: u32,
    // Events deviate from the trend mean by more than this many standard deviations
    pub event_stddev: f64,
    // Event detection needs strictly more trend points than this
    pub min_trend_points: usize,
    pub topic_keywords: usize,
    pub max_corpus_words: usize,
    pub extra_stopwords: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            analyzer_timeout_secs: 120,
            sentence_matching: SentenceMatching::Offsets,
            relation_threshold: 1,
            event_stddev: 1.5,
            min_trend_points: 3,
            topic_keywords: 5,
            max_corpus_words: 200,
            extra_stopwords: Vec::new(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            concurrency: get_env_var_or("NEWSLENS_CONCURRENCY", defaults.concurrency).max(1),
            analyzer_timeout_secs: get_env_var_or(
                "NEWSLENS_ANALYZER_TIMEOUT_SECS",
                defaults.analyzer_timeout_secs,
            ),
            sentence_matching: get_env_var_or(
                "NEWSLENS_SENTENCE_MATCHING",
                defaults.sentence_matching,
            ),
            relation_threshold: get_env_var_or(
                "NEWSLENS_RELATION_THRESHOLD",
                defaults.relation_threshold,
            ),
            event_stddev: get_env_var_or("NEWSLENS_EVENT_STDDEV", defaults.event_stddev),
            min_trend_points: get_env_var_or(
                "NEWSLENS_MIN_TREND_POINTS",
                defaults.min_trend_points,
            ),
            topic_keywords: get_env_var_or("NEWSLENS_TOPIC_KEYWORDS", defaults.topic_keywords),
            max_corpus_words: get_env_var_or(
                "NEWSLENS_MAX_CORPUS_WORDS",
                defaults.max_corpus_words,
            ),
            extra_stopwords: get_env_var_as_vec("NEWSLENS_EXTRA_STOPWORDS", ';'),
        }
    }
}

/// Process-wide settings: engine tuning plus the external services to talk to.
#[derive(Debug, Clone)]
pub struct Config {
    pub engine: EngineConfig,
    pub backend: Backend,
    pub log_dir: String,
    pub ollama_host: String,
    pub ollama_port: u16,
    pub ollama_model: String,
    pub temperature: f32,
    // Word budget of the offline lead-sentence summarizer
    pub summary_max_words: usize,
    pub news_language: String,
    pub news_country: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            engine: EngineConfig::from_env(),
            backend: get_env_var_or("NEWSLENS_BACKEND", Backend::Lexicon),
            log_dir: env::var("NEWSLENS_LOG_DIR").unwrap_or("logs".to_string()),
            ollama_host: env::var("OLLAMA_HOST").unwrap_or("http://localhost".to_string()),
            ollama_port: get_env_var_or("OLLAMA_PORT", 11434),
            ollama_model: env::var("OLLAMA_MODEL").unwrap_or("llama3.1".to_string()),
            temperature: get_env_var_or("LLM_TEMPERATURE", 0.0),
            summary_max_words: get_env_var_or("NEWSLENS_SUMMARY_WORDS", 60),
            news_language: env::var("NEWS_LANGUAGE").unwrap_or("id".to_string()),
            news_country: env::var("NEWS_COUNTRY").unwrap_or("ID".to_string()),
        }
    }
}
