//! Health assistant chatbot.
//!
//! Queries are answered, in order, from the response cache, the user's own
//! medication list, their fitness analytics, an OpenAI-compatible LLM when one
//! is configured, and finally a small set of canned keyword answers.

use std::collections::HashMap;
use std::env;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use health_tracker_data::repository::{FitnessRepositoryTrait, MedicationRepositoryTrait};

use crate::entities::conversions;
use crate::services::analytics::{summarize, DEFAULT_HISTORY_LIMIT};
use crate::services::errors::ServiceError;

/// How long a cached answer stays valid
pub const CACHE_TTL: Duration = Duration::from_secs(30);

/// Maximum number of cached answers
pub const CACHE_MAX_ENTRIES: usize = 256;

pub const SYSTEM_PROMPT: &str = "You are a friendly healthcare assistant. \
You answer clearly, provide caution when needed, \
and avoid giving harmful or extreme medical advice. \
If users ask serious medical questions, tell them to consult a doctor.";

const TEMPERATURE: f64 = 0.4;
const MAX_TOKENS: u32 = 300;

const MEDICATION_KEYWORDS: [&str; 4] = ["medicine", "medication", "dose", "tablet"];
const INSIGHT_KEYWORDS: [&str; 3] = ["health review", "insight", "summary"];

type CacheMap = HashMap<String, (String, Instant)>;

/// Thread-safe query -> answer cache with a TTL and a size bound
#[derive(Clone)]
pub struct ResponseCache {
    entries: Arc<Mutex<CacheMap>>,
    ttl: Duration,
    max_entries: usize,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(CACHE_TTL, CACHE_MAX_ENTRIES)
    }
}

impl ResponseCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheMap> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Live answer for `key`; a stale entry is removed and reported as a miss
    pub fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some((response, stored_at)) if stored_at.elapsed() < self.ttl => Some(response.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: &str, response: &str) {
        let mut entries = self.lock();

        if entries.len() >= self.max_entries && !entries.contains_key(key) {
            let oldest = entries
                .iter()
                .min_by_key(|(_, (_, stored_at))| *stored_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }

        entries.insert(key.to_string(), (response.to_string(), Instant::now()));
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Drop stale entries; returns how many were removed
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        let ttl = self.ttl;
        entries.retain(|_, (_, stored_at)| stored_at.elapsed() < ttl);
        before - entries.len()
    }
}

/// Chat completion backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Complete a single-turn conversation
    async fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String, ServiceError>;
}

/// Settings for an OpenAI-compatible chat completions endpoint
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl LlmConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.groq.com/openai/v1";
    pub const DEFAULT_MODEL: &'static str = "moonshotai/kimi-k2-instruct-0905";
    pub const DEFAULT_TIMEOUT_SECONDS: u64 = 20;

    /// Read `LLM_*` variables (falling back to `GROQ_API_KEY`); `None` without a key
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("LLM_API_KEY")
            .or_else(|_| env::var("GROQ_API_KEY"))
            .ok()
            .filter(|k| !k.trim().is_empty())?;

        let timeout = env::var("LLM_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(Self::DEFAULT_TIMEOUT_SECONDS);

        Some(Self {
            api_key,
            base_url: env::var("LLM_BASE_URL").unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_string()),
            model: env::var("LLM_MODEL").unwrap_or_else(|_| Self::DEFAULT_MODEL.to_string()),
            timeout: Duration::from_secs(timeout),
        })
    }
}

/// [`LlmClient`] for any `/chat/completions` endpoint (Groq, OpenAI, local servers)
pub struct OpenAiCompatibleClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl OpenAiCompatibleClient {
    pub fn new(config: LlmConfig) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ServiceError::External(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    fn request_body(&self, system_prompt: &str, user_message: &str) -> Value {
        json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_message }
            ],
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS
        })
    }
}

/// Extract `choices[0].message.content` from a completion response
pub fn parse_completion(v: &Value) -> Result<String, ServiceError> {
    v["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.trim().to_string())
        .ok_or_else(|| ServiceError::External("missing `choices[0].message.content` in response".to_string()))
}

#[async_trait]
impl LlmClient for OpenAiCompatibleClient {
    async fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String, ServiceError> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.config.api_key))
                .map_err(|e| ServiceError::External(format!("invalid authorization header: {e}")))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        debug!(url = %url, model = %self.config.model, "sending LLM request");

        let resp = self
            .http
            .post(&url)
            .headers(headers)
            .json(&self.request_body(system_prompt, user_message))
            .send()
            .await
            .map_err(|e| ServiceError::External(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ServiceError::External(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            return Err(ServiceError::External(format!("API returned {status}: {text}")));
        }

        let v: Value = serde_json::from_str(&text)
            .map_err(|e| ServiceError::External(format!("invalid JSON response: {e}")))?;

        parse_completion(&v)
    }
}

/// Dependencies of the chatbot
#[derive(Clone)]
pub struct ChatContext {
    pub cache: ResponseCache,
    pub medications: Arc<dyn MedicationRepositoryTrait>,
    pub fitness: Arc<dyn FitnessRepositoryTrait>,
    pub llm: Option<Arc<dyn LlmClient>>,
}

impl ChatContext {
    pub fn new(
        medications: Arc<dyn MedicationRepositoryTrait>,
        fitness: Arc<dyn FitnessRepositoryTrait>,
    ) -> Self {
        Self {
            cache: ResponseCache::default(),
            medications,
            fitness,
            llm: None,
        }
    }

    pub fn with_cache(mut self, cache: ResponseCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Attach an [`OpenAiCompatibleClient`] when `LLM_API_KEY`/`GROQ_API_KEY` is set
    pub fn with_llm_from_env(self) -> Self {
        match LlmConfig::from_env().map(OpenAiCompatibleClient::new) {
            Some(Ok(client)) => {
                info!("Chatbot using LLM backend");
                self.with_llm(Arc::new(client))
            }
            Some(Err(e)) => {
                warn!("LLM client could not be created, using keyword answers: {}", e);
                self
            }
            None => {
                info!("No LLM API key configured, using keyword answers");
                self
            }
        }
    }

    async fn medication_answer(&self, user_id: i64, query: &str) -> Option<String> {
        let words = query
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|w| w.chars().count() >= 3);

        for word in words {
            match self.medications.search_for_user(user_id, word).await {
                Ok(found) => {
                    if let Some(med) = found.into_iter().next().map(conversions::convert_to_domain_medication) {
                        return Some(format!(
                            "📘 **Your Medication Info:**\n\nMedication: **{}**\nSchedule: **{}**\nNotes: {}",
                            med.med_name,
                            med.schedule,
                            med.notes.as_deref().unwrap_or("No notes")
                        ));
                    }
                }
                Err(e) => {
                    warn!("Medication lookup failed for user {}: {}", user_id, e);
                    return None;
                }
            }
        }

        None
    }

    async fn insight_answer(&self, user_id: i64) -> Option<String> {
        let records: Vec<_> = match self.fitness.list_for_user(user_id, DEFAULT_HISTORY_LIMIT).await {
            Ok(records) => records.into_iter().map(conversions::convert_to_domain_fitness).collect(),
            Err(e) => {
                warn!("Fitness lookup failed for user {}: {}", user_id, e);
                return None;
            }
        };

        let summary = summarize(&records);
        Some(format!(
            "📊 **Your Health Insights:**\n\nAverage steps: {:.0}\nCalories: {}\nHeart rate status: {}",
            summary.average_steps, summary.calories_status, summary.heart_rate_status
        ))
    }

    /// Answer a free-text health question for `user_id`
    pub async fn process_health_query(&self, user_id: i64, query: &str) -> String {
        let original = query.trim();
        let normalized = original.to_lowercase();

        if let Some(cached) = self.cache.get(&normalized) {
            debug!("Chat cache hit");
            return format!("(cached) {}", cached);
        }

        if MEDICATION_KEYWORDS.iter().any(|k| normalized.contains(k)) {
            if let Some(answer) = self.medication_answer(user_id, original).await {
                return answer;
            }
        }

        if INSIGHT_KEYWORDS.iter().any(|k| normalized.contains(k)) {
            if let Some(answer) = self.insight_answer(user_id).await {
                return answer;
            }
        }

        let response = match &self.llm {
            Some(llm) => match llm.complete(SYSTEM_PROMPT, original).await {
                Ok(response) => response,
                Err(e) => {
                    warn!("LLM request failed: {}", e);
                    return format!("AI Assistant Error: {}", e);
                }
            },
            None => keyword_answer(&normalized).to_string(),
        };

        self.cache.insert(&normalized, &response);
        response
    }
}

fn has_word(query: &str, words: &[&str]) -> bool {
    query
        .split(|c: char| !c.is_alphanumeric())
        .any(|w| words.contains(&w))
}

/// Canned guidance used when no LLM is configured
pub fn keyword_answer(query: &str) -> &'static str {
    if has_word(query, &["hello", "hi", "hey"]) {
        "Hello! I'm your health assistant. Ask me about your medications, sleep, hydration or activity."
    } else if query.contains("sleep") {
        "Most adults need 7-9 hours of sleep. Keep a regular schedule and avoid screens before bed."
    } else if query.contains("water") || query.contains("hydrat") {
        "Aim for about 2-3 litres of water a day, more when it is hot or you are active."
    } else if query.contains("exercise") || query.contains("steps") || query.contains("workout") {
        "Try for at least 150 minutes of moderate activity a week; 7,000-10,000 steps a day is a good target."
    } else {
        "I can help with your medications and general wellness tips. For anything serious, please consult a doctor."
    }
}

/// Purge expired chat answers and revoked tokens once a minute
#[cfg(feature = "with-tokio")]
pub fn start_cleanup_task(cache: ResponseCache) -> tokio::task::JoinHandle<()> {
    use crate::auth::token_blacklist::blacklist;

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));

        loop {
            interval.tick().await;
            let purged = cache.purge_expired();
            let revoked = blacklist().cleanup_expired_tokens();
            debug!("Cleanup removed {} cached answers and {} expired revocations", purged, revoked);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use health_tracker_data::repository::mocks::{MockFitnessRepository, MockMedicationRepository};

    fn context() -> ChatContext {
        let medications =
            MockMedicationRepository::with_medications(vec![MockMedicationRepository::record(1, 1, "Metformin", "Twice daily")]);

        let fitness = MockFitnessRepository::with_records(vec![
            MockFitnessRepository::record(1, 1, 8000, 2100, 70, "2025-01-01"),
            MockFitnessRepository::record(2, 1, 6000, 1900, 65, "2025-01-02"),
            MockFitnessRepository::record(3, 1, 10000, 2500, 75, "2025-01-03"),
        ]);

        ChatContext::new(Arc::new(medications), Arc::new(fitness))
    }

    #[test]
    fn test_cache_hit_and_expiry() {
        let cache = ResponseCache::new(Duration::from_millis(50), 10);
        cache.insert("q", "answer");
        assert_eq!(cache.get("q").as_deref(), Some("answer"));
        assert_eq!(cache.get("other"), None);

        std::thread::sleep(Duration::from_millis(80));
        assert_eq!(cache.get("q"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_evicts_oldest_when_full() {
        let cache = ResponseCache::new(Duration::from_secs(60), 2);
        cache.insert("a", "1");
        std::thread::sleep(Duration::from_millis(2));
        cache.insert("b", "2");
        cache.insert("c", "3");

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("c").as_deref(), Some("3"));
    }

    #[test]
    fn test_purge_expired() {
        let cache = ResponseCache::new(Duration::from_millis(20), 10);
        cache.insert("a", "1");
        std::thread::sleep(Duration::from_millis(40));
        cache.insert("b", "2");

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_medication_question_uses_own_records() {
        let ctx = context();

        let answer = ctx.process_health_query(1, "What is my metformin dose?").await;
        assert_eq!(
            answer,
            "📘 **Your Medication Info:**\n\nMedication: **Metformin**\nSchedule: **Twice daily**\nNotes: No notes"
        );

        // another user's question does not see user 1's medications
        let other = ctx.process_health_query(2, "What is my metformin dose?").await;
        assert!(!other.contains("Metformin"));
    }

    #[tokio::test]
    async fn test_insight_question() {
        let ctx = context();
        let answer = ctx.process_health_query(1, "Give me a health review").await;

        assert!(answer.contains("Average steps: 8000"));
        assert!(answer.contains("Calories: Above target"));
        assert!(answer.contains("Heart rate status: Normal"));
    }

    #[tokio::test]
    async fn test_keyword_fallback_is_cached() {
        let ctx = context();

        let first = ctx.process_health_query(1, "  How much WATER should I drink? ").await;
        assert!(first.contains("litres"));

        let second = ctx.process_health_query(1, "how much water should i drink?").await;
        assert_eq!(second, format!("(cached) {}", first));
    }

    #[tokio::test]
    async fn test_llm_answer_and_error() {
        let mut llm = MockLlmClient::new();
        llm.expect_complete()
            .withf(|system, user| system == SYSTEM_PROMPT && user == "Is coffee bad for me?")
            .times(1)
            .returning(|_, _| Ok("In moderation, coffee is fine.".to_string()));
        let ctx = context().with_llm(Arc::new(llm));

        assert_eq!(ctx.process_health_query(1, "Is coffee bad for me?").await, "In moderation, coffee is fine.");
        assert_eq!(
            ctx.process_health_query(1, "is coffee bad for me?").await,
            "(cached) In moderation, coffee is fine."
        );

        let mut failing = MockLlmClient::new();
        failing
            .expect_complete()
            .returning(|_, _| Err(ServiceError::External("timeout".to_string())));
        let ctx = context().with_llm(Arc::new(failing));

        let answer = ctx.process_health_query(1, "Tell me a joke").await;
        assert_eq!(answer, "AI Assistant Error: External service error: timeout");
        assert!(ctx.cache.is_empty());
    }

    #[test]
    fn test_keyword_answers() {
        assert!(keyword_answer("hi there").starts_with("Hello"));
        assert!(keyword_answer("which is better").starts_with("I can help"));
        assert!(keyword_answer("how many steps").contains("steps a day"));
        assert!(keyword_answer("sleep tips").contains("7-9 hours"));
    }

    #[test]
    fn test_parse_completion() {
        let v = json!({ "choices": [{ "message": { "role": "assistant", "content": " Hi! " } }] });
        assert_eq!(parse_completion(&v).unwrap(), "Hi!");
        assert!(parse_completion(&json!({ "choices": [] })).is_err());
    }

    #[test]
    fn test_request_body_settings() {
        let client = OpenAiCompatibleClient::new(LlmConfig {
            api_key: "k".to_string(),
            base_url: LlmConfig::DEFAULT_BASE_URL.to_string(),
            model: "test-model".to_string(),
            timeout: Duration::from_secs(1),
        })
        .unwrap();

        let body = client.request_body(SYSTEM_PROMPT, "hello");
        assert_eq!(body["model"], "test-model");
        assert_eq!(body["temperature"], 0.4);
        assert_eq!(body["max_tokens"], 300);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hello");
    }
}
