// src/generation/client.rs

use std::fmt;
use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

/// Failure of one generation attempt against one model identifier.
///
/// Provider messages are carried as opaque strings for display. The only
/// structure imposed is the coarse not-found / timeout / other split used
/// for fallback logging.
#[derive(Debug, Clone)]
pub enum GenerationError {
    /// The provider does not know this model identifier.
    ModelNotFound(String),

    /// The call exceeded the configured time bound.
    Timeout(String),

    /// Anything else: transport errors, quota, malformed responses.
    Unavailable(String),
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationError::ModelNotFound(msg) => write!(f, "model not found: {}", msg),
            GenerationError::Timeout(msg) => write!(f, "generation timed out: {}", msg),
            GenerationError::Unavailable(msg) => write!(f, "generation failed: {}", msg),
        }
    }
}

impl std::error::Error for GenerationError {}

/// Incremental delivery: a finite, non-restartable sequence of text
/// fragments. Once consumed, a new generation call is required.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<String, GenerationError>> + Send>>;

/// A completed generation, tagged with the model that produced it.
#[derive(Debug, Clone)]
pub struct Generated {
    pub text: String,
    pub model: String,
}

/// Boundary to the hosted text-generation service.
///
/// Implementations never panic across this boundary: every failure mode
/// comes back as a `GenerationError`. They also do not touch session state;
/// callers decide what to store.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Whole-response generation against a single model identifier.
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, GenerationError>;

    /// Incremental generation against a single model identifier.
    async fn stream(&self, model: &str, prompt: &str) -> Result<ChunkStream, GenerationError>;
}

/// Tries candidate model identifiers in order and returns the first success.
///
/// This is the resolution mechanism for the provider's unstable model
/// catalog, not a transient-failure retry policy: each identifier is tried
/// once, and exhaustion reports the last underlying error.
pub async fn generate_with_fallback(
    backend: &dyn GenerationBackend,
    candidates: &[String],
    prompt: &str,
) -> Result<Generated, GenerationError> {
    let mut last_err = GenerationError::Unavailable("no candidate models configured".to_string());

    for model in candidates {
        match backend.complete(model, prompt).await {
            Ok(text) => {
                tracing::debug!("generation succeeded with model {}", model);
                return Ok(Generated {
                    text,
                    model: model.clone(),
                });
            }
            Err(err) => {
                match &err {
                    GenerationError::ModelNotFound(_) => {
                        tracing::info!("model {} not available, trying next candidate", model)
                    }
                    _ => tracing::warn!("model {} failed: {}", model, err),
                }
                last_err = err;
            }
        }
    }

    Err(last_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use std::sync::Mutex;

    /// Fails for every model name listed in `failing`, succeeds otherwise.
    /// Records the order of attempted models.
    struct ScriptedBackend {
        failing: Vec<String>,
        attempts: Mutex<Vec<String>>,
    }

    impl ScriptedBackend {
        fn new(failing: &[&str]) -> Self {
            Self {
                failing: failing.iter().map(|m| m.to_string()).collect(),
                attempts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl GenerationBackend for ScriptedBackend {
        async fn complete(&self, model: &str, _prompt: &str) -> Result<String, GenerationError> {
            self.attempts.lock().unwrap().push(model.to_string());
            if self.failing.iter().any(|m| m == model) {
                Err(GenerationError::ModelNotFound(format!(
                    "{} is not supported",
                    model
                )))
            } else {
                Ok(format!("text from {}", model))
            }
        }

        async fn stream(&self, model: &str, _prompt: &str) -> Result<ChunkStream, GenerationError> {
            let chunks: Vec<Result<String, GenerationError>> =
                vec![Ok(format!("text from {}", model))];
            Ok(Box::pin(stream::iter(chunks)))
        }
    }

    fn candidates(names: &[&str]) -> Vec<String> {
        names.iter().map(|m| m.to_string()).collect()
    }

    #[tokio::test]
    async fn stops_at_first_working_model() {
        let backend = ScriptedBackend::new(&["a", "b"]);
        let models = candidates(&["a", "b", "c", "d"]);

        let generated = generate_with_fallback(&backend, &models, "prompt")
            .await
            .unwrap();

        assert_eq!(generated.model, "c");
        assert_eq!(generated.text, "text from c");
        // "d" must never be attempted once "c" succeeds.
        assert_eq!(*backend.attempts.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn exhaustion_returns_the_last_error() {
        let backend = ScriptedBackend::new(&["a", "b"]);
        let models = candidates(&["a", "b"]);

        let err = generate_with_fallback(&backend, &models, "prompt")
            .await
            .unwrap_err();

        let msg = err.to_string();
        assert!(!msg.is_empty());
        assert!(msg.contains("b is not supported"));
    }

    #[tokio::test]
    async fn empty_candidate_list_is_a_failure_not_a_panic() {
        let backend = ScriptedBackend::new(&[]);

        let err = generate_with_fallback(&backend, &[], "prompt").await.unwrap_err();
        assert!(err.to_string().contains("no candidate models"));
    }
}
