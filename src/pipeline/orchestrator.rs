//! The analysis retry loop: dispatch, classify, delay, retry or terminate.

use std::time::Instant;

use serde_json::Value;

use super::backoff::{suggested_retry_interval, RetryPolicy, Sleeper, ThreadSleeper};
use super::gemini::{ModelClient, ModelError};
use super::parser::{extract_json, ExtractError};
use super::prompt::build_master_prompt;
use super::AnalysisError;
use crate::models::{AnalysisRequest, Framework};

/// Guidance appended to the fatal rate-limit error.
const RATE_LIMIT_GUIDANCE: &str = "Suggestions: wait a few minutes and try again, \
switch to a lighter model via GEMINI_MODEL, reduce the number of frameworks \
selected, or upgrade to a paid API plan.";

/// Outcome of one dispatch, classified. Exactly one per attempt.
#[derive(Debug)]
enum AttemptOutcome {
    /// Valid structured payload extracted. Terminal.
    Success(Value),
    /// Remote signalled quota exhaustion. Exponential backoff applies.
    RateLimited { body: String },
    /// Remote rejected the request as malformed. Never retried.
    InvalidRequest(String),
    /// Any other failure of the call itself. Short fixed delay.
    Transient(ModelError),
    /// Call returned text but no JSON object could be located. Retryable
    /// with the short delay — the fix is "ask again", not "wait for quota".
    NoJson,
    /// A JSON-shaped substring was found but failed to parse.
    MalformedJson(String),
}

impl AttemptOutcome {
    fn label(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::RateLimited { .. } => "rate_limited",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Transient(_) => "transient",
            Self::NoJson => "no_json",
            Self::MalformedJson(_) => "malformed_json",
        }
    }
}

fn classify_attempt(call: Result<String, ModelError>) -> AttemptOutcome {
    match call {
        Ok(text) => match extract_json(&text) {
            Ok(value) => AttemptOutcome::Success(value),
            Err(ExtractError::NoJson) => AttemptOutcome::NoJson,
            Err(ExtractError::MalformedJson(e)) => AttemptOutcome::MalformedJson(e),
        },
        Err(ModelError::RateLimited { body }) => AttemptOutcome::RateLimited { body },
        Err(ModelError::InvalidRequest(msg)) => AttemptOutcome::InvalidRequest(msg),
        Err(other) => AttemptOutcome::Transient(other),
    }
}

/// Drives the bounded-retry backoff loop around the inference call and the
/// tolerant extraction of its payload.
pub struct AnalysisOrchestrator {
    client: Box<dyn ModelClient + Send + Sync>,
    policy: RetryPolicy,
    sleeper: Box<dyn Sleeper + Send + Sync>,
}

impl AnalysisOrchestrator {
    pub fn new(
        client: Box<dyn ModelClient + Send + Sync>,
        policy: RetryPolicy,
        sleeper: Box<dyn Sleeper + Send + Sync>,
    ) -> Self {
        Self {
            client,
            policy,
            sleeper,
        }
    }

    /// Production orchestrator: env-derived policy, real sleeps.
    pub fn with_defaults(client: Box<dyn ModelClient + Send + Sync>) -> Self {
        Self::new(client, RetryPolicy::from_env(), Box::new(ThreadSleeper))
    }

    /// Build the master prompt for `request` and run it to a terminal state.
    pub fn analyze(
        &self,
        request: &AnalysisRequest,
        frameworks_content: &[(Framework, String)],
    ) -> Result<Value, AnalysisError> {
        let prompt = build_master_prompt(request, frameworks_content);
        let token_estimate = (prompt.split_whitespace().count() as f32 * 1.3) as usize;
        tracing::debug!(token_estimate, "Master prompt built");
        self.run_prompt(&prompt)
    }

    /// The state machine. One dispatch per attempt; every outcome is either
    /// terminal or schedules a delay and another attempt. There is no
    /// partial success — a response either fully parses or the attempt is
    /// discarded.
    pub fn run_prompt(&self, prompt: &str) -> Result<Value, AnalysisError> {
        let max_attempts = self.policy.max_attempts;
        let mut last_parse_error = String::new();

        for attempt in 0..max_attempts {
            let start = Instant::now();
            let outcome = classify_attempt(self.client.generate(prompt));
            tracing::info!(
                attempt = attempt + 1,
                max_attempts,
                outcome = outcome.label(),
                elapsed_ms = %start.elapsed().as_millis(),
                "Analysis dispatch complete"
            );

            let retries_remain = attempt + 1 < max_attempts;
            match outcome {
                AttemptOutcome::Success(value) => return Ok(value),

                AttemptOutcome::InvalidRequest(msg) => {
                    return Err(AnalysisError::InvalidRequest(msg));
                }

                AttemptOutcome::RateLimited { body } => {
                    if !retries_remain {
                        return Err(AnalysisError::RateLimitExceeded {
                            attempts: max_attempts,
                            guidance: RATE_LIMIT_GUIDANCE.into(),
                        });
                    }
                    let delay = self
                        .policy
                        .rate_limit_delay(attempt, suggested_retry_interval(&body));
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_attempts,
                        delay_secs = delay.as_secs(),
                        "Rate limit hit, backing off"
                    );
                    self.sleeper.sleep(delay);
                }

                AttemptOutcome::Transient(err) => {
                    if !retries_remain {
                        return Err(AnalysisError::Transport {
                            attempts: max_attempts,
                            source: err,
                        });
                    }
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_attempts,
                        error = %err,
                        "Model call failed, retrying shortly"
                    );
                    self.sleeper.sleep(self.policy.transient_delay);
                }

                AttemptOutcome::NoJson => {
                    last_parse_error = "no JSON object found in response".into();
                    if !retries_remain {
                        return Err(AnalysisError::NoParsableResponse {
                            attempts: max_attempts,
                            last_error: last_parse_error,
                        });
                    }
                    tracing::warn!(attempt = attempt + 1, "No JSON found in response, re-asking");
                    self.sleeper.sleep(self.policy.transient_delay);
                }

                AttemptOutcome::MalformedJson(parse_error) => {
                    last_parse_error = parse_error;
                    if !retries_remain {
                        return Err(AnalysisError::NoParsableResponse {
                            attempts: max_attempts,
                            last_error: last_parse_error,
                        });
                    }
                    tracing::warn!(
                        attempt = attempt + 1,
                        error = %last_parse_error,
                        "JSON parsing error, re-asking"
                    );
                    self.sleeper.sleep(self.policy.transient_delay);
                }
            }
        }

        // max_attempts >= 1 means the loop always terminates inside; this
        // arm only exists for a zero-attempt policy.
        Err(AnalysisError::NoParsableResponse {
            attempts: 0,
            last_error: last_parse_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::backoff::RecordingSleeper;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Scripted client: pops one result per call, counts dispatches.
    struct ScriptedModelClient {
        script: Mutex<VecDeque<Result<String, ModelError>>>,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedModelClient {
        fn new(script: Vec<Result<String, ModelError>>, calls: Arc<AtomicUsize>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls,
            }
        }
    }

    impl ModelClient for ScriptedModelClient {
        fn generate(&self, _prompt: &str) -> Result<String, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("{}".into()))
        }
    }

    fn policy(max_attempts: usize) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_secs(10),
            transient_delay: Duration::from_secs(5),
        }
    }

    fn orchestrator_with(
        script: Vec<Result<String, ModelError>>,
        max_attempts: usize,
    ) -> (AnalysisOrchestrator, Arc<AtomicUsize>, Arc<RecordingSleeper>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let sleeper = Arc::new(RecordingSleeper::new());
        let orchestrator = AnalysisOrchestrator::new(
            Box::new(ScriptedModelClient::new(script, calls.clone())),
            policy(max_attempts),
            Box::new(SharedSleeper(sleeper.clone())),
        );
        (orchestrator, calls, sleeper)
    }

    /// Adapter so the test keeps a handle on the sleeper the orchestrator owns.
    struct SharedSleeper(Arc<RecordingSleeper>);

    impl Sleeper for SharedSleeper {
        fn sleep(&self, duration: Duration) {
            self.0.sleep(duration);
        }
    }

    fn rate_limited(body: &str) -> Result<String, ModelError> {
        Err(ModelError::RateLimited { body: body.into() })
    }

    #[test]
    fn rate_limited_every_attempt_dispatches_exactly_n_times() {
        for n in 1..=4 {
            let script = (0..n).map(|_| rate_limited("quota")).collect();
            let (orchestrator, calls, sleeper) = orchestrator_with(script, n);

            let err = orchestrator.run_prompt("prompt").unwrap_err();
            assert!(matches!(
                err,
                AnalysisError::RateLimitExceeded { attempts, .. } if attempts == n
            ));
            assert_eq!(calls.load(Ordering::SeqCst), n);

            // k-th retry delay is base * 2^(k-1); the final attempt does not sleep.
            let expected: Vec<_> = (0..n - 1)
                .map(|k| Duration::from_secs(10 * 2u64.pow(k as u32)))
                .collect();
            assert_eq!(sleeper.recorded(), expected);
        }
    }

    #[test]
    fn remote_suggested_interval_overrides_base_delay() {
        let script = vec![
            rate_limited("retry_delay { seconds: 30 }"),
            rate_limited("no hint this time"),
            rate_limited("quota"),
        ];
        let (orchestrator, _, sleeper) = orchestrator_with(script, 3);

        orchestrator.run_prompt("prompt").unwrap_err();
        assert_eq!(
            sleeper.recorded(),
            vec![Duration::from_secs(30), Duration::from_secs(20)]
        );
    }

    #[test]
    fn invalid_request_is_fatal_without_retry() {
        let script = vec![Err(ModelError::InvalidRequest("bad field".into()))];
        let (orchestrator, calls, sleeper) = orchestrator_with(script, 3);

        let err = orchestrator.run_prompt("prompt").unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidRequest(msg) if msg == "bad field"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(sleeper.recorded().is_empty());
    }

    #[test]
    fn no_json_then_success_uses_short_delay() {
        let script = vec![
            Ok("The model wrote prose with no payload.".into()),
            Ok("Here you go:\n```json\n{\"aiRecommendationSummary\":\"ok\"}\n```".into()),
        ];
        let (orchestrator, calls, sleeper) = orchestrator_with(script, 3);

        let value = orchestrator.run_prompt("prompt").unwrap();
        assert_eq!(value["aiRecommendationSummary"], "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(sleeper.recorded(), vec![Duration::from_secs(5)]);
    }

    #[test]
    fn malformed_json_exhausts_into_no_parsable_response() {
        let script = vec![
            Ok("see {curly note} below".into()),
            Ok("see {curly note} below".into()),
            Ok("see {curly note} below".into()),
        ];
        let (orchestrator, calls, sleeper) = orchestrator_with(script, 3);

        let err = orchestrator.run_prompt("prompt").unwrap_err();
        match err {
            AnalysisError::NoParsableResponse { attempts, last_error } => {
                assert_eq!(attempts, 3);
                assert!(!last_error.is_empty());
            }
            other => panic!("expected NoParsableResponse, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            sleeper.recorded(),
            vec![Duration::from_secs(5), Duration::from_secs(5)]
        );
    }

    #[test]
    fn transient_error_then_success_propagates_value() {
        let script = vec![
            Err(ModelError::HttpClient("connection reset".into())),
            Ok("{\"planByPlanReview\":[]}".into()),
        ];
        let (orchestrator, calls, sleeper) = orchestrator_with(script, 3);

        let value = orchestrator.run_prompt("prompt").unwrap();
        assert!(value.get("planByPlanReview").is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(sleeper.recorded(), vec![Duration::from_secs(5)]);
    }

    #[test]
    fn transient_exhaustion_propagates_original_error() {
        let script = vec![
            Err(ModelError::HttpClient("reset".into())),
            Err(ModelError::Remote { status: 500, body: "boom".into() }),
        ];
        let (orchestrator, _, _) = orchestrator_with(script, 2);

        let err = orchestrator.run_prompt("prompt").unwrap_err();
        match err {
            AnalysisError::Transport { attempts, source } => {
                assert_eq!(attempts, 2);
                assert!(matches!(source, ModelError::Remote { status: 500, .. }));
            }
            other => panic!("expected Transport, got {other:?}"),
        }
    }

    #[test]
    fn first_attempt_success_never_sleeps() {
        let script = vec![Ok("{\"aiRecommendationSummary\":\"fine\"}".into())];
        let (orchestrator, calls, sleeper) = orchestrator_with(script, 3);

        orchestrator.run_prompt("prompt").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(sleeper.recorded().is_empty());
    }
}
