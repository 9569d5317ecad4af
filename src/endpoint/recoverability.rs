//! Recoverability Resolution
//!
//! Failure policy for the endpoint: retry counts, delayed-retry backoff,
//! automatic rate limiting under consecutive failures, and the programmatic
//! hooks the messaging runtime invokes when processing fails. The core only
//! resolves the policy; executing retries is the runtime's job.
//!
//! Resolution order is fixed and observable: error queue, immediate retries,
//! delayed retries and time increase, programmatic callbacks, automatic rate
//! limiting. Later steps may reference earlier-bound callbacks, so the order
//! is part of the contract.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tracing::debug;

use crate::config::{values, ConfigResult, ConfigSection, ConfigurationError};

/// Default queue failed messages are routed to
pub const DEFAULT_ERROR_QUEUE: &str = "error";

/// Async notification invoked when automatic rate limiting starts or ends
pub type RateLimitCallback = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Header customization applied to a failed message before it is routed to
/// the error queue
pub type FailedMessageHook = Arc<dyn Fn(&mut BTreeMap<String, String>) + Send + Sync>;

/// Programmatic decision override consulted instead of the default policy
pub type RecoverabilityDecider = Arc<dyn Fn(&FailureContext) -> RecoverabilityAction + Send + Sync>;

/// What the runtime knows about a failing message when it consults the
/// custom recoverability policy
#[derive(Debug, Clone)]
pub struct FailureContext {
    pub message_id: String,
    pub error: String,
    pub immediate_processing_failures: u32,
    pub delayed_deliveries: u32,
}

/// Decision returned by a custom recoverability policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoverabilityAction {
    ImmediateRetry,
    DelayedRetry { delay: Duration },
    MoveToError { queue: String },
    Discard,
}

/// Automatic rate limiting applied after consecutive processing failures.
///
/// Only ever present as a whole: a configured failure threshold makes the
/// cooldown mandatory, and an absent threshold disables rate limiting
/// entirely rather than enabling it with defaults.
#[derive(Clone)]
pub struct RateLimitPolicy {
    pub consecutive_failures: u32,
    pub cooldown: Duration,
    pub on_started: Option<RateLimitCallback>,
    pub on_ended: Option<RateLimitCallback>,
}

impl fmt::Debug for RateLimitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimitPolicy")
            .field("consecutive_failures", &self.consecutive_failures)
            .field("cooldown", &self.cooldown)
            .field("on_started", &callback_slot(self.on_started.is_some()))
            .field("on_ended", &callback_slot(self.on_ended.is_some()))
            .finish()
    }
}

/// Resolved failure policy carried by the sealed endpoint definition
#[derive(Clone)]
pub struct RecoverabilityPolicy {
    pub error_queue: String,
    pub immediate_retries: Option<u32>,
    pub delayed_retries: Option<u32>,
    pub delayed_time_increase: Option<Duration>,
    pub on_failed_message: Option<FailedMessageHook>,
    pub custom_policy: Option<RecoverabilityDecider>,
    pub rate_limit: Option<RateLimitPolicy>,
}

impl Default for RecoverabilityPolicy {
    fn default() -> Self {
        RecoverabilityPolicy {
            error_queue: DEFAULT_ERROR_QUEUE.to_string(),
            immediate_retries: None,
            delayed_retries: None,
            delayed_time_increase: None,
            on_failed_message: None,
            custom_policy: None,
            rate_limit: None,
        }
    }
}

impl fmt::Debug for RecoverabilityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecoverabilityPolicy")
            .field("error_queue", &self.error_queue)
            .field("immediate_retries", &self.immediate_retries)
            .field("delayed_retries", &self.delayed_retries)
            .field("delayed_time_increase", &self.delayed_time_increase)
            .field(
                "on_failed_message",
                &callback_slot(self.on_failed_message.is_some()),
            )
            .field("custom_policy", &callback_slot(self.custom_policy.is_some()))
            .field("rate_limit", &self.rate_limit)
            .finish()
    }
}

fn callback_slot(set: bool) -> &'static str {
    if set {
        "<registered>"
    } else {
        "<unset>"
    }
}

/// Programmatic hooks registered on the builder before finalization, bound
/// into the policy unconditionally during resolution.
#[derive(Default)]
pub(crate) struct RecoverabilityCallbacks {
    pub on_rate_limit_started: Option<RateLimitCallback>,
    pub on_rate_limit_ended: Option<RateLimitCallback>,
    pub on_failed_message: Option<FailedMessageHook>,
    pub custom_policy: Option<RecoverabilityDecider>,
}

/// Resolve the recoverability policy from the `Recoverability` section.
///
/// A configured rate-limit threshold makes the cooldown mandatory; a missing
/// or malformed cooldown aborts resolution rather than silently disabling
/// rate limiting.
pub(crate) fn resolve(
    section: Option<&ConfigSection<'_>>,
    callbacks: RecoverabilityCallbacks,
) -> ConfigResult<RecoverabilityPolicy> {
    let mut policy = RecoverabilityPolicy::default();

    if let Some(section) = section {
        if let Some(error_queue) = section.non_blank("ErrorQueue") {
            policy.error_queue = error_queue;
        }

        let immediate = section.section("Immediate");
        if let Some(raw) = immediate.value("NumberOfRetries") {
            policy.immediate_retries = Some(values::parse_u32(
                &raw,
                &immediate.key_path("NumberOfRetries"),
            )?);
        }

        let delayed = section.section("Delayed");
        if let Some(raw) = delayed.value("NumberOfRetries") {
            policy.delayed_retries =
                Some(values::parse_u32(&raw, &delayed.key_path("NumberOfRetries"))?);
        }
        if let Some(raw) = delayed.value("TimeIncrease") {
            policy.delayed_time_increase = Some(values::parse_duration(
                &raw,
                &delayed.key_path("TimeIncrease"),
            )?);
        }
    }

    policy.on_failed_message = callbacks.on_failed_message;
    policy.custom_policy = callbacks.custom_policy;

    if let Some(section) = section {
        let rate_limiting = section.section("AutomaticRateLimiting");
        if let Some(raw) = rate_limiting.value("ConsecutiveFailures") {
            let consecutive_failures = values::parse_u32(
                &raw,
                &rate_limiting.key_path("ConsecutiveFailures"),
            )?;

            let cooldown_key = rate_limiting.key_path("TimeToWaitBetweenThrottledAttempts");
            let cooldown = match rate_limiting.value("TimeToWaitBetweenThrottledAttempts") {
                Some(raw) => values::parse_duration(&raw, &cooldown_key)?,
                None => {
                    return Err(ConfigurationError::dependent_value_missing(
                        cooldown_key,
                        rate_limiting.key_path("ConsecutiveFailures"),
                    ))
                }
            };

            policy.rate_limit = Some(RateLimitPolicy {
                consecutive_failures,
                cooldown,
                on_started: callbacks.on_rate_limit_started,
                on_ended: callbacks.on_rate_limit_ended,
            });
        }
    }

    debug!(
        error_queue = %policy.error_queue,
        immediate_retries = ?policy.immediate_retries,
        delayed_retries = ?policy.delayed_retries,
        rate_limited = policy.rate_limit.is_some(),
        "recoverability policy resolved"
    );

    Ok(policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemorySource;

    fn recoverability_section(source: &MemorySource) -> ConfigSection<'_> {
        ConfigSection::named(source, "Recoverability")
    }

    #[test]
    fn defaults_apply_without_configuration() {
        let policy = resolve(None, RecoverabilityCallbacks::default()).unwrap();

        assert_eq!(policy.error_queue, "error");
        assert_eq!(policy.immediate_retries, None);
        assert_eq!(policy.delayed_retries, None);
        assert_eq!(policy.delayed_time_increase, None);
        assert!(policy.rate_limit.is_none());
    }

    #[test]
    fn error_queue_is_read_from_configuration() {
        let source = MemorySource::new().set("Recoverability:ErrorQueue", "custom-error");
        let policy = resolve(
            Some(&recoverability_section(&source)),
            RecoverabilityCallbacks::default(),
        )
        .unwrap();

        assert_eq!(policy.error_queue, "custom-error");
    }

    #[test]
    fn retry_counts_and_time_increase_resolve_independently() {
        let source = MemorySource::new()
            .set("Recoverability:Immediate:NumberOfRetries", "14")
            .set("Recoverability:Delayed:TimeIncrease", "00:00:30");
        let policy = resolve(
            Some(&recoverability_section(&source)),
            RecoverabilityCallbacks::default(),
        )
        .unwrap();

        assert_eq!(policy.immediate_retries, Some(14));
        assert_eq!(policy.delayed_retries, None);
        assert_eq!(policy.delayed_time_increase, Some(Duration::from_secs(30)));
    }

    #[test]
    fn invalid_retry_count_aborts_resolution() {
        let source =
            MemorySource::new().set("Recoverability:Immediate:NumberOfRetries", "cannot be parsed");
        let error = resolve(
            Some(&recoverability_section(&source)),
            RecoverabilityCallbacks::default(),
        )
        .unwrap_err();

        assert!(error
            .to_string()
            .contains("Recoverability:Immediate:NumberOfRetries"));
    }

    #[test]
    fn rate_limiting_requires_cooldown_when_threshold_is_set() {
        let source =
            MemorySource::new().set("Recoverability:AutomaticRateLimiting:ConsecutiveFailures", "5");
        let error = resolve(
            Some(&recoverability_section(&source)),
            RecoverabilityCallbacks::default(),
        )
        .unwrap_err();

        assert!(matches!(
            error,
            ConfigurationError::DependentValueMissing { .. }
        ));
    }

    #[test]
    fn rate_limiting_resolves_threshold_and_cooldown() {
        let source = MemorySource::new()
            .set("Recoverability:AutomaticRateLimiting:ConsecutiveFailures", "5")
            .set(
                "Recoverability:AutomaticRateLimiting:TimeToWaitBetweenThrottledAttempts",
                "00:01:00",
            );
        let policy = resolve(
            Some(&recoverability_section(&source)),
            RecoverabilityCallbacks::default(),
        )
        .unwrap();

        let rate_limit = policy.rate_limit.expect("rate limiting should be enabled");
        assert_eq!(rate_limit.consecutive_failures, 5);
        assert_eq!(rate_limit.cooldown, Duration::from_secs(60));
        assert!(rate_limit.on_started.is_none());
    }

    #[test]
    fn absent_threshold_disables_rate_limiting_even_with_cooldown_set() {
        let source = MemorySource::new().set(
            "Recoverability:AutomaticRateLimiting:TimeToWaitBetweenThrottledAttempts",
            "00:01:00",
        );
        let policy = resolve(
            Some(&recoverability_section(&source)),
            RecoverabilityCallbacks::default(),
        )
        .unwrap();

        assert!(policy.rate_limit.is_none());
    }

    #[test]
    fn programmatic_callbacks_bind_into_the_policy() {
        use futures::FutureExt;

        let source = MemorySource::new()
            .set("Recoverability:AutomaticRateLimiting:ConsecutiveFailures", "3")
            .set(
                "Recoverability:AutomaticRateLimiting:TimeToWaitBetweenThrottledAttempts",
                "00:00:10",
            );
        let callbacks = RecoverabilityCallbacks {
            on_rate_limit_started: Some(Arc::new(|| async {}.boxed())),
            on_rate_limit_ended: None,
            on_failed_message: Some(Arc::new(|headers| {
                headers.insert("diagnostic".into(), "failed".into());
            })),
            custom_policy: Some(Arc::new(|_context| RecoverabilityAction::ImmediateRetry)),
        };

        let policy = resolve(Some(&recoverability_section(&source)), callbacks).unwrap();

        assert!(policy.on_failed_message.is_some());
        assert!(policy.custom_policy.is_some());
        let rate_limit = policy.rate_limit.unwrap();
        assert!(rate_limit.on_started.is_some());
        assert!(rate_limit.on_ended.is_none());

        let mut headers = BTreeMap::new();
        (policy.on_failed_message.unwrap())(&mut headers);
        assert_eq!(headers.get("diagnostic").map(String::as_str), Some("failed"));

        let context = FailureContext {
            message_id: "m-1".into(),
            error: "boom".into(),
            immediate_processing_failures: 1,
            delayed_deliveries: 0,
        };
        assert_eq!(
            (policy.custom_policy.unwrap())(&context),
            RecoverabilityAction::ImmediateRetry
        );
    }
}
