use std::str::FromStr;

use tracing::{debug, warn};

use common::push::{MulticastResponse, PushErrorCode};

/// Per-token triage of one multicast batch response.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Classification {
    /// Tokens permanently rejected by the provider; remove from the token
    /// store so no further attempts are made against them.
    pub deletable: Vec<String>,
    /// Tokens that hit a transient provider condition; left untouched for
    /// the next natural trigger.
    pub retryable: Vec<String>,
}

/// Bucket each failed outcome by provider error code. Successful entries
/// are skipped entirely; unknown codes are logged only.
pub fn classify(response: &MulticastResponse, tokens: &[String]) -> Classification {
    let mut classification = Classification::default();

    for (outcome, token) in response.outcomes.iter().zip(tokens) {
        if outcome.success {
            continue;
        }

        let Some(code) = outcome.error_code.as_deref() else {
            warn!(token, "Push send failed without an error code");
            continue;
        };

        match PushErrorCode::from_str(code) {
            Ok(code) if code.is_permanent() => {
                debug!(token, %code, "Push token is dead, scheduling removal");
                classification.deletable.push(token.clone());
            }
            Ok(code) => {
                debug!(token, %code, "Transient push failure, leaving token for retry");
                classification.retryable.push(token.clone());
            }
            Err(unknown) => {
                warn!(token, code = %unknown, "Unclassified push error code");
            }
        }
    }

    classification
}

#[cfg(test)]
mod tests {
    use common::push::SendOutcome;

    use super::*;

    fn tokens(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("token-{i}")).collect()
    }

    #[test]
    fn successes_have_no_side_effects() {
        let response = MulticastResponse {
            outcomes: vec![SendOutcome::ok(), SendOutcome::ok()],
        };
        let classification = classify(&response, &tokens(2));
        assert!(classification.deletable.is_empty());
        assert!(classification.retryable.is_empty());
    }

    #[test]
    fn permanent_codes_are_deletable() {
        let response = MulticastResponse {
            outcomes: vec![
                SendOutcome::failed("UNREGISTERED"),
                SendOutcome::ok(),
                SendOutcome::failed("INVALID_ARGUMENT"),
            ],
        };
        let classification = classify(&response, &tokens(3));
        assert_eq!(classification.deletable, vec!["token-0", "token-2"]);
        assert!(classification.retryable.is_empty());
    }

    #[test]
    fn transient_codes_are_retryable() {
        let response = MulticastResponse {
            outcomes: vec![
                SendOutcome::failed("UNAVAILABLE"),
                SendOutcome::failed("INTERNAL"),
                SendOutcome::failed("QUOTA_EXCEEDED"),
            ],
        };
        let classification = classify(&response, &tokens(3));
        assert!(classification.deletable.is_empty());
        assert_eq!(
            classification.retryable,
            vec!["token-0", "token-1", "token-2"]
        );
    }

    #[test]
    fn unknown_codes_are_logged_only() {
        let response = MulticastResponse {
            outcomes: vec![
                SendOutcome::failed("THIRD_PARTY_AUTH_ERROR"),
                SendOutcome::failed("UNREGISTERED"),
            ],
        };
        let classification = classify(&response, &tokens(2));
        assert_eq!(classification.deletable, vec!["token-1"]);
        assert!(classification.retryable.is_empty());
    }
}
