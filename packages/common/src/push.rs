use serde::{Deserialize, Serialize};

/// Notification content for the push channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushPayload {
    pub title: String,
    pub body: String,
}

impl PushPayload {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Per-token result of one multicast call, in token order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MulticastResponse {
    pub outcomes: Vec<SendOutcome>,
}

impl MulticastResponse {
    pub fn failure_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.success).count()
    }
}

/// Outcome for a single token within a multicast batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOutcome {
    pub success: bool,
    /// Provider error code for failed sends (e.g. "UNREGISTERED").
    pub error_code: Option<String>,
}

impl SendOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            error_code: None,
        }
    }

    pub fn failed(code: impl Into<String>) -> Self {
        Self {
            success: false,
            error_code: Some(code.into()),
        }
    }
}

/// Provider error codes the pipeline knows how to triage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushErrorCode {
    /// Token is no longer registered with the provider.
    Unregistered,
    /// Token is malformed or otherwise permanently rejected.
    InvalidArgument,
    /// Provider temporarily unavailable.
    Unavailable,
    /// Provider-side internal error.
    Internal,
    /// Provider quota exhausted.
    QuotaExceeded,
}

impl PushErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unregistered => "UNREGISTERED",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::Unavailable => "UNAVAILABLE",
            Self::Internal => "INTERNAL",
            Self::QuotaExceeded => "QUOTA_EXCEEDED",
        }
    }

    /// Whether the token itself is dead and should never be sent to again.
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::Unregistered | Self::InvalidArgument)
    }
}

impl std::fmt::Display for PushErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PushErrorCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UNREGISTERED" => Ok(Self::Unregistered),
            "INVALID_ARGUMENT" => Ok(Self::InvalidArgument),
            "UNAVAILABLE" => Ok(Self::Unavailable),
            "INTERNAL" => Ok(Self::Internal),
            "QUOTA_EXCEEDED" => Ok(Self::QuotaExceeded),
            _ => Err(s.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn error_code_round_trip() {
        for code in [
            PushErrorCode::Unregistered,
            PushErrorCode::InvalidArgument,
            PushErrorCode::Unavailable,
            PushErrorCode::Internal,
            PushErrorCode::QuotaExceeded,
        ] {
            assert_eq!(PushErrorCode::from_str(code.as_str()), Ok(code));
        }
    }

    #[test]
    fn unknown_code_is_err() {
        let err = PushErrorCode::from_str("THIRD_PARTY_AUTH_ERROR").unwrap_err();
        assert_eq!(err, "THIRD_PARTY_AUTH_ERROR");
    }

    #[test]
    fn permanent_codes() {
        assert!(PushErrorCode::Unregistered.is_permanent());
        assert!(PushErrorCode::InvalidArgument.is_permanent());
        assert!(!PushErrorCode::Unavailable.is_permanent());
        assert!(!PushErrorCode::QuotaExceeded.is_permanent());
    }
}
