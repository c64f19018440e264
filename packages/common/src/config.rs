use serde::Deserialize;

/// Connection settings for one SMTP server.
#[derive(Debug, Deserialize, Clone)]
pub struct SmtpServerConfig {
    pub host: String,
    /// Submission port. Default: 587.
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

fn default_smtp_port() -> u16 {
    587
}

/// Mail channel configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    /// Sender address placed in the From (and To) header; recipients go in BCC.
    pub from: String,
    /// Maximum recipients per message accepted by the provider. Default: 100.
    #[serde(default = "default_mail_batch_size")]
    pub max_batch_size: usize,
    pub primary: SmtpServerConfig,
    pub secondary: SmtpServerConfig,
}

fn default_mail_batch_size() -> usize {
    100
}

/// Bounded-retry policy for transient transport failures.
#[derive(Debug, Deserialize, Clone)]
pub struct RetryConfig {
    /// Total attempts, including the first call. Default: 3.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base delay for exponential backoff. Default: 10ms.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Backoff cap. Default: 10s.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}
fn default_base_delay_ms() -> u64 {
    10
}
fn default_max_delay_ms() -> u64 {
    10_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

/// Circuit breaker and health probe configuration for the primary transport.
#[derive(Debug, Deserialize, Clone)]
pub struct BreakerConfig {
    /// Substring identifying a provider quota error. A primary failure whose
    /// message contains it forces the breaker open.
    #[serde(default = "default_quota_signature")]
    pub quota_signature: String,
    /// Interval between health probe checks. Default: 3 hours.
    #[serde(default = "default_health_check_interval_secs")]
    pub health_check_interval_secs: u64,
    /// Internal address the probe message is sent to.
    pub probe_recipient: String,
}

fn default_quota_signature() -> String {
    "Daily user sending limit exceeded".into()
}
fn default_health_check_interval_secs() -> u64 {
    3 * 60 * 60
}

/// Recovery sweep configuration for the notification outbox.
#[derive(Debug, Deserialize, Clone)]
pub struct SweepConfig {
    /// Interval between sweeps. Default: 24 hours.
    #[serde(default = "default_sweep_interval_secs")]
    pub interval_secs: u64,
    /// Entries whose lease is younger than this are considered in flight
    /// and skipped. Default: 1 hour.
    #[serde(default = "default_lock_staleness_secs")]
    pub lock_staleness_secs: u64,
}

fn default_sweep_interval_secs() -> u64 {
    24 * 60 * 60
}
fn default_lock_staleness_secs() -> u64 {
    60 * 60
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_sweep_interval_secs(),
            lock_staleness_secs: default_lock_staleness_secs(),
        }
    }
}

/// Push gateway configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct PushConfig {
    /// Multicast endpoint of the push gateway.
    pub endpoint: String,
    /// Maximum tokens per multicast call. Default: 500.
    #[serde(default = "default_push_batch_size")]
    pub max_batch_size: usize,
    /// HTTP request timeout. Default: 30s.
    #[serde(default = "default_push_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_push_batch_size() -> usize {
    500
}
fn default_push_timeout_secs() -> u64 {
    30
}
