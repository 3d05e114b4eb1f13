use thiserror::Error;

/// Why a signup or login attempt was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// Signup with an e-mail that already has an account.
    EmailTaken,
    /// Signup password shorter than the minimum.
    PasswordTooShort,
    /// Signup password and confirmation differ.
    PasswordMismatch,
    /// Login for an e-mail with no account.
    UnknownUser,
    /// Login with the wrong password.
    WrongPassword,
    /// Missing, malformed, or expired session token.
    InvalidSession,
}

/// Top-level error type for ZapSeller.
#[derive(Debug, Error)]
pub enum ZapError {
    /// Error from an LLM provider.
    #[error("provider error: {0}")]
    Provider(String),

    /// No provider API key configured on the server.
    #[error("no API key configured")]
    MissingApiKey,

    /// The operator has used up the plan's message quota.
    #[error("message quota of {limit} reached")]
    QuotaExceeded { limit: u32 },

    /// A feature not included in the operator's plan.
    #[error("feature not available on this plan: {0}")]
    FeatureLocked(String),

    /// A countable plan limit (products, accounts) was reached.
    #[error("plan limit reached: {0}")]
    PlanLimit(String),

    /// Signup/login/session failure.
    #[error("auth error: {0:?}")]
    Auth(AuthFailure),

    /// A referenced resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Request failed validation.
    #[error("invalid request: {0}")]
    Invalid(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Audit storage error.
    #[error("memory error: {0}")]
    Memory(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
