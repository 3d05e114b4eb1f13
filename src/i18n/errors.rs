//! Errors as the operator sees them. Internal details are never included.

use zapseller_core::error::{AuthFailure, ZapError};

use super::{feature_locked, plan_limit, t};

pub fn user_message(err: &ZapError, lang: &str) -> String {
    match err {
        ZapError::MissingApiKey => t("missing_api_key", lang).to_string(),
        ZapError::QuotaExceeded { .. } => t("limit_reached", lang).to_string(),
        ZapError::FeatureLocked(feature) => feature_locked(lang, feature),
        ZapError::PlanLimit(what) => plan_limit(lang, what),
        ZapError::Auth(failure) => t(auth_key(*failure), lang).to_string(),
        ZapError::NotFound(_) => t("not_found", lang).to_string(),
        ZapError::Invalid(_) | ZapError::Serialization(_) => t("invalid_request", lang).to_string(),
        ZapError::Provider(_) => t("ai_error", lang).to_string(),
        ZapError::Config(_) | ZapError::Memory(_) | ZapError::Io(_) => {
            t("internal_error", lang).to_string()
        }
    }
}

fn auth_key(failure: AuthFailure) -> &'static str {
    match failure {
        AuthFailure::EmailTaken => "email_taken",
        AuthFailure::PasswordTooShort => "password_too_short",
        AuthFailure::PasswordMismatch => "password_mismatch",
        AuthFailure::UnknownUser => "unknown_user",
        AuthFailure::WrongPassword => "wrong_password",
        AuthFailure::InvalidSession => "invalid_session",
    }
}
