//! Localized user-facing strings.
//!
//! `t(key, lang)` for static strings, `format_*` helpers for strings with
//! interpolation and `user_message` for errors. Portuguese is the product
//! language; English is the fallback for anything else.

mod errors;
mod format;


pub use errors::user_message;
pub use format::*;

/// Return a localized static string for `key` in the given `lang`.
/// Falls back to English for unsupported languages and "???" for unknown keys.
pub fn t(key: &str, lang: &str) -> &'static str {
    if lang == "Portuguese" {
        if let Some(v) = portuguese(key) {
            return v;
        }
    }
    english(key).unwrap_or("???")
}

fn portuguese(key: &str) -> Option<&'static str> {
    Some(match key {
        "method_not_allowed" => "Método não permitido",
        "missing_api_key" => "API_KEY não configurada no servidor.",
        "ai_error" => "Erro ao processar requisição de IA.",
        "limit_reached" => "Limite atingido!",
        "email_taken" => "Este e-mail já está cadastrado. Tente fazer login.",
        "password_too_short" => "A senha deve ter pelo menos 6 caracteres.",
        "password_mismatch" => "As senhas não coincidem. Verifique e tente novamente.",
        "unknown_user" => "Usuário não encontrado. Crie uma conta primeiro.",
        "wrong_password" => "Senha incorreta. Verifique suas credenciais.",
        "invalid_session" => "Sessão inválida ou expirada. Faça login novamente.",
        "not_found" => "Recurso não encontrado.",
        "invalid_request" => "Requisição inválida.",
        "internal_error" => "Erro interno do servidor.",
        "feature_audio" => "áudio com IA",
        "feature_vip_support" => "suporte VIP",
        "feature_custom_prompt" => "prompt personalizado",
        "feature_reports" => "relatórios de conversão",
        "provider_configured" => "configurado",
        "provider_missing" => "sem API_KEY",
        _ => return None,
    })
}

fn english(key: &str) -> Option<&'static str> {
    Some(match key {
        "method_not_allowed" => "Method not allowed",
        "missing_api_key" => "API_KEY is not configured on the server.",
        "ai_error" => "Error processing the AI request.",
        "limit_reached" => "Limit reached!",
        "email_taken" => "This e-mail is already registered. Try logging in.",
        "password_too_short" => "The password must be at least 6 characters long.",
        "password_mismatch" => "Passwords do not match. Check and try again.",
        "unknown_user" => "User not found. Create an account first.",
        "wrong_password" => "Wrong password. Check your credentials.",
        "invalid_session" => "Invalid or expired session. Log in again.",
        "not_found" => "Resource not found.",
        "invalid_request" => "Invalid request.",
        "internal_error" => "Internal server error.",
        "feature_audio" => "AI voice replies",
        "feature_vip_support" => "VIP support",
        "feature_custom_prompt" => "custom prompt",
        "feature_reports" => "conversion reports",
        "provider_configured" => "configured",
        "provider_missing" => "missing API_KEY",
        _ => return None,
    })
}
