//! Default value functions for serde.

pub(super) fn default_name() -> String {
    "ZapSeller AI".to_string()
}
pub(super) fn default_data_dir() -> String {
    "~/.zapseller".to_string()
}
pub(super) fn default_log_level() -> String {
    "info".to_string()
}
pub(super) fn default_language() -> String {
    "Portuguese".to_string()
}
pub(super) fn default_api_host() -> String {
    "127.0.0.1".to_string()
}
pub(super) fn default_api_port() -> u16 {
    3000
}
pub(super) fn default_body_limit() -> usize {
    8 * 1024 * 1024
}
pub(super) fn default_session_ttl() -> u64 {
    24 * 60 * 60
}
pub(super) fn default_db_path() -> String {
    "~/.zapseller/data/audit.db".to_string()
}
pub(super) fn default_pairing_ttl() -> u64 {
    120
}
pub(super) fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
pub(super) fn default_gemini_timeout() -> u64 {
    60
}
pub(super) fn default_temperature() -> f32 {
    0.8
}
pub(super) fn default_flash_model() -> String {
    "gemini-3-flash-preview".to_string()
}
pub(super) fn default_pro_model() -> String {
    "gemini-3-pro-preview".to_string()
}
pub(super) fn default_audio_model() -> String {
    "gemini-2.5-flash-native-audio-preview-09-2025".to_string()
}
