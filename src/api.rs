//! HTTP API for the ZapSeller dashboard and chat simulator.
//!
//! JSON in, JSON out. Operators authenticate with the bearer session token
//! returned by signup/login. Errors carry a localized `error` string only.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};
use zapseller_core::config::ApiConfig;
use zapseller_core::error::{AuthFailure, ZapError};
use zapseller_core::plan::PlanTier;
use zapseller_core::product::ProductPatch;
use zapseller_memory::Store;

use crate::i18n::{self, t};
use crate::pairing::Pairing;
use crate::sales::{ChatTurn, Salesperson};
use crate::workspace::Workspace;

/// Recent orders included in a report.
const REPORT_RECENT_ORDERS: i64 = 10;

type ApiError = (StatusCode, Json<Value>);
type ApiResult = Result<Json<Value>, ApiError>;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    workspace: Arc<Workspace>,
    salesperson: Arc<Salesperson>,
    pairing: Arc<Pairing>,
    store: Option<Store>,
    language: Arc<str>,
    uptime: Instant,
}

impl ApiState {
    pub fn new(
        workspace: Arc<Workspace>,
        salesperson: Arc<Salesperson>,
        pairing: Arc<Pairing>,
        store: Option<Store>,
        language: &str,
    ) -> Self {
        Self {
            workspace,
            salesperson,
            pairing,
            store,
            language: Arc::from(language),
            uptime: Instant::now(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignupRequest {
    email: String,
    password: String,
    confirm_password: String,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct PlanRequest {
    plan: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptRequest {
    custom_prompt: String,
}

/// HTTP status for an error.
fn status_for(err: &ZapError) -> StatusCode {
    match err {
        ZapError::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
        ZapError::FeatureLocked(_) | ZapError::PlanLimit(_) => StatusCode::FORBIDDEN,
        ZapError::Auth(AuthFailure::EmailTaken) => StatusCode::CONFLICT,
        ZapError::Auth(AuthFailure::PasswordTooShort | AuthFailure::PasswordMismatch) => {
            StatusCode::BAD_REQUEST
        }
        ZapError::Auth(_) => StatusCode::UNAUTHORIZED,
        ZapError::NotFound(_) => StatusCode::NOT_FOUND,
        ZapError::Invalid(_) | ZapError::Serialization(_) => StatusCode::BAD_REQUEST,
        ZapError::MissingApiKey
        | ZapError::Provider(_)
        | ZapError::Config(_)
        | ZapError::Memory(_)
        | ZapError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Map an error to its response, logging what the client never sees.
fn api_error(err: ZapError, lang: &str) -> ApiError {
    let status = status_for(&err);
    if status.is_server_error() {
        error!("api: {err}");
    } else {
        warn!("api: {err}");
    }
    (
        status,
        Json(json!({"error": i18n::user_message(&err, lang)})),
    )
}

/// Unwrap a JSON body or answer 400.
fn parse_body<T>(body: Result<Json<T>, JsonRejection>, lang: &str) -> Result<T, ApiError> {
    body.map(|Json(v)| v)
        .map_err(|e| api_error(ZapError::Invalid(e.body_text()), lang))
}

/// Resolve the bearer session token to an operator e-mail.
async fn require_operator(headers: &HeaderMap, state: &ApiState) -> Result<String, ApiError> {
    let token = headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let Some(token) = token else {
        return Err(api_error(
            ZapError::Auth(AuthFailure::InvalidSession),
            &state.language,
        ));
    };

    state
        .workspace
        .authenticate(token)
        .await
        .map_err(|e| api_error(e, &state.language))
}

/// Build the router. Separated from `serve` so tests can drive it directly.
pub fn build_router(state: ApiState, body_limit: usize) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/plans", get(plans))
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/me", get(me))
        .route("/api/plan", post(change_plan))
        .route("/api/products", get(list_products).post(add_product))
        .route("/api/products/{id}", put(update_product))
        .route("/api/products/{id}/activate", post(activate_product))
        .route("/api/prompt", get(get_prompt).put(set_prompt))
        .route("/api/accounts", get(list_accounts))
        .route("/api/accounts/{id}", delete(remove_account))
        .route("/api/accounts/pair", post(start_pairing))
        .route("/api/accounts/pair/{id}/confirm", post(confirm_pairing))
        .route("/api/chat", post(chat).fallback(method_not_allowed))
        .route("/api/reports", get(reports))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Start the API server and run until it fails.
pub async fn serve(config: &ApiConfig, state: ApiState) -> anyhow::Result<()> {
    let app = build_router(state, config.body_limit_bytes);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("API server failed to bind to {addr}: {e}"))?;

    info!("API server listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

/// `GET /api/health`
async fn health(State(state): State<ApiState>) -> Json<Value> {
    let provider = state.salesperson.provider_name();
    Json(json!({
        "status": "ok",
        "uptimeSecs": state.uptime.elapsed().as_secs(),
        "provider": provider,
        "providerStatus": t(
            if provider.is_some() { "provider_configured" } else { "provider_missing" },
            &state.language,
        ),
    }))
}

/// `GET /api/plans`
async fn plans() -> Json<Value> {
    let plans: Vec<_> = PlanTier::ALL.iter().map(|p| p.limits()).collect();
    Json(json!({ "plans": plans }))
}

/// `POST /api/auth/signup`
async fn signup(
    State(state): State<ApiState>,
    body: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let lang = &state.language;
    let req = parse_body(body, lang)?;
    let token = state
        .workspace
        .signup(&req.email, &req.password, &req.confirm_password)
        .await
        .map_err(|e| api_error(e, lang))?;
    let email = state
        .workspace
        .authenticate(&token)
        .await
        .map_err(|e| api_error(e, lang))?;
    let profile = state
        .workspace
        .profile(&email)
        .await
        .map_err(|e| api_error(e, lang))?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "token": token, "profile": profile })),
    ))
}

/// `POST /api/auth/login`
async fn login(
    State(state): State<ApiState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult {
    let lang = &state.language;
    let req = parse_body(body, lang)?;
    let token = state
        .workspace
        .login(&req.email, &req.password)
        .await
        .map_err(|e| api_error(e, lang))?;
    let email = state
        .workspace
        .authenticate(&token)
        .await
        .map_err(|e| api_error(e, lang))?;
    let profile = state
        .workspace
        .profile(&email)
        .await
        .map_err(|e| api_error(e, lang))?;
    Ok(Json(json!({ "token": token, "profile": profile })))
}

/// `POST /api/auth/logout`
async fn logout(headers: HeaderMap, State(state): State<ApiState>) -> ApiResult {
    require_operator(&headers, &state).await?;
    if let Some(token) = headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        state.workspace.logout(token.trim()).await;
    }
    Ok(Json(json!({ "status": "ok" })))
}

/// `GET /api/me`
async fn me(headers: HeaderMap, State(state): State<ApiState>) -> ApiResult {
    let email = require_operator(&headers, &state).await?;
    let profile = state
        .workspace
        .profile(&email)
        .await
        .map_err(|e| api_error(e, &state.language))?;
    Ok(Json(json!({
        "profile": profile,
        "limits": profile.plan.limits(),
    })))
}

/// `POST /api/plan`
async fn change_plan(
    headers: HeaderMap,
    State(state): State<ApiState>,
    body: Result<Json<PlanRequest>, JsonRejection>,
) -> ApiResult {
    let email = require_operator(&headers, &state).await?;
    let lang = &state.language;
    let req = parse_body(body, lang)?;
    let plan: PlanTier = req
        .plan
        .parse()
        .map_err(|e: String| api_error(ZapError::Invalid(e), lang))?;
    let checkout = state
        .workspace
        .change_plan(&email, plan)
        .await
        .map_err(|e| api_error(e, lang))?;
    Ok(Json(json!({
        "plan": plan,
        "checkoutUrl": checkout,
        "message": i18n::plan_changed(lang, plan.limits().name, checkout),
    })))
}

/// `GET /api/products`
async fn list_products(headers: HeaderMap, State(state): State<ApiState>) -> ApiResult {
    let email = require_operator(&headers, &state).await?;
    let (products, active) = state
        .workspace
        .products(&email)
        .await
        .map_err(|e| api_error(e, &state.language))?;
    Ok(Json(json!({
        "products": products,
        "activeProductId": active,
    })))
}

/// `POST /api/products`
async fn add_product(
    headers: HeaderMap,
    State(state): State<ApiState>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let email = require_operator(&headers, &state).await?;
    let product = state
        .workspace
        .add_product(&email)
        .await
        .map_err(|e| api_error(e, &state.language))?;
    Ok((StatusCode::CREATED, Json(json!({ "product": product }))))
}

/// `PUT /api/products/{id}`
async fn update_product(
    headers: HeaderMap,
    State(state): State<ApiState>,
    Path(id): Path<String>,
    body: Result<Json<ProductPatch>, JsonRejection>,
) -> ApiResult {
    let email = require_operator(&headers, &state).await?;
    let patch = parse_body(body, &state.language)?;
    let product = state
        .workspace
        .update_product(&email, &id, patch)
        .await
        .map_err(|e| api_error(e, &state.language))?;
    Ok(Json(json!({ "product": product })))
}

/// `POST /api/products/{id}/activate`
async fn activate_product(
    headers: HeaderMap,
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult {
    let email = require_operator(&headers, &state).await?;
    state
        .workspace
        .activate_product(&email, &id)
        .await
        .map_err(|e| api_error(e, &state.language))?;
    Ok(Json(json!({ "activeProductId": id })))
}

/// `GET /api/prompt`
async fn get_prompt(headers: HeaderMap, State(state): State<ApiState>) -> ApiResult {
    let email = require_operator(&headers, &state).await?;
    let lang = &state.language;
    let prompt = state
        .workspace
        .custom_prompt(&email)
        .await
        .map_err(|e| api_error(e, lang))?;
    let profile = state
        .workspace
        .profile(&email)
        .await
        .map_err(|e| api_error(e, lang))?;
    Ok(Json(json!({
        "customPrompt": prompt,
        "editable": profile.plan.limits().has_custom_prompt,
    })))
}

/// `PUT /api/prompt`
async fn set_prompt(
    headers: HeaderMap,
    State(state): State<ApiState>,
    body: Result<Json<PromptRequest>, JsonRejection>,
) -> ApiResult {
    let email = require_operator(&headers, &state).await?;
    let lang = &state.language;
    let req = parse_body(body, lang)?;
    state
        .workspace
        .set_custom_prompt(&email, &req.custom_prompt)
        .await
        .map_err(|e| api_error(e, lang))?;
    let prompt = state
        .workspace
        .custom_prompt(&email)
        .await
        .map_err(|e| api_error(e, lang))?;
    Ok(Json(json!({ "customPrompt": prompt })))
}

/// `GET /api/accounts`
async fn list_accounts(headers: HeaderMap, State(state): State<ApiState>) -> ApiResult {
    let email = require_operator(&headers, &state).await?;
    let lang = &state.language;
    let accounts = state
        .workspace
        .accounts(&email)
        .await
        .map_err(|e| api_error(e, lang))?;
    let can_pair = state
        .workspace
        .has_account_slot(&email)
        .await
        .map_err(|e| api_error(e, lang))?;
    Ok(Json(json!({
        "accounts": accounts,
        "canPair": can_pair,
    })))
}

/// `DELETE /api/accounts/{id}`
async fn remove_account(
    headers: HeaderMap,
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult {
    let email = require_operator(&headers, &state).await?;
    state
        .workspace
        .remove_account(&email, &id)
        .await
        .map_err(|e| api_error(e, &state.language))?;
    Ok(Json(json!({ "status": "removed", "id": id })))
}

/// `POST /api/accounts/pair`
async fn start_pairing(headers: HeaderMap, State(state): State<ApiState>) -> ApiResult {
    let email = require_operator(&headers, &state).await?;
    let ticket = state
        .pairing
        .start(&email)
        .await
        .map_err(|e| api_error(e, &state.language))?;
    Ok(Json(json!(ticket)))
}

/// `POST /api/accounts/pair/{id}/confirm`
async fn confirm_pairing(
    headers: HeaderMap,
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult {
    let email = require_operator(&headers, &state).await?;
    let account = state
        .pairing
        .confirm(&id, &email, &state.workspace)
        .await
        .map_err(|e| api_error(e, &state.language))?;
    Ok(Json(json!({ "account": account })))
}

/// `POST /api/chat`
async fn chat(
    headers: HeaderMap,
    State(state): State<ApiState>,
    body: Result<Json<ChatTurn>, JsonRejection>,
) -> ApiResult {
    let email = require_operator(&headers, &state).await?;
    let turn = parse_body(body, &state.language)?;
    let outcome = state
        .salesperson
        .reply(&state.workspace, &email, turn)
        .await
        .map_err(|e| api_error(e, &state.language))?;
    Ok(Json(json!(outcome)))
}

/// Any method other than POST on `/api/chat`.
async fn method_not_allowed(State(state): State<ApiState>) -> ApiError {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({"error": t("method_not_allowed", &state.language)})),
    )
}

/// `GET /api/reports`
async fn reports(headers: HeaderMap, State(state): State<ApiState>) -> ApiResult {
    let email = require_operator(&headers, &state).await?;
    let lang = &state.language;
    let profile = state
        .workspace
        .profile(&email)
        .await
        .map_err(|e| api_error(e, lang))?;
    if !profile.plan.limits().has_reports {
        return Err(api_error(
            ZapError::FeatureLocked("reports".to_string()),
            lang,
        ));
    }
    let store = state.store.as_ref().ok_or_else(|| {
        api_error(
            ZapError::Memory("audit store not configured".to_string()),
            lang,
        )
    })?;
    let report = store
        .conversion_report(&email, REPORT_RECENT_ORDERS)
        .await
        .map_err(|e| api_error(e, lang))?;
    Ok(Json(json!({
        "report": report,
        "messagesSent": profile.messages_sent,
    })))
}

#[cfg(test)]
mod tests;
