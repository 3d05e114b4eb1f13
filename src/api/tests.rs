use super::*;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use http_body_util::BodyExt;
use std::time::Duration;
use tower::ServiceExt;
use zapseller_core::config::{MemoryConfig, ModelConfig};
use zapseller_core::context::{GenerationRequest, GenerationResponse, ResponsePart};
use zapseller_core::traits::Provider;
use zapseller_memory::AuditLogger;

// -----------------------------------------------------------------------
// Mock provider
// -----------------------------------------------------------------------

/// Answers every request with a fixed text, or fails.
struct MockProvider {
    text: String,
    fail: bool,
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn requires_api_key(&self) -> bool {
        false
    }

    async fn generate(&self, _request: &GenerationRequest) -> Result<GenerationResponse, ZapError> {
        if self.fail {
            return Err(ZapError::Provider("HTTP 500: upstream secret".to_string()));
        }
        Ok(GenerationResponse {
            parts: vec![ResponsePart::Text(self.text.clone())],
            ..Default::default()
        })
    }

    async fn is_available(&self) -> bool {
        true
    }
}

// -----------------------------------------------------------------------
// Test helpers
// -----------------------------------------------------------------------

fn router_with(provider: Option<MockProvider>, store: Option<Store>) -> Router {
    let mut salesperson = Salesperson::new(
        provider.map(|p| Arc::new(p) as Arc<dyn Provider>),
        ModelConfig::default(),
        0.8,
    );
    if let Some(ref store) = store {
        salesperson = salesperson.with_audit(AuditLogger::new(store.pool().clone()));
    }
    let state = ApiState::new(
        Arc::new(Workspace::new()),
        Arc::new(salesperson),
        Arc::new(Pairing::new(Duration::from_secs(120))),
        store,
        "Portuguese",
    );
    build_router(state, 1024 * 1024)
}

fn test_router() -> Router {
    router_with(
        Some(MockProvider {
            text: "Oi! Qual é o seu nome? 😊".to_string(),
            fail: false,
        }),
        None,
    )
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn authed(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

/// Parse response body as JSON.
async fn body_json(resp: axum::http::Response<Body>) -> Value {
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// Sign up `email` and return its session token.
async fn signup_token(app: &Router, email: &str) -> String {
    let req = json_request(
        "POST",
        "/api/auth/signup",
        None,
        json!({"email": email, "password": "segredo1", "confirmPassword": "segredo1"}),
    );
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await["token"].as_str().unwrap().to_string()
}

async fn set_plan(app: &Router, token: &str, plan: &str) {
    let req = json_request("POST", "/api/plan", Some(token), json!({"plan": plan}));
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

fn chat_body(text: &str) -> Value {
    json!({"conversationId": "c1", "history": [{"role": "user", "text": text}]})
}

// -----------------------------------------------------------------------
// Public endpoints
// -----------------------------------------------------------------------

#[tokio::test]
async fn test_health() {
    let app = test_router();
    let req = Request::get("/api/health").body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["provider"], "mock");
    assert_eq!(json["providerStatus"], "configurado");
}

#[tokio::test]
async fn test_health_without_provider() {
    let app = router_with(None, None);
    let req = Request::get("/api/health").body(Body::empty()).unwrap();
    let json = body_json(app.oneshot(req).await.unwrap()).await;
    assert!(json["provider"].is_null());
    assert_eq!(json["providerStatus"], "sem API_KEY");
}

#[tokio::test]
async fn test_plans_catalog() {
    let app = test_router();
    let req = Request::get("/api/plans").body(Body::empty()).unwrap();
    let json = body_json(app.oneshot(req).await.unwrap()).await;
    let plans = json["plans"].as_array().unwrap();
    assert_eq!(plans.len(), 3);
    assert_eq!(plans[0]["tier"], "free");
    assert_eq!(plans[0]["maxMessages"], 50);
    assert_eq!(plans[1]["checkoutUrl"], "https://pay.kiwify.com.br/Q0UNNyQ");
    assert!(plans[2]["maxMessages"].is_null());
    assert_eq!(plans[2]["hasAudioAi"], true);
}

// -----------------------------------------------------------------------
// Auth
// -----------------------------------------------------------------------

#[tokio::test]
async fn test_signup_duplicate_conflicts() {
    let app = test_router();
    signup_token(&app, "a@b.com").await;
    let req = json_request(
        "POST",
        "/api/auth/signup",
        None,
        json!({"email": "a@b.com", "password": "segredo1", "confirmPassword": "segredo1"}),
    );
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let json = body_json(resp).await;
    assert_eq!(
        json["error"],
        "Este e-mail já está cadastrado. Tente fazer login."
    );
}

#[tokio::test]
async fn test_signup_short_password() {
    let app = test_router();
    let req = json_request(
        "POST",
        "/api/auth/signup",
        None,
        json!({"email": "a@b.com", "password": "123", "confirmPassword": "123"}),
    );
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(resp).await["error"],
        "A senha deve ter pelo menos 6 caracteres."
    );
}

#[tokio::test]
async fn test_signup_malformed_body() {
    let app = test_router();
    let req = json_request("POST", "/api/auth/signup", None, json!({"email": "a@b.com"}));
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "Requisição inválida.");
}

#[tokio::test]
async fn test_login_flow() {
    let app = test_router();
    signup_token(&app, "a@b.com").await;

    let req = json_request(
        "POST",
        "/api/auth/login",
        None,
        json!({"email": "a@b.com", "password": "errada"}),
    );
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(resp).await["error"],
        "Senha incorreta. Verifique suas credenciais."
    );

    let req = json_request(
        "POST",
        "/api/auth/login",
        None,
        json!({"email": "nobody@b.com", "password": "segredo1"}),
    );
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(
        body_json(resp).await["error"],
        "Usuário não encontrado. Crie uma conta primeiro."
    );

    let req = json_request(
        "POST",
        "/api/auth/login",
        None,
        json!({"email": "a@b.com", "password": "segredo1"}),
    );
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert!(json["token"].is_string());
    assert_eq!(json["profile"]["plan"], "free");
}

#[tokio::test]
async fn test_missing_and_bad_token() {
    let app = test_router();
    let req = Request::get("/api/me").body(Body::empty()).unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app.oneshot(authed("GET", "/api/me", "nope")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_invalidates_token() {
    let app = test_router();
    let token = signup_token(&app, "a@b.com").await;
    let resp = app
        .clone()
        .oneshot(authed("POST", "/api/auth/logout", &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = app.oneshot(authed("GET", "/api/me", &token)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// -----------------------------------------------------------------------
// Plan, products, prompt
// -----------------------------------------------------------------------

#[tokio::test]
async fn test_me_and_plan_upgrade() {
    let app = test_router();
    let token = signup_token(&app, "a@b.com").await;

    let req = json_request("POST", "/api/plan", Some(&token), json!({"plan": "pro"}));
    let resp = app.clone().oneshot(req).await.unwrap();
    let json = body_json(resp).await;
    assert_eq!(json["plan"], "pro");
    assert_eq!(json["checkoutUrl"], "https://pay.kiwify.com.br/6d9bLtJ");

    let json = body_json(app.clone().oneshot(authed("GET", "/api/me", &token)).await.unwrap()).await;
    assert_eq!(json["profile"]["plan"], "pro");
    assert!(json["profile"]["maxMessages"].is_null());
    assert_eq!(json["limits"]["hasReports"], true);

    let req = json_request("POST", "/api/plan", Some(&token), json!({"plan": "gold"}));
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_products_crud() {
    let app = test_router();
    let token = signup_token(&app, "a@b.com").await;

    let resp = app
        .clone()
        .oneshot(authed("POST", "/api/products", &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    set_plan(&app, &token, "starter").await;
    let resp = app
        .clone()
        .oneshot(authed("POST", "/api/products", &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let id = body_json(resp).await["product"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let req = json_request(
        "PUT",
        &format!("/api/products/{id}"),
        Some(&token),
        json!({"name": "Chá Detox", "price": "49,90", "salesStrategy": "digital"}),
    );
    let json = body_json(app.clone().oneshot(req).await.unwrap()).await;
    assert_eq!(json["product"]["name"], "Chá Detox");
    assert_eq!(json["product"]["salesStrategy"], "digital");

    let resp = app
        .clone()
        .oneshot(authed("POST", "/api/products/1/activate", &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(
        app.clone()
            .oneshot(authed("GET", "/api/products", &token))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(json["products"].as_array().unwrap().len(), 2);
    assert_eq!(json["activeProductId"], "1");

    let resp = app
        .oneshot(authed("POST", "/api/products/zzz/activate", &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_prompt_locked_on_free() {
    let app = test_router();
    let token = signup_token(&app, "a@b.com").await;

    let json = body_json(app.clone().oneshot(authed("GET", "/api/prompt", &token)).await.unwrap()).await;
    assert_eq!(json["editable"], false);
    assert!(json["customPrompt"]
        .as_str()
        .unwrap()
        .starts_with("Você é um vendedor que ama ajudar pessoas."));

    let req = json_request("PUT", "/api/prompt", Some(&token), json!({"customPrompt": "Seja breve."}));
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    set_plan(&app, &token, "starter").await;
    let req = json_request("PUT", "/api/prompt", Some(&token), json!({"customPrompt": "Seja breve."}));
    let json = body_json(app.oneshot(req).await.unwrap()).await;
    assert_eq!(json["customPrompt"], "Seja breve.");
}

// -----------------------------------------------------------------------
// Accounts & pairing
// -----------------------------------------------------------------------

#[tokio::test]
async fn test_pairing_flow() {
    let app = test_router();
    let token = signup_token(&app, "a@b.com").await;

    let json = body_json(app.clone().oneshot(authed("GET", "/api/accounts", &token)).await.unwrap()).await;
    assert_eq!(json["accounts"][0]["name"], "Suporte Principal");
    assert_eq!(json["canPair"], false);

    let json = body_json(
        app.clone()
            .oneshot(authed("POST", "/api/accounts/pair", &token))
            .await
            .unwrap(),
    )
    .await;
    let pairing_id = json["id"].as_str().unwrap().to_string();
    assert!(!json["qrPngBase64"].as_str().unwrap().is_empty());

    let uri = format!("/api/accounts/pair/{pairing_id}/confirm");
    let resp = app.clone().oneshot(authed("POST", &uri, &token)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    set_plan(&app, &token, "pro").await;
    let resp = app.clone().oneshot(authed("POST", &uri, &token)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["account"]["name"], "Conta 2");

    let resp = app
        .clone()
        .oneshot(authed("DELETE", "/api/accounts/1", &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = app
        .oneshot(authed("DELETE", "/api/accounts/1", &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// -----------------------------------------------------------------------
// Chat
// -----------------------------------------------------------------------

#[tokio::test]
async fn test_chat_replies_and_counts() {
    let app = test_router();
    let token = signup_token(&app, "a@b.com").await;

    let req = json_request("POST", "/api/chat", Some(&token), chat_body("oi"));
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["text"], "Oi! Qual é o seu nome? 😊");
    assert_eq!(json["messagesSent"], 1);
    assert!(json.get("leadStatus").is_none());

    let json = body_json(app.oneshot(authed("GET", "/api/me", &token)).await.unwrap()).await;
    assert_eq!(json["profile"]["messagesSent"], 1);
    assert_eq!(json["profile"]["remainingMessages"], 49);
}

#[tokio::test]
async fn test_chat_lead_status_on_starter() {
    let app = test_router();
    let token = signup_token(&app, "a@b.com").await;
    set_plan(&app, &token, "starter").await;

    let body = json!({"history": [
        {"role": "user", "text": "oi"},
        {"role": "model", "text": "Olá!"},
        {"role": "user", "text": "quero comprar"}
    ]});
    let req = json_request("POST", "/api/chat", Some(&token), body);
    let json = body_json(app.oneshot(req).await.unwrap()).await;
    assert_eq!(json["leadStatus"], "quente");
    assert_eq!(json["model"], "gemini-3-flash-preview");
}

#[tokio::test]
async fn test_chat_wrong_method() {
    let app = test_router();
    let req = Request::get("/api/chat").body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body_json(resp).await["error"], "Método não permitido");
}

#[tokio::test]
async fn test_chat_without_api_key() {
    let app = router_with(None, None);
    let token = signup_token(&app, "a@b.com").await;
    let req = json_request("POST", "/api/chat", Some(&token), chat_body("oi"));
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(resp).await["error"],
        "API_KEY não configurada no servidor."
    );
}

#[tokio::test]
async fn test_chat_provider_failure_hides_details() {
    let app = router_with(
        Some(MockProvider {
            text: String::new(),
            fail: true,
        }),
        None,
    );
    let token = signup_token(&app, "a@b.com").await;
    let req = json_request("POST", "/api/chat", Some(&token), chat_body("oi"));
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(resp).await;
    assert_eq!(json["error"], "Erro ao processar requisição de IA.");
    assert!(!json.to_string().contains("upstream secret"));
}

#[tokio::test]
async fn test_chat_audio_locked_on_free() {
    let app = test_router();
    let token = signup_token(&app, "a@b.com").await;
    let body = json!({
        "history": [{"role": "user", "text": ""}],
        "audioData": {"data": "UklGRg==", "mimeType": "audio/webm"}
    });
    let req = json_request("POST", "/api/chat", Some(&token), body);
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_chat_quota_returns_429() {
    let app = test_router();
    let token = signup_token(&app, "a@b.com").await;
    for _ in 0..50 {
        let req = json_request("POST", "/api/chat", Some(&token), chat_body("oi"));
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
    let req = json_request("POST", "/api/chat", Some(&token), chat_body("oi"));
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body_json(resp).await["error"], "Limite atingido!");
}

// -----------------------------------------------------------------------
// Reports
// -----------------------------------------------------------------------

#[tokio::test]
async fn test_reports_pro_only() {
    let dir = std::env::temp_dir().join(format!("zapseller-api-{}", uuid::Uuid::new_v4()));
    let store = Store::new(&MemoryConfig {
        db_path: dir.join("audit.db").to_string_lossy().into_owned(),
    })
    .await
    .unwrap();
    let app = router_with(
        Some(MockProvider {
            text: "Custa R$ 197,90".to_string(),
            fail: false,
        }),
        Some(store),
    );
    let token = signup_token(&app, "a@b.com").await;

    let resp = app
        .clone()
        .oneshot(authed("GET", "/api/reports", &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    set_plan(&app, &token, "pro").await;
    let req = json_request("POST", "/api/chat", Some(&token), chat_body("qual o preço?"));
    app.clone().oneshot(req).await.unwrap();

    let resp = app.oneshot(authed("GET", "/api/reports", &token)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["report"]["conversations"], 1);
    assert_eq!(json["report"]["askedPrice"], 1);
    assert_eq!(json["report"]["totalMessages"], 1);
    assert_eq!(json["messagesSent"], 1);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_status_mapping() {
    assert_eq!(
        status_for(&ZapError::QuotaExceeded { limit: 50 }),
        StatusCode::TOO_MANY_REQUESTS
    );
    assert_eq!(
        status_for(&ZapError::MissingApiKey),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        status_for(&ZapError::Auth(AuthFailure::InvalidSession)),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        status_for(&ZapError::PlanLimit("accounts (1)".into())),
        StatusCode::FORBIDDEN
    );
}
