//! In-memory operator workspace.
//!
//! Operators, their products, custom prompt, connected numbers and sessions
//! live only for the lifetime of the process. Passwords are kept as SHA-256
//! hex digests and compared in constant time. Sessions expire after a TTL and
//! are pruned whenever a new one opens.

mod accounts;


pub use accounts::{AccountStatus, WhatsAppAccount};

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;
use zapseller_core::error::{AuthFailure, ZapError};
use zapseller_core::plan::PlanTier;
use zapseller_core::product::{Product, ProductPatch};

use crate::sales::prompt::DEFAULT_CUSTOM_PROMPT;

/// Minimum signup password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Session lifetime when none is configured.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

struct Session {
    email: String,
    opened: Instant,
}

struct Operator {
    email: String,
    password_hash: String,
    plan: PlanTier,
    messages_sent: u32,
    products: Vec<Product>,
    active_product_id: String,
    custom_prompt: String,
    accounts: Vec<WhatsAppAccount>,
    created_at: DateTime<Utc>,
}

impl Operator {
    fn new(email: String, password_hash: String) -> Self {
        let product = Product::demo();
        Self {
            email,
            password_hash,
            plan: PlanTier::Free,
            messages_sent: 0,
            active_product_id: product.id.clone(),
            products: vec![product],
            custom_prompt: DEFAULT_CUSTOM_PROMPT.to_string(),
            accounts: vec![WhatsAppAccount::demo()],
            created_at: Utc::now(),
        }
    }

    fn active_product(&self) -> Option<&Product> {
        self.products
            .iter()
            .find(|p| p.id == self.active_product_id)
            .or_else(|| self.products.first())
    }
}

/// Public view of an operator.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorProfile {
    pub email: String,
    pub plan: PlanTier,
    pub messages_sent: u32,
    pub max_messages: Option<u32>,
    pub remaining_messages: Option<u32>,
    pub active_product_id: String,
    pub products: usize,
    pub accounts: usize,
    pub created_at: DateTime<Utc>,
}

/// State captured when a chat message is admitted.
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub plan: PlanTier,
    pub product: Product,
    pub custom_prompt: String,
    /// Count after this message.
    pub messages_sent: u32,
}

/// All operators and sessions of this process.
pub struct Workspace {
    operators: RwLock<HashMap<String, Operator>>,
    sessions: RwLock<HashMap<String, Session>>,
    session_ttl: Duration,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::with_session_ttl(DEFAULT_SESSION_TTL)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Constant-time string comparison.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

fn unknown_operator(email: &str) -> ZapError {
    ZapError::NotFound(format!("operator {email}"))
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session_ttl(session_ttl: Duration) -> Self {
        Self {
            operators: RwLock::new(HashMap::new()),
            sessions: RwLock::new(HashMap::new()),
            session_ttl,
        }
    }

    // ----- auth -----

    /// Register an operator and open a session. Returns the session token.
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        confirm: &str,
    ) -> Result<String, ZapError> {
        let email = normalize_email(email);
        if email.is_empty() || !email.contains('@') {
            return Err(ZapError::Invalid("e-mail inválido".to_string()));
        }

        {
            let mut operators = self.operators.write().await;
            if operators.contains_key(&email) {
                return Err(ZapError::Auth(AuthFailure::EmailTaken));
            }
            if password.chars().count() < MIN_PASSWORD_LEN {
                return Err(ZapError::Auth(AuthFailure::PasswordTooShort));
            }
            if password != confirm {
                return Err(ZapError::Auth(AuthFailure::PasswordMismatch));
            }
            operators.insert(
                email.clone(),
                Operator::new(email.clone(), hash_password(password)),
            );
        }

        info!("workspace: new operator {email}");
        Ok(self.open_session(email).await)
    }

    /// Open a session for an existing operator.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, ZapError> {
        let email = normalize_email(email);
        {
            let operators = self.operators.read().await;
            let op = operators
                .get(&email)
                .ok_or(ZapError::Auth(AuthFailure::UnknownUser))?;
            if !constant_time_eq(&op.password_hash, &hash_password(password)) {
                return Err(ZapError::Auth(AuthFailure::WrongPassword));
            }
        }
        Ok(self.open_session(email).await)
    }

    async fn open_session(&self, email: String) -> String {
        let token = Uuid::new_v4().to_string();
        let mut sessions = self.sessions.write().await;
        let ttl = self.session_ttl;
        sessions.retain(|_, s| s.opened.elapsed() < ttl);
        sessions.insert(
            token.clone(),
            Session {
                email,
                opened: Instant::now(),
            },
        );
        token
    }

    /// Drop a session. Unknown tokens are ignored.
    pub async fn logout(&self, token: &str) {
        if let Some(session) = self.sessions.write().await.remove(token) {
            info!("workspace: {} logged out", session.email);
        }
    }

    /// Resolve a session token to its operator e-mail. Expired sessions are
    /// removed on sight.
    pub async fn authenticate(&self, token: &str) -> Result<String, ZapError> {
        let mut sessions = self.sessions.write().await;
        let expired = match sessions.get(token) {
            Some(s) if s.opened.elapsed() < self.session_ttl => return Ok(s.email.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            sessions.remove(token);
        }
        Err(ZapError::Auth(AuthFailure::InvalidSession))
    }

    /// Number of live session entries, expired ones included until pruned.
    #[cfg(test)]
    async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    // ----- profile & plan -----

    pub async fn profile(&self, email: &str) -> Result<OperatorProfile, ZapError> {
        let operators = self.operators.read().await;
        let op = operators.get(email).ok_or_else(|| unknown_operator(email))?;
        let limits = op.plan.limits();
        Ok(OperatorProfile {
            email: op.email.clone(),
            plan: op.plan,
            messages_sent: op.messages_sent,
            max_messages: limits.max_messages,
            remaining_messages: limits
                .max_messages
                .map(|max| max.saturating_sub(op.messages_sent)),
            active_product_id: op.active_product_id.clone(),
            products: op.products.len(),
            accounts: op.accounts.len(),
            created_at: op.created_at,
        })
    }

    /// Switch plan immediately. Returns the checkout link of the new plan,
    /// if it has one. Usage counters are kept.
    pub async fn change_plan(
        &self,
        email: &str,
        plan: PlanTier,
    ) -> Result<Option<&'static str>, ZapError> {
        let mut operators = self.operators.write().await;
        let op = operators
            .get_mut(email)
            .ok_or_else(|| unknown_operator(email))?;
        let previous = op.plan;
        op.plan = plan;
        info!("workspace: {email} plan {previous} -> {plan}");
        Ok(plan.limits().checkout_url)
    }

    // ----- products -----

    pub async fn products(&self, email: &str) -> Result<(Vec<Product>, String), ZapError> {
        let operators = self.operators.read().await;
        let op = operators.get(email).ok_or_else(|| unknown_operator(email))?;
        Ok((op.products.clone(), op.active_product_id.clone()))
    }

    /// Add a blank product and make it active.
    pub async fn add_product(&self, email: &str) -> Result<Product, ZapError> {
        let mut operators = self.operators.write().await;
        let op = operators
            .get_mut(email)
            .ok_or_else(|| unknown_operator(email))?;
        let max = op.plan.limits().max_products;
        if op.products.len() >= max {
            return Err(ZapError::PlanLimit(format!("products ({max})")));
        }
        let product = Product::blank();
        op.active_product_id = product.id.clone();
        op.products.push(product.clone());
        Ok(product)
    }

    pub async fn update_product(
        &self,
        email: &str,
        id: &str,
        patch: ProductPatch,
    ) -> Result<Product, ZapError> {
        let mut operators = self.operators.write().await;
        let op = operators
            .get_mut(email)
            .ok_or_else(|| unknown_operator(email))?;
        let product = op
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ZapError::NotFound(format!("product {id}")))?;
        patch.apply(product);
        Ok(product.clone())
    }

    pub async fn activate_product(&self, email: &str, id: &str) -> Result<(), ZapError> {
        let mut operators = self.operators.write().await;
        let op = operators
            .get_mut(email)
            .ok_or_else(|| unknown_operator(email))?;
        if !op.products.iter().any(|p| p.id == id) {
            return Err(ZapError::NotFound(format!("product {id}")));
        }
        op.active_product_id = id.to_string();
        Ok(())
    }

    // ----- custom prompt -----

    pub async fn custom_prompt(&self, email: &str) -> Result<String, ZapError> {
        let operators = self.operators.read().await;
        let op = operators.get(email).ok_or_else(|| unknown_operator(email))?;
        Ok(op.custom_prompt.clone())
    }

    pub async fn set_custom_prompt(&self, email: &str, prompt: &str) -> Result<(), ZapError> {
        let mut operators = self.operators.write().await;
        let op = operators
            .get_mut(email)
            .ok_or_else(|| unknown_operator(email))?;
        if !op.plan.limits().has_custom_prompt {
            return Err(ZapError::FeatureLocked("custom_prompt".to_string()));
        }
        op.custom_prompt = prompt.trim().to_string();
        Ok(())
    }

    // ----- chat admission -----

    /// Admit one chat message: run `gate` against the current plan and
    /// usage, then count the message. Counting happens before the provider
    /// is called, so failed calls still use quota.
    pub async fn admit_message<F>(
        &self,
        email: &str,
        product_id: Option<&str>,
        gate: F,
    ) -> Result<ChatSession, ZapError>
    where
        F: FnOnce(PlanTier, u32) -> Result<(), ZapError>,
    {
        let mut operators = self.operators.write().await;
        let op = operators
            .get_mut(email)
            .ok_or_else(|| unknown_operator(email))?;

        let product = match product_id {
            Some(id) => op.products.iter().find(|p| p.id == id),
            None => op.active_product(),
        }
        .cloned()
        .ok_or_else(|| ZapError::NotFound(format!("product {}", product_id.unwrap_or("-"))))?;

        gate(op.plan, op.messages_sent)?;

        op.messages_sent = op.messages_sent.saturating_add(1);
        Ok(ChatSession {
            plan: op.plan,
            product,
            custom_prompt: op.custom_prompt.clone(),
            messages_sent: op.messages_sent,
        })
    }
}
