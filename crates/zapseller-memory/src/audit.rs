//! Audit log: records every exchange the salesperson handles and every
//! order it captures.

use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;
use zapseller_core::error::ZapError;

/// An exchange to write to the audit log.
pub struct AuditEntry {
    /// Session owner (the seller's email).
    pub operator: String,
    pub conversation_id: String,
    pub plan: String,
    pub input_text: String,
    pub output_text: Option<String>,
    pub model: Option<String>,
    pub processing_ms: Option<i64>,
    pub status: AuditStatus,
    pub error: Option<String>,
    /// Customer asked about price.
    pub intent_price: bool,
    /// Conversation reached the delivery/address step.
    pub intent_delivery: bool,
}

/// Status of an audited exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditStatus {
    Ok,
    Error,
    Denied,
}

impl AuditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
            Self::Denied => "denied",
        }
    }
}

/// An order captured through the confirmation tool.
pub struct OrderEntry {
    pub operator: String,
    pub conversation_id: String,
    pub product_id: String,
    pub customer_name: String,
    pub details: String,
    pub strategy: String,
}

/// Audit logger backed by SQLite.
#[derive(Clone)]
pub struct AuditLogger {
    pool: SqlitePool,
}

impl AuditLogger {
    /// Create a new audit logger sharing the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Write an exchange to the audit log.
    pub async fn log(&self, entry: &AuditEntry) -> Result<(), ZapError> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO exchanges \
             (id, operator, conversation_id, plan, input_text, output_text, \
              model, processing_ms, status, error, intent_price, intent_delivery) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&entry.operator)
        .bind(&entry.conversation_id)
        .bind(&entry.plan)
        .bind(&entry.input_text)
        .bind(&entry.output_text)
        .bind(&entry.model)
        .bind(entry.processing_ms)
        .bind(entry.status.as_str())
        .bind(&entry.error)
        .bind(entry.intent_price)
        .bind(entry.intent_delivery)
        .execute(&self.pool)
        .await
        .map_err(|e| ZapError::Memory(format!("audit log write failed: {e}")))?;

        debug!(
            "audit: {} {} [{}] {}",
            entry.operator,
            entry.conversation_id,
            entry.status.as_str(),
            truncate(&entry.input_text, 80)
        );

        Ok(())
    }

    /// Record a confirmed order.
    pub async fn log_order(&self, order: &OrderEntry) -> Result<(), ZapError> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO orders \
             (id, operator, conversation_id, product_id, customer_name, details, strategy) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&order.operator)
        .bind(&order.conversation_id)
        .bind(&order.product_id)
        .bind(&order.customer_name)
        .bind(&order.details)
        .bind(&order.strategy)
        .execute(&self.pool)
        .await
        .map_err(|e| ZapError::Memory(format!("order write failed: {e}")))?;

        debug!(
            "audit: order {} for {} ({})",
            id, order.customer_name, order.strategy
        );

        Ok(())
    }
}

/// Truncate on a char boundary so multi-byte text never panics.
fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
