//! Conversion funnel aggregation over the audit log.

use super::Store;
use serde::Serialize;
use zapseller_core::error::ZapError;

/// Funnel counts for one operator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionReport {
    /// Distinct conversations with at least one admitted exchange.
    pub conversations: i64,
    /// Conversations where the customer asked about price.
    pub asked_price: i64,
    /// Conversations that reached the delivery step.
    pub reached_delivery: i64,
    pub confirmed_orders: i64,
    pub total_messages: i64,
    pub failed_messages: i64,
    /// Messages refused by quota or plan gates. Never part of the funnel.
    pub denied_messages: i64,
    pub recent_orders: Vec<OrderRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRow {
    pub conversation_id: String,
    pub product_id: String,
    pub customer_name: String,
    pub details: String,
    pub strategy: String,
    pub created_at: String,
}

impl Store {
    /// Build the conversion report for an operator, with up to
    /// `recent_limit` most recent orders.
    pub async fn conversion_report(
        &self,
        operator: &str,
        recent_limit: i64,
    ) -> Result<ConversionReport, ZapError> {
        let (
            conversations,
            asked_price,
            reached_delivery,
            total_messages,
            failed_messages,
            denied_messages,
        ): (i64, i64, i64, i64, i64, i64) = sqlx::query_as(
            "SELECT \
               COUNT(DISTINCT CASE WHEN status <> 'denied' THEN conversation_id END), \
               COUNT(DISTINCT CASE WHEN status <> 'denied' AND intent_price = 1 \
                                   THEN conversation_id END), \
               COUNT(DISTINCT CASE WHEN status <> 'denied' AND intent_delivery = 1 \
                                   THEN conversation_id END), \
               COALESCE(SUM(CASE WHEN status <> 'denied' THEN 1 ELSE 0 END), 0), \
               COALESCE(SUM(CASE WHEN status = 'error' THEN 1 ELSE 0 END), 0), \
               COALESCE(SUM(CASE WHEN status = 'denied' THEN 1 ELSE 0 END), 0) \
             FROM exchanges WHERE operator = ?",
        )
        .bind(operator)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ZapError::Memory(format!("report query failed: {e}")))?;

        let (confirmed_orders,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM orders WHERE operator = ?")
                .bind(operator)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| ZapError::Memory(format!("order count failed: {e}")))?;

        let recent_orders = self.recent_orders(operator, recent_limit).await?;

        Ok(ConversionReport {
            conversations,
            asked_price,
            reached_delivery,
            confirmed_orders,
            total_messages,
            failed_messages,
            denied_messages,
            recent_orders,
        })
    }

    /// Most recent orders first.
    pub async fn recent_orders(
        &self,
        operator: &str,
        limit: i64,
    ) -> Result<Vec<OrderRow>, ZapError> {
        let rows: Vec<(String, String, String, String, String, String)> = sqlx::query_as(
            "SELECT conversation_id, product_id, customer_name, details, strategy, created_at \
             FROM orders WHERE operator = ? \
             ORDER BY created_at DESC, rowid DESC LIMIT ?",
        )
        .bind(operator)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ZapError::Memory(format!("order listing failed: {e}")))?;

        Ok(rows
            .into_iter()
            .map(
                |(conversation_id, product_id, customer_name, details, strategy, created_at)| {
                    OrderRow {
                        conversation_id,
                        product_id,
                        customer_name,
                        details,
                        strategy,
                        created_at,
                    }
                },
            )
            .collect())
    }
}
