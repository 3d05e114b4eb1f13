//! Connected WhatsApp numbers (simulated).

use rand::Rng;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;
use zapseller_core::error::ZapError;

use super::{unknown_operator, Workspace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Connected,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhatsAppAccount {
    pub id: String,
    pub name: String,
    pub number: String,
    pub status: AccountStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<String>,
}

impl WhatsAppAccount {
    /// The number every new workspace shows as already connected.
    pub fn demo() -> Self {
        Self {
            id: "1".to_string(),
            name: "Suporte Principal".to_string(),
            number: "+55 (11) 98765-4321".to_string(),
            status: AccountStatus::Connected,
            last_activity: Some("Há 2 min".to_string()),
        }
    }

    /// A freshly paired account, the `position`-th of the operator.
    fn paired(position: usize) -> Self {
        let suffix: u32 = rand::thread_rng().gen_range(10_000_000..100_000_000);
        Self {
            id: Uuid::new_v4().simple().to_string()[..9].to_string(),
            name: format!("Conta {position}"),
            number: format!("+55 (11) 9{suffix}"),
            status: AccountStatus::Connected,
            last_activity: Some("Agora mesmo".to_string()),
        }
    }
}

impl Workspace {
    pub async fn accounts(&self, email: &str) -> Result<Vec<WhatsAppAccount>, ZapError> {
        let operators = self.operators.read().await;
        let op = operators.get(email).ok_or_else(|| unknown_operator(email))?;
        Ok(op.accounts.clone())
    }

    /// Whether one more account fits in the operator's plan.
    pub async fn has_account_slot(&self, email: &str) -> Result<bool, ZapError> {
        let operators = self.operators.read().await;
        let op = operators.get(email).ok_or_else(|| unknown_operator(email))?;
        Ok(op.accounts.len() < op.plan.limits().max_accounts)
    }

    /// Add a connected account after a completed pairing.
    pub async fn connect_account(&self, email: &str) -> Result<WhatsAppAccount, ZapError> {
        let mut operators = self.operators.write().await;
        let op = operators
            .get_mut(email)
            .ok_or_else(|| unknown_operator(email))?;
        let max = op.plan.limits().max_accounts;
        if op.accounts.len() >= max {
            return Err(ZapError::PlanLimit(format!("accounts ({max})")));
        }
        let account = WhatsAppAccount::paired(op.accounts.len() + 1);
        info!("workspace: {email} connected {}", account.number);
        op.accounts.push(account.clone());
        Ok(account)
    }

    pub async fn remove_account(&self, email: &str, id: &str) -> Result<(), ZapError> {
        let mut operators = self.operators.write().await;
        let op = operators
            .get_mut(email)
            .ok_or_else(|| unknown_operator(email))?;
        let before = op.accounts.len();
        op.accounts.retain(|a| a.id != id);
        if op.accounts.len() == before {
            return Err(ZapError::NotFound(format!("account {id}")));
        }
        Ok(())
    }
}
