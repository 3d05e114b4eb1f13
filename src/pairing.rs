//! Simulated WhatsApp pairing.
//!
//! `start` hands out a QR code for a random token; `confirm` completes the
//! pairing and adds a connected number to the operator's workspace. No real
//! WhatsApp session is ever opened.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::RngCore;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;
use zapseller_core::error::ZapError;

use crate::workspace::{WhatsAppAccount, Workspace};

/// What a client needs to render the pairing screen.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingTicket {
    pub id: String,
    /// PNG image, base64-encoded.
    pub qr_png_base64: String,
    pub expires_in_secs: u64,
}

struct PendingPairing {
    operator: String,
    created: Instant,
}

pub struct Pairing {
    pending: Mutex<HashMap<String, PendingPairing>>,
    ttl: Duration,
}

impl Pairing {
    pub fn new(ttl: Duration) -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub async fn start(&self, operator: &str) -> Result<PairingTicket, ZapError> {
        let mut token = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut token);
        let payload = format!("zapseller://pair/{}", hex::encode(token));
        let png = qr_png(&payload)?;

        let id = Uuid::new_v4().to_string();
        let mut pending = self.pending.lock().await;
        let ttl = self.ttl;
        pending.retain(|_, p| p.created.elapsed() < ttl);
        pending.insert(
            id.clone(),
            PendingPairing {
                operator: operator.to_string(),
                created: Instant::now(),
            },
        );
        info!("pairing {id} started for {operator}");

        Ok(PairingTicket {
            id,
            qr_png_base64: BASE64.encode(png),
            expires_in_secs: ttl.as_secs(),
        })
    }

    /// Complete a pairing. Unknown, expired and foreign pairings all look
    /// the same to the caller.
    pub async fn confirm(
        &self,
        id: &str,
        operator: &str,
        workspace: &Workspace,
    ) -> Result<WhatsAppAccount, ZapError> {
        let mut pending = self.pending.lock().await;
        let valid = pending
            .get(id)
            .is_some_and(|p| p.operator == operator && p.created.elapsed() < self.ttl);
        if !valid {
            return Err(ZapError::NotFound(format!("pairing {id}")));
        }

        let account = workspace.connect_account(operator).await?;
        pending.remove(id);
        info!("pairing {id} confirmed for {operator}");
        Ok(account)
    }
}

/// Render `data` as a QR code PNG.
pub fn qr_png(data: &str) -> Result<Vec<u8>, ZapError> {
    use image::{ImageBuffer, Luma};
    use qrcode::{Color, EcLevel, QrCode};

    let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::L)
        .map_err(|e| ZapError::Invalid(format!("QR generation failed: {e}")))?;

    let module_size: u32 = 8;
    let quiet_zone: u32 = 2;
    let modules = code.width() as u32;
    let img_size = (modules + quiet_zone * 2) * module_size;

    let img = ImageBuffer::from_fn(img_size, img_size, |x, y| {
        let (cx, cy) = (x / module_size, y / module_size);
        if cx < quiet_zone || cy < quiet_zone {
            return Luma([255u8]);
        }
        let (mx, my) = (cx - quiet_zone, cy - quiet_zone);
        if mx >= modules || my >= modules {
            return Luma([255u8]);
        }
        match code[(mx as usize, my as usize)] {
            Color::Dark => Luma([0u8]),
            Color::Light => Luma([255u8]),
        }
    });

    let mut buf = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png)
        .map_err(|e| ZapError::Invalid(format!("PNG encoding failed: {e}")))?;

    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use zapseller_core::plan::PlanTier;

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    async fn pro_workspace() -> Workspace {
        let ws = Workspace::new();
        ws.signup("a@b.com", "segredo1", "segredo1").await.unwrap();
        ws.change_plan("a@b.com", PlanTier::Pro).await.unwrap();
        ws
    }

    #[test]
    fn test_qr_png_is_png() {
        let png = qr_png("zapseller://pair/abc").unwrap();
        assert_eq!(&png[..8], &PNG_MAGIC);
    }

    #[tokio::test]
    async fn test_start_returns_decodable_png() {
        let pairing = Pairing::new(Duration::from_secs(120));
        let ticket = pairing.start("a@b.com").await.unwrap();
        assert_eq!(ticket.expires_in_secs, 120);
        let png = BASE64.decode(&ticket.qr_png_base64).unwrap();
        assert_eq!(&png[..8], &PNG_MAGIC);
    }

    #[tokio::test]
    async fn test_confirm_adds_account_once() {
        let ws = pro_workspace().await;
        let pairing = Pairing::new(Duration::from_secs(120));
        let ticket = pairing.start("a@b.com").await.unwrap();

        let acc = pairing.confirm(&ticket.id, "a@b.com", &ws).await.unwrap();
        assert_eq!(acc.name, "Conta 2");
        assert!(matches!(
            pairing.confirm(&ticket.id, "a@b.com", &ws).await,
            Err(ZapError::NotFound(_))
        ));
        assert_eq!(ws.accounts("a@b.com").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_confirm_by_other_operator_rejected() {
        let ws = pro_workspace().await;
        let pairing = Pairing::new(Duration::from_secs(120));
        let ticket = pairing.start("a@b.com").await.unwrap();
        assert!(matches!(
            pairing.confirm(&ticket.id, "x@y.com", &ws).await,
            Err(ZapError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_expired_pairing_rejected() {
        let ws = pro_workspace().await;
        let pairing = Pairing::new(Duration::ZERO);
        let ticket = pairing.start("a@b.com").await.unwrap();
        assert!(matches!(
            pairing.confirm(&ticket.id, "a@b.com", &ws).await,
            Err(ZapError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_confirm_over_account_limit() {
        let ws = Workspace::new();
        ws.signup("a@b.com", "segredo1", "segredo1").await.unwrap();
        let pairing = Pairing::new(Duration::from_secs(120));
        let ticket = pairing.start("a@b.com").await.unwrap();
        assert!(matches!(
            pairing.confirm(&ticket.id, "a@b.com", &ws).await,
            Err(ZapError::PlanLimit(_))
        ));
        // Still pending: upgrading and retrying works.
        ws.change_plan("a@b.com", PlanTier::Pro).await.unwrap();
        assert!(pairing.confirm(&ticket.id, "a@b.com", &ws).await.is_ok());
    }
}
