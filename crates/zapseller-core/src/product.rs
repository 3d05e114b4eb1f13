//! Products and the sales strategy each one is sold under.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How the salesperson closes a deal.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SalesStrategy {
    /// Cash on delivery.
    #[default]
    Cod,
    /// Paid up front through the checkout link.
    Prepaid,
    /// Digital product with immediate access.
    Digital,
    /// Service sold through a quote.
    Service,
}

impl SalesStrategy {
    /// Prompt fragment describing the business flow for this strategy.
    pub fn instructions(self, product: &Product) -> String {
        let link = product
            .checkout_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or("Indisponível");
        match self {
            Self::Digital => format!("Venda o acesso imediato. Link: {link}."),
            Self::Service => {
                "Qualifique o lead e use confirmOrder quando ele quiser um orçamento.".to_string()
            }
            Self::Prepaid => format!(
                "PAGAMENTO ANTECIPADO. Envie o link de pagamento ({link}) e, após a confirmação, \
                 colete nome e endereço de entrega via confirmOrder."
            ),
            Self::Cod => "PAGAMENTO NA ENTREGA (CoD). Cliente paga ao receber em mãos. \
                          Peça endereço via confirmOrder."
                .to_string(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cod => "cod",
            Self::Prepaid => "prepaid",
            Self::Digital => "digital",
            Self::Service => "service",
        }
    }
}

/// A product the virtual salesperson sells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Display price without currency symbol, e.g. "197,90".
    pub price: String,
    pub benefits: String,
    #[serde(default)]
    pub sales_strategy: SalesStrategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkout_url: Option<String>,
}

impl Product {
    /// The demo product every new workspace starts with.
    pub fn demo() -> Self {
        Self {
            id: "1".to_string(),
            name: "Kit Emagrecedor Natural X".to_string(),
            price: "197,90".to_string(),
            benefits: "Queima gordura localizada, inibe o apetite e dá mais energia.".to_string(),
            sales_strategy: SalesStrategy::Cod,
            checkout_url: None,
        }
    }

    /// A blank product added from the editor.
    pub fn blank() -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string()[..9].to_string(),
            name: "Novo Produto".to_string(),
            price: "0,00".to_string(),
            benefits: String::new(),
            sales_strategy: SalesStrategy::Cod,
            checkout_url: None,
        }
    }
}

/// Partial update from the product editor. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<String>,
    pub benefits: Option<String>,
    pub sales_strategy: Option<SalesStrategy>,
    pub checkout_url: Option<String>,
}

impl ProductPatch {
    pub fn apply(self, product: &mut Product) {
        if let Some(v) = self.name {
            product.name = v;
        }
        if let Some(v) = self.price {
            product.price = v;
        }
        if let Some(v) = self.benefits {
            product.benefits = v;
        }
        if let Some(v) = self.sales_strategy {
            product.sales_strategy = v;
        }
        if let Some(v) = self.checkout_url {
            product.checkout_url = if v.trim().is_empty() { None } else { Some(v) };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digital_uses_checkout_link() {
        let mut p = Product::demo();
        p.checkout_url = Some("https://pay.example/abc".into());
        let text = SalesStrategy::Digital.instructions(&p);
        assert!(text.contains("https://pay.example/abc"));
    }

    #[test]
    fn test_missing_link_is_unavailable() {
        let mut p = Product::demo();
        p.checkout_url = Some("   ".into());
        assert!(SalesStrategy::Digital
            .instructions(&p)
            .contains("Indisponível"));
        assert!(SalesStrategy::Prepaid
            .instructions(&p)
            .contains("Indisponível"));
    }

    #[test]
    fn test_cod_and_service_mention_tool() {
        let p = Product::demo();
        assert!(SalesStrategy::Cod.instructions(&p).contains("CoD"));
        assert!(SalesStrategy::Cod.instructions(&p).contains("confirmOrder"));
        assert!(SalesStrategy::Service
            .instructions(&p)
            .contains("orçamento"));
    }

    #[test]
    fn test_product_deserialize_defaults_to_cod() {
        let json = r#"{"id":"9","name":"Chá","price":"49,90","benefits":"Relaxa"}"#;
        let p: Product = serde_json::from_str(json).unwrap();
        assert_eq!(p.sales_strategy, SalesStrategy::Cod);
        assert!(p.checkout_url.is_none());
    }

    #[test]
    fn test_blank_product_ids_are_unique() {
        let a = Product::blank();
        let b = Product::blank();
        assert_eq!(a.id.len(), 9);
        assert_ne!(a.id, b.id);
        assert_eq!(a.name, "Novo Produto");
    }

    #[test]
    fn test_patch_applies_only_given_fields() {
        let mut p = Product::demo();
        ProductPatch {
            price: Some("99,00".into()),
            sales_strategy: Some(SalesStrategy::Digital),
            checkout_url: Some(String::new()),
            ..Default::default()
        }
        .apply(&mut p);
        assert_eq!(p.price, "99,00");
        assert_eq!(p.name, "Kit Emagrecedor Natural X");
        assert_eq!(p.sales_strategy, SalesStrategy::Digital);
        assert!(p.checkout_url.is_none());
    }
}
