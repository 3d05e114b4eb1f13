//! Format helpers for strings with interpolation.

use super::t;

/// A feature the operator's plan does not include.
pub fn feature_locked(lang: &str, feature: &str) -> String {
    let key = format!("feature_{feature}");
    let label = match t(&key, lang) {
        "???" => feature,
        label => label,
    };
    match lang {
        "Portuguese" => format!("Recurso indisponível no seu plano: {label}. Faça upgrade para liberar."),
        _ => format!("Not available on your plan: {label}. Upgrade to unlock."),
    }
}

/// A countable plan limit (products, accounts) was reached.
pub fn plan_limit(lang: &str, what: &str) -> String {
    match lang {
        "Portuguese" => format!("Limite do plano atingido: {what}. Faça upgrade para continuar."),
        _ => format!("Plan limit reached: {what}. Upgrade to continue."),
    }
}

/// Confirmation after a plan change, with the checkout link when there is one.
pub fn plan_changed(lang: &str, plan: &str, checkout_url: Option<&str>) -> String {
    match (lang, checkout_url) {
        ("Portuguese", Some(url)) => format!("Plano {plan} ativado. Finalize o pagamento em: {url}"),
        ("Portuguese", None) => format!("Plano {plan} ativado."),
        (_, Some(url)) => format!("Plan {plan} activated. Complete payment at: {url}"),
        (_, None) => format!("Plan {plan} activated."),
    }
}
