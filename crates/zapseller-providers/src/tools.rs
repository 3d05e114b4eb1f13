//! Function declarations offered to the model.

use serde_json::{json, Value};
use zapseller_core::context::ToolDef;

/// Name of the order-confirmation function.
pub const CONFIRM_ORDER: &str = "confirmOrder";

/// The single tool the salesperson has: register a closed sale or a qualified
/// lead with the customer's name and delivery/contact details.
pub fn confirm_order_tool() -> ToolDef {
    ToolDef {
        name: CONFIRM_ORDER.to_string(),
        description: "Registra o fechamento de uma venda ou interesse qualificado coletando dados do cliente."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "customerName": {
                    "type": "string",
                    "description": "Nome completo do cliente."
                },
                "details": {
                    "type": "string",
                    "description": "Endereço de entrega, e-mail ou requisitos específicos."
                }
            },
            "required": ["customerName", "details"]
        }),
    }
}

/// Read a string argument from a function call, tolerating missing keys.
pub fn string_arg(args: &Value, key: &str) -> String {
    args.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_order_schema() {
        let tool = confirm_order_tool();
        assert_eq!(tool.name, "confirmOrder");
        assert_eq!(tool.parameters["type"], "object");
        assert_eq!(
            tool.parameters["required"],
            json!(["customerName", "details"])
        );
        assert_eq!(
            tool.parameters["properties"]["customerName"]["type"],
            "string"
        );
    }

    #[test]
    fn test_string_arg() {
        let args = json!({"customerName": "  Ana Souza ", "details": 42});
        assert_eq!(string_arg(&args, "customerName"), "Ana Souza");
        assert_eq!(string_arg(&args, "details"), "");
        assert_eq!(string_arg(&args, "missing"), "");
    }
}
