//! Fixed-rate USD to Conchita coin conversion.

use serde_json::json;

use super::{AgentTool, AgentToolParameters};
use crate::error::ParleyError;

pub const TOOL_NAME: &str = "convert_currency";

/// Conchita coins per US dollar.
pub const CONCHITA_RATE: f64 = 1.3;

pub fn convert_to_conchita(amount: f64) -> f64 {
    amount * CONCHITA_RATE
}

/// The `convert_currency` tool.
pub fn tool() -> AgentTool {
    AgentTool::new(
        TOOL_NAME,
        "Converts an amount in US dollars (USD) to Conchita coins. \
         Use it whenever the user asks about Conchita coins.",
        AgentToolParameters::object()
            .number("amount", "Amount in US dollars", true)
            .build(),
        |args| async move {
            let amount = args.get_f64("amount")?;
            let converted = convert_to_conchita(amount);
            if !converted.is_finite() {
                return Err(ParleyError::InvalidArgument(format!(
                    "Amount {amount} is out of range"
                )));
            }
            Ok(json!(converted))
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{Tool, ToolArguments};

    #[test]
    fn conversion_applies_fixed_rate() {
        for amount in [0.0, 1.0, 10.0, -4.0, 123.45, 1e9] {
            assert!((convert_to_conchita(amount) - amount * 1.3).abs() < 1e-6 * amount.abs().max(1.0));
        }
    }

    #[tokio::test]
    async fn tool_accepts_numeric_strings() {
        let value = tool()
            .execute(&ToolArguments::new(json!({"amount": "10"})))
            .await
            .unwrap();
        assert!((value.as_f64().unwrap() - 13.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn non_numeric_amount_is_rejected() {
        let err = tool()
            .execute(&ToolArguments::new(json!({"amount": "ten"})))
            .await
            .unwrap_err();
        assert!(matches!(err, ParleyError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn out_of_range_amount_is_rejected() {
        for amount in [json!(1e308), json!("inf"), json!("NaN")] {
            let err = tool()
                .execute(&ToolArguments::new(json!({ "amount": amount })))
                .await
                .unwrap_err();
            assert!(matches!(err, ParleyError::InvalidArgument(_)), "{amount}");
        }
    }
}
