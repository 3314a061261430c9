//! Order model
//!
//! Orders arrive from the hosted data platform with a loose schema: the
//! items column may be a JSON array or a comma-delimited string, money
//! columns may be numbers or strings, and the human-facing number may be
//! missing entirely. Deserialization absorbs all of that here so the rest
//! of the pipeline works with one strict shape.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Operator identity (the signed-in back-office account)
pub type OperatorId = String;

/// Dedup identity: `number` when present, store id otherwise
pub type DedupKey = String;

/// An inbound order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Durable store key
    pub id: i64,
    /// Human-facing order number, may be absent
    #[serde(
        default,
        rename = "numero",
        deserialize_with = "de_opt_string_like"
    )]
    pub number: Option<String>,
    #[serde(default, rename = "cliente")]
    pub customer: String,
    /// Line items; each entry may span multiple lines (product, modifiers, note)
    #[serde(default, rename = "itens", deserialize_with = "de_items")]
    pub items: Vec<String>,
    #[serde(default, rename = "pagamento")]
    pub payment: String,
    #[serde(default, rename = "taxa", deserialize_with = "de_money")]
    pub delivery_fee: Decimal,
    #[serde(default, deserialize_with = "de_money")]
    pub total: Decimal,
    #[serde(default, rename = "endereco")]
    pub address: Option<String>,
    #[serde(default, rename = "observacao")]
    pub observation: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Identity used by the dedup set and for receipt headings
    pub fn dedup_key(&self) -> DedupKey {
        match &self.number {
            Some(n) if !n.trim().is_empty() => n.clone(),
            _ => self.id.to_string(),
        }
    }
}

/// Accept a string or a bare number for text-ish columns
fn de_opt_string_like<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(de)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Accept a JSON array of items or a comma-delimited string
fn de_items<'de, D>(de: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(de)?;
    Ok(normalize_items(value.as_ref()))
}

/// Normalization shared with tests: list stays a list, delimited string is
/// split on commas, anything else is no items
pub fn normalize_items(value: Option<&serde_json::Value>) -> Vec<String> {
    match value {
        Some(serde_json::Value::Array(entries)) => entries
            .iter()
            .filter_map(|v| match v {
                serde_json::Value::String(s) => Some(s.trim().to_string()),
                serde_json::Value::Null => None,
                other => Some(other.to_string()),
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Some(serde_json::Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Money columns: number, numeric string (optionally "R$"-prefixed, comma
/// decimal separator), or missing. Malformed values degrade to zero rather
/// than failing the whole order.
fn de_money<'de, D>(de: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(de)?;
    Ok(parse_money(value.as_ref()))
}

fn parse_money(value: Option<&serde_json::Value>) -> Decimal {
    match value {
        Some(serde_json::Value::Number(n)) => n
            .as_f64()
            .and_then(Decimal::from_f64_retain)
            .map(|d| d.round_dp(2))
            .unwrap_or(Decimal::ZERO),
        Some(serde_json::Value::String(s)) => {
            let cleaned = s.trim().trim_start_matches("R$").trim().replace(',', ".");
            cleaned.parse::<Decimal>().unwrap_or(Decimal::ZERO)
        }
        _ => Decimal::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn order_json() -> serde_json::Value {
        json!({
            "id": 1,
            "numero": "A1",
            "cliente": "Maria",
            "itens": ["1x Pizza Margherita\n0x Cebola", "1x Guaraná lata"],
            "pagamento": "PIX",
            "taxa": 5.0,
            "total": "42.50",
            "endereco": "Rua São João, 10",
            "observacao": "Obs: sem troco",
            "created_at": "2025-06-01T18:30:00+00:00"
        })
    }

    #[test]
    fn test_deserialize_full_order() {
        let order: Order = serde_json::from_value(order_json()).unwrap();
        assert_eq!(order.id, 1);
        assert_eq!(order.number.as_deref(), Some("A1"));
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.delivery_fee, Decimal::new(500, 2));
        assert_eq!(order.total, Decimal::new(4250, 2));
    }

    #[test]
    fn test_items_from_delimited_string() {
        let mut raw = order_json();
        raw["itens"] = json!("1x Pizza, 2x Coca-Cola , ");
        let order: Order = serde_json::from_value(raw).unwrap();
        assert_eq!(order.items, vec!["1x Pizza", "2x Coca-Cola"]);
    }

    #[test]
    fn test_missing_optional_fields() {
        let order: Order = serde_json::from_value(json!({
            "id": 9,
            "created_at": "2025-06-01T18:30:00Z"
        }))
        .unwrap();
        assert!(order.number.is_none());
        assert!(order.items.is_empty());
        assert_eq!(order.total, Decimal::ZERO);
        assert_eq!(order.delivery_fee, Decimal::ZERO);
    }

    #[test]
    fn test_malformed_total_degrades_to_zero() {
        let mut raw = order_json();
        raw["total"] = json!("quarenta e dois");
        let order: Order = serde_json::from_value(raw).unwrap();
        assert_eq!(order.total, Decimal::ZERO);
    }

    #[test]
    fn test_money_accepts_currency_prefix_and_comma() {
        assert_eq!(
            parse_money(Some(&json!("R$ 12,50"))),
            Decimal::new(1250, 2)
        );
    }

    #[test]
    fn test_numeric_order_number() {
        let mut raw = order_json();
        raw["numero"] = json!(107);
        let order: Order = serde_json::from_value(raw).unwrap();
        assert_eq!(order.number.as_deref(), Some("107"));
    }

    #[test]
    fn test_dedup_key_prefers_number() {
        let order: Order = serde_json::from_value(order_json()).unwrap();
        assert_eq!(order.dedup_key(), "A1");
    }

    #[test]
    fn test_dedup_key_falls_back_to_id() {
        let mut raw = order_json();
        raw["numero"] = json!(null);
        let order: Order = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(order.dedup_key(), "1");

        raw["numero"] = json!("   ");
        let order: Order = serde_json::from_value(raw).unwrap();
        assert_eq!(order.dedup_key(), "1");
    }
}
