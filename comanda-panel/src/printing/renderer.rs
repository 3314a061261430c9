//! Order receipt renderer
//!
//! Turns an [`Order`] into a [`ReceiptJob`] for whichever backend is
//! active. Rendering is where the storefront's quirks get cleaned up: the
//! zero-quantity ingredient lines its cart writes are dropped, the labeled
//! observation prefix is stripped, and money is fixed to two decimals.

use crate::model::Order;
use comanda_printer::{ReceiptBuilder, ReceiptJob};

/// Quantity marker the storefront cart writes for zeroed-out ingredients
/// ("0x Cebola"); such lines never reach the receipt
const ZEROED_PREFIX: &str = "0x";

/// Labels the storefront prepends to the free-text observation column
const OBSERVATION_LABELS: &[&str] = &["observação:", "observacao:", "obs:"];

pub struct ReceiptRenderer;

impl ReceiptRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render one order into both backend body shapes
    pub fn render(&self, order: &Order) -> ReceiptJob {
        let mut b = ReceiptBuilder::new();

        b.title(format!("Pedido #{}", order.dedup_key()));
        b.field("Cliente", order.customer.as_str());
        b.label("Itens:");
        for line in item_lines(&order.items) {
            b.line(line);
        }
        if let Some(obs) = order.observation.as_deref() {
            let trimmed = strip_observation_label(obs);
            if !trimmed.is_empty() {
                b.field("Observação", trimmed);
            }
        }
        b.field("Forma de pagamento", order.payment.as_str());
        b.field("Taxa de entrega", format!("R${:.2}", order.delivery_fee));
        b.field("Total", format!("R${:.2}", order.total));
        if let Some(addr) = order.address.as_deref() {
            if !addr.is_empty() {
                b.field("Endereço", addr);
            }
        }

        ReceiptJob::new(order.dedup_key(), b.to_html(), b.to_text())
    }
}

impl Default for ReceiptRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Flatten items into printable lines, dropping zeroed-ingredient markers
///
/// Each item entry may itself span multiple lines (product, modifiers,
/// note); the filter applies per line so a zeroed modifier inside an item
/// disappears without taking the product with it.
fn item_lines(items: &[String]) -> Vec<&str> {
    items
        .iter()
        .flat_map(|item| item.lines())
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with(ZEROED_PREFIX))
        .collect()
}

/// Strip the storefront's observation label, keeping only the remainder
fn strip_observation_label(obs: &str) -> &str {
    let trimmed = obs.trim();
    let lower = trimmed.to_lowercase();
    for label in OBSERVATION_LABELS {
        if lower.starts_with(label) {
            return trimmed[label.len()..].trim_start();
        }
    }
    trimmed
}
