//! Money arithmetic shared across the invoicing and billing surfaces.
//!
//! All amounts are integers in minor currency units (cents), so no rounding
//! can occur. Inputs are validated at the request boundary; the functions
//! here assume quantity ≥ 1 and unit price ≥ 0 and therefore cannot fail.

use crate::types::InvoiceItem;

/// A plan ceiling: either a finite count or unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanLimit {
    Limited(u64),
    Unlimited,
}

impl PlanLimit {
    pub fn is_unlimited(&self) -> bool {
        matches!(self, PlanLimit::Unlimited)
    }
}

/// Total amount of an invoice in minor currency units.
///
/// Σ(quantity × unit price) over all line items; an empty item list yields 0.
pub fn invoice_total(items: &[InvoiceItem]) -> i64 {
    items
        .iter()
        .map(|item| item.quantity * item.unit_price_minor)
        .sum()
}

/// Bounded display percentage for a usage meter.
///
/// `min(100, current / limit × 100)` for finite limits. An unlimited plan
/// always reads 0% so the dashboard never shows a warning state. Display
/// convenience only; nothing here enforces the limit.
pub fn usage_percent(current: u64, limit: PlanLimit) -> u8 {
    match limit {
        PlanLimit::Unlimited => 0,
        PlanLimit::Limited(0) => 100,
        PlanLimit::Limited(max) => {
            let pct = current.saturating_mul(100) / max;
            pct.min(100) as u8
        }
    }
}
