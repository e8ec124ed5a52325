//! The fixed plan catalog backing both the landing site's pricing section
//! and the billing dashboard's usage limits.

use serde::{Deserialize, Serialize};

use crate::money::PlanLimit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanId {
    Starter,
    Growth,
    Scale,
}

impl PlanId {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "starter" => Some(Self::Starter),
            "growth" => Some(Self::Growth),
            "scale" => Some(Self::Scale),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Starter => "starter",
            Self::Growth => "growth",
            Self::Scale => "scale",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub id: PlanId,
    pub name: &'static str,
    /// Monthly price in minor currency units.
    pub monthly_price_minor: i64,
    /// Invoices that may be created per billing period.
    pub invoice_limit: PlanLimit,
    /// Team members per company.
    pub member_limit: PlanLimit,
    pub features: &'static [&'static str],
}

/// The full catalog, in display order.
pub fn catalog() -> Vec<Plan> {
    vec![
        Plan {
            id: PlanId::Starter,
            name: "Starter",
            monthly_price_minor: 0,
            invoice_limit: PlanLimit::Limited(10),
            member_limit: PlanLimit::Limited(3),
            features: &["10 invoices / month", "3 team members", "Email support"],
        },
        Plan {
            id: PlanId::Growth,
            name: "Growth",
            monthly_price_minor: 4900,
            invoice_limit: PlanLimit::Limited(100),
            member_limit: PlanLimit::Limited(10),
            features: &[
                "100 invoices / month",
                "10 team members",
                "Realtime updates",
                "Priority support",
            ],
        },
        Plan {
            id: PlanId::Scale,
            name: "Scale",
            monthly_price_minor: 19900,
            invoice_limit: PlanLimit::Unlimited,
            member_limit: PlanLimit::Unlimited,
            features: &[
                "Unlimited invoices",
                "Unlimited team members",
                "Realtime updates",
                "Dedicated support",
            ],
        },
    ]
}

/// Look up a plan by id.
pub fn plan(id: PlanId) -> Plan {
    catalog()
        .into_iter()
        .find(|p| p.id == id)
        .expect("catalog covers every PlanId")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_covers_every_plan_id() {
        for id in [PlanId::Starter, PlanId::Growth, PlanId::Scale] {
            assert_eq!(plan(id).id, id);
        }
    }

    #[test]
    fn parse_round_trips() {
        for id in [PlanId::Starter, PlanId::Growth, PlanId::Scale] {
            assert_eq!(PlanId::parse(id.as_str()), Some(id));
        }
        assert_eq!(PlanId::parse("enterprise"), None);
    }

    #[test]
    fn scale_is_unbounded() {
        let p = plan(PlanId::Scale);
        assert!(p.invoice_limit.is_unlimited());
        assert!(p.member_limit.is_unlimited());
    }
}
