//! Order conditions.
//!
//! A condition is one of six kinds. Two of the kinds' capabilities are shared
//! and factored into small value types: [`Comparison`] (a threshold and
//! whether the observed value must be above or below it) and
//! [`ContractScope`] (the contract and exchange the condition watches).

use serde::{Deserialize, Serialize};

use super::enums::{ConditionType, TriggerMethod};

/// How a condition combines with the one before it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Conjunction {
    #[default]
    And,
    Or,
}

impl Conjunction {
    pub fn wire_code(self) -> &'static str {
        match self {
            Conjunction::And => "a",
            Conjunction::Or => "o",
        }
    }

    pub fn from_wire(code: &str) -> Self {
        if code == "a" {
            Conjunction::And
        } else {
            Conjunction::Or
        }
    }
}

/// Threshold test. `value` keeps the server's text form because its meaning
/// depends on the condition kind (a price, a timestamp, a percentage).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub is_more: bool,
    pub value: String,
}

/// The instrument a condition observes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractScope {
    pub con_id: i32,
    pub exchange: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ConditionKind {
    Price {
        comparison: Comparison,
        scope: ContractScope,
        trigger_method: TriggerMethod,
    },
    Time {
        comparison: Comparison,
    },
    Margin {
        comparison: Comparison,
    },
    Execution {
        sec_type: String,
        exchange: String,
        symbol: String,
    },
    Volume {
        comparison: Comparison,
        scope: ContractScope,
    },
    PercentChange {
        comparison: Comparison,
        scope: ContractScope,
    },
}

impl ConditionKind {
    pub fn condition_type(&self) -> ConditionType {
        match self {
            ConditionKind::Price { .. } => ConditionType::Price,
            ConditionKind::Time { .. } => ConditionType::Time,
            ConditionKind::Margin { .. } => ConditionType::Margin,
            ConditionKind::Execution { .. } => ConditionType::Execution,
            ConditionKind::Volume { .. } => ConditionType::Volume,
            ConditionKind::PercentChange { .. } => ConditionType::PercentChange,
        }
    }

    pub fn comparison(&self) -> Option<&Comparison> {
        match self {
            ConditionKind::Price { comparison, .. }
            | ConditionKind::Time { comparison }
            | ConditionKind::Margin { comparison }
            | ConditionKind::Volume { comparison, .. }
            | ConditionKind::PercentChange { comparison, .. } => Some(comparison),
            ConditionKind::Execution { .. } => None,
        }
    }

    pub fn scope(&self) -> Option<&ContractScope> {
        match self {
            ConditionKind::Price { scope, .. }
            | ConditionKind::Volume { scope, .. }
            | ConditionKind::PercentChange { scope, .. } => Some(scope),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCondition {
    pub conjunction: Conjunction,
    pub kind: ConditionKind,
}

impl OrderCondition {
    pub fn price(
        is_more: bool,
        price: f64,
        con_id: i32,
        exchange: &str,
        trigger_method: TriggerMethod,
    ) -> Self {
        Self {
            conjunction: Conjunction::And,
            kind: ConditionKind::Price {
                comparison: Comparison { is_more, value: price.to_string() },
                scope: ContractScope { con_id, exchange: exchange.to_string() },
                trigger_method,
            },
        }
    }

    /// `time` uses the server's `YYYYMMDD HH:MM:SS` form.
    pub fn time(is_more: bool, time: &str) -> Self {
        Self {
            conjunction: Conjunction::And,
            kind: ConditionKind::Time {
                comparison: Comparison { is_more, value: time.to_string() },
            },
        }
    }

    pub fn or(mut self) -> Self {
        self.conjunction = Conjunction::Or;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_capabilities() {
        let cond = OrderCondition::price(true, 150.5, 265598, "SMART", TriggerMethod::Last);
        assert_eq!(cond.kind.condition_type(), ConditionType::Price);
        assert_eq!(cond.kind.comparison().map(|c| c.value.as_str()), Some("150.5"));
        assert_eq!(cond.kind.scope().map(|s| s.con_id), Some(265598));

        let exec = ConditionKind::Execution {
            sec_type: "STK".into(),
            exchange: "SMART".into(),
            symbol: "AAPL".into(),
        };
        assert!(exec.comparison().is_none());
        assert!(exec.scope().is_none());
    }

    #[test]
    fn conjunction_codes() {
        assert_eq!(Conjunction::from_wire("a"), Conjunction::And);
        assert_eq!(Conjunction::from_wire("o"), Conjunction::Or);
        assert_eq!(OrderCondition::time(false, "20240101 09:30:00").or().conjunction.wire_code(), "o");
    }

    #[test]
    fn serde_tags_kind() {
        let cond = OrderCondition::time(true, "20240101 09:30:00");
        let json = serde_json::to_value(&cond).unwrap();
        assert_eq!(json["kind"]["kind"], "time");
        let back: OrderCondition = serde_json::from_value(json).unwrap();
        assert_eq!(back, cond);
    }
}
