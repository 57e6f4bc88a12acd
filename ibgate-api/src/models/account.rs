//! Account and portfolio records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::contract::Contract;

/// One row of an account updates subscription's portfolio.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioItem {
    pub contract: Contract,
    pub position: Option<Decimal>,
    pub market_price: f64,
    pub market_value: f64,
    pub average_cost: f64,
    pub unrealized_pnl: f64,
    pub realized_pnl: f64,
    pub account_name: String,
}

/// A position reported by a positions request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub account: String,
    pub contract: Contract,
    pub position: Option<Decimal>,
    pub avg_cost: f64,
}
