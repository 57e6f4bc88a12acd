//! Fills and their commission reports.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    pub order_id: i32,
    pub exec_id: String,
    pub time: String,
    pub acct_number: String,
    pub exchange: String,
    /// `BOT` or `SLD`.
    pub side: String,
    pub shares: Option<Decimal>,
    pub price: f64,
    pub perm_id: i64,
    pub client_id: i32,
    pub liquidation: i32,
    pub cum_qty: Option<Decimal>,
    pub avg_price: f64,
    pub order_ref: String,
    pub ev_rule: String,
    pub ev_multiplier: f64,
    pub model_code: String,
    pub last_liquidity: i32,
    pub pending_price_revision: bool,
    pub submitter: String,
}

/// Narrows an executions request. Empty strings match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionFilter {
    pub client_id: i32,
    pub acct_code: String,
    /// `yyyymmdd hh:mm:ss`; executions after this time.
    pub time: String,
    pub symbol: String,
    pub sec_type: String,
    pub exchange: String,
    pub side: String,
    pub last_n_days: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub specific_dates: Vec<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionAndFeesReport {
    pub exec_id: String,
    pub commission_and_fees: f64,
    pub currency: String,
    pub realized_pnl: Option<f64>,
    pub yield_amount: Option<f64>,
    /// `YYYYMMDD`, 0 when not applicable.
    pub yield_redemption_date: i32,
}
