//! Output records.
//!
//! Every callback the runner cares about becomes one JSON object on stdout,
//! tagged by `type` and stamped with the local time it was received.

use serde::Serialize;

use ibgate_api::{Contract, StatsSnapshot};

/// One stdout line.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub timestamp: String,
    #[serde(flatten)]
    pub event: Event,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Event {
    #[serde(rename_all = "camelCase")]
    Connected { server_version: Option<i32>, connection_time: Option<String> },
    #[serde(rename_all = "camelCase")]
    NextValidId { order_id: i32 },
    #[serde(rename_all = "camelCase")]
    ManagedAccounts { accounts: Vec<String> },
    #[serde(rename_all = "camelCase")]
    Error { req_id: i32, code: i32, message: String },
    #[serde(rename_all = "camelCase")]
    Position {
        account: String,
        symbol: String,
        sec_type: String,
        currency: String,
        con_id: i32,
        #[serde(skip_serializing_if = "Option::is_none")]
        position: Option<String>,
        avg_cost: f64,
    },
    PositionEnd,
    #[serde(rename_all = "camelCase")]
    AccountSummary { req_id: i32, account: String, tag: String, value: String, currency: String },
    #[serde(rename_all = "camelCase")]
    AccountSummaryEnd { req_id: i32 },
    CurrentTime { time: i64 },
    ConnectionClosed,
    Stats(StatsSnapshot),
}

impl Event {
    pub fn position(account: &str, contract: &Contract, position: Option<String>, avg_cost: f64) -> Self {
        Event::Position {
            account: account.to_string(),
            symbol: contract.symbol.clone(),
            sec_type: contract.sec_type.as_ref().map(|s| s.to_string()).unwrap_or_default(),
            currency: contract.currency.clone(),
            con_id: contract.con_id,
            position,
            avg_cost,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_flatten_with_type_tag() {
        let record = Record {
            timestamp: "2026-01-02 09:30:00".into(),
            event: Event::Error { req_id: -1, code: 504, message: "Not connected".into() },
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["reqId"], -1);
        assert_eq!(json["timestamp"], "2026-01-02 09:30:00");
    }

    #[test]
    fn position_uses_contract_fields() {
        let contract = Contract::stock("AAPL", "USD");
        let json = serde_json::to_value(Event::position("DU1", &contract, Some("100".into()), 150.0)).unwrap();
        assert_eq!(json["type"], "position");
        assert_eq!(json["secType"], "STK");
        assert_eq!(json["position"], "100");
    }
}
