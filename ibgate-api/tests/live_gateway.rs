//! Tests against a real IB TWS/Gateway (paper trading recommended).
//!
//! Ignored by default; run with:
//!
//! ```bash
//! cargo test -p ibgate-api --test live_gateway -- --ignored
//! ```
//!
//! Configuration via environment variables:
//!   IB_HOST       (default: 127.0.0.1)
//!   IB_PORT       (default: 4002)
//!   IB_CLIENT_ID  (default: 100)

use std::sync::{Arc, Mutex};
use std::time::Duration;

use ibgate_api::{Contract, IBClient, TickAttrib, TickType, Wrapper};

fn ib_host() -> String {
    std::env::var("IB_HOST").unwrap_or_else(|_| "127.0.0.1".into())
}

fn ib_port() -> u16 {
    std::env::var("IB_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(4002)
}

fn ib_client_id() -> i32 {
    std::env::var("IB_CLIENT_ID")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(100)
}

#[derive(Default)]
struct Seen {
    next_id: Mutex<Option<i32>>,
    accounts: Mutex<String>,
    ticks: Mutex<usize>,
    time: Mutex<Option<i64>>,
}

impl Wrapper for Seen {
    fn next_valid_id(&self, order_id: i32) {
        *self.next_id.lock().unwrap() = Some(order_id);
    }
    fn managed_accounts(&self, accounts: &str) {
        *self.accounts.lock().unwrap() = accounts.to_string();
    }
    fn current_time(&self, time: i64) {
        *self.time.lock().unwrap() = Some(time);
    }
    fn tick_price(&self, _req_id: i32, _tick_type: TickType, _price: f64, _attrib: &TickAttrib) {
        *self.ticks.lock().unwrap() += 1;
    }
    fn error(&self, req_id: i32, _error_time: i64, code: i32, message: &str, _json: &str) {
        println!("error: id={req_id} code={code} msg={message}");
    }
}

async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..50 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    false
}

#[tokio::test]
#[ignore]
async fn connect_receives_next_id_and_accounts() {
    let seen = Arc::new(Seen::default());
    let client = IBClient::new(seen.clone());
    client
        .connect(&ib_host(), ib_port(), ib_client_id(), Some(Duration::from_secs(5)), None)
        .await
        .expect("connect to IB");

    assert!(client.server_version().is_some_and(|v| v >= 100));
    assert!(eventually(|| seen.next_id.lock().unwrap().is_some()).await, "no next valid id");
    assert!(eventually(|| !seen.accounts.lock().unwrap().is_empty()).await, "no managed accounts");

    client.disconnect().await;
    assert!(!client.is_connected());
}

#[tokio::test]
#[ignore]
async fn wrong_port_fails() {
    let client = IBClient::new(Arc::new(Seen::default()));
    let result = client
        .connect(&ib_host(), 19999, ib_client_id(), Some(Duration::from_secs(2)), None)
        .await;
    assert!(result.is_err());
}

#[tokio::test]
#[ignore]
async fn current_time_round_trip() {
    let seen = Arc::new(Seen::default());
    let client = IBClient::new(seen.clone());
    client
        .connect(&ib_host(), ib_port(), ib_client_id() + 1, None, None)
        .await
        .expect("connect to IB");

    client.req_current_time().await;
    assert!(eventually(|| seen.time.lock().unwrap().is_some()).await);
    client.disconnect().await;
}

#[tokio::test]
#[ignore]
async fn delayed_market_data_ticks() {
    let seen = Arc::new(Seen::default());
    let client = IBClient::new(seen.clone());
    client
        .connect(&ib_host(), ib_port(), ib_client_id() + 2, None, None)
        .await
        .expect("connect to IB");

    client.req_market_data_type(ibgate_api::MarketDataType::Delayed).await;
    client
        .req_mkt_data(9001, &Contract::stock("SPY", "USD"), "", false, false, &[])
        .await;
    let got_ticks = eventually(|| *seen.ticks.lock().unwrap() > 0).await;
    client.cancel_mkt_data(9001).await;
    client.disconnect().await;
    assert!(got_ticks, "no price ticks for SPY");
}
