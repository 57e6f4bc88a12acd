//! JSON-lines event sink.
//!
//! Implements the library's `Wrapper` for the handful of callbacks the runner
//! asks for. Everything else falls through to the trait's default logging.

use std::io::Write;
use std::sync::Mutex;

use ibgate_api::models::account::Position;
use ibgate_api::Wrapper;

use crate::models::{Event, Record};

pub struct JsonSink<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    pub fn emit(&self, event: Event) {
        let record = Record {
            timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
            event,
        };
        let line = match serde_json::to_string(&record) {
            Ok(line) => line,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize record");
                return;
            }
        };
        let Ok(mut out) = self.out.lock() else {
            return;
        };
        if let Err(e) = writeln!(out, "{line}").and_then(|_| out.flush()) {
            tracing::warn!(error = %e, "failed to write record");
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write + Send> Wrapper for JsonSink<W> {
    fn connection_closed(&self) {
        tracing::info!("connection closed by server");
        self.emit(Event::ConnectionClosed);
    }

    fn next_valid_id(&self, order_id: i32) {
        self.emit(Event::NextValidId { order_id });
    }

    fn managed_accounts(&self, accounts: &str) {
        let accounts = accounts
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(String::from)
            .collect();
        self.emit(Event::ManagedAccounts { accounts });
    }

    fn error(&self, req_id: i32, _error_time: i64, code: i32, message: &str, _advanced_order_reject_json: &str) {
        // 2100-2199 are farm status notices, not failures.
        if (2100..2200).contains(&code) {
            tracing::info!(code, "{message}");
        } else {
            tracing::warn!(req_id, code, "{message}");
        }
        self.emit(Event::Error { req_id, code, message: message.to_string() });
    }

    fn current_time(&self, time: i64) {
        self.emit(Event::CurrentTime { time });
    }

    fn position(&self, position: &Position) {
        let size = position.position.map(|p| p.normalize().to_string());
        self.emit(Event::position(&position.account, &position.contract, size, position.avg_cost));
    }

    fn position_end(&self) {
        self.emit(Event::PositionEnd);
    }

    fn account_summary(&self, req_id: i32, account: &str, tag: &str, value: &str, currency: &str) {
        self.emit(Event::AccountSummary {
            req_id,
            account: account.to_string(),
            tag: tag.to_string(),
            value: value.to_string(),
            currency: currency.to_string(),
        });
    }

    fn account_summary_end(&self, req_id: i32) {
        self.emit(Event::AccountSummaryEnd { req_id });
    }
}
