//! The event sink interface.
//!
//! [`Wrapper`] has one callback per inbound message type. The reader task
//! decodes each frame into an [`IBEvent`] and [`dispatch`] calls the
//! matching callbacks, in frame order, on the reader task itself.
//!
//! Every method has a default body that logs the event with `tracing`, so an
//! application implements only the callbacks it cares about:
//!
//! ```rust,ignore
//! struct Printer;
//!
//! impl Wrapper for Printer {
//!     fn next_valid_id(&self, order_id: i32) {
//!         println!("next order id {order_id}");
//!     }
//! }
//! ```

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::event::IBEvent;
use crate::models::account::{PortfolioItem, Position};
use crate::models::common::{
    DepthMktDataDescription, FamilyCode, HistogramEntry, NewsProvider, PriceIncrement,
    SmartComponent, SoftDollarTier,
};
use crate::models::contract::{Contract, ContractDescription, ContractDetails, DeltaNeutralContract};
use crate::models::execution::{CommissionAndFeesReport, Execution};
use crate::models::market_data::{
    Bar, EfpComputation, HistoricalSession, HistoricalTick, HistoricalTickBidAsk,
    HistoricalTickLast, OptionComputation, RealTimeBar, TickAttrib, TickAttribBidAsk,
    TickAttribLast,
};
use crate::models::order::{Order, OrderState, OrderStatus};
use crate::protocol::client_errors::BAD_MESSAGE;
use crate::protocol::{incoming, TickType, NO_VALID_ID};

/// Callbacks invoked for server events.
///
/// Callbacks run on the reader task. A slow callback delays every event
/// behind it but never reorders them.
#[allow(unused_variables, clippy::too_many_arguments)]
pub trait Wrapper: Send + Sync {
    // ========================================================================
    // Session
    // ========================================================================

    /// The session finished its handshake and sent START_API.
    fn connect_ack(&self) {
        debug!("connect ack");
    }

    /// The server closed the socket or a read failed.
    fn connection_closed(&self) {
        debug!("connection closed");
    }

    fn next_valid_id(&self, order_id: i32) {
        debug!(order_id, "next valid id");
    }

    fn managed_accounts(&self, accounts: &str) {
        debug!(accounts, "managed accounts");
    }

    /// Server errors and notices, plus client-side conditions such as
    /// NOT_CONNECTED (504) or BAD_MESSAGE (508).
    fn error(&self, req_id: i32, error_time: i64, code: i32, message: &str, advanced_order_reject_json: &str) {
        warn!(req_id, code, error_time, advanced_order_reject_json, "{message}");
    }

    fn current_time(&self, time: i64) {
        debug!(time, "current time");
    }

    fn current_time_in_millis(&self, time_in_millis: i64) {
        debug!(time_in_millis, "current time in millis");
    }

    // ========================================================================
    // Market data
    // ========================================================================

    fn tick_price(&self, req_id: i32, tick_type: TickType, price: f64, attrib: &TickAttrib) {
        debug!(req_id, ?tick_type, price, ?attrib, "tick price");
    }

    fn tick_size(&self, req_id: i32, tick_type: TickType, size: Option<Decimal>) {
        debug!(req_id, ?tick_type, ?size, "tick size");
    }

    fn tick_option_computation(&self, req_id: i32, tick_type: TickType, computation: &OptionComputation) {
        debug!(req_id, ?tick_type, ?computation, "tick option computation");
    }

    fn tick_generic(&self, req_id: i32, tick_type: TickType, value: f64) {
        debug!(req_id, ?tick_type, value, "tick generic");
    }

    fn tick_string(&self, req_id: i32, tick_type: TickType, value: &str) {
        debug!(req_id, ?tick_type, value, "tick string");
    }

    fn tick_efp(&self, req_id: i32, tick_type: TickType, efp: &EfpComputation) {
        debug!(req_id, ?tick_type, ?efp, "tick efp");
    }

    fn tick_snapshot_end(&self, req_id: i32) {
        debug!(req_id, "tick snapshot end");
    }

    fn tick_req_params(&self, req_id: i32, min_tick: f64, bbo_exchange: &str, snapshot_permissions: i32) {
        debug!(req_id, min_tick, bbo_exchange, snapshot_permissions, "tick req params");
    }

    fn tick_news(&self, req_id: i32, timestamp: i64, provider_code: &str, article_id: &str, headline: &str, extra_data: &str) {
        debug!(req_id, timestamp, provider_code, article_id, headline, "tick news");
    }

    fn market_data_type(&self, req_id: i32, market_data_type: i32) {
        debug!(req_id, market_data_type, "market data type");
    }

    fn tick_by_tick_all_last(
        &self,
        req_id: i32,
        tick_type: i32,
        time: i64,
        price: f64,
        size: Option<Decimal>,
        attrib: &TickAttribLast,
        exchange: &str,
        special_conditions: &str,
    ) {
        debug!(req_id, tick_type, time, price, ?size, exchange, "tick by tick last");
    }

    fn tick_by_tick_bid_ask(
        &self,
        req_id: i32,
        time: i64,
        bid_price: f64,
        ask_price: f64,
        bid_size: Option<Decimal>,
        ask_size: Option<Decimal>,
        attrib: &TickAttribBidAsk,
    ) {
        debug!(req_id, time, bid_price, ask_price, "tick by tick bid/ask");
    }

    fn tick_by_tick_mid_point(&self, req_id: i32, time: i64, mid_point: f64) {
        debug!(req_id, time, mid_point, "tick by tick midpoint");
    }

    fn update_mkt_depth(&self, req_id: i32, position: i32, operation: i32, side: i32, price: f64, size: Option<Decimal>) {
        debug!(req_id, position, operation, side, price, ?size, "market depth");
    }

    fn update_mkt_depth_l2(
        &self,
        req_id: i32,
        position: i32,
        market_maker: &str,
        operation: i32,
        side: i32,
        price: f64,
        size: Option<Decimal>,
        is_smart_depth: bool,
    ) {
        debug!(req_id, position, market_maker, operation, side, price, ?size, "market depth L2");
    }

    fn mkt_depth_exchanges(&self, descriptions: &[DepthMktDataDescription]) {
        debug!(count = descriptions.len(), "market depth exchanges");
    }

    fn reroute_mkt_data_req(&self, req_id: i32, con_id: i32, exchange: &str) {
        debug!(req_id, con_id, exchange, "reroute market data");
    }

    fn reroute_mkt_depth_req(&self, req_id: i32, con_id: i32, exchange: &str) {
        debug!(req_id, con_id, exchange, "reroute market depth");
    }

    fn smart_components(&self, req_id: i32, components: &[SmartComponent]) {
        debug!(req_id, count = components.len(), "smart components");
    }

    // ========================================================================
    // Orders and executions
    // ========================================================================

    fn order_status(&self, status: &OrderStatus) {
        debug!(order_id = status.order_id, status = %status.status, "order status");
    }

    fn open_order(&self, order_id: i32, contract: &Contract, order: &Order, order_state: &OrderState) {
        debug!(order_id, symbol = %contract.symbol, "open order");
    }

    fn open_order_end(&self) {
        debug!("open order end");
    }

    fn completed_order(&self, contract: &Contract, order: &Order, order_state: &OrderState) {
        debug!(symbol = %contract.symbol, perm_id = order.perm_id, "completed order");
    }

    fn completed_orders_end(&self) {
        debug!("completed orders end");
    }

    fn order_bound(&self, perm_id: i64, client_id: i32, order_id: i32) {
        debug!(perm_id, client_id, order_id, "order bound");
    }

    fn exec_details(&self, req_id: i32, contract: &Contract, execution: &Execution) {
        debug!(req_id, symbol = %contract.symbol, exec_id = %execution.exec_id, "execution");
    }

    fn exec_details_end(&self, req_id: i32) {
        debug!(req_id, "execution end");
    }

    fn commission_and_fees_report(&self, report: &CommissionAndFeesReport) {
        debug!(?report, "commission and fees");
    }

    // ========================================================================
    // Account
    // ========================================================================

    fn update_account_value(&self, key: &str, value: &str, currency: &str, account_name: &str) {
        debug!(key, value, currency, account_name, "account value");
    }

    fn update_portfolio(&self, item: &PortfolioItem) {
        debug!(symbol = %item.contract.symbol, position = ?item.position, "portfolio");
    }

    fn update_account_time(&self, timestamp: &str) {
        debug!(timestamp, "account time");
    }

    fn account_download_end(&self, account: &str) {
        debug!(account, "account download end");
    }

    fn account_summary(&self, req_id: i32, account: &str, tag: &str, value: &str, currency: &str) {
        debug!(req_id, account, tag, value, currency, "account summary");
    }

    fn account_summary_end(&self, req_id: i32) {
        debug!(req_id, "account summary end");
    }

    fn position(&self, position: &Position) {
        debug!(account = %position.account, symbol = %position.contract.symbol, size = ?position.position, "position");
    }

    fn position_end(&self) {
        debug!("position end");
    }

    fn position_multi(&self, req_id: i32, account: &str, model_code: &str, contract: &Contract, position: Option<Decimal>, avg_cost: f64) {
        debug!(req_id, account, model_code, symbol = %contract.symbol, ?position, avg_cost, "position multi");
    }

    fn position_multi_end(&self, req_id: i32) {
        debug!(req_id, "position multi end");
    }

    fn account_update_multi(&self, req_id: i32, account: &str, model_code: &str, key: &str, value: &str, currency: &str) {
        debug!(req_id, account, model_code, key, value, currency, "account update multi");
    }

    fn account_update_multi_end(&self, req_id: i32) {
        debug!(req_id, "account update multi end");
    }

    fn pnl(&self, req_id: i32, daily_pnl: f64, unrealized_pnl: Option<f64>, realized_pnl: Option<f64>) {
        debug!(req_id, daily_pnl, ?unrealized_pnl, ?realized_pnl, "pnl");
    }

    fn pnl_single(
        &self,
        req_id: i32,
        position: Option<Decimal>,
        daily_pnl: f64,
        unrealized_pnl: Option<f64>,
        realized_pnl: Option<f64>,
        value: f64,
    ) {
        debug!(req_id, ?position, daily_pnl, value, "pnl single");
    }

    fn family_codes(&self, codes: &[FamilyCode]) {
        debug!(count = codes.len(), "family codes");
    }

    fn soft_dollar_tiers(&self, req_id: i32, tiers: &[SoftDollarTier]) {
        debug!(req_id, count = tiers.len(), "soft dollar tiers");
    }

    // ========================================================================
    // Contracts
    // ========================================================================

    fn contract_details(&self, req_id: i32, details: &ContractDetails) {
        debug!(req_id, symbol = %details.contract.symbol, "contract details");
    }

    fn bond_contract_details(&self, req_id: i32, details: &ContractDetails) {
        debug!(req_id, cusip = %details.bond.cusip, "bond contract details");
    }

    fn contract_details_end(&self, req_id: i32) {
        debug!(req_id, "contract details end");
    }

    fn symbol_samples(&self, req_id: i32, descriptions: &[ContractDescription]) {
        debug!(req_id, count = descriptions.len(), "symbol samples");
    }

    fn delta_neutral_validation(&self, req_id: i32, contract: &DeltaNeutralContract) {
        debug!(req_id, ?contract, "delta neutral validation");
    }

    fn security_definition_optional_parameter(
        &self,
        req_id: i32,
        exchange: &str,
        underlying_con_id: i32,
        trading_class: &str,
        multiplier: &str,
        expirations: &[String],
        strikes: &[f64],
    ) {
        debug!(req_id, exchange, underlying_con_id, trading_class, expirations = expirations.len(), strikes = strikes.len(), "sec def option params");
    }

    fn security_definition_optional_parameter_end(&self, req_id: i32) {
        debug!(req_id, "sec def option params end");
    }

    fn market_rule(&self, market_rule_id: i32, price_increments: &[PriceIncrement]) {
        debug!(market_rule_id, count = price_increments.len(), "market rule");
    }

    // ========================================================================
    // Historical data
    // ========================================================================

    fn historical_data(&self, req_id: i32, bar: &Bar) {
        debug!(req_id, time = %bar.time, close = bar.close, "historical bar");
    }

    fn historical_data_end(&self, req_id: i32, start: &str, end: &str) {
        debug!(req_id, start, end, "historical data end");
    }

    fn historical_data_update(&self, req_id: i32, bar: &Bar) {
        debug!(req_id, time = %bar.time, close = bar.close, "historical bar update");
    }

    fn head_timestamp(&self, req_id: i32, head_timestamp: &str) {
        debug!(req_id, head_timestamp, "head timestamp");
    }

    fn historical_ticks(&self, req_id: i32, ticks: &[HistoricalTick], done: bool) {
        debug!(req_id, count = ticks.len(), done, "historical ticks");
    }

    fn historical_ticks_bid_ask(&self, req_id: i32, ticks: &[HistoricalTickBidAsk], done: bool) {
        debug!(req_id, count = ticks.len(), done, "historical bid/ask ticks");
    }

    fn historical_ticks_last(&self, req_id: i32, ticks: &[HistoricalTickLast], done: bool) {
        debug!(req_id, count = ticks.len(), done, "historical last ticks");
    }

    fn historical_schedule(&self, req_id: i32, start_date_time: &str, end_date_time: &str, time_zone: &str, sessions: &[HistoricalSession]) {
        debug!(req_id, start_date_time, end_date_time, time_zone, sessions = sessions.len(), "historical schedule");
    }

    fn realtime_bar(&self, req_id: i32, bar: &RealTimeBar) {
        debug!(req_id, time = bar.time, close = bar.close, "realtime bar");
    }

    fn histogram_data(&self, req_id: i32, data: &[HistogramEntry]) {
        debug!(req_id, count = data.len(), "histogram");
    }

    // ========================================================================
    // Scanner, news, fundamentals
    // ========================================================================

    fn scanner_parameters(&self, xml: &str) {
        debug!(len = xml.len(), "scanner parameters");
    }

    fn scanner_data(
        &self,
        req_id: i32,
        rank: i32,
        details: &ContractDetails,
        distance: &str,
        benchmark: &str,
        projection: &str,
        legs_str: &str,
    ) {
        debug!(req_id, rank, symbol = %details.contract.symbol, "scanner row");
    }

    fn scanner_data_end(&self, req_id: i32) {
        debug!(req_id, "scanner data end");
    }

    fn update_news_bulletin(&self, msg_id: i32, msg_type: i32, message: &str, origin_exch: &str) {
        debug!(msg_id, msg_type, origin_exch, "{message}");
    }

    fn news_article(&self, req_id: i32, article_type: i32, article_text: &str) {
        debug!(req_id, article_type, len = article_text.len(), "news article");
    }

    fn news_providers(&self, providers: &[NewsProvider]) {
        debug!(count = providers.len(), "news providers");
    }

    fn historical_news(&self, req_id: i32, time: &str, provider_code: &str, article_id: &str, headline: &str) {
        debug!(req_id, time, provider_code, article_id, headline, "historical news");
    }

    fn historical_news_end(&self, req_id: i32, has_more: bool) {
        debug!(req_id, has_more, "historical news end");
    }

    fn fundamental_data(&self, req_id: i32, data: &str) {
        debug!(req_id, len = data.len(), "fundamental data");
    }

    // ========================================================================
    // Advisors, display groups, verification, WSH, user
    // ========================================================================

    fn receive_fa(&self, fa_data_type: i32, xml: &str) {
        debug!(fa_data_type, len = xml.len(), "FA configuration");
    }

    fn replace_fa_end(&self, req_id: i32, text: &str) {
        debug!(req_id, text, "replace FA end");
    }

    fn display_group_list(&self, req_id: i32, groups: &str) {
        debug!(req_id, groups, "display groups");
    }

    fn display_group_updated(&self, req_id: i32, contract_info: &str) {
        debug!(req_id, contract_info, "display group updated");
    }

    fn verify_message_api(&self, api_data: &str) {
        debug!(api_data, "verify message");
    }

    fn verify_completed(&self, is_successful: bool, error_text: &str) {
        debug!(is_successful, error_text, "verify completed");
    }

    fn verify_and_auth_message_api(&self, api_data: &str, xyz_challenge: &str) {
        debug!(api_data, xyz_challenge, "verify and auth message");
    }

    fn verify_and_auth_completed(&self, is_successful: bool, error_text: &str) {
        debug!(is_successful, error_text, "verify and auth completed");
    }

    fn wsh_meta_data(&self, req_id: i32, data_json: &str) {
        debug!(req_id, len = data_json.len(), "WSH metadata");
    }

    fn wsh_event_data(&self, req_id: i32, data_json: &str) {
        debug!(req_id, len = data_json.len(), "WSH event data");
    }

    fn user_info(&self, req_id: i32, white_branding_id: &str) {
        debug!(req_id, white_branding_id, "user info");
    }
}

/// A wrapper that only logs. Useful as a placeholder while wiring up a
/// session.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingWrapper;

impl Wrapper for LoggingWrapper {}

/// Call the callbacks for one decoded event.
///
/// Most events map to exactly one callback. A paired price tick is followed
/// by its size tick, list replies are fanned out one callback per row and
/// closed with their end marker, and an undecodable message id is reported
/// as BAD_MESSAGE.
pub fn dispatch(event: IBEvent, wrapper: &dyn Wrapper) {
    match event {
        IBEvent::NextValidId { order_id } => wrapper.next_valid_id(order_id),
        IBEvent::ManagedAccounts { accounts } => wrapper.managed_accounts(&accounts),
        IBEvent::Error {
            req_id,
            error_time,
            code,
            message,
            advanced_order_reject_json,
        } => wrapper.error(req_id, error_time, code, &message, &advanced_order_reject_json),
        IBEvent::CurrentTime { time } => wrapper.current_time(time),
        IBEvent::CurrentTimeInMillis { time_in_millis } => wrapper.current_time_in_millis(time_in_millis),

        IBEvent::TickPrice {
            req_id,
            tick_type,
            price,
            size,
            attrib,
        } => {
            wrapper.tick_price(req_id, tick_type, price, &attrib);
            if let Some(size_type) = tick_type.paired_size() {
                wrapper.tick_size(req_id, size_type, size);
            }
        }
        IBEvent::TickSize { req_id, tick_type, size } => wrapper.tick_size(req_id, tick_type, size),
        IBEvent::TickOptionComputation {
            req_id,
            tick_type,
            computation,
        } => wrapper.tick_option_computation(req_id, tick_type, &computation),
        IBEvent::TickGeneric { req_id, tick_type, value } => wrapper.tick_generic(req_id, tick_type, value),
        IBEvent::TickString { req_id, tick_type, value } => wrapper.tick_string(req_id, tick_type, &value),
        IBEvent::TickEfp { req_id, tick_type, efp } => wrapper.tick_efp(req_id, tick_type, &efp),
        IBEvent::TickSnapshotEnd { req_id } => wrapper.tick_snapshot_end(req_id),
        IBEvent::TickReqParams {
            req_id,
            min_tick,
            bbo_exchange,
            snapshot_permissions,
        } => wrapper.tick_req_params(req_id, min_tick, &bbo_exchange, snapshot_permissions),
        IBEvent::TickNews {
            req_id,
            timestamp,
            provider_code,
            article_id,
            headline,
            extra_data,
        } => wrapper.tick_news(req_id, timestamp, &provider_code, &article_id, &headline, &extra_data),
        IBEvent::MarketDataType { req_id, market_data_type } => wrapper.market_data_type(req_id, market_data_type),
        IBEvent::TickByTickAllLast {
            req_id,
            tick_type,
            time,
            price,
            size,
            attrib,
            exchange,
            special_conditions,
        } => wrapper.tick_by_tick_all_last(req_id, tick_type, time, price, size, &attrib, &exchange, &special_conditions),
        IBEvent::TickByTickBidAsk {
            req_id,
            time,
            bid_price,
            ask_price,
            bid_size,
            ask_size,
            attrib,
        } => wrapper.tick_by_tick_bid_ask(req_id, time, bid_price, ask_price, bid_size, ask_size, &attrib),
        IBEvent::TickByTickMidPoint { req_id, time, mid_point } => wrapper.tick_by_tick_mid_point(req_id, time, mid_point),
        IBEvent::UpdateMktDepth {
            req_id,
            position,
            operation,
            side,
            price,
            size,
        } => wrapper.update_mkt_depth(req_id, position, operation, side, price, size),
        IBEvent::UpdateMktDepthL2 {
            req_id,
            position,
            market_maker,
            operation,
            side,
            price,
            size,
            is_smart_depth,
        } => wrapper.update_mkt_depth_l2(req_id, position, &market_maker, operation, side, price, size, is_smart_depth),
        IBEvent::MktDepthExchanges { descriptions } => wrapper.mkt_depth_exchanges(&descriptions),
        IBEvent::RerouteMktDataReq { req_id, con_id, exchange } => wrapper.reroute_mkt_data_req(req_id, con_id, &exchange),
        IBEvent::RerouteMktDepthReq { req_id, con_id, exchange } => wrapper.reroute_mkt_depth_req(req_id, con_id, &exchange),
        IBEvent::SmartComponents { req_id, components } => wrapper.smart_components(req_id, &components),

        IBEvent::OrderStatus(status) => wrapper.order_status(&status),
        IBEvent::OpenOrder {
            order_id,
            contract,
            order,
            order_state,
        } => wrapper.open_order(order_id, &contract, &order, &order_state),
        IBEvent::OpenOrderEnd => wrapper.open_order_end(),
        IBEvent::CompletedOrder {
            contract,
            order,
            order_state,
        } => wrapper.completed_order(&contract, &order, &order_state),
        IBEvent::CompletedOrdersEnd => wrapper.completed_orders_end(),
        IBEvent::OrderBound {
            perm_id,
            client_id,
            order_id,
        } => wrapper.order_bound(perm_id, client_id, order_id),
        IBEvent::ExecDetails {
            req_id,
            contract,
            execution,
        } => wrapper.exec_details(req_id, &contract, &execution),
        IBEvent::ExecDetailsEnd { req_id } => wrapper.exec_details_end(req_id),
        IBEvent::CommissionAndFeesReport(report) => wrapper.commission_and_fees_report(&report),

        IBEvent::UpdateAccountValue {
            key,
            value,
            currency,
            account_name,
        } => wrapper.update_account_value(&key, &value, &currency, &account_name),
        IBEvent::UpdatePortfolio(item) => wrapper.update_portfolio(&item),
        IBEvent::UpdateAccountTime { timestamp } => wrapper.update_account_time(&timestamp),
        IBEvent::AccountDownloadEnd { account } => wrapper.account_download_end(&account),
        IBEvent::AccountSummary {
            req_id,
            account,
            tag,
            value,
            currency,
        } => wrapper.account_summary(req_id, &account, &tag, &value, &currency),
        IBEvent::AccountSummaryEnd { req_id } => wrapper.account_summary_end(req_id),
        IBEvent::Position(position) => wrapper.position(&position),
        IBEvent::PositionEnd => wrapper.position_end(),
        IBEvent::PositionMulti {
            req_id,
            account,
            model_code,
            contract,
            position,
            avg_cost,
        } => wrapper.position_multi(req_id, &account, &model_code, &contract, position, avg_cost),
        IBEvent::PositionMultiEnd { req_id } => wrapper.position_multi_end(req_id),
        IBEvent::AccountUpdateMulti {
            req_id,
            account,
            model_code,
            key,
            value,
            currency,
        } => wrapper.account_update_multi(req_id, &account, &model_code, &key, &value, &currency),
        IBEvent::AccountUpdateMultiEnd { req_id } => wrapper.account_update_multi_end(req_id),
        IBEvent::Pnl {
            req_id,
            daily_pnl,
            unrealized_pnl,
            realized_pnl,
        } => wrapper.pnl(req_id, daily_pnl, unrealized_pnl, realized_pnl),
        IBEvent::PnlSingle {
            req_id,
            position,
            daily_pnl,
            unrealized_pnl,
            realized_pnl,
            value,
        } => wrapper.pnl_single(req_id, position, daily_pnl, unrealized_pnl, realized_pnl, value),
        IBEvent::FamilyCodes { codes } => wrapper.family_codes(&codes),
        IBEvent::SoftDollarTiers { req_id, tiers } => wrapper.soft_dollar_tiers(req_id, &tiers),

        IBEvent::ContractDetails { req_id, details } => wrapper.contract_details(req_id, &details),
        IBEvent::BondContractDetails { req_id, details } => wrapper.bond_contract_details(req_id, &details),
        IBEvent::ContractDetailsEnd { req_id } => wrapper.contract_details_end(req_id),
        IBEvent::SymbolSamples { req_id, descriptions } => wrapper.symbol_samples(req_id, &descriptions),
        IBEvent::DeltaNeutralValidation { req_id, contract } => wrapper.delta_neutral_validation(req_id, &contract),
        IBEvent::SecurityDefinitionOptionalParameter {
            req_id,
            exchange,
            underlying_con_id,
            trading_class,
            multiplier,
            expirations,
            strikes,
        } => wrapper.security_definition_optional_parameter(
            req_id,
            &exchange,
            underlying_con_id,
            &trading_class,
            &multiplier,
            &expirations,
            &strikes,
        ),
        IBEvent::SecurityDefinitionOptionalParameterEnd { req_id } => {
            wrapper.security_definition_optional_parameter_end(req_id)
        }
        IBEvent::MarketRule {
            market_rule_id,
            price_increments,
        } => wrapper.market_rule(market_rule_id, &price_increments),

        IBEvent::HistoricalData { req_id, bars, end } => {
            for bar in &bars {
                wrapper.historical_data(req_id, bar);
            }
            if let Some((start, end)) = end {
                wrapper.historical_data_end(req_id, &start, &end);
            }
        }
        IBEvent::HistoricalDataEnd { req_id, start, end } => wrapper.historical_data_end(req_id, &start, &end),
        IBEvent::HistoricalDataUpdate { req_id, bar } => wrapper.historical_data_update(req_id, &bar),
        IBEvent::HeadTimestamp { req_id, head_timestamp } => wrapper.head_timestamp(req_id, &head_timestamp),
        IBEvent::HistoricalTicks { req_id, ticks, done } => wrapper.historical_ticks(req_id, &ticks, done),
        IBEvent::HistoricalTicksBidAsk { req_id, ticks, done } => wrapper.historical_ticks_bid_ask(req_id, &ticks, done),
        IBEvent::HistoricalTicksLast { req_id, ticks, done } => wrapper.historical_ticks_last(req_id, &ticks, done),
        IBEvent::HistoricalSchedule {
            req_id,
            start_date_time,
            end_date_time,
            time_zone,
            sessions,
        } => wrapper.historical_schedule(req_id, &start_date_time, &end_date_time, &time_zone, &sessions),
        IBEvent::RealtimeBar { req_id, bar } => wrapper.realtime_bar(req_id, &bar),
        IBEvent::HistogramData { req_id, data } => wrapper.histogram_data(req_id, &data),

        IBEvent::ScannerData { req_id, items } => {
            for item in &items {
                wrapper.scanner_data(
                    req_id,
                    item.rank,
                    &item.contract_details,
                    &item.distance,
                    &item.benchmark,
                    &item.projection,
                    &item.legs_str,
                );
            }
            wrapper.scanner_data_end(req_id);
        }
        IBEvent::ScannerParameters { xml } => wrapper.scanner_parameters(&xml),
        IBEvent::UpdateNewsBulletin {
            msg_id,
            msg_type,
            message,
            origin_exch,
        } => wrapper.update_news_bulletin(msg_id, msg_type, &message, &origin_exch),
        IBEvent::NewsArticle {
            req_id,
            article_type,
            article_text,
        } => wrapper.news_article(req_id, article_type, &article_text),
        IBEvent::NewsProviders { providers } => wrapper.news_providers(&providers),
        IBEvent::HistoricalNews {
            req_id,
            time,
            provider_code,
            article_id,
            headline,
        } => wrapper.historical_news(req_id, &time, &provider_code, &article_id, &headline),
        IBEvent::HistoricalNewsEnd { req_id, has_more } => wrapper.historical_news_end(req_id, has_more),
        IBEvent::FundamentalData { req_id, data } => wrapper.fundamental_data(req_id, &data),

        IBEvent::ReceiveFa { fa_data_type, xml } => wrapper.receive_fa(fa_data_type, &xml),
        IBEvent::ReplaceFaEnd { req_id, text } => wrapper.replace_fa_end(req_id, &text),
        IBEvent::DisplayGroupList { req_id, groups } => wrapper.display_group_list(req_id, &groups),
        IBEvent::DisplayGroupUpdated { req_id, contract_info } => wrapper.display_group_updated(req_id, &contract_info),
        IBEvent::VerifyMessageApi { api_data } => wrapper.verify_message_api(&api_data),
        IBEvent::VerifyCompleted {
            is_successful,
            error_text,
        } => wrapper.verify_completed(is_successful, &error_text),
        IBEvent::VerifyAndAuthMessageApi { api_data, xyz_challenge } => {
            wrapper.verify_and_auth_message_api(&api_data, &xyz_challenge)
        }
        IBEvent::VerifyAndAuthCompleted {
            is_successful,
            error_text,
        } => wrapper.verify_and_auth_completed(is_successful, &error_text),
        IBEvent::WshMetaData { req_id, data_json } => wrapper.wsh_meta_data(req_id, &data_json),
        IBEvent::WshEventData { req_id, data_json } => wrapper.wsh_event_data(req_id, &data_json),
        IBEvent::UserInfo {
            req_id,
            white_branding_id,
        } => wrapper.user_info(req_id, &white_branding_id),

        IBEvent::Unknown { msg_id, data } => {
            let detail = match incoming::name(msg_id) {
                Some(name) => format!("unhandled message {name} ({msg_id}), {} bytes", data.len()),
                None => format!("unknown message id {msg_id}, {} bytes", data.len()),
            };
            wrapper.error(NO_VALID_ID, 0, BAD_MESSAGE.code, &BAD_MESSAGE.with_detail(&detail), "");
        }
    }
}
