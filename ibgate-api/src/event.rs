//! Decoded server events.
//!
//! The decoder turns each inbound frame into one [`IBEvent`]. The event is
//! then handed to [`dispatch`](crate::wrapper::dispatch), which calls the
//! matching [`Wrapper`](crate::wrapper::Wrapper) callbacks. Keeping the two
//! steps apart lets decoding stay a pure function of the frame bytes and the
//! server version.

use rust_decimal::Decimal;

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
use crate::protocol::TickType;

/// One row of a scanner subscription result.
#[derive(Debug, Clone)]
pub struct ScannerDataItem {
    pub rank: i32,
    pub contract_details: ContractDetails,
    pub distance: String,
    pub benchmark: String,
    pub projection: String,
    pub legs_str: String,
}

/// Every event the server can send, one variant per inbound message type.
///
/// Large payloads are boxed to keep the enum small.
#[derive(Debug, Clone)]
pub enum IBEvent {
    // ========================================================================
    // Session
    // ========================================================================
    NextValidId {
        order_id: i32,
    },

    /// Comma-separated account codes.
    ManagedAccounts {
        accounts: String,
    },

    /// Server error or informational notice. `req_id` is -1 when the
    /// message is not tied to a request.
    Error {
        req_id: i32,
        error_time: i64,
        code: i32,
        message: String,
        advanced_order_reject_json: String,
    },

    CurrentTime {
        time: i64,
    },

    CurrentTimeInMillis {
        time_in_millis: i64,
    },

    // ========================================================================
    // Market data
    // ========================================================================
    /// Price tick. `size` is the paired size for bid, ask and last ticks.
    TickPrice {
        req_id: i32,
        tick_type: TickType,
        price: f64,
        size: Option<Decimal>,
        attrib: TickAttrib,
    },

    TickSize {
        req_id: i32,
        tick_type: TickType,
        size: Option<Decimal>,
    },

    TickOptionComputation {
        req_id: i32,
        tick_type: TickType,
        computation: OptionComputation,
    },

    TickGeneric {
        req_id: i32,
        tick_type: TickType,
        value: f64,
    },

    TickString {
        req_id: i32,
        tick_type: TickType,
        value: String,
    },

    TickEfp {
        req_id: i32,
        tick_type: TickType,
        efp: EfpComputation,
    },

    TickSnapshotEnd {
        req_id: i32,
    },

    TickReqParams {
        req_id: i32,
        min_tick: f64,
        bbo_exchange: String,
        snapshot_permissions: i32,
    },

    TickNews {
        req_id: i32,
        timestamp: i64,
        provider_code: String,
        article_id: String,
        headline: String,
        extra_data: String,
    },

    MarketDataType {
        req_id: i32,
        market_data_type: i32,
    },

    /// `tick_type` is 1 for last and 2 for all-last.
    TickByTickAllLast {
        req_id: i32,
        tick_type: i32,
        time: i64,
        price: f64,
        size: Option<Decimal>,
        attrib: TickAttribLast,
        exchange: String,
        special_conditions: String,
    },

    TickByTickBidAsk {
        req_id: i32,
        time: i64,
        bid_price: f64,
        ask_price: f64,
        bid_size: Option<Decimal>,
        ask_size: Option<Decimal>,
        attrib: TickAttribBidAsk,
    },

    TickByTickMidPoint {
        req_id: i32,
        time: i64,
        mid_point: f64,
    },

    UpdateMktDepth {
        req_id: i32,
        position: i32,
        operation: i32,
        side: i32,
        price: f64,
        size: Option<Decimal>,
    },

    UpdateMktDepthL2 {
        req_id: i32,
        position: i32,
        market_maker: String,
        operation: i32,
        side: i32,
        price: f64,
        size: Option<Decimal>,
        is_smart_depth: bool,
    },

    MktDepthExchanges {
        descriptions: Vec<DepthMktDataDescription>,
    },

    RerouteMktDataReq {
        req_id: i32,
        con_id: i32,
        exchange: String,
    },

    RerouteMktDepthReq {
        req_id: i32,
        con_id: i32,
        exchange: String,
    },

    SmartComponents {
        req_id: i32,
        components: Vec<SmartComponent>,
    },

    // ========================================================================
    // Orders and executions
    // ========================================================================
    OrderStatus(OrderStatus),

    OpenOrder {
        order_id: i32,
        contract: Box<Contract>,
        order: Box<Order>,
        order_state: Box<OrderState>,
    },

    OpenOrderEnd,

    CompletedOrder {
        contract: Box<Contract>,
        order: Box<Order>,
        order_state: Box<OrderState>,
    },

    CompletedOrdersEnd,

    OrderBound {
        perm_id: i64,
        client_id: i32,
        order_id: i32,
    },

    ExecDetails {
        req_id: i32,
        contract: Box<Contract>,
        execution: Box<Execution>,
    },

    ExecDetailsEnd {
        req_id: i32,
    },

    CommissionAndFeesReport(CommissionAndFeesReport),

    // ========================================================================
    // Account
    // ========================================================================
    UpdateAccountValue {
        key: String,
        value: String,
        currency: String,
        account_name: String,
    },

    UpdatePortfolio(Box<PortfolioItem>),

    UpdateAccountTime {
        timestamp: String,
    },

    AccountDownloadEnd {
        account: String,
    },

    AccountSummary {
        req_id: i32,
        account: String,
        tag: String,
        value: String,
        currency: String,
    },

    AccountSummaryEnd {
        req_id: i32,
    },

    Position(Box<Position>),

    PositionEnd,

    PositionMulti {
        req_id: i32,
        account: String,
        model_code: String,
        contract: Box<Contract>,
        position: Option<Decimal>,
        avg_cost: f64,
    },

    PositionMultiEnd {
        req_id: i32,
    },

    AccountUpdateMulti {
        req_id: i32,
        account: String,
        model_code: String,
        key: String,
        value: String,
        currency: String,
    },

    AccountUpdateMultiEnd {
        req_id: i32,
    },

    Pnl {
        req_id: i32,
        daily_pnl: f64,
        unrealized_pnl: Option<f64>,
        realized_pnl: Option<f64>,
    },

    PnlSingle {
        req_id: i32,
        position: Option<Decimal>,
        daily_pnl: f64,
        unrealized_pnl: Option<f64>,
        realized_pnl: Option<f64>,
        value: f64,
    },

    FamilyCodes {
        codes: Vec<FamilyCode>,
    },

    SoftDollarTiers {
        req_id: i32,
        tiers: Vec<SoftDollarTier>,
    },

    // ========================================================================
    // Contracts
    // ========================================================================
    ContractDetails {
        req_id: i32,
        details: Box<ContractDetails>,
    },

    BondContractDetails {
        req_id: i32,
        details: Box<ContractDetails>,
    },

    ContractDetailsEnd {
        req_id: i32,
    },

    SymbolSamples {
        req_id: i32,
        descriptions: Vec<ContractDescription>,
    },

    DeltaNeutralValidation {
        req_id: i32,
        contract: DeltaNeutralContract,
    },

    SecurityDefinitionOptionalParameter {
        req_id: i32,
        exchange: String,
        underlying_con_id: i32,
        trading_class: String,
        multiplier: String,
        expirations: Vec<String>,
        strikes: Vec<f64>,
    },

    SecurityDefinitionOptionalParameterEnd {
        req_id: i32,
    },

    MarketRule {
        market_rule_id: i32,
        price_increments: Vec<PriceIncrement>,
    },

    // ========================================================================
    // Historical data
    // ========================================================================
    /// Bars of one reply. Servers before the separate end message carry the
    /// covered range in the same frame, reported here as `end`.
    HistoricalData {
        req_id: i32,
        bars: Vec<Bar>,
        end: Option<(String, String)>,
    },

    HistoricalDataEnd {
        req_id: i32,
        start: String,
        end: String,
    },

    HistoricalDataUpdate {
        req_id: i32,
        bar: Bar,
    },

    HeadTimestamp {
        req_id: i32,
        head_timestamp: String,
    },

    HistoricalTicks {
        req_id: i32,
        ticks: Vec<HistoricalTick>,
        done: bool,
    },

    HistoricalTicksBidAsk {
        req_id: i32,
        ticks: Vec<HistoricalTickBidAsk>,
        done: bool,
    },

    HistoricalTicksLast {
        req_id: i32,
        ticks: Vec<HistoricalTickLast>,
        done: bool,
    },

    HistoricalSchedule {
        req_id: i32,
        start_date_time: String,
        end_date_time: String,
        time_zone: String,
        sessions: Vec<HistoricalSession>,
    },

    RealtimeBar {
        req_id: i32,
        bar: RealTimeBar,
    },

    HistogramData {
        req_id: i32,
        data: Vec<HistogramEntry>,
    },

    // ========================================================================
    // Scanner, news, fundamentals
    // ========================================================================
    /// All rows of one scanner reply; the end marker is implied.
    ScannerData {
        req_id: i32,
        items: Vec<ScannerDataItem>,
    },

    ScannerParameters {
        xml: String,
    },

    UpdateNewsBulletin {
        msg_id: i32,
        msg_type: i32,
        message: String,
        origin_exch: String,
    },

    NewsArticle {
        req_id: i32,
        article_type: i32,
        article_text: String,
    },

    NewsProviders {
        providers: Vec<NewsProvider>,
    },

    HistoricalNews {
        req_id: i32,
        time: String,
        provider_code: String,
        article_id: String,
        headline: String,
    },

    HistoricalNewsEnd {
        req_id: i32,
        has_more: bool,
    },

    FundamentalData {
        req_id: i32,
        data: String,
    },

    // ========================================================================
    // Advisors, display groups, verification, WSH, user
    // ========================================================================
    ReceiveFa {
        fa_data_type: i32,
        xml: String,
    },

    ReplaceFaEnd {
        req_id: i32,
        text: String,
    },

    DisplayGroupList {
        req_id: i32,
        groups: String,
    },

    DisplayGroupUpdated {
        req_id: i32,
        contract_info: String,
    },

    VerifyMessageApi {
        api_data: String,
    },

    VerifyCompleted {
        is_successful: bool,
        error_text: String,
    },

    VerifyAndAuthMessageApi {
        api_data: String,
        xyz_challenge: String,
    },

    VerifyAndAuthCompleted {
        is_successful: bool,
        error_text: String,
    },

    WshMetaData {
        req_id: i32,
        data_json: String,
    },

    WshEventData {
        req_id: i32,
        data_json: String,
    },

    UserInfo {
        req_id: i32,
        white_branding_id: String,
    },

    /// Message id this client does not decode; carries the raw frame.
    Unknown {
        msg_id: i32,
        data: Vec<u8>,
    },
}
