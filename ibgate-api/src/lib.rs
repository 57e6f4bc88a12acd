//! ibgate-api -- async client core for the Interactive Brokers TWS/Gateway
//! socket protocol.
//!
//! One [`IBClient`] owns at most one live session. Requests are `async`
//! methods on the client that queue a frame and return; everything the
//! server sends comes back through the [`Wrapper`] callbacks, in wire order,
//! from the session's reader task.
//!
//! ## Modules
//!
//! - [`frame`] -- length-prefixed framing and the incremental frame scanner
//! - [`encoder`] / [`decoder`] -- NUL-delimited field codec with unset sentinels
//! - [`protocol`] -- message ids, server version gates, client error codes
//! - [`connection`] -- TCP dial, split halves, traffic counters
//! - [`transport`] -- version handshake and START_API
//! - [`reader`] / [`writer`] -- the two session tasks
//! - [`client`] -- session lifecycle; [`requests`] -- the request catalogue
//! - [`wrapper`] -- callback trait and event dispatch
//! - [`models`] -- contracts, orders, executions and the rest of the data records

pub mod client;
pub mod connection;
pub mod decoder;
pub mod encoder;
pub mod errors;
pub mod event;
pub mod frame;
pub mod models;
pub mod protocol;
pub mod reader;
pub mod requests;
pub mod transport;
pub mod wrapper;
pub mod writer;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use errors::{IBApiError, Result};

// Contract types
pub use models::contract::{
    BondDetails, ComboLeg, Contract, ContractDescription, ContractDetails, DeltaNeutralContract,
    FundDetails,
};

// Order types
pub use models::condition::{Comparison, ConditionKind, Conjunction, ContractScope, OrderCondition};
pub use models::order::{
    AdjustedOrder, DeltaNeutralOrder, Mifid2, Order, OrderAllocation, OrderCancel, OrderState,
    OrderStatus, PegBenchParams, ScaleParams,
};

// Execution types
pub use models::execution::{CommissionAndFeesReport, Execution, ExecutionFilter};

// Market data and historical types
pub use models::market_data::{
    Bar, HistoricalSession, HistoricalTick, HistoricalTickBidAsk, HistoricalTickLast, RealTimeBar, TickAttrib,
    TickAttribBidAsk, TickAttribLast,
};

// Account types
pub use models::account::{PortfolioItem, Position};

// Common types
pub use models::common::{
    DepthMktDataDescription, FamilyCode, HistogramEntry, NewsProvider, PriceIncrement, SmartComponent,
    SoftDollarTier, TagValue,
};

// Enums
pub use models::enums::*;

// Protocol
pub use protocol::TickType;

// Codec
pub use decoder::MessageDecoder;
pub use encoder::MessageEncoder;
pub use frame::{encode_frame, FrameScanner};

// Client / Session / Events
pub use client::{ConnState, IBClient};
pub use connection::{ConnectionStats, StatsSnapshot};
pub use event::IBEvent;
pub use wrapper::{LoggingWrapper, Wrapper};
