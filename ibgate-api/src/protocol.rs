//! Wire protocol constants: message ids, server version gates, tick types,
//! sentinels and client-side error conditions.

use serde::{Deserialize, Serialize};

/// Lowest server version this client speaks.
pub const MIN_CLIENT_VER: i32 = 100;

/// Highest server version this client advertises.
///
/// Servers at 201 and above switch message ids to raw binary integers and
/// protobuf payloads, which this client does not negotiate.
pub const MAX_CLIENT_VER: i32 = server_version::PARAMETRIZED_DAYS_OF_EXECUTIONS;

/// Length of the big-endian frame length prefix.
pub const HEADER_LEN: usize = 4;

/// Largest frame payload either side may send.
pub const MAX_MSG_LEN: usize = 0xFF_FFFF;

/// Magic prefix of the connect request.
pub const API_SIGN: &[u8; 4] = b"API\0";

/// Capacity of the outbound request queue.
pub const OUTBOUND_QUEUE_CAPACITY: usize = 10;

/// Request id used for errors that are not tied to a request.
pub const NO_VALID_ID: i32 = -1;

// ============================================================================
// Sentinels
// ============================================================================

/// Legacy "no value" integer marker.
pub const UNSET_INTEGER: i32 = i32::MAX;

/// Legacy "no value" long marker.
pub const UNSET_LONG: i64 = i64::MAX;

/// Legacy "no value" float marker.
pub const UNSET_DOUBLE: f64 = f64::MAX;

/// Field texts the server uses to mean "no decimal value".
pub const UNSET_DECIMAL_TEXTS: [&str; 4] = [
    "2147483647",
    "9223372036854775807",
    "1.7976931348623157E308",
    "-9223372036854775808",
];

// ============================================================================
// Message ids
// ============================================================================

macro_rules! message_ids {
    ($(#[$meta:meta])* $module:ident { $($name:ident = $id:literal,)* }) => {
        $(#[$meta])*
        pub mod $module {
            $(pub const $name: i32 = $id;)*

            /// Symbolic name of a message id, for diagnostics.
            pub fn name(id: i32) -> Option<&'static str> {
                match id {
                    $($id => Some(stringify!($name)),)*
                    _ => None,
                }
            }
        }
    };
}

message_ids! {
    /// Server to client message ids (first field of every inbound frame).
    incoming {
        TICK_PRICE = 1,
        TICK_SIZE = 2,
        ORDER_STATUS = 3,
        ERR_MSG = 4,
        OPEN_ORDER = 5,
        ACCT_VALUE = 6,
        PORTFOLIO_VALUE = 7,
        ACCT_UPDATE_TIME = 8,
        NEXT_VALID_ID = 9,
        CONTRACT_DATA = 10,
        EXECUTION_DATA = 11,
        MARKET_DEPTH = 12,
        MARKET_DEPTH_L2 = 13,
        NEWS_BULLETINS = 14,
        MANAGED_ACCTS = 15,
        RECEIVE_FA = 16,
        HISTORICAL_DATA = 17,
        BOND_CONTRACT_DATA = 18,
        SCANNER_PARAMETERS = 19,
        SCANNER_DATA = 20,
        TICK_OPTION_COMPUTATION = 21,
        TICK_GENERIC = 45,
        TICK_STRING = 46,
        TICK_EFP = 47,
        CURRENT_TIME = 49,
        REAL_TIME_BARS = 50,
        FUNDAMENTAL_DATA = 51,
        CONTRACT_DATA_END = 52,
        OPEN_ORDER_END = 53,
        ACCT_DOWNLOAD_END = 54,
        EXECUTION_DATA_END = 55,
        DELTA_NEUTRAL_VALIDATION = 56,
        TICK_SNAPSHOT_END = 57,
        MARKET_DATA_TYPE = 58,
        COMMISSION_AND_FEES_REPORT = 59,
        POSITION_DATA = 61,
        POSITION_END = 62,
        ACCOUNT_SUMMARY = 63,
        ACCOUNT_SUMMARY_END = 64,
        VERIFY_MESSAGE_API = 65,
        VERIFY_COMPLETED = 66,
        DISPLAY_GROUP_LIST = 67,
        DISPLAY_GROUP_UPDATED = 68,
        VERIFY_AND_AUTH_MESSAGE_API = 69,
        VERIFY_AND_AUTH_COMPLETED = 70,
        POSITION_MULTI = 71,
        POSITION_MULTI_END = 72,
        ACCOUNT_UPDATE_MULTI = 73,
        ACCOUNT_UPDATE_MULTI_END = 74,
        SECURITY_DEFINITION_OPTION_PARAMETER = 75,
        SECURITY_DEFINITION_OPTION_PARAMETER_END = 76,
        SOFT_DOLLAR_TIERS = 77,
        FAMILY_CODES = 78,
        SYMBOL_SAMPLES = 79,
        MKT_DEPTH_EXCHANGES = 80,
        TICK_REQ_PARAMS = 81,
        SMART_COMPONENTS = 82,
        NEWS_ARTICLE = 83,
        TICK_NEWS = 84,
        NEWS_PROVIDERS = 85,
        HISTORICAL_NEWS = 86,
        HISTORICAL_NEWS_END = 87,
        HEAD_TIMESTAMP = 88,
        HISTOGRAM_DATA = 89,
        HISTORICAL_DATA_UPDATE = 90,
        REROUTE_MKT_DATA_REQ = 91,
        REROUTE_MKT_DEPTH_REQ = 92,
        MARKET_RULE = 93,
        PNL = 94,
        PNL_SINGLE = 95,
        HISTORICAL_TICKS = 96,
        HISTORICAL_TICKS_BID_ASK = 97,
        HISTORICAL_TICKS_LAST = 98,
        TICK_BY_TICK = 99,
        ORDER_BOUND = 100,
        COMPLETED_ORDER = 101,
        COMPLETED_ORDERS_END = 102,
        REPLACE_FA_END = 103,
        WSH_META_DATA = 104,
        WSH_EVENT_DATA = 105,
        HISTORICAL_SCHEDULE = 106,
        USER_INFO = 107,
        HISTORICAL_DATA_END = 108,
        CURRENT_TIME_IN_MILLIS = 109,
    }
}

message_ids! {
    /// Client to server request ids.
    outgoing {
        REQ_MKT_DATA = 1,
        CANCEL_MKT_DATA = 2,
        PLACE_ORDER = 3,
        CANCEL_ORDER = 4,
        REQ_OPEN_ORDERS = 5,
        REQ_ACCT_DATA = 6,
        REQ_EXECUTIONS = 7,
        REQ_IDS = 8,
        REQ_CONTRACT_DATA = 9,
        REQ_MKT_DEPTH = 10,
        CANCEL_MKT_DEPTH = 11,
        SET_SERVER_LOGLEVEL = 14,
        REQ_AUTO_OPEN_ORDERS = 15,
        REQ_ALL_OPEN_ORDERS = 16,
        REQ_MANAGED_ACCTS = 17,
        REQ_HISTORICAL_DATA = 20,
        CANCEL_HISTORICAL_DATA = 25,
        REQ_CURRENT_TIME = 49,
        REQ_REAL_TIME_BARS = 50,
        CANCEL_REAL_TIME_BARS = 51,
        REQ_GLOBAL_CANCEL = 58,
        REQ_MARKET_DATA_TYPE = 59,
        REQ_POSITIONS = 61,
        REQ_ACCOUNT_SUMMARY = 62,
        CANCEL_ACCOUNT_SUMMARY = 63,
        CANCEL_POSITIONS = 64,
        START_API = 71,
        REQ_SEC_DEF_OPT_PARAMS = 78,
        REQ_FAMILY_CODES = 80,
        REQ_MATCHING_SYMBOLS = 81,
        REQ_NEWS_ARTICLE = 84,
        REQ_NEWS_PROVIDERS = 85,
        REQ_HISTORICAL_NEWS = 86,
        REQ_HEAD_TIMESTAMP = 87,
        REQ_MARKET_RULE = 91,
        REQ_PNL = 92,
        CANCEL_PNL = 93,
        REQ_PNL_SINGLE = 94,
        CANCEL_PNL_SINGLE = 95,
        REQ_HISTORICAL_TICKS = 96,
        REQ_TICK_BY_TICK_DATA = 97,
        CANCEL_TICK_BY_TICK_DATA = 98,
        REQ_COMPLETED_ORDERS = 99,
        REQ_USER_INFO = 104,
        REQ_CURRENT_TIME_IN_MILLIS = 105,
    }
}

// ============================================================================
// Server version gates
// ============================================================================

/// Minimum negotiated server version for each optional field or feature.
pub mod server_version {
    pub const DELTA_NEUTRAL: i32 = 40;
    pub const SCALE_ORDERS2: i32 = 40;
    pub const ALGO_ORDERS: i32 = 41;
    pub const EXECUTION_DATA_CHAIN: i32 = 42;
    pub const NOT_HELD: i32 = 44;
    pub const SEC_ID_TYPE: i32 = 45;
    pub const PLACE_ORDER_CONID: i32 = 46;
    pub const REQ_MKT_DATA_CONID: i32 = 47;
    pub const SSHORTX_OLD: i32 = 51;
    pub const SSHORTX: i32 = 52;
    pub const REQ_GLOBAL_CANCEL: i32 = 53;
    pub const HEDGE_ORDERS: i32 = 54;
    pub const REQ_MARKET_DATA_TYPE: i32 = 55;
    pub const OPT_OUT_SMART_ROUTING: i32 = 56;
    pub const SMART_COMBO_ROUTING_PARAMS: i32 = 57;
    pub const DELTA_NEUTRAL_CONID: i32 = 58;
    pub const SCALE_ORDERS3: i32 = 60;
    pub const ORDER_COMBO_LEGS_PRICE: i32 = 61;
    pub const TRAILING_PERCENT: i32 = 62;
    pub const DELTA_NEUTRAL_OPEN_CLOSE: i32 = 66;
    pub const POSITIONS: i32 = 67;
    pub const ACCOUNT_SUMMARY: i32 = 67;
    pub const TRADING_CLASS: i32 = 68;
    pub const SCALE_TABLE: i32 = 69;
    pub const ALGO_ID: i32 = 71;
    pub const OPTIONAL_CAPABILITIES: i32 = 72;
    pub const ORDER_SOLICITED: i32 = 73;
    pub const RANDOMIZE_SIZE_AND_PRICE: i32 = 76;
    pub const FRACTIONAL_POSITIONS: i32 = 101;
    pub const PEGGED_TO_BENCHMARK: i32 = 102;
    pub const MODELS_SUPPORT: i32 = 103;
    pub const SEC_DEF_OPT_PARAMS_REQ: i32 = 104;
    pub const EXT_OPERATOR: i32 = 105;
    pub const SOFT_DOLLAR_TIER: i32 = 106;
    pub const REQ_FAMILY_CODES: i32 = 107;
    pub const REQ_MATCHING_SYMBOLS: i32 = 108;
    pub const PAST_LIMIT: i32 = 109;
    pub const MD_SIZE_MULTIPLIER: i32 = 110;
    pub const CASH_QTY: i32 = 111;
    pub const REQ_SMART_COMPONENTS: i32 = 114;
    pub const REQ_NEWS_PROVIDERS: i32 = 115;
    pub const REQ_NEWS_ARTICLE: i32 = 116;
    pub const REQ_HISTORICAL_NEWS: i32 = 117;
    pub const REQ_HEAD_TIMESTAMP: i32 = 118;
    pub const SERVICE_DATA_TYPE: i32 = 120;
    pub const AGG_GROUP: i32 = 121;
    pub const UNDERLYING_INFO: i32 = 122;
    pub const SYNT_REALTIME_BARS: i32 = 124;
    pub const MARKET_RULES: i32 = 126;
    pub const PNL: i32 = 127;
    pub const NEWS_QUERY_ORIGINS: i32 = 128;
    pub const UNREALIZED_PNL: i32 = 129;
    pub const HISTORICAL_TICKS: i32 = 130;
    pub const MARKET_CAP_PRICE: i32 = 131;
    pub const PRE_OPEN_BID_ASK: i32 = 132;
    pub const REAL_EXPIRATION_DATE: i32 = 134;
    pub const REALIZED_PNL: i32 = 135;
    pub const LAST_LIQUIDITY: i32 = 136;
    pub const TICK_BY_TICK: i32 = 137;
    pub const DECISION_MAKER: i32 = 138;
    pub const MIFID_EXECUTION: i32 = 139;
    pub const TICK_BY_TICK_IGNORE_SIZE: i32 = 140;
    pub const AUTO_PRICE_FOR_HEDGE: i32 = 141;
    pub const WHAT_IF_EXT_FIELDS: i32 = 142;
    pub const ORDER_CONTAINER: i32 = 145;
    pub const SMART_DEPTH: i32 = 146;
    pub const D_PEG_ORDERS: i32 = 148;
    pub const MKT_DEPTH_PRIM_EXCHANGE: i32 = 149;
    pub const COMPLETED_ORDERS: i32 = 150;
    pub const PRICE_MGMT_ALGO: i32 = 151;
    pub const STOCK_TYPE: i32 = 152;
    pub const ENCODE_MSG_ASCII7: i32 = 153;
    pub const PRICE_BASED_VOLATILITY: i32 = 156;
    pub const DURATION: i32 = 158;
    pub const POST_TO_ATS: i32 = 160;
    pub const AUTO_CANCEL_PARENT: i32 = 162;
    pub const FRACTIONAL_SIZE_SUPPORT: i32 = 163;
    pub const SIZE_RULES: i32 = 164;
    pub const HISTORICAL_SCHEDULE: i32 = 165;
    pub const ADVANCED_ORDER_REJECT: i32 = 166;
    pub const USER_INFO: i32 = 167;
    pub const MANUAL_ORDER_TIME: i32 = 169;
    pub const PEGBEST_PEGMID_OFFSETS: i32 = 170;
    pub const BOND_ISSUERID: i32 = 176;
    pub const FA_PROFILE_DESUPPORT: i32 = 177;
    pub const PENDING_PRICE_REVISION: i32 = 178;
    pub const FUND_DATA_FIELDS: i32 = 179;
    pub const LAST_TRADE_DATE: i32 = 182;
    pub const CUSTOMER_ACCOUNT: i32 = 183;
    pub const PROFESSIONAL_CUSTOMER: i32 = 184;
    pub const BOND_ACCRUED_INTEREST: i32 = 185;
    pub const INELIGIBILITY_REASONS: i32 = 186;
    pub const RFQ_FIELDS: i32 = 187;
    pub const BOND_TRADING_HOURS: i32 = 188;
    pub const INCLUDE_OVERNIGHT: i32 = 189;
    pub const UNDO_RFQ_FIELDS: i32 = 190;
    pub const PERM_ID_AS_LONG: i32 = 191;
    pub const CME_TAGGING_FIELDS: i32 = 192;
    pub const CME_TAGGING_FIELDS_IN_OPEN_ORDER: i32 = 193;
    pub const ERROR_TIME: i32 = 194;
    pub const FULL_ORDER_PREVIEW_FIELDS: i32 = 195;
    pub const HISTORICAL_DATA_END: i32 = 196;
    pub const CURRENT_TIME_IN_MILLIS: i32 = 197;
    pub const SUBMITTER: i32 = 198;
    pub const IMBALANCE_ONLY: i32 = 199;
    pub const PARAMETRIZED_DAYS_OF_EXECUTIONS: i32 = 200;
}

// ============================================================================
// TickType
// ============================================================================

macro_rules! tick_types {
    ($($variant:ident = $code:literal,)*) => {
        /// Market data field identifiers carried by tick messages.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[repr(i32)]
        pub enum TickType {
            $($variant = $code,)*
        }

        impl TryFrom<i32> for TickType {
            type Error = i32;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                match value {
                    $($code => Ok(TickType::$variant),)*
                    other => Err(other),
                }
            }
        }
    };
}

tick_types! {
    BidSize = 0,
    Bid = 1,
    Ask = 2,
    AskSize = 3,
    Last = 4,
    LastSize = 5,
    High = 6,
    Low = 7,
    Volume = 8,
    Close = 9,
    BidOptionComputation = 10,
    AskOptionComputation = 11,
    LastOptionComputation = 12,
    ModelOption = 13,
    Open = 14,
    Low13Week = 15,
    High13Week = 16,
    Low26Week = 17,
    High26Week = 18,
    Low52Week = 19,
    High52Week = 20,
    AvgVolume = 21,
    OpenInterest = 22,
    OptionHistoricalVol = 23,
    OptionImpliedVol = 24,
    OptionBidExch = 25,
    OptionAskExch = 26,
    OptionCallOpenInterest = 27,
    OptionPutOpenInterest = 28,
    OptionCallVolume = 29,
    OptionPutVolume = 30,
    IndexFuturePremium = 31,
    BidExch = 32,
    AskExch = 33,
    AuctionVolume = 34,
    AuctionPrice = 35,
    AuctionImbalance = 36,
    MarkPrice = 37,
    BidEfpComputation = 38,
    AskEfpComputation = 39,
    LastEfpComputation = 40,
    OpenEfpComputation = 41,
    HighEfpComputation = 42,
    LowEfpComputation = 43,
    CloseEfpComputation = 44,
    LastTimestamp = 45,
    Shortable = 46,
    FundamentalRatios = 47,
    RtVolume = 48,
    Halted = 49,
    BidYield = 50,
    AskYield = 51,
    LastYield = 52,
    CustOptionComputation = 53,
    TradeCount = 54,
    TradeRate = 55,
    VolumeRate = 56,
    LastRthTrade = 57,
    RtHistoricalVol = 58,
    IbDividends = 59,
    BondFactorMultiplier = 60,
    RegulatoryImbalance = 61,
    NewsTick = 62,
    ShortTermVolume3Min = 63,
    ShortTermVolume5Min = 64,
    ShortTermVolume10Min = 65,
    DelayedBid = 66,
    DelayedAsk = 67,
    DelayedLast = 68,
    DelayedBidSize = 69,
    DelayedAskSize = 70,
    DelayedLastSize = 71,
    DelayedHigh = 72,
    DelayedLow = 73,
    DelayedVolume = 74,
    DelayedClose = 75,
    DelayedOpen = 76,
    RtTrdVolume = 77,
    CreditmanMarkPrice = 78,
    CreditmanSlowMarkPrice = 79,
    DelayedBidOptionComputation = 80,
    DelayedAskOptionComputation = 81,
    DelayedLastOptionComputation = 82,
    DelayedModelOptionComputation = 83,
    LastExch = 84,
    LastRegTime = 85,
    FuturesOpenInterest = 86,
    AvgOptVolume = 87,
    DelayedLastTimestamp = 88,
    ShortableShares = 89,
    DelayedHalted = 90,
    Reuters2MutualFunds = 91,
    EtfNavClose = 92,
    EtfNavPriorClose = 93,
    EtfNavBid = 94,
    EtfNavAsk = 95,
    EtfNavLast = 96,
    EtfFrozenNavLast = 97,
    EtfNavHigh = 98,
    EtfNavLow = 99,
    SocialMarketAnalytics = 100,
    EstimatedIpoMidpoint = 101,
    FinalIpoLast = 102,
    DelayedYieldBid = 103,
    DelayedYieldAsk = 104,
    NotSet = 105,
}

impl TickType {
    /// Size tick that accompanies a price tick of this type, if any.
    pub fn paired_size(self) -> Option<TickType> {
        match self {
            TickType::Bid => Some(TickType::BidSize),
            TickType::Ask => Some(TickType::AskSize),
            TickType::Last => Some(TickType::LastSize),
            TickType::DelayedBid => Some(TickType::DelayedBidSize),
            TickType::DelayedAsk => Some(TickType::DelayedAskSize),
            TickType::DelayedLast => Some(TickType::DelayedLastSize),
            _ => None,
        }
    }

    /// Option computation ticks that always carry the full greeks block.
    pub fn is_model_computation(self) -> bool {
        matches!(self, TickType::ModelOption | TickType::DelayedModelOptionComputation)
    }
}

impl From<TickType> for i32 {
    fn from(tt: TickType) -> i32 {
        tt as i32
    }
}

// ============================================================================
// Client-side error conditions
// ============================================================================

/// Client-side error conditions reported through the `error` callback.
pub mod client_errors {
    /// A fixed error code paired with its canonical message.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClientError {
        pub code: i32,
        pub message: &'static str,
    }

    impl ClientError {
        /// Canonical message followed by request-specific detail.
        pub fn with_detail(&self, detail: &str) -> String {
            if detail.is_empty() {
                self.message.to_string()
            } else {
                format!("{} {}", self.message, detail)
            }
        }
    }

    pub const ALREADY_CONNECTED: ClientError = ClientError { code: 501, message: "Already connected." };
    pub const CONNECT_FAIL: ClientError = ClientError {
        code: 502,
        message: "Couldn't connect to TWS. Confirm that \"Enable ActiveX and Socket Clients\" is enabled and connection port is the same as \"Socket Port\" on the TWS \"Edit->Global Configuration...->API->Settings\" menu.",
    };
    pub const UPDATE_TWS: ClientError = ClientError { code: 503, message: "The TWS is out of date and must be upgraded." };
    pub const NOT_CONNECTED: ClientError = ClientError { code: 504, message: "Not connected" };
    pub const BAD_LENGTH: ClientError = ClientError { code: 507, message: "Bad message length" };
    pub const BAD_MESSAGE: ClientError = ClientError { code: 508, message: "Bad message" };
    pub const SOCKET_EXCEPTION: ClientError = ClientError { code: 509, message: "Exception caught while reading socket - " };
}
