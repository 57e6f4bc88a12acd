//! Inbound message decoding.
//!
//! A frame payload is a run of NUL-terminated ASCII fields with no type
//! tags. [`MessageDecoder`] walks the fields with a cursor; the per-message
//! routines in the submodules know, from the message id and the negotiated
//! server version, which type to read next.
//!
//! Any malformed field is a [`IBApiError::Decoding`]: the rest of the frame
//! can no longer be trusted, and the reader treats it as fatal for the
//! connection.

mod account;
mod contract;
mod history;
mod market;
mod misc;
mod orders;

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::errors::{IBApiError, Result};
use crate::event::IBEvent;
use crate::models::contract::Contract;
use crate::protocol::{
    incoming, TickType, UNSET_DECIMAL_TEXTS, UNSET_DOUBLE, UNSET_INTEGER, UNSET_LONG,
};

/// Upper bound on capacity reserved from a count field before the items
/// themselves have been read.
const MAX_PREALLOCATED_ITEMS: usize = 1024;

const UNSET_INTEGER_TEXT: &str = "2147483647";
const UNSET_LONG_TEXT: &str = "9223372036854775807";
const UNSET_DOUBLE_TEXT: &str = "1.7976931348623157E308";

// ============================================================================
// MessageDecoder
// ============================================================================

/// Cursor over the fields of one inbound frame.
pub struct MessageDecoder<'a> {
    data: &'a [u8],
    pos: usize,
    server_version: i32,
}

impl<'a> MessageDecoder<'a> {
    /// Create a decoder over a frame payload (length prefix already removed).
    pub fn new(data: &'a [u8], server_version: i32) -> Self {
        Self {
            data,
            pos: 0,
            server_version,
        }
    }

    pub fn server_version(&self) -> i32 {
        self.server_version
    }

    pub fn has_remaining(&self) -> bool {
        self.pos < self.data.len()
    }

    fn read_field(&mut self) -> Result<&'a str> {
        if !self.has_remaining() {
            return Err(IBApiError::Decoding("unexpected end of message".into()));
        }
        let end = self.data[self.pos..]
            .iter()
            .position(|&b| b == 0)
            .map(|offset| self.pos + offset)
            .ok_or_else(|| IBApiError::Decoding("field not NUL-terminated".into()))?;
        let field = std::str::from_utf8(&self.data[self.pos..end])
            .map_err(|e| IBApiError::Decoding(format!("invalid UTF-8: {e}")))?;
        self.pos = end + 1;
        Ok(field)
    }

    // ------------------------------------------------------------------------
    // Strings
    // ------------------------------------------------------------------------

    pub fn decode_string(&mut self) -> Result<String> {
        self.read_field().map(str::to_string)
    }

    /// String field that may carry backslash escapes (`\n`, `\xNN`, `\uNNNN`).
    pub fn decode_string_unescaped(&mut self) -> Result<String> {
        self.read_field().map(unescape)
    }

    // ------------------------------------------------------------------------
    // Integers
    // ------------------------------------------------------------------------

    /// Empty field decodes as 0; `None` as the unset marker.
    pub fn decode_int(&mut self) -> Result<i32> {
        let s = self.read_field()?;
        match s {
            "" => Ok(0),
            "None" => Ok(UNSET_INTEGER),
            _ => s.parse().map_err(|e| IBApiError::decoding("int", s, e)),
        }
    }

    /// Empty field, `None` or the `i32::MAX` marker decodes as `None`.
    pub fn decode_int_show_unset(&mut self) -> Result<Option<i32>> {
        let s = self.read_field()?;
        if matches!(s, "" | "None" | UNSET_INTEGER_TEXT) {
            return Ok(None);
        }
        s.parse().map(Some).map_err(|e| IBApiError::decoding("int", s, e))
    }

    pub fn decode_long(&mut self) -> Result<i64> {
        let s = self.read_field()?;
        match s {
            "" => Ok(0),
            "None" => Ok(UNSET_LONG),
            _ => s.parse().map_err(|e| IBApiError::decoding("long", s, e)),
        }
    }

    pub fn decode_long_show_unset(&mut self) -> Result<Option<i64>> {
        let s = self.read_field()?;
        if matches!(s, "" | "None" | UNSET_LONG_TEXT) {
            return Ok(None);
        }
        s.parse().map(Some).map_err(|e| IBApiError::decoding("long", s, e))
    }

    /// Count prefix of a repeated group.
    pub fn decode_count(&mut self) -> Result<usize> {
        let raw = self.decode_int()?;
        usize::try_from(raw).map_err(|_| IBApiError::Decoding(format!("negative item count {raw}")))
    }

    // ------------------------------------------------------------------------
    // Floats
    // ------------------------------------------------------------------------

    /// Empty field decodes as 0.0; `None` as the unset marker.
    pub fn decode_float(&mut self) -> Result<f64> {
        let s = self.read_field()?;
        match s {
            "" => Ok(0.0),
            "None" => Ok(UNSET_DOUBLE),
            "Infinity" => Ok(f64::INFINITY),
            _ => s.parse().map_err(|e| IBApiError::decoding("float", s, e)),
        }
    }

    pub fn decode_float_show_unset(&mut self) -> Result<Option<f64>> {
        let s = self.read_field()?;
        match s {
            "" | "None" | UNSET_DOUBLE_TEXT => Ok(None),
            "Infinity" => Ok(Some(f64::INFINITY)),
            _ => {
                let v: f64 = s.parse().map_err(|e| IBApiError::decoding("float", s, e))?;
                Ok((v != UNSET_DOUBLE).then_some(v))
            }
        }
    }

    // ------------------------------------------------------------------------
    // Other scalars
    // ------------------------------------------------------------------------

    /// `"0"` and the empty field are false; anything else is true.
    pub fn decode_bool(&mut self) -> Result<bool> {
        let s = self.read_field()?;
        Ok(!(s.is_empty() || s == "0"))
    }

    /// Quantities. Empty, `None` and the legacy numeric "no value" texts
    /// decode as `None`.
    pub fn decode_decimal(&mut self) -> Result<Option<Decimal>> {
        let s = self.read_field()?;
        if s.is_empty() || s == "None" || UNSET_DECIMAL_TEXTS.contains(&s) {
            return Ok(None);
        }
        parse_decimal(s).map(Some)
    }

    /// Text code parsed into a typed enum; empty decodes as `None`.
    pub fn decode_enum_opt<T>(&mut self) -> Result<Option<T>>
    where
        T: FromStr<Err = std::convert::Infallible>,
    {
        let s = self.read_field()?;
        if s.is_empty() {
            return Ok(None);
        }
        match s.parse::<T>() {
            Ok(value) => Ok(Some(value)),
            Err(never) => match never {},
        }
    }

    /// Integer code converted into a typed enum, falling back to `default`
    /// for codes this client does not know.
    pub fn decode_int_enum<T>(&mut self, default: T) -> Result<T>
    where
        T: TryFrom<i32, Error = i32>,
    {
        let raw = self.decode_int()?;
        Ok(T::try_from(raw).unwrap_or_else(|code| {
            tracing::debug!(code, "unknown integer code");
            default
        }))
    }

    pub fn decode_tick_type(&mut self) -> Result<TickType> {
        let raw = self.decode_int()?;
        Ok(TickType::try_from(raw).unwrap_or_else(|code| {
            tracing::warn!(code, "unknown tick type");
            TickType::NotSet
        }))
    }

    pub fn skip_field(&mut self) -> Result<()> {
        self.read_field().map(|_| ())
    }

    pub fn skip_fields(&mut self, n: usize) -> Result<()> {
        for _ in 0..n {
            self.skip_field()?;
        }
        Ok(())
    }

    /// Read `count` items with `read`.
    pub fn decode_list<T>(
        &mut self,
        count: usize,
        mut read: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        let mut items = Vec::with_capacity(count.min(MAX_PREALLOCATED_ITEMS));
        for _ in 0..count {
            items.push(read(self)?);
        }
        Ok(items)
    }

    /// Count-prefixed list.
    pub fn decode_counted<T>(&mut self, read: impl FnMut(&mut Self) -> Result<T>) -> Result<Vec<T>> {
        let count = self.decode_count()?;
        self.decode_list(count, read)
    }
}

fn parse_decimal(s: &str) -> Result<Decimal> {
    let parsed = if s.contains(['e', 'E']) {
        Decimal::from_scientific(s)
    } else {
        Decimal::from_str(s)
    };
    parsed.map_err(|e| IBApiError::decoding("decimal", s, e))
}

/// Undo the server's backslash escaping of non-ASCII text.
fn unescape(raw: &str) -> String {
    if !raw.contains('\\') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some(kind @ ('x' | 'u')) => {
                let width = if kind == 'x' { 2 } else { 4 };
                let hex: String = chars.clone().take(width).collect();
                match u32::from_str_radix(&hex, 16).ok().filter(|_| hex.len() == width).and_then(char::from_u32) {
                    Some(decoded) => {
                        out.push(decoded);
                        for _ in 0..width {
                            chars.next();
                        }
                    }
                    None => {
                        out.push('\\');
                        out.push(kind);
                    }
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

// ============================================================================
// Shared field groups
// ============================================================================

/// The contract block used by order, position and execution messages:
/// con id, symbol, type, expiry, strike, right, multiplier, exchange,
/// currency, local symbol, trading class.
pub(crate) fn decode_contract_block(dec: &mut MessageDecoder) -> Result<Contract> {
    Ok(Contract {
        con_id: dec.decode_int()?,
        symbol: dec.decode_string()?,
        sec_type: dec.decode_enum_opt()?,
        last_trade_date_or_contract_month: dec.decode_string()?,
        strike: dec.decode_float_show_unset()?,
        right: dec.decode_enum_opt()?,
        multiplier: dec.decode_string()?,
        exchange: dec.decode_string()?,
        currency: dec.decode_string()?,
        local_symbol: dec.decode_string()?,
        trading_class: dec.decode_string()?,
        ..Default::default()
    })
}

// ============================================================================
// Dispatch
// ============================================================================

/// Decode one inbound frame into an [`IBEvent`].
///
/// Ids this client does not handle yield [`IBEvent::Unknown`]; a malformed
/// field yields an error.
pub fn decode_server_msg(data: &[u8], server_version: i32) -> Result<IBEvent> {
    let mut dec = MessageDecoder::new(data, server_version);
    let msg_id = dec.decode_int()?;
    let dec = &mut dec;

    match msg_id {
        // Session
        incoming::ERR_MSG => misc::decode_error(dec),
        incoming::NEXT_VALID_ID => misc::decode_next_valid_id(dec),
        incoming::MANAGED_ACCTS => misc::decode_managed_accounts(dec),
        incoming::CURRENT_TIME => misc::decode_current_time(dec),
        incoming::CURRENT_TIME_IN_MILLIS => misc::decode_current_time_in_millis(dec),
        // Market data
        incoming::TICK_PRICE => market::decode_tick_price(dec),
        incoming::TICK_SIZE => market::decode_tick_size(dec),
        incoming::TICK_OPTION_COMPUTATION => market::decode_tick_option_computation(dec),
        incoming::TICK_GENERIC => market::decode_tick_generic(dec),
        incoming::TICK_STRING => market::decode_tick_string(dec),
        incoming::TICK_EFP => market::decode_tick_efp(dec),
        incoming::TICK_SNAPSHOT_END => market::decode_tick_snapshot_end(dec),
        incoming::TICK_REQ_PARAMS => market::decode_tick_req_params(dec),
        incoming::TICK_NEWS => market::decode_tick_news(dec),
        incoming::MARKET_DATA_TYPE => market::decode_market_data_type(dec),
        incoming::TICK_BY_TICK => market::decode_tick_by_tick(dec),
        incoming::MARKET_DEPTH => market::decode_market_depth(dec),
        incoming::MARKET_DEPTH_L2 => market::decode_market_depth_l2(dec),
        incoming::MKT_DEPTH_EXCHANGES => market::decode_mkt_depth_exchanges(dec),
        incoming::REROUTE_MKT_DATA_REQ => market::decode_reroute_mkt_data(dec),
        incoming::REROUTE_MKT_DEPTH_REQ => market::decode_reroute_mkt_depth(dec),
        incoming::SMART_COMPONENTS => market::decode_smart_components(dec),
        // Orders and executions
        incoming::ORDER_STATUS => orders::decode_order_status(dec),
        incoming::OPEN_ORDER => orders::decode_open_order(dec),
        incoming::OPEN_ORDER_END => Ok(IBEvent::OpenOrderEnd),
        incoming::ORDER_BOUND => orders::decode_order_bound(dec),
        incoming::COMPLETED_ORDER => orders::decode_completed_order(dec),
        incoming::COMPLETED_ORDERS_END => Ok(IBEvent::CompletedOrdersEnd),
        incoming::EXECUTION_DATA => orders::decode_execution_data(dec),
        incoming::EXECUTION_DATA_END => orders::decode_execution_data_end(dec),
        incoming::COMMISSION_AND_FEES_REPORT => orders::decode_commission_report(dec),
        // Account
        incoming::ACCT_VALUE => account::decode_account_value(dec),
        incoming::PORTFOLIO_VALUE => account::decode_portfolio_value(dec),
        incoming::ACCT_UPDATE_TIME => account::decode_account_update_time(dec),
        incoming::ACCT_DOWNLOAD_END => account::decode_account_download_end(dec),
        incoming::ACCOUNT_SUMMARY => account::decode_account_summary(dec),
        incoming::ACCOUNT_SUMMARY_END => account::decode_account_summary_end(dec),
        incoming::POSITION_DATA => account::decode_position(dec),
        incoming::POSITION_END => Ok(IBEvent::PositionEnd),
        incoming::POSITION_MULTI => account::decode_position_multi(dec),
        incoming::POSITION_MULTI_END => account::decode_position_multi_end(dec),
        incoming::ACCOUNT_UPDATE_MULTI => account::decode_account_update_multi(dec),
        incoming::ACCOUNT_UPDATE_MULTI_END => account::decode_account_update_multi_end(dec),
        incoming::PNL => account::decode_pnl(dec),
        incoming::PNL_SINGLE => account::decode_pnl_single(dec),
        incoming::FAMILY_CODES => account::decode_family_codes(dec),
        incoming::SOFT_DOLLAR_TIERS => account::decode_soft_dollar_tiers(dec),
        // Contracts
        incoming::CONTRACT_DATA => contract::decode_contract_data(dec),
        incoming::BOND_CONTRACT_DATA => contract::decode_bond_contract_data(dec),
        incoming::CONTRACT_DATA_END => contract::decode_contract_data_end(dec),
        incoming::SYMBOL_SAMPLES => contract::decode_symbol_samples(dec),
        incoming::DELTA_NEUTRAL_VALIDATION => contract::decode_delta_neutral_validation(dec),
        incoming::SECURITY_DEFINITION_OPTION_PARAMETER => contract::decode_sec_def_opt_params(dec),
        incoming::SECURITY_DEFINITION_OPTION_PARAMETER_END => contract::decode_sec_def_opt_params_end(dec),
        incoming::MARKET_RULE => contract::decode_market_rule(dec),
        // Historical data
        incoming::HISTORICAL_DATA => history::decode_historical_data(dec),
        incoming::HISTORICAL_DATA_UPDATE => history::decode_historical_data_update(dec),
        incoming::HISTORICAL_DATA_END => history::decode_historical_data_end(dec),
        incoming::HEAD_TIMESTAMP => history::decode_head_timestamp(dec),
        incoming::HISTORICAL_TICKS => history::decode_historical_ticks(dec),
        incoming::HISTORICAL_TICKS_BID_ASK => history::decode_historical_ticks_bid_ask(dec),
        incoming::HISTORICAL_TICKS_LAST => history::decode_historical_ticks_last(dec),
        incoming::HISTORICAL_SCHEDULE => history::decode_historical_schedule(dec),
        incoming::REAL_TIME_BARS => history::decode_real_time_bar(dec),
        incoming::HISTOGRAM_DATA => history::decode_histogram_data(dec),
        // Scanner, news, fundamentals
        incoming::SCANNER_DATA => misc::decode_scanner_data(dec),
        incoming::SCANNER_PARAMETERS => misc::decode_scanner_parameters(dec),
        incoming::NEWS_BULLETINS => misc::decode_news_bulletin(dec),
        incoming::NEWS_ARTICLE => misc::decode_news_article(dec),
        incoming::NEWS_PROVIDERS => misc::decode_news_providers(dec),
        incoming::HISTORICAL_NEWS => misc::decode_historical_news(dec),
        incoming::HISTORICAL_NEWS_END => misc::decode_historical_news_end(dec),
        incoming::FUNDAMENTAL_DATA => misc::decode_fundamental_data(dec),
        // Advisors, display groups, verification, WSH
        incoming::RECEIVE_FA => misc::decode_receive_fa(dec),
        incoming::REPLACE_FA_END => misc::decode_replace_fa_end(dec),
        incoming::DISPLAY_GROUP_LIST => misc::decode_display_group_list(dec),
        incoming::DISPLAY_GROUP_UPDATED => misc::decode_display_group_updated(dec),
        incoming::VERIFY_MESSAGE_API => misc::decode_verify_message_api(dec),
        incoming::VERIFY_COMPLETED => misc::decode_verify_completed(dec),
        incoming::VERIFY_AND_AUTH_MESSAGE_API => misc::decode_verify_and_auth_message_api(dec),
        incoming::VERIFY_AND_AUTH_COMPLETED => misc::decode_verify_and_auth_completed(dec),
        incoming::WSH_META_DATA => misc::decode_wsh_meta_data(dec),
        incoming::WSH_EVENT_DATA => misc::decode_wsh_event_data(dec),
        incoming::USER_INFO => misc::decode_user_info(dec),
        _ => Ok(IBEvent::Unknown {
            msg_id,
            data: data.to_vec(),
        }),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// NUL-terminate each field.
    pub(crate) fn fields(items: &[&str]) -> Vec<u8> {
        let mut buf = Vec::new();
        for item in items {
            buf.extend_from_slice(item.as_bytes());
            buf.push(0);
        }
        buf
    }

    #[test]
    fn int_empty_is_zero_but_show_unset_is_none() {
        let data = fields(&["", "", "0", "2147483647", "-7"]);
        let mut dec = MessageDecoder::new(&data, 176);
        assert_eq!(dec.decode_int().unwrap(), 0);
        assert_eq!(dec.decode_int_show_unset().unwrap(), None);
        assert_eq!(dec.decode_int_show_unset().unwrap(), Some(0));
        assert_eq!(dec.decode_int_show_unset().unwrap(), None);
        assert_eq!(dec.decode_int().unwrap(), -7);
        assert!(!dec.has_remaining());
    }

    #[test]
    fn malformed_int_is_error() {
        let data = fields(&["12x"]);
        let mut dec = MessageDecoder::new(&data, 176);
        assert!(matches!(dec.decode_int(), Err(IBApiError::Decoding(_))));
    }

    #[test]
    fn floats_and_sentinels() {
        let data = fields(&["", "None", "Infinity", "1.25", "", "None", "1.7976931348623157E308", "-2"]);
        let mut dec = MessageDecoder::new(&data, 176);
        assert_eq!(dec.decode_float().unwrap(), 0.0);
        assert_eq!(dec.decode_float().unwrap(), UNSET_DOUBLE);
        assert_eq!(dec.decode_float().unwrap(), f64::INFINITY);
        assert_eq!(dec.decode_float().unwrap(), 1.25);
        assert_eq!(dec.decode_float_show_unset().unwrap(), None);
        assert_eq!(dec.decode_float_show_unset().unwrap(), None);
        assert_eq!(dec.decode_float_show_unset().unwrap(), None);
        assert_eq!(dec.decode_float_show_unset().unwrap(), Some(-2.0));
    }

    #[test]
    fn none_text_is_unset_in_every_numeric_decoder() {
        let data = fields(&["None", "None", "None", "None", "None", "None", "None"]);
        let mut dec = MessageDecoder::new(&data, 176);
        assert_eq!(dec.decode_int().unwrap(), UNSET_INTEGER);
        assert_eq!(dec.decode_int_show_unset().unwrap(), None);
        assert_eq!(dec.decode_long().unwrap(), UNSET_LONG);
        assert_eq!(dec.decode_long_show_unset().unwrap(), None);
        assert_eq!(dec.decode_float().unwrap(), UNSET_DOUBLE);
        assert_eq!(dec.decode_float_show_unset().unwrap(), None);
        assert_eq!(dec.decode_decimal().unwrap(), None);
    }

    #[test]
    fn tick_size_of_none_is_an_unset_size() {
        let data = fields(&["2", "6", "7", "0", "None"]);
        match decode_server_msg(&data, 176).unwrap() {
            IBEvent::TickSize { req_id, tick_type, size } => {
                assert_eq!(req_id, 7);
                assert_eq!(tick_type, TickType::BidSize);
                assert_eq!(size, None);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn bools() {
        let data = fields(&["0", "", "1", "true"]);
        let mut dec = MessageDecoder::new(&data, 176);
        assert!(!dec.decode_bool().unwrap());
        assert!(!dec.decode_bool().unwrap());
        assert!(dec.decode_bool().unwrap());
        assert!(dec.decode_bool().unwrap());
    }

    #[test]
    fn decimal_sentinels_are_unset() {
        for text in UNSET_DECIMAL_TEXTS {
            let data = fields(&[text]);
            let mut dec = MessageDecoder::new(&data, 176);
            assert_eq!(dec.decode_decimal().unwrap(), None, "{text}");
        }
        let data = fields(&["100.5", "0", "1E-4", ""]);
        let mut dec = MessageDecoder::new(&data, 176);
        assert_eq!(dec.decode_decimal().unwrap(), Some(Decimal::from_str("100.5").unwrap()));
        assert_eq!(dec.decode_decimal().unwrap(), Some(Decimal::ZERO));
        assert_eq!(dec.decode_decimal().unwrap(), Some(Decimal::from_str("0.0001").unwrap()));
        assert_eq!(dec.decode_decimal().unwrap(), None);
    }

    #[test]
    fn unescaped_strings() {
        let data = fields(&[r"line\nbreak", r"caf\xe9", r"été", r"trailing\", r"\q"]);
        let mut dec = MessageDecoder::new(&data, 176);
        assert_eq!(dec.decode_string_unescaped().unwrap(), "line\nbreak");
        assert_eq!(dec.decode_string_unescaped().unwrap(), "café");
        assert_eq!(dec.decode_string_unescaped().unwrap(), "été");
        assert_eq!(dec.decode_string_unescaped().unwrap(), "trailing\\");
        assert_eq!(dec.decode_string_unescaped().unwrap(), "\\q");
    }

    #[test]
    fn truncated_frame_is_error() {
        let data = b"1\x002".to_vec();
        let mut dec = MessageDecoder::new(&data, 176);
        assert_eq!(dec.decode_int().unwrap(), 1);
        assert!(dec.decode_int().is_err());
        assert!(dec.decode_int().is_err());
    }

    #[test]
    fn negative_count_is_error() {
        let data = fields(&["-1"]);
        let mut dec = MessageDecoder::new(&data, 176);
        assert!(dec.decode_count().is_err());
    }

    #[test]
    fn unknown_message_id() {
        let data = fields(&["999", "x"]);
        match decode_server_msg(&data, 176).unwrap() {
            IBEvent::Unknown { msg_id, .. } => assert_eq!(msg_id, 999),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn decoding_is_deterministic() {
        let data = fields(&["1", "6", "7", "1", "185.5", "300", "3"]);
        let first = format!("{:?}", decode_server_msg(&data, 176).unwrap());
        let second = format!("{:?}", decode_server_msg(&data, 176).unwrap());
        assert_eq!(first, second);
    }
}
