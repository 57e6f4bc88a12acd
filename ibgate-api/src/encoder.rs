//! Outbound field encoding.
//!
//! A request is a sequence of NUL-terminated ASCII fields inside one frame.
//! The frame length is only known once every field is written, so the
//! encoder reserves a 4-byte placeholder up front and patches it in
//! [`MessageEncoder::finish`].

use std::fmt;
use std::fmt::Write as _;

use bytes::{BufMut, BytesMut};
use rust_decimal::Decimal;

use crate::errors::{IBApiError, Result};
use crate::models::common::TagValue;
use crate::models::contract::Contract;
use crate::protocol::{API_SIGN, HEADER_LEN, MAX_CLIENT_VER, MAX_MSG_LEN, MIN_CLIENT_VER};

/// Builder for one outbound frame.
pub struct MessageEncoder {
    buf: BytesMut,
    server_version: i32,
    msg_id: i32,
}

impl MessageEncoder {
    /// Start a frame whose first field is `msg_id`.
    pub fn new(server_version: i32, msg_id: i32) -> Self {
        let mut buf = BytesMut::with_capacity(256);
        buf.put_bytes(0, HEADER_LEN);
        let mut enc = Self { buf, server_version, msg_id };
        enc.push_int(msg_id);
        enc
    }

    pub fn server_version(&self) -> i32 {
        self.server_version
    }

    pub fn msg_id(&self) -> i32 {
        self.msg_id
    }

    /// Patch the length placeholder and return the complete frame.
    pub fn finish(mut self) -> Result<BytesMut> {
        let len = self.buf.len() - HEADER_LEN;
        if len > MAX_MSG_LEN {
            return Err(IBApiError::Encoding(format!(
                "message too long: {len} bytes (max {MAX_MSG_LEN})"
            )));
        }
        self.buf[..HEADER_LEN].copy_from_slice(&(len as u32).to_be_bytes());
        Ok(self.buf)
    }

    fn terminate(&mut self) -> &mut Self {
        self.buf.put_u8(0);
        self
    }

    pub fn push_str(&mut self, value: &str) -> &mut Self {
        if value.bytes().any(|b| b == 0 || !(b.is_ascii_graphic() || b == b' ' || b == b'\t')) {
            tracing::warn!(value, "non-printable characters in outbound field");
        }
        self.buf.extend_from_slice(value.as_bytes());
        self.terminate()
    }

    pub fn push_int(&mut self, value: i32) -> &mut Self {
        self.push_display(&value)
    }

    pub fn push_long(&mut self, value: i64) -> &mut Self {
        self.push_display(&value)
    }

    pub fn push_float(&mut self, value: f64) -> &mut Self {
        if value == f64::INFINITY {
            self.buf.extend_from_slice(b"Infinity");
            return self.terminate();
        }
        self.push_display(&value)
    }

    pub fn push_bool(&mut self, value: bool) -> &mut Self {
        self.buf.put_u8(if value { b'1' } else { b'0' });
        self.terminate()
    }

    pub fn push_decimal(&mut self, value: Decimal) -> &mut Self {
        self.push_display(&value.normalize())
    }

    /// Unset values go out as an empty field.
    pub fn push_int_max(&mut self, value: Option<i32>) -> &mut Self {
        match value {
            Some(v) => self.push_int(v),
            None => self.terminate(),
        }
    }

    pub fn push_float_max(&mut self, value: Option<f64>) -> &mut Self {
        match value {
            Some(v) => self.push_float(v),
            None => self.terminate(),
        }
    }

    pub fn push_decimal_max(&mut self, value: Option<Decimal>) -> &mut Self {
        match value {
            Some(v) => self.push_decimal(v),
            None => self.terminate(),
        }
    }

    /// Wire text of enums such as `SecType` or `Action`.
    pub fn push_display<T: fmt::Display + ?Sized>(&mut self, value: &T) -> &mut Self {
        let mut text = String::new();
        // Writing into a String cannot fail.
        let _ = write!(text, "{value}");
        self.buf.extend_from_slice(text.as_bytes());
        self.terminate()
    }

    pub fn push_opt_display<T: fmt::Display>(&mut self, value: Option<&T>) -> &mut Self {
        match value {
            Some(v) => self.push_display(v),
            None => self.terminate(),
        }
    }

    /// `tag=value;` pairs collapsed into one field.
    pub fn push_tag_values(&mut self, tags: &[TagValue]) -> &mut Self {
        let joined: String = tags.iter().map(|tv| format!("{}={};", tv.tag, tv.value)).collect();
        self.push_str(&joined)
    }

    /// Count-prefixed tag/value pairs, each as two fields.
    pub fn push_tag_value_pairs(&mut self, tags: &[TagValue]) -> &mut Self {
        self.push_int(tags.len() as i32);
        for tv in tags {
            self.push_str(&tv.tag).push_str(&tv.value);
        }
        self
    }

    /// The contract block shared by market data style requests:
    /// con id through trading class, without `include_expired`.
    pub fn push_contract(&mut self, contract: &Contract) -> &mut Self {
        self.push_int(contract.con_id)
            .push_str(&contract.symbol)
            .push_opt_display(contract.sec_type.as_ref())
            .push_str(&contract.last_trade_date_or_contract_month)
            .push_float_max(contract.strike)
            .push_opt_display(contract.right.as_ref())
            .push_str(&contract.multiplier)
            .push_str(&contract.exchange)
            .push_str(&contract.primary_exchange)
            .push_str(&contract.currency)
            .push_str(&contract.local_symbol)
            .push_str(&contract.trading_class)
    }
}

/// Build the handshake preamble: `API\0`, then a framed `v<min>..<max>`
/// version string with optional connect options after one space.
pub fn build_connect_request(connect_options: Option<&str>) -> Result<BytesMut> {
    let mut version = format!("v{MIN_CLIENT_VER}..{MAX_CLIENT_VER}");
    if let Some(opts) = connect_options.filter(|o| !o.is_empty()) {
        version.push(' ');
        version.push_str(opts);
    }

    let frame = crate::frame::encode_frame(version.as_bytes())?;
    let mut out = BytesMut::with_capacity(API_SIGN.len() + frame.len());
    out.extend_from_slice(API_SIGN);
    out.extend_from_slice(&frame);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::SecType;
    use std::str::FromStr;

    fn body(frame: &[u8]) -> &[u8] {
        &frame[HEADER_LEN..]
    }

    #[test]
    fn header_patched_with_payload_length() {
        let mut enc = MessageEncoder::new(176, 49);
        enc.push_int(1);
        let frame = enc.finish().unwrap();
        assert_eq!(&frame[..4], &[0, 0, 0, 5]);
        assert_eq!(body(&frame), b"49\x001\x00");
    }

    #[test]
    fn scalar_fields() {
        let mut enc = MessageEncoder::new(176, 1);
        enc.push_long(-7)
            .push_float(1.5)
            .push_float(f64::INFINITY)
            .push_bool(true)
            .push_bool(false)
            .push_decimal(Decimal::from_str("100.50").unwrap())
            .push_str("AAPL");
        let frame = enc.finish().unwrap();
        assert_eq!(body(&frame), b"1\x00-7\x001.5\x00Infinity\x001\x000\x00100.5\x00AAPL\x00");
    }

    #[test]
    fn unset_values_are_empty_fields() {
        let mut enc = MessageEncoder::new(176, 1);
        enc.push_int_max(None)
            .push_int_max(Some(0))
            .push_float_max(None)
            .push_decimal_max(None)
            .push_opt_display::<SecType>(None);
        let frame = enc.finish().unwrap();
        assert_eq!(body(&frame), b"1\x00\x000\x00\x00\x00\x00");
    }

    #[test]
    fn tag_values() {
        let tags = vec![
            TagValue { tag: "a".into(), value: "1".into() },
            TagValue { tag: "b".into(), value: "2".into() },
        ];
        let mut enc = MessageEncoder::new(176, 1);
        enc.push_tag_values(&tags).push_tag_value_pairs(&tags);
        let frame = enc.finish().unwrap();
        assert_eq!(body(&frame), b"1\x00a=1;b=2;\x002\x00a\x001\x00b\x002\x00");
    }

    #[test]
    fn contract_block() {
        let contract = Contract {
            symbol: "AAPL".into(),
            sec_type: Some(SecType::Stock),
            exchange: "SMART".into(),
            currency: "USD".into(),
            ..Default::default()
        };
        let mut enc = MessageEncoder::new(176, 1);
        enc.push_contract(&contract);
        let frame = enc.finish().unwrap();
        assert_eq!(body(&frame), b"1\x000\x00AAPL\x00STK\x00\x00\x00\x00\x00SMART\x00\x00USD\x00\x00\x00");
    }

    #[test]
    fn connect_request_layout() {
        let bytes = build_connect_request(None).unwrap();
        assert_eq!(&bytes[..4], b"API\0");
        assert_eq!(&bytes[4..8], &[0, 0, 0, 9]);
        assert_eq!(&bytes[8..], b"v100..200");

        let bytes = build_connect_request(Some("+PACEAPI")).unwrap();
        assert_eq!(&bytes[8..], b"v100..200 +PACEAPI");
    }
}
