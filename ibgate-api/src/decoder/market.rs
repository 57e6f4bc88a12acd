//! Top-of-book ticks, tick-by-tick data and market depth.

use super::MessageDecoder;
use crate::errors::Result;
use crate::event::IBEvent;
use crate::models::common::{DepthMktDataDescription, SmartComponent};
use crate::models::market_data::{
    EfpComputation, OptionComputation, TickAttrib, TickAttribBidAsk, TickAttribLast,
};
use crate::protocol::{incoming, server_version, UNSET_DOUBLE};

// ============================================================================
// Ticks
// ============================================================================

/// TICK_PRICE (1). The size travels in the same frame; the wrapper layer
/// fans it out as a separate size tick.
pub(super) fn decode_tick_price(dec: &mut MessageDecoder) -> Result<IBEvent> {
    let sv = dec.server_version();
    dec.skip_field()?;
    let req_id = dec.decode_int()?;
    let tick_type = dec.decode_tick_type()?;
    let price = dec.decode_float()?;
    let size = dec.decode_decimal()?;
    let mask = dec.decode_int()?;

    let mut attrib = TickAttrib::default();
    if sv >= server_version::PAST_LIMIT {
        attrib.can_auto_execute = mask & 1 != 0;
        attrib.past_limit = mask & 2 != 0;
    }
    if sv >= server_version::PRE_OPEN_BID_ASK {
        attrib.pre_open = mask & 4 != 0;
    }

    Ok(IBEvent::TickPrice {
        req_id,
        tick_type,
        price,
        size,
        attrib,
    })
}

/// TICK_SIZE (2).
pub(super) fn decode_tick_size(dec: &mut MessageDecoder) -> Result<IBEvent> {
    dec.skip_field()?;
    Ok(IBEvent::TickSize {
        req_id: dec.decode_int()?,
        tick_type: dec.decode_tick_type()?,
        size: dec.decode_decimal()?,
    })
}

/// Greeks use -1 or -2 on the wire for "not computed".
fn greek(dec: &mut MessageDecoder, not_computed: f64) -> Result<Option<f64>> {
    let v = dec.decode_float()?;
    Ok((v != not_computed && v != UNSET_DOUBLE).then_some(v))
}

/// TICK_OPTION_COMPUTATION (21).
pub(super) fn decode_tick_option_computation(dec: &mut MessageDecoder) -> Result<IBEvent> {
    let sv = dec.server_version();
    let version = if sv >= server_version::PRICE_BASED_VOLATILITY {
        sv
    } else {
        dec.decode_int()?
    };
    let req_id = dec.decode_int()?;
    let tick_type = dec.decode_tick_type()?;

    let mut computation = OptionComputation::default();
    if sv >= server_version::PRICE_BASED_VOLATILITY {
        computation.tick_attrib = Some(dec.decode_int()?);
    }
    computation.implied_vol = greek(dec, -1.0)?;
    computation.delta = greek(dec, -2.0)?;

    if version >= 6 || tick_type.is_model_computation() {
        computation.opt_price = greek(dec, -1.0)?;
        computation.pv_dividend = greek(dec, -1.0)?;
    }
    if version >= 6 {
        computation.gamma = greek(dec, -2.0)?;
        computation.vega = greek(dec, -2.0)?;
        computation.theta = greek(dec, -2.0)?;
        computation.und_price = greek(dec, -1.0)?;
    }

    Ok(IBEvent::TickOptionComputation {
        req_id,
        tick_type,
        computation,
    })
}

/// TICK_GENERIC (45).
pub(super) fn decode_tick_generic(dec: &mut MessageDecoder) -> Result<IBEvent> {
    dec.skip_field()?;
    Ok(IBEvent::TickGeneric {
        req_id: dec.decode_int()?,
        tick_type: dec.decode_tick_type()?,
        value: dec.decode_float()?,
    })
}

/// TICK_STRING (46).
pub(super) fn decode_tick_string(dec: &mut MessageDecoder) -> Result<IBEvent> {
    dec.skip_field()?;
    Ok(IBEvent::TickString {
        req_id: dec.decode_int()?,
        tick_type: dec.decode_tick_type()?,
        value: dec.decode_string()?,
    })
}

/// TICK_EFP (47).
pub(super) fn decode_tick_efp(dec: &mut MessageDecoder) -> Result<IBEvent> {
    dec.skip_field()?;
    let req_id = dec.decode_int()?;
    let tick_type = dec.decode_tick_type()?;
    let efp = EfpComputation {
        basis_points: dec.decode_float()?,
        formatted_basis_points: dec.decode_string()?,
        implied_futures_price: dec.decode_float()?,
        hold_days: dec.decode_int()?,
        future_last_trade_date: dec.decode_string()?,
        dividend_impact: dec.decode_float()?,
        dividends_to_last_trade_date: dec.decode_float()?,
    };
    Ok(IBEvent::TickEfp { req_id, tick_type, efp })
}

/// TICK_SNAPSHOT_END (57).
pub(super) fn decode_tick_snapshot_end(dec: &mut MessageDecoder) -> Result<IBEvent> {
    dec.skip_field()?;
    Ok(IBEvent::TickSnapshotEnd {
        req_id: dec.decode_int()?,
    })
}

/// TICK_REQ_PARAMS (81).
pub(super) fn decode_tick_req_params(dec: &mut MessageDecoder) -> Result<IBEvent> {
    Ok(IBEvent::TickReqParams {
        req_id: dec.decode_int()?,
        min_tick: dec.decode_float()?,
        bbo_exchange: dec.decode_string()?,
        snapshot_permissions: dec.decode_int()?,
    })
}

/// TICK_NEWS (84).
pub(super) fn decode_tick_news(dec: &mut MessageDecoder) -> Result<IBEvent> {
    Ok(IBEvent::TickNews {
        req_id: dec.decode_int()?,
        timestamp: dec.decode_long()?,
        provider_code: dec.decode_string()?,
        article_id: dec.decode_string()?,
        headline: dec.decode_string_unescaped()?,
        extra_data: dec.decode_string()?,
    })
}

/// MARKET_DATA_TYPE (58).
pub(super) fn decode_market_data_type(dec: &mut MessageDecoder) -> Result<IBEvent> {
    dec.skip_field()?;
    Ok(IBEvent::MarketDataType {
        req_id: dec.decode_int()?,
        market_data_type: dec.decode_int()?,
    })
}

// ============================================================================
// Tick by tick
// ============================================================================

/// TICK_BY_TICK (99). The tick type selects the payload layout:
/// 1/2 last, 3 bid/ask, 4 midpoint.
pub(super) fn decode_tick_by_tick(dec: &mut MessageDecoder) -> Result<IBEvent> {
    let req_id = dec.decode_int()?;
    let tick_type = dec.decode_int()?;
    let time = dec.decode_long()?;

    match tick_type {
        1 | 2 => {
            let price = dec.decode_float()?;
            let size = dec.decode_decimal()?;
            let mask = dec.decode_int()?;
            Ok(IBEvent::TickByTickAllLast {
                req_id,
                tick_type,
                time,
                price,
                size,
                attrib: TickAttribLast {
                    past_limit: mask & 1 != 0,
                    unreported: mask & 2 != 0,
                },
                exchange: dec.decode_string()?,
                special_conditions: dec.decode_string()?,
            })
        }
        3 => {
            let bid_price = dec.decode_float()?;
            let ask_price = dec.decode_float()?;
            let bid_size = dec.decode_decimal()?;
            let ask_size = dec.decode_decimal()?;
            let mask = dec.decode_int()?;
            Ok(IBEvent::TickByTickBidAsk {
                req_id,
                time,
                bid_price,
                ask_price,
                bid_size,
                ask_size,
                attrib: TickAttribBidAsk {
                    bid_past_low: mask & 1 != 0,
                    ask_past_high: mask & 2 != 0,
                },
            })
        }
        4 => Ok(IBEvent::TickByTickMidPoint {
            req_id,
            time,
            mid_point: dec.decode_float()?,
        }),
        other => {
            tracing::warn!(req_id, tick_type = other, "unknown tick-by-tick type");
            Ok(IBEvent::Unknown {
                msg_id: incoming::TICK_BY_TICK,
                data: Vec::new(),
            })
        }
    }
}

// ============================================================================
// Depth and routing
// ============================================================================

/// MARKET_DEPTH (12).
pub(super) fn decode_market_depth(dec: &mut MessageDecoder) -> Result<IBEvent> {
    dec.skip_field()?;
    Ok(IBEvent::UpdateMktDepth {
        req_id: dec.decode_int()?,
        position: dec.decode_int()?,
        operation: dec.decode_int()?,
        side: dec.decode_int()?,
        price: dec.decode_float()?,
        size: dec.decode_decimal()?,
    })
}

/// MARKET_DEPTH_L2 (13).
pub(super) fn decode_market_depth_l2(dec: &mut MessageDecoder) -> Result<IBEvent> {
    dec.skip_field()?;
    let req_id = dec.decode_int()?;
    let position = dec.decode_int()?;
    let market_maker = dec.decode_string()?;
    let operation = dec.decode_int()?;
    let side = dec.decode_int()?;
    let price = dec.decode_float()?;
    let size = dec.decode_decimal()?;
    let is_smart_depth = if dec.server_version() >= server_version::SMART_DEPTH {
        dec.decode_bool()?
    } else {
        false
    };
    Ok(IBEvent::UpdateMktDepthL2 {
        req_id,
        position,
        market_maker,
        operation,
        side,
        price,
        size,
        is_smart_depth,
    })
}

/// MKT_DEPTH_EXCHANGES (80). Older servers send an L2 flag in place of the
/// service data type.
pub(super) fn decode_mkt_depth_exchanges(dec: &mut MessageDecoder) -> Result<IBEvent> {
    let with_service_type = dec.server_version() >= server_version::SERVICE_DATA_TYPE;
    let descriptions = dec.decode_counted(|dec| {
        let mut d = DepthMktDataDescription {
            exchange: dec.decode_string()?,
            sec_type: dec.decode_string()?,
            ..Default::default()
        };
        if with_service_type {
            d.listing_exch = dec.decode_string()?;
            d.service_data_type = dec.decode_string()?;
            d.agg_group = dec.decode_int_show_unset()?;
        } else {
            let is_l2 = dec.decode_bool()?;
            d.service_data_type = if is_l2 { "Deep2" } else { "Deep" }.to_string();
        }
        Ok(d)
    })?;
    Ok(IBEvent::MktDepthExchanges { descriptions })
}

/// REROUTE_MKT_DATA_REQ (91).
pub(super) fn decode_reroute_mkt_data(dec: &mut MessageDecoder) -> Result<IBEvent> {
    Ok(IBEvent::RerouteMktDataReq {
        req_id: dec.decode_int()?,
        con_id: dec.decode_int()?,
        exchange: dec.decode_string()?,
    })
}

/// REROUTE_MKT_DEPTH_REQ (92).
pub(super) fn decode_reroute_mkt_depth(dec: &mut MessageDecoder) -> Result<IBEvent> {
    Ok(IBEvent::RerouteMktDepthReq {
        req_id: dec.decode_int()?,
        con_id: dec.decode_int()?,
        exchange: dec.decode_string()?,
    })
}

/// SMART_COMPONENTS (82).
pub(super) fn decode_smart_components(dec: &mut MessageDecoder) -> Result<IBEvent> {
    let req_id = dec.decode_int()?;
    let components = dec.decode_counted(|dec| {
        Ok(SmartComponent {
            bit_number: dec.decode_int()?,
            exchange: dec.decode_string()?,
            exchange_letter: dec.decode_string()?,
        })
    })?;
    Ok(IBEvent::SmartComponents { req_id, components })
}
