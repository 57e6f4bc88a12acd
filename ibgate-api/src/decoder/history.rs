//! Historical bars and ticks, real-time bars and histograms.

use super::MessageDecoder;
use crate::errors::Result;
use crate::event::IBEvent;
use crate::models::common::HistogramEntry;
use crate::models::market_data::{
    Bar, HistoricalSession, HistoricalTick, HistoricalTickBidAsk, HistoricalTickLast, RealTimeBar,
    TickAttribBidAsk, TickAttribLast,
};
use crate::protocol::server_version;

/// HISTORICAL_DATA (17).
pub(super) fn decode_historical_data(dec: &mut MessageDecoder) -> Result<IBEvent> {
    let sv = dec.server_version();
    if sv < server_version::SYNT_REALTIME_BARS {
        dec.skip_field()?;
    }
    let req_id = dec.decode_int()?;
    let end = if sv < server_version::HISTORICAL_DATA_END {
        Some((dec.decode_string()?, dec.decode_string()?))
    } else {
        None
    };

    let bars = dec.decode_counted(|dec| {
        let mut bar = Bar {
            time: dec.decode_string()?,
            open: dec.decode_float()?,
            high: dec.decode_float()?,
            low: dec.decode_float()?,
            close: dec.decode_float()?,
            volume: dec.decode_decimal()?,
            wap: dec.decode_decimal()?,
            ..Default::default()
        };
        if sv < server_version::SYNT_REALTIME_BARS {
            dec.skip_field()?; // has gaps
        }
        bar.count = dec.decode_int()?;
        Ok(bar)
    })?;

    Ok(IBEvent::HistoricalData { req_id, bars, end })
}

/// HISTORICAL_DATA_UPDATE (90). Field order differs from the bar list:
/// count first, close before high and low, WAP before volume.
pub(super) fn decode_historical_data_update(dec: &mut MessageDecoder) -> Result<IBEvent> {
    let req_id = dec.decode_int()?;
    let count = dec.decode_int()?;
    let time = dec.decode_string()?;
    let open = dec.decode_float()?;
    let close = dec.decode_float()?;
    let high = dec.decode_float()?;
    let low = dec.decode_float()?;
    let wap = dec.decode_decimal()?;
    let volume = dec.decode_decimal()?;
    Ok(IBEvent::HistoricalDataUpdate {
        req_id,
        bar: Bar {
            time,
            open,
            high,
            low,
            close,
            volume,
            wap,
            count,
        },
    })
}

/// HISTORICAL_DATA_END (108).
pub(super) fn decode_historical_data_end(dec: &mut MessageDecoder) -> Result<IBEvent> {
    Ok(IBEvent::HistoricalDataEnd {
        req_id: dec.decode_int()?,
        start: dec.decode_string()?,
        end: dec.decode_string()?,
    })
}

/// HEAD_TIMESTAMP (88).
pub(super) fn decode_head_timestamp(dec: &mut MessageDecoder) -> Result<IBEvent> {
    Ok(IBEvent::HeadTimestamp {
        req_id: dec.decode_int()?,
        head_timestamp: dec.decode_string()?,
    })
}

/// HISTORICAL_TICKS (96).
pub(super) fn decode_historical_ticks(dec: &mut MessageDecoder) -> Result<IBEvent> {
    let req_id = dec.decode_int()?;
    let ticks = dec.decode_counted(|dec| {
        let time = dec.decode_long()?;
        dec.skip_field()?; // unused
        Ok(HistoricalTick {
            time,
            price: dec.decode_float()?,
            size: dec.decode_decimal()?,
        })
    })?;
    Ok(IBEvent::HistoricalTicks {
        req_id,
        ticks,
        done: dec.decode_bool()?,
    })
}

/// HISTORICAL_TICKS_BID_ASK (97).
pub(super) fn decode_historical_ticks_bid_ask(dec: &mut MessageDecoder) -> Result<IBEvent> {
    let req_id = dec.decode_int()?;
    let ticks = dec.decode_counted(|dec| {
        let time = dec.decode_long()?;
        let mask = dec.decode_int()?;
        Ok(HistoricalTickBidAsk {
            time,
            attrib: TickAttribBidAsk {
                ask_past_high: mask & 1 != 0,
                bid_past_low: mask & 2 != 0,
            },
            price_bid: dec.decode_float()?,
            price_ask: dec.decode_float()?,
            size_bid: dec.decode_decimal()?,
            size_ask: dec.decode_decimal()?,
        })
    })?;
    Ok(IBEvent::HistoricalTicksBidAsk {
        req_id,
        ticks,
        done: dec.decode_bool()?,
    })
}

/// HISTORICAL_TICKS_LAST (98).
pub(super) fn decode_historical_ticks_last(dec: &mut MessageDecoder) -> Result<IBEvent> {
    let req_id = dec.decode_int()?;
    let ticks = dec.decode_counted(|dec| {
        let time = dec.decode_long()?;
        let mask = dec.decode_int()?;
        Ok(HistoricalTickLast {
            time,
            attrib: TickAttribLast {
                past_limit: mask & 1 != 0,
                unreported: mask & 2 != 0,
            },
            price: dec.decode_float()?,
            size: dec.decode_decimal()?,
            exchange: dec.decode_string()?,
            special_conditions: dec.decode_string()?,
        })
    })?;
    Ok(IBEvent::HistoricalTicksLast {
        req_id,
        ticks,
        done: dec.decode_bool()?,
    })
}

/// HISTORICAL_SCHEDULE (106).
pub(super) fn decode_historical_schedule(dec: &mut MessageDecoder) -> Result<IBEvent> {
    Ok(IBEvent::HistoricalSchedule {
        req_id: dec.decode_int()?,
        start_date_time: dec.decode_string()?,
        end_date_time: dec.decode_string()?,
        time_zone: dec.decode_string()?,
        sessions: dec.decode_counted(|dec| {
            Ok(HistoricalSession {
                start_date_time: dec.decode_string()?,
                end_date_time: dec.decode_string()?,
                ref_date: dec.decode_string()?,
            })
        })?,
    })
}

/// REAL_TIME_BARS (50).
pub(super) fn decode_real_time_bar(dec: &mut MessageDecoder) -> Result<IBEvent> {
    dec.skip_field()?;
    Ok(IBEvent::RealtimeBar {
        req_id: dec.decode_int()?,
        bar: RealTimeBar {
            time: dec.decode_long()?,
            open: dec.decode_float()?,
            high: dec.decode_float()?,
            low: dec.decode_float()?,
            close: dec.decode_float()?,
            volume: dec.decode_decimal()?,
            wap: dec.decode_decimal()?,
            count: dec.decode_int()?,
        },
    })
}

/// HISTOGRAM_DATA (89).
pub(super) fn decode_histogram_data(dec: &mut MessageDecoder) -> Result<IBEvent> {
    let req_id = dec.decode_int()?;
    let data = dec.decode_counted(|dec| {
        Ok(HistogramEntry {
            price: dec.decode_float()?,
            size: dec.decode_decimal()?,
        })
    })?;
    Ok(IBEvent::HistogramData { req_id, data })
}
