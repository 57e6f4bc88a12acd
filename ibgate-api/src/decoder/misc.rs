//! Session, news, scanner and assorted low-volume messages.

use super::MessageDecoder;
use crate::errors::Result;
use crate::event::{IBEvent, ScannerDataItem};
use crate::models::common::NewsProvider;
use crate::models::contract::ContractDetails;
use crate::protocol::server_version;

// ============================================================================
// Session
// ============================================================================

/// ERR_MSG (4).
pub(super) fn decode_error(dec: &mut MessageDecoder) -> Result<IBEvent> {
    let sv = dec.server_version();
    if sv < server_version::ERROR_TIME {
        dec.skip_field()?; // version
    }
    let req_id = dec.decode_int()?;
    let code = dec.decode_int()?;
    let unescape = sv >= server_version::ENCODE_MSG_ASCII7;
    let message = if unescape {
        dec.decode_string_unescaped()?
    } else {
        dec.decode_string()?
    };
    let advanced_order_reject_json = if sv < server_version::ADVANCED_ORDER_REJECT {
        String::new()
    } else if unescape {
        dec.decode_string_unescaped()?
    } else {
        dec.decode_string()?
    };
    let error_time = if sv >= server_version::ERROR_TIME {
        dec.decode_long()?
    } else {
        0
    };
    Ok(IBEvent::Error {
        req_id,
        error_time,
        code,
        message,
        advanced_order_reject_json,
    })
}

/// NEXT_VALID_ID (9).
pub(super) fn decode_next_valid_id(dec: &mut MessageDecoder) -> Result<IBEvent> {
    dec.skip_field()?;
    Ok(IBEvent::NextValidId {
        order_id: dec.decode_int()?,
    })
}

/// MANAGED_ACCTS (15).
pub(super) fn decode_managed_accounts(dec: &mut MessageDecoder) -> Result<IBEvent> {
    dec.skip_field()?;
    Ok(IBEvent::ManagedAccounts {
        accounts: dec.decode_string()?,
    })
}

/// CURRENT_TIME (49).
pub(super) fn decode_current_time(dec: &mut MessageDecoder) -> Result<IBEvent> {
    dec.skip_field()?;
    Ok(IBEvent::CurrentTime {
        time: dec.decode_long()?,
    })
}

/// CURRENT_TIME_IN_MILLIS (109).
pub(super) fn decode_current_time_in_millis(dec: &mut MessageDecoder) -> Result<IBEvent> {
    Ok(IBEvent::CurrentTimeInMillis {
        time_in_millis: dec.decode_long()?,
    })
}

// ============================================================================
// Scanner
// ============================================================================

/// SCANNER_DATA (20).
pub(super) fn decode_scanner_data(dec: &mut MessageDecoder) -> Result<IBEvent> {
    dec.skip_field()?;
    let req_id = dec.decode_int()?;
    let items = dec.decode_counted(|dec| {
        let rank = dec.decode_int()?;
        let mut details = ContractDetails::default();
        let c = &mut details.contract;
        c.con_id = dec.decode_int()?;
        c.symbol = dec.decode_string()?;
        c.sec_type = dec.decode_enum_opt()?;
        c.last_trade_date_or_contract_month = dec.decode_string()?;
        c.strike = dec.decode_float_show_unset()?;
        c.right = dec.decode_enum_opt()?;
        c.exchange = dec.decode_string()?;
        c.currency = dec.decode_string()?;
        c.local_symbol = dec.decode_string()?;
        details.market_name = dec.decode_string()?;
        details.contract.trading_class = dec.decode_string()?;
        Ok(ScannerDataItem {
            rank,
            contract_details: details,
            distance: dec.decode_string()?,
            benchmark: dec.decode_string()?,
            projection: dec.decode_string()?,
            legs_str: dec.decode_string()?,
        })
    })?;
    Ok(IBEvent::ScannerData { req_id, items })
}

/// SCANNER_PARAMETERS (19).
pub(super) fn decode_scanner_parameters(dec: &mut MessageDecoder) -> Result<IBEvent> {
    dec.skip_field()?;
    Ok(IBEvent::ScannerParameters {
        xml: dec.decode_string()?,
    })
}

// ============================================================================
// News and fundamentals
// ============================================================================

/// NEWS_BULLETINS (14).
pub(super) fn decode_news_bulletin(dec: &mut MessageDecoder) -> Result<IBEvent> {
    dec.skip_field()?;
    Ok(IBEvent::UpdateNewsBulletin {
        msg_id: dec.decode_int()?,
        msg_type: dec.decode_int()?,
        message: dec.decode_string()?,
        origin_exch: dec.decode_string()?,
    })
}

/// NEWS_ARTICLE (83).
pub(super) fn decode_news_article(dec: &mut MessageDecoder) -> Result<IBEvent> {
    Ok(IBEvent::NewsArticle {
        req_id: dec.decode_int()?,
        article_type: dec.decode_int()?,
        article_text: dec.decode_string()?,
    })
}

/// NEWS_PROVIDERS (85).
pub(super) fn decode_news_providers(dec: &mut MessageDecoder) -> Result<IBEvent> {
    let providers = dec.decode_counted(|dec| {
        Ok(NewsProvider {
            code: dec.decode_string()?,
            name: dec.decode_string()?,
        })
    })?;
    Ok(IBEvent::NewsProviders { providers })
}

/// HISTORICAL_NEWS (86).
pub(super) fn decode_historical_news(dec: &mut MessageDecoder) -> Result<IBEvent> {
    Ok(IBEvent::HistoricalNews {
        req_id: dec.decode_int()?,
        time: dec.decode_string()?,
        provider_code: dec.decode_string()?,
        article_id: dec.decode_string()?,
        headline: dec.decode_string_unescaped()?,
    })
}

/// HISTORICAL_NEWS_END (87).
pub(super) fn decode_historical_news_end(dec: &mut MessageDecoder) -> Result<IBEvent> {
    Ok(IBEvent::HistoricalNewsEnd {
        req_id: dec.decode_int()?,
        has_more: dec.decode_bool()?,
    })
}

/// FUNDAMENTAL_DATA (51).
pub(super) fn decode_fundamental_data(dec: &mut MessageDecoder) -> Result<IBEvent> {
    dec.skip_field()?;
    Ok(IBEvent::FundamentalData {
        req_id: dec.decode_int()?,
        data: dec.decode_string()?,
    })
}

// ============================================================================
// Advisors, display groups, verification, WSH, user
// ============================================================================

/// RECEIVE_FA (16).
pub(super) fn decode_receive_fa(dec: &mut MessageDecoder) -> Result<IBEvent> {
    dec.skip_field()?;
    Ok(IBEvent::ReceiveFa {
        fa_data_type: dec.decode_int()?,
        xml: dec.decode_string()?,
    })
}

/// REPLACE_FA_END (103).
pub(super) fn decode_replace_fa_end(dec: &mut MessageDecoder) -> Result<IBEvent> {
    Ok(IBEvent::ReplaceFaEnd {
        req_id: dec.decode_int()?,
        text: dec.decode_string()?,
    })
}

/// DISPLAY_GROUP_LIST (67).
pub(super) fn decode_display_group_list(dec: &mut MessageDecoder) -> Result<IBEvent> {
    dec.skip_field()?;
    Ok(IBEvent::DisplayGroupList {
        req_id: dec.decode_int()?,
        groups: dec.decode_string()?,
    })
}

/// DISPLAY_GROUP_UPDATED (68).
pub(super) fn decode_display_group_updated(dec: &mut MessageDecoder) -> Result<IBEvent> {
    dec.skip_field()?;
    Ok(IBEvent::DisplayGroupUpdated {
        req_id: dec.decode_int()?,
        contract_info: dec.decode_string()?,
    })
}

/// VERIFY_MESSAGE_API (65).
pub(super) fn decode_verify_message_api(dec: &mut MessageDecoder) -> Result<IBEvent> {
    dec.skip_field()?;
    Ok(IBEvent::VerifyMessageApi {
        api_data: dec.decode_string()?,
    })
}

/// VERIFY_COMPLETED (66).
pub(super) fn decode_verify_completed(dec: &mut MessageDecoder) -> Result<IBEvent> {
    dec.skip_field()?;
    Ok(IBEvent::VerifyCompleted {
        is_successful: dec.decode_string()? == "true",
        error_text: dec.decode_string()?,
    })
}

/// VERIFY_AND_AUTH_MESSAGE_API (69).
pub(super) fn decode_verify_and_auth_message_api(dec: &mut MessageDecoder) -> Result<IBEvent> {
    dec.skip_field()?;
    Ok(IBEvent::VerifyAndAuthMessageApi {
        api_data: dec.decode_string()?,
        xyz_challenge: dec.decode_string()?,
    })
}

/// VERIFY_AND_AUTH_COMPLETED (70).
pub(super) fn decode_verify_and_auth_completed(dec: &mut MessageDecoder) -> Result<IBEvent> {
    dec.skip_field()?;
    Ok(IBEvent::VerifyAndAuthCompleted {
        is_successful: dec.decode_string()? == "true",
        error_text: dec.decode_string()?,
    })
}

/// WSH_META_DATA (104).
pub(super) fn decode_wsh_meta_data(dec: &mut MessageDecoder) -> Result<IBEvent> {
    Ok(IBEvent::WshMetaData {
        req_id: dec.decode_int()?,
        data_json: dec.decode_string()?,
    })
}

/// WSH_EVENT_DATA (105).
pub(super) fn decode_wsh_event_data(dec: &mut MessageDecoder) -> Result<IBEvent> {
    Ok(IBEvent::WshEventData {
        req_id: dec.decode_int()?,
        data_json: dec.decode_string()?,
    })
}

/// USER_INFO (107).
pub(super) fn decode_user_info(dec: &mut MessageDecoder) -> Result<IBEvent> {
    Ok(IBEvent::UserInfo {
        req_id: dec.decode_int()?,
        white_branding_id: dec.decode_string()?,
    })
}
