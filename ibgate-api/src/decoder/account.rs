//! Account values, portfolio, positions and P&L.

use super::{decode_contract_block, MessageDecoder};
use crate::errors::Result;
use crate::event::IBEvent;
use crate::models::account::{PortfolioItem, Position};
use crate::models::common::{FamilyCode, SoftDollarTier};
use crate::models::contract::Contract;
use crate::protocol::server_version;

/// ACCT_VALUE (6).
pub(super) fn decode_account_value(dec: &mut MessageDecoder) -> Result<IBEvent> {
    let version = dec.decode_int()?;
    Ok(IBEvent::UpdateAccountValue {
        key: dec.decode_string()?,
        value: dec.decode_string()?,
        currency: dec.decode_string()?,
        account_name: if version >= 2 {
            dec.decode_string()?
        } else {
            String::new()
        },
    })
}

/// PORTFOLIO_VALUE (7).
pub(super) fn decode_portfolio_value(dec: &mut MessageDecoder) -> Result<IBEvent> {
    let version = dec.decode_int()?;

    let mut contract = Contract::default();
    if version >= 6 {
        contract.con_id = dec.decode_int()?;
    }
    contract.symbol = dec.decode_string()?;
    contract.sec_type = dec.decode_enum_opt()?;
    contract.last_trade_date_or_contract_month = dec.decode_string()?;
    contract.strike = dec.decode_float_show_unset()?;
    contract.right = dec.decode_enum_opt()?;
    if version >= 7 {
        contract.multiplier = dec.decode_string()?;
        contract.primary_exchange = dec.decode_string()?;
    }
    contract.currency = dec.decode_string()?;
    if version >= 2 {
        contract.local_symbol = dec.decode_string()?;
    }
    if version >= 8 {
        contract.trading_class = dec.decode_string()?;
    }

    let mut item = PortfolioItem {
        position: dec.decode_decimal()?,
        market_price: dec.decode_float()?,
        market_value: dec.decode_float()?,
        ..Default::default()
    };
    if version >= 3 {
        item.average_cost = dec.decode_float()?;
        item.unrealized_pnl = dec.decode_float()?;
        item.realized_pnl = dec.decode_float()?;
    }
    if version >= 4 {
        item.account_name = dec.decode_string()?;
    }
    item.contract = contract;
    Ok(IBEvent::UpdatePortfolio(Box::new(item)))
}

/// ACCT_UPDATE_TIME (8).
pub(super) fn decode_account_update_time(dec: &mut MessageDecoder) -> Result<IBEvent> {
    dec.skip_field()?;
    Ok(IBEvent::UpdateAccountTime {
        timestamp: dec.decode_string()?,
    })
}

/// ACCT_DOWNLOAD_END (54).
pub(super) fn decode_account_download_end(dec: &mut MessageDecoder) -> Result<IBEvent> {
    dec.skip_field()?;
    Ok(IBEvent::AccountDownloadEnd {
        account: dec.decode_string()?,
    })
}

/// ACCOUNT_SUMMARY (63).
pub(super) fn decode_account_summary(dec: &mut MessageDecoder) -> Result<IBEvent> {
    dec.skip_field()?;
    Ok(IBEvent::AccountSummary {
        req_id: dec.decode_int()?,
        account: dec.decode_string()?,
        tag: dec.decode_string()?,
        value: dec.decode_string()?,
        currency: dec.decode_string()?,
    })
}

/// ACCOUNT_SUMMARY_END (64).
pub(super) fn decode_account_summary_end(dec: &mut MessageDecoder) -> Result<IBEvent> {
    dec.skip_field()?;
    Ok(IBEvent::AccountSummaryEnd {
        req_id: dec.decode_int()?,
    })
}

/// POSITION_DATA (61).
pub(super) fn decode_position(dec: &mut MessageDecoder) -> Result<IBEvent> {
    let version = dec.decode_int()?;
    let account = dec.decode_string()?;
    let contract = decode_contract_block(dec)?;
    let position = dec.decode_decimal()?;
    let avg_cost = if version >= 3 { dec.decode_float()? } else { 0.0 };
    Ok(IBEvent::Position(Box::new(Position {
        account,
        contract,
        position,
        avg_cost,
    })))
}

/// POSITION_MULTI (71).
pub(super) fn decode_position_multi(dec: &mut MessageDecoder) -> Result<IBEvent> {
    dec.skip_field()?;
    let req_id = dec.decode_int()?;
    let account = dec.decode_string()?;
    let contract = decode_contract_block(dec)?;
    Ok(IBEvent::PositionMulti {
        req_id,
        account,
        contract: Box::new(contract),
        position: dec.decode_decimal()?,
        avg_cost: dec.decode_float()?,
        model_code: dec.decode_string()?,
    })
}

/// POSITION_MULTI_END (72).
pub(super) fn decode_position_multi_end(dec: &mut MessageDecoder) -> Result<IBEvent> {
    dec.skip_field()?;
    Ok(IBEvent::PositionMultiEnd {
        req_id: dec.decode_int()?,
    })
}

/// ACCOUNT_UPDATE_MULTI (73).
pub(super) fn decode_account_update_multi(dec: &mut MessageDecoder) -> Result<IBEvent> {
    dec.skip_field()?;
    Ok(IBEvent::AccountUpdateMulti {
        req_id: dec.decode_int()?,
        account: dec.decode_string()?,
        model_code: dec.decode_string()?,
        key: dec.decode_string()?,
        value: dec.decode_string()?,
        currency: dec.decode_string()?,
    })
}

/// ACCOUNT_UPDATE_MULTI_END (74).
pub(super) fn decode_account_update_multi_end(dec: &mut MessageDecoder) -> Result<IBEvent> {
    dec.skip_field()?;
    Ok(IBEvent::AccountUpdateMultiEnd {
        req_id: dec.decode_int()?,
    })
}

/// Unrealized and realized P&L joined the P&L messages in later versions.
fn pnl_tail(dec: &mut MessageDecoder) -> Result<(Option<f64>, Option<f64>)> {
    let sv = dec.server_version();
    let unrealized = if sv >= server_version::UNREALIZED_PNL {
        dec.decode_float_show_unset()?
    } else {
        None
    };
    let realized = if sv >= server_version::REALIZED_PNL {
        dec.decode_float_show_unset()?
    } else {
        None
    };
    Ok((unrealized, realized))
}

/// PNL (94).
pub(super) fn decode_pnl(dec: &mut MessageDecoder) -> Result<IBEvent> {
    let req_id = dec.decode_int()?;
    let daily_pnl = dec.decode_float()?;
    let (unrealized_pnl, realized_pnl) = pnl_tail(dec)?;
    Ok(IBEvent::Pnl {
        req_id,
        daily_pnl,
        unrealized_pnl,
        realized_pnl,
    })
}

/// PNL_SINGLE (95).
pub(super) fn decode_pnl_single(dec: &mut MessageDecoder) -> Result<IBEvent> {
    let req_id = dec.decode_int()?;
    let position = dec.decode_decimal()?;
    let daily_pnl = dec.decode_float()?;
    let (unrealized_pnl, realized_pnl) = pnl_tail(dec)?;
    Ok(IBEvent::PnlSingle {
        req_id,
        position,
        daily_pnl,
        unrealized_pnl,
        realized_pnl,
        value: dec.decode_float()?,
    })
}

/// FAMILY_CODES (78).
pub(super) fn decode_family_codes(dec: &mut MessageDecoder) -> Result<IBEvent> {
    let codes = dec.decode_counted(|dec| {
        Ok(FamilyCode {
            account_id: dec.decode_string()?,
            family_code: dec.decode_string()?,
        })
    })?;
    Ok(IBEvent::FamilyCodes { codes })
}

/// SOFT_DOLLAR_TIERS (77).
pub(super) fn decode_soft_dollar_tiers(dec: &mut MessageDecoder) -> Result<IBEvent> {
    let req_id = dec.decode_int()?;
    let tiers = dec.decode_counted(|dec| {
        Ok(SoftDollarTier {
            name: dec.decode_string()?,
            value: dec.decode_string()?,
            display_name: dec.decode_string()?,
        })
    })?;
    Ok(IBEvent::SoftDollarTiers { req_id, tiers })
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::super::decode_server_msg;
    use super::super::tests::fields;
    use crate::event::IBEvent;
    use crate::models::enums::SecType;

    #[test]
    fn portfolio_row() {
        let data = fields(&[
            "7", "8", "265598", "AAPL", "STK", "", "0", "", "", "NASDAQ", "USD", "AAPL", "NMS",
            "100", "185.5", "18550", "150.0", "3550", "0", "DU123",
        ]);
        match decode_server_msg(&data, 176).unwrap() {
            IBEvent::UpdatePortfolio(item) => {
                assert_eq!(item.contract.con_id, 265598);
                assert_eq!(item.contract.sec_type, Some(SecType::Stock));
                assert_eq!(item.contract.primary_exchange, "NASDAQ");
                assert_eq!(item.contract.strike, Some(0.0));
                assert_eq!(item.position, Some(Decimal::from(100)));
                assert_eq!(item.unrealized_pnl, 3550.0);
                assert_eq!(item.account_name, "DU123");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn position_with_fractional_size() {
        let data = fields(&[
            "61", "3", "DU123",
            "265598", "AAPL", "STK", "", "", "", "", "SMART", "USD", "AAPL", "NMS",
            "0.5", "180.25",
        ]);
        match decode_server_msg(&data, 176).unwrap() {
            IBEvent::Position(pos) => {
                assert_eq!(pos.account, "DU123");
                assert_eq!(pos.position, Some(Decimal::new(5, 1)));
                assert_eq!(pos.avg_cost, 180.25);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn pnl_unset_values() {
        let data = fields(&["94", "3", "12.5", "1.7976931348623157E308", "4.0"]);
        match decode_server_msg(&data, 176).unwrap() {
            IBEvent::Pnl { req_id, daily_pnl, unrealized_pnl, realized_pnl } => {
                assert_eq!(req_id, 3);
                assert_eq!(daily_pnl, 12.5);
                assert_eq!(unrealized_pnl, None);
                assert_eq!(realized_pnl, Some(4.0));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
