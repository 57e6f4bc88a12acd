//! Contract details, symbol search, option chains and market rules.

use super::MessageDecoder;
use crate::errors::Result;
use crate::event::IBEvent;
use crate::models::common::{IneligibilityReason, PriceIncrement, TagValue};
use crate::models::contract::{
    Contract, ContractDescription, ContractDetails, DeltaNeutralContract, FundDetails,
};
use crate::models::enums::SecType;
use crate::protocol::server_version;

/// Message version of the contract data messages. Newer servers stopped
/// sending it.
fn contract_data_version(dec: &mut MessageDecoder) -> Result<i32> {
    if dec.server_version() < server_version::SIZE_RULES {
        dec.decode_int()
    } else {
        Ok(dec.server_version())
    }
}

/// The expiry field carries up to three space or dash separated parts:
/// date, time and (bonds only) time zone.
fn read_last_trade_date(dec: &mut MessageDecoder, details: &mut ContractDetails, is_bond: bool) -> Result<()> {
    let raw = dec.decode_string()?;
    let mut parts: Vec<&str> = if raw.contains('-') {
        raw.split('-').collect()
    } else {
        raw.split_whitespace().collect()
    };
    parts.retain(|p| !p.is_empty());

    if let Some(date) = parts.first() {
        if is_bond {
            details.bond.maturity = (*date).to_string();
        } else {
            details.contract.last_trade_date_or_contract_month = (*date).to_string();
        }
    }
    if let Some(time) = parts.get(1) {
        details.last_trade_time = (*time).to_string();
    }
    if is_bond {
        if let Some(tz) = parts.get(2) {
            details.time_zone_id = (*tz).to_string();
        }
    }
    Ok(())
}

fn read_sec_id_list(dec: &mut MessageDecoder) -> Result<Vec<TagValue>> {
    dec.decode_counted(|dec| Ok(TagValue::new(dec.decode_string()?, dec.decode_string()?)))
}

fn read_size_rules(dec: &mut MessageDecoder, details: &mut ContractDetails) -> Result<()> {
    if dec.server_version() >= server_version::SIZE_RULES {
        details.min_size = dec.decode_decimal()?;
        details.size_increment = dec.decode_decimal()?;
        details.suggested_size_increment = dec.decode_decimal()?;
    }
    Ok(())
}

fn read_fund_fields(dec: &mut MessageDecoder) -> Result<FundDetails> {
    Ok(FundDetails {
        name: dec.decode_string()?,
        family: dec.decode_string()?,
        kind: dec.decode_string()?,
        front_load: dec.decode_string()?,
        back_load: dec.decode_string()?,
        back_load_time_interval: dec.decode_string()?,
        management_fee: dec.decode_string()?,
        closed: dec.decode_bool()?,
        closed_for_new_investors: dec.decode_bool()?,
        closed_for_new_money: dec.decode_bool()?,
        notify_amount: dec.decode_string()?,
        minimum_initial_purchase: dec.decode_string()?,
        subsequent_minimum_purchase: dec.decode_string()?,
        blue_sky_states: dec.decode_string()?,
        blue_sky_territories: dec.decode_string()?,
        distribution_policy_indicator: dec.decode_enum_opt()?,
        asset_type: dec.decode_enum_opt()?,
    })
}

/// CONTRACT_DATA (10).
pub(super) fn decode_contract_data(dec: &mut MessageDecoder) -> Result<IBEvent> {
    let sv = dec.server_version();
    let version = contract_data_version(dec)?;
    let req_id = if version >= 3 { dec.decode_int()? } else { -1 };

    let mut d = ContractDetails::default();
    d.contract.symbol = dec.decode_string()?;
    d.contract.sec_type = dec.decode_enum_opt()?;
    if sv >= server_version::LAST_TRADE_DATE {
        d.contract.last_trade_date = dec.decode_string()?;
    }
    read_last_trade_date(dec, &mut d, false)?;
    d.contract.strike = dec.decode_float_show_unset()?;
    d.contract.right = dec.decode_enum_opt()?;
    d.contract.exchange = dec.decode_string()?;
    d.contract.currency = dec.decode_string()?;
    d.contract.local_symbol = dec.decode_string()?;
    d.market_name = dec.decode_string()?;
    d.contract.trading_class = dec.decode_string()?;
    d.contract.con_id = dec.decode_int()?;
    d.min_tick = dec.decode_float()?;
    if (server_version::MD_SIZE_MULTIPLIER..server_version::SIZE_RULES).contains(&sv) {
        dec.skip_field()?; // md size multiplier
    }
    d.contract.multiplier = dec.decode_string()?;
    d.order_types = dec.decode_string()?;
    d.valid_exchanges = dec.decode_string()?;
    d.price_magnifier = dec.decode_int()?;
    if version >= 4 {
        d.under_con_id = dec.decode_int()?;
    }
    if version >= 5 {
        d.long_name = if sv >= server_version::ENCODE_MSG_ASCII7 {
            dec.decode_string_unescaped()?
        } else {
            dec.decode_string()?
        };
        d.contract.primary_exchange = dec.decode_string()?;
    }
    if version >= 6 {
        d.contract_month = dec.decode_string()?;
        d.industry = dec.decode_string()?;
        d.category = dec.decode_string()?;
        d.subcategory = dec.decode_string()?;
        d.time_zone_id = dec.decode_string()?;
        d.trading_hours = dec.decode_string()?;
        d.liquid_hours = dec.decode_string()?;
    }
    if version >= 8 {
        d.ev_rule = dec.decode_string()?;
        d.ev_multiplier = dec.decode_float()?;
    }
    if version >= 7 {
        d.sec_id_list = read_sec_id_list(dec)?;
    }
    if sv >= server_version::AGG_GROUP {
        d.agg_group = dec.decode_int_show_unset()?;
    }
    if sv >= server_version::UNDERLYING_INFO {
        d.under_symbol = dec.decode_string()?;
        d.under_sec_type = dec.decode_string()?;
    }
    if sv >= server_version::MARKET_RULES {
        d.market_rule_ids = dec.decode_string()?;
    }
    if sv >= server_version::REAL_EXPIRATION_DATE {
        d.real_expiration_date = dec.decode_string()?;
    }
    if sv >= server_version::STOCK_TYPE {
        d.stock_type = dec.decode_string()?;
    }
    if (server_version::FRACTIONAL_SIZE_SUPPORT..server_version::SIZE_RULES).contains(&sv) {
        dec.skip_field()?; // size min tick
    }
    read_size_rules(dec, &mut d)?;
    if sv >= server_version::FUND_DATA_FIELDS && d.contract.sec_type == Some(SecType::Fund) {
        d.fund = read_fund_fields(dec)?;
    }
    if sv >= server_version::INELIGIBILITY_REASONS {
        d.ineligibility_reasons = dec.decode_counted(|dec| {
            Ok(IneligibilityReason {
                id: dec.decode_string()?,
                description: dec.decode_string()?,
            })
        })?;
    }

    Ok(IBEvent::ContractDetails {
        req_id,
        details: Box::new(d),
    })
}

/// BOND_CONTRACT_DATA (18).
pub(super) fn decode_bond_contract_data(dec: &mut MessageDecoder) -> Result<IBEvent> {
    let sv = dec.server_version();
    let version = contract_data_version(dec)?;
    let req_id = if version >= 3 { dec.decode_int()? } else { -1 };

    let mut d = ContractDetails::default();
    d.contract.symbol = dec.decode_string()?;
    d.contract.sec_type = dec.decode_enum_opt()?;
    d.bond.cusip = dec.decode_string()?;
    d.bond.coupon = dec.decode_float()?;
    if sv >= server_version::LAST_TRADE_DATE {
        d.contract.last_trade_date = dec.decode_string()?;
    }
    read_last_trade_date(dec, &mut d, true)?;
    d.bond.issue_date = dec.decode_string()?;
    d.bond.ratings = dec.decode_string()?;
    d.bond.bond_type = dec.decode_string()?;
    d.bond.coupon_type = dec.decode_string()?;
    d.bond.convertible = dec.decode_bool()?;
    d.bond.callable = dec.decode_bool()?;
    d.bond.putable = dec.decode_bool()?;
    d.bond.desc_append = dec.decode_string()?;
    d.contract.exchange = dec.decode_string()?;
    d.contract.currency = dec.decode_string()?;
    d.market_name = dec.decode_string()?;
    d.contract.trading_class = dec.decode_string()?;
    d.contract.con_id = dec.decode_int()?;
    d.min_tick = dec.decode_float()?;
    if (server_version::MD_SIZE_MULTIPLIER..server_version::SIZE_RULES).contains(&sv) {
        dec.skip_field()?;
    }
    d.order_types = dec.decode_string()?;
    d.valid_exchanges = dec.decode_string()?;
    if version >= 2 {
        d.bond.next_option_date = dec.decode_string()?;
        d.bond.next_option_type = dec.decode_string()?;
        d.bond.next_option_partial = dec.decode_bool()?;
        d.bond.notes = dec.decode_string()?;
    }
    if version >= 4 {
        d.long_name = dec.decode_string()?;
    }
    if sv >= server_version::BOND_TRADING_HOURS {
        d.time_zone_id = dec.decode_string()?;
        d.trading_hours = dec.decode_string()?;
        d.liquid_hours = dec.decode_string()?;
    }
    if version >= 6 {
        d.ev_rule = dec.decode_string()?;
        d.ev_multiplier = dec.decode_float()?;
    }
    if version >= 5 {
        d.sec_id_list = read_sec_id_list(dec)?;
    }
    if sv >= server_version::AGG_GROUP {
        d.agg_group = dec.decode_int_show_unset()?;
    }
    if sv >= server_version::MARKET_RULES {
        d.market_rule_ids = dec.decode_string()?;
    }
    read_size_rules(dec, &mut d)?;

    Ok(IBEvent::BondContractDetails {
        req_id,
        details: Box::new(d),
    })
}

/// CONTRACT_DATA_END (52).
pub(super) fn decode_contract_data_end(dec: &mut MessageDecoder) -> Result<IBEvent> {
    dec.skip_field()?;
    Ok(IBEvent::ContractDetailsEnd {
        req_id: dec.decode_int()?,
    })
}

/// SYMBOL_SAMPLES (79).
pub(super) fn decode_symbol_samples(dec: &mut MessageDecoder) -> Result<IBEvent> {
    let with_issuer = dec.server_version() >= server_version::BOND_ISSUERID;
    let req_id = dec.decode_int()?;
    let descriptions = dec.decode_counted(|dec| {
        let mut contract = Contract {
            con_id: dec.decode_int()?,
            symbol: dec.decode_string()?,
            sec_type: dec.decode_enum_opt()?,
            primary_exchange: dec.decode_string()?,
            currency: dec.decode_string()?,
            ..Default::default()
        };
        let derivative_sec_types = dec.decode_counted(|dec| dec.decode_string())?;
        if with_issuer {
            contract.description = dec.decode_string()?;
            contract.issuer_id = dec.decode_string()?;
        }
        Ok(ContractDescription {
            contract,
            derivative_sec_types,
        })
    })?;
    Ok(IBEvent::SymbolSamples { req_id, descriptions })
}

/// DELTA_NEUTRAL_VALIDATION (56).
pub(super) fn decode_delta_neutral_validation(dec: &mut MessageDecoder) -> Result<IBEvent> {
    dec.skip_field()?;
    Ok(IBEvent::DeltaNeutralValidation {
        req_id: dec.decode_int()?,
        contract: DeltaNeutralContract {
            con_id: dec.decode_int()?,
            delta: dec.decode_float()?,
            price: dec.decode_float()?,
        },
    })
}

/// SECURITY_DEFINITION_OPTION_PARAMETER (75).
pub(super) fn decode_sec_def_opt_params(dec: &mut MessageDecoder) -> Result<IBEvent> {
    Ok(IBEvent::SecurityDefinitionOptionalParameter {
        req_id: dec.decode_int()?,
        exchange: dec.decode_string()?,
        underlying_con_id: dec.decode_int()?,
        trading_class: dec.decode_string()?,
        multiplier: dec.decode_string()?,
        expirations: dec.decode_counted(|dec| dec.decode_string())?,
        strikes: dec.decode_counted(|dec| dec.decode_float())?,
    })
}

/// SECURITY_DEFINITION_OPTION_PARAMETER_END (76).
pub(super) fn decode_sec_def_opt_params_end(dec: &mut MessageDecoder) -> Result<IBEvent> {
    Ok(IBEvent::SecurityDefinitionOptionalParameterEnd {
        req_id: dec.decode_int()?,
    })
}

/// MARKET_RULE (93).
pub(super) fn decode_market_rule(dec: &mut MessageDecoder) -> Result<IBEvent> {
    let market_rule_id = dec.decode_int()?;
    let price_increments = dec.decode_counted(|dec| {
        Ok(PriceIncrement {
            low_edge: dec.decode_float()?,
            increment: dec.decode_float()?,
        })
    })?;
    Ok(IBEvent::MarketRule {
        market_rule_id,
        price_increments,
    })
}
