//! Order status, open and completed orders, executions and commissions.
//!
//! Open and completed orders share most of their layout but differ in a
//! handful of places; the shared groups live in the `read_*` helpers below
//! and each message walks its own sequence of them.

use super::{decode_contract_block, MessageDecoder};
use crate::errors::{IBApiError, Result};
use crate::event::IBEvent;
use crate::models::common::{SoftDollarTier, TagValue};
use crate::models::condition::{
    Comparison, ConditionKind, Conjunction, ContractScope, OrderCondition,
};
use crate::models::contract::{ComboLeg, Contract, DeltaNeutralContract};
use crate::models::enums::{
    AuctionStrategy, ConditionType, LegOpenClose, OrderType, Origin, TriggerMethod,
};
use crate::models::execution::{CommissionAndFeesReport, Execution};
use crate::models::order::{Order, OrderAllocation, OrderState, OrderStatus, PegBenchParams};
use crate::protocol::server_version;

// ============================================================================
// Status and binding
// ============================================================================

/// ORDER_STATUS (3).
pub(super) fn decode_order_status(dec: &mut MessageDecoder) -> Result<IBEvent> {
    let sv = dec.server_version();
    if sv < server_version::MARKET_CAP_PRICE {
        dec.skip_field()?;
    }
    Ok(IBEvent::OrderStatus(OrderStatus {
        order_id: dec.decode_int()?,
        status: dec.decode_string()?,
        filled: dec.decode_decimal()?,
        remaining: dec.decode_decimal()?,
        avg_fill_price: dec.decode_float()?,
        perm_id: dec.decode_long()?,
        parent_id: dec.decode_int()?,
        last_fill_price: dec.decode_float()?,
        client_id: dec.decode_int()?,
        why_held: dec.decode_string()?,
        mkt_cap_price: if sv >= server_version::MARKET_CAP_PRICE {
            dec.decode_float()?
        } else {
            0.0
        },
    }))
}

/// ORDER_BOUND (100).
pub(super) fn decode_order_bound(dec: &mut MessageDecoder) -> Result<IBEvent> {
    Ok(IBEvent::OrderBound {
        perm_id: dec.decode_long()?,
        client_id: dec.decode_int()?,
        order_id: dec.decode_int()?,
    })
}

// ============================================================================
// Shared order field groups
// ============================================================================

/// Action, quantity, type, prices, TIF, OCA group, account, open/close,
/// origin and order ref.
fn read_order_basics(dec: &mut MessageDecoder, order: &mut Order) -> Result<()> {
    order.action = dec.decode_enum_opt()?;
    order.total_quantity = dec.decode_decimal()?;
    order.order_type = dec.decode_enum_opt()?;
    order.lmt_price = dec.decode_float_show_unset()?;
    order.aux_price = dec.decode_float_show_unset()?;
    order.tif = dec.decode_enum_opt()?;
    order.oca_group = dec.decode_string()?;
    order.account = dec.decode_string()?;
    order.open_close = dec.decode_string()?;
    order.origin = dec.decode_int_enum(Origin::Customer)?;
    order.order_ref = dec.decode_string()?;
    Ok(())
}

/// FA params through settling firm, with the short sale block.
fn read_fa_and_short_sale(dec: &mut MessageDecoder, order: &mut Order, version: i32) -> Result<()> {
    let sv = dec.server_version();
    order.fa_group = dec.decode_string()?;
    order.fa_method = dec.decode_string()?;
    order.fa_percentage = dec.decode_string()?;
    if sv < server_version::FA_PROFILE_DESUPPORT {
        dec.skip_field()?; // fa profile
    }
    if sv >= server_version::MODELS_SUPPORT {
        order.model_code = dec.decode_string()?;
    }
    order.good_till_date = dec.decode_string()?;
    order.rule_80a = dec.decode_string()?;
    order.percent_offset = dec.decode_float_show_unset()?;
    order.settling_firm = dec.decode_string()?;

    order.short_sale_slot = dec.decode_int()?;
    order.designated_location = dec.decode_string()?;
    if sv == server_version::SSHORTX_OLD {
        dec.skip_field()?;
    } else if version >= 23 {
        order.exempt_code = dec.decode_int()?;
    }
    Ok(())
}

fn read_box_and_range(dec: &mut MessageDecoder, order: &mut Order) -> Result<()> {
    order.starting_price = dec.decode_float_show_unset()?;
    order.stock_ref_price = dec.decode_float_show_unset()?;
    order.delta = dec.decode_float_show_unset()?;
    order.stock_range_lower = dec.decode_float_show_unset()?;
    order.stock_range_upper = dec.decode_float_show_unset()?;
    Ok(())
}

/// Volatility order params. Completed orders omit the delta-neutral
/// clearing fields and open/close.
fn read_vol_params(
    dec: &mut MessageDecoder,
    order: &mut Order,
    version: i32,
    open_order_attribs: bool,
) -> Result<()> {
    order.volatility = dec.decode_float_show_unset()?;
    order.volatility_type = dec.decode_int_show_unset()?;
    let dn = &mut order.delta_neutral;
    dn.order_type = dec.decode_string()?;
    dn.aux_price = dec.decode_float_show_unset()?;

    if version >= 27 && dn.is_set() {
        dn.con_id = dec.decode_int()?;
        if open_order_attribs {
            dn.settling_firm = dec.decode_string()?;
            dn.clearing_account = dec.decode_string()?;
            dn.clearing_intent = dec.decode_string()?;
        }
    }
    if version >= 31 && dn.is_set() {
        if open_order_attribs {
            dn.open_close = dec.decode_string()?;
        }
        dn.short_sale = dec.decode_bool()?;
        dn.short_sale_slot = dec.decode_int()?;
        dn.designated_location = dec.decode_string()?;
    }

    order.continuous_update = dec.decode_bool()?;
    order.reference_price_type = dec.decode_int_show_unset()?;
    Ok(())
}

fn read_trail_params(dec: &mut MessageDecoder, order: &mut Order, version: i32) -> Result<()> {
    order.trail_stop_price = dec.decode_float_show_unset()?;
    if version >= 30 {
        order.trailing_percent = dec.decode_float_show_unset()?;
    }
    Ok(())
}

fn read_tag_values(dec: &mut MessageDecoder) -> Result<Vec<TagValue>> {
    dec.decode_counted(|dec| Ok(TagValue::new(dec.decode_string()?, dec.decode_string()?)))
}

fn read_combo_legs(
    dec: &mut MessageDecoder,
    contract: &mut Contract,
    order: &mut Order,
    version: i32,
) -> Result<()> {
    contract.combo_legs_descrip = dec.decode_string()?;
    if version < 29 {
        return Ok(());
    }
    contract.combo_legs = dec.decode_counted(|dec| {
        Ok(ComboLeg {
            con_id: dec.decode_int()?,
            ratio: dec.decode_int()?,
            action: dec.decode_enum_opt()?,
            exchange: dec.decode_string()?,
            open_close: dec.decode_int_enum(LegOpenClose::Same)?,
            short_sale_slot: dec.decode_int()?,
            designated_location: dec.decode_string()?,
            exempt_code: dec.decode_int()?,
        })
    })?;
    order.order_combo_legs = dec.decode_counted(|dec| dec.decode_float_show_unset())?;
    Ok(())
}

fn read_scale_params(dec: &mut MessageDecoder, order: &mut Order, version: i32) -> Result<()> {
    let scale = &mut order.scale;
    if version >= 20 {
        scale.init_level_size = dec.decode_int_show_unset()?;
        scale.subs_level_size = dec.decode_int_show_unset()?;
    } else {
        dec.skip_field()?; // num components
        scale.init_level_size = dec.decode_int_show_unset()?;
    }
    scale.price_increment = dec.decode_float_show_unset()?;

    if version >= 28 && scale.has_adjustments() {
        scale.price_adjust_value = dec.decode_float_show_unset()?;
        scale.price_adjust_interval = dec.decode_int_show_unset()?;
        scale.profit_offset = dec.decode_float_show_unset()?;
        scale.auto_reset = dec.decode_bool()?;
        scale.init_position = dec.decode_int_show_unset()?;
        scale.init_fill_qty = dec.decode_int_show_unset()?;
        scale.random_percent = dec.decode_bool()?;
    }
    Ok(())
}

fn read_hedge_params(dec: &mut MessageDecoder, order: &mut Order, version: i32) -> Result<()> {
    if version >= 24 {
        order.hedge_type = dec.decode_string()?;
        if !order.hedge_type.is_empty() {
            order.hedge_param = dec.decode_string()?;
        }
    }
    Ok(())
}

fn read_delta_neutral_contract(
    dec: &mut MessageDecoder,
    contract: &mut Contract,
    version: i32,
) -> Result<()> {
    if version >= 20 && dec.decode_bool()? {
        contract.delta_neutral_contract = Some(DeltaNeutralContract {
            con_id: dec.decode_int()?,
            delta: dec.decode_float()?,
            price: dec.decode_float()?,
        });
    }
    Ok(())
}

fn read_algo_params(dec: &mut MessageDecoder, order: &mut Order, version: i32) -> Result<()> {
    if version >= 21 {
        order.algo_strategy = dec.decode_string()?;
        if !order.algo_strategy.is_empty() {
            order.algo_params = read_tag_values(dec)?;
        }
    }
    Ok(())
}

fn read_randomize_flags(dec: &mut MessageDecoder, order: &mut Order, version: i32) -> Result<()> {
    if version >= 34 {
        order.randomize_size = dec.decode_bool()?;
        order.randomize_price = dec.decode_bool()?;
    }
    Ok(())
}

fn read_peg_bench_params(dec: &mut MessageDecoder, order: &mut Order) -> Result<()> {
    if dec.server_version() >= server_version::PEGGED_TO_BENCHMARK
        && order.order_type == Some(OrderType::PeggedToBenchmark)
    {
        order.peg_bench = PegBenchParams {
            reference_contract_id: dec.decode_int_show_unset()?,
            is_pegged_change_amount_decrease: dec.decode_bool()?,
            pegged_change_amount: dec.decode_float_show_unset()?,
            reference_change_amount: dec.decode_float_show_unset()?,
            reference_exchange_id: dec.decode_string()?,
        };
    }
    Ok(())
}

fn read_conditions(dec: &mut MessageDecoder, order: &mut Order) -> Result<()> {
    if dec.server_version() < server_version::PEGGED_TO_BENCHMARK {
        return Ok(());
    }
    order.conditions = dec.decode_counted(read_condition)?;
    if !order.conditions.is_empty() {
        order.conditions_ignore_rth = dec.decode_bool()?;
        order.conditions_cancel_order = dec.decode_bool()?;
    }
    Ok(())
}

fn read_comparison(dec: &mut MessageDecoder) -> Result<Comparison> {
    Ok(Comparison {
        is_more: dec.decode_bool()?,
        value: dec.decode_string()?,
    })
}

fn read_scope(dec: &mut MessageDecoder) -> Result<ContractScope> {
    Ok(ContractScope {
        con_id: dec.decode_int()?,
        exchange: dec.decode_string()?,
    })
}

/// One condition: type code, conjunction, then the kind's own fields.
fn read_condition(dec: &mut MessageDecoder) -> Result<OrderCondition> {
    let raw = dec.decode_int()?;
    let condition_type = ConditionType::try_from(raw)
        .map_err(|code| IBApiError::Decoding(format!("unknown order condition type {code}")))?;
    let conjunction = Conjunction::from_wire(&dec.decode_string()?);

    let kind = match condition_type {
        ConditionType::Price => ConditionKind::Price {
            comparison: read_comparison(dec)?,
            scope: read_scope(dec)?,
            trigger_method: dec.decode_int_enum(TriggerMethod::Default)?,
        },
        ConditionType::Time => ConditionKind::Time {
            comparison: read_comparison(dec)?,
        },
        ConditionType::Margin => ConditionKind::Margin {
            comparison: read_comparison(dec)?,
        },
        ConditionType::Execution => ConditionKind::Execution {
            sec_type: dec.decode_string()?,
            exchange: dec.decode_string()?,
            symbol: dec.decode_string()?,
        },
        ConditionType::Volume => ConditionKind::Volume {
            comparison: read_comparison(dec)?,
            scope: read_scope(dec)?,
        },
        ConditionType::PercentChange => ConditionKind::PercentChange {
            comparison: read_comparison(dec)?,
            scope: read_scope(dec)?,
        },
    };
    Ok(OrderCondition { conjunction, kind })
}

/// What-if margins, commissions and the full preview block.
fn read_order_state_preview(dec: &mut MessageDecoder, state: &mut OrderState) -> Result<()> {
    let sv = dec.server_version();
    if sv >= server_version::WHAT_IF_EXT_FIELDS {
        state.init_margin_before = dec.decode_string()?;
        state.maint_margin_before = dec.decode_string()?;
        state.equity_with_loan_before = dec.decode_string()?;
        state.init_margin_change = dec.decode_string()?;
        state.maint_margin_change = dec.decode_string()?;
        state.equity_with_loan_change = dec.decode_string()?;
    }
    state.init_margin_after = dec.decode_string()?;
    state.maint_margin_after = dec.decode_string()?;
    state.equity_with_loan_after = dec.decode_string()?;
    state.commission_and_fees = dec.decode_float_show_unset()?;
    state.min_commission_and_fees = dec.decode_float_show_unset()?;
    state.max_commission_and_fees = dec.decode_float_show_unset()?;
    state.commission_and_fees_currency = dec.decode_string()?;

    if sv >= server_version::FULL_ORDER_PREVIEW_FIELDS {
        state.margin_currency = dec.decode_string()?;
        state.outside_rth_margins = dec.decode_list(9, |dec| dec.decode_float_show_unset())?;
        state.suggested_size = dec.decode_decimal()?;
        state.reject_reason = dec.decode_string()?;
        state.order_allocations = dec.decode_counted(|dec| {
            Ok(OrderAllocation {
                account: dec.decode_string()?,
                position: dec.decode_decimal()?,
                position_desired: dec.decode_decimal()?,
                position_after: dec.decode_decimal()?,
                desired_alloc_qty: dec.decode_decimal()?,
                allowed_alloc_qty: dec.decode_decimal()?,
                is_monetary: dec.decode_bool()?,
            })
        })?;
    }
    state.warning_text = dec.decode_string()?;
    Ok(())
}

fn read_peg_best_mid(dec: &mut MessageDecoder, order: &mut Order) -> Result<()> {
    if dec.server_version() >= server_version::PEGBEST_PEGMID_OFFSETS {
        order.min_trade_qty = dec.decode_int_show_unset()?;
        order.min_compete_size = dec.decode_int_show_unset()?;
        order.compete_against_best_offset = dec.decode_float_show_unset()?;
        order.mid_offset_at_whole = dec.decode_float_show_unset()?;
        order.mid_offset_at_half = dec.decode_float_show_unset()?;
    }
    Ok(())
}

// ============================================================================
// Open and completed orders
// ============================================================================

/// OPEN_ORDER (5).
pub(super) fn decode_open_order(dec: &mut MessageDecoder) -> Result<IBEvent> {
    let sv = dec.server_version();
    let version = if sv < server_version::ORDER_CONTAINER {
        dec.decode_int()?
    } else {
        sv
    };

    let mut order = Order {
        order_id: dec.decode_int()?,
        ..Default::default()
    };
    let mut contract = decode_contract_block(dec)?;
    let mut state = OrderState::default();

    read_order_basics(dec, &mut order)?;
    order.client_id = dec.decode_int()?;
    order.perm_id = dec.decode_long()?;
    order.outside_rth = dec.decode_bool()?;
    order.hidden = dec.decode_bool()?;
    order.discretionary_amt = dec.decode_float()?;
    order.good_after_time = dec.decode_string()?;
    dec.skip_field()?; // shares allocation

    read_fa_and_short_sale(dec, &mut order, version)?;
    order.auction_strategy = dec.decode_int_enum(AuctionStrategy::Unset)?;
    read_box_and_range(dec, &mut order)?;

    order.display_size = dec.decode_int()?;
    order.block_order = dec.decode_bool()?;
    order.sweep_to_fill = dec.decode_bool()?;
    order.all_or_none = dec.decode_bool()?;
    order.min_qty = dec.decode_int_show_unset()?;
    order.oca_type = dec.decode_int()?;
    dec.skip_fields(3)?; // e-trade only, firm quote only, NBBO price cap
    order.parent_id = dec.decode_int()?;
    order.trigger_method = dec.decode_int()?;

    read_vol_params(dec, &mut order, version, true)?;
    read_trail_params(dec, &mut order, version)?;
    order.basis_points = dec.decode_float_show_unset()?;
    order.basis_points_type = dec.decode_int_show_unset()?;
    read_combo_legs(dec, &mut contract, &mut order, version)?;
    if version >= 26 {
        order.smart_combo_routing_params = read_tag_values(dec)?;
    }
    read_scale_params(dec, &mut order, version)?;
    read_hedge_params(dec, &mut order, version)?;
    if version >= 25 {
        order.opt_out_smart_routing = dec.decode_bool()?;
    }
    order.clearing_account = dec.decode_string()?;
    order.clearing_intent = dec.decode_string()?;
    if version >= 22 {
        order.not_held = dec.decode_bool()?;
    }
    read_delta_neutral_contract(dec, &mut contract, version)?;
    read_algo_params(dec, &mut order, version)?;
    if version >= 33 {
        order.solicited = dec.decode_bool()?;
    }

    order.what_if = dec.decode_bool()?;
    state.status = dec.decode_string()?;
    read_order_state_preview(dec, &mut state)?;

    read_randomize_flags(dec, &mut order, version)?;
    read_peg_bench_params(dec, &mut order)?;
    read_conditions(dec, &mut order)?;

    if sv >= server_version::PEGGED_TO_BENCHMARK {
        order.adjusted.order_type = dec.decode_string()?;
        order.trigger_price = dec.decode_float_show_unset()?;
        order.trail_stop_price = dec.decode_float_show_unset()?;
        order.lmt_price_offset = dec.decode_float_show_unset()?;
        order.adjusted.stop_price = dec.decode_float_show_unset()?;
        order.adjusted.stop_limit_price = dec.decode_float_show_unset()?;
        order.adjusted.trailing_amount = dec.decode_float_show_unset()?;
        order.adjusted.trailing_unit = dec.decode_int_show_unset()?;
    }
    if sv >= server_version::SOFT_DOLLAR_TIER {
        order.soft_dollar_tier = SoftDollarTier {
            name: dec.decode_string()?,
            value: dec.decode_string()?,
            display_name: dec.decode_string()?,
        };
    }
    if sv >= server_version::CASH_QTY {
        order.cash_qty = dec.decode_float_show_unset()?;
    }
    if sv >= server_version::AUTO_PRICE_FOR_HEDGE {
        order.dont_use_auto_price_for_hedge = dec.decode_bool()?;
    }
    if sv >= server_version::ORDER_CONTAINER {
        order.is_oms_container = dec.decode_bool()?;
    }
    if sv >= server_version::D_PEG_ORDERS {
        order.discretionary_up_to_limit_price = dec.decode_bool()?;
    }
    if sv >= server_version::PRICE_MGMT_ALGO {
        order.use_price_mgmt_algo = Some(dec.decode_bool()?);
    }
    if sv >= server_version::DURATION {
        order.duration = dec.decode_int_show_unset()?;
    }
    if sv >= server_version::POST_TO_ATS {
        order.post_to_ats = dec.decode_int_show_unset()?;
    }
    if sv >= server_version::AUTO_CANCEL_PARENT {
        order.auto_cancel_parent = dec.decode_bool()?;
    }
    read_peg_best_mid(dec, &mut order)?;
    if sv >= server_version::CUSTOMER_ACCOUNT {
        order.customer_account = dec.decode_string()?;
    }
    if sv >= server_version::PROFESSIONAL_CUSTOMER {
        order.professional_customer = dec.decode_bool()?;
    }
    if sv >= server_version::BOND_ACCRUED_INTEREST {
        order.bond_accrued_interest = dec.decode_string()?;
    }
    if sv >= server_version::INCLUDE_OVERNIGHT {
        order.include_overnight = dec.decode_bool()?;
    }
    if sv >= server_version::CME_TAGGING_FIELDS_IN_OPEN_ORDER {
        order.ext_operator = dec.decode_string()?;
        order.manual_order_indicator = dec.decode_int_show_unset()?;
    }
    if sv >= server_version::SUBMITTER {
        order.submitter = dec.decode_string()?;
    }
    if sv >= server_version::IMBALANCE_ONLY {
        order.imbalance_only = dec.decode_bool()?;
    }

    Ok(IBEvent::OpenOrder {
        order_id: order.order_id,
        contract: Box::new(contract),
        order: Box::new(order),
        order_state: Box::new(state),
    })
}

/// COMPLETED_ORDER (101). Carries no message version; every versioned
/// group is present.
pub(super) fn decode_completed_order(dec: &mut MessageDecoder) -> Result<IBEvent> {
    let sv = dec.server_version();
    let version = i32::MAX;

    let mut contract = decode_contract_block(dec)?;
    let mut order = Order::default();
    let mut state = OrderState::default();

    read_order_basics(dec, &mut order)?;
    order.perm_id = dec.decode_long()?;
    order.outside_rth = dec.decode_bool()?;
    order.hidden = dec.decode_bool()?;
    order.discretionary_amt = dec.decode_float()?;
    order.good_after_time = dec.decode_string()?;

    read_fa_and_short_sale(dec, &mut order, version)?;
    read_box_and_range(dec, &mut order)?;

    order.display_size = dec.decode_int()?;
    order.sweep_to_fill = dec.decode_bool()?;
    order.all_or_none = dec.decode_bool()?;
    order.min_qty = dec.decode_int_show_unset()?;
    order.oca_type = dec.decode_int()?;
    order.trigger_method = dec.decode_int()?;

    read_vol_params(dec, &mut order, version, false)?;
    read_trail_params(dec, &mut order, version)?;
    read_combo_legs(dec, &mut contract, &mut order, version)?;
    order.smart_combo_routing_params = read_tag_values(dec)?;
    read_scale_params(dec, &mut order, version)?;
    read_hedge_params(dec, &mut order, version)?;
    order.clearing_account = dec.decode_string()?;
    order.clearing_intent = dec.decode_string()?;
    order.not_held = dec.decode_bool()?;
    read_delta_neutral_contract(dec, &mut contract, version)?;
    read_algo_params(dec, &mut order, version)?;
    order.solicited = dec.decode_bool()?;
    state.status = dec.decode_string()?;

    read_randomize_flags(dec, &mut order, version)?;
    read_peg_bench_params(dec, &mut order)?;
    read_conditions(dec, &mut order)?;

    order.trail_stop_price = dec.decode_float_show_unset()?;
    order.lmt_price_offset = dec.decode_float_show_unset()?;
    if sv >= server_version::CASH_QTY {
        order.cash_qty = dec.decode_float_show_unset()?;
    }
    if sv >= server_version::AUTO_PRICE_FOR_HEDGE {
        order.dont_use_auto_price_for_hedge = dec.decode_bool()?;
    }
    if sv >= server_version::ORDER_CONTAINER {
        order.is_oms_container = dec.decode_bool()?;
    }
    order.auto_cancel_date = dec.decode_string()?;
    order.filled_quantity = dec.decode_decimal()?;
    order.ref_futures_con_id = dec.decode_int_show_unset()?;
    order.auto_cancel_parent = dec.decode_bool()?;
    order.shareholder = dec.decode_string()?;
    order.imbalance_only = dec.decode_bool()?;
    order.route_marketable_to_bbo = dec.decode_bool()?;
    order.parent_perm_id = dec.decode_long_show_unset()?;
    state.completed_time = dec.decode_string()?;
    state.completed_status = dec.decode_string()?;

    read_peg_best_mid(dec, &mut order)?;
    if sv >= server_version::CUSTOMER_ACCOUNT {
        order.customer_account = dec.decode_string()?;
    }
    if sv >= server_version::PROFESSIONAL_CUSTOMER {
        order.professional_customer = dec.decode_bool()?;
    }
    if sv >= server_version::SUBMITTER {
        order.submitter = dec.decode_string()?;
    }

    Ok(IBEvent::CompletedOrder {
        contract: Box::new(contract),
        order: Box::new(order),
        order_state: Box::new(state),
    })
}

// ============================================================================
// Executions
// ============================================================================

/// EXECUTION_DATA (11).
pub(super) fn decode_execution_data(dec: &mut MessageDecoder) -> Result<IBEvent> {
    let sv = dec.server_version();
    let version = if sv < server_version::LAST_LIQUIDITY {
        dec.decode_int()?
    } else {
        sv
    };
    let req_id = if version >= 7 { dec.decode_int()? } else { -1 };
    let order_id = dec.decode_int()?;

    let mut contract = Contract::default();
    if version >= 5 {
        contract.con_id = dec.decode_int()?;
    }
    contract.symbol = dec.decode_string()?;
    contract.sec_type = dec.decode_enum_opt()?;
    contract.last_trade_date_or_contract_month = dec.decode_string()?;
    contract.strike = dec.decode_float_show_unset()?;
    contract.right = dec.decode_enum_opt()?;
    if version >= 9 {
        contract.multiplier = dec.decode_string()?;
    }
    contract.exchange = dec.decode_string()?;
    contract.currency = dec.decode_string()?;
    contract.local_symbol = dec.decode_string()?;
    if version >= 10 {
        contract.trading_class = dec.decode_string()?;
    }

    let mut exec = Execution {
        order_id,
        exec_id: dec.decode_string()?,
        time: dec.decode_string()?,
        acct_number: dec.decode_string()?,
        exchange: dec.decode_string()?,
        side: dec.decode_string()?,
        shares: dec.decode_decimal()?,
        price: dec.decode_float()?,
        ..Default::default()
    };
    if version >= 2 {
        exec.perm_id = dec.decode_long()?;
    }
    if version >= 3 {
        exec.client_id = dec.decode_int()?;
    }
    if version >= 4 {
        exec.liquidation = dec.decode_int()?;
    }
    if version >= 6 {
        exec.cum_qty = dec.decode_decimal()?;
        exec.avg_price = dec.decode_float()?;
    }
    if version >= 8 {
        exec.order_ref = dec.decode_string()?;
    }
    if version >= 9 {
        exec.ev_rule = dec.decode_string()?;
        exec.ev_multiplier = dec.decode_float()?;
    }
    if sv >= server_version::MODELS_SUPPORT {
        exec.model_code = dec.decode_string()?;
    }
    if sv >= server_version::LAST_LIQUIDITY {
        exec.last_liquidity = dec.decode_int()?;
    }
    if sv >= server_version::PENDING_PRICE_REVISION {
        exec.pending_price_revision = dec.decode_bool()?;
    }
    if sv >= server_version::SUBMITTER {
        exec.submitter = dec.decode_string()?;
    }

    Ok(IBEvent::ExecDetails {
        req_id,
        contract: Box::new(contract),
        execution: Box::new(exec),
    })
}

/// EXECUTION_DATA_END (55).
pub(super) fn decode_execution_data_end(dec: &mut MessageDecoder) -> Result<IBEvent> {
    dec.skip_field()?;
    Ok(IBEvent::ExecDetailsEnd {
        req_id: dec.decode_int()?,
    })
}

/// COMMISSION_AND_FEES_REPORT (59).
pub(super) fn decode_commission_report(dec: &mut MessageDecoder) -> Result<IBEvent> {
    dec.skip_field()?;
    Ok(IBEvent::CommissionAndFeesReport(CommissionAndFeesReport {
        exec_id: dec.decode_string()?,
        commission_and_fees: dec.decode_float()?,
        currency: dec.decode_string()?,
        realized_pnl: dec.decode_float_show_unset()?,
        yield_amount: dec.decode_float_show_unset()?,
        yield_redemption_date: dec.decode_int()?,
    }))
}
