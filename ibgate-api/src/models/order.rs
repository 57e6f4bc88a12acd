//! Orders, their server-side state, and cancel parameters.
//!
//! Fields the server may leave unset are `Option`; an unset value goes out
//! on the wire as an empty field.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::common::{SoftDollarTier, TagValue};
use super::condition::OrderCondition;
use super::enums::{Action, AuctionStrategy, OrderType, Origin, TimeInForce};

/// An order ticket.
///
/// Blocks that travel together on the wire, and are only meaningful
/// together, are grouped: [`DeltaNeutralOrder`], [`ScaleParams`],
/// [`PegBenchParams`], [`AdjustedOrder`] and [`Mifid2`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Order {
    pub order_id: i32,
    pub client_id: i32,
    pub perm_id: i64,
    pub parent_id: i32,
    pub parent_perm_id: Option<i64>,

    pub action: Option<Action>,
    pub total_quantity: Option<Decimal>,
    pub order_type: Option<OrderType>,
    pub lmt_price: Option<f64>,
    pub aux_price: Option<f64>,
    pub tif: Option<TimeInForce>,
    pub cash_qty: Option<f64>,
    pub filled_quantity: Option<Decimal>,

    // Timing and routing
    pub active_start_time: String,
    pub active_stop_time: String,
    pub good_after_time: String,
    pub good_till_date: String,
    pub duration: Option<i32>,
    pub oca_group: String,
    pub oca_type: i32,
    pub order_ref: String,
    pub transmit: bool,
    pub block_order: bool,
    pub sweep_to_fill: bool,
    pub display_size: i32,
    pub trigger_method: i32,
    pub outside_rth: bool,
    pub hidden: bool,
    pub include_overnight: bool,
    pub rule_80a: String,
    pub all_or_none: bool,
    pub min_qty: Option<i32>,
    pub percent_offset: Option<f64>,
    pub override_percentage_constraints: bool,
    pub trail_stop_price: Option<f64>,
    pub trailing_percent: Option<f64>,
    pub post_to_ats: Option<i32>,
    pub route_marketable_to_bbo: bool,
    pub imbalance_only: bool,

    // Advisor allocation
    pub fa_group: String,
    pub fa_method: String,
    pub fa_percentage: String,
    pub model_code: String,

    // Institutional and clearing
    pub open_close: String,
    pub origin: Origin,
    pub short_sale_slot: i32,
    pub designated_location: String,
    pub exempt_code: i32,
    pub settling_firm: String,
    pub account: String,
    pub clearing_account: String,
    pub clearing_intent: String,
    pub customer_account: String,
    pub professional_customer: bool,
    pub shareholder: String,

    // BOX auctions and stock-pegged options
    pub discretionary_amt: f64,
    pub discretionary_up_to_limit_price: bool,
    pub auction_strategy: AuctionStrategy,
    pub starting_price: Option<f64>,
    pub stock_ref_price: Option<f64>,
    pub delta: Option<f64>,
    pub stock_range_lower: Option<f64>,
    pub stock_range_upper: Option<f64>,
    pub randomize_size: bool,
    pub randomize_price: bool,

    pub volatility: Option<f64>,
    pub volatility_type: Option<i32>,
    pub continuous_update: bool,
    pub reference_price_type: Option<i32>,
    pub delta_neutral: DeltaNeutralOrder,

    pub basis_points: Option<f64>,
    pub basis_points_type: Option<i32>,
    /// Per-leg limit prices of a combo order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub order_combo_legs: Vec<Option<f64>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub smart_combo_routing_params: Vec<TagValue>,

    pub scale: ScaleParams,

    pub hedge_type: String,
    pub hedge_param: String,
    pub dont_use_auto_price_for_hedge: bool,

    pub algo_strategy: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub algo_params: Vec<TagValue>,
    pub algo_id: String,

    pub what_if: bool,
    pub not_held: bool,
    pub solicited: bool,
    pub opt_out_smart_routing: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub order_misc_options: Vec<TagValue>,

    pub peg_bench: PegBenchParams,
    pub adjusted: AdjustedOrder,
    pub trigger_price: Option<f64>,
    pub lmt_price_offset: Option<f64>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<OrderCondition>,
    pub conditions_ignore_rth: bool,
    pub conditions_cancel_order: bool,

    pub ext_operator: String,
    pub soft_dollar_tier: SoftDollarTier,
    pub mifid2: Mifid2,

    pub is_oms_container: bool,
    pub auto_cancel_date: String,
    pub auto_cancel_parent: bool,
    pub ref_futures_con_id: Option<i32>,
    /// `None` leaves the choice to the server.
    pub use_price_mgmt_algo: Option<bool>,
    pub advanced_error_override: String,
    pub manual_order_time: String,
    pub manual_order_indicator: Option<i32>,

    // PEG BEST / PEG MID and IBKRATS
    pub min_trade_qty: Option<i32>,
    pub min_compete_size: Option<i32>,
    pub compete_against_best_offset: Option<f64>,
    pub mid_offset_at_whole: Option<f64>,
    pub mid_offset_at_half: Option<f64>,

    pub bond_accrued_interest: String,
    pub submitter: String,
}

impl Default for Order {
    fn default() -> Self {
        Self {
            order_id: 0,
            client_id: 0,
            perm_id: 0,
            parent_id: 0,
            parent_perm_id: None,
            action: None,
            total_quantity: None,
            order_type: None,
            lmt_price: None,
            aux_price: None,
            tif: None,
            cash_qty: None,
            filled_quantity: None,
            active_start_time: String::new(),
            active_stop_time: String::new(),
            good_after_time: String::new(),
            good_till_date: String::new(),
            duration: None,
            oca_group: String::new(),
            oca_type: 0,
            order_ref: String::new(),
            transmit: true,
            block_order: false,
            sweep_to_fill: false,
            display_size: 0,
            trigger_method: 0,
            outside_rth: false,
            hidden: false,
            include_overnight: false,
            rule_80a: String::new(),
            all_or_none: false,
            min_qty: None,
            percent_offset: None,
            override_percentage_constraints: false,
            trail_stop_price: None,
            trailing_percent: None,
            post_to_ats: None,
            route_marketable_to_bbo: false,
            imbalance_only: false,
            fa_group: String::new(),
            fa_method: String::new(),
            fa_percentage: String::new(),
            model_code: String::new(),
            open_close: String::new(),
            origin: Origin::Customer,
            short_sale_slot: 0,
            designated_location: String::new(),
            // -1 means "not exempt"; 0 would be a real code.
            exempt_code: -1,
            settling_firm: String::new(),
            account: String::new(),
            clearing_account: String::new(),
            clearing_intent: String::new(),
            customer_account: String::new(),
            professional_customer: false,
            shareholder: String::new(),
            discretionary_amt: 0.0,
            discretionary_up_to_limit_price: false,
            auction_strategy: AuctionStrategy::Unset,
            starting_price: None,
            stock_ref_price: None,
            delta: None,
            stock_range_lower: None,
            stock_range_upper: None,
            randomize_size: false,
            randomize_price: false,
            volatility: None,
            volatility_type: None,
            continuous_update: false,
            reference_price_type: None,
            delta_neutral: DeltaNeutralOrder::default(),
            basis_points: None,
            basis_points_type: None,
            order_combo_legs: Vec::new(),
            smart_combo_routing_params: Vec::new(),
            scale: ScaleParams::default(),
            hedge_type: String::new(),
            hedge_param: String::new(),
            dont_use_auto_price_for_hedge: false,
            algo_strategy: String::new(),
            algo_params: Vec::new(),
            algo_id: String::new(),
            what_if: false,
            not_held: false,
            solicited: false,
            opt_out_smart_routing: false,
            order_misc_options: Vec::new(),
            peg_bench: PegBenchParams::default(),
            adjusted: AdjustedOrder::default(),
            trigger_price: None,
            lmt_price_offset: None,
            conditions: Vec::new(),
            conditions_ignore_rth: false,
            conditions_cancel_order: false,
            ext_operator: String::new(),
            soft_dollar_tier: SoftDollarTier::default(),
            mifid2: Mifid2::default(),
            is_oms_container: false,
            auto_cancel_date: String::new(),
            auto_cancel_parent: false,
            ref_futures_con_id: None,
            use_price_mgmt_algo: None,
            advanced_error_override: String::new(),
            manual_order_time: String::new(),
            manual_order_indicator: None,
            min_trade_qty: None,
            min_compete_size: None,
            compete_against_best_offset: None,
            mid_offset_at_whole: None,
            mid_offset_at_half: None,
            bond_accrued_interest: String::new(),
            submitter: String::new(),
        }
    }
}

/// Hedge leg a volatility order attaches once it fills. Only sent, and
/// only read back, when `order_type` is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeltaNeutralOrder {
    pub order_type: String,
    pub aux_price: Option<f64>,
    pub con_id: i32,
    pub settling_firm: String,
    pub clearing_account: String,
    pub clearing_intent: String,
    pub open_close: String,
    pub short_sale: bool,
    pub short_sale_slot: i32,
    pub designated_location: String,
}

impl DeltaNeutralOrder {
    pub fn is_set(&self) -> bool {
        !self.order_type.is_empty()
    }
}

/// Scale order ladder. The adjustment fields after `price_increment` only
/// travel when the increment is positive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScaleParams {
    pub init_level_size: Option<i32>,
    pub subs_level_size: Option<i32>,
    pub price_increment: Option<f64>,
    pub price_adjust_value: Option<f64>,
    pub price_adjust_interval: Option<i32>,
    pub profit_offset: Option<f64>,
    pub auto_reset: bool,
    pub init_position: Option<i32>,
    pub init_fill_qty: Option<i32>,
    pub random_percent: bool,
    pub table: String,
}

impl ScaleParams {
    pub fn has_adjustments(&self) -> bool {
        self.price_increment.is_some_and(|incr| incr > 0.0)
    }
}

/// Reference contract of a PEG BENCH order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PegBenchParams {
    pub reference_contract_id: Option<i32>,
    pub is_pegged_change_amount_decrease: bool,
    pub pegged_change_amount: Option<f64>,
    pub reference_change_amount: Option<f64>,
    pub reference_exchange_id: String,
}

/// What a stop-type order turns into once its trigger price is hit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdjustedOrder {
    pub order_type: String,
    pub stop_price: Option<f64>,
    pub stop_limit_price: Option<f64>,
    pub trailing_amount: Option<f64>,
    pub trailing_unit: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Mifid2 {
    pub decision_maker: String,
    pub decision_algo: String,
    pub execution_trader: String,
    pub execution_algo: String,
}

impl Order {
    pub fn limit(action: Action, quantity: Decimal, price: f64) -> Self {
        Self {
            action: Some(action),
            total_quantity: Some(quantity),
            order_type: Some(OrderType::Limit),
            lmt_price: Some(price),
            ..Default::default()
        }
    }

    pub fn market(action: Action, quantity: Decimal) -> Self {
        Self {
            action: Some(action),
            total_quantity: Some(quantity),
            order_type: Some(OrderType::Market),
            ..Default::default()
        }
    }
}

/// Progress report of a live order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatus {
    pub order_id: i32,
    pub status: String,
    pub filled: Option<Decimal>,
    pub remaining: Option<Decimal>,
    pub avg_fill_price: f64,
    pub perm_id: i64,
    pub parent_id: i32,
    pub last_fill_price: f64,
    pub client_id: i32,
    pub why_held: String,
    pub mkt_cap_price: f64,
}

/// Allocation of an advisor order to one account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAllocation {
    pub account: String,
    pub position: Option<Decimal>,
    pub position_desired: Option<Decimal>,
    pub position_after: Option<Decimal>,
    pub desired_alloc_qty: Option<Decimal>,
    pub allowed_alloc_qty: Option<Decimal>,
    pub is_monetary: bool,
}

/// Status plus what-if margin and commission figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderState {
    pub status: String,

    pub init_margin_before: String,
    pub maint_margin_before: String,
    pub equity_with_loan_before: String,
    pub init_margin_change: String,
    pub maint_margin_change: String,
    pub equity_with_loan_change: String,
    pub init_margin_after: String,
    pub maint_margin_after: String,
    pub equity_with_loan_after: String,

    pub commission_and_fees: Option<f64>,
    pub min_commission_and_fees: Option<f64>,
    pub max_commission_and_fees: Option<f64>,
    pub commission_and_fees_currency: String,
    pub margin_currency: String,

    /// Outside-regular-hours margin, in the same before/change/after order
    /// as the text fields above.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outside_rth_margins: Vec<Option<f64>>,

    pub suggested_size: Option<Decimal>,
    pub reject_reason: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order_allocations: Vec<OrderAllocation>,
    pub warning_text: String,
    pub completed_time: String,
    pub completed_status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCancel {
    pub manual_order_cancel_time: String,
    pub ext_operator: String,
    pub manual_order_indicator: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_that_are_not_zero() {
        let order = Order::default();
        assert!(order.transmit);
        assert_eq!(order.exempt_code, -1);
        assert_eq!(order.origin, Origin::Customer);
        assert!(order.use_price_mgmt_algo.is_none());
        assert!(order.total_quantity.is_none());
    }

    #[test]
    fn limit_constructor() {
        let order = Order::limit(Action::Buy, Decimal::from(100), 189.5);
        assert_eq!(order.order_type, Some(OrderType::Limit));
        assert_eq!(order.lmt_price, Some(189.5));
        assert!(order.aux_price.is_none());
    }
}
