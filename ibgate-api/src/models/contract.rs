//! Contracts and the details the server reports about them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::common::{IneligibilityReason, TagValue};
use super::enums::{
    Action, FundAssetType, FundDistributionPolicyIndicator, LegOpenClose, Right, SecIdType, SecType,
};

/// One leg of a combo (`BAG`) contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboLeg {
    pub con_id: i32,
    pub ratio: i32,
    pub action: Option<Action>,
    pub exchange: String,
    pub open_close: LegOpenClose,
    /// 1 = clearing broker, 2 = third party.
    pub short_sale_slot: i32,
    pub designated_location: String,
    pub exempt_code: i32,
}

impl Default for ComboLeg {
    fn default() -> Self {
        Self {
            con_id: 0,
            ratio: 0,
            action: None,
            exchange: String::new(),
            open_close: LegOpenClose::Same,
            short_sale_slot: 0,
            designated_location: String::new(),
            exempt_code: -1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeltaNeutralContract {
    pub con_id: i32,
    pub delta: f64,
    pub price: f64,
}

/// A tradable instrument.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub con_id: i32,
    pub symbol: String,
    pub sec_type: Option<SecType>,
    pub last_trade_date_or_contract_month: String,
    pub last_trade_date: String,
    pub strike: Option<f64>,
    pub right: Option<Right>,
    pub multiplier: String,
    pub exchange: String,
    pub primary_exchange: String,
    pub currency: String,
    pub local_symbol: String,
    pub trading_class: String,
    pub include_expired: bool,
    pub sec_id_type: Option<SecIdType>,
    pub sec_id: String,
    pub description: String,
    pub issuer_id: String,
    pub combo_legs_descrip: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub combo_legs: Vec<ComboLeg>,
    pub delta_neutral_contract: Option<DeltaNeutralContract>,
}

impl Contract {
    pub fn is_combo(&self) -> bool {
        self.sec_type == Some(SecType::Combo)
    }

    /// A SMART-routed stock, the most common request target.
    pub fn stock(symbol: &str, currency: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            sec_type: Some(SecType::Stock),
            exchange: "SMART".to_string(),
            currency: currency.to_string(),
            ..Default::default()
        }
    }
}

/// Contract plus the descriptive fields of a contract details reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractDetails {
    pub contract: Contract,
    pub market_name: String,
    pub min_tick: f64,
    pub order_types: String,
    pub valid_exchanges: String,
    pub price_magnifier: i32,
    pub under_con_id: i32,
    pub long_name: String,
    pub contract_month: String,
    pub industry: String,
    pub category: String,
    pub subcategory: String,
    pub time_zone_id: String,
    pub trading_hours: String,
    pub liquid_hours: String,
    pub ev_rule: String,
    pub ev_multiplier: f64,
    pub agg_group: Option<i32>,
    pub under_symbol: String,
    pub under_sec_type: String,
    pub market_rule_ids: String,
    pub real_expiration_date: String,
    pub last_trade_time: String,
    pub stock_type: String,
    pub min_size: Option<Decimal>,
    pub size_increment: Option<Decimal>,
    pub suggested_size_increment: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sec_id_list: Vec<TagValue>,

    pub bond: BondDetails,
    pub fund: FundDetails,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ineligibility_reasons: Vec<IneligibilityReason>,
}

/// Fields that only bond contract details carry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BondDetails {
    pub cusip: String,
    pub ratings: String,
    pub desc_append: String,
    pub bond_type: String,
    pub coupon_type: String,
    pub coupon: f64,
    pub callable: bool,
    pub putable: bool,
    pub convertible: bool,
    pub maturity: String,
    pub issue_date: String,
    pub next_option_date: String,
    pub next_option_type: String,
    pub next_option_partial: bool,
    pub notes: String,
}

/// Mutual fund attributes, sent with contract details from `FUND_DATA_FIELDS` on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundDetails {
    pub name: String,
    pub family: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub front_load: String,
    pub back_load: String,
    pub back_load_time_interval: String,
    pub management_fee: String,
    pub closed: bool,
    pub closed_for_new_investors: bool,
    pub closed_for_new_money: bool,
    pub notify_amount: String,
    pub minimum_initial_purchase: String,
    pub subsequent_minimum_purchase: String,
    pub blue_sky_states: String,
    pub blue_sky_territories: String,
    pub distribution_policy_indicator: Option<FundDistributionPolicyIndicator>,
    pub asset_type: Option<FundAssetType>,
}

/// Matching-symbols result: a contract and the derivative types it has.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractDescription {
    pub contract: Contract,
    pub derivative_sec_types: Vec<String>,
}
