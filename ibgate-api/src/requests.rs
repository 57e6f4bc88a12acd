//! Request builders.
//!
//! Every method checks the session first (NOT_CONNECTED otherwise), then the
//! negotiated server version for each optional feature it would send
//! (UPDATE_TWS otherwise), then encodes one frame and queues it. Nothing is
//! returned: failures arrive through [`Wrapper::error`](crate::wrapper::Wrapper::error)
//! with the request's id.
//!
//! Sessions never negotiate below version 100, so gates older than that are
//! not checked.

use crate::client::IBClient;
use crate::encoder::MessageEncoder;
use crate::models::common::TagValue;
use crate::models::condition::{ConditionKind, OrderCondition};
use crate::models::contract::Contract;
use crate::models::enums::{MarketDataType, OrderType};
use crate::models::execution::ExecutionFilter;
use crate::models::order::{DeltaNeutralOrder, Order, OrderCancel, ScaleParams};
use crate::protocol::{outgoing, server_version, NO_VALID_ID};

impl IBClient {
    // ========================================================================
    // Market Data
    // ========================================================================

    /// Subscribe to streaming ticks, or take one snapshot.
    #[allow(clippy::too_many_arguments)]
    pub async fn req_mkt_data(
        &self,
        ticker_id: i32,
        contract: &Contract,
        generic_ticks: &str,
        snapshot: bool,
        regulatory_snapshot: bool,
        mkt_data_options: &[TagValue],
    ) {
        let Some(out) = self.check_connected(ticker_id) else {
            return;
        };
        if regulatory_snapshot
            && !self.check_version(&out, server_version::REQ_SMART_COMPONENTS, ticker_id, "regulatory snapshot requests")
        {
            return;
        }

        let sv = out.server_version;
        let mut enc = MessageEncoder::new(sv, outgoing::REQ_MKT_DATA);
        enc.push_int(11).push_int(ticker_id).push_contract(contract);
        if contract.is_combo() {
            push_combo_legs(&mut enc, contract);
        }
        push_delta_neutral(&mut enc, contract);
        enc.push_str(generic_ticks).push_bool(snapshot);
        if sv >= server_version::REQ_SMART_COMPONENTS {
            enc.push_bool(regulatory_snapshot);
        }
        enc.push_tag_values(mkt_data_options);
        self.send(&out, ticker_id, enc).await;
    }

    pub async fn cancel_mkt_data(&self, ticker_id: i32) {
        let Some(out) = self.check_connected(ticker_id) else {
            return;
        };
        let mut enc = MessageEncoder::new(out.server_version, outgoing::CANCEL_MKT_DATA);
        enc.push_int(2).push_int(ticker_id);
        self.send(&out, ticker_id, enc).await;
    }

    /// Switch between live, frozen and delayed market data.
    pub async fn req_market_data_type(&self, market_data_type: MarketDataType) {
        let Some(out) = self.check_connected(NO_VALID_ID) else {
            return;
        };
        let mut enc = MessageEncoder::new(out.server_version, outgoing::REQ_MARKET_DATA_TYPE);
        enc.push_int(1).push_int(i32::from(market_data_type));
        self.send(&out, NO_VALID_ID, enc).await;
    }

    /// Level II book.
    pub async fn req_mkt_depth(
        &self,
        ticker_id: i32,
        contract: &Contract,
        num_rows: i32,
        is_smart_depth: bool,
        mkt_depth_options: &[TagValue],
    ) {
        let Some(out) = self.check_connected(ticker_id) else {
            return;
        };
        if is_smart_depth && !self.check_version(&out, server_version::SMART_DEPTH, ticker_id, "SMART depth request")
        {
            return;
        }
        if !contract.primary_exchange.is_empty()
            && !self.check_version(
                &out,
                server_version::MKT_DEPTH_PRIM_EXCHANGE,
                ticker_id,
                "primaryExch parameter in reqMktDepth",
            )
        {
            return;
        }

        let sv = out.server_version;
        let mut enc = MessageEncoder::new(sv, outgoing::REQ_MKT_DEPTH);
        enc.push_int(5)
            .push_int(ticker_id)
            .push_int(contract.con_id)
            .push_str(&contract.symbol)
            .push_opt_display(contract.sec_type.as_ref())
            .push_str(&contract.last_trade_date_or_contract_month)
            .push_float_max(contract.strike)
            .push_opt_display(contract.right.as_ref())
            .push_str(&contract.multiplier)
            .push_str(&contract.exchange);
        if sv >= server_version::MKT_DEPTH_PRIM_EXCHANGE {
            enc.push_str(&contract.primary_exchange);
        }
        enc.push_str(&contract.currency)
            .push_str(&contract.local_symbol)
            .push_str(&contract.trading_class)
            .push_int(num_rows);
        if sv >= server_version::SMART_DEPTH {
            enc.push_bool(is_smart_depth);
        }
        enc.push_tag_values(mkt_depth_options);
        self.send(&out, ticker_id, enc).await;
    }

    pub async fn cancel_mkt_depth(&self, ticker_id: i32, is_smart_depth: bool) {
        let Some(out) = self.check_connected(ticker_id) else {
            return;
        };
        if is_smart_depth
            && !self.check_version(&out, server_version::SMART_DEPTH, ticker_id, "SMART depth cancel request")
        {
            return;
        }
        let mut enc = MessageEncoder::new(out.server_version, outgoing::CANCEL_MKT_DEPTH);
        enc.push_int(1).push_int(ticker_id);
        if out.server_version >= server_version::SMART_DEPTH {
            enc.push_bool(is_smart_depth);
        }
        self.send(&out, ticker_id, enc).await;
    }

    /// `tick_type` is one of `Last`, `AllLast`, `BidAsk` or `MidPoint`.
    pub async fn req_tick_by_tick_data(
        &self,
        req_id: i32,
        contract: &Contract,
        tick_type: &str,
        number_of_ticks: i32,
        ignore_size: bool,
    ) {
        let Some(out) = self.check_connected(req_id) else {
            return;
        };
        if !self.check_version(&out, server_version::TICK_BY_TICK, req_id, "tick-by-tick data requests") {
            return;
        }
        if (number_of_ticks != 0 || ignore_size)
            && !self.check_version(
                &out,
                server_version::TICK_BY_TICK_IGNORE_SIZE,
                req_id,
                "ignoreSize and numberOfTicks parameters in tick-by-tick data requests",
            )
        {
            return;
        }

        let mut enc = MessageEncoder::new(out.server_version, outgoing::REQ_TICK_BY_TICK_DATA);
        enc.push_int(req_id).push_contract(contract).push_str(tick_type);
        if out.server_version >= server_version::TICK_BY_TICK_IGNORE_SIZE {
            enc.push_int(number_of_ticks).push_bool(ignore_size);
        }
        self.send(&out, req_id, enc).await;
    }

    pub async fn cancel_tick_by_tick_data(&self, req_id: i32) {
        let Some(out) = self.check_connected(req_id) else {
            return;
        };
        if !self.check_version(&out, server_version::TICK_BY_TICK, req_id, "tick-by-tick data requests") {
            return;
        }
        let mut enc = MessageEncoder::new(out.server_version, outgoing::CANCEL_TICK_BY_TICK_DATA);
        enc.push_int(req_id);
        self.send(&out, req_id, enc).await;
    }

    // ========================================================================
    // Orders
    // ========================================================================

    /// Place a new order or modify an open one with the same id.
    pub async fn place_order(&self, order_id: i32, contract: &Contract, order: &Order) {
        let Some(out) = self.check_connected(order_id) else {
            return;
        };
        let sv = out.server_version;
        if let Some((min_version, feature)) = missing_order_feature(sv, contract, order) {
            self.check_version(&out, min_version, order_id, feature);
            return;
        }

        let mut enc = MessageEncoder::new(sv, outgoing::PLACE_ORDER);
        if sv < server_version::ORDER_CONTAINER {
            enc.push_int(45);
        }
        enc.push_int(order_id)
            .push_contract(contract)
            .push_opt_display(contract.sec_id_type.as_ref())
            .push_str(&contract.sec_id);

        // Main order fields
        enc.push_opt_display(order.action.as_ref());
        if sv >= server_version::FRACTIONAL_POSITIONS {
            enc.push_decimal_max(order.total_quantity);
        } else {
            enc.push_decimal_max(order.total_quantity.map(|q| q.trunc()));
        }
        enc.push_opt_display(order.order_type.as_ref())
            .push_float_max(order.lmt_price)
            .push_float_max(order.aux_price)
            .push_opt_display(order.tif.as_ref())
            .push_str(&order.oca_group)
            .push_str(&order.account)
            .push_str(&order.open_close)
            .push_int(i32::from(order.origin))
            .push_str(&order.order_ref)
            .push_bool(order.transmit)
            .push_int(order.parent_id)
            .push_bool(order.block_order)
            .push_bool(order.sweep_to_fill)
            .push_int(order.display_size)
            .push_int(order.trigger_method)
            .push_bool(order.outside_rth)
            .push_bool(order.hidden);

        if contract.is_combo() {
            enc.push_int(contract.combo_legs.len() as i32);
            for leg in &contract.combo_legs {
                enc.push_int(leg.con_id)
                    .push_int(leg.ratio)
                    .push_opt_display(leg.action.as_ref())
                    .push_str(&leg.exchange)
                    .push_int(i32::from(leg.open_close))
                    .push_int(leg.short_sale_slot)
                    .push_str(&leg.designated_location)
                    .push_int(leg.exempt_code);
            }
            enc.push_int(order.order_combo_legs.len() as i32);
            for price in &order.order_combo_legs {
                enc.push_float_max(*price);
            }
            enc.push_tag_value_pairs(&order.smart_combo_routing_params);
        }

        // Deprecated sharesAllocation
        enc.push_str("")
            .push_float(order.discretionary_amt)
            .push_str(&order.good_after_time)
            .push_str(&order.good_till_date)
            .push_str(&order.fa_group)
            .push_str(&order.fa_method)
            .push_str(&order.fa_percentage);
        if sv < server_version::FA_PROFILE_DESUPPORT {
            enc.push_str("");
        }
        if sv >= server_version::MODELS_SUPPORT {
            enc.push_str(&order.model_code);
        }

        enc.push_int(order.short_sale_slot)
            .push_str(&order.designated_location)
            .push_int(order.exempt_code)
            .push_int(order.oca_type)
            .push_str(&order.rule_80a)
            .push_str(&order.settling_firm)
            .push_bool(order.all_or_none)
            .push_int_max(order.min_qty)
            .push_float_max(order.percent_offset)
            // eTradeOnly, firmQuoteOnly, nbboPriceCap: no longer used
            .push_bool(false)
            .push_bool(false)
            .push_float_max(None)
            .push_int(i32::from(order.auction_strategy))
            .push_float_max(order.starting_price)
            .push_float_max(order.stock_ref_price)
            .push_float_max(order.delta)
            .push_float_max(order.stock_range_lower)
            .push_float_max(order.stock_range_upper)
            .push_bool(order.override_percentage_constraints);

        // Volatility orders
        enc.push_float_max(order.volatility).push_int_max(order.volatility_type);
        push_delta_neutral_order(&mut enc, &order.delta_neutral);
        enc.push_bool(order.continuous_update)
            .push_int_max(order.reference_price_type)
            .push_float_max(order.trail_stop_price)
            .push_float_max(order.trailing_percent);

        push_scale(&mut enc, &order.scale);
        enc.push_str(&order.active_start_time).push_str(&order.active_stop_time);

        // Hedge
        enc.push_str(&order.hedge_type);
        if !order.hedge_type.is_empty() {
            enc.push_str(&order.hedge_param);
        }

        enc.push_bool(order.opt_out_smart_routing)
            .push_str(&order.clearing_account)
            .push_str(&order.clearing_intent)
            .push_bool(order.not_held);
        push_delta_neutral(&mut enc, contract);

        // Algo
        enc.push_str(&order.algo_strategy);
        if !order.algo_strategy.is_empty() {
            enc.push_tag_value_pairs(&order.algo_params);
        }
        enc.push_str(&order.algo_id)
            .push_bool(order.what_if)
            .push_tag_values(&order.order_misc_options)
            .push_bool(order.solicited)
            .push_bool(order.randomize_size)
            .push_bool(order.randomize_price);

        if sv >= server_version::PEGGED_TO_BENCHMARK {
            if order.order_type == Some(OrderType::PeggedToBenchmark) {
                let peg = &order.peg_bench;
                enc.push_int_max(peg.reference_contract_id)
                    .push_bool(peg.is_pegged_change_amount_decrease)
                    .push_float_max(peg.pegged_change_amount)
                    .push_float_max(peg.reference_change_amount)
                    .push_str(&peg.reference_exchange_id);
            }

            enc.push_int(order.conditions.len() as i32);
            if !order.conditions.is_empty() {
                for condition in &order.conditions {
                    push_condition(&mut enc, condition);
                }
                enc.push_bool(order.conditions_ignore_rth)
                    .push_bool(order.conditions_cancel_order);
            }

            enc.push_str(&order.adjusted.order_type)
                .push_float_max(order.trigger_price)
                .push_float_max(order.lmt_price_offset)
                .push_float_max(order.adjusted.stop_price)
                .push_float_max(order.adjusted.stop_limit_price)
                .push_float_max(order.adjusted.trailing_amount)
                .push_int_max(order.adjusted.trailing_unit);
        }
        if sv >= server_version::EXT_OPERATOR {
            enc.push_str(&order.ext_operator);
        }
        if sv >= server_version::SOFT_DOLLAR_TIER {
            enc.push_str(&order.soft_dollar_tier.name)
                .push_str(&order.soft_dollar_tier.value);
        }
        if sv >= server_version::CASH_QTY {
            enc.push_float_max(order.cash_qty);
        }
        if sv >= server_version::DECISION_MAKER {
            enc.push_str(&order.mifid2.decision_maker)
                .push_str(&order.mifid2.decision_algo);
        }
        if sv >= server_version::MIFID_EXECUTION {
            enc.push_str(&order.mifid2.execution_trader)
                .push_str(&order.mifid2.execution_algo);
        }
        if sv >= server_version::AUTO_PRICE_FOR_HEDGE {
            enc.push_bool(order.dont_use_auto_price_for_hedge);
        }
        if sv >= server_version::ORDER_CONTAINER {
            enc.push_bool(order.is_oms_container);
        }
        if sv >= server_version::D_PEG_ORDERS {
            enc.push_bool(order.discretionary_up_to_limit_price);
        }
        if sv >= server_version::PRICE_MGMT_ALGO {
            enc.push_int_max(order.use_price_mgmt_algo.map(i32::from));
        }
        if sv >= server_version::DURATION {
            enc.push_int_max(order.duration);
        }
        if sv >= server_version::POST_TO_ATS {
            enc.push_int_max(order.post_to_ats);
        }
        if sv >= server_version::AUTO_CANCEL_PARENT {
            enc.push_bool(order.auto_cancel_parent);
        }
        if sv >= server_version::ADVANCED_ORDER_REJECT {
            enc.push_str(&order.advanced_error_override);
        }
        if sv >= server_version::MANUAL_ORDER_TIME {
            enc.push_str(&order.manual_order_time);
        }
        if sv >= server_version::PEGBEST_PEGMID_OFFSETS {
            let peg_best = order.order_type == Some(OrderType::PeggedToBest);
            let peg_mid = order.order_type == Some(OrderType::PeggedToMidpoint);
            if contract.exchange == "IBKRATS" {
                enc.push_int_max(order.min_trade_qty);
            }
            if peg_best {
                enc.push_int_max(order.min_compete_size)
                    .push_float_max(order.compete_against_best_offset);
            }
            if peg_best || peg_mid {
                enc.push_float_max(order.mid_offset_at_whole)
                    .push_float_max(order.mid_offset_at_half);
            }
        }
        if sv >= server_version::CUSTOMER_ACCOUNT {
            enc.push_str(&order.customer_account);
        }
        if sv >= server_version::PROFESSIONAL_CUSTOMER {
            enc.push_bool(order.professional_customer);
        }
        if (server_version::RFQ_FIELDS..server_version::UNDO_RFQ_FIELDS).contains(&sv) {
            enc.push_str("").push_int_max(None);
        }
        if sv >= server_version::INCLUDE_OVERNIGHT {
            enc.push_bool(order.include_overnight);
        }
        if sv >= server_version::CME_TAGGING_FIELDS {
            enc.push_int_max(order.manual_order_indicator);
        }
        if sv >= server_version::IMBALANCE_ONLY {
            enc.push_bool(order.imbalance_only);
        }

        tracing::debug!(order_id, symbol = %contract.symbol, "placing order");
        self.send(&out, order_id, enc).await;
    }

    pub async fn cancel_order(&self, order_id: i32, order_cancel: &OrderCancel) {
        let Some(out) = self.check_connected(order_id) else {
            return;
        };
        if !order_cancel.manual_order_cancel_time.is_empty()
            && !self.check_version(&out, server_version::MANUAL_ORDER_TIME, order_id, "manual order cancel time")
        {
            return;
        }
        if (!order_cancel.ext_operator.is_empty() || order_cancel.manual_order_indicator.is_some())
            && !self.check_version(
                &out,
                server_version::CME_TAGGING_FIELDS,
                order_id,
                "ext operator and manual order indicator parameters",
            )
        {
            return;
        }

        let sv = out.server_version;
        let mut enc = MessageEncoder::new(sv, outgoing::CANCEL_ORDER);
        if sv < server_version::CME_TAGGING_FIELDS {
            enc.push_int(1);
        }
        enc.push_int(order_id);
        if sv >= server_version::MANUAL_ORDER_TIME {
            enc.push_str(&order_cancel.manual_order_cancel_time);
        }
        if (server_version::RFQ_FIELDS..server_version::UNDO_RFQ_FIELDS).contains(&sv) {
            enc.push_str("").push_str("").push_int_max(None);
        }
        if sv >= server_version::CME_TAGGING_FIELDS {
            enc.push_str(&order_cancel.ext_operator)
                .push_int_max(order_cancel.manual_order_indicator);
        }
        self.send(&out, order_id, enc).await;
    }

    /// Open orders placed by this client.
    pub async fn req_open_orders(&self) {
        self.simple_request(outgoing::REQ_OPEN_ORDERS, 1).await;
    }

    /// Open orders from every API client and TWS itself.
    pub async fn req_all_open_orders(&self) {
        self.simple_request(outgoing::REQ_ALL_OPEN_ORDERS, 1).await;
    }

    /// Only valid for client id 0: bind future TWS orders to this client.
    pub async fn req_auto_open_orders(&self, auto_bind: bool) {
        let Some(out) = self.check_connected(NO_VALID_ID) else {
            return;
        };
        let mut enc = MessageEncoder::new(out.server_version, outgoing::REQ_AUTO_OPEN_ORDERS);
        enc.push_int(1).push_bool(auto_bind);
        self.send(&out, NO_VALID_ID, enc).await;
    }

    pub async fn req_completed_orders(&self, api_only: bool) {
        let Some(out) = self.check_connected(NO_VALID_ID) else {
            return;
        };
        if !self.check_version(&out, server_version::COMPLETED_ORDERS, NO_VALID_ID, "completed orders requests") {
            return;
        }
        let mut enc = MessageEncoder::new(out.server_version, outgoing::REQ_COMPLETED_ORDERS);
        enc.push_bool(api_only);
        self.send(&out, NO_VALID_ID, enc).await;
    }

    /// Ask for the next valid order id; answered by `next_valid_id`.
    pub async fn req_ids(&self, num_ids: i32) {
        let Some(out) = self.check_connected(NO_VALID_ID) else {
            return;
        };
        let mut enc = MessageEncoder::new(out.server_version, outgoing::REQ_IDS);
        enc.push_int(1).push_int(num_ids);
        self.send(&out, NO_VALID_ID, enc).await;
    }

    /// Cancel every open order, including ones placed in TWS.
    pub async fn req_global_cancel(&self, order_cancel: &OrderCancel) {
        let Some(out) = self.check_connected(NO_VALID_ID) else {
            return;
        };
        if (!order_cancel.ext_operator.is_empty() || order_cancel.manual_order_indicator.is_some())
            && !self.check_version(
                &out,
                server_version::CME_TAGGING_FIELDS,
                NO_VALID_ID,
                "ext operator and manual order indicator parameters",
            )
        {
            return;
        }
        let sv = out.server_version;
        let mut enc = MessageEncoder::new(sv, outgoing::REQ_GLOBAL_CANCEL);
        if sv >= server_version::CME_TAGGING_FIELDS {
            enc.push_str(&order_cancel.ext_operator)
                .push_int_max(order_cancel.manual_order_indicator);
        } else {
            enc.push_int(1);
        }
        self.send(&out, NO_VALID_ID, enc).await;
    }

    // ========================================================================
    // Executions
    // ========================================================================

    pub async fn req_executions(&self, req_id: i32, filter: &ExecutionFilter) {
        let Some(out) = self.check_connected(req_id) else {
            return;
        };
        if (filter.last_n_days.is_some() || !filter.specific_dates.is_empty())
            && !self.check_version(
                &out,
                server_version::PARAMETRIZED_DAYS_OF_EXECUTIONS,
                req_id,
                "last N days and specific dates parameters",
            )
        {
            return;
        }

        let sv = out.server_version;
        let mut enc = MessageEncoder::new(sv, outgoing::REQ_EXECUTIONS);
        enc.push_int(3)
            .push_int(req_id)
            .push_int(filter.client_id)
            .push_str(&filter.acct_code)
            .push_str(&filter.time)
            .push_str(&filter.symbol)
            .push_str(&filter.sec_type)
            .push_str(&filter.exchange)
            .push_str(&filter.side);
        if sv >= server_version::PARAMETRIZED_DAYS_OF_EXECUTIONS {
            enc.push_int_max(filter.last_n_days)
                .push_int(filter.specific_dates.len() as i32);
            for date in &filter.specific_dates {
                enc.push_int(*date);
            }
        }
        self.send(&out, req_id, enc).await;
    }

    // ========================================================================
    // Contracts
    // ========================================================================

    pub async fn req_contract_details(&self, req_id: i32, contract: &Contract) {
        let Some(out) = self.check_connected(req_id) else {
            return;
        };
        if !contract.issuer_id.is_empty()
            && !self.check_version(&out, server_version::BOND_ISSUERID, req_id, "issuerId parameter")
        {
            return;
        }

        let sv = out.server_version;
        let mut enc = MessageEncoder::new(sv, outgoing::REQ_CONTRACT_DATA);
        enc.push_int(8)
            .push_int(req_id)
            .push_contract(contract)
            .push_bool(contract.include_expired)
            .push_opt_display(contract.sec_id_type.as_ref())
            .push_str(&contract.sec_id);
        if sv >= server_version::BOND_ISSUERID {
            enc.push_str(&contract.issuer_id);
        }
        self.send(&out, req_id, enc).await;
    }

    pub async fn req_matching_symbols(&self, req_id: i32, pattern: &str) {
        let Some(out) = self.check_connected(req_id) else {
            return;
        };
        if !self.check_version(&out, server_version::REQ_MATCHING_SYMBOLS, req_id, "matching symbols request") {
            return;
        }
        let mut enc = MessageEncoder::new(out.server_version, outgoing::REQ_MATCHING_SYMBOLS);
        enc.push_int(req_id).push_str(pattern);
        self.send(&out, req_id, enc).await;
    }

    /// Option chain parameters for an underlying.
    pub async fn req_sec_def_opt_params(
        &self,
        req_id: i32,
        underlying_symbol: &str,
        fut_fop_exchange: &str,
        underlying_sec_type: &str,
        underlying_con_id: i32,
    ) {
        let Some(out) = self.check_connected(req_id) else {
            return;
        };
        if !self.check_version(&out, server_version::SEC_DEF_OPT_PARAMS_REQ, req_id, "security definition option requests")
        {
            return;
        }
        let mut enc = MessageEncoder::new(out.server_version, outgoing::REQ_SEC_DEF_OPT_PARAMS);
        enc.push_int(req_id)
            .push_str(underlying_symbol)
            .push_str(fut_fop_exchange)
            .push_str(underlying_sec_type)
            .push_int(underlying_con_id);
        self.send(&out, req_id, enc).await;
    }

    // ========================================================================
    // Historical Data
    // ========================================================================

    #[allow(clippy::too_many_arguments)]
    pub async fn req_historical_data(
        &self,
        ticker_id: i32,
        contract: &Contract,
        end_date_time: &str,
        duration: &str,
        bar_size: &str,
        what_to_show: &str,
        use_rth: bool,
        format_date: i32,
        keep_up_to_date: bool,
        chart_options: &[TagValue],
    ) {
        let Some(out) = self.check_connected(ticker_id) else {
            return;
        };

        let sv = out.server_version;
        let mut enc = MessageEncoder::new(sv, outgoing::REQ_HISTORICAL_DATA);
        if sv < server_version::SYNT_REALTIME_BARS {
            enc.push_int(6);
        }
        enc.push_int(ticker_id)
            .push_contract(contract)
            .push_bool(contract.include_expired)
            .push_str(end_date_time)
            .push_str(bar_size)
            .push_str(duration)
            .push_bool(use_rth)
            .push_str(what_to_show)
            .push_int(format_date);
        if contract.is_combo() {
            push_combo_legs(&mut enc, contract);
        }
        if sv >= server_version::SYNT_REALTIME_BARS {
            enc.push_bool(keep_up_to_date);
        }
        enc.push_tag_values(chart_options);
        self.send(&out, ticker_id, enc).await;
    }

    pub async fn cancel_historical_data(&self, ticker_id: i32) {
        let Some(out) = self.check_connected(ticker_id) else {
            return;
        };
        let mut enc = MessageEncoder::new(out.server_version, outgoing::CANCEL_HISTORICAL_DATA);
        enc.push_int(1).push_int(ticker_id);
        self.send(&out, ticker_id, enc).await;
    }

    /// Earliest date with data for `what_to_show`.
    pub async fn req_head_timestamp(
        &self,
        ticker_id: i32,
        contract: &Contract,
        what_to_show: &str,
        use_rth: bool,
        format_date: i32,
    ) {
        let Some(out) = self.check_connected(ticker_id) else {
            return;
        };
        if !self.check_version(&out, server_version::REQ_HEAD_TIMESTAMP, ticker_id, "head time stamp requests") {
            return;
        }
        let mut enc = MessageEncoder::new(out.server_version, outgoing::REQ_HEAD_TIMESTAMP);
        enc.push_int(ticker_id)
            .push_contract(contract)
            .push_bool(contract.include_expired)
            .push_bool(use_rth)
            .push_str(what_to_show)
            .push_int(format_date);
        self.send(&out, ticker_id, enc).await;
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn req_historical_ticks(
        &self,
        req_id: i32,
        contract: &Contract,
        start_date_time: &str,
        end_date_time: &str,
        number_of_ticks: i32,
        what_to_show: &str,
        use_rth: bool,
        ignore_size: bool,
        misc_options: &[TagValue],
    ) {
        let Some(out) = self.check_connected(req_id) else {
            return;
        };
        if !self.check_version(&out, server_version::HISTORICAL_TICKS, req_id, "historical ticks requests") {
            return;
        }
        let mut enc = MessageEncoder::new(out.server_version, outgoing::REQ_HISTORICAL_TICKS);
        enc.push_int(req_id)
            .push_contract(contract)
            .push_bool(contract.include_expired)
            .push_str(start_date_time)
            .push_str(end_date_time)
            .push_int(number_of_ticks)
            .push_str(what_to_show)
            .push_bool(use_rth)
            .push_bool(ignore_size)
            .push_tag_values(misc_options);
        self.send(&out, req_id, enc).await;
    }

    /// Five-second bars; `bar_size` is ignored by the server but still sent.
    pub async fn req_real_time_bars(
        &self,
        ticker_id: i32,
        contract: &Contract,
        bar_size: i32,
        what_to_show: &str,
        use_rth: bool,
        real_time_bars_options: &[TagValue],
    ) {
        let Some(out) = self.check_connected(ticker_id) else {
            return;
        };
        let mut enc = MessageEncoder::new(out.server_version, outgoing::REQ_REAL_TIME_BARS);
        enc.push_int(3)
            .push_int(ticker_id)
            .push_contract(contract)
            .push_int(bar_size)
            .push_str(what_to_show)
            .push_bool(use_rth)
            .push_tag_values(real_time_bars_options);
        self.send(&out, ticker_id, enc).await;
    }

    pub async fn cancel_real_time_bars(&self, ticker_id: i32) {
        let Some(out) = self.check_connected(ticker_id) else {
            return;
        };
        let mut enc = MessageEncoder::new(out.server_version, outgoing::CANCEL_REAL_TIME_BARS);
        enc.push_int(1).push_int(ticker_id);
        self.send(&out, ticker_id, enc).await;
    }

    // ========================================================================
    // Account & Positions
    // ========================================================================

    /// Stream account values and portfolio for one account.
    pub async fn req_account_updates(&self, subscribe: bool, acct_code: &str) {
        let Some(out) = self.check_connected(NO_VALID_ID) else {
            return;
        };
        let mut enc = MessageEncoder::new(out.server_version, outgoing::REQ_ACCT_DATA);
        enc.push_int(2).push_bool(subscribe).push_str(acct_code);
        self.send(&out, NO_VALID_ID, enc).await;
    }

    /// `group` is usually `All`; `tags` is a comma separated tag list.
    pub async fn req_account_summary(&self, req_id: i32, group: &str, tags: &str) {
        let Some(out) = self.check_connected(req_id) else {
            return;
        };
        let mut enc = MessageEncoder::new(out.server_version, outgoing::REQ_ACCOUNT_SUMMARY);
        enc.push_int(1).push_int(req_id).push_str(group).push_str(tags);
        self.send(&out, req_id, enc).await;
    }

    pub async fn cancel_account_summary(&self, req_id: i32) {
        let Some(out) = self.check_connected(req_id) else {
            return;
        };
        let mut enc = MessageEncoder::new(out.server_version, outgoing::CANCEL_ACCOUNT_SUMMARY);
        enc.push_int(1).push_int(req_id);
        self.send(&out, req_id, enc).await;
    }

    pub async fn req_positions(&self) {
        self.simple_request(outgoing::REQ_POSITIONS, 1).await;
    }

    pub async fn cancel_positions(&self) {
        self.simple_request(outgoing::CANCEL_POSITIONS, 1).await;
    }

    pub async fn req_pnl(&self, req_id: i32, account: &str, model_code: &str) {
        let Some(out) = self.check_connected(req_id) else {
            return;
        };
        if !self.check_version(&out, server_version::PNL, req_id, "PnL requests") {
            return;
        }
        let mut enc = MessageEncoder::new(out.server_version, outgoing::REQ_PNL);
        enc.push_int(req_id).push_str(account).push_str(model_code);
        self.send(&out, req_id, enc).await;
    }

    pub async fn cancel_pnl(&self, req_id: i32) {
        let Some(out) = self.check_connected(req_id) else {
            return;
        };
        if !self.check_version(&out, server_version::PNL, req_id, "PnL requests") {
            return;
        }
        let mut enc = MessageEncoder::new(out.server_version, outgoing::CANCEL_PNL);
        enc.push_int(req_id);
        self.send(&out, req_id, enc).await;
    }

    pub async fn req_pnl_single(&self, req_id: i32, account: &str, model_code: &str, con_id: i32) {
        let Some(out) = self.check_connected(req_id) else {
            return;
        };
        if !self.check_version(&out, server_version::PNL, req_id, "PnL requests") {
            return;
        }
        let mut enc = MessageEncoder::new(out.server_version, outgoing::REQ_PNL_SINGLE);
        enc.push_int(req_id)
            .push_str(account)
            .push_str(model_code)
            .push_int(con_id);
        self.send(&out, req_id, enc).await;
    }

    pub async fn cancel_pnl_single(&self, req_id: i32) {
        let Some(out) = self.check_connected(req_id) else {
            return;
        };
        if !self.check_version(&out, server_version::PNL, req_id, "PnL requests") {
            return;
        }
        let mut enc = MessageEncoder::new(out.server_version, outgoing::CANCEL_PNL_SINGLE);
        enc.push_int(req_id);
        self.send(&out, req_id, enc).await;
    }

    // ========================================================================
    // News
    // ========================================================================

    pub async fn req_news_providers(&self) {
        let Some(out) = self.check_connected(NO_VALID_ID) else {
            return;
        };
        if !self.check_version(&out, server_version::REQ_NEWS_PROVIDERS, NO_VALID_ID, "news providers requests") {
            return;
        }
        let enc = MessageEncoder::new(out.server_version, outgoing::REQ_NEWS_PROVIDERS);
        self.send(&out, NO_VALID_ID, enc).await;
    }

    pub async fn req_news_article(
        &self,
        req_id: i32,
        provider_code: &str,
        article_id: &str,
        news_article_options: &[TagValue],
    ) {
        let Some(out) = self.check_connected(req_id) else {
            return;
        };
        if !self.check_version(&out, server_version::REQ_NEWS_ARTICLE, req_id, "news article requests") {
            return;
        }
        let mut enc = MessageEncoder::new(out.server_version, outgoing::REQ_NEWS_ARTICLE);
        enc.push_int(req_id).push_str(provider_code).push_str(article_id);
        if out.server_version >= server_version::NEWS_QUERY_ORIGINS {
            enc.push_tag_values(news_article_options);
        }
        self.send(&out, req_id, enc).await;
    }

    /// `provider_codes` joins several providers with `+`.
    #[allow(clippy::too_many_arguments)]
    pub async fn req_historical_news(
        &self,
        req_id: i32,
        con_id: i32,
        provider_codes: &str,
        start_date_time: &str,
        end_date_time: &str,
        total_results: i32,
        historical_news_options: &[TagValue],
    ) {
        let Some(out) = self.check_connected(req_id) else {
            return;
        };
        if !self.check_version(&out, server_version::REQ_HISTORICAL_NEWS, req_id, "historical news requests") {
            return;
        }
        let mut enc = MessageEncoder::new(out.server_version, outgoing::REQ_HISTORICAL_NEWS);
        enc.push_int(req_id)
            .push_int(con_id)
            .push_str(provider_codes)
            .push_str(start_date_time)
            .push_str(end_date_time)
            .push_int(total_results);
        if out.server_version >= server_version::NEWS_QUERY_ORIGINS {
            enc.push_tag_values(historical_news_options);
        }
        self.send(&out, req_id, enc).await;
    }

    // ========================================================================
    // Misc
    // ========================================================================

    pub async fn req_current_time(&self) {
        self.simple_request(outgoing::REQ_CURRENT_TIME, 1).await;
    }

    pub async fn req_current_time_in_millis(&self) {
        let Some(out) = self.check_connected(NO_VALID_ID) else {
            return;
        };
        if !self.check_version(
            &out,
            server_version::CURRENT_TIME_IN_MILLIS,
            NO_VALID_ID,
            "current time in millis requests",
        ) {
            return;
        }
        let enc = MessageEncoder::new(out.server_version, outgoing::REQ_CURRENT_TIME_IN_MILLIS);
        self.send(&out, NO_VALID_ID, enc).await;
    }

    pub async fn req_managed_accts(&self) {
        self.simple_request(outgoing::REQ_MANAGED_ACCTS, 1).await;
    }

    pub async fn req_family_codes(&self) {
        let Some(out) = self.check_connected(NO_VALID_ID) else {
            return;
        };
        if !self.check_version(&out, server_version::REQ_FAMILY_CODES, NO_VALID_ID, "family codes requests") {
            return;
        }
        let enc = MessageEncoder::new(out.server_version, outgoing::REQ_FAMILY_CODES);
        self.send(&out, NO_VALID_ID, enc).await;
    }

    pub async fn req_market_rule(&self, market_rule_id: i32) {
        let Some(out) = self.check_connected(NO_VALID_ID) else {
            return;
        };
        if !self.check_version(&out, server_version::MARKET_RULES, NO_VALID_ID, "market rule requests") {
            return;
        }
        let mut enc = MessageEncoder::new(out.server_version, outgoing::REQ_MARKET_RULE);
        enc.push_int(market_rule_id);
        self.send(&out, NO_VALID_ID, enc).await;
    }

    pub async fn req_user_info(&self, req_id: i32) {
        let Some(out) = self.check_connected(req_id) else {
            return;
        };
        if !self.check_version(&out, server_version::USER_INFO, req_id, "user info requests") {
            return;
        }
        let mut enc = MessageEncoder::new(out.server_version, outgoing::REQ_USER_INFO);
        enc.push_int(req_id);
        self.send(&out, req_id, enc).await;
    }

    /// 1 (system) through 5 (detail).
    pub async fn set_server_log_level(&self, log_level: i32) {
        let Some(out) = self.check_connected(NO_VALID_ID) else {
            return;
        };
        let mut enc = MessageEncoder::new(out.server_version, outgoing::SET_SERVER_LOGLEVEL);
        enc.push_int(1).push_int(log_level);
        self.send(&out, NO_VALID_ID, enc).await;
    }

    /// Requests with no payload beyond the message version.
    async fn simple_request(&self, msg_id: i32, version: i32) {
        let Some(out) = self.check_connected(NO_VALID_ID) else {
            return;
        };
        let mut enc = MessageEncoder::new(out.server_version, msg_id);
        enc.push_int(version);
        self.send(&out, NO_VALID_ID, enc).await;
    }
}

// ============================================================================
// Shared field groups
// ============================================================================

/// Short combo leg form used by market data and historical requests.
fn push_combo_legs(enc: &mut MessageEncoder, contract: &Contract) {
    enc.push_int(contract.combo_legs.len() as i32);
    for leg in &contract.combo_legs {
        enc.push_int(leg.con_id)
            .push_int(leg.ratio)
            .push_opt_display(leg.action.as_ref())
            .push_str(&leg.exchange);
    }
}

/// Order type and aux price always; the hedge details only when set.
fn push_delta_neutral_order(enc: &mut MessageEncoder, dn: &DeltaNeutralOrder) {
    enc.push_str(&dn.order_type).push_float_max(dn.aux_price);
    if dn.is_set() {
        enc.push_int(dn.con_id)
            .push_str(&dn.settling_firm)
            .push_str(&dn.clearing_account)
            .push_str(&dn.clearing_intent)
            .push_str(&dn.open_close)
            .push_bool(dn.short_sale)
            .push_int(dn.short_sale_slot)
            .push_str(&dn.designated_location);
    }
}

fn push_scale(enc: &mut MessageEncoder, scale: &ScaleParams) {
    enc.push_int_max(scale.init_level_size)
        .push_int_max(scale.subs_level_size)
        .push_float_max(scale.price_increment);
    if scale.has_adjustments() {
        enc.push_float_max(scale.price_adjust_value)
            .push_int_max(scale.price_adjust_interval)
            .push_float_max(scale.profit_offset)
            .push_bool(scale.auto_reset)
            .push_int_max(scale.init_position)
            .push_int_max(scale.init_fill_qty)
            .push_bool(scale.random_percent);
    }
    enc.push_str(&scale.table);
}

fn push_delta_neutral(enc: &mut MessageEncoder, contract: &Contract) {
    match &contract.delta_neutral_contract {
        Some(dn) => {
            enc.push_bool(true)
                .push_int(dn.con_id)
                .push_float(dn.delta)
                .push_float(dn.price);
        }
        None => {
            enc.push_bool(false);
        }
    }
}

/// Type, conjunction, then the kind's own fields: comparison first, then
/// scope, then anything kind specific.
fn push_condition(enc: &mut MessageEncoder, condition: &OrderCondition) {
    enc.push_int(i32::from(condition.kind.condition_type()))
        .push_str(condition.conjunction.wire_code());
    if let ConditionKind::Execution {
        sec_type,
        exchange,
        symbol,
    } = &condition.kind
    {
        enc.push_str(sec_type).push_str(exchange).push_str(symbol);
        return;
    }
    if let Some(comparison) = condition.kind.comparison() {
        enc.push_bool(comparison.is_more).push_str(&comparison.value);
    }
    if let Some(scope) = condition.kind.scope() {
        enc.push_int(scope.con_id).push_str(&scope.exchange);
    }
    if let ConditionKind::Price { trigger_method, .. } = &condition.kind {
        enc.push_int(i32::from(*trigger_method));
    }
}

/// First order feature the server is too old for, if any.
fn missing_order_feature(sv: i32, contract: &Contract, order: &Order) -> Option<(i32, &'static str)> {
    let order_type = order.order_type.as_ref();
    let peg_best_or_mid = matches!(order_type, Some(OrderType::PeggedToBest | OrderType::PeggedToMidpoint));
    let checks: [(bool, i32, &'static str); 20] = [
        (
            order_type == Some(&OrderType::PeggedToBenchmark) || !order.conditions.is_empty(),
            server_version::PEGGED_TO_BENCHMARK,
            "PEG BENCH orders and order conditions",
        ),
        (!order.model_code.is_empty(), server_version::MODELS_SUPPORT, "model code parameter"),
        (!order.ext_operator.is_empty(), server_version::EXT_OPERATOR, "ext operator parameter"),
        (
            !order.soft_dollar_tier.name.is_empty() || !order.soft_dollar_tier.value.is_empty(),
            server_version::SOFT_DOLLAR_TIER,
            "soft dollar tier",
        ),
        (order.cash_qty.is_some(), server_version::CASH_QTY, "cash quantity parameter"),
        (
            !order.mifid2.decision_maker.is_empty() || !order.mifid2.decision_algo.is_empty(),
            server_version::DECISION_MAKER,
            "MIFID II decision maker parameters",
        ),
        (
            !order.mifid2.execution_trader.is_empty() || !order.mifid2.execution_algo.is_empty(),
            server_version::MIFID_EXECUTION,
            "MIFID II execution parameters",
        ),
        (
            order.dont_use_auto_price_for_hedge,
            server_version::AUTO_PRICE_FOR_HEDGE,
            "don't use auto price for hedge parameter",
        ),
        (order.is_oms_container, server_version::ORDER_CONTAINER, "oms container parameter"),
        (
            order.discretionary_up_to_limit_price,
            server_version::D_PEG_ORDERS,
            "D-Peg orders",
        ),
        (order.use_price_mgmt_algo.is_some(), server_version::PRICE_MGMT_ALGO, "Use price management algo requests"),
        (order.duration.is_some(), server_version::DURATION, "duration attribute"),
        (order.post_to_ats.is_some(), server_version::POST_TO_ATS, "postToAts attribute"),
        (order.auto_cancel_parent, server_version::AUTO_CANCEL_PARENT, "autoCancelParent attribute"),
        (
            !order.advanced_error_override.is_empty(),
            server_version::ADVANCED_ORDER_REJECT,
            "advanced error override attribute",
        ),
        (!order.manual_order_time.is_empty(), server_version::MANUAL_ORDER_TIME, "manual order time attribute"),
        (
            (contract.exchange == "IBKRATS" && order.min_trade_qty.is_some()) || peg_best_or_mid,
            server_version::PEGBEST_PEGMID_OFFSETS,
            "PEG BEST / PEG MID order parameters",
        ),
        (!order.customer_account.is_empty(), server_version::CUSTOMER_ACCOUNT, "customer account parameter"),
        (order.include_overnight, server_version::INCLUDE_OVERNIGHT, "include overnight parameter"),
        (
            order.manual_order_indicator.is_some() || order.imbalance_only,
            if order.imbalance_only {
                server_version::IMBALANCE_ONLY
            } else {
                server_version::CME_TAGGING_FIELDS
            },
            "manual order indicator and imbalance only parameters",
        ),
    ];
    checks
        .into_iter()
        .find(|&(used, min_version, _)| used && sv < min_version)
        .map(|(_, min_version, feature)| (min_version, feature))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use crate::client::tests::connected;
    use crate::models::enums::{Action, TriggerMethod};

    use super::*;

    #[tokio::test]
    async fn current_time_and_millis() {
        let (client, rec, mut tws) = connected(200).await;
        client.req_current_time().await;
        client.req_current_time_in_millis().await;
        assert_eq!(&tws.next().await[..], b"49\x001\x00");
        assert_eq!(&tws.next().await[..], b"105\x00");
        assert_eq!(rec.take(), vec!["connect ack"]);
        client.disconnect().await;
    }

    #[tokio::test]
    async fn cancels_and_short_requests() {
        let (client, rec, mut tws) = connected(200).await;
        client.cancel_mkt_depth(4, false).await;
        client.cancel_tick_by_tick_data(7).await;
        client.req_open_orders().await;
        client.req_all_open_orders().await;
        client.req_auto_open_orders(true).await;
        client.req_matching_symbols(2, "IBM").await;
        client.cancel_historical_data(3).await;
        client.cancel_real_time_bars(3).await;
        client.req_account_updates(true, "DU1").await;
        client.cancel_account_summary(9).await;
        client.cancel_positions().await;
        client.req_pnl(5, "DU1", "").await;
        client.cancel_pnl(5).await;
        client.cancel_pnl_single(6).await;
        client.req_news_providers().await;
        client.req_family_codes().await;
        client.req_market_rule(26).await;
        client.set_server_log_level(5).await;

        let expected: [&[u8]; 18] = [
            b"11\x001\x004\x000\x00",
            b"98\x007\x00",
            b"5\x001\x00",
            b"16\x001\x00",
            b"15\x001\x001\x00",
            b"81\x002\x00IBM\x00",
            b"25\x001\x003\x00",
            b"51\x001\x003\x00",
            b"6\x002\x001\x00DU1\x00",
            b"63\x001\x009\x00",
            b"64\x001\x00",
            b"92\x005\x00DU1\x00\x00",
            b"93\x005\x00",
            b"95\x006\x00",
            b"85\x00",
            b"80\x00",
            b"91\x0026\x00",
            b"14\x001\x005\x00",
        ];
        for frame in expected {
            assert_eq!(&tws.next().await[..], frame);
        }
        assert_eq!(rec.take(), vec!["connect ack"]);
        client.disconnect().await;
    }

    #[tokio::test]
    async fn contract_history_and_news_requests_reach_the_wire() {
        let (client, rec, mut tws) = connected(200).await;
        let aapl = Contract::stock("AAPL", "USD");
        client.req_contract_details(1, &aapl).await;
        client.req_sec_def_opt_params(2, "AAPL", "", "STK", 265598).await;
        client.req_tick_by_tick_data(3, &aapl, "AllLast", 0, false).await;
        client.req_head_timestamp(4, &aapl, "TRADES", true, 1).await;
        client
            .req_historical_ticks(5, &aapl, "20240102 09:30:00", "", 100, "MIDPOINT", true, false, &[])
            .await;
        client.req_real_time_bars(6, &aapl, 5, "TRADES", true, &[]).await;
        client.req_news_article(7, "BRFG", "BRFG$04fb9da2", &[]).await;
        client
            .req_historical_news(8, 265598, "BRFG+DJNL", "", "", 10, &[])
            .await;

        for msg_id in ["9", "78", "97", "87", "96", "50", "84", "86"] {
            let frame = tws.next().await;
            let first = frame.split(|b| *b == 0).next().unwrap();
            assert_eq!(first, msg_id.as_bytes());
        }
        assert_eq!(rec.take(), vec!["connect ack"]);
        client.disconnect().await;
    }

    #[tokio::test]
    async fn market_data_for_a_stock() {
        let (client, _rec, mut tws) = connected(176).await;
        let contract = Contract::stock("AAPL", "USD");
        client.req_mkt_data(3, &contract, "233", false, false, &[]).await;
        assert_eq!(
            &tws.next().await[..],
            b"1\x0011\x003\x000\x00AAPL\x00STK\x00\x00\x00\x00\x00SMART\x00\x00USD\x00\x00\x00\
              0\x00233\x000\x000\x00\x00"
        );
        client.disconnect().await;
    }

    #[tokio::test]
    async fn old_server_rejects_new_features_and_sends_nothing() {
        let (client, rec, mut tws) = connected(100).await;
        rec.take();
        let contract = Contract::stock("AAPL", "USD");
        client.req_mkt_data(3, &contract, "", true, true, &[]).await;
        client.req_completed_orders(false).await;
        client.req_current_time_in_millis().await;
        client.req_ids(1).await;

        assert_eq!(
            rec.take(),
            vec![
                "error 3 503 The TWS is out of date and must be upgraded. It does not support regulatory snapshot requests.",
                "error -1 503 The TWS is out of date and must be upgraded. It does not support completed orders requests.",
                "error -1 503 The TWS is out of date and must be upgraded. It does not support current time in millis requests.",
            ]
        );
        // The only frame on the wire is the one that passed.
        assert_eq!(&tws.next().await[..], b"8\x001\x001\x00");
        assert!(client.is_connected());
        client.disconnect().await;
    }

    #[tokio::test]
    async fn depth_primary_exchange_is_gated() {
        let (client, rec, mut tws) = connected(148).await;
        rec.take();
        let mut contract = Contract::stock("IBM", "USD");
        contract.primary_exchange = "NYSE".into();
        client.req_mkt_depth(4, &contract, 5, true, &[]).await;
        let calls = rec.take();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].ends_with("It does not support primaryExch parameter in reqMktDepth."));

        contract.primary_exchange.clear();
        client.req_mkt_depth(4, &contract, 5, true, &[]).await;
        assert_eq!(
            &tws.next().await[..],
            b"10\x005\x004\x000\x00IBM\x00STK\x00\x00\x00\x00\x00SMART\x00USD\x00\x00\x00\
              5\x001\x00\x00"
        );
        client.disconnect().await;
    }

    #[tokio::test]
    async fn limit_order_with_price_condition() {
        let (client, _rec, mut tws) = connected(176).await;
        let contract = Contract::stock("AAPL", "USD");
        let order = Order {
            action: Some(Action::Buy),
            total_quantity: Some(Decimal::from(100)),
            order_type: Some(OrderType::Limit),
            lmt_price: Some(150.25),
            conditions: vec![OrderCondition::price(true, 150.5, 265598, "SMART", TriggerMethod::Last)],
            ..Default::default()
        };
        client.place_order(5, &contract, &order).await;

        let frame = tws.next().await;
        assert!(frame.starts_with(
            b"3\x005\x000\x00AAPL\x00STK\x00\x00\x00\x00\x00SMART\x00\x00USD\x00\x00\x00\x00\x00\
              BUY\x00100\x00LMT\x00150.25\x00\x00"
        ));
        let condition = b"1\x001\x00a\x001\x00150.5\x00265598\x00SMART\x002\x000\x000\x00";
        assert!(frame.windows(condition.len()).any(|w| w == condition));
        client.disconnect().await;
    }

    #[tokio::test]
    async fn order_feature_gates() {
        let (client, rec, mut tws) = connected(110).await;
        rec.take();
        let contract = Contract::stock("AAPL", "USD");
        let order = Order {
            action: Some(Action::Buy),
            total_quantity: Some(Decimal::from_str("1.5").unwrap()),
            order_type: Some(OrderType::Market),
            cash_qty: Some(1000.0),
            ..Default::default()
        };
        client.place_order(9, &contract, &order).await;
        assert_eq!(
            rec.take(),
            vec!["error 9 503 The TWS is out of date and must be upgraded. It does not support cash quantity parameter."]
        );

        let order = Order { cash_qty: None, ..order };
        client.place_order(9, &contract, &order).await;
        let frame = tws.next().await;
        // Below ORDER_CONTAINER the message version still leads.
        assert!(frame.starts_with(b"3\x0045\x009\x00"));
        assert!(rec.take().is_empty());
        client.disconnect().await;
    }

    #[tokio::test]
    async fn cancel_order_layout_by_version() {
        let (client, _rec, mut tws) = connected(176).await;
        client.cancel_order(5, &OrderCancel::default()).await;
        assert_eq!(&tws.next().await[..], b"4\x001\x005\x00\x00");
        client.disconnect().await;

        let (client, _rec, mut tws) = connected(200).await;
        let cancel = OrderCancel {
            ext_operator: "desk".into(),
            manual_order_indicator: Some(1),
            ..Default::default()
        };
        client.cancel_order(5, &cancel).await;
        assert_eq!(&tws.next().await[..], b"4\x005\x00\x00desk\x001\x00");
        client.req_global_cancel(&OrderCancel::default()).await;
        assert_eq!(&tws.next().await[..], b"58\x00\x00\x00");
        client.disconnect().await;
    }

    #[tokio::test]
    async fn execution_filter_days() {
        let (client, rec, mut tws) = connected(200).await;
        let filter = ExecutionFilter {
            last_n_days: Some(3),
            specific_dates: vec![20240102, 20240103],
            ..Default::default()
        };
        client.req_executions(11, &filter).await;
        assert_eq!(
            &tws.next().await[..],
            b"7\x003\x0011\x000\x00\x00\x00\x00\x00\x00\x003\x002\x0020240102\x0020240103\x00"
        );
        client.disconnect().await;

        let (client, rec2, _tws) = connected(199).await;
        rec2.take();
        client.req_executions(11, &filter).await;
        assert_eq!(rec2.take().len(), 1);
        assert_eq!(rec.take(), vec!["connect ack"]);
        client.disconnect().await;
    }

    #[tokio::test]
    async fn historical_bars_keep_up_to_date() {
        let (client, _rec, mut tws) = connected(176).await;
        let contract = Contract::stock("SPY", "USD");
        client
            .req_historical_data(2, &contract, "", "1 D", "1 min", "TRADES", true, 1, true, &[])
            .await;
        assert_eq!(
            &tws.next().await[..],
            b"20\x002\x000\x00SPY\x00STK\x00\x00\x00\x00\x00SMART\x00\x00USD\x00\x00\x00\
              0\x00\x001 min\x001 D\x001\x00TRADES\x001\x001\x00\x00"
        );
        client.disconnect().await;
    }

    #[tokio::test]
    async fn account_requests() {
        let (client, _rec, mut tws) = connected(176).await;
        client.req_account_summary(1, "All", "NetLiquidation").await;
        client.req_positions().await;
        client.req_pnl_single(2, "DU1", "", 8314).await;
        assert_eq!(&tws.next().await[..], b"62\x001\x001\x00All\x00NetLiquidation\x00");
        assert_eq!(&tws.next().await[..], b"61\x001\x00");
        assert_eq!(&tws.next().await[..], b"94\x002\x00DU1\x00\x008314\x00");
        client.disconnect().await;
    }

    #[test]
    fn condition_field_order() {
        let execution = OrderCondition {
            conjunction: crate::models::condition::Conjunction::Or,
            kind: ConditionKind::Execution {
                sec_type: "STK".into(),
                exchange: "SMART".into(),
                symbol: "IBM".into(),
            },
        };
        let mut enc = MessageEncoder::new(176, 0);
        push_condition(&mut enc, &execution);
        push_condition(&mut enc, &OrderCondition::time(false, "20240101 09:30:00"));
        let frame = enc.finish().unwrap();
        assert_eq!(
            &frame[4..],
            b"0\x005\x00o\x00STK\x00SMART\x00IBM\x003\x00a\x000\x0020240101 09:30:00\x00"
        );
    }
}
