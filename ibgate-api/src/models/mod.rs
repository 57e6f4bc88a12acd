//! Plain data records carried by requests and events.

pub mod account;
pub mod common;
pub mod condition;
pub mod contract;
pub mod enums;
pub mod execution;
pub mod market_data;
pub mod order;
