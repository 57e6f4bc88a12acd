//! Typed replacements for the protocol's string and integer codes.
//!
//! String codes keep an `Other(String)` variant so that a value the server
//! introduces later still decodes instead of desynchronizing the frame.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Defines an enum whose wire form is a short text code.
///
/// The first literal of each variant is the canonical encoding; further
/// literals after `|` are accepted aliases on decode.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident = $text:literal $(| $alias:literal)*,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)*
            /// Code not known to this client.
            Other(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $text,)*
                    Self::Other(s) => s,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(match s {
                    $($text $(| $alias)* => Self::$variant,)*
                    other => Self::Other(other.to_string()),
                })
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let text = String::deserialize(deserializer)?;
                match text.parse::<Self>() {
                    Ok(value) => Ok(value),
                    Err(never) => match never {},
                }
            }
        }
    };
}

/// Defines a `#[repr(i32)]` enum carried on the wire as an integer field.
macro_rules! int_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $code:literal,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[repr(i32)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $code,)*
        }

        impl TryFrom<i32> for $name {
            type Error = i32;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                match value {
                    $($code => Ok(Self::$variant),)*
                    other => Err(other),
                }
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> i32 {
                value as i32
            }
        }
    };
}

// ============================================================================
// Contract codes
// ============================================================================

text_enum! {
    /// Security type of a contract.
    SecType {
        Stock = "STK",
        Option = "OPT",
        Future = "FUT",
        ContinuousFuture = "CONTFUT",
        Forex = "CASH",
        Index = "IND",
        FutureOption = "FOP",
        Bond = "BOND",
        Fund = "FUND",
        Warrant = "WAR",
        Commodity = "CMDTY",
        Combo = "BAG",
        News = "NEWS",
        Crypto = "CRYPTO",
    }
}

text_enum! {
    /// Option right. The server sometimes spells it out.
    Right {
        Call = "C" | "CALL",
        Put = "P" | "PUT",
    }
}

text_enum! {
    SecIdType {
        Cusip = "CUSIP",
        Sedol = "SEDOL",
        Isin = "ISIN",
        Ric = "RIC",
    }
}

// ============================================================================
// Order codes
// ============================================================================

text_enum! {
    Action {
        Buy = "BUY",
        Sell = "SELL",
        SellShort = "SSHORT",
        SellLong = "SLONG",
    }
}

text_enum! {
    OrderType {
        Market = "MKT",
        Limit = "LMT",
        Stop = "STP",
        StopLimit = "STP LMT",
        TrailingStop = "TRAIL",
        TrailingStopLimit = "TRAIL LIMIT",
        Relative = "REL",
        MarketOnClose = "MOC",
        LimitOnClose = "LOC",
        MarketOnOpen = "MOO",
        LimitOnOpen = "LOO",
        PeggedToMarket = "PEG MKT",
        PeggedToMidpoint = "PEG MID",
        PeggedToBest = "PEG BEST",
        PeggedToBenchmark = "PEG BENCH",
        PeggedToPrimary = "PEG PRIM",
        Volatility = "VOL",
        MarketIfTouched = "MIT",
        LimitIfTouched = "LIT",
        MarketWithProtection = "MKT PRT",
        MidPrice = "MIDPRICE",
        SnapToMarket = "SNAP MKT",
        SnapToMidpoint = "SNAP MID",
        SnapToPrimary = "SNAP PRIM",
    }
}

text_enum! {
    TimeInForce {
        Day = "DAY",
        GoodTilCancelled = "GTC",
        ImmediateOrCancel = "IOC",
        GoodTilDate = "GTD",
        AtTheOpening = "OPG",
        FillOrKill = "FOK",
        DayTilCancelled = "DTC",
    }
}

text_enum! {
    /// Fund asset class reported in contract details.
    FundAssetType {
        Others = "000",
        MoneyMarket = "001",
        FixedIncome = "002",
        MultiAsset = "003",
        Equity = "004",
        Sector = "005",
        Guaranteed = "006",
        Alternative = "007",
    }
}

text_enum! {
    FundDistributionPolicyIndicator {
        AccumulationFund = "N",
        IncomeFund = "Y",
    }
}

// ============================================================================
// Integer codes
// ============================================================================

int_enum! {
    /// Who originated an order.
    Origin {
        Customer = 0,
        Firm = 1,
        Unknown = 2,
    }
}

impl Default for Origin {
    fn default() -> Self {
        Origin::Customer
    }
}

int_enum! {
    AuctionStrategy {
        Unset = 0,
        Match = 1,
        Improvement = 2,
        Transparent = 3,
    }
}

impl Default for AuctionStrategy {
    fn default() -> Self {
        AuctionStrategy::Unset
    }
}

int_enum! {
    /// Open/close instruction of a combo leg.
    LegOpenClose {
        Same = 0,
        Open = 1,
        Close = 2,
        Unknown = 3,
    }
}

impl Default for LegOpenClose {
    fn default() -> Self {
        LegOpenClose::Same
    }
}

int_enum! {
    MarketDataType {
        RealTime = 1,
        Frozen = 2,
        Delayed = 3,
        DelayedFrozen = 4,
    }
}

int_enum! {
    /// How the server evaluates a price trigger.
    TriggerMethod {
        Default = 0,
        DoubleBidAsk = 1,
        Last = 2,
        DoubleLast = 3,
        BidAsk = 4,
        LastOrBidAsk = 7,
        MidPoint = 8,
    }
}

impl Default for TriggerMethod {
    fn default() -> Self {
        TriggerMethod::Default
    }
}

int_enum! {
    /// Discriminant of an order condition on the wire.
    ConditionType {
        Price = 1,
        Time = 3,
        Margin = 4,
        Execution = 5,
        Volume = 6,
        PercentChange = 7,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_codes_display_and_parse() {
        for (variant, code) in [
            (SecType::Stock, "STK"),
            (SecType::Forex, "CASH"),
            (SecType::Combo, "BAG"),
            (SecType::Crypto, "CRYPTO"),
        ] {
            assert_eq!(variant.to_string(), code);
            assert_eq!(code.parse::<SecType>().unwrap(), variant);
        }
        assert_eq!("STP LMT".parse::<OrderType>().unwrap(), OrderType::StopLimit);
        assert_eq!(OrderType::PeggedToBest.to_string(), "PEG BEST");
    }

    #[test]
    fn unknown_code_is_kept() {
        let parsed: SecType = "IOPT".parse().unwrap();
        assert_eq!(parsed, SecType::Other("IOPT".to_string()));
        assert_eq!(parsed.to_string(), "IOPT");
    }

    #[test]
    fn right_accepts_long_spelling() {
        assert_eq!("CALL".parse::<Right>().unwrap(), Right::Call);
        assert_eq!("P".parse::<Right>().unwrap(), Right::Put);
        assert_eq!(Right::Call.to_string(), "C");
    }

    #[test]
    fn serde_uses_wire_text() {
        let json = serde_json::to_string(&Action::SellShort).unwrap();
        assert_eq!(json, "\"SSHORT\"");
        let back: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Action::SellShort);
    }

    #[test]
    fn int_codes() {
        assert_eq!(TriggerMethod::try_from(7), Ok(TriggerMethod::LastOrBidAsk));
        assert_eq!(TriggerMethod::try_from(5), Err(5));
        assert_eq!(i32::from(ConditionType::PercentChange), 7);
        assert_eq!(Origin::default(), Origin::Customer);
    }
}
