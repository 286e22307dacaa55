/// Core data types for the botpulse dashboard
///
/// These types match the JSON payloads served by the bot's REST API
/// (`/stats/performance`, `/trades/active`, `/trades/closed`, `/trades/history`).
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Scoping window applied to aggregate queries.
///
/// Passed verbatim as the `timeframe` query parameter; the server performs
/// all filtering, nothing is re-filtered client-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Daily,
    Weekly,
    Monthly,
    #[default]
    All,
}

impl Timeframe {
    /// Every timeframe, in the order the filter row displays them.
    pub const ALL: [Timeframe; 4] = [
        Timeframe::Daily,
        Timeframe::Weekly,
        Timeframe::Monthly,
        Timeframe::All,
    ];

    /// Query-parameter value expected by the server
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Daily => "daily",
            Timeframe::Weekly => "weekly",
            Timeframe::Monthly => "monthly",
            Timeframe::All => "all",
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Server-computed performance aggregates, consumed as-is.
///
/// Win/loss counts and drawdown are authoritative here; the client never
/// recomputes them. Every field defaults so a partial payload still
/// deserializes (missing fields render as zero).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PerformanceStats {
    /// Net profit and loss over the requested timeframe
    #[serde(default)]
    pub total_pnl: f64,
    /// Percentage of winning trades, in [0, 100]
    #[serde(default)]
    pub win_rate: f64,
    /// Gross profits / gross losses
    #[serde(default)]
    pub profit_factor: f64,
    /// Total closed trades in the timeframe
    #[serde(default)]
    pub total_trades: u64,
    /// Winning trade count
    #[serde(default)]
    pub wins: u64,
    /// Losing trade count
    #[serde(default)]
    pub losses: u64,
    /// Peak-to-trough equity decline, percent
    #[serde(default)]
    pub max_drawdown: f64,
}

/// One open position, keyed by symbol in the wire map.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ActiveTrade {
    /// Instrument symbol (e.g. "BTC/USDT")
    #[serde(default)]
    pub symbol: String,
    /// Entry price
    pub entry: f64,
    /// Latest marked price
    pub current_price: f64,
    /// Unrealized profit and loss at the current price
    pub unrealized_pnl: f64,
}

/// Wire shape of `/trades/active`: symbol -> open position
pub type ActiveTrades = HashMap<String, ActiveTrade>;

/// One closed trade; insertion order in the wire sequence is chronological.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClosedTrade {
    /// Instrument symbol in `BASE/QUOTE` format
    pub symbol: String,
    /// Realized profit and loss; `null` for trades the server could not settle
    pub pnl: Option<f64>,
    /// Close timestamp
    pub closed_at: DateTime<Utc>,
}

impl ClosedTrade {
    /// Base asset: portion of the symbol before the `/` separator,
    /// or the whole symbol when there is no separator.
    pub fn base_asset(&self) -> &str {
        self.symbol.split('/').next().unwrap_or(&self.symbol)
    }
}

/// One point on the cumulative equity curve; rendering only.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub equity: f64,
}

/// Net PnL of one base asset, derived from the closed-trade list.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetPnl {
    pub symbol: String,
    pub net_pnl: f64,
}

/// One of the 10 equal-width PnL ranges in the distribution chart.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    /// Inclusive lower bound of the range
    pub lower_bound: f64,
    /// Lower bound formatted to one decimal place, used as the axis label
    pub label: String,
    /// Trades falling in this range
    pub count: usize,
}

/// Server-reported win/loss split for the ratio chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WinLossShare {
    pub wins: u64,
    pub losses: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeframe_query_values() {
        assert_eq!(Timeframe::Daily.as_str(), "daily");
        assert_eq!(Timeframe::Weekly.as_str(), "weekly");
        assert_eq!(Timeframe::Monthly.as_str(), "monthly");
        assert_eq!(Timeframe::All.as_str(), "all");
        assert_eq!(Timeframe::default(), Timeframe::All);
    }

    #[test]
    fn test_performance_stats_partial_payload() {
        let stats: PerformanceStats =
            serde_json::from_str(r#"{"total_pnl": 1250.5, "wins": 12}"#).unwrap();
        assert_eq!(stats.total_pnl, 1250.5);
        assert_eq!(stats.wins, 12);
        assert_eq!(stats.losses, 0);
        assert_eq!(stats.win_rate, 0.0);
    }

    #[test]
    fn test_active_trades_wire_shape() {
        let json = r#"{
            "BTC/USDT": {"symbol": "BTC/USDT", "entry": 64000.0, "current_price": 64850.0, "unrealized_pnl": 42.5}
        }"#;
        let trades: ActiveTrades = serde_json::from_str(json).unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades["BTC/USDT"].unrealized_pnl, 42.5);
    }

    #[test]
    fn test_closed_trade_null_pnl() {
        let json = r#"[
            {"symbol": "ETH/USDT", "pnl": -12.0, "closed_at": "2025-06-01T10:00:00Z"},
            {"symbol": "SOL/USDT", "pnl": null, "closed_at": "2025-06-01T11:00:00Z"}
        ]"#;
        let trades: Vec<ClosedTrade> = serde_json::from_str(json).unwrap();
        assert_eq!(trades[0].pnl, Some(-12.0));
        assert_eq!(trades[1].pnl, None);
    }

    #[test]
    fn test_base_asset_split() {
        let trade = ClosedTrade {
            symbol: "BTC/USDT".into(),
            pnl: Some(1.0),
            closed_at: Utc::now(),
        };
        assert_eq!(trade.base_asset(), "BTC");

        let bare = ClosedTrade {
            symbol: "BTCUSDT".into(),
            pnl: Some(1.0),
            closed_at: Utc::now(),
        };
        assert_eq!(bare.base_asset(), "BTCUSDT");
    }
}
