/// Botpulse Client - Shared Library
///
/// This library provides everything the dashboard binary needs to talk to
/// the trading bot's REST API:
/// - Session gateway (bearer credential, durable token slot, 401 interceptor)
/// - REST API surface for the four dashboard resources
/// - Data-sync loop (periodic all-or-nothing refresh batches)
/// - Trade analytics (per-asset PnL ranking, PnL histogram, win/loss share)
pub mod analytics;
pub mod api;
pub mod config;
pub mod error;
pub mod session;
pub mod sync;
pub mod types;

// Re-export commonly used types for convenience
pub use analytics::{asset_pnl_ranking, pnl_histogram, win_loss_share, win_rate_label};
pub use api::{RestApi, TradingApi};
pub use config::ClientConfig;
pub use error::ClientError;
pub use session::{SessionEvent, SessionGateway, TokenStore};
pub use sync::{spawn_data_sync, DashboardSnapshot, SyncHandle};
pub use types::{
    ActiveTrade, ActiveTrades, AssetPnl, ClosedTrade, EquityPoint, HistogramBin,
    PerformanceStats, Timeframe, WinLossShare,
};
