//! REST surface of the trading bot's API.
//!
//! [`TradingApi`] is the seam the sync loop polls through; [`RestApi`] is the
//! reqwest-backed implementation. Every call goes authorize -> send ->
//! observe -> deserialize, so the session gateway sees every response.

use crate::error::ClientError;
use crate::session::SessionGateway;
use crate::types::{ActiveTrades, ClosedTrade, EquityPoint, PerformanceStats, Timeframe};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// The four resources one dashboard refresh batch is made of.
///
/// Active trades are unscoped; the other three are scoped by [`Timeframe`]
/// on the server, never re-filtered client-side.
#[async_trait]
pub trait TradingApi: Send + Sync {
    async fn performance(&self, timeframe: Timeframe) -> Result<PerformanceStats, ClientError>;
    async fn active_trades(&self) -> Result<ActiveTrades, ClientError>;
    async fn closed_trades(&self, timeframe: Timeframe) -> Result<Vec<ClosedTrade>, ClientError>;
    async fn equity_history(&self, timeframe: Timeframe) -> Result<Vec<EquityPoint>, ClientError>;
}

/// reqwest-backed [`TradingApi`] implementation.
#[derive(Debug, Clone)]
pub struct RestApi {
    http: reqwest::Client,
    api_url: String,
    gateway: Arc<SessionGateway>,
}

impl RestApi {
    pub fn new(gateway: Arc<SessionGateway>) -> Self {
        Self {
            http: gateway.http_client(),
            api_url: gateway.api_url().to_string(),
            gateway,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        timeframe: Option<Timeframe>,
    ) -> Result<T, ClientError> {
        let url = format!("{}{}", self.api_url, path);
        let mut request = self.http.get(&url);
        if let Some(timeframe) = timeframe {
            request = request.query(&[("timeframe", timeframe.as_str())]);
        }

        debug!("GET {} timeframe={:?}", url, timeframe);
        let response = self.gateway.authorize(request).send().await?;
        let response = self.gateway.observe(response)?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl TradingApi for RestApi {
    async fn performance(&self, timeframe: Timeframe) -> Result<PerformanceStats, ClientError> {
        self.get_json("/stats/performance", Some(timeframe)).await
    }

    async fn active_trades(&self) -> Result<ActiveTrades, ClientError> {
        self.get_json("/trades/active", None).await
    }

    async fn closed_trades(&self, timeframe: Timeframe) -> Result<Vec<ClosedTrade>, ClientError> {
        self.get_json("/trades/closed", Some(timeframe)).await
    }

    async fn equity_history(&self, timeframe: Timeframe) -> Result<Vec<EquityPoint>, ClientError> {
        self.get_json("/trades/history", Some(timeframe)).await
    }
}
