// Hotel-inclusive live pricing feed
// Wire types, the client trait and the mapping from raw responses to pricing results.

use crate::config::{ClientConfig, ConfigError};
use crate::date_range::DateRange;
use crate::pricing::round_money;
use crate::travelers::TravelerComposition;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const NO_AVAILABILITY_MESSAGE: &str = "No rooms available for these dates";
pub const MISSING_TOTAL_MESSAGE: &str = "Live pricing returned no total for these dates";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LivePricingError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("Pricing service error: {status} - {message}")]
    Status { status: u16, message: String },

    #[error("Malformed pricing response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LivePricingRequest {
    pub package_id: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub travelers: TravelerComposition,
    pub currency: String,
}

impl LivePricingRequest {
    pub fn date_range(&self) -> DateRange {
        DateRange {
            check_in: self.check_in,
            check_out: self.check_out,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LivePricingResponse {
    pub available: bool,
    #[serde(default)]
    pub total_pricing: Option<TotalPricing>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub rooms: Vec<RoomRate>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalPricing {
    #[serde(default)]
    pub final_total: Option<f64>,
    #[serde(default)]
    pub grand_total: Option<f64>,
    #[serde(default)]
    pub price_per_person: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRate {
    pub room_type: String,
    #[serde(default)]
    pub nights: u32,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiveQuote {
    pub total: f64,
    pub currency: String,
    pub price_per_person: Option<f64>,
    pub rooms: Vec<RoomRate>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LivePricingResult {
    Available(LiveQuote),
    Unavailable { reason: String },
    Error(LivePricingError),
}

impl LivePricingResult {
    pub fn from_outcome(
        outcome: Result<LivePricingResponse, LivePricingError>,
        currency: &str,
    ) -> Self {
        match outcome {
            Ok(response) => response.interpret(currency),
            Err(e) => LivePricingResult::Error(e),
        }
    }

    pub fn total(&self) -> Option<f64> {
        match self {
            LivePricingResult::Available(quote) => Some(quote.total),
            _ => None,
        }
    }
}

impl LivePricingResponse {
    pub fn interpret(self, currency: &str) -> LivePricingResult {
        if !self.available {
            return LivePricingResult::Unavailable {
                reason: self
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| NO_AVAILABILITY_MESSAGE.to_string()),
            };
        }

        let pricing = self.total_pricing.unwrap_or_default();
        // finalTotal is preferred when the feed sends both
        let total = pricing.final_total.or(pricing.grand_total).unwrap_or(0.0);

        // A missing or zero total is not a free stay
        if !total.is_finite() || total <= 0.0 {
            return LivePricingResult::Unavailable {
                reason: MISSING_TOTAL_MESSAGE.to_string(),
            };
        }

        LivePricingResult::Available(LiveQuote {
            total: round_money(total),
            currency: currency.to_string(),
            price_per_person: pricing.price_per_person.map(round_money),
            rooms: self.rooms,
        })
    }
}

#[async_trait]
pub trait LivePricingClient: Send + Sync + 'static {
    async fn fetch_quote(
        &self,
        request: &LivePricingRequest,
    ) -> Result<LivePricingResponse, LivePricingError>;
}

pub struct HttpLivePricingClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    timeout_ms: u64,
}

impl HttpLivePricingClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint(&config.live_pricing_path),
            api_key: config.api_key.clone(),
            timeout_ms: config.timeout_ms,
        })
    }
}

#[async_trait]
impl LivePricingClient for HttpLivePricingClient {
    async fn fetch_quote(
        &self,
        request: &LivePricingRequest,
    ) -> Result<LivePricingResponse, LivePricingError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LivePricingError::Timeout(self.timeout_ms)
                } else {
                    LivePricingError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LivePricingError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<LivePricingResponse>()
            .await
            .map_err(|e| LivePricingError::Decode(e.to_string()))
    }
}
