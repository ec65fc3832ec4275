// Coupon validation boundary
// The coupon service computes the discount amount; the client never re-derives it.

use crate::config::{ClientConfig, ConfigError};
use crate::pricing::{round_money, DiscountType};
use crate::quote::QuoteError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    NotFound,
    Expired,
    NotApplicableToPackage,
    MinimumAmountNotMet,
    NetworkFailure,
}

impl RejectionReason {
    // Machine codes the coupon service may send alongside `success: false`
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "EXPIRED" => RejectionReason::Expired,
            "NOT_APPLICABLE" | "NOT_APPLICABLE_TO_PACKAGE" => {
                RejectionReason::NotApplicableToPackage
            }
            "MINIMUM_AMOUNT_NOT_MET" | "MIN_AMOUNT" => RejectionReason::MinimumAmountNotMet,
            _ => RejectionReason::NotFound,
        }
    }

    pub fn default_message(self) -> &'static str {
        match self {
            RejectionReason::NotFound => "This coupon code does not exist",
            RejectionReason::Expired => "This coupon has expired",
            RejectionReason::NotApplicableToPackage => "This coupon cannot be used for this package",
            RejectionReason::MinimumAmountNotMet => {
                "Your booking does not reach the minimum amount for this coupon"
            }
            RejectionReason::NetworkFailure => "Could not reach the coupon service, please try again",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RejectionReason::NotFound => "not found",
            RejectionReason::Expired => "expired",
            RejectionReason::NotApplicableToPackage => "not applicable to package",
            RejectionReason::MinimumAmountNotMet => "minimum amount not met",
            RejectionReason::NetworkFailure => "network failure",
        };
        f.write_str(label)
    }
}

// A rejected coupon; `message` is the user-visible text
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Coupon rejected ({reason}): {message}")]
pub struct CouponRejection {
    pub reason: RejectionReason,
    pub message: String,
}

impl CouponRejection {
    pub fn new(reason: RejectionReason, message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| reason.default_message().to_string());
        Self { reason, message }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CouponError {
    #[error(transparent)]
    Rejected(#[from] CouponRejection),

    #[error("Quote changed while coupon {code} was being validated")]
    Superseded { code: String },

    #[error("Cannot apply a coupon: {0}")]
    Quote(#[from] QuoteError),
}

// Discount granted by the coupon service for one specific amount
#[derive(Debug, Clone, PartialEq)]
pub struct CouponGrant {
    pub discount_type: DiscountType,
    pub discount_value: f64,
    pub discount_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedCoupon {
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    pub discount_amount: f64,
    // Pre-coupon amount the grant was computed against
    pub validated_against: f64,
}

impl AppliedCoupon {
    pub fn from_grant(code: impl Into<String>, grant: CouponGrant, validated_against: f64) -> Self {
        Self {
            code: code.into(),
            discount_type: grant.discount_type,
            discount_value: grant.discount_value,
            discount_amount: grant.discount_amount,
            validated_against,
        }
    }

    // Only usable while the pre-coupon amount is the one it was validated against
    pub fn is_valid_for(&self, pre_coupon_amount: f64) -> bool {
        (round_money(pre_coupon_amount) - round_money(self.validated_against)).abs() < 0.005
    }
}

// Wire types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponRequest {
    pub code: String,
    pub package_id: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CouponResponse {
    pub success: bool,
    #[serde(default)]
    pub discount: Option<CouponDiscount>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CouponDiscount {
    #[serde(rename = "type")]
    pub discount_type: DiscountType,
    pub value: f64,
    pub amount: f64,
}

impl CouponResponse {
    // Map the service answer for `request` into a grant or a rejection
    pub fn into_grant(self, request: &CouponRequest) -> Result<CouponGrant, CouponRejection> {
        if !self.success {
            let reason = self
                .reason
                .as_deref()
                .map(RejectionReason::from_code)
                .unwrap_or(RejectionReason::NotFound);
            return Err(CouponRejection::new(reason, self.message));
        }

        match self.discount {
            Some(discount) if discount.amount.is_finite() && discount.amount >= 0.0 => {
                Ok(CouponGrant {
                    discount_type: discount.discount_type,
                    discount_value: discount.value,
                    // Bounded by the amount it was validated against
                    discount_amount: round_money(discount.amount.min(request.amount)),
                })
            }
            _ => Err(CouponRejection::new(
                RejectionReason::NetworkFailure,
                Some("The coupon service returned an unusable discount".to_string()),
            )),
        }
    }
}

#[async_trait]
pub trait CouponValidator: Send + Sync + 'static {
    async fn validate(&self, request: &CouponRequest) -> Result<CouponGrant, CouponRejection>;
}

pub struct HttpCouponValidator {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpCouponValidator {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint(&config.coupon_path),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl CouponValidator for HttpCouponValidator {
    async fn validate(&self, request: &CouponRequest) -> Result<CouponGrant, CouponRejection> {
        tracing::debug!(
            code = %request.code,
            package_id = %request.package_id,
            amount = request.amount,
            "validating coupon"
        );

        let network_failure = |e: reqwest::Error| {
            tracing::warn!(error = %e, "coupon service request failed");
            CouponRejection::new(RejectionReason::NetworkFailure, None)
        };

        // Rejections come back with 4xx statuses and a JSON body, so the status is not checked
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(network_failure)?;

        let body: CouponResponse = response.json().await.map_err(network_failure)?;
        body.into_grant(request)
    }
}
