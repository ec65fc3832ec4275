use anyhow::Result;
use chrono::NaiveDate;
use httpmock::prelude::*;
use package_quote_engine::coupon::CouponRequest;
use package_quote_engine::{
    Adjustment, ClientConfig, CouponValidator, DiscountPolicy, HttpCouponValidator,
    HttpLivePricingClient, LivePricingClient, LivePricingCoordinator, LivePricingError,
    LivePricingRequest, LivePricingResult, OfferingKind, PackageContext, PriceSource,
    PricingNotice, PricingSchedule, RejectionReason, TravelerClass, TravelerComposition,
};
use serde_json::json;
use std::sync::Arc;
use tokio_test::assert_ok;

fn config(base_url: String) -> ClientConfig {
    ClientConfig {
        base_url,
        api_key: "test_key".to_string(),
        timeout_ms: 2000,
        ..ClientConfig::default()
    }
}

fn coupon_request() -> CouponRequest {
    CouponRequest {
        code: "SUMMER10".to_string(),
        package_id: "pkg-1".to_string(),
        amount: 1800.0,
    }
}

fn live_request(adults: u32) -> LivePricingRequest {
    LivePricingRequest {
        package_id: "pkg-1".to_string(),
        check_in: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        check_out: NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(),
        travelers: TravelerComposition::new(adults, 0, 0),
        currency: "USD".to_string(),
    }
}

fn hotel_package() -> PackageContext {
    PackageContext {
        id: "pkg-1".to_string(),
        kind: OfferingKind::Package,
        duration_nights: 3,
        hotel_components: 2,
        schedule: PricingSchedule::new(1000.0, "USD")
            .and_then(|s| s.with_discount(DiscountPolicy::Percentage(10.0)))
            .unwrap(),
    }
}

#[tokio::test]
async fn test_coupon_validated_over_http() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/coupons/validate")
                .header("authorization", "Bearer test_key")
                .json_body(json!({"code": "SUMMER10", "packageId": "pkg-1", "amount": 1800.0}));
            then.status(200).json_body(json!({
                "success": true,
                "discount": {"type": "percentage", "value": 10, "amount": 180}
            }));
        })
        .await;

    let validator = HttpCouponValidator::new(&config(server.base_url()))?;
    let grant = assert_ok!(validator.validate(&coupon_request()).await);

    mock.assert_async().await;
    assert_eq!(grant.discount_amount, 180.0);
    assert_eq!(grant.discount_value, 10.0);
    Ok(())
}

#[tokio::test]
async fn test_coupon_rejection_body_on_error_status() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/coupons/validate");
            then.status(422).json_body(json!({
                "success": false,
                "reason": "MINIMUM_AMOUNT_NOT_MET",
                "message": "Spend at least 2500 to use this coupon"
            }));
        })
        .await;

    let validator = HttpCouponValidator::new(&config(server.base_url()))?;
    let rejection = validator.validate(&coupon_request()).await.unwrap_err();

    assert_eq!(rejection.reason, RejectionReason::MinimumAmountNotMet);
    assert_eq!(rejection.message, "Spend at least 2500 to use this coupon");
    Ok(())
}

#[tokio::test]
async fn test_coupon_service_failure_is_network_failure() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/coupons/validate");
            then.status(502).body("Bad Gateway");
        })
        .await;

    let validator = HttpCouponValidator::new(&config(server.base_url()))?;
    let rejection = validator.validate(&coupon_request()).await.unwrap_err();
    assert_eq!(rejection.reason, RejectionReason::NetworkFailure);
    Ok(())
}

#[tokio::test]
async fn test_live_pricing_over_http() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/pricing/live")
                .json_body(json!({
                    "packageId": "pkg-1",
                    "checkIn": "2025-06-01",
                    "checkOut": "2025-06-03",
                    "travelers": {"adults": 2, "children": 0, "infants": 0},
                    "currency": "USD"
                }));
            then.status(200).json_body(json!({
                "available": true,
                "totalPricing": {"grandTotal": 2310.4, "pricePerPerson": 1155.2},
                "rooms": [{"roomType": "Double", "nights": 2, "total": 910.4}]
            }));
        })
        .await;

    let client = HttpLivePricingClient::new(&config(server.base_url()))?;
    let response = client.fetch_quote(&live_request(2)).await?;
    mock.assert_async().await;

    match response.interpret("USD") {
        LivePricingResult::Available(quote) => {
            assert_eq!(quote.total, 2310.4);
            assert_eq!(quote.price_per_person, Some(1155.2));
            assert_eq!(quote.rooms.len(), 1);
        }
        other => panic!("Expected available quote, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_live_pricing_error_status() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/pricing/live");
            then.status(503).body("maintenance");
        })
        .await;

    let client = HttpLivePricingClient::new(&config(server.base_url()))?;
    let err = client.fetch_quote(&live_request(2)).await.unwrap_err();
    assert_eq!(
        err,
        LivePricingError::Status {
            status: 503,
            message: "maintenance".to_string()
        }
    );
    Ok(())
}

#[tokio::test]
async fn test_coordinator_end_to_end() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/pricing/live")
                .json_body_partial(r#"{"travelers": {"adults": 1}}"#);
            then.status(200)
                .json_body(json!({"available": true, "totalPricing": {"finalTotal": 1450}}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/pricing/live")
                .json_body_partial(r#"{"travelers": {"adults": 2}}"#);
            then.status(200).json_body(json!({"available": false}));
        })
        .await;

    let config = config(server.base_url());
    let coordinator = LivePricingCoordinator::new(
        hotel_package(),
        Arc::new(HttpLivePricingClient::new(&config)?),
        Arc::new(HttpCouponValidator::new(&config)?),
        &config,
    );

    let handle = coordinator
        .select_check_in(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
        .expect("hotel package with dates issues a request");
    assert!(handle.await?);

    let shown = coordinator.displayed_price()?;
    assert_eq!(shown.source, PriceSource::Live);
    assert_eq!(shown.total, 1450.0);

    let handle = coordinator
        .adjust_travelers(TravelerClass::Adult, Adjustment::Increment)
        .expect("traveler change issues a request");
    assert!(handle.await?);

    let shown = coordinator.displayed_price()?;
    assert_eq!(shown.source, PriceSource::Static);
    assert_eq!(shown.total, 1800.0);
    assert!(matches!(shown.notice, Some(PricingNotice::Unavailable { .. })));

    let submission = coordinator.booking_submission()?;
    assert_eq!(submission.total, 1800.0);
    assert_eq!(submission.pricing_source, PriceSource::Static);
    Ok(())
}

#[tokio::test]
async fn test_unreachable_service_falls_back() -> Result<()> {
    // Nothing listens on port 9
    let config = config("http://127.0.0.1:9".to_string());
    let coordinator = LivePricingCoordinator::new(
        hotel_package(),
        Arc::new(HttpLivePricingClient::new(&config)?),
        Arc::new(HttpCouponValidator::new(&config)?),
        &config,
    );

    let handle = coordinator
        .select_check_in(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
        .expect("hotel package with dates issues a request");
    assert!(handle.await?);

    let shown = coordinator.displayed_price()?;
    assert_eq!(shown.source, PriceSource::Static);
    assert_eq!(shown.total, 900.0);
    assert!(matches!(
        shown.notice,
        Some(PricingNotice::ServiceUnreachable { .. })
    ));

    let err = coordinator.apply_coupon("SUMMER10").await.unwrap_err();
    assert!(matches!(
        err,
        package_quote_engine::CouponError::Rejected(ref r)
            if r.reason == RejectionReason::NetworkFailure
    ));
    Ok(())
}
