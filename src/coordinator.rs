// Live pricing coordinator
// Drives a PricingSession from view events: every traveler or date edit recomputes the
// static quote right away and, when hotel pricing applies, fires a live pricing request on
// its own task. Requests are never cancelled; their answers are simply dropped by the
// session once a newer request exists.

use crate::booking::BookingSubmission;
use crate::config::ClientConfig;
use crate::coupon::{AppliedCoupon, CouponError, CouponRejection, CouponValidator, RejectionReason};
use crate::live_pricing::{LivePricingClient, LivePricingError, LivePricingResult};
use crate::presentation::DisplayedPrice;
use crate::quote::QuoteError;
use crate::session::{Adjustment, PackageContext, PendingQuote, PricingSession};
use crate::travelers::{TravelerClass, TravelerComposition};
use chrono::NaiveDate;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub struct LivePricingCoordinator {
    session: Arc<Mutex<PricingSession>>,
    pricing: Arc<dyn LivePricingClient>,
    coupons: Arc<dyn CouponValidator>,
    request_timeout: Duration,
    default_currency: String,
    display: Arc<watch::Sender<Option<DisplayedPrice>>>,
}

impl LivePricingCoordinator {
    pub fn new(
        package: PackageContext,
        pricing: Arc<dyn LivePricingClient>,
        coupons: Arc<dyn CouponValidator>,
        config: &ClientConfig,
    ) -> Self {
        let session =
            PricingSession::new(package.with_currency_fallback(&config.default_currency));
        let (display, _) = watch::channel(session.presentation().ok());

        Self {
            session: Arc::new(Mutex::new(session)),
            pricing,
            coupons,
            request_timeout: Duration::from_millis(config.timeout_ms),
            default_currency: config.default_currency.clone(),
            display: Arc::new(display),
        }
    }

    // Every recomputed price is published here
    pub fn subscribe(&self) -> watch::Receiver<Option<DisplayedPrice>> {
        self.display.subscribe()
    }

    // Read-only access for the presentation layer. The session lock is held while `read`
    // runs, so it must not call back into the coordinator.
    pub fn with_session<R>(&self, read: impl FnOnce(&PricingSession) -> R) -> R {
        read(&self.session.lock())
    }

    pub fn displayed_price(&self) -> Result<DisplayedPrice, QuoteError> {
        self.session.lock().presentation()
    }

    pub fn booking_submission(&self) -> Result<BookingSubmission, QuoteError> {
        BookingSubmission::from_session(&self.session.lock())
    }

    // Returns the live pricing task when one was issued; it resolves to whether its answer
    // was accepted. Must be called from within a tokio runtime.
    pub fn set_travelers(&self, travelers: TravelerComposition) -> Option<JoinHandle<bool>> {
        let pending = self.update(|session| session.set_travelers(travelers));
        self.dispatch(pending)
    }

    pub fn adjust_travelers(
        &self,
        class: TravelerClass,
        adjustment: Adjustment,
    ) -> Option<JoinHandle<bool>> {
        let pending = self.update(|session| session.adjust_travelers(class, adjustment));
        self.dispatch(pending)
    }

    pub fn select_check_in(&self, check_in: NaiveDate) -> Option<JoinHandle<bool>> {
        let pending = self.update(|session| session.select_check_in(check_in));
        self.dispatch(pending)
    }

    pub fn clear_dates(&self) {
        self.update(|session| session.clear_dates());
    }

    pub fn set_package(&self, package: PackageContext) {
        let package = package.with_currency_fallback(&self.default_currency);
        self.update(|session| session.set_package(package));
    }

    pub async fn apply_coupon(&self, code: &str) -> Result<AppliedCoupon, CouponError> {
        let ticket = self.session.lock().begin_coupon(code)?;

        let outcome = match tokio::time::timeout(
            self.request_timeout,
            self.coupons.validate(&ticket.request),
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::warn!(code = %ticket.request.code, "coupon validation timed out");
                Err(CouponRejection::new(RejectionReason::NetworkFailure, None))
            }
        };

        self.update(|session| session.settle_coupon(&ticket, outcome))
    }

    pub fn remove_coupon(&self) -> Option<AppliedCoupon> {
        self.update(|session| session.remove_coupon())
    }

    // Edit and publish under one guard so publications follow the order of the edits
    fn update<T>(&self, edit: impl FnOnce(&mut PricingSession) -> T) -> T {
        let mut session = self.session.lock();
        let out = edit(&mut session);
        publish(&session, &self.display);
        out
    }

    fn dispatch(&self, pending: Option<PendingQuote>) -> Option<JoinHandle<bool>> {
        let pending = pending?;

        let session = Arc::clone(&self.session);
        let display = Arc::clone(&self.display);
        let pricing = Arc::clone(&self.pricing);
        let timeout = self.request_timeout;

        Some(tokio::spawn(async move {
            let outcome = match tokio::time::timeout(timeout, pricing.fetch_quote(&pending.request))
                .await
            {
                Ok(outcome) => outcome,
                Err(_) => Err(LivePricingError::Timeout(timeout.as_millis() as u64)),
            };
            let result = LivePricingResult::from_outcome(outcome, &pending.request.currency);

            let mut session = session.lock();
            let accepted = session.settle(&pending, result);
            if accepted {
                publish(&session, &display);
            }
            accepted
        }))
    }
}

// Callers hold the session lock, watch sends never block
fn publish(session: &PricingSession, display: &watch::Sender<Option<DisplayedPrice>>) {
    match session.presentation() {
        Ok(price) => {
            display.send_replace(Some(price));
        }
        Err(e) => tracing::warn!(error = %e, "no price to display"),
    }
}
