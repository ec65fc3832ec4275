// Pricing session for one open package or activity detail view
//
// This is the only mutable pricing state. It decides when a live pricing request is due,
// tags every request with a monotonic sequence number and only accepts the answer to the
// most recently issued one. It also drops an applied coupon as soon as the amount it was
// validated against stops matching the current quote.

use crate::coupon::{
    AppliedCoupon, CouponError, CouponGrant, CouponRejection, CouponRequest, RejectionReason,
};
use crate::date_range::DateRange;
use crate::live_pricing::{LivePricingRequest, LivePricingResult};
use crate::presentation::{self, DisplayedPrice};
use crate::pricing::PricingSchedule;
use crate::quote::{compute_static_quote, PriceQuoteResult, QuoteError};
use crate::travelers::{TravelerClass, TravelerComposition};
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferingKind {
    Package,
    Activity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackageContext {
    pub id: String,
    pub kind: OfferingKind,
    pub duration_nights: u32,
    pub hotel_components: usize,
    pub schedule: PricingSchedule,
}

impl PackageContext {
    // Activities are never hotel-priced
    pub fn has_hotel_components(&self) -> bool {
        self.kind == OfferingKind::Package && self.hotel_components > 0
    }

    // Catalog entries without a currency are priced in the configured one
    pub fn with_currency_fallback(mut self, currency: &str) -> Self {
        if self.schedule.currency.trim().is_empty() {
            self.schedule.currency = currency.to_string();
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    Increment,
    Decrement,
}

// Settled live pricing answer together with the inputs it was requested for
#[derive(Debug, Clone, PartialEq)]
pub struct LivePricingSnapshot {
    pub request_seq: u64,
    pub travelers: TravelerComposition,
    pub date_range: DateRange,
    pub result: LivePricingResult,
}

impl LivePricingSnapshot {
    pub fn matches(&self, travelers: &TravelerComposition, dates: Option<&DateRange>) -> bool {
        self.travelers == *travelers && dates == Some(&self.date_range)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivePricingPhase {
    Idle,
    Requesting { seq: u64 },
    Fulfilled { seq: u64 },
    Failed { seq: u64 },
}

// A live pricing request that has been issued and not yet settled
#[derive(Debug, Clone, PartialEq)]
pub struct PendingQuote {
    pub seq: u64,
    pub request: LivePricingRequest,
}

// A coupon validation that has been issued and not yet settled
#[derive(Debug, Clone, PartialEq)]
pub struct CouponTicket {
    pub seq: u64,
    pub request: CouponRequest,
}

#[derive(Debug, Clone)]
pub struct PricingSession {
    package: PackageContext,
    travelers: TravelerComposition,
    dates: Option<DateRange>,
    coupon: Option<AppliedCoupon>,
    highest_issued_seq: u64,
    snapshot: Option<LivePricingSnapshot>,
    coupon_seq: u64,
}

impl PricingSession {
    pub fn new(package: PackageContext) -> Self {
        Self {
            package,
            travelers: TravelerComposition::default(),
            dates: None,
            coupon: None,
            highest_issued_seq: 0,
            snapshot: None,
            coupon_seq: 0,
        }
    }

    pub fn package(&self) -> &PackageContext {
        &self.package
    }

    pub fn travelers(&self) -> &TravelerComposition {
        &self.travelers
    }

    pub fn dates(&self) -> Option<&DateRange> {
        self.dates.as_ref()
    }

    pub fn applied_coupon(&self) -> Option<&AppliedCoupon> {
        self.coupon.as_ref()
    }

    pub fn latest_snapshot(&self) -> Option<&LivePricingSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn highest_issued_seq(&self) -> u64 {
        self.highest_issued_seq
    }

    pub fn phase(&self) -> LivePricingPhase {
        if !self.live_pricing_eligible() || self.highest_issued_seq == 0 {
            return LivePricingPhase::Idle;
        }

        match &self.snapshot {
            Some(snapshot) if snapshot.request_seq == self.highest_issued_seq => {
                match snapshot.result {
                    LivePricingResult::Available(_) => LivePricingPhase::Fulfilled {
                        seq: snapshot.request_seq,
                    },
                    _ => LivePricingPhase::Failed {
                        seq: snapshot.request_seq,
                    },
                }
            }
            _ => LivePricingPhase::Requesting {
                seq: self.highest_issued_seq,
            },
        }
    }

    pub fn static_quote(&self) -> Result<PriceQuoteResult, QuoteError> {
        compute_static_quote(&self.package.schedule, &self.travelers, self.coupon.as_ref())
    }

    pub fn presentation(&self) -> Result<DisplayedPrice, QuoteError> {
        let static_quote = self.static_quote()?;
        Ok(presentation::select(
            &static_quote,
            self.snapshot.as_ref(),
            &self.travelers,
            self.dates.as_ref(),
            matches!(self.phase(), LivePricingPhase::Requesting { .. }),
        ))
    }

    pub fn set_travelers(&mut self, travelers: TravelerComposition) -> Option<PendingQuote> {
        let mut travelers = travelers;
        if !travelers.is_quotable() {
            tracing::warn!(adults = travelers.adults, "party without adults raised to one adult");
            travelers.adults = TravelerClass::Adult.minimum();
        }
        if travelers == self.travelers {
            return None;
        }

        self.travelers = travelers;
        self.invalidate_coupon_if_stale();
        self.issue_if_eligible()
    }

    pub fn adjust_travelers(
        &mut self,
        class: TravelerClass,
        adjustment: Adjustment,
    ) -> Option<PendingQuote> {
        let travelers = match adjustment {
            Adjustment::Increment => self.travelers.incremented(class),
            Adjustment::Decrement => self.travelers.decremented(class),
        };
        self.set_travelers(travelers)
    }

    // Check-out always follows from the package duration
    pub fn select_check_in(&mut self, check_in: NaiveDate) -> Option<PendingQuote> {
        let range = DateRange::for_package(check_in, self.package.duration_nights);
        if self.dates == Some(range) {
            return None;
        }

        self.dates = Some(range);
        // Validations still in flight were issued for the old dates
        self.coupon_seq += 1;
        if let Some(coupon) = self.coupon.take() {
            tracing::info!(code = %coupon.code, "travel dates changed, coupon needs revalidation");
        }
        self.issue_if_eligible()
    }

    pub fn clear_dates(&mut self) {
        if self.dates.take().is_some() {
            self.reset_live_pricing();
        }
    }

    // Switching packages starts over, apart from the party
    pub fn set_package(&mut self, package: PackageContext) {
        tracing::debug!(from = %self.package.id, to = %package.id, "pricing session switched package");
        self.package = package;
        self.dates = None;
        self.coupon = None;
        self.coupon_seq += 1;
        self.reset_live_pricing();
    }

    // Accept only the answer to the most recently issued request
    pub fn settle(&mut self, pending: &PendingQuote, result: LivePricingResult) -> bool {
        if pending.seq != self.highest_issued_seq || !self.live_pricing_eligible() {
            tracing::debug!(
                seq = pending.seq,
                latest = self.highest_issued_seq,
                "discarding superseded live pricing response"
            );
            return false;
        }

        match &result {
            LivePricingResult::Available(quote) => {
                tracing::info!(seq = pending.seq, total = quote.total, "live pricing accepted")
            }
            LivePricingResult::Unavailable { reason } => {
                tracing::info!(seq = pending.seq, %reason, "live pricing unavailable")
            }
            LivePricingResult::Error(e) => {
                tracing::warn!(seq = pending.seq, error = %e, "live pricing failed")
            }
        }

        self.snapshot = Some(LivePricingSnapshot {
            request_seq: pending.seq,
            travelers: pending.request.travelers,
            date_range: pending.request.date_range(),
            result,
        });
        true
    }

    pub fn begin_coupon(&mut self, code: &str) -> Result<CouponTicket, CouponError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(CouponRejection::new(
                RejectionReason::NotFound,
                Some("Please enter a coupon code".to_string()),
            )
            .into());
        }

        // Validated against the amount before any coupon, not the current grand total
        let amount = compute_static_quote(&self.package.schedule, &self.travelers, None)?
            .pre_coupon_amount();
        self.coupon_seq += 1;

        tracing::debug!(seq = self.coupon_seq, code, amount, "coupon validation issued");
        Ok(CouponTicket {
            seq: self.coupon_seq,
            request: CouponRequest {
                code: code.to_string(),
                package_id: self.package.id.clone(),
                amount,
            },
        })
    }

    pub fn settle_coupon(
        &mut self,
        ticket: &CouponTicket,
        outcome: Result<CouponGrant, CouponRejection>,
    ) -> Result<AppliedCoupon, CouponError> {
        let current_amount = compute_static_quote(&self.package.schedule, &self.travelers, None)?
            .pre_coupon_amount();

        if ticket.seq != self.coupon_seq
            || (current_amount - ticket.request.amount).abs() >= 0.005
        {
            tracing::debug!(
                seq = ticket.seq,
                latest = self.coupon_seq,
                "discarding coupon validation for a stale quote"
            );
            return Err(CouponError::Superseded {
                code: ticket.request.code.clone(),
            });
        }

        match outcome {
            Ok(grant) => {
                let applied = AppliedCoupon::from_grant(
                    ticket.request.code.clone(),
                    grant,
                    ticket.request.amount,
                );
                tracing::info!(code = %applied.code, amount = applied.discount_amount, "coupon applied");
                self.coupon = Some(applied.clone());
                Ok(applied)
            }
            Err(rejection) => {
                tracing::warn!(code = %ticket.request.code, reason = %rejection.reason, "coupon rejected");
                Err(rejection.into())
            }
        }
    }

    pub fn remove_coupon(&mut self) -> Option<AppliedCoupon> {
        self.coupon_seq += 1;
        self.coupon.take()
    }

    fn live_pricing_eligible(&self) -> bool {
        self.package.has_hotel_components() && self.dates.is_some() && self.travelers.is_quotable()
    }

    fn invalidate_coupon_if_stale(&mut self) {
        let Some(coupon) = &self.coupon else {
            return;
        };
        let still_valid = compute_static_quote(&self.package.schedule, &self.travelers, None)
            .map(|quote| coupon.is_valid_for(quote.pre_coupon_amount()))
            .unwrap_or(false);

        if !still_valid {
            tracing::info!(code = %coupon.code, "quote changed, coupon needs revalidation");
            self.coupon = None;
        }
    }

    fn issue_if_eligible(&mut self) -> Option<PendingQuote> {
        if !self.live_pricing_eligible() {
            return None;
        }
        let dates = self.dates?;

        self.highest_issued_seq += 1;
        let pending = PendingQuote {
            seq: self.highest_issued_seq,
            request: LivePricingRequest {
                package_id: self.package.id.clone(),
                check_in: dates.check_in,
                check_out: dates.check_out,
                travelers: self.travelers,
                currency: self.package.schedule.currency.clone(),
            },
        };
        tracing::debug!(
            seq = pending.seq,
            package_id = %pending.request.package_id,
            "live pricing request issued"
        );
        Some(pending)
    }

    // Back to Idle; bumping the counter makes every in-flight answer stale
    fn reset_live_pricing(&mut self) {
        self.snapshot = None;
        self.highest_issued_seq += 1;
    }
}
