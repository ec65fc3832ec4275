// Booking submission payload
// Carries the exact total the traveler saw; the booking service stores it as agreed.

use crate::date_range::DateRange;
use crate::presentation::PriceSource;
use crate::quote::QuoteError;
use crate::session::PricingSession;
use crate::travelers::TravelerComposition;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSubmission {
    pub package_id: String,
    pub travelers: TravelerComposition,
    pub date_range: DateRange,
    pub total: f64,
    pub currency: String,
    pub pricing_source: PriceSource,
    // Sequence of the live pricing answer the total came from
    pub live_pricing_seq: Option<u64>,
    pub coupon_code: Option<String>,
    pub coupon_amount: f64,
}

impl BookingSubmission {
    pub fn from_session(session: &PricingSession) -> Result<Self, QuoteError> {
        let date_range = *session.dates().ok_or(QuoteError::MissingDates)?;
        let displayed = session.presentation()?;

        let live_pricing_seq = match displayed.source {
            PriceSource::Live => session.latest_snapshot().map(|s| s.request_seq),
            PriceSource::Static => None,
        };

        // A coupon only discounts the static quote
        let (coupon_code, coupon_amount) = match displayed.source {
            PriceSource::Static => (
                displayed.static_quote.coupon_code.clone(),
                displayed.static_quote.coupon_amount,
            ),
            PriceSource::Live => (None, 0.0),
        };

        Ok(Self {
            package_id: session.package().id.clone(),
            travelers: *session.travelers(),
            date_range,
            total: displayed.total,
            currency: displayed.currency,
            pricing_source: displayed.source,
            live_pricing_seq,
            coupon_code,
            coupon_amount,
        })
    }
}
