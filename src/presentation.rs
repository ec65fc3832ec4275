// Which total the detail view shows, and the notice that goes with it

use crate::date_range::DateRange;
use crate::live_pricing::{LivePricingError, LivePricingResult};
use crate::quote::PriceQuoteResult;
use crate::session::LivePricingSnapshot;
use crate::travelers::TravelerComposition;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSource {
    Static,
    Live,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PricingNotice {
    LivePricingIncluded,
    // The feed answered, but has nothing for these dates
    Unavailable { reason: String },
    // The feed could not be reached or answered with garbage
    ServiceUnreachable { detail: String },
}

impl PricingNotice {
    pub fn message(&self) -> String {
        match self {
            PricingNotice::LivePricingIncluded => "Live hotel pricing included".to_string(),
            PricingNotice::Unavailable { reason } => {
                format!("{}. Showing the package price instead.", reason)
            }
            PricingNotice::ServiceUnreachable { .. } => {
                "Couldn't reach the pricing service. Showing the package price instead."
                    .to_string()
            }
        }
    }

    // Failures are shown muted and never block the page
    pub fn is_error(&self) -> bool {
        !matches!(self, PricingNotice::LivePricingIncluded)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayedPrice {
    pub total: f64,
    pub currency: String,
    pub source: PriceSource,
    pub loading: bool,
    pub notice: Option<PricingNotice>,
    pub static_quote: PriceQuoteResult,
}

// Live total only when it was requested for the travelers and dates currently selected
pub fn select(
    static_quote: &PriceQuoteResult,
    snapshot: Option<&LivePricingSnapshot>,
    travelers: &TravelerComposition,
    dates: Option<&DateRange>,
    loading: bool,
) -> DisplayedPrice {
    let current = snapshot.filter(|s| s.matches(travelers, dates));

    let fallback = |notice: Option<PricingNotice>| DisplayedPrice {
        total: static_quote.grand_total,
        currency: static_quote.currency.clone(),
        source: PriceSource::Static,
        loading,
        notice,
        static_quote: static_quote.clone(),
    };

    match current.map(|s| &s.result) {
        Some(LivePricingResult::Available(live)) => DisplayedPrice {
            total: live.total.max(0.0),
            currency: live.currency.clone(),
            source: PriceSource::Live,
            loading,
            notice: Some(PricingNotice::LivePricingIncluded),
            static_quote: static_quote.clone(),
        },
        Some(LivePricingResult::Unavailable { reason }) => {
            fallback(Some(PricingNotice::Unavailable {
                reason: reason.clone(),
            }))
        }
        Some(LivePricingResult::Error(e)) => fallback(Some(PricingNotice::ServiceUnreachable {
            detail: describe(e),
        })),
        None => fallback(None),
    }
}

fn describe(error: &LivePricingError) -> String {
    match error {
        LivePricingError::Timeout(ms) => format!("no answer within {}ms", ms),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live_pricing::LiveQuote;
    use crate::pricing::PricingSchedule;
    use crate::quote::compute_static_quote;
    use chrono::NaiveDate;

    fn static_quote() -> PriceQuoteResult {
        let schedule = PricingSchedule::new(1000.0, "USD").unwrap();
        compute_static_quote(&schedule, &TravelerComposition::new(2, 0, 0), None).unwrap()
    }

    fn range(day: u32) -> DateRange {
        DateRange::for_package(NaiveDate::from_ymd_opt(2025, 6, day).unwrap(), 4)
    }

    fn snapshot(travelers: TravelerComposition, result: LivePricingResult) -> LivePricingSnapshot {
        LivePricingSnapshot {
            request_seq: 1,
            travelers,
            date_range: range(1),
            result,
        }
    }

    fn live(total: f64) -> LivePricingResult {
        LivePricingResult::Available(LiveQuote {
            total,
            currency: "USD".to_string(),
            price_per_person: None,
            rooms: vec![],
        })
    }

    #[test]
    fn test_live_total_for_current_inputs() {
        let party = TravelerComposition::new(2, 0, 0);
        let snap = snapshot(party, live(2350.0));
        let shown = select(&static_quote(), Some(&snap), &party, Some(&range(1)), false);

        assert_eq!(shown.total, 2350.0);
        assert_eq!(shown.source, PriceSource::Live);
        assert_eq!(shown.notice, Some(PricingNotice::LivePricingIncluded));
    }

    #[test]
    fn test_live_total_for_other_travelers_ignored() {
        let snap = snapshot(TravelerComposition::new(3, 0, 0), live(3500.0));
        let shown = select(
            &static_quote(),
            Some(&snap),
            &TravelerComposition::new(2, 0, 0),
            Some(&range(1)),
            true,
        );

        assert_eq!(shown.total, 2000.0);
        assert_eq!(shown.source, PriceSource::Static);
        assert_eq!(shown.notice, None);
        assert!(shown.loading);
    }

    #[test]
    fn test_live_total_for_other_dates_ignored() {
        let party = TravelerComposition::new(2, 0, 0);
        let snap = snapshot(party, live(2350.0));
        let shown = select(&static_quote(), Some(&snap), &party, Some(&range(8)), false);
        assert_eq!(shown.source, PriceSource::Static);
    }

    #[test]
    fn test_unavailable_and_unreachable_are_labeled_differently() {
        let party = TravelerComposition::new(2, 0, 0);

        let unavailable = snapshot(
            party,
            LivePricingResult::Unavailable {
                reason: "No rooms available for these dates".to_string(),
            },
        );
        let unreachable = snapshot(
            party,
            LivePricingResult::Error(LivePricingError::Timeout(5000)),
        );

        let a = select(&static_quote(), Some(&unavailable), &party, Some(&range(1)), false);
        let b = select(&static_quote(), Some(&unreachable), &party, Some(&range(1)), false);

        assert_eq!(a.total, 2000.0);
        assert_eq!(b.total, 2000.0);
        let (a, b) = (a.notice.unwrap(), b.notice.unwrap());
        assert!(a.is_error() && b.is_error());
        assert_ne!(a.message(), b.message());
        assert!(a.message().starts_with("No rooms available"));
        assert!(b.message().starts_with("Couldn't reach the pricing service"));
        assert_eq!(
            b,
            PricingNotice::ServiceUnreachable {
                detail: "no answer within 5000ms".to_string()
            }
        );
    }
}
