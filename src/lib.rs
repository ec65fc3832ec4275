// Price quote engine and live pricing coordination for package booking views

pub mod booking;
pub mod config;
pub mod coordinator;
pub mod coupon;
pub mod date_range;
pub mod live_pricing;
pub mod presentation;
pub mod pricing;
pub mod quote;
pub mod session;
pub mod travelers;

// Re-export key types for convenience
pub use booking::BookingSubmission;
pub use config::{ClientConfig, ConfigError};
pub use coordinator::LivePricingCoordinator;
pub use coupon::{
    AppliedCoupon, CouponError, CouponGrant, CouponRejection, CouponValidator,
    HttpCouponValidator, RejectionReason,
};
pub use date_range::{parse_calendar_date, resolve_checkout, DateRange, DateRangeError};
pub use live_pricing::{
    HttpLivePricingClient, LivePricingClient, LivePricingError, LivePricingRequest,
    LivePricingResponse, LivePricingResult, LiveQuote,
};
pub use presentation::{DisplayedPrice, PriceSource, PricingNotice};
pub use pricing::{DiscountPolicy, DiscountType, PricingSchedule, RawPricing};
pub use quote::{compute_static_quote, PriceQuoteResult, QuoteError, QuoteLine};
pub use session::{
    Adjustment, LivePricingPhase, LivePricingSnapshot, OfferingKind, PackageContext,
    PricingSession,
};
pub use travelers::{TravelerClass, TravelerComposition};
