// Static price quote computation
// Everything in here is a pure function of the schedule, the party and the applied coupon.
// Callers recompute the full quote on every change instead of patching a previous one.

use crate::coupon::AppliedCoupon;
use crate::pricing::{round_money, DiscountPolicy, PricingSchedule};
use crate::travelers::{TravelerClass, TravelerComposition};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuoteError {
    #[error("Invalid pricing schedule: {field} = {value}")]
    InvalidSchedule { field: &'static str, value: String },

    #[error("Invalid traveler composition: at least one adult is required, got {adults}")]
    InvalidTravelerComposition { adults: u32 },

    #[error("Travel dates are required before booking")]
    MissingDates,
}

// One row of the breakdown per traveler class present in the party
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteLine {
    pub class: TravelerClass,
    pub count: u32,
    pub unit_price: f64,
    pub discounted_unit_price: f64,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuoteResult {
    pub currency: String,
    pub lines: Vec<QuoteLine>,
    pub subtotal: f64,
    pub discount_amount: f64,
    pub coupon_amount: f64,
    pub coupon_code: Option<String>,
    pub grand_total: f64,
}

impl PriceQuoteResult {
    // The amount a coupon is validated against
    pub fn pre_coupon_amount(&self) -> f64 {
        round_money((self.subtotal - self.discount_amount).max(0.0))
    }
}

pub fn compute_static_quote(
    schedule: &PricingSchedule,
    travelers: &TravelerComposition,
    coupon: Option<&AppliedCoupon>,
) -> Result<PriceQuoteResult, QuoteError> {
    if !travelers.is_quotable() {
        return Err(QuoteError::InvalidTravelerComposition {
            adults: travelers.adults,
        });
    }

    let lines: Vec<QuoteLine> = TravelerClass::ALL
        .iter()
        .copied()
        .filter(|class| travelers.count(*class) > 0)
        .map(|class| {
            let count = travelers.count(class);
            let unit_price = schedule.unit_price(class);
            let discounted_unit_price = match schedule.discount {
                DiscountPolicy::SalePrice(sale) => schedule.sale_unit_price(class, sale),
                _ => unit_price,
            };
            QuoteLine {
                class,
                count,
                unit_price: round_money(unit_price),
                discounted_unit_price: round_money(discounted_unit_price),
                amount: round_money(unit_price * f64::from(count)),
            }
        })
        .collect();

    // Subtotal always comes from undiscounted prices
    let subtotal: f64 = lines
        .iter()
        .map(|line| schedule.unit_price(line.class) * f64::from(line.count))
        .sum();

    let discount_amount = match schedule.discount {
        DiscountPolicy::SalePrice(sale) => {
            let discounted: f64 = lines
                .iter()
                .map(|line| schedule.sale_unit_price(line.class, sale) * f64::from(line.count))
                .sum();
            // A sale price above the base price is not a surcharge
            (subtotal - discounted).max(0.0)
        }
        DiscountPolicy::Percentage(value) => subtotal * value / 100.0,
        DiscountPolicy::Fixed(value) => subtotal.min(value),
        DiscountPolicy::None => 0.0,
    };

    let subtotal = round_money(subtotal);
    let discount_amount = round_money(discount_amount.min(subtotal));
    let pre_coupon = round_money(subtotal - discount_amount);

    let (coupon_amount, coupon_code) = match coupon {
        Some(coupon) if coupon.is_valid_for(pre_coupon) => (
            round_money(coupon.discount_amount.min(pre_coupon)),
            Some(coupon.code.clone()),
        ),
        Some(coupon) => {
            tracing::warn!(
                code = %coupon.code,
                validated_against = coupon.validated_against,
                pre_coupon,
                "ignoring coupon validated against a different amount"
            );
            (0.0, None)
        }
        None => (0.0, None),
    };

    let grand_total = round_money((subtotal - discount_amount - coupon_amount).max(0.0));

    Ok(PriceQuoteResult {
        currency: schedule.currency.clone(),
        lines,
        subtotal,
        discount_amount,
        coupon_amount,
        coupon_code,
        grand_total,
    })
}
