// Pricing schedule attached to a package or activity
// One schedule per catalog fetch; it never changes while a detail view is open.

use crate::quote::QuoteError;
use crate::travelers::TravelerClass;
use serde::{Deserialize, Serialize};

// Fallback ratios of the adult price when a class has no explicit price
pub const CHILD_PRICE_RATIO: f64 = 0.7;
pub const INFANT_PRICE_RATIO: f64 = 0.1;

// The one discount mechanism that applies to a schedule
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DiscountPolicy {
    #[default]
    None,
    SalePrice(f64),
    Percentage(f64),
    Fixed(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

// Pricing fields as the catalog API delivers them
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPricing {
    pub base_adult_price: f64,
    #[serde(default)]
    pub child_price: Option<f64>,
    #[serde(default)]
    pub infant_price: Option<f64>,
    #[serde(default)]
    pub sale_price: Option<f64>,
    #[serde(default)]
    pub discount_type: Option<DiscountType>,
    #[serde(default)]
    pub discount_value: Option<f64>,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricingSchedule {
    pub base_adult_price: f64,
    pub child_price: Option<f64>,
    pub infant_price: Option<f64>,
    pub discount: DiscountPolicy,
    pub currency: String,
}

impl PricingSchedule {
    pub fn new(base_adult_price: f64, currency: impl Into<String>) -> Result<Self, QuoteError> {
        ensure_price("baseAdultPrice", base_adult_price)?;
        Ok(Self {
            base_adult_price,
            child_price: None,
            infant_price: None,
            discount: DiscountPolicy::None,
            currency: currency.into(),
        })
    }

    pub fn with_child_price(mut self, price: f64) -> Result<Self, QuoteError> {
        ensure_price("childPrice", price)?;
        self.child_price = Some(price);
        Ok(self)
    }

    pub fn with_infant_price(mut self, price: f64) -> Result<Self, QuoteError> {
        ensure_price("infantPrice", price)?;
        self.infant_price = Some(price);
        Ok(self)
    }

    pub fn with_discount(mut self, discount: DiscountPolicy) -> Result<Self, QuoteError> {
        self.discount = match discount {
            DiscountPolicy::None => DiscountPolicy::None,
            DiscountPolicy::SalePrice(value) => {
                ensure_price("salePrice", value)?;
                DiscountPolicy::SalePrice(value)
            }
            DiscountPolicy::Percentage(value) => {
                ensure_price("discountValue", value)?;
                DiscountPolicy::Percentage(value.min(100.0))
            }
            DiscountPolicy::Fixed(value) => {
                ensure_price("discountValue", value)?;
                DiscountPolicy::Fixed(value)
            }
        };
        Ok(self)
    }

    // Undiscounted unit price for one traveler of `class`
    pub fn unit_price(&self, class: TravelerClass) -> f64 {
        match class {
            TravelerClass::Adult => self.base_adult_price,
            TravelerClass::Child => self
                .child_price
                .unwrap_or(self.base_adult_price * CHILD_PRICE_RATIO),
            TravelerClass::Infant => self
                .infant_price
                .unwrap_or(self.base_adult_price * INFANT_PRICE_RATIO),
        }
    }

    // Unit price after a sale price is applied, scaled from the adult ratio
    pub fn sale_unit_price(&self, class: TravelerClass, sale_price: f64) -> f64 {
        if self.base_adult_price <= 0.0 {
            return self.unit_price(class);
        }
        self.unit_price(class) * (sale_price / self.base_adult_price)
    }
}

impl TryFrom<RawPricing> for PricingSchedule {
    type Error = QuoteError;

    fn try_from(raw: RawPricing) -> Result<Self, Self::Error> {
        // A sale price wins over any discount type the record also carries
        let discount = match (raw.sale_price, raw.discount_type, raw.discount_value) {
            (Some(sale), _, _) => DiscountPolicy::SalePrice(sale),
            (None, Some(DiscountType::Percentage), Some(value)) => {
                DiscountPolicy::Percentage(value)
            }
            (None, Some(DiscountType::Fixed), Some(value)) => DiscountPolicy::Fixed(value),
            _ => DiscountPolicy::None,
        };

        let mut schedule = PricingSchedule::new(raw.base_adult_price, raw.currency)?;
        if let Some(price) = raw.child_price {
            schedule = schedule.with_child_price(price)?;
        }
        if let Some(price) = raw.infant_price {
            schedule = schedule.with_infant_price(price)?;
        }
        schedule.with_discount(discount)
    }
}

// Round half away from zero to cents
pub fn round_money(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

fn ensure_price(field: &'static str, value: f64) -> Result<(), QuoteError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(QuoteError::InvalidSchedule {
            field,
            value: value.to_string(),
        })
    }
}
