//! Counter → money. Pure arithmetic, no rounding.

use serde::{Deserialize, Serialize};

/// Unit price of a monochrome page, pre-tax.
pub const PRICE_MONO: f64 = 0.0098;

/// Unit price of a color page, pre-tax.
pub const PRICE_COLOR: f64 = 0.119;

/// Tax rate applied on top of the pre-tax cost.
pub const TAX_RATE: f64 = 0.21;

/// Itemized cost of one device. Tax is computed per category and summed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub mono_cost: f64,
    pub color_cost: f64,
    pub pre_tax_total: f64,
    pub mono_tax: f64,
    pub color_tax: f64,
    pub tax_total: f64,
    pub mono_inclusive: f64,
    pub color_inclusive: f64,
    pub inclusive_total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    pub mono_price: f64,
    pub color_price: f64,
    pub tax_rate: f64,
}

impl Pricing {
    pub const STANDARD: Pricing = Pricing {
        mono_price: PRICE_MONO,
        color_price: PRICE_COLOR,
        tax_rate: TAX_RATE,
    };

    pub fn cost(&self, mono: u64, color: u64) -> CostBreakdown {
        let mono_cost = mono as f64 * self.mono_price;
        let color_cost = color as f64 * self.color_price;

        let mono_tax = mono_cost * self.tax_rate;
        let color_tax = color_cost * self.tax_rate;

        CostBreakdown {
            mono_cost,
            color_cost,
            pre_tax_total: mono_cost + color_cost,
            mono_tax,
            color_tax,
            tax_total: mono_tax + color_tax,
            mono_inclusive: mono_cost + mono_tax,
            color_inclusive: color_cost + color_tax,
            inclusive_total: (mono_cost + color_cost) + (mono_tax + color_tax),
        }
    }
}

impl Default for Pricing {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Cost at the standard prices.
pub fn cost(mono: u64, color: u64) -> CostBreakdown {
    Pricing::STANDARD.cost(mono, color)
}
