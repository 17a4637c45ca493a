//! Cart totals: subtotal, IVA and shipping

use std::fmt;

use crate::config::MarketConfig;
use crate::models::CartItem;

/// Tax and shipping applied at checkout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRules {
    pub tax_rate: f64,
    pub shipping_fee: f64,
}

impl Default for PriceRules {
    fn default() -> Self {
        Self {
            tax_rate: 0.15,
            shipping_fee: 3.5,
        }
    }
}

impl From<&MarketConfig> for PriceRules {
    fn from(config: &MarketConfig) -> Self {
        Self {
            tax_rate: config.tax_rate,
            shipping_fee: config.shipping_fee,
        }
    }
}

impl PriceRules {
    pub fn summarize(&self, items: &[CartItem]) -> CartSummary {
        let subtotal: f64 = items.iter().map(CartItem::line_total).sum();
        let item_count = items.iter().map(|item| item.quantity).sum();
        let shipping = if items.is_empty() { 0.0 } else { self.shipping_fee };
        let tax = subtotal * self.tax_rate;

        CartSummary {
            subtotal,
            tax,
            shipping,
            total: subtotal + tax + shipping,
            item_count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CartSummary {
    pub subtotal: f64,
    pub tax: f64,
    pub shipping: f64,
    pub total: f64,
    /// Sum of quantities
    pub item_count: u32,
}

impl CartSummary {
    pub fn is_empty(&self) -> bool {
        self.item_count == 0
    }
}

/// USD amount rendered as `$12.30`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Money(pub f64);

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 0.0 {
            write!(f, "-${:.2}", -self.0)
        } else {
            write!(f, "${:.2}", self.0)
        }
    }
}
