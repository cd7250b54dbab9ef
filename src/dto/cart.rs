use rust_decimal::Decimal;

use crate::models::{Order, format_money};

/// One order item joined with its product.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub item_id: i32,
    pub product_id: i32,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
}

impl CartLine {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }

    pub fn unit_price_display(&self) -> String {
        format_money(self.unit_price)
    }

    pub fn line_total_display(&self) -> String {
        format_money(self.line_total())
    }
}

#[derive(Debug, Clone)]
pub struct CartView {
    pub order: Order,
    pub lines: Vec<CartLine>,
}

impl CartView {
    pub fn total_price(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    pub fn total_display(&self) -> String {
        format_money(self.total_price())
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
