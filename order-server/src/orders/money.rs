//! Money calculation utilities using rust_decimal for precision
//!
//! All calculations are done using `Decimal` internally, then converted to `f64`
//! for storage/serialization.

use rust_decimal::prelude::*;
use shared::models::LineItemInput;

use crate::db::repository::order::NewLineItem;
use crate::utils::AppError;
use crate::utils::validation::{MAX_SHORT_TEXT_LEN, validate_finite, validate_required_text};

/// Rounding strategy for monetary values (2 decimal places, half away from zero)
const DECIMAL_PLACES: u32 = 2;

/// Quantities keep gram precision
const QTY_DECIMAL_PLACES: u32 = 3;

/// Tolerance for client-supplied subtotals (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum allowed unit price
const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per item
const MAX_QUANTITY: f64 = 9_999.0;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round_money(value).to_f64().unwrap_or_default()
}

#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

#[inline]
pub fn round_qty(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(QTY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Stored quantity: 3 places
pub fn stored_qty(qty: f64) -> Decimal {
    round_qty(to_decimal(qty))
}

/// stored qty × price, rounded to 2 places
pub fn line_subtotal(qty: f64, price: f64) -> Decimal {
    round_money(stored_qty(qty) * to_decimal(price))
}

/// Validate one line item and compute its server-side subtotal
pub fn validate_line_item(item: &LineItemInput) -> Result<NewLineItem, AppError> {
    let item_type = item.item_type.trim();
    validate_required_text(item_type, "item type", MAX_SHORT_TEXT_LEN)?;

    validate_finite(item.qty, "qty")?;
    if item.qty <= 0.0 {
        return Err(AppError::validation(format!(
            "qty must be positive, got {}",
            item.qty
        )));
    }
    if item.qty > MAX_QUANTITY {
        return Err(AppError::validation(format!(
            "qty exceeds maximum allowed ({MAX_QUANTITY}), got {}",
            item.qty
        )));
    }

    let qty = stored_qty(item.qty);
    if qty <= Decimal::ZERO {
        return Err(AppError::validation(format!(
            "qty {} rounds to zero at {QTY_DECIMAL_PLACES} decimal places",
            item.qty
        )));
    }

    validate_finite(item.price, "price")?;
    if item.price < 0.0 {
        return Err(AppError::validation(format!(
            "price must be non-negative, got {}",
            item.price
        )));
    }
    if item.price > MAX_PRICE {
        return Err(AppError::validation(format!(
            "price exceeds maximum allowed ({MAX_PRICE}), got {}",
            item.price
        )));
    }

    let subtotal = line_subtotal(item.qty, item.price);
    if let Some(client) = item.subtotal {
        validate_finite(client, "subtotal")?;
        if (to_decimal(client) - subtotal).abs() > MONEY_TOLERANCE {
            return Err(AppError::validation(format!(
                "subtotal {client} does not match qty × price ({subtotal})"
            )));
        }
    }

    Ok(NewLineItem {
        item_type: item_type.to_string(),
        qty: qty.to_f64().unwrap_or_default(),
        price: item.price,
        subtotal: to_f64(subtotal),
    })
}

/// Validate a whole item list; it must not be empty
pub fn validate_line_items(items: &[LineItemInput]) -> Result<Vec<NewLineItem>, AppError> {
    if items.is_empty() {
        return Err(AppError::validation("items must not be empty"));
    }
    items.iter().map(validate_line_item).collect()
}

/// Σ subtotal of validated items
pub fn order_total(items: &[NewLineItem]) -> f64 {
    to_f64(items.iter().map(|i| to_decimal(i.subtotal)).sum())
}
