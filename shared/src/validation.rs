//! Validation utilities for ChemTrack records
//!
//! Checks run on fully built records right before they are written, so a
//! rejected record never reaches storage.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{Chemical, PurchaseOrder, Supplier};

/// A rejected field
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationFailure {
    pub field: &'static str,
    pub message: String,
}

impl ValidationFailure {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub type ValidationResult = Result<(), ValidationFailure>;

// ============================================================================
// General Validations
// ============================================================================

/// Non-blank text no longer than `max_len` characters
pub fn validate_required_text(field: &'static str, value: &str, max_len: usize) -> ValidationResult {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationFailure::new(field, format!("{} is required", field)));
    }
    if trimmed.chars().count() > max_len {
        return Err(ValidationFailure::new(
            field,
            format!("{} cannot exceed {} characters", field, max_len),
        ));
    }
    Ok(())
}

pub fn validate_optional_text(
    field: &'static str,
    value: Option<&str>,
    max_len: usize,
) -> ValidationResult {
    match value {
        Some(v) if v.trim().chars().count() > max_len => Err(ValidationFailure::new(
            field,
            format!("{} cannot exceed {} characters", field, max_len),
        )),
        _ => Ok(()),
    }
}

pub fn validate_non_negative(field: &'static str, value: Decimal) -> ValidationResult {
    if value < Decimal::ZERO {
        return Err(ValidationFailure::new(field, format!("{} cannot be negative", field)));
    }
    Ok(())
}

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> ValidationResult {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    };
    if valid && email.len() >= 5 {
        Ok(())
    } else {
        Err(ValidationFailure::new("email", "Please enter a valid email"))
    }
}

// ============================================================================
// Record Validations
// ============================================================================

pub fn validate_chemical(chemical: &Chemical) -> ValidationResult {
    validate_required_text("name", &chemical.name, 100)?;
    validate_optional_text("formula", chemical.formula.as_deref(), 50)?;
    validate_required_text("batchNo", &chemical.batch_no, 100)?;
    validate_required_text("supplier", &chemical.supplier, 100)?;
    validate_required_text("location", &chemical.location, 100)?;
    validate_non_negative("quantity", chemical.quantity)?;
    validate_non_negative("reorderThreshold", chemical.reorder_threshold)?;
    validate_non_negative("costPerUnit", chemical.cost_per_unit)?;
    Ok(())
}

pub fn validate_purchase_order(order: &PurchaseOrder) -> ValidationResult {
    validate_required_text("poNumber", &order.po_number, 100)?;
    validate_required_text("supplier", &order.supplier, 100)?;
    validate_optional_text("notes", order.notes.as_deref(), 1000)?;
    for line in &order.lines {
        validate_required_text("chemicalName", &line.chemical_name, 100)?;
        validate_non_negative("quantity", line.quantity)?;
        validate_non_negative("unitPrice", line.unit_price)?;
    }
    if order.total_amount != order.lines.iter().map(|l| l.total).sum::<Decimal>() {
        return Err(ValidationFailure::new(
            "totalAmount",
            "totalAmount must equal the sum of line totals",
        ));
    }
    Ok(())
}

pub fn validate_supplier(supplier: &Supplier) -> ValidationResult {
    validate_required_text("name", &supplier.name, 100)?;
    validate_required_text("contact", &supplier.contact, 50)?;
    validate_required_text("phone", &supplier.phone, 50)?;
    validate_required_text("address", &supplier.address, 500)?;
    validate_email(&supplier.email)?;
    if supplier.rating < Decimal::ZERO || supplier.rating > Decimal::from(5) {
        return Err(ValidationFailure::new("rating", "Rating must be between 0 and 5"));
    }
    if supplier.total_orders < 0 {
        return Err(ValidationFailure::new("totalOrders", "Total orders cannot be negative"));
    }
    Ok(())
}
