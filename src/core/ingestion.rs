//! Validation of raw client input into ledger drafts. Nothing here touches the
//! store, so a rejected candidate can never leave a partial write behind.

use crate::core::constants::{MAX_NAME_LENGTH, MAX_REMARK_LENGTH};
use crate::core::errors::LedgerError;
use crate::core::models::{payment::PaymentDraft, transaction::TransactionDraft};
use uuid::Uuid;

/// A candidate transaction exactly as a client submitted it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransactionInput {
    pub payer_id: String,
    pub amount: f64,
    pub members: Vec<String>,
    pub remark: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PaymentInput {
    pub payer_id: String,
    pub receiver_id: String,
    pub amount: f64,
    pub remark: Option<String>,
}

pub fn parse_id(field: &str, value: &str) -> Result<Uuid, LedgerError> {
    Uuid::parse_str(value.trim()).map_err(|_| {
        LedgerError::invalid(
            field,
            format!("Invalid {}", field),
            format!("`{}` is not a valid identifier", value),
        )
    })
}

pub fn validate_amount(field: &str, amount: f64) -> Result<f64, LedgerError> {
    if !amount.is_finite() {
        return Err(LedgerError::invalid(field, "Invalid Amount", "Amount must be a finite number"));
    }
    if amount <= 0.0 {
        return Err(LedgerError::invalid(field, "Invalid Amount", "Amount must be greater than 0"));
    }
    Ok(amount)
}

/// Remarks are free text: line breaks and tabs are kept, only the length is bounded.
fn validate_remark(remark: Option<String>) -> Result<String, LedgerError> {
    let remark = remark.unwrap_or_default().trim().to_string();
    if remark.chars().count() > MAX_REMARK_LENGTH {
        return Err(LedgerError::invalid(
            "remark",
            "Remark Too Long",
            format!("remark cannot exceed {} characters", MAX_REMARK_LENGTH),
        ));
    }
    Ok(remark)
}

pub fn validate_name(name: &str) -> Result<String, LedgerError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LedgerError::invalid("name", "Invalid name", "Name cannot be empty"));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(LedgerError::invalid(
            "name",
            "name Too Long",
            format!("name cannot exceed {} characters", MAX_NAME_LENGTH),
        ));
    }
    if name.chars().any(|c| c.is_control() || "<>{}[]".contains(c)) {
        return Err(LedgerError::invalid("name", "Invalid name", "name contains invalid characters"));
    }
    Ok(name.to_string())
}

/// Member order is kept and duplicates are allowed: a member listed twice
/// carries two shares.
pub fn parse_transaction(input: TransactionInput) -> Result<TransactionDraft, LedgerError> {
    let payer_id = parse_id("payer_id", &input.payer_id)?;
    let amount = validate_amount("amount", input.amount)?;
    let members = input
        .members
        .iter()
        .map(|member| parse_id("members", member))
        .collect::<Result<Vec<_>, _>>()?;
    let remark = validate_remark(input.remark)?;

    Ok(TransactionDraft {
        payer_id,
        amount,
        members,
        remark,
    })
}

pub fn parse_payment(input: PaymentInput) -> Result<PaymentDraft, LedgerError> {
    let payer_id = parse_id("payer_id", &input.payer_id)?;
    let receiver_id = parse_id("receiver_id", &input.receiver_id)?;
    if payer_id == receiver_id {
        return Err(LedgerError::invalid(
            "receiver_id",
            "Invalid receiver",
            "A payment cannot be sent to the payer",
        ));
    }
    let amount = validate_amount("amount", input.amount)?;
    let remark = validate_remark(input.remark)?;

    Ok(PaymentDraft {
        payer_id,
        receiver_id,
        amount,
        remark,
    })
}
