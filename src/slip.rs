//! The slip contract – every field the layout reads, as a trait.
//!
//! Business rules (check digits, barcode payload computation, the digit line
//! derived from it) belong to whoever implements [`Slip`]; the renderer only
//! reads. [`SlipRecord`] is a plain serde implementation used by the CLI and
//! the FFI layer, where slips arrive as JSON.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::presentation;

/// Monetary amount in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(pub i64);

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    pub fn cents(self) -> i64 {
        self.0
    }
}

/// Barcode payload of a slip: the scannable numeric code plus its
/// human-readable, formatted digit line.
pub trait BarcodePayload {
    /// Digits encoded into the linear symbol.
    fn payload(&self) -> &str;
    /// Formatted digit line printed next to the bank code.
    fn digit_line(&self) -> &str;
}

/// Read-only view of a payment slip.
///
/// Optional fields return `Option`; the layout skips them when absent.
pub trait Slip {
    fn document_number(&self) -> &str;
    fn payer_name(&self) -> Option<&str>;
    fn payee_name(&self) -> &str;
    fn original_amount(&self) -> Money;
    fn document_amount(&self) -> Money;
    fn value(&self) -> Money;
    fn reference_month(&self) -> &str;
    fn agreement(&self) -> Option<&str>;
    /// File path or base64 `data:` URI.
    fn payee_logo(&self) -> &str;
    /// File path or base64 `data:` URI.
    fn bank_logo(&self) -> &str;
    fn bank_code(&self) -> &str;
    fn bank_check_digit(&self) -> &str;
    /// Charge breakdown lines, in print order.
    fn composition(&self) -> &[String];
    fn linked_units(&self) -> &str;
    fn barcode(&self) -> Option<&dyn BarcodePayload>;
    fn agency_account(&self) -> &str;
    fn species(&self) -> &str;
    fn quantity(&self) -> &str;
    fn our_number(&self) -> &str;
    /// Payee CPF/CNPJ, digits only or already punctuated.
    fn payee_document(&self) -> &str;
    fn due_date(&self) -> Option<NaiveDate>;
    fn payment_location(&self) -> &str;
    fn document_date(&self) -> Option<NaiveDate>;
    fn document_species(&self) -> &str;
    fn acceptance(&self) -> bool;
    fn processing_date(&self) -> Option<NaiveDate>;
    fn wallet(&self) -> &str;
    /// Free-text instructions; only the first six are printed.
    fn instructions(&self) -> &[String];
    fn original_due_date(&self) -> NaiveDate;

    /// Payee document in its presentation form (`00.000.000/0000-00` or
    /// `000.000.000-00`).
    fn formatted_payee_document(&self) -> String {
        presentation::document(self.payee_document())
    }
}

/// Serialisable barcode payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarcodeData {
    pub payload: String,
    pub digit_line: String,
}

impl BarcodePayload for BarcodeData {
    fn payload(&self) -> &str {
        &self.payload
    }

    fn digit_line(&self) -> &str {
        &self.digit_line
    }
}

/// A fully populated slip, as read from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlipRecord {
    pub document_number: String,
    #[serde(default)]
    pub payer_name: Option<String>,
    pub payee_name: String,
    pub original_amount: Money,
    pub document_amount: Money,
    pub value: Money,
    pub reference_month: String,
    #[serde(default)]
    pub agreement: Option<String>,
    pub payee_logo: String,
    pub bank_logo: String,
    pub bank_code: String,
    pub bank_check_digit: String,
    #[serde(default)]
    pub composition: Vec<String>,
    #[serde(default)]
    pub linked_units: String,
    #[serde(default)]
    pub barcode: Option<BarcodeData>,
    pub agency_account: String,
    pub species: String,
    pub quantity: String,
    pub our_number: String,
    pub payee_document: String,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    pub payment_location: String,
    #[serde(default)]
    pub document_date: Option<NaiveDate>,
    pub document_species: String,
    #[serde(default)]
    pub acceptance: bool,
    #[serde(default)]
    pub processing_date: Option<NaiveDate>,
    pub wallet: String,
    #[serde(default)]
    pub instructions: Vec<String>,
    pub original_due_date: NaiveDate,
}

impl SlipRecord {
    /// Parse a single slip from JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Parse a JSON array of slips.
    pub fn batch_from_json(json: &str) -> serde_json::Result<Vec<Self>> {
        serde_json::from_str(json)
    }
}

impl Slip for SlipRecord {
    fn document_number(&self) -> &str {
        &self.document_number
    }

    fn payer_name(&self) -> Option<&str> {
        self.payer_name.as_deref()
    }

    fn payee_name(&self) -> &str {
        &self.payee_name
    }

    fn original_amount(&self) -> Money {
        self.original_amount
    }

    fn document_amount(&self) -> Money {
        self.document_amount
    }

    fn value(&self) -> Money {
        self.value
    }

    fn reference_month(&self) -> &str {
        &self.reference_month
    }

    fn agreement(&self) -> Option<&str> {
        self.agreement.as_deref()
    }

    fn payee_logo(&self) -> &str {
        &self.payee_logo
    }

    fn bank_logo(&self) -> &str {
        &self.bank_logo
    }

    fn bank_code(&self) -> &str {
        &self.bank_code
    }

    fn bank_check_digit(&self) -> &str {
        &self.bank_check_digit
    }

    fn composition(&self) -> &[String] {
        &self.composition
    }

    fn linked_units(&self) -> &str {
        &self.linked_units
    }

    fn barcode(&self) -> Option<&dyn BarcodePayload> {
        self.barcode.as_ref().map(|b| b as &dyn BarcodePayload)
    }

    fn agency_account(&self) -> &str {
        &self.agency_account
    }

    fn species(&self) -> &str {
        &self.species
    }

    fn quantity(&self) -> &str {
        &self.quantity
    }

    fn our_number(&self) -> &str {
        &self.our_number
    }

    fn payee_document(&self) -> &str {
        &self.payee_document
    }

    fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    fn payment_location(&self) -> &str {
        &self.payment_location
    }

    fn document_date(&self) -> Option<NaiveDate> {
        self.document_date
    }

    fn document_species(&self) -> &str {
        &self.document_species
    }

    fn acceptance(&self) -> bool {
        self.acceptance
    }

    fn processing_date(&self) -> Option<NaiveDate> {
        self.processing_date
    }

    fn wallet(&self) -> &str {
        &self.wallet
    }

    fn instructions(&self) -> &[String] {
        &self.instructions
    }

    fn original_due_date(&self) -> NaiveDate {
        self.original_due_date
    }
}
