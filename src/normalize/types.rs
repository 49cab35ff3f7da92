//! Canonical result record assembled from the remote pipeline's sections.
//!
//! Every field is always present and of its declared type; the defaults below
//! are what the normalizer substitutes when the raw payload omits or
//! mistypes a field. Numeric fields default to `0` so arithmetic callers need
//! no null-checks; string fields default to the `"N/A"` sentinel so "missing"
//! stays distinguishable from a legitimately empty string.

use serde::{Deserialize, Serialize};

/// Sentinel for absent string fields.
pub const NOT_AVAILABLE: &str = "N/A";

/// Default status for sections still awaiting their remote stage.
pub const STATUS_PENDING: &str = "pending";

/// The four-section canonical record, one per processed document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizedResult {
    pub ocr: OcrSection,
    pub gst: GstSection,
    pub reconciliation: ReconciliationSection,
    pub fraud: FraudSection,
}

/// Text extraction results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OcrSection {
    pub invoice_number: String,
    pub receipt_number: String,
    pub date: String,
    pub time: String,
    pub vendor: String,
    pub vendor_address: String,
    pub vendor_phone: String,
    pub vendor_fax: String,
    pub amount: f64,
    pub subtotal: f64,
    pub discount: f64,
    pub gst_amount: f64,
    pub salesperson: String,
    pub cashier: String,
    pub items: Vec<LineItem>,
    /// Extraction confidence, 0–100.
    pub confidence: f64,
    pub raw_text: String,
}

impl Default for OcrSection {
    fn default() -> Self {
        Self {
            invoice_number: NOT_AVAILABLE.to_string(),
            receipt_number: NOT_AVAILABLE.to_string(),
            date: NOT_AVAILABLE.to_string(),
            time: NOT_AVAILABLE.to_string(),
            vendor: NOT_AVAILABLE.to_string(),
            vendor_address: NOT_AVAILABLE.to_string(),
            vendor_phone: NOT_AVAILABLE.to_string(),
            vendor_fax: NOT_AVAILABLE.to_string(),
            amount: 0.0,
            subtotal: 0.0,
            discount: 0.0,
            gst_amount: 0.0,
            salesperson: NOT_AVAILABLE.to_string(),
            cashier: NOT_AVAILABLE.to_string(),
            items: Vec::new(),
            confidence: 0.0,
            raw_text: "No text extracted".to_string(),
        }
    }
}

/// One extracted invoice line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineItem {
    pub code: String,
    pub description: String,
    pub amount: f64,
}

impl Default for LineItem {
    fn default() -> Self {
        Self {
            code: NOT_AVAILABLE.to_string(),
            description: NOT_AVAILABLE.to_string(),
            amount: 0.0,
        }
    }
}

/// Tax classification results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GstSection {
    pub gstin: String,
    pub hsn_code: String,
    pub category: String,
    pub tax_rate: f64,
    pub status: String,
}

impl Default for GstSection {
    fn default() -> Self {
        Self {
            gstin: NOT_AVAILABLE.to_string(),
            hsn_code: NOT_AVAILABLE.to_string(),
            category: NOT_AVAILABLE.to_string(),
            tax_rate: 0.0,
            status: STATUS_PENDING.to_string(),
        }
    }
}

/// Vendor reconciliation results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReconciliationSection {
    pub matched_amount: f64,
    pub discrepancy: f64,
    pub confidence: f64,
    pub status: String,
}

impl Default for ReconciliationSection {
    fn default() -> Self {
        Self {
            matched_amount: 0.0,
            discrepancy: 0.0,
            confidence: 0.0,
            status: STATUS_PENDING.to_string(),
        }
    }
}

/// Risk scoring results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FraudSection {
    pub risk_score: f64,
    pub risk_level: String,
    pub alerts: Vec<FraudAlert>,
}

impl Default for FraudSection {
    fn default() -> Self {
        Self {
            risk_score: 0.0,
            risk_level: "low".to_string(),
            alerts: Vec::new(),
        }
    }
}

/// One fraud alert raised by the risk scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FraudAlert {
    pub title: String,
    pub description: String,
    pub severity: String,
}

impl Default for FraudAlert {
    fn default() -> Self {
        Self {
            title: NOT_AVAILABLE.to_string(),
            description: NOT_AVAILABLE.to_string(),
            severity: "low".to_string(),
        }
    }
}
