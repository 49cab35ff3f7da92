//! Total mapping from raw pipeline payloads to the canonical record.
//!
//! The remote stages evolve independently and any section or field may be
//! absent, null, or mistyped. All of that handling is concentrated here:
//! `normalize` never fails, it only substitutes typed defaults, so consumers
//! branch on values, never on presence. Do not duplicate presence checks
//! downstream.

use serde_json::Value;

use super::types::*;

/// Map an arbitrary, partially-populated payload into a fully-populated
/// canonical record. Pure and total: normalizing the serialization of an
/// already-normalized record is the identity.
pub fn normalize(payload: &Value) -> NormalizedResult {
    NormalizedResult {
        ocr: normalize_ocr(section(payload, "ocr")),
        gst: normalize_gst(section(payload, "gst")),
        reconciliation: normalize_reconciliation(section(payload, "reconciliation")),
        fraud: normalize_fraud(section(payload, "fraud")),
    }
}

fn normalize_ocr(v: &Value) -> OcrSection {
    OcrSection {
        invoice_number: string_or(v, "invoiceNumber", NOT_AVAILABLE),
        receipt_number: string_or(v, "receiptNumber", NOT_AVAILABLE),
        date: string_or(v, "date", NOT_AVAILABLE),
        time: string_or(v, "time", NOT_AVAILABLE),
        vendor: string_or(v, "vendor", NOT_AVAILABLE),
        vendor_address: string_or(v, "vendorAddress", NOT_AVAILABLE),
        vendor_phone: string_or(v, "vendorPhone", NOT_AVAILABLE),
        vendor_fax: string_or(v, "vendorFax", NOT_AVAILABLE),
        amount: number_or(v, "amount", 0.0),
        subtotal: number_or(v, "subtotal", 0.0),
        discount: number_or(v, "discount", 0.0),
        gst_amount: number_or(v, "gstAmount", 0.0),
        salesperson: string_or(v, "salesperson", NOT_AVAILABLE),
        cashier: string_or(v, "cashier", NOT_AVAILABLE),
        items: array_of(v, "items", normalize_line_item),
        confidence: number_or(v, "confidence", 0.0).clamp(0.0, 100.0),
        raw_text: string_or(v, "rawText", "No text extracted"),
    }
}

fn normalize_line_item(v: &Value) -> LineItem {
    LineItem {
        code: string_or(v, "code", NOT_AVAILABLE),
        description: string_or(v, "description", NOT_AVAILABLE),
        amount: number_or(v, "amount", 0.0),
    }
}

fn normalize_gst(v: &Value) -> GstSection {
    GstSection {
        gstin: string_or(v, "gstin", NOT_AVAILABLE),
        hsn_code: string_or(v, "hsnCode", NOT_AVAILABLE),
        category: string_or(v, "category", NOT_AVAILABLE),
        tax_rate: number_or(v, "taxRate", 0.0),
        status: string_or(v, "status", STATUS_PENDING),
    }
}

fn normalize_reconciliation(v: &Value) -> ReconciliationSection {
    ReconciliationSection {
        matched_amount: number_or(v, "matchedAmount", 0.0),
        discrepancy: number_or(v, "discrepancy", 0.0),
        confidence: number_or(v, "confidence", 0.0),
        status: string_or(v, "status", STATUS_PENDING),
    }
}

fn normalize_fraud(v: &Value) -> FraudSection {
    FraudSection {
        risk_score: number_or(v, "riskScore", 0.0),
        risk_level: string_or(v, "riskLevel", "low"),
        alerts: array_of(v, "alerts", normalize_alert),
    }
}

fn normalize_alert(v: &Value) -> FraudAlert {
    FraudAlert {
        title: string_or(v, "title", NOT_AVAILABLE),
        description: string_or(v, "description", NOT_AVAILABLE),
        severity: string_or(v, "severity", "low"),
    }
}

/// A top-level section, or Null when absent / not a mapping.
fn section<'a>(payload: &'a Value, key: &str) -> &'a Value {
    payload.get(key).unwrap_or(&Value::Null)
}

fn string_or(v: &Value, key: &str, default: &str) -> String {
    v.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| default.to_string())
}

fn number_or(v: &Value, key: &str, default: f64) -> f64 {
    v.get(key).and_then(Value::as_f64).unwrap_or(default)
}

fn array_of<T>(v: &Value, key: &str, f: impl Fn(&Value) -> T) -> Vec<T> {
    v.get(key)
        .and_then(Value::as_array)
        .map(|entries| entries.iter().map(f).collect())
        .unwrap_or_default()
}
