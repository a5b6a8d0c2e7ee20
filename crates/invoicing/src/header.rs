use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use invoicepad_core::numerals;

/// Invoice header metadata.
///
/// Captured and emitted as-is; the ledger never reconciles it against the
/// remote store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderInfo {
    pub customer_name: String,
    #[serde(rename = "billNumber", alias = "invoiceNumber")]
    pub invoice_number: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl HeaderInfo {
    /// Invoice number with localized digits replaced and whitespace trimmed.
    pub fn normalized(mut self) -> Self {
        self.invoice_number = numerals::normalize(self.invoice_number.trim());
        self.customer_name = self.customer_name.trim().to_string();
        self
    }

    /// `YYYY/MM/DD`, or an empty string when no date was picked.
    pub fn formatted_date(&self) -> String {
        self.date
            .map(|d| d.format("%Y/%m/%d").to_string())
            .unwrap_or_default()
    }
}
