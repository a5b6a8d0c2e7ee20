use serde::{Deserialize, Deserializer, Serialize};

use invoicepad_core::{numerals, DomainError, DomainResult, Entity, LineItemId};

/// One invoice row.
///
/// The serde shape matches the remote product store:
/// `{"id", "productName", "numbers", "price", "detail"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default, deserialize_with = "id_or_unassigned")]
    pub id: LineItemId,
    pub product_name: String,
    #[serde(rename = "numbers", alias = "quantity")]
    pub quantity: u64,
    /// Price in smallest currency unit.
    #[serde(rename = "price", alias = "unitPrice")]
    pub unit_price: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl LineItem {
    pub fn from_fields(id: LineItemId, fields: LineItemFields) -> Self {
        Self {
            id,
            product_name: fields.product_name,
            quantity: fields.quantity,
            unit_price: fields.unit_price,
            detail: fields.detail,
        }
    }

    /// Everything except the identity.
    pub fn fields(&self) -> LineItemFields {
        LineItemFields {
            product_name: self.product_name.clone(),
            quantity: self.quantity,
            unit_price: self.unit_price,
            detail: self.detail.clone(),
        }
    }

    /// `quantity × unit_price`, widened so it can never overflow.
    pub fn amount(&self) -> u128 {
        u128::from(self.quantity) * u128::from(self.unit_price)
    }
}

impl Entity for LineItem {
    type Id = LineItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Validated, typed line item fields (no identity).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemFields {
    pub product_name: String,
    pub quantity: u64,
    pub unit_price: u64,
    pub detail: Option<String>,
}

impl LineItemFields {
    /// Invariant: the line amount fits in a `u64`.
    pub fn validate(&self) -> DomainResult<()> {
        self.quantity
            .checked_mul(self.unit_price)
            .map(|_| ())
            .ok_or_else(|| DomainError::validation("price", "line amount is too large"))
    }
}

/// Field values exactly as the clerk typed them.
///
/// Numeric fields are strings because the form accepts localized digits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLineItemFields {
    pub product_name: String,
    pub quantity: String,
    pub unit_price: String,
    #[serde(default)]
    pub detail: String,
}

impl RawLineItemFields {
    pub fn new(
        product_name: impl Into<String>,
        quantity: impl Into<String>,
        unit_price: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            product_name: product_name.into(),
            quantity: quantity.into(),
            unit_price: unit_price.into(),
            detail: detail.into(),
        }
    }

    /// Normalize numerals and parse into typed fields.
    ///
    /// Non-numeric input is a validation failure; nothing is coerced to zero.
    pub fn parse(&self) -> DomainResult<LineItemFields> {
        let quantity = parse_whole_number("quantity", &self.quantity)?;
        let unit_price = parse_whole_number("price", &self.unit_price)?;

        let detail = self.detail.trim();
        let fields = LineItemFields {
            product_name: self.product_name.trim().to_string(),
            quantity,
            unit_price,
            detail: (!detail.is_empty()).then(|| detail.to_string()),
        };
        fields.validate()?;
        Ok(fields)
    }
}

impl From<&LineItem> for RawLineItemFields {
    /// Pre-populate a form from an existing item.
    fn from(item: &LineItem) -> Self {
        Self {
            product_name: item.product_name.clone(),
            quantity: item.quantity.to_string(),
            unit_price: item.unit_price.to_string(),
            detail: item.detail.clone().unwrap_or_default(),
        }
    }
}

/// Parse a non-negative whole number, accepting Persian digits.
///
/// A fractional part is allowed only when it is all zeros (`"1000.00"`), which
/// number inputs commonly produce.
fn parse_whole_number(field: &'static str, raw: &str) -> DomainResult<u64> {
    let normalized = numerals::normalize(raw.trim());
    if normalized.is_empty() {
        return Err(DomainError::validation(field, "must not be empty"));
    }
    if normalized.starts_with('-') {
        return Err(DomainError::validation(field, "must not be negative"));
    }

    let integral = match normalized.split_once('.') {
        Some((int, frac)) => {
            if !frac.chars().all(|c| c == '0') {
                return Err(DomainError::validation(field, "must be a whole number"));
            }
            int
        }
        None => normalized.as_str(),
    };

    if integral.is_empty() || !integral.chars().all(|c| c.is_ascii_digit()) {
        return Err(DomainError::validation(
            field,
            format!("`{raw}` is not a number"),
        ));
    }

    integral
        .parse::<u64>()
        .map_err(|_| DomainError::validation(field, "number is too large"))
}

/// Accepts a missing, null, string, or numeric id; anything absent is unassigned.
fn id_or_unassigned<'de, D>(deserializer: D) -> Result<LineItemId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum WireId {
        Text(String),
        Number(u64),
    }

    Ok(match Option::<WireId>::deserialize(deserializer)? {
        Some(WireId::Text(s)) => LineItemId::from(s),
        Some(WireId::Number(n)) => LineItemId::from(n.to_string()),
        None => LineItemId::default(),
    })
}
