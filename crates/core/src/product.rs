//! Catalogue product types and the coercion from submitted form fields.
//!
//! Submitters send product fields as raw strings straight from the listing
//! form (prices included). [`NewProduct`] and [`ProductUpdate`] are the
//! coerced catalogue representations applied when a submission is approved.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Rating assigned to a freshly published product.
pub const INITIAL_RATING: f64 = 0.0;

/// Review count assigned to a freshly published product.
pub const INITIAL_REVIEWS_COUNT: i32 = 0;

// ---------------------------------------------------------------------------
// Product
// ---------------------------------------------------------------------------

/// Catalogue visibility of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    /// Listed in the public catalogue.
    Available,
    /// Removed from listings by an approved delete request.
    Hidden,
}

impl ProductStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProductStatus::Available => "available",
            ProductStatus::Hidden => "hidden",
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(ProductStatus::Available),
            "hidden" => Ok(ProductStatus::Hidden),
            other => Err(CoreError::Internal(format!(
                "Unknown product status '{other}'"
            ))),
        }
    }
}

/// A published catalogue entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: DbId,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub daily_price: f64,
    pub weekly_price: Option<f64>,
    pub monthly_price: Option<f64>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub image_url: Option<String>,
    pub rating: f64,
    pub reviews_count: i32,
    pub status: ProductStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Coerced fields for inserting a new catalogue product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub daily_price: f64,
    pub weekly_price: Option<f64>,
    pub monthly_price: Option<f64>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub image_url: Option<String>,
    pub rating: f64,
    pub reviews_count: i32,
    pub status: ProductStatus,
}

impl NewProduct {
    /// Coerce validated form fields into their catalogue representation.
    ///
    /// Applies the catalogue defaults (rating 0, no reviews, available).
    pub fn from_fields(fields: &ProductFields) -> Result<Self, CoreError> {
        Ok(Self {
            name: fields.tool_name.trim().to_string(),
            category: fields.category.trim().to_string(),
            description: fields.description.clone(),
            daily_price: parse_price("dailyPrice", &fields.daily_price)?,
            weekly_price: parse_optional_price("weeklyPrice", fields.weekly_price.as_deref())?,
            monthly_price: parse_optional_price("monthlyPrice", fields.monthly_price.as_deref())?,
            city: fields.city.clone(),
            phone: fields.phone.clone(),
            image_url: fields.image_url.clone(),
            rating: INITIAL_RATING,
            reviews_count: INITIAL_REVIEWS_COUNT,
            status: ProductStatus::Available,
        })
    }
}

/// Coerced partial update for an existing product. `None` leaves a column untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub daily_price: Option<f64>,
    pub weekly_price: Option<f64>,
    pub monthly_price: Option<f64>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub image_url: Option<String>,
}

impl ProductUpdate {
    /// Coerce a submitted patch. Present fields must satisfy the same rules
    /// as a full submission; an empty patch is rejected.
    pub fn from_patch(patch: &ProductPatch) -> Result<Self, CoreError> {
        if patch.is_empty() {
            return Err(CoreError::Validation(
                "A modification request must change at least one field".to_string(),
            ));
        }
        Ok(Self {
            name: required_text("toolName", patch.tool_name.as_deref())?,
            category: required_text("category", patch.category.as_deref())?,
            description: patch.description.clone(),
            daily_price: parse_optional_price("dailyPrice", patch.daily_price.as_deref())?,
            weekly_price: parse_optional_price("weeklyPrice", patch.weekly_price.as_deref())?,
            monthly_price: parse_optional_price("monthlyPrice", patch.monthly_price.as_deref())?,
            city: patch.city.clone(),
            phone: patch.phone.clone(),
            image_url: patch.image_url.clone(),
        })
    }

    /// Apply the present fields onto `product`.
    pub fn apply_to(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name.clone_from(name);
        }
        if let Some(category) = &self.category {
            product.category.clone_from(category);
        }
        if self.description.is_some() {
            product.description.clone_from(&self.description);
        }
        if let Some(price) = self.daily_price {
            product.daily_price = price;
        }
        if self.weekly_price.is_some() {
            product.weekly_price = self.weekly_price;
        }
        if self.monthly_price.is_some() {
            product.monthly_price = self.monthly_price;
        }
        if self.city.is_some() {
            product.city.clone_from(&self.city);
        }
        if self.phone.is_some() {
            product.phone.clone_from(&self.phone);
        }
        if self.image_url.is_some() {
            product.image_url.clone_from(&self.image_url);
        }
    }
}

// ---------------------------------------------------------------------------
// Submitted form fields
// ---------------------------------------------------------------------------

/// Product fields as submitted from the listing form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductFields {
    #[validate(length(min = 1, message = "toolName is required"))]
    pub tool_name: String,
    #[validate(length(min = 1, message = "category is required"))]
    pub category: String,
    #[validate(length(min = 1, message = "dailyPrice is required"))]
    pub daily_price: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ProductFields {
    /// Trim every field and drop optional fields left blank.
    pub fn normalized(self) -> Self {
        Self {
            tool_name: self.tool_name.trim().to_string(),
            category: self.category.trim().to_string(),
            daily_price: self.daily_price.trim().to_string(),
            description: non_blank(self.description),
            weekly_price: non_blank(self.weekly_price),
            monthly_price: non_blank(self.monthly_price),
            city: non_blank(self.city),
            phone: non_blank(self.phone),
            image_url: non_blank(self.image_url),
        }
    }
}

/// A partial set of product fields proposed by a modification request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.tool_name.is_none()
            && self.category.is_none()
            && self.description.is_none()
            && self.daily_price.is_none()
            && self.weekly_price.is_none()
            && self.monthly_price.is_none()
            && self.city.is_none()
            && self.phone.is_none()
            && self.image_url.is_none()
    }

    /// Trim every field and drop fields left blank.
    pub fn normalized(self) -> Self {
        Self {
            tool_name: non_blank(self.tool_name),
            category: non_blank(self.category),
            description: non_blank(self.description),
            daily_price: non_blank(self.daily_price),
            weekly_price: non_blank(self.weekly_price),
            monthly_price: non_blank(self.monthly_price),
            city: non_blank(self.city),
            phone: non_blank(self.phone),
            image_url: non_blank(self.image_url),
        }
    }
}

// ---------------------------------------------------------------------------
// Comparison view
// ---------------------------------------------------------------------------

/// One field a modification request would change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    pub field: &'static str,
    pub current: Option<String>,
    pub proposed: String,
}

/// List the fields of `patch` whose proposed value differs from `product`.
pub fn field_changes(product: &Product, patch: &ProductPatch) -> Vec<FieldChange> {
    let mut changes = Vec::new();

    let mut push_text = |field: &'static str, current: Option<&str>, proposed: Option<&String>| {
        if let Some(proposed) = proposed {
            if current != Some(proposed.as_str()) {
                changes.push(FieldChange {
                    field,
                    current: current.map(str::to_string),
                    proposed: proposed.clone(),
                });
            }
        }
    };
    push_text("toolName", Some(&product.name), patch.tool_name.as_ref());
    push_text("category", Some(&product.category), patch.category.as_ref());
    push_text("description", product.description.as_deref(), patch.description.as_ref());
    push_text("city", product.city.as_deref(), patch.city.as_ref());
    push_text("phone", product.phone.as_deref(), patch.phone.as_ref());
    push_text("imageUrl", product.image_url.as_deref(), patch.image_url.as_ref());

    let prices = [
        ("dailyPrice", Some(product.daily_price), patch.daily_price.as_ref()),
        ("weeklyPrice", product.weekly_price, patch.weekly_price.as_ref()),
        ("monthlyPrice", product.monthly_price, patch.monthly_price.as_ref()),
    ];
    for (field, current, proposed) in prices {
        let Some(proposed) = proposed else { continue };
        let unchanged = matches!(
            (current, parse_price(field, proposed)),
            (Some(current), Ok(parsed)) if current == parsed
        );
        if !unchanged {
            changes.push(FieldChange {
                field,
                current: current.map(|p| p.to_string()),
                proposed: proposed.clone(),
            });
        }
    }

    changes
}

// ---------------------------------------------------------------------------
// Coercion helpers
// ---------------------------------------------------------------------------

/// Parse a submitted price into its numeric catalogue value.
///
/// Accepts Arabic-Indic and Extended Arabic-Indic digits and a single decimal
/// separator: `.`, the Arabic decimal separator, or `,` followed by one or
/// two digits. Digit grouping (`1,000`, or the Arabic thousands separator)
/// is rejected rather than guessed at, as are negative and non-finite values.
pub fn parse_price(field: &str, raw: &str) -> Result<f64, CoreError> {
    let not_a_number =
        || CoreError::Validation(format!("{field} must be a number, got '{raw}'"));

    let mut normalized = String::with_capacity(raw.len());
    let mut separator: Option<(char, usize)> = None;
    for c in raw.trim().chars() {
        match c {
            '\u{0660}'..='\u{0669}' => normalized.push(char::from(b'0' + (c as u32 - 0x0660) as u8)),
            '\u{06F0}'..='\u{06F9}' => normalized.push(char::from(b'0' + (c as u32 - 0x06F0) as u8)),
            '.' | ',' | '\u{066B}' => {
                if separator.is_some() {
                    return Err(not_a_number());
                }
                separator = Some((c, normalized.len()));
                normalized.push('.');
            }
            '\u{066C}' => return Err(not_a_number()),
            other => normalized.push(other),
        }
    }

    if let Some((',', at)) = separator {
        let fraction = normalized.len() - at - 1;
        if !(1..=2).contains(&fraction) {
            return Err(not_a_number());
        }
    }

    let value: f64 = normalized.parse().map_err(|_| not_a_number())?;

    if !value.is_finite() || value < 0.0 {
        return Err(CoreError::Validation(format!(
            "{field} must be a non-negative number, got '{raw}'"
        )));
    }
    Ok(value)
}

fn parse_optional_price(field: &str, raw: Option<&str>) -> Result<Option<f64>, CoreError> {
    raw.map(|r| parse_price(field, r)).transpose()
}

fn required_text(field: &str, value: Option<&str>) -> Result<Option<String>, CoreError> {
    match value.map(str::trim) {
        Some("") => Err(CoreError::Validation(format!("{field} must not be blank"))),
        Some(v) => Ok(Some(v.to_string())),
        None => Ok(None),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
