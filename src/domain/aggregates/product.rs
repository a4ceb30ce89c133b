//! Product Aggregate
//!
//! The storefront sells exactly one product. The store enforces the singleton;
//! this module only describes the record and the admin payload that edits it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};
use crate::domain::value_objects::{Money, Weight};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub weight: Weight,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin payload for creating or replacing the product.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct ProductDraft {
    /// Present when the editor is updating an existing record.
    #[serde(default, alias = "_id")]
    pub id: Option<Uuid>,
    #[validate(length(min = 1, max = 200, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[validate(custom = "storable_price")]
    pub price: Money,
    #[validate(custom = "storable_weight")]
    pub weight: Weight,
    #[validate(length(min = 1, message = "image is required"))]
    pub image: String,
}

fn storable_price(price: &Money) -> Result<(), ValidationError> {
    if !price.is_storable() {
        return Err(ValidationError::new("price must have at most 2 decimal places and not exceed 9999999999.99"));
    }
    Ok(())
}

fn storable_weight(weight: &Weight) -> Result<(), ValidationError> {
    if weight.value() <= Decimal::ZERO {
        return Err(ValidationError::new("weight must be positive"));
    }
    if !weight.is_storable() {
        return Err(ValidationError::new("weight must have at most 3 decimal places and not exceed 9999999.999"));
    }
    Ok(())
}

impl Product {
    pub fn create(draft: ProductDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(), name: draft.name, description: draft.description,
            price: draft.price, weight: draft.weight, image: draft.image,
            created_at: now, updated_at: now,
        }
    }

    /// Replaces every editable field; identity and creation time are kept.
    pub fn apply(&mut self, draft: ProductDraft) {
        self.name = draft.name;
        self.description = draft.description;
        self.price = draft.price;
        self.weight = draft.weight;
        self.image = draft.image;
        self.updated_at = Utc::now();
    }
}
