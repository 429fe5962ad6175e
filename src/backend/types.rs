//! Backend data shapes

use crate::session::ProductId;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// Every backend payload is wrapped in `{"data": ...}`
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}

/// Accumulated registration data
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationDraft {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub email: String,
    /// Raw image bytes; `None` when skipped or not yet provided
    pub image: Option<Vec<u8>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Registered {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub weight: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProductListing {
    pub data: Vec<Product>,
    #[serde(default)]
    pub links: Option<PageLinks>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PageLinks {
    #[serde(default)]
    pub next: Option<Value>,
}

/// One page of the product listing
#[derive(Debug, Clone, PartialEq)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub has_next: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub quantity: u32,
    /// Only present when requested with `showNamesAndPrices=true`
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default, rename = "product_price")]
    pub price: Option<f64>,
}

impl CartItem {
    pub fn line_total(&self) -> f64 {
        f64::from(self.quantity) * self.price.unwrap_or(0.0)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CartContents {
    #[serde(default)]
    pub products: Vec<CartItem>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Order {
    pub id: u64,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "totalPrice", default)]
    pub total_price: f64,
    #[serde(rename = "orderItems", default)]
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Creation time of the order, taken from its first item.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.items.first()?.created_at
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderItem {
    #[serde(default)]
    pub product_id: ProductId,
    #[serde(default)]
    pub product_name: String,
    pub quantity: u32,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Derived locally from `created_at`
    #[serde(skip)]
    pub days_since_creation: i64,
}

impl Account {
    pub(crate) fn with_age(mut self, now: DateTime<Utc>) -> Self {
        self.days_since_creation = self
            .created_at
            .map_or(0, |created| (now - created).num_days().max(0));
        self
    }

    pub fn field(&self, field: ProfileField) -> &str {
        match field {
            ProfileField::FirstName => &self.first_name,
            ProfileField::LastName => &self.last_name,
            ProfileField::Address => &self.address,
            ProfileField::Email => &self.email,
            ProfileField::Phone => &self.phone,
        }
    }
}

/// Editable text fields of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    FirstName,
    LastName,
    Address,
    Email,
    Phone,
}

impl ProfileField {
    pub const ALL: [ProfileField; 5] = [
        Self::FirstName,
        Self::LastName,
        Self::Address,
        Self::Email,
        Self::Phone,
    ];

    /// Form field name on the wire
    pub fn api_name(self) -> &'static str {
        match self {
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Address => "address",
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::FirstName => "First Name",
            Self::LastName => "Last Name",
            Self::Address => "Address",
            Self::Email => "Email",
            Self::Phone => "Phone",
        }
    }

    pub fn from_api_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.api_name() == name)
    }
}

/// One account change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountUpdate {
    Text { field: ProfileField, value: String },
    Image(Vec<u8>),
}
