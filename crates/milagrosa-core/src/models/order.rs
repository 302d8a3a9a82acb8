//! Order models for customer and purchase (supplier) orders.
//!
//! Order lifecycle is owned by the server; the client only creates
//! orders and requests approval.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which order book an order lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
    /// Placed by a retail customer.
    Customer,
    /// Placed by staff with a provider.
    Purchase,
}

impl OrderKind {
    pub fn path_segment(&self) -> &'static str {
        match self {
            OrderKind::Customer => "customer",
            OrderKind::Purchase => "purchase",
        }
    }
}

/// VAT percentage applied to every customer order.
pub const CUSTOMER_ORDER_IVA: i32 = 19;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductLine {
    pub quantity: i32,
    pub product_code: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub date: NaiveDate,
    #[serde(rename = "IVA")]
    pub iva: i32,
    pub expiration_date: NaiveDate,
    #[serde(default)]
    pub products_details: Vec<ProductLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub number: i64,
    /// Customer orders are stored without validation, so `date` and `IVA`
    /// may come back null.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(rename = "IVA", default)]
    pub iva: Option<i32>,
    #[serde(rename = "aproved", default)]
    pub approved: bool,
    pub provider_id: Option<i64>,
}
