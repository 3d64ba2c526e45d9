//! HalalNest API request and response types.
//!
//! The backend is loose about JSON types: ids and amounts arrive as numbers
//! or strings and optional fields may be `null` or missing. Identifier and
//! amount fields are normalized to strings on the way in.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize a string, number, bool or null into a `String`.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

/// Deserialize a number, numeric string or null into an `f64`.
fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

/// A merchant's product.
///
/// Returned inside `{ "products": [...] }` by
/// `GET products/merchant_products/{merchant_id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, deserialize_with = "lenient_string")]
    pub product_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sub_category_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub merchant_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub product_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub short_product_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub product_description: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub product_price: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub product_model: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub product_color: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub expiry_date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub product_discount_percentage: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub vat: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub product_quantity: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub subcategory_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub vendor: String,
    /// `"1"` when the product is listed, `"0"` otherwise.
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: String,
}

impl Product {
    /// Whether the product is listed for sale.
    pub fn is_active(&self) -> bool {
        self.status == "1"
    }
}

/// Envelope for the merchant product listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductsResponse {
    #[serde(default)]
    pub products: Vec<Product>,
}

/// Body of `POST products/update_product/{id}` when only the status changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateProductStatus {
    pub status: String,
}

/// Fulfilment status of an order, in the order it progresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Accepted,
    Shipped,
    Delivered,
    Received,
}

impl OrderStatus {
    /// All statuses in progression order.
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Accepted,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Received,
    ];

    /// The wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Accepted => "accepted",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Received => "received",
        }
    }

    /// The status that follows this one, if any.
    pub fn next(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Accepted => Some(OrderStatus::Shipped),
            OrderStatus::Shipped => Some(OrderStatus::Delivered),
            OrderStatus::Delivered => Some(OrderStatus::Received),
            OrderStatus::Received => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "accepted" => Ok(OrderStatus::Accepted),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "received" => Ok(OrderStatus::Received),
            other => Err(format!("unknown order status '{}'", other)),
        }
    }
}

/// Deserialize an order status, treating missing or unknown values as accepted.
fn lenient_status<'de, D>(deserializer: D) -> Result<OrderStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = lenient_string(deserializer)?;
    Ok(raw.parse().unwrap_or_default())
}

/// One line item of an order placed with this merchant.
///
/// Returned by `GET orders/merchant_orders/{merchant_id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MerchantOrder {
    #[serde(default, deserialize_with = "lenient_string")]
    pub order_item_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub order_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub product_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub product_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub customer_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub merchant_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub price: String,
    #[serde(default)]
    pub quantity: Option<String>,
    #[serde(default)]
    pub ordered_at: Option<String>,
    #[serde(default, alias = "order_status", deserialize_with = "lenient_status")]
    pub status: OrderStatus,
}

/// Body of `PUT orders/update_order_status/{order_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateOrderStatus {
    pub status: OrderStatus,
}

/// A product category.
///
/// Returned by `GET categories/all_categories`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default, deserialize_with = "lenient_string")]
    pub category_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: String,
}

/// A subcategory under a product category.
///
/// Returned by `GET categories/subcategories/{category_id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subcategory {
    #[serde(default, deserialize_with = "lenient_string")]
    pub subcategory_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub subcategory_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category_id: String,
}

/// A whole order with its line items.
///
/// Returned by `GET orders/order_details/{order_id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderDetails {
    #[serde(default, deserialize_with = "lenient_string")]
    pub order_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub customer_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub total_amount: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub vat: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub delivery_fee: String,
    #[serde(default, deserialize_with = "lenient_status")]
    pub order_status: OrderStatus,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub order_items: Vec<MerchantOrder>,
}

/// One entry of an order's status history.
///
/// Returned as a list by `GET orders/order_status_history/{order_id}`. The
/// status is kept as sent so unexpected values show up as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub updated_at: String,
}

/// Body of `POST store_transaction/transaction_details`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackOrderRequest {
    pub order_reference: String,
}

/// A store transaction found by its order reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TrackedOrder {
    #[serde(default, deserialize_with = "lenient_string")]
    pub trans_reference: String,
    /// Customer who placed the order.
    #[serde(default, deserialize_with = "lenient_string")]
    pub register_name: String,
    /// Merchant who sold it.
    #[serde(default, deserialize_with = "lenient_string")]
    pub sender_name: String,
}

/// Envelope for the transaction lookup; `result` holds the matches.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackOrderResponse {
    #[serde(default)]
    pub result: Vec<TrackedOrder>,
}

/// Body of `POST merchant_details`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MerchantDetailsRequest {
    pub zippy_wallet_number: String,
}

/// The merchant's account record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MerchantDetails {
    #[serde(default, deserialize_with = "lenient_string")]
    pub merchant_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub names: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub merchant_business_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub gender: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub address: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phonenumber: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub providus_account_no: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub registered_at: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub active_status: String,
}

impl MerchantDetails {
    /// Upper-case first letters of each word of the merchant's name.
    pub fn initials(&self) -> String {
        self.names
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }
}

/// Optional reporting window for merchant statistics.
///
/// Both bounds are inclusive; when both are set `start <= end`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

impl DateRange {
    /// Build a range, rejecting a start after the end.
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self, String> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(format!("start date {} is after end date {}", s, e));
            }
        }
        Ok(Self { start, end })
    }

    /// The unbounded range.
    pub fn all_time() -> Self {
        Self::default()
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.end
    }

    /// Query string pairs (`startDate`, `endDate`) as `YYYY-MM-DD`.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(start) = self.start {
            pairs.push(("startDate", start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = self.end {
            pairs.push(("endDate", end.format("%Y-%m-%d").to_string()));
        }
        pairs
    }
}

/// Summary counters for the dashboard.
///
/// Returned inside `{ "data": {...} }` by `GET merchant_stats/{merchant_id}/`.
/// Null counters become zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct MerchantStats {
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_customers: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_orders: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_amount: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub average_amount: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_customers_month: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_orders_month: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_amount_month: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub average_amount_month: f64,
}

/// Envelope for the merchant statistics endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsResponse {
    #[serde(default)]
    pub data: Option<MerchantStats>,
}
