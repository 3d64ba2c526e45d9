//! HalalNest API client implementation.
//!
//! Wraps `reqwest` with JSON handling, status mapping and retry logic for
//! the merchant endpoints used by the dashboard.

use std::future::Future;
use std::time::Duration;

use reqwest::{header, Client, Method, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::error::{ApiError, Result};
use super::types::{
    Category, DateRange, MerchantDetails, MerchantDetailsRequest, MerchantOrder, MerchantStats,
    OrderDetails, OrderStatus, Product, ProductsResponse, StatsResponse, StatusChange, Subcategory,
    TrackOrderRequest, TrackOrderResponse, TrackedOrder, UpdateOrderStatus, UpdateProductStatus,
};
use crate::config::Profile;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum number of attempts for transient failures.
const MAX_RETRIES: u32 = 3;

/// Base delay between retries in milliseconds.
const RETRY_DELAY_MS: u64 = 1000;

/// Client for the HalalNest merchant API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct HalalNestClient {
    client: Client,
    base_url: Url,
    retry_delay_ms: u64,
}

impl HalalNestClient {
    /// Create a client for the API rooted at `base_url`.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(ApiError::Network)?;

        Ok(Self {
            client,
            base_url,
            retry_delay_ms: RETRY_DELAY_MS,
        })
    }

    /// Create a client for a configured profile.
    #[instrument(skip(profile), fields(profile_name = %profile.name))]
    pub fn from_profile(profile: &Profile) -> Result<Self> {
        info!("Creating HalalNest client for profile");
        Self::new(&profile.url)
    }

    /// The API root.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Fetch the products owned by a merchant.
    #[instrument(skip(self))]
    pub async fn fetch_products(&self, merchant_id: u64) -> Result<Vec<Product>> {
        let path = format!("products/merchant_products/{}", merchant_id);
        let response: ProductsResponse = self.get(&path, &[]).await?;
        debug!("Fetched {} products", response.products.len());
        Ok(response.products)
    }

    /// Set a product's listing status (`"1"` active, `"0"` inactive).
    #[instrument(skip(self))]
    pub async fn update_product_status(&self, product_id: u64, status: &str) -> Result<()> {
        let path = format!("products/update_product/{}", product_id);
        let body = UpdateProductStatus {
            status: status.to_string(),
        };
        self.send(Method::POST, &path, Some(&body)).await?;
        info!("Updated product status");
        Ok(())
    }

    /// Delete a product.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, product_id: u64) -> Result<()> {
        let path = format!("products/delete_product/{}", product_id);
        self.send::<()>(Method::DELETE, &path, None).await?;
        info!("Deleted product");
        Ok(())
    }

    /// Fetch the order lines placed with a merchant.
    #[instrument(skip(self))]
    pub async fn fetch_merchant_orders(&self, merchant_id: u64) -> Result<Vec<MerchantOrder>> {
        let path = format!("orders/merchant_orders/{}", merchant_id);
        let orders: Vec<MerchantOrder> = self.get(&path, &[]).await?;
        debug!("Fetched {} orders", orders.len());
        Ok(orders)
    }

    /// Move an order to a new fulfilment status.
    #[instrument(skip(self))]
    pub async fn update_order_status(&self, order_id: u64, status: OrderStatus) -> Result<()> {
        let path = format!("orders/update_order_status/{}", order_id);
        self.send(Method::PUT, &path, Some(&UpdateOrderStatus { status }))
            .await?;
        info!("Updated order status");
        Ok(())
    }

    /// Fetch an order with its line items.
    #[instrument(skip(self))]
    pub async fn fetch_order_details(&self, order_id: u64) -> Result<OrderDetails> {
        let path = format!("orders/order_details/{}", order_id);
        self.get(&path, &[]).await
    }

    /// Fetch the status changes an order went through.
    #[instrument(skip(self))]
    pub async fn fetch_order_status_history(&self, order_id: u64) -> Result<Vec<StatusChange>> {
        let path = format!("orders/order_status_history/{}", order_id);
        let history: Vec<StatusChange> = self.get(&path, &[]).await?;
        debug!("Fetched {} status changes", history.len());
        Ok(history)
    }

    /// Look up a store transaction by its order reference.
    ///
    /// Returns `None` when nothing matches.
    #[instrument(skip(self))]
    pub async fn track_order(&self, reference: &str) -> Result<Option<TrackedOrder>> {
        let body = TrackOrderRequest {
            order_reference: reference.trim().to_string(),
        };
        let response: TrackOrderResponse = self
            .post("store_transaction/transaction_details", &body)
            .await?;
        Ok(response.result.into_iter().next())
    }

    /// Fetch the merchant's account record.
    #[instrument(skip(self))]
    pub async fn fetch_merchant_details(&self, wallet_number: &str) -> Result<MerchantDetails> {
        let body = MerchantDetailsRequest {
            zippy_wallet_number: wallet_number.to_string(),
        };
        self.post("merchant_details", &body).await
    }

    /// Fetch every product category.
    #[instrument(skip(self))]
    pub async fn fetch_categories(&self) -> Result<Vec<Category>> {
        let categories: Vec<Category> = self.get("categories/all_categories", &[]).await?;
        debug!("Fetched {} categories", categories.len());
        Ok(categories)
    }

    /// Delete a category.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, category_id: u64) -> Result<()> {
        let path = format!("categories/delete_category/{}", category_id);
        self.send::<()>(Method::DELETE, &path, None).await?;
        info!("Deleted category");
        Ok(())
    }

    /// Fetch the subcategories of a category.
    #[instrument(skip(self))]
    pub async fn fetch_subcategories(&self, category_id: u64) -> Result<Vec<Subcategory>> {
        let path = format!("categories/subcategories/{}", category_id);
        let subcategories: Vec<Subcategory> = self.get(&path, &[]).await?;
        debug!("Fetched {} subcategories", subcategories.len());
        Ok(subcategories)
    }

    /// Delete a subcategory.
    #[instrument(skip(self))]
    pub async fn delete_subcategory(&self, subcategory_id: u64) -> Result<()> {
        let path = format!("categories/delete_subcategory/{}", subcategory_id);
        self.send::<()>(Method::DELETE, &path, None).await?;
        info!("Deleted subcategory");
        Ok(())
    }

    /// Fetch dashboard counters for a merchant over an optional window.
    #[instrument(skip(self))]
    pub async fn fetch_merchant_stats(
        &self,
        merchant_id: u64,
        range: DateRange,
    ) -> Result<MerchantStats> {
        let path = format!("merchant_stats/{}/", merchant_id);
        let response: StatsResponse = self.get(&path, &range.query_pairs()).await?;
        Ok(response.data.unwrap_or_default())
    }

    /// Resolve an endpoint path against the base URL.
    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", path, e)))
    }

    /// Perform a GET and parse the JSON body.
    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = &self.url(path)?;
        self.with_retry(move || async move {
            let response = self
                .client
                .get(url.clone())
                .query(query)
                .header(header::ACCEPT, "application/json")
                .send()
                .await?;
            let response = Self::check_status(response).await?;
            response
                .json::<T>()
                .await
                .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)))
        })
        .await
    }

    /// POST a JSON body and parse the JSON reply.
    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = &self.url(path)?;
        self.with_retry(move || async move {
            let response = self
                .client
                .post(url.clone())
                .header(header::ACCEPT, "application/json")
                .json(body)
                .send()
                .await?;
            let response = Self::check_status(response).await?;
            response
                .json::<T>()
                .await
                .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)))
        })
        .await
    }

    /// Perform a request whose response body is not needed.
    async fn send<B: Serialize>(&self, method: Method, path: &str, body: Option<&B>) -> Result<()> {
        let url = &self.url(path)?;
        let method = &method;
        self.with_retry(move || async move {
            let mut request = self
                .client
                .request(method.clone(), url.clone())
                .header(header::ACCEPT, "application/json");
            if let Some(body) = body {
                request = request.json(body);
            }
            let response = request.send().await?;
            Self::check_status(response).await?;
            Ok(())
        })
        .await
    }

    /// Run `op`, retrying transient failures with exponential backoff.
    async fn with_retry<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempts = 0;
        loop {
            attempts += 1;
            debug!("Request attempt {}/{}", attempts, MAX_RETRIES);
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempts < MAX_RETRIES => {
                    let delay = self.retry_delay(attempts);
                    warn!(
                        "Request failed (attempt {}), retrying in {}ms: {}",
                        attempts, delay, e
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Map a non-success status to an error.
    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let url = response.url().path().to_string();
        let body = response.text().await.unwrap_or_default();
        debug!("Error response body: {}", body);
        Err(error_from_response(status, &url, &body))
    }

    /// Delay before the next attempt.
    fn retry_delay(&self, attempt: u32) -> u64 {
        self.retry_delay_ms * 2u64.pow(attempt - 1)
    }
}

/// Build an error, preferring the backend's `message`/`error` field as context.
fn error_from_response(status: StatusCode, url: &str, body: &str) -> ApiError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            ["message", "error"]
                .iter()
                .find_map(|k| json.get(k).and_then(|v| v.as_str()).map(str::to_string))
        })
        .filter(|m| !m.is_empty());

    ApiError::from_status(status, message.as_deref().unwrap_or(url))
}

/// Parse the base URL and make sure it ends with a slash so joins append.
fn normalize_base_url(url: &str) -> Result<Url> {
    let trimmed = url.trim().trim_end_matches('/');
    if !trimmed.starts_with("https://") && !trimmed.contains("localhost") && !trimmed.contains("127.0.0.1") {
        warn!("URL does not use HTTPS: {}", trimmed);
    }
    Url::parse(&format!("{}/", trimmed)).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", url, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response per entry, returning the request lines seen.
    async fn serve(responses: Vec<(u16, &'static str)>) -> (String, tokio::task::JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let mut seen = Vec::new();
            for (status, body) in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buf = vec![0u8; 8192];
                let n = socket.read(&mut buf).await.unwrap();
                let request = String::from_utf8_lossy(&buf[..n]).to_string();
                seen.push(request.lines().next().unwrap_or_default().to_string());
                let reply = format!(
                    "HTTP/1.1 {} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                socket.write_all(reply.as_bytes()).await.unwrap();
                socket.shutdown().await.ok();
            }
            seen
        });
        (format!("http://{}/hialal", addr), handle)
    }

    #[test]
    fn test_normalize_base_url_adds_single_trailing_slash() {
        let url = normalize_base_url("https://api.halalnest.test/hialal///").unwrap();
        assert_eq!(url.as_str(), "https://api.halalnest.test/hialal/");
    }

    #[test]
    fn test_normalize_base_url_rejects_garbage() {
        assert!(matches!(
            normalize_base_url("not a url"),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_url_joins_below_base_path() {
        let client = HalalNestClient::new("https://api.halalnest.test/hialal").unwrap();
        let url = client.url("/products/merchant_products/2").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.halalnest.test/hialal/products/merchant_products/2"
        );
    }

    #[test]
    fn test_retry_delay_exponential() {
        let client = HalalNestClient::new("https://api.halalnest.test").unwrap();
        assert_eq!(client.retry_delay(1), 1000);
        assert_eq!(client.retry_delay(2), 2000);
        assert_eq!(client.retry_delay(3), 4000);
    }

    #[test]
    fn test_error_from_response_uses_message() {
        let err = error_from_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "/x",
            r#"{"message":"status must be 0 or 1"}"#,
        );
        match err {
            ApiError::Validation(msg) => assert_eq!(msg, "status must be 0 or 1"),
            other => panic!("unexpected {:?}", other),
        }

        let err = error_from_response(StatusCode::NOT_FOUND, "/products/9", "");
        assert!(matches!(err, ApiError::NotFound(ref m) if m == "/products/9"));
    }

    #[tokio::test]
    async fn test_fetch_products_parses_envelope() {
        let (base, server) = serve(vec![(
            200,
            r#"{"products":[{"product_id":1,"product_name":"Dates","status":"1"}]}"#,
        )])
        .await;
        let client = HalalNestClient::new(&base).unwrap();

        let products = client.fetch_products(2).await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].product_name, "Dates");

        let seen = server.await.unwrap();
        assert_eq!(seen[0], "GET /hialal/products/merchant_products/2 HTTP/1.1");
    }

    #[tokio::test]
    async fn test_stats_query_and_retry_on_server_error() {
        let (base, server) = serve(vec![
            (503, r#"{"message":"busy"}"#),
            (200, r#"{"data":{"total_orders":4,"total_customers":null}}"#),
        ])
        .await;
        let mut client = HalalNestClient::new(&base).unwrap();
        client.retry_delay_ms = 1;

        let range = DateRange::new(
            chrono::NaiveDate::from_ymd_opt(2024, 3, 1),
            chrono::NaiveDate::from_ymd_opt(2024, 3, 31),
        )
        .unwrap();
        let stats = client.fetch_merchant_stats(2, range).await.unwrap();
        assert_eq!(stats.total_orders, 4.0);
        assert_eq!(stats.total_customers, 0.0);

        let seen = server.await.unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[1].starts_with(
            "GET /hialal/merchant_stats/2/?startDate=2024-03-01&endDate=2024-03-31 "
        ));
    }

    #[tokio::test]
    async fn test_delete_not_found_is_not_retried() {
        let (base, server) = serve(vec![(404, r#"{"message":"no such product"}"#)]).await;
        let client = HalalNestClient::new(&base).unwrap();

        let err = client.delete_product(9).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(ref m) if m == "no such product"));

        let seen = server.await.unwrap();
        assert_eq!(seen, vec!["DELETE /hialal/products/delete_product/9 HTTP/1.1".to_string()]);
    }

    #[tokio::test]
    async fn test_track_order_posts_reference() {
        let (base, server) = serve(vec![
            (
                200,
                r#"{"result":[{"trans_reference":"HN-889","register_name":"Aisha Bello","sender_name":"Barakah Foods"}]}"#,
            ),
            (200, r#"{"result":[]}"#),
        ])
        .await;
        let client = HalalNestClient::new(&base).unwrap();

        let found = client.track_order(" HN-889 ").await.unwrap().unwrap();
        assert_eq!(found.sender_name, "Barakah Foods");
        assert_eq!(client.track_order("HN-000").await.unwrap(), None);

        let seen = server.await.unwrap();
        assert_eq!(
            seen[0],
            "POST /hialal/store_transaction/transaction_details HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn test_fetch_merchant_details() {
        let (base, server) = serve(vec![(
            200,
            r#"{"merchant_id":9,"names":"Aisha Bello","merchant_business_name":"Barakah Foods","bvn":null}"#,
        )])
        .await;
        let client = HalalNestClient::new(&base).unwrap();

        let merchant = client.fetch_merchant_details("0123456789").await.unwrap();
        assert_eq!(merchant.merchant_id, "9");
        assert_eq!(merchant.merchant_business_name, "Barakah Foods");

        let seen = server.await.unwrap();
        assert_eq!(seen[0], "POST /hialal/merchant_details HTTP/1.1");
    }

    #[tokio::test]
    async fn test_subcategory_endpoints() {
        let (base, server) = serve(vec![
            (200, r#"[{"subcategory_id":8,"subcategory_name":"Dried fruit","category_id":3}]"#),
            (200, "{}"),
        ])
        .await;
        let client = HalalNestClient::new(&base).unwrap();

        let subs = client.fetch_subcategories(3).await.unwrap();
        assert_eq!(subs[0].subcategory_name, "Dried fruit");
        client.delete_subcategory(8).await.unwrap();

        let seen = server.await.unwrap();
        assert_eq!(seen[0], "GET /hialal/categories/subcategories/3 HTTP/1.1");
        assert_eq!(seen[1], "DELETE /hialal/categories/delete_subcategory/8 HTTP/1.1");
    }

    #[tokio::test]
    async fn test_order_details_and_history() {
        let (base, server) = serve(vec![
            (200, r#"{"order_id":17,"order_status":"shipped","order_items":[]}"#),
            (
                200,
                r#"[{"status":"accepted","updated_at":"2024-03-01"},{"status":"shipped","updated_at":"2024-03-02"}]"#,
            ),
        ])
        .await;
        let client = HalalNestClient::new(&base).unwrap();

        let details = client.fetch_order_details(17).await.unwrap();
        assert_eq!(details.order_status, OrderStatus::Shipped);
        let history = client.fetch_order_status_history(17).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].status, "shipped");

        let seen = server.await.unwrap();
        assert_eq!(seen[0], "GET /hialal/orders/order_details/17 HTTP/1.1");
        assert_eq!(seen[1], "GET /hialal/orders/order_status_history/17 HTTP/1.1");
    }
}
