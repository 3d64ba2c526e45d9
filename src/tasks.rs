//! Async task management for non-blocking API operations.
//!
//! Fetches and mutations run on tokio while the UI keeps drawing. Each task
//! sends exactly one `ApiMessage` back; the main loop drains the channel
//! with `try_recv()` between frames and hands messages to `App`.
//!
//! Mutations only report their outcome. The app decides what to re-fetch.

use tokio::sync::mpsc;
use tracing::debug;

use crate::api::types::{
    Category, DateRange, MerchantDetails, MerchantOrder, MerchantStats, OrderDetails, OrderStatus,
    Product, StatusChange, Subcategory, TrackedOrder,
};
use crate::api::{ApiError, HalalNestClient};

/// Messages sent from background tasks to the main event loop.
#[derive(Debug)]
pub enum ApiMessage {
    ProductsFetched(Result<Vec<Product>, ApiError>),

    OrdersFetched(Result<Vec<MerchantOrder>, ApiError>),

    CategoriesFetched(Result<Vec<Category>, ApiError>),

    StatsFetched {
        range: DateRange,
        result: Result<MerchantStats, ApiError>,
    },

    ProductStatusUpdated {
        product_id: u64,
        status: String,
        result: Result<(), ApiError>,
    },

    ProductDeleted {
        product_id: u64,
        result: Result<(), ApiError>,
    },

    OrderStatusUpdated {
        order_id: u64,
        status: OrderStatus,
        result: Result<(), ApiError>,
    },

    CategoryDeleted {
        category_id: u64,
        result: Result<(), ApiError>,
    },

    SubcategoriesFetched {
        category_id: u64,
        result: Result<Vec<Subcategory>, ApiError>,
    },

    SubcategoryDeleted {
        subcategory_id: u64,
        result: Result<(), ApiError>,
    },

    OrderDetailsFetched {
        order_id: u64,
        result: Result<OrderDetails, ApiError>,
    },

    OrderHistoryFetched {
        order_id: u64,
        result: Result<Vec<StatusChange>, ApiError>,
    },

    /// Lookup by order reference; `Ok(None)` when nothing matched.
    OrderTracked {
        reference: String,
        result: Result<Option<TrackedOrder>, ApiError>,
    },

    MerchantDetailsFetched(Result<MerchantDetails, ApiError>),
}

/// Spawns background tasks for API operations.
///
/// Each method clones the client and sender into a tokio task that sends
/// its result through the channel.
#[derive(Clone)]
pub struct TaskSpawner {
    tx: mpsc::UnboundedSender<ApiMessage>,
}

impl TaskSpawner {
    /// Create a new TaskSpawner with the given channel sender.
    pub fn new(tx: mpsc::UnboundedSender<ApiMessage>) -> Self {
        Self { tx }
    }

    /// Run `fut` on tokio and send the message it produces.
    fn spawn<F>(&self, fut: F)
    where
        F: std::future::Future<Output = ApiMessage> + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            if tx.send(fut.await).is_err() {
                debug!("Task result dropped: receiver closed");
            }
        });
    }

    pub fn spawn_fetch_products(&self, client: &HalalNestClient, merchant_id: u64) {
        let client = client.clone();
        self.spawn(async move {
            ApiMessage::ProductsFetched(client.fetch_products(merchant_id).await)
        });
    }

    pub fn spawn_fetch_orders(&self, client: &HalalNestClient, merchant_id: u64) {
        let client = client.clone();
        self.spawn(async move {
            ApiMessage::OrdersFetched(client.fetch_merchant_orders(merchant_id).await)
        });
    }

    pub fn spawn_fetch_categories(&self, client: &HalalNestClient) {
        let client = client.clone();
        self.spawn(async move { ApiMessage::CategoriesFetched(client.fetch_categories().await) });
    }

    pub fn spawn_fetch_stats(&self, client: &HalalNestClient, merchant_id: u64, range: DateRange) {
        let client = client.clone();
        self.spawn(async move {
            let result = client.fetch_merchant_stats(merchant_id, range).await;
            ApiMessage::StatsFetched { range, result }
        });
    }

    /// Spawn a task to change a product's listing status.
    pub fn spawn_update_product_status(
        &self,
        client: &HalalNestClient,
        product_id: u64,
        status: String,
    ) {
        let client = client.clone();
        self.spawn(async move {
            let result = client.update_product_status(product_id, &status).await;
            ApiMessage::ProductStatusUpdated {
                product_id,
                status,
                result,
            }
        });
    }

    /// Spawn a task to delete a product.
    pub fn spawn_delete_product(&self, client: &HalalNestClient, product_id: u64) {
        let client = client.clone();
        self.spawn(async move {
            let result = client.delete_product(product_id).await;
            ApiMessage::ProductDeleted { product_id, result }
        });
    }

    /// Spawn a task to move an order to a new status.
    pub fn spawn_update_order_status(
        &self,
        client: &HalalNestClient,
        order_id: u64,
        status: OrderStatus,
    ) {
        let client = client.clone();
        self.spawn(async move {
            let result = client.update_order_status(order_id, status).await;
            ApiMessage::OrderStatusUpdated {
                order_id,
                status,
                result,
            }
        });
    }

    /// Spawn a task to delete a category.
    pub fn spawn_delete_category(&self, client: &HalalNestClient, category_id: u64) {
        let client = client.clone();
        self.spawn(async move {
            let result = client.delete_category(category_id).await;
            ApiMessage::CategoryDeleted {
                category_id,
                result,
            }
        });
    }

    pub fn spawn_fetch_subcategories(&self, client: &HalalNestClient, category_id: u64) {
        let client = client.clone();
        self.spawn(async move {
            let result = client.fetch_subcategories(category_id).await;
            ApiMessage::SubcategoriesFetched { category_id, result }
        });
    }

    /// Spawn a task to delete a subcategory.
    pub fn spawn_delete_subcategory(&self, client: &HalalNestClient, subcategory_id: u64) {
        let client = client.clone();
        self.spawn(async move {
            let result = client.delete_subcategory(subcategory_id).await;
            ApiMessage::SubcategoryDeleted {
                subcategory_id,
                result,
            }
        });
    }

    /// Spawn the two lookups behind the order panel: details and status history.
    pub fn spawn_fetch_order(&self, client: &HalalNestClient, order_id: u64) {
        let details_client = client.clone();
        self.spawn(async move {
            let result = details_client.fetch_order_details(order_id).await;
            ApiMessage::OrderDetailsFetched { order_id, result }
        });
        let client = client.clone();
        self.spawn(async move {
            let result = client.fetch_order_status_history(order_id).await;
            ApiMessage::OrderHistoryFetched { order_id, result }
        });
    }

    pub fn spawn_track_order(&self, client: &HalalNestClient, reference: String) {
        let client = client.clone();
        self.spawn(async move {
            let result = client.track_order(&reference).await;
            ApiMessage::OrderTracked { reference, result }
        });
    }

    pub fn spawn_fetch_merchant_details(&self, client: &HalalNestClient, wallet_number: String) {
        let client = client.clone();
        self.spawn(async move {
            ApiMessage::MerchantDetailsFetched(client.fetch_merchant_details(&wallet_number).await)
        });
    }
}

/// Create a new task channel and spawner.
///
/// The receiver is polled in the main event loop; the spawner is handed to
/// whoever starts tasks.
pub fn create_task_channel() -> (mpsc::UnboundedReceiver<ApiMessage>, TaskSpawner) {
    let (tx, rx) = mpsc::unbounded_channel();
    (rx, TaskSpawner::new(tx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spawned_task_reports_through_channel() {
        let (mut rx, spawner) = create_task_channel();
        spawner.spawn(async { ApiMessage::CategoriesFetched(Ok(Vec::new())) });

        match rx.recv().await {
            Some(ApiMessage::CategoriesFetched(Ok(categories))) => assert!(categories.is_empty()),
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_mutation_carries_its_id() {
        let (mut rx, spawner) = create_task_channel();
        // Nothing listens on port 9 locally, so the request fails fast.
        let client = HalalNestClient::new("http://127.0.0.1:9/hialal").unwrap();
        spawner.spawn_delete_category(&client, 5);

        match rx.recv().await {
            Some(ApiMessage::CategoryDeleted {
                category_id,
                result,
            }) => {
                assert_eq!(category_id, 5);
                assert!(result.is_err());
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_closed_receiver_does_not_panic() {
        let (rx, spawner) = create_task_channel();
        drop(rx);
        spawner.spawn(async { ApiMessage::ProductsFetched(Ok(Vec::new())) });
        tokio::task::yield_now().await;
    }

    #[tokio::test]
    async fn test_order_lookup_sends_two_messages() {
        let (mut rx, spawner) = create_task_channel();
        let client = HalalNestClient::new("http://127.0.0.1:9/hialal").unwrap();
        spawner.spawn_fetch_order(&client, 17);

        let mut details = false;
        let mut history = false;
        for _ in 0..2 {
            match rx.recv().await {
                Some(ApiMessage::OrderDetailsFetched { order_id, result }) => {
                    assert_eq!(order_id, 17);
                    assert!(result.is_err());
                    details = true;
                }
                Some(ApiMessage::OrderHistoryFetched { order_id, .. }) => {
                    assert_eq!(order_id, 17);
                    history = true;
                }
                other => panic!("unexpected message: {:?}", other),
            }
        }
        assert!(details && history);
    }
}
