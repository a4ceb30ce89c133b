//! Order recording and listing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::Identity;
use crate::domain::aggregates::{NewOrder, Order, Product};
use crate::domain::pricing::Quote;
use crate::domain::value_objects::Money;
use crate::error::{Result, StorefrontError};
use crate::events::EventPublisher;
use crate::services::quotes::{self, QuoteRequest};
use crate::store::Store;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProductSummary {
    pub id: Uuid,
    pub name: String,
    pub image: String,
}

impl From<&Product> for ProductSummary {
    fn from(p: &Product) -> Self {
        Self { id: p.id, name: p.name.clone(), image: p.image.clone() }
    }
}

/// An order with its product embedded; `product` is `None` once the product has been deleted.
#[derive(Clone, Debug, Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub product: Option<ProductSummary>,
}

/// Direct order placement. The total is always recomputed here; a client
/// supplied `total` is only checked against it.
#[derive(Clone, Debug, Deserialize)]
pub struct PlaceOrderRequest {
    #[serde(flatten)]
    pub pricing: QuoteRequest,
    #[serde(default)]
    pub product: Option<Uuid>,
    #[serde(default)]
    pub total: Option<Money>,
    #[serde(default)]
    pub payment_ref: Option<String>,
}

/// Persists an order whose total is the quote's total.
#[instrument(skip_all, fields(user_id = %identity.user_id, product_id = %product_id))]
pub async fn record(
    store: &dyn Store,
    events: &EventPublisher,
    identity: &Identity,
    product_id: Uuid,
    quote: &Quote,
    payment_ref: Option<String>,
) -> Result<Order> {
    let order = store.insert_order(NewOrder::priced(identity.user_id, product_id, quote, payment_ref)).await?;
    info!(order_id = %order.id, total = %order.total, "order recorded");
    events.publish(order.placed_event()).await;
    Ok(order)
}

pub async fn place(store: &dyn Store, events: &EventPublisher, identity: &Identity, request: PlaceOrderRequest) -> Result<Order> {
    let (product, quote) = quotes::price(store, &request.pricing).await?;
    if request.product.is_some_and(|id| id != product.id) {
        return Err(StorefrontError::ProductNotFound);
    }
    if let Some(claimed) = request.total {
        if claimed.rounded() != quote.total {
            return Err(StorefrontError::Validation(format!("total {claimed} does not match current price {}", quote.total)));
        }
    }
    record(store, events, identity, product.id, &quote, request.payment_ref).await
}

#[instrument(skip_all, fields(user_id = %identity.user_id))]
pub async fn list_for(store: &dyn Store, identity: &Identity) -> Result<Vec<OrderView>> {
    let orders = store.orders_for_user(identity.user_id).await?;
    let mut products: HashMap<Uuid, Option<ProductSummary>> = HashMap::new();
    let mut views = Vec::with_capacity(orders.len());
    for order in orders {
        let product = match products.get(&order.product_id) {
            Some(cached) => cached.clone(),
            None => {
                let found = store.product_by_id(order.product_id).await?.as_ref().map(ProductSummary::from);
                products.insert(order.product_id, found.clone());
                found
            }
        };
        views.push(OrderView { order, product });
    }
    Ok(views)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::{ProductDraft, Role};
    use crate::domain::value_objects::{Quantity, Weight};
    use crate::services::catalog;
    use crate::store::MemoryStore;
    use rust_decimal_macros::dec;

    fn shopper() -> Identity {
        Identity { user_id: Uuid::new_v4(), name: "Ada".into(), email: "ada@example.com".into(), role: Role::User }
    }

    async fn store_with_product() -> (MemoryStore, Product) {
        let store = MemoryStore::new();
        let product = store.create_product(ProductDraft {
            id: None, name: "Tea".into(), description: "Loose leaf".into(),
            price: Money::new(dec!(20)).unwrap(), weight: Weight::kilograms(dec!(4)).unwrap(),
            image: "https://img.example/tea.png".into(),
        }).await.unwrap();
        (store, product)
    }

    fn request(qty: u32, total: Option<Money>) -> PlaceOrderRequest {
        PlaceOrderRequest {
            pricing: QuoteRequest { quantity: Quantity::new(qty).unwrap(), coupon_code: None },
            product: None, total, payment_ref: None,
        }
    }

    #[tokio::test]
    async fn test_place_recomputes_total() {
        let (store, _) = store_with_product().await;
        let order = place(&store, &EventPublisher::disabled(), &shopper(), request(3, None)).await.unwrap();
        assert_eq!(order.total.amount(), dec!(62));
    }

    #[tokio::test]
    async fn test_mismatched_client_total_rejected() {
        let (store, _) = store_with_product().await;
        let err = place(&store, &EventPublisher::disabled(), &shopper(), request(3, Some(Money::new(dec!(1)).unwrap()))).await.unwrap_err();
        assert!(matches!(err, StorefrontError::Validation(_)));
        assert_eq!(store.order_count().await, 0);
    }

    #[tokio::test]
    async fn test_stored_total_survives_price_change() {
        let (store, product) = store_with_product().await;
        let events = EventPublisher::disabled();
        let who = shopper();
        place(&store, &events, &who, request(1, None)).await.unwrap();

        let mut draft = ProductDraft {
            id: Some(product.id), name: product.name.clone(), description: product.description.clone(),
            price: Money::new(dec!(99)).unwrap(), weight: product.weight, image: product.image.clone(),
        };
        draft.name.push_str(" (new)");
        catalog::upsert(&store, &events, draft).await.unwrap();

        let views = list_for(&store, &who).await.unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].order.total.amount(), dec!(22));
        assert_eq!(views[0].product.as_ref().unwrap().name, "Tea (new)");
    }

    #[tokio::test]
    async fn test_listing_only_shows_own_orders() {
        let (store, _) = store_with_product().await;
        let events = EventPublisher::disabled();
        place(&store, &events, &shopper(), request(1, None)).await.unwrap();
        assert!(list_for(&store, &shopper()).await.unwrap().is_empty());
    }
}
