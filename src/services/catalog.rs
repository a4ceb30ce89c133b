//! Admin editing of the singleton product.

use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::domain::aggregates::{Product, ProductDraft};
use crate::domain::events::ProductEvent;
use crate::error::{Result, StorefrontError};
use crate::events::EventPublisher;
use crate::store::Store;

/// Zero or one element; clients display the first.
pub async fn list(store: &dyn Store) -> Result<Vec<Product>> {
    Ok(store.product().await?.into_iter().collect())
}

/// Updates the product named by `draft.id`, or creates the product when no id is given.
#[instrument(skip_all, fields(product_id = ?draft.id))]
pub async fn upsert(store: &dyn Store, events: &EventPublisher, draft: ProductDraft) -> Result<Product> {
    match draft.id {
        Some(id) => update(store, events, id, draft).await,
        None => {
            draft.validate()?;
            let product = store.create_product(draft).await?;
            info!(product_id = %product.id, "product created");
            events.publish(ProductEvent::Created { product_id: product.id }).await;
            Ok(product)
        }
    }
}

#[instrument(skip(store, events, draft))]
pub async fn update(store: &dyn Store, events: &EventPublisher, id: Uuid, draft: ProductDraft) -> Result<Product> {
    draft.validate()?;
    let product = store.update_product(id, draft).await?.ok_or(StorefrontError::ProductNotFound)?;
    info!(price = %product.price, "product updated");
    events.publish(ProductEvent::Updated { product_id: id, price: product.price.amount() }).await;
    Ok(product)
}

#[instrument(skip(store, events))]
pub async fn delete(store: &dyn Store, events: &EventPublisher, id: Uuid) -> Result<()> {
    if !store.delete_product(id).await? {
        return Err(StorefrontError::ProductNotFound);
    }
    info!("product deleted");
    events.publish(ProductEvent::Deleted { product_id: id }).await;
    Ok(())
}
