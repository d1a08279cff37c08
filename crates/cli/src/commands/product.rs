//! Catalog management commands.

use emporium_api::db::PgStore;
use emporium_api::schema::{CreateProductInput, Mutation};
use emporium_core::Price;

use super::{CommandError, connect};

/// Add a product to the catalog.
pub async fn create(
    name: String,
    description: Option<String>,
    price: Price,
    stock: u32,
) -> Result<(), CommandError> {
    let store = PgStore::new(connect().await?);

    let result = Mutation::new(&store)
        .create_product(CreateProductInput {
            name,
            description,
            price,
            stock,
        })
        .await?;

    tracing::info!(product_id = %result.payload.product.id, "{}", result.message);
    Ok(())
}
