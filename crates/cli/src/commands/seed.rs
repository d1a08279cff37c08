//! Seed the catalog from a JSON file.
//!
//! The file holds an array of products in the same shape `createProduct`
//! accepts:
//!
//! ```json
//! [
//!   {"name": "Tea kettle", "description": "Stovetop, 1.7 L", "price": "30.00", "stock": 12},
//!   {"name": "Loose leaf sampler", "price": "14.50", "stock": 40}
//! ]
//! ```
//!
//! The whole file is validated before anything is written.

use std::path::Path;

use emporium_api::db::PgStore;
use emporium_api::schema::{CreateProductInput, Mutation};

use super::{CommandError, connect};

/// Parse a seed file's contents and check every entry's field limits.
fn parse_products(content: &str) -> Result<Vec<CreateProductInput>, CommandError> {
    let products: Vec<CreateProductInput> = serde_json::from_str(content)?;
    for (index, product) in products.iter().enumerate() {
        product
            .validate()
            .map_err(|source| CommandError::InvalidEntry { index, source })?;
    }
    Ok(products)
}

/// Create every product listed in `path`.
pub async fn products(path: &Path) -> Result<(), CommandError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CommandError::Io {
            path: path.display().to_string(),
            source,
        })?;
    let products = parse_products(&content)?;

    tracing::info!(path = %path.display(), count = products.len(), "Parsed seed file");

    let store = PgStore::new(connect().await?);
    let mutation = Mutation::new(&store);
    for product in products {
        let result = mutation.create_product(product).await?;
        tracing::info!(product_id = %result.payload.product.id, "{}", result.message);
    }

    tracing::info!("Seeding complete!");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_products() {
        let products = parse_products(
            r#"[
                {"name": "Tea kettle", "description": "Stovetop", "price": "30.00", "stock": 12},
                {"name": "Sampler", "price": "14.5", "stock": 40}
            ]"#,
        )
        .unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].price.to_string(), "30.00");
        assert!(products[1].description.is_none());
        assert_eq!(products[1].price.to_string(), "14.50");
    }

    #[test]
    fn test_parse_rejects_negative_stock() {
        let result = parse_products(r#"[{"name": "Mug", "price": "1.00", "stock": -1}]"#);
        assert!(matches!(result, Err(CommandError::Json(_))));
    }

    #[test]
    fn test_parse_rejects_entry_over_limits() {
        let content = format!(
            r#"[
                {{"name": "Mug", "price": "1.00", "stock": 5}},
                {{"name": "{}", "price": "2.00", "stock": 5}}
            ]"#,
            "x".repeat(300)
        );
        let result = parse_products(&content);
        assert!(matches!(result, Err(CommandError::InvalidEntry { index: 1, .. })));

        let result = parse_products(r#"[{"name": "Mug", "price": "1.00", "stock": 3000000000}]"#);
        assert!(matches!(result, Err(CommandError::InvalidEntry { index: 0, .. })));
    }
}
