//! Catalog listing over the seeded store.

use luxe_storefront::services::Catalog;
use luxe_storefront::store::types::ProductFilter;

use super::seeded_store;

/// List products from the seeded catalog, newest first.
///
/// # Errors
///
/// Returns an error if the catalog read fails.
#[allow(clippy::print_stdout)]
pub async fn list(
    category: Option<String>,
    featured: bool,
    limit: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = Catalog::new(seeded_store());

    let filter = ProductFilter {
        category,
        featured: featured.then_some(true),
        limit,
    };
    let products = catalog.products(&filter).await?;

    if products.is_empty() {
        println!("No products match");
        return Ok(());
    }

    for product in &products {
        let marker = if product.featured { "*" } else { " " };
        println!(
            "{marker} {:<20} {:<12} ${:.2}",
            product.name, product.category, product.price
        );
    }

    Ok(())
}
