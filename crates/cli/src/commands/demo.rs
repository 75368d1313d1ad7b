//! End-to-end shopping flow over a seeded in-memory store.
//!
//! Walks the same path a shopper takes in the web client: browse the
//! featured rail, fill the cart, check out, and read back order history.
//! Store notices are printed with the exact texts the embedding UI shows
//! as toasts.

use luxe_core::{ShippingInput, UserId};
use luxe_storefront::services::{CartService, Catalog, CheckoutFlow, OrderHistory};
use luxe_storefront::session::Session;
use luxe_storefront::store::{RemoteStore, StoreOp};
use rust_decimal::Decimal;

use super::seeded_store;

/// Run the demo flow.
///
/// # Errors
///
/// Returns an error if a store operation fails outside the deliberately
/// injected hiccups.
#[allow(clippy::print_stdout, clippy::too_many_lines)]
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let store = seeded_store();
    let mut session = Session::new(store.clone());

    println!("LUXE storefront demo");
    println!("====================");
    println!();

    // Signed-out carts do not exist
    if session.cart().is_err() {
        println!("Please sign in to add items to cart");
    }

    let user_id = UserId::new();
    session.sign_in(user_id).await;
    println!("Signed in as {user_id}");
    println!();

    let catalog = Catalog::new(store.clone());
    let rail = catalog.featured().await?;
    println!("Featured");
    println!("--------");
    for product in &rail {
        println!("  {} - ${:.2}", product.name, product.price);
    }
    println!();

    let scarf = rail
        .iter()
        .find(|product| product.name == "Silk Evening Scarf")
        .ok_or("missing seed product")?;
    let weekender = rail
        .iter()
        .find(|product| product.name == "Leather Weekender")
        .ok_or("missing seed product")?;

    // Fill the cart; the repeated add merges onto the existing line
    let cart = session.cart()?;
    for product_id in [scarf.id, weekender.id, scarf.id] {
        match cart.add(product_id, 1).await {
            Ok(()) => println!("Added to cart"),
            Err(_) => println!("Failed to add item to cart"),
        }
    }
    println!();
    print_cart(cart);

    let scarf_line = cart
        .items()
        .into_iter()
        .find(|item| item.product_id == scarf.id)
        .map(|item| item.id)
        .ok_or("scarf missing from cart")?;
    let weekender_line = cart
        .items()
        .into_iter()
        .find(|item| item.product_id == weekender.id)
        .map(|item| item.id)
        .ok_or("weekender missing from cart")?;

    // A store hiccup surfaces as a notice and leaves the cart alone
    store.fail_next(StoreOp::UpdateCartItemQuantity);
    if cart.update_quantity(scarf_line, 1).await.is_err() {
        println!("Failed to update quantity");
    }
    cart.update_quantity(scarf_line, 1).await?;
    match cart.remove(weekender_line).await {
        Ok(()) => println!("Removed from cart"),
        Err(_) => println!("Failed to remove item"),
    }
    println!();
    print_cart(cart);

    // Checkout: an empty form reports every missing field at once
    let mut flow = CheckoutFlow::begin(cart)?;
    if let Err(e) = flow.submit_shipping(ShippingInput::default()) {
        println!("{e}");
    }
    flow.submit_shipping(ShippingInput {
        full_name: "Avery Quinn".to_string(),
        address: "500 Mercer Street".to_string(),
        city: "Seattle".to_string(),
        state: "WA".to_string(),
        zip_code: "98109".to_string(),
        country: "US".to_string(),
    })?;

    let totals = flow.totals();
    println!();
    println!("Review");
    println!("------");
    println!("  Subtotal: ${:.2}", totals.subtotal);
    if totals.shipping == Decimal::ZERO {
        println!("  Shipping: Free");
    } else {
        println!("  Shipping: ${:.2}", totals.shipping);
    }
    println!("  Total:    ${:.2}", totals.total);
    println!();

    match flow.place_order().await {
        Ok(order) => {
            println!("Order placed successfully!");
            println!("Reference: #{}", order.reference());
        }
        Err(e) => {
            println!("Failed to place order. Please try again.");
            return Err(e.into());
        }
    }
    println!();

    let history = OrderHistory::new(store);
    println!("Order history");
    println!("-------------");
    for order in history.list(user_id).await? {
        println!(
            "  #{} - {} - {} - ${:.2}",
            order.reference(),
            order.created_at.format("%B %-d, %Y"),
            order.status,
            order.total
        );
    }
    println!();

    session.sign_out();
    println!("Signed out");

    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_cart<S: RemoteStore>(cart: &CartService<S>) {
    println!("Cart ({} items)", cart.total_items());
    for item in cart.items() {
        let name = item
            .product
            .as_ref()
            .map_or("(unknown)", |product| product.name.as_str());
        println!("  {name} x{} - ${:.2}", item.quantity, item.line_total());
    }
    println!("  Subtotal: ${:.2}", cart.total_price());
}
