//! Cart badge and cart modal markup.

use askama::Template;

use super::Endpoints;
use crate::cart::CartSnapshot;
use crate::router::BasePath;

struct CartRow {
    id: String,
    title: String,
    image: String,
    brand: String,
    price_label: String,
    total_label: String,
    quantity: u32,
    selected: bool,
    toggle_href: String,
    quantity_href: String,
    increase_href: String,
    decrease_href: String,
    remove_href: String,
}

#[derive(Template)]
#[template(path = "partials/cart_badge.html")]
struct CartBadgeTemplate {
    count: usize,
}

#[derive(Template)]
#[template(path = "partials/cart_modal.html")]
struct CartModalTemplate {
    endpoints: Endpoints,
    rows: Vec<CartRow>,
    is_empty: bool,
    all_selected: bool,
    total_count: usize,
    total_price: String,
    selected_count: usize,
    selected_price: String,
}

/// Cart icon badge showing the number of line items; empty when the cart is.
///
/// # Errors
///
/// Returns an error if the template fails to render.
pub fn cart_badge(snapshot: &CartSnapshot) -> askama::Result<String> {
    CartBadgeTemplate {
        count: snapshot.summary.total_count,
    }
    .render()
}

/// Full cart modal (overlay and content) for one snapshot.
///
/// # Errors
///
/// Returns an error if the template fails to render.
pub fn cart_modal(snapshot: &CartSnapshot, base: &BasePath) -> askama::Result<String> {
    let rows = snapshot
        .items
        .iter()
        .map(|line| {
            let id = &line.item.product_id;
            CartRow {
                id: id.to_string(),
                title: line.item.title.clone(),
                image: line.item.image.clone(),
                brand: line.item.brand.clone(),
                price_label: line.price_label.clone(),
                total_label: line.total_label.clone(),
                quantity: line.item.quantity,
                selected: line.item.selected,
                toggle_href: Endpoints::cart_item(base, id, "toggle"),
                quantity_href: Endpoints::cart_item(base, id, "quantity"),
                increase_href: Endpoints::cart_item(base, id, "increase"),
                decrease_href: Endpoints::cart_item(base, id, "decrease"),
                remove_href: Endpoints::cart_item(base, id, "remove"),
            }
        })
        .collect();

    CartModalTemplate {
        endpoints: Endpoints::new(base),
        rows,
        is_empty: snapshot.is_empty,
        all_selected: snapshot.all_selected,
        total_count: snapshot.summary.total_count,
        total_price: snapshot.summary.total_price.label(),
        selected_count: snapshot.summary.selected_count,
        selected_price: snapshot.summary.selected_price.label(),
    }
    .render()
}
