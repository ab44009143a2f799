//! Cart route handlers.
//!
//! Every control in the cart modal and on product pages posts here with
//! `hx-swap="none"`. Handlers only call store mutators and raise toasts; the
//! badge and the modal re-render through their store subscriptions and reach
//! the browser over the event stream.

use axum::{
    Form,
    extract::Path,
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use pocket_mall_core::ProductId;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::CurrentShopper;
use crate::toast::ToastKind;

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    pub quantity: Option<u32>,
}

/// Set quantity form data.
#[derive(Debug, Deserialize)]
pub struct QuantityForm {
    pub quantity: u32,
}

/// Select-all form data.
#[derive(Debug, Deserialize)]
pub struct SelectAllForm {
    pub checked: bool,
}

fn product_id(raw: &str) -> Result<ProductId> {
    ProductId::parse(raw).map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Add a product from the current page.
#[instrument(skip_all, fields(shopper_id = %shopper.id(), product_id = %form.product_id))]
pub async fn add(
    CurrentShopper(shopper): CurrentShopper,
    Form(form): Form<AddToCartForm>,
) -> Result<StatusCode> {
    let id = product_id(&form.product_id)?;
    let quantity = form.quantity.unwrap_or(1);

    if shopper.cart().add_items(&id, quantity) {
        add_breadcrumb("cart", "Added to cart", Some(&[("product_id", id.as_str())]));
        shopper.toaster().show("Added to cart", ToastKind::Success);
    } else {
        shopper
            .toaster()
            .show("This product is no longer on the page.", ToastKind::Info);
    }
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip_all, fields(shopper_id = %shopper.id()))]
pub async fn open_modal(CurrentShopper(shopper): CurrentShopper) -> StatusCode {
    shopper.modal().open();
    StatusCode::NO_CONTENT
}

#[instrument(skip_all, fields(shopper_id = %shopper.id()))]
pub async fn close_modal(CurrentShopper(shopper): CurrentShopper) -> StatusCode {
    shopper.modal().close();
    StatusCode::NO_CONTENT
}

#[instrument(skip_all, fields(shopper_id = %shopper.id(), product_id = %raw_id))]
pub async fn toggle(
    CurrentShopper(shopper): CurrentShopper,
    Path(raw_id): Path<String>,
) -> Result<StatusCode> {
    shopper.cart().toggle_item(&product_id(&raw_id)?);
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip_all, fields(shopper_id = %shopper.id(), product_id = %raw_id))]
pub async fn set_quantity(
    CurrentShopper(shopper): CurrentShopper,
    Path(raw_id): Path<String>,
    Form(form): Form<QuantityForm>,
) -> Result<StatusCode> {
    shopper
        .cart()
        .update_quantity(&product_id(&raw_id)?, form.quantity);
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip_all, fields(shopper_id = %shopper.id(), product_id = %raw_id))]
pub async fn increase(
    CurrentShopper(shopper): CurrentShopper,
    Path(raw_id): Path<String>,
) -> Result<StatusCode> {
    shopper.cart().adjust_quantity(&product_id(&raw_id)?, 1);
    Ok(StatusCode::NO_CONTENT)
}

/// Quantity minus one; a line never drops below one unit here.
#[instrument(skip_all, fields(shopper_id = %shopper.id(), product_id = %raw_id))]
pub async fn decrease(
    CurrentShopper(shopper): CurrentShopper,
    Path(raw_id): Path<String>,
) -> Result<StatusCode> {
    shopper.cart().adjust_quantity(&product_id(&raw_id)?, -1);
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip_all, fields(shopper_id = %shopper.id(), product_id = %raw_id))]
pub async fn remove(
    CurrentShopper(shopper): CurrentShopper,
    Path(raw_id): Path<String>,
) -> Result<StatusCode> {
    if shopper.cart().remove_item(&product_id(&raw_id)?) {
        shopper.toaster().show("Removed from cart", ToastKind::Info);
    }
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip_all, fields(shopper_id = %shopper.id(), checked = form.checked))]
pub async fn select_all(
    CurrentShopper(shopper): CurrentShopper,
    Form(form): Form<SelectAllForm>,
) -> StatusCode {
    shopper.cart().toggle_all(form.checked);
    StatusCode::NO_CONTENT
}

#[instrument(skip_all, fields(shopper_id = %shopper.id()))]
pub async fn remove_selected(CurrentShopper(shopper): CurrentShopper) -> StatusCode {
    if shopper.cart().remove_selected() {
        shopper.toaster().show("Removed selected items", ToastKind::Info);
    }
    StatusCode::NO_CONTENT
}

#[instrument(skip_all, fields(shopper_id = %shopper.id()))]
pub async fn clear(CurrentShopper(shopper): CurrentShopper) -> StatusCode {
    if shopper.cart().clear() {
        shopper.toaster().show("Cart cleared", ToastKind::Info);
    }
    StatusCode::NO_CONTENT
}

#[instrument(skip_all, fields(shopper_id = %shopper.id()))]
pub async fn checkout(CurrentShopper(shopper): CurrentShopper) -> StatusCode {
    shopper
        .toaster()
        .show("Checkout is not available yet", ToastKind::Info);
    StatusCode::NO_CONTENT
}
