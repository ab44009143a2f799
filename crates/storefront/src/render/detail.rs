//! Detail page markup.

use askama::Template;

use super::ProductCard;
use crate::filters;
use crate::listing::Filters;
use crate::page::DetailView;
use crate::router::BasePath;

const DESCRIPTION_FALLBACK: &str = "No description available yet.";

struct Crumb {
    label: String,
    href: String,
}

#[derive(Template)]
#[template(path = "pages/detail_loading.html")]
struct DetailLoadingTemplate {
    back_href: String,
}

#[derive(Template)]
#[template(path = "pages/detail.html")]
struct DetailTemplate {
    home_href: String,
    crumbs: Vec<Crumb>,
    product_id: String,
    title: String,
    image: String,
    brand: String,
    price_label: String,
    /// CSS class per star, filled first.
    stars: Vec<&'static str>,
    rating_label: String,
    review_count: u64,
    stock: u64,
    description: String,
    add_href: String,
    back_href: String,
    related: Vec<ProductCard>,
}

/// Placeholder shown while a product loads.
///
/// # Errors
///
/// Returns an error if the template fails to render.
pub fn detail_loading(base: &BasePath) -> askama::Result<String> {
    DetailLoadingTemplate {
        back_href: base.join("/"),
    }
    .render()
}

/// Loaded product page.
///
/// # Errors
///
/// Returns an error if the template fails to render.
pub fn detail(view: &DetailView, base: &BasePath) -> askama::Result<String> {
    let product = &view.product;
    let rating = product.rating.filter(|r| r.is_finite()).unwrap_or(0.0);
    let filled = filled_stars(rating);

    let mut crumbs = Vec::new();
    let mut back = Filters::default();
    if !product.category1.is_empty() {
        back = back.with_category1(&product.category1);
        crumbs.push(Crumb {
            label: product.category1.clone(),
            href: back.href(base),
        });
        if !product.category2.is_empty() {
            back = back.with_category2(&product.category1, &product.category2);
            crumbs.push(Crumb {
                label: product.category2.clone(),
                href: back.href(base),
            });
        }
    }

    DetailTemplate {
        home_href: base.join("/"),
        crumbs,
        product_id: product.product_id.to_string(),
        title: product.title.clone(),
        image: product.image.clone(),
        brand: product.brand.clone(),
        price_label: product.price.label(),
        stars: (0..5)
            .map(|i| if i < filled { "star filled" } else { "star" })
            .collect(),
        rating_label: format!("{rating:.1}"),
        review_count: product.review_count.unwrap_or(0),
        stock: product.stock.unwrap_or(0),
        description: product
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(DESCRIPTION_FALLBACK)
            .to_string(),
        add_href: base.join("/cart/add"),
        back_href: back.href(base),
        related: view.related.iter().map(|p| ProductCard::new(p, base)).collect(),
    }
    .render()
}

/// Rating rounded and clamped to 0..=5 stars.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn filled_stars(rating: f64) -> u8 {
    rating.round().clamp(0.0, 5.0) as u8
}
