//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use pocket_mall_core::group_thousands;

/// Formats an integer with thousands separators; other values pass through.
///
/// Usage in templates: `{{ review_count|thousands }}`
#[askama::filter_fn]
pub fn thousands(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let raw = value.to_string();
    Ok(raw.parse::<u64>().map_or(raw, group_thousands))
}
