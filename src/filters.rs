//! Askama template filters for asset management

// Include compile-time generated asset hashes
include!(concat!(env!("OUT_DIR"), "/asset_hashes.rs"));

/// Append cache-busting hash to static asset URLs.
///
/// Usage in templates:
/// ```html
/// <link rel="stylesheet" href="{{ "/static/css/app.css"|asset_url }}">
/// ```
#[askama::filter_fn]
pub fn asset_url(path: impl std::fmt::Display, _: &dyn askama::Values) -> askama::Result<String> {
    let path_str = path.to_string();
    Ok(match path_str.as_str() {
        "/static/css/app.css" => format!("{}?v={}", path_str, APP_CSS_HASH),
        "/static/js/review.js" => format!("{}?v={}", path_str, REVIEW_JS_HASH),
        _ => path_str,
    })
}
