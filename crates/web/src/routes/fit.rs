//! Public share page.
//!
//! `/fit/{id}` is the URL people paste into chats. It renders no photo
//! content itself: the head carries Open Graph and Twitter metadata whose
//! image URL points at the proxy, so scrapers get a preview, and a small
//! inline script immediately forwards browsers to `/?photo={id}` where the
//! usual sign-in rules apply.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};

use photoload_core::PhotoId;

use crate::error::{AppError, Result};
use crate::middleware::CspNonce;
use crate::state::AppState;

/// Share page template (head metadata plus the redirect script).
#[derive(Template, WebTemplate)]
#[template(path = "fit.html")]
pub struct FitTemplate {
    /// Public base URL, for absolute image and page URLs.
    pub base_url: String,
    /// The shared photo's id.
    pub photo_id: String,
    /// Whether the id resolved; unknown ids get no image metadata but are
    /// still forwarded into the app.
    pub has_image: bool,
    /// CSP nonce for the inline redirect script.
    pub nonce: String,
}

/// Render the share page for one photo.
///
/// Existence is checked by id alone (an id projection, nothing else) and
/// only decides whether image metadata is emitted: scrapers see no preview
/// for ids that do not resolve, while browsers are forwarded either way.
/// A malformed id is a 404 outright.
///
/// # Route
///
/// `GET /fit/{id}`
pub async fn fit_page(
    State(state): State<AppState>,
    nonce: CspNonce,
    Path(id): Path<String>,
) -> Result<FitTemplate> {
    let id: PhotoId = id
        .parse()
        .map_err(|_| AppError::NotFound("Photo not found".to_string()))?;

    let has_image = state.admin().photo_exists(id).await?;

    Ok(FitTemplate {
        base_url: state.config().base_url.clone(),
        photo_id: id.to_string(),
        has_image,
        nonce: nonce.0,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn render(has_image: bool) -> (PhotoId, String) {
        let id = PhotoId::new();
        let html = FitTemplate {
            base_url: "https://photoload.example".to_string(),
            photo_id: id.to_string(),
            has_image,
            nonce: "abc123".to_string(),
        }
        .render()
        .unwrap();
        (id, html)
    }

    #[test]
    fn test_known_photo_gets_image_metadata() {
        let (id, html) = render(true);

        // Scraper metadata points at the image proxy
        assert!(html.contains(&format!("https://photoload.example/api/og-photo/{id}")));
        assert!(html.contains(r#"property="og:image""#));
        assert!(html.contains(r#"name="twitter:card""#));
        // Browsers are forwarded into the app
        assert!(html.contains(&format!("/?photo={id}")));
        assert!(html.contains(r#"nonce="abc123""#));
    }

    #[test]
    fn test_unknown_photo_omits_image_metadata() {
        let (id, html) = render(false);

        assert!(!html.contains("og-photo"));
        assert!(!html.contains(r#"property="og:image""#));
        // The redirect still happens
        assert!(html.contains(&format!("/?photo={id}")));
    }
}
