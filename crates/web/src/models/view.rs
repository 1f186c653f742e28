//! The per-session view-state machine.
//!
//! The view layer is a single page whose content is decided by an explicit
//! state value, stored in the session and explicitly initialized on first
//! use - never ambient. Transitions are driven by navigation, by auth state
//! changes, and by a photo id arriving in the query string (the share-link
//! landing path).

use serde::{Deserialize, Serialize};

use photoload_core::PhotoId;

use crate::models::photo::Photo;

/// The views the application can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    SignUp,
    SignIn,
    Gallery,
    Upload,
    ViewPhoto,
    Settings,
}

/// Navigation targets reachable from the header.
///
/// Parsed from the `view` query parameter; unknown values are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavTarget {
    Home,
    SignIn,
    SignUp,
    Gallery,
    Upload,
    Settings,
}

impl NavTarget {
    /// Parse from the `view` query parameter.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "home" => Some(Self::Home),
            "signin" => Some(Self::SignIn),
            "signup" => Some(Self::SignUp),
            "gallery" => Some(Self::Gallery),
            "upload" => Some(Self::Upload),
            "settings" => Some(Self::Settings),
            _ => None,
        }
    }
}

/// Explicit, session-scoped view state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    view: View,
    selected_photo: Option<PhotoId>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            view: View::SignUp,
            selected_photo: None,
        }
    }
}

impl ViewState {
    /// The current view.
    #[must_use]
    pub const fn view(&self) -> View {
        self.view
    }

    /// The photo selected for the `ViewPhoto` view, if any.
    #[must_use]
    pub const fn selected_photo(&self) -> Option<PhotoId> {
        self.selected_photo
    }

    /// Whether the current view requires a signed-in user.
    #[must_use]
    pub const fn requires_auth(&self) -> bool {
        matches!(
            self.view,
            View::Gallery | View::Upload | View::ViewPhoto | View::Settings
        )
    }

    /// Apply a navigation event.
    ///
    /// Signed-out users can only move between the sign-up and sign-in
    /// views; any other target lands them on `SignUp`.
    pub fn navigate(&mut self, target: NavTarget, signed_in: bool) {
        let next = match (target, signed_in) {
            (NavTarget::SignIn, false) => View::SignIn,
            (_, false) => View::SignUp,
            (NavTarget::Home | NavTarget::SignIn | NavTarget::SignUp, true) => View::SignUp,
            (NavTarget::Gallery, true) => View::Gallery,
            (NavTarget::Upload, true) => View::Upload,
            (NavTarget::Settings, true) => View::Settings,
        };
        // Leaving ViewPhoto drops the selection
        if next != View::ViewPhoto {
            self.selected_photo = None;
        }
        self.view = next;
    }

    /// Apply an auth state change. Signing in moves any state to the
    /// gallery; signing out returns to sign-up and drops the selection.
    pub fn auth_changed(&mut self, signed_in: bool) {
        self.selected_photo = None;
        self.view = if signed_in { View::Gallery } else { View::SignUp };
    }

    /// Apply the photo list once it has loaded.
    ///
    /// A requested photo id (from the `?photo=` query parameter of a share
    /// link) moves the state to `ViewPhoto` when the list contains that id;
    /// unknown ids are ignored. A selection that no longer resolves (the
    /// photo was deleted) falls back to the gallery.
    pub fn photos_loaded(&mut self, requested: Option<PhotoId>, photos: &[Photo]) {
        if let Some(id) = requested
            && photos.iter().any(|p| p.id == id)
        {
            self.view = View::ViewPhoto;
            self.selected_photo = Some(id);
            return;
        }

        if self.view == View::ViewPhoto {
            let still_there = self
                .selected_photo
                .is_some_and(|id| photos.iter().any(|p| p.id == id));
            if !still_there {
                self.view = View::Gallery;
                self.selected_photo = None;
            }
        }
    }

    /// Open one photo from the gallery.
    pub fn open_photo(&mut self, id: PhotoId, photos: &[Photo]) {
        if photos.iter().any(|p| p.id == id) {
            self.view = View::ViewPhoto;
            self.selected_photo = Some(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use photoload_core::{StoragePath, UserId};

    fn photo(id: PhotoId) -> Photo {
        let user = UserId::new();
        Photo {
            id,
            user_id: user,
            path: StoragePath::for_user(user, "jpg"),
            filename: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_initial_state_is_signup() {
        let state = ViewState::default();
        assert_eq!(state.view(), View::SignUp);
        assert!(state.selected_photo().is_none());
        assert!(!state.requires_auth());
    }

    #[test]
    fn test_signed_out_navigation_is_gated() {
        let mut state = ViewState::default();
        state.navigate(NavTarget::Gallery, false);
        assert_eq!(state.view(), View::SignUp);
        state.navigate(NavTarget::Settings, false);
        assert_eq!(state.view(), View::SignUp);
        state.navigate(NavTarget::SignIn, false);
        assert_eq!(state.view(), View::SignIn);
    }

    #[test]
    fn test_sign_in_moves_any_state_to_gallery() {
        let mut state = ViewState::default();
        state.navigate(NavTarget::SignIn, false);
        state.auth_changed(true);
        assert_eq!(state.view(), View::Gallery);
    }

    #[test]
    fn test_sign_out_returns_to_signup() {
        let mut state = ViewState::default();
        state.auth_changed(true);
        state.navigate(NavTarget::Settings, true);
        state.auth_changed(false);
        assert_eq!(state.view(), View::SignUp);
        assert!(state.selected_photo().is_none());
    }

    #[test]
    fn test_share_link_photo_param_selects_photo() {
        let mut state = ViewState::default();
        state.auth_changed(true);

        let target = photo(PhotoId::new());
        let photos = vec![photo(PhotoId::new()), target.clone()];

        state.photos_loaded(Some(target.id), &photos);
        assert_eq!(state.view(), View::ViewPhoto);
        assert_eq!(state.selected_photo(), Some(target.id));
    }

    #[test]
    fn test_unknown_photo_param_is_ignored() {
        let mut state = ViewState::default();
        state.auth_changed(true);

        let photos = vec![photo(PhotoId::new())];
        state.photos_loaded(Some(PhotoId::new()), &photos);
        assert_eq!(state.view(), View::Gallery);
        assert!(state.selected_photo().is_none());
    }

    #[test]
    fn test_deleted_selection_falls_back_to_gallery() {
        let mut state = ViewState::default();
        state.auth_changed(true);

        let target = photo(PhotoId::new());
        let photos = vec![target.clone()];
        state.open_photo(target.id, &photos);
        assert_eq!(state.view(), View::ViewPhoto);

        // The photo disappears (deleted from another tab)
        state.photos_loaded(None, &[]);
        assert_eq!(state.view(), View::Gallery);
        assert!(state.selected_photo().is_none());
    }

    #[test]
    fn test_open_photo_requires_known_id() {
        let mut state = ViewState::default();
        state.auth_changed(true);

        state.open_photo(PhotoId::new(), &[]);
        assert_eq!(state.view(), View::Gallery);
    }

    #[test]
    fn test_leaving_view_photo_drops_selection() {
        let mut state = ViewState::default();
        state.auth_changed(true);

        let target = photo(PhotoId::new());
        state.open_photo(target.id, std::slice::from_ref(&target));
        state.navigate(NavTarget::Gallery, true);
        assert_eq!(state.view(), View::Gallery);
        assert!(state.selected_photo().is_none());
    }

    #[test]
    fn test_nav_target_parse() {
        assert_eq!(NavTarget::parse("gallery"), Some(NavTarget::Gallery));
        assert_eq!(NavTarget::parse("upload"), Some(NavTarget::Upload));
        assert_eq!(NavTarget::parse("nonsense"), None);
    }
}
