//! Domain models for the web application.

pub mod photo;
pub mod session;
pub mod view;

pub use photo::{Photo, PhotoView};
pub use session::{AuthTokens, CurrentUser, session_keys};
pub use view::{NavTarget, View, ViewState};
