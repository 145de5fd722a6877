//! HTTP request handlers for the web server.

mod api;
mod audio;
mod commentary_api;
mod static_files;
mod upload;

// Re-export handlers for use by the router
pub use api::{api_status, delete_deck};
pub use audio::upload_audio;
pub use commentary_api::{get_commentary, save_commentary};
pub use static_files::serve_slide;
pub use upload::upload_deck;
