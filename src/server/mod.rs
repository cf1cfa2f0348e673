mod app;
mod handler;
mod state;

pub use app::create_app;
pub use state::{AppState, WebhookService};
