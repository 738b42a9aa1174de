pub mod models;
pub mod store;

pub use models::{QaPair, Session};
pub use store::SessionStore;
