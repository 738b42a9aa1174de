pub mod session;

pub use session::{SessionCookie, SessionId, SESSION_COOKIE};
