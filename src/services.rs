pub mod auth;
pub mod memory_auth;
pub mod session;

pub use auth::{AuthClient, PgAuthClient};
pub use memory_auth::MemoryAuthClient;
pub use session::{SessionState, SessionStore};
