pub mod archived_registration;
pub mod archived_user;
pub mod audit_log;
pub mod event;
pub mod registration;
pub mod session;
pub mod user;

// Re-export models for easier access
pub use archived_registration::*;
pub use archived_user::*;
pub use audit_log::*;
pub use event::*;
pub use registration::*;
pub use session::*;
pub use user::*;
