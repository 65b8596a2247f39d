pub mod archived_registration;
pub mod archived_user;
pub mod audit_log;
mod db;
pub mod event;
pub mod login;
pub mod logout;
pub mod registration;
pub mod testing;
pub mod user;

pub use db::*;
