//! HTTP surface of the accounts domain

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::routes;
pub use state::AccountsState;
