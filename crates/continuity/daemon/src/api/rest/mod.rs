pub mod caller;
pub mod handlers;
pub mod router;
pub mod state;
