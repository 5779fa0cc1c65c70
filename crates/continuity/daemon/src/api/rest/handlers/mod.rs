//! API request handlers

mod campaigns;
mod health;
mod policies;
mod processes;
mod risk;
mod workflows;

pub use campaigns::*;
pub use health::*;
pub use policies::*;
pub use processes::*;
pub use risk::*;
pub use workflows::*;
