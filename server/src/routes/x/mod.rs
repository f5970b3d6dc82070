//! X OAuth routes and the demo pages that sit behind them

mod auth;
mod callback;
mod playground;
mod utils;

pub use auth::*;
pub use callback::*;
pub use playground::*;
pub use utils::*;
