pub mod market;
pub mod watchlist;

pub use market::*;
pub use watchlist::*;
