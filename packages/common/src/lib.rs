pub mod changelog;
pub mod visitor;

pub use changelog::*;
pub use visitor::*;
