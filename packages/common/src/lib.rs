pub mod style;
pub mod visitor;

pub use style::*;
pub use visitor::*;
