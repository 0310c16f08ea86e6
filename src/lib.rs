pub mod lex;
pub mod message;
pub mod parse;
pub mod resolve;
pub mod tree;
pub mod ty;

mod driver;

pub use driver::{CollectingDriver, Driver, NoopDriver};
