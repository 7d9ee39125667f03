pub mod store;

pub use store::{MetaStore, PrInfo};
