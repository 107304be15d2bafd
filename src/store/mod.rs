pub mod json_store;

pub use json_store::{load_store, save_store};
