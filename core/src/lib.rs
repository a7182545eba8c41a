pub mod calendar;
pub mod error;
pub mod form;
pub mod logging;
pub mod models;
pub mod storage;

pub use error::{Error, Result};
