//! Terminal table over one REST resource
//!
//! The binary wires a [`DynamicStore`](crud_dispatch::DynamicStore) to a
//! [`DataGrid`](crud_dispatch::DataGrid). [`App`] holds everything the
//! render loop needs and is exercised headless in the tests.

pub mod app;
pub mod poller;

pub use app::{App, AppError, UiAction};
