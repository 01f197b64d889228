//! Terminal task board: tasks move across todo, in-progress and completed
//! lanes and are mirrored to a JSON store after every change.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod filter;
pub mod form;
pub mod kanban_board;
pub mod logging;
pub mod store;
pub mod task;
pub mod ui;

pub use error::{Error, Result};
