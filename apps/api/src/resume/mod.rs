//! Resume data, rendering and import/export.

pub mod description;
pub mod handlers;
pub mod model;
pub mod print;
pub mod templates;
