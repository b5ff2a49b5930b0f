#[macro_use]
extern crate log;

pub mod context;
pub mod domain;
pub mod infrastructure;
pub mod notifier;
