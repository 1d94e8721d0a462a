//! Tools, spells and their resolution.
//!
//! - `Item`: inventory entry with cost and targeting
//! - `ItemResolver`: the collaborator that turns an item use into updated
//!   creatures and a log line
//! - `StandardItemResolver`: the built-in implementation
//! - `catalog`: the standard roster handed out by deck generation

pub mod catalog;
pub mod item;
pub mod resolver;

pub use catalog::{standard_spells, standard_tools};
pub use item::{Item, ItemEffect, ItemKind, ItemRole, ItemTarget};
pub use resolver::{ItemOutcome, ItemRequest, ItemResolver, StandardItemResolver};
