//! The mutable board model: placed items, their spatial index, and atomic
//! batch undo over structural changes.
//!
//! The autorouter mutates the board through [`RoutingBoard`]; every mutation
//! keeps the search tree consistent eagerly, and a batch of mutations becomes
//! one undo step on commit. Speculative routing trials run a batch, check the
//! result, and either commit or roll back.

pub mod board;
pub mod error;
pub mod item;
pub mod store;
pub mod tree;

pub use board::{ItemId, RoutingBoard};
pub use error::BoardError;
pub use item::{Item, ItemKind};
pub use store::{ObjId, UndoableObjects};
pub use tree::SearchTree;
