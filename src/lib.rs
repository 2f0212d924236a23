//! rstree: an in-memory labeled forest.
//!
//! - `domain`: the tree engine (`TreeArena`) with add/get/update/delete,
//!   cycle-safe re-parenting and child promotion on delete
//! - `application`: `TreeService` owning one tree, and a transport-agnostic
//!   router mapping the tree HTTP surface onto it
//! - `cli`, `config`: the `rstree` binary and its layered settings

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod tree_traits;
pub mod util;

pub use application::{dispatch, Request, Response, TreeService};
pub use domain::{DomainError, NewNode, NodeUpdate, TreeArena};
