//! # Relic Resolver - Tree Construction
//!
//! **Purpose**: Materialize a release's declared dependency graph into a
//! resolved dependency tree, and derive from it the authorization tree that
//! tracks which ancestor is contractually responsible for licensing each
//! resource in the closure.
//!
//! Both trees are ephemeral: computed fresh per request from current
//! catalog state, owned solely by the computation that produced them, and
//! never persisted. Catalog access is batched per tree level; sibling
//! subtrees expand concurrently. Any fetch or resolution failure aborts the
//! whole build — a tree is only meaningful whole.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Dependency tree materialization
pub mod dependency;

/// Authorization tree derivation
pub mod authorization;

pub use authorization::{AuthTreeNode, AuthVersionGroup, AuthorizationTreeBuilder};
pub use dependency::{DependencyTreeBuilder, DependencyTreeNode, FieldMask, TreeBuildOptions};
