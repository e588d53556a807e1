//! Repository identity derived from the local git state.
//!
//! - Locating the work tree and checking its `.gitignore`
//! - Reading HEAD, branch, exact-match tags and the dirty flag
//! - Naming the project and its archive from the `origin` remote

mod inspector;
mod origin;

pub use inspector::{RepoMetadata, inspect};
pub use origin::{component_name, project_name_from_origin};
