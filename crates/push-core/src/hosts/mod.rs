//! Host resolution: tag and host tables from the external registry, and the
//! mapping from an operator-supplied name to deploy targets.

pub mod registry;
pub mod resolver;

pub use registry::{ALL_TAG, HostTable};
pub use resolver::{HostResolver, Resolution};
