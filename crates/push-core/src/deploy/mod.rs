//! Deploy coordination: the release gate and the remote unpack protocol.

pub mod executor;
pub mod gate;

pub use executor::{DeployDescriptor, DeployExecutor, REMOTE_TEMP_DIR};
pub use gate::{GateFinding, GateOutcome, assess, enforce, is_release_tag};
