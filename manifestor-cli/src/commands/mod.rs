pub mod diff;
pub mod id;
pub mod list;
pub mod sync;
mod workspace;

pub use workspace::WorkspaceArgs;
