//! I/O layer: running the external converter and listing what it wrote.
pub mod listing;
pub use listing::list_files;

pub mod process;
pub use process::{CommandRunner, ProcessOutput, SystemRunner};
