//! I/O collaborators: spec files, the bundled schema, the ambient
//! environment, and the launched command.

pub mod environ;
pub mod process;
pub mod schema;
pub mod spec_file;
