//! One module per subcommand.

pub mod completions;
pub mod get;
pub mod list;
pub mod login;
pub mod remove;
pub mod set;
pub mod signup;
pub mod verify;
