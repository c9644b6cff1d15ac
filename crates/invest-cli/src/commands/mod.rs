//! One module per subcommand, each exposing an `Args` struct and an
//! `async fn run(...)`.

pub mod cancel;
pub mod get;
pub mod list;
pub mod submit;
pub mod webhook;
