// crates/chih-cli/src/commands/mod.rs
//
// Command module declarations for the Chih CLI.

pub mod admin;
pub mod init;
pub mod pool;
pub mod stake;
pub mod status;
pub mod vault;
pub mod wallet;
