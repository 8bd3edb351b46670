//! Drives a pair of lzRead apps on Sepolia and Base Sepolia.
//!
//! - [`graph`] declares the apps and their peer links for the wiring
//!   toolchain
//! - [`deploy`] deploys an app and its Groth16 verifier per chain
//! - [`wire`] links the apps as peers and enables the read channel
//! - [`read`] sends a read request that runs `verifyProof` on the remote
//!   app, paying the quoted fee plus a margin

pub mod app;
pub mod bindings;
pub mod calls;
pub mod chain;
pub mod config;
pub mod deploy;
pub mod error;
pub mod fee;
pub mod graph;
pub mod options;
pub mod proof;
pub mod read;
pub mod retry;
pub mod wire;

pub use app::{OAppRead, ReadApp};
pub use config::Config;
pub use error::{ConfigError, FlowError};
pub use read::{ReadFlow, ReadOutcome, ReadPlan};
