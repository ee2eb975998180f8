//! tinyftp: a minimal active-mode file transfer protocol.
//!
//! A line-oriented control channel carries USER/PASS authentication and
//! RETR/PORT/QUIT commands; file bytes travel over a separate data
//! connection that the server opens back to the client.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod protocol;
pub mod server;
pub mod storage;
pub mod transfer;

pub use client::ClientSession;
pub use server::Server;
