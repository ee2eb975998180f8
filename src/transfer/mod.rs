//! Transfer module
//!
//! Handles active-mode data channel setup and chunked file transfers.

pub mod data_channel;
pub mod file_ops;
pub mod results;

pub use data_channel::{accept_data_connection, bind_active_listener, open_data_channel};
pub use file_ops::{check_size, open_for_transfer, receive_file, send_file};
pub use results::TransferDescriptor;
