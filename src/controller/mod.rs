// src/controller/mod.rs

pub mod sync_controller;

// Re-export the public SyncController struct
pub use sync_controller::{SyncController, TransferOptions};
