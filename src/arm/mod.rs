//! Azure Resource Manager REST access.

pub mod client;

pub use client::ArmClient;
