//! Backend API
pub mod client;

pub use client::create;
