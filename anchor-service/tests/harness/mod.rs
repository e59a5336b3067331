#![allow(dead_code)]

pub mod bridge;
pub mod requests;

pub use bridge::*;
pub use requests::*;
