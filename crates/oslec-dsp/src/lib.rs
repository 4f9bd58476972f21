#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]

pub mod bit_ops;
pub mod dc_restore;
pub mod fir;
