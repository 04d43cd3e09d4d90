//! Shared helpers: fixed-point basic operators and PCM frame I/O

pub mod basic_ops;
pub mod pcm;
