//! Type-3 message options understood by the protocol's executors.
//!
//! Layout: `u16 type | (u8 worker | u16 len | u8 option type | option)*`,
//! where `len` counts the option type byte plus the option payload.

use alloy::{hex, primitives::Bytes};

pub const TYPE_3: u16 = 3;

const EXECUTOR_WORKER_ID: u8 = 1;
const OPTION_TYPE_LZ_READ: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    buf: Vec<u8>,
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}

impl Options {
    pub fn new() -> Self {
        Self {
            buf: TYPE_3.to_be_bytes().to_vec(),
        }
    }

    /// Gas and response size the executor gets for delivering a read
    /// result. `value` is only encoded when non-zero.
    pub fn add_executor_lz_read_option(self, gas: u128, size: u32, value: u128) -> Self {
        let mut option = Vec::with_capacity(36);
        option.extend_from_slice(&gas.to_be_bytes());
        option.extend_from_slice(&size.to_be_bytes());
        if value != 0 {
            option.extend_from_slice(&value.to_be_bytes());
        }
        self.add_executor_option(OPTION_TYPE_LZ_READ, &option)
    }

    fn add_executor_option(mut self, option_type: u8, option: &[u8]) -> Self {
        // payloads are at most 36 bytes
        let len = (option.len() + 1) as u16;
        self.buf.push(EXECUTOR_WORKER_ID);
        self.buf.extend_from_slice(&len.to_be_bytes());
        self.buf.push(option_type);
        self.buf.extend_from_slice(option);
        self
    }

    pub fn to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(&self.buf)
    }

    pub fn to_hex(&self) -> String {
        hex::encode_prefixed(&self.buf)
    }
}
