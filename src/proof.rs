//! Groth16 proof payload carried by the read request.
//!
//! The read executes `verifyProof` on the target app, so the proof is
//! shipped as ABI-encoded call data rather than submitted directly.

use alloy::{
    hex,
    primitives::{Bytes, U256},
    sol_types::SolCall,
};
use eyre::{Result, WrapErr};

use crate::bindings::MyOAppRead;

const SAMPLE_A: [&str; 2] = [
    "2887297253311923561562833019841490711676138170662893693659684828338819603339",
    "16128343286467703659101880235433615914212265378931294924295561783622194669736",
];

const SAMPLE_B: [[&str; 2]; 2] = [
    [
        "1874116033774124704842427713336667111254538799444680702451548358234341064579",
        "13806072136004683405143060491211744750701794143385329744949574326760575578047",
    ],
    [
        "3985206610750261901413716576862620789583947599366245080202869718522383232671",
        "8626038746243459570271219956559502690514418132894472650397992849892326958721",
    ],
];

const SAMPLE_C: [&str; 2] = [
    "17746959570229670660992616179958812204275771862318025017449519294865631051574",
    "1960753033554187134118279590885844219899717447561330793113827730331714178316",
];

const SAMPLE_PUBLIC_SIGNALS: [&str; 2] = [
    "1750258006025672438718065500325530202465412338198526256",
    "194431099128553488897829795505376474179211309036566",
];

/// Renders a field element as a 32-byte, zero-padded, big-endian hex word.
pub fn to_hex32_bytes(value: U256) -> String {
    format!("0x{}", hex::encode(value.to_be_bytes::<32>()))
}

pub fn parse_decimal(value: &str) -> Result<U256> {
    U256::from_str_radix(value, 10).wrap_err_with(|| format!("invalid field element: {value}"))
}

fn parse_pair(values: [&str; 2]) -> Result<[U256; 2]> {
    Ok([parse_decimal(values[0])?, parse_decimal(values[1])?])
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Groth16Proof {
    pub a: [U256; 2],
    pub b: [[U256; 2]; 2],
    pub c: [U256; 2],
    pub public_signals: [U256; 2],
}

impl Groth16Proof {
    /// The proof and public signals computed ahead of time for the demo
    /// circuit.
    pub fn sample() -> Result<Self> {
        Ok(Self {
            a: parse_pair(SAMPLE_A)?,
            b: [parse_pair(SAMPLE_B[0])?, parse_pair(SAMPLE_B[1])?],
            c: parse_pair(SAMPLE_C)?,
            public_signals: parse_pair(SAMPLE_PUBLIC_SIGNALS)?,
        })
    }

    /// All ten components as hex words, in calldata order.
    pub fn hex_words(&self) -> Vec<String> {
        self.a
            .iter()
            .chain(self.b.iter().flatten())
            .chain(self.c.iter())
            .chain(self.public_signals.iter())
            .copied()
            .map(to_hex32_bytes)
            .collect()
    }

    pub fn encode_verify_call(&self) -> Bytes {
        MyOAppRead::verifyProofCall {
            _pA: self.a,
            _pB: self.b,
            _pC: self.c,
            _pubSignals: self.public_signals,
        }
        .abi_encode()
        .into()
    }
}
