use alloy::primitives::U256;

use crate::error::FlowError;

pub const BPS_DENOMINATOR: u32 = 10_000;

/// Default margin attached on top of a quote: twice the quoted fee.
pub const DEFAULT_MARGIN_BPS: u32 = 20_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessagingFee {
    pub native_fee: U256,
    pub lz_token_fee: U256,
}

/// How much native currency to attach to `send` given a quote.
///
/// All arithmetic stays in `U256`; a quote is never squeezed through a
/// float.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeePolicy {
    /// Attached value as a fraction of the quote, in basis points.
    pub margin_bps: u32,
    /// Quote again right before submitting and refuse to send if the fresh
    /// quote exceeds what would be attached.
    pub requote: bool,
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self {
            margin_bps: DEFAULT_MARGIN_BPS,
            requote: false,
        }
    }
}

impl FeePolicy {
    pub fn new(margin_bps: u32, requote: bool) -> Self {
        Self {
            margin_bps,
            requote,
        }
    }

    /// Value to attach for a quoted native fee, rounded up.
    pub fn apply(&self, quoted: U256) -> Result<U256, FlowError> {
        let denominator = U256::from(BPS_DENOMINATOR);
        let overflow = FlowError::FeeOverflow {
            quoted,
            margin_bps: self.margin_bps,
        };
        let scaled = quoted
            .checked_mul(U256::from(self.margin_bps))
            .and_then(|scaled| scaled.checked_add(denominator - U256::from(1)))
            .ok_or(overflow)?;
        Ok(scaled / denominator)
    }

    pub fn check_drift(&self, paid: U256, fresh: U256) -> Result<(), FlowError> {
        if fresh > paid {
            return Err(FlowError::FeeDrift { paid, fresh });
        }
        Ok(())
    }
}
