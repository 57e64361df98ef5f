use serde::Serialize;

use crate::constants::FREE_LIMIT;
use crate::errors::ContentScriptError;

/// Quota state of a single identity, wherever it is stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    pub pro: bool,
    pub free_count: u32,
}

impl Usage {
    pub fn new(pro: bool, free_count: u32) -> Self {
        Self { pro, free_count }
    }

    pub fn is_exhausted(&self) -> bool {
        !self.pro && self.free_count >= FREE_LIMIT
    }

    pub fn check(&self) -> Result<(), ContentScriptError> {
        if self.is_exhausted() {
            return Err(ContentScriptError::PaymentRequired);
        }

        Ok(())
    }

    /// Counts one generation. Returns `false` for pro identities, which are never counted.
    pub fn record_generation(&mut self) -> bool {
        if self.pro {
            return false;
        }

        self.free_count = self.free_count.saturating_add(1);

        true
    }

    pub fn remaining(&self) -> Option<u32> {
        if self.pro {
            None
        } else {
            Some(FREE_LIMIT.saturating_sub(self.free_count))
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSummary {
    pub pro: bool,
    pub free_count: u32,
    pub limit: u32,
    pub remaining: Option<u32>,
}

impl From<Usage> for UsageSummary {
    fn from(usage: Usage) -> Self {
        Self {
            pro: usage.pro,
            free_count: usage.free_count,
            limit: FREE_LIMIT,
            remaining: usage.remaining(),
        }
    }
}
