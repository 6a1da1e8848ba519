// SPDX-License-Identifier: MIT OR Apache-2.0

use std::error::Error;

use scopegate_core::Value;

/// Conversion of raw key ids into the storage's id type.
pub trait IdNormalizer {
    type Error: Error;

    /// Convert a raw id. Failing ids are left out of the filter they would have been part of.
    fn normalize(&self, raw: &str) -> Result<Value, Self::Error>;
}
