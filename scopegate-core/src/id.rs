// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::serde::{deserialize_hex, serialize_hex};

/// Size of storage object identifiers.
pub const OBJECT_ID_LEN: usize = 12;

/// 12-byte storage object identifier, rendered as 24 hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; OBJECT_ID_LEN]);

impl ObjectId {
    /// Create an `ObjectId` from its raw bytes representation.
    pub const fn from_bytes(bytes: [u8; OBJECT_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Bytes of the identifier.
    pub fn as_bytes(&self) -> &[u8; OBJECT_ID_LEN] {
        &self.0
    }

    /// Convert the identifier to a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl AsRef<[u8]> for ObjectId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; OBJECT_ID_LEN]> for ObjectId {
    fn from(value: [u8; OBJECT_ID_LEN]) -> Self {
        Self(value)
    }
}

impl From<ObjectId> for [u8; OBJECT_ID_LEN] {
    fn from(value: ObjectId) -> Self {
        value.0
    }
}

impl TryFrom<&[u8]> for ObjectId {
    type Error = ObjectIdError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let value_len = value.len();

        let checked_value: [u8; OBJECT_ID_LEN] = value
            .try_into()
            .map_err(|_| ObjectIdError::InvalidLength(value_len, OBJECT_ID_LEN))?;

        Ok(Self(checked_value))
    }
}

impl FromStr for ObjectId {
    type Err = ObjectIdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::try_from(hex::decode(value.trim())?.as_slice())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjectId").field(&self.to_hex()).finish()
    }
}

impl Serialize for ObjectId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serialize_hex(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bytes = deserialize_hex(deserializer)?;

        bytes
            .as_slice()
            .try_into()
            .map_err(|err: ObjectIdError| serde::de::Error::custom(err.to_string()))
    }
}

/// Error types for `ObjectId` struct.
#[derive(Error, Debug)]
pub enum ObjectIdError {
    /// Identifier has an invalid length.
    #[error("invalid object id length {0} bytes, expected {1} bytes")]
    InvalidLength(usize, usize),

    /// Identifier string contains invalid hexadecimal characters.
    #[error("invalid hex encoding in object id string")]
    InvalidHexEncoding(#[from] hex::FromHexError),
}
