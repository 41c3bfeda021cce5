// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events and facts
//!
//! Both are tag-keyed records carrying an opaque JSON payload. Events are
//! external input to a single step; facts are what rules derive from them.
//! Payloads are never validated here, only by the rules that read them.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// External input consumed by rules during one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub tag: String,
    #[serde(default)]
    pub payload: Value,
}

/// A record of something a rule observed or derived
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    pub tag: String,
    #[serde(default)]
    pub payload: Value,
}

macro_rules! record_impl {
    ($ty:ident) => {
        impl $ty {
            pub fn new(tag: impl Into<String>, payload: Value) -> Self {
                Self {
                    tag: tag.into(),
                    payload,
                }
            }

            /// Record with a `null` payload
            pub fn tag_only(tag: impl Into<String>) -> Self {
                Self::new(tag, Value::Null)
            }

            /// Serialize `payload` into the record
            pub fn with_payload<T: Serialize>(
                tag: impl Into<String>,
                payload: &T,
            ) -> Result<Self, serde_json::Error> {
                Ok(Self::new(tag, serde_json::to_value(payload)?))
            }

            pub fn is(&self, tag: &str) -> bool {
                self.tag == tag
            }

            /// Look up a top-level payload field
            pub fn payload_field(&self, key: &str) -> Option<&Value> {
                self.payload.get(key)
            }

            /// Decode the payload into a typed value
            pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
                T::deserialize(&self.payload)
            }
        }
    };
}

record_impl!(Event);
record_impl!(Fact);

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
