//! Schema-less structured values for build-server protocol payloads.
//!
//! Protocol extension fields (`data` members tagged by a `dataKind`) carry
//! arbitrary JSON whose shape is only known to the producer and the consumer.
//! [`AnyValue`] models such payloads as a recursive tagged value, and the
//! [`AnyCodable`] trait converts between those values and strongly typed
//! records without a shared schema compiler.
//!
//! Decoding follows a fixed variant priority (`null`, integer, boolean, float,
//! string, list, map). Because the JSON wire form keeps `1` and `1.0`
//! distinct, integral floats stay floats; integers outside the `i64` range fall
//! through to floats.

mod codec;
mod error;
mod value;

pub use codec::{AnyCodable, optional_field, required_field};
pub use error::{CodecError, DecodeError};
pub use value::{AnyList, AnyMap, AnyValue, ValueKind, decode, encode};
