//! # Getting started
//!
//! ```
//! let schema: avro_codec_core::Schema = r#"
//! {
//! 	"namespace": "test",
//! 	"type": "record",
//! 	"name": "Test",
//! 	"fields": [
//! 		{ "type": "string", "name": "field" }
//! 	]
//! }
//! "#
//! .parse()
//! .expect("failed to parse schema");
//!
//! use avro_codec_core::value::AvroValue;
//!
//! let value = AvroValue::Record(vec![("field".to_owned(), AvroValue::String("foo".to_owned()))]);
//!
//! let mut encoded = Vec::new();
//! avro_codec_core::codec::compile_encoder(&schema, Default::default())
//! 	.encode(&value, &mut encoded)
//! 	.expect("failed to encode");
//!
//! let (decoded, _) = avro_codec_core::codec::compile_decoder(&schema, Default::default())
//! 	.decode(&encoded)
//! 	.expect("failed to decode");
//! assert_eq!(decoded, value);
//! ```
//!
//! # An explicit-value Avro codec
//!
//! Unlike implementations built on top of [`serde`], this crate represents
//! every Avro value as an explicit [`value::AvroValue`] tree rather than
//! asking callers to shape a Rust struct that [`serde`] can drive. That
//! trades away `serde`'s zero-copy, compile-time-checked mapping in exchange
//! for something schemas genuinely need at runtime: two schemas for the same
//! data (a writer schema and an independently evolved reader schema) can
//! differ, and [`resolution::build_plan`] turns that difference into a single
//! compiled [`resolution::Plan`] that a [`resolution::ResolvedDecoder`] then
//! interprets directly off the wire.
//!
//! The binary codec itself ([`codec`]) is schema-driven: [`schema::Schema`]
//! is parsed and frozen once, and [`codec::compile_encoder`] /
//! [`codec::compile_decoder`] compile a reusable encoder/decoder against it.
//!
//! On top of the datum codec, this crate also implements:
//! - [`single_object_encoding`], the two-magic-bytes-plus-fingerprint framing
//!   for a lone datum,
//! - [`object_container_file_encoding`], the self-describing, block-framed,
//!   optionally compressed container file format.

pub mod codec;
pub mod object_container_file_encoding;
pub mod resolution;
pub mod schema;
pub mod single_object_encoding;
pub mod value;

pub use schema::Schema;
pub use value::AvroValue;
