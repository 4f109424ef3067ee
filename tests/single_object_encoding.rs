use avro_codec_core::codec::{DecoderConfig, EncoderConfig};
use avro_codec_core::single_object_encoding::{from_single_object_slice, to_single_object_vec, SingleObjectError};
use avro_codec_core::value::AvroValue;
use avro_codec_core::Schema;

use pretty_assertions::assert_eq;

#[test]
fn header_carries_the_c3_01_magic_and_the_schema_fingerprint() {
	let schema: Schema = r#"{"type":"record","name":"R","fields":[{"name":"a","type":"int"}]}"#
		.parse()
		.unwrap();
	let value = AvroValue::Record(vec![("a".to_owned(), AvroValue::Int(9))]);
	let encoded = to_single_object_vec(&value, &schema, EncoderConfig::default()).unwrap();
	assert_eq!(&encoded[0..2], &[0xC3, 0x01]);
	assert_eq!(encoded[2..10], schema.rabin_fingerprint()[..]);
	assert_eq!(
		from_single_object_slice(&encoded, &schema, DecoderConfig::default()).unwrap(),
		value
	);
}

#[test]
fn mismatched_schema_is_rejected_by_fingerprint() {
	let schema: Schema = r#""int""#.parse().unwrap();
	let other: Schema = r#""long""#.parse().unwrap();
	let encoded = to_single_object_vec(&AvroValue::Int(1), &schema, EncoderConfig::default()).unwrap();
	let err = from_single_object_slice(&encoded, &other, DecoderConfig::default()).unwrap_err();
	assert!(matches!(err, SingleObjectError::FingerprintMismatch));
}

#[test]
fn truncated_header_is_rejected() {
	let schema: Schema = r#""int""#.parse().unwrap();
	let err = from_single_object_slice(&[0xC3, 0x01, 1, 2], &schema, DecoderConfig::default()).unwrap_err();
	assert!(matches!(err, SingleObjectError::HeaderTooShort));
}
