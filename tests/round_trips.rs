//! Encode/decode round trips across the value model, grounded in a handful
//! of the cases the Apache Avro reference test suite exercises.

use avro_codec_core::codec::{compile_decoder, compile_encoder, DecoderConfig, EncoderConfig};
use avro_codec_core::value::AvroValue;
use avro_codec_core::Schema;

use lazy_static::lazy_static;
use pretty_assertions::assert_eq;

fn round_trip(schema_json: &str, value: AvroValue) {
	let schema: Schema = schema_json.parse().unwrap();
	let mut buf = Vec::new();
	compile_encoder(&schema, EncoderConfig::default())
		.encode(&value, &mut buf)
		.unwrap();
	let (decoded, consumed) = compile_decoder(&schema, DecoderConfig::default())
		.decode(&buf)
		.unwrap();
	assert_eq!(consumed, buf.len());
	assert_eq!(decoded, value);
}

lazy_static! {
	static ref SCALARS: Vec<(&'static str, AvroValue)> = vec![
		(r#""null""#, AvroValue::Null),
		(r#""boolean""#, AvroValue::Boolean(true)),
		(r#""int""#, AvroValue::Int(1234)),
		(r#""long""#, AvroValue::Long(-9_999_999_999)),
		(r#""float""#, AvroValue::Float(1234.5)),
		(r#""double""#, AvroValue::Double(1234.5)),
		(r#""bytes""#, AvroValue::Bytes(b"12345abcd".to_vec())),
		(
			r#""string""#,
			AvroValue::String("adsfasdf09809dsf-=adsf".to_owned())
		),
	];
}

macro_rules! scalar_tests {
	($($idx:expr => $name:ident),+ $(,)?) => {
		paste::paste! {
			$(
				#[test]
				fn [<scalar_round_trips_ $name>]() {
					let (schema, value) = &SCALARS[$idx];
					round_trip(schema, value.clone());
				}
			)+
		}
	};
}
scalar_tests! {
	0 => null,
	1 => boolean,
	2 => int,
	3 => long,
	4 => float,
	5 => double,
	6 => bytes,
	7 => string,
}

#[test]
fn fixed_and_enum_round_trip() {
	round_trip(
		r#"{"type":"fixed","name":"Test","size":1}"#,
		AvroValue::Fixed(vec![b'B']),
	);
	round_trip(
		r#"{"type":"enum","name":"Test","symbols":["A","B"]}"#,
		AvroValue::Enum("B".to_owned()),
	);
}

#[test]
fn array_and_map_round_trip() {
	round_trip(
		r#"{"type":"array","items":"long"}"#,
		AvroValue::Array(vec![AvroValue::Long(1), AvroValue::Long(3), AvroValue::Long(2)]),
	);
	let mut map = std::collections::HashMap::new();
	map.insert("a".to_owned(), AvroValue::Long(1));
	map.insert("b".to_owned(), AvroValue::Long(3));
	round_trip(r#"{"type":"map","values":"long"}"#, AvroValue::Map(map));
}

#[test]
fn empty_array_encodes_as_a_single_zero_block_header() {
	let schema: Schema = r#"{"type":"array","items":"long"}"#.parse().unwrap();
	let mut buf = Vec::new();
	compile_encoder(&schema, EncoderConfig::default())
		.encode(&AvroValue::Array(vec![]), &mut buf)
		.unwrap();
	assert_eq!(buf, vec![0]);
}

#[test]
fn nested_record_round_trips() {
	let schema = r#"
	{
		"type": "record",
		"name": "interop.Interop",
		"fields": [
			{ "name": "intField", "type": "int" },
			{
				"name": "arrayField",
				"type": { "type": "array", "items": "double" }
			},
			{
				"name": "nested",
				"type": {
					"type": "record",
					"name": "Nested",
					"fields": [ { "name": "label", "type": "string" } ]
				}
			}
		]
	}"#;
	let value = AvroValue::Record(vec![
		("intField".to_owned(), AvroValue::Int(42)),
		(
			"arrayField".to_owned(),
			AvroValue::Array(vec![AvroValue::Double(1.5), AvroValue::Double(2.5)]),
		),
		(
			"nested".to_owned(),
			AvroValue::Record(vec![("label".to_owned(), AvroValue::String("x".to_owned()))]),
		),
	]);
	round_trip(schema, value);
}

#[test]
fn union_with_null_round_trips_both_branches() {
	let schema = r#"["null","long"]"#;
	round_trip(schema, AvroValue::Null);
	round_trip(schema, AvroValue::Long(27));
}

#[test]
fn recursive_record_round_trips() {
	let schema = r#"
	{
		"type": "record",
		"name": "LinkedList",
		"fields": [
			{ "name": "value", "type": "int" },
			{ "name": "next", "type": ["null", "LinkedList"] }
		]
	}"#;
	let value = AvroValue::Record(vec![
		("value".to_owned(), AvroValue::Int(1)),
		(
			"next".to_owned(),
			AvroValue::Union(Box::new(AvroValue::Record(vec![
				("value".to_owned(), AvroValue::Int(2)),
				("next".to_owned(), AvroValue::Null),
			]))),
		),
	]);
	round_trip(schema, value);
}

#[test]
fn decimal_logical_type_round_trips_through_bytes() {
	let schema = r#"{"type":"bytes","logicalType":"decimal","precision":6,"scale":2}"#;
	round_trip(
		schema,
		AvroValue::Decimal("-123.45".parse::<rust_decimal::Decimal>().unwrap()),
	);
}

#[test]
fn date_logical_type_round_trips_through_int() {
	round_trip(r#"{"type":"int","logicalType":"date"}"#, AvroValue::Date(19_000));
}
