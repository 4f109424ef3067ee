//! Writer/reader schema resolution: promotion, field add/drop/rename,
//! enum evolution, and union resolution.

use avro_codec_core::codec::{compile_encoder, DecoderConfig, EncoderConfig};
use avro_codec_core::resolution::{build_plan, compile_resolved_decoder};
use avro_codec_core::value::AvroValue;
use avro_codec_core::Schema;

use pretty_assertions::assert_eq;

fn resolve(writer_schema: &str, reader_schema: &str, value: AvroValue) -> AvroValue {
	let writer: Schema = writer_schema.parse().unwrap();
	let reader: Schema = reader_schema.parse().unwrap();
	let mut buf = Vec::new();
	compile_encoder(&writer, EncoderConfig::default())
		.encode(&value, &mut buf)
		.unwrap();
	compile_resolved_decoder(&writer, &reader, DecoderConfig::default())
		.unwrap()
		.decode(&buf)
		.unwrap()
		.0
}

#[test]
fn adding_a_field_with_a_default_is_compatible() {
	let writer = r#"{"type":"record","name":"R","fields":[{"name":"a","type":"int"}]}"#;
	let reader = r#"{"type":"record","name":"R","fields":[
		{"name":"a","type":"int"},{"name":"b","type":"string","default":"x"}
	]}"#;
	let value = AvroValue::Record(vec![("a".to_owned(), AvroValue::Int(1))]);
	assert_eq!(
		resolve(writer, reader, value),
		AvroValue::Record(vec![
			("a".to_owned(), AvroValue::Int(1)),
			("b".to_owned(), AvroValue::String("x".to_owned())),
		])
	);
}

#[test]
fn removing_a_field_is_compatible() {
	let writer = r#"{"type":"record","name":"R","fields":[
		{"name":"a","type":"int"},{"name":"b","type":"string"}
	]}"#;
	let reader = r#"{"type":"record","name":"R","fields":[{"name":"a","type":"int"}]}"#;
	let value = AvroValue::Record(vec![
		("a".to_owned(), AvroValue::Int(1)),
		("b".to_owned(), AvroValue::String("gone".to_owned())),
	]);
	assert_eq!(
		resolve(writer, reader, value),
		AvroValue::Record(vec![("a".to_owned(), AvroValue::Int(1))])
	);
}

#[test]
fn adding_a_field_without_a_default_is_incompatible() -> anyhow::Result<()> {
	let writer = r#"{"type":"record","name":"R","fields":[{"name":"a","type":"int"}]}"#;
	let reader = r#"{"type":"record","name":"R","fields":[
		{"name":"a","type":"int"},{"name":"b","type":"string"}
	]}"#;
	let writer_schema: Schema = writer.parse()?;
	let reader_schema: Schema = reader.parse()?;
	assert!(build_plan(&writer_schema, &reader_schema, false).is_err());
	Ok(())
}

#[test]
fn reader_only_union_field_without_default_falls_back_to_null() {
	let writer = r#"{"type":"record","name":"R","fields":[{"name":"a","type":"int"}]}"#;
	let reader = r#"{"type":"record","name":"R","fields":[
		{"name":"a","type":"int"},{"name":"b","type":["null","string"]}
	]}"#;
	let value = AvroValue::Record(vec![("a".to_owned(), AvroValue::Int(1))]);
	assert_eq!(
		resolve(writer, reader, value),
		AvroValue::Record(vec![
			("a".to_owned(), AvroValue::Int(1)),
			("b".to_owned(), AvroValue::Union(Box::new(AvroValue::Null))),
		])
	);
}

#[test]
fn strict_union_match_rejects_reader_only_union_field_without_default() {
	let writer: Schema = r#"{"type":"record","name":"R","fields":[{"name":"a","type":"int"}]}"#
		.parse()
		.unwrap();
	let reader: Schema = r#"{"type":"record","name":"R","fields":[
		{"name":"a","type":"int"},{"name":"b","type":["null","string"]}
	]}"#
	.parse()
	.unwrap();
	assert!(build_plan(&writer, &reader, true).is_err());
}

#[test]
fn field_renamed_via_reader_alias_still_matches() {
	let writer = r#"{"type":"record","name":"R","fields":[{"name":"old_name","type":"int"}]}"#;
	let reader = r#"{"type":"record","name":"R","fields":[
		{"name":"new_name","aliases":["old_name"],"type":"int"}
	]}"#;
	let value = AvroValue::Record(vec![("old_name".to_owned(), AvroValue::Int(7))]);
	assert_eq!(
		resolve(writer, reader, value),
		AvroValue::Record(vec![("new_name".to_owned(), AvroValue::Int(7))])
	);
}

#[test]
fn int_promotes_to_long_float_and_double() {
	assert_eq!(resolve(r#""int""#, r#""long""#, AvroValue::Int(1)), AvroValue::Long(1));
	assert_eq!(
		resolve(r#""int""#, r#""float""#, AvroValue::Int(1)),
		AvroValue::Float(1.0)
	);
	assert_eq!(
		resolve(r#""long""#, r#""double""#, AvroValue::Long(1)),
		AvroValue::Double(1.0)
	);
}

#[test]
fn double_does_not_demote_to_float() {
	let writer: Schema = r#""double""#.parse().unwrap();
	let reader: Schema = r#""float""#.parse().unwrap();
	assert!(build_plan(&writer, &reader, false).is_err());
}

#[test]
fn enum_resolves_unknown_writer_symbol_to_reader_default() {
	let writer = r#"{"type":"enum","name":"E","symbols":["A","B","C"]}"#;
	let reader = r#"{"type":"enum","name":"E","symbols":["A","D"],"default":"D"}"#;
	assert_eq!(
		resolve(writer, reader, AvroValue::Enum("C".to_owned())),
		AvroValue::Enum("D".to_owned())
	);
}

#[test]
fn array_and_map_item_types_resolve_recursively() {
	let writer = r#"{"type":"array","items":"int"}"#;
	let reader = r#"{"type":"array","items":"long"}"#;
	assert_eq!(
		resolve(writer, reader, AvroValue::Array(vec![AvroValue::Int(1), AvroValue::Int(2)])),
		AvroValue::Array(vec![AvroValue::Long(1), AvroValue::Long(2)])
	);
}

#[test]
fn writer_union_resolves_each_branch_against_a_non_union_reader() {
	let writer = r#"["int","long"]"#;
	let reader = r#""long""#;
	// A union-typed writer value is represented by its unwrapped payload;
	// the branch is recovered structurally, same as during plain encoding.
	assert_eq!(resolve(writer, reader, AvroValue::Int(3)), AvroValue::Long(3));
	assert_eq!(resolve(writer, reader, AvroValue::Long(3)), AvroValue::Long(3));
}
