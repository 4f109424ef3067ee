//! Benches are structured the same way as the upstream benches this crate's
//! encoder/decoder design is descended from: a small, flat schema and a
//! larger, nested one, each benched through `encode` and `decode`.

use avro_codec_core::codec::{compile_decoder, compile_encoder, DecoderConfig, EncoderConfig};
use avro_codec_core::value::AvroValue;
use avro_codec_core::Schema;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

const RAW_SMALL_SCHEMA: &str = r#"
{
	"namespace": "test",
	"type": "record",
	"name": "Test",
	"fields": [
		{ "type": "string", "name": "field" }
	]
}
"#;

const RAW_BIG_SCHEMA: &str = r#"
{
	"namespace": "my.example",
	"type": "record",
	"name": "userInfo",
	"fields": [
		{ "default": "NONE", "type": "string", "name": "username" },
		{ "default": -1, "type": "int", "name": "age" },
		{ "default": "NONE", "type": "string", "name": "phone" },
		{ "default": "NONE", "type": "string", "name": "housenum" },
		{
			"default": {},
			"type": {
				"fields": [
					{ "default": "NONE", "type": "string", "name": "street" },
					{ "default": "NONE", "type": "string", "name": "city" },
					{ "default": "NONE", "type": "string", "name": "state_prov" },
					{ "default": "NONE", "type": "string", "name": "country" },
					{ "default": "NONE", "type": "string", "name": "zip" }
				],
				"type": "record",
				"name": "mailing_address"
			},
			"name": "address"
		}
	]
}
"#;

fn small_record() -> (Schema, AvroValue) {
	let schema: Schema = RAW_SMALL_SCHEMA.parse().unwrap();
	let value = AvroValue::Record(vec![("field".to_owned(), AvroValue::String("foo".to_owned()))]);
	(schema, value)
}

fn big_record() -> (Schema, AvroValue) {
	let schema: Schema = RAW_BIG_SCHEMA.parse().unwrap();
	let address = AvroValue::Record(vec![
		("street".to_owned(), AvroValue::String("street".to_owned())),
		("city".to_owned(), AvroValue::String("city".to_owned())),
		("state_prov".to_owned(), AvroValue::String("state_prov".to_owned())),
		("country".to_owned(), AvroValue::String("country".to_owned())),
		("zip".to_owned(), AvroValue::String("zip".to_owned())),
	]);
	let value = AvroValue::Record(vec![
		("username".to_owned(), AvroValue::String("username".to_owned())),
		("age".to_owned(), AvroValue::Int(10)),
		("phone".to_owned(), AvroValue::String("000000000".to_owned())),
		("housenum".to_owned(), AvroValue::String("0000".to_owned())),
		("address".to_owned(), address),
	]);
	(schema, value)
}

fn bench_encode(c: &mut Criterion) {
	for (name, (schema, value)) in [("small", small_record()), ("big", big_record())] {
		let encoder = compile_encoder(&schema, EncoderConfig::default());
		c.bench_with_input(BenchmarkId::new("encode", name), &value, |b, value| {
			b.iter(|| {
				let mut buf = Vec::new();
				encoder.encode(value, &mut buf).unwrap();
				buf
			})
		});
	}
}

fn bench_decode(c: &mut Criterion) {
	for (name, (schema, value)) in [("small", small_record()), ("big", big_record())] {
		let mut datum = Vec::new();
		compile_encoder(&schema, EncoderConfig::default())
			.encode(&value, &mut datum)
			.unwrap();
		let decoder = compile_decoder(&schema, DecoderConfig::default());
		c.bench_with_input(BenchmarkId::new("decode", name), &datum, |b, datum| {
			b.iter(|| decoder.decode(datum).unwrap())
		});
	}
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
