//! Write/read throughput for the object container file format, across
//! codecs, following the same benchmark shape as the upstream single-value
//! benches: one `BenchmarkId` per codec.

use avro_codec_core::codec::{DecoderConfig, EncoderConfig};
use avro_codec_core::object_container_file_encoding::{CompressionCodec, Reader, WriterBuilder};
use avro_codec_core::value::AvroValue;
use avro_codec_core::Schema;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

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

fn records(count: i32) -> Vec<AvroValue> {
	(0..count)
		.map(|age| {
			let address = AvroValue::Record(vec![
				("street".to_owned(), AvroValue::String("123 Fake St".to_owned())),
				("city".to_owned(), AvroValue::String("Springfield".to_owned())),
				("state_prov".to_owned(), AvroValue::String("IL".to_owned())),
				("country".to_owned(), AvroValue::String("USA".to_owned())),
				("zip".to_owned(), AvroValue::String("12345".to_owned())),
			]);
			AvroValue::Record(vec![
				("username".to_owned(), AvroValue::String("John Doe".to_owned())),
				("age".to_owned(), AvroValue::Int(age)),
				("phone".to_owned(), AvroValue::String("555-555-5555".to_owned())),
				("housenum".to_owned(), AvroValue::String("123".to_owned())),
				("address".to_owned(), address),
			])
		})
		.collect()
}

fn bench_write(c: &mut Criterion) {
	let schema: Schema = RAW_BIG_SCHEMA.parse().unwrap();
	let inputs = records(10_000);
	for (name, codec) in [("null", CompressionCodec::Null), ("deflate", CompressionCodec::Deflate)] {
		c.bench_with_input(
			BenchmarkId::new("object_container_file_write", name),
			&inputs,
			|b, inputs| {
				b.iter(|| {
					let mut writer = WriterBuilder::new()
						.compression_codec(codec)
						.build(Vec::new(), schema.clone(), EncoderConfig::default())
						.unwrap();
					writer.append_all(inputs.iter()).unwrap();
					writer.into_inner().unwrap()
				})
			},
		);
	}
}

fn bench_read(c: &mut Criterion) {
	let schema: Schema = RAW_BIG_SCHEMA.parse().unwrap();
	let inputs = records(10_000);
	for (name, codec) in [("null", CompressionCodec::Null), ("deflate", CompressionCodec::Deflate)] {
		let mut writer = WriterBuilder::new()
			.compression_codec(codec)
			.build(Vec::new(), schema.clone(), EncoderConfig::default())
			.unwrap();
		writer.append_all(inputs.iter()).unwrap();
		let serialized = writer.into_inner().unwrap();

		c.bench_with_input(
			BenchmarkId::new("object_container_file_read", name),
			&serialized,
			|b, serialized| {
				b.iter(|| {
					let reader =
						Reader::from_reader(std::io::BufReader::new(&serialized[..]), DecoderConfig::default())
							.unwrap();
					reader.map(Result::unwrap).count()
				})
			},
		);
	}
}

criterion_group!(benches, bench_write, bench_read);
criterion_main!(benches);
