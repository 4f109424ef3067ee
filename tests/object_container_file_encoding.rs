//! Grounded against a real Avro object container file byte sequence
//! (two `test` records, deflate-free `null` codec), the same fixture the
//! Apache Avro reference implementation's own reader tests use.

use avro_codec_core::codec::{DecoderConfig, EncoderConfig};
use avro_codec_core::object_container_file_encoding::{CompressionCodec, Reader, WriterBuilder};
use avro_codec_core::value::AvroValue;
use avro_codec_core::Schema;

use pretty_assertions::assert_eq;

const ENCODED: &[u8] = &[
	79u8, 98u8, 106u8, 1u8, 4u8, 22u8, 97u8, 118u8, 114u8, 111u8, 46u8, 115u8, 99u8, 104u8, 101u8, 109u8, 97u8, 222u8,
	1u8, 123u8, 34u8, 116u8, 121u8, 112u8, 101u8, 34u8, 58u8, 34u8, 114u8, 101u8, 99u8, 111u8, 114u8, 100u8, 34u8,
	44u8, 34u8, 110u8, 97u8, 109u8, 101u8, 34u8, 58u8, 34u8, 116u8, 101u8, 115u8, 116u8, 34u8, 44u8, 34u8, 102u8,
	105u8, 101u8, 108u8, 100u8, 115u8, 34u8, 58u8, 91u8, 123u8, 34u8, 110u8, 97u8, 109u8, 101u8, 34u8, 58u8, 34u8,
	97u8, 34u8, 44u8, 34u8, 116u8, 121u8, 112u8, 101u8, 34u8, 58u8, 34u8, 108u8, 111u8, 110u8, 103u8, 34u8, 44u8, 34u8,
	100u8, 101u8, 102u8, 97u8, 117u8, 108u8, 116u8, 34u8, 58u8, 52u8, 50u8, 125u8, 44u8, 123u8, 34u8, 110u8, 97u8,
	109u8, 101u8, 34u8, 58u8, 34u8, 98u8, 34u8, 44u8, 34u8, 116u8, 121u8, 112u8, 101u8, 34u8, 58u8, 34u8, 115u8, 116u8,
	114u8, 105u8, 110u8, 103u8, 34u8, 125u8, 93u8, 125u8, 20u8, 97u8, 118u8, 114u8, 111u8, 46u8, 99u8, 111u8, 100u8,
	101u8, 99u8, 8u8, 110u8, 117u8, 108u8, 108u8, 0u8, 94u8, 61u8, 54u8, 221u8, 190u8, 207u8, 108u8, 180u8, 158u8,
	57u8, 114u8, 40u8, 173u8, 199u8, 228u8, 239u8, 4u8, 20u8, 54u8, 6u8, 102u8, 111u8, 111u8, 84u8, 6u8, 98u8, 97u8,
	114u8, 94u8, 61u8, 54u8, 221u8, 190u8, 207u8, 108u8, 180u8, 158u8, 57u8, 114u8, 40u8, 173u8, 199u8, 228u8, 239u8,
];

#[test]
fn reads_a_real_object_container_file() {
	let reader = Reader::from_reader(std::io::BufReader::new(ENCODED), DecoderConfig::default()).unwrap();
	let values: Vec<AvroValue> = reader.map(Result::unwrap).collect();
	assert_eq!(
		values,
		vec![
			AvroValue::Record(vec![
				("a".to_owned(), AvroValue::Long(27)),
				("b".to_owned(), AvroValue::String("foo".to_owned())),
			]),
			AvroValue::Record(vec![
				("a".to_owned(), AvroValue::Long(42)),
				("b".to_owned(), AvroValue::String("bar".to_owned())),
			]),
		]
	);
}

#[test]
fn round_trips_many_blocks_with_deflate() {
	let schema: Schema = r#"{"type":"record","name":"R","fields":[
		{"name":"i","type":"int"},{"name":"s","type":"string"}
	]}"#
	.parse()
	.unwrap();
	let values: Vec<AvroValue> = (0..2000)
		.map(|i| {
			AvroValue::Record(vec![
				("i".to_owned(), AvroValue::Int(i)),
				("s".to_owned(), AvroValue::String(format!("value-{i}"))),
			])
		})
		.collect();

	let mut buf = Vec::new();
	{
		let mut writer = WriterBuilder::new()
			.compression_codec(CompressionCodec::Deflate)
			.aprox_block_size(256)
			.build(&mut buf, schema.clone(), EncoderConfig::default())
			.unwrap();
		writer.append_all(values.iter()).unwrap();
		writer.into_inner().unwrap();
	}

	let reader = Reader::from_reader(std::io::BufReader::new(&buf[..]), DecoderConfig::default()).unwrap();
	assert_eq!(reader.schema().json(), schema.json());
	let decoded: Vec<AvroValue> = reader.map(Result::unwrap).collect();
	assert_eq!(decoded, values);
}

#[test]
fn sync_marker_mismatch_is_detected() {
	let mut corrupted = ENCODED.to_vec();
	// Flip a byte inside the trailing sync marker of the only block.
	let last = corrupted.len() - 1;
	corrupted[last] ^= 0xFF;
	let reader = Reader::from_reader(std::io::BufReader::new(&corrupted[..]), DecoderConfig::default()).unwrap();
	let err = reader.map(Result::unwrap_err).last().unwrap();
	assert!(matches!(
		err,
		avro_codec_core::object_container_file_encoding::ObjectContainerError::SyncMarkerMismatch
	));
}
