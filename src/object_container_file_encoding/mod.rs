//! Support for [object container files](https://avro.apache.org/docs/current/specification/#object-container-files):
//! a header (magic, schema + codec metadata, sync marker) followed by a
//! sequence of (optionally compressed) blocks of datums, each block closed
//! out by the header's sync marker.

mod compression_codec;
mod error;
mod reader;
mod writer;

pub use compression_codec::CompressionCodec;
pub use error::ObjectContainerError;
pub use reader::Reader;
pub use writer::{Writer, WriterBuilder};

pub(crate) const HEADER_CONST: [u8; 4] = [b'O', b'b', b'j', 1u8];

#[cfg(test)]
mod tests {
	use super::*;
	use crate::codec::{DecoderConfig, EncoderConfig};
	use crate::schema::Schema;
	use crate::value::AvroValue;

	#[test]
	fn round_trips_a_few_records_uncompressed() {
		let schema: Schema = r#"{"type":"record","name":"R","fields":[
			{"name":"a","type":"int"}
		]}"#
			.parse()
			.unwrap();
		let mut buf = Vec::new();
		{
			let mut writer = WriterBuilder::new()
				.build(&mut buf, schema.clone(), EncoderConfig::default())
				.unwrap();
			for i in 0..5 {
				writer
					.append(&AvroValue::Record(vec![("a".to_owned(), AvroValue::Int(i))]))
					.unwrap();
			}
			writer.into_inner().unwrap();
		}

		let reader = Reader::from_reader(std::io::BufReader::new(&buf[..]), DecoderConfig::default()).unwrap();
		let values: Result<Vec<_>, _> = reader.collect();
		let values = values.unwrap();
		assert_eq!(values.len(), 5);
		assert_eq!(
			values[3],
			AvroValue::Record(vec![("a".to_owned(), AvroValue::Int(3))])
		);
	}

	#[test]
	fn round_trips_with_deflate() {
		let schema: Schema = r#""string""#.parse().unwrap();
		let mut buf = Vec::new();
		{
			let mut writer = WriterBuilder::new()
				.compression_codec(CompressionCodec::Deflate)
				.build(&mut buf, schema.clone(), EncoderConfig::default())
				.unwrap();
			writer.append(&AvroValue::String("hello".to_owned())).unwrap();
			writer.append(&AvroValue::String("world".to_owned())).unwrap();
			writer.into_inner().unwrap();
		}

		let reader = Reader::from_reader(std::io::BufReader::new(&buf[..]), DecoderConfig::default()).unwrap();
		let values: Vec<AvroValue> = reader.map(Result::unwrap).collect();
		assert_eq!(
			values,
			vec![
				AvroValue::String("hello".to_owned()),
				AvroValue::String("world".to_owned())
			]
		);
	}

	#[test]
	fn rejects_input_without_the_magic_header() {
		let err = Reader::from_reader(std::io::BufReader::new(&b"not avro"[..]), DecoderConfig::default())
			.unwrap_err();
		assert!(matches!(err, ObjectContainerError::NotAnObjectContainerFile));
	}
}
