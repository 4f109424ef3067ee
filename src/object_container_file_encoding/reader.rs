use std::collections::{HashMap, VecDeque};

use integer_encoding::VarIntReader;

use super::{CompressionCodec, ObjectContainerError, HEADER_CONST};
use crate::codec::{compile_decoder, DecoderConfig};
use crate::schema::Schema;
use crate::value::AvroValue;

/// Reads datums out of an
/// [object container file](https://avro.apache.org/docs/current/specification/#object-container-files).
///
/// Holds one decompressed block in memory at a time; [`read_next`](Self::read_next)
/// (or the `Iterator` impl) pulls in and decompresses the next block as the
/// current one is exhausted.
pub struct Reader<R> {
	source: R,
	schema: Schema,
	decoder_config: DecoderConfig,
	compression_codec: CompressionCodec,
	sync_marker: [u8; 16],
	pending: VecDeque<AvroValue>,
}

impl<R: std::io::BufRead> Reader<R> {
	/// Reads and validates the header (magic, metadata, sync marker), parsing
	/// the embedded schema.
	pub fn from_reader(mut source: R, decoder_config: DecoderConfig) -> Result<Self, ObjectContainerError> {
		let mut magic = [0u8; 4];
		source.read_exact(&mut magic)?;
		if magic != HEADER_CONST {
			return Err(ObjectContainerError::NotAnObjectContainerFile);
		}

		let metadata = read_metadata_map(&mut source)?;
		let schema_json = metadata.get("avro.schema").ok_or_else(|| {
			ObjectContainerError::MalformedHeader("missing `avro.schema` metadata key".to_owned())
		})?;
		let schema_json = std::str::from_utf8(schema_json)
			.map_err(|e| ObjectContainerError::MalformedHeader(e.to_string()))?;
		let schema: Schema = schema_json.parse()?;

		let compression_codec = match metadata.get("avro.codec") {
			Some(bytes) => {
				let s = std::str::from_utf8(bytes)
					.map_err(|e| ObjectContainerError::MalformedHeader(e.to_string()))?;
				CompressionCodec::from_metadata_str(s)?
			}
			None => CompressionCodec::Null,
		};

		let mut sync_marker = [0u8; 16];
		source.read_exact(&mut sync_marker)?;

		Ok(Self {
			source,
			schema,
			decoder_config,
			compression_codec,
			sync_marker,
			pending: VecDeque::new(),
		})
	}

	/// The schema embedded in the file's header.
	pub fn schema(&self) -> &Schema {
		&self.schema
	}

	/// Reads the next datum, pulling in a new block if the current one is
	/// exhausted. Returns `None` once the file is exhausted.
	pub fn read_next(&mut self) -> Result<Option<AvroValue>, ObjectContainerError> {
		if self.pending.is_empty() && !self.fill_block()? {
			return Ok(None);
		}
		Ok(self.pending.pop_front())
	}

	/// Reads one block's worth of values into `self.pending`. Returns `false`
	/// if the file is already exhausted.
	fn fill_block(&mut self) -> Result<bool, ObjectContainerError> {
		if self.source.fill_buf()?.is_empty() {
			return Ok(false);
		}
		let count: i64 = self.source.read_varint()?;
		let count = usize::try_from(count)
			.map_err(|_| ObjectContainerError::MalformedHeader("negative block object count".to_owned()))?;
		let byte_size: i64 = self.source.read_varint()?;
		let byte_size = usize::try_from(byte_size)
			.map_err(|_| ObjectContainerError::MalformedHeader("negative block byte size".to_owned()))?;
		if byte_size > self.decoder_config.max_block_bytes {
			return Err(crate::codec::DecodeError::LengthLimit(
				byte_size as i64,
				self.decoder_config.max_block_bytes,
			)
			.into());
		}

		let mut compressed = vec![0u8; byte_size];
		self.source.read_exact(&mut compressed)?;
		let decompressed = self.compression_codec.decompress(&compressed)?;

		let decoder = compile_decoder(&self.schema, self.decoder_config.clone());
		let mut offset = 0;
		for _ in 0..count {
			let (value, consumed) = decoder.decode(&decompressed[offset..])?;
			offset += consumed;
			self.pending.push_back(value);
		}

		let mut sync = [0u8; 16];
		self.source.read_exact(&mut sync)?;
		if sync != self.sync_marker {
			return Err(ObjectContainerError::SyncMarkerMismatch);
		}
		Ok(true)
	}
}

impl<R: std::io::BufRead> Iterator for Reader<R> {
	type Item = Result<AvroValue, ObjectContainerError>;
	fn next(&mut self) -> Option<Self::Item> {
		self.read_next().transpose()
	}
}

fn read_metadata_map<R: std::io::Read>(source: &mut R) -> Result<HashMap<String, Vec<u8>>, ObjectContainerError> {
	let mut map = HashMap::new();
	loop {
		let count: i64 = source.read_varint()?;
		if count == 0 {
			break;
		}
		let count = if count < 0 {
			let _byte_size: i64 = source.read_varint()?;
			(-count) as usize
		} else {
			count as usize
		};
		for _ in 0..count {
			let key = read_length_prefixed_string(source)?;
			let value = read_length_prefixed_bytes(source)?;
			map.insert(key, value);
		}
	}
	Ok(map)
}

fn read_length_prefixed_bytes<R: std::io::Read>(source: &mut R) -> Result<Vec<u8>, ObjectContainerError> {
	let len: i64 = source.read_varint()?;
	let len = usize::try_from(len)
		.map_err(|_| ObjectContainerError::MalformedHeader("negative length prefix".to_owned()))?;
	let mut buf = vec![0u8; len];
	source.read_exact(&mut buf)?;
	Ok(buf)
}

fn read_length_prefixed_string<R: std::io::Read>(source: &mut R) -> Result<String, ObjectContainerError> {
	String::from_utf8(read_length_prefixed_bytes(source)?)
		.map_err(|e| ObjectContainerError::MalformedHeader(e.to_string()))
}
