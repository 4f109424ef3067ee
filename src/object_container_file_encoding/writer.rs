use integer_encoding::VarIntWriter;

use super::{CompressionCodec, ObjectContainerError, HEADER_CONST};
use crate::codec::{compile_encoder, EncoderConfig};
use crate::schema::Schema;
use crate::value::AvroValue;

/// Builds a [`Writer`], configuring the compression codec and the
/// approximate block size before the header is written.
pub struct WriterBuilder {
	compression_codec: CompressionCodec,
	aprox_block_size: usize,
}

impl WriterBuilder {
	pub fn new() -> Self {
		Self {
			compression_codec: CompressionCodec::Null,
			aprox_block_size: 64 * 1024,
		}
	}

	pub fn compression_codec(mut self, compression_codec: CompressionCodec) -> Self {
		self.compression_codec = compression_codec;
		self
	}

	/// Once the buffer of pending, not-yet-flushed values reaches this many
	/// bytes (uncompressed), a block is flushed.
	pub fn aprox_block_size(mut self, aprox_block_size: usize) -> Self {
		self.aprox_block_size = aprox_block_size;
		self
	}

	/// Writes the header (magic, metadata carrying `schema`'s JSON and the
	/// codec name, a random sync marker) and returns a ready-to-use [`Writer`].
	pub fn build<W: std::io::Write>(
		self,
		writer: W,
		schema: Schema,
		encoder_config: EncoderConfig,
	) -> Result<Writer<W>, ObjectContainerError> {
		Writer::new(writer, schema, encoder_config, self.compression_codec, self.aprox_block_size)
	}
}

impl Default for WriterBuilder {
	fn default() -> Self {
		Self::new()
	}
}

/// Writer for [object container files](https://avro.apache.org/docs/current/specification/#object-container-files).
pub struct Writer<W: std::io::Write> {
	inner: WriterInner,
	writer: Option<W>,
}

struct WriterInner {
	schema: Schema,
	encoder_config: EncoderConfig,
	compression_codec: CompressionCodec,
	aprox_block_size: usize,
	sync_marker: [u8; 16],
	pending_count: u64,
	pending_buf: Vec<u8>,
}

impl<W: std::io::Write> Writer<W> {
	fn new(
		mut writer: W,
		schema: Schema,
		encoder_config: EncoderConfig,
		compression_codec: CompressionCodec,
		aprox_block_size: usize,
	) -> Result<Self, ObjectContainerError> {
		let mut sync_marker = [0u8; 16];
		rand::Rng::fill(&mut rand::thread_rng(), &mut sync_marker);

		writer.write_all(&HEADER_CONST)?;
		write_metadata_map(&mut writer, schema.json(), compression_codec.as_str())?;
		writer.write_all(&sync_marker)?;

		Ok(Self {
			inner: WriterInner {
				schema,
				encoder_config,
				compression_codec,
				aprox_block_size,
				sync_marker,
				pending_count: 0,
				pending_buf: Vec::new(),
			},
			writer: Some(writer),
		})
	}

	/// Appends a value, encoding it into the current pending block. Flushes
	/// the block automatically once it reaches the configured approximate
	/// size.
	pub fn append(&mut self, value: &AvroValue) -> Result<(), ObjectContainerError> {
		let encoder = compile_encoder(&self.inner.schema, self.inner.encoder_config.clone());
		encoder.encode(value, &mut self.inner.pending_buf)?;
		self.inner.pending_count += 1;
		if self.inner.pending_buf.len() >= self.inner.aprox_block_size {
			self.flush_block()?;
		}
		Ok(())
	}

	pub fn append_all<'a, IT>(&mut self, values: IT) -> Result<(), ObjectContainerError>
	where
		IT: IntoIterator<Item = &'a AvroValue>,
	{
		values.into_iter().try_for_each(|v| self.append(v))
	}

	/// Compresses and writes out the current pending block, if non-empty.
	pub fn flush_block(&mut self) -> Result<(), ObjectContainerError> {
		if self.inner.pending_count == 0 {
			return Ok(());
		}
		let writer = self
			.writer
			.as_mut()
			.expect("only unset by into_inner, which consumes self");
		let compressed = self.inner.compression_codec.compress(&self.inner.pending_buf)?;
		writer.write_varint(self.inner.pending_count as i64)?;
		writer.write_varint(compressed.len() as i64)?;
		writer.write_all(&compressed)?;
		writer.write_all(&self.inner.sync_marker)?;
		self.inner.pending_count = 0;
		self.inner.pending_buf.clear();
		Ok(())
	}

	/// Flushes any pending block and returns the inner writer.
	pub fn into_inner(mut self) -> Result<W, ObjectContainerError> {
		self.flush_block()?;
		Ok(self.writer.take().expect("only taken here, which consumes self"))
	}
}

impl<W: std::io::Write> Drop for Writer<W> {
	fn drop(&mut self) {
		if self.writer.is_some() {
			let _ = self.flush_block();
		}
	}
}

fn write_metadata_map<W: std::io::Write>(
	writer: &mut W,
	schema_json: &str,
	codec_str: &str,
) -> Result<(), ObjectContainerError> {
	writer.write_varint(2i64)?;
	write_length_prefixed(writer, b"avro.schema")?;
	write_length_prefixed(writer, schema_json.as_bytes())?;
	write_length_prefixed(writer, b"avro.codec")?;
	write_length_prefixed(writer, codec_str.as_bytes())?;
	writer.write_varint(0i64)?;
	Ok(())
}

fn write_length_prefixed<W: std::io::Write>(writer: &mut W, bytes: &[u8]) -> Result<(), ObjectContainerError> {
	writer.write_varint(bytes.len() as i64)?;
	writer.write_all(bytes)?;
	Ok(())
}
