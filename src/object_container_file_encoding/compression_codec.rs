//! The `avro.codec` metadata value and the whole-block (de)compression it
//! selects.
//!
//! Unlike the streaming compression state machines a generic serde-based
//! codec needs, every block here is fully decoded into memory before the
//! codec's bytes are handed to [`Decoder`](crate::codec::Decoder) anyway (the
//! value model is an in-memory [`AvroValue`](crate::value::AvroValue) tree,
//! not a borrow into the wire bytes), so compression is just whole-buffer
//! in, whole-buffer out.

use super::ObjectContainerError;

/// The compression codec used to compress a container file's blocks.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum CompressionCodec {
	/// Passes block bytes through uncompressed.
	Null,
	/// [RFC 1951](https://www.rfc-editor.org/rfc/rfc1951) deflate, no header or checksum.
	Deflate,
	/// Google's [Snappy](http://google.github.io/snappy/); each block is
	/// followed by the 4-byte big-endian CRC32 of the uncompressed data.
	#[cfg(feature = "snappy")]
	Snappy,
	/// [Zstandard](http://facebook.github.io/zstd/).
	#[cfg(feature = "zstandard")]
	Zstandard,
	/// [BZip2](https://sourceware.org/bzip2/).
	#[cfg(feature = "bzip2")]
	Bzip2,
	/// [XZ](https://tukaani.org/xz/).
	#[cfg(feature = "xz")]
	Xz,
}

impl CompressionCodec {
	/// The string used as the `avro.codec` metadata value.
	pub fn as_str(&self) -> &'static str {
		match self {
			CompressionCodec::Null => "null",
			CompressionCodec::Deflate => "deflate",
			#[cfg(feature = "snappy")]
			CompressionCodec::Snappy => "snappy",
			#[cfg(feature = "zstandard")]
			CompressionCodec::Zstandard => "zstandard",
			#[cfg(feature = "bzip2")]
			CompressionCodec::Bzip2 => "bzip2",
			#[cfg(feature = "xz")]
			CompressionCodec::Xz => "xz",
		}
	}

	pub(super) fn from_metadata_str(s: &str) -> Result<Self, ObjectContainerError> {
		Ok(match s {
			"null" => CompressionCodec::Null,
			"deflate" => CompressionCodec::Deflate,
			#[cfg(feature = "snappy")]
			"snappy" => CompressionCodec::Snappy,
			#[cfg(feature = "zstandard")]
			"zstandard" => CompressionCodec::Zstandard,
			#[cfg(feature = "bzip2")]
			"bzip2" => CompressionCodec::Bzip2,
			#[cfg(feature = "xz")]
			"xz" => CompressionCodec::Xz,
			other => return Err(ObjectContainerError::UnsupportedCodec(other.to_owned())),
		})
	}

	pub(super) fn compress(&self, data: &[u8]) -> Result<Vec<u8>, ObjectContainerError> {
		use std::io::Write;
		Ok(match self {
			CompressionCodec::Null => data.to_vec(),
			CompressionCodec::Deflate => {
				let mut encoder =
					flate2::write::DeflateEncoder::new(Vec::new(), flate2::Compression::default());
				encoder.write_all(data)?;
				encoder.finish()?
			}
			#[cfg(feature = "snappy")]
			CompressionCodec::Snappy => {
				let mut compressed = snap::raw::Encoder::new()
					.compress_vec(data)
					.map_err(|e| ObjectContainerError::Codec(e.to_string()))?;
				compressed.extend_from_slice(&crc32fast::hash(data).to_be_bytes());
				compressed
			}
			#[cfg(feature = "zstandard")]
			CompressionCodec::Zstandard => zstd::stream::encode_all(data, 0)?,
			#[cfg(feature = "bzip2")]
			CompressionCodec::Bzip2 => {
				let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
				encoder.write_all(data)?;
				encoder.finish()?
			}
			#[cfg(feature = "xz")]
			CompressionCodec::Xz => {
				let mut encoder = xz2::write::XzEncoder::new(Vec::new(), 6);
				encoder.write_all(data)?;
				encoder.finish()?
			}
		})
	}

	pub(super) fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, ObjectContainerError> {
		use std::io::Read;
		Ok(match self {
			CompressionCodec::Null => data.to_vec(),
			CompressionCodec::Deflate => {
				let mut out = Vec::new();
				flate2::read::DeflateDecoder::new(data).read_to_end(&mut out)?;
				out
			}
			#[cfg(feature = "snappy")]
			CompressionCodec::Snappy => {
				let split = data.len().checked_sub(4).ok_or_else(|| {
					ObjectContainerError::Codec("snappy block too short for trailing CRC32".to_owned())
				})?;
				let (payload, crc) = data.split_at(split);
				let out = snap::raw::Decoder::new()
					.decompress_vec(payload)
					.map_err(|e| ObjectContainerError::Codec(e.to_string()))?;
				let expected = u32::from_be_bytes(crc.try_into().expect("split at len - 4"));
				if crc32fast::hash(&out) != expected {
					return Err(ObjectContainerError::Codec(
						"snappy block CRC32 mismatch".to_owned(),
					));
				}
				out
			}
			#[cfg(feature = "zstandard")]
			CompressionCodec::Zstandard => zstd::stream::decode_all(data)?,
			#[cfg(feature = "bzip2")]
			CompressionCodec::Bzip2 => {
				let mut out = Vec::new();
				bzip2::read::BzDecoder::new(data).read_to_end(&mut out)?;
				out
			}
			#[cfg(feature = "xz")]
			CompressionCodec::Xz => {
				let mut out = Vec::new();
				xz2::read::XzDecoder::new(data).read_to_end(&mut out)?;
				out
			}
		})
	}
}
