//! [Single object encoding](https://avro.apache.org/docs/current/specification/#single-object-encoding):
//! a datum prefixed by the two-byte magic `C3 01` and the writer schema's
//! 8-byte Rabin fingerprint, so that a reader can look the schema up out of
//! band before decoding the payload.

use crate::codec::{compile_decoder, compile_encoder, DecodeError, DecoderConfig, EncodeError, EncoderConfig};
use crate::schema::Schema;
use crate::value::AvroValue;

const MAGIC: [u8; 2] = [0xC3, 0x01];

/// Errors specific to single-object encoding, on top of the usual codec
/// errors.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SingleObjectError {
	#[error("input is too short to contain a single-object encoding header")]
	HeaderTooShort,
	#[error("input does not start with the C3 01 single-object encoding magic")]
	BadMagic,
	#[error("single-object encoding fingerprint does not match the schema's fingerprint")]
	FingerprintMismatch,
	#[error(transparent)]
	Decode(#[from] DecodeError),
	#[error(transparent)]
	Encode(#[from] EncodeError),
	#[error(transparent)]
	Io(#[from] std::io::Error),
}

/// Decodes a value out of a single-object-encoded slice, checking that the
/// embedded fingerprint matches `schema`.
pub fn from_single_object_slice(
	slice: &[u8],
	schema: &Schema,
	config: DecoderConfig,
) -> Result<AvroValue, SingleObjectError> {
	let header: &[u8; 10] = slice
		.get(0..10)
		.ok_or(SingleObjectError::HeaderTooShort)?
		.try_into()
		.expect("checked length above");
	check_header(header, schema)?;
	let decoder = compile_decoder(schema, config);
	Ok(decoder.decode(&slice[10..])?.0)
}

/// Decodes a value out of a single-object-encoded `impl Read`.
pub fn from_single_object_reader<R: std::io::Read>(
	mut reader: R,
	schema: &Schema,
	config: DecoderConfig,
) -> Result<AvroValue, SingleObjectError> {
	let mut header = [0u8; 10];
	reader.read_exact(&mut header)?;
	check_header(&header, schema)?;
	let mut rest = Vec::new();
	reader.read_to_end(&mut rest)?;
	let decoder = compile_decoder(schema, config);
	Ok(decoder.decode(&rest)?.0)
}

fn check_header(header: &[u8; 10], schema: &Schema) -> Result<(), SingleObjectError> {
	if header[0..2] != MAGIC {
		return Err(SingleObjectError::BadMagic);
	}
	if header[2..10] != schema.rabin_fingerprint()[..] {
		return Err(SingleObjectError::FingerprintMismatch);
	}
	Ok(())
}

/// Encodes `value` to `writer` as single-object encoding: the `C3 01` magic,
/// `schema`'s 8-byte Rabin fingerprint, then the datum.
pub fn to_single_object<W: std::io::Write>(
	value: &AvroValue,
	mut writer: W,
	schema: &Schema,
	config: EncoderConfig,
) -> Result<(), SingleObjectError> {
	writer.write_all(&MAGIC)?;
	writer.write_all(&schema.rabin_fingerprint())?;
	let encoder = compile_encoder(schema, config);
	encoder.encode(value, &mut writer)?;
	Ok(())
}

/// Encodes `value` as single-object encoding to a freshly allocated `Vec`.
pub fn to_single_object_vec(
	value: &AvroValue,
	schema: &Schema,
	config: EncoderConfig,
) -> Result<Vec<u8>, SingleObjectError> {
	let mut buf = Vec::new();
	to_single_object(value, &mut buf, schema, config)?;
	Ok(buf)
}
