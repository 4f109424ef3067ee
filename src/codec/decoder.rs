use std::collections::HashMap;

use super::{error::DecodeError, primitives::Reader, DecoderConfig};
use crate::schema::{LogicalType, RegularType, Schema, SchemaKey};
use crate::value::AvroValue;

/// Compiles `schema` into a reusable [`Decoder`].
///
/// As with [`compile_encoder`](super::compile_encoder), all the per-schema
/// work already happened while building the [`Schema`]; this just pairs a
/// borrow of it with a [`DecoderConfig`].
pub fn compile_decoder(schema: &Schema, config: DecoderConfig) -> Decoder<'_> {
	Decoder { schema, config }
}

/// A decoder specialized against a particular [`Schema`].
pub struct Decoder<'s> {
	schema: &'s Schema,
	config: DecoderConfig,
}

impl<'s> Decoder<'s> {
	/// Decodes one Avro datum (raw binary, no framing) from `bytes`,
	/// returning the decoded value and the number of bytes consumed.
	pub fn decode(&self, bytes: &[u8]) -> Result<(AvroValue, usize), DecodeError> {
		let mut r = Reader::new(bytes);
		let value = self.decode_node(self.schema.root(), &mut r)?;
		let consumed = bytes.len() - r.remaining().len();
		Ok((value, consumed))
	}

	fn decode_node(&self, key: SchemaKey, r: &mut Reader) -> Result<AvroValue, DecodeError> {
		let node = self.schema.node(key);
		match &node.logical_type {
			Some(logical_type) => self.decode_logical(logical_type, &node.type_, r),
			None => self.decode_regular(&node.type_, r),
		}
	}

	fn decode_logical(
		&self,
		logical_type: &LogicalType,
		underlying: &RegularType,
		r: &mut Reader,
	) -> Result<AvroValue, DecodeError> {
		match logical_type {
			LogicalType::Decimal(decimal) => {
				let bytes = self.decode_bytes_like(underlying, r)?;
				match decimal_from_unscaled_bytes(&bytes, decimal.scale) {
					Some(value) => Ok(AvroValue::Decimal(value)),
					None if self.config.logical_type_fallback => Ok(AvroValue::Bytes(bytes)),
					None => Err(DecodeError::RuntimeIncompatible("decimal value out of range".to_owned())),
				}
			}
			LogicalType::Uuid => {
				let s = r.read_string(self.config.max_block_bytes)?;
				Ok(AvroValue::Uuid(s.to_owned()))
			}
			LogicalType::Date => Ok(AvroValue::Date(r.read_int()?)),
			LogicalType::TimeMillis => Ok(AvroValue::TimeMillis(r.read_int()?)),
			LogicalType::TimeMicros => Ok(AvroValue::TimeMicros(r.read_long()?)),
			LogicalType::TimestampMillis => Ok(AvroValue::TimestampMillis(r.read_long()?)),
			LogicalType::TimestampMicros => Ok(AvroValue::TimestampMicros(r.read_long()?)),
		}
	}

	fn decode_bytes_like(&self, underlying: &RegularType, r: &mut Reader) -> Result<Vec<u8>, DecodeError> {
		match underlying {
			RegularType::Bytes => Ok(r.read_bytes(self.config.max_block_bytes)?.to_vec()),
			RegularType::Fixed(fixed) => Ok(r.read_exact(fixed.size)?.to_vec()),
			_ => Err(DecodeError::RuntimeIncompatible(
				"logical type annotation on an unsupported underlying type".to_owned(),
			)),
		}
	}

	fn decode_regular(&self, type_: &RegularType, r: &mut Reader) -> Result<AvroValue, DecodeError> {
		match type_ {
			RegularType::Null => Ok(AvroValue::Null),
			RegularType::Boolean => Ok(AvroValue::Boolean(r.read_boolean()?)),
			RegularType::Int => Ok(AvroValue::Int(r.read_int()?)),
			RegularType::Long => Ok(AvroValue::Long(r.read_long()?)),
			RegularType::Float => Ok(AvroValue::Float(r.read_float()?)),
			RegularType::Double => Ok(AvroValue::Double(r.read_double()?)),
			RegularType::Bytes => Ok(AvroValue::Bytes(r.read_bytes(self.config.max_block_bytes)?.to_vec())),
			RegularType::String => Ok(AvroValue::String(
				r.read_string(self.config.max_block_bytes)?.to_owned(),
			)),
			RegularType::Fixed(fixed) => Ok(AvroValue::Fixed(r.read_exact(fixed.size)?.to_vec())),
			RegularType::Enum(enum_) => {
				let idx = r.read_long()?;
				let symbol = usize::try_from(idx)
					.ok()
					.and_then(|idx| enum_.symbols.get(idx))
					.ok_or(DecodeError::EnumIndexOutOfRange(idx))?;
				Ok(AvroValue::Enum(symbol.clone()))
			}
			RegularType::Array(array) => {
				let mut items = Vec::new();
				loop {
					let (count, _byte_size) = r.read_block_header()?;
					if count == 0 {
						break;
					}
					self.check_block_len(count)?;
					for _ in 0..count {
						items.push(self.decode_node(array.items, r)?);
					}
				}
				Ok(AvroValue::Array(items))
			}
			RegularType::Map(map) => {
				let mut entries = HashMap::new();
				loop {
					let (count, _byte_size) = r.read_block_header()?;
					if count == 0 {
						break;
					}
					self.check_block_len(count)?;
					for _ in 0..count {
						let key = r.read_string(self.config.max_block_bytes)?.to_owned();
						let value = self.decode_node(map.values, r)?;
						entries.insert(key, value);
					}
				}
				Ok(AvroValue::Map(entries))
			}
			RegularType::Record(record) => {
				let mut fields = Vec::with_capacity(record.fields.len());
				for field in &record.fields {
					fields.push((field.name.clone(), self.decode_node(field.type_, r)?));
				}
				Ok(AvroValue::Record(fields))
			}
			RegularType::Union(union) => {
				let idx = r.read_long()?;
				let variant = usize::try_from(idx)
					.ok()
					.and_then(|idx| union.variants.get(idx))
					.ok_or(DecodeError::UnionIndexOutOfRange(idx))?;
				self.decode_node(*variant, r)
			}
		}
	}

	fn check_block_len(&self, count: i64) -> Result<(), DecodeError> {
		if count < 0 || count as u64 > self.config.max_block_bytes as u64 {
			return Err(DecodeError::LengthLimit(count, self.config.max_block_bytes));
		}
		Ok(())
	}
}

/// Decodes a two's-complement big-endian unscaled integer (Avro's `decimal`
/// wire representation) into a [`rust_decimal::Decimal`]. Returns `None` if
/// the value doesn't fit (more than 16 significant bytes, or `scale > 28`).
fn decimal_from_unscaled_bytes(bytes: &[u8], scale: u32) -> Option<rust_decimal::Decimal> {
	if bytes.is_empty() || bytes.len() > 16 || scale > 28 {
		return None;
	}
	let negative = bytes[0] & 0x80 != 0;
	let mut buf = [if negative { 0xFFu8 } else { 0x00 }; 16];
	let start = 16 - bytes.len();
	buf[start..].copy_from_slice(bytes);
	let unscaled = i128::from_be_bytes(buf);
	Some(rust_decimal::Decimal::from_i128_with_scale(unscaled, scale))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn decode(schema_json: &str, bytes: &[u8]) -> AvroValue {
		let schema = Schema::parse_str(schema_json).unwrap();
		let decoder = compile_decoder(&schema, DecoderConfig::default());
		decoder.decode(bytes).unwrap().0
	}

	#[test]
	fn decodes_long() {
		assert_eq!(decode(r#""long""#, &[1]), AvroValue::Long(-1));
	}

	#[test]
	fn decodes_string() {
		assert_eq!(
			decode(r#""string""#, &[6, b'f', b'o', b'o']),
			AvroValue::String("foo".to_owned())
		);
	}

	#[test]
	fn decodes_array_of_ints() {
		let bytes = [2, 2, 4, 0];
		assert_eq!(
			decode(r#"{"type":"array","items":"int"}"#, &bytes),
			AvroValue::Array(vec![AvroValue::Int(1), AvroValue::Int(2)])
		);
	}

	#[test]
	fn rejects_out_of_range_union_index() {
		let schema = Schema::parse_str(r#"["null","int"]"#).unwrap();
		let decoder = compile_decoder(&schema, DecoderConfig::default());
		let err = decoder.decode(&[4]).unwrap_err();
		assert!(matches!(err, DecodeError::UnionIndexOutOfRange(2)));
	}

	#[test]
	fn enforces_max_block_bytes_on_array_length() {
		let schema = Schema::parse_str(r#"{"type":"array","items":"int"}"#).unwrap();
		let decoder = compile_decoder(
			&schema,
			DecoderConfig {
				max_block_bytes: 1,
				..DecoderConfig::default()
			},
		);
		// Block count of 5, exceeding the configured limit of 1.
		let bytes = [10];
		let err = decoder.decode(&bytes).unwrap_err();
		assert!(matches!(err, DecodeError::LengthLimit(5, 1)));
	}
}
