use super::{error::EncodeError, primitives::Writer, EncoderConfig};
use crate::schema::{LogicalType, RegularType, Schema, SchemaKey};
use crate::value::AvroValue;

/// Compiles `schema` into a reusable [`Encoder`].
///
/// "Compiling" here means holding on to a borrow of the already-parsed,
/// already-named-resolved [`Schema`]: all of the per-schema work (JSON
/// parsing, name resolution) already happened when the [`Schema`] was built,
/// so each [`Encoder::encode`] call only ever walks the schema's arena of
/// nodes, never reparses anything.
pub fn compile_encoder(schema: &Schema, config: EncoderConfig) -> Encoder<'_> {
	Encoder { schema, config }
}

/// An encoder specialized against a particular [`Schema`].
///
/// Borrows the schema so it can be reused across many [`encode`](Self::encode)
/// calls without recompiling.
pub struct Encoder<'s> {
	schema: &'s Schema,
	config: EncoderConfig,
}

impl<'s> Encoder<'s> {
	/// Encodes `value` as an Avro "datum" (raw binary, no framing) into
	/// `writer`, per this encoder's schema.
	pub fn encode<W: std::io::Write>(&self, value: &AvroValue, writer: &mut W) -> Result<(), EncodeError> {
		let mut w = Writer::new(writer);
		self.encode_node(value, self.schema.root(), &mut w)
	}

	fn encode_node<W: std::io::Write>(
		&self,
		value: &AvroValue,
		key: SchemaKey,
		w: &mut Writer<W>,
	) -> Result<(), EncodeError> {
		let node = self.schema.node(key);
		if let Some(logical_type) = &node.logical_type {
			return self.encode_logical(value, logical_type, &node.type_, w);
		}
		self.encode_regular(value, &node.type_, w)
	}

	fn encode_logical<W: std::io::Write>(
		&self,
		value: &AvroValue,
		logical_type: &LogicalType,
		underlying: &RegularType,
		w: &mut Writer<W>,
	) -> Result<(), EncodeError> {
		match (value, logical_type) {
			(AvroValue::Decimal(d), LogicalType::Decimal(decimal)) => {
				let bytes = decimal_to_unscaled_bytes(*d, decimal.scale);
				self.encode_bytes_like(&bytes, underlying, w)
			}
			(AvroValue::Uuid(s), LogicalType::Uuid) => w.write_bytes(s.as_bytes()).map_err(Into::into),
			(AvroValue::Date(days), LogicalType::Date) => w.write_int(*days).map_err(Into::into),
			(AvroValue::TimeMillis(ms), LogicalType::TimeMillis) => w.write_int(*ms).map_err(Into::into),
			(AvroValue::TimeMicros(us), LogicalType::TimeMicros) => w.write_long(*us).map_err(Into::into),
			(AvroValue::TimestampMillis(ms), LogicalType::TimestampMillis) => {
				w.write_long(*ms).map_err(Into::into)
			}
			(AvroValue::TimestampMicros(us), LogicalType::TimestampMicros) => {
				w.write_long(*us).map_err(Into::into)
			}
			// A value constructed without going through the logical-type
			// variant still encodes fine against the underlying type.
			_ => self.encode_regular(value, underlying, w),
		}
	}

	fn encode_bytes_like<W: std::io::Write>(
		&self,
		bytes: &[u8],
		underlying: &RegularType,
		w: &mut Writer<W>,
	) -> Result<(), EncodeError> {
		match underlying {
			RegularType::Bytes => w.write_bytes(bytes).map_err(Into::into),
			RegularType::Fixed(fixed) => {
				if bytes.len() != fixed.size {
					return Err(EncodeError::FixedLengthMismatch {
						expected: fixed.size,
						actual: bytes.len(),
					});
				}
				w.inner.write_all(bytes).map_err(Into::into)
			}
			_ => Err(EncodeError::ValueShapeMismatch),
		}
	}

	fn encode_regular<W: std::io::Write>(
		&self,
		value: &AvroValue,
		type_: &RegularType,
		w: &mut Writer<W>,
	) -> Result<(), EncodeError> {
		match (value, type_) {
			(AvroValue::Null, RegularType::Null) => Ok(()),
			(AvroValue::Boolean(b), RegularType::Boolean) => w.write_boolean(*b).map_err(Into::into),
			(AvroValue::Int(v), RegularType::Int) => w.write_int(*v).map_err(Into::into),
			(AvroValue::Long(v), RegularType::Long) => w.write_long(*v).map_err(Into::into),
			(AvroValue::Float(v), RegularType::Float) => w.write_float(*v).map_err(Into::into),
			(AvroValue::Double(v), RegularType::Double) => w.write_double(*v).map_err(Into::into),
			(AvroValue::Bytes(b), RegularType::Bytes) => w.write_bytes(b).map_err(Into::into),
			(AvroValue::String(s), RegularType::String) => w.write_bytes(s.as_bytes()).map_err(Into::into),
			(AvroValue::Fixed(bytes), RegularType::Fixed(fixed)) => {
				self.encode_bytes_like(bytes, &RegularType::Fixed(fixed.clone()), w)
			}
			(AvroValue::Enum(symbol), RegularType::Enum(enum_)) => {
				let idx = enum_
					.symbols
					.iter()
					.position(|s| s == symbol)
					.ok_or_else(|| EncodeError::UnknownEnumSymbol(symbol.clone()))?;
				w.write_int(idx as i32).map_err(Into::into)
			}
			(AvroValue::Array(items), RegularType::Array(array)) => {
				if !items.is_empty() {
					w.write_block_header(items.len() as i64)?;
					for item in items {
						self.encode_node(item, array.items, w)?;
					}
				}
				w.write_block_header(0).map_err(Into::into)
			}
			(AvroValue::Map(entries), RegularType::Map(map)) => {
				if !entries.is_empty() {
					w.write_block_header(entries.len() as i64)?;
					for (k, v) in entries {
						w.write_bytes(k.as_bytes())?;
						self.encode_node(v, map.values, w)?;
					}
				}
				w.write_block_header(0).map_err(Into::into)
			}
			(AvroValue::Record(fields), RegularType::Record(record)) => {
				for schema_field in &record.fields {
					match fields.iter().find(|(name, _)| *name == schema_field.name) {
						Some((_, field_value)) => self.encode_node(field_value, schema_field.type_, w)?,
						None => match &schema_field.default {
							Some(default) => self.encode_node(default, schema_field.type_, w)?,
							None if !self.config.strict_union_match && self.has_null_branch(schema_field.type_) => {
								// Permissive deviation: a missing union-typed field with
								// no declared default and a `null` branch silently
								// encodes `null` rather than erroring.
								self.encode_node(&AvroValue::Null, schema_field.type_, w)?
							}
							None => return Err(EncodeError::MissingField(schema_field.name.clone())),
						},
					}
				}
				Ok(())
			}
			(value, RegularType::Union(union)) => {
				let branch = value
					.select_union_branch(self.schema, &union.variants)
					.ok_or(EncodeError::NoUnionBranch)?;
				w.write_long(branch as i64)?;
				let inner = match value {
					AvroValue::Union(inner) => inner,
					other => other,
				};
				self.encode_node(inner, union.variants[branch], w)
			}
			_ => Err(EncodeError::ValueShapeMismatch),
		}
	}

	/// Whether the schema node at `key` is a union with a `null` branch.
	fn has_null_branch(&self, key: SchemaKey) -> bool {
		match &self.schema.node(key).type_ {
			RegularType::Union(union) => union
				.variants
				.iter()
				.any(|&variant| matches!(self.schema.node(variant).type_, RegularType::Null)),
			_ => false,
		}
	}
}

/// Encodes a [`rust_decimal::Decimal`] as the two's-complement big-endian
/// unscaled integer representation Avro's `decimal` logical type uses.
fn decimal_to_unscaled_bytes(d: rust_decimal::Decimal, scale: u32) -> Vec<u8> {
	let mut d = d;
	d.rescale(scale);
	let unscaled = d.mantissa();
	let negative = unscaled < 0;
	let mut bytes = unscaled.abs().to_be_bytes().to_vec();
	while bytes.len() > 1 && bytes[0] == 0 {
		bytes.remove(0);
	}
	if negative {
		// two's complement negate
		let mut carry = true;
		for b in bytes.iter_mut().rev() {
			*b = !*b;
			if carry {
				let (v, overflow) = b.overflowing_add(1);
				*b = v;
				carry = overflow;
			}
		}
	}
	// Ensure the sign bit of the first byte matches the sign of the value.
	let sign_bit_set = bytes.first().is_some_and(|b| b & 0x80 != 0);
	if negative != sign_bit_set {
		bytes.insert(0, if negative { 0xFF } else { 0x00 });
	}
	bytes
}

#[cfg(test)]
mod tests {
	use super::*;

	fn encode(schema_json: &str, value: &AvroValue) -> Vec<u8> {
		let schema = Schema::parse_str(schema_json).unwrap();
		let encoder = compile_encoder(&schema, EncoderConfig::default());
		let mut buf = Vec::new();
		encoder.encode(value, &mut buf).unwrap();
		buf
	}

	#[test]
	fn encodes_long() {
		assert_eq!(encode(r#""long""#, &AvroValue::Long(-1)), vec![1]);
	}

	#[test]
	fn encodes_string() {
		assert_eq!(
			encode(r#""string""#, &AvroValue::String("foo".to_owned())),
			vec![6, b'f', b'o', b'o']
		);
	}

	#[test]
	fn encodes_record_by_field_name_regardless_of_value_order() {
		let schema = r#"{"type":"record","name":"P","fields":[
			{"name":"x","type":"int"},{"name":"y","type":"int"}
		]}"#;
		let value = AvroValue::Record(vec![
			("y".to_owned(), AvroValue::Int(2)),
			("x".to_owned(), AvroValue::Int(1)),
		]);
		assert_eq!(encode(schema, &value), vec![2, 4]);
	}

	#[test]
	fn encodes_union_branch_index_then_payload() {
		let value = AvroValue::Int(5);
		assert_eq!(encode(r#"["null","int"]"#, &value), vec![2, 10]);
	}
}
