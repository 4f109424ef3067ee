//! Schema resolution (component C5): compiles a `(writer, reader)` schema
//! pair into a [`Plan`] once, then lets a [`ResolvedDecoder`] interpret that
//! plan against wire bytes produced by the writer schema, emitting
//! [`AvroValue`]s shaped like the reader schema.

mod error;
mod plan;
mod skip;

pub use error::SchemaIncompatible;
pub use plan::{build_plan, Plan};

use std::collections::HashMap;

use plan::{FieldResolution, PlanKey, ReadStep, ResolutionAction};

use crate::codec::primitives::Reader;
use crate::codec::{DecodeError, DecoderConfig};
use crate::schema::Schema;
use crate::value::AvroValue;

/// Compiles a `(writer, reader)` schema pair into a [`ResolvedDecoder`].
pub fn compile_resolved_decoder<'s>(
	writer: &'s Schema,
	reader: &'s Schema,
	config: DecoderConfig,
) -> Result<ResolvedDecoder<'s>, SchemaIncompatible> {
	let plan = build_plan(writer, reader, config.strict_union_match)?;
	Ok(ResolvedDecoder { writer, plan, config })
}

/// A decoder that reads writer-schema-shaped bytes and produces
/// reader-schema-shaped [`AvroValue`]s.
pub struct ResolvedDecoder<'s> {
	writer: &'s Schema,
	plan: Plan,
	config: DecoderConfig,
}

impl<'s> ResolvedDecoder<'s> {
	pub fn decode(&self, bytes: &[u8]) -> Result<(AvroValue, usize), DecodeError> {
		let mut r = Reader::new(bytes);
		let value = self.decode_plan(self.plan.root(), &mut r)?;
		let consumed = bytes.len() - r.remaining().len();
		Ok((value, consumed))
	}

	fn decode_plan(&self, key: PlanKey, r: &mut Reader) -> Result<AvroValue, DecodeError> {
		match self.plan.action(key) {
			ResolutionAction::Null => Ok(AvroValue::Null),
			ResolutionAction::Boolean => Ok(AvroValue::Boolean(r.read_boolean()?)),
			ResolutionAction::Int => Ok(AvroValue::Int(r.read_int()?)),
			ResolutionAction::Long => Ok(AvroValue::Long(r.read_long()?)),
			ResolutionAction::Float => Ok(AvroValue::Float(r.read_float()?)),
			ResolutionAction::Double => Ok(AvroValue::Double(r.read_double()?)),
			ResolutionAction::Bytes => Ok(AvroValue::Bytes(r.read_bytes(self.config.max_block_bytes)?.to_vec())),
			ResolutionAction::String => Ok(AvroValue::String(
				r.read_string(self.config.max_block_bytes)?.to_owned(),
			)),
			ResolutionAction::IntToLong => Ok(AvroValue::Long(r.read_int()? as i64)),
			ResolutionAction::IntToFloat => Ok(AvroValue::Float(r.read_int()? as f32)),
			ResolutionAction::IntToDouble => Ok(AvroValue::Double(r.read_int()? as f64)),
			ResolutionAction::LongToFloat => Ok(AvroValue::Float(r.read_long()? as f32)),
			ResolutionAction::LongToDouble => Ok(AvroValue::Double(r.read_long()? as f64)),
			ResolutionAction::FloatToDouble => Ok(AvroValue::Double(r.read_float()? as f64)),
			ResolutionAction::StringToBytes => {
				Ok(AvroValue::Bytes(r.read_bytes(self.config.max_block_bytes)?.to_vec()))
			}
			ResolutionAction::BytesToString => {
				let bytes = r.read_bytes(self.config.max_block_bytes)?.to_vec();
				String::from_utf8(bytes)
					.map(AvroValue::String)
					.map_err(|e| DecodeError::InvalidUtf8(e.utf8_error()))
			}
			ResolutionAction::Fixed { size } => Ok(AvroValue::Fixed(r.read_exact(*size)?.to_vec())),
			ResolutionAction::Enum {
				writer_symbols,
				reader_symbols,
				reader_default,
			} => {
				let idx = r.read_long()?;
				let symbol = usize::try_from(idx)
					.ok()
					.and_then(|idx| writer_symbols.get(idx))
					.ok_or(DecodeError::EnumIndexOutOfRange(idx))?;
				if reader_symbols.iter().any(|s| s == symbol) {
					Ok(AvroValue::Enum(symbol.clone()))
				} else if let Some(default) = reader_default {
					Ok(AvroValue::Enum(default.clone()))
				} else {
					Err(DecodeError::RuntimeIncompatible(format!(
						"writer enum symbol `{symbol}` is not among the reader's symbols and the \
							reader enum has no default"
					)))
				}
			}
			ResolutionAction::Array { writer_item, item } => {
				let writer_item = *writer_item;
				let item = *item;
				let mut items = Vec::new();
				loop {
					let (count, _) = r.read_block_header()?;
					if count == 0 {
						break;
					}
					self.check_block_len(count)?;
					for _ in 0..count {
						items.push(self.decode_plan(item, r)?);
					}
				}
				let _ = writer_item;
				Ok(AvroValue::Array(items))
			}
			ResolutionAction::Map { writer_value, value } => {
				let writer_value = *writer_value;
				let value = *value;
				let mut entries = HashMap::new();
				loop {
					let (count, _) = r.read_block_header()?;
					if count == 0 {
						break;
					}
					self.check_block_len(count)?;
					for _ in 0..count {
						let key = r.read_string(self.config.max_block_bytes)?.to_owned();
						let decoded = self.decode_plan(value, r)?;
						entries.insert(key, decoded);
					}
				}
				let _ = writer_value;
				Ok(AvroValue::Map(entries))
			}
			ResolutionAction::Record { fields, read_order } => {
				// Reader-only defaulted fields need no wire read; seed them
				// up front, in reader declaration order.
				let mut out: Vec<Option<(String, AvroValue)>> = fields
					.iter()
					.map(|field| match field {
						FieldResolution::ReaderOnlyDefault { name, value } => Some((name.clone(), value.clone())),
						FieldResolution::Matched { .. } => None,
					})
					.collect();
				// Read the rest in the writer's on-the-wire order, whether or
				// not that matches the reader's declared order.
				for step in read_order {
					match step {
						ReadStep::Field { output_index } => {
							let (name, plan) = match &fields[*output_index] {
								FieldResolution::Matched { name, plan } => (name.clone(), *plan),
								_ => unreachable!("read_order only indexes matched fields"),
							};
							out[*output_index] = Some((name, self.decode_plan(plan, r)?));
						}
						ReadStep::Skip { writer_key } => {
							skip::skip_value(self.writer, *writer_key, r, self.config.max_block_bytes)?;
						}
					}
				}
				let out = out
					.into_iter()
					.map(|field| field.expect("every record field is read or defaulted"))
					.collect();
				Ok(AvroValue::Record(out))
			}
			ResolutionAction::UnionWriter { variants } => {
				let idx = r.read_long()?;
				let variant = usize::try_from(idx)
					.ok()
					.and_then(|idx| variants.get(idx))
					.copied()
					.ok_or(DecodeError::UnionIndexOutOfRange(idx))?;
				self.decode_plan(variant, r)
			}
			ResolutionAction::NonUnionWriterIntoUnionReader { inner, .. } => {
				let inner = *inner;
				Ok(AvroValue::Union(Box::new(self.decode_plan(inner, r)?)))
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
