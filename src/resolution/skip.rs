//! Discards a writer-only record field's bytes without building an
//! [`AvroValue`](crate::value::AvroValue) for it.

use crate::codec::primitives::Reader;
use crate::codec::DecodeError;
use crate::schema::{RegularType, Schema, SchemaKey};

pub(super) fn skip_value(
	writer: &Schema,
	key: SchemaKey,
	r: &mut Reader,
	max_block_bytes: usize,
) -> Result<(), DecodeError> {
	let node = writer.node(key);
	// A logical type annotation never changes the wire size of its
	// underlying type, so skipping only ever needs to look at `type_`.
	match &node.type_ {
		RegularType::Null => Ok(()),
		RegularType::Boolean => r.read_boolean().map(drop),
		RegularType::Int => r.read_int().map(drop),
		RegularType::Long => r.read_long().map(drop),
		RegularType::Float => r.read_float().map(drop),
		RegularType::Double => r.read_double().map(drop),
		RegularType::Bytes => r.read_bytes(max_block_bytes).map(drop),
		RegularType::String => r.read_string(max_block_bytes).map(drop),
		RegularType::Fixed(fixed) => r.read_exact(fixed.size).map(drop),
		RegularType::Enum(_) => r.read_long().map(drop),
		RegularType::Array(array) => {
			loop {
				let (count, _) = r.read_block_header()?;
				if count == 0 {
					break;
				}
				for _ in 0..count {
					skip_value(writer, array.items, r, max_block_bytes)?;
				}
			}
			Ok(())
		}
		RegularType::Map(map) => {
			loop {
				let (count, _) = r.read_block_header()?;
				if count == 0 {
					break;
				}
				for _ in 0..count {
					r.read_string(max_block_bytes)?;
					skip_value(writer, map.values, r, max_block_bytes)?;
				}
			}
			Ok(())
		}
		RegularType::Record(record) => {
			for field in &record.fields {
				skip_value(writer, field.type_, r, max_block_bytes)?;
			}
			Ok(())
		}
		RegularType::Union(union) => {
			let idx = r.read_long()?;
			let variant = usize::try_from(idx)
				.ok()
				.and_then(|idx| union.variants.get(idx))
				.ok_or(DecodeError::UnionIndexOutOfRange(idx))?;
			skip_value(writer, *variant, r, max_block_bytes)
		}
	}
}
