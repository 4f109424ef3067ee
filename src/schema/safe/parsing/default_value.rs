//! Converts a JSON `default` literal (as found on a record field) into an
//! [`AvroValue`], guided by the already-registered schema node it is a
//! default for.

use super::super::{LogicalType, RegularType, SchemaKey, SchemaNode};
use crate::schema::error::ErrorKind;
use crate::schema::SchemaError;
use crate::value::AvroValue;

use serde_json::Value as Json;

pub(super) fn json_default_to_avro_value(
	json: &Json,
	nodes: &[SchemaNode],
	key: SchemaKey,
) -> Result<AvroValue, SchemaError> {
	let node = &nodes[key.idx()];
	if let Some(logical_type) = &node.logical_type {
		return logical_default(json, logical_type, &node.type_);
	}
	regular_default(json, nodes, &node.type_)
}

fn bad_default(msg: impl std::fmt::Display) -> SchemaError {
	SchemaError::of_kind(ErrorKind::BadDefault, msg)
}

fn regular_default(
	json: &Json,
	nodes: &[SchemaNode],
	type_: &RegularType,
) -> Result<AvroValue, SchemaError> {
	Ok(match (json, type_) {
		(Json::Null, RegularType::Null) => AvroValue::Null,
		(Json::Bool(b), RegularType::Boolean) => AvroValue::Boolean(*b),
		(Json::Number(n), RegularType::Int) => AvroValue::Int(
			n.as_i64()
				.and_then(|v| i32::try_from(v).ok())
				.ok_or_else(|| bad_default("default for `int` is not a valid 32-bit integer"))?,
		),
		(Json::Number(n), RegularType::Long) => AvroValue::Long(
			n.as_i64()
				.ok_or_else(|| bad_default("default for `long` is not a valid 64-bit integer"))?,
		),
		(Json::Number(n), RegularType::Float) => AvroValue::Float(
			n.as_f64()
				.ok_or_else(|| bad_default("default for `float` is not a number"))? as f32,
		),
		(Json::Number(n), RegularType::Double) => AvroValue::Double(
			n.as_f64()
				.ok_or_else(|| bad_default("default for `double` is not a number"))?,
		),
		(Json::String(s), RegularType::Bytes) => AvroValue::Bytes(latin1_bytes(s)?),
		(Json::String(s), RegularType::String) => AvroValue::String(s.clone()),
		(Json::String(s), RegularType::Fixed(fixed)) => {
			let bytes = latin1_bytes(s)?;
			if bytes.len() != fixed.size {
				return Err(bad_default(format_args!(
					"fixed default has {} bytes, expected {}",
					bytes.len(),
					fixed.size
				)));
			}
			AvroValue::Fixed(bytes)
		}
		(Json::String(s), RegularType::Enum(enum_)) => {
			if !enum_.symbols.iter().any(|sym| sym == s) {
				return Err(bad_default(format_args!(
					"enum default `{s}` is not one of its symbols"
				)));
			}
			AvroValue::Enum(s.clone())
		}
		(Json::Array(items), RegularType::Array(array)) => AvroValue::Array(
			items
				.iter()
				.map(|item| json_default_to_avro_value(item, nodes, array.items))
				.collect::<Result<_, _>>()?,
		),
		(Json::Object(entries), RegularType::Map(map)) => AvroValue::Map(
			entries
				.iter()
				.map(|(k, v)| Ok((k.clone(), json_default_to_avro_value(v, nodes, map.values)?)))
				.collect::<Result<_, SchemaError>>()?,
		),
		(Json::Object(entries), RegularType::Record(record)) => AvroValue::Record(
			record
				.fields
				.iter()
				.map(|field| {
					let value = match entries.get(&field.name) {
						Some(json) => json_default_to_avro_value(json, nodes, field.type_)?,
						None => field
							.default
							.clone()
							.ok_or_else(|| bad_default(format_args!("missing default for field `{}`", field.name)))?,
					};
					Ok((field.name.clone(), value))
				})
				.collect::<Result<_, SchemaError>>()?,
		),
		// The Avro specification requires a union default to be the JSON
		// representation of its *first* branch; this core relaxes that and
		// accepts a default that matches any branch, trying them in
		// declaration order and keeping the first that parses.
		(json, RegularType::Union(union)) => {
			let mut last_err = None;
			let mut parsed = None;
			for &variant in &union.variants {
				match json_default_to_avro_value(json, nodes, variant) {
					Ok(value) => {
						parsed = Some(value);
						break;
					}
					Err(e) => last_err = Some(e),
				}
			}
			match parsed {
				Some(value) => AvroValue::Union(Box::new(value)),
				None => return Err(last_err.unwrap_or_else(|| bad_default("union has no branches"))),
			}
		}
		(json, type_) => {
			return Err(bad_default(format_args!(
				"default value {json} does not match its schema ({type_:?})"
			)))
		}
	})
}

fn logical_default(
	json: &Json,
	logical_type: &LogicalType,
	_underlying: &RegularType,
) -> Result<AvroValue, SchemaError> {
	Ok(match logical_type {
		LogicalType::Decimal(decimal) => {
			let bytes = match json {
				Json::String(s) => latin1_bytes(s)?,
				_ => return Err(bad_default("decimal default must be a byte string")),
			};
			AvroValue::Decimal(decimal_from_unscaled_bytes(&bytes, decimal.scale)?)
		}
		LogicalType::Uuid => match json {
			Json::String(s) => AvroValue::Uuid(s.clone()),
			_ => return Err(bad_default("uuid default must be a string")),
		},
		LogicalType::Date => AvroValue::Date(json_i32(json, "date")?),
		LogicalType::TimeMillis => AvroValue::TimeMillis(json_i32(json, "time-millis")?),
		LogicalType::TimeMicros => AvroValue::TimeMicros(json_i64(json, "time-micros")?),
		LogicalType::TimestampMillis => AvroValue::TimestampMillis(json_i64(json, "timestamp-millis")?),
		LogicalType::TimestampMicros => AvroValue::TimestampMicros(json_i64(json, "timestamp-micros")?),
	})
}

fn json_i32(json: &Json, logical_type_name: &str) -> Result<i32, SchemaError> {
	json.as_i64()
		.and_then(|v| i32::try_from(v).ok())
		.ok_or_else(|| bad_default(format_args!("{logical_type_name} default is not a valid i32")))
}

fn json_i64(json: &Json, logical_type_name: &str) -> Result<i64, SchemaError> {
	json.as_i64()
		.ok_or_else(|| bad_default(format_args!("{logical_type_name} default is not a valid i64")))
}

/// Avro bytes/fixed defaults are represented in JSON as a string whose code
/// points are each a single byte value (0-255).
fn latin1_bytes(s: &str) -> Result<Vec<u8>, SchemaError> {
	s.chars()
		.map(|c| {
			u8::try_from(c as u32)
				.map_err(|_| bad_default("byte-string default contains a non-latin1 character"))
		})
		.collect()
}

/// Decodes a two's-complement big-endian unscaled integer (the `decimal`
/// logical type's wire and default representation) into a
/// [`rust_decimal::Decimal`] at the given scale.
fn decimal_from_unscaled_bytes(bytes: &[u8], scale: u32) -> Result<rust_decimal::Decimal, SchemaError> {
	if bytes.is_empty() {
		return Ok(rust_decimal::Decimal::new(0, scale.min(28)));
	}
	let negative = bytes[0] & 0x80 != 0;
	let mut unscaled: i128 = if negative { -1 } else { 0 };
	for &b in bytes {
		unscaled = unscaled
			.checked_shl(8)
			.ok_or_else(|| bad_default("decimal default unscaled value overflows 128 bits"))?
			| b as i128;
	}
	Ok(rust_decimal::Decimal::from_i128_with_scale(
		unscaled,
		scale.min(28),
	))
}
