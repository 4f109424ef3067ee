//! The value model (component C2's subject matter) and the validator.
//!
//! [`AvroValue`] is an explicit tagged representation of any value that an
//! Avro schema can describe. The encoder consumes it, the resolved decoder
//! produces it, and [`AvroValue::validates_against`] is the single routine
//! that both the encoder (to pick a union branch) and the resolution planner
//! (to match a writer value against reader union branches) rely on.

use std::collections::HashMap;

use crate::schema::{LogicalType, RegularType, Schema, SchemaKey, SchemaNode};

/// Any value describable by an Avro schema.
///
/// Logical types that this crate recognizes are lifted into their own
/// variants ([`Decimal`](AvroValue::Decimal), [`Uuid`](AvroValue::Uuid),
/// [`Date`](AvroValue::Date), ...) rather than left as their underlying
/// representation, so that callers constructing values don't need to know
/// the encoding trick (e.g. that a `date` is encoded as a plain `int`).
#[derive(Clone, Debug, PartialEq)]
pub enum AvroValue {
	Null,
	Boolean(bool),
	Int(i32),
	Long(i64),
	Float(f32),
	Double(f64),
	Bytes(Vec<u8>),
	String(String),
	/// A `fixed` value. The byte length is validated against the schema at
	/// encode time, not carried here.
	Fixed(Vec<u8>),
	/// An enum value, represented by its symbol.
	Enum(String),
	/// The payload of a union: the value of whichever branch matched. The
	/// branch itself is implicit at the Rust level; the branch index is
	/// recovered at encode time by re-running [`validates_against`] against
	/// each candidate in turn.
	///
	/// [`validates_against`]: AvroValue::validates_against
	Union(Box<AvroValue>),
	Array(Vec<AvroValue>),
	Map(HashMap<String, AvroValue>),
	/// A record value, as a vector of `(field name, value)` pairs. Order does
	/// not need to match declaration order; the encoder looks fields up by
	/// name.
	Record(Vec<(String, AvroValue)>),
	/// `decimal` logical type, annotating `bytes` or `fixed`.
	Decimal(rust_decimal::Decimal),
	/// `uuid` logical type, annotating `string`.
	Uuid(String),
	/// `date` logical type: days since the Unix epoch, annotating `int`.
	Date(i32),
	/// `time-millis` logical type: milliseconds after midnight, annotating
	/// `int`.
	TimeMillis(i32),
	/// `time-micros` logical type: microseconds after midnight, annotating
	/// `long`.
	TimeMicros(i64),
	/// `timestamp-millis` logical type: milliseconds since the Unix epoch,
	/// annotating `long`.
	TimestampMillis(i64),
	/// `timestamp-micros` logical type: microseconds since the Unix epoch,
	/// annotating `long`.
	TimestampMicros(i64),
}

impl AvroValue {
	/// Structural, shallow validation of this value against a schema node.
	///
	/// This does not attempt promotion (that is the resolution planner's
	/// job): it checks that the value's shape matches what the schema
	/// describes, recursing into composite types, but does not deeply
	/// validate e.g. that every record field is present with exactly the
	/// right type beyond one level of structural agreement - nested
	/// composites get the same shallow treatment as they're visited.
	///
	/// Union branch selection uses this: the first variant a value validates
	/// against is the branch taken. This is also why validation is shallow -
	/// it must stay cheap enough to run once per candidate branch.
	pub fn validates_against(&self, schema: &Schema, key: SchemaKey) -> bool {
		if let AvroValue::Union(inner) = self {
			// A union-typed value may be represented either by its unwrapped
			// payload or, as the resolution planner's decode side produces,
			// wrapped in `Union`: either representation validates the same way.
			return inner.validates_against(schema, key);
		}
		let node = schema.node(key);
		if let Some(logical_type) = &node.logical_type {
			return self.validates_against_logical(logical_type, &node.type_);
		}
		self.validates_against_regular(schema, &node.type_)
	}

	fn validates_against_logical(&self, logical_type: &LogicalType, underlying: &RegularType) -> bool {
		match (self, logical_type) {
			(AvroValue::Decimal(_), LogicalType::Decimal(_)) => {
				matches!(underlying, RegularType::Bytes | RegularType::Fixed(_))
			}
			(AvroValue::Uuid(_), LogicalType::Uuid) => matches!(underlying, RegularType::String),
			(AvroValue::Date(_), LogicalType::Date) => matches!(underlying, RegularType::Int),
			(AvroValue::TimeMillis(_), LogicalType::TimeMillis) => {
				matches!(underlying, RegularType::Int)
			}
			(AvroValue::TimeMicros(_), LogicalType::TimeMicros) => {
				matches!(underlying, RegularType::Long)
			}
			(AvroValue::TimestampMillis(_), LogicalType::TimestampMillis) => {
				matches!(underlying, RegularType::Long)
			}
			(AvroValue::TimestampMicros(_), LogicalType::TimestampMicros) => {
				matches!(underlying, RegularType::Long)
			}
			// A value constructed without going through the logical-type
			// variant (e.g. a plain `Int` for a `date`) is still valid: the
			// logical type is just an annotation on top of the wire format,
			// and the underlying types a logical type can annotate are
			// always leaves (never Array/Map/Record/...), so no schema
			// lookup is needed to check it.
			_ => matches!(
				(self, underlying),
				(AvroValue::Null, RegularType::Null)
					| (AvroValue::Boolean(_), RegularType::Boolean)
					| (AvroValue::Int(_), RegularType::Int)
					| (AvroValue::Long(_), RegularType::Long)
					| (AvroValue::Float(_), RegularType::Float)
					| (AvroValue::Double(_), RegularType::Double)
					| (AvroValue::Bytes(_), RegularType::Bytes)
					| (AvroValue::String(_), RegularType::String)
			) || matches!(
				(self, underlying),
				(AvroValue::Fixed(bytes), RegularType::Fixed(fixed)) if bytes.len() == fixed.size
			),
		}
	}

	fn validates_against_regular(&self, schema: &Schema, type_: &RegularType) -> bool {
		match (self, type_) {
			(AvroValue::Null, RegularType::Null) => true,
			(AvroValue::Boolean(_), RegularType::Boolean) => true,
			(AvroValue::Int(_), RegularType::Int) => true,
			(AvroValue::Long(_), RegularType::Long) => true,
			(AvroValue::Float(_), RegularType::Float) => true,
			(AvroValue::Double(_), RegularType::Double) => true,
			(AvroValue::Bytes(_), RegularType::Bytes) => true,
			(AvroValue::String(_), RegularType::String) => true,
			(AvroValue::Fixed(bytes), RegularType::Fixed(fixed)) => bytes.len() == fixed.size,
			(AvroValue::Enum(symbol), RegularType::Enum(enum_)) => {
				enum_.symbols.iter().any(|s| s == symbol)
			}
			(AvroValue::Array(values), RegularType::Array(array)) => values
				.iter()
				.all(|v| v.validates_against(schema, array.items)),
			(AvroValue::Map(entries), RegularType::Map(map)) => entries
				.values()
				.all(|v| v.validates_against(schema, map.values)),
			(AvroValue::Record(fields), RegularType::Record(record)) => {
				record.fields.len() == fields.len()
					&& record.fields.iter().all(|schema_field| {
						fields
							.iter()
							.find(|(name, _)| *name == schema_field.name)
							.is_some_and(|(_, value)| value.validates_against(schema, schema_field.type_))
					})
			}
			(value, RegularType::Union(union)) => union
				.variants
				.iter()
				.any(|&variant| value.validates_against(schema, variant)),
			_ => false,
		}
	}

	/// Find the index of the first union variant this value validates
	/// against.
	pub(crate) fn select_union_branch(&self, schema: &Schema, union_variants: &[SchemaKey]) -> Option<usize> {
		union_variants
			.iter()
			.position(|&variant| self.validates_against(schema, variant))
	}
}

pub(crate) fn node_is_union(node: &SchemaNode) -> bool {
	matches!(node.type_, RegularType::Union(_))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn validates_primitives() {
		let schema = Schema::parse_str(r#""long""#).unwrap();
		assert!(AvroValue::Long(42).validates_against(&schema, schema.root()));
		assert!(!AvroValue::Int(42).validates_against(&schema, schema.root()));
	}

	#[test]
	fn validates_fixed_by_length() {
		let schema = Schema::parse_str(r#"{"type":"fixed","name":"md5","size":16}"#).unwrap();
		assert!(AvroValue::Fixed(vec![0; 16]).validates_against(&schema, schema.root()));
		assert!(!AvroValue::Fixed(vec![0; 15]).validates_against(&schema, schema.root()));
	}

	#[test]
	fn validates_enum_symbol() {
		let schema =
			Schema::parse_str(r#"{"type":"enum","name":"Suit","symbols":["SPADES","HEARTS"]}"#)
				.unwrap();
		assert!(AvroValue::Enum("SPADES".to_owned()).validates_against(&schema, schema.root()));
		assert!(!AvroValue::Enum("CLUBS".to_owned()).validates_against(&schema, schema.root()));
	}

	#[test]
	fn union_first_match_wins() {
		let schema = Schema::parse_str(r#"["null","int","long"]"#).unwrap();
		let union_variants = match &schema.node(schema.root()).type_ {
			RegularType::Union(u) => u.variants.clone(),
			_ => unreachable!(),
		};
		// An Int validates against both "int" (idx 1) and, since the
		// validator only checks shape, not "long" (idx 2): first match wins.
		assert_eq!(
			AvroValue::Int(1).select_union_branch(&schema, &union_variants),
			Some(1)
		);
		assert_eq!(
			AvroValue::Null.select_union_branch(&schema, &union_variants),
			Some(0)
		);
	}

	#[test]
	fn validates_record_fields_by_name() {
		let schema = Schema::parse_str(
			r#"{"type":"record","name":"Point","fields":[
				{"name":"x","type":"int"},
				{"name":"y","type":"int"}
			]}"#,
		)
		.unwrap();
		let value = AvroValue::Record(vec![
			("x".to_owned(), AvroValue::Int(1)),
			("y".to_owned(), AvroValue::Int(2)),
		]);
		assert!(value.validates_against(&schema, schema.root()));
		let missing_field = AvroValue::Record(vec![("x".to_owned(), AvroValue::Int(1))]);
		assert!(!missing_field.validates_against(&schema, schema.root()));
	}
}
