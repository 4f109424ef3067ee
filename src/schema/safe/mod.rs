//! The editable, arena-based representation of a schema, used while parsing
//! and name resolution are in progress.

mod canonical_form;
mod check_for_cycles;
mod parsing;
mod rabin;
mod to_json;

use super::{Decimal, Fixed, Name};

pub use check_for_cycles::UnconditionalCycle;

/// An editable representation of an Avro schema
///
/// References to other nodes are represented as [`SchemaKey`], which index
/// into this same arena. A tree is not sufficient to represent Avro schemas in
/// general, because named types may recur (a record may reference itself, or
/// reference a sibling type defined earlier in the same schema), so this is a
/// graph instead, addressed by index rather than by pointer so it stays
/// entirely safe.
#[derive(Clone, Debug)]
pub struct SchemaMut {
	// First node in the array is considered to be the root
	nodes: Vec<SchemaNode>,
	schema_json: Option<String>,
}

impl SchemaMut {
	/// The underlying graph storage. The first node (index `0`) is the root.
	pub fn nodes(&self) -> &[SchemaNode] {
		&self.nodes
	}

	/// The underlying graph storage, mutably.
	///
	/// This loses the original JSON: if it is needed again it will be
	/// re-serialized from the nodes, which loses anything this crate doesn't
	/// itself store (unrecognized extra JSON properties).
	pub fn nodes_mut(&mut self) -> &mut Vec<SchemaNode> {
		self.schema_json = None;
		&mut self.nodes
	}

	/// The root node of the schema (the first element of `nodes`).
	///
	/// # Panics
	/// If `nodes` is empty. Parsing never produces an empty `SchemaMut`; this
	/// can only happen after [`nodes_mut`](Self::nodes_mut) has been used to
	/// remove every node.
	pub fn root(&self) -> &SchemaNode {
		self.nodes
			.first()
			.expect("SchemaMut should have at least one node")
	}

	/// Build a [`SchemaMut`] directly from a set of nodes. The first node
	/// (index `0`) becomes the root.
	pub fn from_nodes(nodes: Vec<SchemaNode>) -> Self {
		Self {
			nodes,
			schema_json: None,
		}
	}

	/// Freeze this [`SchemaMut`] into a [`super::Schema`], checking for
	/// unconditional cycles and computing the schema's fingerprint.
	pub fn freeze(self) -> Result<super::Schema, super::SchemaError> {
		self.try_into()
	}

	/// Get the node at the given key, or `None` if it doesn't exist.
	pub fn get(&self, key: SchemaKey) -> Option<&SchemaNode> {
		self.nodes.get(key.idx)
	}

	pub(super) fn json(&self) -> Option<&str> {
		self.schema_json.as_deref()
	}
}

/// The location of a node in a [`SchemaMut`] (or in a frozen
/// [`Schema`](super::Schema), which shares the same indexing).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SchemaKey {
	idx: usize,
}

impl SchemaKey {
	/// Build a [`SchemaKey`] from a raw index into the `nodes` array.
	pub const fn from_idx(idx: usize) -> Self {
		Self { idx }
	}

	/// The raw index into the `nodes` array that this key points to.
	pub const fn idx(self) -> usize {
		self.idx
	}

	/// The key of the root of the schema: always index `0`.
	pub const fn root() -> Self {
		Self { idx: 0 }
	}
}

impl std::fmt::Debug for SchemaKey {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		std::fmt::Debug::fmt(&self.idx, f)
	}
}

impl std::ops::Index<SchemaKey> for SchemaMut {
	type Output = SchemaNode;
	fn index(&self, key: SchemaKey) -> &Self::Output {
		&self.nodes[key.idx]
	}
}

/// A node of an Avro schema, stored in a [`SchemaMut`] (and later in a frozen
/// [`Schema`](super::Schema)).
#[derive(Clone, Debug)]
pub struct SchemaNode {
	/// The underlying type of this node.
	pub type_: RegularType,
	/// The logical type this node is annotated with, if any, and if it was
	/// recognized.
	///
	/// An unrecognized `logicalType` attribute is not an error: per the Avro
	/// specification, readers must ignore logical type annotations they don't
	/// understand and fall back to the underlying type. So there is no
	/// `LogicalType::Unknown` variant here, unlike in some other
	/// implementations: an unrecognized annotation simply never becomes a
	/// `Some` here in the first place.
	pub logical_type: Option<LogicalType>,
}

impl SchemaNode {
	/// Build a node with no logical type annotation.
	pub fn new(type_: RegularType) -> Self {
		type_.into()
	}

	/// Build a node with a logical type annotation.
	pub fn with_logical_type(type_: RegularType, logical_type: LogicalType) -> Self {
		Self {
			type_,
			logical_type: Some(logical_type),
		}
	}
}

/// A primitive or complex type, stored in a [`SchemaNode`].
#[derive(Clone, Debug)]
pub enum RegularType {
	Null,
	Boolean,
	Int,
	Long,
	Float,
	Double,
	Bytes,
	String,
	Array(Array),
	Map(Map),
	Union(Union),
	Record(Record),
	Enum(Enum),
	Fixed(Fixed),
}

impl RegularType {
	/// If this is a named type (record, enum or fixed), its name.
	pub fn name(&self) -> Option<&Name> {
		match self {
			RegularType::Record(record) => Some(&record.name),
			RegularType::Enum(enum_) => Some(&enum_.name),
			RegularType::Fixed(fixed) => Some(&fixed.name),
			_ => None,
		}
	}

	/// If this is a named type (record, enum or fixed), its name, mutably.
	pub fn name_mut(&mut self) -> Option<&mut Name> {
		match self {
			RegularType::Record(record) => Some(&mut record.name),
			RegularType::Enum(enum_) => Some(&mut enum_.name),
			RegularType::Fixed(fixed) => Some(&mut fixed.name),
			_ => None,
		}
	}
}

/// Component of a [`SchemaMut`]: an Avro `array`.
#[derive(Clone, Debug)]
pub struct Array {
	/// The key of the schema of each element of the array.
	pub items: SchemaKey,
}

/// Component of a [`SchemaMut`]: an Avro `map` (keys are always strings).
#[derive(Clone, Debug)]
pub struct Map {
	/// The key of the schema of each value in the map.
	pub values: SchemaKey,
}

/// Component of a [`SchemaMut`]: an Avro `union`.
#[derive(Clone, Debug)]
pub struct Union {
	/// The keys of the schemas of each branch of the union, in declaration
	/// order. Branch selection (by either the encoder or the validator) walks
	/// this list and takes the first structurally-matching branch.
	pub variants: Vec<SchemaKey>,
}

/// Component of a [`SchemaMut`]: an Avro `record`.
#[derive(Clone, Debug)]
pub struct Record {
	pub name: Name,
	pub aliases: Vec<Name>,
	pub doc: Option<String>,
	pub fields: Vec<RecordField>,
}

/// A field of a [`Record`].
#[derive(Clone, Debug)]
pub struct RecordField {
	pub name: String,
	/// Alternate names that a writer schema's field may be matched against
	/// during schema resolution.
	pub aliases: Vec<String>,
	pub doc: Option<String>,
	/// Position of this field in declaration order; record values are always
	/// encoded/decoded in this order, never by name.
	pub position: usize,
	pub type_: SchemaKey,
	/// The field's default value, used when a reader schema has a field that
	/// is absent from the writer schema.
	pub default: Option<crate::value::AvroValue>,
	pub order: FieldOrder,
}

/// The `order` attribute of a record field, used for sort-order comparisons.
/// This crate does not implement record comparison itself, but preserves the
/// attribute for callers that do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FieldOrder {
	#[default]
	Ascending,
	Descending,
	Ignore,
}

/// Component of a [`SchemaMut`]: an Avro `enum`.
#[derive(Clone, Debug)]
pub struct Enum {
	pub name: Name,
	pub aliases: Vec<Name>,
	pub doc: Option<String>,
	pub symbols: Vec<String>,
	/// The symbol to use as a substitute when a resolved decoder encounters a
	/// writer symbol unknown to the reader schema.
	pub default: Option<String>,
}

/// A recognized Avro logical type annotation.
///
/// Per the specification, a `logicalType` attribute that this crate doesn't
/// recognize is silently ignored and the underlying type is used as-is, so
/// there is no "unknown" variant here.
#[derive(Clone, Copy, Debug)]
pub enum LogicalType {
	Decimal(Decimal),
	Uuid,
	Date,
	TimeMillis,
	TimeMicros,
	TimestampMillis,
	TimestampMicros,
}

impl LogicalType {
	/// The name used in schema JSON to refer to this logical type.
	pub fn as_str(&self) -> &'static str {
		match self {
			LogicalType::Decimal(_) => "decimal",
			LogicalType::Uuid => "uuid",
			LogicalType::Date => "date",
			LogicalType::TimeMillis => "time-millis",
			LogicalType::TimeMicros => "time-micros",
			LogicalType::TimestampMillis => "timestamp-millis",
			LogicalType::TimestampMicros => "timestamp-micros",
		}
	}
}

impl From<RegularType> for SchemaNode {
	fn from(type_: RegularType) -> Self {
		Self {
			type_,
			logical_type: None,
		}
	}
}

macro_rules! impl_froms_for_regular_type {
	($($variant: ident)*) => {
		$(
			impl From<$variant> for RegularType {
				fn from(variant: $variant) -> Self {
					Self::$variant(variant)
				}
			}
			impl From<$variant> for SchemaNode {
				fn from(variant: $variant) -> Self {
					Self {
						type_: RegularType::$variant(variant),
						logical_type: None,
					}
				}
			}
		)*
	};
}
impl_froms_for_regular_type! { Array Map Union Record Enum Fixed }
