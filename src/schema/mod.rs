//! Schema parsing and the name table (component C1)
//!
//! A schema starts life as JSON, goes through [`SchemaMut`] (an editable arena
//! of [`safe::SchemaNode`]s addressed by [`SchemaKey`]) while names are being
//! resolved, and is then frozen into a [`Schema`] for use by the rest of the
//! crate.

mod error;
pub mod safe;

pub use error::{ErrorKind, SchemaError};
pub use safe::{
	Array, Enum, FieldOrder, LogicalType, Map, Record, RecordField, RegularType, SchemaKey,
	SchemaMut, SchemaNode, Union,
};

/// A parsed, frozen schema, ready to drive an encoder, a decoder, or a
/// resolution plan.
///
/// Internally this is just a `Vec` of [`SchemaNode`]s, the first of which is
/// the root. Named types that recur (e.g. a record used twice, or a
/// recursive record) appear once in this array and are referred to elsewhere
/// via [`SchemaKey`].
#[derive(Clone, Debug)]
pub struct Schema {
	nodes: Vec<SchemaNode>,
	json: String,
	fingerprint: [u8; 8],
}

impl Schema {
	/// Parse a schema from its canonical JSON representation.
	pub fn parse_str(json: &str) -> Result<Self, SchemaError> {
		let schema_mut: SchemaMut = json.parse()?;
		schema_mut.try_into()
	}

	/// The key of the root node of the schema.
	pub fn root(&self) -> SchemaKey {
		SchemaKey::from_idx(0)
	}

	/// Look up a node by key.
	pub fn node(&self, key: SchemaKey) -> &SchemaNode {
		&self.nodes[key.idx()]
	}

	/// The minified JSON this schema was parsed from (or re-serialized to).
	pub fn json(&self) -> &str {
		&self.json
	}

	/// The 8-byte little-endian Rabin fingerprint of this schema's Parsing
	/// Canonical Form, as used by Avro single-object encoding.
	pub fn rabin_fingerprint(&self) -> [u8; 8] {
		self.fingerprint
	}
}

impl std::str::FromStr for Schema {
	type Err = SchemaError;
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse_str(s)
	}
}

impl std::ops::Index<SchemaKey> for Schema {
	type Output = SchemaNode;
	fn index(&self, key: SchemaKey) -> &Self::Output {
		self.node(key)
	}
}

impl TryFrom<SchemaMut> for Schema {
	type Error = SchemaError;
	fn try_from(schema_mut: SchemaMut) -> Result<Self, SchemaError> {
		if schema_mut.nodes().is_empty() {
			return Err(SchemaError::new("schema has no nodes"));
		}
		schema_mut.check_for_cycles()?;
		let fingerprint = schema_mut.canonical_form_rabin_fingerprint()?;
		let json = schema_mut
			.json()
			.map(ToOwned::to_owned)
			.unwrap_or_else(|| schema_mut.to_minified_json());
		Ok(Schema {
			nodes: schema_mut.into_nodes(),
			json,
			fingerprint,
		})
	}
}

/// The fully qualified name of a named schema type (record, enum or fixed).
///
/// Avro names are resolved following this priority, exactly as the
/// specification describes:
/// 1. an explicit `namespace` attribute on the type;
/// 2. a dot in the `name` itself (the part before the last dot is the
///    namespace);
/// 3. the namespace of the immediately enclosing named type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Name {
	fully_qualified_name: String,
	namespace_delimiter_idx: Option<usize>,
}

impl Name {
	pub(crate) fn from_parts(name: &str, namespace: Option<&str>) -> Self {
		match namespace {
			Some(namespace) if !namespace.is_empty() => {
				let mut fully_qualified_name = String::with_capacity(namespace.len() + 1 + name.len());
				fully_qualified_name.push_str(namespace);
				let namespace_delimiter_idx = Some(fully_qualified_name.len());
				fully_qualified_name.push('.');
				fully_qualified_name.push_str(name);
				Self {
					fully_qualified_name,
					namespace_delimiter_idx,
				}
			}
			_ => Self::from_fully_qualified_name(name.to_owned()),
		}
	}

	/// Build a [`Name`] out of an already-fully-qualified name (e.g.
	/// `"com.example.Foo"`, or just `"Foo"` if there is no namespace).
	pub fn from_fully_qualified_name(fully_qualified_name: String) -> Self {
		let namespace_delimiter_idx = fully_qualified_name.rfind('.');
		Self {
			fully_qualified_name,
			namespace_delimiter_idx,
		}
	}

	/// The short name, without namespace.
	pub fn name(&self) -> &str {
		match self.namespace_delimiter_idx {
			Some(idx) => &self.fully_qualified_name[idx + 1..],
			None => &self.fully_qualified_name,
		}
	}

	/// The namespace, if any.
	pub fn namespace(&self) -> Option<&str> {
		self.namespace_delimiter_idx
			.map(|idx| &self.fully_qualified_name[..idx])
	}

	/// The full `namespace.name` (or just `name` if there is no namespace).
	pub fn fully_qualified_name(&self) -> &str {
		&self.fully_qualified_name
	}
}

impl std::fmt::Display for Name {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.fully_qualified_name)
	}
}

/// A `fixed` schema type: a named type of a fixed number of bytes.
#[derive(Clone, Debug)]
pub struct Fixed {
	pub size: usize,
	pub name: Name,
	pub aliases: Vec<Name>,
}

/// A `decimal` logical type annotation on top of `bytes` or `fixed`.
#[derive(Clone, Copy, Debug)]
pub struct Decimal {
	pub precision: usize,
	pub scale: u32,
}
