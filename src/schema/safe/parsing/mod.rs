//! Turns schema JSON into a [`SchemaMut`].
//!
//! Diverges from a permissive reading of the Avro specification in one
//! deliberate way: named-type references must resolve to a type that was
//! already fully defined earlier in the same document. There is no
//! late-fixup pass for forward references.

mod default_value;

use super::{
	Array, Decimal, Enum, FieldOrder, LogicalType, Map, Record, RecordField, RegularType,
	SchemaKey, SchemaMut, SchemaNode, Union,
};
use crate::schema::{error::ErrorKind, Fixed, Name, SchemaError};

use serde_json::Value as Json;
use std::collections::HashMap;

impl std::str::FromStr for SchemaMut {
	type Err = SchemaError;
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let raw: Json = serde_json::from_str(s).map_err(SchemaError::serde_json)?;
		let mut state = SchemaConstructionState {
			nodes: Vec::new(),
			names: HashMap::new(),
		};
		state.register_node(&raw, None, None)?;
		Ok(SchemaMut {
			nodes: state.nodes,
			schema_json: Some(serde_json::to_string(&raw).map_err(SchemaError::serde_json)?),
		})
	}
}

struct SchemaConstructionState {
	nodes: Vec<SchemaNode>,
	names: HashMap<NameKey, usize>,
}

#[derive(Clone, PartialEq, Eq, Hash)]
struct NameKey {
	namespace: Option<String>,
	name: String,
}

impl NameKey {
	fn resolve(name: &str, namespace: Option<&str>, enclosing_namespace: Option<&str>) -> Self {
		if let Some((namespace, name)) = name.rsplit_once('.') {
			return NameKey {
				namespace: Some(namespace).filter(|s| !s.is_empty()).map(str::to_owned),
				name: name.to_owned(),
			};
		}
		let namespace = match namespace {
			// An explicit empty-string namespace means "no namespace",
			// overriding the enclosing one.
			Some(namespace) => Some(namespace).filter(|s| !s.is_empty()),
			None => enclosing_namespace,
		};
		NameKey {
			namespace: namespace.map(str::to_owned),
			name: name.to_owned(),
		}
	}

	fn name(&self) -> Name {
		Name::from_parts(&self.name, self.namespace.as_deref())
	}
}

impl std::fmt::Display for NameKey {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match &self.namespace {
			Some(namespace) => write!(f, "{namespace}.{}", self.name),
			None => f.write_str(&self.name),
		}
	}
}

impl SchemaConstructionState {
	/// Registers the given raw JSON schema node, returning the key it was
	/// stored at. `enclosing_namespace` is the namespace of the nearest
	/// enclosing named type, used when this node doesn't specify its own.
	/// `will_have_logical_type` carries the name of an already-seen logical
	/// type annotation so that directly-nested logical type annotations can
	/// be rejected.
	fn register_node(
		&mut self,
		json: &Json,
		enclosing_namespace: Option<&str>,
		will_have_logical_type: Option<&str>,
	) -> Result<SchemaKey, SchemaError> {
		match json {
			Json::String(type_name) => {
				self.register_primitive_or_ref(type_name, enclosing_namespace)
			}
			Json::Array(union_members) => {
				self.register_union(union_members, enclosing_namespace, will_have_logical_type)
			}
			Json::Object(object) => {
				self.register_object(object, enclosing_namespace, will_have_logical_type)
			}
			_ => Err(SchemaError::msg(format_args!(
				"expected a type name, a union array or a type object, got {json}"
			))),
		}
	}

	fn register_primitive_or_ref(
		&mut self,
		type_name: &str,
		enclosing_namespace: Option<&str>,
	) -> Result<SchemaKey, SchemaError> {
		let regular_type = match type_name {
			"null" => RegularType::Null,
			"boolean" => RegularType::Boolean,
			"int" => RegularType::Int,
			"long" => RegularType::Long,
			"float" => RegularType::Float,
			"double" => RegularType::Double,
			"bytes" => RegularType::Bytes,
			"string" => RegularType::String,
			"array" | "map" | "record" | "enum" | "fixed" => {
				return Err(SchemaError::msg(format_args!(
					"`{type_name}` is a complex type and must be written as an object"
				)))
			}
			reference => {
				let name_key = NameKey::resolve(reference, None, enclosing_namespace);
				return match self.names.get(&name_key) {
					Some(&idx) => Ok(SchemaKey::from_idx(idx)),
					None => Err(SchemaError::of_kind(
						ErrorKind::UnresolvedReference,
						format_args!(
							"schema references unknown name `{name_key}` before it is defined"
						),
					)),
				};
			}
		};
		let idx = self.nodes.len();
		self.nodes.push(regular_type.into());
		Ok(SchemaKey::from_idx(idx))
	}

	fn register_union(
		&mut self,
		union_members: &[Json],
		enclosing_namespace: Option<&str>,
		will_have_logical_type: Option<&str>,
	) -> Result<SchemaKey, SchemaError> {
		if will_have_logical_type.is_some() {
			return Err(SchemaError::new("a union cannot itself carry a logicalType"));
		}
		if union_members.is_empty() {
			return Err(SchemaError::of_kind(
				ErrorKind::EmptyUnion,
				"a union must have at least one branch",
			));
		}
		let idx = self.nodes.len();
		self.nodes.push(RegularType::Null.into()); // reserve our spot
		let mut variants = Vec::with_capacity(union_members.len());
		for member in union_members {
			if matches!(member, Json::Array(_)) {
				return Err(SchemaError::of_kind(
					ErrorKind::NestedUnion,
					"a union cannot directly contain another union",
				));
			}
			variants.push(self.register_node(member, enclosing_namespace, None)?);
		}
		self.nodes[idx] = RegularType::Union(Union { variants }).into();
		Ok(SchemaKey::from_idx(idx))
	}

	fn register_object(
		&mut self,
		object: &serde_json::Map<String, Json>,
		enclosing_namespace: Option<&str>,
		will_have_logical_type: Option<&str>,
	) -> Result<SchemaKey, SchemaError> {
		let type_field = object
			.get("type")
			.ok_or_else(|| SchemaError::new("type object is missing its `type` field"))?;

		let logical_type_name = object.get("logicalType").and_then(Json::as_str);
		if let (Some(logical_type_name), Some(already)) = (logical_type_name, will_have_logical_type)
		{
			return Err(SchemaError::msg(format_args!(
				"directly-nested logical types: `{logical_type_name}` on top of `{already}`"
			)));
		}

		// Redundant nesting: `{"type": {"type": "string"}}` with nothing else
		// set at this level. Unwrap transparently, as the reference
		// implementation does.
		let only_type_field = object.keys().all(|k| k == "type");
		if only_type_field && matches!(type_field, Json::Object(_) | Json::Array(_)) {
			return self.register_node(type_field, enclosing_namespace, will_have_logical_type);
		}

		if let Some(logical_type_name) = logical_type_name {
			let inner = self.register_node(type_field, enclosing_namespace, Some(logical_type_name))?;
			let logical_type = self.build_logical_type(logical_type_name, object, inner)?;
			if let Some(logical_type) = logical_type {
				self.nodes[inner.idx()].logical_type = Some(logical_type);
			}
			return Ok(inner);
		}

		let type_name = match type_field {
			Json::String(s) => s.as_str(),
			other => {
				return Err(SchemaError::msg(format_args!(
					"expected a type name string on a complex type object, got {other}"
				)))
			}
		};

		match type_name {
			"array" => {
				let items_json = object
					.get("items")
					.ok_or_else(|| SchemaError::new("array type is missing its `items` field"))?;
				let idx = self.nodes.len();
				self.nodes.push(RegularType::Null.into());
				let items = self.register_node(items_json, enclosing_namespace, None)?;
				self.nodes[idx] = RegularType::Array(Array { items }).into();
				Ok(SchemaKey::from_idx(idx))
			}
			"map" => {
				let values_json = object
					.get("values")
					.ok_or_else(|| SchemaError::new("map type is missing its `values` field"))?;
				let idx = self.nodes.len();
				self.nodes.push(RegularType::Null.into());
				let values = self.register_node(values_json, enclosing_namespace, None)?;
				self.nodes[idx] = RegularType::Map(Map { values }).into();
				Ok(SchemaKey::from_idx(idx))
			}
			"enum" => {
				let (name, name_key) = self.register_name(object, enclosing_namespace, "enum")?;
				let symbols: Vec<String> = object
					.get("symbols")
					.and_then(Json::as_array)
					.ok_or_else(|| SchemaError::new("enum type is missing its `symbols` field"))?
					.iter()
					.map(|s| {
						s.as_str()
							.map(str::to_owned)
							.ok_or_else(|| SchemaError::new("enum symbols must be strings"))
					})
					.collect::<Result<_, _>>()?;
				{
					let mut seen = std::collections::HashSet::with_capacity(symbols.len());
					for symbol in &symbols {
						if !seen.insert(symbol.as_str()) {
							return Err(SchemaError::of_kind(
								ErrorKind::DuplicateEnumSymbol,
								format_args!("enum symbol `{symbol}` is repeated"),
							));
						}
					}
				}
				let default = object
					.get("default")
					.and_then(Json::as_str)
					.map(str::to_owned);
				if let Some(default) = &default {
					if !symbols.iter().any(|s| s == default) {
						return Err(SchemaError::of_kind(
							ErrorKind::BadDefault,
							format_args!("enum default `{default}` is not one of its symbols"),
						));
					}
				}
				let idx = self.reserve(&name_key)?;
				self.nodes[idx] = RegularType::Enum(Enum {
					name,
					aliases: self.parse_aliases(object, enclosing_namespace)?,
					doc: object.get("doc").and_then(Json::as_str).map(str::to_owned),
					symbols,
					default,
				})
				.into();
				Ok(SchemaKey::from_idx(idx))
			}
			"fixed" => {
				let (name, name_key) = self.register_name(object, enclosing_namespace, "fixed")?;
				let size = object
					.get("size")
					.and_then(Json::as_u64)
					.ok_or_else(|| SchemaError::new("fixed type is missing its `size` field"))?
					as usize;
				let idx = self.reserve(&name_key)?;
				self.nodes[idx] = RegularType::Fixed(Fixed {
					name,
					size,
					aliases: self.parse_aliases(object, enclosing_namespace)?,
				})
				.into();
				Ok(SchemaKey::from_idx(idx))
			}
			"record" => {
				let (name, name_key) = self.register_name(object, enclosing_namespace, "record")?;
				let idx = self.reserve(&name_key)?;
				let field_namespace = name_key.namespace.clone();
				let fields_json = object
					.get("fields")
					.and_then(Json::as_array)
					.ok_or_else(|| SchemaError::new("record type is missing its `fields` field"))?;
				let mut fields = Vec::with_capacity(fields_json.len());
				for (position, field_json) in fields_json.iter().enumerate() {
					fields.push(self.register_field(
						field_json,
						field_namespace.as_deref(),
						position,
					)?);
				}
				{
					let mut seen = std::collections::HashSet::with_capacity(fields.len());
					for field in &fields {
						if !seen.insert(field.name.as_str()) {
							return Err(SchemaError::of_kind(
								ErrorKind::DuplicateFieldName,
								format_args!("field name `{}` is repeated", field.name),
							));
						}
					}
				}
				self.nodes[idx] = RegularType::Record(Record {
					name,
					aliases: self.parse_aliases(object, enclosing_namespace)?,
					doc: object.get("doc").and_then(Json::as_str).map(str::to_owned),
					fields,
				})
				.into();
				Ok(SchemaKey::from_idx(idx))
			}
			"null" | "boolean" | "int" | "long" | "float" | "double" | "bytes" | "string" => {
				// `{"type": "int"}` with nothing else of relevance set.
				self.register_primitive_or_ref(type_name, enclosing_namespace)
			}
			other => Err(SchemaError::msg(format_args!("unknown type `{other}`"))),
		}
	}

	/// Reserves a node slot, failing if the name was already taken.
	fn reserve(&mut self, name_key: &NameKey) -> Result<usize, SchemaError> {
		let idx = self.nodes.len();
		self.nodes.push(RegularType::Null.into());
		if self.names.insert(name_key.clone(), idx).is_some() {
			return Err(SchemaError::of_kind(
				ErrorKind::DuplicateName,
				format_args!("duplicate definition for name `{name_key}`"),
			));
		}
		Ok(idx)
	}

	fn register_name(
		&mut self,
		object: &serde_json::Map<String, Json>,
		enclosing_namespace: Option<&str>,
		type_desc: &str,
	) -> Result<(Name, NameKey), SchemaError> {
		let name = object
			.get("name")
			.and_then(Json::as_str)
			.ok_or_else(|| SchemaError::msg(format_args!("{type_desc} type is missing its `name` field")))?;
		let namespace = object.get("namespace").and_then(Json::as_str);
		let name_key = NameKey::resolve(name, namespace, enclosing_namespace);
		Ok((name_key.name(), name_key))
	}

	fn parse_aliases(
		&self,
		object: &serde_json::Map<String, Json>,
		enclosing_namespace: Option<&str>,
	) -> Result<Vec<Name>, SchemaError> {
		let Some(aliases) = object.get("aliases").and_then(Json::as_array) else {
			return Ok(Vec::new());
		};
		aliases
			.iter()
			.map(|alias| {
				let alias = alias
					.as_str()
					.ok_or_else(|| SchemaError::new("aliases must be strings"))?;
				Ok(NameKey::resolve(alias, None, enclosing_namespace).name())
			})
			.collect()
	}

	fn register_field(
		&mut self,
		field_json: &Json,
		enclosing_namespace: Option<&str>,
		position: usize,
	) -> Result<RecordField, SchemaError> {
		let object = field_json
			.as_object()
			.ok_or_else(|| SchemaError::new("record field must be an object"))?;
		let name = object
			.get("name")
			.and_then(Json::as_str)
			.ok_or_else(|| SchemaError::new("record field is missing its `name`"))?
			.to_owned();
		let type_json = object
			.get("type")
			.ok_or_else(|| SchemaError::new("record field is missing its `type`"))?;
		let type_ = self.register_node(type_json, enclosing_namespace, None)?;
		let aliases = object
			.get("aliases")
			.and_then(Json::as_array)
			.map(|aliases| {
				aliases
					.iter()
					.map(|a| {
						a.as_str()
							.map(str::to_owned)
							.ok_or_else(|| SchemaError::new("field aliases must be strings"))
					})
					.collect::<Result<Vec<_>, _>>()
			})
			.transpose()?
			.unwrap_or_default();
		let order = match object.get("order").and_then(Json::as_str) {
			None | Some("ascending") => FieldOrder::Ascending,
			Some("descending") => FieldOrder::Descending,
			Some("ignore") => FieldOrder::Ignore,
			Some(other) => {
				return Err(SchemaError::msg(format_args!(
					"unknown field order `{other}`"
				)))
			}
		};
		let default = object
			.get("default")
			.map(|default_json| default_value::json_default_to_avro_value(default_json, &self.nodes, type_))
			.transpose()?;
		Ok(RecordField {
			name,
			aliases,
			doc: object.get("doc").and_then(Json::as_str).map(str::to_owned),
			position,
			type_,
			default,
			order,
		})
	}

	fn build_logical_type(
		&self,
		logical_type_name: &str,
		object: &serde_json::Map<String, Json>,
		inner: SchemaKey,
	) -> Result<Option<LogicalType>, SchemaError> {
		let underlying = &self.nodes[inner.idx()].type_;
		let logical_type = match logical_type_name {
			"decimal" => {
				let precision = object
					.get("precision")
					.and_then(Json::as_u64)
					.ok_or_else(|| SchemaError::new("decimal logical type is missing `precision`"))?
					as usize;
				let scale = object
					.get("scale")
					.and_then(Json::as_u64)
					.unwrap_or(0) as u32;
				if !matches!(underlying, RegularType::Bytes | RegularType::Fixed(_)) {
					return Ok(None);
				}
				LogicalType::Decimal(Decimal { precision, scale })
			}
			"uuid" if matches!(underlying, RegularType::String) => LogicalType::Uuid,
			"date" if matches!(underlying, RegularType::Int) => LogicalType::Date,
			"time-millis" if matches!(underlying, RegularType::Int) => LogicalType::TimeMillis,
			"time-micros" if matches!(underlying, RegularType::Long) => LogicalType::TimeMicros,
			"timestamp-millis" if matches!(underlying, RegularType::Long) => {
				LogicalType::TimestampMillis
			}
			"timestamp-micros" if matches!(underlying, RegularType::Long) => {
				LogicalType::TimestampMicros
			}
			// Unrecognized, or recognized but annotating the wrong
			// underlying type: per the specification, readers ignore
			// logical type annotations they don't understand and fall back
			// to the underlying type.
			_ => return Ok(None),
		};
		Ok(Some(logical_type))
	}
}
