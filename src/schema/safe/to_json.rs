//! Re-serializes a [`SchemaMut`] back to minified JSON.
//!
//! Used to refresh the cached JSON after [`nodes_mut`](SchemaMut::nodes_mut)
//! has invalidated it. Round-tripping through this loses anything this crate
//! doesn't itself store on a node (`doc`, `aliases`, unrecognized extra
//! properties): this mirrors the caveat the parser itself documents.

use super::{RegularType, SchemaKey, SchemaMut};
use serde_json::{json, Value};

impl SchemaMut {
	pub(crate) fn to_minified_json(&self) -> String {
		let mut named_type_written = vec![false; self.nodes.len()];
		let value = self.node_to_json(SchemaKey::from_idx(0), &mut named_type_written);
		value.to_string()
	}

	fn node_to_json(&self, key: SchemaKey, named_type_written: &mut [bool]) -> Value {
		let node = &self.nodes[key.idx()];
		let mut value = match &node.type_ {
			RegularType::Null => json!("null"),
			RegularType::Boolean => json!("boolean"),
			RegularType::Int => json!("int"),
			RegularType::Long => json!("long"),
			RegularType::Float => json!("float"),
			RegularType::Double => json!("double"),
			RegularType::Bytes => json!("bytes"),
			RegularType::String => json!("string"),
			RegularType::Array(array) => json!({
				"type": "array",
				"items": self.node_to_json(array.items, named_type_written),
			}),
			RegularType::Map(map) => json!({
				"type": "map",
				"values": self.node_to_json(map.values, named_type_written),
			}),
			RegularType::Union(union) => Value::Array(
				union
					.variants
					.iter()
					.map(|&v| self.node_to_json(v, named_type_written))
					.collect(),
			),
			RegularType::Record(record) => {
				if named_type_written[key.idx()] {
					return json!(record.name.fully_qualified_name());
				}
				named_type_written[key.idx()] = true;
				json!({
					"type": "record",
					"name": record.name.fully_qualified_name(),
					"fields": record.fields.iter().map(|field| json!({
						"name": field.name,
						"type": self.node_to_json(field.type_, named_type_written),
					})).collect::<Vec<_>>(),
				})
			}
			RegularType::Enum(enum_) => {
				if named_type_written[key.idx()] {
					return json!(enum_.name.fully_qualified_name());
				}
				named_type_written[key.idx()] = true;
				json!({
					"type": "enum",
					"name": enum_.name.fully_qualified_name(),
					"symbols": enum_.symbols,
				})
			}
			RegularType::Fixed(fixed) => {
				if named_type_written[key.idx()] {
					return json!(fixed.name.fully_qualified_name());
				}
				named_type_written[key.idx()] = true;
				json!({
					"type": "fixed",
					"name": fixed.name.fully_qualified_name(),
					"size": fixed.size,
				})
			}
		};
		if let Some(logical_type) = &node.logical_type {
			value["logicalType"] = json!(logical_type.as_str());
			if let super::LogicalType::Decimal(decimal) = logical_type {
				value["precision"] = json!(decimal.precision);
				value["scale"] = json!(decimal.scale);
			}
		}
		value
	}
}
