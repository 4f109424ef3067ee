use super::{RegularType, SchemaMut, SchemaNode};

impl SchemaMut {
	/// Check that the schema does not contain zero-sized unconditional
	/// cycles.
	///
	/// Called automatically by the parser; only useful again if the graph
	/// was hand-edited through [`nodes_mut`](SchemaMut::nodes_mut).
	pub(crate) fn check_for_cycles(&self) -> Result<(), UnconditionalCycle> {
		// A zero-sized cycle (one that would recurse forever without ever
		// consuming a byte of input) can only occur through a chain of
		// records referencing each other directly as field types: any other
		// path (union, array, map) consumes at least one byte of framing
		// before it can recurse.
		//
		// Conditional self-reference (e.g. a record with a nullable pointer
		// to itself) is legitimate and not rejected here; that still bounds
		// recursion depth at encode/decode time instead.
		let mut visited_nodes = vec![false; self.nodes.len()];
		let mut checked_nodes = vec![false; self.nodes.len()];
		for (idx, node) in self.nodes.iter().enumerate() {
			if matches!(node.type_, RegularType::Record(_)) && !checked_nodes[idx] {
				check_no_zero_sized_cycle_inner(self, idx, &mut visited_nodes, &mut checked_nodes)?;
			}
		}
		Ok(())
	}
}

/// Detected an unconditional cycle in a schema: a record that ends up always
/// containing itself, with no framing byte ever consumed along the way.
#[derive(Debug, thiserror::Error)]
#[error("the schema contains a record that ends up always containing itself")]
pub struct UnconditionalCycle {
	_private: (),
}

fn check_no_zero_sized_cycle_inner(
	schema: &SchemaMut,
	node_idx: usize,
	visited_nodes: &mut Vec<bool>,
	checked_nodes: &mut Vec<bool>,
) -> Result<(), UnconditionalCycle> {
	visited_nodes[node_idx] = true;
	let fields = match &schema.nodes[node_idx].type_ {
		RegularType::Record(record) => &record.fields,
		_ => unreachable!(),
	};
	for field in fields {
		if let RegularType::Record(_) = &schema.nodes[field.type_.idx()].type_ {
			if visited_nodes[field.type_.idx()] {
				return Err(UnconditionalCycle { _private: () });
			}
			check_no_zero_sized_cycle_inner(schema, field.type_.idx(), visited_nodes, checked_nodes)?;
		}
	}
	visited_nodes[node_idx] = false;
	checked_nodes[node_idx] = true;
	Ok(())
}
