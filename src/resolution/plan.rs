use std::collections::HashMap;

use super::error::SchemaIncompatible;
use crate::schema::{RegularType, Schema, SchemaKey};
use crate::value::AvroValue;

/// A key into a [`Plan`]'s action arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlanKey(usize);

/// The result of walking a `(writer, reader)` schema pair once: one
/// [`ResolutionAction`] per distinct `(writer node, reader node)` pairing
/// actually reached, addressed the same way [`SchemaMut`](crate::schema::safe::SchemaMut)
/// addresses its own nodes.
pub struct Plan {
	actions: Vec<ResolutionAction>,
	root: PlanKey,
}

impl Plan {
	pub(super) fn action(&self, key: PlanKey) -> &ResolutionAction {
		&self.actions[key.0]
	}

	pub(super) fn root(&self) -> PlanKey {
		self.root
	}
}

pub(super) enum ResolutionAction {
	Null,
	Boolean,
	Int,
	Long,
	Float,
	Double,
	Bytes,
	String,
	/// Promotion, per the Avro schema resolution promotion table.
	IntToLong,
	IntToFloat,
	IntToDouble,
	LongToFloat,
	LongToDouble,
	FloatToDouble,
	StringToBytes,
	BytesToString,
	Fixed {
		size: usize,
	},
	Enum {
		writer_symbols: Vec<String>,
		reader_symbols: Vec<String>,
		reader_default: Option<String>,
	},
	Array {
		writer_item: SchemaKey,
		item: PlanKey,
	},
	Map {
		writer_value: SchemaKey,
		value: PlanKey,
	},
	Record {
		/// Reader-declared-order field list; determines the shape and field
		/// order of the materialized [`AvroValue::Record`].
		fields: Vec<FieldResolution>,
		/// Writer-on-the-wire-order read sequence; determines the order bytes
		/// are actually consumed in, which need not match `fields`' order
		/// whenever the writer and reader declare fields in different orders.
		read_order: Vec<ReadStep>,
	},
	/// Writer is a union; every writer variant resolves against the (possibly
	/// non-union) reader type. Indexed by writer branch index.
	UnionWriter {
		variants: Vec<PlanKey>,
	},
	/// Writer is not a union, but the reader is: the single compatible reader
	/// branch was already found at plan-build time (the writer type can't
	/// change at decode time, so neither can the branch).
	NonUnionWriterIntoUnionReader {
		reader_branch: usize,
		inner: PlanKey,
	},
}

pub(super) enum FieldResolution {
	Matched { name: String, plan: PlanKey },
	ReaderOnlyDefault { name: String, value: AvroValue },
}

/// One step of reading a record's fields off the wire, in writer field order.
pub(super) enum ReadStep {
	/// Read the matched field at `fields[output_index]` and place its decoded
	/// value there.
	Field { output_index: usize },
	/// A writer-only field: discard its bytes without producing a value.
	Skip { writer_key: SchemaKey },
}

/// Builds the [`Plan`] to turn `writer`-shaped bytes into `reader`-shaped
/// [`AvroValue`]s, or reports why the two schemas are incompatible.
///
/// `strict_union_match` mirrors [`DecoderConfig::strict_union_match`]
/// (see its docs): when `false`, a reader field absent from the writer with
/// no declared default but a `null` branch is permissively defaulted to
/// `null` instead of making the schemas incompatible.
///
/// [`DecoderConfig::strict_union_match`]: crate::codec::DecoderConfig::strict_union_match
pub fn build_plan(writer: &Schema, reader: &Schema, strict_union_match: bool) -> Result<Plan, SchemaIncompatible> {
	let mut builder = PlanBuilder {
		writer,
		reader,
		strict_union_match,
		actions: Vec::new(),
		memo: HashMap::new(),
	};
	let root = builder.resolve(writer.root(), reader.root())?;
	Ok(Plan {
		actions: builder.actions,
		root,
	})
}

struct PlanBuilder<'s> {
	writer: &'s Schema,
	reader: &'s Schema,
	strict_union_match: bool,
	actions: Vec<ResolutionAction>,
	memo: HashMap<(SchemaKey, SchemaKey), PlanKey>,
}

impl<'s> PlanBuilder<'s> {
	fn push(&mut self, action: ResolutionAction) -> PlanKey {
		self.actions.push(action);
		PlanKey(self.actions.len() - 1)
	}

	fn resolve(&mut self, writer_key: SchemaKey, reader_key: SchemaKey) -> Result<PlanKey, SchemaIncompatible> {
		if let Some(&cached) = self.memo.get(&(writer_key, reader_key)) {
			return Ok(cached);
		}
		// Reserve the slot before recursing so that a record field pointing
		// back at an ancestor record resolves to the same key instead of
		// recursing forever.
		let reserved = self.push(ResolutionAction::Null);
		self.memo.insert((writer_key, reader_key), reserved);

		let writer_node = &self.writer.node(writer_key).type_;
		let reader_node = &self.reader.node(reader_key).type_;

		let action = match (writer_node, reader_node) {
			(writer_type, RegularType::Union(reader_union)) if !matches!(writer_type, RegularType::Union(_)) => {
				self.resolve_into_union_reader(writer_key, &reader_union.variants)?
			}
			(RegularType::Union(writer_union), _) => {
				let variants = writer_union
					.variants
					.clone()
					.iter()
					.map(|&variant| self.resolve(variant, reader_key))
					.collect::<Result<Vec<_>, _>>()?;
				ResolutionAction::UnionWriter { variants }
			}
			(RegularType::Null, RegularType::Null) => ResolutionAction::Null,
			(RegularType::Boolean, RegularType::Boolean) => ResolutionAction::Boolean,
			(RegularType::Int, RegularType::Int) => ResolutionAction::Int,
			(RegularType::Int, RegularType::Long) => ResolutionAction::IntToLong,
			(RegularType::Int, RegularType::Float) => ResolutionAction::IntToFloat,
			(RegularType::Int, RegularType::Double) => ResolutionAction::IntToDouble,
			(RegularType::Long, RegularType::Long) => ResolutionAction::Long,
			(RegularType::Long, RegularType::Float) => ResolutionAction::LongToFloat,
			(RegularType::Long, RegularType::Double) => ResolutionAction::LongToDouble,
			(RegularType::Float, RegularType::Float) => ResolutionAction::Float,
			(RegularType::Float, RegularType::Double) => ResolutionAction::FloatToDouble,
			(RegularType::Double, RegularType::Double) => ResolutionAction::Double,
			(RegularType::Bytes, RegularType::Bytes) => ResolutionAction::Bytes,
			(RegularType::Bytes, RegularType::String) => ResolutionAction::BytesToString,
			(RegularType::String, RegularType::String) => ResolutionAction::String,
			(RegularType::String, RegularType::Bytes) => ResolutionAction::StringToBytes,
			(RegularType::Fixed(w), RegularType::Fixed(r)) => {
				if !names_compatible(&w.name, &w.aliases, &r.name, &r.aliases) {
					return Err(SchemaIncompatible::new(format!(
						"fixed `{}` is not name-compatible with reader fixed `{}`",
						w.name, r.name
					)));
				}
				if w.size != r.size {
					return Err(SchemaIncompatible::new(format!(
						"fixed size mismatch: writer `{}` has size {}, reader `{}` has size {}",
						w.name, w.size, r.name, r.size
					)));
				}
				ResolutionAction::Fixed { size: r.size }
			}
			(RegularType::Enum(w), RegularType::Enum(r)) => {
				if !names_compatible(&w.name, &w.aliases, &r.name, &r.aliases) {
					return Err(SchemaIncompatible::new(format!(
						"enum `{}` is not name-compatible with reader enum `{}`",
						w.name, r.name
					)));
				}
				ResolutionAction::Enum {
					writer_symbols: w.symbols.clone(),
					reader_symbols: r.symbols.clone(),
					reader_default: r.default.clone(),
				}
			}
			(RegularType::Array(w), RegularType::Array(r)) => {
				let item = self.resolve(w.items, r.items)?;
				ResolutionAction::Array {
					writer_item: w.items,
					item,
				}
			}
			(RegularType::Map(w), RegularType::Map(r)) => {
				let value = self.resolve(w.values, r.values)?;
				ResolutionAction::Map {
					writer_value: w.values,
					value,
				}
			}
			(RegularType::Record(w), RegularType::Record(r)) => {
				if !names_compatible(&w.name, &w.aliases, &r.name, &r.aliases) {
					return Err(SchemaIncompatible::new(format!(
						"record `{}` is not name-compatible with reader record `{}`",
						w.name, r.name
					)));
				}
				let w = w.clone();
				let r = r.clone();
				let mut fields = Vec::with_capacity(r.fields.len());
				let mut read_steps: Vec<(usize, ReadStep)> = Vec::with_capacity(w.fields.len());
				for reader_field in &r.fields {
					let writer_field = w.fields.iter().find(|f| {
						f.name == reader_field.name || reader_field.aliases.iter().any(|a| a == &f.name)
					});
					match writer_field {
						Some(writer_field) => {
							let plan = self.resolve(writer_field.type_, reader_field.type_)?;
							let output_index = fields.len();
							fields.push(FieldResolution::Matched {
								name: reader_field.name.clone(),
								plan,
							});
							read_steps.push((writer_field.position, ReadStep::Field { output_index }));
						}
						None => match &reader_field.default {
							Some(default) => fields.push(FieldResolution::ReaderOnlyDefault {
								name: reader_field.name.clone(),
								value: default.clone(),
							}),
							None if !self.strict_union_match && self.reader_has_null_branch(reader_field.type_) => {
								// Permissive deviation: a reader-only field with no
								// declared default and a `null` branch is defaulted
								// to `null` rather than making the schemas
								// incompatible.
								fields.push(FieldResolution::ReaderOnlyDefault {
									name: reader_field.name.clone(),
									value: AvroValue::Union(Box::new(AvroValue::Null)),
								})
							}
							None => {
								return Err(SchemaIncompatible::new(format!(
									"reader field `{}` on record `{}` has no matching writer field and no default",
									reader_field.name, r.name
								)))
							}
						},
					}
				}
				for writer_field in &w.fields {
					let matched_by_reader = r.fields.iter().any(|f| {
						f.name == writer_field.name || f.aliases.iter().any(|a| a == &writer_field.name)
					});
					if !matched_by_reader {
						read_steps.push((writer_field.position, ReadStep::Skip {
							writer_key: writer_field.type_,
						}));
					}
				}
				read_steps.sort_by_key(|(position, _)| *position);
				let read_order = read_steps.into_iter().map(|(_, step)| step).collect();
				ResolutionAction::Record { fields, read_order }
			}
			(w, r) => {
				return Err(SchemaIncompatible::new(format!(
					"writer type `{}` is not resolvable against reader type `{}`",
					type_name(w),
					type_name(r)
				)))
			}
		};

		self.actions[reserved.0] = action;
		Ok(reserved)
	}

	/// Whether the reader schema node at `key` is a union with a `null` branch.
	fn reader_has_null_branch(&self, key: SchemaKey) -> bool {
		match &self.reader.node(key).type_ {
			RegularType::Union(union) => union
				.variants
				.iter()
				.any(|&variant| matches!(self.reader.node(variant).type_, RegularType::Null)),
			_ => false,
		}
	}

	fn resolve_into_union_reader(
		&mut self,
		writer_key: SchemaKey,
		reader_variants: &[SchemaKey],
	) -> Result<ResolutionAction, SchemaIncompatible> {
		for (idx, &reader_variant) in reader_variants.iter().enumerate() {
			// Try each reader branch; the first one the writer type resolves
			// against (structurally) is the one always taken, since the
			// writer's type never changes at decode time.
			let snapshot_len = self.actions.len();
			match self.resolve(writer_key, reader_variant) {
				Ok(inner) => {
					return Ok(ResolutionAction::NonUnionWriterIntoUnionReader {
						reader_branch: idx,
						inner,
					})
				}
				Err(_) => {
					self.actions.truncate(snapshot_len);
					self.memo.retain(|_, v| v.0 < snapshot_len);
				}
			}
		}
		Err(SchemaIncompatible::new(
			"writer type matches no branch of the reader union",
		))
	}
}

fn names_compatible(
	writer_name: &crate::schema::Name,
	writer_aliases: &[crate::schema::Name],
	reader_name: &crate::schema::Name,
	reader_aliases: &[crate::schema::Name],
) -> bool {
	writer_name.fully_qualified_name() == reader_name.fully_qualified_name()
		|| reader_aliases
			.iter()
			.any(|a| a.fully_qualified_name() == writer_name.fully_qualified_name())
		|| writer_aliases
			.iter()
			.any(|a| a.fully_qualified_name() == reader_name.fully_qualified_name())
}

fn type_name(type_: &RegularType) -> &'static str {
	match type_ {
		RegularType::Null => "null",
		RegularType::Boolean => "boolean",
		RegularType::Int => "int",
		RegularType::Long => "long",
		RegularType::Float => "float",
		RegularType::Double => "double",
		RegularType::Bytes => "bytes",
		RegularType::String => "string",
		RegularType::Array(_) => "array",
		RegularType::Map(_) => "map",
		RegularType::Union(_) => "union",
		RegularType::Record(_) => "record",
		RegularType::Enum(_) => "enum",
		RegularType::Fixed(_) => "fixed",
	}
}
