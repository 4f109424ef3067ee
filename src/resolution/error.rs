/// A writer/reader schema pair could not be resolved: the shapes are
/// structurally incompatible per [Avro's schema resolution
/// rules](https://avro.apache.org/docs/current/specification/#schema-resolution).
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct SchemaIncompatible(pub(super) String);

impl SchemaIncompatible {
	pub(super) fn new(msg: impl Into<String>) -> Self {
		Self(msg.into())
	}
}
