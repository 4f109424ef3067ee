use std::borrow::Cow;

/// Any error that may happen while parsing or freezing a schema.
///
/// The `Display`/`Debug` impls give a human-readable message; [`kind`](Self::kind)
/// gives a structured classification for callers that want to match on
/// failure class without string-sniffing.
#[derive(thiserror::Error)]
pub struct SchemaError {
	inner: Box<ErrorInner>,
}

struct ErrorInner {
	kind: ErrorKind,
	source: Option<ErrorSource>,
}

enum ErrorSource {
	SerdeJson(serde_json::Error),
	Message(Cow<'static, str>),
}

/// A structured classification of a [`SchemaError`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
	/// The schema JSON itself could not be parsed.
	MalformedJson,
	/// Two named types in the same schema resolved to the same fullname.
	DuplicateName,
	/// A named-type reference did not match any type defined earlier in the
	/// schema. Forward references are not supported: a name must be fully
	/// defined before it is referenced.
	UnresolvedReference,
	/// A `default` value did not match the type it is a default for.
	BadDefault,
	/// A union directly contained another union as one of its branches.
	NestedUnion,
	/// A union had no branches.
	EmptyUnion,
	/// Two symbols within the same enum were identical.
	DuplicateEnumSymbol,
	/// Two fields within the same record had the same name.
	DuplicateFieldName,
	/// The schema contains a record that unconditionally contains itself.
	UnconditionalCycle,
	/// Any other structural problem (missing required field, wrong JSON
	/// shape for a given type, and so on).
	Other,
}

impl SchemaError {
	/// The structured classification of this error.
	pub fn kind(&self) -> ErrorKind {
		self.inner.kind.clone()
	}

	pub(crate) fn new(s: &'static str) -> Self {
		Self::of_kind(ErrorKind::Other, s)
	}

	pub(crate) fn msg(s: std::fmt::Arguments<'_>) -> Self {
		Self::display(ErrorKind::Other, s)
	}

	pub(crate) fn of_kind(kind: ErrorKind, s: impl std::fmt::Display) -> Self {
		Self::display(kind, s)
	}

	pub(crate) fn display(kind: ErrorKind, s: impl std::fmt::Display) -> Self {
		Self {
			inner: Box::new(ErrorInner {
				kind,
				source: Some(ErrorSource::Message(Cow::Owned(s.to_string()))),
			}),
		}
	}

	pub(crate) fn serde_json(serde_json_error: serde_json::Error) -> Self {
		Self {
			inner: Box::new(ErrorInner {
				kind: ErrorKind::MalformedJson,
				source: Some(ErrorSource::SerdeJson(serde_json_error)),
			}),
		}
	}
}

impl std::fmt::Debug for SchemaError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self.inner.source {
			Some(ErrorSource::SerdeJson(ref e)) => std::fmt::Debug::fmt(e, f),
			Some(ErrorSource::Message(ref s)) => std::fmt::Debug::fmt(&**s, f),
			None => std::fmt::Debug::fmt(&self.inner.kind, f),
		}
	}
}

impl std::fmt::Display for SchemaError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self.inner.source {
			Some(ErrorSource::SerdeJson(ref e)) => std::fmt::Display::fmt(e, f),
			Some(ErrorSource::Message(ref s)) => std::fmt::Display::fmt(&**s, f),
			None => std::fmt::Debug::fmt(&self.inner.kind, f),
		}
	}
}

impl From<super::safe::UnconditionalCycle> for SchemaError {
	fn from(e: super::safe::UnconditionalCycle) -> Self {
		Self::of_kind(ErrorKind::UnconditionalCycle, e)
	}
}
