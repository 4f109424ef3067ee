/// Errors that may happen while encoding an [`AvroValue`](crate::value::AvroValue)
/// to its binary representation.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum EncodeError {
	#[error("record value is missing field `{0}`")]
	MissingField(String),
	#[error("`{0}` is not one of the enum's symbols")]
	UnknownEnumSymbol(String),
	#[error("value did not structurally match any branch of the union")]
	NoUnionBranch,
	#[error("integer value {0} does not fit in the target type")]
	IntegerOutOfRange(i64),
	#[error("fixed value has {actual} bytes, schema requires {expected}")]
	FixedLengthMismatch { expected: usize, actual: usize },
	#[error("string value is not valid (already-decoded) UTF-8: {0}")]
	InvalidUtf8(#[from] std::string::FromUtf8Error),
	#[error("value did not match the shape the schema describes at this position")]
	ValueShapeMismatch,
	#[error(transparent)]
	Io(#[from] std::io::Error),
}

/// Errors that may happen while decoding a binary Avro datum.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DecodeError {
	#[error("unexpected end of input")]
	UnexpectedEof,
	#[error("decoded string is not valid UTF-8: {0}")]
	InvalidUtf8(#[from] std::str::Utf8Error),
	#[error("invalid varint encoding")]
	InvalidVarInt,
	#[error("block/collection size {0} exceeds the configured limit of {1} bytes")]
	LengthLimit(i64, usize),
	#[error("enum index {0} is out of range for its symbol list")]
	EnumIndexOutOfRange(i64),
	#[error("union branch index {0} is out of range for its variant list")]
	UnionIndexOutOfRange(i64),
	#[error("decoded value is not representable in the runtime value model: {0}")]
	RuntimeIncompatible(String),
	#[error(transparent)]
	Io(#[from] std::io::Error),
}

impl DecodeError {
	pub(crate) fn unexpected_eof() -> Self {
		DecodeError::UnexpectedEof
	}
}
