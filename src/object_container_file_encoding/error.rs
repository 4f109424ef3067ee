/// Errors that may happen while reading or writing an
/// [object container file](https://avro.apache.org/docs/current/specification/#object-container-files).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ObjectContainerError {
	/// Input does not begin with the `Obj\x01` magic.
	#[error("input is not an avro object container file: header magic did not match")]
	NotAnObjectContainerFile,
	#[error("object container file header is malformed: {0}")]
	MalformedHeader(String),
	#[error("object container file uses unsupported codec `{0}`")]
	UnsupportedCodec(String),
	#[error("sync marker at end of block does not match the header's sync marker")]
	SyncMarkerMismatch,
	#[error("compression codec error: {0}")]
	Codec(String),
	#[error(transparent)]
	Schema(#[from] crate::schema::SchemaError),
	#[error(transparent)]
	Encode(#[from] crate::codec::EncodeError),
	#[error(transparent)]
	Decode(#[from] crate::codec::DecodeError),
	#[error(transparent)]
	Io(#[from] std::io::Error),
}
