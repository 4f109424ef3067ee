//! Configuration shared across calls to an [`Encoder`](super::Encoder) or
//! [`Decoder`](super::Decoder), mirroring the way a serializer/deserializer
//! config is kept separate from, and reusable across, individual calls.

/// Options controlling encoding behavior.
#[derive(Clone, Debug)]
pub struct EncoderConfig {
	/// Whether a record field missing from the input value, with no declared
	/// schema default, is allowed to fall back to encoding `null` when its
	/// type is a union with a `null` branch.
	///
	/// Defaults to `false`, so that fallback is allowed. Set to `true` to
	/// require every missing field to resolve via an explicit schema default,
	/// erroring otherwise.
	pub strict_union_match: bool,
}

impl Default for EncoderConfig {
	fn default() -> Self {
		Self {
			strict_union_match: false,
		}
	}
}

/// Options controlling decoding behavior.
#[derive(Clone, Debug)]
pub struct DecoderConfig {
	/// Upper bound, in bytes, on any single length-prefixed `bytes`/`string`
	/// value or block, to guard against corrupt or adversarial length
	/// prefixes causing huge allocations.
	pub max_block_bytes: usize,
	/// See [`EncoderConfig::strict_union_match`]; applies the same
	/// distinction during schema resolution, when a reader field is absent
	/// from the writer, has no declared default, and its type is a union
	/// with a `null` branch.
	pub strict_union_match: bool,
	/// Whether to error when a `logicalType` annotation is present but not
	/// recognized (`false`, the default, silently falls back to decoding the
	/// underlying type, which is what the Avro specification mandates).
	pub logical_type_fallback: bool,
}

impl Default for DecoderConfig {
	fn default() -> Self {
		Self {
			max_block_bytes: 512 * 1024 * 1024,
			strict_union_match: false,
			logical_type_fallback: true,
		}
	}
}
