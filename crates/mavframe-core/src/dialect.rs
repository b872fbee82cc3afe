//! Message-id registry mapping wire ids to checksum seeds and decoders.
//!
//! A dialect is built once from a set of [`MavMessage`] types and then shared
//! read-only. Lookups are a single hash probe; there is no dynamic type
//! dispatch on the receive path.

use std::{collections::HashMap, fmt};

use mavframe_proto::{DecodeError, MavMessage, RawFrame};

/// Decoder from a zero-extended payload into the dialect's message type.
pub type DecodeFn<M> = fn(&[u8]) -> Result<M, DecodeError>;

/// Everything the receive path needs to know about one message id.
pub struct MessageMetadata<M> {
    /// Message id
    pub id: u32,
    /// Checksum seed
    pub crc_extra: u8,
    /// Full payload size before v2 truncation
    pub encoded_len: usize,
    /// Payload decoder
    pub decode: DecodeFn<M>,
}

impl<M> MessageMetadata<M> {
    /// Metadata for message type `T`, decoded into `M`.
    pub fn of<T>() -> Self
    where
        T: MavMessage + Into<M>,
    {
        Self { id: T::ID, crc_extra: T::CRC_EXTRA, encoded_len: T::ENCODED_LEN, decode: decode_as::<T, M> }
    }

    /// Decode a frame's payload after restoring truncated trailing zeros.
    pub fn decode_payload(&self, frame: &RawFrame) -> Result<M, DecodeError> {
        (self.decode)(&frame.payload_extended(self.encoded_len))
    }
}

impl<M> Clone for MessageMetadata<M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M> Copy for MessageMetadata<M> {}

impl<M> fmt::Debug for MessageMetadata<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageMetadata")
            .field("id", &self.id)
            .field("crc_extra", &self.crc_extra)
            .field("encoded_len", &self.encoded_len)
            .finish_non_exhaustive()
    }
}

fn decode_as<T, M>(payload: &[u8]) -> Result<M, DecodeError>
where
    T: MavMessage + Into<M>,
{
    T::decode(payload).map(Into::into)
}

/// Set of messages a connection understands.
pub struct Dialect<M> {
    messages: HashMap<u32, MessageMetadata<M>>,
}

impl<M> Dialect<M> {
    /// Start building a dialect.
    pub fn builder() -> DialectBuilder<M> {
        DialectBuilder { messages: HashMap::new() }
    }

    /// Metadata for `id`, or `None` if the dialect does not define it
    pub fn resolve(&self, id: u32) -> Option<&MessageMetadata<M>> {
        self.messages.get(&id)
    }

    /// True if the dialect defines `id`
    pub fn contains(&self, id: u32) -> bool {
        self.messages.contains_key(&id)
    }

    /// Number of messages defined
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True if no messages are defined
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl<M> fmt::Debug for Dialect<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<_> = self.messages.keys().collect();
        ids.sort_unstable();
        f.debug_struct("Dialect").field("ids", &ids).finish()
    }
}

/// Builder for [`Dialect`].
pub struct DialectBuilder<M> {
    messages: HashMap<u32, MessageMetadata<M>>,
}

impl<M> DialectBuilder<M> {
    /// Register message type `T`. A later registration of the same id
    /// replaces the earlier one.
    #[must_use]
    pub fn message<T>(mut self) -> Self
    where
        T: MavMessage + Into<M>,
    {
        self.messages.insert(T::ID, MessageMetadata::of::<T>());
        self
    }

    /// Finish building.
    pub fn build(self) -> Dialect<M> {
        Dialect { messages: self.messages }
    }
}

#[cfg(test)]
mod tests {
    use mavframe_proto::MavHeader;

    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    struct Counter(u16);

    impl MavMessage for Counter {
        const ID: u32 = 42_000;
        const CRC_EXTRA: u8 = 7;
        const ENCODED_LEN: usize = 4;

        fn encode(&self) -> Vec<u8> {
            let mut out = self.0.to_le_bytes().to_vec();
            out.extend_from_slice(&[0, 0]);
            out
        }

        fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
            DecodeError::ensure_len(payload, Self::ENCODED_LEN)?;
            Ok(Self(u16::from_le_bytes([payload[0], payload[1]])))
        }
    }

    #[derive(Debug, PartialEq, Eq)]
    enum Message {
        Counter(Counter),
    }

    impl From<Counter> for Message {
        fn from(value: Counter) -> Self {
            Self::Counter(value)
        }
    }

    fn dialect() -> Dialect<Message> {
        Dialect::builder().message::<Counter>().build()
    }

    #[test]
    fn resolve_registered_message() {
        let dialect = dialect();
        let meta = dialect.resolve(42_000).expect("registered");

        assert_eq!(meta.crc_extra, 7);
        assert_eq!(meta.encoded_len, 4);
        assert!(dialect.contains(42_000));
        assert!(!dialect.contains(0));
        assert_eq!(dialect.len(), 1);
    }

    #[test]
    fn decode_restores_truncated_payload() {
        let dialect = dialect();
        let meta = dialect.resolve(Counter::ID).expect("registered");
        let frame = RawFrame::encode_unsigned_v2(
            MavHeader::default(),
            Counter::ID,
            &Counter(0x0105).encode(),
            Counter::CRC_EXTRA,
        )
        .expect("should encode");

        assert_eq!(frame.payload_length(), 2);
        assert_eq!(meta.decode_payload(&frame), Ok(Message::Counter(Counter(0x0105))));
    }

    #[test]
    fn unknown_id_resolves_to_none() {
        assert!(dialect().resolve(1).is_none());
        assert!(Dialect::<Message>::builder().build().is_empty());
    }
}
