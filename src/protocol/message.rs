//! Message Envelope: header tetap 10 bytes + payload
//!
//! Layout:
//! ┌───────┬─────────┬──────────┬─────────────┬──────────────────┐
//! │ "SDP" │ version │ type_id  │ payload_len │ payload          │
//! │ 3B    │ 1B      │ u16 LE   │ u32 LE      │ payload_len bytes│
//! └───────┴─────────┴──────────┴─────────────┴──────────────────┘
//!
//! Decode berjalan sebagai state machine eksplisit; setiap state
//! melakukan bounds-check sendiri sebelum membaca.

use std::sync::Arc;

use tracing::{debug, trace};

use super::codec::{decode_exact, encode_value, size_value};
use super::schema::{Registry, Schema};
use super::value::{Backing, Value};
use crate::config::{DecodeOptions, Limits};
use crate::core::{DecodeCursor, Storage, WireWriter};
use crate::error::{Limit, Result, WireError};

pub const MAGIC: [u8; 3] = *b"SDP";
/// Versi wire format (ASCII '2')
pub const VERSION: u8 = b'2';
pub const SUPPORTED_VERSIONS: &[u8] = &[VERSION];
pub const HEADER_SIZE: usize = 10;

/// Header envelope setelah magic divalidasi
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    pub version: u8,
    pub type_id: u16,
    pub payload_len: u32,
}

impl MessageHeader {
    #[inline]
    pub fn new(type_id: u16, payload_len: u32) -> Self {
        Self {
            version: VERSION,
            type_id,
            payload_len,
        }
    }

    #[inline]
    pub(crate) fn write(&self, w: &mut WireWriter<'_>) -> Result<()> {
        w.put_bytes(&MAGIC)?;
        w.put(self.version)?;
        w.put(self.type_id)?;
        w.put(self.payload_len)
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[..3].copy_from_slice(&MAGIC);
        out[3] = self.version;
        out[4..6].copy_from_slice(&self.type_id.to_le_bytes());
        out[6..].copy_from_slice(&self.payload_len.to_le_bytes());
        out
    }

    /// Parse header saja (state machine berhenti di `ExpectPayload`)
    pub fn parse(buf: &[u8], limits: Limits) -> Result<Self> {
        let mut reader = EnvelopeReader::new(buf, limits);
        while reader.state() != EnvelopeState::ExpectPayload {
            reader.step()?;
        }
        reader.header()
    }

    /// Total size header + payload
    #[inline(always)]
    pub fn total_size(&self) -> usize {
        HEADER_SIZE + self.payload_len as usize
    }
}

/// State decode envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    ExpectMagic,
    ExpectVersion,
    ExpectTypeId,
    ExpectLength,
    ExpectPayload,
    Done,
}

/// Envelope hasil parse; payload adalah view ke buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope<'a> {
    pub header: MessageHeader,
    pub payload: &'a [u8],
}

impl Envelope<'_> {
    #[inline(always)]
    pub fn type_id(&self) -> u16 {
        self.header.type_id
    }

    /// Bytes yang ditempati envelope di buffer
    #[inline(always)]
    pub fn encoded_len(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }
}

/// State machine pembaca envelope
#[derive(Debug, Clone)]
pub struct EnvelopeReader<'a> {
    cursor: DecodeCursor<'a>,
    state: EnvelopeState,
    version: u8,
    type_id: u16,
    payload_len: u32,
    payload: &'a [u8],
}

impl<'a> EnvelopeReader<'a> {
    pub fn new(buf: &'a [u8], limits: Limits) -> Self {
        Self::at(buf, 0, limits)
    }

    /// Reader yang mulai dari `offset` (stream envelope bersambung)
    pub fn at(buf: &'a [u8], offset: usize, limits: Limits) -> Self {
        Self {
            cursor: DecodeCursor::with_limits(buf, limits).starting_at(offset),
            state: EnvelopeState::ExpectMagic,
            version: 0,
            type_id: 0,
            payload_len: 0,
            payload: &[],
        }
    }

    #[inline(always)]
    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    /// Offset setelah bagian yang sudah dibaca
    #[inline(always)]
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Jalankan satu state, return state berikutnya
    ///
    /// Gagal tidak mengubah state, sehingga error bisa dilaporkan
    /// bersama state tempat decode berhenti.
    pub fn step(&mut self) -> Result<EnvelopeState> {
        let next = match self.state {
            EnvelopeState::ExpectMagic => {
                let found = self.cursor.take_array::<3>()?;
                if found != MAGIC {
                    return Err(WireError::BadMagic { found });
                }
                EnvelopeState::ExpectVersion
            }
            EnvelopeState::ExpectVersion => {
                let found = self.cursor.read::<u8>()?;
                if !SUPPORTED_VERSIONS.contains(&found) {
                    return Err(WireError::UnsupportedVersion { found });
                }
                self.version = found;
                EnvelopeState::ExpectTypeId
            }
            EnvelopeState::ExpectTypeId => {
                self.type_id = self.cursor.read::<u16>()?;
                EnvelopeState::ExpectLength
            }
            EnvelopeState::ExpectLength => {
                let len = self.cursor.read::<u32>()?;
                // Ditolak sebelum menunggu payload
                self.cursor.limits().check_message_size(len as usize)?;
                self.payload_len = len;
                EnvelopeState::ExpectPayload
            }
            EnvelopeState::ExpectPayload => {
                self.payload = self.cursor.take(self.payload_len as usize)?;
                EnvelopeState::Done
            }
            EnvelopeState::Done => EnvelopeState::Done,
        };
        trace!(from = ?self.state, to = ?next, offset = self.cursor.position(), "envelope");
        self.state = next;
        Ok(next)
    }

    /// Header yang sudah terbaca; valid setelah `ExpectLength` selesai
    pub fn header(&self) -> Result<MessageHeader> {
        match self.state {
            EnvelopeState::ExpectPayload | EnvelopeState::Done => Ok(MessageHeader {
                version: self.version,
                type_id: self.type_id,
                payload_len: self.payload_len,
            }),
            _ => Err(WireError::TruncatedBuffer {
                offset: self.cursor.position(),
                needed: HEADER_SIZE,
                available: self.cursor.remaining(),
            }),
        }
    }

    /// Jalankan sampai `Done`
    pub fn finish(mut self) -> Result<Envelope<'a>> {
        while self.state != EnvelopeState::Done {
            self.step()?;
        }
        Ok(Envelope {
            header: self.header()?,
            payload: self.payload,
        })
    }
}

/// Parse satu envelope dari awal `buf`; bytes setelah payload tidak disentuh
pub fn parse_envelope(buf: &[u8], limits: Limits) -> Result<Envelope<'_>> {
    EnvelopeReader::new(buf, limits).finish().map_err(|err| {
        debug!(len = buf.len(), error = %err, "envelope rejected");
        err
    })
}

/// Ukuran envelope lengkap untuk `value`
#[inline]
pub fn message_size<B: Backing>(value: &Value<B>) -> usize {
    HEADER_SIZE + size_value(value)
}

/// Tulis envelope ke buffer milik caller pada `offset`, return offset baru
pub fn encode_message_into<B: Backing>(
    type_id: u16,
    value: &Value<B>,
    buf: &mut [u8],
    offset: usize,
) -> Result<usize> {
    let payload_len = size_value(value);
    let payload_len = u32::try_from(payload_len)
        .map_err(|_| WireError::limit(Limit::MessageSize, u32::MAX as usize, payload_len))?;
    let mut w = WireWriter::at(buf, offset);
    MessageHeader::new(type_id, payload_len).write(&mut w)?;
    encode_value(value, &mut w)?;
    Ok(w.position())
}

/// Size → alokasi → header + payload
pub fn encode_message<B: Backing>(type_id: u16, value: &Value<B>) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; message_size(value)];
    let end = encode_message_into(type_id, value, &mut buf, 0)?;
    debug_assert_eq!(end, buf.len());
    Ok(buf)
}

fn decode_payload<'a, S: Storage<'a>>(
    schema: &Schema,
    envelope: &Envelope<'a>,
    opts: DecodeOptions,
    storage: &mut S,
) -> Result<Value<S::Bytes>> {
    decode_exact(schema, envelope.payload, opts, storage).map_err(|err| {
        debug!(
            schema = schema.name(),
            type_id = envelope.type_id(),
            error = %err,
            "payload rejected"
        );
        err
    })
}

/// Decode envelope untuk satu tipe yang sudah diketahui
///
/// `type_id` yang berbeda dari `expected` ditolak sebagai `UnknownTypeId`.
pub fn decode_message_as<'a, S: Storage<'a>>(
    schema: &Schema,
    expected: u16,
    buf: &'a [u8],
    opts: DecodeOptions,
    storage: &mut S,
) -> Result<Value<S::Bytes>> {
    let envelope = parse_envelope(buf, opts.limits)?;
    if envelope.type_id() != expected {
        return Err(WireError::UnknownTypeId {
            type_id: envelope.type_id(),
        });
    }
    decode_payload(schema, &envelope, opts, storage)
}

/// Hasil dispatch: value beserta schema yang dipilih dari `type_id`
#[derive(Debug, Clone)]
pub struct Dispatched<B: Backing> {
    pub type_id: u16,
    pub schema: Arc<Schema>,
    pub value: Value<B>,
}

impl<B: Backing> Dispatched<B> {
    pub fn name(&self) -> &str {
        self.schema.name()
    }
}

impl Registry {
    /// Validasi value terhadap schema `type_id`, lalu encode envelope
    pub fn encode_message<B: Backing>(&self, type_id: u16, value: &Value<B>) -> Result<Vec<u8>> {
        let schema = self
            .get(type_id)
            .ok_or(WireError::UnknownTypeId { type_id })?;
        schema.check(value)?;
        encode_message(type_id, value)
    }

    pub fn encode_named<B: Backing>(&self, name: &str, value: &Value<B>) -> Result<Vec<u8>> {
        let (type_id, _) = self.by_name(name)?;
        self.encode_message(type_id, value)
    }

    /// Dispatcher: parse envelope, pilih schema dari `type_id`, decode payload
    pub fn decode_message<'a, S: Storage<'a>>(
        &self,
        buf: &'a [u8],
        opts: DecodeOptions,
        storage: &mut S,
    ) -> Result<Dispatched<S::Bytes>> {
        let envelope = parse_envelope(buf, opts.limits)?;
        self.decode_envelope(&envelope, opts, storage)
    }

    pub fn decode_envelope<'a, S: Storage<'a>>(
        &self,
        envelope: &Envelope<'a>,
        opts: DecodeOptions,
        storage: &mut S,
    ) -> Result<Dispatched<S::Bytes>> {
        let type_id = envelope.type_id();
        let Some(schema) = self.get(type_id) else {
            debug!(type_id, "unregistered type id");
            return Err(WireError::UnknownTypeId { type_id });
        };
        let value = decode_payload(schema, envelope, opts, storage)?;
        Ok(Dispatched {
            type_id,
            schema: Arc::clone(schema),
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Owned, ZeroCopy};
    use crate::error::ErrorKind;
    use crate::protocol::schema::FieldKind;
    use crate::protocol::value::OwnedValue;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .register(Schema::new("Ping").field("seq", FieldKind::U32).build())
            .unwrap();
        registry
            .register(Schema::new("Note").field("text", FieldKind::String).build())
            .unwrap();
        registry
    }

    fn note(text: &str) -> OwnedValue {
        Value::Struct(vec![OwnedValue::str(text)])
    }

    #[test]
    fn test_header_layout() {
        let bytes = encode_message(2, &note("hi")).unwrap();
        assert_eq!(&bytes[..3], b"SDP");
        assert_eq!(bytes[3], b'2');
        assert_eq!(&bytes[4..6], &[2, 0]);
        assert_eq!(&bytes[6..10], &[6, 0, 0, 0]);
        assert_eq!(bytes.len(), HEADER_SIZE + 6);
        assert_eq!(
            &bytes[..HEADER_SIZE],
            &MessageHeader::new(2, 6).to_bytes()
        );
    }

    #[test]
    fn test_state_machine_order() {
        let bytes = encode_message(1, &Value::<Box<[u8]>>::Struct(vec![Value::U32(9)])).unwrap();
        let mut reader = EnvelopeReader::new(&bytes, Limits::default());
        let mut states = vec![reader.state()];
        while reader.state() != EnvelopeState::Done {
            states.push(reader.step().unwrap());
        }
        assert_eq!(
            states,
            vec![
                EnvelopeState::ExpectMagic,
                EnvelopeState::ExpectVersion,
                EnvelopeState::ExpectTypeId,
                EnvelopeState::ExpectLength,
                EnvelopeState::ExpectPayload,
                EnvelopeState::Done,
            ]
        );
        assert_eq!(reader.position(), bytes.len());
    }

    #[test]
    fn test_dispatch_by_type_id() {
        let registry = registry();
        let bytes = registry.encode_named("Note", &note("hello")).unwrap();
        let msg = registry
            .decode_message(&bytes, DecodeOptions::default(), &mut ZeroCopy)
            .unwrap();
        assert_eq!(msg.type_id, 2);
        assert_eq!(msg.name(), "Note");
        assert!(msg.value == note("hello"));
    }

    #[test]
    fn test_bad_magic_each_byte() {
        let bytes = encode_message(1, &Value::<Box<[u8]>>::Struct(vec![Value::U32(1)])).unwrap();
        for i in 0..3 {
            let mut corrupt = bytes.clone();
            corrupt[i] ^= 0xFF;
            let err = parse_envelope(&corrupt, Limits::default()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::BadMagic);
        }
    }

    #[test]
    fn test_unsupported_version() {
        let mut bytes = encode_message(1, &note("x")).unwrap();
        bytes[3] = b'1';
        match parse_envelope(&bytes, Limits::default()).unwrap_err() {
            WireError::UnsupportedVersion { found } => assert_eq!(found, b'1'),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_type_id() {
        let registry = registry();
        let bytes = encode_message(7, &note("x")).unwrap();
        let err = registry
            .decode_message(&bytes, DecodeOptions::default(), &mut Owned)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownTypeId);

        let err = registry.encode_message(0, &note("x")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownTypeId);
    }

    #[test]
    fn test_truncated_payload() {
        let bytes = encode_message(2, &note("hello")).unwrap();
        for cut in 0..bytes.len() {
            let err = parse_envelope(&bytes[..cut], Limits::default()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::TruncatedBuffer, "cut {cut}");
        }
    }

    #[test]
    fn test_payload_must_be_consumed_exactly() {
        let registry = registry();
        let mut bytes = encode_message(2, &note("hi")).unwrap();
        // Perpanjang payload_len dengan satu byte sampah
        bytes[6] += 1;
        bytes.push(0xAA);
        match registry
            .decode_message(&bytes, DecodeOptions::default(), &mut ZeroCopy)
            .unwrap_err()
        {
            WireError::PayloadLengthMismatch { declared, consumed } => {
                assert_eq!(declared, 7);
                assert_eq!(consumed, 6);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_payload_len_over_cap() {
        let bytes = encode_message(2, &note("hello")).unwrap();
        let limits = Limits::default().with_max_message_size(4);
        // Hanya header yang tersedia: cap dicek sebelum payload ditunggu
        let err = parse_envelope(&bytes[..HEADER_SIZE], limits).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LimitExceeded);
    }

    #[test]
    fn test_decode_message_as() {
        let registry = registry();
        let (note_id, schema) = registry.by_name("Note").unwrap();
        let bytes = encode_message(note_id, &note("abc")).unwrap();
        let value =
            decode_message_as(schema, note_id, &bytes, DecodeOptions::default(), &mut Owned).unwrap();
        assert!(value == note("abc"));

        let err = decode_message_as(schema, 1, &bytes, DecodeOptions::default(), &mut Owned)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownTypeId);
    }

    #[test]
    fn test_encode_checks_registered_schema() {
        let registry = registry();
        let err = registry.encode_message(1, &note("wrong")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaMismatch);
    }

    #[test]
    fn test_header_parse_only() {
        let bytes = encode_message(2, &note("hello")).unwrap();
        let header = MessageHeader::parse(&bytes[..HEADER_SIZE], Limits::default()).unwrap();
        assert_eq!(header, MessageHeader::new(2, 9));
        assert_eq!(header.total_size(), bytes.len());
    }
}
