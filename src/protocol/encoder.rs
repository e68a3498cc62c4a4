//! Envelope Stream: Encoder/Decoder untuk envelope bersambung
//!
//! Encoder mengumpulkan batch envelope di buffer tetap; Decoder
//! mengiterasi envelope bersambung secara zero-copy.
//! `write_message`/`read_message` membingkai envelope di atas
//! `std::io::Write`/`Read`.

use std::io::{Read, Write};

use tracing::trace;

use super::message::{
    encode_message, encode_message_into, message_size, Envelope, EnvelopeReader, MessageHeader,
    HEADER_SIZE,
};
use super::value::{Backing, Value};
use crate::config::Limits;
use crate::error::Result;

/// Batch envelope di satu buffer berukuran tetap
///
/// Buffer dialokasikan sekali. Setiap `encode` menaruh envelope tepat di
/// belakang envelope sebelumnya, sehingga `frames()` bisa langsung dibaca
/// oleh `Decoder` atau ditulis ke stream dalam satu panggilan.
pub struct Encoder {
    frames: Box<[u8]>,
    filled: usize,
    count: usize,
}

impl Encoder {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            frames: vec![0u8; capacity].into_boxed_slice(),
            filled: 0,
            count: 0,
        }
    }

    /// Buang semua envelope, buffer dipakai ulang untuk batch berikutnya
    #[inline]
    pub fn clear(&mut self) {
        self.filled = 0;
        self.count = 0;
    }

    /// Encode satu envelope di belakang envelope sebelumnya
    ///
    /// Return slice ke envelope yang baru ditulis, atau `BufferTooSmall`
    /// jika tidak muat (batch tidak berubah).
    pub fn encode<B: Backing>(&mut self, type_id: u16, value: &Value<B>) -> Result<&[u8]> {
        let start = self.filled;
        let end = encode_message_into(type_id, value, &mut self.frames, start)?;
        self.filled = end;
        self.count += 1;
        Ok(&self.frames[start..end])
    }

    /// Envelope yang sudah di-encode, berurutan
    #[inline(always)]
    pub fn frames(&self) -> &[u8] {
        &self.frames[..self.filled]
    }

    /// Jumlah envelope dalam batch
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline(always)]
    pub fn spare(&self) -> usize {
        self.frames.len() - self.filled
    }

    /// Envelope untuk `value` masih muat di sisa buffer
    pub fn fits<B: Backing>(&self, value: &Value<B>) -> bool {
        message_size(value) <= self.spare()
    }
}

/// Zero-copy decoder untuk envelope bersambung
///
/// Iterasi berhenti setelah error pertama.
pub struct Decoder<'a> {
    stream: &'a [u8],
    offset: usize,
    limits: Limits,
}

impl<'a> Decoder<'a> {
    #[inline]
    pub fn new(stream: &'a [u8]) -> Self {
        Self::with_limits(stream, Limits::default())
    }

    #[inline]
    pub fn with_limits(stream: &'a [u8], limits: Limits) -> Self {
        Self {
            stream,
            offset: 0,
            limits,
        }
    }

    /// Bytes yang belum diiterasi
    #[inline(always)]
    pub fn remaining(&self) -> usize {
        self.stream.len().saturating_sub(self.offset)
    }
}

impl<'a> Iterator for Decoder<'a> {
    type Item = Result<Envelope<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining() == 0 {
            return None;
        }
        match EnvelopeReader::at(self.stream, self.offset, self.limits).finish() {
            Ok(envelope) => {
                self.offset += envelope.encoded_len();
                Some(Ok(envelope))
            }
            Err(err) => {
                self.offset = self.stream.len();
                Some(Err(err))
            }
        }
    }
}

/// Tulis satu envelope ke stream
pub fn write_message<W: Write, B: Backing>(
    writer: &mut W,
    type_id: u16,
    value: &Value<B>,
) -> Result<()> {
    let bytes = encode_message(type_id, value)?;
    writer.write_all(&bytes)?;
    trace!(type_id, len = bytes.len(), "message written");
    Ok(())
}

/// Envelope yang dibaca dari stream; payload owned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedMessage {
    pub header: MessageHeader,
    pub payload: Vec<u8>,
}

impl OwnedMessage {
    #[inline(always)]
    pub fn type_id(&self) -> u16 {
        self.header.type_id
    }

    /// View sebagai `Envelope` untuk dispatch
    pub fn envelope(&self) -> Envelope<'_> {
        Envelope {
            header: self.header,
            payload: &self.payload,
        }
    }
}

/// Baca satu envelope dari stream: header tetap dulu, lalu tepat `payload_len` bytes
///
/// Panjang payload divalidasi terhadap `max_message_size` sebelum buffer dialokasikan.
pub fn read_message<R: Read>(reader: &mut R, limits: Limits) -> Result<OwnedMessage> {
    let mut raw = [0u8; HEADER_SIZE];
    reader.read_exact(&mut raw)?;
    let header = MessageHeader::parse(&raw, limits)?;

    let mut payload = vec![0u8; header.payload_len as usize];
    reader.read_exact(&mut payload)?;
    trace!(type_id = header.type_id, len = payload.len(), "message read");
    Ok(OwnedMessage { header, payload })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::protocol::value::OwnedValue;
    use std::io::Cursor;

    fn ping(seq: u32) -> OwnedValue {
        Value::Struct(vec![Value::U32(seq)])
    }

    #[test]
    fn test_encode_decode_stream() {
        let mut encoder = Encoder::with_capacity(4096);
        assert!(encoder.is_empty());
        encoder.encode(1, &ping(1)).unwrap();
        encoder.encode(1, &ping(2)).unwrap();
        encoder.encode(3, &OwnedValue::Struct(vec![OwnedValue::str("end")])).unwrap();
        assert_eq!(encoder.len(), 3);

        let envelopes: Vec<_> = Decoder::new(encoder.frames())
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(envelopes.len(), 3);
        assert_eq!(envelopes[1].payload, &2u32.to_le_bytes());
        assert_eq!(envelopes[2].type_id(), 3);
    }

    #[test]
    fn test_encoder_full() {
        let mut encoder = Encoder::with_capacity(HEADER_SIZE + 4 + 3);
        assert!(encoder.fits(&ping(1)));
        encoder.encode(1, &ping(1)).unwrap();
        assert!(!encoder.fits(&ping(2)));

        let before = encoder.frames().to_vec();
        let err = encoder.encode(1, &ping(2)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BufferTooSmall);
        // Batch tetap berisi satu envelope utuh
        assert_eq!(encoder.spare(), 3);
        assert_eq!(encoder.len(), 1);
        assert_eq!(encoder.frames(), &before[..]);
    }

    #[test]
    fn test_encoder_reuse() {
        let mut encoder = Encoder::with_capacity(64);
        encoder.encode(1, &ping(1)).unwrap();
        encoder.clear();
        assert!(encoder.is_empty());
        assert_eq!(encoder.spare(), 64);
        encoder.encode(1, &ping(2)).unwrap();

        let mut decoder = Decoder::new(encoder.frames());
        let envelope = decoder.next().unwrap().unwrap();
        // Setelah reset hanya message kedua yang tersisa
        assert_eq!(envelope.payload, &2u32.to_le_bytes());
        assert!(decoder.next().is_none());
    }

    #[test]
    fn test_decoder_stops_after_error() {
        let mut bytes = encode_message(1, &ping(1)).unwrap();
        bytes.extend_from_slice(b"XYZ2");
        let mut decoder = Decoder::new(&bytes);
        assert!(decoder.next().unwrap().is_ok());
        assert_eq!(decoder.next().unwrap().unwrap_err().kind(), ErrorKind::BadMagic);
        assert!(decoder.next().is_none());
    }

    #[test]
    fn test_stream_roundtrip() {
        let mut wire = Vec::new();
        write_message(&mut wire, 1, &ping(7)).unwrap();
        write_message(&mut wire, 2, &OwnedValue::Struct(vec![OwnedValue::str("hi")])).unwrap();

        let mut reader = Cursor::new(wire);
        let first = read_message(&mut reader, Limits::default()).unwrap();
        assert_eq!(first.type_id(), 1);
        assert_eq!(first.payload, 7u32.to_le_bytes());
        let second = read_message(&mut reader, Limits::default()).unwrap();
        assert_eq!(second.envelope().payload, b"\x02\x00\x00\x00hi");

        let err = read_message(&mut reader, Limits::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_stream_rejects_oversized_payload() {
        let wire = MessageHeader::new(1, u32::MAX).to_bytes();
        let limits = Limits::default().with_max_message_size(1024);
        let err = read_message(&mut &wire[..], limits).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LimitExceeded);
    }
}
