use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::FrameError;
use crate::traits::CorrelationId;

/// Frame header: magic (2) + kind (1) + id (8) + name length (2) + payload length (4).
pub const HEADER_SIZE: usize = 17;

/// Magic bytes: "WB" (0x57 0x42).
pub const MAGIC: [u8; 2] = [0x57, 0x42];

/// Default maximum payload size: 16 MiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 16 * 1024 * 1024;

/// Default maximum channel name length.
pub const DEFAULT_MAX_NAME_LEN: usize = 1024;

type Result<T> = std::result::Result<T, FrameError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FrameKind {
    Request = 1,
    Reply = 2,
}

impl TryFrom<u8> for FrameKind {
    type Error = FrameError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(FrameKind::Request),
            2 => Ok(FrameKind::Reply),
            other => Err(FrameError::InvalidKind(other)),
        }
    }
}

/// One request or reply on a byte stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub kind: FrameKind,
    pub id: CorrelationId,
    /// Target channel name. Empty on replies.
    pub name: String,
    pub payload: Bytes,
}

impl Frame {
    pub fn request(id: CorrelationId, name: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            kind: FrameKind::Request,
            id,
            name: name.into(),
            payload: payload.into(),
        }
    }

    pub fn reply(id: CorrelationId, payload: impl Into<Bytes>) -> Self {
        Self {
            kind: FrameKind::Reply,
            id,
            name: String::new(),
            payload: payload.into(),
        }
    }

    /// The total wire size of this frame.
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.name.len() + self.payload.len()
    }
}

/// Configuration for the frame codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default: 16 MiB.
    pub max_payload_size: usize,
    /// Maximum channel name length in bytes. Default: 1024.
    pub max_name_len: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
            max_name_len: DEFAULT_MAX_NAME_LEN,
        }
    }
}

impl FrameConfig {
    /// Reject a name or payload that the peer would refuse.
    pub fn check(&self, name_len: usize, payload_len: usize) -> Result<()> {
        let max_name = self.max_name_len.min(u16::MAX as usize);
        if name_len > max_name {
            return Err(FrameError::NameTooLong {
                len: name_len,
                max: max_name,
            });
        }
        let max_payload = self.max_payload_size.min(u32::MAX as usize);
        if payload_len > max_payload {
            return Err(FrameError::PayloadTooLarge {
                size: payload_len,
                max: max_payload,
            });
        }
        Ok(())
    }
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌───────────┬──────┬─────────┬──────────┬──────────┬──────┬─────────┐
/// │ Magic 2B  │ Kind │ Id      │ NameLen  │ Len      │ Name │ Payload │
/// │ "WB"      │ 1B   │ (8B LE) │ (2B LE)  │ (4B LE)  │      │         │
/// └───────────┴──────┴─────────┴──────────┴──────────┴──────┴─────────┘
/// ```
pub fn encode_frame(frame: &Frame, config: &FrameConfig, dst: &mut BytesMut) -> Result<()> {
    config.check(frame.name.len(), frame.payload.len())?;
    dst.reserve(frame.wire_size());
    dst.put_slice(&MAGIC);
    dst.put_u8(frame.kind as u8);
    dst.put_u64_le(frame.id.0);
    dst.put_u16_le(frame.name.len() as u16);
    dst.put_u32_le(frame.payload.len() as u32);
    dst.put_slice(frame.name.as_bytes());
    dst.put_slice(&frame.payload);
    Ok(())
}

/// Decode a frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer.
pub fn decode_frame(src: &mut BytesMut, config: &FrameConfig) -> Result<Option<Frame>> {
    if src.len() < HEADER_SIZE {
        return Ok(None);
    }

    if src[0..2] != MAGIC {
        return Err(FrameError::InvalidMagic);
    }

    let mut header = &src[2..HEADER_SIZE];
    let kind = FrameKind::try_from(header.get_u8())?;
    let id = CorrelationId(header.get_u64_le());
    let name_len = usize::from(header.get_u16_le());
    let payload_len = header.get_u32_le() as usize;

    config.check(name_len, payload_len)?;

    let total = HEADER_SIZE + name_len + payload_len;
    if src.len() < total {
        src.reserve(total - src.len());
        return Ok(None);
    }

    src.advance(HEADER_SIZE);
    let name = src.split_to(name_len);
    let name = std::str::from_utf8(&name)
        .map_err(|_| FrameError::InvalidName)?
        .to_string();
    let payload = src.split_to(payload_len).freeze();

    Ok(Some(Frame {
        kind,
        id,
        name,
        payload,
    }))
}

/// `tokio_util` codec adapter over [`encode_frame`] / [`decode_frame`].
#[cfg(feature = "stream")]
#[derive(Debug, Clone, Default)]
pub struct WireCodec {
    config: FrameConfig,
}

#[cfg(feature = "stream")]
impl WireCodec {
    pub fn new(config: FrameConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

#[cfg(feature = "stream")]
impl tokio_util::codec::Decoder for WireCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>> {
        decode_frame(src, &self.config)
    }
}

#[cfg(feature = "stream")]
impl tokio_util::codec::Encoder<Frame> for WireCodec {
    type Error = FrameError;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<()> {
        encode_frame(&frame, &self.config, dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> FrameConfig {
        FrameConfig::default()
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let frame = Frame::request(CorrelationId(7), "wirebridge.HostApi", &b"payload"[..]);
        let mut buf = BytesMut::new();
        encode_frame(&frame, &config(), &mut buf).unwrap();
        assert_eq!(buf.len(), frame.wire_size());
        assert_eq!(&buf[0..2], b"WB");

        let decoded = decode_frame(&mut buf, &config()).unwrap().unwrap();
        assert_eq!(decoded, frame);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_incomplete_header() {
        let mut buf = BytesMut::from(&b"WB\x01"[..]);
        assert!(decode_frame(&mut buf, &config()).unwrap().is_none());
    }

    #[test]
    fn test_decode_incomplete_body() {
        let frame = Frame::reply(CorrelationId(1), &b"0123456789"[..]);
        let mut full = BytesMut::new();
        encode_frame(&frame, &config(), &mut full).unwrap();

        let mut partial = BytesMut::from(&full[..full.len() - 3]);
        assert!(decode_frame(&mut partial, &config()).unwrap().is_none());
        assert_eq!(partial.len(), full.len() - 3);
    }

    #[test]
    fn test_decode_invalid_magic() {
        let mut buf = BytesMut::from(&[0u8; HEADER_SIZE][..]);
        assert!(matches!(
            decode_frame(&mut buf, &config()),
            Err(FrameError::InvalidMagic)
        ));
    }

    #[test]
    fn test_decode_invalid_kind() {
        let frame = Frame::reply(CorrelationId(1), Bytes::new());
        let mut buf = BytesMut::new();
        encode_frame(&frame, &config(), &mut buf).unwrap();
        buf[2] = 9;
        assert!(matches!(
            decode_frame(&mut buf, &config()),
            Err(FrameError::InvalidKind(9))
        ));
    }

    #[test]
    fn test_payload_too_large() {
        let small = FrameConfig {
            max_payload_size: 4,
            ..FrameConfig::default()
        };
        let frame = Frame::reply(CorrelationId(1), &b"too big"[..]);
        let mut buf = BytesMut::new();
        assert!(matches!(
            encode_frame(&frame, &small, &mut buf),
            Err(FrameError::PayloadTooLarge { size: 7, max: 4 })
        ));

        encode_frame(&frame, &config(), &mut buf).unwrap();
        assert!(matches!(
            decode_frame(&mut buf, &small),
            Err(FrameError::PayloadTooLarge { .. })
        ));
    }

    #[test]
    fn test_name_too_long() {
        let small = FrameConfig {
            max_name_len: 3,
            ..FrameConfig::default()
        };
        let frame = Frame::request(CorrelationId(1), "long-name", Bytes::new());
        assert!(matches!(
            encode_frame(&frame, &small, &mut BytesMut::new()),
            Err(FrameError::NameTooLong { len: 9, max: 3 })
        ));
    }

    #[test]
    fn test_multiple_frames() {
        let mut buf = BytesMut::new();
        for id in 1..=3u64 {
            let frame = Frame::request(CorrelationId(id), "c", vec![id as u8; id as usize]);
            encode_frame(&frame, &config(), &mut buf).unwrap();
        }
        for id in 1..=3u64 {
            let frame = decode_frame(&mut buf, &config()).unwrap().unwrap();
            assert_eq!(frame.id, CorrelationId(id));
            assert_eq!(frame.payload.len(), id as usize);
        }
        assert!(decode_frame(&mut buf, &config()).unwrap().is_none());
    }
}
