//! 프레임 정의와 프레임 테이블 생성
//!
//! 데이터 프레임 (스터핑 전, 164 bits):
//!
//! ```text
//! | 0x7E | 0x01 | 0x02 | seq:16 | payload:100 | crc:16 | 0x7E |
//! ```
//!
//! 체크섬 제어 프레임 (스터핑 전, 48 bits):
//!
//! ```text
//! | 0x7E | 0x01 | 0x02 | 0xCC | checksum:8 | 0x7E |
//! ```

use bytes::{BufMut, Bytes, BytesMut};
use tracing::debug;

use crate::bits::BitBuffer;
use crate::codec::{self, Checksum};
use crate::{
    Error, Result, CTRL_CHECKSUM, FLAG_BYTE, PAYLOAD_BITS, RECEIVER_ADDR, SENDER_ADDR,
};

/// 헤더 길이 (flag + sender + receiver)
const HEADER_BITS: usize = 24;

/// 스터핑 전 데이터 프레임 길이
pub const DATA_FRAME_BITS: usize = HEADER_BITS + 16 + PAYLOAD_BITS + 16 + 8;

/// 스터핑 전 체크섬 프레임 길이
pub const CHECKSUM_FRAME_BITS: usize = HEADER_BITS + 8 + 8 + 8;

/// 프레임 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// 데이터 프레임 (0부터 시작하는 인덱스)
    Data { index: usize },

    /// 체크섬 제어 프레임
    Checksum,
}

/// 스터핑이 끝난 전송 단위 (생성 후 불변)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    kind: FrameKind,
    bits: Vec<bool>,
}

/// 역스터핑 후 복원한 프레임 필드
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedFrame {
    Data {
        seq: u16,
        payload: Vec<bool>,
        crc: u16,
    },
    Checksum {
        checksum: u8,
    },
}

impl Frame {
    /// 데이터 프레임 생성
    ///
    /// `payload`는 정확히 `PAYLOAD_BITS` 길이여야 한다.
    /// 시퀀스 필드는 16비트이므로 65536번째 프레임부터 순환한다.
    pub fn data(index: usize, payload: &[bool], crc: u16) -> Self {
        debug_assert_eq!(payload.len(), PAYLOAD_BITS);

        let mut raw = BitBuffer::new();
        push_header(&mut raw);
        raw.push_bits(index as u32 & 0xFFFF, 16);
        raw.extend_from_slice(payload);
        raw.push_bits(crc as u32, 16);
        raw.push_bits(FLAG_BYTE as u32, 8);

        Self {
            kind: FrameKind::Data { index },
            bits: codec::stuff(raw.as_slice()),
        }
    }

    /// 체크섬 제어 프레임 생성
    pub fn checksum(value: u8) -> Self {
        let mut raw = BitBuffer::new();
        push_header(&mut raw);
        raw.push_bits(CTRL_CHECKSUM as u32, 8);
        raw.push_bits(value as u32, 8);
        raw.push_bits(FLAG_BYTE as u32, 8);

        Self {
            kind: FrameKind::Checksum,
            bits: codec::stuff(raw.as_slice()),
        }
    }

    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    /// 스터핑된 비트열
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// 역스터핑 후 필드 디코딩 (플래그, 주소, 길이, CRC 검증)
    pub fn parse(&self) -> Result<ParsedFrame> {
        parse_bits(&self.bits)
    }
}

fn push_header(raw: &mut BitBuffer) {
    raw.push_bits(FLAG_BYTE as u32, 8);
    raw.push_bits(SENDER_ADDR as u32, 8);
    raw.push_bits(RECEIVER_ADDR as u32, 8);
}

fn read_field(bits: &[bool], start: usize, count: usize) -> u32 {
    bits[start..start + count]
        .iter()
        .fold(0u32, |acc, &bit| (acc << 1) | bit as u32)
}

/// 스터핑된 비트열을 프레임 필드로 디코딩
pub fn parse_bits(stuffed: &[bool]) -> Result<ParsedFrame> {
    let bits = codec::destuff(stuffed)?;
    let len = bits.len();
    if len != DATA_FRAME_BITS && len != CHECKSUM_FRAME_BITS {
        return Err(Error::FrameLength { len });
    }

    for start in [0, len - 8] {
        let flag = read_field(&bits, start, 8) as u8;
        if flag != FLAG_BYTE {
            return Err(Error::InvalidFlag {
                expected: FLAG_BYTE,
                got: flag,
            });
        }
    }

    for (start, expected) in [(8, SENDER_ADDR), (16, RECEIVER_ADDR)] {
        let addr = read_field(&bits, start, 8) as u8;
        if addr != expected {
            return Err(Error::InvalidAddress {
                expected,
                got: addr,
            });
        }
    }

    if len == CHECKSUM_FRAME_BITS {
        let code = read_field(&bits, HEADER_BITS, 8) as u8;
        if code != CTRL_CHECKSUM {
            return Err(Error::UnknownControl { code });
        }
        return Ok(ParsedFrame::Checksum {
            checksum: read_field(&bits, HEADER_BITS + 8, 8) as u8,
        });
    }

    let seq = read_field(&bits, HEADER_BITS, 16) as u16;
    let payload_start = HEADER_BITS + 16;
    let payload = bits[payload_start..payload_start + PAYLOAD_BITS].to_vec();
    let crc = read_field(&bits, payload_start + PAYLOAD_BITS, 16) as u16;

    let computed = codec::crc16(&payload);
    if computed != crc {
        return Err(Error::CrcMismatch {
            expected: crc,
            got: computed,
        });
    }

    Ok(ParsedFrame::Data { seq, payload, crc })
}

/// 데이터 프레임 인덱스 순서의 CRC 목록
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrcTable {
    crcs: Vec<u16>,
}

impl CrcTable {
    pub fn push(&mut self, crc: u16) {
        self.crcs.push(crc);
    }

    pub fn get(&self, index: usize) -> Option<u16> {
        self.crcs.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.crcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crcs.is_empty()
    }

    /// (인덱스, CRC) 순회
    pub fn iter(&self) -> impl Iterator<Item = (usize, u16)> + '_ {
        self.crcs.iter().copied().enumerate()
    }

    /// 각 CRC를 big-endian으로 이어 붙인 바이트열 (체크섬 입력)
    pub fn to_be_bytes(&self) -> Bytes {
        let mut out = BytesMut::with_capacity(self.crcs.len() * 2);
        for &crc in &self.crcs {
            out.put_u16(crc);
        }
        out.freeze()
    }
}

/// 한 실행의 전체 프레임 (마지막 항목은 항상 체크섬 프레임)
#[derive(Debug, Clone)]
pub struct FrameTable {
    frames: Vec<Frame>,
    crcs: CrcTable,
    checksum: Checksum,
}

impl FrameTable {
    /// 비트열을 `PAYLOAD_BITS` 단위로 잘라 프레임 생성
    ///
    /// 마지막 데이터 프레임의 payload는 0으로 채운다.
    pub fn build(source: &BitBuffer) -> Self {
        let data_frames = (source.len() + PAYLOAD_BITS - 1) / PAYLOAD_BITS;
        let mut frames = Vec::with_capacity(data_frames + 1);
        let mut crcs = CrcTable::default();
        let mut payload = [false; PAYLOAD_BITS];

        for (index, chunk) in source.as_slice().chunks(PAYLOAD_BITS).enumerate() {
            payload[..chunk.len()].copy_from_slice(chunk);
            payload[chunk.len()..].fill(false);

            let crc = codec::crc16(&payload);
            crcs.push(crc);
            frames.push(Frame::data(index, &payload, crc));
        }

        let checksum = codec::checksum8(&crcs.to_be_bytes());
        frames.push(Frame::checksum(checksum.value));

        debug!(
            "프레임 생성 완료: {} 데이터 + 1 체크섬, checksum={:02X}",
            crcs.len(),
            checksum.value
        );

        Self {
            frames,
            crcs,
            checksum,
        }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// 전체 프레임 수 (체크섬 프레임 포함)
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// 체크섬 프레임이 항상 있으므로 비는 경우는 없다.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn data_frame_count(&self) -> usize {
        self.crcs.len()
    }

    pub fn crcs(&self) -> &CrcTable {
        &self.crcs
    }

    pub fn checksum(&self) -> Checksum {
        self.checksum
    }

    /// 모든 프레임을 디코딩하여 원본 비트열 복원
    ///
    /// 시퀀스 번호, CRC, 체크섬 프레임을 검증하고 0 패딩을 잘라낸다.
    pub fn reassemble(&self, bit_len: usize) -> Result<BitBuffer> {
        let (last, data) = self
            .frames
            .split_last()
            .ok_or(Error::MissingChecksumFrame)?;

        let mut out = BitBuffer::new();
        let mut received = CrcTable::default();

        for (index, frame) in data.iter().enumerate() {
            match frame.parse()? {
                ParsedFrame::Data { seq, payload, crc } => {
                    let expected = (index & 0xFFFF) as u16;
                    if seq != expected {
                        return Err(Error::SequenceMismatch { expected, got: seq });
                    }
                    received.push(crc);
                    out.extend_from_slice(&payload);
                }
                ParsedFrame::Checksum { .. } => return Err(Error::FrameLength { len: frame.len() }),
            }
        }

        match last.parse()? {
            ParsedFrame::Checksum { checksum } => {
                let computed = codec::checksum8(&received.to_be_bytes()).value;
                if computed != checksum {
                    return Err(Error::ChecksumMismatch {
                        expected: checksum,
                        got: computed,
                    });
                }
            }
            ParsedFrame::Data { .. } => return Err(Error::MissingChecksumFrame),
        }

        let mut bits = out.as_slice().to_vec();
        bits.truncate(bit_len);
        Ok(BitBuffer::from(bits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_count_invariant() {
        for n in [0usize, 1, 8, 12, 13, 25, 26, 100, 1000] {
            let source = BitBuffer::from_bytes(&vec![0xA5; n]);
            let table = FrameTable::build(&source);

            let expected = (8 * n + PAYLOAD_BITS - 1) / PAYLOAD_BITS;
            assert_eq!(table.data_frame_count(), expected, "n={}", n);
            assert_eq!(table.len(), expected + 1);
            assert_eq!(table.frames().last().unwrap().kind(), FrameKind::Checksum);
        }
    }

    #[test]
    fn test_all_zero_eight_bytes() {
        let table = FrameTable::build(&BitBuffer::from_bytes(&[0u8; 8]));

        assert_eq!(table.len(), 2);
        assert_eq!(table.crcs().get(0), Some(0xCE98));
        assert_eq!(table.crcs().to_be_bytes().as_ref(), &[0xCE, 0x98]);
        assert_eq!(table.checksum().value, 0x98);
        assert_eq!(table.checksum().raw_wrapped_sum, 0x68);
    }

    #[test]
    fn test_empty_source_checksum_frame() {
        let table = FrameTable::build(&BitBuffer::new());

        assert_eq!(table.data_frame_count(), 0);
        assert_eq!(table.len(), 1);
        assert_eq!(table.checksum().value, 0xFF);
        assert_eq!(table.checksum().raw_wrapped_sum, 1);
        assert_eq!(
            table.frames()[0].parse().unwrap(),
            ParsedFrame::Checksum { checksum: 0xFF }
        );
    }

    #[test]
    fn test_data_frame_layout() {
        let payload = [false; PAYLOAD_BITS];
        let frame = Frame::data(3, &payload, 0xCE98);
        let raw = codec::destuff(frame.bits()).unwrap();

        assert_eq!(frame.kind(), FrameKind::Data { index: 3 });
        assert_eq!(raw.len(), DATA_FRAME_BITS);
        assert_eq!(read_field(&raw, 0, 8), 0x7E);
        assert_eq!(read_field(&raw, 8, 8), 0x01);
        assert_eq!(read_field(&raw, 16, 8), 0x02);
        assert_eq!(read_field(&raw, 24, 16), 3);
        assert_eq!(read_field(&raw, 140, 16), 0xCE98);
        assert_eq!(read_field(&raw, 156, 8), 0x7E);
    }

    #[test]
    fn test_checksum_frame_layout() {
        let frame = Frame::checksum(0xFF);
        let raw = codec::destuff(frame.bits()).unwrap();

        assert_eq!(raw.len(), CHECKSUM_FRAME_BITS);
        assert_eq!(read_field(&raw, 24, 8), CTRL_CHECKSUM as u32);
        assert_eq!(read_field(&raw, 32, 8), 0xFF);
        // 0xFF 체크섬은 스터핑 비트 1개 추가
        assert_eq!(frame.len(), CHECKSUM_FRAME_BITS + 1);
    }

    #[test]
    fn test_parse_detects_crc_mismatch() {
        let payload = [true; PAYLOAD_BITS];
        let frame = Frame::data(0, &payload, 0x1234);

        assert!(matches!(
            frame.parse(),
            Err(Error::CrcMismatch { expected: 0x1234, .. })
        ));
    }

    #[test]
    fn test_parse_rejects_bad_flag() {
        let mut bits = Frame::checksum(0x00).bits().to_vec();
        bits[0] = true;

        assert!(matches!(
            parse_bits(&bits),
            Err(Error::InvalidFlag { got: 0xFE, .. })
        ));
    }

    #[test]
    fn test_reassemble_restores_source() {
        let data = b"HDLC framing over a noisy serial link";
        let source = BitBuffer::from_bytes(data);
        let table = FrameTable::build(&source);

        let restored = table.reassemble(source.len()).unwrap();
        assert_eq!(restored, source);
        assert_eq!(restored.to_bytes().as_ref(), data);
    }

    #[test]
    fn test_parse_rejects_bad_address() {
        let mut raw = codec::destuff(Frame::checksum(0x00).bits()).unwrap();
        // 송신 주소 0x01 → 0x00
        raw[15] = false;

        assert!(matches!(
            parse_bits(&codec::stuff(&raw)),
            Err(Error::InvalidAddress {
                expected: SENDER_ADDR,
                got: 0x00
            })
        ));
    }

    #[test]
    fn test_parse_rejects_unknown_control() {
        let mut raw = BitBuffer::new();
        push_header(&mut raw);
        raw.push_bits(0xAA, 8);
        raw.push_bits(0x00, 8);
        raw.push_bits(FLAG_BYTE as u32, 8);
        assert_eq!(raw.len(), CHECKSUM_FRAME_BITS);

        assert!(matches!(
            parse_bits(&codec::stuff(raw.as_slice())),
            Err(Error::UnknownControl { code: 0xAA })
        ));
    }

    #[test]
    fn test_reassemble_detects_swapped_frames() {
        let source = BitBuffer::from_bytes(&[0x5A; 40]);
        let mut table = FrameTable::build(&source);
        assert!(table.data_frame_count() >= 2);

        table.frames.swap(0, 1);

        assert!(matches!(
            table.reassemble(source.len()),
            Err(Error::SequenceMismatch {
                expected: 0,
                got: 1
            })
        ));
    }

    #[test]
    fn test_reassemble_detects_checksum_mismatch() {
        let source = BitBuffer::from_bytes(b"checksum frame mismatch");
        let mut table = FrameTable::build(&source);
        let value = table.checksum().value;

        let last = table.frames.len() - 1;
        table.frames[last] = Frame::checksum(value ^ 1);

        match table.reassemble(source.len()) {
            Err(Error::ChecksumMismatch { expected, got }) => {
                assert_eq!(expected, value ^ 1);
                assert_eq!(got, value);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_reassemble_requires_checksum_frame() {
        let source = BitBuffer::from_bytes(b"no trailer");
        let mut table = FrameTable::build(&source);

        table.frames.pop();
        assert!(matches!(
            table.reassemble(source.len()),
            Err(Error::MissingChecksumFrame)
        ));

        table.frames.clear();
        assert!(matches!(
            table.reassemble(0),
            Err(Error::MissingChecksumFrame)
        ));
    }
}
