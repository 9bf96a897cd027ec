//! 비트 소스
//!
//! - 바이트 스트림을 MSB 우선 비트열로 전개
//! - 실행(run) 단위로 한 번 생성되고 이후 읽기 전용

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use bytes::{BufMut, Bytes, BytesMut};
use tracing::debug;

use crate::Result;

/// 순서가 있는 비트열 (MSB 우선)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitBuffer {
    bits: Vec<bool>,
}

impl BitBuffer {
    /// 빈 버퍼 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 바이트 슬라이스를 비트열로 전개
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut buffer = Self {
            bits: Vec::with_capacity(data.len() * 8),
        };
        for &byte in data {
            buffer.push_bits(byte as u32, 8);
        }
        buffer
    }

    /// `value`의 하위 `count` 비트를 MSB부터 추가
    pub fn push_bits(&mut self, value: u32, count: usize) {
        debug_assert!(count <= 32);
        for i in (0..count).rev() {
            self.bits.push((value >> i) & 1 == 1);
        }
    }

    pub fn extend_from_slice(&mut self, bits: &[bool]) {
        self.bits.extend_from_slice(bits);
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }

    /// 비트열을 바이트로 재구성
    ///
    /// 마지막 8비트 미만 조각은 MSB 쪽으로 정렬된다.
    pub fn to_bytes(&self) -> Bytes {
        let mut out = BytesMut::with_capacity((self.bits.len() + 7) / 8);
        for chunk in self.bits.chunks(8) {
            let mut byte = 0u8;
            for (i, &bit) in chunk.iter().enumerate() {
                if bit {
                    byte |= 0x80 >> i;
                }
            }
            out.put_u8(byte);
        }
        out.freeze()
    }
}

impl From<Vec<bool>> for BitBuffer {
    fn from(bits: Vec<bool>) -> Self {
        Self { bits }
    }
}

/// 바이트 소스 리더
pub struct BitSource;

impl BitSource {
    /// 파일 경로에서 비트열 로드
    pub fn open(path: impl AsRef<Path>) -> Result<BitBuffer> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let buffer = Self::read_from(BufReader::new(file))?;
        debug!("{:?} 로드: {} bits", path, buffer.len());
        Ok(buffer)
    }

    /// 임의의 리더에서 끝까지 읽어 비트열 생성
    pub fn read_from<R: Read>(mut reader: R) -> Result<BitBuffer> {
        let mut raw = Vec::new();
        reader.read_to_end(&mut raw)?;
        Ok(BitBuffer::from_bytes(&raw))
    }
}
