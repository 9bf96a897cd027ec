//! 프레임 코덱 기본 연산
//!
//! - CRC-16 (다항식 0x1021, 초기값 0xFFFF, 비트 직렬)
//! - 8비트 1의 보수 체크섬 (end-around carry)
//! - HDLC 비트 스터핑 / 역스터핑 (시작·끝 플래그 8비트는 제외)

use crate::{Error, Result, CRC_INIT, CRC_POLY};

/// 플래그 바이트 비트 수
const FLAG_BITS: usize = 8;

/// 스터핑 기준 연속 1 개수
const STUFF_RUN: u32 = 5;

/// 비트열에 대한 CRC-16 계산
pub fn crc16(bits: &[bool]) -> u16 {
    let mut crc = CRC_INIT;
    for &bit in bits {
        let xor_bit = ((crc >> 15) & 1 == 1) ^ bit;
        crc <<= 1;
        if xor_bit {
            crc ^= CRC_POLY;
        }
    }
    crc
}

/// 체크섬 계산 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checksum {
    /// 1의 보수 체크섬
    pub value: u8,

    /// 보수 이전 wrap 합 + 1 (표시용)
    pub raw_wrapped_sum: u16,
}

impl Checksum {
    /// 보수 이전의 wrap 합
    pub fn wrapped_sum(&self) -> u16 {
        self.raw_wrapped_sum - 1
    }
}

/// 바이트열에 대한 8비트 1의 보수 체크섬
pub fn checksum8(data: &[u8]) -> Checksum {
    let mut sum: u16 = 0;
    for &byte in data {
        sum += byte as u16;
        if sum > 0xFF {
            sum = (sum & 0xFF) + 1;
        }
    }
    Checksum {
        value: !(sum as u8),
        raw_wrapped_sum: sum + 1,
    }
}

/// 프레임 본문에 0 비트 삽입
///
/// 입력은 시작/끝 플래그를 포함한 전체 프레임 비트열.
pub fn stuff(frame: &[bool]) -> Vec<bool> {
    if frame.len() <= FLAG_BITS * 2 {
        return frame.to_vec();
    }

    let body_end = frame.len() - FLAG_BITS;
    let mut out = Vec::with_capacity(frame.len() + frame.len() / STUFF_RUN as usize);
    out.extend_from_slice(&frame[..FLAG_BITS]);

    let mut ones = 0u32;
    for &bit in &frame[FLAG_BITS..body_end] {
        out.push(bit);
        if bit {
            ones += 1;
            if ones == STUFF_RUN {
                out.push(false);
                ones = 0;
            }
        } else {
            ones = 0;
        }
    }

    out.extend_from_slice(&frame[body_end..]);
    out
}

/// `stuff`의 역연산
///
/// 다섯 개의 연속 1 다음 비트가 0이 아니면 `Error::InvalidStuffing`.
pub fn destuff(frame: &[bool]) -> Result<Vec<bool>> {
    if frame.len() < FLAG_BITS * 2 {
        return Err(Error::FrameLength { len: frame.len() });
    }

    let body_end = frame.len() - FLAG_BITS;
    let mut out = Vec::with_capacity(frame.len());
    out.extend_from_slice(&frame[..FLAG_BITS]);

    let mut ones = 0u32;
    for (offset, &bit) in frame[FLAG_BITS..body_end].iter().enumerate() {
        if ones == STUFF_RUN {
            if bit {
                return Err(Error::InvalidStuffing {
                    offset: offset + FLAG_BITS,
                });
            }
            ones = 0;
            continue;
        }

        out.push(bit);
        if bit {
            ones += 1;
        } else {
            ones = 0;
        }
    }

    out.extend_from_slice(&frame[body_end..]);
    Ok(out)
}
