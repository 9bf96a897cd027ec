//! 채널 시뮬레이터
//!
//! [0, 100) 구간의 균등 난수 하나로 손실/손상/ACK 손실 여부를 결정한다.
//! 각 판정은 새 난수를 사용하며 서로 독립이다.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{P_CORRUPT, P_CORRUPT_CHK, P_LOSS_ACK, P_LOSS_DATA};

/// 판정 대상 프레임 역할
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRole {
    Data,
    Checksum,
}

/// [0, 100) 난수 공급원
pub trait DrawSource {
    fn draw(&mut self) -> u8;
}

/// `rand::Rng` 기반 공급원
#[derive(Debug, Clone)]
pub struct RngDraws<R> {
    rng: R,
}

impl<R: Rng> RngDraws<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngDraws<StdRng> {
    /// 시드가 있으면 재현 가능, 없으면 엔트로피 사용
    pub fn seeded(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(rng)
    }
}

impl<R: Rng> DrawSource for RngDraws<R> {
    fn draw(&mut self) -> u8 {
        self.rng.gen_range(0..100)
    }
}

/// 항상 같은 값을 내는 공급원
///
/// `0`이면 모든 판정이 발생, `99`면 아무 판정도 발생하지 않는다.
#[derive(Debug, Clone, Copy)]
pub struct ConstantDraw(pub u8);

impl DrawSource for ConstantDraw {
    fn draw(&mut self) -> u8 {
        self.0
    }
}

/// 미리 정한 순서대로 값을 내고, 소진되면 `fallback` 반복
#[derive(Debug, Clone)]
pub struct ScriptedDraws {
    script: VecDeque<u8>,
    fallback: u8,
}

impl ScriptedDraws {
    pub fn new(script: impl IntoIterator<Item = u8>, fallback: u8) -> Self {
        Self {
            script: script.into_iter().collect(),
            fallback,
        }
    }

    /// 남은 스크립트 값 수
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl DrawSource for ScriptedDraws {
    fn draw(&mut self) -> u8 {
        self.script.pop_front().unwrap_or(self.fallback)
    }
}

impl<D: DrawSource + ?Sized> DrawSource for &mut D {
    fn draw(&mut self) -> u8 {
        (**self).draw()
    }
}

/// 무상태 확률 판정기
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelSimulator;

impl ChannelSimulator {
    /// 프레임 손실 (데이터 프레임만 해당)
    pub fn frame_lost(role: FrameRole, draw: u8) -> bool {
        role == FrameRole::Data && draw < P_LOSS_DATA
    }

    /// 프레임 손상 (역할별 확률)
    pub fn frame_corrupted(role: FrameRole, draw: u8) -> bool {
        match role {
            FrameRole::Data => draw < P_CORRUPT,
            FrameRole::Checksum => draw < P_CORRUPT_CHK,
        }
    }

    /// ACK 손실 (역할 무관)
    pub fn ack_lost(draw: u8) -> bool {
        draw < P_LOSS_ACK
    }
}
