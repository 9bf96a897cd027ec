//! 시뮬레이터 설정
//!
//! 프로토콜 상수(payload 크기, 확률, 재시도 한도)는 고정이며 `lib.rs`에 있다.
//! 여기에는 표시 속도와 난수 시드만 둔다.

use std::time::Duration;

use crate::DEFAULT_PACING_MS;

/// 시뮬레이터 설정
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// 단계 알림 사이 지연 (밀리초)
    /// 0이면 지연 없이 진행
    pub pacing_ms: u64,

    /// 채널 난수 시드
    /// None이면 실행마다 엔트로피 사용
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pacing_ms: DEFAULT_PACING_MS, // 20ms
            seed: None,
        }
    }
}

impl Config {
    /// 새 설정 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 지연 없는 설정 (테스트, 일괄 처리용)
    pub fn instant() -> Self {
        Self {
            pacing_ms: 0,
            seed: None,
        }
    }

    /// 화면 관찰용 느린 설정
    pub fn demo() -> Self {
        Self {
            pacing_ms: 250,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_pacing_ms(mut self, pacing_ms: u64) -> Self {
        self.pacing_ms = pacing_ms;
        self
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}
