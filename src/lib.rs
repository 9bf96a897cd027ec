//! # swlink
//!
//! 점대점 직렬 링크의 데이터 링크 계층 시뮬레이터
//!
//! ## 구성
//! - **비트 소스**: 바이트 스트림 → MSB 우선 비트열
//! - **프레임 코덱**: CRC-16, 1의 보수 체크섬, HDLC 비트 스터핑
//! - **채널 시뮬레이터**: 손실/손상/ACK 손실 확률 판정
//! - **Stop-and-Wait ARQ**: 프레임별 재전송 루프 (최대 100회)
//! - **통계**: 시도/손실/손상 집계와 최악 프레임 기록
//! - **이벤트 채널**: 표시 계층과 분리된 순서 보장 이벤트 스트림

pub mod arq;
pub mod bits;
pub mod channel;
pub mod codec;
pub mod config;
pub mod error;
pub mod event;
pub mod frame;
pub mod simulator;
pub mod stats;

pub use arq::{ArqController, FrameOutcome};
pub use bits::{BitBuffer, BitSource};
pub use channel::{ChannelSimulator, DrawSource, FrameRole, RngDraws};
pub use codec::{checksum8, crc16, destuff, stuff, Checksum};
pub use config::Config;
pub use error::{Error, Result};
pub use event::{DeliveryStep, EventSink, Role, SimEvent};
pub use frame::{CrcTable, Frame, FrameKind, FrameTable, ParsedFrame};
pub use simulator::{spawn, spawn_async, RunReport, SimulationRun};
pub use stats::{Stats, StatsAggregator};

/// 프레임당 payload 비트 수
pub const PAYLOAD_BITS: usize = 100;

/// 프레임당 최대 전송 시도 수
pub const MAX_RETRY: u32 = 100;

/// 데이터 프레임 손실 확률 (%)
pub const P_LOSS_DATA: u8 = 10;

/// 데이터 프레임 손상 확률 (%)
pub const P_CORRUPT: u8 = 20;

/// ACK 손실 확률 (%)
pub const P_LOSS_ACK: u8 = 15;

/// 체크섬 프레임 손상 확률 (%)
pub const P_CORRUPT_CHK: u8 = 5;

/// HDLC 플래그 바이트 (01111110)
pub const FLAG_BYTE: u8 = 0x7E;

/// 송신측 주소
pub const SENDER_ADDR: u8 = 0x01;

/// 수신측 주소
pub const RECEIVER_ADDR: u8 = 0x02;

/// 체크섬 제어 프레임 코드
pub const CTRL_CHECKSUM: u8 = 0xCC;

/// CRC-16/CCITT 다항식
pub const CRC_POLY: u16 = 0x1021;

/// CRC 초기값
pub const CRC_INIT: u16 = 0xFFFF;

/// 기본 단계 알림 지연 (밀리초)
pub const DEFAULT_PACING_MS: u64 = 20;
