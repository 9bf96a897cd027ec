//! 에러 타입 정의

use thiserror::Error;

/// swlink 에러 타입
///
/// 시뮬레이션 실행 중 발생 가능한 에러는 `Io` 뿐이다.
/// 손실/손상/ACK 손실은 에러가 아니라 프로토콜 이벤트로 처리된다.
/// 나머지 변형은 프레임 디코딩(역스터핑, 파싱)에서만 발생한다.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO 에러: {0}")]
    Io(#[from] std::io::Error),

    #[error("유효하지 않은 플래그: expected {expected:02X}, got {got:02X}")]
    InvalidFlag { expected: u8, got: u8 },

    #[error("유효하지 않은 주소: expected {expected:02X}, got {got:02X}")]
    InvalidAddress { expected: u8, got: u8 },

    #[error("비트 스터핑 위반: bit_offset={offset}")]
    InvalidStuffing { offset: usize },

    #[error("프레임 길이 불일치: {len} bits")]
    FrameLength { len: usize },

    #[error("알 수 없는 제어 코드: {code:02X}")]
    UnknownControl { code: u8 },

    #[error("CRC 불일치: expected {expected:04X}, got {got:04X}")]
    CrcMismatch { expected: u16, got: u16 },

    #[error("체크섬 불일치: expected {expected:02X}, got {got:02X}")]
    ChecksumMismatch { expected: u8, got: u8 },

    #[error("체크섬 프레임 누락")]
    MissingChecksumFrame,

    #[error("시퀀스 번호 불일치: expected {expected}, got {got}")]
    SequenceMismatch { expected: u16, got: u16 },

    #[error("워커 종료 에러: {0}")]
    WorkerFailed(String),
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, Error>;
