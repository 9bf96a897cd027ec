//! 시뮬레이션 이벤트
//!
//! 코어는 이벤트를 생성 순서대로 `EventSink`에 기록할 뿐이며,
//! 소비자는 코어의 판정에 영향을 주지 않는다.

use std::fmt;

use tracing::trace;

use crate::stats::Stats;

/// 이벤트 발생 측
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Sender,
    Receiver,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Sender => "sender",
            Role::Receiver => "receiver",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 프로토콜 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStep {
    Sent,
    Lost,
    Corrupted,
    ChecksumCorrupted,
    Received,
    AckLost,
    AckReceived,
}

impl DeliveryStep {
    /// 이 단계를 알리는 쪽
    pub fn role(&self) -> Role {
        match self {
            DeliveryStep::Received | DeliveryStep::AckLost => Role::Receiver,
            _ => Role::Sender,
        }
    }

    /// 손실/손상 계열 여부 (상태 표시용)
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            DeliveryStep::Lost
                | DeliveryStep::Corrupted
                | DeliveryStep::ChecksumCorrupted
                | DeliveryStep::AckLost
        )
    }

    /// 사람이 읽을 메시지
    pub fn describe(&self, index: usize) -> String {
        match self {
            DeliveryStep::Sent => format!("Frame {} sent", index),
            DeliveryStep::Lost => format!("Frame {} LOST", index),
            DeliveryStep::Corrupted => format!("Frame {} CORRUPTED", index),
            DeliveryStep::ChecksumCorrupted => "Checksum frame CORRUPTED".to_string(),
            DeliveryStep::Received => format!("Frame {} received", index),
            DeliveryStep::AckLost => format!("ACK lost (frame {})", index),
            DeliveryStep::AckReceived => format!("ACK received (frame {})", index),
        }
    }
}

/// 한 실행에서 발생하는 이벤트
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimEvent {
    /// 데이터 프레임 CRC 계산 (인덱스 순서)
    FrameCrcComputed { index: usize, crc: u16 },

    /// 전체 체크섬 계산 (데이터 프레임 이후 한 번)
    ChecksumComputed { checksum: u8, raw_wrapped_sum: u16 },

    /// 프로토콜 단계 알림
    Delivery {
        role: Role,
        step: DeliveryStep,
        frame: usize,
        message: String,
    },

    /// 최종 통계 (한 번)
    RunSummary(Stats),

    /// 종료 (마지막 이벤트)
    RunFinished,
}

impl SimEvent {
    pub fn delivery(step: DeliveryStep, frame: usize) -> Self {
        SimEvent::Delivery {
            role: step.role(),
            step,
            frame,
            message: step.describe(frame),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SimEvent::RunFinished)
    }
}

/// 이벤트 소비자
///
/// 전달 실패(수신측 종료)는 실행을 중단시키지 않는다.
pub trait EventSink {
    fn emit(&mut self, event: SimEvent);
}

impl EventSink for Vec<SimEvent> {
    fn emit(&mut self, event: SimEvent) {
        self.push(event);
    }
}

impl EventSink for crossbeam_channel::Sender<SimEvent> {
    fn emit(&mut self, event: SimEvent) {
        if self.send(event).is_err() {
            trace!("event receiver dropped");
        }
    }
}

impl EventSink for tokio::sync::mpsc::UnboundedSender<SimEvent> {
    fn emit(&mut self, event: SimEvent) {
        if self.send(event).is_err() {
            trace!("event receiver dropped");
        }
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: SimEvent) {
        (**self).emit(event)
    }
}
