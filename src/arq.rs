//! Stop-and-Wait ARQ 제어기
//!
//! 프레임 하나씩 전송 → 수신 → ACK 순서로 진행하며,
//! 프레임 손실 또는 ACK 손실 시 같은 프레임을 재전송한다.
//!
//! - 손상 판정은 통계와 알림만 남기고 전달 여부에는 영향이 없다.
//! - 체크섬 프레임은 손실 판정 없이 체크섬 손상 확률만 사용한다.
//! - `MAX_RETRY` 시도 후에도 ACK가 없으면 포기하고 다음 프레임으로 진행한다.

use std::time::Duration;

use tracing::{debug, warn};

use crate::channel::{ChannelSimulator, DrawSource, FrameRole};
use crate::event::{DeliveryStep, EventSink, SimEvent};
use crate::frame::{FrameKind, FrameTable};
use crate::stats::{Stats, StatsAggregator};
use crate::MAX_RETRY;

/// 프레임 한 개의 전달 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Acknowledged { tries: u32 },
    Abandoned { tries: u32 },
}

impl FrameOutcome {
    pub fn tries(&self) -> u32 {
        match *self {
            FrameOutcome::Acknowledged { tries } | FrameOutcome::Abandoned { tries } => tries,
        }
    }

    pub fn is_acknowledged(&self) -> bool {
        matches!(self, FrameOutcome::Acknowledged { .. })
    }
}

/// ARQ 제어기
pub struct ArqController<D, S> {
    draws: D,
    sink: S,
    pacing: Duration,
}

impl<D: DrawSource, S: EventSink> ArqController<D, S> {
    /// `pacing`은 단계 알림 사이의 표시용 지연 (0이면 지연 없음)
    pub fn new(draws: D, sink: S, pacing: Duration) -> Self {
        Self {
            draws,
            sink,
            pacing,
        }
    }

    /// 프레임 테이블 전체를 인덱스 순서로 전달
    pub fn run(&mut self, frames: &FrameTable) -> Stats {
        let mut stats = StatsAggregator::new(frames.data_frame_count());

        for (index, frame) in frames.frames().iter().enumerate() {
            let role = match frame.kind() {
                FrameKind::Data { index: frame_index } => {
                    debug_assert_eq!(frame_index, index);
                    FrameRole::Data
                }
                FrameKind::Checksum => FrameRole::Checksum,
            };

            let outcome = self.deliver(index, role, &mut stats);
            stats.record_frame(index, outcome.tries(), outcome.is_acknowledged());
        }

        stats.finish()
    }

    /// 프레임 한 개에 대한 재시도 루프
    pub fn deliver(
        &mut self,
        index: usize,
        role: FrameRole,
        stats: &mut StatsAggregator,
    ) -> FrameOutcome {
        let mut tries = 0;

        while tries < MAX_RETRY {
            tries += 1;
            self.announce(DeliveryStep::Sent, index);

            let lost = role == FrameRole::Data
                && ChannelSimulator::frame_lost(role, self.draws.draw());
            if lost {
                stats.record_lost();
                self.announce(DeliveryStep::Lost, index);
                continue;
            }

            if ChannelSimulator::frame_corrupted(role, self.draws.draw()) {
                match role {
                    FrameRole::Data => {
                        stats.record_corrupted();
                        self.announce(DeliveryStep::Corrupted, index);
                    }
                    FrameRole::Checksum => {
                        stats.record_checksum_corrupted();
                        self.announce(DeliveryStep::ChecksumCorrupted, index);
                    }
                }
            }

            self.announce(DeliveryStep::Received, index);

            if ChannelSimulator::ack_lost(self.draws.draw()) {
                stats.record_ack_lost();
                self.announce(DeliveryStep::AckLost, index);
                continue;
            }

            self.announce(DeliveryStep::AckReceived, index);
            debug!("프레임 {} ACK 수신 ({} tries)", index, tries);
            return FrameOutcome::Acknowledged { tries };
        }

        warn!("Frame {} abandoned after {} tries without ACK", index, tries);
        FrameOutcome::Abandoned { tries }
    }

    /// 소유한 싱크 반환
    pub fn into_sink(self) -> S {
        self.sink
    }

    fn announce(&mut self, step: DeliveryStep, index: usize) {
        self.sink.emit(SimEvent::delivery(step, index));
        if !self.pacing.is_zero() {
            std::thread::sleep(self.pacing);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::BitBuffer;
    use crate::channel::{ConstantDraw, ScriptedDraws};

    fn steps(events: &[SimEvent]) -> Vec<(usize, DeliveryStep)> {
        events
            .iter()
            .filter_map(|e| match e {
                SimEvent::Delivery { frame, step, .. } => Some((*frame, *step)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_clean_channel_one_try_per_frame() {
        let table = FrameTable::build(&BitBuffer::from_bytes(&[0x55; 40]));
        let mut arq = ArqController::new(ConstantDraw(99), Vec::new(), Duration::ZERO);

        let stats = arq.run(&table);

        assert_eq!(stats.total_frames, table.len());
        assert_eq!(stats.total_tries, table.len() as u64);
        assert_eq!(stats.max_tries, 1);
        assert_eq!(stats.max_tries_frame, 0);
        assert_eq!(stats.lost + stats.corrupted + stats.ack_lost, 0);

        let events = arq.into_sink();
        assert_eq!(events.len(), table.len() * 3);
    }

    #[test]
    fn test_loss_corruption_and_ack_loss_sequence() {
        // 1회차: 손실 / 2회차: 손상 + ACK 손실 / 3회차: 성공
        let draws = ScriptedDraws::new([5, 50, 10, 3, 50, 50, 50], 99);
        let table = FrameTable::build(&BitBuffer::from_bytes(&[0u8; 8]));
        let mut arq = ArqController::new(draws, Vec::new(), Duration::ZERO);

        let stats = arq.run(&table);

        assert_eq!(stats.lost, 1);
        assert_eq!(stats.corrupted, 1);
        assert_eq!(stats.ack_lost, 1);
        assert_eq!(stats.total_tries, 4);
        assert_eq!(stats.max_tries, 3);
        assert_eq!(stats.max_tries_frame, 0);

        use DeliveryStep::*;
        assert_eq!(
            steps(&arq.into_sink()),
            vec![
                (0, Sent),
                (0, Lost),
                (0, Sent),
                (0, Corrupted),
                (0, Received),
                (0, AckLost),
                (0, Sent),
                (0, Received),
                (0, AckReceived),
                (1, Sent),
                (1, Received),
                (1, AckReceived),
            ]
        );
    }

    #[test]
    fn test_checksum_frame_uses_checksum_probability() {
        // 체크섬 프레임: 손상 판정 4 (<5), ACK 판정 99
        let draws = ScriptedDraws::new([4, 99], 99);
        let table = FrameTable::build(&BitBuffer::new());
        let mut arq = ArqController::new(draws, Vec::new(), Duration::ZERO);

        let stats = arq.run(&table);

        assert_eq!(stats.checksum_corrupted, 1);
        assert_eq!(stats.corrupted, 0);
        assert_eq!(stats.total_tries, 1);

        let events = arq.into_sink();
        assert!(matches!(
            &events[1],
            SimEvent::Delivery { step: DeliveryStep::ChecksumCorrupted, message, .. }
                if message == "Checksum frame CORRUPTED"
        ));
    }

    #[test]
    fn test_forced_loss_hits_retry_cap() {
        let mut arq = ArqController::new(ConstantDraw(0), Vec::new(), Duration::ZERO);
        let mut stats = StatsAggregator::new(1);

        let outcome = arq.deliver(0, FrameRole::Data, &mut stats);

        assert_eq!(outcome, FrameOutcome::Abandoned { tries: MAX_RETRY });
        assert_eq!(stats.snapshot().lost, MAX_RETRY as u64);
        assert_eq!(stats.snapshot().ack_lost, 0);
        assert_eq!(arq.into_sink().len(), MAX_RETRY as usize * 2);
    }

    #[test]
    fn test_loss_until_first_clean_draw() {
        let mut script = vec![0u8; 37];
        script.extend([99, 99, 99]);
        let mut arq = ArqController::new(ScriptedDraws::new(script, 99), Vec::new(), Duration::ZERO);
        let mut stats = StatsAggregator::new(1);

        let outcome = arq.deliver(0, FrameRole::Data, &mut stats);

        assert_eq!(outcome, FrameOutcome::Acknowledged { tries: 38 });
        assert_eq!(stats.snapshot().lost, 37);
    }

    #[test]
    fn test_all_draws_fail_whole_run_terminates() {
        let table = FrameTable::build(&BitBuffer::from_bytes(&[0u8; 8]));
        let mut arq = ArqController::new(ConstantDraw(0), Vec::new(), Duration::ZERO);

        let stats = arq.run(&table);

        assert_eq!(stats.lost, 100);
        assert_eq!(stats.checksum_corrupted, 100);
        assert_eq!(stats.ack_lost, 100);
        assert_eq!(stats.abandoned, 2);
        assert_eq!(stats.total_tries, 200);
        assert_eq!(stats.max_tries, MAX_RETRY);
        assert_eq!(stats.max_tries_frame, 0);
    }
}
