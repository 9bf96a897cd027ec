//! 시뮬레이션 실행
//!
//! - `SimulationRun`: 한 실행의 소유 상태 (비트열 → 프레임 → ARQ → 통계)
//! - `spawn`: 전용 스레드 + crossbeam 채널
//! - `spawn_async`: tokio blocking 태스크 + tokio mpsc 채널
//!
//! 실행 상태는 워커만 소유하며, 결과는 종료 후 `RunReport`로만 돌려준다.

use std::any::Any;
use std::path::Path;
use std::thread;

use bytes::Bytes;
use tokio::sync::mpsc;
use tracing::info;

use crate::arq::ArqController;
use crate::bits::{BitBuffer, BitSource};
use crate::channel::{DrawSource, RngDraws};
use crate::event::{EventSink, SimEvent};
use crate::frame::FrameTable;
use crate::stats::Stats;
use crate::{Config, Error, Result};

/// 한 번의 시뮬레이션 실행
#[derive(Debug, Clone)]
pub struct SimulationRun {
    source: BitBuffer,
}

/// 종료된 실행의 결과
#[derive(Debug, Clone)]
pub struct RunReport {
    /// 원본 비트 수
    pub bit_len: usize,

    /// 생성된 프레임 (체크섬 프레임 포함)
    pub frames: FrameTable,

    /// 최종 통계
    pub stats: Stats,
}

impl RunReport {
    /// 프레임을 디코딩하여 원본 바이트 복원
    pub fn decoded_message(&self) -> Result<Bytes> {
        Ok(self.frames.reassemble(self.bit_len)?.to_bytes())
    }
}

impl SimulationRun {
    /// 파일에서 실행 생성 (읽기 실패는 즉시 `Error::Io`)
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_bits(BitSource::open(path)?))
    }

    pub fn from_bytes(data: &[u8]) -> Self {
        Self::from_bits(BitBuffer::from_bytes(data))
    }

    pub fn from_bits(source: BitBuffer) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &BitBuffer {
        &self.source
    }

    /// 설정의 시드로 채널 난수를 만들어 실행
    pub fn run<S: EventSink>(self, config: &Config, sink: S) -> RunReport {
        self.execute(RngDraws::seeded(config.seed), sink, config)
    }

    /// 프레임 생성 후 Stop-and-Wait 전달까지 순차 실행
    ///
    /// 이벤트 순서: CRC × 데이터 프레임 수 → 체크섬 → 전달 단계들 → 요약 → 종료
    pub fn execute<D: DrawSource, S: EventSink>(
        self,
        draws: D,
        mut sink: S,
        config: &Config,
    ) -> RunReport {
        let frames = FrameTable::build(&self.source);

        for (index, crc) in frames.crcs().iter() {
            sink.emit(SimEvent::FrameCrcComputed { index, crc });
        }
        let checksum = frames.checksum();
        sink.emit(SimEvent::ChecksumComputed {
            checksum: checksum.value,
            raw_wrapped_sum: checksum.raw_wrapped_sum,
        });

        info!(
            "Stop-and-Wait simulation: {} bits, {} frames",
            self.source.len(),
            frames.len()
        );

        let stats = ArqController::new(draws, &mut sink, config.pacing()).run(&frames);

        info!(
            "시뮬레이션 완료: tries={}, lost={}, corrupted={}, ack_lost={}",
            stats.total_tries, stats.lost, stats.corrupted, stats.ack_lost
        );

        sink.emit(SimEvent::RunSummary(stats.clone()));
        sink.emit(SimEvent::RunFinished);

        RunReport {
            bit_len: self.source.len(),
            frames,
            stats,
        }
    }
}

/// 스레드 워커 핸들
pub struct SimulationHandle {
    /// 이벤트 수신기 (생성 순서 보장, 무제한 버퍼)
    pub events: crossbeam_channel::Receiver<SimEvent>,

    handle: thread::JoinHandle<RunReport>,
}

impl SimulationHandle {
    /// 워커 종료 대기
    pub fn join(self) -> Result<RunReport> {
        self.handle
            .join()
            .map_err(|payload| Error::WorkerFailed(panic_message(payload)))
    }
}

/// 패닉 payload에서 메시지 추출
fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// 전용 스레드에서 실행 시작
pub fn spawn(run: SimulationRun, config: Config) -> Result<SimulationHandle> {
    let (tx, rx) = crossbeam_channel::unbounded();

    let handle = thread::Builder::new()
        .name("swlink-worker".to_string())
        .spawn(move || run.run(&config, tx))?;

    Ok(SimulationHandle { events: rx, handle })
}

/// tokio 워커 핸들
pub struct AsyncSimulationHandle {
    /// 이벤트 수신기 (생성 순서 보장, 무제한 버퍼)
    pub events: mpsc::UnboundedReceiver<SimEvent>,

    handle: tokio::task::JoinHandle<RunReport>,
}

impl AsyncSimulationHandle {
    /// 워커 종료 대기
    pub async fn join(self) -> Result<RunReport> {
        self.handle
            .await
            .map_err(|e| Error::WorkerFailed(e.to_string()))
    }
}

/// tokio blocking 풀에서 실행 시작
///
/// 현재 tokio 런타임 안에서 호출해야 한다.
pub fn spawn_async(run: SimulationRun, config: Config) -> AsyncSimulationHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::task::spawn_blocking(move || run.run(&config, tx));

    AsyncSimulationHandle { events: rx, handle }
}
