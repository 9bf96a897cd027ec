//! 전송 통계

/// 한 실행의 최종 통계 (읽기 전용)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    /// 총 프레임 수 (체크섬 프레임 포함)
    pub total_frames: usize,

    /// 데이터 프레임 수
    pub data_frames: usize,

    /// 총 전송 시도 수
    pub total_tries: u64,

    /// 손실된 데이터 프레임 수
    pub lost: u64,

    /// 손상된 데이터 프레임 수
    pub corrupted: u64,

    /// 손실된 ACK 수
    pub ack_lost: u64,

    /// 손상된 체크섬 프레임 수
    pub checksum_corrupted: u64,

    /// 재시도 한도에 도달해 포기한 프레임 수
    pub abandoned: u64,

    /// 가장 많은 시도를 한 프레임의 시도 수
    pub max_tries: u32,

    /// 가장 많은 시도를 한 프레임 인덱스
    pub max_tries_frame: usize,
}

impl Stats {
    /// 프레임당 평균 시도 수
    pub fn average_tries(&self) -> f64 {
        if self.total_frames == 0 {
            return 0.0;
        }
        self.total_tries as f64 / self.total_frames as f64
    }

    /// 통계 요약 문자열
    pub fn summary(&self) -> String {
        format!(
            "=== SUMMARY ===\n\
             Total frames           : {} ({} data + 1 checksum)\n\
             Total tries            : {} (avg {:.2})\n\
             Most tries             : frame={} (tries={})\n\
             Lost frames            : {}\n\
             Corrupted frames       : {}\n\
             Lost ACKs              : {}\n\
             Corrupted checksum     : {}\n\
             Abandoned frames       : {}",
            self.total_frames,
            self.data_frames,
            self.total_tries,
            self.average_tries(),
            self.max_tries_frame,
            self.max_tries,
            self.lost,
            self.corrupted,
            self.ack_lost,
            self.checksum_corrupted,
            self.abandoned
        )
    }
}

/// ARQ 진행 중 통계 누적기
#[derive(Debug, Default)]
pub struct StatsAggregator {
    stats: Stats,
}

impl StatsAggregator {
    pub fn new(data_frames: usize) -> Self {
        Self {
            stats: Stats {
                total_frames: data_frames + 1,
                data_frames,
                ..Stats::default()
            },
        }
    }

    pub fn record_lost(&mut self) {
        self.stats.lost += 1;
    }

    pub fn record_corrupted(&mut self) {
        self.stats.corrupted += 1;
    }

    pub fn record_checksum_corrupted(&mut self) {
        self.stats.checksum_corrupted += 1;
    }

    pub fn record_ack_lost(&mut self) {
        self.stats.ack_lost += 1;
    }

    /// 프레임 한 개의 시도 종료 기록
    ///
    /// 최대 시도 프레임은 처음 도달한 프레임을 유지한다.
    pub fn record_frame(&mut self, index: usize, tries: u32, acknowledged: bool) {
        self.stats.total_tries += tries as u64;
        if tries > self.stats.max_tries {
            self.stats.max_tries = tries;
            self.stats.max_tries_frame = index;
        }
        if !acknowledged {
            self.stats.abandoned += 1;
        }
    }

    /// 현재까지의 통계
    pub fn snapshot(&self) -> &Stats {
        &self.stats
    }

    pub fn finish(self) -> Stats {
        self.stats
    }
}
