//! swlink - Stop-and-Wait 데이터 링크 시뮬레이터 CLI
//!
//! 파일을 비트열로 읽어 HDLC 프레임으로 만들고,
//! 손실/손상이 있는 채널 위에서 Stop-and-Wait 전달을 시뮬레이션한다.
//!
//! 사용법:
//!   cargo run --release --bin swlink -- <FILE> [OPTIONS]
//!
//! 예시:
//!   # 기본 실행 (단계마다 20ms 지연)
//!   cargo run --release --bin swlink -- message.dat
//!
//!   # 재현 가능한 실행, 지연 없음, 복원 메시지 출력
//!   cargo run --release --bin swlink -- message.dat --seed 42 --pacing-ms 0 --show-message

use std::path::PathBuf;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use swlink::{spawn_async, Config, Role, SimEvent, SimulationRun};

/// CLI 설정
struct CliConfig {
    input_path: Option<PathBuf>,
    show_message: bool,
    config: Config,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            input_path: None,
            show_message: false,
            config: Config::default(),
        }
    }
}

fn parse_args() -> Result<CliConfig, String> {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" | "-s" => {
                i += 1;
                let value = args.get(i).ok_or("--seed requires a number")?;
                let seed = value.parse().map_err(|_| format!("invalid seed: {}", value))?;
                cli.config = cli.config.with_seed(seed);
            }
            "--pacing-ms" | "-p" => {
                i += 1;
                let value = args.get(i).ok_or("--pacing-ms requires a number")?;
                let pacing = value
                    .parse()
                    .map_err(|_| format!("invalid pacing: {}", value))?;
                cli.config = cli.config.with_pacing_ms(pacing);
            }
            "--demo" => {
                cli.config = Config {
                    seed: cli.config.seed,
                    ..Config::demo()
                };
            }
            "--show-message" | "-m" => {
                cli.show_message = true;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            other if other.starts_with('-') => {
                return Err(format!("unknown argument: {}", other));
            }
            path => {
                cli.input_path = Some(PathBuf::from(path));
            }
        }
        i += 1;
    }

    Ok(cli)
}

fn print_help() {
    println!(
        r#"swlink - Stop-and-Wait 데이터 링크 시뮬레이터

HDLC 스타일 프레이밍 (CRC-16, 체크섬, 비트 스터핑) + Stop-and-Wait ARQ
- 데이터 프레임 손실 10%, 손상 20%
- 체크섬 프레임 손상 5%
- ACK 손실 15%
- 프레임당 최대 100회 시도

사용법:
  swlink <FILE> [OPTIONS]

옵션:
  -s, --seed <N>         채널 난수 시드 (기본: 매 실행 랜덤)
  -p, --pacing-ms <MS>   단계 알림 사이 지연 (기본: 20)
  --demo                 느린 표시 (250ms)
  -m, --show-message     실행 후 프레임을 디코딩하여 원본 메시지 출력
  -h, --help             이 도움말 출력
"#
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 로깅 설정
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = parse_args()?;
    let input_path = cli.input_path.ok_or("input file required (see --help)")?;

    // 소스 읽기 실패는 실행 전에 즉시 보고
    let run = SimulationRun::open(&input_path)?;
    info!("Loaded {:?}: {} bits", input_path, run.source().len());
    if let Some(seed) = cli.config.seed {
        info!("Seed: {}", seed);
    }

    let mut handle = spawn_async(run, cli.config);

    println!("{:<8} {}", "Frame", "CRC");
    while let Some(event) = handle.events.recv().await {
        match event {
            SimEvent::FrameCrcComputed { index, crc } => {
                println!("{:<8} 0x{:04X}", index, crc);
            }
            SimEvent::ChecksumComputed {
                checksum,
                raw_wrapped_sum,
            } => {
                println!();
                println!("CHECKSUM: 0x{:02X} (raw wrap 0x{:02X})", checksum, raw_wrapped_sum);
                println!();
                println!("=== Stop-and-Wait ===");
            }
            SimEvent::Delivery {
                role, step, message, ..
            } => {
                let marker = if step.is_failure() { "x" } else { " " };
                match role {
                    Role::Sender => println!("{} {:<32}", marker, message),
                    Role::Receiver => println!("{} {:<32} {}", marker, "", message),
                }
            }
            SimEvent::RunSummary(stats) => {
                println!();
                println!("{}", stats.summary());
            }
            SimEvent::RunFinished => break,
        }
    }

    let report = handle.join().await?;
    if report.stats.abandoned > 0 {
        warn!("{} frame(s) reached the retry limit", report.stats.abandoned);
    }

    if cli.show_message {
        let message = report.decoded_message()?;
        println!();
        println!("=== Decoded message ({} bytes) ===", message.len());
        println!("{}", String::from_utf8_lossy(&message));
    }

    Ok(())
}
