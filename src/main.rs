//! # puzzle-timer 서버 진입점
//!
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. 설정 로딩
//! 4. SQLite 연결 풀 생성 (파일이 없으면 만듭니다)
//! 5. 마이그레이션 실행
//! 6. 공유 상태(`AppState`) 생성
//! 7. 라우터 설정 (`../frontend/dist`가 있으면 정적 파일도 함께 서빙)
//! 8. HTTP 서버 시작

// 핸들러와 모델은 라이브러리 크레이트(`puzzle_timer`)에 있고, 이 바이너리는 조립만 합니다.
// tests/ 아래 통합 테스트도 같은 라이브러리를 가져다 씁니다.
use anyhow::Result; // 어떤 에러든 담을 수 있는 범용 Result (main 전용)
use puzzle_timer::{config::Config, routes, services::clock::SystemClock, state::AppState};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions}; // 연결 옵션과 풀 설정
use std::{path::Path, str::FromStr, sync::Arc};
use tower_http::services::{ServeDir, ServeFile}; // 프런트엔드 정적 파일 서빙
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt}; // 로깅 초기화 유틸리티

/// 빌드된 프런트엔드 위치 (백엔드 디렉토리 기준)
const FRONTEND_DIST: &str = "../frontend/dist";

// #[tokio::main]: tokio 런타임을 만들고 async main을 그 안에서 실행합니다.
#[tokio::main]
async fn main() -> Result<()> {
    // ── 1단계: 환경변수 로딩 ──
    // .env 파일이 없어도 에러 없이 넘어가도록 .ok()로 결과를 버립니다.
    dotenvy::dotenv().ok();

    // ── 2단계: 로깅(tracing) 초기화 ──
    // RUST_LOG가 없으면 이 크레이트와 tower_http, axum을 debug 레벨로 출력합니다.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "puzzle_timer=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer()) // 터미널 출력 포맷터
        .init(); // 전역 구독자로 등록

    // ── 3단계: 설정 로딩 ──
    // 값이 없거나 잘못되면 기본값을 쓰므로 실패하지 않습니다.
    let config = Config::from_env();
    tracing::info!(
        "Starting puzzle-timer server on {}:{} (tick {:?})",
        config.host,
        config.port,
        config.tick_interval
    );

    // ── 4단계: DB 디렉토리 준비와 연결 풀 생성 ──
    // sqlite:data/puzzle-timer.db → data/ 디렉토리가 먼저 있어야 파일을 만들 수 있습니다.
    if let Some(parent) = sqlite_file_path(&config.database_url).and_then(|p| p.parent()) {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            tokio::fs::create_dir_all(parent).await?;
            tracing::info!("Created database directory: {}", parent.display());
        }
    }

    // create_if_missing: DB 파일이 없으면 새로 만듭니다.
    // foreign_keys: SQLite는 연결마다 외래키 검사를 켜야 ON DELETE CASCADE가 동작합니다.
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5) // 최대 5개의 동시 연결
        .connect_with(options)
        .await?;

    // ── 5단계: 마이그레이션 실행 ──
    // sqlx::migrate!는 컴파일 시점에 ./migrations의 SQL 파일들을 바이너리에 포함시킵니다.
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    // ── 6단계: 공유 상태 생성 ──
    // 실제 서버는 시스템 시계를 쓰고, 테스트는 같은 자리에 직접 움직이는 시계를 넣습니다.
    let state = AppState::new(pool, Arc::new(SystemClock), config.tick_interval);

    // ── 7단계: 라우터 설정 ──
    // 프런트엔드 빌드가 있으면 API 외의 경로는 정적 파일로, 없는 파일은 index.html로 보냅니다 (SPA).
    let app = if Path::new(FRONTEND_DIST).exists() {
        tracing::info!("Serving frontend static files from {}", FRONTEND_DIST);
        let serve_dir = ServeDir::new(FRONTEND_DIST)
            .not_found_service(ServeFile::new(format!("{FRONTEND_DIST}/index.html")));
        routes::app(state).fallback_service(serve_dir)
    } else {
        tracing::warn!("Frontend dist directory not found, serving API only");
        routes::app(state)
    };

    // ── 8단계: 서버 시작 ──
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// `sqlite:` URL에서 파일 경로 부분만 꺼냅니다. 메모리 DB면 `None`.
fn sqlite_file_path(url: &str) -> Option<&Path> {
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() || path.starts_with(":memory:") {
        None
    } else {
        Some(Path::new(path))
    }
}
