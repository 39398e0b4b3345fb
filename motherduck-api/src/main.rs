//! MotherDuck SQL API 服务入口

use anyhow::Context;
use common::config::{self, AppConfig};
use motherduck_api::{create_router, AppState};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SERVICE_NAME: &str = "motherduck-api";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 需在日志初始化前加载，RUST_LOG 可能来自其中
    let env_file = config::load_dotenv();

    // 初始化日志追踪
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    if let Some(path) = &env_file {
        info!(path = %path.display(), "已加载 .env 文件");
    }

    // 加载配置
    let config = AppConfig::from_env().context("加载配置失败")?;

    if config.target.requires_token() && config.motherduck_token.is_none() {
        warn!("MOTHERDUCK_TOKEN 未设置，/test 与 /query 将返回错误");
    }

    // 创建应用状态
    let state = AppState::new(config.clone());
    let pool_manager = state.pool_manager.clone();

    // 创建路由
    let app = create_router(state);

    // 启动服务
    let addr = config.bind_address();
    info!(
        service = SERVICE_NAME,
        address = %addr,
        target_db = %config.target,
        reuse_connections = config.reuse_connections,
        query_cache_size = config.query_cache_size,
        "启动服务"
    );

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("绑定地址失败: {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("服务运行失败")?;

    pool_manager.close_all().await;
    info!(service = SERVICE_NAME, "服务已停止");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "无法监听 Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "无法监听 SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("收到停止信号，正在关闭");
}
