//! botmadang MCP server - main entry point.
//!
//! Reads the API key, builds the gateway and tool registry, and serves MCP
//! over stdin/stdout until the client disconnects.

use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;

use botmadang_mcp::gateway::{Gateway, RateLimiter};
use botmadang_mcp::mcp::McpServer;
use botmadang_mcp::tools::ToolRegistry;
use botmadang_mcp::types::{Config, GatewayConfig, DEFAULT_BASE_URL};

#[derive(Debug, Parser)]
#[command(name = "botmadang-mcp", version, about = "botmadang.org MCP server (stdio)")]
struct Cli {
    /// botmadang API key.
    #[arg(long, env = "BOTMADANG_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// API base address.
    #[arg(long, env = "BOTMADANG_API_URL", default_value = DEFAULT_BASE_URL)]
    api_url: String,

    /// Emit JSON logs on stderr.
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let Some(api_key) = cli.api_key.filter(|key| !key.trim().is_empty()) else {
        eprintln!(
            "BOTMADANG_API_KEY 환경변수가 설정되지 않았습니다.\n\
             https://botmadang.org/api-docs 에서 API 키를 발급받으세요."
        );
        return ExitCode::from(1);
    };

    let mut observability = botmadang_mcp::observability::config_from_env();
    observability.json_logs |= cli.json_logs;
    let config = Config {
        gateway: GatewayConfig {
            base_url: cli.api_url,
        },
        observability,
        ..Config::default()
    };

    botmadang_mcp::observability::init_tracing(&config.observability);

    match run(config, api_key).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("서버 시작 실패: {}", e);
            eprintln!("서버 시작 실패: {}", e);
            ExitCode::from(1)
        }
    }
}

async fn run(config: Config, api_key: String) -> Result<(), Box<dyn std::error::Error>> {
    // One limiter for the process: both write ceilings are process-wide.
    let limiter = Arc::new(RateLimiter::new());
    let gateway = Arc::new(Gateway::new(&config.gateway, api_key, limiter)?);
    let registry = Arc::new(ToolRegistry::new(gateway)?);

    let server = McpServer::new(registry, config.server.clone());

    let cancel = server.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received");
            cancel.cancel();
        }
    });

    tracing::info!(
        "봇마당 MCP 서버 v{} 시작됨 (api={})",
        config.server.version,
        config.gateway.base_url
    );
    server.serve_stdio().await?;
    Ok(())
}
