//! Azure resource MCP server over stdio.
//!
//! Resolves one ambient Azure identity, aggregates every tool group and
//! serves MCP on stdin/stdout until the client disconnects or the process is
//! signalled. The credential is closed on every exit path.

use std::sync::Arc;

use azure_resource_mcp::credential::{run_with_credential, DefaultAzureCredential, TokenCredential};
use azure_resource_mcp::groups;
use azure_resource_mcp::mcp::{McpServer, StopReason};
use azure_resource_mcp::observability::{init_tracing, LogFormat};
use azure_resource_mcp::tools::{ConflictPolicy, ToolRegistry};
use azure_resource_mcp::types::IdentityConfig;
use azure_resource_mcp::Config;
use clap::Parser;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Parser)]
#[command(name = "azure-mcp-server", version, about = "Azure resource profiles as MCP tools")]
struct Args {
    /// Log line format on stderr.
    #[arg(long, env = "AZURE_MCP_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// How duplicate tool names across groups are resolved.
    #[arg(long, env = "AZURE_MCP_CONFLICT_POLICY")]
    conflict_policy: Option<ConflictPolicy>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = Config::from_env()?;
    if let Some(policy) = args.conflict_policy {
        config.server.conflict_policy = policy;
    }
    let format = args.log_format.unwrap_or(if config.observability.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Text
    });
    init_tracing(format);

    tracing::info!(
        name = %config.server.name,
        version = %config.server.version,
        endpoint = %config.arm.endpoint,
        "Azure resource MCP server starting"
    );

    let identity = config.identity.clone();
    let result = run_with_credential(|| open_credential(identity), |lifespan| async move {
        let registry = ToolRegistry::aggregate(groups::all(), config.server.conflict_policy)?;
        tracing::info!(tools = registry.len(), "Tool groups registered");

        let server = McpServer::new(registry, lifespan, config.arm, config.server);
        spawn_shutdown_on_signal(server.shutdown_token());

        server
            .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    })
    .await;

    if let Err(e) = &result {
        tracing::error!(error = %e, "Azure resource MCP server failed");
    }
    let reason = result?;
    tracing::info!(?reason, "Azure resource MCP server stopped");

    // A pending stdin read cannot be cancelled and would keep the runtime
    // from dropping until the client writes or closes the pipe.
    if reason == StopReason::Shutdown {
        std::process::exit(0);
    }
    Ok(())
}

async fn open_credential(identity: IdentityConfig) -> azure_resource_mcp::Result<Arc<dyn TokenCredential>> {
    let credential = DefaultAzureCredential::from_env(&identity)?;
    tracing::info!(source = credential.source(), "Azure identity resolved");
    Ok(Arc::new(credential))
}

/// Cancel `token` on SIGINT or SIGTERM.
///
/// Handlers are registered before this returns so a signal that arrives
/// while the server is starting is not lost.
fn spawn_shutdown_on_signal(token: CancellationToken) {
    #[cfg(unix)]
    let terminate = {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(term) => Some(term),
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                None
            }
        }
    };

    tokio::spawn(async move {
        #[cfg(unix)]
        {
            tokio::select! {
                _ = until_signalled("SIGINT", tokio::signal::ctrl_c()) => {}
                _ = until_terminated(terminate) => {}
            }
        }
        #[cfg(not(unix))]
        {
            until_signalled("SIGINT", tokio::signal::ctrl_c()).await;
        }

        tracing::info!("Shutdown signal received");
        token.cancel();
    });
}

/// Resolve when `listener` reports its signal. A listener that fails to
/// install never resolves, so the server keeps running.
async fn until_signalled<F>(name: &str, listener: F)
where
    F: std::future::Future<Output = std::io::Result<()>>,
{
    if let Err(e) = listener.await {
        tracing::warn!(signal = name, error = %e, "Signal handler unavailable");
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn until_terminated(terminate: Option<tokio::signal::unix::Signal>) {
    if let Some(mut term) = terminate {
        if term.recv().await.is_some() {
            return;
        }
    }
    std::future::pending::<()>().await
}
