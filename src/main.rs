//! Main entry point for the ClawGate gateway CLI.
//!
//! Runs one gated execution: `clawgate <command> [intent...]`. The special
//! first argument `killswitch` invokes the administrative termination
//! action instead of the verdict pipeline.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use futures::future::BoxFuture;
use tokio::io::AsyncBufReadExt;

use clawgate::config::SafetyConfig;
use clawgate::gateway::{ConfirmationHandler, SafeExecutor, rpc};
use clawgate::overseer::{Auditor, OllamaClassifier};
use clawgate::sandbox::{DockerSandbox, KillSwitch, SandboxRegistry};
use clawgate::tool::{ExecRequest, run_exec_tool};
use clawgate::utils;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging before anything else
    utils::logger::init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(first) = args.first() else {
        eprintln!("usage: clawgate <command> [intent...]");
        eprintln!("       clawgate killswitch");
        std::process::exit(2);
    };

    let registry = Arc::new(SandboxRegistry::new());

    if first == rpc::ACTION_KILLSWITCH {
        let switch = KillSwitch::new(registry);
        let response = rpc::handle_request(&switch, rpc::ACTION_KILLSWITCH).await;
        println!("{}", serde_json::to_string_pretty(&response)?);
        std::process::exit(if response["ok"] == true { 0 } else { 1 });
    }

    let config_dir =
        std::env::var("CLAWGATE_CONFIG_DIR").unwrap_or_else(|_| "scripts".to_string());
    let config = SafetyConfig::load(&PathBuf::from(config_dir));

    let workspace =
        std::env::var("CLAWGATE_WORKSPACE").unwrap_or_else(|_| "./workspace".to_string());
    let image =
        std::env::var("CLAWGATE_IMAGE").unwrap_or_else(|_| "clawgate-runtime".to_string());

    let auditor = Auditor::new(OllamaClassifier::local_default(), config.guardrails);
    let sandbox = DockerSandbox::new(image, workspace, registry);
    let gate = SafeExecutor::new(auditor, sandbox).with_confirmation(stdin_confirmation());

    let mut request = ExecRequest::command(first.clone());
    if args.len() > 1 {
        request.intent = Some(args[1..].join(" "));
    }

    let response = run_exec_tool(&gate, &request).await;
    println!("{}", response.content);

    // Signal-style or out-of-range codes collapse to a plain failure
    let exit_code = response.details.exit_code;
    let code = if (0..=255).contains(&exit_code) { exit_code } else { 1 };
    std::process::exit(code);
}

/// Interactive confirmation on stdin: only an explicit `y`/`yes` approves.
fn stdin_confirmation() -> ConfirmationHandler {
    Arc::new(|message| {
        Box::pin(async move {
            println!("{message}");
            print!("Proceed? [y/N] ");
            if std::io::stdout().flush().is_err() {
                return false;
            }
            let mut line = String::new();
            let mut reader = tokio::io::BufReader::new(tokio::io::stdin());
            match reader.read_line(&mut line).await {
                Ok(_) => matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
                Err(_) => false,
            }
        }) as BoxFuture<'static, bool>
    })
}
