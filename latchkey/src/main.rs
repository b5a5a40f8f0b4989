use latchkey::DaemonConfig;
use latchkey_core::id::ConversationId;
use std::io::Read;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level CLI failure.
#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Load(#[from] latchkey::ConfigError),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(err) = run_cli().await {
        eprintln!("latchkey error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), CliError> {
    let mut args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let mut config_path: Option<PathBuf> = None;
    let mut prompt: Option<String> = None;
    let mut conversation_id: Option<String> = None;
    let mut state_dir: Option<PathBuf> = None;

    while let Some(flag) = args.first().cloned() {
        args.remove(0);
        match flag.as_str() {
            "--config" => config_path = Some(PathBuf::from(take_arg("--config", &mut args)?)),
            "--prompt" => prompt = Some(take_arg("--prompt", &mut args)?),
            "--conversation-id" => conversation_id = Some(take_arg("--conversation-id", &mut args)?),
            "--state-dir" => state_dir = Some(PathBuf::from(take_arg("--state-dir", &mut args)?)),
            other => return Err(CliError::Config(format!("unknown flag: {other}"))),
        }
    }

    let mut config = match config_path {
        Some(path) => DaemonConfig::from_path(&path)?,
        None => {
            let default_path = PathBuf::from("latchkey.json");
            if default_path.exists() {
                DaemonConfig::from_path(&default_path)?
            } else {
                DaemonConfig::default()
            }
        }
    };

    if let Some(dir) = state_dir {
        config.state_backend = latchkey::StateBackendConfig::Fs { root: dir };
    }

    let user_message = match prompt {
        Some(text) => text,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            let trimmed = buffer.trim().to_string();
            if trimmed.is_empty() {
                return Err(CliError::Config("missing prompt: pass --prompt or pipe stdin".to_string()));
            }
            trimmed
        }
    };

    let conversation = ConversationId::new(conversation_id.unwrap_or_else(|| "default".to_string()));
    let orchestrator = config.build_orchestrator()?;

    let span = tracing::info_span!("turn", conversation = conversation.as_str());
    let _enter = span.enter();
    let reply = orchestrator.handle_turn(&conversation, &user_message).await;
    drop(_enter);

    println!("{reply}");
    Ok(())
}

fn take_arg(flag: &str, remaining: &mut Vec<String>) -> Result<String, CliError> {
    if remaining.is_empty() {
        return Err(CliError::Config(format!("missing value for {flag}")));
    }
    Ok(remaining.remove(0))
}

fn print_usage() {
    println!(
        "latchkey [--config latchkey.json] [--prompt TEXT] [--conversation-id ID] [--state-dir PATH]\n\
         Reads the prompt from stdin when --prompt is omitted."
    );
}
