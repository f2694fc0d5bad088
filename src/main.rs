mod config;
mod llm;
mod logging;
mod render;
mod tools;

use std::ffi::OsString;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use dotenvy::dotenv;
use tracing::{debug, info};

use crate::config::{AppConfig, DEFAULT_LOG_LEVEL};
use crate::llm::{ChatHistory, OllamaClient, ToolRuntime, is_connect_error, run_agent_loop};
use crate::render::{OutputMode, Theme, make_sink};
use crate::tools::{LocalTools, SecurityChecker, Shell};

const EXAMPLES: &str = r#"Examples:
  orun "how to create new branch"
  orun "calculate 1245*1457"    # uses the run_command tool
  orun "what time is it"        # uses the get_current_date tool
  orun -md=llama3 "hello"      # same as --md llama3"#;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "orun",
    version,
    about = "Ask a local Ollama model, letting it run tools along the way",
    after_help = EXAMPLES
)]
struct Cli {
    /// The prompt to send
    prompt: Option<String>,

    /// Alternative way to give the prompt
    #[arg(short = 'm', long = "message")]
    message: Option<String>,

    /// Model name [default: mistral-large-3:675b-cloud]
    #[arg(long, visible_alias = "md")]
    model: Option<String>,

    /// Chat endpoint [default: http://localhost:11434/api/chat]
    #[arg(long)]
    url: Option<String>,

    /// Write the response as plain text, without markdown rendering
    #[arg(long)]
    plain: bool,

    /// Log level (error,warn,info,debug,trace)
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// The positional prompt wins over `--message`; empty strings do not count.
    fn prompt_text(&self) -> Option<String> {
        self.prompt
            .clone()
            .filter(|p| !p.trim().is_empty())
            .or_else(|| self.message.clone().filter(|m| !m.trim().is_empty()))
    }
}

/// Accept the single-dash `-md` spelling, which clap would otherwise read as
/// `-m` with the value `d=...`.
fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut after_separator = false;
    args.into_iter()
        .map(|arg| {
            if after_separator {
                return arg;
            }
            let rewritten = match arg.to_str() {
                Some("--") => {
                    after_separator = true;
                    None
                }
                Some("-md") => Some(OsString::from("--md")),
                Some(s) if s.starts_with("-md=") => Some(OsString::from(format!("-{s}"))),
                _ => None,
            };
            rewritten.unwrap_or(arg)
        })
        .collect()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenv().ok();
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));

    let Some(prompt) = cli.prompt_text() else {
        eprintln!("Error: No prompt provided!");
        eprintln!("Usage: orun \"your question here\"");
        return ExitCode::FAILURE;
    };

    match run(&cli, prompt).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            if is_connect_error(&e) {
                eprintln!("Make sure Ollama is running: ollama serve");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, prompt: String) -> Result<()> {
    let cfg = {
        let early_level = cli
            .log_level
            .clone()
            .or_else(|| std::env::var("ORUN_LOG").ok())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
        let _guard = logging::bootstrap_logging(&early_level);
        AppConfig::from_cli(cli)?
    };
    logging::init_logging(&cfg.log_level, cfg.log_file.as_deref())?;
    debug!(?cfg, "app config");

    let shell = cfg
        .shell
        .as_deref()
        .map(Shell::named)
        .unwrap_or_else(Shell::detect);
    let local = LocalTools::new(shell, SecurityChecker::new(cfg.allowed_commands.clone()));
    let runtime = ToolRuntime::new(local).with_max_turns(cfg.max_turns);
    let client = OllamaClient::with_llm_config(cfg.url.clone(), cfg.llm.clone())?;

    let mode = OutputMode::detect(cfg.markdown);
    let mut sink = make_sink(mode, Theme::by_name(&cfg.theme), cfg.refresh_per_second);
    info!(model = %cfg.model, url = %cfg.url, ?mode, "starting session");

    let history = ChatHistory::new(cfg.system_prompt.clone(), prompt);
    let outcome = run_agent_loop(&client, &cfg.model, history, &runtime, &mut *sink).await?;
    debug!(
        turns = outcome.turns,
        answered = outcome.final_answer.is_some(),
        messages = outcome.messages.len(),
        "session finished"
    );
    Ok(())
}
