use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::Cli;
use crate::render::MAX_REFRESH_PER_SECOND;

pub const DEFAULT_URL: &str = "http://localhost:11434/api/chat";
pub const DEFAULT_MODEL: &str = "mistral-large-3:675b-cloud";
pub const DEFAULT_LOG_LEVEL: &str = "warn";
pub const DEFAULT_REFRESH_PER_SECOND: u32 = 10;
pub const PROJECT_CONFIG: &str = ".orun/config.toml";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.
- Be concise, accurate, and practical.
- You have access to tools (run_command, get_current_date).
- Use run_command to solve math problems (e.g. with echo or python), check files, or get system info.
- Answer in plain language unless the user explicitly asks for code.";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub url: String,
    pub model: String,
    pub max_turns: usize,
    pub theme: String,
    /// False when `--plain` was given or the config disables formatting.
    pub markdown: bool,
    pub refresh_per_second: u32,
    pub system_prompt: String,
    /// Shell program for `run_command`; detected per platform when unset.
    pub shell: Option<String>,
    pub allowed_commands: Vec<String>,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LlmConfig {
    pub connect_timeout_ms: u64,
    /// Upper bound on waiting for the next piece of a streamed response.
    pub request_timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 5_000,
            request_timeout_ms: 120_000,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct FileConfig {
    pub url: Option<String>,
    pub model: Option<String>,
    pub max_turns: Option<usize>,
    pub theme: Option<String>,
    pub markdown: Option<bool>,
    pub refresh_per_second: Option<u32>,
    pub system_prompt: Option<String>,
    pub shell: Option<String>,
    pub allowed_commands: Option<Vec<String>>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
    pub llm: Option<PartialLlmConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PartialLlmConfig {
    pub connect_timeout_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
}

impl FileConfig {
    /// Fill every unset key of `self` from `lower`.
    pub fn or(self, lower: FileConfig) -> FileConfig {
        let llm = match (self.llm, lower.llm) {
            (Some(hi), Some(lo)) => Some(PartialLlmConfig {
                connect_timeout_ms: hi.connect_timeout_ms.or(lo.connect_timeout_ms),
                request_timeout_ms: hi.request_timeout_ms.or(lo.request_timeout_ms),
            }),
            (hi, lo) => hi.or(lo),
        };
        FileConfig {
            url: self.url.or(lower.url),
            model: self.model.or(lower.model),
            max_turns: self.max_turns.or(lower.max_turns),
            theme: self.theme.or(lower.theme),
            markdown: self.markdown.or(lower.markdown),
            refresh_per_second: self.refresh_per_second.or(lower.refresh_per_second),
            system_prompt: self.system_prompt.or(lower.system_prompt),
            shell: self.shell.or(lower.shell),
            allowed_commands: self.allowed_commands.or(lower.allowed_commands),
            log_level: self.log_level.or(lower.log_level),
            log_file: self.log_file.or(lower.log_file),
            llm,
        }
    }
}

impl AppConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let project_root = std::env::current_dir().context("resolve current dir")?;
        let project_cfg = load_project_config(&project_root)?;
        let file_cfg = load_file_config()?;
        Ok(Self::merge(
            cli,
            |key| std::env::var(key).ok(),
            project_cfg.or(file_cfg),
        ))
    }

    /// CLI flags beat environment variables, which beat config files.
    pub(crate) fn merge(
        cli: &Cli,
        env: impl Fn(&str) -> Option<String>,
        files: FileConfig,
    ) -> Self {
        let var = |key: &str| env(key).filter(|v| !v.is_empty());

        let url = cli
            .url
            .clone()
            .or_else(|| var("ORUN_URL"))
            .or(files.url)
            .unwrap_or_else(|| DEFAULT_URL.to_string());
        let model = cli
            .model
            .clone()
            .or_else(|| var("ORUN_MODEL"))
            .or(files.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let log_level = cli
            .log_level
            .clone()
            .or_else(|| var("ORUN_LOG"))
            .or(files.log_level)
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        let llm_defaults = LlmConfig::default();
        let llm = match files.llm {
            Some(p) => LlmConfig {
                connect_timeout_ms: p
                    .connect_timeout_ms
                    .unwrap_or(llm_defaults.connect_timeout_ms),
                request_timeout_ms: p
                    .request_timeout_ms
                    .unwrap_or(llm_defaults.request_timeout_ms),
            },
            None => llm_defaults,
        };

        Self {
            url,
            model,
            max_turns: files
                .max_turns
                .filter(|n| *n > 0)
                .unwrap_or(crate::llm::MAX_TURNS),
            theme: files.theme.unwrap_or_else(|| "dark".to_string()),
            markdown: !cli.plain && files.markdown.unwrap_or(true),
            refresh_per_second: files
                .refresh_per_second
                .filter(|n| *n > 0)
                .map(|n| n.min(MAX_REFRESH_PER_SECOND))
                .unwrap_or(DEFAULT_REFRESH_PER_SECOND),
            system_prompt: files
                .system_prompt
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            shell: files.shell,
            allowed_commands: files.allowed_commands.unwrap_or_default(),
            log_level,
            log_file: files.log_file,
            llm,
        }
    }
}

/// Global config locations, most specific first.
pub fn candidate_paths(env: impl Fn(&str) -> Option<String>) -> Vec<PathBuf> {
    let mut v = Vec::new();
    if let Some(p) = env("ORUN_CONFIG") {
        v.push(PathBuf::from(p));
    }
    if let Some(xdg_home) = env("XDG_CONFIG_HOME") {
        v.push(Path::new(&xdg_home).join("orun/config.toml"));
    }
    if let Some(dir) = dirs::config_dir() {
        let p = dir.join("orun/config.toml");
        if !v.contains(&p) {
            v.push(p);
        }
    }
    v
}

pub fn load_file_config() -> Result<FileConfig> {
    load_first_config(&candidate_paths(|key| std::env::var(key).ok()))
}

/// Load the first existing candidate that parses. Unparsable files are skipped.
pub fn load_first_config(candidates: &[PathBuf]) -> Result<FileConfig> {
    for p in candidates {
        if !p.exists() {
            continue;
        }
        let s =
            fs::read_to_string(p).with_context(|| format!("read config file: {}", p.display()))?;
        match toml::from_str::<FileConfig>(&s) {
            Ok(cfg) => {
                info!(path=%p.display(), "loaded config file");
                return Ok(cfg);
            }
            Err(e) => {
                warn!(path=%p.display(), error=%e.to_string(), "parse config failed");
            }
        }
    }
    Ok(FileConfig::default())
}

/// Load project-specific configuration from `.orun/config.toml`.
pub fn load_project_config(project_root: &Path) -> Result<FileConfig> {
    let path = project_root.join(PROJECT_CONFIG);
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let s = fs::read_to_string(&path)
        .with_context(|| format!("read project config file: {}", path.display()))?;
    match toml::from_str::<FileConfig>(&s) {
        Ok(cfg) => {
            info!(path=%path.display(), "loaded project config file");
            Ok(cfg)
        }
        Err(e) => {
            warn!(path=%path.display(), error=%e.to_string(), "parse project config failed");
            Ok(FileConfig::default())
        }
    }
}
