//! Platform definition for vendor-specific CLI behavior.

use regex::bytes::Regex;

use crate::channel::{combine_prompt_patterns, compile_prompt_pattern};
use crate::error::PlatformError;

/// Everything the session needs to know about a vendor CLI.
#[derive(Debug, Clone)]
pub struct PlatformDefinition {
    /// Device type name (e.g., "cisco_ios", "juniper_junos").
    pub name: String,

    /// Matches any prompt the device may show.
    pub prompt: Regex,

    /// Prompt of the unprivileged mode, if the platform has one.
    pub unprivileged_prompt: Option<Regex>,

    /// Command that leaves the unprivileged mode.
    pub escalate_command: Option<String>,

    /// Password prompt shown by the escalate command.
    pub escalate_auth_prompt: Option<Regex>,

    /// Either a prompt or the password prompt, read after escalating.
    pub escalate_reply: Option<Regex>,

    /// Commands that enter configuration mode.
    pub config_enter: Vec<String>,

    /// Commands that apply and leave configuration mode.
    pub config_exit: Vec<String>,

    /// Commands to run when the session opens (paging off, width).
    pub on_open_commands: Vec<String>,

    pub terminal_width: u32,

    pub terminal_height: u32,
}

impl PlatformDefinition {
    /// Create a platform whose prompt is any of `prompts`.
    pub fn new(name: impl Into<String>, prompts: &[&str]) -> Result<Self, PlatformError> {
        Ok(Self {
            name: name.into(),
            prompt: combine_prompt_patterns(prompts)?,
            unprivileged_prompt: None,
            escalate_command: None,
            escalate_auth_prompt: None,
            escalate_reply: None,
            config_enter: vec![],
            config_exit: vec![],
            on_open_commands: vec![],
            terminal_width: 511,
            terminal_height: 24,
        })
    }

    /// Set the unprivileged prompt and how to escalate out of it.
    pub fn with_escalation(
        mut self,
        prompt: &str,
        command: impl Into<String>,
        auth_prompt: &str,
    ) -> Result<Self, PlatformError> {
        let auth_prompt = compile_prompt_pattern(auth_prompt)?;
        let reply = Regex::new(&format!(
            "(?:{})|(?:{})",
            self.prompt.as_str(),
            auth_prompt.as_str()
        ))?;

        self.unprivileged_prompt = Some(compile_prompt_pattern(prompt)?);
        self.escalate_command = Some(command.into());
        self.escalate_auth_prompt = Some(auth_prompt);
        self.escalate_reply = Some(reply);
        Ok(self)
    }

    pub fn with_config_enter(mut self, command: impl Into<String>) -> Self {
        self.config_enter.push(command.into());
        self
    }

    pub fn with_config_exit(mut self, command: impl Into<String>) -> Self {
        self.config_exit.push(command.into());
        self
    }

    pub fn with_on_open_command(mut self, command: impl Into<String>) -> Self {
        self.on_open_commands.push(command.into());
        self
    }

    /// True when `prompt` is the unprivileged mode prompt.
    pub fn needs_escalation(&self, prompt: &[u8]) -> bool {
        self.unprivileged_prompt
            .as_ref()
            .is_some_and(|p| p.is_match(prompt))
    }

    /// Strip the command echo and the trailing prompt line from raw output.
    pub fn normalize_output(&self, raw: &str, command: &str) -> String {
        let raw = raw.replace("\r\n", "\n").replace('\r', "");
        let trimmed = raw.trim_start();
        let output = trimmed
            .strip_prefix(command)
            .unwrap_or(trimmed)
            .trim_start_matches('\n');

        match output.rfind('\n') {
            Some(pos) => output[..pos].to_string(),
            None if self.prompt.is_match(output.as_bytes()) => String::new(),
            None => output.to_string(),
        }
    }
}
