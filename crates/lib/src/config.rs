//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.formgate/config.json`) and environment.
//! Deploy-specific values and secrets can be supplied via `FORMGATE_*` environment
//! variables, which win over the file.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application config, as read from the file. Required values are
/// checked in [`resolve_form_settings`], not here, so a partial file plus
/// environment overrides is a valid setup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Form handling settings (redirect target, addresses, honeypot).
    #[serde(default)]
    pub form: FormConfig,

    /// SMTP relay settings.
    #[serde(default)]
    pub smtp: SmtpConfig,
}

/// Server bind and port settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// HTTP port (default 8787).
    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1"; put a reverse proxy in front for public exposure).
    #[serde(default = "default_server_bind")]
    pub bind: String,
}

fn default_server_port() -> u16 {
    8787
}

fn default_server_bind() -> String {
    "127.0.0.1".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
            bind: default_server_bind(),
        }
    }
}

/// Form handling config. Every field here can also come from the environment;
/// see the `FORMGATE_*` overrides in [`resolve_form_settings`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormConfig {
    /// URL of the page hosting the form; every outcome redirect points back here.
    pub redirect_url: Option<String>,

    /// Sender address for outbound mail (must be allowed by the relay, e.g. SES-verified).
    pub from: Option<String>,

    /// Recipient address for submitted questions.
    pub to: Option<String>,

    /// Subject line used for every outbound email.
    pub subject: Option<String>,

    /// Name of a hidden form field that only bots fill in. Unset disables the trap.
    pub honeypot: Option<String>,
}

/// SMTP relay config. Credentials belong in the environment in most deployments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmtpConfig {
    /// Full relay URL (e.g. "smtps://email-smtp.eu-west-1.amazonaws.com").
    /// Overridden by FORMGATE_SMTP_URL. When unset, derived from `region`.
    pub url: Option<String>,

    /// AWS SES region used to derive the relay URL when `url` is unset.
    /// Overridden by FORMGATE_SMTP_REGION.
    pub region: Option<String>,

    /// SMTP username. Overridden by FORMGATE_SMTP_USERNAME.
    pub username: Option<String>,

    /// SMTP password. Overridden by FORMGATE_SMTP_PASSWORD.
    pub password: Option<String>,
}

/// Resolved per-process form settings. Required fields are validated once at
/// startup; a missing value is a configuration error, never a request error.
#[derive(Debug, Clone)]
pub struct FormSettings {
    pub redirect_url: String,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub honeypot: Option<String>,
}

/// Resolved SMTP relay settings.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub url: String,
    /// (username, password) when both are configured.
    pub credentials: Option<(String, String)>,
}

/// Environment override helper: env var wins over the file value; empty or
/// whitespace-only values count as unset.
fn resolve_value(file_value: Option<&str>, env_var: &str) -> Option<String> {
    std::env::var(env_var)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            file_value
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// Resolve the form settings, failing with the name of the first missing
/// required value (config key and matching environment variable).
pub fn resolve_form_settings(config: &Config) -> Result<FormSettings> {
    let form = &config.form;
    let Some(redirect_url) = resolve_value(form.redirect_url.as_deref(), "FORMGATE_REDIRECT_URL")
    else {
        bail!("form.redirectUrl is not set (or FORMGATE_REDIRECT_URL)");
    };
    let Some(from) = resolve_value(form.from.as_deref(), "FORMGATE_FROM") else {
        bail!("form.from is not set (or FORMGATE_FROM)");
    };
    let Some(to) = resolve_value(form.to.as_deref(), "FORMGATE_TO") else {
        bail!("form.to is not set (or FORMGATE_TO)");
    };
    let Some(subject) = resolve_value(form.subject.as_deref(), "FORMGATE_SUBJECT") else {
        bail!("form.subject is not set (or FORMGATE_SUBJECT)");
    };
    let honeypot = resolve_value(form.honeypot.as_deref(), "FORMGATE_HONEYPOT");
    Ok(FormSettings {
        redirect_url,
        from,
        to,
        subject,
        honeypot,
    })
}

/// Resolve the SMTP relay settings. URL precedence: FORMGATE_SMTP_URL, then
/// smtp.url, then a URL derived from smtp.region (SES SMTP endpoint).
pub fn resolve_smtp_settings(config: &Config) -> Result<SmtpSettings> {
    let smtp = &config.smtp;
    let url = resolve_value(smtp.url.as_deref(), "FORMGATE_SMTP_URL").or_else(|| {
        resolve_value(smtp.region.as_deref(), "FORMGATE_SMTP_REGION")
            .map(|region| format!("smtps://email-smtp.{}.amazonaws.com", region))
    });
    let Some(url) = url else {
        bail!("smtp.url or smtp.region is not set (or FORMGATE_SMTP_URL / FORMGATE_SMTP_REGION)");
    };
    let username = resolve_value(smtp.username.as_deref(), "FORMGATE_SMTP_USERNAME");
    let password = resolve_value(smtp.password.as_deref(), "FORMGATE_SMTP_PASSWORD");
    let credentials = match (username, password) {
        (Some(u), Some(p)) => Some((u, p)),
        (None, None) => None,
        _ => bail!("smtp username and password must be set together"),
    };
    Ok(SmtpSettings { url, credentials })
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("FORMGATE_CONFIG_PATH").map(PathBuf::from).unwrap_or_else(|_| {
        dirs::home_dir()
            .map(|h| h.join(".formgate").join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    })
}

/// Load config from the default path (or FORMGATE_CONFIG_PATH). Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}
