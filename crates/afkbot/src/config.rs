//! The `settings.json` document and its conversion into per-layer configs.
//!
//! The file keeps the nested kebab-case layout bots of this kind are usually
//! shipped with. Only `bot-account` and `server` are required; every other
//! section falls back to its default.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use afkbot_behavior::{AntiAfkConfig, BehaviorConfig, ChatConfig};
use afkbot_protocol::{AuthType, ConnectOptions, Position};
use afkbot_session::{AuthConfig, SessionConfig};
use serde::Deserialize;

/// Environment variable consulted when no path is given on the command line.
pub const CONFIG_ENV: &str = "AFKBOT_CONFIG";

/// Used when neither the command line nor the environment names a file.
pub const DEFAULT_CONFIG_PATH: &str = "settings.json";

/// Errors loading the settings document. All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Picks the settings path: CLI argument, then environment, then default.
pub fn resolve_path(arg: Option<String>, env: Option<String>) -> PathBuf {
    arg.or(env)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// The whole settings document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
    pub bot_account: BotAccount,
    pub server: ServerSettings,
    #[serde(default)]
    pub bridge: BridgeSettings,
    #[serde(default)]
    pub utils: Utils,
    #[serde(default)]
    pub position: PositionSettings,
    #[serde(default)]
    pub web: WebSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BotAccount {
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, rename = "type")]
    pub auth: AuthType,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerSettings {
    pub ip: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Empty or missing means auto-detect.
    #[serde(default)]
    pub version: Option<String>,
}

fn default_server_port() -> u16 {
    25565
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BridgeSettings {
    pub url: String,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:3001".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Utils {
    #[serde(default)]
    pub auto_auth: AutoAuth,
    #[serde(default)]
    pub anti_afk: AntiAfkSettings,
    #[serde(default)]
    pub chat_messages: ChatMessages,
    #[serde(default = "enabled")]
    pub auto_reconnect: bool,
    /// Milliseconds.
    #[serde(default = "default_reconnect_delay")]
    pub auto_reconnect_delay: u64,
}

impl Default for Utils {
    fn default() -> Self {
        Self {
            auto_auth: AutoAuth::default(),
            anti_afk: AntiAfkSettings::default(),
            chat_messages: ChatMessages::default(),
            auto_reconnect: true,
            auto_reconnect_delay: default_reconnect_delay(),
        }
    }
}

fn enabled() -> bool {
    true
}

fn default_reconnect_delay() -> u64 {
    SessionConfig::DEFAULT_RECONNECT_DELAY.as_millis() as u64
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AutoAuth {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AntiAfkSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub sneak: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ChatMessages {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub repeat: bool,
    /// Seconds.
    #[serde(default = "default_repeat_delay")]
    pub repeat_delay: u64,
    #[serde(default)]
    pub messages: Vec<String>,
}

impl Default for ChatMessages {
    fn default() -> Self {
        Self {
            enabled: false,
            repeat: false,
            repeat_delay: default_repeat_delay(),
            messages: Vec::new(),
        }
    }
}

fn default_repeat_delay() -> u64 {
    60
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PositionSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WebSettings {
    pub port: u16,
}

impl Default for WebSettings {
    fn default() -> Self {
        Self { port: 5000 }
    }
}

impl FromStr for Settings {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(serde_json::from_str(s)?)
    }
}

impl Settings {
    /// Reads and parses the file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        text.parse()
    }

    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            username: self.bot_account.username.clone(),
            password: self.bot_account.password.clone(),
            auth: self.bot_account.auth,
            host: self.server.ip.clone(),
            port: self.server.port,
            version: self.server.version.clone().filter(|v| !v.is_empty()),
        }
    }

    pub fn behavior_config(&self) -> BehaviorConfig {
        let chat = &self.utils.chat_messages;
        let position = &self.position;
        BehaviorConfig {
            chat: chat.enabled.then(|| {
                ChatConfig {
                    messages: chat.messages.clone(),
                    repeat: chat.repeat,
                    repeat_delay: Duration::from_secs(chat.repeat_delay),
                }
                .validated()
            }),
            move_to: position
                .enabled
                .then(|| Position::new(position.x, position.y, position.z)),
            anti_afk: self.utils.anti_afk.enabled.then(|| {
                AntiAfkConfig {
                    sneak: self.utils.anti_afk.sneak,
                    ..AntiAfkConfig::default()
                }
                .validated()
            }),
            ..BehaviorConfig::default()
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        let auto_auth = &self.utils.auto_auth;
        SessionConfig {
            connect: self.connect_options(),
            auth: auto_auth
                .enabled
                .then(|| AuthConfig::new(auto_auth.password.clone())),
            behaviors: self.behavior_config(),
            auto_reconnect: self.utils.auto_reconnect,
            reconnect_delay: Duration::from_millis(self.utils.auto_reconnect_delay),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"{
        "bot-account": { "username": "afkbot", "password": "", "type": "offline" },
        "server": { "ip": "play.example.org", "port": 25566, "version": "1.20.1" },
        "bridge": { "url": "ws://10.0.0.2:3001" },
        "utils": {
            "auto-auth": { "enabled": true, "password": "secret" },
            "anti-afk": { "enabled": true, "sneak": true },
            "chat-messages": {
                "enabled": true,
                "repeat": true,
                "repeat-delay": 120,
                "messages": ["hello", "still here"]
            },
            "auto-reconnect": true,
            "auto-reconnect-delay": 7000
        },
        "position": { "enabled": true, "x": 100, "y": 64, "z": -20 },
        "web": { "port": 8080 }
    }"#;

    const MINIMAL: &str = r#"{
        "bot-account": { "username": "afkbot" },
        "server": { "ip": "localhost" }
    }"#;

    #[test]
    fn test_full_document() {
        let settings: Settings = FULL.parse().unwrap();
        assert_eq!(settings.bridge.url, "ws://10.0.0.2:3001");
        assert_eq!(settings.web.port, 8080);

        let cfg = settings.session_config();
        assert_eq!(cfg.connect.host, "play.example.org");
        assert_eq!(cfg.connect.port, 25566);
        assert_eq!(cfg.connect.version.as_deref(), Some("1.20.1"));
        assert_eq!(cfg.auth, Some(AuthConfig::new("secret")));
        assert!(cfg.auto_reconnect);
        assert_eq!(cfg.reconnect_delay, Duration::from_millis(7_000));

        let chat = cfg.behaviors.chat.unwrap();
        assert_eq!(chat.messages, ["hello", "still here"]);
        assert!(chat.repeat);
        assert_eq!(chat.repeat_delay, Duration::from_secs(120));

        assert!(cfg.behaviors.anti_afk.unwrap().sneak);
        assert_eq!(cfg.behaviors.move_to, Some(Position::new(100.0, 64.0, -20.0)));
    }

    #[test]
    fn test_minimal_document_uses_defaults() {
        let settings: Settings = MINIMAL.parse().unwrap();
        assert_eq!(settings.bridge, BridgeSettings::default());
        assert_eq!(settings.web.port, 5000);

        let cfg = settings.session_config();
        assert_eq!(cfg.connect.port, 25565);
        assert_eq!(cfg.connect.auth, AuthType::Offline);
        assert_eq!(cfg.connect.version, None);
        assert_eq!(cfg.auth, None);
        assert!(cfg.auto_reconnect);
        assert_eq!(cfg.reconnect_delay, Duration::from_millis(5_000));
        assert_eq!(cfg.behaviors, BehaviorConfig::default());
    }

    #[test]
    fn test_empty_version_means_auto() {
        let settings: Settings = r#"{
            "bot-account": { "username": "afkbot", "type": "microsoft" },
            "server": { "ip": "localhost", "version": "" }
        }"#
        .parse()
        .unwrap();
        let options = settings.connect_options();
        assert_eq!(options.version, None);
        assert_eq!(options.auth, AuthType::Microsoft);
    }

    #[test]
    fn test_zero_repeat_delay_is_clamped() {
        let settings: Settings = r#"{
            "bot-account": { "username": "afkbot" },
            "server": { "ip": "localhost" },
            "utils": { "chat-messages": { "enabled": true, "repeat": true, "repeat-delay": 0,
                                          "messages": ["x"] } }
        }"#
        .parse()
        .unwrap();
        let chat = settings.behavior_config().chat.unwrap();
        assert_eq!(chat.repeat_delay, ChatConfig::MIN_REPEAT_DELAY);
    }

    #[test]
    fn test_malformed_document() {
        let err = "{ \"server\": ".parse::<Settings>().unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        let err = r#"{ "server": { "ip": "localhost" } }"#
            .parse::<Settings>()
            .unwrap_err();
        assert!(err.to_string().contains("bot-account"));
    }

    #[test]
    fn test_missing_file() {
        let err = Settings::load("/nonexistent/afkbot/settings.json").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/afkbot/settings.json"));
    }

    #[test]
    fn test_resolve_path_precedence() {
        assert_eq!(
            resolve_path(Some("a.json".into()), Some("b.json".into())),
            PathBuf::from("a.json")
        );
        assert_eq!(resolve_path(None, Some("b.json".into())), PathBuf::from("b.json"));
        assert_eq!(resolve_path(None, None), PathBuf::from(DEFAULT_CONFIG_PATH));
    }
}
