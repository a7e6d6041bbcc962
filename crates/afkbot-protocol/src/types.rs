//! Bridge vocabulary: every type that travels between the bot and the
//! bridge process that embeds the real game client.
//!
//! Commands flow bot → bridge ([`BotCommand`]); events flow bridge → bot
//! ([`BotEvent`]). Both enums are internally tagged, so a chat command is
//! `{"type":"Chat","text":"hello"}` on the wire. That keeps the bridge side
//! (usually JavaScript) trivial to write.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// A point in the game world.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    /// Creates a position from its three coordinates.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Straight-line (Euclidean) distance to `other`.
    pub fn distance_to(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Component-wise floor: the block this position sits in.
    ///
    /// Navigation goals are block coordinates, so anything handed to the
    /// pathfinder goes through this first.
    pub fn floor(&self) -> Position {
        Position::new(self.x.floor(), self.y.floor(), self.z.floor())
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

/// Last known state of the bot's own entity.
///
/// `yaw` and `pitch` are in radians, matching what the game client reports.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EntityState {
    pub position: Position,
    pub yaw: f32,
    pub pitch: f32,
}

// ---------------------------------------------------------------------------
// Controls
// ---------------------------------------------------------------------------

/// A movement input the bot can hold down or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Control {
    Forward,
    Back,
    Left,
    Right,
    Jump,
    Sneak,
}

impl Control {
    /// The four horizontal walking directions.
    pub const DIRECTIONS: [Control; 4] = [
        Control::Forward,
        Control::Back,
        Control::Left,
        Control::Right,
    ];
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Control::Forward => "forward",
            Control::Back => "back",
            Control::Left => "left",
            Control::Right => "right",
            Control::Jump => "jump",
            Control::Sneak => "sneak",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Connect options
// ---------------------------------------------------------------------------

/// How the game account authenticates with the game server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    /// Cracked / offline-mode server, username only.
    #[default]
    Offline,
    /// Microsoft account login.
    Microsoft,
}

/// Everything the bridge needs to open a game connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectOptions {
    pub username: String,
    pub password: String,
    pub auth: AuthType,
    pub host: String,
    pub port: u16,
    /// Game protocol version, e.g. `"1.20.1"`. `None` lets the bridge
    /// auto-detect it from the server's status response.
    pub version: Option<String>,
}

// ---------------------------------------------------------------------------
// Commands (bot → bridge)
// ---------------------------------------------------------------------------

/// A request from the bot to the bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BotCommand {
    /// Open the game connection. Always the first frame on a new link.
    Connect(ConnectOptions),

    /// Say something in chat (also used for `/commands`).
    Chat { text: String },

    /// Press (`state = true`) or release a movement control.
    SetControl { control: Control, state: bool },

    /// Turn the head. `force` skips the client-side smoothing.
    Look { yaw: f32, pitch: f32, force: bool },

    /// Hand a block goal to the pathfinder. Fire-and-forget.
    SetGoal { goal: Position },

    /// Leave the server and close the game connection.
    Quit,
}

// ---------------------------------------------------------------------------
// Events (bridge → bot)
// ---------------------------------------------------------------------------

/// Something that happened on the game connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BotEvent {
    /// The bot joined the world (or respawned).
    Spawn { entity: EntityState },

    /// The bot's entity moved or turned.
    Move { entity: EntityState },

    /// A rendered chat line. `sender` is set for player chat and absent
    /// for server/system messages.
    Chat {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sender: Option<String>,
    },

    /// The pathfinder reached its current goal.
    GoalReached,

    /// The bot died.
    Death,

    /// The server kicked the bot.
    Kicked { reason: String },

    /// The game client reported an error. Usually followed by `End`.
    Error { message: String },

    /// The game connection is gone.
    End {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to() {
        let a = Position::new(0.0, 0.0, 0.0);
        let b = Position::new(3.0, 4.0, 0.0);
        assert_eq!(a.distance_to(&b), 5.0);
        assert_eq!(b.distance_to(&a), 5.0);
        assert_eq!(a.distance_to(&a), 0.0);
    }

    #[test]
    fn test_floor_handles_negative_coordinates() {
        let p = Position::new(1.7, 64.2, -3.5);
        assert_eq!(p.floor(), Position::new(1.0, 64.0, -4.0));
    }

    #[test]
    fn test_position_display() {
        assert_eq!(Position::new(1.0, 2.5, -3.0).to_string(), "(1.00, 2.50, -3.00)");
    }

    #[test]
    fn test_control_serializes_lowercase() {
        let json = serde_json::to_value(Control::Forward).unwrap();
        assert_eq!(json, "forward");
        assert_eq!(Control::Sneak.to_string(), "sneak");
    }

    #[test]
    fn test_chat_command_json_format() {
        let cmd = BotCommand::Chat { text: "/login pw".into() };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["type"], "Chat");
        assert_eq!(json["text"], "/login pw");
    }

    #[test]
    fn test_connect_command_is_flattened() {
        let cmd = BotCommand::Connect(ConnectOptions {
            username: "afk".into(),
            password: String::new(),
            auth: AuthType::Offline,
            host: "localhost".into(),
            port: 25565,
            version: None,
        });
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["type"], "Connect");
        assert_eq!(json["username"], "afk");
        assert_eq!(json["auth"], "offline");
        assert_eq!(json["port"], 25565);
    }

    #[test]
    fn test_chat_event_without_sender() {
        let event: BotEvent =
            serde_json::from_str(r#"{"type":"Chat","text":"You have successfully logged in"}"#)
                .unwrap();
        assert_eq!(
            event,
            BotEvent::Chat {
                text: "You have successfully logged in".into(),
                sender: None,
            }
        );
    }

    #[test]
    fn test_spawn_event_from_bridge_json() {
        let raw = r#"{"type":"Spawn","entity":{"position":{"x":1.5,"y":64,"z":-2},"yaw":0.5,"pitch":0}}"#;
        let event: BotEvent = serde_json::from_str(raw).unwrap();
        match event {
            BotEvent::Spawn { entity } => {
                assert_eq!(entity.position, Position::new(1.5, 64.0, -2.0));
                assert_eq!(entity.yaw, 0.5);
            }
            other => panic!("expected Spawn, got {other:?}"),
        }
    }

    #[test]
    fn test_end_event_reason_is_optional() {
        let event: BotEvent = serde_json::from_str(r#"{"type":"End"}"#).unwrap();
        assert_eq!(event, BotEvent::End { reason: None });
    }
}
