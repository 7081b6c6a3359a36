use serde::{Deserialize, Serialize};
use crate::{
    clock::SimSpeed,
    network::TransportType,
    types::{PointId, RunId, Tick},
};

/// All player-issued commands.
/// Variants are added over time — never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PlayerCommand {
    // ── Clock control ─────────────────────────────
    Pause,
    Resume,
    SetSpeed { speed: SimSpeed },
    /// Manual one-hour step, independent of the tick timer.
    AdvanceTime,

    // ── Network editing ───────────────────────────
    AddRoute {
        start: PointId,
        end:   PointId,
        kind:  TransportType,
    },
    RemoveRoute {
        index: usize,
    },
    SelectTransport {
        kind: TransportType,
    },

    // ── Session ───────────────────────────────────
    Restart,
}

impl PlayerCommand {
    pub fn type_name(&self) -> &'static str {
        match self {
            PlayerCommand::Pause              => "pause",
            PlayerCommand::Resume             => "resume",
            PlayerCommand::SetSpeed { .. }    => "set_speed",
            PlayerCommand::AdvanceTime        => "advance_time",
            PlayerCommand::AddRoute { .. }    => "add_route",
            PlayerCommand::RemoveRoute { .. } => "remove_route",
            PlayerCommand::SelectTransport { .. } => "select_transport",
            PlayerCommand::Restart            => "restart",
        }
    }
}

/// A queued player command with its submission tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedCommand {
    pub run_id:     RunId,
    pub queued_at:  Tick,
    pub command_id: String,
    pub command:    PlayerCommand,
}

/// What applying a command did.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Applied,
    /// Route commands that changed nothing (rejected add, out-of-range remove).
    Rejected(String),
    /// The manual tick was refused because the game is over.
    Ignored,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse_from_the_ipc_shape() {
        let cmd: PlayerCommand = serde_json::from_str(
            r#"{"cmd":"add_route","start":"poi-a","end":"poi-b","kind":"bike_lane"}"#,
        )
        .unwrap();
        assert_eq!(
            cmd,
            PlayerCommand::AddRoute {
                start: "poi-a".into(),
                end: "poi-b".into(),
                kind: TransportType::BikeLane,
            }
        );
        assert_eq!(cmd.type_name(), "add_route");

        let speed: PlayerCommand =
            serde_json::from_str(r#"{"cmd":"set_speed","speed":"faster"}"#).unwrap();
        assert_eq!(speed, PlayerCommand::SetSpeed { speed: SimSpeed::Faster });
    }
}
