use crate::error::{ReplayError, ReplayResult};

pub const DEFAULT_GRID_SIZE: u32 = 15;
pub const MAX_GRID_SIZE: u32 = 256;
pub const MAX_HP: i64 = 3;

/// A full match replay as returned by the backend's `getReplay` query.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Replay {
    #[serde(default)]
    pub history: Vec<Tick>,
    #[serde(default)]
    pub players: Vec<Player>, // roster order drives palette and footer order
    #[serde(default = "default_grid_size", alias = "gridSize")]
    pub grid_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
}

fn default_grid_size() -> u32 {
    DEFAULT_GRID_SIZE
}

impl Default for Replay {
    fn default() -> Self {
        Self {
            history: Vec::new(),
            players: Vec::new(),
            grid_size: DEFAULT_GRID_SIZE,
            winner: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Tick {
    #[serde(default)]
    pub tick: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<ZoneBounds>,
    #[serde(default)]
    pub players: Vec<PlayerState>,
    #[serde(default)]
    pub events: Vec<Event>,
}

/// Zone bounds exactly as they appear on the wire; either side may be missing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ZoneBounds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
}

/// Resolved safe square: `[min, max]` on both axes, inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Zone {
    pub min: i64,
    pub max: i64,
}

impl Zone {
    pub fn full_grid(grid_size: u32) -> Self {
        Self {
            min: 0,
            max: i64::from(grid_size) - 1,
        }
    }

    pub fn contains(self, x: i64, y: i64) -> bool {
        self.min <= x && x <= self.max && self.min <= y && y <= self.max
    }
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct PlayerState {
    #[serde(rename = "botId")]
    pub bot_id: String,
    #[serde(default)]
    pub x: i64,
    #[serde(default)]
    pub y: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alive: Option<bool>,
}

impl PlayerState {
    pub fn hp(&self) -> i64 {
        self.hp.unwrap_or(MAX_HP)
    }

    pub fn is_alive(&self) -> bool {
        self.alive.unwrap_or(true)
    }
}

/// Raw tick event. Only `shot` is interpreted; the payload stays untyped until asked for so a
/// malformed or unknown event never fails the whole replay.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Event {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "north" => Some(Self::North),
            "south" => Some(Self::South),
            "east" => Some(Self::East),
            "west" => Some(Self::West),
            _ => None,
        }
    }

    /// Logical unit step, y pointing up.
    pub fn unit(self) -> (i64, i64) {
        match self {
            Self::North => (0, 1),
            Self::South => (0, -1),
            Self::East => (1, 0),
            Self::West => (-1, 0),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShotEvent {
    pub bot_id: Option<String>,
    /// `None` when the direction string is missing or unrecognized.
    pub direction: Option<Direction>,
    pub from: Option<(i64, i64)>,
}

impl Event {
    pub fn is_shot(&self) -> bool {
        self.kind == "shot"
    }

    pub fn as_shot(&self) -> Option<ShotEvent> {
        if !self.is_shot() {
            return None;
        }

        let bot_id = self
            .fields
            .get("botId")
            .and_then(|v| v.as_str())
            .map(str::to_owned);
        let direction = self
            .fields
            .get("direction")
            .and_then(|v| v.as_str())
            .and_then(Direction::parse);
        let from = self
            .fields
            .get("from")
            .and_then(|v| v.as_array())
            .and_then(|a| match a.as_slice() {
                [x, y, ..] => Some((json_coord(x)?, json_coord(y)?)),
                _ => None,
            });

        Some(ShotEvent {
            bot_id,
            direction,
            from,
        })
    }
}

fn json_coord(v: &serde_json::Value) -> Option<i64> {
    v.as_i64()
        .or_else(|| v.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64))
}

impl Tick {
    pub fn zone(&self, grid_size: u32) -> Zone {
        let full = Zone::full_grid(grid_size);
        match self.zone {
            Some(b) => Zone {
                min: b.min.unwrap_or(full.min),
                max: b.max.unwrap_or(full.max),
            },
            None => full,
        }
    }

    pub fn state_for(&self, bot_id: &str) -> Option<&PlayerState> {
        self.players.iter().find(|p| p.bot_id == bot_id)
    }

    pub fn shots(&self) -> impl Iterator<Item = ShotEvent> + '_ {
        self.events.iter().filter_map(Event::as_shot)
    }
}

impl Replay {
    pub fn validate(&self) -> ReplayResult<()> {
        if self.grid_size == 0 {
            return Err(ReplayError::validation("grid_size must be > 0"));
        }
        if self.grid_size > MAX_GRID_SIZE {
            return Err(ReplayError::validation(format!(
                "grid_size {} exceeds the maximum of {MAX_GRID_SIZE}",
                self.grid_size
            )));
        }
        Ok(())
    }

    /// Winner name, treating an empty string as no winner.
    pub fn winner(&self) -> Option<&str> {
        self.winner.as_deref().filter(|w| !w.is_empty())
    }

    pub fn roster_index(&self, bot_id: &str) -> Option<usize> {
        roster_index(&self.players, bot_id)
    }

    pub fn from_json_str(s: &str) -> ReplayResult<Self> {
        serde_json::from_str(s).map_err(|e| ReplayError::serde(format!("parse replay JSON: {e}")))
    }
}

pub fn roster_index(roster: &[Player], bot_id: &str) -> Option<usize> {
    roster.iter().position(|p| p.id == bot_id)
}
