use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Team {
    Ct,
    Terrorist,
}

impl Team {
    pub fn from_log_token(token: &str) -> Option<Self> {
        match token {
            "CT" => Some(Team::Ct),
            "TERRORIST" => Some(Team::Terrorist),
            _ => None,
        }
    }
}

/// A player as it appears inline in a log line: `"<name><userid><steamid><team>"`.
/// `steam_id` is `None` for bots, whose steamid token is the literal `BOT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRef {
    pub name: String,
    pub user_id: i32,
    pub steam_id: Option<String>,
    pub team: Team,
}

impl PlayerRef {
    pub fn is_bot(&self) -> bool {
        self.steam_id.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coords {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistKind {
    Regular,
    Flash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BombKind {
    Plant,
    Defuse,
    Explode,
}

/// One successfully-parsed log line, tagged by the shape the line matched.
/// This is the only type the state machine hands to callers; anything that
/// didn't match a known shape was silently dropped before it got here.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedEvent {
    RoundStart {
        timestamp: DateTime<Utc>,
    },
    RoundEnd {
        timestamp: DateTime<Utc>,
        surviving_players: Vec<String>,
    },
    Kill {
        timestamp: DateTime<Utc>,
        killer: PlayerRef,
        victim: PlayerRef,
        weapon: String,
        is_headshot: bool,
        killer_coords: Option<Coords>,
        victim_coords: Option<Coords>,
    },
    Assist {
        timestamp: DateTime<Utc>,
        assister: PlayerRef,
        victim: PlayerRef,
        kind: AssistKind,
    },
    Attack {
        timestamp: DateTime<Utc>,
        attacker: PlayerRef,
        victim: PlayerRef,
        weapon: String,
        damage: i32,
        armor_damage: i32,
        health_remaining: i32,
        armor_remaining: i32,
        hit_group: String,
        attacker_coords: Option<Coords>,
        victim_coords: Option<Coords>,
    },
    Bomb {
        timestamp: DateTime<Utc>,
        player: Option<PlayerRef>,
        kind: BombKind,
        /// Not observable on the trigger line itself; always `None` until a
        /// richer log format carries it. Kept on the event so downstream
        /// consumers don't need a second schema once one does.
        time_remaining: Option<f64>,
    },
    Accolade {
        timestamp: DateTime<Utc>,
        accolade_type: String,
        player_name: String,
        session_index: i32,
        value: f64,
        position: i32,
        score: f64,
    },
    GameOver {
        timestamp: DateTime<Utc>,
        mode: String,
        map: String,
        team1_score: i32,
        team2_score: i32,
        duration_minutes: Option<i32>,
    },
    /// Synthetic marker emitted when the replay cursor reaches the
    /// `Game_Over` line it rewound from; signals the coordinator that this
    /// match's pending records are complete and ready to commit. Never
    /// persisted.
    GameProcessed {
        timestamp: DateTime<Utc>,
    },
}

impl ParsedEvent {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            ParsedEvent::RoundStart { timestamp }
            | ParsedEvent::RoundEnd { timestamp, .. }
            | ParsedEvent::Kill { timestamp, .. }
            | ParsedEvent::Assist { timestamp, .. }
            | ParsedEvent::Attack { timestamp, .. }
            | ParsedEvent::Bomb { timestamp, .. }
            | ParsedEvent::Accolade { timestamp, .. }
            | ParsedEvent::GameOver { timestamp, .. }
            | ParsedEvent::GameProcessed { timestamp } => *timestamp,
        }
    }
}
