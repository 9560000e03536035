use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Pet {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub breed: String,
    #[serde(flatten)]
    pub status: PetStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PetStatus {
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub xp: u64,
    #[serde(default = "default_xp_to_next")]
    pub xp_to_next: u64,
    #[serde(default)]
    pub hunger: i32,
    #[serde(default)]
    pub happiness: i32,
    #[serde(default)]
    pub energy: i32,
}

impl Default for PetStatus {
    fn default() -> Self {
        Self {
            level: 1,
            xp: 0,
            xp_to_next: default_xp_to_next(),
            hunger: 50,
            happiness: 50,
            energy: 50,
        }
    }
}

fn default_xp_to_next() -> u64 {
    100
}

impl PetStatus {
    pub fn xp_progress_percent(&self) -> u8 {
        let need = self.xp_to_next.max(1) as f64;
        let pct = (self.xp as f64 / need * 100.0).round();
        pct.clamp(0.0, 100.0) as u8
    }

    /// True when `after` sits on a higher level than `self`.
    pub fn leveled_up_to(&self, after: &PetStatus) -> bool {
        after.level > self.level
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PetPoints {
    #[serde(default)]
    pub feeding: u32,
    #[serde(default)]
    pub playing: u32,
    #[serde(default)]
    pub cleaning: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetAction {
    Feed,
    Play,
    Clean,
}

impl PetAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Feed => "feed",
            Self::Play => "play",
            Self::Clean => "clean",
        }
    }
}

impl fmt::Display for PetAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PetAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "feed" => Ok(Self::Feed),
            "play" => Ok(Self::Play),
            "clean" => Ok(Self::Clean),
            other => Err(format!("unknown pet action `{}` (feed|play|clean)", other)),
        }
    }
}

/// Response of `POST /pets/me/actions/{action}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PetActionResult {
    pub pet: Pet,
    #[serde(default)]
    pub applied: Option<String>,
    #[serde(default)]
    pub delta: serde_json::Value,
}
