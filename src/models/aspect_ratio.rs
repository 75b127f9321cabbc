use crate::error::WallpaperError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Width:height constraint for generated images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "3:4")]
    Tall,
    #[serde(rename = "4:3")]
    Wide,
}

impl AspectRatio {
    /// Every supported ratio, in the order the picker lists them.
    pub const ALL: [AspectRatio; 5] = [
        AspectRatio::Portrait,
        AspectRatio::Landscape,
        AspectRatio::Square,
        AspectRatio::Tall,
        AspectRatio::Wide,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Portrait => "9:16",
            AspectRatio::Landscape => "16:9",
            AspectRatio::Square => "1:1",
            AspectRatio::Tall => "3:4",
            AspectRatio::Wide => "4:3",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = WallpaperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        AspectRatio::ALL
            .iter()
            .copied()
            .find(|ratio| ratio.as_str() == s)
            .ok_or_else(|| {
                WallpaperError::ValidationError(format!(
                    "Unsupported aspect ratio '{}'. Choose one of: {}",
                    s,
                    AspectRatio::ALL.map(|r| r.as_str()).join(", ")
                ))
            })
    }
}
