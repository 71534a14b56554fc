//! Bar frequency.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Frequency {
    Min1,
    Min5,
    Min15,
    Min30,
    Min60,
    Hour4,
    #[default]
    Day1,
    Week1,
}

impl Frequency {
    pub const ALL: [Frequency; 8] = [
        Frequency::Min1,
        Frequency::Min5,
        Frequency::Min15,
        Frequency::Min30,
        Frequency::Min60,
        Frequency::Hour4,
        Frequency::Day1,
        Frequency::Week1,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Min1 => "1m",
            Frequency::Min5 => "5m",
            Frequency::Min15 => "15m",
            Frequency::Min30 => "30m",
            Frequency::Min60 => "60m",
            Frequency::Hour4 => "4h",
            Frequency::Day1 => "1d",
            Frequency::Week1 => "1w",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        Frequency::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| {
                format!("unknown frequency '{s}' (expected one of 1m, 5m, 15m, 30m, 60m, 4h, 1d, 1w)")
            })
    }
}
