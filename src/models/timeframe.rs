use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Chart window selectable from the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Timeframe {
    #[serde(rename = "1H")]
    OneHour,
    #[serde(rename = "6H")]
    SixHours,
    #[default]
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "1W")]
    OneWeek,
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "All")]
    All,
}

impl Timeframe {
    pub const ALL: [Timeframe; 6] = [
        Timeframe::OneHour,
        Timeframe::SixHours,
        Timeframe::OneDay,
        Timeframe::OneWeek,
        Timeframe::OneMonth,
        Timeframe::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::OneHour => "1H",
            Timeframe::SixHours => "6H",
            Timeframe::OneDay => "1D",
            Timeframe::OneWeek => "1W",
            Timeframe::OneMonth => "1M",
            Timeframe::All => "All",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::OneHour => "Past Hour",
            Timeframe::SixHours => "Past 6 Hours",
            Timeframe::OneDay => "Past Day",
            Timeframe::OneWeek => "Past Week",
            Timeframe::OneMonth => "Past Month",
            Timeframe::All => "All Time",
        }
    }

    /// Lookback used for the explorer query. Zero means full history.
    pub fn lookback_secs(&self) -> u64 {
        match self {
            Timeframe::OneHour => 3_600,
            Timeframe::SixHours => 21_600,
            Timeframe::OneDay => 86_400,
            Timeframe::OneWeek => 604_800,
            Timeframe::OneMonth => 2_592_000,
            Timeframe::All => 0,
        }
    }

    /// Window covered by synthetic chart data. `All` is drawn as one month.
    pub fn mock_window_millis(&self) -> i64 {
        match self {
            Timeframe::All => 2_592_000_000,
            other => other.lookback_secs() as i64 * 1000,
        }
    }

    /// Lenient parse used by the HTTP layer: unknown values fall back to `1D`.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        value
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default()
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Timeframe::ALL
            .into_iter()
            .find(|tf| tf.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("Unknown timeframe: {}", trimmed))
    }
}
