use serde::Deserialize;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum SchedulerInterval {
    Seconds(u32),
    Minutes(u32),
    Hours(u32),
}

impl FromStr for SchedulerInterval {
    type Err = String;

    /// Parses values like `30s`, `5m` or `1h`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let Some(unit) = s.chars().last() else {
            return Err("Empty interval".to_string());
        };
        let num: u32 = s[..s.len() - unit.len_utf8()]
            .parse()
            .map_err(|e| format!("Invalid interval {s:?}: {e}"))?;

        match unit {
            's' => Ok(SchedulerInterval::Seconds(num)),
            'm' => Ok(SchedulerInterval::Minutes(num)),
            'h' => Ok(SchedulerInterval::Hours(num)),
            _ => Err(format!("Invalid time unit in {s:?}")),
        }
    }
}

impl TryFrom<String> for SchedulerInterval {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SchedulerInterval> for clokwerk::Interval {
    fn from(val: SchedulerInterval) -> Self {
        match val {
            SchedulerInterval::Seconds(s) => clokwerk::Interval::Seconds(s),
            SchedulerInterval::Minutes(m) => clokwerk::Interval::Minutes(m),
            SchedulerInterval::Hours(h) => clokwerk::Interval::Hours(h),
        }
    }
}

impl From<SchedulerInterval> for chrono::Duration {
    fn from(val: SchedulerInterval) -> Self {
        match val {
            SchedulerInterval::Seconds(s) => chrono::Duration::seconds(s as i64),
            SchedulerInterval::Minutes(m) => chrono::Duration::minutes(m as i64),
            SchedulerInterval::Hours(h) => chrono::Duration::hours(h as i64),
        }
    }
}
