use std::fmt::Display;
use std::str::FromStr;

/// The guest's answer. On the wire: `"accept"` or `"decline"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attendance {
    Accept,
    Decline,
}

impl FromStr for Attendance {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "accept" => Ok(Self::Accept),
            "decline" => Ok(Self::Decline),
            other => Err(format!("Invalid attendance: {other:?}")),
        }
    }
}

impl Display for Attendance {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(match self {
            Self::Accept => "accept",
            Self::Decline => "decline",
        })
    }
}
