use std::fmt;
use std::str::FromStr;

use serde::de::value::MapAccessDeserializer;
use serde::de::MapAccess;
use serde::de::Visitor;
use serde::Deserialize;
use serde::Deserializer;

use super::Attendance;
use super::GuestEmail;

/// The RSVP fields posted by the page's form.
///
/// Every field is optional on the wire: the form marks name/email/attendance
/// as required, but the notification must still go out (with placeholders) if
/// the browser sends less. Empty strings are normalised to `None`.
///
/// Only a JSON object is accepted; see the `Deserialize` impl.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    pub name: Option<String>,
    pub email: Option<String>,
    pub attendance: Option<Attendance>,
    pub plus_one: Option<String>,
    pub dietary: Option<String>,
}

/// Wire shape of `Submission`
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmissionFields {
    #[serde(default, deserialize_with = "non_empty")]
    name: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    email: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    attendance: Option<Attendance>,
    #[serde(default, deserialize_with = "non_empty")]
    plus_one: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    dietary: Option<String>,
}

impl From<SubmissionFields> for Submission {
    fn from(f: SubmissionFields) -> Self {
        Self {
            name: f.name,
            email: f.email,
            attendance: f.attendance,
            plus_one: f.plus_one,
            dietary: f.dietary,
        }
    }
}

// a derived impl would also take a JSON array and fill the fields by position
struct ObjectOnly;

impl<'de> Visitor<'de> for ObjectOnly {
    type Value = Submission;

    fn expecting(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_map<A>(
        self,
        map: A,
    ) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        SubmissionFields::deserialize(MapAccessDeserializer::new(map)).map(Submission::from)
    }
}

impl<'de> Deserialize<'de> for Submission {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(ObjectOnly)
    }
}

impl Submission {
    /// Plus-one, unless the guest declined
    pub fn plus_one(&self) -> Option<&str> {
        match self.attendance {
            Some(Attendance::Decline) => None,
            _ => self.plus_one.as_deref(),
        }
    }

    /// Dietary notes, unless the guest declined
    pub fn dietary(&self) -> Option<&str> {
        match self.attendance {
            Some(Attendance::Decline) => None,
            _ => self.dietary.as_deref(),
        }
    }

    pub fn reply_to(&self) -> Option<GuestEmail> {
        self.email
            .as_deref()
            .and_then(|e| GuestEmail::parse(e).ok())
    }
}

/// `null`, missing, `""` and `"   "` all become `None`; anything else must
/// parse as `T`.
fn non_empty<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
