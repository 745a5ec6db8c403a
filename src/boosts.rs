use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const BOOSTED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const DAY_IN_SECONDS: f64 = 86400.0;

/// A single boost of one game server, as reported by the provider.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Boost {
	pub username: String,

	#[serde(with = "boosted_at")]
	pub boosted_at: NaiveDateTime,

	pub extended_for: i64,

	#[serde(default, deserialize_with = "non_empty")]
	pub message: Option<String>,
}

impl Boost {
	/// Two boosts are the same event when the booster and the boost time match.
	/// Duration and message don't take part.
	pub fn is_same_event(&self, other: &Boost) -> bool {
		self.username == other.username && self.boosted_at == other.boosted_at
	}

	/// Boost duration in days, rounded to one decimal place with halves going
	/// to the even digit (0.25 -> 0.2).
	pub fn days(&self) -> f64 {
		(self.extended_for as f64 / DAY_IN_SECONDS * 10.0).round_ties_even() / 10.0
	}
}

/// Boosts already announced for one server, in discovery order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ServerBoostRecord {
	pub server_id: u64,

	#[serde(default)]
	pub boosts: Vec<Boost>,
}

impl ServerBoostRecord {
	pub fn new(server_id: u64, boosts: Vec<Boost>) -> Self {
		Self { server_id, boosts }
	}

	pub fn contains(&self, boost: &Boost) -> bool {
		self.boosts.iter().any(|seen| seen.is_same_event(boost))
	}
}

mod boosted_at {
	use super::*;

	pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&value.format(BOOSTED_AT_FORMAT).to_string())
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
		let raw = String::deserialize(deserializer)?;
		parse(&raw).map_err(serde::de::Error::custom)
	}

	pub fn parse(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
		match NaiveDateTime::parse_from_str(raw, BOOSTED_AT_FORMAT) {
			Ok(ts) => Ok(ts),
			// some endpoints send an offset, keep everything in UTC
			Err(_) => DateTime::parse_from_rfc3339(raw).map(|ts| ts.naive_utc()),
		}
	}
}

fn non_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
	let value = Option::<String>::deserialize(deserializer)?;
	Ok(value.filter(|msg| !msg.is_empty()))
}

#[cfg(test)]
pub fn boost(username: &str, boosted_at: &str, extended_for: i64) -> Boost {
	Boost {
		username: username.to_string(),
		boosted_at: NaiveDateTime::parse_from_str(boosted_at, BOOSTED_AT_FORMAT).unwrap(),
		extended_for,
		message: None,
	}
}
