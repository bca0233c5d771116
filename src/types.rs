use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Set of instruments a fitness evaluation runs over.
///
/// Always kept sorted and deduplicated, so two universes compare equal
/// regardless of the order tickers were supplied in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Universe(Vec<String>);

impl Universe {
    pub fn new<I, S>(tickers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tickers: Vec<String> = tickers.into_iter().map(Into::into).collect();
        tickers.sort();
        tickers.dedup();
        Self(tickers)
    }

    pub fn tickers(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for Universe {
    fn from(tickers: Vec<String>) -> Self {
        Self::new(tickers)
    }
}

impl From<Universe> for Vec<String> {
    fn from(universe: Universe) -> Self {
        universe.0
    }
}

impl<S: Into<String>> FromIterator<S> for Universe {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl fmt::Display for Universe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

/// Opaque model blob produced by the fitness evaluator.
///
/// Stored as a base64 string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Artifact(Vec<u8>);

impl Artifact {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for Artifact {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl Serialize for Artifact {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for Artifact {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map(Self)
            .map_err(de::Error::custom)
    }
}

/// Cached outcome of the last fitness evaluation of an organism.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessRecord {
    pub score: f64,
    pub date: NaiveDate,
    pub universe: Universe,
    pub artifact: Artifact,
}

impl FitnessRecord {
    /// Whether the record was computed for exactly this universe and date.
    pub fn is_valid_for(&self, universe: &Universe, date: NaiveDate) -> bool {
        self.date == date && &self.universe == universe
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_universe_is_order_independent() {
        let a = Universe::new(["GAZP", "SBER", "LKOH"]);
        let b: Universe = ["LKOH", "GAZP", "SBER", "GAZP"].into_iter().collect();
        assert_eq!(a, b);
        assert_eq!(a.tickers(), &["GAZP", "LKOH", "SBER"]);
    }

    #[test]
    fn test_universe_deserialization_normalizes() {
        let universe: Universe = serde_json::from_str(r#"["B", "A"]"#).unwrap();
        assert_eq!(universe.tickers(), &["A", "B"]);
        assert_eq!(serde_json::to_string(&universe).unwrap(), r#"["A","B"]"#);
    }

    #[test]
    fn test_artifact_is_stored_as_base64() {
        let artifact = Artifact::new(vec![0, 1, 2, 254, 255]);
        let json = serde_json::to_value(&artifact).unwrap();
        assert_eq!(json, serde_json::json!("AAEC/v8="));
        let back: Artifact = serde_json::from_value(json).unwrap();
        assert_eq!(back, artifact);

        assert!(serde_json::from_str::<Artifact>(r#""not base64!""#).is_err());
    }

    #[test]
    fn test_record_validity() {
        let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let record = FitnessRecord {
            score: 1.5,
            date,
            universe: Universe::new(["A", "B"]),
            artifact: Artifact::default(),
        };
        assert!(record.is_valid_for(&Universe::new(["B", "A"]), date));
        assert!(!record.is_valid_for(&Universe::new(["A", "B", "C"]), date));
        assert!(!record.is_valid_for(&Universe::new(["A", "B"]), date.succ_opt().unwrap()));
    }
}
