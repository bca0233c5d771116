//! Typed organism document with explicit dirty-field tracking.
//!
//! Stored shape: `{_id, genotype, wins?, fitness?: {score, date, universe, artifact}}`.

use crate::data::{Document, DocumentId, StoreError, ID_FIELD};
use crate::engines::generation::Genotype;
use crate::error::{Result, TradevolveError};
use crate::types::FitnessRecord;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;

pub const GENOTYPE: &str = "genotype";
pub const WINS: &str = "wins";
pub const FITNESS: &str = "fitness";
/// Sort key for fitness-ordered queries.
pub const SCORE: &str = "fitness.score";

/// Persisted fields that can change after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Wins,
    Fitness,
}

impl Field {
    pub fn key(self) -> &'static str {
        match self {
            Field::Wins => WINS,
            Field::Fitness => FITNESS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrganismRecord {
    id: DocumentId,
    genotype: Genotype,
    wins: u32,
    fitness: Option<FitnessRecord>,
    dirty: BTreeSet<Field>,
}

impl OrganismRecord {
    /// Record for a document that was just inserted.
    pub fn created(id: DocumentId, genotype: Genotype) -> Self {
        Self {
            id,
            genotype,
            wins: 0,
            fitness: None,
            dirty: BTreeSet::new(),
        }
    }

    /// Document inserted for a new organism: only the genotype is present.
    ///
    /// Non-finite gene values are rejected, since JSON cannot represent them.
    pub fn insert_document(genotype: &Genotype) -> Result<Document> {
        let non_finite = genotype.iter().find(|(_, _, value)| !value.is_finite());
        if let Some((group, name, value)) = non_finite {
            return Err(TradevolveError::InvalidGene {
                gene: format!("{}.{}", group, name),
                value,
            });
        }
        let mut document = Document::new();
        document.insert(GENOTYPE.to_string(), to_value(genotype)?);
        Ok(document)
    }

    pub fn decode(document: &Document) -> Result<Self> {
        let raw_id = document.get(ID_FIELD).map(|v| v.to_string()).unwrap_or_default();
        let corrupt = |reason: String| TradevolveError::Corrupt {
            id: raw_id.clone(),
            reason,
        };

        let id = DocumentId::from_document(document)
            .ok_or_else(|| corrupt(format!("missing or malformed {}", ID_FIELD)))?;
        let genotype: Genotype = from_optional(document, GENOTYPE)
            .map_err(|e| corrupt(format!("bad {}: {}", GENOTYPE, e)))?
            .unwrap_or_default();
        let wins: u32 = from_optional(document, WINS)
            .map_err(|e| corrupt(format!("bad {}: {}", WINS, e)))?
            .unwrap_or(0);
        let fitness: Option<FitnessRecord> = from_optional(document, FITNESS)
            .map_err(|e| corrupt(format!("bad {}: {}", FITNESS, e)))?;

        Ok(Self {
            id,
            genotype,
            wins,
            fitness,
            dirty: BTreeSet::new(),
        })
    }

    /// Partial update holding only the fields changed since the last flush.
    pub fn changes(&self) -> Result<Document> {
        let mut document = Document::new();
        for field in &self.dirty {
            let value = match field {
                Field::Wins => Value::from(self.wins),
                Field::Fitness => to_value(&self.fitness)?,
            };
            document.insert(field.key().to_string(), value);
        }
        Ok(document)
    }

    pub fn dirty_fields(&self) -> &BTreeSet<Field> {
        &self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty.clear();
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn genotype(&self) -> &Genotype {
        &self.genotype
    }

    pub fn wins(&self) -> u32 {
        self.wins
    }

    pub fn fitness(&self) -> Option<&FitnessRecord> {
        self.fitness.as_ref()
    }

    pub fn set_wins(&mut self, wins: u32) {
        self.wins = wins;
        self.dirty.insert(Field::Wins);
    }

    pub fn set_fitness(&mut self, fitness: FitnessRecord) {
        self.fitness = Some(fitness);
        self.dirty.insert(Field::Fitness);
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value).map_err(StoreError::from)?)
}

/// Absent and null fields both decode to `None`.
fn from_optional<T: DeserializeOwned>(
    document: &Document,
    key: &str,
) -> std::result::Result<Option<T>, serde_json::Error> {
    match document.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone()).map(Some),
    }
}
