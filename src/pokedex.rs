use crate::errors::{DataError, DataResult};
use schema::{MoveData, PokemonType, SpeciesData, TypeRelations};
use serde::Deserialize;
use std::collections::HashMap;

/// The data provider contract. Implementations hand out immutable species
/// stat blocks, move metadata, and per-type damage relations; the engine
/// never hardcodes catalog contents. `catalog_size` is injected
/// configuration so tests can substitute a small fixture catalog.
///
/// Provider failures are retryable setup errors: a battle is never started
/// against a provider that cannot answer.
pub trait Pokedex {
    /// Number of species identifiers in the catalog, 1-based.
    fn catalog_size(&self) -> u16;

    fn species(&self, id: u16) -> DataResult<SpeciesData>;

    fn move_data(&self, name: &str) -> DataResult<MoveData>;

    fn type_relations(&self, attacking: PokemonType) -> DataResult<TypeRelations>;
}

/// On-disk shape of a fixture catalog document.
#[derive(Debug, Deserialize)]
struct FixtureDoc {
    catalog_size: u16,
    species: Vec<SpeciesData>,
    moves: Vec<MoveData>,
    chart: Vec<ChartEntry>,
}

#[derive(Debug, Deserialize)]
struct ChartEntry {
    attacking: PokemonType,
    relations: TypeRelations,
}

/// A complete in-memory Pokedex backed by a RON document. Used by tests and
/// practice battles in place of the remote catalog.
#[derive(Debug, Clone)]
pub struct FixtureDex {
    catalog_size: u16,
    species: HashMap<u16, SpeciesData>,
    moves: HashMap<String, MoveData>,
    chart: HashMap<PokemonType, TypeRelations>,
}

impl FixtureDex {
    /// Parse a fixture catalog from RON text.
    pub fn from_ron(text: &str) -> DataResult<Self> {
        let doc: FixtureDoc =
            ron::from_str(text).map_err(|e| DataError::MalformedData(e.to_string()))?;

        let mut species = HashMap::new();
        for entry in doc.species {
            species.insert(entry.pokedex_number, entry);
        }
        let mut moves = HashMap::new();
        for entry in doc.moves {
            moves.insert(entry.name.clone(), entry);
        }
        let mut chart = HashMap::new();
        for entry in doc.chart {
            chart.insert(entry.attacking, entry.relations);
        }

        Ok(FixtureDex {
            catalog_size: doc.catalog_size,
            species,
            moves,
            chart,
        })
    }

    /// The catalog bundled with the crate: a small roster of real species
    /// with their published stat blocks and the full 18-type chart.
    pub fn bundled() -> Self {
        Self::from_ron(include_str!("../fixtures/dex.ron"))
            .expect("bundled fixture catalog should parse")
    }

    /// Look up a species by (lowercase) name. Convenience for tests and
    /// team builders; the provider contract itself is id-based.
    pub fn species_by_name(&self, name: &str) -> DataResult<SpeciesData> {
        self.species
            .values()
            .find(|s| s.name == name)
            .cloned()
            .ok_or_else(|| DataError::MalformedData(format!("no species named {}", name)))
    }
}

impl Pokedex for FixtureDex {
    fn catalog_size(&self) -> u16 {
        self.catalog_size
    }

    fn species(&self, id: u16) -> DataResult<SpeciesData> {
        self.species
            .get(&id)
            .cloned()
            .ok_or(DataError::SpeciesNotFound(id))
    }

    fn move_data(&self, name: &str) -> DataResult<MoveData> {
        self.moves
            .get(name)
            .cloned()
            .ok_or_else(|| DataError::MoveNotFound(name.to_string()))
    }

    fn type_relations(&self, attacking: PokemonType) -> DataResult<TypeRelations> {
        // Types absent from the chart have no special relations.
        Ok(self.chart.get(&attacking).cloned().unwrap_or_default())
    }
}
