//! Species list entries and the gene-id → species lookup

use std::collections::HashMap;

use super::{Attributes, RawElement};

/// A `<gene>` record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gene {
    /// Internal gene id, referenced by `geneRef` leaves
    pub id: String,
    /// External protein identifier (`protId`)
    pub prot_id: Option<String>,
    /// Other attributes (`geneId`, `transcriptId`, ...)
    pub attributes: Attributes,
    /// Nested content, kept verbatim
    pub content: Vec<RawElement>,
}

impl Gene {
    /// Gene record with an internal id and optional protein id
    pub fn new(id: impl Into<String>, prot_id: Option<String>) -> Self {
        Self {
            id: id.into(),
            prot_id,
            attributes: Attributes::new(),
            content: Vec::new(),
        }
    }
}

/// A `<database>` block of a species entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Database {
    /// Database name
    pub name: String,
    /// Database version
    pub version: Option<String>,
    /// Other attributes (`geneLink`, `protLink`, ...)
    pub attributes: Attributes,
    /// Gene records of the `<genes>` wrapper
    pub genes: Vec<Gene>,
    /// Attributes of the `<genes>` wrapper itself
    pub genes_attributes: Attributes,
    /// Foreign elements inside `<genes>`, written after the gene records
    pub genes_extensions: Vec<RawElement>,
    /// Foreign elements of the database, written after `<genes>`
    pub extensions: Vec<RawElement>,
}

/// A `<species>` entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Species {
    /// Species name
    pub name: String,
    /// NCBI taxonomy identifier (`NCBITaxId`)
    pub ncbi_tax_id: String,
    /// Other attributes
    pub attributes: Attributes,
    /// Database blocks, usually exactly one
    pub databases: Vec<Database>,
    /// Notes and foreign elements, written after the databases
    pub extensions: Vec<RawElement>,
}

impl Species {
    /// Species entry without any database block
    pub fn new(name: impl Into<String>, ncbi_tax_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ncbi_tax_id: ncbi_tax_id.into(),
            ..Default::default()
        }
    }

    /// All gene records across database blocks
    pub fn genes(&self) -> impl Iterator<Item = &Gene> {
        self.databases.iter().flat_map(|db| db.genes.iter())
    }

    /// Number of gene records
    pub fn gene_count(&self) -> usize {
        self.databases.iter().map(|db| db.genes.len()).sum()
    }
}

/// Maps internal gene ids to the name of the species that declares them
#[derive(Debug, Clone, Default)]
pub struct GeneLookup {
    species_by_gene: HashMap<String, String>,
}

impl GeneLookup {
    /// Empty lookup
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every gene of a species entry
    pub fn add_species(&mut self, species: &Species) {
        for gene in species.genes() {
            self.species_by_gene
                .insert(gene.id.clone(), species.name.clone());
        }
    }

    /// Species name for an internal gene id
    pub fn species_of(&self, gene_id: &str) -> Option<&str> {
        self.species_by_gene.get(gene_id).map(String::as_str)
    }

    /// Number of registered genes
    pub fn len(&self) -> usize {
        self.species_by_gene.len()
    }

    /// Whether no gene has been registered
    pub fn is_empty(&self) -> bool {
        self.species_by_gene.is_empty()
    }
}
