//! Statistics and splitting visitors
//!
//! These visitors run on the same transducer as the filters. The collectors
//! keep nothing (every hook drops its input) and are typically run against a
//! discarding sink; [`RootHogSplitter`] keeps every section and a single
//! rootHOG.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::model::{GeneLookup, HogTree, ScoreDefinitions, Species, TaxonNode, Taxonomy};
use crate::transducer::{GroupOutcome, OrthoXmlVisitor, SectionOutcome};

/// Document-level counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BasicStats {
    /// Number of `<species>` entries
    pub species_count: usize,
    /// Number of `<gene>` records across all species
    pub gene_count: usize,
    /// Number of rootHOGs
    pub rhog_count: usize,
    /// Number of taxa without child taxa
    pub leaf_taxon_count: usize,
    /// Total number of taxa
    pub taxon_count: usize,
}

impl BasicStats {
    /// Fresh, zeroed counters
    pub fn new() -> Self {
        Self::default()
    }
}

impl OrthoXmlVisitor for BasicStats {
    fn visit_species(&mut self, species: Species) -> SectionOutcome<Species> {
        self.species_count += 1;
        self.gene_count += species.gene_count();
        SectionOutcome::Drop
    }

    fn visit_taxonomy(&mut self, taxonomy: Taxonomy) -> SectionOutcome<Taxonomy> {
        self.taxon_count = taxonomy.taxon_count();
        self.leaf_taxon_count = taxonomy.leaf_count();
        SectionOutcome::Drop
    }

    fn visit_scores(&mut self, _scores: ScoreDefinitions) -> SectionOutcome<ScoreDefinitions> {
        SectionOutcome::Drop
    }

    fn visit_group(&mut self, _tree: HogTree) -> GroupOutcome {
        self.rhog_count += 1;
        GroupOutcome::Drop
    }
}

/// Gene counts of one taxon
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaxonGeneCount {
    /// Genes of all species below the taxon
    pub genes: usize,
    /// Of those, genes referenced by at least one HOG
    pub genes_in_hogs: usize,
}

/// Per-taxon gene coverage of the HOGs.
///
/// Species are attached to the taxon carrying their name, or failing that
/// their NCBI taxonomy id. Memory grows with the number of genes, not with
/// the number of HOGs.
#[derive(Debug, Default)]
pub struct GenePerTaxonStats {
    lookup: GeneLookup,
    genes_per_species: HashMap<String, usize>,
    tax_id_per_species: HashMap<String, String>,
    referenced: HashSet<String>,
    taxonomy: Option<Taxonomy>,
}

impl GenePerTaxonStats {
    /// Empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// The gene-id → species lookup built so far
    pub fn gene_lookup(&self) -> &GeneLookup {
        &self.lookup
    }

    /// Number of distinct genes referenced by any HOG
    pub fn referenced_gene_count(&self) -> usize {
        self.referenced.len()
    }

    /// Aggregate the counts over the taxonomy, keyed by taxon name.
    ///
    /// Without a taxonomy section, every species is reported on its own.
    pub fn compute_taxon_counts(&self) -> BTreeMap<String, TaxonGeneCount> {
        let mut in_hogs_per_species: HashMap<&str, usize> = HashMap::new();
        for gene_id in &self.referenced {
            if let Some(species) = self.lookup.species_of(gene_id) {
                *in_hogs_per_species.entry(species).or_default() += 1;
            }
        }

        let species_counts: HashMap<&str, TaxonGeneCount> = self
            .genes_per_species
            .iter()
            .map(|(name, &genes)| {
                let count = TaxonGeneCount {
                    genes,
                    genes_in_hogs: in_hogs_per_species.get(name.as_str()).copied().unwrap_or(0),
                };
                (name.as_str(), count)
            })
            .collect();

        let mut result = BTreeMap::new();
        match &self.taxonomy {
            Some(taxonomy) => {
                let by_tax_id: HashMap<&str, &str> = self
                    .tax_id_per_species
                    .iter()
                    .map(|(name, tax_id)| (tax_id.as_str(), name.as_str()))
                    .collect();
                for root in &taxonomy.roots {
                    accumulate(root, &species_counts, &by_tax_id, &mut result);
                }
            }
            None => {
                for (name, count) in species_counts {
                    result.insert(name.to_string(), count);
                }
            }
        }
        result
    }

    /// Render [`compute_taxon_counts`](Self::compute_taxon_counts) as pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.compute_taxon_counts())
    }
}

/// Sum the counts of `taxon` and everything below it, recording each taxon
fn accumulate(
    taxon: &TaxonNode,
    species_counts: &HashMap<&str, TaxonGeneCount>,
    by_tax_id: &HashMap<&str, &str>,
    result: &mut BTreeMap<String, TaxonGeneCount>,
) -> TaxonGeneCount {
    let own = species_counts
        .get(taxon.name.as_str())
        .or_else(|| by_tax_id.get(taxon.id.as_str()).and_then(|name| species_counts.get(name)))
        .copied()
        .unwrap_or_default();

    let total = taxon.children.iter().fold(own, |acc, child| {
        let sub = accumulate(child, species_counts, by_tax_id, result);
        TaxonGeneCount {
            genes: acc.genes + sub.genes,
            genes_in_hogs: acc.genes_in_hogs + sub.genes_in_hogs,
        }
    });
    result.insert(taxon.name.clone(), total);
    total
}

impl OrthoXmlVisitor for GenePerTaxonStats {
    fn visit_species(&mut self, species: Species) -> SectionOutcome<Species> {
        self.lookup.add_species(&species);
        *self.genes_per_species.entry(species.name.clone()).or_default() += species.gene_count();
        self.tax_id_per_species
            .insert(species.name.clone(), species.ncbi_tax_id.clone());
        SectionOutcome::Drop
    }

    fn visit_taxonomy(&mut self, taxonomy: Taxonomy) -> SectionOutcome<Taxonomy> {
        self.taxonomy = Some(taxonomy);
        SectionOutcome::Drop
    }

    fn visit_scores(&mut self, _scores: ScoreDefinitions) -> SectionOutcome<ScoreDefinitions> {
        SectionOutcome::Drop
    }

    fn visit_group(&mut self, tree: HogTree) -> GroupOutcome {
        for gene_id in tree.gene_ids(tree.root()) {
            if !self.referenced.contains(gene_id) {
                self.referenced.insert(gene_id.to_string());
            }
        }
        GroupOutcome::Drop
    }
}

/// Counts rootHOGs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RootHogCounter {
    /// rootHOGs seen so far
    pub count: usize,
}

impl OrthoXmlVisitor for RootHogCounter {
    fn visit_species(&mut self, _species: Species) -> SectionOutcome<Species> {
        SectionOutcome::Drop
    }

    fn visit_taxonomy(&mut self, _taxonomy: Taxonomy) -> SectionOutcome<Taxonomy> {
        SectionOutcome::Drop
    }

    fn visit_scores(&mut self, _scores: ScoreDefinitions) -> SectionOutcome<ScoreDefinitions> {
        SectionOutcome::Drop
    }

    fn visit_group(&mut self, _tree: HogTree) -> GroupOutcome {
        self.count += 1;
        GroupOutcome::Drop
    }
}

/// Keeps every section and only the `rhog_number`-th rootHOG (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootHogSplitter {
    rhog_number: usize,
    seen: usize,
}

impl RootHogSplitter {
    /// Select the `rhog_number`-th rootHOG, counting from 1
    pub fn new(rhog_number: usize) -> Self {
        Self { rhog_number, seen: 0 }
    }

    /// The selected position
    pub fn rhog_number(&self) -> usize {
        self.rhog_number
    }
}

impl OrthoXmlVisitor for RootHogSplitter {
    fn visit_group(&mut self, tree: HogTree) -> GroupOutcome {
        self.seen += 1;
        if self.seen == self.rhog_number {
            GroupOutcome::Keep(tree)
        } else {
            GroupOutcome::Drop
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DocumentItem;
    use crate::streamer::OrthoXmlStreamer;
    use crate::transducer::{DiscardSink, Transducer};
    use std::io::Cursor;

    const DOC: &str = r#"<orthoXML xmlns="http://orthoXML.org/2011/" version="0.5">
  <species name="HUMAN" NCBITaxId="9606">
    <database name="db"><genes><gene id="1"/><gene id="2"/><gene id="3"/></genes></database>
  </species>
  <species name="MOUSE" NCBITaxId="10090">
    <database name="db"><genes><gene id="4"/><gene id="5"/></genes></database>
  </species>
  <taxonomy>
    <taxon id="40674" name="Mammalia">
      <taxon id="9606" name="HUMAN"/>
      <taxon id="10090" name="Mus musculus"/>
    </taxon>
  </taxonomy>
  <groups>
    <orthologGroup id="1"><geneRef id="1"/><geneRef id="4"/></orthologGroup>
    <orthologGroup id="2"><paralogGroup><geneRef id="2"/><geneRef id="1"/></paralogGroup></orthologGroup>
    <orthologGroup id="3"><geneRef id="5"/></orthologGroup>
  </groups>
</orthoXML>"#;

    fn run<V: OrthoXmlVisitor>(visitor: &mut V) {
        let mut streamer = OrthoXmlStreamer::new(Cursor::new(DOC));
        Transducer::new().run(&mut streamer, &mut DiscardSink, visitor).unwrap();
    }

    #[test]
    fn test_basic_stats() {
        let mut stats = BasicStats::new();
        run(&mut stats);
        assert_eq!(
            stats,
            BasicStats {
                species_count: 2,
                gene_count: 5,
                rhog_count: 3,
                leaf_taxon_count: 2,
                taxon_count: 3,
            }
        );
    }

    #[test]
    fn test_gene_per_taxon_matches_by_name_then_tax_id() {
        let mut stats = GenePerTaxonStats::new();
        run(&mut stats);
        assert_eq!(stats.referenced_gene_count(), 4);
        assert_eq!(stats.gene_lookup().species_of("4"), Some("MOUSE"));

        let counts = stats.compute_taxon_counts();
        assert_eq!(counts["HUMAN"], TaxonGeneCount { genes: 3, genes_in_hogs: 2 });
        assert_eq!(counts["Mus musculus"], TaxonGeneCount { genes: 2, genes_in_hogs: 2 });
        assert_eq!(counts["Mammalia"], TaxonGeneCount { genes: 5, genes_in_hogs: 4 });

        let json: serde_json::Value = serde_json::from_str(&stats.to_json().unwrap()).unwrap();
        assert_eq!(json["Mammalia"]["genes_in_hogs"], 4);
    }

    #[test]
    fn test_counter_and_splitter() {
        let mut counter = RootHogCounter::default();
        run(&mut counter);
        assert_eq!(counter.count, 3);

        let mut splitter = RootHogSplitter::new(2);
        let mut streamer = OrthoXmlStreamer::new(Cursor::new(DOC));
        let mut items: Vec<DocumentItem> = Vec::new();
        Transducer::new().run(&mut streamer, &mut items, &mut splitter).unwrap();

        let groups: Vec<_> = items
            .iter()
            .filter_map(|i| match i {
                DocumentItem::Group(tree) => tree.kind(tree.root()).group_data()?.id.clone(),
                _ => None,
            })
            .collect();
        assert_eq!(groups, vec!["2"]);
        assert_eq!(items.iter().filter(|i| matches!(i, DocumentItem::Species(_))).count(), 2);
        assert!(items.iter().any(|i| matches!(i, DocumentItem::Taxonomy(_))));
    }
}
