use std::io::BufRead;

use quick_xml::events::BytesStart;

use super::helpers::take_required;
use super::{OrthoXmlStreamer, ParseError};
use crate::model::{Database, Gene, ScoreDef, ScoreDefinitions, Species, TaxonNode, Taxonomy};
use crate::namespace::ElementKind;

impl<R: BufRead> OrthoXmlStreamer<R> {
    /// Parse one `<species>` entry whose start tag was just read
    pub(super) fn parse_species(&mut self, start: BytesStart<'static>, empty: bool) -> Result<Species, ParseError> {
        let mut attributes = self.attributes(&start)?;
        let mut species = Species {
            name: take_required(&mut attributes, "species", "name")?,
            ncbi_tax_id: take_required(&mut attributes, "species", "NCBITaxId")?,
            attributes,
            ..Default::default()
        };
        if empty {
            return Ok(species);
        }

        while let Some((child, child_empty)) = self.next_child("species")? {
            match self.classify(&child) {
                Some(ElementKind::Database) => {
                    let database = self.parse_database(&child, child_empty)?;
                    species.databases.push(database);
                }
                _ => species.extensions.push(self.capture_raw(child, child_empty)?),
            }
        }
        Ok(species)
    }

    fn parse_database(&mut self, start: &BytesStart<'static>, empty: bool) -> Result<Database, ParseError> {
        let mut attributes = self.attributes(start)?;
        let mut database = Database {
            name: take_required(&mut attributes, "database", "name")?,
            version: attributes.remove("version"),
            attributes,
            ..Default::default()
        };
        if empty {
            return Ok(database);
        }

        while let Some((child, child_empty)) = self.next_child("database")? {
            match self.classify(&child) {
                Some(ElementKind::Genes) => {
                    database.genes_attributes = self.attributes(&child)?;
                    if child_empty {
                        continue;
                    }
                    while let Some((gene, gene_empty)) = self.next_child("genes")? {
                        match self.classify(&gene) {
                            Some(ElementKind::Gene) => {
                                database.genes.push(self.parse_gene(gene, gene_empty)?)
                            }
                            _ => database
                                .genes_extensions
                                .push(self.capture_raw(gene, gene_empty)?),
                        }
                    }
                }
                _ => database.extensions.push(self.capture_raw(child, child_empty)?),
            }
        }
        Ok(database)
    }

    fn parse_gene(&mut self, start: BytesStart<'static>, empty: bool) -> Result<Gene, ParseError> {
        let mut attributes = self.attributes(&start)?;
        let mut gene = Gene::new(
            take_required(&mut attributes, "gene", "id")?,
            attributes.remove("protId"),
        );
        gene.attributes = attributes;
        if !empty {
            while let Some((child, child_empty)) = self.next_child("gene")? {
                gene.content.push(self.capture_raw(child, child_empty)?);
            }
        }
        Ok(gene)
    }

    /// Parse the `<taxonomy>` section whose start tag was just read
    pub(super) fn parse_taxonomy(&mut self, start: BytesStart<'static>, empty: bool) -> Result<Taxonomy, ParseError> {
        let mut taxonomy = Taxonomy {
            attributes: self.attributes(&start)?,
            ..Default::default()
        };
        if empty {
            return Ok(taxonomy);
        }

        while let Some((child, child_empty)) = self.next_child("taxonomy")? {
            match self.classify(&child) {
                Some(ElementKind::Taxon) => {
                    let taxon = self.parse_taxon(&child, child_empty)?;
                    taxonomy.roots.push(taxon);
                }
                _ => taxonomy.extensions.push(self.capture_raw(child, child_empty)?),
            }
        }
        Ok(taxonomy)
    }

    /// Parse a taxon subtree without recursion; taxonomies can be deep
    fn parse_taxon(&mut self, start: &BytesStart<'static>, empty: bool) -> Result<TaxonNode, ParseError> {
        let root = self.taxon_from_tag(start)?;
        if empty {
            return Ok(root);
        }

        let mut stack = vec![root];
        loop {
            match self.next_child("taxon")? {
                Some((child, child_empty)) => match self.classify(&child) {
                    Some(ElementKind::Taxon) => {
                        let taxon = self.taxon_from_tag(&child)?;
                        if child_empty {
                            if let Some(parent) = stack.last_mut() {
                                parent.children.push(taxon);
                            }
                        } else {
                            stack.push(taxon);
                        }
                    }
                    _ => {
                        let raw = self.capture_raw(child, child_empty)?;
                        if let Some(current) = stack.last_mut() {
                            current.extensions.push(raw);
                        }
                    }
                },
                None => {
                    let Some(finished) = stack.pop() else {
                        return Err(ParseError::InvalidStructure("unbalanced <taxon>".to_string()));
                    };
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(finished),
                        None => return Ok(finished),
                    }
                }
            }
        }
    }

    fn taxon_from_tag(&self, start: &BytesStart) -> Result<TaxonNode, ParseError> {
        let mut attributes = self.attributes(start)?;
        let mut taxon = TaxonNode::new(
            take_required(&mut attributes, "taxon", "id")?,
            take_required(&mut attributes, "taxon", "name")?,
        );
        taxon.attributes = attributes;
        Ok(taxon)
    }

    /// Parse the `<scores>` section whose start tag was just read
    pub(super) fn parse_score_definitions(
        &mut self,
        start: BytesStart<'static>,
        empty: bool,
    ) -> Result<ScoreDefinitions, ParseError> {
        let mut scores = ScoreDefinitions {
            attributes: self.attributes(&start)?,
            ..Default::default()
        };
        if empty {
            return Ok(scores);
        }

        while let Some((child, child_empty)) = self.next_child("scores")? {
            match self.classify(&child) {
                Some(ElementKind::ScoreDef) => {
                    let mut attributes = self.attributes(&child)?;
                    let definition = ScoreDef {
                        id: take_required(&mut attributes, "scoreDef", "id")?,
                        desc: attributes.remove("desc"),
                        attributes,
                    };
                    if !child_empty {
                        // scoreDef has no content in the schema; drop anything nested
                        self.capture_raw(child, false)?;
                    }
                    scores.definitions.push(definition);
                }
                _ => scores.extensions.push(self.capture_raw(child, child_empty)?),
            }
        }
        Ok(scores)
    }
}
