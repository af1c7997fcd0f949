//! Incremental OrthoXML serialization
//!
//! [`OrthoXmlWriter`] turns the [`DocumentItem`] stream back into XML as the
//! items arrive; nothing but the current item is held. Element names are
//! qualified with the prefix the source document bound to the OrthoXML
//! namespace, and attributes are written in the order they were read.
//!
//! [`PipelinedWriter`] moves serialization onto a background thread fed
//! through a bounded channel.

use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use crate::model::{
    Attributes, Database, DocumentHeader, DocumentItem, Gene, HogTree, NodeId, NodeKind,
    RawElement, ScoreDefinitions, Species, TaxonNode, Taxonomy,
};
use crate::namespace::{ElementKind, NamespaceResolver};

pub use error::WriterError;
pub use pipelined::{PipelinedWriter, DEFAULT_PIPELINE_CAPACITY};

mod error;
mod pipelined;

/// Default indentation width of pretty-printed output
pub const DEFAULT_INDENT: usize = 2;

/// Destination of a document item stream
pub trait DocumentSink {
    /// Serialize one item
    fn write_item(&mut self, item: DocumentItem) -> Result<(), WriterError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    InRoot,
    InGroups,
    Finished,
}

/// Streaming OrthoXML serializer
pub struct OrthoXmlWriter<W: Write> {
    writer: Writer<W>,
    resolver: NamespaceResolver,
    root_name: String,
    state: State,
    groups_written: usize,
}

impl<W: Write> OrthoXmlWriter<W> {
    /// Create a writer with the default indentation
    pub fn new(inner: W) -> Self {
        Self::with_indent(inner, Some(DEFAULT_INDENT))
    }

    /// Create a writer; `None` writes everything without added whitespace
    pub fn with_indent(inner: W, indent: Option<usize>) -> Self {
        let writer = match indent {
            Some(width) => Writer::new_with_indent(inner, b' ', width),
            None => Writer::new(inner),
        };
        Self {
            writer,
            resolver: NamespaceResolver::orthoxml(),
            root_name: String::new(),
            state: State::Start,
            groups_written: 0,
        }
    }

    /// Number of rootHOGs written so far
    pub fn groups_written(&self) -> usize {
        self.groups_written
    }

    /// Flush and return the destination.
    ///
    /// Fails if the root element has not been closed.
    pub fn finish(self) -> Result<W, WriterError> {
        if self.state != State::Finished {
            return Err(WriterError::UnbalancedDocument(format!(
                "document not closed (state {:?})",
                self.state
            )));
        }
        let mut inner = self.writer.into_inner();
        inner.flush()?;
        Ok(inner)
    }

    fn expect_state(&self, expected: State, item: &str) -> Result<(), WriterError> {
        if self.state != expected {
            return Err(WriterError::UnbalancedDocument(format!(
                "{} while in state {:?}",
                item, self.state
            )));
        }
        Ok(())
    }

    fn start_tag(&self, kind: ElementKind) -> BytesStart<'static> {
        BytesStart::new(self.resolver.qualify(kind))
    }

    fn end_tag(&mut self, kind: ElementKind) -> Result<(), WriterError> {
        let name = self.resolver.qualify(kind);
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    /// Write `start` as an empty tag when there is no content, else as a start tag
    fn open(&mut self, start: BytesStart<'static>, has_content: bool) -> Result<(), WriterError> {
        if has_content {
            self.writer.write_event(Event::Start(start))?;
        } else {
            self.writer.write_event(Event::Empty(start))?;
        }
        Ok(())
    }

    /// Copy a captured node byte for byte. Only the line break in front of
    /// it follows the output indentation; text inside is never re-indented.
    fn write_raw(&mut self, raw: &RawElement) -> Result<(), WriterError> {
        if raw
            .events()
            .first()
            .is_some_and(|first| !matches!(first, Event::Text(_) | Event::CData(_)))
        {
            self.writer.write_indent()?;
        }
        let out = self.writer.get_mut();
        for event in raw.events() {
            write_verbatim(out, event)?;
        }
        Ok(())
    }

    fn write_raw_all(&mut self, raws: &[RawElement]) -> Result<(), WriterError> {
        raws.iter().try_for_each(|raw| self.write_raw(raw))
    }

    fn write_header(&mut self, header: DocumentHeader) -> Result<(), WriterError> {
        self.expect_state(State::Start, "document header")?;
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let start = BytesStart::new(header.name.clone()).with_attributes(header.attributes.iter());
        self.writer.write_event(Event::Start(start))?;

        self.resolver = header.namespace;
        self.root_name = header.name;
        self.state = State::InRoot;
        Ok(())
    }

    fn write_species(&mut self, species: &Species) -> Result<(), WriterError> {
        let mut start = self.start_tag(ElementKind::Species);
        start.push_attribute(("name", species.name.as_str()));
        start.push_attribute(("NCBITaxId", species.ncbi_tax_id.as_str()));
        push_extra(&mut start, &species.attributes);

        let has_content = !species.databases.is_empty() || !species.extensions.is_empty();
        self.open(start, has_content)?;
        if has_content {
            for database in &species.databases {
                self.write_database(database)?;
            }
            self.write_raw_all(&species.extensions)?;
            self.end_tag(ElementKind::Species)?;
        }
        Ok(())
    }

    fn write_database(&mut self, database: &Database) -> Result<(), WriterError> {
        let mut start = self.start_tag(ElementKind::Database);
        start.push_attribute(("name", database.name.as_str()));
        if let Some(version) = &database.version {
            start.push_attribute(("version", version.as_str()));
        }
        push_extra(&mut start, &database.attributes);

        self.writer.write_event(Event::Start(start))?;
        let mut genes = self.start_tag(ElementKind::Genes);
        push_extra(&mut genes, &database.genes_attributes);
        let has_genes = !database.genes.is_empty() || !database.genes_extensions.is_empty();
        self.open(genes, has_genes)?;
        if has_genes {
            for gene in &database.genes {
                self.write_gene(gene)?;
            }
            self.write_raw_all(&database.genes_extensions)?;
            self.end_tag(ElementKind::Genes)?;
        }
        self.write_raw_all(&database.extensions)?;
        self.end_tag(ElementKind::Database)
    }

    fn write_gene(&mut self, gene: &Gene) -> Result<(), WriterError> {
        let mut start = self.start_tag(ElementKind::Gene);
        start.push_attribute(("id", gene.id.as_str()));
        if let Some(prot_id) = &gene.prot_id {
            start.push_attribute(("protId", prot_id.as_str()));
        }
        push_extra(&mut start, &gene.attributes);

        self.open(start, !gene.content.is_empty())?;
        if !gene.content.is_empty() {
            self.write_raw_all(&gene.content)?;
            self.end_tag(ElementKind::Gene)?;
        }
        Ok(())
    }

    fn write_taxonomy(&mut self, taxonomy: &Taxonomy) -> Result<(), WriterError> {
        let start = self.start_tag(ElementKind::Taxonomy).with_attributes(taxonomy.attributes.iter());
        let has_content = !taxonomy.roots.is_empty() || !taxonomy.extensions.is_empty();
        self.open(start, has_content)?;
        if has_content {
            for taxon in &taxonomy.roots {
                self.write_taxon(taxon)?;
            }
            self.write_raw_all(&taxonomy.extensions)?;
            self.end_tag(ElementKind::Taxonomy)?;
        }
        Ok(())
    }

    fn write_taxon(&mut self, taxon: &TaxonNode) -> Result<(), WriterError> {
        let mut start = self.start_tag(ElementKind::Taxon);
        start.push_attribute(("id", taxon.id.as_str()));
        start.push_attribute(("name", taxon.name.as_str()));
        push_extra(&mut start, &taxon.attributes);

        let has_content = !taxon.children.is_empty() || !taxon.extensions.is_empty();
        self.open(start, has_content)?;
        if has_content {
            for child in &taxon.children {
                self.write_taxon(child)?;
            }
            self.write_raw_all(&taxon.extensions)?;
            self.end_tag(ElementKind::Taxon)?;
        }
        Ok(())
    }

    fn write_scores(&mut self, scores: &ScoreDefinitions) -> Result<(), WriterError> {
        let start = self.start_tag(ElementKind::Scores).with_attributes(scores.attributes.iter());
        let has_content = !scores.definitions.is_empty() || !scores.extensions.is_empty();
        self.open(start, has_content)?;
        if has_content {
            for definition in &scores.definitions {
                let mut def = self.start_tag(ElementKind::ScoreDef);
                def.push_attribute(("id", definition.id.as_str()));
                if let Some(desc) = &definition.desc {
                    def.push_attribute(("desc", desc.as_str()));
                }
                push_extra(&mut def, &definition.attributes);
                self.writer.write_event(Event::Empty(def))?;
            }
            self.write_raw_all(&scores.extensions)?;
            self.end_tag(ElementKind::Scores)?;
        }
        Ok(())
    }

    /// Write one rootHOG depth-first without recursion
    fn write_group(&mut self, tree: &HogTree) -> Result<(), WriterError> {
        enum Step {
            Enter(NodeId),
            Exit(NodeId),
        }

        let mut stack = vec![Step::Enter(tree.root())];
        while let Some(step) = stack.pop() {
            match step {
                Step::Enter(id) => match tree.kind(id) {
                    NodeKind::GeneRef(gene_ref) => {
                        let mut start = self.start_tag(ElementKind::GeneRef);
                        start.push_attribute(("id", gene_ref.gene_id.as_str()));
                        push_extra(&mut start, &gene_ref.attributes);
                        self.open(start, !gene_ref.content.is_empty())?;
                        if !gene_ref.content.is_empty() {
                            self.write_raw_all(&gene_ref.content)?;
                            self.end_tag(ElementKind::GeneRef)?;
                        }
                    }
                    NodeKind::OrthologGroup(data) | NodeKind::ParalogGroup(data) => {
                        let mut start = self.start_tag(group_element(tree.kind(id)));
                        if let Some(group_id) = &data.id {
                            start.push_attribute(("id", group_id.as_str()));
                        }
                        push_extra(&mut start, &data.attributes);

                        let children = tree.children(id);
                        let has_content = !children.is_empty()
                            || !data.scores.is_empty()
                            || !data.properties.is_empty()
                            || !data.extensions.is_empty();
                        self.open(start, has_content)?;
                        if !has_content {
                            continue;
                        }

                        for score in &data.scores {
                            let mut tag = self.start_tag(ElementKind::Score);
                            tag.push_attribute(("id", score.id.as_str()));
                            tag.push_attribute(("value", score.raw_value.as_str()));
                            self.writer.write_event(Event::Empty(tag))?;
                        }
                        for property in &data.properties {
                            let mut tag = self.start_tag(ElementKind::Property);
                            tag.push_attribute(("name", property.name.as_str()));
                            if let Some(value) = &property.value {
                                tag.push_attribute(("value", value.as_str()));
                            }
                            self.writer.write_event(Event::Empty(tag))?;
                        }

                        stack.push(Step::Exit(id));
                        stack.extend(children.iter().rev().map(|&child| Step::Enter(child)));
                    }
                },
                Step::Exit(id) => {
                    let kind = tree.kind(id);
                    if let Some(data) = kind.group_data() {
                        self.write_raw_all(&data.extensions)?;
                    }
                    self.end_tag(group_element(kind))?;
                }
            }
        }
        self.groups_written += 1;
        Ok(())
    }
}

impl<W: Write> DocumentSink for OrthoXmlWriter<W> {
    fn write_item(&mut self, item: DocumentItem) -> Result<(), WriterError> {
        match item {
            DocumentItem::Header(header) => self.write_header(header),
            DocumentItem::Species(species) => {
                self.expect_state(State::InRoot, "species")?;
                self.write_species(&species)
            }
            DocumentItem::Taxonomy(taxonomy) => {
                self.expect_state(State::InRoot, "taxonomy")?;
                self.write_taxonomy(&taxonomy)
            }
            DocumentItem::Scores(scores) => {
                self.expect_state(State::InRoot, "scores")?;
                self.write_scores(&scores)
            }
            DocumentItem::GroupsStart(attributes) => {
                self.expect_state(State::InRoot, "groups start")?;
                let start = self.start_tag(ElementKind::Groups).with_attributes(attributes.iter());
                self.writer.write_event(Event::Start(start))?;
                self.state = State::InGroups;
                Ok(())
            }
            DocumentItem::Group(tree) => {
                self.expect_state(State::InGroups, "group")?;
                self.write_group(&tree)
            }
            DocumentItem::PassThrough(raw) => {
                if !matches!(self.state, State::InRoot | State::InGroups) {
                    return Err(WriterError::UnbalancedDocument(format!(
                        "pass-through element while in state {:?}",
                        self.state
                    )));
                }
                self.write_raw(&raw)
            }
            DocumentItem::GroupsEnd => {
                self.expect_state(State::InGroups, "groups end")?;
                self.end_tag(ElementKind::Groups)?;
                self.state = State::InRoot;
                Ok(())
            }
            DocumentItem::DocumentEnd => {
                self.expect_state(State::InRoot, "document end")?;
                let end = BytesEnd::new(std::mem::take(&mut self.root_name));
                self.writer.write_event(Event::End(end))?;
                self.state = State::Finished;
                Ok(())
            }
        }
    }
}

fn group_element(kind: &NodeKind) -> ElementKind {
    if kind.is_paralog_group() {
        ElementKind::ParalogGroup
    } else {
        ElementKind::OrthologGroup
    }
}

fn write_verbatim<W: Write>(out: &mut W, event: &Event) -> std::io::Result<()> {
    match event {
        Event::Start(e) => wrapped(out, b"<", e, b">"),
        Event::End(e) => wrapped(out, b"</", e, b">"),
        Event::Empty(e) => wrapped(out, b"<", e, b"/>"),
        Event::Text(e) => out.write_all(e),
        Event::CData(e) => wrapped(out, b"<![CDATA[", e, b"]]>"),
        Event::Comment(e) => wrapped(out, b"<!--", e, b"-->"),
        Event::Decl(e) => wrapped(out, b"<?", e, b"?>"),
        Event::PI(e) => wrapped(out, b"<?", e, b"?>"),
        Event::DocType(e) => wrapped(out, b"<!DOCTYPE ", e, b">"),
        Event::Eof => Ok(()),
    }
}

fn wrapped<W: Write>(out: &mut W, before: &[u8], content: &[u8], after: &[u8]) -> std::io::Result<()> {
    out.write_all(before)?;
    out.write_all(content)?;
    out.write_all(after)
}

fn push_extra(start: &mut BytesStart, attributes: &Attributes) {
    for attr in attributes.iter() {
        start.push_attribute(attr);
    }
}
