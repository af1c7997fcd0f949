//! Streaming OrthoXML reader using quick-xml
//!
//! This module provides a pull-based reader that recognizes the sections of
//! an OrthoXML document in order and hands each one out fully parsed, while
//! keeping at most one rootHOG in memory at any time.
//!
//! ```text
//! orthoXML
//! ├── notes?            -> DocumentItem::PassThrough
//! ├── species*          -> DocumentItem::Species (one per entry)
//! ├── taxonomy?         -> DocumentItem::Taxonomy
//! ├── scores?           -> DocumentItem::Scores
//! └── groups            -> GroupsStart, then
//!     ├── orthologGroup -> DocumentItem::Group (whole subtree)
//!     ├── paralogGroup  -> DocumentItem::Group (whole subtree)
//!     └── (other)       -> DocumentItem::PassThrough
//! ```
//!
//! Text is read untrimmed. Comments and non-blank text directly inside the
//! root or `<groups>` come out as pass-through items, and inside a group they
//! are kept with that group's extensions. Elsewhere they are skipped.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{debug, warn};
use quick_xml::events::{BytesStart, Event};
use quick_xml::NsReader;

use crate::model::{Attributes, DocumentHeader, DocumentItem, RawElement};
use crate::namespace::{ElementKind, NamespaceResolver, ORTHOXML_NAMESPACE};

pub use error::ParseError;

mod error;
mod groups;
mod helpers;
mod sections;


/// Default input buffer size for OrthoXML parsing (64KB)
pub const DEFAULT_INPUT_BUFFER_SIZE: usize = 64 * 1024;

/// Position in the fixed section order of the root element
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Section {
    Start,
    Species,
    Taxonomy,
    Scores,
    Groups,
    AfterGroups,
}

/// Where the reader currently is in the element hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Prolog,
    InRoot,
    InGroups,
    Finished,
}

/// Streaming parser for OrthoXML documents
pub struct OrthoXmlStreamer<R: BufRead> {
    reader: NsReader<R>,
    resolver: NamespaceResolver,
    stage: Stage,
    section: Section,
    pending: VecDeque<DocumentItem>,
    groups_read: usize,
}

impl OrthoXmlStreamer<BufReader<File>> {
    /// Open an OrthoXML file for streaming with default buffer size (64KB)
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ParseError> {
        let file = File::open(path.as_ref())?;
        Ok(Self::new(BufReader::with_capacity(DEFAULT_INPUT_BUFFER_SIZE, file)))
    }
}

impl<R: BufRead> OrthoXmlStreamer<R> {
    /// Create a new streamer from a BufRead source
    pub fn new(reader: R) -> Self {
        Self {
            reader: NsReader::from_reader(reader),
            resolver: NamespaceResolver::default(),
            stage: Stage::Prolog,
            section: Section::Start,
            pending: VecDeque::new(),
            groups_read: 0,
        }
    }

    /// Namespace binding of the document (default until the root was read)
    pub fn namespace(&self) -> &NamespaceResolver {
        &self.resolver
    }

    /// Number of rootHOGs read so far
    pub fn groups_read(&self) -> usize {
        self.groups_read
    }

    /// Iterate over all document items
    pub fn items(self) -> DocumentItems<R> {
        DocumentItems { streamer: self }
    }

    /// Read the next document item.
    ///
    /// Returns `Ok(None)` once the root element has been closed. Input that
    /// ends before that point is reported as [`ParseError::UnexpectedEof`].
    pub fn next_item(&mut self) -> Result<Option<DocumentItem>, ParseError> {
        if let Some(item) = self.pending.pop_front() {
            return Ok(Some(item));
        }
        if self.stage == Stage::Finished {
            return Ok(None);
        }

        let mut buf = Vec::new();
        loop {
            buf.clear();
            let (start, empty) = match self.reader.read_event_into(&mut buf)? {
                Event::Start(e) => (e.into_owned(), false),
                Event::Empty(e) => (e.into_owned(), true),
                Event::End(_) => return Ok(Some(self.close_current())),
                Event::Eof => {
                    return Err(match self.stage {
                        Stage::Prolog => {
                            ParseError::InvalidStructure("document has no root element".to_string())
                        }
                        Stage::InGroups => ParseError::UnexpectedEof { context: "groups" },
                        _ => ParseError::UnexpectedEof { context: "orthoXML" },
                    })
                }
                other => {
                    if matches!(self.stage, Stage::InRoot | Stage::InGroups) {
                        if let Some(raw) = misc_node(other) {
                            return Ok(Some(DocumentItem::PassThrough(raw)));
                        }
                    }
                    continue;
                }
            };
            return self.open_element(start, empty).map(Some);
        }
    }

    fn close_current(&mut self) -> DocumentItem {
        match self.stage {
            Stage::InGroups => {
                self.stage = Stage::InRoot;
                self.section = Section::AfterGroups;
                DocumentItem::GroupsEnd
            }
            // quick-xml checks end tag names, so in the root this is `</orthoXML>`
            _ => {
                self.stage = Stage::Finished;
                DocumentItem::DocumentEnd
            }
        }
    }

    fn open_element(&mut self, start: BytesStart<'static>, empty: bool) -> Result<DocumentItem, ParseError> {
        match self.stage {
            Stage::Prolog => self.open_root(start, empty),
            Stage::InRoot => self.open_section(start, empty),
            Stage::InGroups => self.open_toplevel_group(start, empty),
            Stage::Finished => Err(ParseError::InvalidStructure(
                "content after the root element".to_string(),
            )),
        }
    }

    fn open_root(&mut self, start: BytesStart<'static>, empty: bool) -> Result<DocumentItem, ParseError> {
        if start.local_name().as_ref() != ElementKind::OrthoXml.local_name().as_bytes() {
            return Err(ParseError::InvalidStructure(format!(
                "root element is <{}>, expected <orthoXML>",
                String::from_utf8_lossy(start.name().as_ref())
            )));
        }
        let (namespace, _) = self.reader.resolve_element(start.name());
        self.resolver = NamespaceResolver::from_root(&namespace, start.name());
        if !self.resolver.is_canonical() {
            warn!(
                "Document namespace {:?} differs from {}",
                self.resolver.namespace(),
                ORTHOXML_NAMESPACE
            );
        }

        let header = DocumentHeader {
            name: std::str::from_utf8(start.name().as_ref())?.to_string(),
            attributes: self.attributes(&start)?,
            namespace: self.resolver.clone(),
        };
        debug!("OrthoXML version: {:?}", header.version());

        self.stage = Stage::InRoot;
        if empty {
            self.stage = Stage::Finished;
            self.pending.push_back(DocumentItem::DocumentEnd);
        }
        Ok(DocumentItem::Header(header))
    }

    fn open_section(&mut self, start: BytesStart<'static>, empty: bool) -> Result<DocumentItem, ParseError> {
        match self.classify(&start) {
            Some(ElementKind::Species) => {
                self.enter_section(Section::Species, "species")?;
                Ok(DocumentItem::Species(self.parse_species(start, empty)?))
            }
            Some(ElementKind::Taxonomy) => {
                self.enter_section(Section::Taxonomy, "taxonomy")?;
                Ok(DocumentItem::Taxonomy(self.parse_taxonomy(start, empty)?))
            }
            Some(ElementKind::Scores) => {
                self.enter_section(Section::Scores, "scores")?;
                Ok(DocumentItem::Scores(self.parse_score_definitions(start, empty)?))
            }
            Some(ElementKind::Groups) => {
                self.enter_section(Section::Groups, "groups")?;
                let attributes = self.attributes(&start)?;
                if empty {
                    self.section = Section::AfterGroups;
                    self.pending.push_back(DocumentItem::GroupsEnd);
                } else {
                    self.stage = Stage::InGroups;
                }
                Ok(DocumentItem::GroupsStart(attributes))
            }
            _ => {
                debug!(
                    "Passing through <{}> in document root",
                    String::from_utf8_lossy(start.name().as_ref())
                );
                Ok(DocumentItem::PassThrough(self.capture_raw(start, empty)?))
            }
        }
    }

    fn open_toplevel_group(&mut self, start: BytesStart<'static>, empty: bool) -> Result<DocumentItem, ParseError> {
        match self.classify(&start) {
            Some(kind) if kind.is_group() => {
                self.groups_read += 1;
                Ok(DocumentItem::Group(self.parse_group(start, empty, kind)?))
            }
            _ => {
                warn!(
                    "Passing through unrecognized <{}> inside <groups>",
                    String::from_utf8_lossy(start.name().as_ref())
                );
                Ok(DocumentItem::PassThrough(self.capture_raw(start, empty)?))
            }
        }
    }

    /// Enforce the fixed section order; only species entries may repeat
    fn enter_section(&mut self, next: Section, name: &str) -> Result<(), ParseError> {
        let allowed = if next == Section::Species {
            self.section <= next
        } else {
            self.section < next
        };
        if !allowed {
            return Err(ParseError::InvalidStructure(format!(
                "<{}> is out of order or repeated",
                name
            )));
        }
        self.section = next;
        Ok(())
    }

    /// Logical kind of an element just read, `None` if outside the grammar
    fn classify(&self, e: &BytesStart) -> Option<ElementKind> {
        let (namespace, local) = self.reader.resolve_element(e.name());
        self.resolver.classify(&namespace, local)
    }

    fn attributes(&self, e: &BytesStart) -> Result<Attributes, ParseError> {
        helpers::collect_attributes(e, self.reader.decoder())
    }

    /// Read up to the next child element of the element currently open.
    ///
    /// Returns `None` when the closing tag of that element is reached.
    /// Comments and text between children are skipped.
    fn next_child(&mut self, context: &'static str) -> Result<Option<(BytesStart<'static>, bool)>, ParseError> {
        self.read_child(context, None)
    }

    /// Like [`next_child`](Self::next_child), but comments and non-blank
    /// text met on the way are appended to `misc`
    fn next_child_keeping(
        &mut self,
        context: &'static str,
        misc: &mut Vec<RawElement>,
    ) -> Result<Option<(BytesStart<'static>, bool)>, ParseError> {
        self.read_child(context, Some(misc))
    }

    fn read_child(
        &mut self,
        context: &'static str,
        mut misc: Option<&mut Vec<RawElement>>,
    ) -> Result<Option<(BytesStart<'static>, bool)>, ParseError> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match self.reader.read_event_into(&mut buf)? {
                Event::Start(e) => return Ok(Some((e.into_owned(), false))),
                Event::Empty(e) => return Ok(Some((e.into_owned(), true))),
                Event::End(_) => return Ok(None),
                Event::Eof => return Err(ParseError::UnexpectedEof { context }),
                other => {
                    if let (Some(misc), Some(raw)) = (misc.as_deref_mut(), misc_node(other)) {
                        misc.push(raw);
                    }
                }
            }
        }
    }

    /// Capture an element and everything inside it verbatim
    fn capture_raw(&mut self, start: BytesStart<'static>, empty: bool) -> Result<RawElement, ParseError> {
        if empty {
            return Ok(RawElement::new(vec![Event::Empty(start)]));
        }

        let mut events = vec![Event::Start(start)];
        let mut depth = 1usize;
        let mut buf = Vec::new();
        while depth > 0 {
            buf.clear();
            let event = self.reader.read_event_into(&mut buf)?.into_owned();
            match &event {
                Event::Start(_) => depth += 1,
                Event::End(_) => depth -= 1,
                Event::Eof => return Err(ParseError::UnexpectedEof { context: "pass-through element" }),
                _ => {}
            }
            events.push(event);
        }
        Ok(RawElement::new(events))
    }
}

/// A node between elements worth keeping; indentation whitespace is not
fn misc_node(event: Event<'_>) -> Option<RawElement> {
    let keep = match &event {
        Event::Comment(_) | Event::CData(_) | Event::PI(_) => true,
        Event::Text(text) => !text.iter().all(u8::is_ascii_whitespace),
        _ => false,
    };
    keep.then(|| RawElement::new(vec![event.into_owned()]))
}

/// Iterator over the items of an OrthoXML document
pub struct DocumentItems<R: BufRead> {
    streamer: OrthoXmlStreamer<R>,
}

impl<R: BufRead> Iterator for DocumentItems<R> {
    type Item = Result<DocumentItem, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.streamer.next_item() {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
