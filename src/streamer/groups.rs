use std::io::BufRead;

use quick_xml::events::BytesStart;

use super::helpers::{parse_score, take_required};
use super::{OrthoXmlStreamer, ParseError};
use crate::model::{GeneRef, GroupData, HogTree, NodeId, NodeKind, Property};
use crate::namespace::ElementKind;

impl<R: BufRead> OrthoXmlStreamer<R> {
    /// Materialize a whole rootHOG whose start tag was just read.
    ///
    /// Nesting is tracked with an explicit stack so that arbitrarily deep
    /// HOGs do not grow the call stack. Node ids follow document order.
    pub(super) fn parse_group(
        &mut self,
        start: BytesStart<'static>,
        empty: bool,
        kind: ElementKind,
    ) -> Result<HogTree, ParseError> {
        let mut tree = HogTree::new(self.group_node(&start, kind)?);
        if empty {
            return Ok(tree);
        }

        // comments and stray text join the extensions of the group they sit in
        let mut misc = Vec::new();
        let mut open: Vec<NodeId> = vec![tree.root()];
        while let Some(&current) = open.last() {
            let context = if tree.kind(current).is_paralog_group() {
                "paralogGroup"
            } else {
                "orthologGroup"
            };
            let next = self.next_child_keeping(context, &mut misc)?;
            if let Some(data) = tree.kind_mut(current).group_data_mut() {
                data.extensions.append(&mut misc);
            }
            let Some((child, child_empty)) = next else {
                open.pop();
                continue;
            };

            match self.classify(&child) {
                Some(kind @ (ElementKind::OrthologGroup | ElementKind::ParalogGroup)) => {
                    let node = self.group_node(&child, kind)?;
                    let id = tree.add_child(current, node);
                    if !child_empty {
                        open.push(id);
                    }
                }
                Some(ElementKind::GeneRef) => {
                    let gene_ref = self.parse_gene_ref(child, child_empty)?;
                    tree.add_child(current, NodeKind::GeneRef(gene_ref));
                }
                Some(ElementKind::Score) => {
                    let score = parse_score(&child, self.reader.decoder())?;
                    if !child_empty {
                        self.capture_raw(child, false)?;
                    }
                    if let Some(data) = tree.kind_mut(current).group_data_mut() {
                        data.scores.push(score);
                    }
                }
                Some(ElementKind::Property) => {
                    let mut attributes = self.attributes(&child)?;
                    let property = Property {
                        name: take_required(&mut attributes, "property", "name")?,
                        value: attributes.remove("value"),
                    };
                    if !child_empty {
                        self.capture_raw(child, false)?;
                    }
                    if let Some(data) = tree.kind_mut(current).group_data_mut() {
                        data.properties.push(property);
                    }
                }
                _ => {
                    let raw = self.capture_raw(child, child_empty)?;
                    if let Some(data) = tree.kind_mut(current).group_data_mut() {
                        data.extensions.push(raw);
                    }
                }
            }
        }
        Ok(tree)
    }

    fn group_node(&self, start: &BytesStart, kind: ElementKind) -> Result<NodeKind, ParseError> {
        let mut attributes = self.attributes(start)?;
        let data = GroupData {
            id: attributes.remove("id"),
            attributes,
            ..Default::default()
        };
        Ok(match kind {
            ElementKind::ParalogGroup => NodeKind::ParalogGroup(data),
            _ => NodeKind::OrthologGroup(data),
        })
    }

    fn parse_gene_ref(&mut self, start: BytesStart<'static>, empty: bool) -> Result<GeneRef, ParseError> {
        let mut attributes = self.attributes(&start)?;
        let mut gene_ref = GeneRef::new(take_required(&mut attributes, "geneRef", "id")?);
        gene_ref.attributes = attributes;
        if !empty {
            while let Some((child, child_empty)) = self.next_child("geneRef")? {
                gene_ref.content.push(self.capture_raw(child, child_empty)?);
            }
        }
        Ok(gene_ref)
    }
}
