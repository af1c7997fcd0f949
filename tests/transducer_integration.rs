//! Transducer tests over files and unusual documents

use std::io::Cursor;

use orthoxml_stream::io::open_input;
use orthoxml_stream::model::{DocumentItem, HogTree, Species};
use orthoxml_stream::stats::{BasicStats, RootHogCounter, RootHogSplitter};
use orthoxml_stream::streamer::OrthoXmlStreamer;
use orthoxml_stream::transducer::{
    process_stream_orthoxml, GroupOutcome, IdentityVisitor, OrthoXmlVisitor, SectionOutcome, Transducer,
    TransducerConfig,
};

const DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<orthoXML xmlns="http://orthoXML.org/2011/" origin="test" version="0.5">
  <notes>generated for tests</notes>
  <species name="HUMAN" NCBITaxId="9606">
    <database name="db"><genes><gene id="1" geneId="ENSG1"/><gene id="2"/></genes></database>
  </species>
  <taxonomy><taxon id="9606" name="HUMAN"/></taxonomy>
  <groups>
    <orthologGroup id="a" taxonId="9606">
      <property name="TaxRange" value="Homo sapiens"/>
      <geneRef id="1"/>
    </orthologGroup>
    <clusterGroup id="x"><geneRef id="2"/></clusterGroup>
    <orthologGroup id="b"><paralogGroup><geneRef id="1"/><geneRef id="2"/></paralogGroup></orthologGroup>
  </groups>
</orthoXML>
"#;

fn items_of(bytes: &[u8]) -> Vec<DocumentItem> {
    OrthoXmlStreamer::new(Cursor::new(bytes))
        .items()
        .collect::<Result<_, _>>()
        .unwrap()
}

#[test]
fn test_identity_preserves_extras_and_foreign_groups() {
    let (out, stats) = Transducer::new()
        .process(Cursor::new(DOC), Vec::new(), &mut IdentityVisitor)
        .unwrap();
    assert_eq!(stats.groups_read, 2);
    assert_eq!(stats.passed_through, 2);

    let text = String::from_utf8(out.clone()).unwrap();
    assert!(text.contains("<notes>generated for tests</notes>"));
    assert!(text.contains(r#"taxonId="9606""#));
    assert!(text.contains(r#"<property name="TaxRange" value="Homo sapiens"/>"#));
    assert!(text.contains(r#"<clusterGroup id="x">"#));
    assert!(text.contains(r#"geneId="ENSG1""#));

    // a second pass is a fixed point
    assert_eq!(items_of(&out), items_of(DOC.as_bytes()));
}

#[test]
fn test_gzip_round_trip_through_paths() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.orthoxml.gz");
    let output = dir.path().join("out.orthoxml.gz");

    let first = dir.path().join("plain.orthoxml");
    std::fs::write(&first, DOC).unwrap();
    process_stream_orthoxml(&first, &input, &mut IdentityVisitor).unwrap();
    process_stream_orthoxml(&input, &output, &mut IdentityVisitor).unwrap();

    let raw = std::fs::read(&output).unwrap();
    assert_eq!(&raw[..2], &[0x1f, 0x8b]);

    let items: Vec<DocumentItem> = OrthoXmlStreamer::new(open_input(&output, 4096).unwrap())
        .items()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(items, items_of(DOC.as_bytes()));
}

#[test]
fn test_compact_and_pipelined_output_parse_the_same() {
    let compact = Transducer::with_config(TransducerConfig::default().with_indent(None));
    let pipelined = Transducer::with_config(TransducerConfig::default().with_pipeline(2));

    let (flat, _) = compact.process(Cursor::new(DOC), Vec::new(), &mut IdentityVisitor).unwrap();
    let (threaded, _) = pipelined.process(Cursor::new(DOC), Vec::new(), &mut IdentityVisitor).unwrap();

    assert!(!String::from_utf8(flat.clone()).unwrap().contains("\n  <species"));
    assert_eq!(items_of(&flat), items_of(&threaded));
}

#[test]
fn test_species_and_group_hooks_see_everything_once() {
    #[derive(Default)]
    struct Recorder {
        species: Vec<String>,
        groups: usize,
    }

    impl OrthoXmlVisitor for Recorder {
        fn visit_species(&mut self, species: Species) -> SectionOutcome<Species> {
            self.species.push(species.name.clone());
            SectionOutcome::Keep(species)
        }

        fn visit_group(&mut self, tree: HogTree) -> GroupOutcome {
            self.groups += 1;
            GroupOutcome::Keep(tree)
        }
    }

    let mut recorder = Recorder::default();
    Transducer::new()
        .process(Cursor::new(DOC), Vec::new(), &mut recorder)
        .unwrap();
    assert_eq!(recorder.species, vec!["HUMAN"]);
    // clusterGroup is passed through without a hook
    assert_eq!(recorder.groups, 2);
}

#[test]
fn test_split_one_file_per_root_hog() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("hogs.orthoxml");
    std::fs::write(&input, DOC).unwrap();

    let transducer = Transducer::new();
    let mut counter = RootHogCounter::default();
    transducer.inspect_path(&input, &mut counter).unwrap();
    assert_eq!(counter.count, 2);

    for rhog in 1..=counter.count {
        let output = dir.path().join(format!("{}_hogs.orthoxml", rhog));
        transducer
            .process_path(&input, &output, &mut RootHogSplitter::new(rhog))
            .unwrap();

        let mut stats = BasicStats::new();
        transducer.inspect_path(&output, &mut stats).unwrap();
        assert_eq!(stats.rhog_count, 1);
        assert_eq!(stats.species_count, 1);
        assert_eq!(stats.gene_count, 2);
    }
}

#[test]
fn test_identity_keeps_mixed_content_and_comments() {
    let doc = r#"<orthoXML xmlns="http://orthoXML.org/2011/" version="0.5">
  <!-- exported -->
  <foo> a  b </foo><bar>x<i>y</i> z</bar>
  <groups>
    <orthologGroup id="a"><!-- low coverage --><geneRef id="1"/></orthologGroup>
  </groups>
</orthoXML>
"#;
    let (out, stats) = Transducer::new()
        .process(Cursor::new(doc), Vec::new(), &mut IdentityVisitor)
        .unwrap();
    assert_eq!(stats.passed_through, 3);

    let text = String::from_utf8(out.clone()).unwrap();
    assert!(text.contains("<!-- exported -->"));
    assert!(text.contains("<foo> a  b </foo>"));
    assert!(text.contains("<bar>x<i>y</i> z</bar>"));
    assert!(text.contains("<!-- low coverage -->"));
    assert_eq!(items_of(&out), items_of(doc.as_bytes()));
}
