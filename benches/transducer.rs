use std::io::Cursor;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use orthoxml_stream::filter::{filter_stream, FilterConfig, FilterStrategy};
use orthoxml_stream::streamer::OrthoXmlStreamer;
use orthoxml_stream::transducer::{IdentityVisitor, Transducer, TransducerConfig};

fn generate_test_orthoxml(num_hogs: usize, genes_per_hog: usize) -> Vec<u8> {
    let mut doc = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<orthoXML xmlns="http://orthoXML.org/2011/" origin="bench" version="0.5">
  <species name="BENCH" NCBITaxId="1">
    <database name="db">
      <genes>"#,
    );
    for g in 0..num_hogs * genes_per_hog {
        doc.push_str(&format!("\n        <gene id=\"{}\" protId=\"P{}\"/>", g, g));
    }
    doc.push_str("\n      </genes>\n    </database>\n  </species>\n  <groups>");

    for h in 0..num_hogs {
        // alternate passing and failing inner groups so both filters do real work
        let score = if h % 3 == 0 { 0.2 } else { 0.8 };
        doc.push_str(&format!(
            "\n    <orthologGroup id=\"{}\">\n      <score id=\"CompletenessScore\" value=\"{}\"/>",
            h, score
        ));
        let half = genes_per_hog / 2;
        for (part, range) in [(0, 0..half), (1, half..genes_per_hog)] {
            let inner_score = if part == 0 { 0.9 } else { 0.4 };
            doc.push_str(&format!(
                "\n      <orthologGroup id=\"{}.{}\"><score id=\"CompletenessScore\" value=\"{}\"/>",
                h, part, inner_score
            ));
            for g in range {
                doc.push_str(&format!("<geneRef id=\"{}\"/>", h * genes_per_hog + g));
            }
            doc.push_str("</orthologGroup>");
        }
        doc.push_str("\n    </orthologGroup>");
    }

    doc.push_str("\n  </groups>\n</orthoXML>\n");
    doc.into_bytes()
}

fn bench_streamer(c: &mut Criterion) {
    let mut group = c.benchmark_group("streamer");
    for &num_hogs in &[100usize, 1_000] {
        let data = generate_test_orthoxml(num_hogs, 10);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("next_item", num_hogs), &data, |b, data| {
            b.iter(|| {
                let mut streamer = OrthoXmlStreamer::new(Cursor::new(data.as_slice()));
                let mut count = 0usize;
                while let Some(item) = streamer.next_item().unwrap() {
                    black_box(&item);
                    count += 1;
                }
                count
            });
        });
    }
    group.finish();
}

fn bench_transducer(c: &mut Criterion) {
    let mut group = c.benchmark_group("transducer");
    let data = generate_test_orthoxml(1_000, 10);
    group.throughput(Throughput::Bytes(data.len() as u64));

    let configs = [
        ("identity_inline", TransducerConfig::default()),
        ("identity_pipelined", TransducerConfig::default().with_pipeline(16)),
    ];
    for (name, config) in configs {
        let transducer = Transducer::with_config(config);
        group.bench_function(name, |b| {
            b.iter(|| {
                transducer
                    .process(Cursor::new(data.as_slice()), Vec::new(), &mut IdentityVisitor)
                    .unwrap()
            });
        });
    }

    for strategy in [FilterStrategy::CascadeRemove, FilterStrategy::Extract] {
        let config = FilterConfig::new(0.5, strategy);
        group.bench_with_input(BenchmarkId::new("filter", strategy), &config, |b, config| {
            b.iter(|| {
                filter_stream(Cursor::new(data.as_slice()), Vec::new(), config, &TransducerConfig::default())
                    .unwrap()
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_streamer, bench_transducer);
criterion_main!(benches);
