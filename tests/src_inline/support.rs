use std::fs;
use std::io::Write;
use std::path::Path;

use flate2::Compression;
use flate2::write::GzEncoder;

use crate::input::expression::{ExpressionTable, ProbeRow, assign_expression_ranks};
use crate::model::gene::{Experiment, ExperimentId, Gene, GeneId};
use crate::source::memory::InMemoryStore;

pub fn write_file(path: &Path, contents: &str) {
    fs::write(path, contents).unwrap();
}

pub fn write_gz(path: &Path, contents: &str) {
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(contents.as_bytes()).unwrap();
    fs::write(path, enc.finish().unwrap()).unwrap();
}

pub fn gene(id: u64, symbol: &str, taxon: &str) -> Gene {
    Gene {
        id: GeneId(id),
        symbol: symbol.to_string(),
        official_name: Some(format!("{symbol} protein")),
        taxon: taxon.to_string(),
    }
}

pub fn experiment(id: u64, name: &str, n_samples: usize) -> Experiment {
    Experiment {
        id: ExperimentId(id),
        short_name: name.to_string(),
        taxon: "human".to_string(),
        n_samples,
    }
}

/// Rows of (probe, genes, values); ranks are assigned as the loader would.
pub fn table(rows: &[(&str, &[u64], &[f64])]) -> ExpressionTable {
    let n = rows.first().map(|r| r.2.len()).unwrap_or(0);
    let mut probes: Vec<ProbeRow> = rows
        .iter()
        .map(|(name, genes, values)| ProbeRow {
            name: name.to_string(),
            genes: genes.iter().map(|&g| GeneId(g)).collect(),
            values: values.to_vec(),
            rank: 0.0,
        })
        .collect();
    assign_expression_ranks(&mut probes);
    ExpressionTable {
        sample_names: (1..=n).map(|i| format!("s{i}")).collect(),
        probes,
    }
}

/// Human genes A..D (ids 1..4) plus a mouse A (id 10), no experiments.
pub fn human_genes() -> InMemoryStore {
    InMemoryStore::new(vec![
        gene(1, "A", "human"),
        gene(2, "B", "human"),
        gene(3, "C", "human"),
        gene(4, "D", "human"),
        gene(10, "A", "mouse"),
    ])
}

/// A..D with two human experiments:
/// GSE1: A and B perfectly correlated, C anti-correlated, D with 3 samples.
/// GSE2: A and B anti-correlated, C with only two samples, no D.
pub fn two_experiment_store() -> InMemoryStore {
    let nan = f64::NAN;
    let mut store = human_genes();
    store.add_experiment(
        experiment(100, "GSE1", 5),
        table(&[
            ("p1", &[1], &[1.0, 2.0, 3.0, 4.0, 5.0]),
            ("p2", &[2], &[2.0, 4.0, 6.0, 8.0, 10.0]),
            ("p3", &[3], &[5.0, 4.0, 3.0, 2.0, 1.0]),
            ("p5", &[4], &[1.0, nan, 3.0, nan, 5.0]),
        ]),
    );
    store.add_experiment(
        experiment(101, "GSE2", 4),
        table(&[
            ("q1", &[1], &[1.0, 2.0, 3.0, 4.0]),
            ("q2", &[2], &[4.0, 3.0, 2.0, 1.0]),
            ("q3", &[3], &[nan, nan, 1.0, 2.0]),
        ]),
    );
    store
}

/// The on-disk version of a small human/mouse data directory.
pub fn write_data_dir(dir: &Path) {
    write_file(
        &dir.join("genes.tsv"),
        "gene_id\tsymbol\tofficial_name\ttaxon\n\
         1\tA\talpha\thuman\n\
         2\tB\tbeta\thuman\n\
         3\tC\tgamma\thuman\n\
         4\tD\t\thuman\n\
         10\tA\tmouse alpha\tmouse\n",
    );
    write_file(
        &dir.join("experiments.tsv"),
        "experiment_id\tshort_name\ttaxon\tmatrix\n\
         100\tGSE1\thuman\tgse1.tsv\n\
         101\tGSE2\thuman\tgse2.tsv.gz\n\
         200\tGSE9\tmouse\tgse9.tsv\n",
    );
    write_file(
        &dir.join("gse1.tsv"),
        "probe\tgenes\ts1\ts2\ts3\ts4\ts5\n\
         p1\t1\t1\t2\t3\t4\t5\n\
         p2\t2\t2\t4\t6\t8\t10\n\
         p3\t3\t5\t4\t3\t2\t1\n\
         p4\t1,2\t1\t1\t1\t1\t2\n\
         p5\t4\t1\tNA\t3\t\t5\n",
    );
    write_gz(
        &dir.join("gse2.tsv.gz"),
        "probe\tgenes\ts1\ts2\ts3\ts4\n\
         q1\t1\t1\t2\t3\t4\n\
         q2\t2\t4\t3\t2\t1\n\
         q3\t3\tNaN\tnull\t1\t2\n",
    );
    write_file(
        &dir.join("gse9.tsv"),
        "probe\tgenes\ts1\ts2\ts3\n\
         m1\t10\t1\t2\t3\n",
    );
    write_file(
        &dir.join("go_annotations.tsv"),
        "gene_id\tgo_term\n\
         1\tGO:0000001\n\
         3\tgo_0000001\n\
         10\tGO:0000001\n",
    );
}
