use super::*;
use crate::test_support::{human_genes, two_experiment_store};

#[test]
fn test_gene_lookup_respects_taxon_and_case() {
    let store = human_genes();
    assert!(store.has_taxon("HUMAN"));
    assert!(!store.has_taxon("yeast"));

    let human_a = store.find_by_symbol("a", "human");
    assert_eq!(human_a.len(), 1);
    assert_eq!(human_a[0].id, GeneId(1));
    assert_eq!(store.find_by_symbol("A", "mouse")[0].id, GeneId(10));
    assert!(store.find_by_symbol("Z", "human").is_empty());

    assert_eq!(store.find_by_official_name("c protein", "human")[0].id, GeneId(3));
    assert_eq!(store.find_by_id(GeneId(4)).map(|g| g.symbol), Some("D".to_string()));
    assert_eq!(store.genes_in_taxon("human").len(), 4);
}

#[test]
fn test_duplicate_symbols_sorted_by_id() {
    let mut store = InMemoryStore::new(vec![crate::test_support::gene(9, "X", "human")]);
    store.add_gene(crate::test_support::gene(5, "x", "human"));
    store.add_gene(crate::test_support::gene(5, "dup", "human"));
    let ids: Vec<GeneId> = store.find_by_symbol("X", "human").iter().map(|g| g.id).collect();
    assert_eq!(ids, vec![GeneId(5), GeneId(9)]);
    assert!(store.find_by_symbol("dup", "human").is_empty());
}

#[test]
fn test_go_terms() {
    let mut store = human_genes();
    store.add_go_annotation(GeneId(3), "GO:0005634");
    store.add_go_annotation(GeneId(1), "go_0005634");
    store.add_go_annotation(GeneId(1), "GO:0005634");
    store.add_go_annotation(GeneId(10), "GO:0005634");
    let ids: Vec<GeneId> = store
        .genes_for_go_term("GO:0005634", "human")
        .iter()
        .map(|g| g.id)
        .collect();
    assert_eq!(ids, vec![GeneId(1), GeneId(3)]);
    assert!(store.genes_for_go_term("GO:1", "human").is_empty());
}

#[test]
fn test_experiments_and_vectors() {
    let store = two_experiment_store();
    let names: Vec<String> = store
        .experiments("human")
        .into_iter()
        .map(|e| e.short_name)
        .collect();
    assert_eq!(names, vec!["GSE1", "GSE2"]);
    assert!(store.experiments("mouse").is_empty());

    let a = store.gene_vectors(ExperimentId(100), GeneId(1));
    assert_eq!(a.len(), 1);
    assert_eq!(a[0].probe, "p1");
    assert_eq!(a[0].values, &[1.0, 2.0, 3.0, 4.0, 5.0]);

    assert!(store.gene_vectors(ExperimentId(101), GeneId(4)).is_empty());
    assert!(store.gene_vectors(ExperimentId(999), GeneId(1)).is_empty());
    assert_eq!(store.all_vectors(ExperimentId(101)).len(), 3);
    assert!(store.gene_vectors(ExperimentId(100), GeneId(4))[0].values[1].is_nan());
}

#[test]
fn test_from_bundle() {
    let dir = tempfile::TempDir::new().unwrap();
    crate::test_support::write_data_dir(dir.path());
    let bundle = crate::input::load_data_dir(dir.path(), Some("human"), false).unwrap();
    let store = InMemoryStore::from_bundle(bundle);
    let experiments = store.experiments("human");
    assert_eq!(experiments.len(), 2);
    assert_eq!(experiments[1].n_samples, 4);
    assert_eq!(store.genes_for_go_term("GO:0000001", "human").len(), 2);
}
