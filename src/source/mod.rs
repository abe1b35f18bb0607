//! Seams to the reference data the analysis reads but never owns: gene
//! lookup, experiment iteration and per-probe expression vectors.

pub mod memory;

use crate::model::gene::{Experiment, ExperimentId, Gene, GeneId};

/// One probe's expression series within one experiment. NaN marks a missing sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeVector<'a> {
    pub probe: &'a str,
    pub values: &'a [f64],
    pub rank: f64,
}

pub trait GeneLookup {
    fn has_taxon(&self, taxon: &str) -> bool;
    fn find_by_id(&self, id: GeneId) -> Option<Gene>;
    fn find_by_symbol(&self, symbol: &str, taxon: &str) -> Vec<Gene>;
    fn find_by_official_name(&self, name: &str, taxon: &str) -> Vec<Gene>;
    fn genes_for_go_term(&self, term: &str, taxon: &str) -> Vec<Gene>;
    fn genes_in_taxon(&self, taxon: &str) -> Vec<Gene>;
}

pub trait ExperimentCatalog {
    /// Experiments of the taxon in catalog order.
    fn experiments(&self, taxon: &str) -> Vec<Experiment>;
}

pub trait ExpressionVectorSource {
    /// Vectors of every probe of `gene` in `experiment`; empty when the gene has none.
    fn gene_vectors(&self, experiment: ExperimentId, gene: GeneId) -> Vec<ProbeVector<'_>>;
    /// Every probe vector of the experiment, used for background distributions.
    fn all_vectors(&self, experiment: ExperimentId) -> Vec<ProbeVector<'_>>;
}
