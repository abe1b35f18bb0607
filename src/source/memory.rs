use std::collections::{BTreeMap, HashMap};

use crate::input::DataBundle;
use crate::input::annotations::normalize_go_term;
use crate::input::expression::ExpressionTable;
use crate::input::genes::normalize_symbol;
use crate::model::gene::{Experiment, ExperimentId, Gene, GeneId};
use crate::source::{ExperimentCatalog, ExpressionVectorSource, GeneLookup, ProbeVector};

#[derive(Debug, Clone)]
struct StoredExperiment {
    meta: Experiment,
    table: ExpressionTable,
    probes_by_gene: HashMap<GeneId, Vec<usize>>,
}

/// File-backed reference store built from a data directory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    genes: Vec<Gene>,
    by_id: HashMap<GeneId, usize>,
    by_symbol: HashMap<String, Vec<usize>>,
    by_name: HashMap<String, Vec<usize>>,
    go_terms: HashMap<String, Vec<GeneId>>,
    experiments: Vec<StoredExperiment>,
}

impl InMemoryStore {
    pub fn new(genes: Vec<Gene>) -> Self {
        let mut store = InMemoryStore::default();
        for gene in genes {
            store.add_gene(gene);
        }
        store
    }

    pub fn from_bundle(bundle: DataBundle) -> Self {
        let mut store = Self::new(bundle.genes);
        for (gene, term) in bundle.go_annotations {
            store.add_go_annotation(gene, &term);
        }
        for loaded in bundle.experiments {
            let meta = Experiment {
                id: loaded.entry.id,
                short_name: loaded.entry.short_name,
                taxon: loaded.entry.taxon,
                n_samples: loaded.table.sample_names.len(),
            };
            store.add_experiment(meta, loaded.table);
        }
        store
    }

    pub fn add_gene(&mut self, gene: Gene) {
        if self.by_id.contains_key(&gene.id) {
            return;
        }
        let idx = self.genes.len();
        self.by_id.insert(gene.id, idx);
        let symbol = normalize_symbol(&gene.symbol);
        if !symbol.is_empty() {
            self.by_symbol.entry(symbol).or_default().push(idx);
        }
        if let Some(name) = &gene.official_name {
            let name = normalize_symbol(name);
            if !name.is_empty() {
                self.by_name.entry(name).or_default().push(idx);
            }
        }
        self.genes.push(gene);
    }

    pub fn add_go_annotation(&mut self, gene: GeneId, term: &str) {
        let genes = self.go_terms.entry(normalize_go_term(term)).or_default();
        if !genes.contains(&gene) {
            genes.push(gene);
        }
    }

    pub fn add_experiment(&mut self, meta: Experiment, table: ExpressionTable) {
        let mut probes_by_gene: HashMap<GeneId, Vec<usize>> = HashMap::new();
        for (idx, probe) in table.probes.iter().enumerate() {
            for &gene in &probe.genes {
                probes_by_gene.entry(gene).or_default().push(idx);
            }
        }
        self.experiments.push(StoredExperiment {
            meta,
            table,
            probes_by_gene,
        });
    }

    fn experiment(&self, id: ExperimentId) -> Option<&StoredExperiment> {
        self.experiments.iter().find(|e| e.meta.id == id)
    }

    fn matching(&self, indices: Option<&Vec<usize>>, taxon: &str) -> Vec<Gene> {
        let mut out: Vec<Gene> = indices
            .map(|idx| {
                idx.iter()
                    .map(|&i| &self.genes[i])
                    .filter(|g| g.taxon.eq_ignore_ascii_case(taxon))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        out.sort_by_key(|g| g.id);
        out
    }
}

impl GeneLookup for InMemoryStore {
    fn has_taxon(&self, taxon: &str) -> bool {
        self.genes.iter().any(|g| g.taxon.eq_ignore_ascii_case(taxon))
    }

    fn find_by_id(&self, id: GeneId) -> Option<Gene> {
        self.by_id.get(&id).map(|&idx| self.genes[idx].clone())
    }

    fn find_by_symbol(&self, symbol: &str, taxon: &str) -> Vec<Gene> {
        self.matching(self.by_symbol.get(&normalize_symbol(symbol)), taxon)
    }

    fn find_by_official_name(&self, name: &str, taxon: &str) -> Vec<Gene> {
        self.matching(self.by_name.get(&normalize_symbol(name)), taxon)
    }

    fn genes_for_go_term(&self, term: &str, taxon: &str) -> Vec<Gene> {
        let Some(ids) = self.go_terms.get(&normalize_go_term(term)) else {
            return Vec::new();
        };
        let mut unique: BTreeMap<GeneId, Gene> = BTreeMap::new();
        for id in ids {
            if let Some(gene) = self.find_by_id(*id) {
                if gene.taxon.eq_ignore_ascii_case(taxon) {
                    unique.insert(gene.id, gene);
                }
            }
        }
        unique.into_values().collect()
    }

    fn genes_in_taxon(&self, taxon: &str) -> Vec<Gene> {
        let mut out: Vec<Gene> = self
            .genes
            .iter()
            .filter(|g| g.taxon.eq_ignore_ascii_case(taxon))
            .cloned()
            .collect();
        out.sort_by_key(|g| g.id);
        out
    }
}

impl ExperimentCatalog for InMemoryStore {
    fn experiments(&self, taxon: &str) -> Vec<Experiment> {
        self.experiments
            .iter()
            .filter(|e| e.meta.taxon.eq_ignore_ascii_case(taxon))
            .map(|e| e.meta.clone())
            .collect()
    }
}

impl ExpressionVectorSource for InMemoryStore {
    fn gene_vectors(&self, experiment: ExperimentId, gene: GeneId) -> Vec<ProbeVector<'_>> {
        let Some(stored) = self.experiment(experiment) else {
            return Vec::new();
        };
        let Some(indices) = stored.probes_by_gene.get(&gene) else {
            return Vec::new();
        };
        indices
            .iter()
            .map(|&idx| {
                let probe = &stored.table.probes[idx];
                ProbeVector {
                    probe: &probe.name,
                    values: &probe.values,
                    rank: probe.rank,
                }
            })
            .collect()
    }

    fn all_vectors(&self, experiment: ExperimentId) -> Vec<ProbeVector<'_>> {
        let Some(stored) = self.experiment(experiment) else {
            return Vec::new();
        };
        stored
            .table
            .probes
            .iter()
            .map(|probe| ProbeVector {
                probe: &probe.name,
                values: &probe.values,
                rank: probe.rank,
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/source/memory.rs"]
mod tests;
