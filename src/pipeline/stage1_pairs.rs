use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;

use rand::Rng;

use crate::input::InputError;
use crate::input::lists::{read_name_list, read_pair_lines};
use crate::model::gene::{Gene, GeneId, GeneNameKind, GeneNames};
use crate::model::pair::GenePair;
use crate::source::GeneLookup;

#[derive(Debug, Clone, PartialEq)]
pub enum PairSource {
    /// All-against-all over explicit official symbols.
    Symbols(Vec<String>),
    /// All-against-all over names read from a file.
    GeneList { path: PathBuf, kind: GeneNameKind },
    /// Every query gene against every target gene.
    QueryTarget {
        query: PathBuf,
        target: PathBuf,
        kind: GeneNameKind,
    },
    /// Explicit pairs; a third column, when present, is filtered by `stringency`.
    PairFile {
        path: PathBuf,
        kind: GeneNameKind,
        stringency: u32,
    },
    /// All-against-all over the genes annotated with a GO term.
    GoTerm(String),
    /// Shuffled control pairs drawn from the whole taxon.
    Random { count: usize },
}

impl PairSource {
    pub fn describe(&self) -> String {
        match self {
            PairSource::Symbols(symbols) => format!("symbols ({})", symbols.len()),
            PairSource::GeneList { path, kind } => {
                format!("gene list {} by {}", path.display(), kind.label())
            }
            PairSource::QueryTarget { query, target, kind } => format!(
                "query {} x target {} by {}",
                query.display(),
                target.display(),
                kind.label()
            ),
            PairSource::PairFile {
                path,
                kind,
                stringency,
            } => format!(
                "pair file {} by {} (stringency {stringency})",
                path.display(),
                kind.label()
            ),
            PairSource::GoTerm(term) => format!("GO term {term}"),
            PairSource::Random { count } => format!("{count} random pairs"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PairCatalog {
    pub pairs: Vec<GenePair>,
    pub link_counts: Vec<Option<u32>>,
    pub query: Vec<GeneId>,
    pub target: Vec<GeneId>,
    pub genes: Vec<Gene>,
    pub missing: Vec<String>,
    /// Pairs were listed one by one; only their cells are computed.
    pub listed: bool,
    seen_pairs: HashSet<(GeneId, GeneId)>,
    seen_genes: HashSet<GeneId>,
}

impl PairCatalog {
    pub fn names(&self) -> GeneNames {
        GeneNames::from_genes(&self.genes)
    }

    pub fn has_link_counts(&self) -> bool {
        self.link_counts.iter().any(Option::is_some)
    }

    fn note_gene(&mut self, gene: &Gene) {
        if self.seen_genes.insert(gene.id) {
            self.genes.push(gene.clone());
        }
    }

    fn note_missing(&mut self, name: &str, kind: GeneNameKind, taxon: &str) {
        tracing::warn!(
            name,
            kind = kind.label(),
            taxon,
            "gene not found; skipping"
        );
        if !self.missing.iter().any(|m| m == name) {
            self.missing.push(name.to_string());
        }
    }
}

pub fn build_catalog<R: Rng + ?Sized>(
    lookup: &dyn GeneLookup,
    taxon: &str,
    source: &PairSource,
    rng: &mut R,
) -> Result<PairCatalog, InputError> {
    let mut catalog = PairCatalog::default();
    match source {
        PairSource::Symbols(symbols) => {
            let genes = resolve_all(
                lookup,
                symbols,
                GeneNameKind::OfficialSymbol,
                taxon,
                &mut catalog,
            );
            pair_all_against_all(&mut catalog, &genes);
        }
        PairSource::GeneList { path, kind } => {
            let names = read_name_list(path)?;
            let genes = resolve_all(lookup, &names, *kind, taxon, &mut catalog);
            pair_all_against_all(&mut catalog, &genes);
        }
        PairSource::QueryTarget {
            query,
            target,
            kind,
        } => {
            let query_names = read_name_list(query)?;
            let target_names = read_name_list(target)?;
            let query_genes = resolve_all(lookup, &query_names, *kind, taxon, &mut catalog);
            let target_genes = resolve_all(lookup, &target_names, *kind, taxon, &mut catalog);
            catalog.query = query_genes.iter().map(|g| g.id).collect();
            catalog.target = target_genes.iter().map(|g| g.id).collect();
            for q in &query_genes {
                for t in &target_genes {
                    push_pair(&mut catalog, GenePair::new(q.id, t.id), None);
                }
            }
        }
        PairSource::PairFile {
            path,
            kind,
            stringency,
        } => {
            catalog.listed = true;
            let lines = read_pair_lines(path)?;
            let mut below_stringency = 0usize;
            for line in lines {
                if let Some(count) = line.link_count {
                    if count < *stringency {
                        below_stringency += 1;
                        continue;
                    }
                }
                let first = resolve_name(lookup, &line.first, *kind, taxon);
                let second = resolve_name(lookup, &line.second, *kind, taxon);
                match (first, second) {
                    (Some(a), Some(b)) => {
                        catalog.note_gene(&a);
                        catalog.note_gene(&b);
                        push_axis_pair(&mut catalog, GenePair::new(a.id, b.id), line.link_count);
                    }
                    (a, b) => {
                        tracing::debug!(line = line.line_no, "pair line not resolved");
                        if a.is_none() {
                            catalog.note_missing(&line.first, *kind, taxon);
                        }
                        if b.is_none() {
                            catalog.note_missing(&line.second, *kind, taxon);
                        }
                    }
                }
            }
            if below_stringency > 0 {
                tracing::info!(
                    dropped = below_stringency,
                    stringency,
                    "dropped pairs below link-count stringency"
                );
            }
        }
        PairSource::GoTerm(term) => {
            let genes = lookup.genes_for_go_term(term, taxon);
            if genes.is_empty() {
                tracing::warn!(term = %term, taxon, "no genes annotated with GO term");
            }
            for gene in &genes {
                catalog.note_gene(gene);
            }
            pair_all_against_all(&mut catalog, &genes);
        }
        PairSource::Random { count } => {
            catalog.listed = true;
            let genes = lookup.genes_in_taxon(taxon);
            let max_attempts = count.saturating_mul(50).max(1000);
            draw_random_pairs(&mut catalog, &genes, *count, max_attempts, rng);
        }
    }

    tracing::info!(
        pairs = catalog.pairs.len(),
        query = catalog.query.len(),
        target = catalog.target.len(),
        missing = catalog.missing.len(),
        "gene pair catalog built"
    );
    Ok(catalog)
}

pub fn resolve_name(
    lookup: &dyn GeneLookup,
    name: &str,
    kind: GeneNameKind,
    taxon: &str,
) -> Option<Gene> {
    let candidates = match kind {
        GeneNameKind::OfficialSymbol => lookup.find_by_symbol(name, taxon),
        GeneNameKind::OfficialName => lookup.find_by_official_name(name, taxon),
        GeneNameKind::GeneId => {
            let id = name.trim().parse::<u64>().ok().map(GeneId)?;
            lookup
                .find_by_id(id)
                .filter(|g| g.taxon.eq_ignore_ascii_case(taxon))
                .into_iter()
                .collect()
        }
    };
    candidates.into_iter().next()
}

fn resolve_all(
    lookup: &dyn GeneLookup,
    names: &[String],
    kind: GeneNameKind,
    taxon: &str,
    catalog: &mut PairCatalog,
) -> Vec<Gene> {
    let mut out: Vec<Gene> = Vec::with_capacity(names.len());
    for name in names {
        match resolve_name(lookup, name, kind, taxon) {
            Some(gene) => {
                catalog.note_gene(&gene);
                if !out.iter().any(|g| g.id == gene.id) {
                    out.push(gene);
                }
            }
            None => catalog.note_missing(name, kind, taxon),
        }
    }
    out
}

fn pair_all_against_all(catalog: &mut PairCatalog, genes: &[Gene]) {
    catalog.query = genes.iter().map(|g| g.id).collect();
    catalog.target = catalog.query.clone();
    for i in 0..genes.len() {
        for j in (i + 1)..genes.len() {
            push_pair(catalog, GenePair::new(genes[i].id, genes[j].id), None);
        }
    }
}

fn draw_random_pairs<R: Rng + ?Sized>(
    catalog: &mut PairCatalog,
    genes: &[Gene],
    count: usize,
    max_attempts: usize,
    rng: &mut R,
) {
    if genes.len() < 2 {
        tracing::warn!(genes = genes.len(), "not enough genes to draw random pairs");
        return;
    }
    let n = genes.len();
    let possible = n * (n - 1) / 2;
    let wanted = count.min(possible);
    if wanted < count {
        tracing::warn!(requested = count, possible, "random pair count capped");
    }
    let mut attempts = 0usize;
    while catalog.pairs.len() < wanted && attempts < max_attempts {
        attempts += 1;
        let a = rng.gen_range(0..n);
        let b = rng.gen_range(0..n);
        if a == b {
            continue;
        }
        let pair = GenePair::new(genes[a].id, genes[b].id);
        if push_axis_pair(catalog, pair, None) {
            catalog.note_gene(&genes[a]);
            catalog.note_gene(&genes[b]);
        }
    }
    if catalog.pairs.len() < wanted {
        tracing::warn!(
            drawn = catalog.pairs.len(),
            wanted,
            attempts,
            "random pair draw stopped early"
        );
    }
}

/// Adds a pair whose genes are already on the query/target axes.
fn push_pair(catalog: &mut PairCatalog, pair: GenePair, link_count: Option<u32>) -> bool {
    if pair.is_self_pair() {
        return false;
    }
    if !catalog.seen_pairs.insert(pair.unordered_key()) {
        return false;
    }
    catalog.pairs.push(pair);
    catalog.link_counts.push(link_count);
    true
}

/// Adds a pair and extends the query/target axes with its genes.
fn push_axis_pair(catalog: &mut PairCatalog, pair: GenePair, link_count: Option<u32>) -> bool {
    if !push_pair(catalog, pair, link_count) {
        return false;
    }
    if !catalog.query.contains(&pair.first) {
        catalog.query.push(pair.first);
    }
    if !catalog.target.contains(&pair.second) {
        catalog.target.push(pair.second);
    }
    true
}

/// Writes pairs back as two tab-separated symbols per line.
pub fn write_pair_file<W: Write>(
    w: &mut W,
    pairs: &[GenePair],
    names: &GeneNames,
) -> std::io::Result<()> {
    for pair in pairs {
        writeln!(w, "{}\t{}", names.name(pair.first), names.name(pair.second))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage1_pairs.rs"]
mod tests;
