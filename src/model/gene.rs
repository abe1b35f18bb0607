use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GeneId(pub u64);

impl fmt::Display for GeneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExperimentId(pub u64);

impl fmt::Display for ExperimentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gene {
    pub id: GeneId,
    pub symbol: String,
    pub official_name: Option<String>,
    pub taxon: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Experiment {
    pub id: ExperimentId,
    pub short_name: String,
    pub taxon: String,
    pub n_samples: usize,
}

/// How a name in a gene list or pair file is resolved to a gene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum GeneNameKind {
    #[default]
    #[value(name = "symbol")]
    OfficialSymbol,
    #[value(name = "name")]
    OfficialName,
    #[value(name = "id")]
    GeneId,
}

impl GeneNameKind {
    pub fn label(self) -> &'static str {
        match self {
            GeneNameKind::OfficialSymbol => "official symbol",
            GeneNameKind::OfficialName => "official name",
            GeneNameKind::GeneId => "gene id",
        }
    }
}

/// Display names for genes, falling back to the numeric id.
#[derive(Debug, Clone, Default)]
pub struct GeneNames {
    names: std::collections::HashMap<GeneId, String>,
}

impl GeneNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: GeneId, name: impl Into<String>) {
        let name = name.into();
        if name.trim().is_empty() {
            return;
        }
        self.names.insert(id, name);
    }

    pub fn from_genes<'a>(genes: impl IntoIterator<Item = &'a Gene>) -> Self {
        let mut out = Self::new();
        for gene in genes {
            out.insert(gene.id, gene.symbol.clone());
        }
        out
    }

    pub fn name(&self, id: GeneId) -> String {
        self.names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    /// `first:second`, the row label of the per-pair reports.
    pub fn pair_label(&self, pair: &crate::model::pair::GenePair) -> String {
        format!("{}:{}", self.name(pair.first), self.name(pair.second))
    }
}
