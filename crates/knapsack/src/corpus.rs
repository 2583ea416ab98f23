//! Randomized stress corpus: four contiguous difficulty regimes on disk.

use std::fs;
use std::path::{Path, PathBuf};

use shared::{AppError, AppResult};
use tracing::{debug, info};

use crate::regime::DifficultyRegime;
use crate::rng::InstanceRng;

/// Directory and file-name prefix shared by every instance of a corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusLayout {
    pub dir: PathBuf,
    pub prefix: String,
}

impl CorpusLayout {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    /// Path of the 1-based instance `index`.
    pub fn instance_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}_{index}.in", self.prefix))
    }

    pub(crate) fn prepare(&self) -> AppResult<()> {
        fs::create_dir_all(&self.dir).map_err(|err| {
            AppError::io(format!("failed to create corpus directory {:?}", self.dir), err)
        })
    }
}

/// Handle to instance files numbered `1..=len` with no gaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    layout: CorpusLayout,
    len: usize,
}

impl Corpus {
    pub fn new(layout: CorpusLayout, len: usize) -> Self {
        Self { layout, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn dir(&self) -> &Path {
        &self.layout.dir
    }

    pub fn instance_path(&self, index: usize) -> PathBuf {
        self.layout.instance_path(index)
    }

    /// `(index, path)` pairs in corpus order.
    pub fn paths(&self) -> impl Iterator<Item = (usize, PathBuf)> + '_ {
        (1..=self.len).map(|index| (index, self.layout.instance_path(index)))
    }
}

/// Regime of the 1-based instance `index` in a corpus of `batch_size` per regime.
pub fn regime_for_index(index: usize, batch_size: usize) -> Option<DifficultyRegime> {
    if index == 0 || batch_size == 0 {
        return None;
    }
    DifficultyRegime::ALL.get((index - 1) / batch_size).copied()
}

/// Write `4 × batch_size` instances, one contiguous batch per regime, overwriting
/// whatever already sits at the same paths.
pub fn generate(layout: &CorpusLayout, batch_size: usize, rng: &mut InstanceRng) -> AppResult<Corpus> {
    if batch_size == 0 {
        return Err(AppError::InvalidParameter(
            "batch size must be at least 1".into(),
        ));
    }
    layout.prepare()?;

    let mut index = 0;
    for regime in DifficultyRegime::ALL {
        let bounds = regime.bounds();
        for _ in 0..batch_size {
            index += 1;
            let instance = bounds.sample(rng)?;
            let path = layout.instance_path(index);
            instance.write_to(&path)?;
            debug!(
                index,
                regime = %regime,
                items = instance.item_count(),
                capacity = instance.capacity(),
                "wrote instance"
            );
        }
    }

    info!(
        count = index,
        dir = ?layout.dir,
        prefix = %layout.prefix,
        seed = rng.seed(),
        "generated stress corpus"
    );
    Ok(Corpus::new(layout.clone(), index))
}
