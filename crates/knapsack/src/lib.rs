//! Knapsack instance model and benchmark corpus generation.

pub mod corpus;
pub mod instance;
pub mod regime;
pub mod rng;
pub mod sweep;

pub use corpus::{generate, regime_for_index, Corpus, CorpusLayout};
pub use instance::{Instance, Item};
pub use regime::{DifficultyRegime, RegimeBounds};
pub use rng::InstanceRng;
pub use sweep::{generate_sweep, sweep_capacity, SweepAxis, SweepPlan, MAX_SWEEP_ITEMS};
