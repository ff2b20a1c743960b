//! Observations of control suite tasks.
mod key_filter;
use mosim_core::Obs;
use ndarray::ArrayD;
pub use key_filter::{KeyObsFilter, KeyObsFilterConfig};

/// Observation made of named arrays and episode flags.
#[derive(Clone, Debug, PartialEq)]
pub struct DmcObs {
    /// Observation entries, in the order given by the control suite.
    pub values: Vec<(String, ArrayD<f32>)>,

    /// `true` if the episode ended with a zero discount.
    pub is_terminal: bool,

    /// `true` at the first step of an episode.
    pub is_first: bool,
}

impl Obs for DmcObs {}

impl DmcObs {
    /// Returns the entry of the given key.
    pub fn get(&self, key: &str) -> Option<&ArrayD<f32>> {
        self.values.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Keys of the entries.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(k, _)| k.as_str())
    }

    /// Concatenation of all entries, flattened in order.
    pub fn flat(&self) -> Vec<f32> {
        self.values
            .iter()
            .flat_map(|(_, v)| v.iter().cloned())
            .collect()
    }
}

/// Flattens the observation, e.g., to push it into a replay buffer.
impl From<DmcObs> for Vec<f32> {
    fn from(obs: DmcObs) -> Self {
        obs.flat()
    }
}
