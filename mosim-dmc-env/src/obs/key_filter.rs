use super::DmcObs;
use crate::{DmcObsFilter, TimeStep};
use mosim_core::{
    record::{Record, RecordValue},
    Obs,
};
use ndarray::Axis;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
/// Configuration of [`KeyObsFilter`].
pub struct KeyObsFilterConfig {
    /// Keys of observation entries to keep.
    pub keys: Vec<String>,

    /// Keys of entries put into the [`Record`]. If `None`, nothing is recorded.
    pub record_keys: Option<Vec<String>>,
}

impl Default for KeyObsFilterConfig {
    fn default() -> Self {
        Self {
            keys: vec![
                "position".to_string(),
                "velocity".to_string(),
                "height".to_string(),
            ],
            record_keys: None,
        }
    }
}

impl KeyObsFilterConfig {
    /// Sets the keys to keep.
    pub fn keys(mut self, keys: Vec<String>) -> Self {
        self.keys = keys;
        self
    }

    /// Sets the keys to record.
    pub fn record_keys(mut self, record_keys: Option<Vec<String>>) -> Self {
        self.record_keys = record_keys;
        self
    }
}

/// An observation filter keeping a subset of observation entries.
///
/// Entries keep the order of the control suite; scalar entries are reshaped to `[1]`.
#[derive(Debug)]
pub struct KeyObsFilter<O>
where
    O: Obs + From<DmcObs>,
{
    config: KeyObsFilterConfig,

    phantom: PhantomData<O>,
}

impl<O> DmcObsFilter<O> for KeyObsFilter<O>
where
    O: Obs + From<DmcObs>,
{
    type Config = KeyObsFilterConfig;

    fn build(config: &Self::Config) -> anyhow::Result<Self>
    where
        Self: Sized,
    {
        Ok(Self {
            config: config.clone(),
            phantom: PhantomData,
        })
    }

    fn filt(&mut self, ts: &TimeStep) -> (O, Record) {
        let values = ts
            .observation
            .iter()
            .filter(|(key, _)| self.config.keys.contains(key))
            .map(|(key, value)| {
                let value = match value.ndim() {
                    0 => value.clone().insert_axis(Axis(0)),
                    _ => value.clone(),
                };
                (key.clone(), value)
            })
            .collect::<Vec<_>>();

        let mut record = Record::empty();
        if let Some(keys) = &self.config.record_keys {
            values
                .iter()
                .filter(|(key, _)| keys.contains(key))
                .for_each(|(key, value)| {
                    record.insert(key, RecordValue::Array1(value.iter().cloned().collect()))
                });
        }

        let obs = DmcObs {
            values,
            is_terminal: ts.is_terminal(),
            is_first: ts.first(),
        };
        (obs.into(), record)
    }
}
