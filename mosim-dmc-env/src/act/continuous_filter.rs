use crate::DmcActFilter;
use mosim_core::{
    record::{Record, RecordValue},
    Act,
};
use ndarray::ArrayD;
use serde::{Deserialize, Serialize};
use std::{default::Default, fmt::Debug, marker::PhantomData};

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
/// Configuration of [`ContinuousActFilter`].
pub struct ContinuousActFilterConfig {
    /// If `true`, the action is put into the [`Record`] with key `act`.
    pub record: bool,
}

/// Raw filter for continuous actions.
///
/// Type `A` must implement `Into<ArrayD<f32>>`.
#[derive(Clone, Debug)]
pub struct ContinuousActFilter<A> {
    record: bool,

    phantom: PhantomData<A>,
}

impl<A> DmcActFilter<A> for ContinuousActFilter<A>
where
    A: Act + Into<ArrayD<f32>>,
{
    type Config = ContinuousActFilterConfig;

    fn build(config: &Self::Config) -> anyhow::Result<Self>
    where
        Self: Sized,
    {
        Ok(Self {
            record: config.record,
            phantom: PhantomData,
        })
    }

    fn filt(&mut self, act: A) -> (ArrayD<f32>, Record) {
        let act: ArrayD<f32> = act.into();
        let record = if self.record {
            Record::from_slice(&[("act", RecordValue::Array1(act.iter().cloned().collect()))])
        } else {
            Record::empty()
        };
        (act, record)
    }
}
