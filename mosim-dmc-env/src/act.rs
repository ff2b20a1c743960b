//! Actions of control suite tasks.
mod continuous_filter;
pub use continuous_filter::{ContinuousActFilter, ContinuousActFilterConfig};
use mosim_core::Act;
use ndarray::{Array1, ArrayD};

/// Continuous action given as an [`ArrayD`].
#[derive(Clone, Debug, PartialEq)]
pub struct DmcAct(pub ArrayD<f32>);

impl Act for DmcAct {}

impl From<Vec<f32>> for DmcAct {
    fn from(v: Vec<f32>) -> Self {
        Self(Array1::from(v).into_dyn())
    }
}

impl From<DmcAct> for ArrayD<f32> {
    fn from(act: DmcAct) -> Self {
        act.0
    }
}

impl From<DmcAct> for Vec<f32> {
    fn from(act: DmcAct) -> Self {
        act.0.iter().cloned().collect()
    }
}
