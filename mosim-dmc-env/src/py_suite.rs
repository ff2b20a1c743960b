//! Control suite tasks of `dm_control` on Python.
use crate::{
    util::{arrayd_to_pyobj, pyany_to_arrayd},
    BoxSpace, ControlSuite, DmcEnvError, StepType, TimeStep,
};
use anyhow::Result;
use log::{info, trace};
use ndarray::{Array3, ArrayD, Ix3};
use numpy::{PyArray1, PyArrayDyn};
use pyo3::{
    types::{PyAny, PyDict},
    PyObject, Python,
};

fn to_time_step(py: Python, ts: &PyAny) -> Result<TimeStep> {
    let step_type = if ts.call_method0("first")?.extract::<bool>()? {
        StepType::First
    } else if ts.call_method0("last")?.extract::<bool>()? {
        StepType::Last
    } else {
        StepType::Mid
    };
    let reward: Option<f64> = ts.getattr("reward")?.extract()?;
    let discount: Option<f64> = ts.getattr("discount")?.extract()?;
    let observation: &PyDict = ts.getattr("observation")?.extract()?;
    let observation = observation
        .iter()
        .map(|(key, value)| -> Result<(String, ArrayD<f32>)> {
            Ok((key.extract::<String>()?, pyany_to_arrayd(py, value)?))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(TimeStep {
        step_type,
        reward: reward.map(|r| r as f32),
        discount: discount.map(|d| d as f32),
        observation,
    })
}

fn copy_state(
    py: Python,
    data: &PyAny,
    attr: &str,
    name: &'static str,
    value: &[f64],
) -> Result<()> {
    let dst: &PyArrayDyn<f64> = data.getattr(attr)?.extract()?;
    let expected = dst.shape().iter().product::<usize>();
    if expected != value.len() {
        return Err(DmcEnvError::StateShapeMismatch {
            name,
            expected,
            actual: value.len(),
        }
        .into());
    }
    let np = py.import("numpy")?;
    np.getattr("copyto")?
        .call1((dst, PyArray1::from_slice(py, value)))?;
    Ok(())
}

/// A task loaded with `dm_control.suite.load()`.
#[derive(Debug)]
pub struct PyControlSuite {
    env: PyObject,
}

impl ControlSuite for PyControlSuite {
    /// Calls `suite.load(domain, task, task_kwargs={"random": seed})`.
    fn load(domain: &str, task: &str, seed: i64) -> Result<Self> {
        Python::with_gil(|py| -> Result<Self> {
            let sys = py.import("sys")?;
            let version: String = sys.getattr("version")?.extract()?;
            info!("Python version = {}", version);

            let suite = py.import("dm_control.suite")?;
            let task_kwargs = PyDict::new(py);
            task_kwargs.set_item("random", seed)?;
            let kwargs = PyDict::new(py);
            kwargs.set_item("task_kwargs", task_kwargs)?;
            let env = suite.getattr("load")?.call((domain, task), Some(kwargs))?;

            Ok(Self { env: env.into() })
        })
    }

    fn reset(&mut self) -> Result<TimeStep> {
        trace!("PyControlSuite::reset()");
        Python::with_gil(|py| -> Result<TimeStep> {
            let ts = self.env.as_ref(py).call_method0("reset")?;
            to_time_step(py, ts)
        })
    }

    fn step(&mut self, action: &ArrayD<f32>) -> Result<TimeStep> {
        trace!("PyControlSuite::step()");
        Python::with_gil(|py| -> Result<TimeStep> {
            let action = arrayd_to_pyobj(py, action);
            let ts = self.env.as_ref(py).call_method1("step", (action,))?;
            to_time_step(py, ts)
        })
    }

    fn observation_spec(&self) -> Result<Vec<(String, Vec<usize>)>> {
        Python::with_gil(|py| -> Result<Vec<(String, Vec<usize>)>> {
            let spec: &PyDict = self
                .env
                .as_ref(py)
                .call_method0("observation_spec")?
                .extract()?;
            spec.iter()
                .map(|(key, value)| -> Result<(String, Vec<usize>)> {
                    Ok((
                        key.extract::<String>()?,
                        value.getattr("shape")?.extract::<Vec<usize>>()?,
                    ))
                })
                .collect()
        })
    }

    fn action_spec(&self) -> Result<BoxSpace> {
        Python::with_gil(|py| -> Result<BoxSpace> {
            let spec = self.env.as_ref(py).call_method0("action_spec")?;
            let shape: Vec<usize> = spec.getattr("shape")?.extract()?;

            // Bounds may be given as scalars.
            let np = py.import("numpy")?;
            let broadcast_to = np.getattr("broadcast_to")?;
            let low = broadcast_to.call1((spec.getattr("minimum")?, spec.getattr("shape")?))?;
            let high = broadcast_to.call1((spec.getattr("maximum")?, spec.getattr("shape")?))?;

            Ok(BoxSpace {
                low: pyany_to_arrayd(py, low)?.iter().cloned().collect(),
                high: pyany_to_arrayd(py, high)?.iter().cloned().collect(),
                shape,
            })
        })
    }

    fn render(&self, height: usize, width: usize, camera_id: i64) -> Result<Array3<u8>> {
        Python::with_gil(|py| -> Result<Array3<u8>> {
            let physics = self.env.as_ref(py).getattr("physics")?;
            let kwargs = PyDict::new(py);
            kwargs.set_item("height", height)?;
            kwargs.set_item("width", width)?;
            kwargs.set_item("camera_id", camera_id)?;
            let img: &PyArrayDyn<u8> = physics.call_method("render", (), Some(kwargs))?.extract()?;
            Ok(img.to_owned_array().into_dimensionality::<Ix3>()?)
        })
    }

    fn set_state(&mut self, position: &[f64], velocity: &[f64]) -> Result<()> {
        Python::with_gil(|py| -> Result<()> {
            let physics = self.env.as_ref(py).getattr("physics")?;
            let data = physics.getattr("data")?;
            copy_state(py, data, "qpos", "position", position)?;
            copy_state(py, data, "qvel", "velocity", velocity)?;
            physics.call_method0("after_reset")?;
            Ok(())
        })
    }
}
