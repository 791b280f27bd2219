#![allow(unsafe_op_in_unsafe_fn)]

use std::cell::RefCell;

use ::combatgen_core::{
    Battle, Observation, Poll, RecordError, RoundSegmenter, SegmentError, Simulation,
    read_simulation, record::PlayerCommon,
};
use ::combatgen_learn::{LearnConfig, LearnError, load_dataset as load_learn_dataset};
use pyo3::exceptions::{PyOSError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyBytes;

fn record_err_to_py(err: RecordError) -> PyErr {
    match err {
        RecordError::Io(_) => PyOSError::new_err(err.to_string()),
        _ => PyValueError::new_err(err.to_string()),
    }
}

fn segment_err_to_py(err: SegmentError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn learn_err_to_py(err: LearnError) -> PyErr {
    match err {
        LearnError::Io(_) => PyOSError::new_err(err.to_string()),
        _ => PyValueError::new_err(err.to_string()),
    }
}

#[pyclass(name = "Battle", module = "combatgen")]
#[derive(Clone)]
/// Battle()
/// --
///
/// One round of a replay: its opening observation and how it ended.
pub struct PyBattle {
    inner: Battle,
}

#[pymethods]
impl PyBattle {
    #[getter]
    fn replay_file(&self) -> &str {
        &self.inner.replay_file
    }

    #[getter]
    fn round_num(&self) -> u32 {
        self.inner.round_num
    }

    /// One of `undecided`, `team_minerals_won`, `team_vespene_won`.
    #[getter]
    fn outcome(&self) -> &'static str {
        self.inner.outcome.as_str()
    }

    #[getter]
    fn game_loop(&self) -> u32 {
        self.inner.initial_observation.game_loop
    }

    /// Number of raw units alive when the round opened.
    #[getter]
    fn unit_count(&self) -> usize {
        self.inner.initial_observation.unit_count()
    }

    /// layer($self, name, /)
    /// --
    ///
    /// Return a feature layer render of the opening observation.
    ///
    /// Returns:
    ///     tuple[int, int, bytes] | None: `(width, height, data)`, or None if
    ///     the observation has no render called `name`.
    #[pyo3(text_signature = "($self, name, /)")]
    fn layer<'py>(
        &self,
        py: Python<'py>,
        name: &str,
    ) -> Option<(u32, u32, Bound<'py, PyBytes>)> {
        self.inner
            .initial_observation
            .render(name)
            .map(|image| (image.width, image.height, PyBytes::new_bound(py, &image.data)))
    }

    fn __repr__(&self) -> String {
        format!(
            "Battle(replay_file={:?}, round_num={}, outcome={})",
            self.inner.replay_file, self.inner.round_num, self.inner.outcome
        )
    }
}

#[pyclass(name = "Simulation", module = "combatgen")]
#[derive(Clone)]
/// Simulation()
/// --
///
/// Battle records parsed from one replay.
pub struct PySimulation {
    inner: Simulation,
}

#[pymethods]
impl PySimulation {
    #[getter]
    fn battles(&self) -> Vec<PyBattle> {
        self.inner
            .battles
            .iter()
            .cloned()
            .map(|inner| PyBattle { inner })
            .collect()
    }

    /// decided($self, /)
    /// --
    ///
    /// Return only the battles whose round produced a winner.
    #[pyo3(text_signature = "($self, /)")]
    fn decided(&self) -> Vec<PyBattle> {
        self.inner
            .decided()
            .cloned()
            .map(|inner| PyBattle { inner })
            .collect()
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }
}

#[pyclass(name = "RoundSegmenter", module = "combatgen")]
/// RoundSegmenter(replay_file, /)
/// --
///
/// Splits a stream of polls into battle rounds.
///
/// A round opens when the unit count rises from zero and closes when the
/// minerals or vespene counter of the observed player increases.
pub struct PyRoundSegmenter {
    inner: RefCell<Option<RoundSegmenter>>,
}

impl PyRoundSegmenter {
    fn with_inner<T>(
        &self,
        f: impl FnOnce(&mut RoundSegmenter) -> PyResult<T>,
    ) -> PyResult<T> {
        let mut guard = self.inner.borrow_mut();
        let segmenter = guard
            .as_mut()
            .ok_or_else(|| PyRuntimeError::new_err("segmenter already finished"))?;
        f(segmenter)
    }
}

#[pymethods]
impl PyRoundSegmenter {
    #[new]
    #[pyo3(text_signature = "(replay_file, /)")]
    fn new(replay_file: String) -> Self {
        Self {
            inner: RefCell::new(Some(RoundSegmenter::new(replay_file))),
        }
    }

    /// push($self, unit_count, minerals, vespene, game_loop=0, /)
    /// --
    ///
    /// Feed one poll.
    ///
    /// Returns:
    ///     tuple[int | None, tuple[int, str] | None]: the round opened by
    ///     this poll, and the `(round, outcome)` resolved by it.
    ///
    /// Raises:
    ///     ValueError: If a round opens while another is open, or a counter
    ///         rises with no round open. The segmenter is left unchanged.
    ///     RuntimeError: If `finish` was already called.
    #[pyo3(
        signature = (unit_count, minerals, vespene, game_loop = 0),
        text_signature = "($self, unit_count, minerals, vespene, game_loop=0, /)"
    )]
    fn push(
        &self,
        unit_count: usize,
        minerals: u32,
        vespene: u32,
        game_loop: u32,
    ) -> PyResult<(Option<u32>, Option<(u32, &'static str)>)> {
        self.with_inner(|segmenter| {
            let snapshot = || Observation {
                game_loop,
                player_common: PlayerCommon { minerals, vespene },
                ..Observation::default()
            };
            let events = segmenter
                .push_poll(Poll::new(unit_count, minerals, vespene), snapshot)
                .map_err(segment_err_to_py)?;
            Ok((
                events.opened,
                events
                    .resolved
                    .map(|(round, outcome)| (round, outcome.as_str())),
            ))
        })
    }

    /// Round currently waiting for an outcome, if any.
    #[getter]
    fn open_round(&self) -> PyResult<Option<u32>> {
        self.with_inner(|segmenter| Ok(segmenter.open_round()))
    }

    #[getter]
    fn polls(&self) -> PyResult<u64> {
        self.with_inner(|segmenter| Ok(segmenter.polls()))
    }

    /// finish($self, /)
    /// --
    ///
    /// Close the stream and return every round seen, including undecided ones.
    ///
    /// Raises:
    ///     RuntimeError: If called twice.
    #[pyo3(text_signature = "($self, /)")]
    fn finish(&self) -> PyResult<PySimulation> {
        let segmenter = self
            .inner
            .borrow_mut()
            .take()
            .ok_or_else(|| PyRuntimeError::new_err("segmenter already finished"))?;
        Ok(PySimulation {
            inner: segmenter.finish(),
        })
    }
}

#[pyfunction]
#[pyo3(text_signature = "(path, /)")]
/// load_simulation(path, /)
/// --
///
/// Read a parsed battle record file.
///
/// Raises:
///     OSError: If the file cannot be read.
///     ValueError: If the record is malformed.
fn load_simulation(path: &str) -> PyResult<PySimulation> {
    let inner = read_simulation(path).map_err(record_err_to_py)?;
    Ok(PySimulation { inner })
}

#[pyfunction]
#[pyo3(
    signature = (dir, config_yaml = None),
    text_signature = "(dir, config_yaml=None, /)"
)]
/// load_dataset(dir, config_yaml=None, /)
/// --
///
/// Build learner inputs from every parsed record under `dir`.
///
/// `config_yaml` overrides the default learner settings.
///
/// Returns:
///     tuple[list[list[float]], list[int]]: scaled pixels and class labels
///     (0 for team minerals, 1 for team vespene). Undecided rounds are skipped.
///
/// Raises:
///     ValueError: If the config or a record is invalid.
fn load_dataset(dir: &str, config_yaml: Option<&str>) -> PyResult<(Vec<Vec<f32>>, Vec<usize>)> {
    let config = match config_yaml {
        Some(yaml) => LearnConfig::from_yaml_str(yaml),
        None => LearnConfig::from_default_yaml(),
    }
    .map_err(learn_err_to_py)?;
    let dataset = load_learn_dataset(dir, &config).map_err(learn_err_to_py)?;
    Ok(dataset
        .examples()
        .iter()
        .map(|example| (example.pixels.clone(), example.label))
        .unzip())
}

#[pymodule]
fn combatgen(_py: Python<'_>, module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_class::<PyBattle>()?;
    module.add_class::<PySimulation>()?;
    module.add_class::<PyRoundSegmenter>()?;
    module.add_function(wrap_pyfunction!(load_simulation, module)?)?;
    module.add_function(wrap_pyfunction!(load_dataset, module)?)?;
    Ok(())
}
