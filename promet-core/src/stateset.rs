use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use promet_model::{
    validation, Labels, Metadata, MetricError, MetricSnapshot, MetricType, StateSetData,
    StateSetSnapshot,
};

use crate::family;
use crate::registry::Collect;

/// Configuration for a [`StateSet`].  Fill in the fields and call
/// [`build`](StateSetBuilder::build).
#[derive(Default)]
pub struct StateSetBuilder {
    /// Metric name (required).
    pub name: String,
    /// Help text.
    pub help: Option<String>,
    /// Labels attached to every data record.
    pub const_labels: Labels,
    /// Names of the labels whose values select a cell.
    pub label_names: Vec<String>,
    /// The state names; at least one is required, names must be unique.
    pub states: Vec<String>,
}

impl StateSetBuilder {
    /// Validates the configuration and creates the state set.
    pub fn build(self) -> Result<StateSet, MetricError> {
        let metadata =
            Metadata::new(self.name, MetricType::StateSet, self.help, None, self.const_labels)?;
        family::validate_label_names(&self.label_names, metadata.const_labels(), Some("state"))?;

        if self.states.is_empty() {
            return Err(MetricError::MissingRequired("states"));
        }
        let mut states = self.states;
        for state in &states {
            validate_state_name(state)?;
        }
        states.sort();
        for pair in states.windows(2) {
            if pair[0] == pair[1] {
                return Err(MetricError::InvalidLabel(format!("duplicate state `{}`", pair[0])));
            }
        }
        let states: Arc<[String]> = states.into();

        let unlabeled = self
            .label_names
            .is_empty()
            .then(|| Arc::new(StateSetCell::new(&states)));

        Ok(StateSet { metadata, label_names: self.label_names, states, cells: DashMap::new(), unlabeled })
    }
}

fn validate_state_name(state: &str) -> Result<(), MetricError> {
    if state.is_empty() {
        return Err(MetricError::InvalidLabel("empty state name".to_string()));
    }
    validation::validate_label_value(state)
}

/// A set of named boolean states.  All states start false; more than one
/// state may be true at a time.
pub struct StateSet {
    metadata: Metadata,
    label_names: Vec<String>,
    states: Arc<[String]>,
    cells: DashMap<Vec<String>, Arc<StateSetCell>>,
    unlabeled: Option<Arc<StateSetCell>>,
}

impl StateSet {
    /// Handle for the cell with the given label values, created on first
    /// use.
    pub fn labels(&self, values: &[&str]) -> Result<StateSetHandle, MetricError> {
        family::validate_label_values(&self.label_names, values)?;
        let key: Vec<String> = values.iter().map(|value| value.to_string()).collect();
        let cell =
            self.cells.entry(key).or_insert_with(|| Arc::new(StateSetCell::new(&self.states)));
        Ok(StateSetHandle { cell: Arc::clone(&cell) })
    }

    /// Sets a state of the unlabeled cell.
    pub fn set(&self, state: &str, enabled: bool) -> Result<(), MetricError> {
        self.unlabeled()?.set(state, enabled)
    }

    /// Marks a state of the unlabeled cell true.
    pub fn set_true(&self, state: &str) -> Result<(), MetricError> {
        self.set(state, true)
    }

    /// Marks a state of the unlabeled cell false.
    pub fn set_false(&self, state: &str) -> Result<(), MetricError> {
        self.set(state, false)
    }

    /// Adds a new state (initially false) to the unlabeled cell.
    pub fn add_state(&self, state: impl Into<String>) -> Result<(), MetricError> {
        self.unlabeled()?.add_state(state.into())
    }

    /// Takes an immutable snapshot of every cell.
    pub fn snapshot(&self) -> Result<StateSetSnapshot, MetricError> {
        let mut data = Vec::with_capacity(self.cells.len() + 1);
        if let Some(cell) = &self.unlabeled {
            data.push(cell.snapshot(self.metadata.const_labels().clone())?);
        }
        for entry in self.cells.iter() {
            let labels =
                family::cell_labels(self.metadata.const_labels(), &self.label_names, entry.key())?;
            data.push(entry.value().snapshot(labels)?);
        }
        StateSetSnapshot::new(self.metadata.clone(), data)
    }

    fn unlabeled(&self) -> Result<&StateSetCell, MetricError> {
        self.unlabeled.as_deref().ok_or_else(|| {
            MetricError::InvalidLabel(format!(
                "metric `{}` declares label names; select a cell with labels()",
                self.metadata.name()
            ))
        })
    }
}

impl Collect for StateSet {
    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn collect(&self) -> Result<MetricSnapshot, MetricError> {
        Ok(self.snapshot()?.into())
    }
}

/// A cheap, cloneable handle to one state-set cell.
#[derive(Clone)]
pub struct StateSetHandle {
    cell: Arc<StateSetCell>,
}

impl StateSetHandle {
    /// Sets a state.
    pub fn set(&self, state: &str, enabled: bool) -> Result<(), MetricError> {
        self.cell.set(state, enabled)
    }

    /// Marks a state true.
    pub fn set_true(&self, state: &str) -> Result<(), MetricError> {
        self.cell.set(state, true)
    }

    /// Marks a state false.
    pub fn set_false(&self, state: &str) -> Result<(), MetricError> {
        self.cell.set(state, false)
    }

    /// Adds a new state, initially false.
    pub fn add_state(&self, state: impl Into<String>) -> Result<(), MetricError> {
        self.cell.add_state(state.into())
    }
}

/// Per-cell state list, kept sorted by state name.  Flips are atomic under
/// a read lock; only `add_state` takes the write lock.
struct StateSetCell {
    states: RwLock<Vec<(String, AtomicBool)>>,
}

impl StateSetCell {
    fn new(states: &[String]) -> Self {
        let states =
            states.iter().map(|state| (state.clone(), AtomicBool::new(false))).collect();
        StateSetCell { states: RwLock::new(states) }
    }

    fn set(&self, state: &str, enabled: bool) -> Result<(), MetricError> {
        let states = self.states.read();
        match states.binary_search_by(|(name, _)| name.as_str().cmp(state)) {
            Ok(index) => {
                states[index].1.store(enabled, Ordering::Release);
                Ok(())
            }
            Err(_) => Err(MetricError::InvalidLabel(format!("unknown state `{state}`"))),
        }
    }

    fn add_state(&self, state: String) -> Result<(), MetricError> {
        validate_state_name(&state)?;
        let mut states = self.states.write();
        match states.binary_search_by(|(name, _)| name.as_str().cmp(&state)) {
            Ok(_) => Err(MetricError::InvalidLabel(format!("duplicate state `{state}`"))),
            Err(index) => {
                states.insert(index, (state, AtomicBool::new(false)));
                Ok(())
            }
        }
    }

    fn snapshot(&self, labels: Labels) -> Result<StateSetData, MetricError> {
        let states = self.states.read();
        let observed = states
            .iter()
            .map(|(name, enabled)| (name.clone(), enabled.load(Ordering::Acquire)))
            .collect();
        StateSetData::new(observed, labels, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_set(states: &[&str]) -> StateSet {
        StateSetBuilder {
            name: "state".to_string(),
            states: states.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
        .build()
        .unwrap()
    }

    #[test]
    fn states_start_false_and_flip() {
        let set = state_set(&["state2", "state1"]);
        set.set_true("state1").unwrap();

        let snapshot = set.snapshot().unwrap();
        let states: Vec<_> = snapshot.data()[0].states().collect();
        assert_eq!(states, vec![("state1", true), ("state2", false)]);

        set.set_false("state1").unwrap();
        set.set("state2", true).unwrap();
        let snapshot = set.snapshot().unwrap();
        let states: Vec<_> = snapshot.data()[0].states().collect();
        assert_eq!(states, vec![("state1", false), ("state2", true)]);
    }

    #[test]
    fn at_least_one_state_required() {
        let result = StateSetBuilder { name: "state".to_string(), ..Default::default() }.build();
        assert_eq!(result.err(), Some(MetricError::MissingRequired("states")));
    }

    #[test]
    fn duplicate_states_rejected() {
        let result = StateSetBuilder {
            name: "state".to_string(),
            states: vec!["a".to_string(), "a".to_string()],
            ..Default::default()
        }
        .build();
        assert!(matches!(result, Err(MetricError::InvalidLabel(_))));
    }

    #[test]
    fn unknown_state_rejected() {
        let set = state_set(&["a"]);
        assert!(set.set_true("missing").is_err());
    }

    #[test]
    fn state_label_name_reserved() {
        let result = StateSetBuilder {
            name: "state".to_string(),
            label_names: vec!["state".to_string()],
            states: vec!["a".to_string()],
            ..Default::default()
        }
        .build();
        assert!(matches!(result, Err(MetricError::InvalidName(_))));
    }

    #[test]
    fn runtime_added_state_keeps_order() {
        let set = state_set(&["bb"]);
        set.add_state("a").unwrap();
        set.set_true("a").unwrap();
        assert!(set.add_state("a").is_err());

        let snapshot = set.snapshot().unwrap();
        let states: Vec<_> = snapshot.data()[0].states().collect();
        assert_eq!(states, vec![("a", true), ("bb", false)]);
    }

    #[test]
    fn labeled_cells_track_independently() {
        let set = StateSetBuilder {
            name: "state".to_string(),
            label_names: vec!["env".to_string()],
            states: vec!["state1".to_string(), "state2".to_string()],
            ..Default::default()
        }
        .build()
        .unwrap();
        set.labels(&["dev"]).unwrap().set_true("state1").unwrap();
        set.labels(&["prod"]).unwrap().set_true("state2").unwrap();

        let snapshot = set.snapshot().unwrap();
        assert_eq!(snapshot.data().len(), 2);
        let dev: Vec<_> = snapshot.data()[0].states().collect();
        assert_eq!(dev, vec![("state1", true), ("state2", false)]);
        let prod: Vec<_> = snapshot.data()[1].states().collect();
        assert_eq!(prod, vec![("state1", false), ("state2", true)]);
    }
}
