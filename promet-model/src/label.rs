use std::slice::Iter;

use crate::{validation, MetricError};

/// A single name/value pair attached to a metric cell or exemplar.
///
/// Labels differentiate the context a metric is observed in.  In a web
/// service, a request counter might carry the request path and the response
/// status so that one metric name covers every combination.
#[derive(PartialEq, Eq, Hash, Clone, Debug, PartialOrd, Ord)]
pub struct Label(String, String);

impl Label {
    /// Creates a [`Label`], validating the name and value.
    pub fn new<N, V>(name: N, value: V) -> Result<Self, MetricError>
    where
        N: Into<String>,
        V: Into<String>,
    {
        let name = name.into();
        let value = value.into();
        validation::validate_label_name(&name)?;
        validation::validate_label_value(&value)?;
        Ok(Label(name, value))
    }

    /// Name of this label.
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Value of this label.
    pub fn value(&self) -> &str {
        &self.1
    }

    /// Consumes this [`Label`], returning the name and value.
    pub fn into_parts(self) -> (String, String) {
        (self.0, self.1)
    }
}

/// An immutable set of labels held in canonical order.
///
/// The canonical form is sorted by label name ascending; equality and
/// hashing are defined over that form, so two sets built from the same
/// pairs in different orders compare equal.  Names are unique within a set.
#[derive(PartialEq, Eq, Hash, Clone, Debug, Default, PartialOrd, Ord)]
pub struct Labels(Vec<Label>);

impl Labels {
    /// The empty label set.
    pub fn empty() -> Self {
        Labels(Vec::new())
    }

    /// Builds a label set from name/value pairs.
    ///
    /// Pairs are sorted into canonical order; a duplicate name is an error.
    pub fn from_pairs<I, N, V>(pairs: I) -> Result<Self, MetricError>
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        let labels = pairs
            .into_iter()
            .map(|(name, value)| Label::new(name, value))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_labels(labels)
    }

    /// Convenience constructor from a slice of `(name, value)` pairs.
    pub fn of(pairs: &[(&str, &str)]) -> Result<Self, MetricError> {
        Self::from_pairs(pairs.iter().copied())
    }

    fn from_labels(mut labels: Vec<Label>) -> Result<Self, MetricError> {
        labels.sort();
        for pair in labels.windows(2) {
            if pair[0].name() == pair[1].name() {
                return Err(MetricError::InvalidLabel(format!(
                    "duplicate label name `{}`",
                    pair[0].name()
                )));
            }
        }
        Ok(Labels(labels))
    }

    /// Merges two label sets into a new one.
    ///
    /// The sets must be disjoint by name; any overlap is an error.
    pub fn merge(&self, other: &Labels) -> Result<Labels, MetricError> {
        if other.is_empty() {
            return Ok(self.clone());
        }
        let mut merged = self.0.clone();
        merged.extend(other.0.iter().cloned());
        Self::from_labels(merged)
    }

    /// Looks up a label value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .binary_search_by(|label| label.name().cmp(name))
            .ok()
            .map(|index| self.0[index].value())
    }

    /// Whether a label with the given name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates the labels in canonical order.
    pub fn iter(&self) -> Iter<'_, Label> {
        self.0.iter()
    }

    /// Number of labels in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Labels {
    type Item = &'a Label;
    type IntoIter = Iter<'a, Label>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
