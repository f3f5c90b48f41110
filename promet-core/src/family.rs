//! Shared plumbing for metrics keyed by label-value combinations.

use promet_model::{validation, Labels, MetricError};

/// Validates label names declared at build time: legality, uniqueness, no
/// overlap with const labels, and the metric kind's reserved name.
pub(crate) fn validate_label_names(
    label_names: &[String],
    const_labels: &Labels,
    reserved: Option<&str>,
) -> Result<(), MetricError> {
    if let Some(reserved) = reserved {
        if const_labels.contains(reserved) {
            return Err(MetricError::InvalidName(format!("label name `{reserved}` is reserved")));
        }
    }
    for (index, name) in label_names.iter().enumerate() {
        validation::validate_label_name(name)?;
        if Some(name.as_str()) == reserved {
            return Err(MetricError::InvalidName(format!("label name `{name}` is reserved")));
        }
        if const_labels.contains(name) {
            return Err(MetricError::InvalidLabel(format!(
                "label name `{name}` is already a const label"
            )));
        }
        if label_names[..index].contains(name) {
            return Err(MetricError::InvalidLabel(format!("duplicate label name `{name}`")));
        }
    }
    Ok(())
}

/// Checks a cell's label values against the declared names.  Names were
/// validated at build time, so only the values are checked here.
pub(crate) fn validate_label_values(
    label_names: &[String],
    values: &[&str],
) -> Result<(), MetricError> {
    if values.len() != label_names.len() {
        return Err(MetricError::InvalidLabel(format!(
            "expected {} label values, got {}",
            label_names.len(),
            values.len()
        )));
    }
    for value in values {
        validation::validate_label_value(value)?;
    }
    Ok(())
}

/// Assembles the full label set of one cell: the declared labels joined
/// with the metric's const labels.
pub(crate) fn cell_labels(
    const_labels: &Labels,
    label_names: &[String],
    values: &[String],
) -> Result<Labels, MetricError> {
    let declared = Labels::from_pairs(label_names.iter().cloned().zip(values.iter().cloned()))?;
    const_labels.merge(&declared)
}
