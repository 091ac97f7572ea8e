//! Class-level candidate lookup.
//!
//! Resolution order for one parameter:
//! 1. a `SuppliedBy` annotation delegates to the named registered supplier;
//! 2. a `TestedOn` annotation yields exactly its integers;
//! 3. otherwise every type-compatible data point (restricted to a group when
//!    the parameter carries `FromDataPoints`).
//!
//! If that yields nothing, `Bool` and `Enum` parameters fall back to every
//! value of their type.

use std::collections::BTreeMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use postulate_model::failure::panic_message;
use postulate_model::signature::{ParamType, ParameterSignature};
use postulate_model::source::{GenerationError, PotentialAssignment};
use postulate_model::supplier::{ParameterSupplier, SupplierError};
use postulate_model::value::Value;

use crate::data_point::{DataPoint, DataPointSource};

/// Data points and named suppliers shared by every theory of one class.
#[derive(Default, Clone)]
pub struct SupplierContext {
    data_points: Vec<DataPoint>,
    suppliers: BTreeMap<String, Arc<dyn ParameterSupplier>>,
}

impl SupplierContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_data_point(&mut self, data_point: DataPoint) {
        self.data_points.push(data_point);
    }

    pub fn register_supplier(&mut self, name: impl Into<String>, supplier: impl ParameterSupplier + 'static) {
        self.suppliers.insert(name.into(), Arc::new(supplier));
    }

    pub fn data_points(&self) -> &[DataPoint] {
        &self.data_points
    }

    pub fn has_supplier(&self, name: &str) -> bool {
        self.suppliers.contains_key(name)
    }

    pub fn declares_group(&self, group: &str) -> bool {
        self.data_points.iter().any(|dp| dp.belongs_to(group))
    }

    /// Ordered candidate sources for `signature`, given the values bound so far.
    pub fn potentials_for(
        &self,
        signature: &ParameterSignature,
        bound: &[Value],
    ) -> Result<Vec<PotentialAssignment>, GenerationError> {
        let mut potentials = if let Some(name) = signature.supplier_name() {
            self.from_supplier(name, signature, bound)?
        } else if let Some(ints) = signature.tested_on() {
            ints.iter()
                .enumerate()
                .map(|(i, n)| PotentialAssignment::for_value(format!("tested_on[{i}]"), Value::Int(*n)))
                .collect()
        } else {
            self.from_data_points(signature)?
        };

        if potentials.is_empty() {
            potentials = from_type_alone(&signature.param_type);
        }
        Ok(potentials)
    }

    fn from_supplier(
        &self,
        name: &str,
        signature: &ParameterSignature,
        bound: &[Value],
    ) -> Result<Vec<PotentialAssignment>, GenerationError> {
        let supplier = self
            .suppliers
            .get(name)
            .ok_or_else(|| SupplierError::UnknownSupplier(name.to_string()))?;
        guarded(name, || supplier.value_sources(signature, bound).map_err(GenerationError::from))
    }

    fn from_data_points(&self, signature: &ParameterSignature) -> Result<Vec<PotentialAssignment>, GenerationError> {
        let group = signature.data_point_group();
        let mut potentials = Vec::new();

        for dp in &self.data_points {
            if let Some(group) = group {
                if !dp.belongs_to(group) {
                    continue;
                }
            }
            let declared_ok = signature.can_accept_type(&dp.value_type);
            // An `Any`-typed data point is checked value by value.
            let check_values = !declared_ok && dp.value_type == ParamType::Any;
            if !declared_ok && !check_values {
                continue;
            }

            match &dp.source {
                DataPointSource::Value(value) => {
                    if declared_ok || signature.can_accept_value(value) {
                        potentials.push(PotentialAssignment::for_value(dp.name.clone(), value.clone()));
                    }
                }
                DataPointSource::Values(values) => {
                    push_elements(&mut potentials, &dp.name, values, signature, check_values);
                }
                DataPointSource::Computed(compute) => {
                    if declared_ok {
                        let compute = compute.clone();
                        potentials.push(PotentialAssignment::computed(dp.name.clone(), move || compute()));
                    }
                }
                DataPointSource::ComputedMany {
                    compute,
                    ignore_failures,
                } => {
                    let outcome = guarded(&dp.name, || {
                        compute().map_err(|e| GenerationError::CouldNotGenerate {
                            source_name: dp.name.clone(),
                            reason: format!("{e:#}"),
                        })
                    });
                    match outcome {
                        Ok(values) => push_elements(&mut potentials, &dp.name, &values, signature, check_values),
                        Err(e) if *ignore_failures => {
                            tracing::debug!(data_point = %dp.name, error = %e, "ignoring failed data point collection");
                        }
                        Err(e) => return Err(e),
                    }
                }
            }
        }

        Ok(potentials)
    }
}

impl fmt::Debug for SupplierContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupplierContext")
            .field("data_points", &self.data_points)
            .field("suppliers", &self.suppliers.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn push_elements(
    potentials: &mut Vec<PotentialAssignment>,
    name: &str,
    values: &[Value],
    signature: &ParameterSignature,
    check_values: bool,
) {
    for (i, value) in values.iter().enumerate() {
        if check_values && !signature.can_accept_value(value) {
            continue;
        }
        potentials.push(PotentialAssignment::for_value(format!("{name}[{i}]"), value.clone()));
    }
}

/// Every value of a closed type; empty for open types.
fn from_type_alone(param_type: &ParamType) -> Vec<PotentialAssignment> {
    match param_type {
        ParamType::Bool => vec![
            PotentialAssignment::for_value("true", Value::Bool(true)),
            PotentialAssignment::for_value("false", Value::Bool(false)),
        ],
        ParamType::Enum { name, variants } => variants
            .iter()
            .map(|variant| PotentialAssignment::for_value(variant.clone(), Value::variant(name.clone(), variant.clone())))
            .collect(),
        _ => Vec::new(),
    }
}

/// Run candidate-listing code, turning a panic into a generation failure.
fn guarded<T>(
    name: &str,
    f: impl FnOnce() -> Result<T, GenerationError>,
) -> Result<T, GenerationError> {
    catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        Err(GenerationError::CouldNotGenerate {
            source_name: name.to_string(),
            reason: panic_message(payload.as_ref()),
        })
    })
}
