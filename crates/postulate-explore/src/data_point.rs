use std::fmt;
use std::sync::Arc;

use postulate_model::signature::ParamType;
use postulate_model::value::Value;

type ComputeOne = dyn Fn() -> anyhow::Result<Value> + Send + Sync;
type ComputeMany = dyn Fn() -> anyhow::Result<Vec<Value>> + Send + Sync;

/// Where a data point's values come from.
#[derive(Clone)]
pub enum DataPointSource {
    /// One fixed value.
    Value(Value),
    /// A fixed collection; each element is a separate candidate.
    Values(Vec<Value>),
    /// One value computed each time a branch binds it.
    Computed(Arc<ComputeOne>),
    /// A collection computed while candidates are listed.
    ComputedMany {
        compute: Arc<ComputeMany>,
        /// Treat a failing computation as contributing no candidates.
        ignore_failures: bool,
    },
}

impl fmt::Debug for DataPointSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataPointSource::Value(v) => f.debug_tuple("Value").field(v).finish(),
            DataPointSource::Values(vs) => f.debug_tuple("Values").field(vs).finish(),
            DataPointSource::Computed(_) => write!(f, "Computed(..)"),
            DataPointSource::ComputedMany { ignore_failures, .. } => f
                .debug_struct("ComputedMany")
                .field("ignore_failures", ignore_failures)
                .finish_non_exhaustive(),
        }
    }
}

/// A candidate declared by the test author.
///
/// `value_type` is the declared type of the value (the element type for
/// collections) and decides which parameters it is offered to.
#[derive(Debug, Clone)]
pub struct DataPoint {
    pub name: String,
    pub value_type: ParamType,
    /// Groups this data point belongs to, matched by `FromDataPoints`.
    pub groups: Vec<String>,
    pub source: DataPointSource,
}

impl DataPoint {
    /// A fixed value whose type is inferred from the value itself.
    pub fn value(name: impl Into<String>, value: impl Into<Value>) -> Self {
        let value = value.into();
        Self::typed(name, value.param_type(), value)
    }

    /// A fixed value with an explicit declared type, e.g. a typed null.
    pub fn typed(name: impl Into<String>, value_type: ParamType, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value_type,
            groups: Vec::new(),
            source: DataPointSource::Value(value.into()),
        }
    }

    pub fn values<V: Into<Value>>(name: impl Into<String>, element_type: ParamType, values: Vec<V>) -> Self {
        Self {
            name: name.into(),
            value_type: element_type,
            groups: Vec::new(),
            source: DataPointSource::Values(values.into_iter().map(Into::into).collect()),
        }
    }

    pub fn computed<F>(name: impl Into<String>, value_type: ParamType, compute: F) -> Self
    where
        F: Fn() -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            value_type,
            groups: Vec::new(),
            source: DataPointSource::Computed(Arc::new(compute)),
        }
    }

    pub fn computed_many<F>(name: impl Into<String>, element_type: ParamType, compute: F) -> Self
    where
        F: Fn() -> anyhow::Result<Vec<Value>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            value_type: element_type,
            groups: Vec::new(),
            source: DataPointSource::ComputedMany {
                compute: Arc::new(compute),
                ignore_failures: false,
            },
        }
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }

    /// Only meaningful for computed collections.
    pub fn ignoring_failures(mut self) -> Self {
        if let DataPointSource::ComputedMany {
            ignore_failures, ..
        } = &mut self.source
        {
            *ignore_failures = true;
        }
        self
    }

    pub fn belongs_to(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }
}
