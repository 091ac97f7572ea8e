use crate::signature::ParameterSignature;
use crate::source::PotentialAssignment;
use crate::value::Value;

#[derive(Debug, thiserror::Error)]
pub enum SupplierError {
    #[error("no parameter supplier registered under '{0}'")]
    UnknownSupplier(String),

    #[error("supplier '{supplier}' failed: {source}")]
    Failed {
        supplier: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Computes the candidate sources for one parameter.
///
/// `bound` holds the values already assigned to earlier parameters
/// (constructor parameters first, then method parameters), so a supplier may
/// derive its candidates from them. Implementations must return a finite list.
pub trait ParameterSupplier: Send + Sync {
    fn value_sources(
        &self,
        signature: &ParameterSignature,
        bound: &[Value],
    ) -> Result<Vec<PotentialAssignment>, SupplierError>;
}

impl<F> ParameterSupplier for F
where
    F: Fn(&ParameterSignature, &[Value]) -> Result<Vec<PotentialAssignment>, SupplierError> + Send + Sync,
{
    fn value_sources(
        &self,
        signature: &ParameterSignature,
        bound: &[Value],
    ) -> Result<Vec<PotentialAssignment>, SupplierError> {
        self(signature, bound)
    }
}
