use crate::aggregate::from_result_rows;
use crate::error::ReconError;
use crate::filter::DepositPolicy;
use crate::model::{Aggregation, RawTransaction};
use crate::pipeline::{PipelineSpec, ResultRow};

/// Storage collaborator for the declarative aggregation path.
///
/// `aggregate` must evaluate the filter of `spec`, keep the first stored
/// observation (insertion order) of each `(txid, vout)`, then produce
/// either one [`ResultRow::Address`] per address or at most one
/// [`ResultRow::Extremes`] row (none when nothing matched).
pub trait DepositStore {
    type Error: std::error::Error;

    fn insert_batch(&mut self, records: &[RawTransaction]) -> Result<(), Self::Error>;

    fn aggregate(&self, spec: &PipelineSpec) -> Result<Vec<ResultRow>, Self::Error>;
}

/// Run both storage pipelines for `policy` and assemble the result.
pub fn aggregate_with_store<S: DepositStore>(
    store: &S,
    policy: &DepositPolicy,
) -> Result<Aggregation, ReconError> {
    let by_address = store
        .aggregate(&PipelineSpec::by_address(policy))
        .map_err(|e| ReconError::Storage(e.to_string()))?;
    let extremes = store
        .aggregate(&PipelineSpec::extremes(policy))
        .map_err(|e| ReconError::Storage(e.to_string()))?;
    from_result_rows(by_address, extremes)
}
