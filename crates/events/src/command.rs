use quoteworks_core::AggregateId;

/// A command targets a specific aggregate (command abstraction).
///
/// Commands represent **intent** - a request to perform an action on an
/// aggregate. They are transient (never persisted) and are transformed into
/// events, which are the accepted facts.
///
/// ## Command vs Event
///
/// - **Command**: intent to do something (e.g., "Commit this line")
/// - **Event**: fact that something happened (e.g., "LineCommitted { .. }")
///
/// Invalid commands are rejected with a domain error; events are never
/// rejected.
///
/// ## Aggregate Targeting
///
/// `target_aggregate_id()` names the aggregate a command operates on. Each
/// command operates on exactly one aggregate - that is the consistency
/// boundary - and the id gives callers (and their logs) a stable handle for
/// routing and correlation.
pub trait Command: Clone + core::fmt::Debug + Send + Sync + 'static {
    fn target_aggregate_id(&self) -> AggregateId;
}
