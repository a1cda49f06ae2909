/// Execute an aggregate command deterministically (no IO, no async).
///
/// The canonical decide/evolve lifecycle in one step:
///
/// 1. **Decide**: `aggregate.handle(command)` produces events (pure, no
///    mutation).
/// 2. **Evolve**: each event is applied via `aggregate.apply(event)`.
///
/// Because `handle` runs to completion before any `apply`, a rejected command
/// leaves the aggregate exactly as it was - operations are atomic from the
/// caller's point of view.
///
/// The aggregate maintains its own version tracking during `apply` (typically
/// +1 per event).
pub fn execute<A>(aggregate: &mut A, command: &A::Command) -> Result<Vec<A::Event>, A::Error>
where
    A: quoteworks_core::Aggregate,
{
    let events = A::handle(aggregate, command)?;
    for ev in &events {
        A::apply(aggregate, ev);
    }
    Ok(events)
}
