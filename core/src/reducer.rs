//! Reducer trait - the core abstraction for state transitions.
//!
//! Reducers are pure functions: `(State, Action) → State`. They contain all
//! transition logic, are deterministic, and never perform I/O. Side effects
//! belong to the module that owns the store, not to the reducer.

/// The Reducer trait - pure transition logic for a module's state.
///
/// Each call produces a complete new state snapshot. The [`Store`] applies
/// the result atomically, so readers never see a half-applied transition.
///
/// # Type Parameters
///
/// - `State`: the domain state this reducer operates on
/// - `Action`: the transition events this reducer processes
///
/// # Example
///
/// ```
/// use softphone_core::reducer::Reducer;
///
/// #[derive(Clone, Default)]
/// struct Toggle {
///     on: bool,
/// }
///
/// enum ToggleEvent {
///     Flip,
/// }
///
/// struct ToggleReducer;
///
/// impl Reducer for ToggleReducer {
///     type State = Toggle;
///     type Action = ToggleEvent;
///
///     fn reduce(&self, state: &Toggle, action: ToggleEvent) -> Toggle {
///         match action {
///             ToggleEvent::Flip => Toggle { on: !state.on },
///         }
///     }
/// }
/// ```
///
/// [`Store`]: crate::store::Store
pub trait Reducer {
    /// The state type this reducer operates on.
    type State: Clone;

    /// The transition event type this reducer processes.
    type Action;

    /// Reduce a transition event into a new state snapshot.
    ///
    /// This is a pure function: it must not block, perform I/O, or panic.
    fn reduce(&self, state: &Self::State, action: Self::Action) -> Self::State;
}
