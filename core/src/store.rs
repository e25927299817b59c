//! Store - the single-writer runtime for a reducer.
//!
//! The store is the only mutation path for a module's state: transitions are
//! applied synchronously through [`Store::dispatch`], and readers observe
//! complete snapshots either by polling ([`Store::state`]) or reactively
//! ([`Store::subscribe`]).

use crate::reducer::Reducer;
use tokio::sync::watch;

/// Single-writer state container driven by a [`Reducer`].
///
/// The state lives inside a `tokio::sync::watch` channel. `dispatch` applies
/// the reducer inside [`watch::Sender::send_modify`], which swaps in the new
/// snapshot atomically and wakes subscribers - no reader can observe an
/// intermediate state, and no explicit lock is needed.
///
/// # Example
///
/// ```
/// # use softphone_core::{reducer::Reducer, store::Store};
/// # #[derive(Clone, Default)]
/// # struct S { n: u32 }
/// # enum A { Bump }
/// # struct R;
/// # impl Reducer for R {
/// #     type State = S;
/// #     type Action = A;
/// #     fn reduce(&self, state: &S, _action: A) -> S { S { n: state.n + 1 } }
/// # }
/// let store = Store::new(S::default(), R);
/// let mut rx = store.subscribe();
/// store.dispatch(A::Bump);
/// assert_eq!(rx.borrow_and_update().n, 1);
/// ```
pub struct Store<R: Reducer> {
    reducer: R,
    tx: watch::Sender<R::State>,
}

impl<R> Store<R>
where
    R: Reducer,
    R::State: Send + Sync + 'static,
{
    /// Create a new store with an initial state and a reducer.
    #[must_use]
    pub fn new(initial_state: R::State, reducer: R) -> Self {
        let (tx, _) = watch::channel(initial_state);
        Self { reducer, tx }
    }

    /// Apply a transition event.
    ///
    /// The reducer runs synchronously; the resulting snapshot replaces the
    /// current state atomically and subscribers are notified. Dispatching
    /// never blocks and never fails.
    pub fn dispatch(&self, action: R::Action) {
        self.tx.send_modify(|state| {
            *state = self.reducer.reduce(state, action);
        });
    }

    /// Get a snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> R::State {
        self.tx.borrow().clone()
    }

    /// Read the current state without cloning it.
    ///
    /// The closure runs while the snapshot is borrowed; keep it short.
    pub fn with_state<T>(&self, f: impl FnOnce(&R::State) -> T) -> T {
        f(&self.tx.borrow())
    }

    /// Subscribe to state snapshots.
    ///
    /// The receiver is marked changed on every dispatch. Dropping the
    /// receiver unsubscribes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<R::State> {
        self.tx.subscribe()
    }
}

impl<R> std::fmt::Debug for Store<R>
where
    R: Reducer,
    R::State: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &*self.tx.borrow())
            .finish_non_exhaustive()
    }
}
