//! # Softphone SDK Core
//!
//! Core traits and runtime for the Softphone SDK architecture.
//!
//! This crate provides the fundamental abstractions the SDK modules are
//! built on:
//!
//! - **State**: owned, clonable domain state for a module
//! - **Transition event**: a discrete request to change that state
//! - **Reducer**: pure function `(State, Event) → State`
//! - **Store**: single-writer runtime that applies transitions atomically
//!   and publishes snapshots to reactive readers
//! - **`DataFetcher`**: generic polling data-fetcher with
//!   subscription-triggered invalidation, shared by the data-backed modules
//!
//! ## Architecture Principles
//!
//! - Unidirectional data flow: modules mutate state only by dispatching
//!   transition events into their store
//! - Readers never observe a partially applied transition
//! - Side effects live in the modules, not in reducers
//!
//! ## Example
//!
//! ```
//! use softphone_core::reducer::Reducer;
//! use softphone_core::store::Store;
//!
//! #[derive(Clone, Debug, Default, PartialEq)]
//! struct CounterState {
//!     count: i32,
//! }
//!
//! enum CounterEvent {
//!     Increment,
//! }
//!
//! struct CounterReducer;
//!
//! impl Reducer for CounterReducer {
//!     type State = CounterState;
//!     type Action = CounterEvent;
//!
//!     fn reduce(&self, state: &CounterState, action: CounterEvent) -> CounterState {
//!         match action {
//!             CounterEvent::Increment => CounterState {
//!                 count: state.count + 1,
//!             },
//!         }
//!     }
//! }
//!
//! let store = Store::new(CounterState::default(), CounterReducer);
//! store.dispatch(CounterEvent::Increment);
//! assert_eq!(store.state().count, 1);
//! ```

pub mod fetcher;
pub mod reducer;
pub mod store;

pub use fetcher::{DataFetcher, DataSource, FetchError, FetcherConfig};
pub use reducer::Reducer;
pub use store::Store;
