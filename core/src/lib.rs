//! # Freizeit Core
//!
//! Core traits and types for the Freizeit client state machines.
//!
//! Screens of the client are modelled as reducers: a pure function
//! `(State, Action, Environment) → (State, Effects)`. Network calls and timers
//! are never performed inside a reducer; the reducer returns [`Effect`]
//! descriptions and the runtime executes them, feeding any resulting action
//! back into the reducer.
//!
//! ## Core Concepts
//!
//! - **State**: Everything a view knows (loaded event, pending operation, alerts)
//! - **Action**: User inputs (`JoinTapped`) and effect feedback (`EventFetched`)
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Injected dependencies (API client, clock, timings)
//!
//! ## Example
//!
//! ```ignore
//! use freizeit_core::*;
//!
//! #[derive(Clone, Debug)]
//! enum DetailAction {
//!     Refresh,
//!     Refreshed { title: String },
//! }
//!
//! impl Reducer for DetailReducer {
//!     type State = DetailState;
//!     type Action = DetailAction;
//!     type Environment = DetailEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut DetailState,
//!         action: DetailAction,
//!         env: &DetailEnvironment,
//!     ) -> SmallVec<[Effect<DetailAction>; 4]> {
//!         match action {
//!             DetailAction::Refresh => {
//!                 let api = env.api.clone();
//!                 smallvec![async_effect! {
//!                     let title = api.title().await;
//!                     Some(DetailAction::Refreshed { title })
//!                 }]
//!             }
//!             DetailAction::Refreshed { title } => {
//!                 state.title = title;
//!                 SmallVec::new()
//!             }
//!         }
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{SmallVec, smallvec};

/// Declarative macros for building effects
pub mod effect_macros;

/// Reducer module - The core trait for view logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
///
/// They contain all decision making and are deterministic and testable.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for view logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The view state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Checks preconditions for the action
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed
        ///
        /// Most actions produce zero or one effect, so the result is a
        /// `SmallVec` that stays on the stack for up to four effects.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe work for the runtime. They are values, returned from
/// reducers, and executed by the Store.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Effect type - describes a side effect to be executed
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects in parallel
        Parallel(Vec<Effect<Action>>),

        /// Run effects sequentially
        Sequential(Vec<Effect<Action>>),

        /// Delayed action (settle windows, debounced refreshes)
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after delay
            action: Box<Action>,
        },

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Returns the delayed action if this is an `Effect::Delay`
        #[must_use]
        pub fn delayed_action(&self) -> Option<(&Duration, &Action)> {
            match self {
                Effect::Delay { duration, action } => Some((duration, action)),
                _ => None,
            }
        }
    }
}

/// Environment module - Dependency injection traits
///
/// External dependencies are abstracted behind traits and injected via the
/// Environment parameter so reducers stay deterministic under test.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall clock backed by `Utc::now()`
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

pub use effect::Effect;
pub use environment::{Clock, SystemClock};
pub use reducer::Reducer;
