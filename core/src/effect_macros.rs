//! Declarative macros for ergonomic effect construction
//!
//! Reducers build most of their effects from two shapes: an async call whose
//! result comes back as an action, and a timer that dispatches an action later.

/// Create an `Effect::Future` from an async block
///
/// The block must evaluate to `Option<Action>`. Everything it uses is moved in,
/// so clone handles (API clients, ids) out of the environment first.
///
/// # Example
///
/// ```rust,ignore
/// use freizeit_core::async_effect;
///
/// let api = env.api.clone();
/// async_effect! {
///     let result = api.fetch_event(event_id).await;
///     Some(EventDetailAction::EventFetched { result, .. })
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

/// Create an `Effect::Delay` for scheduling delayed actions
///
/// # Example
///
/// ```rust,ignore
/// use freizeit_core::delay;
/// use std::time::Duration;
///
/// delay! {
///     duration: Duration::from_secs(1),
///     action: EventDetailAction::SettleElapsed { generation }
/// }
/// ```
#[macro_export]
macro_rules! delay {
    (
        duration: $duration:expr,
        action: $action:expr
    ) => {
        $crate::effect::Effect::Delay {
            duration: $duration,
            action: ::std::boxed::Box::new($action),
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::effect::Effect;
    use std::time::Duration;

    #[derive(Clone, Debug, PartialEq)]
    enum TestAction {
        Fetched { value: i32 },
        SettleElapsed,
    }

    #[test]
    fn test_async_effect_macro() {
        let effect = async_effect! {
            Some(TestAction::Fetched { value: 42 })
        };

        assert!(matches!(effect, Effect::Future(_)));
    }

    #[tokio::test]
    async fn test_async_effect_resolves_to_action() {
        let value = 7;
        let effect = async_effect! {
            Some(TestAction::Fetched { value })
        };

        let Effect::Future(fut) = effect else {
            unreachable!("async_effect! always builds a future");
        };
        assert_eq!(fut.await, Some(TestAction::Fetched { value: 7 }));
    }

    #[test]
    fn test_delay_macro() {
        let effect = delay! {
            duration: Duration::from_secs(1),
            action: TestAction::SettleElapsed
        };

        assert!(matches!(
            effect,
            Effect::Delay { duration, .. } if duration == Duration::from_secs(1)
        ));
    }
}
