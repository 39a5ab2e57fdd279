//! Guard predicates and transition actions.
//!
//! Guards decide whether a transition row fires; actions are the side
//! effects run when it does. Both are plain function pointers over the FSM
//! context, so a transition table is built once and firing it never
//! allocates.

/// Predicate that determines if a transition can execute.
///
/// The predicate receives the FSM context (its data plus the hardware port)
/// and must not mutate anything.
///
/// # Example
///
/// ```rust
/// use parkassist::core::Guard;
///
/// struct Sensor {
///     echo_ticks: u32,
/// }
///
/// let echo_seen = Guard::new(|s: &Sensor| s.echo_ticks > 0);
///
/// assert!(echo_seen.check(&Sensor { echo_ticks: 12 }));
/// assert!(!echo_seen.check(&Sensor { echo_ticks: 0 }));
/// ```
pub struct Guard<C> {
    predicate: fn(&C) -> bool,
}

impl<C> Guard<C> {
    /// Create a guard from a predicate function.
    ///
    /// Non-capturing closures coerce to function pointers, so both named
    /// functions and inline closures are accepted.
    pub const fn new(predicate: fn(&C) -> bool) -> Self {
        Guard { predicate }
    }

    /// Evaluate the guard against the given context.
    pub fn check(&self, ctx: &C) -> bool {
        (self.predicate)(ctx)
    }
}

impl<C> Clone for Guard<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Guard<C> {}

/// Side effect executed when a transition fires.
///
/// # Example
///
/// ```rust
/// use parkassist::core::Action;
///
/// struct Counter {
///     presses: u32,
/// }
///
/// let count = Action::new(|c: &mut Counter| c.presses += 1);
///
/// let mut counter = Counter { presses: 0 };
/// count.run(&mut counter);
/// assert_eq!(counter.presses, 1);
/// ```
pub struct Action<C> {
    effect: fn(&mut C),
}

impl<C> Action<C> {
    /// Create an action from a function.
    pub const fn new(effect: fn(&mut C)) -> Self {
        Action { effect }
    }

    /// Run the action on the given context.
    pub fn run(&self, ctx: &mut C) {
        (self.effect)(ctx)
    }
}

impl<C> Clone for Action<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Action<C> {}
