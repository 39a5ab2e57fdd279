//! Macros for ergonomic state machine construction.

/// Generate a fieldless state enum together with its `State` implementation.
///
/// Indices follow declaration order and `COUNT` is the number of variants.
///
/// # Example
///
/// ```
/// use parkassist::state_enum;
/// use parkassist::core::State;
///
/// state_enum! {
///     pub enum DoorState {
///         Closed,
///         Opening,
///         Open,
///     }
///     idle: [Closed]
/// }
///
/// assert_eq!(DoorState::COUNT, 3);
/// assert_eq!(DoorState::Open.index(), 2);
/// assert!(DoorState::Closed.is_idle());
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }

        $(idle: [$($idle:ident),* $(,)?])?
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::State for $name {
            const COUNT: usize = [$(stringify!($variant)),*].len();

            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }

            fn index(&self) -> usize {
                *self as usize
            }

            fn is_idle(&self) -> bool {
                match self {
                    $($(Self::$idle => true,)*)?
                    #[allow(unreachable_patterns)]
                    _ => false,
                }
            }
        }
    };
}
