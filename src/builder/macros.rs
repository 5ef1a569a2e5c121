//! Macros for declaring state identities.

/// Declare an identity enum whose variants convert into `StateId`.
///
/// Variants take ordinary enum discriminants, so give the first one an
/// explicit value when `0` should stay unused. Each enum is meant to cover
/// the children of one composite, so different enums may reuse values.
///
/// # Example
///
/// ```
/// use strata::{state_ids, StateId};
///
/// state_ids! {
///     pub enum Light {
///         Red = 1,
///         Yellow,
///         Green,
///     }
/// }
///
/// assert_eq!(StateId::from(Light::Yellow), StateId::new(2));
/// assert_eq!(Light::Green.name(), "Green");
/// ```
#[macro_export]
macro_rules! state_ids {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $(= $value:expr)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        #[repr(u32)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant $(= $value)?
            ),*
        }

        impl $name {
            /// Variant name for display/logging.
            #[allow(dead_code)]
            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }
        }

        impl ::core::convert::From<$name> for $crate::core::StateId {
            fn from(value: $name) -> Self {
                $crate::core::StateId::new(value as u32)
            }
        }
    };
}
