/// Declare a `#[repr(i32)]` enum as carried by a wire message.
///
/// Generates:
/// * the enum itself, with the given discriminants
/// * `ALL`, every variant in declaration order
/// * `TryFrom<i32>`, failing with the unrecognized value
/// * `From<$Enum> for i32`
///
/// ```
/// inkmesh_common::wire_enum! {
///     /// Direction of travel.
///     pub enum Heading {
///         Unspecified = 0,
///         North = 1,
///         South = 2,
///     }
/// }
///
/// assert_eq!(Heading::try_from(2), Ok(Heading::South));
/// assert_eq!(Heading::try_from(7), Err(7));
/// assert_eq!(i32::from(Heading::North), 1);
/// assert_eq!(Heading::ALL.len(), 3);
/// ```
#[macro_export]
macro_rules! wire_enum {
    (@count) => { 0 };
    (@count $head:ident $($tail:ident)*) => { 1 + $crate::wire_enum!(@count $($tail)*) };
    {
        $(#[$meta:meta])*
        $vis:vis enum $Enum:ident {
            $($(#[$vmeta:meta])* $Variant:ident = $value:literal),+ $(,)?
        }
    } => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(i32)]
        $vis enum $Enum {
            $($(#[$vmeta])* $Variant = $value),+
        }

        impl $Enum {
            pub const ALL: [$Enum; $crate::wire_enum!(@count $($Variant)+)] = [$($Enum::$Variant),+];
        }

        impl ::core::convert::TryFrom<i32> for $Enum {
            type Error = i32;

            #[inline]
            fn try_from(value: i32) -> ::core::result::Result<Self, i32> {
                match value {
                    $($value => Ok($Enum::$Variant),)+
                    _ => Err(value),
                }
            }
        }

        impl ::core::convert::From<$Enum> for i32 {
            #[inline]
            fn from(value: $Enum) -> i32 {
                value as i32
            }
        }
    };
}
