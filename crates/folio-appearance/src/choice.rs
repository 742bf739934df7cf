//! Enumerated option sets.
//!
//! Every enumerated appearance option is a closed set of string tokens. Numeric
//! options (`"1280"`, `"700"`) are still tokens on the wire but also accept a
//! bare JSON integer on input.

use serde::Deserialize;
use serde_json::Value;

/// A closed, ordered set of option tokens.
pub trait Choice: Sized + Copy + 'static {
    /// Every member of the set, in display order.
    const ALL: &'static [Self];

    /// Canonical token for this member.
    fn as_str(self) -> &'static str;

    /// Resolve a token to its member.
    #[must_use]
    fn parse(raw: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|choice| choice.as_str() == raw)
    }

    /// Resolve a JSON string or non-negative integer to its member.
    #[must_use]
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(raw) => Self::parse(raw),
            Value::Number(number) => number.as_u64().and_then(|n| Self::parse(&n.to_string())),
            _ => None,
        }
    }

    /// Human-readable list of accepted tokens.
    #[must_use]
    fn accepted() -> String {
        Self::ALL
            .iter()
            .map(|choice| choice.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[doc(hidden)]
#[derive(Deserialize)]
#[serde(untagged)]
pub enum RawChoice {
    /// Token given as a JSON string.
    Text(String),
    /// Token given as a bare JSON integer.
    Number(u64),
}

impl RawChoice {
    #[doc(hidden)]
    #[must_use]
    pub fn resolve<T: Choice>(&self) -> Option<T> {
        match self {
            Self::Text(raw) => T::parse(raw),
            Self::Number(number) => T::parse(&number.to_string()),
        }
    }
}

/// Declare an option set: the enum, its tokens, serde and `Display`.
macro_rules! option_set {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident => $token:expr),+ $(,)?
        }
        $(default $default:ident)?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $(
                #[doc = concat!("Token `", $token, "`.")]
                $variant
            ),+
        }

        impl $crate::choice::Choice for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $token),+
                }
            }
        }

        impl $name {
            /// Canonical token for this option.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                <Self as $crate::choice::Choice>::as_str(self)
            }
        }

        $(
            impl Default for $name {
                fn default() -> Self {
                    Self::$default
                }
            }
        )?

        impl ::std::fmt::Display for $name {
            fn fmt(&self, formatter: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                formatter.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = String;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                <Self as $crate::choice::Choice>::parse(raw).ok_or_else(|| {
                    format!(
                        "expected one of: {}",
                        <Self as $crate::choice::Choice>::accepted()
                    )
                })
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = <$crate::choice::RawChoice as ::serde::Deserialize>::deserialize(deserializer)?;
                raw.resolve::<Self>().ok_or_else(|| {
                    <D::Error as ::serde::de::Error>::custom(format!(
                        "expected one of: {}",
                        <Self as $crate::choice::Choice>::accepted()
                    ))
                })
            }
        }
    };
}

/// Declare a numeric option set whose tokens are the decimal values.
///
/// `$accessor` names the `const fn` returning the numeric value.
macro_rules! numeric_option_set {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $accessor:ident {
            $($variant:ident = $value:literal),+ $(,)?
        }
        default $default:ident
    ) => {
        option_set! {
            $(#[$meta])*
            $vis enum $name {
                $($variant => stringify!($value)),+
            }
            default $default
        }

        impl $name {
            /// Numeric value of this option.
            #[must_use]
            pub const fn $accessor(self) -> u32 {
                match self {
                    $(Self::$variant => $value),+
                }
            }
        }
    };
}
