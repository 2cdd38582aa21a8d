//! Enum/string conversion macro shared by the domain enums.
//!
//! Statuses and roles travel as lowercase strings through both the JSON
//! wire format and the database TEXT columns. Implementing `Display` and
//! `FromStr` from one variant table keeps the two representations from
//! drifting apart.
//!
//! # Example
//!
//! ```rust
//! use convene_domain::impl_enum_string_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! enum Shift {
//!     Morning,
//!     Evening,
//! }
//!
//! impl_enum_string_conversions!(Shift {
//!     Morning => "morning",
//!     Evening => "evening",
//! });
//!
//! assert_eq!(Shift::Morning.to_string(), "morning");
//! assert_eq!("EVENING".parse::<Shift>(), Ok(Shift::Evening));
//! ```

/// Derive `Display` and `FromStr` for an enum from one variant table.
///
/// Formatting emits the listed strings as-is; parsing lowercases its input
/// first, so any casing of a known value is accepted. Unknown input yields
/// an error string naming the enum and the rejected value.
#[macro_export]
macro_rules! impl_enum_string_conversions {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(match self {
                    $(Self::$variant => $text,)+
                })
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = String;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value.to_lowercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(format!("Unknown {} value: {value}", stringify!($name))),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    // Fixture enum; the real users live in types/.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum RsvpState {
        Confirmed,
        Waitlisted,
        Declined,
    }

    impl_enum_string_conversions!(RsvpState {
        Confirmed => "confirmed",
        Waitlisted => "waitlisted",
        Declined => "declined",
    });

    const TABLE: [(RsvpState, &str); 3] = [
        (RsvpState::Confirmed, "confirmed"),
        (RsvpState::Waitlisted, "waitlisted"),
        (RsvpState::Declined, "declined"),
    ];

    #[test]
    fn display_emits_the_wire_string() {
        for (state, text) in TABLE {
            assert_eq!(state.to_string(), text);
        }
    }

    #[test]
    fn parsing_accepts_any_casing() {
        assert_eq!(RsvpState::from_str("confirmed").unwrap(), RsvpState::Confirmed);
        assert_eq!(RsvpState::from_str("WAITLISTED").unwrap(), RsvpState::Waitlisted);
        assert_eq!(RsvpState::from_str("DeClInEd").unwrap(), RsvpState::Declined);
    }

    #[test]
    fn parsing_rejects_unknown_values() {
        let err = RsvpState::from_str("archived").unwrap_err();
        assert!(err.contains("Unknown RsvpState value: archived"));
    }

    #[test]
    fn wire_strings_round_trip() {
        for (state, _) in TABLE {
            assert_eq!(RsvpState::from_str(&state.to_string()).unwrap(), state);
        }
    }
}
