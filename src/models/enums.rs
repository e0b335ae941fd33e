use serde::{Deserialize, Serialize};

use crate::proximity::types::InvalidInput;

/// Macro to generate a closed enum with as_str + std::str::FromStr pattern.
/// Unknown strings are rejected as `InvalidInput::UnknownVariant`, never defaulted.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidInput;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(InvalidInput::UnknownVariant {
                        field: stringify!($name),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(IncidentCategory {
    Fire => "fire",
    Flood => "flood",
    Accident => "accident",
    Medical => "medical",
    Crime => "crime",
    Weather => "weather",
});

// Declaration order is the severity order.
str_enum!(Severity {
    Low => "low",
    Medium => "medium",
    High => "high",
    Critical => "critical",
});

str_enum!(Language {
    En => "en",
    Rw => "rw",
});

impl IncidentCategory {
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Fire => "🔥",
            Self::Flood => "💧",
            Self::Accident => "🚗",
            Self::Medical => "🏥",
            Self::Crime => "🚨",
            Self::Weather => "⛈️",
        }
    }

    /// Human-readable label in English or Kinyarwanda.
    pub fn label(&self, lang: Language) -> &'static str {
        match (lang, self) {
            (Language::En, Self::Fire) => "Fire Emergency",
            (Language::En, Self::Flood) => "Flood/Water Emergency",
            (Language::En, Self::Accident) => "Traffic Accident",
            (Language::En, Self::Medical) => "Medical Emergency",
            (Language::En, Self::Crime) => "Security/Crime Alert",
            (Language::En, Self::Weather) => "Weather Emergency",
            (Language::Rw, Self::Fire) => "Ubwoba bw'Umuriro",
            (Language::Rw, Self::Flood) => "Ubwoba bw'Amazi/Imyuzure",
            (Language::Rw, Self::Accident) => "Impanuka y'Ibinyabiziga",
            (Language::Rw, Self::Medical) => "Ubwoba bw'Ubuvuzi",
            (Language::Rw, Self::Crime) => "Ubwoba bw'Umutekano",
            (Language::Rw, Self::Weather) => "Ubwoba bw'Ikirere",
        }
    }
}

impl Severity {
    /// Kinyarwanda urgency marker shown in notification titles.
    /// Only high and critical incidents carry one.
    pub fn urgency_marker(&self) -> Option<&'static str> {
        match self {
            Self::Critical => Some("BIKOMEYE"),
            Self::High => Some("BYIHUSE"),
            Self::Medium | Self::Low => None,
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::En
    }
}
