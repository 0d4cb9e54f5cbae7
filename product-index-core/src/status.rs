use serde::{Deserialize, Serialize};

/// Availability of a product as published in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Availability {
    Available,
    Unavailable,
    /// No inventory information could be derived.
    Unknown,
}

impl Availability {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Unavailable => "Unavailable",
            Self::Unknown => "Unknown",
        }
    }

    /// Derive availability from free-form inventory text.
    ///
    /// Case-insensitive substring test: "sold" or "out" means unavailable,
    /// otherwise "in" means available. Anything else yields `None`. The "in"
    /// test is broad on purpose ("IN STOCK", "in shop", but also "pending").
    pub fn from_state_text(text: &str) -> Option<Self> {
        let lower = text.trim().to_lowercase();
        if lower.contains("sold") || lower.contains("out") {
            Some(Self::Unavailable)
        } else if lower.contains("in") {
            Some(Self::Available)
        } else {
            None
        }
    }

    /// Interpret a legacy availability flag: exactly "available" is
    /// available, any other value is not.
    pub fn from_flag(flag: &str) -> Self {
        if flag == "available" {
            Self::Available
        } else {
            Self::Unavailable
        }
    }
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sold_out_is_unavailable() {
        assert_eq!(
            Availability::from_state_text("SOLD OUT"),
            Some(Availability::Unavailable)
        );
        assert_eq!(
            Availability::from_state_text("out of stock"),
            Some(Availability::Unavailable)
        );
    }

    #[test]
    fn in_stock_is_available() {
        assert_eq!(
            Availability::from_state_text("IN STOCK"),
            Some(Availability::Available)
        );
    }

    #[test]
    fn broad_in_match_is_preserved() {
        assert_eq!(
            Availability::from_state_text("pending"),
            Some(Availability::Available)
        );
    }

    #[test]
    fn unrelated_text_has_no_status() {
        assert_eq!(Availability::from_state_text("reserved"), None);
        assert_eq!(Availability::from_state_text(""), None);
    }

    #[test]
    fn flag_requires_exact_literal() {
        assert_eq!(Availability::from_flag("available"), Availability::Available);
        assert_eq!(Availability::from_flag("Available"), Availability::Unavailable);
        assert_eq!(Availability::from_flag("yes"), Availability::Unavailable);
    }
}
