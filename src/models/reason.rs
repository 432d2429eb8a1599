use serde::Serialize;

/// Category attached to a regularization request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RegularizationReason {
    ForgotToPunch,
    CollegeEvent,
    TechnicalError,
}

impl RegularizationReason {
    pub fn label(&self) -> &'static str {
        match self {
            RegularizationReason::ForgotToPunch => "Forgot to Punch",
            RegularizationReason::CollegeEvent => "College Event",
            RegularizationReason::TechnicalError => "Technical Error",
        }
    }

    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        self.label()
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "Forgot to Punch" => Some(RegularizationReason::ForgotToPunch),
            "College Event" => Some(RegularizationReason::CollegeEvent),
            "Technical Error" => Some(RegularizationReason::TechnicalError),
            _ => None,
        }
    }

    /// Helper: accept labels or short codes from the CLI.
    pub fn from_code(code: &str) -> Option<Self> {
        if let Some(r) = Self::from_db_str(code.trim()) {
            return Some(r);
        }

        match code.trim().to_lowercase().as_str() {
            "forgot" | "forgot-to-punch" | "forgot to punch" => {
                Some(RegularizationReason::ForgotToPunch)
            }
            "event" | "od" | "college-event" | "college event" => {
                Some(RegularizationReason::CollegeEvent)
            }
            "technical" | "tech" | "technical-error" | "technical error" => {
                Some(RegularizationReason::TechnicalError)
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for RegularizationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_and_labels_are_accepted() {
        assert_eq!(
            RegularizationReason::from_code("forgot"),
            Some(RegularizationReason::ForgotToPunch)
        );
        assert_eq!(
            RegularizationReason::from_code("OD"),
            Some(RegularizationReason::CollegeEvent)
        );
        assert_eq!(
            RegularizationReason::from_code("Technical Error"),
            Some(RegularizationReason::TechnicalError)
        );
        assert_eq!(RegularizationReason::from_code("sick"), None);
    }
}
