use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparator {
    Gte,
    Lte,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SloDefinition {
    pub slo_id: String,
    pub comparator: Comparator,
    pub target: f64,
    pub warning: f64,
    pub is_availability_ratio: bool,
}

impl SloDefinition {
    pub fn new(slo_id: impl Into<String>, comparator: Comparator, target: f64, warning: f64, is_availability_ratio: bool) -> Self {
        Self {
            slo_id: slo_id.into(),
            comparator,
            target,
            warning,
            is_availability_ratio,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SloStatus {
    Ok,
    Warning,
    Breached,
    Unknown,
}

impl fmt::Display for SloStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SloStatus::Ok => "OK",
            SloStatus::Warning => "WARNING",
            SloStatus::Breached => "BREACHED",
            SloStatus::Unknown => "UNKNOWN",
        };
        write!(f, "{s}")
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ErrorBudget {
    pub total_budget: f64,
    pub consumed: f64,
    pub remaining: f64,
    pub consumed_pct: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SloEvaluation {
    pub slo_id: String,
    pub status: SloStatus,
    pub current: Option<f64>,
    pub target: f64,
    pub warning: f64,
    pub error_budget: Option<ErrorBudget>,
    pub timestamp: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertKind {
    Breached,
    Warning,
    Recovered,
    BudgetLow,
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlertKind::Breached => "BREACHED",
            AlertKind::Warning => "WARNING",
            AlertKind::Recovered => "RECOVERED",
            AlertKind::BudgetLow => "BUDGET_LOW",
        };
        write!(f, "{s}")
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AlertEvent {
    pub slo_id: String,
    pub kind: AlertKind,
    pub timestamp: i64,
}
