use std::fmt;

use tracing::Level;

/// Cloud Logging `LogSeverity`.
///
/// `tracing` only has five levels, so the finer Cloud Logging severities
/// ride on the closest level and are carried explicitly in a `severity`
/// field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Debug,
    Info,
    Notice,
    Warning,
    Error,
    Critical,
    Alert,
    Emergency,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Notice => "NOTICE",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
            Severity::Alert => "ALERT",
            Severity::Emergency => "EMERGENCY",
        }
    }

    /// Case-insensitive parse of a Cloud Logging severity name.
    pub fn parse(s: &str) -> Option<Self> {
        let severity = match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Severity::Debug,
            "INFO" => Severity::Info,
            "NOTICE" => Severity::Notice,
            "WARNING" | "WARN" => Severity::Warning,
            "ERROR" => Severity::Error,
            "CRITICAL" => Severity::Critical,
            "ALERT" => Severity::Alert,
            "EMERGENCY" => Severity::Emergency,
            _ => return None,
        };
        Some(severity)
    }

    /// The `tracing` level an entry of this severity is emitted at.
    pub fn level(self) -> Level {
        match self {
            Severity::Debug => Level::DEBUG,
            Severity::Info | Severity::Notice => Level::INFO,
            Severity::Warning => Level::WARN,
            Severity::Error | Severity::Critical | Severity::Alert | Severity::Emergency => {
                Level::ERROR
            }
        }
    }
}

impl From<&Level> for Severity {
    fn from(level: &Level) -> Self {
        match *level {
            Level::ERROR => Severity::Error,
            Level::WARN => Severity::Warning,
            Level::INFO => Severity::Info,
            // DEBUG and TRACE
            _ => Severity::Debug,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_mapping() {
        assert_eq!(Severity::from(&Level::TRACE), Severity::Debug);
        assert_eq!(Severity::from(&Level::WARN), Severity::Warning);
        assert_eq!(Severity::Critical.level(), Level::ERROR);
        assert_eq!(Severity::Notice.level(), Level::INFO);
    }

    #[test]
    fn parse_accepts_any_case() {
        assert_eq!(Severity::parse("notice"), Some(Severity::Notice));
        assert_eq!(Severity::parse(" Emergency "), Some(Severity::Emergency));
        assert_eq!(Severity::parse("warn"), Some(Severity::Warning));
        assert_eq!(Severity::parse("fatal"), None);
    }

    #[test]
    fn ordering_follows_cloud_logging() {
        assert!(Severity::Debug < Severity::Notice);
        assert!(Severity::Alert < Severity::Emergency);
        assert_eq!(Severity::Alert.to_string(), "ALERT");
    }
}
