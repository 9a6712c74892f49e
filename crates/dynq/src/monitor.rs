//! SQL logging.
//!
//! [`SqlLogger`] emits one `tracing` event per statement **before** it is sent
//! to the database, on target `dynq.sql`, and one on completion with the row
//! count and elapsed time. Validation failures are emitted on `dynq.validate`.
//!
//! Enabled by the `tracing` crate feature (on by default). Without it every
//! method is a no-op.

use crate::error::DynqError;
use crate::sql::Sql;
use std::time::Duration;

#[cfg(feature = "tracing")]
use tracing::Level;

/// Dispatch a tracing event at a runtime-determined level.
#[cfg(feature = "tracing")]
macro_rules! emit_at_level {
    ($level:expr, $($field:tt)*) => {
        match $level {
            Level::ERROR => tracing::error!($($field)*),
            Level::WARN => tracing::warn!($($field)*),
            Level::INFO => tracing::info!($($field)*),
            Level::DEBUG => tracing::debug!($($field)*),
            Level::TRACE => tracing::trace!($($field)*),
        }
    };
}

/// Truncate `sql` to at most `max_bytes`, backing off to a char boundary.
pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// Logs the SQL dynq actually executes.
#[derive(Debug, Clone)]
pub struct SqlLogger {
    /// Whether statement events are emitted at all.
    pub enabled: bool,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
    /// Tracing event level to emit at.
    #[cfg(feature = "tracing")]
    pub level: Level,
}

impl Default for SqlLogger {
    fn default() -> Self {
        Self {
            enabled: true,
            max_sql_length: Some(200),
            #[cfg(feature = "tracing")]
            level: Level::DEBUG,
        }
    }
}

impl SqlLogger {
    /// Create a new logger with defaults (`DEBUG`, 200 byte truncation).
    pub fn new() -> Self {
        Self::default()
    }

    /// A logger that emits nothing.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Override the tracing event level.
    #[cfg(feature = "tracing")]
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    pub(crate) fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }

    /// Emit the statement about to run.
    pub(crate) fn before_query(&self, sql: &Sql) {
        if !self.enabled {
            return;
        }
        #[cfg(feature = "tracing")]
        {
            let text = self.truncate_sql(&sql.to_sql());
            let tag = sql.tag().unwrap_or("-");
            let param_count = sql.params().len();
            emit_at_level!(
                self.level,
                target: "dynq.sql",
                tag,
                param_count,
                sql = %text,
                "executing statement"
            );
        }
        #[cfg(not(feature = "tracing"))]
        let _ = sql;
    }

    /// Emit the outcome of a statement.
    pub(crate) fn after_query(&self, sql: &Sql, rows: Option<usize>, elapsed: Duration) {
        if !self.enabled {
            return;
        }
        #[cfg(feature = "tracing")]
        {
            let tag = sql.tag().unwrap_or("-");
            let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
            emit_at_level!(
                self.level,
                target: "dynq.sql",
                tag,
                rows,
                elapsed_ms,
                "statement finished"
            );
        }
        #[cfg(not(feature = "tracing"))]
        let _ = (sql, rows, elapsed);
    }

    /// Emit a failed statement. Failures are always reported at `WARN`.
    pub(crate) fn query_failed(&self, sql: &Sql, err: &DynqError) {
        #[cfg(feature = "tracing")]
        {
            let tag = sql.tag().unwrap_or("-");
            tracing::warn!(
                target: "dynq.sql",
                tag,
                sqlstate = err.sqlstate().unwrap_or("-"),
                error = %err,
                "statement failed"
            );
        }
        #[cfg(not(feature = "tracing"))]
        let _ = (sql, err);
    }

    /// Emit an input rejection for `operation`.
    pub(crate) fn rejected(&self, operation: &str, err: &DynqError) {
        #[cfg(feature = "tracing")]
        tracing::debug!(target: "dynq.validate", operation, error = %err, "input rejected");
        #[cfg(not(feature = "tracing"))]
        let _ = (operation, err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_on_char_boundary() {
        assert_eq!(truncate_sql_bytes("SELECT", 10), "SELECT");
        assert_eq!(truncate_sql_bytes("SELECT", 3), "SEL");
        // 'é' is two bytes; cutting inside it backs off.
        assert_eq!(truncate_sql_bytes("aé", 2), "a");
    }

    #[test]
    fn logger_truncation() {
        let logger = SqlLogger::new().max_sql_length(6);
        assert_eq!(logger.truncate_sql("SELECT id FROM t"), "SELECT...");
        assert_eq!(logger.truncate_sql("SELECT"), "SELECT");
        let logger = logger.no_truncate();
        assert_eq!(logger.truncate_sql("SELECT id FROM t"), "SELECT id FROM t");
    }

    #[test]
    fn disabled_logger() {
        let logger = SqlLogger::disabled();
        assert!(!logger.enabled);
        // Must not panic even without a subscriber.
        logger.before_query(&Sql::new("SELECT 1"));
        logger.after_query(&Sql::new("SELECT 1"), Some(1), Duration::ZERO);
    }
}
