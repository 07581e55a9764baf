use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use sqlx::SqlitePool;
use std::collections::HashMap;

/// Login failure record for one IP
#[derive(Debug, Clone)]
pub struct LoginAttempt {
    pub fail_count: u32,
    pub last_attempt: DateTime<Utc>,
}

/// Login security state
pub struct LoginSecurity {
    /// IP login failure records: IP -> LoginAttempt
    pub ip_attempts: RwLock<HashMap<String, LoginAttempt>>,
}

impl LoginSecurity {
    pub fn new() -> Self {
        Self {
            ip_attempts: RwLock::new(HashMap::new()),
        }
    }

    /// Check if an IP is blocked (5 or more failures within 30 minutes)
    pub fn is_ip_blocked(&self, ip: &str) -> bool {
        let attempts = self.ip_attempts.read();
        if let Some(attempt) = attempts.get(ip) {
            if attempt.fail_count >= 5 {
                let elapsed = Utc::now().signed_duration_since(attempt.last_attempt);
                return elapsed.num_minutes() < 30;
            }
        }
        false
    }

    /// Record a login failure
    pub fn record_failure(&self, ip: &str) {
        let now = Utc::now();
        let mut attempts = self.ip_attempts.write();
        let entry = attempts.entry(ip.to_string()).or_insert(LoginAttempt {
            fail_count: 0,
            last_attempt: now,
        });
        // The failure window restarts after 30 quiet minutes
        if now.signed_duration_since(entry.last_attempt).num_minutes() >= 30 {
            entry.fail_count = 0;
        }
        entry.fail_count += 1;
        entry.last_attempt = now;
    }

    /// Login succeeded, clear the failure record
    pub fn clear_failure(&self, ip: &str) {
        self.ip_attempts.write().remove(ip);
    }
}

impl Default for LoginSecurity {
    fn default() -> Self {
        Self::new()
    }
}

pub struct AppState {
    pub db: SqlitePool,
    pub login_security: LoginSecurity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ip_block_threshold() {
        let security = LoginSecurity::new();
        let ip = "10.0.0.1";

        for _ in 0..4 {
            security.record_failure(ip);
        }
        assert!(!security.is_ip_blocked(ip));

        security.record_failure(ip);
        assert!(security.is_ip_blocked(ip));

        security.clear_failure(ip);
        assert!(!security.is_ip_blocked(ip));
    }

    #[test]
    fn test_unknown_ip_is_not_blocked() {
        let security = LoginSecurity::new();
        assert!(!security.is_ip_blocked("192.168.1.50"));
    }
}
