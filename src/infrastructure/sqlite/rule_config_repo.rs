use crate::domain::error::DomainError;
use crate::domain::ports::rule_config_repository::{RuleConfig, RuleConfigRepository};
use crate::domain::values::rule_params::RuleParams;
use crate::infrastructure::sqlite::SharedConn;
use chrono::Utc;
use rusqlite::params;

pub struct SqliteRuleConfigRepo {
    conn: SharedConn,
}

impl SqliteRuleConfigRepo {
    pub fn new(conn: SharedConn) -> Self {
        Self { conn }
    }

    fn load(&self, enabled_only: bool) -> Result<Vec<RuleConfig>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let sql = if enabled_only {
            "SELECT rule_key, enabled, gating, sort_order, params
             FROM rule_configs WHERE enabled = 1 ORDER BY sort_order ASC, rule_key ASC"
        } else {
            "SELECT rule_key, enabled, gating, sort_order, params
             FROM rule_configs ORDER BY sort_order ASC, rule_key ASC"
        };
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })
            .map_err(|e| DomainError::Database(e.to_string()))?;

        let mut configs = Vec::new();
        for row in rows {
            let (rule_key, enabled, gating, sort_order, params_json) =
                row.map_err(|e| DomainError::Database(e.to_string()))?;
            let value: serde_json::Value = serde_json::from_str(&params_json).map_err(|e| {
                DomainError::InvalidInput(format!("rule {rule_key}: params not JSON: {e}"))
            })?;
            let params = RuleParams::from_json(&rule_key, &value)
                .map_err(|e| DomainError::InvalidInput(format!("rule {rule_key}: {e}")))?;
            configs.push(RuleConfig {
                rule_key,
                enabled: enabled != 0,
                gating: gating != 0,
                sort_order,
                params,
            });
        }
        Ok(configs)
    }
}

impl RuleConfigRepository for SqliteRuleConfigRepo {
    fn list_enabled(&self) -> Result<Vec<RuleConfig>, DomainError> {
        self.load(true)
    }

    fn list_all(&self) -> Result<Vec<RuleConfig>, DomainError> {
        self.load(false)
    }

    fn update(
        &self,
        rule_key: &str,
        enabled: Option<bool>,
        gating: Option<bool>,
        sort_order: Option<i64>,
        params: Option<RuleParams>,
    ) -> Result<(), DomainError> {
        if let Some(p) = &params {
            if p.rule_key() != rule_key {
                return Err(DomainError::InvalidInput(format!(
                    "params are for rule {}, not {rule_key}",
                    p.rule_key()
                )));
            }
        }
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let changed = conn
            .execute(
                "UPDATE rule_configs SET
                   enabled = COALESCE(?1, enabled),
                   gating = COALESCE(?2, gating),
                   sort_order = COALESCE(?3, sort_order),
                   params = COALESCE(?4, params),
                   updated_at = ?5
                 WHERE rule_key = ?6",
                params![
                    enabled.map(|b| b as i64),
                    gating.map(|b| b as i64),
                    sort_order,
                    params.map(|p| p.to_json().to_string()),
                    Utc::now().to_rfc3339(),
                    rule_key,
                ],
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("rule {rule_key}")));
        }
        Ok(())
    }
}
