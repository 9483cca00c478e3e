//! Minimal environment-variable loader, following this workspace's convention of a
//! small typed loader with defaults rather than a general-purpose config framework.

use std::collections::HashMap;
use std::env;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnvError {
    #[error("invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },
}

pub struct EnvConfigLoader {
    prefix: String,
    defaults: HashMap<String, String>,
}

impl EnvConfigLoader {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            defaults: HashMap::new(),
        }
    }

    pub fn default(mut self, var: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.insert(var.into(), value.into());
        self
    }

    fn raw(&self, var: &str) -> String {
        let full_var = format!("{}{}", self.prefix, var);
        env::var(&full_var)
            .ok()
            .or_else(|| self.defaults.get(var).cloned())
            .unwrap_or_default()
    }

    pub fn get_u32(&self, var: &str) -> Result<u32, EnvError> {
        let value = self.raw(var);
        value.parse().map_err(|_| EnvError::InvalidValue {
            var: format!("{}{}", self.prefix, var),
            reason: format!("cannot parse '{value}' as u32"),
        })
    }

    pub fn get_u64(&self, var: &str) -> Result<u64, EnvError> {
        let value = self.raw(var);
        value.parse().map_err(|_| EnvError::InvalidValue {
            var: format!("{}{}", self.prefix, var),
            reason: format!("cannot parse '{value}' as u64"),
        })
    }

    pub fn get_f64(&self, var: &str) -> Result<f64, EnvError> {
        let value = self.raw(var);
        value.parse().map_err(|_| EnvError::InvalidValue {
            var: format!("{}{}", self.prefix, var),
            reason: format!("cannot parse '{value}' as f64"),
        })
    }

    pub fn get_string(&self, var: &str) -> String {
        self.raw(var)
    }
}
