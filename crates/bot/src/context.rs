use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use ledgerbot_auth::{Principal, UserRef};

/// A typed option value supplied with a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    User(UserRef),
    Integer(i64),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OptionError {
    #[error("missing required option '{0}'")]
    Missing(String),

    #[error("option '{0}' has the wrong type")]
    WrongType(String),
}

/// Options of one invocation, by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOptions {
    values: Vec<(String, OptionValue)>,
}

impl CommandOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: OptionValue) -> Self {
        self.insert(name, value);
        self
    }

    /// Set an option, replacing any earlier value of the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: OptionValue) {
        let name = name.into();
        self.values.retain(|(n, _)| *n != name);
        self.values.push((name, value));
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn user(&self, name: &str) -> Result<&UserRef, OptionError> {
        match self.get(name) {
            Some(OptionValue::User(u)) => Ok(u),
            Some(_) => Err(OptionError::WrongType(name.to_string())),
            None => Err(OptionError::Missing(name.to_string())),
        }
    }

    pub fn integer(&self, name: &str) -> Result<i64, OptionError> {
        match self.get(name) {
            Some(OptionValue::Integer(n)) => Ok(*n),
            Some(_) => Err(OptionError::WrongType(name.to_string())),
            None => Err(OptionError::Missing(name.to_string())),
        }
    }
}

/// One inbound command, as handed to the dispatcher.
///
/// Not persisted; lives for the duration of a single dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Correlation id for logs.
    pub id: Uuid,
    pub command: String,
    pub caller: Principal,
    pub options: CommandOptions,
    pub received_at: DateTime<Utc>,
}

impl Invocation {
    pub fn new(command: impl Into<String>, caller: Principal, options: CommandOptions) -> Self {
        Self {
            id: Uuid::now_v7(),
            command: command.into(),
            caller,
            options,
            received_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerbot_core::UserId;

    #[test]
    fn typed_option_access() {
        let target = UserRef::new(UserId::from(2u64), "Bob");
        let opts = CommandOptions::new()
            .with("user", OptionValue::User(target.clone()))
            .with("amount", OptionValue::Integer(10))
            .with("amount", OptionValue::Integer(25));

        assert_eq!(opts.user("user"), Ok(&target));
        assert_eq!(opts.integer("amount"), Ok(25));
        assert_eq!(opts.integer("user"), Err(OptionError::WrongType("user".to_string())));
        assert_eq!(opts.integer("missing"), Err(OptionError::Missing("missing".to_string())));
    }
}
