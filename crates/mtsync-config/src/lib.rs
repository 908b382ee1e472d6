//! Device settings: hostname, credentials, and TLS policy.
//!
//! Three layers are applied in increasing precedence — environment
//! variables, then CLI arguments, then the `metadata` object pulled out of
//! the desired-state document — matching the original tool's layering so a
//! user can override a baked-in default with an env var, and override that
//! with a flag, and override that with an in-document metadata block.

use serde_json::Value;

const FIELDS: [&str; 4] = [
    "hostname",
    "username",
    "password",
    "ignore_certificate_errors",
];

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Settings {
    pub hostname: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub ignore_certificate_errors: bool,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads each field from the process environment, checking the
    /// lowercase name first and then the uppercase name — if both are
    /// set, uppercase wins, since it is applied last.
    pub fn apply_environment_variables(&mut self) {
        self.apply_env_lookup(|key| std::env::var(key).ok());
    }

    /// Core of [`Self::apply_environment_variables`], parameterized over a
    /// lookup function so tests don't need to mutate process-wide env vars.
    pub fn apply_env_lookup(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for field in FIELDS {
            if let Some(value) = lookup(field) {
                self.set_field(field, &value);
            }
            if let Some(value) = lookup(&field.to_uppercase()) {
                self.set_field(field, &value);
            }
        }
    }

    fn set_field(&mut self, field: &str, value: &str) {
        match field {
            "hostname" => self.hostname = Some(value.to_string()),
            "username" => self.username = Some(value.to_string()),
            "password" => self.password = Some(value.to_string()),
            "ignore_certificate_errors" => {
                self.ignore_certificate_errors =
                    value.parse().unwrap_or_else(|_| !value.is_empty());
            }
            _ => unreachable!("FIELDS is exhaustive"),
        }
    }

    /// CLI arguments override whatever came before; `None` leaves the
    /// current value untouched. The boolean flag can only turn the setting
    /// on, never back off, matching `click`'s `is_flag` default of `False`
    /// meaning "not specified" rather than "explicitly false".
    pub fn apply_arguments(
        &mut self,
        hostname: Option<String>,
        username: Option<String>,
        password: Option<String>,
        ignore_certificate_errors: bool,
    ) {
        if let Some(hostname) = hostname {
            self.hostname = Some(hostname);
        }
        if let Some(username) = username {
            self.username = Some(username);
        }
        if let Some(password) = password {
            self.password = Some(password);
        }
        if ignore_certificate_errors {
            self.ignore_certificate_errors = true;
        }
    }

    /// Applies the top-level `metadata` object extracted from the desired
    /// document. Only present, non-null keys override.
    pub fn apply_metadata(&mut self, metadata: &serde_json::Map<String, Value>) {
        for field in FIELDS {
            match metadata.get(field) {
                None | Some(Value::Null) => continue,
                Some(value) => match field {
                    "ignore_certificate_errors" => {
                        if let Some(b) = value.as_bool() {
                            self.ignore_certificate_errors = b;
                        }
                    }
                    _ => {
                        if let Some(s) = value.as_str() {
                            self.set_field(field, s);
                        }
                    }
                },
            }
        }
    }

    /// `hostname` and `username` must be non-empty for the settings to be
    /// usable; `password` may legitimately be empty.
    pub fn valid(&self) -> bool {
        self.hostname.as_deref().is_some_and(|h| !h.is_empty())
            && self.username.as_deref().is_some_and(|u| !u.is_empty())
    }
}
