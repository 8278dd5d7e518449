#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigError>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ConfigError) {
        self.errors.push(error);
    }

    pub fn summary(&self) -> String {
        if self.errors.is_empty() {
            "Configuration is valid".to_string()
        } else {
            let details: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
            format!("{} error(s): {}", self.errors.len(), details.join("; "))
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigError {
    pub field: String,
    pub message: String,
}

impl ConfigError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}
