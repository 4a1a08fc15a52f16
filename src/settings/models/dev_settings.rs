use serde::{Deserialize, Serialize};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are Obryn AI, a helpful and intelligent assistant. \
    Respond naturally and helpfully to all questions.";

pub const DEFAULT_SITE_PASSWORD: &str = "ZHZHDK12!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseLength {
    Short,
    Medium,
    Long,
}

/// Local developer configuration. Trusted local state, not a security
/// boundary: the site password is a cosmetic gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevSettingsModel {
    pub custom_system_prompt: String,
    pub response_length: ResponseLength,
    pub no_restrictions: bool,
    pub site_password: String,
}

impl Default for DevSettingsModel {
    fn default() -> Self {
        Self {
            custom_system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            response_length: ResponseLength::Medium,
            no_restrictions: true,
            site_password: DEFAULT_SITE_PASSWORD.to_string(),
        }
    }
}

impl DevSettingsModel {
    /// The only validation: an empty password cannot be saved.
    pub fn set_site_password(&mut self, password: &str) -> bool {
        if password.trim().is_empty() {
            return false;
        }
        self.site_password = password.to_string();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_shipped_configuration() {
        let settings = DevSettingsModel::default();
        assert_eq!(settings.response_length, ResponseLength::Medium);
        assert!(settings.no_restrictions);
        assert_eq!(settings.site_password, DEFAULT_SITE_PASSWORD);
        assert!(settings.custom_system_prompt.starts_with("You are Obryn AI"));
    }

    #[test]
    fn empty_password_is_rejected() {
        let mut settings = DevSettingsModel::default();
        assert!(!settings.set_site_password("   "));
        assert_eq!(settings.site_password, DEFAULT_SITE_PASSWORD);
        assert!(settings.set_site_password("new-pass"));
        assert_eq!(settings.site_password, "new-pass");
    }
}
