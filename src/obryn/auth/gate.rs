use crate::settings::models::DevSettingsModel;

/// Fixed entry password. A cosmetic gate, not an authentication mechanism:
/// it ships in the client and guards nothing but the UI.
pub const APP_PASSWORD: &str = "1234";

pub fn app_gate_passes(input: &str) -> bool {
    input == APP_PASSWORD
}

/// The developer-settings gate checks against the configurable site password.
pub fn dev_gate_passes(input: &str, settings: &DevSettingsModel) -> bool {
    input.trim() == settings.site_password
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::models::dev_settings::DEFAULT_SITE_PASSWORD;

    #[test]
    fn app_gate_is_exact_match() {
        assert!(app_gate_passes("1234"));
        assert!(!app_gate_passes("12345"));
        assert!(!app_gate_passes(""));
    }

    #[test]
    fn dev_gate_trims_input_and_follows_configured_password() {
        let mut settings = DevSettingsModel::default();
        assert!(dev_gate_passes(DEFAULT_SITE_PASSWORD, &settings));
        assert!(dev_gate_passes("  ZHZHDK12! ", &settings));
        assert!(!dev_gate_passes("wrong", &settings));

        settings.set_site_password("changed");
        assert!(dev_gate_passes("changed", &settings));
        assert!(!dev_gate_passes(DEFAULT_SITE_PASSWORD, &settings));
    }
}
