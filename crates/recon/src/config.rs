use serde::Deserialize;

use crate::error::ReconError;

/// Run settings for one repair pass. The restriction fragment comes from the
/// restriction collaborator pre-validated; the engine consumes it verbatim.
#[derive(Debug, Clone, Deserialize)]
pub struct RepairConfig {
    pub name: String,
    /// Log module whose strategy library is in play, e.g. "scorm".
    pub module: String,
    /// Registered actions to repair, in order.
    pub actions: Vec<String>,
    /// Opaque boolean SQL fragment ANDed into every primary query.
    #[serde(default = "default_restrict")]
    pub restrict: String,
}

fn default_restrict() -> String {
    "1".into()
}

impl RepairConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: RepairConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.actions.is_empty() {
            return Err(ReconError::ConfigValidation(
                "at least one action is required".into(),
            ));
        }

        for (i, action) in self.actions.iter().enumerate() {
            if self.actions[..i].contains(action) {
                return Err(ReconError::ConfigValidation(format!(
                    "action '{action}' is listed twice"
                )));
            }
        }

        if self.restrict.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "restrict must not be blank; omit it to run unrestricted".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
name = "scorm view repair"
module = "scorm"
actions = ["view", "launch"]
restrict = "log.time >= 1420070400"
"#;

    #[test]
    fn parse_valid() {
        let config = RepairConfig::from_toml(VALID).unwrap();
        assert_eq!(config.name, "scorm view repair");
        assert_eq!(config.module, "scorm");
        assert_eq!(config.actions, ["view", "launch"]);
        assert_eq!(config.restrict, "log.time >= 1420070400");
    }

    #[test]
    fn restrict_defaults_to_tautology() {
        let input = r#"
name = "all rows"
module = "scorm"
actions = ["view"]
"#;
        let config = RepairConfig::from_toml(input).unwrap();
        assert_eq!(config.restrict, "1");
    }

    #[test]
    fn reject_empty_actions() {
        let input = r#"
name = "empty"
module = "scorm"
actions = []
"#;
        let err = RepairConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("at least one action"));
    }

    #[test]
    fn reject_duplicate_action() {
        let input = r#"
name = "dup"
module = "scorm"
actions = ["view", "view"]
"#;
        let err = RepairConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("listed twice"));
    }

    #[test]
    fn reject_blank_restrict() {
        let input = r#"
name = "blank"
module = "scorm"
actions = ["view"]
restrict = "   "
"#;
        let err = RepairConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("restrict"));
    }

    #[test]
    fn reject_missing_module() {
        let input = r#"
name = "no module"
actions = ["view"]
"#;
        let err = RepairConfig::from_toml(input).unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }
}
