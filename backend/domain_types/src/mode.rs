use common_enums::Mode;
use serde::Deserialize;

/// Operating mode of the process, split into independently overridable axes
/// that share one global default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ModeContext {
    mode: Mode,
    gateway_mode: Mode,
    integration_mode: Mode,
}

impl ModeContext {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            gateway_mode: mode,
            integration_mode: mode,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn gateway_mode(&self) -> Mode {
        self.gateway_mode
    }

    pub fn integration_mode(&self) -> Mode {
        self.integration_mode
    }

    /// Resets every axis to `mode`.
    pub fn set_mode(&mut self, mode: Mode) {
        *self = Self::new(mode);
    }

    pub fn set_gateway_mode(&mut self, mode: Mode) {
        self.gateway_mode = mode;
    }

    pub fn set_integration_mode(&mut self, mode: Mode) {
        self.integration_mode = mode;
    }

    pub fn is_test(&self) -> bool {
        self.gateway_mode.is_test()
    }
}

/// `[mode]` section of the service configuration.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ModeConfig {
    #[serde(default)]
    pub mode: Mode,
    pub gateway_mode: Option<Mode>,
    pub integration_mode: Option<Mode>,
}

impl From<&ModeConfig> for ModeContext {
    fn from(config: &ModeConfig) -> Self {
        let mut context = Self::new(config.mode);
        if let Some(mode) = config.gateway_mode {
            context.set_gateway_mode(mode);
        }
        if let Some(mode) = config.integration_mode {
            context.set_integration_mode(mode);
        }
        context
    }
}
