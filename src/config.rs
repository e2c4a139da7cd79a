pub use candle_core::Device;

/// Maximum number of tokens fed to the model; longer inputs are truncated.
pub const DEFAULT_MAX_LENGTH: usize = 500;

/// Options applied when loading a model directory.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub max_length: usize,
    pub device: Device,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            device: Device::Cpu,
        }
    }
}

impl LoadOptions {
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn with_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_truncate_at_500_on_cpu() {
        let options = LoadOptions::default();
        assert_eq!(options.max_length, 500);
        assert!(options.device.is_cpu());
    }

    #[test]
    fn builder_overrides_max_length() {
        let options = LoadOptions::default().with_max_length(128);
        assert_eq!(options.max_length, 128);
    }
}
