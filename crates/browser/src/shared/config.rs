use std::time::Duration;

#[derive(Debug, Clone)]
pub struct LaunchConfig {
    pub headless: bool,
    pub viewport_width: Option<u32>,
    pub viewport_height: Option<u32>,
    pub navigation: Duration,
    pub check_interval: Duration,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: None,
            viewport_height: None,
            navigation: Duration::from_millis(30000),
            check_interval: Duration::from_millis(300),
        }
    }
}

impl LaunchConfig {
    /// A visible window, for watching the indicator come and go.
    pub fn visible() -> Self {
        Self {
            headless: false,
            viewport_width: Some(1280),
            viewport_height: Some(800),
            ..Self::default()
        }
    }

    pub fn with_navigation(mut self, ms: u64) -> Self {
        self.navigation = Duration::from_millis(ms);
        self
    }

    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = Some(width);
        self.viewport_height = Some(height);
        self
    }
}
