//! Browser fingerprint patching: hide automation signals.

/// Chromium launch flags for every render.
pub const LAUNCH_ARGS: &[&str] = &[
    "--disable-blink-features=AutomationControlled",
    "--disable-dev-shm-usage",
];

/// JavaScript evaluated on every new document before page scripts run.
pub const STEALTH_SCRIPT: &str = r#"
(() => {
    // Hide webdriver flag
    Object.defineProperty(navigator, 'webdriver', {
        get: () => undefined,
        configurable: true,
    });

    if (!window.chrome) {
        window.chrome = {};
    }
    if (!window.chrome.runtime) {
        window.chrome.runtime = {
            connect: function() {},
            sendMessage: function() {},
        };
    }

    Object.defineProperty(navigator, 'plugins', {
        get: () => [1, 2, 3, 4, 5],
        configurable: true,
    });

    Object.defineProperty(navigator, 'languages', {
        get: () => ['en-US', 'en'],
        configurable: true,
    });
})();
"#;

/// Get the stealth injection script.
pub fn stealth_script() -> &'static str {
    STEALTH_SCRIPT
}
