#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse errors and validation errors are both fine; panics are not.
    if let Ok(cfg) = loadstat_config::load_toml(data) {
        if cfg.validate().is_ok() {
            // Anything that validates must map onto engine settings.
            let s = loadstat_core::StatSettings::from(&cfg.stat);
            assert!(s.delay_ms <= 1000);
            assert!(s.scale_up <= 100 && s.scale_down <= 100 && s.warn <= 100);
        }
    }
});
