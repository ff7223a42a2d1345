#![no_main]
use libfuzzer_sys::fuzz_target;
use loadstat_core::Param;

fuzz_target!(|data: &str| {
    // Control-file text is "name=value"; parsing must never panic.
    let Some((name, value)) = data.split_once('=') else {
        return;
    };
    let Ok(param) = name.parse::<Param>() else {
        return;
    };
    if let Ok(v) = param.parse_value(value) {
        assert_eq!(value.trim().parse::<u64>().ok(), Some(v));
    }
});
