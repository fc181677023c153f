// src/banner.rs

/// Prints the application startup banner to the console.
pub fn print_banner() {
    let banner = r#"
                                   _   _                     _
 _ __  _ __ ___  _ __ ___  _ __ | |_| |__   ___ _ __   ___| |__
| '_ \| '__/ _ \| '_ ` _ \| '_ \| __| '_ \ / _ \ '_ \ / __| '_ \
| |_) | | | (_) | | | | | | |_) | |_| |_) |  __/ | | | (__| | | |
| .__/|_|  \___/|_| |_| |_| .__/ \__|_.__/ \___|_| |_|\___|_| |_|
|_|                       |_|

    Prompt Console & Multi-LLM Probe Runner
"#;
    println!("{}", banner);
}
