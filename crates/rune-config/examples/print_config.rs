/// Example program to print the loaded router configuration
///
/// Run with: cargo run -p rune-config --example print_config

fn main() {
    let config = rune_config::RuneConfig::load();

    println!("=== Rune Frame Router Configuration ===\n");

    println!("Routing:");
    println!("  Tie Break: {:?}", config.routing.tie_break);
    println!();

    println!("Registry:");
    println!("  Strict Validation: {}", config.registry.strict_validation);
    println!("  Max Depth: {}", config.registry.max_depth);
    println!("  Prune On Follow: {}", config.registry.prune_on_follow);
    println!();

    println!("Links:");
    println!("  Clip To Usable: {}", config.links.clip_to_usable);
    println!();

    println!("Diagnostics:");
    println!("  Notify: {}", config.diagnostics.notify);
    println!("  Categories: {:?}", config.diagnostics.categories);
    println!();

    match toml::to_string_pretty(&config) {
        Ok(toml_str) => {
            println!("=== Serialized Configuration ===");
            println!("{}", toml_str);
        }
        Err(e) => {
            eprintln!("Failed to serialize config: {}", e);
        }
    }
}
