use std::env;
use std::fs;
use std::path::Path;

fn main() {
    // The name list is embedded with include_str!, but rebuild when it changes
    println!("cargo:rerun-if-changed=data/pokemon_names_ja.txt");

    copy_config();
}

/// Copies config.json to the target directory so the executable picks it up.
fn copy_config() {
    let Ok(out_dir) = env::var("OUT_DIR") else {
        return;
    };
    // OUT_DIR is something like target/release/build/pokesol-card-reader-xxx/out
    // We need to go up to target/release (or target/debug)
    let out_path = Path::new(&out_dir);
    let Some(target_dir) = out_path.ancestors().nth(3) else {
        return;
    };

    let config_src = Path::new("config.json");
    let config_dst = target_dir.join("config.json");

    if config_src.exists() {
        let _ = fs::copy(config_src, &config_dst);
        println!("cargo:rerun-if-changed=config.json");
    }
}
