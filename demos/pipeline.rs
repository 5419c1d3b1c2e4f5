use runwait::{Output, Pipeline};
use std::collections::HashMap;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let listing = Pipeline::new()
        .add("ls", ["-1"])
        .add_with_filter("grep", ["-v", "^target$"], |out| Output::from(out.trim_end()))
        .run_wait()?;

    let mut handlers = HashMap::new();
    handlers.insert(".toml", |rest: &str| println!("manifest (suffix {rest:?})"));
    listing.dispatch_lines(&mut handlers, true);

    if let Some(last) = listing.for_each_line_rev(|line| !line.is_empty()) {
        println!("last entry: {last}");
    }
    Ok(())
}
