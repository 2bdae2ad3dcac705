use super::{json_pretty, load_mirror, EXIT_SUCCESS};
use aptstage_core::sources::render_intent;
use chrono::Utc;
use std::path::Path;

pub fn run(mirror_config: Option<&Path>, json: bool) -> Result<u8, String> {
    let mirror = load_mirror(mirror_config)?;
    let doc = render_intent(&mirror, Utc::now()).map_err(|e| e.to_string())?;

    if json {
        println!("{}", json_pretty(&serde_json::json!({ "intent": doc }))?);
    } else {
        print!("{doc}");
    }
    Ok(EXIT_SUCCESS)
}
