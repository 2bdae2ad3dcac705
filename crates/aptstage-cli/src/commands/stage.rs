use super::{build_session, json_pretty, SessionOpts, EXIT_SUCCESS};
use console::Style;

pub fn run(opts: &SessionOpts, json: bool) -> Result<u8, String> {
    let (mut session, ctx) = build_session(opts)?;
    let root = session.configure(&ctx).map_err(|e| e.to_string())?;

    if json {
        println!(
            "{}",
            json_pretty(&serde_json::json!({
                "root": root,
                "configured": session.configured(),
                "mounts": session.tracked_mounts(),
            }))?
        );
    } else {
        println!("{}", root.display());
        if !session.tracked_mounts().is_empty() {
            let dim = Style::new().dim();
            eprintln!(
                "{}",
                dim.apply_to("mounts left active, unmount in reverse order:")
            );
            for mountpoint in session.tracked_mounts().iter().rev() {
                eprintln!("{}", dim.apply_to(format!("  {}", mountpoint.display())));
            }
        }
    }
    Ok(EXIT_SUCCESS)
}
