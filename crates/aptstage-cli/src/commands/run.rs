use super::{build_session, json_pretty, SessionOpts, EXIT_FAILURE};
use std::path::Path;
use std::process::Command;

pub fn run(opts: &SessionOpts, command: &[String], json: bool) -> Result<u8, String> {
    let (mut session, ctx) = build_session(opts)?;
    let root = session.configure(&ctx).map_err(|e| e.to_string())?;

    // Deconfigure even when the command fails; its exit code still wins.
    let command_result = run_against_root(&root, command);
    let deconfigure_result = session
        .deconfigure(&ctx, &root)
        .map_err(|e| e.to_string());

    let code = command_result?;
    deconfigure_result?;

    if json {
        println!(
            "{}",
            json_pretty(&serde_json::json!({
                "root": root,
                "exit_code": code,
            }))?
        );
    }
    Ok(code)
}

fn run_against_root(root: &Path, command: &[String]) -> Result<u8, String> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| "no command given".to_owned())?;
    let status = Command::new(program)
        .args(args)
        .env("APTSTAGE_ROOT", root)
        .status()
        .map_err(|e| format!("failed to execute '{program}': {e}"))?;
    match status.code() {
        Some(code) => Ok(u8::try_from(code).unwrap_or(EXIT_FAILURE)),
        // Killed by a signal.
        None => Ok(EXIT_FAILURE),
    }
}
