use std::env;
use std::process::Command;

const TAIL_LINES: usize = 20;

/// Run an external tool to completion, capturing output. On failure the error
/// carries the stage name and the tail of whatever the tool printed.
pub fn run_tool(stage: &str, cmd: &mut Command) -> Result<String, Box<dyn std::error::Error>> {
    let program = cmd.get_program().to_string_lossy().into_owned();

    let output = cmd
        .output()
        .map_err(|e| format!("{stage}: failed to run {program}: {e}"))?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        Err(format!(
            "{stage}: {program} exited with {}\n{}",
            output.status,
            tail(&output.stdout, &output.stderr, TAIL_LINES)
        )
        .into())
    }
}

pub fn tail(stdout: &[u8], stderr: &[u8], max_lines: usize) -> String {
    let combined = format!(
        "{}{}",
        String::from_utf8_lossy(stdout),
        String::from_utf8_lossy(stderr)
    );

    let lines: Vec<&str> = combined.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}

pub fn on_path(tool: &str) -> bool {
    let Some(path) = env::var_os("PATH") else {
        return false;
    };

    env::split_paths(&path).any(|dir| dir.join(tool).is_file())
}
