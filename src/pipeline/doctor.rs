use crate::exec;

const REQUIRED_TOOLS: &[(&str, &str)] = &[
    ("7z", "p7zip (e.g. apt install p7zip-full)"),
    ("asar", "@electron/asar (npm install -g @electron/asar)"),
    ("npm", "nodejs and npm"),
    ("unzip", "unzip"),
];

/// Fail before the first stage if a required external tool is missing, with a
/// hint naming what to install.
pub fn check_tools() -> Result<(), Box<dyn std::error::Error>> {
    check_tools_with(exec::on_path)
}

pub fn check_tools_with(probe: impl Fn(&str) -> bool) -> Result<(), Box<dyn std::error::Error>> {
    for (tool, hint) in REQUIRED_TOOLS {
        if !probe(tool) {
            return Err(format!("required tool `{tool}` not found on PATH; install {hint}").into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_when_every_tool_is_present() {
        assert!(check_tools_with(|_| true).is_ok());
    }

    #[test]
    fn first_missing_tool_fails_with_a_hint() {
        let err = check_tools_with(|tool| tool != "asar").unwrap_err().to_string();

        assert!(err.contains("`asar`"));
        assert!(err.contains("npm install -g"));
    }

    #[test]
    fn missing_archiver_names_the_package() {
        let err = check_tools_with(|tool| tool != "7z").unwrap_err().to_string();

        assert!(err.contains("p7zip"));
    }
}
