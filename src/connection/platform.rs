/// Commands that enter and leave configuration mode on a platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigMode {
    pub enter: &'static str,
    pub exit: &'static str,
}

/// Look up the configuration mode wrapper for a device type such as "cisco_ios"
pub fn config_mode(device_type: &str) -> ConfigMode {
    let family = device_type.split('_').next().unwrap_or_default().to_lowercase();
    match family.as_str() {
        "juniper" => ConfigMode {
            enter: "configure",
            exit: "commit and-quit",
        },
        "linux" => ConfigMode { enter: "", exit: "" },
        // cisco, arista and most IOS-like CLIs
        _ => ConfigMode {
            enter: "configure terminal",
            exit: "end",
        },
    }
}

/// Lines sent over the interactive shell for one config set, including the
/// mode wrapper and the final logout.
pub fn config_session_script(device_type: &str, lines: &[String]) -> Vec<String> {
    let mode = config_mode(device_type);
    let mut script = Vec::with_capacity(lines.len() + 3);
    if !mode.enter.is_empty() {
        script.push(mode.enter.to_string());
    }
    script.extend(lines.iter().cloned());
    if !mode.exit.is_empty() {
        script.push(mode.exit.to_string());
    }
    script.push("exit".to_string());
    script
}

/// Config lines of a file: trailing whitespace trimmed, blank lines dropped
pub fn config_lines_from_text(text: &str) -> Vec<String> {
    text.lines()
        .map(|l| l.trim_end().to_string())
        .filter(|l| !l.trim().is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_mode_by_family() {
        assert_eq!(config_mode("cisco_ios").enter, "configure terminal");
        assert_eq!(config_mode("arista_eos").exit, "end");
        assert_eq!(config_mode("juniper_junos").exit, "commit and-quit");
        assert_eq!(config_mode("linux").enter, "");
    }

    #[test]
    fn test_session_script_wraps_lines() {
        let lines = vec!["router eigrp 100".to_string(), "network 10.0.0.0 0.0.0.255".to_string()];
        assert_eq!(
            config_session_script("cisco_ios", &lines),
            vec!["configure terminal", "router eigrp 100", "network 10.0.0.0 0.0.0.255", "end", "exit"]
        );
        assert_eq!(config_session_script("linux", &lines).len(), 3);
    }

    #[test]
    fn test_config_lines_from_text() {
        let text = "router eigrp 100  \r\n\n network 10.0.0.0 0.0.0.255\n   \n";
        assert_eq!(
            config_lines_from_text(text),
            vec!["router eigrp 100", " network 10.0.0.0 0.0.0.255"]
        );
    }
}
