/// Command and descriptor assertion utilities
#[allow(dead_code)]
pub fn assert_cmd_contains(cmd: &str, part: &str) {
    assert!(
        cmd.contains(part),
        "Expected command to contain '{}' but it didn't.\nCommand: {}",
        part,
        cmd
    );
}

/// Check that a command string does NOT contain a specific part
#[allow(dead_code)]
pub fn assert_cmd_not_contains(cmd: &str, part: &str) {
    assert!(
        !cmd.contains(part),
        "Expected command to NOT contain '{}' but it did.\nCommand: {}",
        part,
        cmd
    );
}

/// Check that a command contains a flag with a specific value
#[allow(dead_code)]
pub fn assert_cmd_has_flag_value(cmd: &str, flag: &str, value: &str) {
    let pattern = format!("{} {}", flag, value);
    assert!(
        cmd.contains(&pattern),
        "Expected command to contain '{} {}' but it didn't.\nCommand: {}",
        flag,
        value,
        cmd
    );
}

/// Parse a flag value from the command (e.g., get "5" from "-r 5")
#[allow(dead_code)]
pub fn get_flag_value<'a>(cmd: &'a str, flag: &str) -> Option<&'a str> {
    let pattern = format!("{} ", flag);
    cmd.find(&pattern).and_then(|pos| {
        let after_flag = &cmd[pos + pattern.len()..];
        after_flag.split_whitespace().next()
    })
}

/// Check that `first` appears before `second` in the command
#[allow(dead_code)]
pub fn assert_cmd_order(cmd: &str, first: &str, second: &str) {
    let a = cmd
        .find(first)
        .unwrap_or_else(|| panic!("'{}' not found in command: {}", first, cmd));
    let b = cmd
        .find(second)
        .unwrap_or_else(|| panic!("'{}' not found in command: {}", second, cmd));
    assert!(
        a < b,
        "Expected '{}' before '{}' in command: {}",
        first,
        second,
        cmd
    );
}

/// Check that no `{}` or `{N}` placeholder survived rendering
#[allow(dead_code)]
pub fn assert_fully_rendered(cmd: &str) {
    assert!(
        !ffrelay::presets::template::has_unresolved_slot(cmd),
        "Unfilled placeholder left in command: {}",
        cmd
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_flag_value() {
        let cmd = "ffmpeg -r 5 -s 1280x720 -f rawvideo";
        assert_eq!(get_flag_value(cmd, "-r"), Some("5"));
        assert_eq!(get_flag_value(cmd, "-s"), Some("1280x720"));
        assert_eq!(get_flag_value(cmd, "-nonexistent"), None);
    }

    #[test]
    #[should_panic(expected = "Expected command to contain")]
    fn test_assert_cmd_contains_fails() {
        assert_cmd_contains("ffmpeg -i in.mp4", "-c:v");
    }

    #[test]
    #[should_panic(expected = "Expected '-i' before '-hwaccel'")]
    fn test_assert_cmd_order_fails() {
        assert_cmd_order("ffmpeg -hwaccel vaapi -i in.mp4", "-i", "-hwaccel");
    }
}
