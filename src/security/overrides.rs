//! Deterministic override for root-level filesystem destruction.
//!
//! The classifier prompt also states this rule, but classifiers are not
//! guaranteed to honor embedded instructions, so the same check is enforced
//! in code. Any hit here forces a `Block` verdict no matter what the
//! classifier returned.

/// Root-level paths that a recursive delete or rewrite must never target.
const ROOT_TARGETS: &[&str] = &[
    "/", "/bin", "/boot", "/dev", "/etc", "/home", "/lib", "/lib64", "/opt",
    "/proc", "/root", "/sbin", "/sys", "/usr", "/var",
];

/// Returns the reason string if `command` removes or rewrites root-level
/// filesystem paths, `None` otherwise.
pub fn root_path_destruction(command: &str) -> Option<String> {
    let trimmed = command.trim();
    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }

    if let Some(target) = recursive_force_delete_target(&tokens) {
        return Some(format!(
            "command recursively deletes the root-level path '{}'",
            target
        ));
    }

    if tokens.iter().any(|t| *t == "--no-preserve-root") {
        return Some("command disables root-deletion protection (--no-preserve-root)".to_string());
    }

    // Filesystem rewrites aimed at a root target: mkfs on a device, dd onto
    // a device, or a redirect that truncates a root directory entry.
    if let Some(target) = device_rewrite_target(&tokens) {
        return Some(format!(
            "command rewrites the root-level device or path '{}'",
            target
        ));
    }

    None
}

/// Detect `rm` with recursive+force flags (in any order or combined form)
/// whose target is a root-level path.
fn recursive_force_delete_target(tokens: &[&str]) -> Option<String> {
    let cmd = strip_sudo(tokens);
    if cmd.first() != Some(&"rm") {
        return None;
    }

    let mut recursive = false;
    let mut force = false;
    let mut targets = Vec::new();

    for token in &cmd[1..] {
        if token.starts_with("--") {
            recursive |= *token == "--recursive";
            force |= *token == "--force";
        } else if let Some(flags) = token.strip_prefix('-') {
            recursive |= flags.contains('r') || flags.contains('R');
            force |= flags.contains('f');
        } else {
            targets.push(*token);
        }
    }

    if !(recursive && force) {
        return None;
    }

    targets
        .iter()
        .find(|t| is_root_target(t))
        .map(|t| t.to_string())
}

/// Detect `mkfs*` / `dd of=` aimed at a root path or raw disk device.
fn device_rewrite_target(tokens: &[&str]) -> Option<String> {
    let cmd = strip_sudo(tokens);
    let head = cmd.first()?;

    if head.starts_with("mkfs") {
        return cmd[1..]
            .iter()
            .find(|t| is_root_target(t) || t.starts_with("/dev/"))
            .map(|t| t.to_string());
    }

    if *head == "dd" {
        return cmd[1..]
            .iter()
            .filter_map(|t| t.strip_prefix("of="))
            .find(|t| is_root_target(t) || t.starts_with("/dev/"))
            .map(|t| t.to_string());
    }

    None
}

fn strip_sudo<'a>(tokens: &'a [&'a str]) -> &'a [&'a str] {
    match tokens.first() {
        Some(&"sudo") => &tokens[1..],
        _ => tokens,
    }
}

fn is_root_target(path: &str) -> bool {
    let normalized = path.trim_end_matches('/');
    // "/" itself trims to the empty string
    if path.starts_with('/') && normalized.is_empty() {
        return true;
    }
    ROOT_TARGETS.contains(&normalized) || normalized == "/*"
}
