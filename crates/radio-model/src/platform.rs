use std::path::{Path, PathBuf};

const APP_DIR: &str = "basic-radio";

/// IPC endpoint name for one mpv session.  Each player handle gets its own
/// mpv process, so the name carries the process id and a session counter.
#[cfg(unix)]
pub fn mpv_socket_name(session: u64) -> String {
    format!(
        "{}/basic-radio-mpv-{}-{}.sock",
        std::env::temp_dir().display(),
        std::process::id(),
        session
    )
}

#[cfg(windows)]
pub fn mpv_socket_name(session: u64) -> String {
    format!("basic-radio-mpv-{}-{}", std::process::id(), session)
}

#[cfg(unix)]
pub fn mpv_socket_arg(socket_name: &str) -> String {
    format!("--input-ipc-server={}", socket_name)
}

#[cfg(windows)]
pub fn mpv_socket_arg(socket_name: &str) -> String {
    format!("--input-ipc-server=\\\\.\\pipe\\{}", socket_name)
}

pub fn data_dir() -> PathBuf {
    // ~/.local/share on both Linux and macOS, not Application Support
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".local")
            .join("share")
            .join(APP_DIR)
    }
    #[cfg(windows)]
    {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }
}

pub fn config_dir() -> PathBuf {
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join(APP_DIR)
    }

    #[cfg(windows)]
    {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }
}

#[cfg(unix)]
pub fn mpv_binary_name() -> &'static str {
    "mpv"
}

#[cfg(windows)]
pub fn mpv_binary_name() -> &'static str {
    "mpv.exe"
}

fn find_beside_exe(name: &str) -> Option<PathBuf> {
    let current_exe = std::env::current_exe().ok()?;
    let dir = current_exe.parent()?;
    let p = dir.join(name);
    if p.exists() {
        return Some(p);
    }
    let p = dir.join("external").join(name);
    p.exists().then_some(p)
}

fn find_on_path(name: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(name))
        .find(|p| p.exists())
}

/// Find the mpv binary.
///
/// An explicit `configured` path wins when it exists.  Otherwise the
/// directory of the running executable is checked (unless `use_system_deps`),
/// then PATH.
pub fn find_mpv_binary(configured: Option<&Path>, use_system_deps: bool) -> Option<PathBuf> {
    if let Some(p) = configured {
        if p.exists() {
            return Some(p.to_path_buf());
        }
        tracing::warn!("configured mpv binary {} does not exist", p.display());
    }

    if !use_system_deps {
        if let Some(p) = find_beside_exe(mpv_binary_name()) {
            return Some(p);
        }
    }

    find_on_path(mpv_binary_name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_names_are_unique_per_session() {
        assert_ne!(mpv_socket_name(1), mpv_socket_name(2));
        assert!(mpv_socket_arg(&mpv_socket_name(1)).starts_with("--input-ipc-server="));
    }

    #[test]
    fn test_dirs_are_namespaced() {
        assert!(data_dir().ends_with(APP_DIR));
        assert!(config_dir().ends_with(APP_DIR));
    }

    #[test]
    fn test_configured_binary_wins() {
        let exe = std::env::current_exe().unwrap();
        assert_eq!(find_mpv_binary(Some(&exe), true), Some(exe));
    }
}
