use std::path::Path;
use std::process::Command;
use tracing::warn;

/// Platform strategy for opening a file with its default application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launcher {
    /// `cmd /C start "" <path>`
    Windows,
    /// `open <path>`
    MacOs,
    /// `xdg-open <path>` on Linux and the BSDs
    Xdg,
}

impl Launcher {
    /// Resolve the launcher for the OS this binary runs on
    pub fn detect() -> Self {
        Self::for_os(std::env::consts::OS)
    }

    /// Select a launcher from a `std::env::consts::OS` identifier
    pub fn for_os(os: &str) -> Self {
        match os {
            "windows" => Launcher::Windows,
            "macos" => Launcher::MacOs,
            _ => Launcher::Xdg,
        }
    }

    /// Build the command without running it
    pub fn command(&self, path: &Path) -> Command {
        match self {
            Launcher::Windows => {
                let mut cmd = Command::new("cmd");
                cmd.arg("/C").arg("start").arg("").arg(path);
                cmd
            }
            Launcher::MacOs => {
                let mut cmd = Command::new("open");
                cmd.arg(path);
                cmd
            }
            Launcher::Xdg => {
                let mut cmd = Command::new("xdg-open");
                cmd.arg(path);
                cmd
            }
        }
    }

    /// Open `path` and wait for the launcher to exit.
    ///
    /// Failures are logged and otherwise ignored; a missing viewer never
    /// fails the run.
    pub fn open(&self, path: &Path) {
        launch(self.command(path), path);
    }
}

/// Run `cmd`, returning whether it exited successfully.
fn launch(mut cmd: Command, path: &Path) -> bool {
    match cmd.status() {
        Ok(status) if status.success() => true,
        Ok(status) => {
            warn!(path = %path.display(), %status, "file opener exited unsuccessfully");
            false
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not start file opener");
            false
        }
    }
}
