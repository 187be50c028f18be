//! Scene player: a separate mpv window playing the scene URL.
//!
//! It is fire-and-forget. No IPC, no observation; the only control is
//! spawning it and killing it.

use std::path::PathBuf;

use async_trait::async_trait;
use calm_engine::platform;
use calm_engine::{EmbedError, EmbedHost, Scene};
use tracing::{info, warn};

pub struct ExternalPlayer {
    binary: Option<PathBuf>,
    args: Vec<String>,
    child: Option<tokio::process::Child>,
}

impl ExternalPlayer {
    pub fn new(binary: Option<PathBuf>, args: Vec<String>) -> Self {
        Self {
            binary,
            args,
            child: None,
        }
    }

    fn command(&self, scene: &Scene) -> Result<tokio::process::Command, EmbedError> {
        let binary = self
            .binary
            .clone()
            .filter(|p| p.exists())
            .or_else(platform::find_mpv_binary)
            .ok_or(EmbedError::BinaryNotFound)?;

        let mut cmd = tokio::process::Command::new(binary);
        cmd.arg("--force-window=yes")
            .arg("--keep-open=yes")
            .arg(format!("--title={} · calmspace", scene.track.title))
            .args(&self.args)
            .arg(scene.url())
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true);
        Ok(cmd)
    }
}

#[async_trait]
impl EmbedHost for ExternalPlayer {
    async fn mount(&mut self, scene: &Scene) -> Result<(), EmbedError> {
        self.unmount().await;
        let child = self.command(scene)?.spawn()?;
        info!("embed: launched '{}' (pid {:?})", scene.track.title, child.id());
        self.child = Some(child);
        Ok(())
    }

    async fn unmount(&mut self) {
        if let Some(mut child) = self.child.take() {
            match child.kill().await {
                Ok(()) => info!("embed: player closed"),
                Err(e) => warn!("embed: failed to kill player: {}", e),
            }
        }
    }

    fn is_mounted(&mut self) -> bool {
        let Some(child) = self.child.as_mut() else {
            return false;
        };
        match child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                info!("embed: player window closed ({})", status);
                self.child = None;
                false
            }
            Err(e) => {
                warn!("embed: status check failed: {}", e);
                self.child = None;
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_passes_scene_url_last() {
        let exe = std::env::current_exe().unwrap();
        let player = ExternalPlayer::new(Some(exe.clone()), vec!["--mute=no".into()]);
        let scene = Scene::default();
        let cmd = player.command(&scene).unwrap();

        assert_eq!(cmd.as_std().get_program(), exe.as_os_str());
        let args: Vec<String> = cmd
            .as_std()
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args.last().map(String::as_str), Some(scene.url()));
        assert!(args.contains(&"--mute=no".to_string()));
        assert!(args.contains(&"--force-window=yes".to_string()));
    }

    #[tokio::test]
    async fn test_unmount_without_mount_is_noop() {
        let mut player = ExternalPlayer::new(None, Vec::new());
        player.unmount().await;
        assert!(!player.is_mounted());
    }
}
