//! Plain-text system clipboard access via the platform utilities.
//!
//! Tries `xclip` first, then the Wayland tools.  Failures are reported to
//! the caller as errors; the app surfaces them as a transient notice and
//! never propagates them further.

use anyhow::{anyhow, Context};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

pub async fn read_clipboard_text() -> anyhow::Result<String> {
    let try1 = Command::new("xclip")
        .args(["-selection", "clipboard", "-o", "-t", "text/plain"])
        .output()
        .await;

    let out = match try1 {
        Ok(o) if o.status.success() => o.stdout,
        _ => {
            let o2 = Command::new("wl-paste")
                .arg("--no-newline")
                .output()
                .await
                .context("neither xclip nor wl-paste could read the clipboard")?;
            if !o2.status.success() {
                return Err(anyhow!("wl-paste returned non-zero status"));
            }
            o2.stdout
        }
    };

    Ok(String::from_utf8_lossy(&out).to_string())
}

pub async fn write_clipboard_text(s: &str) -> anyhow::Result<()> {
    if pipe_to("xclip", &["-selection", "clipboard", "-i", "-t", "text/plain"], s)
        .await
        .is_ok()
    {
        return Ok(());
    }
    pipe_to("wl-copy", &[], s)
        .await
        .context("neither xclip nor wl-copy could write the clipboard")
}

async fn pipe_to(program: &str, args: &[&str], input: &str) -> anyhow::Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(std::process::Stdio::piped())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .with_context(|| format!("spawning {program}"))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(input.as_bytes()).await?;
    }
    let status = child.wait().await?;
    if !status.success() {
        return Err(anyhow!("{program} returned non-zero status"));
    }
    Ok(())
}
