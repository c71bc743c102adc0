use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::io::{ErrorKind, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use super::{platform, Connector, DeviceConnection};
use crate::models::ConnectParams;

/// Keyboard-interactive prompt handler that always responds with the password
struct PasswordPrompt {
    password: String,
}

impl ssh2::KeyboardInteractivePrompt for PasswordPrompt {
    fn prompt<'a>(
        &mut self,
        _username: &str,
        _instructions: &str,
        prompts: &[ssh2::Prompt<'a>],
    ) -> Vec<String> {
        prompts.iter().map(|_| self.password.clone()).collect()
    }
}

/// libssh2 takes a millisecond timeout as u32; clamp rather than wrap
fn session_timeout_ms(secs: u64) -> u32 {
    u32::try_from(secs).unwrap_or(u32::MAX).saturating_mul(1000)
}

/// Create an SSH session and authenticate with password + keyboard-interactive.
/// This is blocking, so call from a spawn_blocking context.
pub fn ssh_connect(params: &ConnectParams) -> Result<ssh2::Session, String> {
    let addr = (params.host.as_str(), params.port)
        .to_socket_addrs()
        .map_err(|e| format!("Invalid address {}:{}: {}", params.host, params.port, e))?
        .next()
        .ok_or_else(|| format!("No address found for {}", params.host))?;

    let timeout = Duration::from_secs(params.timeout_secs);
    let tcp = TcpStream::connect_timeout(&addr, timeout)
        .map_err(|e| format!("TCP connection failed: {}", e))?;

    tcp.set_read_timeout(Some(timeout)).ok();
    tcp.set_write_timeout(Some(timeout)).ok();

    let mut session = ssh2::Session::new()
        .map_err(|e| format!("Failed to create SSH session: {}", e))?;
    session.set_tcp_stream(tcp);
    session.set_timeout(session_timeout_ms(params.timeout_secs));
    session.handshake()
        .map_err(|e| format!("SSH handshake failed: {}", e))?;

    // Try password auth first
    match session.userauth_password(&params.username, &params.password) {
        Ok(_) if session.authenticated() => return Ok(session),
        _ => {}
    }

    // Keyboard-interactive covers IOS-XE AAA and Arista EOS
    let mut prompter = PasswordPrompt { password: params.password.clone() };
    let _ = session.userauth_keyboard_interactive(&params.username, &mut prompter);

    if session.authenticated() {
        Ok(session)
    } else {
        Err("SSH authentication failed: all methods exhausted".to_string())
    }
}

/// Run a single command on an exec channel, returning its output.
/// This is blocking, so call from a spawn_blocking context.
pub fn ssh_exec(session: &ssh2::Session, command: &str) -> Result<String, String> {
    let mut channel = session.channel_session()
        .map_err(|e| format!("Failed to open channel: {}", e))?;

    channel.exec(command)
        .map_err(|e| format!("Failed to execute command: {}", e))?;

    let mut output = String::new();
    channel.read_to_string(&mut output)
        .map_err(|e| format!("Failed to read output: {}", e))?;

    channel.wait_close()
        .map_err(|e| format!("Failed to close channel: {}", e))?;

    Ok(output)
}

/// Feed lines to an interactive shell on a PTY and collect everything echoed back.
/// Reading stops at end of stream or when the session timeout elapses.
/// This is blocking, so call from a spawn_blocking context.
pub fn ssh_shell_send(session: &ssh2::Session, lines: &[String]) -> Result<String, String> {
    let mut channel = session.channel_session()
        .map_err(|e| format!("Failed to open channel: {}", e))?;
    channel.request_pty("vt100", None, Some((200, 24, 0, 0)))
        .map_err(|e| format!("Failed to request PTY: {}", e))?;
    channel.shell()
        .map_err(|e| format!("Failed to start shell: {}", e))?;

    for line in lines {
        channel.write_all(format!("{}\n", line).as_bytes())
            .map_err(|e| format!("Failed to send '{}': {}", line, e))?;
    }
    channel.flush().ok();

    let mut output = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        match channel.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => output.extend_from_slice(&buf[..n]),
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => break,
            Err(e) => return Err(format!("Failed to read output: {}", e)),
        }
    }
    let _ = channel.wait_close();

    Ok(String::from_utf8_lossy(&output).replace("\r\n", "\n"))
}

/// Opens password-authenticated SSH sessions
#[derive(Debug, Clone, Default)]
pub struct SshConnector;

#[async_trait]
impl Connector for SshConnector {
    async fn connect(&self, params: &ConnectParams) -> Result<Box<dyn DeviceConnection>> {
        let owned = params.clone();
        let session = tokio::task::spawn_blocking(move || ssh_connect(&owned))
            .await
            .map_err(|e| anyhow!("Task join error: {}", e))?
            .map_err(|e| anyhow!(e))?;

        tracing::debug!("SSH session established to {}:{} as {}", params.host, params.port, params.username);
        Ok(Box::new(SshConnection {
            session,
            device_type: params.device_type.clone(),
            host: params.host.clone(),
        }))
    }
}

/// An authenticated session to one device
pub struct SshConnection {
    session: ssh2::Session,
    device_type: String,
    host: String,
}

impl SshConnection {
    /// Run a blocking closure against the session on the blocking pool
    async fn with_session<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&ssh2::Session) -> Result<T, String> + Send + 'static,
    {
        let session = self.session.clone();
        tokio::task::spawn_blocking(move || f(&session))
            .await
            .map_err(|e| anyhow!("Task join error: {}", e))?
            .map_err(|e| anyhow!(e))
    }
}

#[async_trait]
impl DeviceConnection for SshConnection {
    async fn send_command(&mut self, command: &str) -> Result<String> {
        tracing::debug!("{}: {}", self.host, command);
        let command = command.to_string();
        self.with_session(move |s| ssh_exec(s, &command)).await
    }

    async fn send_config_set(&mut self, lines: &[String]) -> Result<String> {
        tracing::debug!("{}: pushing {} config lines", self.host, lines.len());
        let script = platform::config_session_script(&self.device_type, lines);
        self.with_session(move |s| ssh_shell_send(s, &script)).await
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.with_session(|s| {
            s.disconnect(None, "closing session", None)
                .map_err(|e| format!("Failed to disconnect: {}", e))
        })
        .await
    }
}
