use anyhow::Result;
use std::io::Write;

use super::{close, write_banner, write_command_output, ErrorPolicy, LabContext};
use crate::connection::DeviceConnection;
use crate::models::DeviceRecord;

/// Connect to each device in turn and run every command on it.
///
/// Under [`ErrorPolicy::Abort`] the first connection or command failure is
/// returned. Under [`ErrorPolicy::Continue`] failures are reported and the
/// loop moves on.
pub async fn run_show_commands<W: Write>(
    ctx: &LabContext<'_>,
    devices: &[DeviceRecord],
    commands: &[String],
    policy: ErrorPolicy,
    out: &mut W,
) -> Result<()> {
    for device in devices {
        let name = device.display_name();
        write_banner(out, device)?;

        let mut conn = match ctx.open(device).await {
            Ok(conn) => conn,
            Err(e) if policy == ErrorPolicy::Continue => {
                tracing::warn!("Connection to {} failed: {:#}", device.ip, e);
                writeln!(out, "Error connecting to {} ({}): {:#}", name, device.ip, e)?;
                continue;
            }
            Err(e) => return Err(e.context(format!("connecting to {} ({})", name, device.ip))),
        };

        let result = run_on_session(conn.as_mut(), name, commands, policy, out).await;
        if let Err(e) = conn.disconnect().await {
            tracing::debug!("Disconnect from {} failed: {:#}", device.ip, e);
        }
        result?;
    }
    Ok(())
}

async fn run_on_session<W: Write>(
    conn: &mut dyn DeviceConnection,
    name: &str,
    commands: &[String],
    policy: ErrorPolicy,
    out: &mut W,
) -> Result<()> {
    for cmd in commands {
        match conn.send_command(cmd).await {
            Ok(output) => write_command_output(out, name, cmd, &output)?,
            Err(e) if policy == ErrorPolicy::Continue => {
                writeln!(out, "Error running '{}' on {}: {:#}", cmd, name, e)?;
            }
            Err(e) => return Err(e.context(format!("running '{}' on {}", cmd, name))),
        }
    }
    Ok(())
}

/// Inventory variant: each device gets its own `===== host - cmd =====`
/// blocks, and any failure ends that device with an `[ERROR]` line.
pub async fn run_inventory_commands<W: Write>(
    ctx: &LabContext<'_>,
    devices: &[DeviceRecord],
    commands: &[String],
    out: &mut W,
) -> Result<()> {
    for device in devices {
        let hostname = device.display_name();
        if let Err(e) = inventory_device(ctx, device, commands, out).await {
            writeln!(out, "\n[ERROR] Failed on {}: {:#}\n", hostname, e)?;
        }
    }
    Ok(())
}

async fn inventory_device<W: Write>(
    ctx: &LabContext<'_>,
    device: &DeviceRecord,
    commands: &[String],
    out: &mut W,
) -> Result<()> {
    let mut conn = ctx.open(device).await?;
    let result = async {
        for cmd in commands {
            let output = conn.send_command(cmd).await?;
            writeln!(out, "\n===== {} - {} =====\n{}\n", device.display_name(), cmd, output)?;
        }
        Ok::<_, anyhow::Error>(())
    }
    .await;
    close(conn.as_mut(), device).await;
    result
}
