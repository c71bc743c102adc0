use anyhow::{anyhow, Context, Result};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::{close, write_banner, write_command_output, LabContext};
use crate::connection::DeviceConnection;
use crate::models::DeviceRecord;

/// Decides which devices receive a config push
#[derive(Debug, Clone)]
pub struct PushTargets {
    enabled: bool,
    all: bool,
    none: bool,
    targets: HashSet<String>,
}

impl PushTargets {
    /// `spec` is a comma-separated list of hostnames/IPs, or `all` / `none`
    pub fn new(enabled: bool, spec: &str) -> Self {
        let targets: HashSet<String> = spec
            .split(',')
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        let whole = spec.trim().to_lowercase();
        Self {
            enabled,
            all: enabled && whole == "all",
            none: !enabled || whole == "none" || targets.is_empty(),
            targets,
        }
    }

    pub fn should_push(&self, device: &DeviceRecord) -> bool {
        self.enabled
            && (self.all
                || (!self.none
                    && (self.targets.contains(&device.display_name().to_lowercase())
                        || self.targets.contains(&device.ip.to_lowercase()))))
    }
}

/// Config destined for the two lab routers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushPlan {
    /// Lines pushed to the first router
    pub r51_config: Vec<String>,
    /// File pushed to the second router
    pub r52_config_file: Option<PathBuf>,
}

impl PushPlan {
    pub fn defaults(r52_config_file: PathBuf) -> Self {
        Self {
            r51_config: vec![
                "router eigrp 100".to_string(),
                "network 10.0.0.0 0.0.0.255".to_string(),
            ],
            r52_config_file: Some(r52_config_file),
        }
    }

    /// Replace the R52 file when an override is given. An empty override is ignored.
    pub fn with_r52_override(mut self, path: Option<&str>) -> Self {
        if let Some(p) = path.filter(|p| !p.trim().is_empty()) {
            self.r52_config_file = Some(PathBuf::from(p));
        }
        self
    }
}

/// Load `{"r51_config": [...], "r52_config_file": "..."}` over the defaults.
/// Read or parse errors are reported on stdout and yield the defaults.
pub fn load_push_plan(path: &Path, default_r52_file: PathBuf) -> PushPlan {
    let defaults = PushPlan::defaults(default_r52_file);
    let parsed = std::fs::read_to_string(path)
        .context("could not read file")
        .and_then(|raw| Ok(serde_json::from_str::<Value>(&raw)?))
        .and_then(|data| {
            data.as_object()
                .cloned()
                .ok_or_else(|| anyhow!("expected a JSON object at the top level"))
        });

    match parsed {
        Ok(data) => merge_push_plan(defaults, &data),
        Err(e) => {
            println!("Error reading lab3 config JSON {}: {}", path.display(), e);
            defaults
        }
    }
}

/// Shallow merge: a key present in `data` replaces the default outright
pub fn merge_push_plan(defaults: PushPlan, data: &Map<String, Value>) -> PushPlan {
    let r51_config = match data.get("r51_config") {
        None => defaults.r51_config,
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        Some(Value::Null) => Vec::new(),
        Some(other) => {
            tracing::warn!("Ignoring r51_config that is not a list: {}", other);
            Vec::new()
        }
    };
    let r52_config_file = match data.get("r52_config_file") {
        None => defaults.r52_config_file,
        Some(Value::String(s)) if !s.trim().is_empty() => Some(PathBuf::from(s)),
        Some(_) => None,
    };
    PushPlan {
        r51_config,
        r52_config_file,
    }
}

/// Lab 3 needs R51 and R52; says so on `out` and returns false otherwise
pub fn check_router_pair<W: Write>(devices: &[DeviceRecord], out: &mut W) -> Result<bool> {
    if devices.len() < 2 {
        writeln!(out, "Need at least two device entries; check the CSV.")?;
        return Ok(false);
    }
    Ok(true)
}

/// Lab 3: push the config set to the first device and the config file to the
/// second, running the selected show commands on both.
pub async fn run_config_changes<W: Write>(
    ctx: &LabContext<'_>,
    devices: &[DeviceRecord],
    commands: &[String],
    plan: &PushPlan,
    targets: &PushTargets,
    out: &mut W,
) -> Result<()> {
    if !check_router_pair(devices, out)? {
        return Ok(());
    }
    if plan.r51_config.is_empty() {
        writeln!(out, "No R51 config provided; nothing to push to R51.")?;
    }
    if plan.r52_config_file.is_none() {
        writeln!(out, "No R52 config file provided; skipping R52 config push.")?;
    }

    let r51 = &devices[0];
    write_banner(out, r51)?;
    let mut conn = ctx.open(r51).await?;
    let result = push_r51(conn.as_mut(), r51, commands, plan, targets, out).await;
    close(conn.as_mut(), r51).await;
    result?;

    let Some(cfg_path) = plan.r52_config_file.as_deref() else {
        writeln!(out, "Skipping R52: missing device entry or config file.")?;
        return Ok(());
    };

    let r52 = &devices[1];
    write_banner(out, r52)?;
    let push_r52 = targets.should_push(r52);
    if push_r52 && !cfg_path.exists() {
        writeln!(out, "Config file not found: {}", cfg_path.display())?;
        return Ok(());
    }

    let mut conn = ctx.open(r52).await?;
    let result = async {
        if push_r52 {
            let output = conn.send_config_from_file(cfg_path).await?;
            writeln!(out, "\n>>> Sending config to R52 (from file)...")?;
            writeln!(out, "{}", output)?;
        }
        for cmd in commands {
            let output = conn.send_command(cmd).await?;
            write_command_output(out, r52.display_name(), cmd, &output)?;
        }
        Ok::<_, anyhow::Error>(())
    }
    .await;
    close(conn.as_mut(), r52).await;
    result
}

async fn push_r51<W: Write>(
    conn: &mut dyn DeviceConnection,
    r51: &DeviceRecord,
    commands: &[String],
    plan: &PushPlan,
    targets: &PushTargets,
    out: &mut W,
) -> Result<()> {
    if targets.should_push(r51) {
        if plan.r51_config.is_empty() {
            writeln!(out, "Push-config requested but no R51 config provided.")?;
        } else {
            let output = conn.send_config_set(&plan.r51_config).await?;
            writeln!(out, "\n>>> Sending config to R51...")?;
            writeln!(out, "{}", output)?;
        }
    }
    for cmd in commands {
        let output = conn.send_command(cmd).await?;
        write_command_output(out, r51.display_name(), cmd, &output)?;
    }
    Ok(())
}

/// EIGRP walkthrough: config lines to the first router, a config file to the second
pub async fn run_eigrp_push<W: Write>(
    ctx: &LabContext<'_>,
    r51: &DeviceRecord,
    r52: &DeviceRecord,
    r51_config: &[String],
    r52_config_file: &Path,
    out: &mut W,
) -> Result<()> {
    write_banner(out, r51)?;
    let mut conn = ctx.open(r51).await?;
    writeln!(out, "\n>>> Sending EIGRP config to R51...")?;
    let result = conn.send_config_set(r51_config).await;
    close(conn.as_mut(), r51).await;
    writeln!(out, "{}", result?)?;

    write_banner(out, r52)?;
    let mut conn = ctx.open(r52).await?;
    writeln!(out, "\n>>> Sending EIGRP config to R52 from file...")?;
    let result = conn.send_config_from_file(r52_config_file).await;
    close(conn.as_mut(), r52).await;
    writeln!(out, "{}", result?)?;
    Ok(())
}

/// The R51 lines for an EIGRP autonomous system advertising `network`
pub fn eigrp_config(as_number: u32, network: &str) -> Vec<String> {
    vec![format!("router eigrp {}", as_number), format!("network {}", network)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::mock::MockConnector;
    use crate::labs::testing::{context, text, two_routers};
    use serde_json::json;
    use std::io::Write as _;

    fn r52_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "router eigrp 100\n\n network 10.0.0.0 0.0.0.255").unwrap();
        file
    }

    #[test]
    fn test_push_targets_all_none_and_lists() {
        let (r51, r52) = {
            let d = two_routers();
            (d[0].clone(), d[1].clone())
        };

        let all = PushTargets::new(true, " ALL ");
        assert!(all.should_push(&r51) && all.should_push(&r52));

        let disabled = PushTargets::new(false, "all");
        assert!(!disabled.should_push(&r51));

        let none = PushTargets::new(true, "none");
        assert!(!none.should_push(&r51));

        let empty = PushTargets::new(true, " , ");
        assert!(!empty.should_push(&r51));

        let listed = PushTargets::new(true, "c8k-r51, 10.0.0.99");
        assert!(listed.should_push(&r51));
        assert!(!listed.should_push(&r52));

        let by_ip = PushTargets::new(true, "10.0.0.52");
        assert!(by_ip.should_push(&r52));

        // "all" only counts when it is the whole list
        let mixed = PushTargets::new(true, "all,c8k-r52");
        assert!(!mixed.should_push(&r51));
        assert!(mixed.should_push(&r52));
    }

    #[test]
    fn test_merge_push_plan_is_shallow() {
        let defaults = PushPlan::defaults(PathBuf::from("data/lab3-r52_eigrp.cfg"));

        let merged = merge_push_plan(defaults.clone(), json!({"r51_config": ["router ospf 1", 7]}).as_object().unwrap());
        assert_eq!(merged.r51_config, vec!["router ospf 1"]);
        assert_eq!(merged.r52_config_file, defaults.r52_config_file);

        let cleared = merge_push_plan(defaults.clone(), json!({"r51_config": null, "r52_config_file": ""}).as_object().unwrap());
        assert!(cleared.r51_config.is_empty());
        assert!(cleared.r52_config_file.is_none());

        let missing = load_push_plan(Path::new("/nonexistent/lab3-config.json"), PathBuf::from("x.cfg"));
        assert_eq!(missing, PushPlan::defaults(PathBuf::from("x.cfg")));
    }

    #[test]
    fn test_r52_override() {
        let plan = PushPlan::defaults(PathBuf::from("a.cfg"));
        assert_eq!(plan.clone().with_r52_override(Some("")).r52_config_file, Some(PathBuf::from("a.cfg")));
        assert_eq!(plan.with_r52_override(Some("b.cfg")).r52_config_file, Some(PathBuf::from("b.cfg")));
    }

    #[tokio::test]
    async fn test_config_changes_push_to_selected_targets() {
        let file = r52_file();
        let plan = PushPlan::defaults(file.path().to_path_buf());
        let mock = MockConnector::new();
        let mut out = Vec::new();
        let commands = vec!["show ip eigrp neighbors".to_string()];

        run_config_changes(&context(&mock), &two_routers(), &commands, &plan, &PushTargets::new(true, "all"), &mut out)
            .await
            .unwrap();

        assert_eq!(
            mock.events(),
            vec![
                "connect 10.0.0.51 as admin",
                "10.0.0.51: config [router eigrp 100; network 10.0.0.0 0.0.0.255]",
                "10.0.0.51: show ip eigrp neighbors",
                "disconnect 10.0.0.51",
                "connect 10.0.0.52 as admin",
                "10.0.0.52: config [router eigrp 100;  network 10.0.0.0 0.0.0.255]",
                "10.0.0.52: show ip eigrp neighbors",
                "disconnect 10.0.0.52",
            ]
        );
        let report = text(out);
        assert!(report.contains(">>> Sending config to R51..."));
        assert!(report.contains(">>> Sending config to R52 (from file)..."));
    }

    #[tokio::test]
    async fn test_config_changes_without_push_only_shows() {
        let file = r52_file();
        let plan = PushPlan::defaults(file.path().to_path_buf());
        let mock = MockConnector::new();
        let mut out = Vec::new();

        run_config_changes(&context(&mock), &two_routers(), &["show version".to_string()], &plan, &PushTargets::new(false, "all"), &mut out)
            .await
            .unwrap();

        assert!(mock.events().iter().all(|e| !e.contains("config [")));
        assert_eq!(mock.events().len(), 6);
    }

    #[tokio::test]
    async fn test_config_changes_needs_two_devices() {
        let mock = MockConnector::new();
        let mut out = Vec::new();
        let plan = PushPlan::defaults(PathBuf::from("unused.cfg"));
        run_config_changes(&context(&mock), &two_routers()[..1], &[], &plan, &PushTargets::new(true, "all"), &mut out)
            .await
            .unwrap();
        assert_eq!(text(out), "Need at least two device entries; check the CSV.\n");
        assert!(mock.events().is_empty());
    }

    #[test]
    fn test_check_router_pair() {
        let mut out = Vec::new();
        assert!(!check_router_pair(&two_routers()[..1], &mut out).unwrap());
        assert_eq!(text(out), "Need at least two device entries; check the CSV.\n");

        let mut out = Vec::new();
        assert!(check_router_pair(&two_routers(), &mut out).unwrap());
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_config_changes_missing_r52_file_stops_run() {
        let mock = MockConnector::new();
        let mut out = Vec::new();
        let plan = PushPlan::defaults(PathBuf::from("/nonexistent/r52.cfg"));
        run_config_changes(&context(&mock), &two_routers(), &[], &plan, &PushTargets::new(true, "c8k-r52"), &mut out)
            .await
            .unwrap();

        let report = text(out);
        assert!(report.contains("Config file not found: /nonexistent/r52.cfg"));
        assert!(!mock.events().iter().any(|e| e.contains("10.0.0.52")));
    }

    #[tokio::test]
    async fn test_config_changes_skips_r52_without_file() {
        let mock = MockConnector::new();
        let mut out = Vec::new();
        let plan = PushPlan {
            r51_config: vec![],
            r52_config_file: None,
        };
        run_config_changes(&context(&mock), &two_routers(), &[], &plan, &PushTargets::new(true, "all"), &mut out)
            .await
            .unwrap();

        let report = text(out);
        assert!(report.starts_with("No R51 config provided; nothing to push to R51.\nNo R52 config file provided"));
        assert!(report.contains("Push-config requested but no R51 config provided."));
        assert!(report.ends_with("Skipping R52: missing device entry or config file.\n"));
    }

    #[tokio::test]
    async fn test_eigrp_push() {
        let file = r52_file();
        let mock = MockConnector::new();
        let mut out = Vec::new();
        let routers = two_routers();
        run_eigrp_push(&context(&mock), &routers[0], &routers[1], &eigrp_config(100, "10.0.0.0 0.0.0.255"), file.path(), &mut out)
            .await
            .unwrap();

        assert_eq!(mock.events()[1], "10.0.0.51: config [router eigrp 100; network 10.0.0.0 0.0.0.255]");
        assert!(text(out).contains(">>> Sending EIGRP config to R52 from file..."));
    }
}
