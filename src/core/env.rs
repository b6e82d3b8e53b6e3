//! Benchmark setup attached to JSON summaries: which normalizer commands
//! produced the results, which `ltlfilt` judged equivalence, and the machine
//! the timings come from.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bench::config::ImplementationSpec;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentInfo {
    /// `ltlnorm_bench` version that wrote the document
    pub harness_version: String,
    /// Implementation name to the command line it was run with
    pub implementations: BTreeMap<String, String>,
    /// First line of `ltlfilt --version`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ltlfilt_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine: Option<MachineInfo>,
}

/// Where the timings were measured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineInfo {
    pub os: String,
    pub cpu: Option<String>,
    pub logical_cpus: usize,
    pub memory_bytes: u64,
}

impl EnvironmentInfo {
    /// Command lines of the implementations named in `used`, looked up in
    /// `table`. Names missing from the table are recorded without a command.
    pub fn for_implementations<'a>(
        table: &[ImplementationSpec],
        used: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let implementations = used
            .into_iter()
            .map(|name| {
                let command = table
                    .iter()
                    .find(|spec| spec.name == name)
                    .map(ImplementationSpec::command_line)
                    .unwrap_or_default();
                (name.to_string(), command)
            })
            .collect();
        EnvironmentInfo {
            harness_version: env!("CARGO_PKG_VERSION").to_string(),
            implementations,
            ltlfilt_version: None,
            machine: None,
        }
    }

    pub fn with_ltlfilt(mut self, program: &Path) -> Self {
        self.ltlfilt_version = tool_version(program);
        self
    }

    pub fn with_machine(mut self) -> Self {
        self.machine = Some(MachineInfo::detect());
        self
    }
}

impl MachineInfo {
    pub fn detect() -> Self {
        use sysinfo::System;

        let mut sys = System::new();
        sys.refresh_cpu();
        sys.refresh_memory();

        MachineInfo {
            os: System::long_os_version().unwrap_or_else(|| std::env::consts::OS.to_string()),
            cpu: sys
                .cpus()
                .first()
                .map(|c| c.brand().trim().to_string())
                .filter(|b| !b.is_empty()),
            logical_cpus: sys.cpus().len(),
            memory_bytes: sys.total_memory(),
        }
    }
}

/// First non-empty line printed by `program --version`, if it runs and
/// succeeds.
pub fn tool_version(program: &Path) -> Option<String> {
    let output = match Command::new(program)
        .arg("--version")
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
    {
        Ok(output) => output,
        Err(e) => {
            debug!(program = %program.display(), "no version: {e}");
            return None;
        }
    };
    if !output.status.success() {
        return None;
    }
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
}
