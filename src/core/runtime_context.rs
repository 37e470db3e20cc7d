//! Host and process snapshot attached to entries

use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeContext {
    pub hostname: String,
    pub pid: u32,
    /// Resident set size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heap_used: Option<u64>,
    /// Virtual memory size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heap_total: Option<u64>,
}

impl RuntimeContext {
    /// Take a snapshot of the current process
    ///
    /// Memory figures are read from `/proc/self/status` and left out on
    /// platforms without it.
    pub fn snapshot() -> Self {
        let (heap_used, heap_total) = memory_usage();
        Self {
            hostname: hostname(),
            pid: std::process::id(),
            heap_used,
            heap_total,
        }
    }
}

fn hostname() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .or_else(|| fs::read_to_string("/etc/hostname").ok())
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn memory_usage() -> (Option<u64>, Option<u64>) {
    match fs::read_to_string("/proc/self/status") {
        Ok(status) => parse_status(&status),
        Err(_) => (None, None),
    }
}

/// Extract `VmRSS` and `VmSize` (reported in kB) as bytes
fn parse_status(status: &str) -> (Option<u64>, Option<u64>) {
    let field = |name: &str| {
        status
            .lines()
            .find_map(|line| line.strip_prefix(name))
            .and_then(|rest| rest.trim().trim_end_matches("kB").trim().parse::<u64>().ok())
            .map(|kb| kb * 1024)
    };
    (field("VmRSS:"), field("VmSize:"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_has_process_id() {
        let ctx = RuntimeContext::snapshot();
        assert_eq!(ctx.pid, std::process::id());
        assert!(!ctx.hostname.is_empty());
    }

    #[test]
    fn test_parse_status() {
        let status = "Name:\tapi\nVmSize:\t  204800 kB\nVmRSS:\t   10240 kB\nThreads:\t4\n";
        assert_eq!(parse_status(status), (Some(10240 * 1024), Some(204800 * 1024)));
    }

    #[test]
    fn test_parse_status_missing_fields() {
        assert_eq!(parse_status("Name:\tapi\n"), (None, None));
    }
}
