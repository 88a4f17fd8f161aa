//! Batch job script emission.

use crate::error::GenerateError;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// File name of the emitted script inside the run directory.
pub const JOB_SCRIPT_NAME: &str = "jobs.sh";

/// Parameters of the batch-driver invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobScriptConfig {
    /// Runtime executable
    pub runtime: String,
    
    /// Heap limit in megabytes
    pub memory_mb: u32,
    
    /// Driver program identifier
    pub driver: String,
    
    /// Total simulated duration per scenario (ms)
    pub duration_ms: u64,
}

impl Default for JobScriptConfig {
    fn default() -> Self {
        Self {
            runtime: "java".to_string(),
            memory_mb: 2048,
            driver: "VanetSimStarter.jar".to_string(),
            duration_ms: 50_000,
        }
    }
}

impl JobScriptConfig {
    /// Renders the invocation line for one scenario.
    ///
    /// Interpolated arguments are shell-quoted when needed, so each
    /// one reaches the driver as a single literal word.
    pub fn job_line(&self, map_name: &str, scenario: &str) -> String {
        format!(
            "{} -Xmx{}m -jar {} {} {} {}",
            shell_quote(&self.runtime),
            self.memory_mb,
            shell_quote(&self.driver),
            shell_quote(map_name),
            shell_quote(scenario),
            self.duration_ms
        )
    }
    
    /// Renders the full script: shebang, then one line per scenario.
    pub fn render(&self, map_name: &str, scenarios: &[String]) -> String {
        let mut script = String::from("#!/bin/sh\n");
        for scenario in scenarios {
            let _ = writeln!(script, "{}", self.job_line(map_name, scenario));
        }
        script
    }
    
    /// Writes `jobs.sh` into `dir` and returns its path.
    pub fn write(
        &self,
        dir: &Path,
        map_name: &str,
        scenarios: &[String],
    ) -> Result<PathBuf, GenerateError> {
        let path = dir.join(JOB_SCRIPT_NAME);
        std::fs::write(&path, self.render(map_name, scenarios))
            .map_err(|e| GenerateError::io(&path, e))?;
        
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
                .map_err(|e| GenerateError::io(&path, e))?;
        }
        
        Ok(path)
    }
}

/// Quotes `word` for `/bin/sh` unless it is made only of characters the
/// shell never interprets. Embedded `'` become `'\''`.
fn shell_quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./+:,=@%".contains(c));
    if plain {
        return word.to_string();
    }
    format!("'{}'", word.replace('\'', "'\\''"))
}
