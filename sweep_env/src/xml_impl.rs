//! File-backed scenario writer producing XML documents.

use crate::error::EnvError;
use crate::scenario::{ScenarioDocument, ScenarioWriter};
use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Writes scenarios as XML files on the local filesystem.
///
/// This is the writer used for real generation runs. The document layout:
///
/// ```text
/// <Scenario map="...">
///   <Settings>  <Setting key=".." value=".."/> ...
///   <Vehicles>  <Vehicle ...> <Waypoint x=".." y=".."/> ... </Vehicle> ...
/// </Scenario>
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlScenarioWriter;

impl XmlScenarioWriter {
    /// Creates a new writer.
    pub fn new() -> Self {
        Self
    }
    
    /// Renders a scenario to an XML string.
    pub fn render(scenario: &ScenarioDocument<'_>) -> Result<String, EnvError> {
        let mut out = String::new();
        Self::render_into(&mut out, scenario)
            .map_err(|e| EnvError::serialization(e.to_string()))?;
        Ok(out)
    }
    
    fn render_into(out: &mut String, scenario: &ScenarioDocument<'_>) -> std::fmt::Result {
        writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(out, r#"<Scenario map="{}">"#, escape(scenario.map_name))?;
        
        writeln!(out, "  <Settings>")?;
        for (key, value) in scenario.settings {
            writeln!(out, r#"    <Setting key="{}" value="{}"/>"#, escape(key), value)?;
        }
        writeln!(out, "  </Settings>")?;
        
        writeln!(out, r#"  <Vehicles count="{}">"#, scenario.vehicles.len())?;
        for vehicle in scenario.vehicles {
            let p = &vehicle.profile;
            writeln!(
                out,
                concat!(
                    r#"    <Vehicle length="{}" maxSpeed="{}" commDistance="{}" wait="{}""#,
                    r#" braking="{}" acceleration="{}" timeDistance="{}" politeness="{}""#,
                    r#" speedDeviation="{}" wifi="{}" emergency="{}" faking="{}""#,
                    r#" fakeMessageType="{}" color="{}">"#,
                ),
                vehicle.length,
                p.max_speed,
                p.comm_distance,
                p.wait_time,
                p.braking_rate,
                p.acceleration_rate,
                p.time_distance,
                p.politeness,
                p.speed_deviation,
                p.wifi_enabled,
                p.emergency,
                p.faking,
                escape(&vehicle.fake_message_type),
                escape(&vehicle.color),
            )?;
            for wp in &vehicle.route {
                writeln!(out, r#"      <Waypoint x="{}" y="{}"/>"#, wp.x, wp.y)?;
            }
            writeln!(out, "    </Vehicle>")?;
        }
        writeln!(out, "  </Vehicles>")?;
        writeln!(out, "</Scenario>")
    }
}

impl ScenarioWriter for XmlScenarioWriter {
    fn save(
        &self,
        path: &Path,
        scenario: &ScenarioDocument<'_>,
        overwrite: bool,
    ) -> Result<(), EnvError> {
        let xml = Self::render(scenario)?;
        
        let mut options = OpenOptions::new();
        options.write(true);
        if overwrite {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }
        
        let mut file = options.open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::AlreadyExists {
                EnvError::ArtifactExists(path.to_path_buf())
            } else {
                EnvError::io(path, e)
            }
        })?;
        file.write_all(xml.as_bytes())
            .map_err(|e| EnvError::io(path, e))?;
        
        tracing::trace!("wrote scenario {} ({} bytes)", path.display(), xml.len());
        Ok(())
    }
}

/// Escapes the five XML special characters.
fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
