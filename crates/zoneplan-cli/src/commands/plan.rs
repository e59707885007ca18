use std::path::Path;

use tracing::info;
use zoneplan::{PlacementRequest, PlacementResult, place, request_to_inputs};

pub fn plan(path: &str, format: &str) -> anyhow::Result<()> {
    let request = PlacementRequest::from_file(Path::new(path))?;
    let result = compute(&request);

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print!("{}", format_plan(&request, &result));
        }
    }

    Ok(())
}

pub fn check(path: &str) -> anyhow::Result<()> {
    let request = PlacementRequest::from_file(Path::new(path))?;
    info!(
        job = %request.job.name,
        zones = request.zones.len(),
        existing = request.existing.len(),
        "request is valid"
    );
    println!("✓ {path} is a valid placement request");
    Ok(())
}

fn compute(request: &PlacementRequest) -> PlacementResult {
    let inputs = request_to_inputs(request);
    place(&inputs.zones, inputs.desired, inputs.existing)
}

/// Human-readable plan, one line per decision.
pub fn format_plan(request: &PlacementRequest, result: &PlacementResult) -> String {
    let mut out = String::new();
    let zones = if request.zones.is_empty() {
        "unzoned".to_string()
    } else {
        request
            .zones
            .iter()
            .map(|z| z.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };

    out.push_str(&format!(
        "Placement for {} ({} desired, zones: {zones})\n",
        request.job.name, request.job.instances
    ));

    for reused in &result.reused {
        let index = match reused.new_index {
            Some(new) => format!("{} -> {new}", reused.existing.index),
            None => reused.existing.index.to_string(),
        };
        out.push_str(&format!(
            "  keep    {:<20} index {index:<8} zone {}\n",
            reused.existing.id, reused.existing.zone
        ));
    }
    for new in &result.to_create {
        out.push_str(&format!(
            "  create  {:<20} index {:<8} zone {}\n",
            "-", new.index, new.zone
        ));
    }
    for retired in &result.to_retire {
        out.push_str(&format!(
            "  retire  {:<20} index {:<8} zone {}\n",
            retired.id, retired.index, retired.zone
        ));
    }
    for warning in &result.warnings {
        out.push_str(&format!("  warning: {warning}\n"));
    }

    if result.is_converged() {
        out.push_str("✓ nothing to change\n");
    } else {
        out.push_str(&format!(
            "{} to keep, {} to create, {} to retire\n",
            result.reused.len(),
            result.to_create.len(),
            result.to_retire.len()
        ));
    }

    out
}
