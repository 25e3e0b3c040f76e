//! plan command - preview the part layout for an object size

use super::CommandContext;
use crate::utils::{format_bytes, parse_size};
use anyhow::Result;
use colored::Colorize;
use s3shift_core::types::PartPlan;
use s3shift_transfer::{ChunkPlanner, ChunkPolicy};
use serde_json::json;
use std::process::ExitCode;

pub fn execute(ctx: &CommandContext, size: &str) -> Result<ExitCode> {
    let size = parse_size(size)?;
    let planner = ChunkPlanner::new(ChunkPolicy::from(&ctx.config.transfer));
    let plan = planner.plan(size)?;

    if ctx.is_json() {
        println!("{}", serde_json::to_string_pretty(&plan_report(&plan))?);
    } else {
        print_plan(&plan);
    }

    Ok(ExitCode::SUCCESS)
}

fn plan_report(plan: &PartPlan) -> serde_json::Value {
    let strategy = if plan.is_empty() {
        "none"
    } else if plan.is_single_part() {
        "single_shot"
    } else {
        "multipart"
    };
    json!({
        "total_size": plan.total_size,
        "chunk_size": plan.chunk_size,
        "strategy": strategy,
        "parts": plan.iter().map(|p| json!({
            "part_number": p.part_number,
            "range": p.copy_source_range(),
            "length": p.len(),
        })).collect::<Vec<_>>(),
    })
}

fn print_plan(plan: &PartPlan) {
    println!(
        "{} {} ({} bytes), chunk size {}",
        "Object".bold(),
        format_bytes(plan.total_size),
        plan.total_size,
        format_bytes(plan.chunk_size)
    );

    if plan.is_empty() {
        println!("No data, nothing would be copied");
        return;
    }
    if plan.is_single_part() {
        println!("Fits in one chunk, copied with a single request");
        return;
    }

    println!("{} parts:", plan.len());
    for part in plan.iter() {
        println!(
            "  {:>5}  {:<32} {}",
            part.part_number.to_string().cyan(),
            part.copy_source_range(),
            format_bytes(part.len())
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_report() {
        let plan = ChunkPlanner::default().plan(12 * 1024 * 1024).unwrap();
        let report = plan_report(&plan);

        assert_eq!(report["strategy"], "multipart");
        assert_eq!(report["chunk_size"], 5 * 1024 * 1024);
        let parts = report["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0]["range"], "bytes=0-5242879");
        assert_eq!(parts[2]["length"], 2 * 1024 * 1024);
    }

    #[test]
    fn test_plan_report_strategies() {
        let planner = ChunkPlanner::default();
        assert_eq!(plan_report(&planner.plan(0).unwrap())["strategy"], "none");
        assert_eq!(
            plan_report(&planner.plan(3_000_000).unwrap())["strategy"],
            "single_shot"
        );
    }
}
