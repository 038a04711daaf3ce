//! Star force plan report CLI.
//!
//! Loads the saved roster, prices every pending item of one character in a
//! single cost engine round trip, and prints per-item projections plus the
//! character-wide rollup.
//!
//! Usage:
//!   cargo run --bin plan -- [OPTIONS]
//!
//! Examples:
//!   cargo run --bin plan                                # Active character
//!   cargo run --bin plan -- -c Alpha --sort cost:desc   # Named character, sorted
//!   cargo run --bin plan -- --thirty-off --json         # Event pricing, JSON output

use starforce_planner::calculation::{
    CalculationAggregator, CalculationInputs, CalculationReport, CalculationState,
    GlobalModifiers, SortDirection, SortField, SortSpec,
};
use starforce_planner::character::load_roster;
use starforce_planner::config::PlannerConfig;
use starforce_planner::engine::HttpCostEngine;
use starforce_planner::format::{format_booms, format_mesos};
use starforce_planner::luck::{describe_luck_percentage, luck_percentage};
use std::env;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

struct Options {
    config: PlannerConfig,
    character: Option<String>,
    modifiers: GlobalModifiers,
    sort: Option<SortSpec>,
    json: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let options = parse_args(&args);

    if let Err(message) = run(options) {
        eprintln!("error: {}", message);
        process::exit(1);
    }
}

fn run(options: Options) -> Result<(), String> {
    let roster_path = options.config.roster_path();
    let roster = load_roster(&roster_path).map_err(|e| e.to_string())?;

    let character = match &options.character {
        Some(name) => roster
            .character_by_name(name)
            .ok_or_else(|| format!("No character named {}", name))?,
        None => roster
            .active()
            .ok_or_else(|| format!("No active character in {}", roster_path.display()))?,
    };

    let inputs = CalculationInputs::for_character(character).with_modifiers(options.modifiers);
    let engine = HttpCostEngine::new(&options.config.engine);
    let mut aggregator = CalculationAggregator::new();
    aggregator.set_sort(options.sort);

    match aggregator.recalculate(&inputs, &engine) {
        CalculationState::Failed { message } => return Err(message.clone()),
        CalculationState::Idle => {
            println!("{} has nothing left to star force.", character.name);
            return Ok(());
        }
        _ => {}
    }

    let report = aggregator
        .report()
        .ok_or_else(|| "Calculation finished without a report".to_string())?;

    if options.json {
        let json = serde_json::to_string_pretty(report).map_err(|e| e.to_string())?;
        println!("{}", json);
    } else {
        print_report(&character.name, report);
    }
    Ok(())
}

fn print_report(character_name: &str, report: &CalculationReport) {
    println!("Star force plan for {}", character_name);
    println!();
    println!(
        "{:<24} {:>5} {:>7} {:>10} {:>10} {:>10} {:>7} {:<14} {:>8}",
        "Item", "Level", "Stars", "Average", "Median", "P75", "Booms", "Spares", "Luck"
    );
    for calc in &report.calculations {
        let eq = &calc.equipment;
        let marker = if calc.included { "" } else { " (excluded)" };
        let luck = calc
            .luck
            .map(|l| format!("{:+.0}%", l.luck_percentage))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<24} {:>5} {:>7} {:>10} {:>10} {:>10} {:>7} {:<14} {:>8}",
            format!("{}{}", eq.name, marker),
            eq.level,
            format!("{}>{}", eq.current_star_force, eq.target_star_force),
            format_mesos(calc.average_cost),
            format_mesos(calc.median_cost),
            format_mesos(calc.p75_cost),
            format_booms(calc.average_booms),
            format!("{} ({})", calc.spare_count, calc.spare_status.label()),
            luck,
        );
    }

    let stats = &report.stats;
    println!();
    println!(
        "Included items:   {}/{}",
        stats.included_count, stats.total_count
    );
    println!(
        "Expected cost:    {} (median {}, p75 {})",
        format_mesos(stats.total_expected_cost),
        format_mesos(stats.total_median_cost),
        format_mesos(stats.total_p75_cost)
    );
    println!(
        "Expected booms:   {} (median {}, p75 {})",
        format_booms(stats.total_expected_booms),
        format_booms(stats.total_median_booms),
        format_booms(stats.total_p75_booms)
    );
    if stats.total_actual_cost > 0.0 {
        println!(
            "Actual spend:     {} ({:+.1}% vs expected)",
            format_mesos(stats.total_actual_cost),
            stats.overall_luck_percentage
        );
    }
    if let Some(luck) = stats.overall_luck {
        println!(
            "Overall luck:     {:.0}th percentile, {} ({} items)",
            luck.percentile,
            luck.rating.label(),
            luck.items_considered
        );
        println!(
            "                  {}",
            describe_luck_percentage(luck_percentage(luck.percentile))
        );
    }
}

fn parse_sort(value: &str) -> Option<SortSpec> {
    let (field, direction) = match value.split_once(':') {
        Some((field, dir)) => (field, dir),
        None => (value, "asc"),
    };
    let field = SortField::parse(field)?;
    let direction = match direction.to_ascii_lowercase().as_str() {
        "desc" => SortDirection::Desc,
        _ => SortDirection::Asc,
    };
    Some(SortSpec { field, direction })
}

fn parse_args(args: &[String]) -> Options {
    let mut options = Options {
        config: PlannerConfig::from_env(),
        character: None,
        modifiers: GlobalModifiers::default(),
        sort: None,
        json: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-d" | "--data-dir" => {
                if i + 1 < args.len() {
                    options.config.data_dir = PathBuf::from(&args[i + 1]);
                    i += 1;
                }
            }
            "-c" | "--character" => {
                if i + 1 < args.len() {
                    options.character = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "-e" | "--engine-url" => {
                if i + 1 < args.len() {
                    options.config.engine.base_url = args[i + 1].clone();
                    i += 1;
                }
            }
            "-s" | "--sort" => {
                if i + 1 < args.len() {
                    options.sort = parse_sort(&args[i + 1]);
                    i += 1;
                }
            }
            "--mvp" => {
                if i + 1 < args.len() {
                    options.modifiers.events.mvp_discount = args[i + 1].parse().unwrap_or(0.0);
                    i += 1;
                }
            }
            "--thirty-off" => options.modifiers.events.thirty_off = true,
            "--five-ten-fifteen" => options.modifiers.events.five_ten_fifteen = true,
            "--star-catching" => options.modifiers.events.star_catching = true,
            "--interactive" => options.modifiers.is_interactive = true,
            "--json" => options.json = true,
            "-h" | "--help" => {
                print_help();
                process::exit(0);
            }
            _ => {}
        }
        i += 1;
    }

    options
}

fn print_help() {
    println!("Star Force Plan Report");
    println!();
    println!("USAGE:");
    println!("    cargo run --bin plan -- [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -d, --data-dir <DIR>      Roster directory (default: ~/.starforce)");
    println!("    -c, --character <NAME>    Character to report (default: active)");
    println!("    -e, --engine-url <URL>    Cost engine base URL");
    println!("    -s, --sort <FIELD[:DIR]>  Sort by name, slot, level, cost, median, p75,");
    println!("                              booms, luck, actual; DIR is asc or desc");
    println!("    --thirty-off              30% off event");
    println!("    --five-ten-fifteen        5/10/15 guaranteed success event");
    println!("    --star-catching           Star catching on every attempt");
    println!("    --mvp <FRACTION>          MVP discount, e.g. 0.1");
    println!("    --interactive             Interactive server pricing");
    println!("    --json                    Print the report as JSON");
    println!("    -h, --help                Show this help");
}
