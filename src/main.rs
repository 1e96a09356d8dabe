//! Market simulator entry point — CLI wiring and config-driven run construction.

use std::path::{Path, PathBuf};
use std::process;

use microgrid_market::catalog::TeamCatalog;
use microgrid_market::config::RunConfig;
use microgrid_market::io::export::export_csv;
use microgrid_market::market::{PriceCoordinator, SimulationDriver};
use microgrid_market::players::PlayerRegistry;
use microgrid_market::scenario::{ScenarioLibrary, TableLayout, load_external_purchase};

/// Parsed CLI arguments.
struct CliArgs {
    config_path: Option<String>,
    players_path: String,
    scenarios_dir: String,
    prices_path: Option<String>,
    team: String,
    name_override: Option<String>,
    simulations_override: Option<usize>,
    region_override: Option<usize>,
    seed_override: Option<u64>,
    results_out: Option<String>,
}

fn print_help() {
    eprintln!("microgrid-market — decentralized energy market simulator");
    eprintln!();
    eprintln!("Usage: microgrid-market [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>        Load run parameters from TOML config file");
    eprintln!("  --players <path>       Team catalog JSON (default: data/players.json)");
    eprintln!("  --scenarios <dir>      Scenario table directory (default: data/scenarios)");
    eprintln!("  --prices <path>        External purchase-price seed CSV");
    eprintln!("  --team <name>          Team to simulate (default: team_PIR)");
    eprintln!("  --simulations <n>      Number of games to play");
    eprintln!("  --region <idx>         Fix the solar region (0-based)");
    eprintln!("  --name <name>          Experiment name");
    eprintln!("  --seed <u64>           Override random seed");
    eprintln!("  --results-out <path>   Export per-iteration results to CSV");
    eprintln!("  --help                 Show this help message");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        config_path: None,
        players_path: "data/players.json".to_string(),
        scenarios_dir: "data/scenarios".to_string(),
        prices_path: None,
        team: "team_PIR".to_string(),
        name_override: None,
        simulations_override: None,
        region_override: None,
        seed_override: None,
        results_out: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--config" => {
                cli.config_path = Some(take_value(&args, &mut i, "--config"));
            }
            "--players" => {
                cli.players_path = take_value(&args, &mut i, "--players");
            }
            "--scenarios" => {
                cli.scenarios_dir = take_value(&args, &mut i, "--scenarios");
            }
            "--prices" => {
                cli.prices_path = Some(take_value(&args, &mut i, "--prices"));
            }
            "--team" => {
                cli.team = take_value(&args, &mut i, "--team");
            }
            "--name" => {
                cli.name_override = Some(take_value(&args, &mut i, "--name"));
            }
            "--simulations" => {
                cli.simulations_override = Some(parse_number(&args, &mut i, "--simulations"));
            }
            "--region" => {
                cli.region_override = Some(parse_number(&args, &mut i, "--region"));
            }
            "--seed" => {
                cli.seed_override = Some(parse_number(&args, &mut i, "--seed"));
            }
            "--results-out" => {
                cli.results_out = Some(take_value(&args, &mut i, "--results-out"));
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn take_value(args: &[String], i: &mut usize, flag: &str) -> String {
    *i += 1;
    if *i >= args.len() {
        eprintln!("error: {flag} requires a value");
        process::exit(1);
    }
    args[*i].clone()
}

fn parse_number<T: std::str::FromStr>(args: &[String], i: &mut usize, flag: &str) -> T {
    let raw = take_value(args, i, flag);
    match raw.parse::<T>() {
        Ok(v) => v,
        Err(_) => {
            eprintln!("error: {flag} value \"{raw}\" is not a valid number");
            process::exit(1);
        }
    }
}

fn main() {
    let cli = parse_args();

    // Load config, then apply CLI overrides
    let mut config = if let Some(ref path) = cli.config_path {
        match RunConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        RunConfig::default()
    };

    if let Some(name) = cli.name_override {
        config.run.name = name;
    }
    if let Some(simulations) = cli.simulations_override {
        config.run.simulations = simulations;
    }
    if let Some(region) = cli.region_override {
        config.run.region = Some(region);
    }
    if let Some(seed) = cli.seed_override {
        config.run.seed = seed;
    }

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    // Resolve the roster first: an unknown team must fail before any
    // scenario table is touched.
    let catalog = match TeamCatalog::from_json_file(Path::new(&cli.players_path)) {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };
    let roster = match catalog.roster(&cli.team) {
        Ok(roster) => roster.to_vec(),
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };
    let mut registry = PlayerRegistry::from_roster(&cli.team, &roster, &config);

    let layout = TableLayout {
        fleet_size: config.fleet.vehicles,
        regions: config.solar.regions,
        slots_per_scenario: config.market.horizon,
        ..TableLayout::default()
    };
    let library = match ScenarioLibrary::load(
        Path::new(&cli.scenarios_dir),
        &registry.categories(),
        &layout,
    ) {
        Ok(library) => library,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    let external_purchase = match cli.prices_path {
        Some(ref path) => {
            match load_external_purchase(Path::new(path), config.market.horizon) {
                Ok(prices) => Some(prices),
                Err(e) => {
                    eprintln!("{e}");
                    process::exit(1);
                }
            }
        }
        None => None,
    };

    let coordinator =
        PriceCoordinator::new(config.market.clone(), config.run.region, external_purchase);
    let mut driver = SimulationDriver::new(coordinator, config.run.seed);

    println!(
        "run \"{}\": team={} simulations={} seed={}",
        config.run.name, cli.team, config.run.simulations, config.run.seed
    );

    let results = match driver.run(config.run.simulations, &library, &mut registry) {
        Ok(results) => results,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    for result in &results {
        println!("{result}");
    }
    let non_convergent = results.iter().filter(|r| !r.converged).count();
    if non_convergent > 0 {
        println!("{non_convergent} game(s) hit the iteration cap without converging");
    }

    if let Some(ref path) = cli.results_out {
        if let Err(e) = export_csv(&results, &PathBuf::from(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Results written to {path}");
    }
}
