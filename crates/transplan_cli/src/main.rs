use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use transplan_model::{
    Instance, PlanGrid, Snapshot, SolutionResponse, SolveMethod, build_request, validate,
};
use transplan_session::PlanKind;

mod render;
mod report;

#[derive(Parser, Debug)]
#[command(name = "transplan_cli", about = "Transportation plan workbench", version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a stored instance as a table
    Show {
        /// Instance snapshot (JSON)
        #[arg(value_name = "INSTANCE")]
        instance: PathBuf,
    },
    /// Check an instance against the submission rules
    Validate {
        #[arg(value_name = "INSTANCE")]
        instance: PathBuf,
    },
    /// Build the solve payload for an instance
    Request {
        #[arg(value_name = "INSTANCE")]
        instance: PathBuf,

        /// Which plan to ask for: basic or optimal
        #[arg(long, default_value = "optimal")]
        plan: PlanKind,

        /// Seeding method for basic plans: northwest, min_cost or vogel
        #[arg(long)]
        method: Option<SolveMethod>,

        /// Requesting user recorded in the payload
        #[arg(long)]
        user: Option<String>,

        /// Write the payload here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Decode a solver response against its instance
    Plan {
        /// Solver response (JSON)
        #[arg(value_name = "RESPONSE")]
        response: PathBuf,

        /// Instance the response answers
        #[arg(long)]
        instance: PathBuf,

        /// Also write a dated plan report to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let outcome = match args.command {
        Command::Show { instance } => show(&instance),
        Command::Validate { instance } => check(&instance),
        Command::Request {
            instance,
            plan,
            method,
            user,
            out,
        } => request(&instance, plan, method, user, out.as_deref()),
        Command::Plan {
            response,
            instance,
            report,
        } => plan(&response, &instance, report.as_deref()),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

fn load_instance(path: &Path) -> Result<(Instance, Option<String>)> {
    let snapshot = load_snapshot(path)?;
    let instance = Instance::from_snapshot(&snapshot)
        .with_context(|| format!("Bad instance in {}", path.display()))?;
    Ok((instance, snapshot.name))
}

fn show(path: &Path) -> Result<()> {
    let (instance, name) = load_instance(path)?;
    if let Some(name) = name {
        println!("{name}");
        println!();
    }
    print!("{}", render::instance_table(&instance));
    if !instance.restrictions().is_empty() {
        println!();
        println!("Restrictions:");
        for (route, restriction) in instance.restrictions() {
            println!(
                "  {}: {}{}",
                route,
                restriction.op.symbol(),
                restriction.bound
            );
        }
    }
    if !instance.capacities().is_empty() {
        println!();
        println!("Capacities:");
        for (route, bound) in instance.capacities() {
            println!("  {}: {}", route.compact(), bound);
        }
    }
    Ok(())
}

fn check(path: &Path) -> Result<()> {
    let (instance, _) = load_instance(path)?;
    let report = validate(&instance);
    if report.is_empty() {
        println!("ok");
        return Ok(());
    }
    for violation in &report {
        println!("{violation}");
    }
    std::process::exit(2);
}

fn request(
    path: &Path,
    plan: PlanKind,
    method: Option<SolveMethod>,
    user: Option<String>,
    out: Option<&Path>,
) -> Result<()> {
    let (instance, _) = load_instance(path)?;
    let report = validate(&instance);
    if !report.is_empty() {
        for violation in &report {
            eprintln!("{violation}");
        }
        bail!("instance failed validation");
    }

    let method = match plan {
        PlanKind::Basic => {
            let method = method.unwrap_or(SolveMethod::Northwest);
            // the solve endpoint takes the ordinal as its mode parameter
            eprintln!("method={} mode={}", method, method.ordinal());
            Some(method)
        }
        PlanKind::Optimal => {
            if method.is_some() {
                eprintln!("--method only applies to basic plans, ignoring");
            }
            None
        }
    };
    let request = build_request(&instance, method, user);
    let payload = serde_json::to_string_pretty(&request)?;
    match out {
        Some(out) => fs::write(out, payload + "\n")
            .with_context(|| format!("Failed to write {}", out.display()))?,
        None => println!("{payload}"),
    }
    Ok(())
}

fn plan(response_path: &Path, instance_path: &Path, report_path: Option<&Path>) -> Result<()> {
    let (instance, name) = load_instance(instance_path)?;
    let text = fs::read_to_string(response_path)
        .with_context(|| format!("Failed to read {}", response_path.display()))?;
    let response: SolutionResponse = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse {}", response_path.display()))?;

    let grid = PlanGrid::decode(&response.roots, instance.rows(), instance.cols());
    let table = render::plan_table(&grid, instance.suppliers(), instance.consumers());
    print!("{table}");
    println!();
    println!("Total price: {}", response.price);
    println!("Optimal: {}", if response.is_optimal { "yes" } else { "no" });

    if let Some(report_path) = report_path {
        report::write_plan_report(
            report_path,
            name.as_deref().unwrap_or("transportation plan"),
            &response,
            &table,
        )
        .with_context(|| format!("Failed to write {}", report_path.display()))?;
    }
    Ok(())
}
