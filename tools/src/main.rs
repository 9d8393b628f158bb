//! sim-runner: headless runner for the donor cohort simulator.
//!
//! Usage:
//!   sim-runner --seed 42 --cohort-size 1000 --churn-rate 0.02
//!   sim-runner --months 6 --json > dataset.jsonl

use anyhow::Result;
use donorsim_core::calendar::{month_span, period_label};
use donorsim_core::{Dataset, SimConfig, SimEngine};
use std::collections::BTreeMap;
use std::env;
use std::io::Write;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let reference = SimConfig::reference();

    let seed = parse_arg(&args, "--seed", reference.seed);
    let cohort_size = parse_arg(&args, "--cohort-size", reference.cohort_size);
    let churn_rate = parse_arg(&args, "--churn-rate", reference.churn_rate);
    let json_mode = args.iter().any(|a| a == "--json");

    let mut config = SimConfig {
        seed,
        cohort_size,
        churn_rate,
        ..reference
    };

    // --months N truncates the reference date range.
    if let Some(n) = args
        .windows(2)
        .find(|w| w[0] == "--months")
        .and_then(|w| w[1].parse::<usize>().ok())
    {
        let months = month_span(config.start_date, config.end_date);
        if n == 0 || n > months.len() {
            anyhow::bail!("--months must be in 1..={}", months.len());
        }
        config.end_date = months[n - 1];
    }

    if !json_mode {
        println!("donor cohort simulator — sim-runner");
        println!("  seed:         {seed}");
        println!("  cohort size:  {cohort_size}");
        println!("  churn rate:   {churn_rate}");
        println!("  range:        {} .. {}", config.start_date, config.end_date);
        println!(
            "  weighted billing effectiveness: {:.2}%",
            config.weighted_effectiveness() * 100.0
        );
        println!();
    }

    let mut engine = SimEngine::new(config)?;
    let dataset = engine.run()?;

    if json_mode {
        dump_json(&dataset)?;
    } else {
        print_summary(&engine, &dataset);
    }

    Ok(())
}

fn dump_json(dataset: &Dataset) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    out.write_all(dataset.to_json_lines()?.as_bytes())?;
    Ok(())
}

fn print_summary(engine: &SimEngine, dataset: &Dataset) {
    println!("=== MONTHLY ===");
    for stats in &engine.monthly {
        println!(
            "  {} | enrolled {:>5} | billed {:>6} | churned {:>4} | active {:>6}",
            period_label(stats.month),
            stats.enrolled,
            stats.billed,
            stats.churned,
            stats.active_end,
        );
    }

    println!();
    println!("=== RUN SUMMARY ===");
    println!("  total records:      {}", dataset.summary.total_records);
    println!("  unique donors:      {}", dataset.summary.total_donors);
    println!("  still active:       {}", engine.state.active_count());
    println!("  churned:            {}", engine.state.churned_count());
    println!("  succeeded attempts: {}", dataset.summary.succeeded_attempts);
    println!("  total amount:       {}", dataset.summary.total_amount);

    println!();
    println!("=== PAYMENT METHOD DISTRIBUTION ===");
    print_distribution(engine, |p| p.payment_method.clone());

    println!("=== STRATEGY DISTRIBUTION ===");
    print_distribution(engine, |p| p.strategy.clone());

    let churned_ids: Vec<_> = engine.state.churned().map(|(id, _)| id.clone()).collect();
    if !churned_ids.is_empty() {
        let never_paid = churned_ids
            .iter()
            .filter(|id| !engine.state.has_paid_in_timeline(id))
            .count();
        let paid = churned_ids.len() - never_paid;
        let total = churned_ids.len() as f64;
        println!("=== CHURN BREAKDOWN ===");
        println!(
            "  never paid: {never_paid} ({:.1}%)",
            never_paid as f64 / total * 100.0
        );
        println!("  paid at least once: {paid} ({:.1}%)", paid as f64 / total * 100.0);
    }
}

fn print_distribution(
    engine: &SimEngine,
    key: impl Fn(&donorsim_core::DonorProfile) -> String,
) {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for profile in engine.state.profiles() {
        *counts.entry(key(profile)).or_default() += 1;
    }
    let total = engine.state.total_donors() as f64;
    for (name, count) in &counts {
        println!(
            "  {name:<18} {count:>6} ({:.2}%)",
            *count as f64 / total * 100.0
        );
    }
    println!();
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
