mod menu;

use employee_tree::catalog::{Catalog, CatalogConfig};
use employee_tree::data::Employee;
use employee_tree::error::Error;
use employee_tree::{io, stats};

use kdam::tqdm;
use log::info;
use std::collections::HashSet;

use clap::{Parser, Subcommand};
#[derive(Parser, Debug)] #[command(author, version, about, long_about = None)]
struct Args {

    //YAML config file, defaults are used without one
    #[arg(short, long)]
    config: Option<String>,

    //Employee data file, overrides the config
    #[arg(short, long)]
    data_file: Option<String>,

    #[command(subcommand)]
    task: Option<Task>,
}

#[derive(Subcommand, Debug)]
enum Task {

    /// Interactive menu
    Menu,

    /// Employees inside a closed experience/salary rectangle
    Range {
        #[arg(long)]
        low_exp: i32,
        #[arg(long)]
        low_sal: i32,
        #[arg(long)]
        high_exp: i32,
        #[arg(long)]
        high_sal: i32,
        #[arg(long)]
        json: bool,
    },

    /// Nearest employee to an experience/salary point
    Nearest {
        #[arg(long)]
        exp: i32,
        #[arg(long)]
        sal: i32,
        //Search both sides of every split instead of the single descent
        #[arg(long)]
        exact: bool,
        //Number of neighbors, implies --exact
        #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
        count: Option<usize>,
        #[arg(long)]
        json: bool,
    },

    /// Salary total, middle value, mean and standard deviation
    Stats {
        #[arg(long)]
        json: bool,
    },

    /// Tree structure with depths
    Print,

    /// Writes a catalog of random employees
    Generate {
        #[arg(long)]
        count: usize,
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() -> Result<(), Error> {

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(filename) => CatalogConfig::from_file(filename)?,
        None => CatalogConfig::default(),
    };

    if let Some(data_file) = &args.data_file {
        config.data_file = data_file.clone();
    }

    match args.task.unwrap_or(Task::Menu) {
        Task::Menu => {
            let autoload = config.autoload || args.data_file.is_some();
            run_menu(&config, autoload)
        },
        Task::Range { low_exp, low_sal, high_exp, high_sal, json } => {
            range(&config, Employee::point(low_exp, low_sal), Employee::point(high_exp, high_sal), json)
        },
        Task::Nearest { exp, sal, exact, count, json } => {
            nearest(&config, Employee::point(exp, sal), exact || config.nearest_exact, count, json)
        },
        Task::Stats { json } => print_stats(&config, json),
        Task::Print => print_tree(&config),
        Task::Generate { count, output } => {
            let output = output.unwrap_or_else(|| config.data_file.clone());
            generate(count, &output)
        },
    }
}

fn load_catalog(config: &CatalogConfig) -> Result<Catalog, Error> {

    let mut catalog = Catalog::with_config(config);
    catalog.load(&config.data_file)?;

    return Ok(catalog);
}

fn run_menu(config: &CatalogConfig, autoload: bool) -> Result<(), Error> {

    let catalog = match autoload {
        true => load_catalog(config)?,
        false => Catalog::with_config(config),
    };

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();

    let mut menu = menu::Menu::new(catalog, config, stdin.lock(), stdout.lock());

    return menu.run();
}

fn print_records(records: &[Employee], json: bool) -> Result<(), Error> {

    match json {
        true => println!("{}", serde_json::to_string_pretty(records)?),
        false => {
            for record in records {
                println!("{}", record);
            }
        },
    }

    Ok(())
}

fn range(config: &CatalogConfig, low: Employee, high: Employee, json: bool) -> Result<(), Error> {

    let catalog = load_catalog(config)?;

    let result = catalog.tree().range_search(&low, &high);
    info!("{} employees in range", result.len());

    return print_records(&result, json);
}

fn nearest(config: &CatalogConfig, target: Employee, exact: bool, count: Option<usize>, json: bool) -> Result<(), Error> {

    let catalog = load_catalog(config)?;
    let tree = catalog.tree();

    let records: Vec<Employee> = match (count, exact) {
        (Some(n), _) => tree.nearest_n(&target, n).into_iter().map(|(_, record)| record).collect(),
        (None, true) => tree.nearest(&target).into_iter().collect(),
        (None, false) => tree.approximate_nearest(&target).into_iter().collect(),
    };

    if records.is_empty() {
        return Err(Error::EmptyIndex);
    }

    return print_records(&records, json);
}

fn print_stats(config: &CatalogConfig, json: bool) -> Result<(), Error> {

    let catalog = load_catalog(config)?;
    let tree = catalog.tree();

    let totals = stats::total_salary(tree);
    let middle = stats::median_like_salary(tree)?;
    let mean = stats::mean_salary(tree)?;
    let stddev = stats::salary_stddev(tree, mean)?;

    match json {
        true => {
            let report = serde_json::json!({
                "total": totals,
                "middle": middle,
                "mean": mean,
                "stddev": stddev,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        },
        false => {
            println!("Employees: {}", totals.count);
            println!("Total salary: {}", totals.sum);
            println!("Middle salary: {}", middle);
            println!("Mean salary: {:.2}", mean);
            println!("Standard deviation: {:.2}", stddev);
        },
    }

    Ok(())
}

fn print_tree(config: &CatalogConfig) -> Result<(), Error> {

    let catalog = load_catalog(config)?;

    info!("{} employees, height {}", catalog.len(), catalog.tree().height());
    print!("{}", catalog.tree());

    Ok(())
}

fn generate(count: usize, output: &str) -> Result<(), Error> {

    let mut names: HashSet<String> = HashSet::with_capacity(count);
    let mut records: Vec<Employee> = Vec::with_capacity(count);

    for _ in tqdm!(0..count) {

        let mut record = Employee::random();
        while names.contains(&record.name) {
            record = Employee::random();
        }

        names.insert(record.name.clone());
        records.push(record);
    }

    io::write_records(output, &records)?;
    info!("wrote {} random employees to {}", count, output);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_count_must_be_positive() {

        let base = ["catalog", "nearest", "--exp", "3", "--sal", "40"];

        let zero = Args::try_parse_from(base.iter().chain(["--count", "0"].iter()).copied());
        assert!(zero.is_err());

        let args = Args::try_parse_from(base.iter().chain(["--count", "2"].iter()).copied()).unwrap();
        match args.task {
            Some(Task::Nearest { count, .. }) => assert_eq!(count, Some(2)),
            other => panic!("unexpected task {:?}", other),
        }
    }
}
