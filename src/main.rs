mod cli;
mod config;
mod db;
mod habit;

use crate::cli::{Cli, Commands, ConfigCommands, menu};
use crate::config::Config;
use crate::db::HabitStore;
use crate::habit::{Habit, Period};
use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    let config = load_or_default_config()?;

    match cli.command {
        None => menu::run_menu(&config),
        Some(Commands::Add { name, period }) => handle_add(&config, &name, &period),
        Some(Commands::Check { name, period }) => handle_check(&config, &name, &period),
        Some(Commands::Show { name, period, json }) => handle_show(&config, &name, &period, json),
        Some(Commands::List { period }) => handle_list(&config, period.as_deref()),
        Some(Commands::Streaks { name, period }) => {
            handle_streaks(&config, name.as_deref(), period.as_deref())
        }
        Some(Commands::Delete { name, period }) => handle_delete(&config, &name, &period),
        Some(Commands::Config { command }) => handle_config_command(command),
    }
}

fn handle_add(config: &Config, name: &str, period: &str) -> Result<()> {
    let name = validated_name(name)?;
    let period = parse_period(period)?;
    let store = HabitStore::open(&config.db_path)?;

    if store.exists(name, period)? {
        println!(
            "Habit '{name}' already exists as a {} habit.",
            period.as_str()
        );
        return Ok(());
    }

    let habit = Habit::new(name, period);
    store.save(&habit)?;
    println!("Habit '{name}' added.");

    Ok(())
}

fn handle_check(config: &Config, name: &str, period: &str) -> Result<()> {
    let name = validated_name(name)?;
    let period = parse_period(period)?;
    let store = HabitStore::open(&config.db_path)?;

    match store.load(name, period)? {
        Some(mut habit) => {
            habit.check_off(&store)?;
            println!(
                "Habit '{name}' checked off. Current streak: {}.",
                habit.streak
            );
        }
        None => println!(
            "No {} habit named '{name}'. Run `habitual add` first.",
            period.as_str()
        ),
    }

    Ok(())
}

fn handle_show(config: &Config, name: &str, period: &str, json: bool) -> Result<()> {
    let name = validated_name(name)?;
    let period = parse_period(period)?;
    let store = HabitStore::open(&config.db_path)?;

    let Some(habit) = store.load(name, period)? else {
        println!("No {} habit named '{name}'.", period.as_str());
        return Ok(());
    };

    let analysis = habit.analysis();
    if json {
        let rendered =
            serde_json::to_string_pretty(&analysis).context("Failed to serialize analysis")?;
        println!("{rendered}");
    } else {
        println!("{}", analysis.render());
    }

    Ok(())
}

fn handle_list(config: &Config, period: Option<&str>) -> Result<()> {
    let store = HabitStore::open(&config.db_path)?;

    let (header, names) = match period {
        Some(raw) => {
            let period = parse_period(raw)?;
            (
                format!("Habits checked {}", period.as_str()),
                store.habit_names_by_period(period)?,
            )
        }
        None => ("All tracked habits".to_string(), store.habit_names()?),
    };

    println!("{header}:");
    if names.is_empty() {
        println!("  (none)");
    }
    for name in names {
        println!("  - {name}");
    }

    Ok(())
}

fn handle_streaks(config: &Config, name: Option<&str>, period: Option<&str>) -> Result<()> {
    let store = HabitStore::open(&config.db_path)?;

    match (name, period) {
        (Some(name), Some(raw)) => {
            let name = validated_name(name)?;
            let period = parse_period(raw)?;
            let longest = store.longest_streak_for(name, period)?;
            println!(
                "The longest streak for '{name}' ({}) is {longest}.",
                period.as_str()
            );
        }
        _ => {
            let streaks = store.longest_streaks()?;
            if streaks.is_empty() {
                println!("No habits tracked yet.");
            }
            for entry in streaks {
                println!(
                    "Habit '{}' has a longest streak of {}.",
                    entry.name, entry.longest_streak
                );
            }
        }
    }

    Ok(())
}

fn handle_delete(config: &Config, name: &str, period: &str) -> Result<()> {
    let name = validated_name(name)?;
    let period = parse_period(period)?;
    let store = HabitStore::open(&config.db_path)?;

    if store.delete(name, period)? > 0 {
        println!("Habit '{name}' deleted.");
    } else {
        println!("No {} habit named '{name}' to delete.", period.as_str());
    }

    Ok(())
}

fn handle_config_command(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Set { key, value } => {
            let mut config = load_or_default_config()?;
            config.set_value(&key, &value)?;
            config.save()?;

            println!("Config saved: {key} = {value}");
            Ok(())
        }
        ConfigCommands::Get { key } => {
            let config = load_or_default_config()?;
            let value = config
                .get_value(&key)
                .with_context(|| format!("Unsupported config key: {key}"))?;

            println!("{value}");
            Ok(())
        }
    }
}

fn parse_period(raw: &str) -> Result<Period> {
    Period::parse(raw.trim())
        .ok_or_else(|| anyhow!("Invalid period: {raw}. Expected daily or weekly"))
}

fn validated_name(raw: &str) -> Result<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("Habit name cannot be empty");
    }

    Ok(trimmed)
}

fn load_or_default_config() -> Result<Config> {
    Config::load().or_else(|_| {
        let config = Config::default();
        config.save()?;
        Ok(config)
    })
}

#[cfg(test)]
mod tests {
    use super::{parse_period, validated_name};
    use crate::habit::Period;

    #[test]
    fn period_arguments_are_trimmed_before_parsing() {
        assert_eq!(parse_period(" daily ").expect("parse daily"), Period::Daily);
        assert_eq!(parse_period("weekly").expect("parse weekly"), Period::Weekly);
        assert!(parse_period("monthly").is_err());
    }

    #[test]
    fn blank_habit_names_are_rejected() {
        assert_eq!(validated_name("  Exercise ").expect("trimmed name"), "Exercise");
        assert!(validated_name("   ").is_err());
    }
}
