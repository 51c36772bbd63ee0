use crate::config::Config;
use crate::db::HabitStore;
use crate::habit::{Habit, Period};
use anyhow::{Context, Result};
use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};
use tracing::warn;

const PERIOD_CHOICES: [Period; 2] = [Period::Daily, Period::Weekly];

pub fn run_menu(config: &Config) -> Result<()> {
    let store = HabitStore::open(&config.db_path)?;
    let theme = ColorfulTheme::default();

    println!("Welcome to habitual.");

    loop {
        let choice = Select::with_theme(&theme)
            .with_prompt("Menu")
            .default(0)
            .items(&[
                "Add a new habit",
                "Check off a habit",
                "View habit analysis",
                "Delete a habit",
                "Exit",
            ])
            .interact()
            .context("Failed to read menu selection")?;

        let outcome = match choice {
            0 => add_habit(&store, &theme),
            1 => check_off_habit(&store, &theme),
            2 => run_analysis_menu(&store, &theme),
            3 => delete_habit(&store, &theme),
            _ => break,
        };

        if let Err(error) = outcome {
            warn!(error = %error, "menu action failed");
            println!("  ! {error:#}");
        }
    }

    println!("Goodbye!");
    Ok(())
}

fn add_habit(store: &HabitStore, theme: &ColorfulTheme) -> Result<()> {
    let name = prompt_name(theme)?;
    let period = prompt_period(theme)?;

    if store.exists(&name, period)? {
        println!(
            "  ! Habit '{name}' already exists as a {} habit.",
            period.as_str()
        );
        return Ok(());
    }

    let habit = Habit::new(&name, period);
    store.save(&habit)?;
    println!("  ✓ Habit '{name}' added.");

    Ok(())
}

fn check_off_habit(store: &HabitStore, theme: &ColorfulTheme) -> Result<()> {
    let name = prompt_name(theme)?;
    let period = prompt_period(theme)?;

    match store.load(&name, period)? {
        Some(mut habit) => {
            habit.check_off(store)?;
            println!(
                "  ✓ Habit '{name}' checked off. Current streak: {}.",
                habit.streak
            );
        }
        None => println!(
            "  ! No {} habit named '{name}'. Add it first.",
            period.as_str()
        ),
    }

    Ok(())
}

fn delete_habit(store: &HabitStore, theme: &ColorfulTheme) -> Result<()> {
    let name = prompt_name(theme)?;
    let period = prompt_period(theme)?;

    let confirmed = Confirm::with_theme(theme)
        .with_prompt(format!("Delete the {} habit '{name}'?", period.as_str()))
        .default(false)
        .interact()
        .context("Failed to read delete confirmation")?;

    if !confirmed {
        println!("  ! Kept '{name}'.");
        return Ok(());
    }

    if store.delete(&name, period)? > 0 {
        println!("  ✓ Habit '{name}' deleted.");
    } else {
        println!(
            "  ! No {} habit named '{name}' to delete.",
            period.as_str()
        );
    }

    Ok(())
}

fn run_analysis_menu(store: &HabitStore, theme: &ColorfulTheme) -> Result<()> {
    let choice = Select::with_theme(theme)
        .with_prompt("Analysis")
        .default(0)
        .items(&[
            "View all tracked habits",
            "View habits with the same periodicity",
            "View the longest streak of all habits",
            "View the longest streak for a specific habit",
            "View a habit's full analysis",
            "Back",
        ])
        .interact()
        .context("Failed to read analysis selection")?;

    match choice {
        0 => {
            print_names("All tracked habits", &store.habit_names()?);
        }
        1 => {
            let period = prompt_period(theme)?;
            print_names(
                &format!("Habits checked {}", period.as_str()),
                &store.habit_names_by_period(period)?,
            );
        }
        2 => {
            let streaks = store.longest_streaks()?;
            println!("Longest streaks of all habits:");
            if streaks.is_empty() {
                println!("  (no habits tracked yet)");
            }
            for entry in streaks {
                println!(
                    "  Habit '{}' has a longest streak of {}.",
                    entry.name, entry.longest_streak
                );
            }
        }
        3 => {
            let name = prompt_name(theme)?;
            let period = prompt_period(theme)?;
            let longest = store.longest_streak_for(&name, period)?;
            println!(
                "  The longest streak for '{name}' ({}) is {longest}.",
                period.as_str()
            );
        }
        4 => {
            let name = prompt_name(theme)?;
            let period = prompt_period(theme)?;
            match store.load(&name, period)? {
                Some(habit) => println!("{}", habit.analysis().render()),
                None => println!("  ! No {} habit named '{name}'.", period.as_str()),
            }
        }
        _ => {}
    }

    Ok(())
}

fn print_names(header: &str, names: &[String]) {
    println!("{header}:");
    if names.is_empty() {
        println!("  (none)");
        return;
    }
    for name in names {
        println!("  - {name}");
    }
}

fn prompt_name(theme: &ColorfulTheme) -> Result<String> {
    let name: String = Input::with_theme(theme)
        .with_prompt("Habit name")
        .validate_with(|input: &String| -> std::result::Result<(), &str> {
            if input.trim().is_empty() {
                Err("Habit name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()
        .context("Failed to read habit name")?;

    Ok(name.trim().to_string())
}

fn prompt_period(theme: &ColorfulTheme) -> Result<Period> {
    let selected_index = Select::with_theme(theme)
        .with_prompt("Period")
        .default(0)
        .items(&["daily", "weekly"])
        .interact()
        .context("Failed to read period selection")?;

    Ok(PERIOD_CHOICES
        .get(selected_index)
        .copied()
        .unwrap_or(Period::Daily))
}
