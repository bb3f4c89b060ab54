use chrono::{Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use planner_core::analytics::{build_report, workout_distribution};
use planner_core::catalog::ExerciseCatalog;
use planner_core::distribution::region_split;
use planner_core::history::recent;
use planner_core::templates::{find_template, TEMPLATES};
use planner_core::*;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "planner")]
#[command(about = "Workout rotation planner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Override the user the routine is stored under
    #[arg(long, global = true)]
    user: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current routine (default)
    Show,

    /// Add a workout to the routine by id or name
    Add { workout: String },

    /// Remove every slot of a workout from the routine
    Remove { workout: String },

    /// Append a rest day
    Rest,

    /// Remove a single slot by its item id
    Drop { item_id: Uuid },

    /// Duplicate the slot at a position, placing the copy right after it
    Duplicate { index: usize },

    /// Move the slot at FROM so it lands at TO
    Move { from: usize, to: usize },

    /// Set how many times the sequence repeats
    Cycles { count: u32 },

    /// Replace the routine with a built-in template (lists templates when no name is given)
    Template { name: Option<String> },

    /// Print the projected schedule with dates
    Schedule {
        /// First day of the schedule (YYYY-MM-DD), defaults to today
        #[arg(long)]
        start: Option<NaiveDate>,
    },

    /// Muscle distribution of the routine or of a single workout
    Distribution {
        /// Workout id or name; the whole routine when omitted
        #[arg(long)]
        workout: Option<String>,
    },

    /// Execute a workout set by set
    Run {
        workout: String,

        /// Auto-complete (for testing) - mark every set done as prescribed
        #[arg(long)]
        auto_complete: bool,
    },

    /// Routine and training statistics
    Stats,

    /// Write every logged set to CSV
    Export,
}

/// Files under the data directory
struct Paths {
    workouts: PathBuf,
    routines: PathBuf,
    history: PathBuf,
    csv: PathBuf,
}

impl Paths {
    fn new(config: &Config) -> Self {
        let data_dir = &config.data.data_dir;
        Self {
            workouts: data_dir.join("workouts.json"),
            routines: config.routines_dir(),
            history: data_dir.join("history.jsonl"),
            csv: data_dir.join("sets.csv"),
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    planner_core::logging::init();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(data_dir) = cli.data_dir {
        config.data.data_dir = data_dir;
    }
    let user = cli.user.unwrap_or_else(|| config.user.id.clone());
    let paths = Paths::new(&config);

    let library = WorkoutLibrary::load(&paths.workouts)?;
    let mut store = FileRoutineStore::new(&paths.routines);

    match cli.command.unwrap_or(Commands::Show) {
        Commands::Show => {
            let routine = store.load_or_new(&user, &config.routine)?;
            print_routine(&routine, &library);
            Ok(())
        }
        Commands::Add { workout } => cmd_add(&mut store, &user, &config, &library, &workout),
        Commands::Remove { workout } => {
            let workout_id = library
                .find(&workout)
                .map(|w| w.id.clone())
                .unwrap_or(workout);
            let mut removed = 0;
            store.update(&user, &config.routine, |routine| {
                removed = routine.remove_workout(&workout_id);
                Ok(())
            })?;
            println!("Removed {} slot(s) of {}", removed, workout_id);
            Ok(())
        }
        Commands::Rest => {
            let mut id = Uuid::nil();
            store.update(&user, &config.routine, |routine| {
                id = routine.add_rest_day();
                Ok(())
            })?;
            println!("✓ Added rest day {}", id);
            Ok(())
        }
        Commands::Drop { item_id } => {
            let mut removed = None;
            store.update(&user, &config.routine, |routine| {
                removed = routine.remove_item(item_id);
                Ok(())
            })?;
            match removed {
                Some(item) => println!("✓ Dropped {}", item.label()),
                None => println!("No slot with id {}", item_id),
            }
            Ok(())
        }
        Commands::Duplicate { index } => {
            let mut id = Uuid::nil();
            store.update(&user, &config.routine, |routine| {
                id = routine.duplicate_item(index)?;
                Ok(())
            })?;
            println!("✓ Duplicated slot {} as {}", index, id);
            Ok(())
        }
        Commands::Move { from, to } => {
            let routine = store.update(&user, &config.routine, |routine| {
                routine.reorder_items(from, to)
            })?;
            print_routine(&routine, &library);
            Ok(())
        }
        Commands::Cycles { count } => {
            if !config.routine.cycle_choices.contains(&count) {
                tracing::warn!("{} is not one of the configured cycle choices", count);
            }
            let routine = store.update(&user, &config.routine, |routine| {
                routine.set_cycle_count(count)
            })?;
            println!(
                "✓ Routine repeats {} time(s), {} days total",
                routine.cycle_count(),
                routine.total_days()
            );
            Ok(())
        }
        Commands::Template { name } => cmd_template(&mut store, &user, &config, &library, name),
        Commands::Schedule { start } => {
            let routine = store.load_or_new(&user, &config.routine)?;
            let start = start.unwrap_or_else(|| Local::now().date_naive());
            cmd_schedule(&routine, &library, start)
        }
        Commands::Distribution { workout } => {
            let routine = store.load_or_new(&user, &config.routine)?;
            cmd_distribution(&routine, &library, &config, workout)
        }
        Commands::Run {
            workout,
            auto_complete,
        } => cmd_run(&library, &paths, &workout, auto_complete),
        Commands::Stats => {
            let routine = store.load_or_new(&user, &config.routine)?;
            cmd_stats(&routine, &library, &paths, &config)
        }
        Commands::Export => cmd_export(&paths),
    }
}

fn cmd_add(
    store: &mut FileRoutineStore,
    user: &str,
    config: &Config,
    library: &WorkoutLibrary,
    workout: &str,
) -> Result<()> {
    let workout = library
        .find(workout)
        .ok_or_else(|| Error::InvalidArgument(format!("unknown workout {:?}", workout)))?;

    let mut added = false;
    store.update(user, &config.routine, |routine| {
        added = routine.add_workout(&workout.id, &workout.name);
        Ok(())
    })?;

    if added {
        println!("✓ Added {}", workout.name);
    } else {
        println!("{} is already in the routine", workout.name);
    }
    Ok(())
}

fn cmd_template(
    store: &mut FileRoutineStore,
    user: &str,
    config: &Config,
    library: &WorkoutLibrary,
    name: Option<String>,
) -> Result<()> {
    let Some(name) = name else {
        for template in TEMPLATES {
            println!(
                "{:<20} {:?}  {}",
                template.name, template.level, template.description
            );
            println!("    {}", template.pattern.join(" → "));
        }
        return Ok(());
    };

    let template = find_template(&name)
        .ok_or_else(|| Error::InvalidArgument(format!("unknown template {:?}", name)))?;
    let routine = template.apply(library, config.routine.default_cycle_count)?;
    store.save(user, &routine)?;

    println!("✓ Applied template {}", template.name);
    print_routine(&routine, library);
    Ok(())
}

fn cmd_schedule(routine: &Routine, library: &WorkoutLibrary, start: NaiveDate) -> Result<()> {
    if routine.is_empty() {
        println!("Routine is empty - nothing to schedule.");
        return Ok(());
    }

    for (date, day) in calendar::dated_days(routine, start) {
        println!(
            "{}  cycle {}  day {:>2}  {}",
            date.format("%a %Y-%m-%d"),
            day.cycle_index + 1,
            day.item_index + 1,
            day.display_label(library)
        );
    }
    if let Some(end) = calendar::end_date(routine, start) {
        println!("\nEnds {}", end);
    }
    Ok(())
}

fn cmd_distribution(
    routine: &Routine,
    library: &WorkoutLibrary,
    config: &Config,
    workout: Option<String>,
) -> Result<()> {
    let aggregator = config.distribution.aggregator()?;
    let catalog = default_catalog();

    if let Some(name) = workout {
        let workout = library
            .find(&name)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown workout {:?}", name)))?;
        println!("{}", workout.name);
        print_summary(&workout_distribution(workout, &aggregator, catalog));
        print_regions(workout.exercises.iter(), catalog);
        return Ok(());
    }

    println!("Routine ({} days per cycle)", routine.items().len());
    let exercises: Vec<&Exercise> = routine
        .items()
        .iter()
        .filter_map(|item| item.workout_id())
        .filter_map(|id| library.workout(id))
        .flat_map(|w| &w.exercises)
        .collect();

    let summary = aggregator.aggregate(exercises.iter().map(|e| catalog.attribution_for(e)));
    print_summary(&summary);
    print_regions(exercises.into_iter(), catalog);
    Ok(())
}

fn cmd_run(
    library: &WorkoutLibrary,
    paths: &Paths,
    workout: &str,
    auto_complete: bool,
) -> Result<()> {
    let workout = library
        .find(workout)
        .ok_or_else(|| Error::InvalidArgument(format!("unknown workout {:?}", workout)))?;
    let mut session = WorkoutSession::start(workout, Utc::now())?;

    let stdin = io::stdin();
    let mut input = stdin.lock();

    while let Some(exercise) = session.current_exercise() {
        display_set(&session, exercise);

        if auto_complete {
            session.record_set();
            continue;
        }

        match prompt_set_action(&mut input)? {
            SetAction::Done => {
                session.record_set();
            }
            SetAction::Logged { value, weight } => {
                let weight = weight.or_else(|| session.current_result().and_then(|r| r.weight));
                session.update_current(weight, value);
                session.record_set();
            }
            SetAction::Back => {
                session.retreat();
            }
            SetAction::Quit => break,
        }
    }

    let completed = session.finish(Utc::now());
    let mut history = JsonlHistory::new(&paths.history);
    history.append(&completed)?;

    println!(
        "\n✓ Workout logged! {:.0}% of sets completed",
        completed.completion_rate
    );
    Ok(())
}

fn cmd_stats(
    routine: &Routine,
    library: &WorkoutLibrary,
    paths: &Paths,
    config: &Config,
) -> Result<()> {
    let stats = routine.stats();
    println!("Routine");
    println!(
        "  {} days per cycle ({} workout, {} rest), {} cycles, {} days total",
        stats.days_per_cycle,
        stats.workout_days,
        stats.rest_days,
        routine.cycle_count(),
        stats.total_days
    );
    for (kind, count) in routine.workout_kind_counts(library) {
        println!("  {:<12} {}", kind, count);
    }

    let history = read_history(&paths.history)?;
    let report = build_report(library.workouts(), &history, Utc::now(), config);

    println!("\nTraining");
    println!("  Workouts:            {}", report.total_workouts);
    println!("  Exercises:           {}", report.total_exercises);
    println!("  Completed (30 days): {}", report.completed_last_30_days);
    println!("  Completed (7 days):  {}", report.completed_this_week);
    println!("  Consistency:         {}%", report.consistency_score);
    println!(
        "  Per week:            {:.1} ({:+.1})",
        report.avg_per_week, report.weekly_trend
    );
    let last_week = recent(&history, Utc::now(), 7);
    if !last_week.is_empty() {
        println!("  Last 7 days:");
        for workout in last_week {
            println!(
                "    {}  {:<24} {:.0}%",
                workout.completed_at.with_timezone(&Local).format("%a %Y-%m-%d"),
                workout.workout_name,
                workout.completion_rate
            );
        }
    }
    for week in &report.weekly {
        println!("    {}: {} workouts", week.label, week.workouts);
    }
    if !report.top_exercises.is_empty() {
        println!("  Top exercises:");
        for (name, count) in &report.top_exercises {
            println!("    {:<36} {}", name, count);
        }
    }
    Ok(())
}

fn cmd_export(paths: &Paths) -> Result<()> {
    let history = read_history(&paths.history)?;
    if history.is_empty() {
        println!("No workout history - nothing to export.");
        return Ok(());
    }

    // Each export is a full snapshot of the history
    if paths.csv.exists() {
        std::fs::remove_file(&paths.csv)?;
    }
    let count = export::export_sets(&history, &paths.csv)?;

    println!("✓ Exported {} sets from {} workouts", count, history.len());
    println!("  CSV: {}", paths.csv.display());
    Ok(())
}

fn print_routine(routine: &Routine, library: &WorkoutLibrary) {
    if routine.is_empty() {
        println!("Routine is empty. Add workouts with `planner add <workout>`.");
        return;
    }

    for (i, item) in routine.items().iter().enumerate() {
        let label = match item.workout_id() {
            Some(id) => library
                .workout(id)
                .map(|w| w.name.clone())
                .unwrap_or_else(|| item.label().to_string()),
            None => item.label().to_string(),
        };
        println!("{:>3}. {:<24} {}", i, label, item.id);
    }

    let stats = routine.stats();
    println!(
        "\n{} workout days, {} rest days, {} cycles ({} days)",
        stats.workout_days,
        stats.rest_days,
        routine.cycle_count(),
        stats.total_days
    );
}

fn print_summary(summary: &DistributionSummary) {
    if summary.is_empty() {
        println!("  No muscle data");
        return;
    }
    for (category, weight) in summary.entries() {
        println!("  {:<12} {:>3}%", category, weight);
    }
}

fn print_regions<'a>(exercises: impl Iterator<Item = &'a Exercise>, catalog: &ExerciseCatalog) {
    let split = region_split(exercises.map(|e| catalog.attribution_for(e)));
    if split.upper + split.lower + split.core > 0 {
        println!(
            "  Upper {}% / Lower {}% / Core {}%",
            split.upper, split.lower, split.core
        );
    }
}

fn display_set(session: &WorkoutSession<'_>, exercise: &Exercise) {
    let Position::At { exercise: ex, set } = session.cursor().position() else {
        return;
    };
    let target = session
        .current_result()
        .map(|r| r.value)
        .unwrap_or_else(|| exercise.target.value());

    println!(
        "\n[{:>3.0}%] {} ({}/{}) - set {}/{}",
        session.cursor().progress() * 100.0,
        exercise.name,
        ex + 1,
        session.cursor().exercise_count(),
        set + 1,
        exercise.sets
    );
    match exercise.weight {
        Some(weight) => println!("  → {} {} @ {}", target, exercise.target.unit(), weight),
        None => println!("  → {} {}", target, exercise.target.unit()),
    }
    if exercise.rest_seconds > 0 {
        println!("  Rest {}s after this set", exercise.rest_seconds);
    }
}

enum SetAction {
    Done,
    Logged { value: u32, weight: Option<f64> },
    Back,
    Quit,
}

fn prompt_set_action(input: &mut impl BufRead) -> Result<SetAction> {
    loop {
        println!("  Enter when done, '<value> [weight]' to log actual, 'b' back, 'q' quit");
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(SetAction::Quit);
        }

        match parse_set_action(&line) {
            Some(action) => return Ok(action),
            None => println!("  Unrecognised input {:?}, try again", line.trim()),
        }
    }
}

fn parse_set_action(line: &str) -> Option<SetAction> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.as_slice() {
        [] => Some(SetAction::Done),
        [cmd] if cmd.eq_ignore_ascii_case("b") => Some(SetAction::Back),
        [cmd] if cmd.eq_ignore_ascii_case("q") => Some(SetAction::Quit),
        [value] => Some(SetAction::Logged {
            value: value.parse().ok()?,
            weight: None,
        }),
        [value, weight] => Some(SetAction::Logged {
            value: value.parse().ok()?,
            weight: Some(weight.parse().ok()?),
        }),
        _ => None,
    }
}
