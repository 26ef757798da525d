use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use novena_core::*;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "novena")]
#[command(about = "54-day rosary novena tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new 54-day novena
    Start {
        /// Intention the novena is offered for
        #[arg(long)]
        intention: Option<String>,

        /// Start date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Pray the next novena day (default)
    Today {
        /// Pray a specific day instead of the next open one
        #[arg(long)]
        day: Option<u32>,

        /// Dry run - show the prayers without recording
        #[arg(long)]
        dry_run: bool,

        /// Auto-complete (for testing) - record without waiting for input
        #[arg(long)]
        auto_complete: bool,

        /// Date the day was prayed (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Show the days prayed so far
    History,

    /// List all 54 days with their phase and mystery
    Schedule,

    /// Show the bead layout and step mapping of a prayer
    Beads {
        /// Prayer type (daily-rosary, 54-day-novena, divine-mercy, ...)
        #[arg(long, default_value = "daily-rosary")]
        prayer: String,
    },

    /// Show the virtue petitions said after each decade of a mystery
    Decades {
        /// Joyful, Sorrowful, Glorious or Luminous
        mystery: String,
    },

    /// Suggest novenas for upcoming feasts
    Recommend {
        /// Date to compute from (YYYY-MM-DD), defaults to today
        #[arg(long)]
        today: Option<NaiveDate>,

        /// Directory of {year}.json liturgical calendars
        #[arg(long)]
        calendar_dir: Option<PathBuf>,

        /// Include dismissed recommendations
        #[arg(long)]
        all: bool,
    },

    /// Hide a recommendation by id
    Dismiss {
        /// Recommendation id as printed by `recommend`
        id: String,
    },

    /// Mark a 9-day novena as active, by recommendation id or novena type
    Begin {
        /// Recommendation id as printed by `recommend`, or a novena type
        id: String,

        /// Date to resolve recommendations from (YYYY-MM-DD), defaults to today
        #[arg(long)]
        today: Option<NaiveDate>,

        /// Directory of {year}.json liturgical calendars
        #[arg(long)]
        calendar_dir: Option<PathBuf>,
    },

    /// Mark an active 9-day novena as finished
    Finish {
        /// Novena type, e.g. assumption-novena
        novena_type: String,
    },
}

struct DataPaths {
    progress: PathBuf,
}

impl DataPaths {
    fn new(data_dir: &Path) -> Self {
        Self {
            progress: data_dir.join("progress.json"),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    novena_core::logging::init_with_verbosity(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let paths = DataPaths::new(&data_dir);
    tracing::debug!("Using data directory {:?}", data_dir);

    match cli.command {
        Some(Commands::Start { intention, date }) => cmd_start(&paths, intention, date, &config),
        Some(Commands::Today {
            day,
            dry_run,
            auto_complete,
            date,
        }) => cmd_today(&paths, day, dry_run, auto_complete, date, &config),
        Some(Commands::History) => cmd_history(&paths),
        Some(Commands::Schedule) => cmd_schedule(&paths),
        Some(Commands::Beads { prayer }) => cmd_beads(&prayer),
        Some(Commands::Decades { mystery }) => cmd_decades(&mystery),
        Some(Commands::Recommend {
            today,
            calendar_dir,
            all,
        }) => cmd_recommend(&paths, today, calendar_dir, all, &config).await,
        Some(Commands::Dismiss { id }) => cmd_dismiss(&paths, id),
        Some(Commands::Begin {
            id,
            today,
            calendar_dir,
        }) => cmd_begin(&paths, id, today, calendar_dir, &config).await,
        Some(Commands::Finish { novena_type }) => cmd_finish(&paths, novena_type),
        None => cmd_today(&paths, None, false, false, None, &config),
    }
}

fn cmd_start(
    paths: &DataPaths,
    intention: Option<String>,
    date: Option<NaiveDate>,
    config: &Config,
) -> Result<()> {
    let intention = intention.unwrap_or_else(|| config.novena.default_intention.clone());
    let date = date.unwrap_or_else(|| Local::now().date_naive());

    NovenaProgress::update(&paths.progress, |progress| {
        progress.start(intention.clone(), date);
        Ok(())
    })?;

    println!("✓ 54-day novena started on {}", date);
    println!("  Intention: {}", intention);
    println!("  Petition ends on {}", date + chrono::Duration::days(26));
    println!("  Thanksgiving ends on {}", date + chrono::Duration::days(53));
    Ok(())
}

fn cmd_today(
    paths: &DataPaths,
    day: Option<u32>,
    dry_run: bool,
    auto_complete: bool,
    date: Option<NaiveDate>,
    config: &Config,
) -> Result<()> {
    let progress = NovenaProgress::load(&paths.progress)?;

    let day = match day {
        Some(d) => NovenaDay::new(d)?,
        None => {
            if !progress.is_started() {
                return Err(Error::State(
                    "no novena in progress; run `novena start` first".into(),
                ));
            }
            match progress.next_day() {
                Some(d) => NovenaDay::new(d)?,
                None => {
                    println!("✓ All 54 days are complete. Deo gratias!");
                    return Ok(());
                }
            }
        }
    };

    let intention = progress
        .intention
        .clone()
        .unwrap_or_else(|| config.novena.default_intention.clone());

    display_day(day, &intention);

    if dry_run {
        println!("\n[Dry run - not recording]");
        return Ok(());
    }

    if !auto_complete && !prompt_finished()? {
        println!("Not recorded.");
        return Ok(());
    }

    let date = date.unwrap_or_else(|| Local::now().date_naive());
    let progress = NovenaProgress::update(&paths.progress, |p| p.complete_day(day.get(), date))?;

    println!("\n✓ Day {} recorded!", day.get());
    match progress.next_day() {
        Some(next) => println!("  Next: day {} ({} Mysteries)", next, mystery_for_day(next)),
        None => println!("  The novena is complete."),
    }

    Ok(())
}

fn cmd_history(paths: &DataPaths) -> Result<()> {
    let progress = NovenaProgress::load(&paths.progress)?;
    let history = progress.history();

    if history.is_empty() {
        println!("No days prayed yet.");
        return Ok(());
    }

    for record in &history {
        let prayed_on = record
            .prayed_on
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "Day {:>2}  {:<12}  {:<10}  {} Mysteries",
            record.day,
            record.phase.to_string(),
            prayed_on,
            record.mystery
        );
    }
    println!();
    println!("{} of 54 days prayed", history.len());
    Ok(())
}

fn cmd_schedule(paths: &DataPaths) -> Result<()> {
    let progress = NovenaProgress::load(&paths.progress)?;

    for (day, info) in novena_schedule() {
        let mark = if progress.completed_days.contains(&day) {
            "✓"
        } else {
            " "
        };
        println!(
            "{} Day {:>2}  {:<12}  cycle {}  {} Mysteries",
            mark,
            day,
            info.phase.to_string(),
            info.cycle,
            info.mystery
        );
    }
    Ok(())
}

fn cmd_beads(prayer: &str) -> Result<()> {
    let errors = novena_core::beads::bead_catalog().validate();
    if !errors.is_empty() {
        eprintln!("Bead layout validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::Other("Invalid bead layouts".into()));
    }

    let config = rosary_config_by_name(prayer);
    let mapping = step_mapping(config.prayer_type);

    println!("{} ({} beads)", config.name, config.total_beads);
    println!();

    for entry in mapping {
        let bead = config.bead(entry.bead_index);
        let kind = bead.map(|b| bead_kind(b.bead_type)).unwrap_or("?");
        let label = bead.and_then(|b| b.label.as_deref()).unwrap_or("");
        println!(
            "  step {:>2}  {:<16} → bead {:>2}  {:<6} {}",
            entry.step_index, entry.step_id, entry.bead_index, kind, label
        );
    }
    Ok(())
}

fn cmd_decades(mystery: &str) -> Result<()> {
    let petitions = novena_core::prayers::decade_prayers_by_name(mystery);
    if petitions.is_empty() {
        println!("No decade petitions for '{}'", mystery);
        return Ok(());
    }

    for (index, petition) in petitions.iter().enumerate() {
        println!("{}. {}", index + 1, petition);
    }
    Ok(())
}

fn recommender(
    calendar_dir: Option<PathBuf>,
    config: &Config,
) -> NovenaRecommender<Box<dyn CalendarProvider>> {
    let provider: Box<dyn CalendarProvider> =
        match calendar_dir.or_else(|| config.liturgical.calendar_dir.clone()) {
            Some(dir) => Box::new(JsonCalendarProvider::new(dir)),
            None => Box::new(BundledCalendarProvider),
        };
    let calendar = FeastCalendar::new(provider).with_timeout(config.liturgical.provider_timeout());
    NovenaRecommender::new(calendar, config.liturgical.recommendations.clone())
}

async fn cmd_recommend(
    paths: &DataPaths,
    today: Option<NaiveDate>,
    calendar_dir: Option<PathBuf>,
    all: bool,
    config: &Config,
) -> Result<()> {
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let progress = NovenaProgress::load(&paths.progress)?;

    let mut request = progress.recommendation_request();
    if all {
        request.dismissed.clear();
    }

    let recommendations = recommender(calendar_dir, config)
        .recommendations(today, &request)
        .await;

    if recommendations.is_empty() {
        println!("No novena recommendations right now.");
        return Ok(());
    }

    for rec in &recommendations {
        display_recommendation(rec);
    }
    Ok(())
}

async fn cmd_begin(
    paths: &DataPaths,
    id: String,
    today: Option<NaiveDate>,
    calendar_dir: Option<PathBuf>,
    config: &Config,
) -> Result<()> {
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let progress = NovenaProgress::load(&paths.progress)?;

    let novena_type = if is_known_novena_type(&id) {
        id.clone()
    } else {
        let mut request = progress.recommendation_request();
        request.dismissed.clear();
        let recommendations = recommender(calendar_dir, config)
            .recommendations(today, &request)
            .await;
        recommendations
            .into_iter()
            .find(|rec| rec.id == id)
            .and_then(|rec| rec.novena_type)
            .ok_or_else(|| Error::Other(format!("no current recommendation with id {}", id)))?
    };

    let mut newly_begun = false;
    NovenaProgress::update(&paths.progress, |progress| {
        newly_begun = progress.begin_novena(&novena_type)?;
        Ok(())
    })?;

    if newly_begun {
        println!("✓ Began {}", novena_type);
    } else {
        println!("{} is already active", novena_type);
    }
    Ok(())
}

fn cmd_finish(paths: &DataPaths, novena_type: String) -> Result<()> {
    let mut finished = false;
    NovenaProgress::update(&paths.progress, |progress| {
        finished = progress.finish_novena(&novena_type);
        Ok(())
    })?;

    if finished {
        println!("✓ Finished {}", novena_type);
    } else {
        println!("{} is not active", novena_type);
    }
    Ok(())
}

fn is_known_novena_type(name: &str) -> bool {
    novena_core::recommend::FEAST_NOVENA_MAPPINGS
        .iter()
        .any(|m| m.novena_type == name)
}

fn cmd_dismiss(paths: &DataPaths, id: String) -> Result<()> {
    let mut newly_dismissed = false;
    NovenaProgress::update(&paths.progress, |progress| {
        newly_dismissed = progress.dismiss(id.clone());
        Ok(())
    })?;

    if newly_dismissed {
        println!("✓ Dismissed {}", id);
    } else {
        println!("{} was already dismissed", id);
    }
    Ok(())
}

fn display_day(day: NovenaDay, intention: &str) {
    let info = day.cycle_info();
    let prayer_type = PrayerType::FiftyFourDayNovena;
    let layout = rosary_config(prayer_type);

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  Day {} of 54", day.get());
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Phase: {}  (cycle {} of 9)", info.phase, info.cycle);
    println!("  {} Mysteries", info.mystery);
    println!("  Intention: {}", intention);

    let steps = novena_core::prayers::novena_day_steps(day, Some(intention));
    for (index, step) in steps.iter().enumerate() {
        let bead = bead_index_for_step(index, prayer_type);
        let moved = index == 0 || bead_changed(index - 1, index, prayer_type);

        println!();
        if moved {
            let label = layout
                .bead(bead)
                .and_then(|b| b.label.as_deref())
                .unwrap_or("");
            println!("  ● bead {} {}", bead, label);
        }
        println!("  [{}/{}] {}", index + 1, steps.len(), step.title);
        for line in step.text.lines() {
            println!("    {}", line);
        }
    }
    println!();
}

fn display_recommendation(rec: &NovenaRecommendation) {
    let urgency = match rec.urgency {
        Urgency::High => "HIGH",
        Urgency::Medium => "MEDIUM",
        Urgency::Low => "LOW",
    };
    println!(
        "[{}] {} novena for {} ({})",
        urgency, rec.kind, rec.target_feast.name, rec.target_feast.date
    );
    println!("  {}", rec.message);
    match rec.days_until_start {
        0 => println!("  Starts today"),
        1 => println!("  Starts tomorrow"),
        d => println!("  Starts in {} days ({})", d, rec.start_date),
    }
    println!("  id: {}", rec.id);
    println!();
}

fn bead_kind(bead_type: BeadType) -> &'static str {
    match bead_type {
        BeadType::Cross => "cross",
        BeadType::LargeBead => "large",
        BeadType::SmallBead => "small",
        BeadType::Medal => "medal",
    }
}

/// Returns false if the user chose to quit without recording
fn prompt_finished() -> Result<bool> {
    println!("─────────────────────────────────────────");
    println!("Press Enter when you have finished praying");
    println!("  'q' + Enter to quit without recording");
    print!("> ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().to_lowercase() != "q")
}
