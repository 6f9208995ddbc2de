//! Solar path command line tool
//!
//! Prints the sun's position, daily events and projected map path for a
//! location and date, builds the JSON dashboard snapshot, plays the path
//! animation in the terminal and manages the feedback log.
//!
//! Usage:
//!   cargo run --bin sunpath -- times --place "Paris, France" --date 2026-06-21
//!   cargo run --bin sunpath -- dashboard --lat 35.68 --lon 139.65 --tz Asia/Tokyo --seasons

use std::path::PathBuf;
use std::process;
use std::sync::atomic::AtomicBool;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike, Utc};
use clap::{ArgAction, Args, Parser, Subcommand};
use log::LevelFilter;

use sunpath::config::AIRVISUAL_KEY_ENV;
use sunpath::dashboard::{below_horizon_warning, Dashboard, DashboardRequest};
use sunpath::data::{AirQualityClient, Geocoder, HttpClient};
use sunpath::feedback::FeedbackLog;
use sunpath::path::{seasonal_paths, step_minutes, Animation, DatePreset, DayPath};
use sunpath::session::{SessionContext, LOCATION_NOT_FOUND};
use sunpath::{SpaEphemeris, Settings, SolarProjector, SunTimes, SunpathError};

/// Type alias for the error type used throughout this module
type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Solar path visualizer
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Computes the sun's path and projects it onto a map around a location",
    long_about = None
)]
struct Cli {
    /// JSON settings file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sun position and map markers at one moment
    Position {
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Sunrise, sunset and solar noon
    Times {
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Sampled sun path from sunrise to sunset
    Path {
        #[command(flatten)]
        view: ViewArgs,

        /// Minutes between samples (defaults to the configured step)
        #[arg(long)]
        step: Option<u32>,

        /// Print the samples as JSON
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
    },
    /// Sun arcs for the four seasons of a year
    Seasons {
        #[command(flatten)]
        view: ViewArgs,

        /// Year to compare (defaults to the selected date's year)
        #[arg(long)]
        year: Option<i32>,
    },
    /// Look up a place name
    Geocode {
        /// Free-text place, e.g. "Paris, France"
        query: String,
    },
    /// Live air quality and weather
    Environment {
        #[command(flatten)]
        location: LocationArgs,

        /// AirVisual API key
        #[arg(long, env = AIRVISUAL_KEY_ENV, hide_env_values = true)]
        key: Option<String>,
    },
    /// Full dashboard snapshot as JSON
    Dashboard {
        #[command(flatten)]
        view: ViewArgs,

        /// Include the four-season comparison
        #[arg(long, action = ArgAction::SetTrue)]
        seasons: bool,

        /// Include live air quality and weather
        #[arg(long, action = ArgAction::SetTrue)]
        environment: bool,

        /// AirVisual API key
        #[arg(long, env = AIRVISUAL_KEY_ENV, hide_env_values = true)]
        key: Option<String>,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Play the day's path frame by frame
    Animate {
        #[command(flatten)]
        view: ViewArgs,

        /// Number of passes over the day
        #[arg(long, default_value_t = 1)]
        loops: usize,

        /// Milliseconds per frame (defaults to the configured interval)
        #[arg(long)]
        interval_ms: Option<u64>,
    },
    /// Submit or list feedback
    Feedback {
        #[command(subcommand)]
        action: FeedbackAction,
    },
}

#[derive(Subcommand, Debug)]
enum FeedbackAction {
    /// Append a feedback record
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        text: String,
    },
    /// Print all feedback records
    List,
}

#[derive(Args, Debug, Clone)]
struct LocationArgs {
    /// Latitude in degrees
    #[arg(long, allow_hyphen_values = true, default_value_t = 0.0)]
    lat: f64,

    /// Longitude in degrees
    #[arg(long, allow_hyphen_values = true, default_value_t = 0.0)]
    lon: f64,

    /// Place name to geocode instead of --lat/--lon
    #[arg(long, conflicts_with_all = ["lat", "lon"])]
    place: Option<String>,

    /// IANA timezone, e.g. Europe/Paris (defaults to the zone at the location)
    #[arg(long)]
    tz: Option<String>,
}

#[derive(Args, Debug, Clone)]
struct ViewArgs {
    #[command(flatten)]
    location: LocationArgs,

    /// Local date, YYYY-MM-DD (defaults to today)
    #[arg(long, conflicts_with = "preset")]
    date: Option<NaiveDate>,

    /// Key date: spring, summer, autumn or winter
    #[arg(long)]
    preset: Option<DatePreset>,

    /// Local time, HH:MM (defaults to the current hour)
    #[arg(long)]
    time: Option<String>,

    /// Map radius in metres
    #[arg(long)]
    radius: Option<f64>,
}

/// Prints a section header with a title and separator line
fn print_section_header(title: &str) {
    println!("\n{}:", title);
    println!("-------------------------------------------------------");
}

/// Helper to print named values in a formatted way
fn print_named_value(name: &str, value: impl std::fmt::Display) {
    println!("{:<16} {}", format!("{}:", name), value);
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn"),
    );
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    let _ = builder.try_init();
}

fn http_client(settings: &Settings) -> Result<HttpClient> {
    Ok(HttpClient::with_timeout(settings.http_timeout())?)
}

/// Move the session to the requested location
fn locate(session: &mut SessionContext, args: &LocationArgs, settings: &Settings) -> Result<()> {
    match &args.place {
        Some(place) => {
            let client = http_client(settings)?;
            session.search(&Geocoder::new(&client), place)?;
        }
        None => session.select_from_map(sunpath::GeoPoint::new(args.lat, args.lon))?,
    }
    session.set_timezone(args.tz.as_deref())?;
    Ok(())
}

/// Build the session for a view: location, date, time and radius
fn session_for(view: &ViewArgs, settings: &Settings) -> Result<SessionContext> {
    let now = Utc::now();
    let mut session = SessionContext::new(now.date_naive(), now.hour());
    session.set_radius(settings.radius_m())?;
    locate(&mut session, &view.location, settings)?;

    // Today and the current hour in the observer's zone
    let local_now = now.with_timezone(&session.observer()?.timezone);
    session.set_date(local_now.date_naive());
    session.set_time(local_now.hour(), 0)?;

    if let Some(date) = view.date {
        session.set_date(date);
    }
    if let Some(preset) = view.preset {
        session.apply_preset(preset, session.date().year())?;
    }
    if let Some(time) = &view.time {
        let t = NaiveTime::parse_from_str(time, "%H:%M")
            .map_err(|e| SunpathError::InvalidInput(format!("Invalid time '{}': {}", time, e)))?;
        session.set_time(t.hour(), t.minute())?;
    }
    if let Some(radius) = view.radius {
        session.set_radius(radius)?;
    }
    Ok(session)
}

fn projector(settings: &Settings) -> SolarProjector<SpaEphemeris> {
    SolarProjector::new(SpaEphemeris::new().with_refraction(settings.refraction()))
}

fn cmd_position(view: &ViewArgs, settings: &Settings) -> Result<()> {
    let session = session_for(view, settings)?;
    let observer = session.observer()?;
    let instant = session.sim_time()?;
    let p = projector(settings).project(&observer, &instant, session.radius_m())?;

    print_section_header("Sun Position");
    print_named_value("Location", observer.position.format_coordinates());
    print_named_value("Time", instant.format("%Y-%m-%d %H:%M %Z"));
    print_named_value("Azimuth", format!("{:.1}°", p.azimuth));
    print_named_value("Elevation", format!("{:.1}°", p.elevation));
    print_named_value("Sun marker", p.sun.format_coordinates());
    print_named_value("Shadow end", p.shadow.format_coordinates());
    if let Some(warning) = below_horizon_warning(p.elevation) {
        println!("\n{}", warning);
    }
    Ok(())
}

fn cmd_times(view: &ViewArgs, settings: &Settings) -> Result<()> {
    let session = session_for(view, settings)?;
    let observer = session.observer()?;
    let projector = projector(settings);
    let times = SunTimes::for_date(projector.ephemeris(), &observer, session.date())?;
    let labels = times.labels();
    let length = times.day_length();

    print_section_header(&format!("Sun Times for {}", session.date()));
    print_named_value("Location", observer.position.format_coordinates());
    print_named_value("Timezone", observer.timezone.name());
    print_named_value("Sunrise", &labels.sunrise);
    print_named_value("Solar noon", &labels.noon);
    print_named_value("Sunset", &labels.sunset);
    print_named_value(
        "Day length",
        format!("{}h {:02}m", length.num_hours(), length.num_minutes() % 60),
    );
    if times.fallback {
        println!("\nThe sun does not rise or set on this date; fixed times shown.");
    }
    Ok(())
}

fn cmd_path(view: &ViewArgs, step: Option<u32>, json: bool, settings: &Settings) -> Result<()> {
    let session = session_for(view, settings)?;
    let observer = session.observer()?;
    let step = step_minutes(step.unwrap_or(settings.step_minutes()))?;
    let day = DayPath::sample(&projector(settings), &observer, session.date(), session.radius_m(), step)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&day.samples)?);
        return Ok(());
    }

    print_section_header(&format!("Sun Path for {}", session.date()));
    println!("{:>6} {:>9} {:>9} {:>22}", "Time", "Azimuth", "Elev.", "Sun marker");
    for s in &day.samples {
        println!(
            "{:>6} {:>8.1}° {:>8.1}° {:>22}",
            s.time,
            s.azimuth,
            s.elevation,
            s.sun.format_coordinates()
        );
    }
    print_named_value("Sunrise ray", day.sunrise_ray.format_coordinates());
    print_named_value("Sunset ray", day.sunset_ray.format_coordinates());
    if let Some(peak) = day.peak_elevation() {
        print_named_value("Peak elevation", format!("{:.1}°", peak));
    }
    Ok(())
}

fn cmd_seasons(view: &ViewArgs, year: Option<i32>, settings: &Settings) -> Result<()> {
    let session = session_for(view, settings)?;
    let observer = session.observer()?;
    let year = year.unwrap_or_else(|| session.date().year());
    let step = step_minutes(settings.seasonal_step_minutes())?;
    let paths = seasonal_paths(&projector(settings), &observer, year, session.radius_m(), step)?;

    print_section_header(&format!("Seasonal Comparison {}", year));
    for path in &paths {
        print_named_value(path.label, format!("{} points ({})", path.coords.len(), path.color));
    }
    Ok(())
}

fn cmd_geocode(query: &str, settings: &Settings) -> Result<()> {
    let client = http_client(settings)?;
    match Geocoder::new(&client).search(query) {
        Some(place) => {
            print_named_value("Coordinates", place.point.format_coordinates());
            if let Some(name) = place.display_name {
                print_named_value("Place", name);
            }
            Ok(())
        }
        None => Err(SunpathError::LocationNotFound(query.to_string()).into()),
    }
}

fn cmd_environment(location: &LocationArgs, key: Option<String>, settings: &Settings) -> Result<()> {
    let now = Utc::now();
    let mut session = SessionContext::new(now.date_naive(), now.hour());
    locate(&mut session, location, settings)?;
    session.set_environment_enabled(true);

    let client = http_client(settings)?;
    let key = key.or_else(|| settings.airvisual_key().map(str::to_string));
    let mut air = AirQualityClient::new(&client, key);
    session.refresh_environment(&mut air);

    if let Some(env) = session.environment() {
        let display = env.display();
        print_section_header("Environment");
        print_named_value("Location", session.coords().format_coordinates());
        print_named_value("AQI (US)", format!("{} ({})", display.aqi, display.label));
        print_named_value("Temperature", format!("{}°C", display.temperature));
        print_named_value("Humidity", format!("{}%", display.humidity));
        print_named_value("Wind", format!("{} m/s", display.wind));
    }
    Ok(())
}

fn cmd_dashboard(
    view: &ViewArgs,
    seasons: bool,
    environment: bool,
    key: Option<String>,
    output: Option<&PathBuf>,
    settings: &Settings,
) -> Result<()> {
    let mut session = session_for(view, settings)?;
    let today = Utc::now()
        .with_timezone(&session.observer()?.timezone)
        .date_naive();

    if environment {
        session.set_environment_enabled(true);
        let client = http_client(settings)?;
        let key = key.or_else(|| settings.airvisual_key().map(str::to_string));
        session.refresh_environment(&mut AirQualityClient::new(&client, key));
    }

    let mut request = DashboardRequest::from_session(&session, settings, today)?;
    if seasons {
        request = request.with_seasons(session.date().year());
    }
    let json = Dashboard::build(&projector(settings), &request)?.to_json()?;

    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            println!("Dashboard written to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn cmd_animate(view: &ViewArgs, loops: usize, interval_ms: Option<u64>, settings: &Settings) -> Result<()> {
    let session = session_for(view, settings)?;
    let observer = session.observer()?;
    let step = step_minutes(settings.step_minutes())?;
    let day = DayPath::sample(&projector(settings), &observer, session.date(), session.radius_m(), step)?;

    let interval = interval_ms
        .map(std::time::Duration::from_millis)
        .unwrap_or_else(|| settings.animation_interval());
    let mut animation = Animation::from_samples(&day.samples, &settings.display_options(), interval);
    let budget = animation.len() * loops;
    let cancel = AtomicBool::new(false);

    animation.play(Some(budget), &cancel, |frame| {
        let marker = if frame.is_visible() { "☀" } else { " " };
        println!(
            "{} {} el {:>5.1}°  sun {}  shadow {}",
            frame.time,
            marker,
            frame.elevation,
            frame.sun.format_coordinates(),
            frame.shadow.format_coordinates()
        );
    });
    Ok(())
}

fn cmd_feedback(action: &FeedbackAction, settings: &Settings) -> Result<()> {
    let log = FeedbackLog::new(settings.feedback_path());
    match action {
        FeedbackAction::Add { name, text } => {
            let record = log.submit(name, text)?;
            println!("Thanks, {}! Feedback saved.", record.name);
        }
        FeedbackAction::List => {
            let records = log.records()?;
            if records.is_empty() {
                println!("No feedback yet.");
            }
            for r in records {
                println!("[{}] {}: {}", r.timestamp.format("%Y-%m-%d %H:%M"), r.name, r.text);
            }
        }
    }
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref())?;

    match &cli.command {
        Command::Position { view } => cmd_position(view, &settings),
        Command::Times { view } => cmd_times(view, &settings),
        Command::Path { view, step, json } => cmd_path(view, *step, *json, &settings),
        Command::Seasons { view, year } => cmd_seasons(view, *year, &settings),
        Command::Geocode { query } => cmd_geocode(query, &settings),
        Command::Environment { location, key } => cmd_environment(location, key.clone(), &settings),
        Command::Dashboard {
            view,
            seasons,
            environment,
            key,
            output,
        } => cmd_dashboard(view, *seasons, *environment, key.clone(), output.as_ref(), &settings),
        Command::Animate {
            view,
            loops,
            interval_ms,
        } => cmd_animate(view, *loops, *interval_ms, &settings),
        Command::Feedback { action } => cmd_feedback(action, &settings),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        match e.downcast_ref::<SunpathError>() {
            Some(SunpathError::LocationNotFound(_)) => eprintln!("{}", LOCATION_NOT_FOUND),
            _ => eprintln!("Error: {}", e),
        }
        process::exit(1);
    }
}
