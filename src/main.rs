use chrono::NaiveDate;
use log::{error, info};

use shift_calendar::config::AppConfig;
use shift_calendar::display::print_calendar;
use shift_calendar::roster::generate::{sample_requirements, sample_staff};
use shift_calendar::roster::{generate_for_month, DEFAULT_MAX_CONSECUTIVE_DAYS};
use shift_calendar::session::HttpIdentityProvider;
use shift_calendar::{
    web, Clock, HttpRosterSource, IdentityProvider, ScheduleLoader, SessionContext, Shift,
    SystemClock, YearMonth,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env()?;
    let args: Vec<String> = std::env::args().collect();

    // Check if we should run in server mode
    if args.len() > 1 && args[1] == "serve" {
        let port = match args.get(2) {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| format!("Invalid port {:?}: {}", raw, e))?,
            None => 8080,
        };

        info!("Starting roster server on port {}", port);
        info!("Access the API at http://localhost:{}/api/schedule", port);

        web::start_server(port, config).await?;
        return Ok(());
    }

    // Print a generated roster: `generate [YYYY-MM]`
    if args.len() > 1 && args[1] == "generate" {
        let month = match args.get(2) {
            Some(raw) => NaiveDate::parse_from_str(&format!("{}-01", raw), "%Y-%m-%d")
                .map(|first| YearMonth::of(&first))
                .map_err(|e| format!("Invalid month {:?}: {}", raw, e))?,
            None => YearMonth::of(&SystemClock.today()),
        };

        let roster = generate_for_month(
            &sample_staff(),
            &sample_requirements(),
            month,
            DEFAULT_MAX_CONSECUTIVE_DAYS,
        )?;
        info!("Generated roster for {} with penalty {}", month, roster.penalty());
        println!("{}", serde_json::to_string_pretty(&roster.to_json())?);
        return Ok(());
    }

    let provider =
        HttpIdentityProvider::new(config.session_url.clone(), config.session_cookie.clone());
    let mut session = SessionContext::init(&provider).await;

    // Client mode: `show [YYYY-MM-DD] [day|swing|night]` or `logout`
    let rest: &[String] = match args.get(1).map(String::as_str) {
        Some("show") => &args[2..],
        Some("logout") => {
            if session.is_authenticated() {
                session.logout(&provider).await?;
            }
            println!("Signed out.");
            return Ok(());
        }
        Some(other) => {
            return Err(format!(
                "Unknown command {:?}, expected `serve`, `generate`, `show` or `logout`",
                other
            )
            .into());
        }
        None => &[],
    };
    let mut date: Option<NaiveDate> = None;
    let mut track: Option<Shift> = None;
    for arg in rest {
        if let Ok(d) = NaiveDate::parse_from_str(arg, "%Y-%m-%d") {
            date = Some(d);
        } else {
            track = Some(arg.parse()?);
        }
    }

    if !session.is_authenticated() {
        println!(
            "Not signed in. Sign in at {} and set SESSION_COOKIE.",
            provider.login_url()
        );
        return Ok(());
    }

    let source = HttpRosterSource::new(config.roster_url.clone())
        .with_session_cookie(config.session_cookie.clone());
    let mut loader = ScheduleLoader::new(source, SystemClock, config.fetch_timeout);

    if let Err(e) = loader.refresh().await {
        error!("{}", e);
    }

    let resolver = loader.resolver_mut();
    if let Some(track) = track {
        resolver.change_track(track);
    }
    if let Some(date) = date {
        resolver.on_month_navigate(YearMonth::of(&date));
        resolver.select_date(date);
    }

    print_calendar(loader.resolver(), loader.status(), &session);
    loader.teardown();

    Ok(())
}
