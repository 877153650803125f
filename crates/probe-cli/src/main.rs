use std::env;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use contracts::GameState;
use probe_api::{serve, Clock, ReconciliationStore, Scheduler, SystemClock};
use probe_core::economy::Economy;
use probe_core::session::Session;
use tracing::warn;

const AUTOSAVE_PERIOD: Duration = Duration::from_secs(30);
const TICK_PERIOD: Duration = Duration::from_millis(250);

fn print_usage() {
    println!("probe-cli <command>");
    println!("commands:");
    println!("  status");
    println!("  mine");
    println!("  replicate");
    println!("  travel <location>");
    println!("  buy <upgrade>");
    println!("  play [seconds]");
    println!("    runs a local session (default 60s), autosaving every 30s");
    println!("  reset");
    println!("  serve [addr]");
    println!("    default addr: 127.0.0.1:3000");
}

fn default_sqlite_path() -> String {
    env::var("PROBE_SQLITE_PATH")
        .ok()
        .filter(|path| !path.trim().is_empty())
        .unwrap_or_else(|| "probe_idle.sqlite".to_string())
}

fn parse_socket_addr(value: Option<&String>) -> Result<SocketAddr, String> {
    let raw = value.map(String::as_str).unwrap_or("127.0.0.1:3000");
    raw.parse::<SocketAddr>()
        .map_err(|_| format!("invalid addr: {raw}"))
}

fn open_store() -> Result<ReconciliationStore, String> {
    ReconciliationStore::open(default_sqlite_path(), Economy::default_catalogs())
        .map_err(|err| format!("failed to open snapshot store: {err}"))
}

fn print_state(state: &GameState, economy: &Economy) {
    let location = economy
        .locations()
        .node(&state.current_location)
        .map(|node| node.name.as_str())
        .unwrap_or(state.current_location.as_str());

    println!(
        "resources={:.1} probes={} rate={:.1} location={} next_probe_cost={:.0} total_mined={:.1}",
        state.resources,
        state.probes,
        state.mining_rate,
        location,
        state.replication_cost,
        state.total_mined
    );
}

fn report_idle(idle_earnings: f64) {
    if idle_earnings > 0.0 {
        println!("earned {idle_earnings:.0} resources while away");
    }
}

async fn show_status() -> Result<(), String> {
    let store = open_store()?;
    let loaded = store.load().await.map_err(|err| err.to_string())?;

    report_idle(loaded.idle_earnings);
    print_state(&loaded.state, store.economy());
    Ok(())
}

/// Load the snapshot (folding in idle earnings), apply one manual action, and
/// save the result back.
async fn with_loaded_state<F>(action: F) -> Result<(), String>
where
    F: FnOnce(&Economy, &mut GameState) -> Result<String, String>,
{
    let store = open_store()?;
    let loaded = store.load().await.map_err(|err| err.to_string())?;
    report_idle(loaded.idle_earnings);

    let mut state = loaded.state;
    let message = action(store.economy(), &mut state)?;
    store.save(&state).await.map_err(|err| err.to_string())?;

    println!("{message}");
    print_state(&state, store.economy());
    Ok(())
}

/// Continuous local session: the scheduler drives fine-grained ticks, the
/// snapshot is autosaved on a fixed cadence and once more on exit. Save
/// failures are logged and the session keeps ticking.
async fn run_play(seconds: u64) -> Result<(), String> {
    let store = open_store()?;
    let loaded = store.load().await.map_err(|err| err.to_string())?;
    report_idle(loaded.idle_earnings);

    let clock = SystemClock;
    let mut session = Session::new(loaded.state, clock.now_ms());

    let (tick_tx, mut tick_rx) = tokio::sync::mpsc::channel::<()>(1);
    let mut ticker = Scheduler::start(TICK_PERIOD, move || {
        let _ = tick_tx.try_send(());
    });

    let started = Instant::now();
    let mut last_autosave = Instant::now();
    let mut last_report = Instant::now();

    while started.elapsed() < Duration::from_secs(seconds) {
        if tick_rx.recv().await.is_none() {
            break;
        }
        session.advance(store.economy(), clock.now_ms());

        if last_report.elapsed() >= Duration::from_secs(5) {
            last_report = Instant::now();
            print_state(session.state(), store.economy());
        }

        if last_autosave.elapsed() >= AUTOSAVE_PERIOD {
            last_autosave = Instant::now();
            if let Err(err) = store.save(session.state()).await {
                warn!("autosave failed, session continues locally: {err}");
            }
        }
    }
    ticker.stop();

    session.advance(store.economy(), clock.now_ms());
    store
        .save(session.state())
        .await
        .map_err(|err| format!("final save failed: {err}"))?;

    println!("session saved");
    print_state(session.state(), store.economy());
    Ok(())
}

async fn run_reset() -> Result<(), String> {
    let store = open_store()?;
    store.reset().await.map_err(|err| err.to_string())?;
    println!("game reset to defaults");
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(String::as_str);

    let outcome = match command {
        Some("status") => show_status().await,
        Some("mine") => {
            with_loaded_state(|economy, state| {
                let gained = economy.mine_once(state);
                Ok(format!("mined {gained:.1}"))
            })
            .await
        }
        Some("replicate") => {
            with_loaded_state(|economy, state| {
                economy.replicate(state).map_err(|err| err.to_string())?;
                Ok("replicated one probe".to_string())
            })
            .await
        }
        Some("travel") => match args.get(2).cloned() {
            Some(target) => {
                with_loaded_state(move |economy, state| {
                    economy
                        .travel(state, &target)
                        .map_err(|err| err.to_string())?;
                    Ok(format!("arrived at {target}"))
                })
                .await
            }
            None => {
                eprintln!("error: missing location");
                print_usage();
                std::process::exit(2);
            }
        },
        Some("buy") => match args.get(2).cloned() {
            Some(upgrade) => {
                with_loaded_state(move |economy, state| {
                    economy
                        .purchase_upgrade(state, &upgrade)
                        .map_err(|err| err.to_string())?;
                    Ok(format!("purchased {upgrade}"))
                })
                .await
            }
            None => {
                eprintln!("error: missing upgrade");
                print_usage();
                std::process::exit(2);
            }
        },
        Some("play") => {
            let seconds = args.get(2).and_then(|v| v.parse::<u64>().ok()).unwrap_or(60);
            run_play(seconds).await
        }
        Some("reset") => run_reset().await,
        Some("serve") => match parse_socket_addr(args.get(2)) {
            Ok(addr) => match open_store() {
                Ok(store) => {
                    println!("serving api on http://{addr}");
                    if let Err(err) = serve(addr, store).await {
                        eprintln!("server error: {err}");
                        std::process::exit(1);
                    }
                    Ok(())
                }
                Err(err) => Err(err),
            },
            Err(err) => {
                eprintln!("error: {err}");
                print_usage();
                std::process::exit(2);
            }
        },
        _ => {
            print_usage();
            return;
        }
    };

    if let Err(err) = outcome {
        eprintln!("error: {err}");
        std::process::exit(2);
    }
}
