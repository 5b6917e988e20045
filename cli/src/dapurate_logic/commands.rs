use std::io::Write as _;
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;

use anyhow::Result;
use lib_common::{
    capture_snapshot, format_label, today_local, BufferLedger, CaptureFlash, DapurApi,
    LiveFeedSession, SampleDetail, Scoreboard, DEFAULT_PER_PAGE, FLASH_DURATION,
};

use super::config::Config;

/// Everything the interactive console owns: the REST client, the published
/// scoreboard, the live feed session, and at most one open sample detail.
struct Dashboard {
    api: DapurApi,
    scoreboard: Scoreboard,
    session: LiveFeedSession,
    flash: CaptureFlash,
    detail: Option<SampleDetail>,
    date: NaiveDate,
    ledger: Arc<BufferLedger>,
}

pub async fn run(config: Config) -> Result<()> {
    let api_base = config
        .api_base_url
        .clone()
        .unwrap_or_else(|| "http://localhost:8080/".to_string());
    let ws_url = config
        .ws_url
        .clone()
        .unwrap_or_else(|| "ws://localhost:8080/ws".to_string());
    let per_page = config.page_size.unwrap_or(DEFAULT_PER_PAGE);

    let ledger = BufferLedger::new();
    let mut dash = Dashboard {
        api: DapurApi::new(&api_base),
        scoreboard: Scoreboard::new(per_page),
        session: LiveFeedSession::new(ws_url, &ledger),
        flash: CaptureFlash::new(),
        detail: None,
        date: today_local(),
        ledger,
    };

    log::info!("Console started against {}", api_base);
    println!("Dapurate console. Type 'help' for commands.");
    dash.select_date(dash.date).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt();
    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                println!();
                log::info!("Ctrl-C received, shutting down.");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !dash.dispatch(line.trim()).await {
                    break;
                }
                prompt();
            }
        }
    }

    dash.session.disconnect();
    log::info!("Shutdown complete.");
    Ok(())
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

impl Dashboard {
    /// Handles one console line. Returns `false` when the console should exit.
    async fn dispatch(&mut self, line: &str) -> bool {
        let mut words = line.split_whitespace();
        match words.next() {
            None => {}
            Some("help") => print_help(),
            Some("date") => match words.next().map(|w| NaiveDate::parse_from_str(w, "%Y-%m-%d")) {
                Some(Ok(date)) => self.select_date(date).await,
                _ => println!("usage: date YYYY-MM-DD"),
            },
            Some("today") => self.select_date(today_local()).await,
            Some("next") => {
                self.scoreboard.next_page();
                self.print_scoreboard();
            }
            Some("prev") => {
                self.scoreboard.prev_page();
                self.print_scoreboard();
            }
            Some("connect") => {
                self.session.connect();
                println!("connecting to live feed");
            }
            Some("disconnect") => {
                self.session.disconnect();
                println!("live feed disconnected");
            }
            Some("status") => {
                println!(
                    "session {:?} | live buffers {} ({} bytes)",
                    self.session.state(),
                    self.ledger.live_handles(),
                    self.ledger.live_bytes(),
                );
            }
            Some("save") => match (words.next(), self.session.latest_frame()) {
                (Some(path), Some(frame)) => match std::fs::write(path, &frame) {
                    Ok(()) => println!("wrote {} bytes to {}", frame.len(), path),
                    Err(e) => println!("could not write {}: {}", path, e),
                },
                (Some(_), None) => println!("no frame received yet"),
                (None, _) => println!("usage: save <path>"),
            },
            Some("shoot") => {
                if capture_snapshot(&self.api, &mut self.flash).await {
                    println!(
                        "📸 capture confirmed (flash {}ms)",
                        FLASH_DURATION.as_millis()
                    );
                    self.select_date(self.date).await;
                } else {
                    println!("capture request was not confirmed");
                }
            }
            Some("open") => match words.next().and_then(|w| w.parse::<i64>().ok()) {
                Some(id) => {
                    let mut detail = SampleDetail::new(id, &self.ledger);
                    detail.load_all(&self.api).await;
                    print_detail(&detail);
                    self.detail = Some(detail);
                }
                None => println!("usage: open <sample id>"),
            },
            Some("toggle") => match self.detail.as_mut() {
                Some(detail) => {
                    if detail.toggle_clean(&self.api).await {
                        print_detail(detail);
                    } else {
                        println!("update failed, sample unchanged");
                    }
                }
                None => println!("no sample open (use 'open <id>')"),
            },
            Some("delete") => match self.detail.as_mut() {
                Some(detail) => {
                    let id = detail.sample_id();
                    if detail.delete(&self.api).await {
                        println!("sample {} deleted", id);
                        self.detail = None;
                        self.select_date(self.date).await;
                    } else {
                        println!("delete failed, sample kept");
                    }
                }
                None => println!("no sample open (use 'open <id>')"),
            },
            Some("close") => {
                self.detail = None;
                self.print_scoreboard();
            }
            Some("quit") | Some("exit") => return false,
            Some(other) => println!("unknown command '{}' (try 'help')", other),
        }
        true
    }

    async fn select_date(&mut self, date: NaiveDate) {
        self.date = date;
        self.scoreboard.select_date(&self.api, date).await;
        self.print_scoreboard();
    }

    fn print_scoreboard(&self) {
        let state = self.scoreboard.snapshot();
        println!("── scoreboard for {} ──", self.date);
        match &state.summary {
            Some(s) => println!(
                "score {:.1} | clean {} | dirty {} | total {}",
                s.score,
                s.clean_sample,
                s.dirty_sample(),
                s.total_sample,
            ),
            None => println!("no score recorded"),
        }
        let (page_items, page, total_pages) = self.scoreboard.page_view();
        println!("samples (page {}/{}):", page, total_pages);
        for sample in &page_items {
            println!(
                "  #{:<6} {}  {}",
                sample.id,
                sample.created_at.format("%H:%M:%S"),
                if sample.is_clean { "clean" } else { "dirty" },
            );
        }
        if page_items.is_empty() {
            println!("  (none)");
        }
    }
}

fn print_detail(detail: &SampleDetail) {
    println!("── sample {} ──", detail.sample_id());
    match &detail.sample {
        Some(s) => println!(
            "captured {} | {}",
            s.created_at.format("%Y-%m-%d %H:%M:%S"),
            if s.is_clean { "clean" } else { "dirty" },
        ),
        None => println!("record unavailable"),
    }
    match detail.raw.latest() {
        Some(raw) => println!("raw image: {} bytes", raw.len()),
        None => println!("raw image: missing"),
    }
    match detail.result.latest() {
        Some(result) => println!("result image: {} bytes", result.len()),
        None => println!("result image: missing"),
    }
    if detail.violations.is_empty() {
        println!("violations: none");
    } else {
        println!("violations:");
        for v in &detail.violations {
            println!("  {} x{}", format_label(&v.name), v.total);
        }
    }
}

fn print_help() {
    println!("commands:");
    println!("  date YYYY-MM-DD   load the scoreboard for a day");
    println!("  today             load the scoreboard for today");
    println!("  next / prev       page through the sample list");
    println!("  open <id>         open a sample's detail view");
    println!("  toggle            flip the open sample between clean and dirty");
    println!("  delete            delete the open sample");
    println!("  close             close the detail view");
    println!("  connect           start the live camera feed");
    println!("  disconnect        stop the live camera feed");
    println!("  save <path>       write the latest live frame to a file");
    println!("  shoot             trigger a capture on the backend");
    println!("  status            show feed state and buffer accounting");
    println!("  quit              exit");
}
