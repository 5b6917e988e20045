use chrono::{Duration, Utc};
use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Live feed websocket URL
    #[clap(long, default_value = "ws://localhost:8080/ws")]
    url: String,

    /// Report interval in seconds
    #[clap(short, long, default_value_t = 10)]
    report_interval_seconds: u64,
}

struct Stats {
    // (arrival, payload size) per binary frame
    frame_log: VecDeque<(chrono::DateTime<Utc>, usize)>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let stats = Arc::new(Mutex::new(Stats {
        frame_log: VecDeque::new(),
    }));

    // Reporter task: rolling one-minute frame rate and average payload size
    let stats_reporter = Arc::clone(&stats);
    tokio::spawn(async move {
        loop {
            sleep(std::time::Duration::from_secs(args.report_interval_seconds)).await;
            let one_minute_ago = Utc::now() - Duration::minutes(1);

            let mut data = stats_reporter.lock().unwrap();
            while data
                .frame_log
                .front()
                .is_some_and(|&(t, _)| t < one_minute_ago)
            {
                data.frame_log.pop_front();
            }

            let frames = data.frame_log.len();
            let bytes: usize = data.frame_log.iter().map(|&(_, n)| n).sum();
            let avg = if frames > 0 { bytes / frames } else { 0 };
            println!(
                "--- Report: {} frames/min, {} bytes total, avg {} bytes/frame ---",
                frames, bytes, avg
            );
        }
    });

    println!("Connecting to {}...", args.url);
    let (ws_stream, _) = connect_async(&args.url)
        .await
        .expect("Failed to connect to live feed");
    let (mut write, mut read) = ws_stream.split();

    // Identify before frames flow
    write
        .send(Message::Text("client".into()))
        .await
        .expect("Failed to send client token");
    println!("✅ Connected and identified. Counting binary frames...");

    while let Some(msg) = read.next().await {
        match msg {
            Ok(Message::Binary(frame)) => {
                let mut data = stats.lock().unwrap();
                data.frame_log.push_back((Utc::now(), frame.len()));
            }
            Ok(Message::Text(text)) => {
                println!("Text from feed: {}", text);
            }
            Ok(Message::Close(_)) => {
                println!("Feed closed the connection.");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Feed error: {}", e);
                break;
            }
        }
    }
}
