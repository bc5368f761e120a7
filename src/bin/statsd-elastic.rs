#![allow(unknown_lints)]

extern crate chrono;
extern crate fern;
extern crate statsd_elastic;

#[macro_use]
extern crate log;

use chrono::Utc;
use statsd_elastic::backend::Backend;
use statsd_elastic::backends::Elastic;
use statsd_elastic::config;
use statsd_elastic::metric::FlushEvent;
use statsd_elastic::time;
use statsd_elastic::transmit::Delivery;
use std::io::{self, BufRead, Write};
use std::process;

fn reap(done: Vec<Delivery>) {
    for delivery in done {
        match delivery.wait() {
            Ok(reply) => trace!("delivery finished with {}", reply.status),
            Err(e) => trace!("delivery failed: {}", e),
        }
    }
}

/// Collect deliveries that have already completed, keep the rest.
fn reap_finished(pending: &mut Vec<Delivery>) {
    let (done, live): (Vec<Delivery>, Vec<Delivery>) =
        pending.drain(..).partition(|d| d.is_finished());
    *pending = live;
    reap(done);
}

fn main() {
    let args = match config::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    let mut level = match args.verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    if args.elastic.debug && level < log::LevelFilter::Debug {
        level = log::LevelFilter::Debug;
    }

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}][{}] {}",
                record.target(),
                Utc::now().to_rfc3339(),
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(io::stdout())
        .apply()
        .expect("could not set up logging");

    info!("statsd-elastic - {}", args.version);

    let mut backend = Elastic::init(time::now(), args.elastic);
    let mut pending: Vec<Delivery> = Vec::new();

    // One command per line: `status`, or a JSON flush event.
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("Unable to read stdin: {}", e);
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "status" {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            backend.status(&mut |_, source, name, value| {
                let _ = writeln!(out, "{}.{}: {}", source, name, value);
            });
            continue;
        }
        match FlushEvent::from_json(line) {
            Ok(event) => match backend.flush(event.timestamp, &event.metrics) {
                Ok(delivery) => {
                    reap_finished(&mut pending);
                    pending.push(delivery);
                }
                Err(e) => debug!("flush at {} skipped: {}", event.timestamp, e),
            },
            Err(e) => error!("Unable to parse flush event: {}", e),
        }
    }

    reap(pending);
}
