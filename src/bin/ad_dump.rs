//! Lists every block of an anti-dictionary file with its header counts.
//! Used for inspecting tool output by hand.

use clap::Parser;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use adstats::io_utils::{ad_cli_error, io_cli_error, simple_cli_error};
use adstats::{scan_file, CountField, Profile, ScanMode};

#[derive(Parser)]
struct Args {
    /// Anti-dictionary file to list
    input: PathBuf,
    /// File holds length-prefixed blocks
    #[arg(long)]
    stream: bool,
    /// Also print every key
    #[arg(long)]
    keys: bool,
    /// Only print the block count
    #[arg(long)]
    summary: bool,
    /// Optional CSV output path for per-block results
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Optional JSON output path for per-block results
    #[arg(long)]
    json: Option<PathBuf>,
}

#[derive(Serialize)]
struct Record {
    index: usize,
    key_size_class: u8,
    n0_1: u32,
    n1_1: u32,
    n0_2: u32,
    n1_2: u32,
    n0_4: u32,
    n1_4: u32,
    ad_size: u64,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    if args.keys && !args.stream {
        return Err(
            simple_cli_error("--keys requires --stream: a summary scan reads only the header")
                .into(),
        );
    }

    let profile = if args.stream {

        Profile::Stream

    } else {

        Profile::Summary

    };
    let mode = if args.keys {
        ScanMode::Full
    } else {
        ScanMode::Summary
    };
    let blocks = scan_file(&args.input, profile, mode)
        .map_err(|e| ad_cli_error("scanning anti-dictionary", e))?;

    let records: Vec<Record> = blocks
        .iter()
        .enumerate()
        .map(|(index, b)| Record {
            index,
            key_size_class: b.key_size_class,
            n0_1: b.counts[0],
            n1_1: b.counts[1],
            n0_2: b.counts[2],
            n1_2: b.counts[3],
            n0_4: b.counts[4],
            n1_4: b.counts[5],
            ad_size: b.ad_size(),
        })
        .collect();

    if let Some(p) = &args.csv {
        let f = File::create(p).map_err(|e| io_cli_error("creating csv", p, e))?;
        let mut wtr = csv::Writer::from_writer(f);
        for r in &records {
            wtr.serialize(r)?;
        }
        wtr.flush()?;
    }
    if let Some(path) = &args.json {
        let mut f = File::create(path).map_err(|e| io_cli_error("creating json", path, e))?;
        serde_json::to_writer_pretty(&mut f, &records)?;
        f.write_all(b"\n")?;
    }

    if !args.summary {
        for (block, r) in blocks.iter().zip(&records) {
            println!(
                "block {}: key-size {} ad-size {} counts {:?}",
                r.index, r.key_size_class, r.ad_size, block.counts
            );
            if args.keys {
                for field in CountField::ALL {
                    if let Some(keys) = block.keys_of(field).filter(|k| !k.is_empty()) {
                        println!("  {field}: {keys:?}");
                    }
                }
            }
        }
    }
    println!("#blocks: {}", blocks.len());
    Ok(())
}
