use std::time::Instant;
use std::{env, process};

use aln_store::AlignmentStore;
use aln_store::utils;

use getopts::Options;

//-----------------------------------------------------------------------------

fn main() -> Result<(), String> {
    let start_time = Instant::now();

    // Parse arguments.
    let config = Config::new();

    // Load the store.
    let size = utils::file_size(&config.aln_file).unwrap_or(String::from("unknown"));
    eprintln!("Loading alignment file {} ({})", config.aln_file, size);
    let store = AlignmentStore::load(&config.aln_file)?;

    // Statistics.
    let stats = store.statistics();
    println!("Contigs: {}", stats.contigs);
    println!("Reads: {}", stats.reads);
    println!("Alignments: {}", stats.alignments);
    println!("Distinct mutations: {}", stats.mutations);
    println!("Mutation references: {}", stats.mutation_refs);
    println!("Average alignment length: {:.1} bp", stats.avg_alignment_length);
    println!("Average mutations per alignment: {:.2}", stats.avg_mutations);
    println!("Longest alignment interval: {} bp", store.max_alignment_length());

    let end_time = Instant::now();
    let seconds = end_time.duration_since(start_time).as_secs_f64();
    eprintln!("Used {:.3} seconds", seconds);

    Ok(())
}

//-----------------------------------------------------------------------------

struct Config {
    pub aln_file: String,
}

impl Config {
    pub fn new() -> Config {
        let args: Vec<String> = env::args().collect();
        let program = args[0].clone();
        let header = format!("Usage: {} alignments.aln", program);

        let mut opts = Options::new();
        opts.optflag("h", "help", "print this help");
        let matches = match opts.parse(&args[1..]) {
            Ok(m) => m,
            Err(f) => {
                eprintln!("{}", f);
                process::exit(1);
            }
        };

        if matches.opt_present("h") {
            eprint!("{}", opts.usage(&header));
            process::exit(0);
        }
        let aln_file = if let Some(s) = matches.free.first() {
            s.clone()
        } else {
            eprint!("{}", opts.usage(&header));
            process::exit(1);
        };

        Config { aln_file }
    }
}

//-----------------------------------------------------------------------------
