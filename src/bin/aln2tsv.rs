use std::time::Instant;
use std::{env, process};

use aln_store::AlignmentStore;

use getopts::Options;

//-----------------------------------------------------------------------------

fn main() -> Result<(), String> {
    let start_time = Instant::now();

    // Parse arguments.
    let config = Config::new();

    // Load the store and export the tables.
    eprintln!("Loading alignment file {}", config.aln_file);
    let store = AlignmentStore::load(&config.aln_file)?;
    store.export_tab_delimited(&config.prefix)?;

    let end_time = Instant::now();
    let seconds = end_time.duration_since(start_time).as_secs_f64();
    eprintln!("Used {:.3} seconds", seconds);

    Ok(())
}

//-----------------------------------------------------------------------------

struct Config {
    pub aln_file: String,
    pub prefix: String,
}

impl Config {
    pub fn new() -> Config {
        let args: Vec<String> = env::args().collect();
        let program = args[0].clone();
        let header = format!("Usage: {} [options] alignments.aln", program);

        let mut opts = Options::new();
        opts.optflag("h", "help", "print this help");
        opts.optopt("o", "output", "output table prefix (default: <input>)", "PREFIX");
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
        let prefix = matches.opt_str("o").unwrap_or(aln_file.clone());

        Config { aln_file, prefix }
    }
}

//-----------------------------------------------------------------------------
