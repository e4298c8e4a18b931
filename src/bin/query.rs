use std::time::Instant;
use std::{env, process};

use aln_store::AlignmentStore;
use aln_store::formats;
use aln_store::query::bin::BinQuery;
use aln_store::query::full::FullQuery;
use aln_store::query::pileup::PileupQuery;
use aln_store::query::{HeightStyle, PileupMode, QueryMode};

use getopts::Options;

//-----------------------------------------------------------------------------

fn main() -> Result<(), String> {
    let start_time = Instant::now();

    // Parse arguments.
    let config = Config::new()?;

    // Read the query intervals.
    let intervals = if config.one_based {
        formats::read_intervals_1based(&config.intervals_file)?
    } else {
        formats::read_intervals(&config.intervals_file)?
    };
    eprintln!("Read {} intervals from {}", intervals.len(), config.intervals_file);

    // Load the store.
    eprintln!("Loading alignment file {}", config.aln_file);
    let store = AlignmentStore::load(&config.aln_file)?;

    // Run the query.
    match config.mode {
        QueryMode::Full => {
            eprintln!("Full query with {} heights", config.height_style);
            let mut query = FullQuery::new(intervals, config.height_style);
            query.execute(&store)?;
            query.write_to_files(&config.prefix)?;
        },
        QueryMode::Pileup => {
            eprintln!("Pileup query in {} mode", config.pileup_mode);
            let mut query = PileupQuery::new(intervals, config.pileup_mode);
            query.execute(&store)?;
            query.write_to_file(&config.prefix)?;
        },
        QueryMode::Bin => {
            eprintln!("Bin query with bin size {}", config.binsize);
            let mut query = BinQuery::new(intervals, config.binsize)?;
            query.execute(&store)?;
            query.write_to_file(&config.prefix)?;
        },
    }

    let end_time = Instant::now();
    let seconds = end_time.duration_since(start_time).as_secs_f64();
    eprintln!("Used {:.3} seconds", seconds);

    Ok(())
}

//-----------------------------------------------------------------------------

struct Config {
    pub aln_file: String,
    pub intervals_file: String,
    pub prefix: String,
    pub mode: QueryMode,
    pub pileup_mode: PileupMode,
    pub binsize: u32,
    pub height_style: HeightStyle,
    pub one_based: bool,
}

impl Config {
    // Default bin size for the bin mode.
    pub const DEFAULT_BINSIZE: u32 = 100;

    pub fn new() -> Result<Config, String> {
        let args: Vec<String> = env::args().collect();
        let program = args[0].clone();
        let header = format!("Usage: {} [options] alignments.aln", program);

        let mut opts = Options::new();
        opts.optflag("h", "help", "print this help");
        opts.optopt("i", "intervals", "query intervals, tab-separated (required)", "FILE");
        opts.optopt("o", "output", "output table prefix (required)", "PREFIX");
        opts.optopt("m", "mode", "query mode: full, pileup, or bin (default: full)", "STR");
        opts.optopt("", "pileup-mode", "pileup report mode: all, covered, or mutated (default: covered)", "STR");
        let binsize_desc = format!("bin size for the bin mode (default: {})", Self::DEFAULT_BINSIZE);
        opts.optopt("", "binsize", &binsize_desc, "INT");
        opts.optopt("", "height-style", "height style for the full mode: by_coord or by_mutations (default: by_coord)", "STR");
        opts.optflag("", "one-based", "the intervals use 1-based closed coordinates");
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
        let intervals_file = if let Some(s) = matches.opt_str("i") {
            s
        } else {
            eprint!("{}", opts.usage(&header));
            process::exit(1);
        };
        let prefix = if let Some(s) = matches.opt_str("o") {
            s
        } else {
            eprint!("{}", opts.usage(&header));
            process::exit(1);
        };

        let mode = match matches.opt_str("m") {
            Some(s) => s.parse()?,
            None => QueryMode::Full,
        };
        let pileup_mode = match matches.opt_str("pileup-mode") {
            Some(s) => s.parse()?,
            None => PileupMode::Covered,
        };
        let binsize = match matches.opt_str("binsize") {
            Some(s) => {
                let value = s.parse::<u32>().map_err(|x| format!("--binsize: {}", x))?;
                if value == 0 {
                    return Err(String::from("--binsize: bin size must be positive"));
                }
                value
            },
            None => Self::DEFAULT_BINSIZE,
        };
        let height_style = match matches.opt_str("height-style") {
            Some(s) => s.parse()?,
            None => HeightStyle::ByCoord,
        };
        let one_based = matches.opt_present("one-based");

        Ok(Config {
            aln_file, intervals_file, prefix,
            mode, pileup_mode, binsize, height_style,
            one_based,
        })
    }
}

//-----------------------------------------------------------------------------
