use std::time::Instant;
use std::{env, process};

use aln_store::{AlignmentStore, PafParams, VerificationData};
use aln_store::{formats, paf, utils};

use getopts::Options;

//-----------------------------------------------------------------------------

fn main() -> Result<(), String> {
    let start_time = Instant::now();

    // Parse arguments.
    let config = Config::new();

    // Load the sequences if the alignments should be verified.
    let verification = if config.verify {
        let reads_file = config.reads.as_ref().unwrap();
        let contigs_file = config.contigs.as_ref().unwrap();
        eprintln!("Loading contigs from {}", contigs_file);
        let contigs = formats::read_fasta(contigs_file, None)?;
        eprintln!("Loading reads from {}", reads_file);
        let reads = formats::read_sequence_file(reads_file, None)?;
        eprintln!("Loaded {} contigs and {} reads", contigs.len(), reads.len());
        Some(VerificationData { reads, contigs })
    } else {
        None
    };

    // Read the alignments.
    eprintln!("Reading PAF file {}", config.paf_file);
    let mut store = AlignmentStore::new();
    let params = PafParams {
        quit_on_error: config.quit_on_error,
        max_records: config.max_records,
        ..PafParams::default()
    };
    let summary = paf::read_paf(&config.paf_file, &mut store, verification.as_ref(), &params)?;

    // Save the store.
    eprintln!("Writing alignment file {}", config.output);
    store.save(&config.output)?;

    // Statistics.
    let stats = store.statistics();
    eprintln!(
        "The store contains {} contigs, {} reads, {} alignments, and {} distinct mutations",
        stats.contigs, stats.reads, stats.alignments, stats.mutations
    );
    if summary.skipped_records > 0 {
        eprintln!("{} records were skipped", summary.skipped_records);
    }
    let size = utils::file_size(&config.output).unwrap_or(String::from("unknown"));
    eprintln!("Final file size: {}", size);

    let end_time = Instant::now();
    let seconds = end_time.duration_since(start_time).as_secs_f64();
    eprintln!("Used {:.3} seconds", seconds);

    Ok(())
}

//-----------------------------------------------------------------------------

struct Config {
    pub paf_file: String,
    pub output: String,
    pub verify: bool,
    pub reads: Option<String>,
    pub contigs: Option<String>,
    pub quit_on_error: bool,
    pub max_records: usize,
}

impl Config {
    pub fn new() -> Config {
        let args: Vec<String> = env::args().collect();
        let program = args[0].clone();
        let header = format!("Usage: {} [options] alignments.paf[.gz]", program);

        let mut opts = Options::new();
        opts.optflag("h", "help", "print this help");
        opts.optopt("o", "output", "output file name (default: <input>.aln)", "FILE");
        opts.optflag("", "verify", "verify the alignments against the sequences");
        opts.optopt("r", "reads", "read sequences, FASTA or FASTQ (with --verify)", "FILE");
        opts.optopt("c", "contigs", "contig sequences, FASTA (with --verify)", "FILE");
        opts.optflag("", "keep-going", "count verification failures instead of stopping at the first one");
        opts.optopt("n", "max-records", "read at most INT records (default: all)", "INT");
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
        let paf_file = if let Some(s) = matches.free.first() {
            s.clone()
        } else {
            eprint!("{}", opts.usage(&header));
            process::exit(1);
        };
        let output = matches.opt_str("o").unwrap_or(format!("{}.aln", paf_file));

        let verify = matches.opt_present("verify");
        let reads = matches.opt_str("r");
        let contigs = matches.opt_str("c");
        if verify && (reads.is_none() || contigs.is_none()) {
            eprintln!("Option --verify requires --reads and --contigs");
            process::exit(1);
        }

        let quit_on_error = !matches.opt_present("keep-going");
        let max_records = match matches.opt_str("n") {
            Some(s) => match s.parse::<usize>() {
                Ok(n) => n,
                Err(f) => {
                    eprintln!("--max-records: {}", f);
                    process::exit(1);
                }
            },
            None => 0,
        };

        Config {
            paf_file, output,
            verify, reads, contigs,
            quit_on_error, max_records,
        }
    }
}

//-----------------------------------------------------------------------------
