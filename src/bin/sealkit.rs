//! Sealkit CLI
//!
//! Command-line interface over the sealkit primitives: symmetric
//! envelopes, secret bundles, split-signature artifacts and decoys.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use sealkit::commands;
use sealkit::keys::DEFAULT_KEY_BITS;
use sealkit::keysource::{KeySource, ReaderKeySource, TerminalKeySource};

#[derive(Parser)]
#[command(name = "sealkit")]
#[command(version)]
#[command(about = "Envelope encryption, secret bundles and split signatures.", long_about = None)]
struct Cli {
    /// Read key material verbatim from stdin instead of from terminal
    #[arg(long, global = true)]
    key_stdin: bool,

    /// Log debug output to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an RSA key pair
    Keygen {
        /// Modulus size in bits
        #[arg(long, default_value_t = DEFAULT_KEY_BITS)]
        bits: usize,

        /// Path to write the PKCS#1 private key to
        #[arg(long, value_name = "FILE")]
        private_out: PathBuf,

        /// Path to write the PKIX public key to
        #[arg(long, value_name = "FILE")]
        public_out: PathBuf,
    },

    /// Seal a file into an envelope
    #[command(alias = "s")]
    Seal {
        /// Path to the file whose contents is to be sealed
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the file to write the envelope to
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Open an envelope
    #[command(alias = "o")]
    Open {
        /// Path to the file containing the envelope
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the file to write the plaintext to
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Combine two secrets into one bundle token
    Combine {
        /// Path to the file holding the first secret
        #[arg(long, value_name = "FILE")]
        first: PathBuf,

        /// Path to the file holding the second secret
        #[arg(long, value_name = "FILE")]
        second: PathBuf,

        /// Path to the file to write the token to
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Split a bundle token into its two secrets
    Split {
        /// Path to the file containing the token
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to write the first secret to
        #[arg(long, value_name = "FILE")]
        first_out: PathBuf,

        /// Path to write the second secret to
        #[arg(long, value_name = "FILE")]
        second_out: PathBuf,
    },

    /// Sign a message and encrypt the signature to a recipient
    Sign {
        /// Signer private key (PEM, PKCS#1)
        #[arg(long, value_name = "FILE")]
        signer_key: PathBuf,

        /// Recipient public key (PEM, PKIX)
        #[arg(long, value_name = "FILE")]
        recipient_key: PathBuf,

        /// Path to the message to sign
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to write the artifact to
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Recover the signed message from an artifact
    Recover {
        /// Recipient private key (PEM, PKCS#1)
        #[arg(long, value_name = "FILE")]
        recipient_key: PathBuf,

        /// Signer public key (PEM, PKIX)
        #[arg(long, value_name = "FILE")]
        signer_key: PathBuf,

        /// Path to the artifact
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to write the recovered message to
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Generate a decoy signature
    Decoy {
        /// Marker characters followed by one interval digit, e.g. AB3
        #[arg(long)]
        salt: String,

        /// Path to write the decoy to
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Check a decoy signature against its salt
    DecoyCheck {
        /// Marker characters followed by one interval digit, e.g. AB3
        #[arg(long)]
        salt: String,

        /// Path to the decoy
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,
    },

    /// Print a SHA-256 hash token of a file
    Hash {
        /// Path to the file to hash
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Token length; 0 prints the full encoded digest
        #[arg(long, default_value_t = 0)]
        len: usize,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Keygen {
            bits,
            private_out,
            public_out,
        } => commands::keygen(bits, &private_out, &public_out),
        Commands::Seal { input, output } => {
            let mut source = get_key_source(cli.key_stdin);
            commands::seal_file(&input, &output, &mut *source)
        }
        Commands::Open { input, output } => {
            let mut source = get_key_source(cli.key_stdin);
            commands::open_file(&input, &output, &mut *source)
        }
        Commands::Combine {
            first,
            second,
            output,
        } => {
            let mut source = get_key_source(cli.key_stdin);
            commands::combine_files(&first, &second, &output, &mut *source)
        }
        Commands::Split {
            input,
            first_out,
            second_out,
        } => {
            let mut source = get_key_source(cli.key_stdin);
            commands::split_file(&input, &first_out, &second_out, &mut *source)
        }
        Commands::Sign {
            signer_key,
            recipient_key,
            input,
            output,
        } => commands::sign_file(&signer_key, &recipient_key, &input, &output),
        Commands::Recover {
            recipient_key,
            signer_key,
            input,
            output,
        } => commands::recover_file(&recipient_key, &signer_key, &input, &output),
        Commands::Decoy { salt, output } => commands::decoy_file(salt.as_bytes(), &output),
        Commands::DecoyCheck { salt, input } => {
            commands::decoy_check_file(salt.as_bytes(), &input).map(|check| {
                println!(
                    "{} of {} markers matched",
                    check.matched_positions().len(),
                    check.marker_count()
                );
                if !check.is_match() {
                    process::exit(2);
                }
            })
        }
        Commands::Hash { input, len } => {
            commands::hash_file(&input, len).map(|token| println!("{}", token))
        }
    };

    if let Err(e) = result {
        tracing::debug!(kind = ?e.kind, category = ?e.category, "command failed");
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn get_key_source(use_stdin: bool) -> Box<dyn KeySource> {
    if use_stdin {
        Box::new(ReaderKeySource::new(Box::new(std::io::stdin())))
    } else {
        Box::new(TerminalKeySource)
    }
}
