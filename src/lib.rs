use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::{debug, info};
use rand::Rng;
use std::io::{self, BufRead, Write};

/// characters eligible for a password: ascii letters, digits, then symbols
pub const CHARSET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789#@!$%&*?";

pub const MIN_LENGTH: usize = 4;

const LENGTH_PROMPT: &str = "How many digits do you want your password to be? ";
const AGAIN_PROMPT: &str = "Do you want to create another one? (yes/no): ";
const INVALID_NUMBER: &str = "Please enter a valid number.";
const TOO_SHORT: &str = "Please choose at least 4 digits for better security.";
const GOODBYE: &str = "Goodbye!";

#[derive(Parser, Debug)]
#[command(about = "generate random passwords interactively")]
pub struct Args {
    /// silent mode, no logging
    #[clap(long)]
    pub silent: bool,

    /// debug logging (written to stderr)
    #[clap(long)]
    pub debug: bool,
}

/// What the user typed at the length prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthInput {
    Valid(usize),
    TooShort,
    Invalid,
}

pub fn parse_length(input: &str) -> LengthInput {
    let n: i64 = match input.trim().parse() {
        Ok(n) => n,
        Err(_) => return LengthInput::Invalid,
    };
    if n < MIN_LENGTH as i64 {
        return LengthInput::TooShort;
    }
    // fits i64 but not usize on narrow targets
    usize::try_from(n).map_or(LengthInput::Invalid, LengthInput::Valid)
}

/// Builds a password of exactly `length` characters, each drawn
/// independently and uniformly from [`CHARSET`].
///
/// The random source is passed in so callers decide where entropy comes
/// from; the binary uses `rand::thread_rng()`, tests use a seeded `StdRng`.
pub fn generate<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

fn wants_another(answer: &str) -> bool {
    answer.trim().to_ascii_lowercase() == "yes"
}

/// The prompt, generate, confirm loop over arbitrary input and output.
pub struct Session<I, O, R> {
    input: I,
    output: O,
    rng: R,
    generated: usize,
}

impl<I: BufRead, O: Write, R: Rng> Session<I, O, R> {
    pub fn new(input: I, output: O, rng: R) -> Self {
        Session {
            input,
            output,
            rng,
            generated: 0,
        }
    }

    /// number of passwords produced so far
    pub fn generated(&self) -> usize {
        self.generated
    }

    // None on end of input
    fn prompt(&mut self, msg: &str) -> Result<Option<String>> {
        write!(self.output, "{msg}").context("failed to write prompt")?;
        self.output.flush().context("failed to flush output")?;
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("failed to read input")?;
        if read == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line))
    }

    pub fn run(&mut self) -> Result<()> {
        loop {
            let Some(line) = self.prompt(LENGTH_PROMPT)? else {
                info!("input closed at length prompt");
                return Ok(());
            };
            let length = match parse_length(&line) {
                LengthInput::Valid(length) => length,
                LengthInput::TooShort => {
                    debug!("rejected short length: {:?}", line.trim());
                    writeln!(self.output, "{TOO_SHORT}")?;
                    continue;
                }
                LengthInput::Invalid => {
                    debug!("rejected non-numeric length: {:?}", line.trim());
                    writeln!(self.output, "{INVALID_NUMBER}")?;
                    continue;
                }
            };
            debug!("generating password of length {length}");
            let password = generate(&mut self.rng, length);
            writeln!(self.output, "Your safe password is: {password}")?;
            self.generated += 1;

            let Some(answer) = self.prompt(AGAIN_PROMPT)? else {
                info!("input closed at continue prompt");
                return Ok(());
            };
            if !wants_another(&answer) {
                writeln!(self.output, "{GOODBYE}")?;
                return Ok(());
            }
        }
    }
}

pub fn run(args: Args) -> Result<()> {
    if args.silent && args.debug {
        return Err(anyhow!("can't have 'silent' with 'debug'"));
    }
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut session = Session::new(stdin.lock(), stdout.lock(), rand::thread_rng());
    session.run()?;
    info!("session finished, {} password(s) generated", session.generated());
    Ok(())
}
