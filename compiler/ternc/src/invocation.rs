//! Command-line argument parsing.

use thiserror::Error;

pub const USAGE: &str = "\
Usage: tern [options] [file.tern [arg ...]]

Options:
  -e <script>      Run <script> instead of a file; remaining args go to ::argv
  -h, --help       Show this help message
  -v, --version    Show version information

With no file or script, commands are read from standard input.

Environment:
  TERN_LOG         Log filter, e.g. `debug` or `tern_eval=trace`
";

/// What the command line asks for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Invocation {
    Help,
    Version,
    /// `-e script ?arg ...?`
    Inline { script: String, args: Vec<String> },
    /// `file ?arg ...?`
    File { path: String, args: Vec<String> },
    /// No script: read commands from stdin.
    Interactive,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("option -e requires a script")]
    MissingScript,
    #[error("unknown option \"{0}\"")]
    UnknownOption(String),
}

/// Parse the arguments after the program name.
///
/// Everything after the script (file or `-e` text) is passed to the
/// script untouched, even words that look like options.
pub fn parse_args(args: &[String]) -> Result<Invocation, UsageError> {
    let Some((first, rest)) = args.split_first() else {
        return Ok(Invocation::Interactive);
    };
    match first.as_str() {
        "-h" | "--help" => Ok(Invocation::Help),
        "-v" | "--version" => Ok(Invocation::Version),
        "-e" => {
            let (script, args) = rest.split_first().ok_or(UsageError::MissingScript)?;
            Ok(Invocation::Inline {
                script: script.clone(),
                args: args.to_vec(),
            })
        }
        "--" => match rest.split_first() {
            Some((path, args)) => Ok(Invocation::File {
                path: path.clone(),
                args: args.to_vec(),
            }),
            None => Ok(Invocation::Interactive),
        },
        option if option.starts_with('-') && option.len() > 1 => {
            Err(UsageError::UnknownOption(option.to_string()))
        }
        path => Ok(Invocation::File {
            path: path.to_string(),
            args: rest.to_vec(),
        }),
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
