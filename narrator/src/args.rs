use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Narrator text-to-speech service
#[derive(Debug, Parser)]
#[command(name = "narrator", about = "Long-form narration over the ElevenLabs API")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "narrator.toml", env = "NARRATOR_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "NARRATOR_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Log filter directives
    #[arg(long, default_value = "info", env = "NARRATOR_LOG")]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,

    /// Print how a script would be split, without calling the API
    Chunk {
        /// Script to split; reads stdin when omitted
        file: Option<PathBuf>,

        /// Start of the preferred cut window
        #[arg(long, default_value_t = chunker::DEFAULT_MIN_CHARS)]
        min_chars: usize,

        /// End of the preferred cut window
        #[arg(long, default_value_t = chunker::DEFAULT_MAX_CHARS)]
        max_chars: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default() {
        let args = Args::try_parse_from(["narrator"]).unwrap();
        assert!(args.command.is_none());
        assert_eq!(args.config, PathBuf::from("narrator.toml"));
    }

    #[test]
    fn chunk_options() {
        let args =
            Args::try_parse_from(["narrator", "chunk", "script.txt", "--min-chars", "400", "--max-chars", "500"])
                .unwrap();

        match args.command {
            Some(Command::Chunk {
                file,
                min_chars,
                max_chars,
            }) => {
                assert_eq!(file, Some(PathBuf::from("script.txt")));
                assert_eq!((min_chars, max_chars), (400, 500));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn listen_override() {
        let args = Args::try_parse_from(["narrator", "--listen", "127.0.0.1:8080", "serve"]).unwrap();
        assert_eq!(args.listen, Some(SocketAddr::from(([127, 0, 0, 1], 8080))));
        assert!(matches!(args.command, Some(Command::Serve)));
    }
}
