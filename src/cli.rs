use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "instasolve")]
#[command(author, version, about = "Resolve Instagram posts, reels, and stories to direct media URLs", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a page to its direct media URL
    Resolve {
        /// Page URL (post, reel, or story)
        url: String,

        /// Read the page HTML from a file instead of fetching the URL
        #[arg(long)]
        html: Option<String>,

        /// Skip the info-API strategy (DOM + HTML scan only)
        #[arg(long)]
        skip_api: bool,

        /// Emit the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Classify a media URL as video or image
    Probe {
        /// Direct media URL
        url: String,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
